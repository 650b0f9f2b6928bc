//! Wavefront OBJ and JSON export of mesh hierarchies
//!
//! OBJ output bakes every node's world transform into its vertices and uses
//! the common `v x y z r g b` vertex-color extension.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::core::Result;
use crate::scene::{MeshNode, flatten};

/// Write the hierarchy as a single OBJ stream, one object per mesh
pub fn write_obj<W: Write>(root: &MeshNode, writer: &mut W) -> Result<()> {
    writeln!(writer, "# arbor tree mesh")?;
    let mut offset = 1u32;
    for (object, entry) in flatten(root).iter().enumerate() {
        writeln!(writer, "o {}_{}", entry.name, object)?;
        for (p, c) in entry.mesh.positions.iter().zip(&entry.mesh.colors) {
            let p = entry.world.transform_point3(*p);
            writeln!(
                writer,
                "v {:.6} {:.6} {:.6} {:.4} {:.4} {:.4}",
                p.x, p.y, p.z, c.r, c.g, c.b
            )?;
        }
        for n in &entry.mesh.normals {
            let n = entry.world.transform_vector3(*n).normalize_or_zero();
            writeln!(writer, "vn {:.6} {:.6} {:.6}", n.x, n.y, n.z)?;
        }
        for [a, b, c] in entry.mesh.triangles() {
            let (a, b, c) = (a + offset, b + offset, c + offset);
            writeln!(writer, "f {a}//{a} {b}//{b} {c}//{c}")?;
        }
        offset += entry.mesh.vertex_count() as u32;
    }
    Ok(())
}

/// Write the hierarchy to an OBJ file
pub fn save_obj(root: &MeshNode, path: impl AsRef<Path>) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    write_obj(root, &mut writer)?;
    writer.flush()?;
    log::debug!("Saved OBJ to {}", path.as_ref().display());
    Ok(())
}

/// Write the hierarchy, including local transforms, as JSON
pub fn save_json(root: &MeshNode, path: impl AsRef<Path>) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    serde_json::to_writer(&mut writer, root)?;
    writer.flush()?;
    log::debug!("Saved JSON to {}", path.as_ref().display());
    Ok(())
}

/// Read a hierarchy written by [`save_json`]
pub fn load_json(path: impl AsRef<Path>) -> Result<MeshNode> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{CommitOptions, MeshData, color::palette};
    use crate::scene::{LocalTransform, MeshSink};
    use glam::{Quat, Vec3};

    fn sample_tree() -> MeshNode {
        let triangle = MeshData::from_geometry(
            &[Vec3::ZERO, Vec3::Z, Vec3::X],
            &[palette::BARK_BROWN; 3],
            &[0, 1, 2],
            &CommitOptions::default(),
        );
        let mut root = MeshNode::new("Tree");
        root.commit(triangle.clone());
        root.create_child(
            "Foliage",
            LocalTransform::from_position_rotation(Vec3::Y * 3.0, Quat::IDENTITY),
        )
        .commit(triangle);
        root
    }

    #[test]
    fn test_write_obj_records() {
        let mut out = Vec::new();
        write_obj(&sample_tree(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), 6);
        assert_eq!(text.lines().filter(|l| l.starts_with("vn ")).count(), 6);
        let faces: Vec<&str> = text.lines().filter(|l| l.starts_with("f ")).collect();
        assert_eq!(faces, vec!["f 1//1 2//2 3//3", "f 4//4 5//5 6//6"]);
        assert!(text.contains("o Foliage_1"));
        // Child vertices are moved into world space
        assert!(text.contains("v 0.000000 3.000000 0.000000 0.3800 0.3000 0.1700"));
    }

    #[test]
    fn test_json_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tree.json");
        let tree = sample_tree();
        save_json(&tree, &path).unwrap();
        let loaded = load_json(&path).unwrap();
        assert_eq!(loaded, tree);
    }

    #[test]
    fn test_save_obj_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tree.obj");
        save_obj(&sample_tree(), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("# arbor tree mesh"));
    }

    #[test]
    fn test_load_json_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_json(dir.path().join("missing.json")).is_err());
    }
}
