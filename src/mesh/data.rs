//! Committed mesh representation

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::math::Aabb;
use crate::mesh::color::Color;

/// Summed face normal length, relative to the summed face areas, below which
/// a vertex normal counts as cancelled out
const CANCELLED_NORMAL_RATIO: f32 = 1e-3;

/// Options applied when a geometry buffer is committed to a sink
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitOptions {
    /// Merge vertices of equal color lying within `weld_epsilon` of each other
    pub weld_vertices: bool,
    pub weld_epsilon: f32,
}

impl Default for CommitOptions {
    fn default() -> Self {
        Self {
            weld_vertices: false,
            weld_epsilon: 1e-5,
        }
    }
}

/// GPU-friendly interleaved vertex
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct PackedVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

/// Triangle mesh with per-vertex colors and smooth normals
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub colors: Vec<Color>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
    pub bounds: Aabb,
}

impl MeshData {
    /// Build a mesh from raw lists, recomputing normals and bounds
    pub fn from_geometry(
        positions: &[Vec3],
        colors: &[Color],
        indices: &[u32],
        options: &CommitOptions,
    ) -> Self {
        let mut mesh = Self {
            positions: positions.to_vec(),
            colors: colors.to_vec(),
            normals: Vec::new(),
            indices: indices.to_vec(),
            bounds: Aabb::default(),
        };
        if options.weld_vertices {
            mesh.weld(options.weld_epsilon);
        }
        mesh.recalculate_normals();
        mesh.recalculate_bounds();
        mesh
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Iterate triangles as index triples
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Area-weighted smooth vertex normals
    ///
    /// A vertex whose face contributions cancel out, as on double-sided
    /// leaves, takes the normal of its first non-degenerate face instead.
    /// Vertices not referenced by any triangle get `Vec3::Y`.
    pub fn recalculate_normals(&mut self) {
        let count = self.positions.len();
        let mut sums = vec![Vec3::ZERO; count];
        let mut areas = vec![0.0f32; count];
        let mut first_faces = vec![Vec3::ZERO; count];
        for [a, b, c] in self.triangles() {
            let origin = self.positions[a as usize];
            let face =
                (self.positions[b as usize] - origin).cross(self.positions[c as usize] - origin);
            let area = face.length();
            for vertex in [a, b, c] {
                let vertex = vertex as usize;
                sums[vertex] += face;
                areas[vertex] += area;
                if first_faces[vertex] == Vec3::ZERO {
                    first_faces[vertex] = face.normalize_or_zero();
                }
            }
        }
        self.normals = sums
            .into_iter()
            .zip(areas)
            .zip(first_faces)
            .map(|((sum, area), first_face)| {
                if area > 0.0 && sum.length() > area * CANCELLED_NORMAL_RATIO {
                    sum.normalize()
                } else if first_face != Vec3::ZERO {
                    first_face
                } else {
                    Vec3::Y
                }
            })
            .collect();
    }

    pub fn recalculate_bounds(&mut self) {
        self.bounds = Aabb::from_points(self.positions.iter().copied()).unwrap_or_default();
    }

    /// Merge vertices of equal color lying within `epsilon` of each other
    ///
    /// Each vertex is matched against the vertices already kept in its own
    /// and the neighbouring cells of a grid of cell size `epsilon`, and maps
    /// to the first one in range. Triangles that collapse onto fewer than
    /// three distinct vertices are dropped.
    pub fn weld(&mut self, epsilon: f32) {
        let epsilon = epsilon.max(f32::EPSILON);
        let mut grid: HashMap<([i64; 3], [u32; 4]), Vec<u32>> = HashMap::new();
        let mut remap = Vec::with_capacity(self.positions.len());
        let mut positions: Vec<Vec3> = Vec::new();
        let mut colors = Vec::new();

        for (position, color) in self.positions.iter().zip(&self.colors) {
            let cell = (*position / epsilon).floor();
            let cell = [cell.x as i64, cell.y as i64, cell.z as i64];
            let bits = color.to_bits();
            let existing = neighbour_cells(cell).find_map(|neighbour| {
                grid.get(&(neighbour, bits))?
                    .iter()
                    .copied()
                    .find(|&kept| positions[kept as usize].distance(*position) <= epsilon)
            });
            let index = match existing {
                Some(kept) => kept,
                None => {
                    let index = positions.len() as u32;
                    positions.push(*position);
                    colors.push(*color);
                    grid.entry((cell, bits)).or_default().push(index);
                    index
                }
            };
            remap.push(index);
        }

        let before = self.positions.len();
        let indices = self
            .triangles()
            .map(|[a, b, c]| [remap[a as usize], remap[b as usize], remap[c as usize]])
            .filter(|[a, b, c]| a != b && b != c && a != c)
            .flatten()
            .collect();

        self.positions = positions;
        self.colors = colors;
        self.indices = indices;
        log::debug!("Welded {} vertices down to {}", before, self.positions.len());
    }

    /// Interleave positions, normals and colors for upload
    pub fn packed_vertices(&self) -> Vec<PackedVertex> {
        self.positions
            .iter()
            .zip(&self.normals)
            .zip(&self.colors)
            .map(|((p, n), c)| PackedVertex {
                position: p.to_array(),
                normal: n.to_array(),
                color: c.to_array(),
            })
            .collect()
    }
}

/// The 3x3x3 block of grid cells around `cell`
fn neighbour_cells([x, y, z]: [i64; 3]) -> impl Iterator<Item = [i64; 3]> {
    (-1..=1).flat_map(move |dx| {
        (-1..=1).flat_map(move |dy| (-1..=1).map(move |dz| [x + dx, y + dy, z + dz]))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::color::palette;

    fn quad() -> MeshData {
        // Two triangles sharing an edge, but with duplicated shared vertices
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 0.0),
        ];
        let colors = vec![palette::GREEN; 6];
        let indices = vec![0, 1, 2, 3, 4, 5];
        MeshData::from_geometry(&positions, &colors, &indices, &CommitOptions::default())
    }

    #[test]
    fn test_normals_and_bounds() {
        let mesh = quad();
        assert_eq!(mesh.normals.len(), mesh.positions.len());
        for n in &mesh.normals {
            assert!((n.y - 1.0).abs() < 1e-5, "flat quad should face up: {n:?}");
        }
        assert_eq!(mesh.bounds.min, Vec3::ZERO);
        assert_eq!(mesh.bounds.max, Vec3::new(1.0, 0.0, 1.0));
    }

    #[test]
    fn test_weld_merges_shared_vertices() {
        let mut mesh = quad();
        mesh.weld(1e-5);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertex_count()));
    }

    #[test]
    fn test_weld_keeps_distinct_colors() {
        let positions = vec![Vec3::ZERO, Vec3::X, Vec3::Z, Vec3::ZERO];
        let colors = vec![palette::GREEN, palette::GREEN, palette::GREEN, palette::BARK_BROWN];
        let mut mesh = MeshData::from_geometry(
            &positions,
            &colors,
            &[0, 2, 1, 3, 2, 1],
            &CommitOptions::default(),
        );
        mesh.weld(1e-5);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn test_weld_drops_degenerate_triangles() {
        let positions = vec![Vec3::ZERO, Vec3::new(0.0, 0.0, 1e-7), Vec3::X];
        let colors = vec![palette::GREEN; 3];
        let options = CommitOptions {
            weld_vertices: true,
            ..CommitOptions::default()
        };
        let mesh = MeshData::from_geometry(&positions, &colors, &[0, 1, 2], &options);
        assert_eq!(mesh.vertex_count(), 2);
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn test_weld_merges_across_cell_boundary() {
        // 0.0099 and 0.0101 round into different 0.01 cells
        let positions = vec![
            Vec3::new(0.0099, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(0.0101, 0.0, 0.0),
        ];
        let colors = vec![palette::GREEN; 4];
        let mut mesh = MeshData::from_geometry(
            &positions,
            &colors,
            &[0, 2, 1, 3, 2, 1],
            &CommitOptions::default(),
        );
        mesh.weld(0.01);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.indices, vec![0, 2, 1, 0, 2, 1]);
    }

    #[test]
    fn test_weld_keeps_vertices_out_of_range() {
        let positions = vec![Vec3::ZERO, Vec3::new(0.015, 0.0, 0.0), Vec3::Z];
        let colors = vec![palette::GREEN; 3];
        let mut mesh =
            MeshData::from_geometry(&positions, &colors, &[0, 2, 1], &CommitOptions::default());
        mesh.weld(0.01);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn test_two_sided_triangle_takes_face_normal() {
        let positions = vec![Vec3::ZERO, Vec3::Z, Vec3::X];
        let colors = vec![palette::GREEN; 3];
        let mesh = MeshData::from_geometry(
            &positions,
            &colors,
            &[0, 1, 2, 2, 1, 0],
            &CommitOptions::default(),
        );
        // First face (0, 1, 2) faces +Y
        for n in &mesh.normals {
            assert!((*n - Vec3::Y).length() < 1e-6, "{n:?}");
        }
    }

    #[test]
    fn test_unreferenced_vertex_normal_defaults_up() {
        let mesh = MeshData::from_geometry(
            &[Vec3::ZERO],
            &[palette::GREEN],
            &[],
            &CommitOptions::default(),
        );
        assert_eq!(mesh.normals, vec![Vec3::Y]);
    }

    #[test]
    fn test_packed_vertices() {
        let mesh = quad();
        let packed = mesh.packed_vertices();
        assert_eq!(packed.len(), 6);
        assert_eq!(packed[2].position, [1.0, 0.0, 1.0]);
        assert_eq!(packed[0].color, palette::GREEN.to_array());
        let bytes: &[u8] = bytemuck::cast_slice(&packed);
        assert_eq!(bytes.len(), 6 * std::mem::size_of::<PackedVertex>());
    }
}
