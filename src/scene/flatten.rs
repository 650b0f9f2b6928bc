//! Flattened mesh hierarchy for export.
//!
//! `FlatMeshEntry` is the result of walking a `MeshNode` tree: one entry per
//! node that carries a mesh, with its accumulated world transform.

use glam::Mat4;

use crate::math::Aabb;
use crate::mesh::MeshData;
use crate::scene::node::MeshNode;

/// One mesh in the flattened set.
#[derive(Clone, Debug)]
pub struct FlatMeshEntry<'a> {
    pub name: &'a str,
    /// Parent transforms composed with the node's own.
    pub world: Mat4,
    pub mesh: &'a MeshData,
}

impl FlatMeshEntry<'_> {
    /// Bounds of the transformed mesh.
    pub fn world_bounds(&self) -> Option<Aabb> {
        Aabb::from_points(
            self.mesh
                .positions
                .iter()
                .map(|p| self.world.transform_point3(*p)),
        )
    }
}

/// Depth-first walk, parents before children.
pub fn flatten(root: &MeshNode) -> Vec<FlatMeshEntry<'_>> {
    let mut entries = Vec::new();
    visit(root, Mat4::IDENTITY, &mut entries);
    entries
}

fn visit<'a>(node: &'a MeshNode, parent: Mat4, out: &mut Vec<FlatMeshEntry<'a>>) {
    let world = parent * node.transform.to_mat4();
    if let Some(mesh) = &node.mesh {
        out.push(FlatMeshEntry {
            name: &node.name,
            world,
            mesh,
        });
    }
    for child in &node.children {
        visit(child, world, out);
    }
}

/// World-space bounds of every mesh in the hierarchy
pub fn world_bounds(root: &MeshNode) -> Option<Aabb> {
    flatten(root)
        .iter()
        .filter_map(FlatMeshEntry::world_bounds)
        .reduce(|a, b| a.merged(&b))
}
