//! Mesh sinks and the hierarchical mesh node
//!
//! Generators never own their output. They write into a `MeshSink`, which
//! stores the committed mesh and hands out child sinks for attached
//! sub-meshes (foliage). `MeshNode` is the in-memory sink used by the batch
//! tool, the exporters and the tests.

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::mesh::MeshData;

/// Local transform relative to the parent node.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocalTransform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: f32,
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: 1.0,
        }
    }
}

impl LocalTransform {
    /// Identity transform (no translation, rotation, or scaling).
    pub fn identity() -> Self {
        Self::default()
    }

    /// Translation and rotation, unit scale.
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Convert to a 4x4 matrix.
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            self.rotation,
            self.position,
        )
    }
}

/// Destination for generated geometry
pub trait MeshSink {
    /// Drop the mesh and every child sink
    fn clear(&mut self);

    /// Replace this sink's mesh with `mesh`
    fn commit(&mut self, mesh: MeshData);

    /// Create a child sink placed at `transform` in this sink's frame
    fn create_child(&mut self, name: &str, transform: LocalTransform) -> &mut dyn MeshSink;
}

/// A named mesh with a local transform and attached child meshes
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshNode {
    pub name: String,
    pub transform: LocalTransform,
    pub mesh: Option<MeshData>,
    pub children: Vec<MeshNode>,
}

impl MeshNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_transform(name: impl Into<String>, transform: LocalTransform) -> Self {
        Self {
            name: name.into(),
            transform,
            ..Default::default()
        }
    }

    /// Number of nodes in this subtree, including self
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(MeshNode::node_count).sum::<usize>()
    }

    /// Vertices across this subtree
    pub fn total_vertices(&self) -> usize {
        self.mesh.as_ref().map_or(0, MeshData::vertex_count)
            + self.children.iter().map(MeshNode::total_vertices).sum::<usize>()
    }

    /// Triangles across this subtree
    pub fn total_triangles(&self) -> usize {
        self.mesh.as_ref().map_or(0, MeshData::triangle_count)
            + self.children.iter().map(MeshNode::total_triangles).sum::<usize>()
    }

    /// Direct children with the given name
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MeshNode> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }
}

impl MeshSink for MeshNode {
    fn clear(&mut self) {
        self.mesh = None;
        self.children.clear();
    }

    fn commit(&mut self, mesh: MeshData) {
        self.mesh = Some(mesh);
    }

    fn create_child(&mut self, name: &str, transform: LocalTransform) -> &mut dyn MeshSink {
        let index = self.children.len();
        self.children.push(MeshNode::with_transform(name, transform));
        &mut self.children[index]
    }
}
