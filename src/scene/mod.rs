//! Output hierarchy for generated meshes

pub mod flatten;
pub mod node;

pub use flatten::{FlatMeshEntry, flatten, world_bounds};
pub use node::{LocalTransform, MeshNode, MeshSink};
