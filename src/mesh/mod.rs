//! Mesh construction, committed mesh data and exporters

pub mod buffer;
pub mod color;
pub mod data;
pub mod export;

pub use buffer::{DiscFacing, GeometryBuffer};
pub use color::Color;
pub use data::{CommitOptions, MeshData, PackedVertex};
