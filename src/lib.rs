//! Arbor - procedural low-poly tree mesh generator
//!
//! Trees are grown from a handful of shape parameters: a ring-extruded trunk
//! with optional side branches or a splintered stump top, plus one of several
//! canopy styles. Output is written into a `scene::MeshSink`, with canopies as
//! child meshes.

pub mod core;
pub mod math;
pub mod mesh;
pub mod procgen;
pub mod scene;
