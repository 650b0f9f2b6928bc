//! Mathematical utilities

pub mod aabb;
pub mod curve;

pub use aabb::Aabb;
pub use curve::{inverse_lerp, lerp, quadratic_bezier, triangle_normal};
