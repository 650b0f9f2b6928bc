//! Scalar interpolation, bezier curves and triangle helpers

use crate::core::types::Vec3;

/// Linear interpolation, unclamped
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Position of `value` between `a` and `b`, clamped to [0, 1]
///
/// Returns 0 when the range is empty.
#[inline]
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if a == b {
        return 0.0;
    }
    ((value - a) / (b - a)).clamp(0.0, 1.0)
}

/// Point on the quadratic bezier through `a`, control `b`, end `c`
pub fn quadratic_bezier(t: f32, a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    let v = 1.0 - t;
    a * (v * v) + b * (2.0 * v * t) + c * (t * t)
}

/// Unit normal of triangle (a, b, c), front face counter-clockwise
///
/// Degenerate triangles yield `Vec3::ZERO`.
pub fn triangle_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (b - a).cross(c - a).normalize_or_zero()
}
