//! Round canopy: a randomly oriented, lumpy icosahedron
//!
//! The unit icosahedron is stretched into an ellipsoid-like blob whose radius
//! runs from `width` at the equator to `height` at the poles, then every
//! vertex is pushed in or out along its own direction. The push is limited to
//! a third of the distance to the nearest neighbor and the final radius stays
//! within `[0.8, 1.2]` of the undisplaced one, so faces never fold over.

use rand::Rng;

use crate::core::Result;
use crate::math::lerp;
use crate::mesh::GeometryBuffer;
use crate::procgen::foliage::FoliageShape;
use crate::procgen::foliage::icosahedron;
use crate::procgen::random::{random_rotation, symmetric};

/// Canopies at least this wide and tall get the finer mesh
const SUBDIVIDE_MIN_SIZE: f32 = 3.0;
/// Width/height difference that also triggers subdivision
const SUBDIVIDE_MIN_ASPECT_DIFFERENCE: f32 = 1.0;
const NEIGHBOR_DISPLACEMENT_FRACTION: f32 = 1.0 / 3.0;
pub const MIN_RADIUS_FACTOR: f32 = 0.8;
pub const MAX_RADIUS_FACTOR: f32 = 1.2;

/// Whether a canopy of this size uses the once-subdivided icosahedron
pub fn needs_subdivision(width: f32, height: f32) -> bool {
    width.min(height) >= SUBDIVIDE_MIN_SIZE
        || (width - height).abs() >= SUBDIVIDE_MIN_ASPECT_DIFFERENCE
}

/// Undisplaced radius along a unit direction
pub fn ellipsoid_radius(width: f32, height: f32, direction_y: f32) -> f32 {
    lerp(width, height, direction_y.abs())
}

pub fn generate<R: Rng + ?Sized>(shape: &FoliageShape, rng: &mut R) -> Result<GeometryBuffer> {
    let rotation = random_rotation(rng);
    let mut directions: Vec<_> = icosahedron::unit_vertices()
        .into_iter()
        .map(|v| (rotation * v).normalize())
        .collect();

    let faces = if needs_subdivision(shape.width, shape.height) {
        icosahedron::subdivide(&mut directions, &icosahedron::FACES)
    } else {
        icosahedron::FACES.to_vec()
    };

    let radii: Vec<f32> = directions
        .iter()
        .map(|d| ellipsoid_radius(shape.width, shape.height, d.y))
        .collect();
    let shaped: Vec<_> = directions.iter().zip(&radii).map(|(d, r)| *d * *r).collect();
    let neighbors = icosahedron::neighbors(directions.len(), &faces);

    let mut buffer = GeometryBuffer::new();
    for (i, direction) in directions.iter().enumerate() {
        let nearest = neighbors[i]
            .iter()
            .map(|&n| shaped[i].distance(shaped[n as usize]))
            .fold(f32::INFINITY, f32::min);
        let nearest = if nearest.is_finite() { nearest } else { 0.0 };

        let radius = radii[i];
        let displaced = (radius + symmetric(rng, nearest * NEIGHBOR_DISPLACEMENT_FRACTION))
            .clamp(MIN_RADIUS_FACTOR * radius, MAX_RADIUS_FACTOR * radius);
        buffer.add_vertex(*direction * displaced, shape.color);
    }

    for [a, b, c] in faces {
        buffer.add_triangle(a, b, c)?;
    }
    Ok(buffer)
}
