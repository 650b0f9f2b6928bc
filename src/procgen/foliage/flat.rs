//! Flat canopy: a fan of double-sided leaf blades
//!
//! Each blade follows a quadratic bezier midline out along its local X axis,
//! rising to half the canopy height in the middle. The blade is widest at the
//! middle and closes to a single vertex at both base and tip. Interior
//! segments may carry a notch on either edge.

use std::f32::consts::TAU;

use glam::{Quat, Vec3};
use rand::Rng;

use crate::core::Result;
use crate::math::quadratic_bezier;
use crate::mesh::GeometryBuffer;
use crate::procgen::foliage::FoliageShape;

pub const NUM_BLADES: u32 = 5;
pub const SEGMENT_COUNT: u32 = 6;
const NOTCH_CHANCE: f32 = 0.3;
const MIN_NOTCH_DEPTH: f32 = 0.25;
const MAX_NOTCH_DEPTH: f32 = 0.5;
/// Blade half-width at its widest, relative to the canopy width
const MAX_HALF_WIDTH_FRACTION: f32 = 0.25;

/// How the interior segments of one blade were built
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BladeStats {
    pub plain: usize,
    /// One notched edge
    pub notched: usize,
    /// Split at the midpoint, one notch per half
    pub split: usize,
}

/// Rotation of blade `index` around the vertical axis
pub fn blade_rotation(index: u32) -> Quat {
    Quat::from_rotation_y(TAU * index as f32 / NUM_BLADES as f32)
}

fn midline(t: f32, width: f32, height: f32) -> Vec3 {
    quadratic_bezier(
        t,
        Vec3::ZERO,
        Vec3::new(width * 0.5, height, 0.0),
        Vec3::new(width, 0.0, 0.0),
    )
}

fn half_width(t: f32, width: f32) -> f32 {
    MAX_HALF_WIDTH_FRACTION * width * (1.0 - 2.0 * (t - 0.5).abs())
}

fn add_two_sided_triangle(buffer: &mut GeometryBuffer, a: u32, b: u32, c: u32) -> Result<()> {
    buffer.add_triangle(a, b, c)?;
    buffer.add_triangle(c, b, a)
}

fn add_two_sided_rectangle(
    buffer: &mut GeometryBuffer,
    a: u32,
    b: u32,
    c: u32,
    d: u32,
) -> Result<()> {
    add_two_sided_triangle(buffer, a, b, c)?;
    add_two_sided_triangle(buffer, c, d, a)
}

/// Quad with a notch cut into edge `e0 -> e1`; `f0 -> f1` is the opposite edge
///
/// Adds 3 vertices and 10 triangles.
fn add_notched_quad<R: Rng + ?Sized>(
    buffer: &mut GeometryBuffer,
    (e0, e1): (u32, u32),
    (f0, f1): (u32, u32),
    rng: &mut R,
) -> Result<()> {
    let (pe0, pe1) = (buffer.position(e0)?, buffer.position(e1)?);
    let (pf0, pf1) = (buffer.position(f0)?, buffer.position(f1)?);
    let color = buffer.colors()[e0 as usize];

    let start = rng.random_range(0.1..0.4);
    let end = rng.random_range(0.6..0.9);
    let deepest = rng.random_range(start..end);
    let depth = rng.random_range(MIN_NOTCH_DEPTH..MAX_NOTCH_DEPTH);

    let edge_point = |t: f32| pe0.lerp(pe1, t);
    let mid_point = |t: f32| ((pe0 + pf0) * 0.5).lerp((pe1 + pf1) * 0.5, t);

    let a = buffer.add_vertex(edge_point(start), color);
    let c = buffer.add_vertex(edge_point(deepest).lerp(mid_point(deepest), depth), color);
    let b = buffer.add_vertex(edge_point(end), color);

    add_two_sided_triangle(buffer, f0, a, e0)?;
    add_two_sided_triangle(buffer, f0, c, a)?;
    add_two_sided_triangle(buffer, f0, f1, c)?;
    add_two_sided_triangle(buffer, f1, b, c)?;
    add_two_sided_triangle(buffer, f1, e1, b)
}

/// Append one blade rotated by `rotation`
pub fn add_blade<R: Rng + ?Sized>(
    buffer: &mut GeometryBuffer,
    shape: &FoliageShape,
    rotation: Quat,
    rng: &mut R,
) -> Result<BladeStats> {
    let (width, height, color) = (shape.width, shape.height, shape.color);
    let point = |t: f32, side: f32| {
        rotation * (midline(t, width, height) + Vec3::Z * side * half_width(t, width))
    };

    let base = buffer.add_vertex(point(0.0, 0.0), color);
    let edges: Vec<(u32, u32)> = (1..SEGMENT_COUNT)
        .map(|k| {
            let t = k as f32 / SEGMENT_COUNT as f32;
            let left = buffer.add_vertex(point(t, 1.0), color);
            let right = buffer.add_vertex(point(t, -1.0), color);
            (left, right)
        })
        .collect();
    let tip = buffer.add_vertex(point(1.0, 0.0), color);

    let (Some(&(first_left, first_right)), Some(&(last_left, last_right))) =
        (edges.first(), edges.last())
    else {
        return Ok(BladeStats::default());
    };
    add_two_sided_triangle(buffer, base, first_left, first_right)?;

    let mut stats = BladeStats::default();
    for pair in edges.windows(2) {
        let ((l0, r0), (l1, r1)) = (pair[0], pair[1]);
        let notch_left = rng.random::<f32>() < NOTCH_CHANCE;
        let notch_right = rng.random::<f32>() < NOTCH_CHANCE;
        match (notch_left, notch_right) {
            (false, false) => {
                add_two_sided_rectangle(buffer, l0, l1, r1, r0)?;
                stats.plain += 1;
            }
            (true, false) => {
                add_notched_quad(buffer, (l0, l1), (r0, r1), rng)?;
                stats.notched += 1;
            }
            (false, true) => {
                add_notched_quad(buffer, (r0, r1), (l0, l1), rng)?;
                stats.notched += 1;
            }
            (true, true) => {
                let left_mid = buffer.position(l0)?.lerp(buffer.position(l1)?, 0.5);
                let right_mid = buffer.position(r0)?.lerp(buffer.position(r1)?, 0.5);
                let lm = buffer.add_vertex(left_mid, color);
                let rm = buffer.add_vertex(right_mid, color);
                add_notched_quad(buffer, (l0, lm), (r0, rm), rng)?;
                add_notched_quad(buffer, (rm, r1), (lm, l1), rng)?;
                stats.split += 1;
            }
        }
    }

    add_two_sided_triangle(buffer, last_left, tip, last_right)?;
    Ok(stats)
}

pub fn generate<R: Rng + ?Sized>(shape: &FoliageShape, rng: &mut R) -> Result<GeometryBuffer> {
    let mut buffer = GeometryBuffer::new();
    for index in 0..NUM_BLADES {
        let stats = add_blade(&mut buffer, shape, blade_rotation(index), rng)?;
        log::trace!("Blade {index}: {stats:?}");
    }
    Ok(buffer)
}
