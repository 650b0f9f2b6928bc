//! Coniferous canopy: tiered rings wrapped around the recorded trunk
//!
//! Built in tree space. Starting a few segments up the trunk, every recorded
//! segment adds a narrow inner ring followed by a wide outer ring, giving the
//! stacked whorl silhouette of a conifer. The ring below each inner ring is
//! nudged outward, twice as far on alternating vertices, so the edges of the
//! tiers look jagged.

use rand::Rng;

use crate::core::{Error, Result};
use crate::math::lerp;
use crate::mesh::{DiscFacing, GeometryBuffer};
use crate::procgen::foliage::FoliageShape;
use crate::procgen::tree::TrunkProfile;

pub const NUM_SIDES: u32 = 6;
/// First recorded trunk segment that carries foliage
pub const START_LAYER: usize = 2;
const SMALL_FIRST_LAYER_CHANCE: f32 = 0.5;
const SHIFT_FACTOR: f32 = 0.1;

/// Push the ring below the most recent one away from it
fn shift_previous_ring(buffer: &mut GeometryBuffer, layer: usize) -> Result<()> {
    let start = buffer.tail_start(2 * NUM_SIDES as usize, "shift_previous_ring")? + NUM_SIDES;
    for i in 0..NUM_SIDES {
        let top = start + i;
        let bottom = top - NUM_SIDES;
        let shift = (buffer.position(bottom)? - buffer.position(top)?) * SHIFT_FACTOR;
        let shift = if (i as usize + layer) % 2 == 0 { shift * 2.0 } else { shift };
        buffer.displace_vertex(bottom, shift)?;
    }
    Ok(())
}

pub fn generate<R: Rng + ?Sized>(
    profile: &TrunkProfile,
    shape: &FoliageShape,
    rng: &mut R,
) -> Result<GeometryBuffer> {
    let layers = profile.len();
    if layers == 0 || profile.positions.len() <= layers || profile.rotations.len() < layers {
        return Err(Error::PreconditionViolation {
            operation: "coniferous foliage",
            required: layers.max(1) + 1,
            available: profile.positions.len(),
        });
    }
    let apex = profile.positions[profile.positions.len() - 1];

    let width = shape.width;
    let color = shape.color;
    let start = START_LAYER.min(layers - 1);
    let small_first = rng.random::<f32>() < SMALL_FIRST_LAYER_CHANCE;

    let mut buffer = GeometryBuffer::new();
    let mut radius = profile.radii[start] + width;
    if small_first {
        radius -= width / 2.0;
    }
    let mut previous_rotation = profile.rotations[start];
    buffer.add_ring(NUM_SIDES, profile.positions[start], radius, previous_rotation, color);
    buffer.add_disc(NUM_SIDES, DiscFacing::Down)?;

    for i in start + 1..layers {
        let foliage_radius = lerp(width, 0.0, (i - start - 1) as f32 / layers as f32);
        let trunk_radius = profile.radii[i];
        let small = small_first && i == start + 1;
        let inner = trunk_radius + foliage_radius / if small { 4.0 } else { 2.0 };
        let outer = trunk_radius + foliage_radius;
        let position = profile.positions[i];
        let rotation = profile.rotations[i];

        buffer.add_ring(NUM_SIDES, position, inner, previous_rotation, color);
        buffer.connect_rings(NUM_SIDES)?;
        shift_previous_ring(&mut buffer, i)?;

        buffer.add_ring(NUM_SIDES, position, outer, rotation, color);
        buffer.connect_rings(NUM_SIDES)?;
        previous_rotation = rotation;
    }

    buffer.add_cap(NUM_SIDES, apex, color)?;
    Ok(buffer)
}
