//! Secondary branches grown from trunk side faces

use glam::{Quat, Vec3};
use rand::Rng;

use crate::core::Result;
use crate::math::lerp;
use crate::procgen::params::{TreeParams, roundness_for_radius};
use crate::procgen::random::random_twist;
use crate::procgen::tree::{FoliageAttachment, TreeBuild};

/// Tip radius relative to the branch's starting radius
pub const TIP_RADIUS_FACTOR: f32 = 0.2;
/// Fraction of the branch after which it bends towards vertical
const STRAIGHTEN_START: f32 = 0.5;

/// A branch queued while the trunk is being built
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BranchSpawn {
    /// Center of the trunk face the branch grows from
    pub origin: Vec3,
    /// Outward normal of that face
    pub direction: Vec3,
    pub radius: f32,
    pub segment_length: f32,
    /// Trunk segment the branch grows from
    pub segment: u32,
    /// Trunk segments left above the spawn point
    pub segments: u32,
}

/// Grows one tapering, twisting tube into the tree's shared buffer
///
/// Branches end in a cap and, depending on the foliage style, a canopy
/// scaled by the branch's thickness relative to the trunk. They never spawn
/// further branches.
#[derive(Clone, Debug)]
pub struct BranchGenerator {
    spawn: BranchSpawn,
    direction: Vec3,
    rotation: Quat,
    num_sides: u32,
}

impl BranchGenerator {
    pub fn new(spawn: BranchSpawn, params: &TreeParams) -> Self {
        let direction = spawn.direction.try_normalize().unwrap_or(Vec3::Y);
        Self {
            spawn,
            direction,
            rotation: Quat::from_rotation_arc(Vec3::Y, direction),
            num_sides: roundness_for_radius(spawn.radius / params.scale),
        }
    }

    pub fn num_sides(&self) -> u32 {
        self.num_sides
    }

    pub fn generate<R: Rng + ?Sized>(&self, tree: &mut TreeBuild<'_>, rng: &mut R) -> Result<()> {
        let params = tree.params;
        let spawn = &self.spawn;
        let sides = self.num_sides;
        let segments = spawn.segments.max(1);

        tree.add_bark_ring(sides, spawn.origin, spawn.radius, self.rotation);

        let mut position = spawn.origin;
        let mut rotation = self.rotation;
        let mut direction = self.direction;
        for step in 0..segments {
            let t = (step + 1) as f32 / segments as f32;
            let radius = lerp(spawn.radius, spawn.radius * TIP_RADIUS_FACTOR, t);
            rotation = self.rotation.slerp(random_twist(rng, params.twisting), t);
            if t > STRAIGHTEN_START {
                let bend = (t - STRAIGHTEN_START) / (1.0 - STRAIGHTEN_START);
                direction = self
                    .direction
                    .lerp(Vec3::Y, bend)
                    .try_normalize()
                    .unwrap_or(Vec3::Y);
            }
            position += direction * spawn.segment_length;

            tree.add_bark_ring(sides, position, radius, rotation);
            tree.buffer.connect_rings(sides)?;
        }

        let apex = position + direction * spawn.segment_length;
        tree.buffer.add_cap(sides, apex, params.bark_color)?;

        let attachment = FoliageAttachment {
            position: apex,
            orientation: rotation,
            scale: spawn.radius / (params.thickness * params.scale),
        };
        log::trace!(
            "Branch at {:?}: {} segments, {} sides, foliage scale {:.2}",
            spawn.origin,
            segments,
            sides,
            attachment.scale
        );
        tree.attach_foliage(attachment, None, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procgen::params::FoliageStyle;
    use crate::procgen::random::tree_rng;

    fn spawn(segments: u32) -> BranchSpawn {
        BranchSpawn {
            origin: Vec3::new(0.5, 4.0, 0.0),
            direction: Vec3::new(1.0, 0.2, 0.0),
            radius: 0.3,
            segment_length: 1.0,
            segment: 4,
            segments,
        }
    }

    #[test]
    fn test_branch_counts() {
        let params = TreeParams {
            foliage_style: FoliageStyle::None,
            ..TreeParams::default()
        };
        for segments in 1..6 {
            let mut tree = TreeBuild::new(&params);
            let generator = BranchGenerator::new(spawn(segments), &params);
            let n = generator.num_sides() as usize;
            generator.generate(&mut tree, &mut tree_rng(segments as u64)).unwrap();

            let rings = segments as usize + 1;
            assert_eq!(tree.buffer.vertex_count(), n * rings + 1);
            assert_eq!(tree.buffer.triangle_count(), 2 * n * segments as usize + n);
            assert!(tree.foliage.is_empty());
        }
    }

    #[test]
    fn test_thin_branch_has_fewer_sides() {
        let params = TreeParams {
            thickness: 4.0,
            ..TreeParams::default()
        };
        let generator = BranchGenerator::new(spawn(3), &params);
        assert!(generator.num_sides() < params.num_sides());
        assert_eq!(generator.num_sides(), 4);
    }

    #[test]
    fn test_branch_tapers_and_straightens() {
        let params = TreeParams {
            foliage_style: FoliageStyle::None,
            twisting: 0.0,
            ..TreeParams::default()
        };
        let mut tree = TreeBuild::new(&params);
        let generator = BranchGenerator::new(spawn(4), &params);
        let n = generator.num_sides() as usize;
        generator.generate(&mut tree, &mut tree_rng(1)).unwrap();

        let positions = tree.buffer.positions();
        let last_ring = &positions[4 * n..5 * n];
        let center = last_ring.iter().copied().sum::<Vec3>() / n as f32;
        for p in last_ring {
            assert!(((*p - center).length() - 0.3 * TIP_RADIUS_FACTOR).abs() < 1e-4);
        }
        // Final segment runs straight up
        let apex = positions[5 * n];
        let up = (apex - center).normalize();
        assert!(up.dot(Vec3::Y) > 0.999);
    }

    #[test]
    fn test_branch_foliage_scaled_by_radius() {
        let params = TreeParams {
            foliage_colors: Vec::new(),
            ..TreeParams::default()
        };
        let mut tree = TreeBuild::new(&params);
        BranchGenerator::new(spawn(2), &params)
            .generate(&mut tree, &mut tree_rng(6))
            .unwrap();
        assert_eq!(tree.foliage.len(), 1);
        let apex = *tree.buffer.positions().last().unwrap();
        assert_eq!(tree.foliage[0].transform.position, apex);
    }
}
