//! Main trunk generation
//!
//! The trunk is grown ring by ring from a flared, closed base. Along the
//! middle of the trunk, side faces may queue branches, which are grown into
//! the same buffer once the trunk itself is finished. The trunk ends either
//! in a cap with a canopy or, for stumps, in a splintered two-tone top.

use glam::{Quat, Vec3};
use rand::Rng;

use crate::core::Result;
use crate::math::{lerp, triangle_normal};
use crate::mesh::{CommitOptions, DiscFacing, GeometryBuffer};
use crate::procgen::branch::{BranchGenerator, BranchSpawn};
use crate::procgen::params::TreeParams;
use crate::procgen::random::{horizontal_jitter, random_twist};
use crate::procgen::tree::{BASE_THICKNESS_MULTIPLIER, FoliageAttachment, TreeBuild, TrunkProfile};
use crate::scene::MeshSink;

/// Inner stump ring radius relative to the last trunk ring
pub const STUMP_INNER_RING_RADIUS: f32 = 0.8;
pub const MIN_SPLINTER_HEIGHT: f32 = 0.05;
pub const MAX_SPLINTER_HEIGHT: f32 = 0.3;
/// Trunk height fraction range in which branches may sprout
pub const BRANCH_WINDOW: (f32, f32) = (0.33, 0.9);
pub const BRANCH_CHANCE: f32 = 0.5;
/// Smallest segment count of a stump
const MIN_STUMP_SEGMENTS: u32 = 2;

/// Summary of one generated tree
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GenerationReport {
    pub is_stump: bool,
    /// Sides per trunk ring
    pub num_sides: u32,
    /// Trunk segments actually grown
    pub segments: u32,
    /// Branches grown after the trunk, in growth order
    pub branches: Vec<BranchSpawn>,
    /// Branch attempts rejected because the chosen face pointed down
    pub branches_skipped: usize,
    pub foliage: usize,
    /// Wood mesh vertices (trunk and branches)
    pub vertices: usize,
    pub triangles: usize,
}

/// Grows a complete tree into a mesh sink
///
/// The sink is only written once every part of the tree has been built; a
/// failed generation leaves it untouched.
pub struct TrunkGenerator<'a, S: MeshSink + ?Sized> {
    params: &'a TreeParams,
    sink: &'a mut S,
    options: CommitOptions,
}

impl<'a, S: MeshSink + ?Sized> TrunkGenerator<'a, S> {
    pub fn new(params: &'a TreeParams, sink: &'a mut S) -> Self {
        Self {
            params,
            sink,
            options: CommitOptions::default(),
        }
    }

    pub fn with_commit_options(mut self, options: CommitOptions) -> Self {
        self.options = options;
        self
    }

    pub fn generate<R: Rng + ?Sized>(self, rng: &mut R) -> Result<GenerationReport> {
        let params = self.params;
        params.validate()?;

        let num_sides = params.num_sides();
        let expected = params.num_segments();
        let base_radius = params.thickness * params.scale;
        let mut tree = TreeBuild::new(params);

        let base_ring_radius = base_radius * BASE_THICKNESS_MULTIPLIER;
        tree.add_bark_ring(num_sides, Vec3::ZERO, base_ring_radius, Quat::IDENTITY);
        tree.buffer.add_disc(num_sides, DiscFacing::Down)?;

        let is_stump = params.stump_chance > 0.0 && rng.random::<f32>() <= params.stump_chance;
        let segments = if is_stump {
            stump_segment_count(expected, rng)
        } else {
            expected
        };
        let segment_length = params.height * params.scale / expected as f32;

        let mut profile = TrunkProfile::default();
        let mut position = Vec3::ZERO;
        for i in 0..segments {
            let rotation = random_twist(rng, params.twisting);
            position += rotation * Vec3::Y * segment_length + horizontal_jitter(rng, params.scale);
            profile.positions.push(position);
            profile.rotations.push(rotation);
            profile.radii.push(lerp(base_radius, 0.0, i as f32 / expected as f32));
        }

        let mut report = GenerationReport {
            is_stump,
            num_sides,
            segments,
            ..Default::default()
        };
        let mut branches = Vec::new();
        for i in 0..segments as usize {
            let (position, radius) = (profile.positions[i], profile.radii[i]);
            tree.add_bark_ring(num_sides, position, radius, profile.rotations[i]);
            tree.buffer.connect_rings(num_sides)?;

            if !params.foliage_style.allows_branches() {
                continue;
            }
            let fraction = i as f32 / expected as f32;
            if fraction >= BRANCH_WINDOW.0
                && fraction <= BRANCH_WINDOW.1
                && rng.random::<f32>() < BRANCH_CHANCE
            {
                let segment = i as u32;
                let spawn = branch_spawn(
                    &tree.buffer,
                    num_sides,
                    segment_length,
                    segment,
                    segments - segment,
                    rng,
                )?;
                match spawn {
                    Some(spawn) => branches.push(spawn),
                    None => report.branches_skipped += 1,
                }
            }
        }

        let last = segments as usize - 1;
        let (top, top_rotation, top_radius) =
            (profile.positions[last], profile.rotations[last], profile.radii[last]);
        if is_stump {
            add_stump_top(&mut tree, num_sides, top, top_radius, top_rotation, rng)?;
        } else {
            let apex = top + top_rotation * Vec3::Y * segment_length;
            tree.buffer.add_cap(num_sides, apex, params.bark_color)?;
            profile.positions.push(apex);
            let attachment = FoliageAttachment {
                position: apex,
                orientation: top_rotation,
                scale: 1.0,
            };
            tree.attach_foliage(attachment, Some(&profile), rng)?;
        }

        for spawn in &branches {
            BranchGenerator::new(*spawn, params).generate(&mut tree, rng)?;
        }

        report.branches = branches;
        report.foliage = tree.foliage.len();
        report.vertices = tree.buffer.vertex_count();
        report.triangles = tree.buffer.triangle_count();
        log::debug!(
            "Generated {} with {} segments x {} sides: {} branches ({} skipped), \
             {} canopies, {} vertices, {} triangles",
            if is_stump { "stump" } else { "tree" },
            segments,
            num_sides,
            report.branches.len(),
            report.branches_skipped,
            report.foliage,
            report.vertices,
            report.triangles
        );

        tree.commit(self.sink, &self.options);
        Ok(report)
    }
}

/// Segment count of a stump: in `[2, expected / 2)`, never above `expected`
fn stump_segment_count<R: Rng + ?Sized>(expected: u32, rng: &mut R) -> u32 {
    let upper = expected / 2;
    let count = if upper > MIN_STUMP_SEGMENTS {
        rng.random_range(MIN_STUMP_SEGMENTS..upper)
    } else {
        MIN_STUMP_SEGMENTS
    };
    count.min(expected)
}

/// Try to queue a branch on a random side face of the newest trunk section
///
/// Returns `None` when the chosen face points downward.
fn branch_spawn<R: Rng + ?Sized>(
    buffer: &GeometryBuffer,
    num_sides: u32,
    segment_length: f32,
    segment: u32,
    remaining: u32,
    rng: &mut R,
) -> Result<Option<BranchSpawn>> {
    let ring_start = buffer.tail_start(2 * num_sides as usize, "branch_spawn")?;
    let face = rng.random_range(0..num_sides);

    let i = ring_start + face;
    let j = if face + 1 < num_sides { i + 1 } else { ring_start };
    let (lower_i, upper_i) = (buffer.position(i)?, buffer.position(i + num_sides)?);
    let (lower_j, upper_j) = (buffer.position(j)?, buffer.position(j + num_sides)?);

    let normal = triangle_normal(upper_i, upper_j, lower_i);
    if normal.y <= 0.0 {
        return Ok(None);
    }

    let left = lower_i.lerp(upper_i, 0.5);
    let right = lower_j.lerp(upper_j, 0.5);
    Ok(Some(BranchSpawn {
        origin: left.lerp(right, 0.5),
        direction: normal,
        radius: left.distance(right) / 2.0,
        segment_length,
        segment,
        segments: remaining,
    }))
}

/// Close a stump with splinters and a wood-colored cross-section
fn add_stump_top<R: Rng + ?Sized>(
    tree: &mut TreeBuild<'_>,
    num_sides: u32,
    top: Vec3,
    radius: f32,
    rotation: Quat,
    rng: &mut R,
) -> Result<()> {
    let params = tree.params;
    let outer_start = tree.buffer.tail_start(num_sides as usize, "add_stump_top")?;
    let inner_radius = radius * STUMP_INNER_RING_RADIUS;

    tree.add_bark_ring(num_sides, top, inner_radius, rotation);
    let up = rotation * Vec3::Y;
    for side in 0..num_sides {
        let height = rng.random_range(MIN_SPLINTER_HEIGHT..MAX_SPLINTER_HEIGHT) * params.scale;
        add_splinter(&mut tree.buffer, outer_start, num_sides, side, up * height, params)?;
    }

    tree.buffer
        .add_ring(num_sides, top, inner_radius, rotation, params.wood_color);
    tree.buffer.add_disc(num_sides, DiscFacing::Up)
}

/// Raised box over one side of the outer and inner stump rings
///
/// Adds 4 vertices and 10 triangles.
fn add_splinter(
    buffer: &mut GeometryBuffer,
    outer_start: u32,
    num_sides: u32,
    side: u32,
    offset: Vec3,
    params: &TreeParams,
) -> Result<()> {
    let current_outer = outer_start + side;
    let next_outer = if side + 1 < num_sides { current_outer + 1 } else { outer_start };
    let current_inner = current_outer + num_sides;
    let next_inner = next_outer + num_sides;

    let color = params.bark_color;
    let current_outer_top = buffer.add_vertex(buffer.position(current_outer)? + offset, color);
    let next_outer_top = buffer.add_vertex(buffer.position(next_outer)? + offset, color);
    let current_inner_top = buffer.add_vertex(buffer.position(current_inner)? + offset, color);
    let next_inner_top = buffer.add_vertex(buffer.position(next_inner)? + offset, color);

    buffer.add_rectangle(current_inner_top, next_inner_top, next_outer_top, current_outer_top)?;
    buffer.add_rectangle(next_inner_top, current_inner_top, current_inner, next_inner)?;
    buffer.add_rectangle(current_outer_top, next_outer_top, next_outer, current_outer)?;
    buffer.add_rectangle(current_inner_top, current_outer_top, current_outer, current_inner)?;
    buffer.add_rectangle(next_outer_top, next_inner_top, next_inner, next_outer)
}
