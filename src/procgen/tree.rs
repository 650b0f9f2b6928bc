//! Behaviour shared by the trunk and branch generators
//!
//! A `TreeBuild` is the arena for one tree: the wood geometry buffer that the
//! trunk and all of its branches append to, plus the canopies generated along
//! the way. Canopies are kept as pending buffers and only reach the sink in
//! `commit`, after every generator has succeeded.

use glam::{Quat, Vec3};
use rand::Rng;

use crate::core::Result;
use crate::mesh::{CommitOptions, GeometryBuffer};
use crate::procgen::foliage::{FoliageGenerator, FoliageShape};
use crate::procgen::params::TreeParams;
use crate::scene::{LocalTransform, MeshSink};

/// Ring radius multiplier at the very bottom of the trunk
pub const BASE_THICKNESS_MULTIPLIER: f32 = 1.5;

/// Child mesh name for canopies
pub const FOLIAGE_NODE_NAME: &str = "Foliage";

/// Where a canopy is placed, in tree space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FoliageAttachment {
    pub position: Vec3,
    pub orientation: Quat,
    /// Canopy size relative to the trunk-tip canopy
    pub scale: f32,
}

/// Per-segment trunk poses recorded while growing the trunk
///
/// `positions` has one more entry than `rotations` and `radii`: the last one
/// is the apex of the trunk cap.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrunkProfile {
    pub positions: Vec<Vec3>,
    pub rotations: Vec<Quat>,
    pub radii: Vec<f32>,
}

impl TrunkProfile {
    /// Number of recorded segments
    pub fn len(&self) -> usize {
        self.radii.len()
    }

    pub fn is_empty(&self) -> bool {
        self.radii.is_empty()
    }
}

/// A generated canopy waiting for the tree to finish
#[derive(Clone, Debug)]
pub struct PendingFoliage {
    pub transform: LocalTransform,
    pub buffer: GeometryBuffer,
}

/// Shared state of one tree under construction
pub struct TreeBuild<'a> {
    pub params: &'a TreeParams,
    pub buffer: GeometryBuffer,
    pub foliage: Vec<PendingFoliage>,
}

impl<'a> TreeBuild<'a> {
    pub fn new(params: &'a TreeParams) -> Self {
        Self {
            params,
            buffer: GeometryBuffer::new(),
            foliage: Vec::new(),
        }
    }

    /// Append a bark-colored ring to the wood buffer
    pub fn add_bark_ring(
        &mut self,
        num_sides: u32,
        center: Vec3,
        radius: f32,
        orientation: Quat,
    ) -> u32 {
        self.buffer
            .add_ring(num_sides, center, radius, orientation, self.params.bark_color)
    }

    /// Generate a canopy for the configured style
    ///
    /// Does nothing for `FoliageStyle::None`. Coniferous canopies are built in
    /// tree space from `profile` and placed at the tree origin; the other
    /// styles sit at the attachment pose.
    pub fn attach_foliage<R: Rng + ?Sized>(
        &mut self,
        attachment: FoliageAttachment,
        profile: Option<&TrunkProfile>,
        rng: &mut R,
    ) -> Result<()> {
        let style = self.params.foliage_style;
        let Some(generator) = FoliageGenerator::for_style(style, profile)? else {
            return Ok(());
        };

        let shape = FoliageShape::random(self.params, attachment.scale, rng);
        let buffer = generator.generate(&shape, rng)?;
        let transform = if generator.is_tree_space() {
            LocalTransform::identity()
        } else {
            LocalTransform::from_position_rotation(attachment.position, attachment.orientation)
        };

        log::trace!(
            "{} foliage at {:?}: {:.2}x{:.2}, {} vertices",
            self.params.foliage_style,
            attachment.position,
            shape.width,
            shape.height,
            buffer.vertex_count()
        );
        self.foliage.push(PendingFoliage { transform, buffer });
        Ok(())
    }

    /// Write the wood mesh and every canopy into `sink`
    pub fn commit<S: MeshSink + ?Sized>(&self, sink: &mut S, options: &CommitOptions) {
        sink.clear();
        self.buffer.commit(&mut *sink, options);
        for foliage in &self.foliage {
            let child = sink.create_child(FOLIAGE_NODE_NAME, foliage.transform);
            foliage.buffer.commit(child, options);
        }
    }
}
