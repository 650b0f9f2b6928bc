//! Canopy generators
//!
//! Each variant produces a self-contained `GeometryBuffer` in its own local
//! frame. The caller decides where the resulting child mesh is placed.

pub mod coniferous;
pub mod flat;
pub mod icosahedron;
pub mod round;

use rand::Rng;

use crate::core::{Error, Result};
use crate::mesh::color::{Color, palette};
use crate::mesh::GeometryBuffer;
use crate::procgen::params::{FoliageStyle, MIN_FOLIAGE_SIZE, TreeParams};
use crate::procgen::random::symmetric;
use crate::procgen::tree::TrunkProfile;

/// Color and size of one canopy
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FoliageShape {
    pub color: Color,
    pub width: f32,
    pub height: f32,
}

impl FoliageShape {
    /// Pick a color and jitter the configured size
    ///
    /// Each dimension is floored at `MIN_FOLIAGE_SIZE` before the tree scale
    /// and `attachment_scale` are applied.
    pub fn random<R: Rng + ?Sized>(
        params: &TreeParams,
        attachment_scale: f32,
        rng: &mut R,
    ) -> Self {
        let color = if params.foliage_colors.is_empty() {
            palette::GREEN
        } else {
            params.foliage_colors[rng.random_range(0..params.foliage_colors.len())]
        };
        let scale = params.scale * attachment_scale;
        let width = (params.foliage_width + symmetric(rng, params.foliage_width_variance))
            .max(MIN_FOLIAGE_SIZE)
            * scale;
        let height = (params.foliage_height + symmetric(rng, params.foliage_height_variance))
            .max(MIN_FOLIAGE_SIZE)
            * scale;
        Self { color, width, height }
    }
}

/// Canopy algorithm selected by `FoliageStyle`
#[derive(Clone, Copy, Debug)]
pub enum FoliageGenerator<'a> {
    Round,
    Flat,
    /// Built around the recorded trunk
    Coniferous(&'a TrunkProfile),
}

impl<'a> FoliageGenerator<'a> {
    /// Generator for `style`, or `None` for a bare tree
    pub fn for_style(
        style: FoliageStyle,
        profile: Option<&'a TrunkProfile>,
    ) -> Result<Option<Self>> {
        let generator = match style {
            FoliageStyle::None => return Ok(None),
            FoliageStyle::Round => FoliageGenerator::Round,
            FoliageStyle::Flat => FoliageGenerator::Flat,
            FoliageStyle::Coniferous => FoliageGenerator::Coniferous(profile.ok_or_else(|| {
                Error::InvalidParameter("coniferous foliage needs a recorded trunk profile".into())
            })?),
        };
        Ok(Some(generator))
    }

    /// Whether the canopy is expressed in tree space rather than at its attachment
    pub fn is_tree_space(&self) -> bool {
        matches!(self, FoliageGenerator::Coniferous(_))
    }

    pub fn generate<R: Rng + ?Sized>(
        &self,
        shape: &FoliageShape,
        rng: &mut R,
    ) -> Result<GeometryBuffer> {
        match self {
            FoliageGenerator::Round => round::generate(shape, rng),
            FoliageGenerator::Flat => flat::generate(shape, rng),
            FoliageGenerator::Coniferous(profile) => coniferous::generate(profile, shape, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procgen::random::tree_rng;

    #[test]
    fn test_shape_uses_palette() {
        let params = TreeParams {
            foliage_colors: vec![palette::DARK_GREEN, palette::YELLOW_GREEN],
            ..TreeParams::default()
        };
        let mut rng = tree_rng(5);
        for _ in 0..20 {
            let shape = FoliageShape::random(&params, 1.0, &mut rng);
            assert!(params.foliage_colors.contains(&shape.color));
        }
    }

    #[test]
    fn test_shape_defaults_to_green() {
        let params = TreeParams {
            foliage_colors: Vec::new(),
            ..TreeParams::default()
        };
        let shape = FoliageShape::random(&params, 1.0, &mut tree_rng(5));
        assert_eq!(shape.color, palette::GREEN);
    }

    #[test]
    fn test_shape_size_floor_and_scale() {
        let params = TreeParams {
            foliage_width: 1.0,
            foliage_width_variance: 5.0,
            foliage_height: 2.0,
            foliage_height_variance: 0.0,
            scale: 2.0,
            ..TreeParams::default()
        };
        let mut rng = tree_rng(11);
        for _ in 0..50 {
            let shape = FoliageShape::random(&params, 0.5, &mut rng);
            assert!(shape.width >= MIN_FOLIAGE_SIZE - 1e-6);
            assert!((shape.height - 2.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_for_style() {
        assert!(FoliageGenerator::for_style(FoliageStyle::None, None).unwrap().is_none());
        assert!(matches!(
            FoliageGenerator::for_style(FoliageStyle::Flat, None).unwrap(),
            Some(FoliageGenerator::Flat)
        ));
        assert!(FoliageGenerator::for_style(FoliageStyle::Coniferous, None).is_err());

        let profile = TrunkProfile::default();
        let generator = FoliageGenerator::for_style(FoliageStyle::Coniferous, Some(&profile))
            .unwrap()
            .unwrap();
        assert!(generator.is_tree_space());
    }
}
