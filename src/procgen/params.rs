//! Tree shape parameters and presets

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::math::{inverse_lerp, lerp};
use crate::mesh::color::{Color, palette};

pub const MIN_ROUNDNESS: u32 = 4;
pub const MAX_ROUNDNESS: u32 = 8;
pub const MIN_SEGMENTS: u32 = 3;
pub const MAX_SEGMENTS: u32 = 8;
pub const MIN_THICKNESS: f32 = 0.25;
pub const MAX_THICKNESS: f32 = 4.0;
pub const MIN_HEIGHT: f32 = 5.0;
pub const MAX_HEIGHT: f32 = 25.0;
pub const MIN_FOLIAGE_SIZE: f32 = 1.0;
pub const MAX_FOLIAGE_SIZE: f32 = 10.0;
pub const MAX_FOLIAGE_VARIANCE: f32 = 5.0;

/// Canopy shape algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoliageStyle {
    /// Bare tree, no canopy
    None,
    /// Lumpy icosahedral blob
    #[default]
    Round,
    /// Fan of bezier leaf blades
    Flat,
    /// Tiered rings following the trunk
    Coniferous,
}

impl FoliageStyle {
    pub const ALL: [FoliageStyle; 4] = [
        FoliageStyle::None,
        FoliageStyle::Round,
        FoliageStyle::Flat,
        FoliageStyle::Coniferous,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FoliageStyle::None => "none",
            FoliageStyle::Round => "round",
            FoliageStyle::Flat => "flat",
            FoliageStyle::Coniferous => "coniferous",
        }
    }

    /// Whether the trunk may sprout secondary branches with this canopy
    pub fn allows_branches(self) -> bool {
        matches!(self, FoliageStyle::Round | FoliageStyle::None)
    }
}

impl fmt::Display for FoliageStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FoliageStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        FoliageStyle::ALL
            .into_iter()
            .find(|style| style.name() == lower)
            .ok_or_else(|| Error::UnsupportedFoliageStyle(s.to_string()))
    }
}

/// Named parameter sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreePreset {
    Deciduous,
    Palm,
    Pine,
    /// Always a broken stump
    DeadStump,
    /// Branching tree without a canopy
    Bare,
}

impl TreePreset {
    pub const ALL: [TreePreset; 5] = [
        TreePreset::Deciduous,
        TreePreset::Palm,
        TreePreset::Pine,
        TreePreset::DeadStump,
        TreePreset::Bare,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TreePreset::Deciduous => "deciduous",
            TreePreset::Palm => "palm",
            TreePreset::Pine => "pine",
            TreePreset::DeadStump => "dead-stump",
            TreePreset::Bare => "bare",
        }
    }

    pub fn params(self) -> TreeParams {
        TreeParams::from_preset(self)
    }
}

impl fmt::Display for TreePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TreePreset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase().replace('_', "-");
        TreePreset::ALL
            .into_iter()
            .find(|preset| preset.name() == lower)
            .ok_or_else(|| Error::InvalidParameter(format!("unknown preset '{s}'")))
    }
}

/// Parameters for one tree
///
/// Lengths are in world units before `scale` is applied. Angles are degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeParams {
    /// Trunk height
    pub height: f32,
    /// Trunk radius at the base
    pub thickness: f32,
    /// Sides per trunk ring; derived from `thickness` when unset
    pub roundness: Option<u32>,
    /// Trunk segment count; derived from `height` when unset
    pub segments: Option<u32>,
    /// Maximum per-segment tilt around X and Z
    pub twisting: f32,
    /// Probability (0-1) that the tree is generated as a broken stump
    pub stump_chance: f32,
    pub bark_color: Color,
    /// Color of the exposed wood on a stump
    pub wood_color: Color,
    pub foliage_style: FoliageStyle,
    /// One is picked at random per canopy; green when empty
    pub foliage_colors: Vec<Color>,
    pub foliage_width: f32,
    pub foliage_width_variance: f32,
    pub foliage_height: f32,
    pub foliage_height_variance: f32,
    /// Uniform scale applied to every emitted length
    pub scale: f32,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self::deciduous()
    }
}

impl TreeParams {
    /// Broadleaf tree with a round canopy and side branches
    pub fn deciduous() -> Self {
        Self {
            height: 10.0,
            thickness: 1.0,
            roundness: None,
            segments: None,
            twisting: 8.0,
            stump_chance: 0.1,
            bark_color: palette::BARK_BROWN,
            wood_color: palette::WOOD_BROWN,
            foliage_style: FoliageStyle::Round,
            foliage_colors: vec![palette::GREEN],
            foliage_width: 3.0,
            foliage_width_variance: 3.0,
            foliage_height: 3.0,
            foliage_height_variance: 1.0,
            scale: 1.0,
        }
    }

    /// Tall slender trunk topped by a fan of flat leaves
    pub fn palm() -> Self {
        Self {
            height: 14.0,
            thickness: 0.5,
            twisting: 15.0,
            stump_chance: 0.0,
            foliage_style: FoliageStyle::Flat,
            foliage_colors: vec![palette::YELLOW_GREEN, palette::FOREST_GREEN],
            foliage_width: 4.0,
            foliage_width_variance: 1.0,
            foliage_height: 2.0,
            foliage_height_variance: 0.5,
            ..Self::deciduous()
        }
    }

    /// Straight trunk with tiered coniferous foliage
    pub fn pine() -> Self {
        Self {
            height: 18.0,
            thickness: 0.8,
            twisting: 4.0,
            stump_chance: 0.05,
            foliage_style: FoliageStyle::Coniferous,
            foliage_colors: vec![palette::DARK_GREEN, palette::FOREST_GREEN],
            foliage_width: 4.0,
            foliage_width_variance: 1.0,
            foliage_height: 3.0,
            foliage_height_variance: 0.5,
            ..Self::deciduous()
        }
    }

    /// Short broken trunk
    pub fn dead_stump() -> Self {
        Self {
            height: 10.0,
            thickness: 1.5,
            twisting: 10.0,
            stump_chance: 1.0,
            bark_color: palette::GREY_BARK,
            foliage_style: FoliageStyle::None,
            foliage_colors: Vec::new(),
            ..Self::deciduous()
        }
    }

    /// Leafless tree with side branches
    pub fn bare() -> Self {
        Self {
            height: 12.0,
            thickness: 1.2,
            twisting: 20.0,
            stump_chance: 0.0,
            bark_color: palette::GREY_BARK,
            foliage_style: FoliageStyle::None,
            foliage_colors: Vec::new(),
            ..Self::deciduous()
        }
    }

    pub fn from_preset(preset: TreePreset) -> Self {
        match preset {
            TreePreset::Deciduous => Self::deciduous(),
            TreePreset::Palm => Self::palm(),
            TreePreset::Pine => Self::pine(),
            TreePreset::DeadStump => Self::dead_stump(),
            TreePreset::Bare => Self::bare(),
        }
    }

    /// Sides per trunk ring
    pub fn num_sides(&self) -> u32 {
        self.roundness
            .unwrap_or_else(|| roundness_for_radius(self.thickness))
    }

    /// Trunk segments of a full (non-stump) tree
    pub fn num_segments(&self) -> u32 {
        self.segments.unwrap_or_else(|| {
            let t = inverse_lerp(MIN_HEIGHT, MAX_HEIGHT, self.height);
            lerp(MIN_SEGMENTS as f32, MAX_SEGMENTS as f32, t).floor() as u32
        })
    }

    /// Check that the parameters describe a buildable tree
    pub fn validate(&self) -> Result<()> {
        fn positive(name: &str, value: f32) -> Result<()> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(Error::InvalidParameter(format!("{name} must be positive, got {value}")))
            }
        }

        positive("height", self.height)?;
        positive("thickness", self.thickness)?;
        positive("scale", self.scale)?;

        if !(self.twisting.is_finite() && self.twisting >= 0.0) {
            return Err(Error::InvalidParameter(format!(
                "twisting must be non-negative, got {}",
                self.twisting
            )));
        }
        if !(0.0..=1.0).contains(&self.stump_chance) {
            return Err(Error::InvalidParameter(format!(
                "stump_chance must be within [0, 1], got {}",
                self.stump_chance
            )));
        }
        if let Some(roundness) = self.roundness {
            if roundness < 3 {
                return Err(Error::InvalidParameter(format!(
                    "roundness must be at least 3, got {roundness}"
                )));
            }
        }
        if self.segments == Some(0) {
            return Err(Error::InvalidParameter("segments must be at least 1".into()));
        }

        let sizes = [
            ("foliage_width", self.foliage_width),
            ("foliage_height", self.foliage_height),
        ];
        for (name, size) in sizes {
            if !(MIN_FOLIAGE_SIZE..=MAX_FOLIAGE_SIZE).contains(&size) {
                return Err(Error::InvalidParameter(format!(
                    "{name} must be within [{MIN_FOLIAGE_SIZE}, {MAX_FOLIAGE_SIZE}], got {size}"
                )));
            }
        }
        for (name, variance) in [
            ("foliage_width_variance", self.foliage_width_variance),
            ("foliage_height_variance", self.foliage_height_variance),
        ] {
            if !(0.0..=MAX_FOLIAGE_VARIANCE).contains(&variance) {
                return Err(Error::InvalidParameter(format!(
                    "{name} must be within [0, {MAX_FOLIAGE_VARIANCE}], got {variance}"
                )));
            }
        }
        Ok(())
    }

    /// Parse parameters from JSON; missing fields take preset defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save_json_file(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}

/// Ring side count for a tube of the given (unscaled) radius
pub fn roundness_for_radius(radius: f32) -> u32 {
    let t = inverse_lerp(MIN_THICKNESS, MAX_THICKNESS, radius);
    lerp(MIN_ROUNDNESS as f32, MAX_ROUNDNESS as f32, t).floor() as u32
}
