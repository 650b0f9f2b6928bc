//! Vertex colors and the default palette

use serde::{Deserialize, Serialize};

/// Linear RGBA vertex color
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Opaque color from RGB components
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Bit pattern used when colors take part in hashing (vertex welding)
    pub(crate) fn to_bits(self) -> [u32; 4] {
        [self.r.to_bits(), self.g.to_bits(), self.b.to_bits(), self.a.to_bits()]
    }
}

impl Default for Color {
    fn default() -> Self {
        palette::GREEN
    }
}

/// Named colors used by the tree presets
pub mod palette {
    use super::Color;

    pub const GREEN: Color = Color::rgb(0.0, 0.5, 0.0);
    pub const FOREST_GREEN: Color = Color::rgb(0.13, 0.55, 0.13);
    pub const DARK_GREEN: Color = Color::rgb(0.0, 0.4, 0.0);
    pub const YELLOW_GREEN: Color = Color::rgb(0.6, 0.8, 0.2);

    pub const BARK_BROWN: Color = Color::rgb(0.38, 0.3, 0.17);
    pub const WOOD_BROWN: Color = Color::rgb(0.75, 0.6, 0.42);
    pub const GREY_BARK: Color = Color::rgb(0.42, 0.4, 0.37);
}
