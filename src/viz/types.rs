//! Colors and small value types shared by the renderer.

use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};

/// Opaque 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_plotters(self) -> RGBColor {
        RGBColor(self.r, self.g, self.b)
    }
}

pub const BACKGROUND: Rgb = Rgb::new(255, 255, 255);
/// One victim.
pub const INK: Rgb = Rgb::new(0, 0, 0);
pub const TEXT: Rgb = Rgb::new(0, 0, 0);
/// Milestone lines, day ticks and their labels.
pub const MILESTONE: Rgb = Rgb::new(255, 0, 0);
/// Year boundary lines and labels.
pub const YEAR: Rgb = Rgb::new(0, 0, 255);

