//! Text measurement and stamping.
//!
//! Rendering only needs two things from a font: how large a string is at a given
//! pixel size, and a way to stamp it onto the canvas. [`TextRenderer`] is that seam.

use crate::error::{ChartError, ChartResult};
use plotters::style::{FontDesc, FontStyle, IntoFont};
use std::path::Path;

use super::canvas::{Canvas, render_err};
use super::types::Rgb;

/// Font service shared read-only by every chart generation.
pub trait TextRenderer: Send + Sync {
    /// `(width, height)` in pixels of `text` at `px`.
    fn measure(&self, text: &str, px: u32) -> (u32, u32);

    /// Stamp `text` with its top-left corner at `pos`.
    fn draw(&self, canvas: &mut Canvas, pos: (i32, i32), text: &str, px: u32, color: Rgb)
    -> ChartResult<()>;
}

/// Heuristic: estimate pixel width of text when no font metrics are available
/// (0.6 em per character, rounded up).
pub fn estimate_text_width_px(text: &str, font_px: u32) -> u32 {
    (text.chars().count() as u32 * font_px * 3).div_ceil(5)
}

/// Measures with [`estimate_text_width_px`] and draws nothing.
///
/// Used when no font file is configured: the dots and guide lines are still exact,
/// only the labels are missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimatedText;

impl TextRenderer for EstimatedText {
    fn measure(&self, text: &str, px: u32) -> (u32, u32) {
        (estimate_text_width_px(text, px), px)
    }

    fn draw(&self, _: &mut Canvas, _: (i32, i32), _: &str, _: u32, _: Rgb) -> ChartResult<()> {
        Ok(())
    }
}

/// TrueType font rendered through plotters' `ab_glyph` text path.
#[derive(Debug, Clone)]
pub struct GlyphText {
    family: String,
}

impl GlyphText {
    /// Load a `.ttf` file and register it with plotters under a family derived from its path.
    ///
    /// The font bytes live for the rest of the process; load once and share the value.
    pub fn load<P: AsRef<Path>>(path: P) -> ChartResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| ChartError::Font(format!("cannot read {}: {e}", path.display())))?;
        let family = format!("covid-dots:{}", path.display());
        let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        plotters::style::register_font(&family, FontStyle::Normal, bytes).map_err(|_| {
            ChartError::Font(format!("{}: not a valid TrueType font", path.display()))
        })?;
        Ok(Self { family })
    }

    fn font(&self, px: u32) -> FontDesc<'_> {
        (self.family.as_str(), px as f64).into_font()
    }
}

impl TextRenderer for GlyphText {
    fn measure(&self, text: &str, px: u32) -> (u32, u32) {
        self.font(px)
            .box_size(text)
            .unwrap_or_else(|_| (estimate_text_width_px(text, px), px))
    }

    fn draw(
        &self,
        canvas: &mut Canvas,
        pos: (i32, i32),
        text: &str,
        px: u32,
        color: Rgb,
    ) -> ChartResult<()> {
        let style = self.font(px).color(&color.to_plotters());
        canvas.with_area(|area| area.draw_text(text, &style, pos).map_err(render_err))
    }
}
