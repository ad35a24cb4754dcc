//! Raster surface owned by one chart generation.
//!
//! Pixels live in a row-major RGB8 buffer. Direct access (`get_pixel`/`set_pixel`) is
//! used by the scatterer; lines and text go through a plotters `BitMapBackend`
//! borrowing the same buffer, and `save` hands the buffer to plotters-bitmap's PNG output.

use crate::error::{ChartError, ChartResult};
use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;
use std::path::Path;

use super::types::Rgb;

pub(crate) fn render_err<E: std::fmt::Debug>(e: E) -> ChartError {
    ChartError::Render(format!("{e:?}"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    buf: Vec<u8>,
}

impl Canvas {
    /// Allocate a canvas filled with `background`.
    pub fn new(width: u32, height: u32, background: Rgb) -> ChartResult<Self> {
        if width == 0 || height == 0 {
            return Err(ChartError::Render(format!(
                "cannot allocate a {width}x{height} canvas"
            )));
        }
        let len = width as usize * height as usize;
        let mut buf = Vec::with_capacity(len * 3);
        for _ in 0..len {
            buf.extend_from_slice(&[background.r, background.g, background.b]);
        }
        Ok(Self { width, height, buf })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGB8 bytes, row-major.
    pub fn as_raw(&self) -> &[u8] {
        &self.buf
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| (y as usize * self.width as usize + x as usize) * 3)
    }

    /// Color at `(x, y)`, `None` outside the canvas.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        let i = self.offset(x, y)?;
        Some(Rgb::new(self.buf[i], self.buf[i + 1], self.buf[i + 2]))
    }

    /// Set `(x, y)`; returns false (and does nothing) outside the canvas.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgb) -> bool {
        match self.offset(x, y) {
            Some(i) => {
                self.buf[i..i + 3].copy_from_slice(&[color.r, color.g, color.b]);
                true
            }
            None => false,
        }
    }

    /// Number of pixels of `color` in the half-open rectangle `[x0, x1) x [y0, y1)`.
    pub fn count_color(&self, (x0, x1): (u32, u32), (y0, y1): (u32, u32), color: Rgb) -> u64 {
        let mut n = 0;
        for y in y0..y1.min(self.height) {
            for x in x0..x1.min(self.width) {
                if self.get_pixel(x, y) == Some(color) {
                    n += 1;
                }
            }
        }
        n
    }

    /// Run plotters drawing code against this canvas.
    pub fn with_area<F>(&mut self, draw: F) -> ChartResult<()>
    where
        F: FnOnce(&DrawingArea<BitMapBackend<'_>, Shift>) -> ChartResult<()>,
    {
        let dims = (self.width, self.height);
        let area = BitMapBackend::with_buffer(&mut self.buf, dims).into_drawing_area();
        draw(&area)?;
        area.present().map_err(render_err)
    }

    /// Straight line between two points (inclusive), `width` pixels thick.
    pub fn draw_line(
        &mut self,
        from: (i32, i32),
        to: (i32, i32),
        color: Rgb,
        width: u32,
    ) -> ChartResult<()> {
        let style = color.to_plotters().stroke_width(width.max(1));
        self.with_area(|area| {
            area.draw(&PathElement::new(vec![from, to], style))
                .map_err(render_err)
        })
    }

    /// Write the canvas as an image; the format follows the file extension (PNG expected).
    pub fn save<P: AsRef<Path>>(&self, path: P) -> ChartResult<()> {
        let path = path.as_ref();
        let dims = (self.width, self.height);
        let mut backend = BitMapBackend::new(path, dims);
        backend
            .blit_bitmap((0, 0), dims, &self.buf)
            .map_err(render_err)?;
        backend.present().map_err(render_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viz::types::{BACKGROUND, INK};

    #[test]
    fn pixels_outside_are_ignored() {
        let mut c = Canvas::new(4, 3, BACKGROUND).unwrap();
        assert!(c.set_pixel(3, 2, INK));
        assert!(!c.set_pixel(4, 0, INK));
        assert_eq!(c.get_pixel(3, 2), Some(INK));
        assert_eq!(c.get_pixel(0, 3), None);
        assert_eq!(c.count_color((0, 4), (0, 3), INK), 1);
    }

    #[test]
    fn zero_sized_canvas_is_an_error() {
        assert!(Canvas::new(0, 10, BACKGROUND).is_err());
    }

    #[test]
    fn horizontal_line_colors_its_row() {
        let mut c = Canvas::new(20, 5, BACKGROUND).unwrap();
        c.draw_line((2, 2), (12, 2), INK, 1).unwrap();
        assert!(c.count_color((0, 20), (2, 3), INK) >= 10);
        assert_eq!(c.count_color((0, 20), (0, 1), INK), 0);
    }
}
