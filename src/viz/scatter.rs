//! Random, non-overlapping placement of one pixel per victim inside each day's band.

use crate::error::{ChartError, ChartResult};
use crate::layout::LayoutGeometry;
use crate::models::TimeSeries;
use log::warn;
use rand::Rng;
use rand::seq::SliceRandom;

use super::canvas::Canvas;
use super::types::{BACKGROUND, Rgb};

/// Rejection-sampling draws allowed per requested point before switching to
/// sampling from the explicit list of free pixels.
const ATTEMPTS_PER_POINT: u64 = 16;
const MIN_ATTEMPTS: u64 = 64;

/// Half-open pixel rectangle `[left, right) x [top, bottom)` owned by one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl Band {
    pub fn for_day(geometry: &LayoutGeometry, day: usize) -> Self {
        let top = geometry.band_top(day);
        Self {
            left: geometry.plot_left(),
            right: geometry.plot_right(),
            top,
            bottom: top + geometry.row_height,
        }
    }

    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }

    pub fn capacity(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        (self.left..self.right).contains(&x) && (self.top..self.bottom).contains(&y)
    }

    fn clipped_to(self, canvas: &Canvas) -> Self {
        Self {
            left: self.left.min(canvas.width()),
            right: self.right.min(canvas.width()),
            top: self.top.min(canvas.height()),
            bottom: self.bottom.min(canvas.height()),
        }
    }

    fn pixels(self) -> impl Iterator<Item = (u32, u32)> {
        (self.top..self.bottom).flat_map(move |y| (self.left..self.right).map(move |x| (x, y)))
    }
}

/// Result of filling one band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub requested: u64,
    pub placed: u64,
}

impl Placement {
    /// True when the band could not hold every requested point.
    pub fn clamped(&self) -> bool {
        self.placed < self.requested
    }
}

/// Summary of a whole series.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScatterReport {
    pub placed: u64,
    pub requested: u64,
    /// Days whose request exceeded their band's free pixels.
    pub clamped_days: Vec<usize>,
}

/// Place `requested` distinct `ink` pixels uniformly at random on background pixels of `band`.
///
/// A request larger than the number of free pixels is a [`ChartError::PlacementOverflow`]
/// when `strict`, otherwise it is clamped to the free pixel count. Nothing outside
/// `band` is read or written.
pub fn scatter_band<R: Rng + ?Sized>(
    canvas: &mut Canvas,
    band: Band,
    day: usize,
    requested: u64,
    ink: Rgb,
    strict: bool,
    rng: &mut R,
) -> ChartResult<Placement> {
    if requested == 0 {
        return Ok(Placement {
            requested,
            placed: 0,
        });
    }
    let band = band.clipped_to(canvas);
    let free = band
        .pixels()
        .filter(|&(x, y)| canvas.get_pixel(x, y) == Some(BACKGROUND))
        .count() as u64;
    if requested > free && strict {
        return Err(ChartError::PlacementOverflow {
            day,
            requested,
            capacity: free,
        });
    }
    let target = requested.min(free);

    let mut placed = 0u64;
    let mut attempts = 0u64;
    let budget = target.saturating_mul(ATTEMPTS_PER_POINT) + MIN_ATTEMPTS;
    while placed < target && attempts < budget {
        attempts += 1;
        let x = rng.random_range(band.left..band.right);
        let y = rng.random_range(band.top..band.bottom);
        if canvas.get_pixel(x, y) == Some(BACKGROUND) {
            canvas.set_pixel(x, y, ink);
            placed += 1;
        }
    }

    // Dense band: finish by sampling among the pixels that are still free.
    if placed < target {
        let mut remaining: Vec<(u32, u32)> = band
            .pixels()
            .filter(|&(x, y)| canvas.get_pixel(x, y) == Some(BACKGROUND))
            .collect();
        let need = (target - placed) as usize;
        let (chosen, _) = remaining.partial_shuffle(rng, need);
        for &(x, y) in chosen.iter() {
            canvas.set_pixel(x, y, ink);
            placed += 1;
        }
    }

    Ok(Placement { requested, placed })
}

/// Fill every day's band with its smoothed number of points.
///
/// The canvas width comes from `round(peak / row_height)`, which can leave the peak
/// day up to one column short. With `strict`, such a shortfall is still clamped;
/// only larger overflows are errors.
pub fn scatter_series<R: Rng + ?Sized>(
    canvas: &mut Canvas,
    series: &TimeSeries,
    geometry: &LayoutGeometry,
    ink: Rgb,
    strict: bool,
    rng: &mut R,
) -> ChartResult<ScatterReport> {
    let mut report = ScatterReport::default();
    for (i, day) in series.days.iter().enumerate() {
        let band = Band::for_day(geometry, i);
        let rounding_slack = geometry.row_height as u64;
        let strict_here = strict && day.smoothed_value > band.capacity() + rounding_slack;
        let p = scatter_band(canvas, band, i, day.smoothed_value, ink, strict_here, rng)?;
        if p.clamped() {
            warn!(
                "{}: {} needs {} points but its band only fits {}; clamped",
                series.id, day.date, p.requested, p.placed
            );
            report.clamped_days.push(i);
        }
        report.placed += p.placed;
        report.requested += p.requested;
    }
    Ok(report)
}
