//! Canvas sizing: row height per day, canvas dimensions, margins and milestone step.

use crate::config::{LayoutOptions, MilestoneTable, SizingMode};
use crate::error::{ChartError, ChartResult};
use crate::models::TimeSeries;
use log::debug;
use serde::{Deserialize, Serialize};

/// Upper bound for the row height search; far above anything a real series needs.
const MAX_ROW_HEIGHT: u32 = 100_000;

/// Pixel distances from each canvas edge to the dot area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Margins {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
    /// Outer margin shared by all sides; label offsets are expressed in it.
    pub outer: u32,
}

/// Derived, immutable chart geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutGeometry {
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Pixels per day.
    pub row_height: u32,
    pub margins: Margins,
    pub milestone_step: u64,
    pub days: usize,
}

impl LayoutGeometry {
    /// First column of the dot area.
    pub fn plot_left(&self) -> u32 {
        self.margins.left
    }

    /// One past the last column of the dot area.
    pub fn plot_right(&self) -> u32 {
        self.canvas_width.saturating_sub(self.margins.right)
    }

    pub fn plot_width(&self) -> u32 {
        self.plot_right().saturating_sub(self.plot_left())
    }

    /// Top row of day `i`'s band.
    pub fn band_top(&self, day: usize) -> u32 {
        self.margins.top + day as u32 * self.row_height
    }

    /// Pixels available to a single day.
    pub fn band_capacity(&self) -> u64 {
        self.row_height as u64 * self.plot_width() as u64
    }
}

fn width_for(
    max_smoothed: u64,
    row_height: u32,
    opts: &LayoutOptions,
    round: bool,
) -> ChartResult<u32> {
    let ratio = max_smoothed as f64 / row_height as f64;
    // Half-to-even keeps e.g. 2.5 -> 2, matching the reference charts.
    let dots = if round {
        ratio.round_ties_even()
    } else {
        ratio.trunc()
    } as u64;
    let width = dots
        .saturating_add(opts.horizontal_margins() as u64)
        .max(opts.min_width as u64);
    u32::try_from(width).map_err(|_| {
        ChartError::Layout(format!(
            "peak of {max_smoothed} at row height {row_height} needs a {width} px wide canvas"
        ))
    })
}

/// Compute the geometry for `series`.
///
/// In adaptive mode the row height is the smallest value, counting up from 1, for
/// which the canvas is at most `width_bound` wide and at least `aspect_ratio` times
/// as tall as it is wide. Identical input always yields identical geometry.
pub fn plan(
    series: &TimeSeries,
    opts: &LayoutOptions,
    milestones: &MilestoneTable,
) -> ChartResult<LayoutGeometry> {
    if series.is_empty() {
        return Err(ChartError::Layout(format!("series {} has no days", series.id)));
    }
    let days = series.len();
    let max_smoothed = series.max_smoothed();
    let milestone_step = milestones.step_for(series.final_total())?;
    let margins = Margins {
        top: opts.outer + opts.title_band,
        bottom: opts.outer + opts.footer_band,
        left: opts.outer,
        right: opts.outer + opts.label_gutter,
        outer: opts.outer,
    };
    let height_for = |row_height: u32| -> ChartResult<u32> {
        u32::try_from(days as u64 * row_height as u64 + opts.vertical_margins() as u64)
            .map_err(|_| ChartError::Layout(format!("canvas too tall for {days} days")))
    };

    let (row_height, canvas_width, canvas_height) = match opts.sizing {
        SizingMode::Fixed { row_height } => {
            if row_height == 0 {
                return Err(ChartError::Layout("row height must be positive".into()));
            }
            let w = width_for(max_smoothed, row_height, opts, false)?;
            (row_height, w, height_for(row_height)?)
        }
        SizingMode::Adaptive => {
            let narrowest = opts.horizontal_margins().max(opts.min_width);
            if narrowest > opts.width_bound {
                return Err(ChartError::Layout(format!(
                    "width bound {} is below the narrowest possible canvas ({narrowest})",
                    opts.width_bound
                )));
            }
            let mut found = None;
            for row_height in 1..=MAX_ROW_HEIGHT {
                // Too wide at this height; a taller row may still fit.
                let Ok(w) = width_for(max_smoothed, row_height, opts, true) else {
                    continue;
                };
                let h = height_for(row_height)?;
                if w <= opts.width_bound && h as f64 >= opts.aspect_ratio * w as f64 {
                    found = Some((row_height, w, h));
                    break;
                }
            }
            found.ok_or_else(|| {
                ChartError::Layout(format!(
                    "no row height up to {MAX_ROW_HEIGHT} satisfies the bounds"
                ))
            })?
        }
    };

    debug!(
        "{}: layout {}x{} px, row height {}, milestone step {}",
        series.id, canvas_width, canvas_height, row_height, milestone_step
    );
    Ok(LayoutGeometry {
        canvas_width,
        canvas_height,
        row_height,
        margins,
        milestone_step,
        days,
    })
}
