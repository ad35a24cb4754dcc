//! Milestone and year-boundary detection, and the guide lines and labels they produce.
//!
//! [`annotate`] is a pure pass over the series that decides *what* to draw and where;
//! [`draw_annotations`] stamps the result on a canvas.

use crate::config::{FontConfig, LabelPlacement, Labels};
use crate::error::ChartResult;
use crate::layout::LayoutGeometry;
use crate::models::TimeSeries;
use chrono::{Datelike, NaiveDate};

use super::canvas::Canvas;
use super::text::TextRenderer;
use super::types::{MILESTONE, YEAR};

/// Length of the per-day tick in the right gutter.
const DAY_TICK_LEN: i32 = 3;
/// Gap between the dot area and the tick / line overshoot on the left.
const DAY_TICK_GAP: i32 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    /// Cumulative total crossed a new multiple of the milestone step.
    Milestone {
        day: usize,
        y: u32,
        multiple: u64,
        cumulative: u64,
        date: NaiveDate,
    },
    /// Day without a milestone: short tick in the gutter.
    DayTick { day: usize, y: u32 },
    /// First day of a new calendar year.
    YearBoundary {
        day: usize,
        y: u32,
        outgoing: i32,
        incoming: i32,
    },
}

impl Annotation {
    pub fn day(&self) -> usize {
        match *self {
            Annotation::Milestone { day, .. }
            | Annotation::DayTick { day, .. }
            | Annotation::YearBoundary { day, .. } => day,
        }
    }
}

/// Walk the series once and emit one milestone-or-tick per day plus a year
/// boundary for each change of calendar year. The milestone check runs first;
/// both may fire on the same day.
pub fn annotate(series: &TimeSeries, geometry: &LayoutGeometry) -> Vec<Annotation> {
    let Some(first) = series.first() else {
        return Vec::new();
    };
    let step = geometry.milestone_step.max(1);
    let mut last_multiple = 0u64;
    let mut current_year = first.date.year();
    let mut out = Vec::with_capacity(series.len() + 4);

    for (i, d) in series.days.iter().enumerate() {
        let y = geometry.band_top(i);
        let multiple = d.cumulative_value / step;
        if multiple > last_multiple {
            last_multiple = multiple;
            out.push(Annotation::Milestone {
                day: i,
                y,
                multiple,
                cumulative: d.cumulative_value,
                date: d.date,
            });
        } else {
            out.push(Annotation::DayTick { day: i, y });
        }

        if d.date.year() > current_year {
            out.push(Annotation::YearBoundary {
                day: i,
                y,
                outgoing: current_year,
                incoming: current_year + 1,
            });
            current_year += 1;
        }
    }
    out
}

/// Draw lines and labels for `annotations`.
pub fn draw_annotations(
    canvas: &mut Canvas,
    text: &dyn TextRenderer,
    fonts: &FontConfig,
    labels: &Labels,
    geometry: &LayoutGeometry,
    annotations: &[Annotation],
) -> ChartResult<()> {
    let outer = geometry.margins.outer as i32;
    let left = geometry.plot_left() as i32;
    let right = geometry.plot_right() as i32;
    let width = geometry.canvas_width as i32;
    let label_x = right + outer;

    for a in annotations {
        match a {
            Annotation::Milestone {
                y, cumulative, date, ..
            } => {
                let y = *y as i32;
                canvas.draw_line((left - DAY_TICK_GAP, y), (right + 3 * outer, y), MILESTONE, 1)?;

                let date_txt = date.format("%Y-%m-%d").to_string();
                let count_txt = format!("{} {}", cumulative, labels.milestone_suffix);
                let (_, date_h) = text.measure(&date_txt, fonts.small_size);
                let (_, count_h) = text.measure(&count_txt, fonts.regular_size);
                let base = y - 2;
                let (date_y, count_y) = match labels.placement {
                    LabelPlacement::Straddle => (base - date_h as i32, base + 2),
                    LabelPlacement::Above => {
                        (base - count_h as i32 - date_h as i32, base - count_h as i32)
                    }
                };
                text.draw(canvas, (label_x, date_y), &date_txt, fonts.small_size, MILESTONE)?;
                text.draw(canvas, (label_x, count_y), &count_txt, fonts.regular_size, MILESTONE)?;
            }
            Annotation::DayTick { y, .. } => {
                let y = *y as i32;
                let x0 = right + DAY_TICK_GAP;
                canvas.draw_line((x0, y), (x0 + DAY_TICK_LEN - 1, y), MILESTONE, 1)?;
            }
            Annotation::YearBoundary {
                y,
                outgoing,
                incoming,
                ..
            } => {
                let line_y = *y as i32;
                let base = line_y - 1;
                let year_x = width - 2 * outer;
                let old = outgoing.to_string();
                let (_, year_h) = text.measure(&old, fonts.regular_size);
                text.draw(canvas, (year_x, base - year_h as i32), &old, fonts.regular_size, YEAR)?;
                text.draw(canvas, (year_x, base), &incoming.to_string(), fonts.regular_size, YEAR)?;
                canvas.draw_line((left - DAY_TICK_GAP, line_y), (width - outer, line_y), YEAR, 1)?;
            }
        }
    }
    Ok(())
}
