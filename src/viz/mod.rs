//! Dot-density rendering: one pixel per victim, one row band per day.
//!
//! - Canvas sized by [`crate::layout::plan`]
//! - Points scattered at random inside each day's band ([`scatter`])
//! - Milestone and year guide lines with labels ([`annotate`])
//! - Title, legend, sources and credits stamped through a [`TextRenderer`]

pub mod annotate;
pub mod canvas;
pub mod scatter;
pub mod text;
pub mod types;

pub use annotate::{Annotation, annotate, draw_annotations};
pub use canvas::Canvas;
pub use scatter::{Band, Placement, ScatterReport, scatter_band, scatter_series};
pub use text::{EstimatedText, GlyphText, TextRenderer};
pub use types::Rgb;

use crate::config::ChartConfig;
use crate::error::ChartResult;
use crate::layout::{self, LayoutGeometry};
use crate::models::TimeSeries;
use log::info;
use rand::Rng;
use serde::Serialize;
use std::path::PathBuf;

use types::{BACKGROUND, INK, MILESTONE, TEXT};

/// What one chart generation produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderReport {
    pub id: String,
    pub path: Option<PathBuf>,
    pub geometry: LayoutGeometry,
    pub placed: u64,
    pub requested: u64,
    pub clamped_days: Vec<usize>,
    pub milestone_lines: usize,
    pub year_lines: usize,
}

/// Substitute the label placeholders for `series`.
fn fill(template: &str, series: &TimeSeries, window: usize) -> String {
    let date = |d: Option<&crate::models::DayRecord>| {
        d.map(|d| d.date.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    };
    template
        .replace("{location}", &series.location.to_uppercase())
        .replace("{start}", &date(series.first()))
        .replace("{end}", &date(series.last()))
        .replace("{total}", &series.final_total().to_string())
        .replace("{window}", &window.to_string())
}

/// Title, legends, sources and credits.
fn draw_decorations(
    canvas: &mut Canvas,
    series: &TimeSeries,
    config: &ChartConfig,
    text: &dyn TextRenderer,
    geometry: &LayoutGeometry,
) -> ChartResult<()> {
    let labels = &config.labels;
    let px = config.fonts.regular_size;
    let width = geometry.canvas_width as i32;
    let height = geometry.canvas_height as i32;
    let outer = geometry.margins.outer as i32;
    let window = config.smoothing.window;

    let title = fill(&labels.title, series, window);
    let (title_w, title_h) = text.measure(&title, px);
    let title_h = title_h as i32;
    text.draw(canvas, ((width - title_w as i32) / 2, 10), &title, px, TEXT)?;

    // The legend block leaves one blank line below the title lines.
    let mut legend_row = 2;
    if let Some(total) = &labels.total {
        let total = fill(total, series, window);
        let (w, _) = text.measure(&total, px);
        text.draw(canvas, ((width - w as i32) / 2, 10 + title_h), &total, px, TEXT)?;
        legend_row = 3;
    }

    let legend = fill(&labels.legend, series, window);
    let (_, legend_h) = text.measure(&legend, px);
    let legend_y = 10 + title_h * legend_row;
    text.draw(canvas, (outer, legend_y), &legend, px, TEXT)?;
    if series.smoothed {
        let note = fill(&labels.smoothing_note, series, window);
        text.draw(canvas, (outer, legend_y + legend_h as i32), &note, px, TEXT)?;
    }

    if let Some(days) = &labels.days_legend {
        let (_, h) = text.measure(days, px);
        let pos = (
            geometry.plot_right() as i32 + 2,
            geometry.margins.top as i32 - h as i32,
        );
        text.draw(canvas, pos, days, px, MILESTONE)?;
    }

    // Sources bottom-left and credits bottom-right, last line on the footer baseline.
    let baseline = height - config.layout.footer_band as i32;
    let mut y = baseline;
    let mut below_h = 0;
    for line in labels.source.iter().rev() {
        y -= below_h;
        text.draw(canvas, (outer, y), line, px, TEXT)?;
        below_h = text.measure(line, px).1 as i32;
    }
    let mut y = baseline;
    let mut below_h = 0;
    for line in labels.credit.iter().rev() {
        y -= below_h;
        let (w, h) = text.measure(line, px);
        text.draw(canvas, (width - outer - w as i32, y), line, px, TEXT)?;
        below_h = h as i32;
    }
    Ok(())
}

/// Render `series` into a fresh canvas.
pub fn render_chart<R: Rng + ?Sized>(
    series: &TimeSeries,
    config: &ChartConfig,
    text: &dyn TextRenderer,
    rng: &mut R,
) -> ChartResult<(Canvas, RenderReport)> {
    let geometry = layout::plan(series, &config.layout, &config.milestones)?;
    let mut canvas = Canvas::new(geometry.canvas_width, geometry.canvas_height, BACKGROUND)?;

    draw_decorations(&mut canvas, series, config, text, &geometry)?;
    let scatter = scatter_series(
        &mut canvas,
        series,
        &geometry,
        INK,
        config.strict_placement,
        rng,
    )?;
    let annotations = annotate(series, &geometry);
    draw_annotations(
        &mut canvas,
        text,
        &config.fonts,
        &config.labels,
        &geometry,
        &annotations,
    )?;

    let milestone_lines = annotations
        .iter()
        .filter(|a| matches!(a, Annotation::Milestone { .. }))
        .count();
    let year_lines = annotations
        .iter()
        .filter(|a| matches!(a, Annotation::YearBoundary { .. }))
        .count();
    let report = RenderReport {
        id: series.id.clone(),
        path: None,
        geometry,
        placed: scatter.placed,
        requested: scatter.requested,
        clamped_days: scatter.clamped_days,
        milestone_lines,
        year_lines,
    };
    Ok((canvas, report))
}

/// Render `series` and write it to `config.output_path(series.id)`.
pub fn render_to_file<R: Rng + ?Sized>(
    series: &TimeSeries,
    config: &ChartConfig,
    text: &dyn TextRenderer,
    rng: &mut R,
) -> ChartResult<RenderReport> {
    let (canvas, mut report) = render_chart(series, config, text, rng)?;
    let path = config.output_path(&series.id);
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    canvas.save(&path)?;
    info!(
        "{} exported to {} ({}x{})",
        series.location,
        path.display(),
        canvas.width(),
        canvas.height()
    );
    report.path = Some(path);
    Ok(report)
}
