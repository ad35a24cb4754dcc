//! Chart configuration: label sets, layout bounds, milestone tiers, smoothing and fonts.
//!
//! Two presets cover the supported charts:
//! - [`ChartConfig::world`]: English labels, adaptive canvas sizing, tiered milestone steps.
//! - [`ChartConfig::national`]: French labels, fixed two-pixel rows, a milestone every 10,000.
//!
//! Every field is serde (de)serializable so a preset can be dumped, edited, and loaded back
//! with [`ChartConfig::from_json_file`].

use crate::error::{ChartError, ChartResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How milestone labels sit relative to their guide line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelPlacement {
    /// Date above the line (small font), exact count below it.
    Straddle,
    /// Date and count stacked above the line.
    Above,
}

/// Texts stamped on the chart. Templates accept `{location}`, `{start}`, `{end}`,
/// `{total}` and `{window}` placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Labels {
    pub title: String,
    pub total: Option<String>,
    pub legend: String,
    pub smoothing_note: String,
    pub days_legend: Option<String>,
    pub milestone_suffix: String,
    pub source: Vec<String>,
    pub credit: Vec<String>,
    pub placement: LabelPlacement,
}

impl Labels {
    pub fn english() -> Self {
        Self {
            title: "DEATHS FROM COVID-19 IN {location} FROM {start} TO {end}".into(),
            total: Some("TOTAL: {total} VICTIMS".into()),
            legend: "1 black pixel = 1 victim".into(),
            smoothing_note: "Deaths smoothed over {window} days".into(),
            days_legend: Some("Days".into()),
            milestone_suffix: "deaths".into(),
            source: vec![
                "Source : Our World in Data".into(),
                "ourworldindata.org/covid-deaths".into(),
            ],
            credit: vec!["David Bertho".into(), "bertho.eu/covid".into()],
            placement: LabelPlacement::Straddle,
        }
    }

    pub fn french() -> Self {
        Self {
            title: "MORTS DU COVID-19 EN {location} DU {start} AU {end}".into(),
            total: None,
            legend: "1 pixel noir = 1 décès".into(),
            smoothing_note: "Décès lissés sur {window} jours".into(),
            days_legend: None,
            milestone_suffix: "morts".into(),
            source: vec![
                "Source : Ministère des Solidarités et de la Santé".into(),
                "data.gouv.fr".into(),
            ],
            credit: vec!["David Bertho".into(), "bertho.eu/covid".into()],
            placement: LabelPlacement::Above,
        }
    }
}

/// How the per-day row height is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SizingMode {
    /// Search the smallest row height meeting the width and aspect bounds.
    Adaptive,
    /// Use the given row height as is.
    Fixed { row_height: u32 },
}

/// Margins and bounds used by the layout planner (pixels).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutOptions {
    /// Outer margin on every side.
    pub outer: u32,
    /// Band above the first day row (title and legends).
    pub title_band: u32,
    /// Band below the last day row (sources and credits).
    pub footer_band: u32,
    /// Right gutter holding day ticks and milestone labels.
    pub label_gutter: u32,
    pub width_bound: u32,
    pub aspect_ratio: f64,
    pub min_width: u32,
    pub sizing: SizingMode,
}

impl LayoutOptions {
    pub fn horizontal_margins(&self) -> u32 {
        2 * self.outer + self.label_gutter
    }

    pub fn vertical_margins(&self) -> u32 {
        2 * self.outer + self.title_band + self.footer_band
    }
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            outer: 15,
            title_band: 60,
            footer_band: 30,
            label_gutter: 105,
            width_bound: 1900,
            aspect_ratio: 1.5,
            min_width: 500,
            sizing: SizingMode::Adaptive,
        }
    }
}

/// A milestone step used once the final total is strictly above `above`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneTier {
    pub above: u64,
    pub step: u64,
}

/// Ordered tiers, first match wins; `fallback` applies below every tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneTable {
    pub tiers: Vec<MilestoneTier>,
    pub fallback: u64,
}

impl MilestoneTable {
    /// A single step whatever the magnitude.
    pub fn flat(step: u64) -> Self {
        Self {
            tiers: Vec::new(),
            fallback: step,
        }
    }

    /// Step for a series ending at `final_total`.
    pub fn step_for(&self, final_total: u64) -> ChartResult<u64> {
        let step = self
            .tiers
            .iter()
            .find(|t| final_total > t.above)
            .map(|t| t.step)
            .unwrap_or(self.fallback);
        if step == 0 {
            return Err(ChartError::Layout("milestone step must be positive".into()));
        }
        Ok(step)
    }
}

impl Default for MilestoneTable {
    fn default() -> Self {
        let tier = |above, step| MilestoneTier { above, step };
        Self {
            tiers: vec![
                tier(1_000_000, 500_000),
                tier(200_000, 100_000),
                tier(20_000, 10_000),
                tier(2_000, 1_000),
                tier(500, 250),
                tier(100, 50),
                tier(50, 20),
            ],
            fallback: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmoothingOptions {
    pub window: usize,
    /// Smooth only when the final total is strictly above this; `None` always smooths.
    pub threshold: Option<u64>,
}

impl Default for SmoothingOptions {
    fn default() -> Self {
        Self {
            window: 7,
            threshold: Some(5000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontConfig {
    /// TrueType file used for every label. Without it labels are measured but not drawn.
    pub path: Option<PathBuf>,
    pub regular_size: u32,
    pub small_size: u32,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            path: None,
            regular_size: 10,
            small_size: 8,
        }
    }
}

/// Everything one chart generation needs besides the data and the font service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    pub labels: Labels,
    pub layout: LayoutOptions,
    pub milestones: MilestoneTable,
    pub smoothing: SmoothingOptions,
    pub fonts: FontConfig,
    pub output_dir: PathBuf,
    /// Output file name; `{id}` is replaced by the lowercased series id.
    pub file_name: String,
    /// Fail with `PlacementOverflow` instead of clamping overfull days.
    #[serde(default)]
    pub strict_placement: bool,
}

impl ChartConfig {
    /// Per-region charts from the aggregated dataset.
    pub fn world() -> Self {
        Self {
            labels: Labels::english(),
            layout: LayoutOptions::default(),
            milestones: MilestoneTable::default(),
            smoothing: SmoothingOptions::default(),
            fonts: FontConfig::default(),
            output_dir: PathBuf::from("."),
            file_name: "covid_{id}.png".into(),
            strict_placement: false,
        }
    }

    /// The single national chart built from the two-component feed.
    pub fn national() -> Self {
        Self {
            labels: Labels::french(),
            layout: LayoutOptions {
                title_band: 50,
                label_gutter: 90,
                min_width: 0,
                sizing: SizingMode::Fixed { row_height: 2 },
                ..LayoutOptions::default()
            },
            milestones: MilestoneTable::flat(10_000),
            smoothing: SmoothingOptions {
                window: 7,
                threshold: None,
            },
            fonts: FontConfig::default(),
            output_dir: PathBuf::from("."),
            file_name: "covid.png".into(),
            strict_placement: false,
        }
    }

    /// Where the chart for series `id` is written.
    pub fn output_path(&self, id: &str) -> PathBuf {
        let name = self.file_name.replace("{id}", &id.to_lowercase());
        self.output_dir.join(name)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ChartResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|source| ChartError::Decode {
            what: format!("config {}", path.display()),
            source,
        })
    }
}
