//! Rendering one selected region or every region of a dataset.
//!
//! Each series gets its own [`TimeSeries`], canvas and RNG, so a failure in one never
//! affects another; results come back as one [`Outcome`] per series.

use crate::config::ChartConfig;
use crate::error::ChartError;
use crate::models::{ComponentDay, OwidDataset, OwidRegion, RawSeries, TimeSeries};
use crate::prepare::prepare;
use crate::viz::{RenderReport, TextRenderer, render_to_file};
use log::{error, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;

static REGION_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(OWID_[A-Z]+|[A-Z]{2,3})$").expect("static region regex")
});

/// Region codes look like `FRA`, `GBR` or `OWID_WRL`.
pub fn is_region_code(code: &str) -> bool {
    REGION_CODE.is_match(code)
}

/// Which series of a dataset to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Region(String),
}

impl FromStr for Selection {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") || s.eq_ignore_ascii_case("all_countries") {
            return Ok(Selection::All);
        }
        let code = s.to_ascii_uppercase();
        if !is_region_code(&code) {
            return Err(ChartError::InvalidRecord(format!(
                "{s:?} is not a region code (expected e.g. FRA or OWID_WRL)"
            )));
        }
        Ok(Selection::Region(code))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOptions {
    /// Base seed; each series derives its own from it and its id.
    pub seed: Option<u64>,
    /// Render independent series on the rayon pool.
    pub parallel: bool,
}

#[derive(Debug)]
pub enum Outcome {
    Rendered(RenderReport),
    /// Nothing to draw for this series (e.g. no cumulative total reported).
    Skipped { id: String, reason: String },
    Failed { id: String, error: ChartError },
}

impl Outcome {
    pub fn id(&self) -> &str {
        match self {
            Outcome::Rendered(r) => &r.id,
            Outcome::Skipped { id, .. } | Outcome::Failed { id, .. } => id,
        }
    }

    pub fn is_rendered(&self) -> bool {
        matches!(self, Outcome::Rendered(_))
    }
}

fn seed_for(base: u64, id: &str) -> u64 {
    id.bytes()
        .fold(base, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64))
}

fn rng_for(seed: Option<u64>, id: &str) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(seed_for(s, id)),
        None => StdRng::from_os_rng(),
    }
}

/// Prepare and render one series, turning every error into an [`Outcome`].
pub fn render_series(
    id: &str,
    location: &str,
    raw: &RawSeries,
    config: &ChartConfig,
    text: &dyn TextRenderer,
    seed: Option<u64>,
) -> Outcome {
    let series: TimeSeries = match prepare(id, location, raw, &config.smoothing) {
        Ok(s) => s,
        Err(e) if e.is_no_usable_data() => {
            info!("{location} ({id}) skipped: no cumulative total reported");
            return Outcome::Skipped {
                id: id.to_string(),
                reason: e.to_string(),
            };
        }
        Err(e) => {
            error!("{location} ({id}): {e}");
            return Outcome::Failed {
                id: id.to_string(),
                error: e,
            };
        }
    };
    let mut rng = rng_for(seed, id);
    match render_to_file(&series, config, text, &mut rng) {
        Ok(report) => Outcome::Rendered(report),
        Err(e) => {
            error!("{location} ({id}): {e}");
            Outcome::Failed {
                id: id.to_string(),
                error: e,
            }
        }
    }
}

fn render_region(
    id: &str,
    region: &OwidRegion,
    config: &ChartConfig,
    text: &dyn TextRenderer,
    seed: Option<u64>,
) -> Outcome {
    let raw = RawSeries::Direct(region.data.clone());
    render_series(id, &region.location, &raw, config, text, seed)
}

/// Render the selected regions of the aggregated dataset.
pub fn render_dataset(
    dataset: &OwidDataset,
    selection: &Selection,
    config: &ChartConfig,
    text: &dyn TextRenderer,
    opts: BatchOptions,
) -> Vec<Outcome> {
    match selection {
        Selection::Region(code) => match dataset.get(code) {
            Some(region) => vec![render_region(code, region, config, text, opts.seed)],
            None => vec![Outcome::Failed {
                id: code.clone(),
                error: ChartError::InvalidRecord(format!("region {code} not in dataset")),
            }],
        },
        Selection::All => {
            let entries: Vec<(&String, &OwidRegion)> = dataset.iter().collect();
            if opts.parallel {
                entries
                    .par_iter()
                    .map(|(id, region)| render_region(id, region, config, text, opts.seed))
                    .collect()
            } else {
                entries
                    .iter()
                    .map(|(id, region)| render_region(id, region, config, text, opts.seed))
                    .collect()
            }
        }
    }
}

/// Render the national chart from the two-component feed.
pub fn render_national(
    days: Vec<ComponentDay>,
    config: &ChartConfig,
    text: &dyn TextRenderer,
    seed: Option<u64>,
) -> Outcome {
    render_series("FRA", "France", &RawSeries::Components(days), config, text, seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_parses_codes_and_all() {
        assert_eq!("all".parse::<Selection>().unwrap(), Selection::All);
        assert_eq!("all_countries".parse::<Selection>().unwrap(), Selection::All);
        assert_eq!(
            "fra".parse::<Selection>().unwrap(),
            Selection::Region("FRA".into())
        );
        assert_eq!(
            "OWID_WRL".parse::<Selection>().unwrap(),
            Selection::Region("OWID_WRL".into())
        );
        assert!("../etc".parse::<Selection>().is_err());
    }

    #[test]
    fn per_series_seeds_differ() {
        assert_ne!(seed_for(7, "FRA"), seed_for(7, "GBR"));
        assert_eq!(seed_for(7, "FRA"), seed_for(7, "FRA"));
    }
}
