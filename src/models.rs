use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One calendar day of a prepared series.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayRecord {
    pub date: NaiveDate,
    pub daily_value: u64,
    pub cumulative_value: u64,
    pub smoothed_value: u64,
}

/// Canonical, gap-free, chronological series for one region.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeSeries {
    /// Region identifier, e.g. `FRA` or `OWID_WRL`.
    pub id: String,
    /// Human readable name used in the chart title.
    pub location: String,
    pub days: Vec<DayRecord>,
    /// Whether the trailing moving average was applied.
    pub smoothed: bool,
}

impl TimeSeries {
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn first(&self) -> Option<&DayRecord> {
        self.days.first()
    }

    pub fn last(&self) -> Option<&DayRecord> {
        self.days.last()
    }

    /// Final cumulative total, 0 for an empty series.
    pub fn final_total(&self) -> u64 {
        self.last().map(|d| d.cumulative_value).unwrap_or(0)
    }

    /// Largest smoothed value, i.e. the widest row of dots.
    pub fn max_smoothed(&self) -> u64 {
        self.days.iter().map(|d| d.smoothed_value).max().unwrap_or(0)
    }
}

/// Serde helper: parse an optional count from a JSON number, a numeric string, or null.
///
/// The aggregated dataset encodes counts as floats (`5.0`), the national feed as
/// integers, and a few mirrors as strings.
fn de_opt_count<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    struct CountVisitor;

    impl<'de> Visitor<'de> for CountVisitor {
        type Value = Option<f64>;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a number, a numeric string, or null")
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(v as f64))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(v as f64))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(v))
        }

        fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            s.parse::<f64>().map(Some).map_err(E::custom)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(CountVisitor)
}

/// Raw day from the aggregated per-region dataset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct OwidDay {
    pub date: String,
    #[serde(default, deserialize_with = "de_opt_count")]
    pub new_deaths: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_count")]
    pub total_deaths: Option<f64>,
}

/// One region of the aggregated dataset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OwidRegion {
    pub location: String,
    #[serde(default)]
    pub data: Vec<OwidDay>,
}

/// The aggregated dataset, keyed by region code. Unknown per-region fields are ignored.
pub type OwidDataset = BTreeMap<String, OwidRegion>;

/// Raw day from the national feed where the cumulative total is split into
/// hospital deaths (`deces`) and nursing-home deaths (`decesEhpad`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ComponentDay {
    pub date: String,
    #[serde(default, deserialize_with = "de_opt_count")]
    pub deces: Option<f64>,
    #[serde(rename = "decesEhpad", default, deserialize_with = "de_opt_count")]
    pub deces_ehpad: Option<f64>,
}

/// Raw records together with the convention used to derive cumulative totals.
#[derive(Debug, Clone, PartialEq)]
pub enum RawSeries {
    /// Cumulative totals given directly, daily deltas alongside.
    Direct(Vec<OwidDay>),
    /// Cumulative total is the sum of two sub-counts.
    Components(Vec<ComponentDay>),
}

impl RawSeries {
    pub fn len(&self) -> usize {
        match self {
            RawSeries::Direct(v) => v.len(),
            RawSeries::Components(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
