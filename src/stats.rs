use crate::models::{DayRecord, TimeSeries};
use crate::prepare::moving_average;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Summary statistics for a prepared series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub id: String,
    pub days: usize,
    pub first: Option<NaiveDate>,
    pub last: Option<NaiveDate>,
    pub total: u64,
    /// Worst reported day `(date, deaths)`; earliest wins on ties.
    pub peak_daily: Option<(NaiveDate, u64)>,
    /// Worst smoothed day, i.e. the widest row of the chart.
    pub peak_smoothed: Option<(NaiveDate, u64)>,
    pub mean_daily: Option<f64>,
    /// Average of the last seven reported days.
    pub last_week_average: u64,
}

fn peak_by(days: &[DayRecord], value: impl Fn(&DayRecord) -> u64) -> Option<(NaiveDate, u64)> {
    days.iter().fold(None, |best, d| match best {
        Some((_, v)) if v >= value(d) => best,
        _ => Some((d.date, value(d))),
    })
}

pub fn summarize(series: &TimeSeries) -> Summary {
    let days = &series.days;
    let mean_daily = if days.is_empty() {
        None
    } else {
        Some(days.iter().map(|d| d.daily_value).sum::<u64>() as f64 / days.len() as f64)
    };
    Summary {
        id: series.id.clone(),
        days: days.len(),
        first: series.first().map(|d| d.date),
        last: series.last().map(|d| d.date),
        total: series.final_total(),
        peak_daily: peak_by(days, |d| d.daily_value),
        peak_smoothed: peak_by(days, |d| d.smoothed_value),
        mean_daily,
        last_week_average: moving_average(days, 7),
    }
}
