//! Normalizes raw per-day records into a canonical [`TimeSeries`].
//!
//! The output is chronological with one record per calendar day. Missing days are
//! inserted with a zero daily value and the previous cumulative total; a cumulative
//! total that would go down is repaired by carrying the previous one forward.

use crate::config::SmoothingOptions;
use crate::error::{ChartError, ChartResult};
use crate::models::{ComponentDay, DayRecord, OwidDay, RawSeries, TimeSeries};
use chrono::NaiveDate;
use log::debug;

/// Intermediate row once dates are parsed and the cumulative convention applied.
#[derive(Debug, Clone, Copy)]
struct Row {
    date: NaiveDate,
    daily: Option<u64>,
    cumulative: Option<u64>,
}

/// Build a [`TimeSeries`] from raw records.
///
/// Returns [`ChartError::NoUsableData`] when the input is empty or its last record
/// has no cumulative total; callers are expected to skip the series in that case.
pub fn prepare(
    id: &str,
    location: &str,
    raw: &RawSeries,
    smoothing: &SmoothingOptions,
) -> ChartResult<TimeSeries> {
    let (rows, derive_daily) = match raw {
        RawSeries::Direct(days) => (direct_rows(id, days)?, false),
        RawSeries::Components(days) => (component_rows(id, days)?, true),
    };
    let rows = sort_and_dedup(rows);
    let mut days = fill_and_repair(&rows, derive_daily);
    let smoothed = apply_smoothing(&mut days, smoothing);
    debug!(
        "{id}: {} raw records -> {} days, smoothed={smoothed}",
        raw.len(),
        days.len()
    );
    Ok(TimeSeries {
        id: id.to_string(),
        location: location.to_string(),
        days,
        smoothed,
    })
}

/// Convert a raw count to a non-negative integer; negative corrections become 0.
fn to_count(v: f64) -> u64 {
    if v.is_finite() && v > 0.0 {
        v.round() as u64
    } else {
        0
    }
}

fn parse_date(s: &str) -> ChartResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| ChartError::InvalidRecord(format!("bad date {s:?}: {e}")))
}

fn direct_rows(id: &str, days: &[OwidDay]) -> ChartResult<Vec<Row>> {
    match days.last() {
        Some(last) if last.total_deaths.is_some() => {}
        _ => {
            return Err(ChartError::NoUsableData {
                series: id.to_string(),
            });
        }
    }
    days.iter()
        .map(|d| {
            Ok(Row {
                date: parse_date(&d.date)?,
                daily: Some(d.new_deaths.map(to_count).unwrap_or(0)),
                cumulative: d.total_deaths.map(to_count),
            })
        })
        .collect()
}

fn component_rows(id: &str, days: &[ComponentDay]) -> ChartResult<Vec<Row>> {
    match days.last() {
        Some(last) if last.deces.is_some() => {}
        _ => {
            return Err(ChartError::NoUsableData {
                series: id.to_string(),
            });
        }
    }
    // An absent component keeps its last reported value.
    let mut hospital = 0u64;
    let mut nursing = 0u64;
    let mut out = Vec::with_capacity(days.len());
    for d in days {
        if let Some(v) = d.deces {
            hospital = to_count(v);
        }
        if let Some(v) = d.deces_ehpad {
            nursing = to_count(v);
        }
        out.push(Row {
            date: parse_date(&d.date)?,
            daily: None,
            cumulative: Some(hospital + nursing),
        });
    }
    Ok(out)
}

/// Chronological order; for repeated dates the last record wins.
fn sort_and_dedup(mut rows: Vec<Row>) -> Vec<Row> {
    rows.sort_by_key(|r| r.date);
    let mut out: Vec<Row> = Vec::with_capacity(rows.len());
    for r in rows {
        match out.last_mut() {
            Some(prev) if prev.date == r.date => *prev = r,
            _ => out.push(r),
        }
    }
    out
}

fn fill_and_repair(rows: &[Row], derive_daily: bool) -> Vec<DayRecord> {
    let mut out: Vec<DayRecord> = Vec::with_capacity(rows.len());
    let mut total = 0u64;
    for r in rows {
        if let Some(prev) = out.last().map(|d| d.date) {
            let mut gap = prev.succ_opt();
            while let Some(day) = gap.filter(|d| *d < r.date) {
                out.push(DayRecord {
                    date: day,
                    daily_value: 0,
                    cumulative_value: total,
                    smoothed_value: 0,
                });
                gap = day.succ_opt();
            }
        }
        let cumulative = r.cumulative.unwrap_or(total).max(total);
        let daily = if derive_daily {
            cumulative - total
        } else {
            r.daily.unwrap_or(0)
        };
        total = cumulative;
        out.push(DayRecord {
            date: r.date,
            daily_value: daily,
            cumulative_value: cumulative,
            smoothed_value: daily,
        });
    }
    out
}

/// Replace `smoothed_value` by the trailing moving average where it applies.
/// Returns whether smoothing was active for this series.
fn apply_smoothing(days: &mut [DayRecord], opts: &SmoothingOptions) -> bool {
    let final_total = days.last().map(|d| d.cumulative_value).unwrap_or(0);
    let active = opts.window > 0 && opts.threshold.is_none_or(|t| final_total > t);
    for d in days.iter_mut() {
        d.smoothed_value = d.daily_value;
    }
    if !active {
        return false;
    }
    let w = opts.window;
    let mut sum = 0u64;
    for i in 0..days.len() {
        sum += days[i].daily_value;
        if i >= w {
            sum -= days[i - w].daily_value;
        }
        if i + 1 >= w {
            days[i].smoothed_value = sum / w as u64;
        }
    }
    true
}

/// Trailing average of the last `n` daily values (integer truncation).
pub fn moving_average(days: &[DayRecord], n: usize) -> u64 {
    if n == 0 {
        return 0;
    }
    let window = &days[days.len().saturating_sub(n)..];
    window.iter().map(|d| d.daily_value).sum::<u64>() / n as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(date: &str, new: Option<f64>, total: Option<f64>) -> OwidDay {
        OwidDay {
            date: date.into(),
            new_deaths: new,
            total_deaths: total,
        }
    }

    #[test]
    fn duplicate_dates_keep_last() {
        let raw = RawSeries::Direct(vec![
            day("2020-03-02", Some(1.0), Some(1.0)),
            day("2020-03-01", Some(0.0), Some(0.0)),
            day("2020-03-02", Some(2.0), Some(2.0)),
        ]);
        let s = prepare("X", "X", &raw, &SmoothingOptions::default()).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.days[1].cumulative_value, 2);
        assert_eq!(s.days[1].daily_value, 2);
    }

    #[test]
    fn moving_average_truncates() {
        let d = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let days: Vec<DayRecord> = [1u64, 1, 1, 1, 1, 1, 2]
            .iter()
            .map(|v| DayRecord {
                date: d,
                daily_value: *v,
                cumulative_value: 0,
                smoothed_value: 0,
            })
            .collect();
        assert_eq!(moving_average(&days, 7), 1);
    }
}
