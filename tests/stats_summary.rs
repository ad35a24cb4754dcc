use chrono::{Duration, NaiveDate};
use covid_dots::models::{DayRecord, TimeSeries};
use covid_dots::stats::summarize;

#[test]
fn summary_reports_peaks_and_last_week() {
    let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
    let daily = [4u64, 9, 2, 9, 1, 0, 3, 5, 7, 6];
    let mut total = 0;
    let days = daily
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            total += v;
            DayRecord {
                date: start + Duration::days(i as i64),
                daily_value: v,
                cumulative_value: total,
                smoothed_value: if i == 8 { 20 } else { v },
            }
        })
        .collect();
    let s = TimeSeries {
        id: "BEL".into(),
        location: "Belgium".into(),
        days,
        smoothed: true,
    };
    let sum = summarize(&s);
    assert_eq!(sum.days, 10);
    assert_eq!(sum.total, 46);
    assert_eq!(sum.first, Some(start));
    // Earliest of the two 9s.
    assert_eq!(sum.peak_daily, Some((start + Duration::days(1), 9)));
    assert_eq!(sum.peak_smoothed, Some((start + Duration::days(8), 20)));
    assert!((sum.mean_daily.unwrap() - 4.6).abs() < 1e-9);
    // (9+1+0+3+5+7+6) / 7 = 31 / 7
    assert_eq!(sum.last_week_average, 4);
}

#[test]
fn empty_series_has_no_peaks() {
    let s = TimeSeries {
        id: "X".into(),
        location: "X".into(),
        days: vec![],
        smoothed: false,
    };
    let sum = summarize(&s);
    assert_eq!(sum.days, 0);
    assert_eq!(sum.peak_daily, None);
    assert_eq!(sum.mean_daily, None);
    assert_eq!(sum.last_week_average, 0);
}
