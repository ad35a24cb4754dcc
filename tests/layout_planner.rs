use chrono::{Duration, NaiveDate};
use covid_dots::config::{LayoutOptions, MilestoneTable, SizingMode};
use covid_dots::layout::plan;
use covid_dots::models::{DayRecord, TimeSeries};

/// `days` records; the first carries `peak` as smoothed value, the total ends at `total`.
fn series(days: usize, peak: u64, total: u64) -> TimeSeries {
    let start = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
    let days = (0..days)
        .map(|i| DayRecord {
            date: start + Duration::days(i as i64),
            daily_value: 0,
            cumulative_value: total * (i as u64 + 1) / days as u64,
            smoothed_value: if i == 0 { peak } else { 1 },
        })
        .collect();
    TimeSeries {
        id: "TST".into(),
        location: "Testland".into(),
        days,
        smoothed: true,
    }
}

#[test]
fn adaptive_picks_first_row_height_meeting_both_bounds() {
    let s = series(400, 3000, 50_000);
    let g = plan(&s, &LayoutOptions::default(), &MilestoneTable::default()).unwrap();
    // rh=2: 1635 wide but only 920 tall; rh=3: 1135 x 1320 still too flat; rh=4 fits.
    assert_eq!(g.row_height, 4);
    assert_eq!(g.canvas_width, 750 + 135);
    assert_eq!(g.canvas_height, 4 * 400 + 120);
    assert!(g.canvas_width <= 1900);
    assert!(g.canvas_height as f64 >= 1.5 * g.canvas_width as f64);
    assert_eq!(g.milestone_step, 10_000);
}

#[test]
fn width_floor_applies_to_small_series() {
    let s = series(30, 10, 40);
    let g = plan(&s, &LayoutOptions::default(), &MilestoneTable::default()).unwrap();
    assert_eq!(g.canvas_width, 500);
    // 21 * 30 + 120 = 750 = 1.5 * 500, and 20 rows fall short.
    assert_eq!(g.row_height, 21);
    assert_eq!(g.canvas_height, 750);
}

#[test]
fn rounding_is_half_to_even() {
    let s = series(50, 5, 40);
    let opts = LayoutOptions {
        min_width: 0,
        ..LayoutOptions::default()
    };
    let g = plan(&s, &opts, &MilestoneTable::default()).unwrap();
    assert_eq!(g.row_height, 2);
    // 5 / 2 = 2.5 rounds to 2.
    assert_eq!(g.canvas_width, 2 + 135);
}

#[test]
fn identical_input_gives_identical_geometry() {
    let s = series(700, 12_345, 1_500_000);
    let a = plan(&s, &LayoutOptions::default(), &MilestoneTable::default()).unwrap();
    let b = plan(&s.clone(), &LayoutOptions::default(), &MilestoneTable::default()).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.milestone_step, 500_000);
}

#[test]
fn fixed_sizing_truncates_width() {
    let s = series(100, 101, 30_000);
    let opts = LayoutOptions {
        title_band: 50,
        label_gutter: 90,
        min_width: 0,
        sizing: SizingMode::Fixed { row_height: 2 },
        ..LayoutOptions::default()
    };
    let g = plan(&s, &opts, &MilestoneTable::flat(10_000)).unwrap();
    assert_eq!(g.row_height, 2);
    assert_eq!(g.canvas_width, 50 + 2 * 15 + 90);
    assert_eq!(g.canvas_height, 2 * 100 + 50 + 30 + 2 * 15);
    assert_eq!(g.milestone_step, 10_000);
}

#[test]
fn unsatisfiable_bounds_are_an_error_not_a_hang() {
    let s = series(10, 10, 10);
    let opts = LayoutOptions {
        width_bound: 100,
        ..LayoutOptions::default()
    };
    assert!(plan(&s, &opts, &MilestoneTable::default()).is_err());
}

#[test]
fn empty_series_is_an_error() {
    let mut s = series(1, 1, 1);
    s.days.clear();
    assert!(plan(&s, &LayoutOptions::default(), &MilestoneTable::default()).is_err());
}

#[test]
fn bands_tile_the_plot_area() {
    let s = series(400, 3000, 50_000);
    let g = plan(&s, &LayoutOptions::default(), &MilestoneTable::default()).unwrap();
    assert_eq!(g.band_top(0), 15 + 60);
    assert_eq!(g.band_top(1) - g.band_top(0), g.row_height);
    assert_eq!(g.plot_left(), 15);
    assert_eq!(g.plot_right(), g.canvas_width - 15 - 105);
    assert_eq!(g.band_top(g.days) + 45, g.canvas_height);
    assert_eq!(g.band_capacity(), (g.row_height * g.plot_width()) as u64);
}

#[test]
fn huge_peaks_are_a_layout_error_not_a_panic() {
    let s = series(10, 5_000_000_000, 6_000_000_000);
    let err = plan(&s, &LayoutOptions::default(), &MilestoneTable::default()).unwrap_err();
    assert!(matches!(err, covid_dots::ChartError::Layout(_)));

    let fixed = LayoutOptions {
        sizing: SizingMode::Fixed { row_height: 1 },
        ..LayoutOptions::default()
    };
    let err = plan(&s, &fixed, &MilestoneTable::default()).unwrap_err();
    assert!(matches!(err, covid_dots::ChartError::Layout(_)));
}

#[test]
fn rounding_can_leave_the_peak_day_one_column_short() {
    // 1001 / 2 = 500.5 rounds to 500 columns: 1000 pixels for 1001 dots.
    let s = series(1000, 1001, 50_000);
    let g = plan(&s, &LayoutOptions::default(), &MilestoneTable::default()).unwrap();
    assert_eq!(g.row_height, 2);
    assert_eq!(g.canvas_width, 500 + 135);
    assert_eq!(g.band_capacity(), 1000);
}
