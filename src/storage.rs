use crate::models::TimeSeries;
use anyhow::Result;
use csv::WriterBuilder;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Save a prepared series as CSV with header.
pub fn save_csv<P: AsRef<Path>>(series: &TimeSeries, path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.serialize(("id", "date", "daily_value", "cumulative_value", "smoothed_value"))?;
    for d in &series.days {
        wtr.serialize((
            &series.id,
            d.date.format("%Y-%m-%d").to_string(),
            d.daily_value,
            d.cumulative_value,
            d.smoothed_value,
        ))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save a prepared series as pretty JSON.
pub fn save_json<P: AsRef<Path>>(series: &TimeSeries, path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(series)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DayRecord;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    #[test]
    fn write_csv_and_json() {
        let dir = tempdir().unwrap();
        let csvp = dir.path().join("x.csv");
        let jsonp = dir.path().join("x.json");
        let series = TimeSeries {
            id: "FRA".into(),
            location: "France".into(),
            days: vec![DayRecord {
                date: NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(),
                daily_value: 2,
                cumulative_value: 2,
                smoothed_value: 2,
            }],
            smoothed: false,
        };
        save_csv(&series, &csvp).unwrap();
        save_json(&series, &jsonp).unwrap();
        let csv_txt = std::fs::read_to_string(&csvp).unwrap();
        assert!(csv_txt.starts_with("id,date,daily_value,"));
        assert!(csv_txt.contains("FRA,2020-03-01,2,2,2"));
        assert!(jsonp.exists());
    }
}
