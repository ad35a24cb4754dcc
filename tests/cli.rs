use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::json;
use std::process::Command;
use tempfile::tempdir;

fn sample_dataset(path: &std::path::Path) {
    let mut total = 0.0;
    let data: Vec<_> = (1..=30)
        .map(|d| {
            let v = (d % 4 + 1) as f64;
            total += v;
            json!({"date": format!("2020-04-{d:02}"), "new_deaths": v, "total_deaths": total})
        })
        .collect();
    let ds = json!({
        "FRA": {"location": "France", "data": data},
        "ITA": {"location": "Italy", "data": [{"date": "2020-04-01", "new_deaths": 3}]}
    });
    std::fs::write(path, ds.to_string()).unwrap();
}

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("covid-dots").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("world"))
        .stdout(predicate::str::contains("national"));
}

#[test]
fn renders_one_region_from_a_local_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("owid.json");
    sample_dataset(&input);
    let out = dir.path().join("out");
    let mut cmd = Command::cargo_bin("covid-dots").unwrap();
    cmd.args(["world", "--region", "fra", "--seed", "1", "--stats"])
        .arg("--input")
        .arg(&input)
        .arg("--out-dir")
        .arg(&out);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("FRA").and(predicate::str::contains("days=30")));
    assert!(out.join("covid_fra.png").exists());
    assert!(!out.join("covid_ita.png").exists());
}

#[test]
fn skipped_regions_do_not_fail_the_run() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("owid.json");
    sample_dataset(&input);
    let mut cmd = Command::cargo_bin("covid-dots").unwrap();
    cmd.args(["world", "--seed", "1"])
        .arg("--input")
        .arg(&input)
        .arg("--out-dir")
        .arg(dir.path());
    cmd.assert().success();
    assert!(dir.path().join("covid_fra.png").exists());
}

#[test]
fn exports_the_prepared_series() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("owid.json");
    sample_dataset(&input);
    let csv = dir.path().join("fra.csv");
    let mut cmd = Command::cargo_bin("covid-dots").unwrap();
    cmd.args(["world", "--region", "FRA"])
        .arg("--input")
        .arg(&input)
        .arg("--out-dir")
        .arg(dir.path())
        .arg("--export")
        .arg(&csv);
    cmd.assert().success();
    let txt = std::fs::read_to_string(&csv).unwrap();
    assert!(txt.starts_with("id,date,daily_value,cumulative_value,smoothed_value"));
    assert_eq!(txt.lines().count(), 31);
}

#[test]
fn dump_config_prints_the_french_preset() {
    let mut cmd = Command::cargo_bin("covid-dots").unwrap();
    cmd.args(["national", "--dump-config", "--row-height", "3"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("covid.png"))
        .stdout(predicate::str::contains("\"row_height\": 3"));
}

#[test]
fn missing_input_file_fails() {
    let mut cmd = Command::cargo_bin("covid-dots").unwrap();
    cmd.args(["world", "--input", "/no/such/file.json"]);
    cmd.assert().failure().code(1);
}

#[test]
fn bad_region_code_fails() {
    let mut cmd = Command::cargo_bin("covid-dots").unwrap();
    cmd.args(["world", "--region", "not a code", "--input", "/no/such/file.json"]);
    cmd.assert().failure();
}

#[test]
fn unreachable_source_has_its_own_exit_code() {
    let dir = tempdir().unwrap();
    let mut cmd = Command::cargo_bin("covid-dots").unwrap();
    cmd.args(["national", "--url", "http://127.0.0.1:9/feed.json"])
        .arg("--out-dir")
        .arg(dir.path());
    cmd.assert().failure().code(2);
}

// Live test (opt-in): cargo test --features online
#[cfg(feature = "online")]
#[test]
fn renders_world_chart_online() {
    let dir = tempdir().unwrap();
    let mut cmd = Command::cargo_bin("covid-dots").unwrap();
    cmd.args(["world", "--region", "OWID_WRL", "--seed", "1"])
        .arg("--out-dir")
        .arg(dir.path());
    cmd.assert().success();
    assert!(dir.path().join("covid_owid_wrl.png").exists());
}

#[test]
fn exporting_a_skipped_region_is_not_a_failure() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("owid.json");
    sample_dataset(&input);
    let csv = dir.path().join("ita.csv");
    let mut cmd = Command::cargo_bin("covid-dots").unwrap();
    cmd.args(["world", "--region", "ITA"])
        .arg("--input")
        .arg(&input)
        .arg("--out-dir")
        .arg(dir.path())
        .arg("--export")
        .arg(&csv);
    cmd.assert().success();
    assert!(!csv.exists());
    assert!(!dir.path().join("covid_ita.png").exists());
}
