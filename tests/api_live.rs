//! Live API tests. Run with: `cargo test --features online -- --nocapture`
#![cfg(feature = "online")]

use covid_dots::api::{Client, NATIONAL_URL, OWID_URL};
use covid_dots::config::SmoothingOptions;
use covid_dots::models::RawSeries;
use covid_dots::prepare::prepare;

#[test]
fn fetch_aggregated_dataset() {
    let ds = Client::new().unwrap().fetch_owid(OWID_URL).unwrap();
    let world = ds.get("OWID_WRL").expect("world aggregate present");
    assert!(!world.data.is_empty());
    let s = prepare(
        "OWID_WRL",
        &world.location,
        &RawSeries::Direct(world.data.clone()),
        &SmoothingOptions::default(),
    )
    .unwrap();
    assert!(s.smoothed);
    assert!(s.final_total() > 1_000_000);
}

#[test]
fn fetch_national_feed() {
    let days = Client::new().unwrap().fetch_national(NATIONAL_URL).unwrap();
    assert!(days.iter().any(|d| d.deces.is_some()));
}
