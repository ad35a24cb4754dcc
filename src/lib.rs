//! covid_dots
//!
//! Dot-density charts of COVID-19 deaths: every victim is one black pixel, every day
//! one horizontal band of the image. Pairs with the `covid-dots` CLI.
//!
//! ### Features
//! - Fetch the aggregated per-region dataset or the national two-component feed
//! - Normalize raw records into a gap-free series with a 7-day moving average
//! - Size the canvas adaptively so the chart stays readable at any magnitude
//! - Scatter one pixel per death, annotate round-number milestones and new years
//! - Render every region of a dataset, in parallel if asked, isolating failures
//!
//! ### Example
//! ```no_run
//! use covid_dots::{ChartConfig, batch, viz::EstimatedText};
//! use covid_dots::api::{Client, OWID_URL};
//!
//! let dataset = Client::new()?.fetch_owid(OWID_URL)?;
//! let outcomes = batch::render_dataset(
//!     &dataset,
//!     &"FRA".parse()?,
//!     &ChartConfig::world(),
//!     &EstimatedText,
//!     batch::BatchOptions::default(),
//! );
//! for o in outcomes {
//!     println!("{}: rendered={}", o.id(), o.is_rendered());
//! }
//! # Ok::<(), covid_dots::ChartError>(())
//! ```

pub mod api;
pub mod batch;
pub mod config;
pub mod error;
pub mod layout;
pub mod models;
pub mod prepare;
pub mod stats;
pub mod storage;
pub mod viz;

pub use config::ChartConfig;
pub use error::{ChartError, ChartResult};
pub use layout::LayoutGeometry;
pub use models::{DayRecord, RawSeries, TimeSeries};
