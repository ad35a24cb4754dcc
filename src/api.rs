/// Synchronous client for the two death-count sources.
///
/// - The aggregated per-region dataset (`{CODE: {location, data: [...]}}`).
/// - The national feed with hospital and nursing-home cumulative counts
///   (`[{date, deces, decesEhpad}, ...]`).
///
/// ### Notes
/// - Network timeouts default to 30s total / 10s connect.
/// - 5xx responses and transport errors are retried a few times with a short backoff;
///   other non-success statuses fail immediately.
/// - Failures surface as [`ChartError::Fetch`] or [`ChartError::HttpStatus`] so callers can
///   tell them apart from data problems.
///
/// Typical usage:
/// ```no_run
/// # use covid_dots::api::{Client, OWID_URL};
/// let client = Client::new()?;
/// let dataset = client.fetch_owid(OWID_URL)?;
/// println!("{} regions", dataset.len());
/// # Ok::<(), covid_dots::ChartError>(())
/// ```
use crate::error::{ChartError, ChartResult};
use crate::models::{ComponentDay, OwidDataset};
use log::debug;
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Duration;

pub const OWID_URL: &str =
    "https://raw.githubusercontent.com/owid/covid-19-data/master/public/data/owid-covid-data.json";
pub const NATIONAL_URL: &str =
    "https://www.data.gouv.fr/fr/datasets/r/d2671c6c-c0eb-4e12-b69a-8e8f87fc224c";

#[derive(Debug, Clone)]
pub struct Client {
    http: HttpClient,
}

impl Client {
    pub fn new() -> ChartResult<Self> {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> ChartResult<Self> {
        let http = HttpClient::builder()
            .timeout(timeout) // total request timeout
            .connect_timeout(Duration::from_secs(10))
            .redirect(Policy::limited(5))
            .user_agent(concat!("covid-dots/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ChartError::Fetch {
                url: String::new(),
                reason: format!("client build: {e}"),
            })?;
        Ok(Self { http })
    }

    /// GET `url` and decode its JSON body, with a small retry for transient failures.
    fn get_json<T: DeserializeOwned>(&self, url: &str) -> ChartResult<T> {
        let mut last_err: Option<ChartError> = None;
        for backoff_ms in [100u64, 300, 700] {
            match self.http.get(url).send() {
                Ok(r) if r.status().is_success() => {
                    let body = r.text().map_err(|e| ChartError::Fetch {
                        url: url.to_string(),
                        reason: format!("read body: {e}"),
                    })?;
                    debug!("GET {url}: {} bytes", body.len());
                    return serde_json::from_str(&body).map_err(|source| ChartError::Decode {
                        what: url.to_string(),
                        source,
                    });
                }
                Ok(r) if r.status().is_server_error() => {
                    last_err = Some(ChartError::HttpStatus {
                        url: url.to_string(),
                        status: r.status().as_u16(),
                    });
                }
                Ok(r) => {
                    return Err(ChartError::HttpStatus {
                        url: url.to_string(),
                        status: r.status().as_u16(),
                    });
                }
                Err(e) => {
                    last_err = Some(ChartError::Fetch {
                        url: url.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
            std::thread::sleep(Duration::from_millis(backoff_ms));
        }
        Err(last_err.unwrap_or_else(|| ChartError::Fetch {
            url: url.to_string(),
            reason: "no attempt made".into(),
        }))
    }

    /// Download the aggregated per-region dataset.
    pub fn fetch_owid(&self, url: &str) -> ChartResult<OwidDataset> {
        self.get_json(url)
    }

    /// Download the national two-component feed.
    pub fn fetch_national(&self, url: &str) -> ChartResult<Vec<ComponentDay>> {
        self.get_json(url)
    }
}

fn parse<T: DeserializeOwned>(text: &str, what: &str) -> ChartResult<T> {
    serde_json::from_str(text).map_err(|source| ChartError::Decode {
        what: what.to_string(),
        source,
    })
}

pub fn parse_owid(text: &str) -> ChartResult<OwidDataset> {
    parse(text, "aggregated dataset")
}

pub fn parse_national(text: &str) -> ChartResult<Vec<ComponentDay>> {
    parse(text, "national feed")
}

/// Read a previously downloaded aggregated dataset.
pub fn read_owid_file<P: AsRef<Path>>(path: P) -> ChartResult<OwidDataset> {
    let path = path.as_ref();
    parse(&std::fs::read_to_string(path)?, &path.display().to_string())
}

/// Read a previously downloaded national feed.
pub fn read_national_file<P: AsRef<Path>>(path: P) -> ChartResult<Vec<ComponentDay>> {
    let path = path.as_ref();
    parse(&std::fs::read_to_string(path)?, &path.display().to_string())
}
