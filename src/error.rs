use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

/// Everything that can go wrong between fetching a dataset and writing a PNG.
///
/// `NoUsableData` is an expected outcome for sparsely-reported regions; batch
/// callers skip the series instead of treating it as a failure.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("network error for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("request to {url} failed with HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("could not decode {what}: {source}")]
    Decode {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no usable data for series {series}")]
    NoUsableData { series: String },

    #[error("invalid record: {0}")]
    InvalidRecord(String),

    #[error("layout error: {0}")]
    Layout(String),

    #[error(
        "day {day} requests {requested} points but its band only holds {capacity} free pixels"
    )]
    PlacementOverflow {
        day: usize,
        requested: u64,
        capacity: u64,
    },

    #[error("render error: {0}")]
    Render(String),

    #[error("font error: {0}")]
    Font(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ChartError {
    /// True for the benign "nothing to draw" outcome.
    pub fn is_no_usable_data(&self) -> bool {
        matches!(self, ChartError::NoUsableData { .. })
    }

    /// True for errors raised while talking to the data source.
    pub fn is_fetch(&self) -> bool {
        matches!(
            self,
            ChartError::Fetch { .. } | ChartError::HttpStatus { .. }
        )
    }
}
