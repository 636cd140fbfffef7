use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Not able to connect to {url} after {attempts} attempts")]
    FetchExhausted { url: String, attempts: u32 },

    #[error("Something wrong with URL {url}: {source}")]
    MalformedFeed {
        url: String,
        #[source]
        source: quick_xml::DeError,
    },

    #[error("arXiv API returned status {status} for {url}")]
    UnexpectedStatus { url: String, status: reqwest::StatusCode },

    #[error("Response from {url} does not look like an Atom feed")]
    UnexpectedResponse { url: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Cache error: {0}")]
    Cache(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("Invalid API URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ReportError>;
