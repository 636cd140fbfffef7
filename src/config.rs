use std::path::PathBuf;
use std::time::Duration;

use chrono_tz::Tz;

use crate::error::{ReportError, Result};

pub const ARXIV_API_URL: &str = "http://export.arxiv.org/api/query";
pub const DEFAULT_TIMEZONE: &str = "US/Mountain";

/// CSV headers read by the row processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnNames {
    pub date: String,
    pub name: String,
    pub arxiv_id: String,
    pub comments: String,
    pub hide: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            date: "Timestamp".to_string(),
            name: "Name".to_string(),
            arxiv_id: "arXiv URL or ID".to_string(),
            comments: "Comments".to_string(),
            hide: "Hide".to_string(),
        }
    }
}

/// Settings for talking to the arXiv query API.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub api_url: String,
    /// Maximum number of IDs sent in one query.
    pub batch_size: usize,
    /// Authors kept per paper before `has_more_authors` is set.
    pub authors_limit: usize,
    pub max_attempts: u32,
    /// Delay before retry `n` is `n * backoff_unit`.
    pub backoff_unit: Duration,
    /// Per-request socket timeout.
    pub timeout: Duration,
    /// Accepted responses must start with this prefix. With `None` any
    /// non-empty body is accepted.
    pub check_prefix: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            api_url: ARXIV_API_URL.to_string(),
            batch_size: 50,
            authors_limit: 6,
            max_attempts: 10,
            backoff_unit: Duration::from_secs(2),
            timeout: Duration::from_secs(20),
            check_prefix: Some("<?xml".to_string()),
        }
    }
}

impl FetchConfig {
    /// Defaults overridden by `ARXIV_API_URL`, `API_TIMEOUT_SECS`,
    /// `ARXIV_BACKOFF_MS` and `ARXIV_MAX_ATTEMPTS` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("ARXIV_API_URL") {
            config.api_url = url;
        }
        if let Some(secs) = env_number("API_TIMEOUT_SECS") {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(millis) = env_number("ARXIV_BACKOFF_MS") {
            config.backoff_unit = Duration::from_millis(millis);
        }
        if let Some(attempts) = env_number("ARXIV_MAX_ATTEMPTS") {
            config.max_attempts = attempts.clamp(1, u32::MAX as u64) as u32;
        }
        config
    }
}

fn env_number(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

/// Where the HTML skeleton comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// The self-contained page shipped with the binary.
    Embedded,
    /// A caller-supplied file containing the `<!-- TIME -->` and
    /// `<!-- ENTRIES -->` markers.
    File(PathBuf),
}

impl TemplateSource {
    pub fn load(&self) -> Result<String> {
        match self {
            TemplateSource::Embedded => Ok(crate::render::EMBEDDED_TEMPLATE.to_string()),
            TemplateSource::File(path) => Ok(std::fs::read_to_string(path)?),
        }
    }
}

/// Everything one report run needs.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub input_csv: PathBuf,
    pub output_html: PathBuf,
    pub template: TemplateSource,
    pub cache: Option<PathBuf>,
    pub timezone: Tz,
    pub columns: ColumnNames,
    pub fetch: FetchConfig,
}

impl ReportConfig {
    pub fn new(input_csv: impl Into<PathBuf>, output_html: impl Into<PathBuf>) -> Self {
        Self {
            input_csv: input_csv.into(),
            output_html: output_html.into(),
            template: TemplateSource::Embedded,
            cache: None,
            timezone: chrono_tz::US::Mountain,
            columns: ColumnNames::default(),
            fetch: FetchConfig::default(),
        }
    }
}

/// Parse an IANA timezone name such as `US/Mountain` or `Europe/Paris`.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| ReportError::UnknownTimezone(name.to_string()))
}
