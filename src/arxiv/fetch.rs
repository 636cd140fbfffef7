use backoff::backoff::Backoff;
use log::{debug, info, warn};
use reqwest::blocking::Client;
use reqwest::Url;
use std::collections::BTreeSet;
use std::time::Duration;

use crate::arxiv::{feed, normalize_arxiv_id, MetadataCache, PaperMetadata};
use crate::config::FetchConfig;
use crate::error::{ReportError, Result};

/// Backoff that waits `attempt * unit` after each failed attempt and gives
/// up once `max_attempts` attempts have been made.
#[derive(Debug, Clone)]
pub struct LinearBackoff {
    unit: Duration,
    max_attempts: u32,
    attempts: u32,
}

impl LinearBackoff {
    pub fn new(unit: Duration, max_attempts: u32) -> Self {
        Self {
            unit,
            max_attempts,
            attempts: 1,
        }
    }
}

impl Backoff for LinearBackoff {
    fn reset(&mut self) {
        self.attempts = 1;
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        if self.attempts >= self.max_attempts {
            return None;
        }
        let delay = self.unit * self.attempts;
        self.attempts += 1;
        Some(delay)
    }
}

/// Blocking client for the arXiv query API.
pub struct ArxivFetcher {
    client: Client,
    config: FetchConfig,
}

impl ArxivFetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    /// Return `existing` extended with metadata for every ID in `ids` that it
    /// does not already hold.
    ///
    /// IDs are queried in batches of `batch_size`. Entries the API returns
    /// without being asked for are kept; requested IDs the API does not know
    /// are simply absent from the result. Any batch failing aborts the call.
    pub fn fetch_metadata(
        &self,
        ids: &[String],
        existing: Option<MetadataCache>,
    ) -> Result<MetadataCache> {
        let mut metadata = existing.unwrap_or_default();
        let missing: Vec<String> = ids
            .iter()
            .filter(|id| !metadata.contains_key(id.as_str()))
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        if missing.is_empty() {
            debug!("All {} papers already cached", ids.len());
            return Ok(metadata);
        }

        let batch_size = self.config.batch_size.max(1);
        info!(
            "Fetching metadata for {} papers in {} batch(es)",
            missing.len(),
            missing.len().div_ceil(batch_size)
        );

        for batch in missing.chunks(batch_size) {
            let url = self.query_url(batch)?;
            let body = self.load_url(url.as_str())?;
            let entries = feed::parse_feed(&body).map_err(|source| ReportError::MalformedFeed {
                url: url.to_string(),
                source,
            })?;

            for entry in entries {
                let Some(arxiv_id) = normalize_arxiv_id(&entry.id) else {
                    warn!("Skipping feed entry with unrecognised id: {}", entry.id);
                    continue;
                };
                debug!("Fetched metadata for {}", arxiv_id);
                metadata.insert(
                    arxiv_id,
                    PaperMetadata::from_entry(entry, self.config.authors_limit),
                );
            }
        }

        Ok(metadata)
    }

    fn query_url(&self, batch: &[String]) -> Result<Url> {
        Url::parse_with_params(
            &self.config.api_url,
            &[
                ("id_list", batch.join(",")),
                ("max_results", self.config.batch_size.max(1).to_string()),
            ],
        )
        .map_err(|e| ReportError::InvalidUrl {
            url: self.config.api_url.clone(),
            reason: e.to_string(),
        })
    }

    /// GET `url`, retrying transport errors, non-success statuses and bodies
    /// that fail the prefix check with linear backoff.
    pub fn load_url(&self, url: &str) -> Result<String> {
        let mut attempts = 0u32;

        let operation = || -> std::result::Result<String, backoff::Error<ReportError>> {
            attempts += 1;
            debug!("GET {} (attempt {})", url, attempts);

            let response = self
                .client
                .get(url)
                .send()
                .map_err(|e| backoff::Error::transient(ReportError::Network(e)))?;

            if !response.status().is_success() {
                return Err(backoff::Error::transient(ReportError::UnexpectedStatus {
                    url: url.to_string(),
                    status: response.status(),
                }));
            }

            let body = response
                .text()
                .map_err(|e| backoff::Error::transient(ReportError::Network(e)))?;

            if self.accepts(&body) {
                Ok(body)
            } else {
                Err(backoff::Error::transient(ReportError::UnexpectedResponse {
                    url: url.to_string(),
                }))
            }
        };

        let notify = |err: ReportError, delay: Duration| {
            warn!("{}; retrying in {:?}", err, delay);
        };

        let backoff = LinearBackoff::new(self.config.backoff_unit, self.config.max_attempts);
        let result = backoff::retry_notify(backoff, operation, notify);

        match result {
            Ok(body) => Ok(body),
            Err(backoff::Error::Permanent(err)) => Err(err),
            Err(backoff::Error::Transient { err, .. }) => {
                warn!("Giving up on {}: {}", url, err);
                Err(ReportError::FetchExhausted {
                    url: url.to_string(),
                    attempts,
                })
            }
        }
    }

    fn accepts(&self, body: &str) -> bool {
        match &self.config.check_prefix {
            Some(prefix) => body.starts_with(prefix.as_str()),
            None => !body.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_backoff_delays() {
        let mut backoff = LinearBackoff::new(Duration::from_secs(2), 4);
        assert_eq!(backoff.next_backoff(), Some(Duration::from_secs(2)));
        assert_eq!(backoff.next_backoff(), Some(Duration::from_secs(4)));
        assert_eq!(backoff.next_backoff(), Some(Duration::from_secs(6)));
        assert_eq!(backoff.next_backoff(), None);

        backoff.reset();
        assert_eq!(backoff.next_backoff(), Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_single_attempt_never_waits() {
        let mut backoff = LinearBackoff::new(Duration::from_secs(2), 1);
        assert_eq!(backoff.next_backoff(), None);
    }

    #[test]
    fn test_query_url_encodes_batch() {
        let fetcher = ArxivFetcher::new(FetchConfig::default()).unwrap();
        let url = fetcher
            .query_url(&["2101.01234".to_string(), "astro-ph/0601001".to_string()])
            .unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("id_list".to_string(), "2101.01234,astro-ph/0601001".to_string()),
                ("max_results".to_string(), "50".to_string()),
            ]
        );
    }

    #[test]
    fn test_prefix_check_modes() {
        let strict = ArxivFetcher::new(FetchConfig::default()).unwrap();
        assert!(strict.accepts("<?xml version=\"1.0\"?><feed/>"));
        assert!(!strict.accepts("<html>rate limited</html>"));

        let lenient = ArxivFetcher::new(FetchConfig {
            check_prefix: None,
            ..FetchConfig::default()
        })
        .unwrap();
        assert!(lenient.accepts("<feed/>"));
        assert!(!lenient.accepts(""));
    }
}
