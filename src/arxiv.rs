pub mod cache;
pub mod feed;
pub mod fetch;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use cache::{load_cache, save_cache};
pub use feed::{parse_feed, FeedEntry};
pub use fetch::{ArxivFetcher, LinearBackoff};

// New style (2101.01234) or old style (astro-ph/0601001, math.GT/0309136)
static ARXIV_ID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\d{4}\.\d{4,5}|[a-z-]+(?:\.[a-z-]+)?/\d{7}")
        .expect("Invalid arXiv ID regex pattern")
});

/// Extract the canonical arXiv ID from free-form text such as
/// `arXiv:2101.01234v2`, `https://arxiv.org/abs/hep-th/9901001` or a bare ID.
///
/// The first match is lowercased; version suffixes never take part in the
/// match. Returns `None` when nothing in the text looks like an arXiv ID.
pub fn normalize_arxiv_id(raw: &str) -> Option<String> {
    ARXIV_ID_REGEX
        .find(raw)
        .map(|m| m.as_str().to_lowercase())
}

pub fn abs_url(arxiv_id: &str) -> String {
    format!("https://arxiv.org/abs/{}", arxiv_id)
}

pub fn pdf_url(arxiv_id: &str) -> String {
    format!("https://arxiv.org/pdf/{}", arxiv_id)
}

pub fn html_url(arxiv_id: &str) -> String {
    format!("https://arxiv.org/html/{}", arxiv_id)
}

/// Metadata stored for one paper, keyed by its canonical ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperMetadata {
    pub title: String,
    pub authors: Vec<String>,
    pub has_more_authors: bool,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
}

impl PaperMetadata {
    /// Build metadata from a feed entry, keeping at most `authors_limit` authors.
    pub fn from_entry(entry: FeedEntry, authors_limit: usize) -> Self {
        let has_more_authors = entry.authors.len() > authors_limit;
        let mut authors = entry.authors;
        authors.truncate(authors_limit);
        Self {
            title: entry.title,
            authors,
            has_more_authors,
            abstract_text: entry.summary,
        }
    }
}

/// Canonical arXiv ID -> paper metadata.
pub type MetadataCache = BTreeMap<String, PaperMetadata>;
