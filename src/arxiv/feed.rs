use log::debug;
use quick_xml::de::from_str;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    #[serde(default)]
    id: String,
    title: Option<String>,
    #[serde(default)]
    summary: String,
    #[serde(rename = "author", default)]
    authors: Vec<AtomAuthor>,
}

#[derive(Debug, Deserialize)]
struct AtomAuthor {
    #[serde(default)]
    name: String,
}

/// One `<entry>` of an arXiv Atom feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    /// Self link of the entry, e.g. `http://arxiv.org/abs/2101.01234v2`.
    pub id: String,
    pub title: String,
    pub summary: String,
    pub authors: Vec<String>,
}

impl AtomEntry {
    fn into_feed_entry(self) -> FeedEntry {
        FeedEntry {
            id: self.id.trim().to_string(),
            title: self.title.unwrap_or_default(),
            summary: self.summary,
            authors: self.authors.into_iter().map(|a| a.name).collect(),
        }
    }
}

/// Parse an arXiv API response into its entries.
///
/// The API reports bad queries as a feed whose first entry is titled
/// "Error"; that entry is dropped.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedEntry>, quick_xml::DeError> {
    let feed: AtomFeed = from_str(xml)?;
    let mut entries = feed.entries;

    let first_is_error = entries
        .first()
        .map(|e| e.title.as_deref().map_or(true, |t| t.trim() == "Error"))
        .unwrap_or(false);
    if first_is_error {
        let removed = entries.remove(0);
        debug!("Dropping error entry from feed: {}", removed.summary.trim());
    }

    Ok(entries.into_iter().map(AtomEntry::into_feed_entry).collect())
}
