use log::info;
use std::fs;

use crate::arxiv::{load_cache, save_cache, ArxivFetcher, MetadataCache};
use crate::config::ReportConfig;
use crate::discussion::{process_rows, read_csv};
use crate::error::Result;
use crate::render::{build_html, generation_timestamp};

/// What a finished run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSummary {
    pub entries: usize,
    pub papers_with_metadata: usize,
}

/// Read the CSV, fetch missing metadata and return the rendered page.
///
/// The cache file is only rewritten after every batch has been fetched, so a
/// failed run leaves an existing cache untouched.
pub fn generate_report_internal(config: &ReportConfig) -> Result<(String, ReportSummary)> {
    let rows = process_rows(&read_csv(&config.input_csv)?, &config.columns);
    let arxiv_ids: Vec<String> = rows.iter().map(|row| row.arxiv_id.clone()).collect();

    let mut metadata = MetadataCache::new();
    if !arxiv_ids.is_empty() {
        let existing = match &config.cache {
            Some(path) => Some(load_cache(path)?),
            None => None,
        };

        let fetcher = ArxivFetcher::new(config.fetch.clone())?;
        metadata = fetcher.fetch_metadata(&arxiv_ids, existing)?;

        if let Some(path) = &config.cache {
            save_cache(path, &metadata)?;
        }
    }

    let template = config.template.load()?;
    let html = build_html(
        &rows,
        &metadata,
        &template,
        &generation_timestamp(config.timezone),
    );

    let summary = ReportSummary {
        entries: rows.len(),
        papers_with_metadata: arxiv_ids.iter().filter(|id| metadata.contains_key(*id)).count(),
    };
    Ok((html, summary))
}

/// Run the whole pipeline and write the page to `config.output_html`.
pub fn generate_report(config: &ReportConfig) -> Result<ReportSummary> {
    let (html, summary) = generate_report_internal(config)?;
    fs::write(&config.output_html, html)?;
    info!(
        "Wrote {} entries ({} with metadata) to {:?}",
        summary.entries, summary.papers_with_metadata, config.output_html
    );
    Ok(summary)
}
