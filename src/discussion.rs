use log::{debug, info};
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use crate::arxiv::normalize_arxiv_id;
use crate::config::ColumnNames;
use crate::error::Result;

/// One CSV record, header name -> cell text.
pub type RawRecord = HashMap<String, String>;

/// A single mention of a paper: who, when and what they said.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedComment {
    pub name: String,
    pub date: String,
    pub comment: String,
}

/// All mentions of one paper merged together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscussionRow {
    pub arxiv_id: String,
    /// Position of the most recent record mentioning the paper.
    pub index: usize,
    /// Date of the most recent record mentioning the paper.
    pub date: String,
    /// Every mention, in input order.
    pub comments: Vec<NamedComment>,
}

/// Read a CSV file with a header row into records.
pub fn read_csv(path: &Path) -> Result<Vec<RawRecord>> {
    let file = File::open(path)?;
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);

    let mut records = Vec::new();
    for record in reader.deserialize() {
        let record: RawRecord = record?;
        records.push(record);
    }

    info!("Read {} rows from {:?}", records.len(), path);
    Ok(records)
}

/// Keep only the first two `/`-separated parts, e.g. `3/14/2025 9:01:22`
/// becomes `3/14`.
pub fn short_date(raw: &str) -> String {
    raw.trim().split('/').take(2).collect::<Vec<_>>().join("/")
}

fn field<'a>(record: &'a RawRecord, column: &str) -> &'a str {
    record.get(column).map(String::as_str).unwrap_or("").trim()
}

/// Collapse records into one row per paper, newest mention first.
///
/// Hidden records and records without a recognisable arXiv ID are dropped.
pub fn process_rows(records: &[RawRecord], columns: &ColumnNames) -> Vec<DiscussionRow> {
    let mut rows: HashMap<String, DiscussionRow> = HashMap::new();

    for (index, record) in records.iter().enumerate() {
        if field(record, &columns.hide).eq_ignore_ascii_case("true") {
            debug!("Row {} is hidden", index);
            continue;
        }
        let Some(arxiv_id) = normalize_arxiv_id(field(record, &columns.arxiv_id)) else {
            debug!("Row {} has no arXiv ID", index);
            continue;
        };

        let date = short_date(field(record, &columns.date));
        let named_comment = NamedComment {
            name: field(record, &columns.name).to_string(),
            date: date.clone(),
            comment: field(record, &columns.comments).to_string(),
        };

        rows.entry(arxiv_id.clone())
            .and_modify(|row| {
                row.index = index;
                row.date = date.clone();
                row.comments.push(named_comment.clone());
            })
            .or_insert_with(|| DiscussionRow {
                arxiv_id,
                index,
                date,
                comments: vec![named_comment],
            });
    }

    let mut rows: Vec<DiscussionRow> = rows.into_values().collect();
    rows.sort_by(|a, b| b.index.cmp(&a.index));
    info!("{} papers after merging", rows.len());
    rows
}
