pub mod arxiv;
pub mod config;
pub mod discussion;
pub mod error;
pub mod internal;
pub mod render;

pub use config::{ColumnNames, FetchConfig, ReportConfig, TemplateSource};
pub use error::ReportError;
pub use internal::{generate_report, generate_report_internal, ReportSummary};
