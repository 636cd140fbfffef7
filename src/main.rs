use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;

use paper_discussion::config::{parse_timezone, DEFAULT_TIMEZONE};
use paper_discussion::{generate_report, ColumnNames, FetchConfig, ReportConfig, TemplateSource};

/// Generate an HTML page from a CSV of arXiv IDs
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input CSV file
    input_csv: PathBuf,
    /// Output HTML file
    output_html: PathBuf,
    /// HTML template with <!-- TIME --> and <!-- ENTRIES --> markers
    /// (a self-contained page is used if not specified)
    #[arg(short, long)]
    template: Option<PathBuf>,
    /// JSON file caching arXiv metadata between runs
    #[arg(short, long)]
    cache: Option<PathBuf>,
    /// Timezone of the "last updated" timestamp
    #[arg(long, default_value = DEFAULT_TIMEZONE)]
    timezone: String,
    #[arg(long, default_value = "Timestamp")]
    date_column: String,
    #[arg(long, default_value = "Name")]
    name_column: String,
    #[arg(long, default_value = "arXiv URL or ID")]
    id_column: String,
    #[arg(long, default_value = "Comments")]
    comments_column: String,
    #[arg(long, default_value = "Hide")]
    hide_column: String,
    /// Accept any non-empty API response instead of requiring an XML prolog
    #[arg(long)]
    no_prefix_check: bool,
    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Configure logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let mut fetch = FetchConfig::from_env();
    if args.no_prefix_check {
        fetch.check_prefix = None;
    }

    let config = ReportConfig {
        input_csv: args.input_csv,
        output_html: args.output_html,
        template: match args.template {
            Some(path) => TemplateSource::File(path),
            None => TemplateSource::Embedded,
        },
        cache: args.cache,
        timezone: parse_timezone(&args.timezone)?,
        columns: ColumnNames {
            date: args.date_column,
            name: args.name_column,
            arxiv_id: args.id_column,
            comments: args.comments_column,
            hide: args.hide_column,
        },
        fetch,
    };

    info!("Generating report from {:?}", config.input_csv);
    generate_report(&config)
        .with_context(|| format!("Failed to generate {:?}", config.output_html))?;

    Ok(())
}
