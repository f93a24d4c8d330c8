//! # European Parliament Harvest
//!
//! A document harvesting pipeline that crawls the European Parliament's
//! plenary archives, extracts the Dutch text of each document, and writes
//! the results as JSONL dataset shards ready for Hugging Face.
//!
//! ## Features
//!
//! - Crawls the table-of-contents chains of three archive sources (Adopted
//!   Texts, Minutes, and Verbatim Reports of proceedings)
//! - Extracts document text from archive HTML and OpenOffice-era XML
//! - Strips procedural boilerplate and repairs mojibake from legacy encodings
//! - Keeps only documents whose text is actually Dutch
//! - Writes one JSONL shard per source per day under the output directory
//!
//! ## Usage
//!
//! ```sh
//! europarl_harvest -o ./datasets
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Crawling**: Walk each source's TOC chain to discover document URLs
//! 2. **Fetching**: Download and extract document text (sequential, per source)
//! 3. **Filtering**: Drop short, untranslated, or non-Dutch documents
//! 4. **Output**: Write dated JSONL shards per source

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{fmt as tfmt, EnvFilter};
use whatlang::Lang;

mod cleaning;
mod cli;
mod crawler;
mod encoding;
mod harvest;
mod language;
mod models;
mod outputs;
mod sources;
mod utils;

use cli::Cli;
use language::LanguageGate;
use models::SourceConfig;
use outputs::dataset;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("europarl_harvest starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args.output_dir, ?args.hf_username, "Parsed CLI arguments");

    // Early check: ensure the output dir is writable
    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir,
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let gate = LanguageGate::new(Lang::Nld);
    let sources = SourceConfig::builtin();
    info!(count = sources.len(), "Harvesting configured sources");

    let mut total_records = 0usize;
    let mut failed_sources = 0usize;

    for source in &sources {
        info!(source = %source.name, start_url = %source.start_url, "Harvesting source");

        match harvest::harvest_source(source, &gate).await {
            Ok(records) => {
                total_records += records.len();
                if let Err(e) = dataset::publish_records(
                    &records,
                    source,
                    &args.output_dir,
                    &args.hf_username,
                    args.hf_token.as_deref(),
                )
                .await
                {
                    error!(source = %source.name, error = %e, "Failed to publish dataset");
                }
            }
            Err(e) => {
                failed_sources += 1;
                error!(source = %source.name, error = %e, "Harvest failed; continuing with next source");
            }
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        sources = sources.len(),
        failed_sources,
        total_records,
        "Execution complete"
    );

    Ok(())
}
