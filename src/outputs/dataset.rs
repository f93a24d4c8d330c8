//! Dataset shard output for harvested records.
//!
//! Each source's records are persisted as a JSON Lines shard under the
//! configured dataset layout, one serialized [`DocumentRecord`] per line.
//! The hub upload itself runs as a separate deployment step; this module
//! writes the shard that step pushes, and drops the batch with a warning
//! when there is nothing to publish or no credentials to publish under.

use crate::models::{DocumentRecord, SourceConfig};
use chrono::Local;
use std::error::Error;
use tokio::fs;
use tracing::{error, info, instrument, warn};

/// Persist one source's records as a dated JSON Lines shard.
///
/// The shard is written to
/// `{output_dir}/{hf_username}/{dataset_name}/{YYYY-MM-DD}.jsonl`. An empty
/// batch and a missing `hf_token` are both quiet no-ops: the first means the
/// harvest found nothing, the second that there is no account to publish
/// under, and neither should fail the run.
///
/// # Returns
///
/// `Ok(())` on success or no-op, or an error if directory creation or file
/// writing fails.
#[instrument(level = "info", skip_all, fields(dataset = %source.dataset_name))]
pub async fn publish_records(
    records: &[DocumentRecord],
    source: &SourceConfig,
    output_dir: &str,
    hf_username: &str,
    hf_token: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    if records.is_empty() {
        warn!(dataset = %source.dataset_name, "No records harvested, nothing to publish");
        return Ok(());
    }
    if hf_token.is_none() {
        warn!("HF_TOKEN not set, skipping dataset publication");
        return Ok(());
    }

    let dataset_dir = format!(
        "{}/{}/{}",
        output_dir.trim_end_matches('/'),
        hf_username,
        source.dataset_name
    );
    info!(%dataset_dir, "Ensuring dataset directory exists");
    if let Err(e) = fs::create_dir_all(&dataset_dir).await {
        error!(%dataset_dir, error = %e, "Failed to create dataset dir");
        return Err(e.into());
    }

    let shard_path = format!("{}/{}.jsonl", dataset_dir, Local::now().date_naive());
    let mut lines = String::new();
    for record in records {
        lines.push_str(&serde_json::to_string(record)?);
        lines.push('\n');
    }

    fs::write(&shard_path, lines).await?;
    info!(path = %shard_path, records = records.len(), "Wrote dataset shard");

    Ok(())
}
