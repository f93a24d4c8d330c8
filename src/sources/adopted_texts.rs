//! Adopted texts fetcher.
//!
//! Adopted texts are served as plain HTML in which every `<p>` is body text,
//! so the shared paragraph extractor does all the work. Sittings that adopted
//! nothing have no document at all; the resulting not-found surfaces as an
//! ordinary per-document failure.

use crate::sources::paragraph_text;
use reqwest::Client;
use std::error::Error;
use tracing::{debug, instrument};

/// Fetch one adopted-texts document and extract its normalized body.
#[instrument(level = "info", skip_all, fields(%url))]
pub async fn fetch_text(client: &Client, url: &str) -> Result<Option<String>, Box<dyn Error>> {
    let body = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    let text = paragraph_text(&body);
    debug!(found = text.is_some(), "Extracted adopted text");
    Ok(text)
}
