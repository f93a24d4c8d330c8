//! Sitting minutes fetcher.
//!
//! Minutes are published as OpenOffice-style XML: narrative text lives in
//! `text:p` paragraphs nested under a fixed set of section elements, with
//! vote tallies in `table:table` blocks that must not leak into the corpus.
//! Some sittings never got an XML document; those are retried against the
//! HTML rendering and run through the paragraph extractor instead.

use crate::cleaning::clean_text;
use crate::sources::{paragraph_text, resolve_reference, MIN_DOCUMENT_CHARS};
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;
use reqwest::{Client, StatusCode};
use std::error::Error;
use tracing::{debug, instrument, warn};

const TEXT_NS: &[u8] = b"http://openoffice.org/2000/text";
const TABLE_NS: &[u8] = b"http://openoffice.org/2000/table";

/// The section elements whose paragraphs carry narrative text. The set is
/// exhaustive for the format; anything outside it is front matter or
/// attendance data.
const SECTION_NAMES: [&str; 7] = [
    "PV.Other.Text",
    "PV.Debate.Text",
    "PV.Vote.Text",
    "PV.Sitting.Resumption.Text",
    "PV.Approval.Text",
    "PV.Agenda.Text",
    "PV.Sitting.Closure.Text",
];

/// Paragraphs shorter than this are numbering or layout noise, distinct from
/// the whole-document minimum applied after cleaning.
const MIN_PARAGRAPH_CHARS: usize = 20;

/// Fetch one minutes document, falling back to the HTML rendering when the
/// XML representation was never published.
#[instrument(level = "info", skip_all, fields(%url))]
pub async fn fetch_text(client: &Client, url: &str) -> Result<Option<String>, Box<dyn Error>> {
    let response = client.get(url).send().await?;

    if response.status() == StatusCode::NOT_FOUND && url.ends_with("_NL.xml") {
        let html_url = url.replace("_NL.xml", "_NL.html");
        warn!(%html_url, "Minutes XML missing, trying HTML rendering");
        let body = client
            .get(&html_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        return Ok(paragraph_text(&body));
    }

    let bytes = response.error_for_status()?.bytes().await?;
    let text = extract_structured_text(&bytes);
    debug!(found = text.is_some(), "Extracted minutes text");
    Ok(text)
}

/// Pull narrative paragraphs out of the namespaced minutes XML.
///
/// Walks the document once in order, tracking how deep we are inside
/// monitored sections and tables. A `text:p` is collected when it starts
/// inside a monitored section and outside any table, its flattened text is
/// long enough, and tables opened inside the paragraph do not exclude it.
/// Malformed documents are read up to the first hard error and whatever was
/// collected by then is kept.
fn extract_structured_text(xml: &[u8]) -> Option<String> {
    let mut reader = NsReader::from_reader(xml);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;
    config.allow_dangling_amp = true;

    let mut texts: Vec<String> = Vec::new();
    let mut section_depth = 0usize;
    let mut table_depth = 0usize;
    // Open paragraph: whether a table was an ancestor at its start, plus the
    // accumulating flattened text. Paragraph nesting depth closes it.
    let mut paragraph: Option<(bool, String)> = None;
    let mut paragraph_depth = 0usize;
    let mut buf = Vec::new();

    loop {
        match reader.read_resolved_event_into(&mut buf) {
            Ok((resolve, Event::Start(e))) => {
                let name = e.local_name();
                if is_section(name.as_ref()) {
                    section_depth += 1;
                } else if ns_matches(&resolve, TABLE_NS) && name.as_ref() == b"table" {
                    table_depth += 1;
                } else if ns_matches(&resolve, TEXT_NS) && name.as_ref() == b"p" {
                    if paragraph.is_some() {
                        paragraph_depth += 1;
                    } else if section_depth > 0 {
                        paragraph = Some((table_depth > 0, String::new()));
                        paragraph_depth = 1;
                    }
                }
            }
            Ok((_, Event::Text(e))) => {
                if let Some((_, text)) = paragraph.as_mut() {
                    match e.decode() {
                        Ok(chunk) => text.push_str(&chunk),
                        Err(_) => text.push_str(&String::from_utf8_lossy(&e)),
                    }
                }
            }
            Ok((_, Event::GeneralRef(e))) => {
                if let Some((_, text)) = paragraph.as_mut() {
                    if let Some(resolved) = resolve_reference(&e) {
                        text.push_str(&resolved);
                    }
                }
            }
            Ok((_, Event::CData(e))) => {
                if let Some((_, text)) = paragraph.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok((resolve, Event::End(e))) => {
                let name = e.local_name();
                if is_section(name.as_ref()) {
                    section_depth = section_depth.saturating_sub(1);
                } else if ns_matches(&resolve, TABLE_NS) && name.as_ref() == b"table" {
                    table_depth = table_depth.saturating_sub(1);
                } else if ns_matches(&resolve, TEXT_NS)
                    && name.as_ref() == b"p"
                    && paragraph.is_some()
                {
                    paragraph_depth = paragraph_depth.saturating_sub(1);
                    if paragraph_depth == 0 {
                        if let Some(finished) = paragraph.take() {
                            keep_paragraph(&mut texts, finished);
                        }
                    }
                }
            }
            Ok((_, Event::Eof)) => break,
            Ok(_) => {}
            Err(_) => break,
        }
        buf.clear();
    }

    // A document truncated mid-paragraph still contributes what it had.
    if let Some(unclosed) = paragraph.take() {
        keep_paragraph(&mut texts, unclosed);
    }

    let cleaned = clean_text(&texts.join("\n"));
    if cleaned.chars().count() > MIN_DOCUMENT_CHARS {
        Some(cleaned)
    } else {
        None
    }
}

fn keep_paragraph(texts: &mut Vec<String>, (in_table, text): (bool, String)) {
    let trimmed = text.trim();
    if !in_table && trimmed.chars().count() >= MIN_PARAGRAPH_CHARS {
        texts.push(trimmed.to_string());
    }
}

fn is_section(local_name: &[u8]) -> bool {
    SECTION_NAMES.iter().any(|s| s.as_bytes() == local_name)
}

fn ns_matches(resolve: &ResolveResult, expected: &[u8]) -> bool {
    matches!(resolve, ResolveResult::Bound(Namespace(ns)) if *ns == expected)
}
