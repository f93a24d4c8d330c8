//! Per-source document fetching and extraction strategies.
//!
//! This module contains submodules for the three document series the archive
//! publishes per sitting. Each follows the same pattern: fetch the document
//! over the shared per-source HTTP client, extract raw text fragments with
//! source-specific structural rules, then normalize and length-check the
//! result.
//!
//! # Supported sources
//!
//! | Source | Module | Body format | Notes |
//! |--------|--------|-------------|-------|
//! | Adopted Texts | [`adopted_texts`] | Plain HTML | Every paragraph is body text |
//! | Minutes | [`minutes`] | OpenOffice-style XML | Falls back to the HTML rendering when the XML is missing |
//! | Verbatim Reports | [`verbatim`] | XML or HTML, multilingual | Language-tagged fragments, gated by detection |
//!
//! # Common patterns
//!
//! Each submodule exports a `fetch_text` function returning
//! `Result<Option<String>>`: `Ok(Some)` is publishable text, `Ok(None)` means
//! the document had nothing publishable (wrong language, too short, not yet
//! translated), and `Err` is a per-document failure the caller logs and
//! skips. [`fetch_document`] folds that triple into a [`FetchOutcome`] so the
//! harvest loop cannot accidentally abort on one bad document.

pub mod adopted_texts;
pub mod minutes;
pub mod verbatim;

use crate::cleaning::clean_text;
use crate::language::LanguageGate;
use crate::models::SourceKind;
use once_cell::sync::Lazy;
use quick_xml::events::BytesRef;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::error::Error;
use tracing::instrument;

/// A cleaned document must exceed this many characters to become a record.
pub(crate) const MIN_DOCUMENT_CHARS: usize = 50;

/// Boilerplate the archive serves while a translation is pending. A body
/// containing it is deliberately excluded, distinct from ordinary emptiness.
pub(crate) const UNTRANSLATED_PLACEHOLDER: &str =
    "deze tekst wordt nog verwerkt voor publicatie in uw taal";

static PARAGRAPH_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p").expect("valid selector"));

/// The result of fetching one document URL.
///
/// Only [`FetchOutcome::Text`] produces a record; the other variants are
/// logged by the harvest loop and never abort it.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Normalized text that passed every per-source check.
    Text(String),
    /// The document was fetched but yielded nothing publishable.
    Empty,
    /// The fetch or parse failed; the document is skipped.
    Failed(Box<dyn Error>),
}

/// Fetch one document with the strategy its source kind prescribes.
#[instrument(level = "debug", skip_all, fields(%url, ?kind))]
pub async fn fetch_document(
    client: &Client,
    url: &str,
    kind: SourceKind,
    gate: &LanguageGate,
) -> FetchOutcome {
    let result = match kind {
        SourceKind::AdoptedTexts => adopted_texts::fetch_text(client, url).await,
        SourceKind::Minutes => minutes::fetch_text(client, url).await,
        SourceKind::VerbatimReports => verbatim::fetch_text(client, url, gate).await,
    };
    match result {
        Ok(Some(text)) => FetchOutcome::Text(text),
        Ok(None) => FetchOutcome::Empty,
        Err(e) => FetchOutcome::Failed(e),
    }
}

/// Flatten an element to text: each text node trimmed, empties dropped,
/// the rest joined with single spaces.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Harvest every non-empty `<p>` of an HTML document into normalized text.
///
/// Used as the primary extractor for adopted texts and as the fallback for
/// minutes served without their XML. Returns `None` when the cleaned result
/// is too short or is the untranslated-body placeholder.
pub(crate) fn paragraph_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let paragraphs: Vec<String> = document
        .select(&PARAGRAPH_SELECTOR)
        .map(element_text)
        .filter(|t| !t.is_empty())
        .collect();

    let cleaned = clean_text(&paragraphs.join("\n"));
    if cleaned.chars().count() <= MIN_DOCUMENT_CHARS {
        return None;
    }
    if cleaned.to_lowercase().contains(UNTRANSLATED_PLACEHOLDER) {
        return None;
    }
    Some(cleaned)
}

/// Replacement text for a general reference in XML content: numeric
/// character references and the five predefined entities. Undeclared
/// entities resolve to nothing.
pub(crate) fn resolve_reference(reference: &BytesRef<'_>) -> Option<String> {
    if let Ok(Some(ch)) = reference.resolve_char_ref() {
        return Some(ch.to_string());
    }
    let replacement = match reference.decode().ok()?.as_ref() {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        _ => return None,
    };
    Some(replacement.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_text_joins_trimmed_text_nodes() {
        let fragment = Html::parse_fragment("<p>  Hallo   <b>wereld</b> ! </p>");
        let selector = Selector::parse("p").unwrap();
        let p = fragment.select(&selector).next().unwrap();
        assert_eq!(element_text(p), "Hallo wereld !");
    }

    #[test]
    fn test_paragraph_text_joins_paragraphs_in_order() {
        let html = "<html><body>\
            <p>Het Parlement keurt de agenda goed en gaat over tot de behandeling van alle punten.</p>\
            <p>   </p>\
            <p>De leden nemen kennis van het verslag.</p>\
            </body></html>";
        assert_eq!(
            paragraph_text(html).unwrap(),
            "Het Parlement keurt de agenda goed en gaat over tot de behandeling van alle punten. De leden nemen kennis van het verslag."
        );
    }

    #[test]
    fn test_paragraph_text_enforces_minimum_length() {
        let at_threshold = format!("<p>{}</p>", "x".repeat(50));
        assert_eq!(paragraph_text(&at_threshold), None);

        let above_threshold = format!("<p>{}</p>", "x".repeat(51));
        assert_eq!(paragraph_text(&above_threshold), Some("x".repeat(51)));
    }

    #[test]
    fn test_paragraph_text_rejects_untranslated_placeholder() {
        let html = "<p>Deze tekst wordt nog verwerkt voor publicatie in uw taal. Komt u later terug.</p>";
        assert_eq!(paragraph_text(html), None);
    }

    #[test]
    fn test_paragraph_text_empty_document() {
        assert_eq!(paragraph_text("<html><body></body></html>"), None);
    }
}
