//! Data models for archive sources and harvested documents.
//!
//! This module defines the core data structures used throughout the
//! application:
//! - [`SourceKind`]: which crawl and extraction strategy a source uses
//! - [`SourceConfig`]: immutable descriptor for one archive document series
//! - [`DocumentRecord`]: one normalized document, the unit handed to the
//!   dataset publisher
//!
//! The record's origin field serializes as `URL` to match the published
//! dataset schema, hence the serde rename.

use serde::{Deserialize, Serialize};

/// The three document series the archive publishes per sitting, each with
/// its own URL layout and body format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Adopted texts: plain HTML body, harvested paragraph by paragraph.
    AdoptedTexts,
    /// Sitting minutes: OpenOffice-style namespaced XML, with an HTML
    /// rendering as fallback.
    Minutes,
    /// Verbatim reports: multilingual body served as XML or HTML under
    /// inconsistent naming.
    VerbatimReports,
}

impl SourceKind {
    /// Rewrite a table-of-contents page URL into the URL of the document it
    /// fronts.
    ///
    /// Each series encodes the relationship differently: adopted texts drop
    /// the `-TOC` token, minutes swap the TOC suffix for the XML document,
    /// verbatim reports swap it for the HTML document.
    pub fn document_url(&self, toc_url: &str) -> String {
        match self {
            SourceKind::AdoptedTexts => toc_url.replace("-TOC", ""),
            SourceKind::Minutes => toc_url.replace("-TOC_NL.html", "_NL.xml"),
            SourceKind::VerbatimReports => toc_url.replace("-TOC_NL.html", "_NL.html"),
        }
    }

    /// Whether a missing TOC page ends the crawl quietly rather than failing
    /// it.
    ///
    /// The adopted-texts series has gaps (sittings that adopted nothing), so
    /// a not-found there means end of series. The other series are dense;
    /// a missing page is a real error.
    pub fn tolerates_missing_toc(&self) -> bool {
        matches!(self, SourceKind::AdoptedTexts)
    }
}

/// Immutable descriptor for one harvested source, created once at startup.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Short display name used in logs.
    pub name: String,
    /// First TOC page of the series; the crawl walks forward from here.
    pub start_url: String,
    /// Dataset identifier the records are published under.
    pub dataset_name: String,
    /// Crawl and extraction strategy.
    pub kind: SourceKind,
    /// Human-readable label stamped on every record.
    pub source_label: String,
}

impl SourceConfig {
    /// The fixed list of harvested sources.
    pub fn builtin() -> Vec<SourceConfig> {
        vec![
            SourceConfig {
                name: "Adopted Texts".to_string(),
                start_url: "https://www.europarl.europa.eu/doceo/document/TA-5-1999-07-21-TOC_NL.html"
                    .to_string(),
                dataset_name: "Dutch-European-Parliament-Adopted-Texts".to_string(),
                kind: SourceKind::AdoptedTexts,
                source_label: "European Parliament Adopted Texts".to_string(),
            },
            SourceConfig {
                name: "Minutes".to_string(),
                start_url: "https://www.europarl.europa.eu/doceo/document/PV-5-2003-05-12-TOC_NL.html"
                    .to_string(),
                dataset_name: "Dutch-European-Parliament-Minutes".to_string(),
                kind: SourceKind::Minutes,
                source_label: "European Parliament Minutes".to_string(),
            },
            SourceConfig {
                name: "Verbatim Reports".to_string(),
                start_url: "https://www.europarl.europa.eu/doceo/document/CRE-4-1996-04-15-TOC_NL.html"
                    .to_string(),
                dataset_name: "Dutch-European-Parliament-Verbatim-Reports".to_string(),
                kind: SourceKind::VerbatimReports,
                source_label: "European Parliament Verbatim Report".to_string(),
            },
        ]
    }
}

/// One normalized document ready for publication.
///
/// Immutable once constructed. A record only exists if the cleaned text
/// passed the per-source length and language checks.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DocumentRecord {
    /// Origin document URL; serialized as `URL` per the dataset schema.
    #[serde(rename = "URL")]
    pub url: String,
    /// Normalized body text.
    pub text: String,
    /// Source label, copied from the owning [`SourceConfig`].
    pub source: String,
}
