//! Per-source harvest pipeline.
//!
//! One call to [`harvest_source`] runs a source end to end: crawl its TOC
//! chain, then fetch and extract every discovered document over a shared
//! HTTP client. Documents are fetched sequentially; a failing document is
//! logged and skipped, never aborting the rest of the batch.

use crate::crawler;
use crate::language::LanguageGate;
use crate::models::{DocumentRecord, SourceConfig};
use crate::sources::{self, FetchOutcome};
use crate::utils::truncate_for_log;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Every archive request uses the same bounded timeout. A slow page is an
/// ordinary per-document failure, not something to retry.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Build the HTTP client shared across one crawl or fetch phase.
pub(crate) fn http_client() -> Result<Client, Box<dyn Error>> {
    Ok(Client::builder().timeout(REQUEST_TIMEOUT).build()?)
}

/// Harvest one source: crawl, fetch each document, collect the records.
///
/// # Returns
///
/// The records for every document that produced publishable text, or an
/// error if the crawl itself failed. Per-document failures only shrink the
/// result.
#[instrument(level = "info", skip_all, fields(source = %source.name))]
pub async fn harvest_source(
    source: &SourceConfig,
    gate: &LanguageGate,
) -> Result<Vec<DocumentRecord>, Box<dyn Error>> {
    let urls = crawler::collect_document_urls(source).await?;
    let client = http_client()?;

    let records: Vec<DocumentRecord> = stream::iter(urls)
        .then(|url: String| {
            let client = &client;
            async move {
                match sources::fetch_document(client, &url, source.kind, gate).await {
                    FetchOutcome::Text(text) => {
                        debug!(%url, preview = %truncate_for_log(&text, 120), "Harvested document");
                        Some(DocumentRecord {
                            url,
                            text,
                            source: source.source_label.clone(),
                        })
                    }
                    FetchOutcome::Empty => {
                        debug!(%url, "Document yielded no publishable text");
                        None
                    }
                    FetchOutcome::Failed(e) => {
                        warn!(error = %e, %url, "Document fetch failed, skipping");
                        None
                    }
                }
            }
        })
        .filter_map(std::future::ready)
        .collect()
        .await;

    info!(count = records.len(), source = %source.name, "Harvested records");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceKind;
    use mockito::Server;
    use whatlang::Lang;

    fn dutch_gate() -> LanguageGate {
        LanguageGate::new(Lang::Nld)
    }

    fn test_source(kind: SourceKind, start_url: String, label: &str) -> SourceConfig {
        SourceConfig {
            name: "Test".to_string(),
            start_url,
            dataset_name: "Test-Dataset".to_string(),
            kind,
            source_label: label.to_string(),
        }
    }

    const ADOPTED_BODY: &str = "<html><body>\
        <p>Het Parlement heeft vandaag het verslag over de begroting aangenomen met grote meerderheid.</p>\
        <p>De rapporteur wordt gefeliciteerd met het bereikte resultaat.</p>\
        </body></html>";

    #[tokio::test]
    async fn test_harvest_adopted_texts_end_to_end() {
        let mut server = Server::new_async().await;

        let toc = |day: u8, next: Option<u8>| {
            let link = next
                .map(|n| {
                    format!(
                        r#"<a title="Volgende" href="/doceo/document/TA-5-2000-01-0{n}-TOC_NL.html">Volgende</a>"#
                    )
                })
                .unwrap_or_default();
            format!(r#"<html><body><p>Inhoud {day}</p>{link}</body></html>"#)
        };

        let _toc1 = server
            .mock("GET", "/doceo/document/TA-5-2000-01-01-TOC_NL.html")
            .with_body(toc(1, Some(2)))
            .create_async()
            .await;
        let _toc2 = server
            .mock("GET", "/doceo/document/TA-5-2000-01-02-TOC_NL.html")
            .with_body(toc(2, Some(3)))
            .create_async()
            .await;
        let _toc3 = server
            .mock("GET", "/doceo/document/TA-5-2000-01-03-TOC_NL.html")
            .with_body(toc(3, None))
            .create_async()
            .await;
        let _doc1 = server
            .mock("GET", "/doceo/document/TA-5-2000-01-01_NL.html")
            .with_body(ADOPTED_BODY)
            .create_async()
            .await;
        let _doc2 = server
            .mock("GET", "/doceo/document/TA-5-2000-01-02_NL.html")
            .with_body(ADOPTED_BODY)
            .create_async()
            .await;
        let _doc3 = server
            .mock("GET", "/doceo/document/TA-5-2000-01-03_NL.html")
            .with_body(ADOPTED_BODY)
            .create_async()
            .await;

        let source = test_source(
            SourceKind::AdoptedTexts,
            format!("{}/doceo/document/TA-5-2000-01-01-TOC_NL.html", server.url()),
            "European Parliament Adopted Texts",
        );
        let records = harvest_source(&source, &dutch_gate()).await.unwrap();

        assert_eq!(records.len(), 3);
        for (record, day) in records.iter().zip(1u8..) {
            assert_eq!(
                record.url,
                format!("{}/doceo/document/TA-5-2000-01-0{day}_NL.html", server.url())
            );
            assert_eq!(record.source, "European Parliament Adopted Texts");
            assert!(record.text.contains("verslag over de begroting"));
        }
    }

    #[tokio::test]
    async fn test_harvest_minutes_falls_back_to_html_when_xml_missing() {
        let mut server = Server::new_async().await;

        let _toc = server
            .mock("GET", "/doceo/document/PV-5-2003-05-12-TOC_NL.html")
            .with_body("<html><body><p>Inhoud</p></body></html>")
            .create_async()
            .await;
        let _missing_xml = server
            .mock("GET", "/doceo/document/PV-5-2003-05-12_NL.xml")
            .with_status(404)
            .create_async()
            .await;
        let _html = server
            .mock("GET", "/doceo/document/PV-5-2003-05-12_NL.html")
            .with_body(ADOPTED_BODY)
            .create_async()
            .await;

        let source = test_source(
            SourceKind::Minutes,
            format!("{}/doceo/document/PV-5-2003-05-12-TOC_NL.html", server.url()),
            "European Parliament Minutes",
        );
        let records = harvest_source(&source, &dutch_gate()).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].url,
            format!("{}/doceo/document/PV-5-2003-05-12_NL.xml", server.url())
        );
        // The fallback runs the plain paragraph extractor over the HTML.
        assert_eq!(
            records[0].text,
            sources::paragraph_text(ADOPTED_BODY).unwrap()
        );
    }

    #[tokio::test]
    async fn test_harvest_skips_failing_documents() {
        let mut server = Server::new_async().await;

        let _toc1 = server
            .mock("GET", "/doceo/document/TA-5-2000-01-01-TOC_NL.html")
            .with_body(
                r#"<html><body><a title="Volgende" href="/doceo/document/TA-5-2000-01-02-TOC_NL.html">Volgende</a></body></html>"#,
            )
            .create_async()
            .await;
        let _toc2 = server
            .mock("GET", "/doceo/document/TA-5-2000-01-02-TOC_NL.html")
            .with_body("<html><body><p>Einde</p></body></html>")
            .create_async()
            .await;
        let _broken = server
            .mock("GET", "/doceo/document/TA-5-2000-01-01_NL.html")
            .with_status(500)
            .create_async()
            .await;
        let _good = server
            .mock("GET", "/doceo/document/TA-5-2000-01-02_NL.html")
            .with_body(ADOPTED_BODY)
            .create_async()
            .await;

        let source = test_source(
            SourceKind::AdoptedTexts,
            format!("{}/doceo/document/TA-5-2000-01-01-TOC_NL.html", server.url()),
            "European Parliament Adopted Texts",
        );
        let records = harvest_source(&source, &dutch_gate()).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].url,
            format!("{}/doceo/document/TA-5-2000-01-02_NL.html", server.url())
        );
    }

    #[tokio::test]
    async fn test_harvest_propagates_crawl_failure() {
        let mut server = Server::new_async().await;

        let _toc = server
            .mock("GET", "/doceo/document/PV-5-2003-05-12-TOC_NL.html")
            .with_status(500)
            .create_async()
            .await;

        let source = test_source(
            SourceKind::Minutes,
            format!("{}/doceo/document/PV-5-2003-05-12-TOC_NL.html", server.url()),
            "European Parliament Minutes",
        );
        assert!(harvest_source(&source, &dutch_gate()).await.is_err());
    }
}
