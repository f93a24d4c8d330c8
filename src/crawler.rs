//! Pagination crawler for table-of-contents chains.
//!
//! Every source publishes its documents behind a linked list of TOC pages
//! joined by "Volgende" (next) links. The crawler walks that list once,
//! rewriting each TOC URL into the document URL it fronts, and stops on the
//! first missing link or on a link that circles back to a page already seen.
//! There is no retry: the walk is a single best-effort forward pass.

use crate::harvest::http_client;
use crate::models::SourceConfig;
use crate::sources::element_text;
use once_cell::sync::Lazy;
use reqwest::StatusCode;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::error::Error;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// The archive's next-page links carry this exact title in its interface
/// language; older page templates only put the word in the link text.
const NEXT_LABEL: &str = "Volgende";

static NEXT_TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"a[title="Volgende"]"#).expect("valid selector"));

static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("valid selector"));

/// Walk a source's TOC chain and collect its document URLs in crawl order.
///
/// Each visited TOC page contributes one document URL via the source's
/// rewrite rule. A not-found TOC page ends the walk quietly for sources
/// that tolerate gaps; any other unsuccessful response fails the crawl.
///
/// # Returns
///
/// The ordered document URLs, or an error if a TOC fetch fails.
#[instrument(level = "info", skip_all, fields(source = %source.name))]
pub async fn collect_document_urls(source: &SourceConfig) -> Result<Vec<String>, Box<dyn Error>> {
    let client = http_client()?;
    let mut urls = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut current = source.start_url.clone();

    while !visited.contains(&current) {
        visited.insert(current.clone());

        let response = client.get(&current).send().await?;
        if response.status() == StatusCode::NOT_FOUND && source.kind.tolerates_missing_toc() {
            warn!(%current, "TOC page missing, treating as end of series");
            break;
        }
        let body = response.error_for_status()?.text().await?;
        let page = Html::parse_document(&body);

        urls.push(source.kind.document_url(&current));

        let Some(href) = next_page_href(&page) else {
            debug!(%current, "No next link, crawl complete");
            break;
        };
        current = Url::parse(&current)?.join(&href)?.to_string();
    }

    info!(count = urls.len(), source = %source.name, "Collected document URLs");
    debug!(urls = ?urls, "Document URLs");

    Ok(urls)
}

/// Locate the next-page link target on a TOC page.
///
/// Two-step lookup: an anchor whose `title` is exactly the next label wins;
/// otherwise the first anchor whose visible text contains the label
/// case-insensitively. The first step short-circuits: a title match without
/// a usable `href` ends the crawl rather than falling through to the text
/// scan.
fn next_page_href(page: &Html) -> Option<String> {
    let label = NEXT_LABEL.to_lowercase();
    let anchor = page.select(&NEXT_TITLE_SELECTOR).next().or_else(|| {
        page.select(&ANCHOR_SELECTOR)
            .find(|a| element_text(*a).to_lowercase().contains(&label))
    })?;
    anchor
        .value()
        .attr("href")
        .filter(|href| !href.is_empty())
        .map(str::to_string)
}
