//! Deterministic text normalization for harvested document bodies.
//!
//! Every extractor funnels its fragments through [`clean_text`] before a
//! record is built, so the published corpus stays stable across re-harvests:
//! markup remnants are stripped, whitespace is collapsed, and a fixed list of
//! procedural boilerplate phrases (sitting announcements, voting results,
//! speaker attributions, dossier codes) is removed.
//!
//! # Pattern order
//!
//! The boilerplate patterns run in their listed order. Later patterns assume
//! earlier ones already removed surrounding bracket or phrase context, so the
//! list must not be reordered.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

static MULTI_SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").expect("valid regex"));

/// Procedural boilerplate, matched case-insensitively and removed in order.
static BOILERPLATE: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // Sitting lifecycle announcements.
        r"\(The sitting (?:was suspended|opened|closed|ended) at.*?\)",
        r"\(Voting time ended at.*?\)",
        // Agenda item type markers.
        r"\((?:debat|stemming|vraag|interventie)\)",
        r"\(Het woord wordt gevoerd door:.*?\)",
        // Article/rule/item citations, optionally prefixed with a short
        // jurisdiction code, e.g. "(artikel 132, lid 2)" or "[Rule 159]".
        r"(\(|\[)\s*(?:(?:[a-zA-Z]{2,3})\s*(?:|\s|))?\s*(?:artikel|rule|punt|item)\s*\d+(?:,\s*lid\s*\d+)?\s*(?:\s+\w+)?\s*(\)|\])",
        // Dossier and procedure reference codes.
        r"\[(COM|A)\d+-\d+(/\d+)?\]",
        // Suspect: the `(` is optional and a literal `:` precedes the
        // scheme, so plain `(https://…)` parentheticals are never matched.
        // Kept as observed so re-harvests line up with previously published
        // shards.
        r"\(?:(?:http|https)://[^\s]+?\)",
        r"\[\s*\d{4}/\d{4}\(COD\)\]",
        r"\[\s*\d{4}/\d{4}\(INI\)\]",
        r"\[\s*\d{4}/\d{4}\(RSP\)\]",
        r"\[\s*\d{4}/\d{4}\(IMM\)\]",
        r"\[\s*\d{4}/\d{4}\(NLE\)\]",
        r"\[\s*\d{5}/\d{4}\s*-\s*C\d+-\d+/\d+\s*-\s*\d{4}/\d{4}\(NLE\)\]",
        // Voting result cross-references.
        r"\(“Stemmingsuitslagen”, punt \d+\)",
        // Chair interjections, including the bare "(de Voorzitter)".
        r"\(de Voorzitter(?: maakt na de toespraak van.*?| weigert in te gaan op.*?| stemt toe| herinnert eraan dat de gedragsregels moeten worden nageleefd| neemt er akte van|)\)",
        r"\(zie bijlage.*?\)",
        // Suspension/resumption lines keep their surrounding parentheses.
        r"\(\s*De vergadering wordt om.*?geschorst\.\)",
        r"\(\s*De vergadering wordt om.*?hervat\.\)",
        // Speaker attributions.
        r"Volgens de “catch the eye”-procedure wordt het woord gevoerd door.*?\.",
        r"Het woord wordt gevoerd door .*?\.",
        // Bare open/close announcements.
        r"De vergadering wordt om \d{1,2}\.\d{2} uur gesloten\.",
        r"De vergadering wordt om \d{1,2}\.\d{2} uur geopend\.",
        r"Het debat wordt gesloten\.",
        r"Stemming:.*?\.",
    ]
    .iter()
    .map(|pattern| {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .expect("valid regex")
    })
    .collect()
});

/// Normalize a raw document body into publishable text.
///
/// Strips leftover markup tags, collapses whitespace runs to single spaces,
/// removes every boilerplate match, and collapses again. Pure string
/// transformation with no I/O; callers apply their own minimum-length check
/// on the result, so an entirely-boilerplate input simply comes back empty.
///
/// # Arguments
///
/// * `text` - Raw body text, possibly still containing tag remnants
///
/// # Returns
///
/// The normalized text, trimmed, possibly empty.
pub fn clean_text(text: &str) -> String {
    let stripped = TAG_RE.replace_all(text, "");
    let mut cleaned = WHITESPACE_RE.replace_all(&stripped, " ").trim().to_string();
    for pattern in BOILERPLATE.iter() {
        cleaned = pattern.replace_all(&cleaned, "").to_string();
    }
    MULTI_SPACE_RE.replace_all(&cleaned, " ").trim().to_string()
}
