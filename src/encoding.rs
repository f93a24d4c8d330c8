//! Mojibake repair for double-decoded verbatim report bodies.
//!
//! Older verbatim reports were stored as UTF-8 but passed through a
//! windows-1252 stage somewhere in the archive's history, so "é" arrives as
//! "Ã©". [`repair_text`] reverses that double decoding where the reversal is
//! lossless and leaves everything else untouched.

use encoding_rs::WINDOWS_1252;

/// Some documents are mangled more than once; three reversals covers every
/// depth seen in the archive.
const MAX_REPAIR_PASSES: usize = 3;

/// Undo UTF-8-read-as-windows-1252 double decoding.
///
/// Applies [`repair_once`] until it reports the text clean, bounded by
/// [`MAX_REPAIR_PASSES`]. Pure string transformation; text that needs no
/// repair comes back unchanged.
pub fn repair_text(text: &str) -> String {
    let mut current = text.to_string();
    for _ in 0..MAX_REPAIR_PASSES {
        match repair_once(&current) {
            Some(repaired) => current = repaired,
            None => break,
        }
    }
    current
}

/// One reversal step: re-encode as windows-1252, reinterpret as UTF-8.
///
/// Returns `None` when the text is already clean: pure ASCII, characters
/// windows-1252 cannot encode, or re-encoded bytes that are not valid UTF-8
/// (a genuine accented character rather than a mojibake pair).
fn repair_once(text: &str) -> Option<String> {
    if text.is_ascii() {
        return None;
    }
    let (bytes, _, had_errors) = WINDOWS_1252.encode(text);
    if had_errors {
        return None;
    }
    match String::from_utf8(bytes.into_owned()) {
        Ok(candidate) if candidate != text => Some(candidate),
        _ => None,
    }
}
