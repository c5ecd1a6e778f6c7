// File: ./src/model/scripture.rs
// Reading references and passage text helpers
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;
use std::sync::LazyLock;

static VERSE_DOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d)\.(\d)").expect("valid regex"));
static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{2,}").expect("valid regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Reduces a calendar reference to something the Bible API understands.
/// "1 Timothy 1.18-20, 2.8-15" becomes "1 Timothy 1:18-20".
pub fn normalise_reference(reference: &str) -> String {
    let first = reference.split(',').next().unwrap_or("").trim();
    VERSE_DOT.replace_all(first, "$1:$2").into_owned()
}

/// Reference as shown to the user: without a trailing full stop.
pub fn display_reference(reference: &str) -> &str {
    reference.strip_suffix('.').unwrap_or(reference)
}

/// Collapses whitespace inside paragraphs and keeps paragraph breaks.
pub fn normalize_reading_text(raw: &str) -> String {
    let unix = raw.replace("\r\n", "\n");
    PARAGRAPH_BREAK
        .split(&unix)
        .map(|p| WHITESPACE.replace_all(p, " ").trim().to_string())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// `encodeURIComponent` leaves these unreserved marks alone.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encodes a path component the way `encodeURIComponent` does.
pub fn encode_component(input: &str) -> String {
    utf8_percent_encode(input, COMPONENT).to_string()
}

pub fn loaded_passage(display_ref: &str, translation: &str, text: &str) -> String {
    format!(
        "{} ({})\n\n{}",
        display_ref,
        translation.to_uppercase(),
        text.trim()
    )
}

pub fn unavailable_passage(display_ref: &str) -> String {
    format!(
        "{}\n\nPassage text could not be loaded. Please open this reference in your Bible.",
        display_ref
    )
}
