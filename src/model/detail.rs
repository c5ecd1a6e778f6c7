// File: ./src/model/detail.rs
// Locates descriptive text for saints and feasts inside a day payload
use crate::model::document::{Document, Fallback, TextMatcher, deep_search};
use html2text::render::text_renderer::TrivialDecorator;
use regex::Regex;
use std::sync::LazyLock;

/// Generic titles that say nothing about which saint a text is about.
const STOP_WORDS: &[&str] = &[
    "saint",
    "st",
    "holy",
    "most",
    "great",
    "martyr",
    "martyrs",
    "venerable",
    "apostle",
    "hieromartyr",
    "wonderworker",
    "and",
    "of",
    "the",
    "with",
    "from",
    "in",
    "on",
    "for",
    "to",
    "our",
    "father",
    "mother",
    "virgin",
    "confessor",
    "bishop",
    "priest",
    "monk",
    "nun",
    "new",
    "equal",
    "apostles",
];

const MIN_KEYWORD_LEN: usize = 3;
const REQUIRED_HITS: usize = 2;

/// Matches text mentioning enough of a name's keywords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordOverlap {
    keywords: Vec<String>,
    required_hits: usize,
}

impl KeywordOverlap {
    pub fn new(keywords: Vec<String>, required_hits: usize) -> Self {
        Self {
            keywords,
            required_hits,
        }
    }

    pub fn for_commemoration(name: &str) -> Self {
        let keywords = name
            .trim()
            .to_lowercase()
            .split_whitespace()
            .map(|w| w.chars().filter(|c| c.is_alphanumeric()).collect::<String>())
            .filter(|w| w.chars().count() > MIN_KEYWORD_LEN && !STOP_WORDS.contains(&w.as_str()))
            .collect();
        Self::new(keywords, REQUIRED_HITS)
    }

    pub fn for_feast(name: &str) -> Self {
        let keywords = name
            .trim()
            .to_lowercase()
            .split_whitespace()
            .filter(|w| w.chars().count() > MIN_KEYWORD_LEN)
            .map(str::to_string)
            .collect();
        Self::new(keywords, REQUIRED_HITS)
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

impl TextMatcher for KeywordOverlap {
    fn is_match(&self, text_lower: &str) -> bool {
        self.keywords
            .iter()
            .filter(|w| text_lower.contains(w.as_str()))
            .nth(self.required_hits.saturating_sub(1))
            .is_some()
    }
}

/// Where a provider may list details explicitly, and under which keys.
struct Listing {
    key: &'static str,
    title_keys: &'static [&'static str],
    text_keys: &'static [&'static str],
}

const COMMEMORATIONS: Listing = Listing {
    key: "commemorations",
    title_keys: &["title", "name", "commemoration"],
    text_keys: &["text", "description", "bio", "life", "synaxarion"],
};

const SAINT_DETAILS: Listing = Listing {
    key: "saint_details",
    title_keys: &["title", "name"],
    text_keys: &["text", "description"],
};

const FEAST_DETAILS: Listing = Listing {
    key: "feast_details",
    title_keys: &["title", "name", "feast"],
    text_keys: &["text", "description", "note"],
};

fn find_in_listing<'a>(doc: &'a Document, listing: &Listing, name_lower: &str) -> Option<&'a str> {
    let items = doc.get(listing.key)?.as_sequence()?;
    items.iter().find_map(|item| {
        let text = item.first_text(listing.text_keys)?;
        let title = item.first_text(listing.title_keys).unwrap_or("").trim().to_lowercase();
        if !title.is_empty() && (title.contains(name_lower) || name_lower.contains(&title)) {
            Some(text.trim())
        } else {
            None
        }
    })
}

/// Descriptive text for a saint commemorated on the day, if the payload has one.
pub fn commemoration_detail<'a>(doc: &'a Document, name: &str) -> Option<&'a str> {
    let n = name.trim().to_lowercase();
    if n.is_empty() {
        return None;
    }
    find_in_listing(doc, &COMMEMORATIONS, &n)
        .or_else(|| find_in_listing(doc, &SAINT_DETAILS, &n))
        .or_else(|| {
            deep_search(
                doc,
                &KeywordOverlap::for_commemoration(name),
                Fallback::None,
            )
        })
}

/// Descriptive text for a feast. Falls back to any long text in the payload.
pub fn feast_detail<'a>(doc: &'a Document, name: &str) -> Option<&'a str> {
    let n = name.trim().to_lowercase();
    if n.is_empty() {
        return None;
    }
    find_in_listing(doc, &FEAST_DETAILS, &n).or_else(|| {
        deep_search(
            doc,
            &KeywordOverlap::for_feast(name),
            Fallback::FirstLongText,
        )
    })
}

const FEAST_DESCRIPTIONS: &[(&[&str], &str)] = &[
    (
        &["theotokos", "mother of god"],
        "Feast of the Theotokos, honouring the Mother of God in the life of the Church.",
    ),
    (
        &["nativity", "birth"],
        "Feast of the Nativity, celebrating the birth connected with this event.",
    ),
    (
        &["entry", "presentation"],
        "Feast recalling the entry into the holy place and dedication to God.",
    ),
    (
        &["resurrection", "pascha"],
        "Feast of the Resurrection, centred on the victory of Christ over death.",
    ),
];

const FEAST_DESCRIPTION_DEFAULT: &str =
    "Feast kept today in the Orthodox Church in honour of this event or saint.";

const SERVICE_NOTE_DESCRIPTIONS: &[(&[&str], &str)] = &[
    (
        &["great canon"],
        "A long penitential canon by St Andrew of Crete, appointed in the services of Great Lent.",
    ),
    (
        &["presanctified"],
        "A Liturgy of the Presanctified Gifts, served on certain weekdays of Great Lent.",
    ),
    (
        &["akathist"],
        "A hymn of praise chanted standing, often in honour of the Theotokos or a saint.",
    ),
    (
        &["memorial", "panikhida"],
        "Memorial prayers offered for the departed.",
    ),
];

const SERVICE_NOTE_DEFAULT: &str = "Liturgical note for today\u{2019}s services in the Orthodox Church.";

fn describe(text: &str, table: &[(&[&str], &'static str)], default: &'static str) -> &'static str {
    let t = text.trim().to_lowercase();
    if t.is_empty() {
        return "";
    }
    table
        .iter()
        .find(|(keys, _)| keys.iter().any(|k| t.contains(k)))
        .map(|(_, desc)| *desc)
        .unwrap_or(default)
}

/// Canned description for a feast with no detail in the payload.
pub fn feast_description(name: &str) -> &'static str {
    describe(name, FEAST_DESCRIPTIONS, FEAST_DESCRIPTION_DEFAULT)
}

pub fn service_note_description(note: &str) -> &'static str {
    describe(note, SERVICE_NOTE_DESCRIPTIONS, SERVICE_NOTE_DEFAULT)
}

static BLANK_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// Wide enough that html2text never wraps; the front-ends wrap themselves.
const UNWRAPPED: usize = 1 << 16;

/// Plain-text rendition of provider details that may carry HTML.
pub fn strip_markup(text: &str) -> String {
    let text = text.trim();
    if !text.contains(['<', '>', '&']) {
        return text.to_string();
    }
    let rendered =
        html2text::from_read_with_decorator(text.as_bytes(), UNWRAPPED, TrivialDecorator::new());
    let plain = rendered
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");
    BLANK_RUNS.replace_all(plain.trim(), "\n\n").into_owned()
}
