// File: ./src/model/document.rs
// Loosely-typed view of provider payloads, for heuristic lookups
use serde_json::Value;

/// Texts at or below this length are never considered as details.
pub const MIN_DETAIL_LEN: usize = 200;

#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Text(String),
    Mapping(Vec<(String, Document)>),
    Sequence(Vec<Document>),
    Scalar,
}

impl From<Value> for Document {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => Document::Text(s),
            Value::Array(items) => Document::Sequence(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => {
                Document::Mapping(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
            _ => Document::Scalar,
        }
    }
}

impl Document {
    pub fn get(&self, key: &str) -> Option<&Document> {
        match self {
            Document::Mapping(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Document::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Document]> {
        match self {
            Document::Sequence(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// First of `keys` holding a non-empty text.
    pub fn first_text(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|k| self.get(k).and_then(Document::as_text))
            .find(|s| !s.is_empty())
    }
}

/// Decides whether a long text block is about the thing being looked up.
pub trait TextMatcher {
    /// `text_lower` is the trimmed, lower-cased candidate.
    fn is_match(&self, text_lower: &str) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    None,
    /// Settle for the first long text of a mapping that had no match.
    FirstLongText,
}

/// Depth-first scan for a long text block accepted by `matcher`.
pub fn deep_search<'a>(
    doc: &'a Document,
    matcher: &dyn TextMatcher,
    fallback: Fallback,
) -> Option<&'a str> {
    match doc {
        Document::Sequence(items) => items
            .iter()
            .filter(|d| matches!(d, Document::Mapping(_) | Document::Sequence(_)))
            .find_map(|d| deep_search(d, matcher, fallback)),
        Document::Mapping(entries) => {
            let mut candidate = None;
            for (_, value) in entries {
                match value {
                    Document::Text(s) => {
                        let text = s.trim();
                        // Length in chars, not UTF-16 units; only astral-plane text counts differently.
                        if text.chars().count() > MIN_DETAIL_LEN {
                            if matcher.is_match(&text.to_lowercase()) {
                                return Some(text);
                            }
                            if candidate.is_none() {
                                candidate = Some(text);
                            }
                        }
                    }
                    Document::Mapping(_) | Document::Sequence(_) => {
                        if let Some(found) = deep_search(value, matcher, fallback) {
                            return Some(found);
                        }
                    }
                    Document::Scalar => {}
                }
            }
            match fallback {
                Fallback::FirstLongText => candidate,
                Fallback::None => None,
            }
        }
        _ => None,
    }
}
