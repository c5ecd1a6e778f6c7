// File: ./src/model/day.rs
// A day's liturgical data as returned by the calendar provider
use crate::model::document::Document;
use anyhow::Result;
use serde::{Deserialize, Deserializer, Serialize};

/// Providers send `null` for empty lists and strings; treat it as empty.
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    #[serde(default, deserialize_with = "null_default")]
    pub source: String,
    #[serde(default, deserialize_with = "null_default")]
    pub display: String,
    #[serde(default, deserialize_with = "null_default")]
    pub short_display: String,
}

impl Reading {
    pub fn reference(&self) -> &str {
        if !self.display.is_empty() {
            &self.display
        } else {
            &self.short_display
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayRecord {
    #[serde(default, deserialize_with = "null_default")]
    pub year: i32,
    #[serde(default, deserialize_with = "null_default")]
    pub month: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub day: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub fast_level_desc: String,
    #[serde(default, deserialize_with = "null_default")]
    pub fast_exception_desc: String,
    #[serde(default, deserialize_with = "null_default")]
    pub fast_name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub fast_period: String,
    #[serde(default, deserialize_with = "null_default")]
    pub saints: Vec<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub feasts: Vec<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub service_notes: Vec<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub readings: Vec<Reading>,
}

/// Typed fields plus the whole payload, kept for detail lookups.
#[derive(Debug, Clone, PartialEq)]
pub struct LiturgicalDay {
    pub record: DayRecord,
    pub document: Document,
}

impl LiturgicalDay {
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let record = DayRecord::deserialize(&value)?;
        Ok(Self {
            record,
            document: value.into(),
        })
    }

    pub fn references(&self) -> Vec<String> {
        self.record
            .readings
            .iter()
            .map(|r| r.reference().to_string())
            .collect()
    }
}
