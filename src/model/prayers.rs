// File: ./src/model/prayers.rs
use serde::{Deserialize, Serialize};

const BUNDLED: &str = include_str!("../../assets/prayers.toml");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prayer {
    pub title: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrayerCategory {
    pub name: String,
    #[serde(default, rename = "prayer")]
    pub prayers: Vec<Prayer>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrayerBook {
    #[serde(default, rename = "category")]
    pub categories: Vec<PrayerCategory>,
}

impl PrayerBook {
    pub fn parse(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    /// The prayers shipped with the binary. An unreadable asset yields an empty book.
    pub fn bundled() -> Self {
        Self::parse(BUNDLED).unwrap_or_else(|e| {
            tracing::warn!("Bundled prayer book is unreadable: {}", e);
            Self::default()
        })
    }
}
