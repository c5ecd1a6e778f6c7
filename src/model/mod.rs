// File: ./src/model/mod.rs
// Aggregates the provider data model and the pure logic built on it
pub mod day;
pub mod detail;
pub mod document;
pub mod fast;
pub mod prayers;
pub mod scripture;

pub use day::{DayRecord, LiturgicalDay, Reading};
pub use document::Document;
pub use fast::{FastRule, FoodCategory, classify};
pub use prayers::{Prayer, PrayerBook, PrayerCategory};
