pub mod cache;
pub mod calendar;
pub mod client;
pub mod config;
pub mod hymns;
pub mod model;
pub mod presenter;
pub mod storage;

#[cfg(feature = "tui")]
pub mod tui;
