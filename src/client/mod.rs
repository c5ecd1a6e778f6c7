// File: ./src/client/mod.rs
// re-exports the calendar and scripture client modules
pub mod cert;
pub mod core;

pub use self::core::{ApiError, LoadedDay, OrthoClient};
