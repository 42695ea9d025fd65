//! Tunable parameters
//!
//! The typed parameter record, the lock-free store external writers update, and
//! the JSON settings file the host persists it in.

pub mod settings;
pub mod shared;
pub mod types;

#[cfg(test)]
mod tests;

pub use settings::{Settings, default_settings_path};
pub use shared::SharedParameters;
pub use types::ToneParameters;
