//! Common utilities module
//!
//! Shared error type and timing helpers used across the thermal pipeline.

pub mod error;
pub mod timing;

pub use error::{PipelineError, Result};
pub use timing::{StageTimings, Timer};
