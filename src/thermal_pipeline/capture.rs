//! Capture loop
//!
//! Owns one frame source and one frame sink and drives frames from the first to
//! the second on a dedicated thread.

mod diagnostics;
mod pipeline;
mod types;

pub use diagnostics::{Diagnostics, FailureStage, FrameReport, LoopStats, StatsSnapshot};
pub use pipeline::CaptureLoop;
pub use types::{CaptureConfig, CaptureConfigBuilder, CaptureState};
