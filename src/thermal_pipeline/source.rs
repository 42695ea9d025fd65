//! Frame sources
//!
//! Device-agnostic acquisition of raw 16-bit frames.

mod raw_stream_source;
mod reader;
mod synthetic_source;
mod tiff_replay_source;

pub use raw_stream_source::{RawStreamSource, SensorLayout};
pub use reader::FrameSource;
pub use synthetic_source::SyntheticSource;
pub use tiff_replay_source::TiffReplaySource;

#[cfg(test)]
mod tests;
