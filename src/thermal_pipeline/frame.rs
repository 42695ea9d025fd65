//! Frame types
//!
//! Raw sensor frames, display windows and RGB output frames.

pub mod types;

pub use types::{OutputFrame, RawFrame, Window, SENSOR_HEIGHT, SENSOR_WIDTH};
