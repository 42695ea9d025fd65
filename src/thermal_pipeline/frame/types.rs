//! Frame data types

use crate::thermal_pipeline::common::error::{PipelineError, Result};

/// Width of the reference sensor mode.
pub const SENSOR_WIDTH: usize = 384;
/// Height of the reference sensor mode, metadata rows excluded.
pub const SENSOR_HEIGHT: usize = 288;

/// One 16-bit single channel frame as delivered by the sensor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    width: usize,
    height: usize,
    data: Vec<u16>,
}

impl RawFrame {
    /// Wraps row-major samples. Fails when the sample count does not match
    /// the dimensions or the frame is empty.
    pub fn new(width: usize, height: usize, data: Vec<u16>) -> Result<Self> {
        if width == 0 || height == 0 || width.checked_mul(height) != Some(data.len()) {
            return Err(PipelineError::InvalidDimensions(width, height));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Frame filled with a single value.
    pub fn filled(width: usize, height: usize, value: u16) -> Result<Self> {
        Self::new(width, height, vec![value; width * height])
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[u16] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u16> {
        self.data
    }

    /// Pixel count of this frame.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Smallest and largest sample in one pass.
    pub fn min_max(&self) -> (u16, u16) {
        self.data
            .iter()
            .fold((u16::MAX, u16::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    }

    pub fn min(&self) -> u16 {
        self.min_max().0
    }

    pub fn max(&self) -> u16 {
        self.min_max().1
    }
}

/// Intensity window mapped onto the full output range. `high > low` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    low: i32,
    high: i32,
}

impl Window {
    /// Builds a window, forcing `high = low + 1` when the bounds touch or cross.
    pub fn new(low: i32, high: i32) -> Self {
        Self {
            low,
            high: high.max(low.saturating_add(1)),
        }
    }

    pub fn low(&self) -> i32 {
        self.low
    }

    pub fn high(&self) -> i32 {
        self.high
    }

    pub fn width(&self) -> i64 {
        i64::from(self.high) - i64::from(self.low)
    }
}

/// Packed 8-bit RGB frame handed to a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFrame {
    pub width: usize,
    pub height: usize,
    /// RGB pixel data interleaved [R, G, B, R, G, B, ...]
    pub data: Vec<u8>,
}

impl OutputFrame {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height * 3],
        }
    }

    pub fn pixel(&self, index: usize) -> [u8; 3] {
        let i = index * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }
}
