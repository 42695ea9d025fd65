//! Synthetic thermal scene for running without hardware.

use std::thread;
use std::time::Duration;

use crate::thermal_pipeline::common::error::{PipelineError, Result};
use crate::thermal_pipeline::frame::{RawFrame, SENSOR_HEIGHT, SENSOR_WIDTH};
use crate::thermal_pipeline::source::reader::FrameSource;

/// Background level, roughly a room-temperature reading on the T3S.
const BACKGROUND: u16 = 7000;
const GRADIENT: u16 = 600;
const HOT_SPOT: u16 = 2500;

/// A warm blob drifting over a vertical gradient.
pub struct SyntheticSource {
    width: usize,
    height: usize,
    frame_delay: Option<Duration>,
    tick: u64,
    open: bool,
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::new(SENSOR_WIDTH, SENSOR_HEIGHT)
    }
}

impl SyntheticSource {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            frame_delay: None,
            tick: 0,
            open: false,
        }
    }

    /// Sleeps this long in every read, emulating sensor exposure.
    pub fn with_frame_delay(mut self, delay: Duration) -> Self {
        self.frame_delay = Some(delay);
        self
    }

    fn render(&self) -> Vec<u16> {
        let (w, h) = (self.width as f32, self.height as f32);
        let phase = self.tick as f32 * 0.05;
        let cx = w * (0.5 + 0.35 * phase.cos());
        let cy = h * (0.5 + 0.35 * (phase * 0.7).sin());
        let radius = w.min(h) * 0.15;
        let mut data = Vec::with_capacity(self.width * self.height);
        for y in 0..self.height {
            let row = BACKGROUND + (f32::from(GRADIENT) * y as f32 / h) as u16;
            for x in 0..self.width {
                let (dx, dy) = (x as f32 - cx, y as f32 - cy);
                let falloff = (-(dx * dx + dy * dy) / (2.0 * radius * radius)).exp();
                data.push(row + (f32::from(HOT_SPOT) * falloff) as u16);
            }
        }
        data
    }
}

impl FrameSource for SyntheticSource {
    fn open(&mut self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PipelineError::DeviceUnavailable(format!(
                "invalid synthetic geometry {}x{}",
                self.width, self.height
            )));
        }
        self.open = true;
        self.tick = 0;
        Ok(())
    }

    fn read(&mut self) -> Result<RawFrame> {
        if !self.open {
            return Err(PipelineError::CaptureFailure("source is not open".to_string()));
        }
        if let Some(delay) = self.frame_delay {
            thread::sleep(delay);
        }
        let data = self.render();
        self.tick += 1;
        RawFrame::new(self.width, self.height, data)
    }

    fn close(&mut self) {
        self.open = false;
    }
}
