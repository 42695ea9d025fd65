//! Capture loop configuration types

use std::time::Duration;

use crate::thermal_pipeline::frame::{SENSOR_HEIGHT, SENSOR_WIDTH};

/// Lifecycle of a [`CaptureLoop`](super::CaptureLoop).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Running,
    /// Stop was requested but the loop thread has not exited yet.
    Stopping,
}

/// Configuration for the capture loop
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Output frame rate handed to the sink
    pub fps: f64,
    /// Geometry the sink is opened with
    pub frame_width: usize,
    pub frame_height: usize,
    /// How long `stop_capture` waits for the loop thread
    pub stop_timeout: Duration,
    /// Sleep after a failed iteration
    pub error_backoff: Duration,
    /// Frames between throughput log lines; zero disables them
    pub stats_interval: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            fps: 25.0,
            frame_width: SENSOR_WIDTH,
            frame_height: SENSOR_HEIGHT,
            stop_timeout: Duration::from_secs(1),
            error_backoff: Duration::from_millis(10),
            stats_interval: 250,
        }
    }
}

impl CaptureConfig {
    pub fn builder() -> CaptureConfigBuilder {
        CaptureConfigBuilder::default()
    }
}

/// Builder for CaptureConfig
#[derive(Default)]
pub struct CaptureConfigBuilder {
    fps: Option<f64>,
    frame_size: Option<(usize, usize)>,
    stop_timeout: Option<Duration>,
    error_backoff: Option<Duration>,
    stats_interval: Option<u64>,
}

impl CaptureConfigBuilder {
    pub fn fps(mut self, fps: f64) -> Self {
        self.fps = Some(fps);
        self
    }

    pub fn frame_size(mut self, width: usize, height: usize) -> Self {
        self.frame_size = Some((width, height));
        self
    }

    pub fn stop_timeout(mut self, timeout: Duration) -> Self {
        self.stop_timeout = Some(timeout);
        self
    }

    pub fn error_backoff(mut self, backoff: Duration) -> Self {
        self.error_backoff = Some(backoff);
        self
    }

    pub fn stats_interval(mut self, frames: u64) -> Self {
        self.stats_interval = Some(frames);
        self
    }

    pub fn build(self) -> CaptureConfig {
        let default = CaptureConfig::default();
        let (frame_width, frame_height) = self
            .frame_size
            .unwrap_or((default.frame_width, default.frame_height));
        CaptureConfig {
            fps: self.fps.unwrap_or(default.fps),
            frame_width,
            frame_height,
            stop_timeout: self.stop_timeout.unwrap_or(default.stop_timeout),
            error_backoff: self.error_backoff.unwrap_or(default.error_backoff),
            stats_interval: self.stats_interval.unwrap_or(default.stats_interval),
        }
    }
}
