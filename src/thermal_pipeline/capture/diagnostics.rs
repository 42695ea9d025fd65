//! Read-only view of what the capture loop last did.
//!
//! Everything here is written by the loop thread and read by anyone else without
//! blocking it. Values may lag the loop by one iteration.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use arc_swap::ArcSwapOption;

use crate::thermal_pipeline::dra::clip_fractions;
use crate::thermal_pipeline::frame::{RawFrame, Window};

/// Frames kept for the rolling rate estimate.
const FPS_WINDOW: usize = 50;

/// The last frame that made it through the loop and the window used for it.
#[derive(Debug, Clone)]
pub struct FrameReport {
    pub frame: Arc<RawFrame>,
    pub window: Window,
    /// Coldest and hottest raw levels in `frame`.
    pub frame_min: u16,
    pub frame_max: u16,
}

/// Rolling output rate over the last `FPS_WINDOW` frames.
///
/// Owned by the loop thread; readers only see the value it publishes.
#[derive(Debug, Default)]
pub(crate) struct RateMeter {
    recent: VecDeque<Instant>,
}

impl RateMeter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Records a frame sent at `now` and returns the current rate.
    pub(crate) fn tick(&mut self, now: Instant) -> f64 {
        self.recent.push_back(now);
        while self.recent.len() > FPS_WINDOW {
            self.recent.pop_front();
        }
        match (self.recent.front(), self.recent.back()) {
            (Some(first), Some(last)) if self.recent.len() > 1 => {
                let span = last.duration_since(*first).as_secs_f64();
                if span > 0.0 {
                    (self.recent.len() - 1) as f64 / span
                } else {
                    0.0
                }
            }
            _ => 0.0,
        }
    }
}

/// Where an iteration failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    Capture,
    Process,
    Send,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StatsSnapshot {
    pub frames_sent: u64,
    pub capture_failures: u64,
    pub process_failures: u64,
    pub send_failures: u64,
    /// Rolling output rate over the last few frames.
    pub fps: f64,
}

#[derive(Debug, Default)]
pub struct LoopStats {
    frames_sent: AtomicU64,
    capture_failures: AtomicU64,
    process_failures: AtomicU64,
    send_failures: AtomicU64,
    /// `f64` bits of the last published rate.
    fps: AtomicU64,
}

impl LoopStats {
    /// Counts a sent frame and publishes the loop's current rate.
    pub fn record_frame(&self, fps: f64) {
        self.frames_sent.fetch_add(1, Ordering::Relaxed);
        self.fps.store(fps.to_bits(), Ordering::Relaxed);
    }

    pub fn record_failure(&self, stage: FailureStage) {
        let counter = match stage {
            FailureStage::Capture => &self.capture_failures,
            FailureStage::Process => &self.process_failures,
            FailureStage::Send => &self.send_failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn frames_sent(&self) -> u64 {
        self.frames_sent.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u64 {
        self.capture_failures.load(Ordering::Relaxed)
            + self.process_failures.load(Ordering::Relaxed)
            + self.send_failures.load(Ordering::Relaxed)
    }

    pub fn fps(&self) -> f64 {
        f64::from_bits(self.fps.load(Ordering::Relaxed))
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            frames_sent: self.frames_sent(),
            capture_failures: self.capture_failures.load(Ordering::Relaxed),
            process_failures: self.process_failures.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
            fps: self.fps(),
        }
    }

    pub fn reset(&self) {
        self.frames_sent.store(0, Ordering::Relaxed);
        self.capture_failures.store(0, Ordering::Relaxed);
        self.process_failures.store(0, Ordering::Relaxed);
        self.send_failures.store(0, Ordering::Relaxed);
        self.fps.store(0, Ordering::Relaxed);
    }
}

/// Cheap-clone handle onto the loop's diagnostics.
#[derive(Clone)]
pub struct Diagnostics {
    latest: Arc<ArcSwapOption<FrameReport>>,
    stats: Arc<LoopStats>,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self {
            latest: Arc::new(ArcSwapOption::empty()),
            stats: Arc::new(LoopStats::default()),
        }
    }
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn publish(&self, report: FrameReport) {
        self.latest.store(Some(Arc::new(report)));
    }

    pub fn last_report(&self) -> Option<Arc<FrameReport>> {
        self.latest.load_full()
    }

    pub fn last_frame(&self) -> Option<Arc<RawFrame>> {
        self.last_report().map(|r| r.frame.clone())
    }

    pub fn last_window(&self) -> Option<Window> {
        self.last_report().map(|r| r.window)
    }

    /// Level mapped to the bottom of the colormap for the last frame.
    pub fn last_frame_min(&self) -> Option<i32> {
        self.last_report().map(|r| r.window.low())
    }

    /// Level mapped to the top of the colormap for the last frame.
    pub fn last_frame_max(&self) -> Option<i32> {
        self.last_report().map(|r| r.window.high())
    }

    /// Coldest and hottest raw levels of the last frame.
    pub fn last_raw_range(&self) -> Option<(u16, u16)> {
        self.last_report().map(|r| (r.frame_min, r.frame_max))
    }

    /// Fractions of the last frame at or below the window floor and at or above
    /// its ceiling.
    pub fn clipped_fractions(&self) -> Option<(f64, f64)> {
        self.last_report()
            .map(|r| clip_fractions(&r.frame, r.window))
    }

    pub fn stats(&self) -> &LoopStats {
        &self.stats
    }
}
