use std::thread;
use std::time::{Duration, Instant};

/// Sleeps to hold a fixed frame rate.
///
/// Each call waits for the slot following the previous one. A caller that falls
/// more than a full interval behind is resynchronized to the current time
/// instead of bursting to catch up.
#[derive(Debug, Clone)]
pub struct FramePacer {
    interval: Duration,
    last_slot: Option<Instant>,
}

impl FramePacer {
    /// Non-positive or non-finite rates disable pacing.
    pub fn new(fps: f64) -> Self {
        let interval = if fps.is_finite() && fps > 0.0 {
            Duration::from_secs_f64(1.0 / fps)
        } else {
            Duration::ZERO
        };
        Self {
            interval,
            last_slot: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Waits for the next slot and returns how long it slept.
    pub fn wait(&mut self) -> Duration {
        let now = Instant::now();
        let Some(last) = self.last_slot else {
            self.last_slot = Some(now);
            return Duration::ZERO;
        };
        let deadline = last + self.interval;
        if deadline > now {
            let sleep = deadline - now;
            thread::sleep(sleep);
            self.last_slot = Some(deadline);
            sleep
        } else {
            self.last_slot = if now - deadline > self.interval {
                Some(now)
            } else {
                Some(deadline)
            };
            Duration::ZERO
        }
    }

    pub fn reset(&mut self) {
        self.last_slot = None;
    }
}
