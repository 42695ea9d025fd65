use std::fmt::Write as _;
use std::time::{Duration, Instant};

/// Accumulated per-stage durations over a run of frames.
#[derive(Debug, Default, Clone)]
pub struct StageTimings {
    steps: Vec<(&'static str, Duration)>,
    frames: u64,
}

impl StageTimings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_step(&mut self, name: &'static str, duration: Duration) {
        match self.steps.iter_mut().find(|(n, _)| *n == name) {
            Some((_, total)) => *total += duration,
            None => self.steps.push((name, duration)),
        }
    }

    /// Marks the end of one frame; averages are taken over this count.
    pub fn finish_frame(&mut self) {
        self.frames += 1;
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn total_duration(&self) -> Duration {
        self.steps.iter().map(|(_, d)| *d).sum()
    }

    pub fn get_step(&self, name: &str) -> Option<Duration> {
        self.steps
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, d)| *d)
    }

    pub fn average(&self, name: &str) -> Option<Duration> {
        if self.frames == 0 {
            return None;
        }
        self.get_step(name)
            .map(|d| d / u32::try_from(self.frames).unwrap_or(u32::MAX))
    }

    /// One-line summary of average milliseconds per stage.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for (i, (name, _)) in self.steps.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            let avg = self.average(name).unwrap_or_default();
            let _ = write!(out, "{}={:.3}ms", name, avg.as_secs_f64() * 1000.0);
        }
        out
    }

    pub fn reset(&mut self) {
        self.steps.clear();
        self.frames = 0;
    }
}

pub struct Timer {
    start: Instant,
    name: &'static str,
}

impl Timer {
    pub fn start(name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            name,
        }
    }

    pub fn stop(self) -> (&'static str, Duration) {
        (self.name, self.start.elapsed())
    }
}
