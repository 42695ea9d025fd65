//! One-bin-per-level histogram and its cumulative sum.

use crate::thermal_pipeline::frame::RawFrame;

/// Cumulative pixel counts for every integer level in `[frame.min(), frame.max()]`.
///
/// The buffer is kept between frames so the capture loop does not reallocate it
/// every iteration.
#[derive(Debug, Clone, Default)]
pub struct Histogram {
    base: u16,
    cdf: Vec<u64>,
}

impl Histogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_frame(frame: &RawFrame) -> Self {
        let mut histogram = Self::new();
        histogram.fill(frame);
        histogram
    }

    /// Rebuilds the histogram and CDF from `frame`, reusing the allocation.
    pub fn fill(&mut self, frame: &RawFrame) {
        let (min, max) = frame.min_max();
        let bins = usize::from(max - min) + 1;
        self.base = min;
        self.cdf.clear();
        self.cdf.resize(bins, 0);

        for &v in frame.data() {
            self.cdf[usize::from(v - min)] += 1;
        }
        let mut running = 0u64;
        for bin in self.cdf.iter_mut() {
            running += *bin;
            *bin = running;
        }
    }

    /// Lowest level present in the frame.
    pub fn min(&self) -> u16 {
        self.base
    }

    /// Highest level present in the frame.
    pub fn max(&self) -> u16 {
        self.base + (self.cdf.len().saturating_sub(1)) as u16
    }

    pub fn bins(&self) -> usize {
        self.cdf.len()
    }

    pub fn cdf(&self) -> &[u64] {
        &self.cdf
    }

    /// Pixel count the histogram was built from.
    pub fn total(&self) -> u64 {
        self.cdf.last().copied().unwrap_or(0)
    }

    /// Number of pixels with a value `<= value`.
    pub fn count_at_or_below(&self, value: i32) -> u64 {
        let offset = i64::from(value) - i64::from(self.base);
        if offset < 0 || self.cdf.is_empty() {
            return 0;
        }
        let index = (offset as usize).min(self.cdf.len() - 1);
        self.cdf[index]
    }

    /// Low window bound clipping `fraction` of the pixels from the bottom.
    ///
    /// First bin whose cumulative count exceeds the target, minus one. Falls back to
    /// the top bin when no bin exceeds the target.
    pub fn low_bound(&self, fraction: f64) -> i32 {
        let target = clamp_fraction(fraction) * self.total() as f64;
        let index = self.cdf.partition_point(|&c| c as f64 <= target);
        let base = i32::from(self.base);
        if index == self.cdf.len() {
            base + self.cdf.len() as i32 - 1
        } else {
            base + index as i32 - 1
        }
    }

    /// High window bound clipping `fraction` of the pixels from the top.
    ///
    /// Highest bin whose cumulative count is still below the target. Falls back to
    /// the bottom bin when every bin reaches the target.
    pub fn high_bound(&self, fraction: f64) -> i32 {
        let target = (1.0 - clamp_fraction(fraction)) * self.total() as f64;
        let below = self.cdf.partition_point(|&c| (c as f64) < target);
        i32::from(self.base) + below.saturating_sub(1) as i32
    }
}

/// Percent clip values outside `[0, 1]` are clamped; NaN counts as no clipping.
pub(crate) fn clamp_fraction(fraction: f64) -> f64 {
    if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    }
}
