use tracing::trace;

use crate::thermal_pipeline::dra::histogram::Histogram;
use crate::thermal_pipeline::frame::{RawFrame, Window};

/// Computes the display window of `frame`.
///
/// Each clip is a fraction of the pixel count to push out of range at that end.
/// With neither clip given the window is the frame's own `[min, max]`. Both bounds
/// come from a single histogram of the frame.
pub fn compute_window(frame: &RawFrame, clip_min: Option<f64>, clip_max: Option<f64>) -> Window {
    if clip_min.is_none() && clip_max.is_none() {
        let (min, max) = frame.min_max();
        return Window::new(i32::from(min), i32::from(max));
    }
    let histogram = Histogram::from_frame(frame);
    window_from_histogram(&histogram, clip_min, clip_max)
}

/// Window from an already built histogram.
pub fn window_from_histogram(
    histogram: &Histogram,
    clip_min: Option<f64>,
    clip_max: Option<f64>,
) -> Window {
    let low = clip_min.map_or(i32::from(histogram.min()), |p| histogram.low_bound(p));
    let high = clip_max.map_or(i32::from(histogram.max()), |p| histogram.high_bound(p));
    if high <= low {
        trace!(low, high, "Clip bounds crossed, collapsing to single-level window");
    }
    Window::new(low, high)
}

/// Fraction of pixels at or below `window.low()` and at or above `window.high()`.
pub fn clip_fractions(frame: &RawFrame, window: Window) -> (f64, f64) {
    if frame.is_empty() {
        return (0.0, 0.0);
    }
    let (below, above) = frame.data().iter().fold((0usize, 0usize), |(b, a), &v| {
        let v = i32::from(v);
        (
            b + usize::from(v <= window.low()),
            a + usize::from(v >= window.high()),
        )
    });
    let total = frame.len() as f64;
    (below as f64 / total, above as f64 / total)
}
