//! Normalization, gamma and colormap lookup.

use tracing::trace;

use crate::thermal_pipeline::common::error::{PipelineError, Result};
use crate::thermal_pipeline::dra::Histogram;
use crate::thermal_pipeline::frame::{OutputFrame, RawFrame, Window};
use crate::thermal_pipeline::tone::colormap::{Colormap, resolve_colormap};

/// Everything the tone mapper needs for one frame.
#[derive(Debug, Clone, Copy)]
pub struct ToneRequest<'a> {
    pub window: Window,
    pub gamma: f32,
    pub colormap: &'a str,
    pub reverse: bool,
    /// Histogram of the frame being mapped; when set, values are equalized
    /// within the window instead of stretched linearly.
    pub equalize: Option<&'a Histogram>,
}

impl<'a> ToneRequest<'a> {
    pub fn new(window: Window, gamma: f32, colormap: &'a str, reverse: bool) -> Self {
        Self {
            window,
            gamma,
            colormap,
            reverse,
            equalize: None,
        }
    }

    pub fn with_equalization(mut self, histogram: &'a Histogram) -> Self {
        self.equalize = Some(histogram);
        self
    }
}

/// Linear position of `value` inside `window`, clamped to `[0, 1]`.
pub fn normalize(value: u16, window: Window) -> f32 {
    let x = (f32::from(value) - window.low() as f32) / window.width() as f32;
    x.clamp(0.0, 1.0)
}

/// Raises `x` to `1 / gamma`. A gamma of exactly one returns `x` untouched.
pub fn apply_gamma(x: f32, gamma: f32) -> f32 {
    if gamma == 1.0 { x } else { x.powf(1.0 / gamma) }
}

/// Converts raw frames to RGB. Keeps a per-level table between calls.
#[derive(Debug, Default)]
pub struct ToneMapper {
    levels: Vec<[u8; 3]>,
}

impl ToneMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `frame` into a freshly allocated output frame.
    pub fn map(&mut self, frame: &RawFrame, request: &ToneRequest<'_>) -> Result<OutputFrame> {
        let mut out = OutputFrame::new(frame.width(), frame.height());
        self.map_into(frame, request, &mut out)?;
        Ok(out)
    }

    /// Maps `frame` into `out`, resizing it when the dimensions changed.
    pub fn map_into(
        &mut self,
        frame: &RawFrame,
        request: &ToneRequest<'_>,
        out: &mut OutputFrame,
    ) -> Result<()> {
        let (map, suffix_reversed) = resolve_colormap(request.colormap)?;
        if !(request.gamma.is_finite() && request.gamma > 0.0) {
            return Err(PipelineError::InvalidParameter(format!(
                "gamma must be positive, got {}",
                request.gamma
            )));
        }
        let curve = Curve {
            window: request.window,
            gamma: request.gamma,
            map,
            reverse: request.reverse ^ suffix_reversed,
            equalize: request.equalize.and_then(|h| EqualizeRange::new(h, request.window)),
        };

        out.width = frame.width();
        out.height = frame.height();
        out.data.resize(frame.len() * 3, 0);

        let (min, max) = frame.min_max();
        let span = usize::from(max - min) + 1;
        if span <= frame.len() {
            // Fewer distinct levels than pixels: colour each level once.
            self.levels.clear();
            self.levels.extend((min..=max).map(|v| curve.color(v)));
            for (px, &v) in out.data.chunks_exact_mut(3).zip(frame.data()) {
                px.copy_from_slice(&self.levels[usize::from(v - min)]);
            }
        } else {
            for (px, &v) in out.data.chunks_exact_mut(3).zip(frame.data()) {
                px.copy_from_slice(&curve.color(v));
            }
        }
        trace!(
            colormap = map.name(),
            low = request.window.low(),
            high = request.window.high(),
            "Tone mapped frame"
        );
        Ok(())
    }
}

/// Convenience wrapper for one-off mapping.
pub fn tone_map(
    frame: &RawFrame,
    window: Window,
    gamma: f32,
    colormap: &str,
    reverse: bool,
) -> Result<OutputFrame> {
    ToneMapper::new().map(frame, &ToneRequest::new(window, gamma, colormap, reverse))
}

struct EqualizeRange<'a> {
    histogram: &'a Histogram,
    floor: u64,
    span: u64,
}

impl<'a> EqualizeRange<'a> {
    fn new(histogram: &'a Histogram, window: Window) -> Option<Self> {
        let floor = histogram.count_at_or_below(window.low());
        let ceil = histogram.count_at_or_below(window.high());
        (ceil > floor).then(|| Self {
            histogram,
            floor,
            span: ceil - floor,
        })
    }

    fn rank(&self, value: u16) -> f32 {
        let count = self.histogram.count_at_or_below(i32::from(value));
        let x = count.saturating_sub(self.floor) as f64 / self.span as f64;
        (x as f32).clamp(0.0, 1.0)
    }
}

struct Curve<'a> {
    window: Window,
    gamma: f32,
    map: &'a Colormap,
    reverse: bool,
    equalize: Option<EqualizeRange<'a>>,
}

impl Curve<'_> {
    fn color(&self, value: u16) -> [u8; 3] {
        let x = match &self.equalize {
            Some(eq) => eq.rank(value),
            None => normalize(value, self.window),
        };
        let x = apply_gamma(x, self.gamma);
        if self.reverse {
            self.map.lookup_reversed(x)
        } else {
            self.map.lookup(x)
        }
    }
}
