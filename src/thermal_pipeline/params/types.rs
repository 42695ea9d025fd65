//! Tone parameter types

use serde::{Deserialize, Serialize};

use crate::thermal_pipeline::common::error::{PipelineError, Result};
use crate::thermal_pipeline::dra::{Histogram, compute_window, window_from_histogram};
use crate::thermal_pipeline::frame::{RawFrame, Window};
use crate::thermal_pipeline::tone::{DEFAULT_COLORMAP, is_valid_colormap};

/// Every knob the capture loop reads once per frame.
///
/// Field names on disk follow the settings file written by the control panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneParameters {
    /// Fraction of pixels to clip at the bottom, or an absolute raw level.
    pub clip_min: f64,
    #[serde(rename = "clip_min_percent")]
    pub clip_min_is_percent: bool,
    /// Fraction of pixels to clip at the top, or an absolute raw level.
    pub clip_max: f64,
    #[serde(rename = "clip_max_percent")]
    pub clip_max_is_percent: bool,
    pub gamma: f32,
    #[serde(rename = "colormap")]
    pub colormap_name: String,
    pub colormap_reverse: bool,
    pub histogram_equalization: bool,
}

impl Default for ToneParameters {
    fn default() -> Self {
        Self {
            clip_min: 0.04,
            clip_min_is_percent: true,
            clip_max: 0.04,
            clip_max_is_percent: true,
            gamma: 2.2,
            colormap_name: DEFAULT_COLORMAP.to_string(),
            colormap_reverse: false,
            histogram_equalization: false,
        }
    }
}

impl ToneParameters {
    /// Checks every field, clamping percent clips into `[0, 1]`.
    pub fn validated(mut self) -> Result<Self> {
        validate_gamma(self.gamma)?;
        self.clip_min = validate_clip(self.clip_min, self.clip_min_is_percent)?;
        self.clip_max = validate_clip(self.clip_max, self.clip_max_is_percent)?;
        if !is_valid_colormap(&self.colormap_name) {
            return Err(PipelineError::InvalidColormap(self.colormap_name));
        }
        Ok(self)
    }

    /// Percent clip fractions handed to the DRA engine.
    pub fn percent_clips(&self) -> (Option<f64>, Option<f64>) {
        (
            self.clip_min_is_percent.then_some(self.clip_min),
            self.clip_max_is_percent.then_some(self.clip_max),
        )
    }

    /// Whether this frame's window or tone curve needs the histogram.
    pub fn needs_histogram(&self) -> bool {
        self.clip_min_is_percent || self.clip_max_is_percent || self.histogram_equalization
    }

    /// Window for `frame`: percent bounds from its histogram, absolute bounds taken
    /// as given, then the sanity clamp. `histogram`, when given, must have been
    /// filled from `frame`.
    pub fn resolve_window(&self, frame: &RawFrame, histogram: Option<&Histogram>) -> Window {
        let (pmin, pmax) = self.percent_clips();
        let window = match (pmin.or(pmax), histogram) {
            (None, _) => compute_window(frame, None, None),
            (Some(_), Some(h)) => window_from_histogram(h, pmin, pmax),
            (Some(_), None) => compute_window(frame, pmin, pmax),
        };
        let low = if self.clip_min_is_percent {
            window.low()
        } else {
            absolute_level(self.clip_min)
        };
        let high = if self.clip_max_is_percent {
            window.high()
        } else {
            absolute_level(self.clip_max)
        };
        Window::new(low, high)
    }
}

pub(crate) fn validate_gamma(gamma: f32) -> Result<f32> {
    if gamma.is_finite() && gamma > 0.0 {
        Ok(gamma)
    } else {
        Err(PipelineError::InvalidParameter(format!(
            "gamma must be a positive number, got {}",
            gamma
        )))
    }
}

pub(crate) fn validate_clip(value: f64, is_percent: bool) -> Result<f64> {
    if !value.is_finite() {
        return Err(PipelineError::InvalidParameter(format!(
            "clip value must be finite, got {}",
            value
        )));
    }
    Ok(if is_percent { value.clamp(0.0, 1.0) } else { value })
}

/// Absolute clips are kept one sensor range either side of `[0, 65535]`.
const ABSOLUTE_LEVEL_MIN: f64 = -65536.0;
const ABSOLUTE_LEVEL_MAX: f64 = 131071.0;

fn absolute_level(value: f64) -> i32 {
    value.round().clamp(ABSOLUTE_LEVEL_MIN, ABSOLUTE_LEVEL_MAX) as i32
}
