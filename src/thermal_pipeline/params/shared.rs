use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::debug;

use crate::thermal_pipeline::common::error::{PipelineError, Result};
use crate::thermal_pipeline::params::types::{ToneParameters, validate_clip, validate_gamma};
use crate::thermal_pipeline::tone::is_valid_colormap;

/// Tone parameters shared between the capture loop and any number of writers.
///
/// Writers replace the whole record atomically, so a reader never sees a half
/// updated value. The capture loop takes one [`snapshot`](Self::snapshot) per
/// frame and never waits on a writer.
///
/// ```
/// use t3s_vcam_rs::thermal_pipeline::SharedParameters;
///
/// let params = SharedParameters::default();
/// params.set_gamma(1.8).unwrap();
/// params.set_colormap("inferno").unwrap();
/// assert!(params.set_colormap("not_a_real_map").is_err());
/// assert_eq!(params.snapshot().colormap_name, "inferno");
/// ```
#[derive(Clone, Debug)]
pub struct SharedParameters {
    inner: Arc<ArcSwap<ToneParameters>>,
}

impl Default for SharedParameters {
    fn default() -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(ToneParameters::default())),
        }
    }
}

impl SharedParameters {
    pub fn new(params: ToneParameters) -> Result<Self> {
        Ok(Self {
            inner: Arc::new(ArcSwap::from_pointee(params.validated()?)),
        })
    }

    /// Consistent copy of every parameter.
    pub fn snapshot(&self) -> Arc<ToneParameters> {
        self.inner.load_full()
    }

    /// Replaces every parameter at once after validation.
    pub fn replace(&self, params: ToneParameters) -> Result<()> {
        let params = params.validated()?;
        debug!(?params, "Replacing tone parameters");
        self.inner.store(Arc::new(params));
        Ok(())
    }

    fn update(&self, apply: impl Fn(&mut ToneParameters)) {
        self.inner.rcu(|current| {
            let mut next = ToneParameters::clone(current);
            apply(&mut next);
            next
        });
    }

    /// Selects a colormap by name. A `_r` suffix selects the mirrored map.
    pub fn set_colormap(&self, name: &str) -> Result<()> {
        if !is_valid_colormap(name) {
            return Err(PipelineError::InvalidColormap(name.to_string()));
        }
        debug!(colormap = name, "Colormap changed");
        self.update(|p| p.colormap_name = name.to_string());
        Ok(())
    }

    pub fn set_colormap_reverse(&self, reverse: bool) {
        self.update(|p| p.colormap_reverse = reverse);
    }

    /// Sets the bottom clip as a pixel fraction (`is_percent`) or an absolute level.
    pub fn set_clip_min(&self, value: f64, is_percent: bool) -> Result<()> {
        let value = validate_clip(value, is_percent)?;
        self.update(|p| {
            p.clip_min = value;
            p.clip_min_is_percent = is_percent;
        });
        Ok(())
    }

    /// Sets the top clip as a pixel fraction (`is_percent`) or an absolute level.
    pub fn set_clip_max(&self, value: f64, is_percent: bool) -> Result<()> {
        let value = validate_clip(value, is_percent)?;
        self.update(|p| {
            p.clip_max = value;
            p.clip_max_is_percent = is_percent;
        });
        Ok(())
    }

    pub fn set_gamma(&self, gamma: f32) -> Result<()> {
        let gamma = validate_gamma(gamma)?;
        self.update(|p| p.gamma = gamma);
        Ok(())
    }

    pub fn set_histogram_equalization(&self, enabled: bool) {
        self.update(|p| p.histogram_equalization = enabled);
    }
}
