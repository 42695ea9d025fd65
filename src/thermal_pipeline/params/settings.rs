//! Settings file
//!
//! Flat JSON object holding the tone parameters next to keys owned by other
//! collaborators (e.g. chat credentials). Unknown keys survive a load/save cycle.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::thermal_pipeline::common::error::{PipelineError, Result};
use crate::thermal_pipeline::params::types::ToneParameters;
use crate::thermal_pipeline::tone::{DEFAULT_COLORMAP, is_valid_colormap};

const SETTINGS_RELATIVE_PATH: &str = ".config/t3s_gui.json";

/// `$HOME/.config/t3s_gui.json`, or `None` without a home directory.
pub fn default_settings_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(SETTINGS_RELATIVE_PATH))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(flatten)]
    pub tone: ToneParameters,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Settings {
    pub fn new(tone: ToneParameters) -> Self {
        Self {
            tone,
            extra: Map::new(),
        }
    }

    /// Value of a key this crate does not interpret.
    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Reads settings, falling back to defaults when the file does not exist.
    ///
    /// Values that would be rejected by the parameter store are replaced by their
    /// defaults, an unknown colormap by `gray`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "No settings file, using defaults");
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .map_err(|e| PipelineError::Settings(format!("{}: {}", path.display(), e)))?;
        let mut settings: Settings = serde_json::from_str(&text)
            .map_err(|e| PipelineError::Settings(format!("{}: {}", path.display(), e)))?;
        settings.sanitize();
        debug!(path = %path.display(), tone = ?settings.tone, "Loaded settings");
        Ok(settings)
    }

    /// Writes settings as pretty JSON, creating parent directories.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| PipelineError::Settings(e.to_string()))?;
        fs::write(path, text)
            .map_err(|e| PipelineError::Settings(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "Saved settings");
        Ok(())
    }

    fn sanitize(&mut self) {
        let defaults = ToneParameters::default();
        let tone = &mut self.tone;
        if !is_valid_colormap(&tone.colormap_name) {
            warn!(colormap = %tone.colormap_name, "Unknown colormap in settings, using {}", DEFAULT_COLORMAP);
            tone.colormap_name = DEFAULT_COLORMAP.to_string();
        }
        if !(tone.gamma.is_finite() && tone.gamma > 0.0) {
            warn!(gamma = tone.gamma, "Invalid gamma in settings, using default");
            tone.gamma = defaults.gamma;
        }
        if !tone.clip_min.is_finite() {
            tone.clip_min = defaults.clip_min;
        }
        if !tone.clip_max.is_finite() {
            tone.clip_max = defaults.clip_max;
        }
        if tone.clip_min_is_percent {
            tone.clip_min = tone.clip_min.clamp(0.0, 1.0);
        }
        if tone.clip_max_is_percent {
            tone.clip_max = tone.clip_max.clamp(0.0, 1.0);
        }
    }
}
