//! Thermal camera pipeline
//!
//! Turns raw 16-bit sensor frames into colour-mapped RGB frames for a virtual
//! camera: per-frame dynamic range adjustment, gamma and colormap, driven by a
//! capture loop whose parameters can be changed while it runs.

pub mod capture;
pub mod common;
pub mod dra;
pub mod frame;
pub mod params;
pub mod sink;
pub mod source;
pub mod tone;

pub use common::{PipelineError, Result};

pub use frame::{OutputFrame, RawFrame, Window};

pub use dra::{Histogram, clip_fractions, compute_window};

pub use tone::{ToneMapper, ToneRequest, colormap_names, is_valid_colormap, tone_map};

pub use params::{Settings, SharedParameters, ToneParameters, default_settings_path};

pub use source::{FrameSource, RawStreamSource, SensorLayout, SyntheticSource, TiffReplaySource};

pub use sink::{FramePacer, FrameSink, RawStreamSink, TiffCompression, TiffSequenceSink};

pub use capture::{CaptureConfig, CaptureConfigBuilder, CaptureLoop, CaptureState, Diagnostics};
