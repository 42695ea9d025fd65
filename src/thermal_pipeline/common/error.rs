use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Frame source unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Frame sink unavailable: {0}")]
    SinkUnavailable(String),

    #[error("Failed to capture frame: {0}")]
    CaptureFailure(String),

    #[error("Failed to send frame: {0}")]
    SendFailure(String),

    #[error("Unknown colormap: {0}")]
    InvalidColormap(String),

    #[error("Capture thread did not terminate within {0:?}")]
    ThreadDidNotTerminate(Duration),

    #[error("Invalid frame dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Capture loop is already running")]
    AlreadyRunning,

    #[error("Capture loop is not running")]
    NotRunning,

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Errors the capture loop absorbs with a backoff instead of stopping.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PipelineError::CaptureFailure(_)
                | PipelineError::SendFailure(_)
                | PipelineError::InvalidColormap(_)
                | PipelineError::InvalidDimensions(_, _)
        )
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
