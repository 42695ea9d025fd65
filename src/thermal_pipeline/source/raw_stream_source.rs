//! Raw sensor stream reader.
//!
//! The T3S family streams each frame as little-endian u16 samples, row-major,
//! with a few trailing rows of sensor metadata below the image. This source reads
//! one such frame per call from any byte stream (a capture device node, a pipe
//! from a grabber, a recorded dump) and drops the metadata rows.

use std::fs::File;
use std::io::{self, ErrorKind, Read};
use std::path::PathBuf;

use tracing::{debug, info};

use crate::thermal_pipeline::common::error::{PipelineError, Result};
use crate::thermal_pipeline::frame::{RawFrame, SENSOR_HEIGHT, SENSOR_WIDTH};
use crate::thermal_pipeline::source::reader::FrameSource;

/// Rows of metadata the T3S appends below the image.
const T3S_METADATA_ROWS: usize = 4;

/// Geometry of one frame on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorLayout {
    pub width: usize,
    /// Image rows handed downstream.
    pub height: usize,
    /// Rows read and discarded after the image.
    pub metadata_rows: usize,
}

impl Default for SensorLayout {
    fn default() -> Self {
        Self {
            width: SENSOR_WIDTH,
            height: SENSOR_HEIGHT,
            metadata_rows: T3S_METADATA_ROWS,
        }
    }
}

impl SensorLayout {
    pub fn frame_bytes(&self) -> usize {
        self.width * (self.height + self.metadata_rows) * 2
    }
}

type Opener<R> = Box<dyn FnMut() -> io::Result<R> + Send>;

pub struct RawStreamSource<R: Read + Send> {
    opener: Opener<R>,
    reader: Option<R>,
    layout: SensorLayout,
    buffer: Vec<u8>,
}

impl RawStreamSource<File> {
    /// Source reading from a device node or file, opened on [`FrameSource::open`].
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self::new(move || File::open(&path))
    }
}

impl<R: Read + Send> RawStreamSource<R> {
    pub fn new(opener: impl FnMut() -> io::Result<R> + Send + 'static) -> Self {
        Self {
            opener: Box::new(opener),
            reader: None,
            layout: SensorLayout::default(),
            buffer: Vec::new(),
        }
    }

    pub fn with_layout(mut self, layout: SensorLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn layout(&self) -> SensorLayout {
        self.layout
    }

    pub fn is_open(&self) -> bool {
        self.reader.is_some()
    }
}

impl<R: Read + Send> FrameSource for RawStreamSource<R> {
    fn open(&mut self) -> Result<()> {
        let layout = self.layout;
        if layout.width == 0 || layout.height == 0 {
            return Err(PipelineError::InvalidDimensions(layout.width, layout.height));
        }
        let reader = (self.opener)().map_err(|e| PipelineError::DeviceUnavailable(e.to_string()))?;
        self.reader = Some(reader);
        self.buffer.resize(layout.frame_bytes(), 0);
        info!(
            width = layout.width,
            height = layout.height,
            metadata_rows = layout.metadata_rows,
            "Raw stream opened"
        );
        Ok(())
    }

    fn read(&mut self) -> Result<RawFrame> {
        let reader = self
            .reader
            .as_mut()
            .ok_or_else(|| PipelineError::CaptureFailure("source is not open".to_string()))?;
        reader.read_exact(&mut self.buffer).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => {
                PipelineError::CaptureFailure("stream ended mid-frame".to_string())
            }
            _ => PipelineError::CaptureFailure(e.to_string()),
        })?;

        let pixels = self.layout.width * self.layout.height;
        let data = self.buffer[..pixels * 2]
            .chunks_exact(2)
            .map(|b| u16::from_le_bytes([b[0], b[1]]))
            .collect();
        RawFrame::new(self.layout.width, self.layout.height, data)
    }

    fn close(&mut self) {
        if self.reader.take().is_some() {
            debug!("Raw stream closed");
        }
    }
}
