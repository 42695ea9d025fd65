//! Packed RGB24 stream output.
//!
//! Writes each frame as `width * height * 3` bytes to any byte sink. Pointed at a
//! v4l2loopback node configured for RGB24 this is a virtual camera; pointed at a
//! pipe it feeds an encoder.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::thermal_pipeline::common::error::{PipelineError, Result};
use crate::thermal_pipeline::frame::OutputFrame;
use crate::thermal_pipeline::sink::pacer::FramePacer;
use crate::thermal_pipeline::sink::writer::FrameSink;

type Opener<W> = Box<dyn FnMut() -> io::Result<W> + Send>;

pub struct RawStreamSink<W: Write + Send> {
    opener: Opener<W>,
    writer: Option<W>,
    geometry: (usize, usize),
    pacer: FramePacer,
    frames_sent: u64,
}

impl RawStreamSink<File> {
    /// Sink writing to an existing device node. A missing node fails `open`.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self::new(move || OpenOptions::new().write(true).open(&path))
    }

    /// Sink recording to a regular file, created or truncated on every open.
    pub fn create(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self::new(move || File::create(&path))
    }
}

impl<W: Write + Send> RawStreamSink<W> {
    pub fn new(opener: impl FnMut() -> io::Result<W> + Send + 'static) -> Self {
        Self {
            opener: Box::new(opener),
            writer: None,
            geometry: (0, 0),
            pacer: FramePacer::new(0.0),
            frames_sent: 0,
        }
    }

    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }
}

impl<W: Write + Send> FrameSink for RawStreamSink<W> {
    fn open(&mut self, width: usize, height: usize, fps: f64) -> Result<()> {
        let writer = (self.opener)().map_err(|e| PipelineError::SinkUnavailable(e.to_string()))?;
        self.writer = Some(writer);
        self.geometry = (width, height);
        self.pacer = FramePacer::new(fps);
        self.frames_sent = 0;
        info!("RGB24 output opened at {}x{} @ {} fps", width, height, fps);
        Ok(())
    }

    fn send(&mut self, frame: &OutputFrame) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| PipelineError::SendFailure("sink is not open".to_string()))?;
        if (frame.width, frame.height) != self.geometry {
            return Err(PipelineError::SendFailure(format!(
                "frame is {}x{}, output expects {}x{}",
                frame.width, frame.height, self.geometry.0, self.geometry.1
            )));
        }
        writer
            .write_all(&frame.data)
            .map_err(|e| PipelineError::SendFailure(e.to_string()))?;
        self.frames_sent += 1;
        Ok(())
    }

    fn pace(&mut self) {
        self.pacer.wait();
    }

    fn close(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.flush() {
                warn!("Flushing output failed: {}", e);
            }
            debug!("RGB24 output closed after {} frames", self.frames_sent);
        }
    }
}
