//! Replays a directory of 16-bit grayscale TIFFs as a live source.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tiff::ColorType;
use tiff::decoder::{Decoder, DecodingResult};
use tracing::{debug, info};

use crate::thermal_pipeline::common::error::{PipelineError, Result};
use crate::thermal_pipeline::frame::RawFrame;
use crate::thermal_pipeline::source::reader::FrameSource;

pub struct TiffReplaySource {
    dir: PathBuf,
    files: Vec<PathBuf>,
    next: usize,
    looping: bool,
}

impl TiffReplaySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            files: Vec::new(),
            next: 0,
            looping: true,
        }
    }

    /// When disabled, reads past the last file fail instead of wrapping.
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn frame_count(&self) -> usize {
        self.files.len()
    }
}

fn is_tiff(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("tif") || e.eq_ignore_ascii_case("tiff"))
}

fn decode_gray16(path: &Path) -> Result<RawFrame> {
    let file = File::open(path)?;
    let mut decoder = Decoder::new(BufReader::new(file))
        .map_err(|e| PipelineError::CaptureFailure(format!("{}: {}", path.display(), e)))?;
    let color = decoder
        .colortype()
        .map_err(|e| PipelineError::CaptureFailure(e.to_string()))?;
    if color != ColorType::Gray(16) {
        return Err(PipelineError::CaptureFailure(format!(
            "{}: expected 16-bit grayscale, found {:?}",
            path.display(),
            color
        )));
    }
    let (width, height) = decoder
        .dimensions()
        .map_err(|e| PipelineError::CaptureFailure(e.to_string()))?;
    match decoder
        .read_image()
        .map_err(|e| PipelineError::CaptureFailure(e.to_string()))?
    {
        DecodingResult::U16(data) => RawFrame::new(width as usize, height as usize, data),
        _ => Err(PipelineError::CaptureFailure(format!(
            "{}: unexpected sample format",
            path.display()
        ))),
    }
}

impl FrameSource for TiffReplaySource {
    fn open(&mut self) -> Result<()> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| {
            PipelineError::DeviceUnavailable(format!("{}: {}", self.dir.display(), e))
        })?;
        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| is_tiff(p))
            .collect();
        if files.is_empty() {
            return Err(PipelineError::DeviceUnavailable(format!(
                "no TIFF frames in {}",
                self.dir.display()
            )));
        }
        files.sort();
        info!("Replaying {} frames from {}", files.len(), self.dir.display());
        self.files = files;
        self.next = 0;
        Ok(())
    }

    fn read(&mut self) -> Result<RawFrame> {
        if self.files.is_empty() {
            return Err(PipelineError::CaptureFailure("source is not open".to_string()));
        }
        if self.next >= self.files.len() {
            if !self.looping {
                return Err(PipelineError::CaptureFailure("end of recording".to_string()));
            }
            self.next = 0;
        }
        let path = &self.files[self.next];
        self.next += 1;
        debug!("Decoding {}", path.display());
        decode_gray16(path)
    }

    fn close(&mut self) {
        self.files.clear();
        self.next = 0;
    }
}
