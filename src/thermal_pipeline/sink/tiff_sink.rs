//! Records output frames as numbered RGB TIFF files.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use tiff::encoder::compression::DeflateLevel;
use tiff::encoder::{Compression, TiffEncoder, colortype};
use tracing::{debug, info};

use crate::thermal_pipeline::common::error::{PipelineError, Result};
use crate::thermal_pipeline::frame::OutputFrame;
use crate::thermal_pipeline::sink::pacer::FramePacer;
use crate::thermal_pipeline::sink::writer::FrameSink;

/// TIFF compression methods
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TiffCompression {
    /// No compression (fastest, largest file)
    #[default]
    None,
    /// LZW compression
    Lzw,
    /// Deflate compression - fast level
    DeflateFast,
    /// Deflate compression - balanced
    DeflateBalanced,
    /// Deflate compression - best compression (slower)
    DeflateBest,
}

impl TiffCompression {
    fn encoder_setting(self) -> Compression {
        match self {
            TiffCompression::None => Compression::Uncompressed,
            TiffCompression::Lzw => Compression::Lzw,
            TiffCompression::DeflateFast => Compression::Deflate(DeflateLevel::Fast),
            TiffCompression::DeflateBalanced => Compression::Deflate(DeflateLevel::Balanced),
            TiffCompression::DeflateBest => Compression::Deflate(DeflateLevel::Best),
        }
    }
}

pub struct TiffSequenceSink {
    dir: PathBuf,
    prefix: String,
    compression: TiffCompression,
    frame_limit: Option<u64>,
    written: u64,
    pacer: FramePacer,
    open: bool,
}

impl TiffSequenceSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            prefix: "frame".to_string(),
            compression: TiffCompression::default(),
            frame_limit: None,
            written: 0,
            pacer: FramePacer::new(0.0),
            open: false,
        }
    }

    pub fn with_compression(mut self, compression: TiffCompression) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Stops recording after this many frames; later sends are accepted and dropped.
    pub fn with_frame_limit(mut self, limit: u64) -> Self {
        self.frame_limit = Some(limit);
        self
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    fn frame_path(&self, index: u64) -> PathBuf {
        self.dir.join(format!("{}_{:06}.tiff", self.prefix, index))
    }
}

impl FrameSink for TiffSequenceSink {
    fn open(&mut self, width: usize, height: usize, fps: f64) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            PipelineError::SinkUnavailable(format!("{}: {}", self.dir.display(), e))
        })?;
        self.pacer = FramePacer::new(fps);
        self.written = 0;
        self.open = true;
        info!(
            "Recording {}x{} frames to {} ({:?})",
            width,
            height,
            self.dir.display(),
            self.compression
        );
        Ok(())
    }

    fn send(&mut self, frame: &OutputFrame) -> Result<()> {
        if !self.open {
            return Err(PipelineError::SendFailure("sink is not open".to_string()));
        }
        if self.frame_limit.is_some_and(|limit| self.written >= limit) {
            return Ok(());
        }
        let path = self.frame_path(self.written);
        let file = File::create(&path).map_err(|e| PipelineError::SendFailure(e.to_string()))?;
        let mut encoder = TiffEncoder::new(BufWriter::new(file))
            .map_err(|e| PipelineError::SendFailure(e.to_string()))?
            .with_compression(self.compression.encoder_setting());
        encoder
            .write_image::<colortype::RGB8>(frame.width as u32, frame.height as u32, &frame.data)
            .map_err(|e| PipelineError::SendFailure(e.to_string()))?;
        debug!("Wrote {}", path.display());
        self.written += 1;
        Ok(())
    }

    fn pace(&mut self) {
        self.pacer.wait();
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            info!("Recorded {} frames to {}", self.written, self.dir.display());
        }
    }
}
