use crate::thermal_pipeline::common::error::Result;
use crate::thermal_pipeline::frame::OutputFrame;

/// Owner of an output device handle.
pub trait FrameSink: Send {
    /// Creates the output with the given geometry and nominal frame rate.
    /// Fails with `SinkUnavailable`.
    fn open(&mut self, width: usize, height: usize, fps: f64) -> Result<()>;

    /// Publishes one frame. Fails with `SendFailure`.
    fn send(&mut self, frame: &OutputFrame) -> Result<()>;

    /// Blocks until the next frame slot at the configured rate.
    fn pace(&mut self);

    /// Releases the output. Calling it on a closed sink is a no-op.
    fn close(&mut self);
}

impl<K: FrameSink + ?Sized> FrameSink for Box<K> {
    fn open(&mut self, width: usize, height: usize, fps: f64) -> Result<()> {
        (**self).open(width, height, fps)
    }

    fn send(&mut self, frame: &OutputFrame) -> Result<()> {
        (**self).send(frame)
    }

    fn pace(&mut self) {
        (**self).pace()
    }

    fn close(&mut self) {
        (**self).close()
    }
}
