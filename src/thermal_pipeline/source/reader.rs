use crate::thermal_pipeline::common::error::Result;
use crate::thermal_pipeline::frame::RawFrame;

/// Owner of a sensor capture handle.
///
/// Only the capture loop touches a source once it is started, so implementations
/// need `Send` but not `Sync`.
pub trait FrameSource: Send {
    /// Acquires the device and configures raw 16-bit acquisition.
    /// Fails with `DeviceUnavailable`.
    fn open(&mut self) -> Result<()>;

    /// Blocks until the next frame is available. Fails with `CaptureFailure`,
    /// which the caller treats as transient.
    fn read(&mut self) -> Result<RawFrame>;

    /// Releases the device. Calling it on a closed source is a no-op.
    fn close(&mut self);
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn open(&mut self) -> Result<()> {
        (**self).open()
    }

    fn read(&mut self) -> Result<RawFrame> {
        (**self).read()
    }

    fn close(&mut self) {
        (**self).close()
    }
}
