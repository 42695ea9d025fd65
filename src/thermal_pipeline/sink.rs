//! Frame sinks
//!
//! Consumers of finished RGB frames, such as a virtual camera device or a
//! recording on disk.

mod pacer;
mod raw_stream_sink;
mod tiff_sink;
mod writer;

pub use pacer::FramePacer;
pub use raw_stream_sink::RawStreamSink;
pub use tiff_sink::{TiffCompression, TiffSequenceSink};
pub use writer::FrameSink;

#[cfg(test)]
mod tests;
