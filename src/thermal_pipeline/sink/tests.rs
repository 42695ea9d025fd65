use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use tiff::ColorType;
use tiff::decoder::{Decoder, DecodingResult};

use crate::thermal_pipeline::common::error::PipelineError;
use crate::thermal_pipeline::frame::OutputFrame;
use crate::thermal_pipeline::sink::{
    FramePacer, FrameSink, RawStreamSink, TiffCompression, TiffSequenceSink,
};

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn test_frame(width: usize, height: usize, seed: u8) -> OutputFrame {
    let mut frame = OutputFrame::new(width, height);
    for (i, b) in frame.data.iter_mut().enumerate() {
        *b = seed.wrapping_add(i as u8);
    }
    frame
}

#[test]
fn test_pacer_holds_rate() {
    let mut pacer = FramePacer::new(100.0);
    assert_eq!(pacer.interval(), Duration::from_millis(10));
    let start = Instant::now();
    for _ in 0..5 {
        pacer.wait();
    }
    assert!(start.elapsed() >= Duration::from_millis(40));
}

#[test]
fn test_pacer_resyncs_when_late() {
    let mut pacer = FramePacer::new(100.0);
    pacer.wait();
    thread::sleep(Duration::from_millis(50));
    assert_eq!(pacer.wait(), Duration::ZERO);
    // Next slot is measured from now, not from the missed deadlines.
    let slept = pacer.wait();
    assert!(slept > Duration::ZERO);
    assert!(slept <= Duration::from_millis(10));
}

#[test]
fn test_pacer_disabled_for_bad_rate() {
    let mut pacer = FramePacer::new(0.0);
    assert_eq!(pacer.interval(), Duration::ZERO);
    pacer.wait();
    assert_eq!(pacer.wait(), Duration::ZERO);
    assert_eq!(FramePacer::new(f64::NAN).interval(), Duration::ZERO);
}

#[test]
fn test_raw_stream_sink_writes_packed_rgb() {
    let buffer = SharedBuffer::default();
    let handle = buffer.clone();
    let mut sink = RawStreamSink::new(move || Ok(handle.clone()));
    sink.open(2, 2, 0.0).unwrap();

    let a = test_frame(2, 2, 0);
    let b = test_frame(2, 2, 100);
    sink.send(&a).unwrap();
    sink.send(&b).unwrap();
    sink.close();

    let written = buffer.0.lock().unwrap();
    assert_eq!(written.len(), 2 * 12);
    assert_eq!(&written[..12], a.data.as_slice());
    assert_eq!(&written[12..], b.data.as_slice());
    assert_eq!(sink.frames_sent(), 2);
}

#[test]
fn test_raw_stream_sink_errors() {
    let mut unavailable = RawStreamSink::<SharedBuffer>::new(|| {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "busy"))
    });
    assert!(matches!(
        unavailable.open(4, 4, 25.0),
        Err(PipelineError::SinkUnavailable(_))
    ));
    assert!(matches!(
        unavailable.send(&test_frame(4, 4, 0)),
        Err(PipelineError::SendFailure(_))
    ));

    let mut sink = RawStreamSink::new(|| Ok(SharedBuffer::default()));
    sink.open(4, 4, 25.0).unwrap();
    let err = sink.send(&test_frame(2, 2, 0)).unwrap_err();
    assert!(matches!(err, PipelineError::SendFailure(_)));
    assert!(err.is_transient());
}

#[test]
fn test_raw_stream_sink_device_path_is_never_created() {
    let dir = tempfile::tempdir().unwrap();
    let node = dir.path().join("video10");

    let mut sink = RawStreamSink::from_path(&node);
    assert!(matches!(
        sink.open(4, 4, 25.0),
        Err(PipelineError::SinkUnavailable(_))
    ));
    assert!(!node.exists());

    let mut recorder = RawStreamSink::create(&node);
    recorder.open(4, 4, 25.0).unwrap();
    recorder.send(&test_frame(4, 4, 7)).unwrap();
    recorder.close();
    assert_eq!(std::fs::read(&node).unwrap(), test_frame(4, 4, 7).data);

    // An existing node is written in place.
    sink.open(4, 4, 25.0).unwrap();
    sink.send(&test_frame(4, 4, 1)).unwrap();
    sink.close();
    assert_eq!(std::fs::read(&node).unwrap(), test_frame(4, 4, 1).data);
}

#[test]
fn test_tiff_sink_records_numbered_frames() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("recording");
    let mut sink = TiffSequenceSink::new(&out)
        .with_compression(TiffCompression::Lzw)
        .with_prefix("thermal");
    sink.open(3, 2, 0.0).unwrap();
    let frame = test_frame(3, 2, 7);
    sink.send(&frame).unwrap();
    sink.send(&test_frame(3, 2, 9)).unwrap();
    sink.close();

    assert_eq!(sink.written(), 2);
    let first = out.join("thermal_000000.tiff");
    assert!(out.join("thermal_000001.tiff").exists());

    let mut decoder = Decoder::new(std::fs::File::open(first).unwrap()).unwrap();
    assert_eq!(decoder.colortype().unwrap(), ColorType::RGB(8));
    assert_eq!(decoder.dimensions().unwrap(), (3, 2));
    match decoder.read_image().unwrap() {
        DecodingResult::U8(data) => assert_eq!(data, frame.data),
        _ => panic!("expected 8-bit samples"),
    }
}

#[test]
fn test_tiff_sink_frame_limit() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = TiffSequenceSink::new(dir.path()).with_frame_limit(2);
    assert!(sink.send(&test_frame(1, 1, 0)).is_err());
    sink.open(1, 1, 0.0).unwrap();
    for seed in 0..5 {
        sink.send(&test_frame(1, 1, seed)).unwrap();
    }
    assert_eq!(sink.written(), 2);
    let count = std::fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(count, 2);
}
