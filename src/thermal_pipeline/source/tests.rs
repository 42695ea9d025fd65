use std::fs::File;
use std::io::{self, Cursor};
use std::sync::{Arc, Mutex};

use tiff::encoder::{TiffEncoder, colortype};

use crate::thermal_pipeline::common::error::PipelineError;
use crate::thermal_pipeline::source::{
    FrameSource, RawStreamSource, SensorLayout, SyntheticSource, TiffReplaySource,
};

fn encode_frame(layout: SensorLayout, fill: impl Fn(usize, usize) -> u16) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(layout.frame_bytes());
    for y in 0..layout.height + layout.metadata_rows {
        for x in 0..layout.width {
            let v = if y < layout.height { fill(x, y) } else { 0xBEEF };
            bytes.extend_from_slice(&v.to_le_bytes());
        }
    }
    bytes
}

#[test]
fn test_raw_stream_crops_metadata_rows() {
    let layout = SensorLayout {
        width: 4,
        height: 3,
        metadata_rows: 2,
    };
    let mut stream = encode_frame(layout, |x, y| (y * 100 + x) as u16);
    stream.extend(encode_frame(layout, |_, _| 512));

    let mut source = RawStreamSource::new(move || Ok(Cursor::new(stream.clone()))).with_layout(layout);
    source.open().unwrap();
    let first = source.read().unwrap();
    assert_eq!((first.width(), first.height()), (4, 3));
    assert_eq!(first.data()[..5], [0, 1, 2, 3, 100]);
    assert_eq!(first.data()[11], 203);
    assert!(!first.data().contains(&0xBEEF));

    let second = source.read().unwrap();
    assert!(second.data().iter().all(|&v| v == 512));

    // Stream exhausted: transient capture failure.
    let err = source.read().unwrap_err();
    assert!(matches!(err, PipelineError::CaptureFailure(_)));
    assert!(err.is_transient());
}

#[test]
fn test_raw_stream_default_layout_is_t3s() {
    let layout = SensorLayout::default();
    assert_eq!((layout.width, layout.height, layout.metadata_rows), (384, 288, 4));
    assert_eq!(layout.frame_bytes(), 384 * 292 * 2);
}

#[test]
fn test_raw_stream_open_failure_is_device_unavailable() {
    let mut source = RawStreamSource::<Cursor<Vec<u8>>>::new(|| {
        Err(io::Error::new(io::ErrorKind::NotFound, "no such device"))
    });
    assert!(matches!(source.open(), Err(PipelineError::DeviceUnavailable(_))));
    assert!(!source.is_open());
    assert!(matches!(source.read(), Err(PipelineError::CaptureFailure(_))));
}

#[test]
fn test_raw_stream_reopens_through_factory() {
    let opened = Arc::new(Mutex::new(0));
    let counter = opened.clone();
    let layout = SensorLayout {
        width: 2,
        height: 2,
        metadata_rows: 0,
    };
    let bytes = encode_frame(layout, |_, _| 9);
    let mut source = RawStreamSource::new(move || {
        *counter.lock().unwrap() += 1;
        Ok(Cursor::new(bytes.clone()))
    })
    .with_layout(layout);

    source.open().unwrap();
    source.close();
    source.close();
    source.open().unwrap();
    assert_eq!(source.read().unwrap().data(), &[9, 9, 9, 9]);
    assert_eq!(*opened.lock().unwrap(), 2);
}

fn write_gray16(path: &std::path::Path, width: u32, height: u32, data: &[u16]) {
    let mut encoder = TiffEncoder::new(File::create(path).unwrap()).unwrap();
    encoder.write_image::<colortype::Gray16>(width, height, data).unwrap();
}

#[test]
fn test_tiff_replay_reads_sorted_and_loops() {
    let dir = tempfile::tempdir().unwrap();
    write_gray16(&dir.path().join("frame_0002.tiff"), 2, 2, &[2, 2, 2, 2]);
    write_gray16(&dir.path().join("frame_0001.tif"), 2, 2, &[1, 1, 1, 1]);
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let mut source = TiffReplaySource::new(dir.path());
    source.open().unwrap();
    assert_eq!(source.frame_count(), 2);
    assert_eq!(source.read().unwrap().data(), &[1, 1, 1, 1]);
    assert_eq!(source.read().unwrap().data(), &[2, 2, 2, 2]);
    assert_eq!(source.read().unwrap().data(), &[1, 1, 1, 1]);
}

#[test]
fn test_tiff_replay_without_looping_ends() {
    let dir = tempfile::tempdir().unwrap();
    write_gray16(&dir.path().join("a.tiff"), 1, 1, &[42]);
    let mut source = TiffReplaySource::new(dir.path()).looping(false);
    source.open().unwrap();
    assert_eq!(source.read().unwrap().data(), &[42]);
    assert!(matches!(source.read(), Err(PipelineError::CaptureFailure(_))));
}

#[test]
fn test_tiff_replay_rejects_rgb_and_empty_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let mut empty = TiffReplaySource::new(dir.path());
    assert!(matches!(empty.open(), Err(PipelineError::DeviceUnavailable(_))));

    let path = dir.path().join("colour.tiff");
    let mut encoder = TiffEncoder::new(File::create(&path).unwrap()).unwrap();
    encoder
        .write_image::<colortype::RGB8>(1, 1, &[10, 20, 30])
        .unwrap();
    let mut source = TiffReplaySource::new(dir.path());
    source.open().unwrap();
    assert!(matches!(source.read(), Err(PipelineError::CaptureFailure(_))));
}

#[test]
fn test_synthetic_source_moves_hot_spot() {
    let mut source = SyntheticSource::new(64, 48);
    assert!(source.read().is_err());
    source.open().unwrap();
    let a = source.read().unwrap();
    let b = source.read().unwrap();
    assert_eq!((a.width(), a.height()), (64, 48));
    assert!(a.max() > a.min());
    assert_ne!(a, b);
    source.close();
    assert!(source.read().is_err());
}
