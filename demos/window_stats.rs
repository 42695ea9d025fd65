//! Prints the DRA window and clipping of a 16-bit grayscale TIFF.
//!
//! Usage: `cargo run --example window_stats -- frame.tiff [clip_min] [clip_max]`

use anyhow::{Context, bail};
use t3s_vcam_rs::thermal_pipeline::{RawFrame, clip_fractions, compute_window};

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let path = args.next().context("missing TIFF path")?;
    let clip_min: f64 = args.next().map_or(Ok(0.04), |s| s.parse())?;
    let clip_max: f64 = args.next().map_or(Ok(0.04), |s| s.parse())?;

    let mut decoder = tiff::decoder::Decoder::new(std::fs::File::open(&path)?)?;
    let (width, height) = decoder.dimensions()?;
    let tiff::decoder::DecodingResult::U16(data) = decoder.read_image()? else {
        bail!("{} is not a 16-bit image", path);
    };
    let frame = RawFrame::new(width as usize, height as usize, data)?;

    println!("Image: {}x{} pixels", width, height);
    let (min, max) = frame.min_max();
    println!("  Range: {} - {} (span: {})", min, max, max - min);

    let window = compute_window(&frame, Some(clip_min), Some(clip_max));
    println!(
        "  Window at {:.1}% / {:.1}%: {} - {}",
        clip_min * 100.0,
        clip_max * 100.0,
        window.low(),
        window.high()
    );

    let (below, above) = clip_fractions(&frame, window);
    println!("  Clipped low: {:.2}%", below * 100.0);
    println!("  Clipped high: {:.2}%", above * 100.0);
    Ok(())
}
