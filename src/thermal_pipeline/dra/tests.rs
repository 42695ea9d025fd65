use crate::thermal_pipeline::dra::{Histogram, clip_fractions, compute_window};
use crate::thermal_pipeline::frame::{RawFrame, SENSOR_HEIGHT, SENSOR_WIDTH, Window};

/// Small deterministic generator so property checks are reproducible.
struct XorShift(u64);

impl XorShift {
    fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }

    fn frame(&mut self, width: usize, height: usize, spread: u16) -> RawFrame {
        let base = (self.next() % 40_000) as u16;
        let data = (0..width * height)
            .map(|_| base + (self.next() % (u64::from(spread) + 1)) as u16)
            .collect();
        RawFrame::new(width, height, data).unwrap()
    }
}

fn ramp_frame(max_value: u64) -> RawFrame {
    let n = SENSOR_WIDTH * SENSOR_HEIGHT;
    let data = (0..n as u64)
        .map(|i| (i * max_value / (n as u64 - 1)) as u16)
        .collect();
    RawFrame::new(SENSOR_WIDTH, SENSOR_HEIGHT, data).unwrap()
}

const CLIPS: [f64; 7] = [0.0, 0.001, 0.04, 0.1, 0.5, 0.9, 1.0];

#[test]
fn test_window_always_ordered() {
    let mut rng = XorShift(0x9e37_79b9_7f4a_7c15);
    for spread in [0u16, 1, 3, 50, 4000] {
        let frame = rng.frame(32, 24, spread);
        for &lo in &CLIPS {
            for &hi in &CLIPS {
                let window = compute_window(&frame, Some(lo), Some(hi));
                assert!(window.high() > window.low(), "{:?} for clips {} {}", window, lo, hi);
            }
            let window = compute_window(&frame, Some(lo), None);
            assert!(window.high() > window.low());
            let window = compute_window(&frame, None, Some(lo));
            assert!(window.high() > window.low());
        }
    }
}

#[test]
fn test_no_clip_is_frame_range() {
    let mut rng = XorShift(42);
    for _ in 0..10 {
        let frame = rng.frame(16, 16, 900);
        let (min, max) = frame.min_max();
        if min == max {
            continue;
        }
        let window = compute_window(&frame, None, None);
        assert_eq!(window, Window::new(i32::from(min), i32::from(max)));
    }
}

#[test]
fn test_clip_monotonicity() {
    let mut rng = XorShift(7);
    let frame = rng.frame(40, 30, 2000);
    let histogram = Histogram::from_frame(&frame);
    let mut last_low = i32::MIN;
    let mut last_high = i32::MAX;
    for step in 0..=100 {
        let p = f64::from(step) / 100.0;
        let low = histogram.low_bound(p);
        let high = histogram.high_bound(p);
        assert!(low >= last_low, "low decreased at p={}", p);
        assert!(high <= last_high, "high increased at p={}", p);
        last_low = low;
        last_high = high;
    }
}

#[test]
fn test_uniform_frame_collapses_to_single_level() {
    let frame = RawFrame::filled(SENSOR_WIDTH, SENSOR_HEIGHT, 1000).unwrap();
    let window = compute_window(&frame, Some(0.04), Some(0.04));
    assert_eq!(window.low(), window.high() - 1);
    assert_eq!(window, Window::new(999, 1000));
}

#[test]
fn test_full_range_ramp_percentiles() {
    let frame = ramp_frame(65535);
    let window = compute_window(&frame, Some(0.1), Some(0.1));
    let p10 = 0.1 * 65535.0;
    let p90 = 0.9 * 65535.0;
    assert!((f64::from(window.low()) - p10).abs() <= 2.0, "low {}", window.low());
    assert!((f64::from(window.high()) - p90).abs() <= 2.0, "high {}", window.high());
}

#[test]
fn test_max_clip_only_lands_near_mean() {
    let frame = ramp_frame(999);
    assert_eq!(frame.len(), 110_592);
    let window = compute_window(&frame, None, Some(0.5));
    assert_eq!(window.low(), 0);
    let mean = frame.data().iter().map(|&v| f64::from(v)).sum::<f64>() / frame.len() as f64;
    assert!((f64::from(window.high()) - mean).abs() <= 3.0, "high {} mean {}", window.high(), mean);
}

#[test]
fn test_denominator_is_actual_pixel_count() {
    // 100 pixels, one per level 0..=99.
    let frame = RawFrame::new(10, 10, (0..100).collect()).unwrap();
    let window = compute_window(&frame, Some(0.1), Some(0.1));
    assert_eq!(window.low(), 9);
    assert_eq!(window.high(), 88);
}

#[test]
fn test_out_of_range_clips_are_clamped() {
    let frame = RawFrame::new(10, 10, (0..100).collect()).unwrap();
    assert_eq!(
        compute_window(&frame, Some(-3.0), Some(7.0)),
        compute_window(&frame, Some(0.0), Some(1.0))
    );
    assert_eq!(
        compute_window(&frame, Some(f64::NAN), None),
        compute_window(&frame, Some(0.0), None)
    );
}

#[test]
fn test_crossing_clips_collapse() {
    let frame = RawFrame::new(10, 10, (0..100).collect()).unwrap();
    let window = compute_window(&frame, Some(0.8), Some(0.8));
    assert_eq!(window.width(), 1);
}

#[test]
fn test_histogram_counts() {
    let frame = RawFrame::new(3, 2, vec![5, 5, 6, 8, 8, 8]).unwrap();
    let histogram = Histogram::from_frame(&frame);
    assert_eq!(histogram.min(), 5);
    assert_eq!(histogram.max(), 8);
    assert_eq!(histogram.cdf(), &[2, 3, 3, 6]);
    assert_eq!(histogram.count_at_or_below(4), 0);
    assert_eq!(histogram.count_at_or_below(7), 3);
    assert_eq!(histogram.count_at_or_below(100), 6);
}

#[test]
fn test_histogram_refill_reuses_buffer() {
    let mut histogram = Histogram::from_frame(&RawFrame::new(2, 1, vec![0, 1000]).unwrap());
    histogram.fill(&RawFrame::new(2, 1, vec![10, 12]).unwrap());
    assert_eq!(histogram.bins(), 3);
    assert_eq!(histogram.total(), 2);
}

#[test]
fn test_clip_fractions() {
    let frame = RawFrame::new(10, 10, (0..100).collect()).unwrap();
    let (below, above) = clip_fractions(&frame, Window::new(9, 89));
    assert!((below - 0.10).abs() < 1e-9);
    assert!((above - 0.11).abs() < 1e-9);
}
