use std::sync::Arc;
use std::thread;

use crate::thermal_pipeline::common::error::PipelineError;
use crate::thermal_pipeline::dra::Histogram;
use crate::thermal_pipeline::frame::{RawFrame, Window};
use crate::thermal_pipeline::params::{Settings, SharedParameters, ToneParameters};

fn levels_frame() -> RawFrame {
    RawFrame::new(10, 10, (0..100).map(|v| v * 10).collect()).unwrap()
}

#[test]
fn test_defaults_match_control_panel() {
    let params = ToneParameters::default();
    assert_eq!(params.colormap_name, "gray");
    assert!(!params.colormap_reverse);
    assert_eq!(params.clip_min, 0.04);
    assert!(params.clip_min_is_percent);
    assert_eq!(params.clip_max, 0.04);
    assert!(params.clip_max_is_percent);
    assert_eq!(params.gamma, 2.2);
    assert!(!params.histogram_equalization);
}

#[test]
fn test_setters_validate_at_write_boundary() {
    let shared = SharedParameters::default();
    assert!(matches!(
        shared.set_colormap("not_a_real_map"),
        Err(PipelineError::InvalidColormap(_))
    ));
    assert!(shared.set_gamma(0.0).is_err());
    assert!(shared.set_gamma(f32::INFINITY).is_err());
    assert!(shared.set_clip_min(f64::NAN, true).is_err());

    let snapshot = shared.snapshot();
    assert_eq!(*snapshot, ToneParameters::default());
}

#[test]
fn test_percent_clips_are_clamped() {
    let shared = SharedParameters::default();
    shared.set_clip_min(-0.5, true).unwrap();
    shared.set_clip_max(3.0, true).unwrap();
    let snapshot = shared.snapshot();
    assert_eq!(snapshot.clip_min, 0.0);
    assert_eq!(snapshot.clip_max, 1.0);

    shared.set_clip_max(31000.0, false).unwrap();
    assert_eq!(shared.snapshot().clip_max, 31000.0);
}

#[test]
fn test_snapshot_is_unaffected_by_later_writes() {
    let shared = SharedParameters::default();
    let before = shared.snapshot();
    shared.set_colormap("jet").unwrap();
    shared.set_colormap_reverse(true);
    assert_eq!(before.colormap_name, "gray");
    let after = shared.snapshot();
    assert_eq!(after.colormap_name, "jet");
    assert!(after.colormap_reverse);
}

#[test]
fn test_concurrent_writers_never_tear_records() {
    let shared = SharedParameters::default();
    let writers: Vec<_> = (0..4)
        .map(|i| {
            let shared = shared.clone();
            thread::spawn(move || {
                for n in 0..200 {
                    let value = f64::from(i * 1000 + n);
                    shared.set_clip_min(value, false).unwrap();
                    shared.set_gamma(1.0 + i as f32).unwrap();
                }
            })
        })
        .collect();
    for _ in 0..500 {
        let snapshot = shared.snapshot();
        if !snapshot.clip_min_is_percent {
            assert!(snapshot.clip_min >= 0.0);
        }
    }
    for w in writers {
        w.join().unwrap();
    }
    let snapshot = shared.snapshot();
    assert!(!snapshot.clip_min_is_percent);
    assert!(snapshot.gamma >= 1.0);
}

#[test]
fn test_replace_validates_every_field() {
    let shared = SharedParameters::default();
    let bad = ToneParameters {
        colormap_name: "nope".to_string(),
        ..ToneParameters::default()
    };
    assert!(shared.replace(bad).is_err());
    let good = ToneParameters {
        colormap_name: "hot_r".to_string(),
        gamma: 1.0,
        ..ToneParameters::default()
    };
    shared.replace(good.clone()).unwrap();
    assert_eq!(*shared.snapshot(), good);
    assert!(SharedParameters::new(ToneParameters {
        gamma: -2.0,
        ..ToneParameters::default()
    })
    .is_err());
}

#[test]
fn test_resolve_window_percent_mode_uses_histogram() {
    let frame = levels_frame();
    let params = ToneParameters {
        clip_min: 0.1,
        clip_max: 0.1,
        ..ToneParameters::default()
    };
    let histogram = Histogram::from_frame(&frame);
    let with = params.resolve_window(&frame, Some(&histogram));
    let without = params.resolve_window(&frame, None);
    assert_eq!(with, without);
    assert_eq!(with, Window::new(99, 889));
}

#[test]
fn test_resolve_window_absolute_mode() {
    let frame = levels_frame();
    let params = ToneParameters {
        clip_min: 120.4,
        clip_min_is_percent: false,
        clip_max: 700.0,
        clip_max_is_percent: false,
        ..ToneParameters::default()
    };
    assert!(!params.needs_histogram());
    assert_eq!(params.resolve_window(&frame, None), Window::new(120, 700));
}

#[test]
fn test_resolve_window_mixed_mode() {
    let frame = levels_frame();
    let params = ToneParameters {
        clip_min: 500.0,
        clip_min_is_percent: false,
        clip_max: 0.0,
        clip_max_is_percent: true,
        ..ToneParameters::default()
    };
    let window = params.resolve_window(&frame, None);
    assert_eq!(window.low(), 500);
    assert_eq!(window.high(), 989);

    // Absolute floor above the percent ceiling collapses to one level.
    let crossed = ToneParameters {
        clip_min: 5000.0,
        ..params
    };
    assert_eq!(crossed.resolve_window(&frame, None), Window::new(5000, 5001));
}

#[test]
fn test_settings_round_trip_preserves_foreign_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("t3s_gui.json");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(
        &path,
        r##"{"colormap": "jet", "gamma": 1.5, "clip_max_percent": false, "clip_max": 4000, "irc_channel": "#thermal"}"##,
    )
    .unwrap();

    let settings = Settings::load(&path).unwrap();
    assert_eq!(settings.tone.colormap_name, "jet");
    assert_eq!(settings.tone.gamma, 1.5);
    assert!(!settings.tone.clip_max_is_percent);
    assert_eq!(settings.tone.clip_max, 4000.0);
    // Missing keys take defaults.
    assert_eq!(settings.tone.clip_min, 0.04);
    assert_eq!(settings.extra("irc_channel").and_then(|v| v.as_str()), Some("#thermal"));

    settings.save(&path).unwrap();
    let reloaded = Settings::load(&path).unwrap();
    assert_eq!(reloaded, settings);
}

#[test]
fn test_settings_sanitize_bad_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, r#"{"colormap": "rainbow_deluxe", "gamma": -1, "clip_min": 7}"#).unwrap();
    let settings = Settings::load(&path).unwrap();
    assert_eq!(settings.tone.colormap_name, "gray");
    assert_eq!(settings.tone.gamma, 2.2);
    assert_eq!(settings.tone.clip_min, 1.0);
    assert!(SharedParameters::new(settings.tone).is_ok());
}

#[test]
fn test_settings_missing_file_and_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = Settings::load(dir.path().join("absent.json")).unwrap();
    assert_eq!(missing.tone, ToneParameters::default());

    let broken = dir.path().join("broken.json");
    std::fs::write(&broken, "{not json").unwrap();
    assert!(matches!(Settings::load(&broken), Err(PipelineError::Settings(_))));
}

#[test]
fn test_shared_parameters_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SharedParameters>();
    assert_send_sync::<Arc<ToneParameters>>();
}

#[test]
fn test_extreme_absolute_clips_stay_in_level_range() {
    let frame = levels_frame();
    let shared = SharedParameters::default();
    shared.set_clip_min(-3.0e9, false).unwrap();
    shared.set_clip_max(7.0e12, false).unwrap();
    let window = shared.snapshot().resolve_window(&frame, None);
    assert_eq!(window, Window::new(-65536, 131071));
    assert_eq!(window.width(), 196_607);
}
