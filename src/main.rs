use std::io::BufRead;
use std::path::PathBuf;

use anyhow::{Context, bail};
use t3s_vcam_rs::logger;
use t3s_vcam_rs::thermal_pipeline::{
    CaptureConfig, CaptureLoop, FrameSink, FrameSource, RawStreamSink, RawStreamSource, Settings,
    SharedParameters, SyntheticSource, TiffCompression, TiffReplaySource, TiffSequenceSink,
    default_settings_path,
};

use tracing::{error, info, warn};

const DEFAULT_SINK: &str = "raw:/dev/video10";

fn source_from_env() -> anyhow::Result<Box<dyn FrameSource>> {
    let choice = std::env::var("T3S_SOURCE").unwrap_or_else(|_| "synthetic".to_string());
    let source: Box<dyn FrameSource> = match choice.split_once(':') {
        None if choice == "synthetic" => Box::new(SyntheticSource::default()),
        Some(("raw", path)) => Box::new(RawStreamSource::from_path(path)),
        Some(("tiff", dir)) => Box::new(TiffReplaySource::new(dir)),
        _ => bail!(
            "unrecognised T3S_SOURCE {:?}, expected synthetic, raw:<path> or tiff:<dir>",
            choice
        ),
    };
    info!("Source: {}", choice);
    Ok(source)
}

fn sink_from_env() -> anyhow::Result<Box<dyn FrameSink>> {
    let choice = std::env::var("T3S_SINK").unwrap_or_else(|_| DEFAULT_SINK.to_string());
    let sink: Box<dyn FrameSink> = match choice.split_once(':') {
        Some(("raw", path)) => Box::new(RawStreamSink::from_path(path)),
        Some(("file", path)) => Box::new(RawStreamSink::create(path)),
        Some(("tiff", dir)) => {
            Box::new(TiffSequenceSink::new(dir).with_compression(TiffCompression::DeflateFast))
        }
        _ => bail!(
            "unrecognised T3S_SINK {:?}, expected raw:<device>, file:<path> or tiff:<dir>",
            choice
        ),
    };
    info!("Sink: {}", choice);
    Ok(sink)
}

fn parse_switch(value: Option<&str>) -> anyhow::Result<bool> {
    match value {
        Some("on" | "1" | "true") => Ok(true),
        Some("off" | "0" | "false") => Ok(false),
        other => bail!("expected on/off, got {:?}", other),
    }
}

/// Applies one control line. Returns false when capture should end.
fn handle_command(
    line: &str,
    params: &SharedParameters,
    capture: &CaptureLoop<Box<dyn FrameSource>, Box<dyn FrameSink>>,
) -> anyhow::Result<bool> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(false);
    };
    let arg = words.next();
    match command {
        "quit" | "q" => return Ok(false),
        "colormap" => params.set_colormap(arg.context("colormap needs a name")?)?,
        "reverse" => params.set_colormap_reverse(parse_switch(arg)?),
        "gamma" => params.set_gamma(arg.context("gamma needs a value")?.parse()?)?,
        "equalize" => params.set_histogram_equalization(parse_switch(arg)?),
        "clip_min" | "clip_max" => {
            let value: f64 = arg.context("clip needs a value")?.parse()?;
            let is_percent = words.next() != Some("abs");
            if command == "clip_min" {
                params.set_clip_min(value, is_percent)?;
            } else {
                params.set_clip_max(value, is_percent)?;
            }
        }
        "stats" => {
            let diagnostics = capture.diagnostics();
            let stats = diagnostics.stats().snapshot();
            info!(
                "{} frames at {:.1} fps, window {:?}, clipped {:?}, failures {}/{}/{}",
                stats.frames_sent,
                stats.fps,
                diagnostics.last_window(),
                diagnostics.clipped_fractions(),
                stats.capture_failures,
                stats.process_failures,
                stats.send_failures
            );
        }
        other => warn!("Unknown command {:?}", other),
    }
    Ok(true)
}

fn main() -> anyhow::Result<()> {
    logger::init();

    info!("Starting t3s_vcam...");

    let settings_path = std::env::var_os("T3S_SETTINGS")
        .map(PathBuf::from)
        .or_else(default_settings_path)
        .context("no settings location, set T3S_SETTINGS or HOME")?;
    let mut settings = Settings::load(&settings_path)?;
    let params = SharedParameters::new(settings.tone.clone())?;

    let mut config = CaptureConfig::builder();
    if let Ok(fps) = std::env::var("T3S_FPS") {
        config = config.fps(fps.parse().context("T3S_FPS must be a number")?);
    }
    let mut capture = CaptureLoop::new(
        source_from_env()?,
        sink_from_env()?,
        params.clone(),
        config.build(),
    );
    capture.start_capture()?;

    info!(
        "Capturing. Commands: colormap <name>, reverse on|off, gamma <g>, \
         clip_min|clip_max <v> [abs], equalize on|off, stats. Empty line or EOF stops."
    );
    for line in std::io::stdin().lock().lines() {
        let line = line?;
        match handle_command(&line, &params, &capture) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => warn!("{}", e),
        }
    }

    if let Err(e) = capture.stop_capture() {
        error!("Stopping capture failed: {}", e);
    }

    settings.tone = params.snapshot().as_ref().clone();
    settings
        .save(&settings_path)
        .with_context(|| format!("saving settings to {}", settings_path.display()))?;
    info!("Settings saved to {}", settings_path.display());
    Ok(())
}
