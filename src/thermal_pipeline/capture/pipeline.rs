use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use tracing::{debug, error, info, instrument, warn};

use crate::thermal_pipeline::capture::diagnostics::{
    Diagnostics, FailureStage, FrameReport, RateMeter,
};
use crate::thermal_pipeline::capture::types::{CaptureConfig, CaptureState};
use crate::thermal_pipeline::common::error::{PipelineError, Result};
use crate::thermal_pipeline::common::timing::{StageTimings, Timer};
use crate::thermal_pipeline::dra::Histogram;
use crate::thermal_pipeline::frame::OutputFrame;
use crate::thermal_pipeline::params::SharedParameters;
use crate::thermal_pipeline::sink::FrameSink;
use crate::thermal_pipeline::source::FrameSource;
use crate::thermal_pipeline::tone::{ToneMapper, ToneRequest};

struct Worker<S, K> {
    stop: Arc<AtomicBool>,
    done: Receiver<(S, K)>,
    handle: JoinHandle<()>,
}

/// Drives frames from a source to a sink on a background thread.
///
/// The loop owns both devices while running and hands them back when it
/// exits, so a stopped loop can be started again.
pub struct CaptureLoop<S: FrameSource + 'static, K: FrameSink + 'static> {
    config: CaptureConfig,
    params: SharedParameters,
    diagnostics: Diagnostics,
    devices: Option<(S, K)>,
    worker: Option<Worker<S, K>>,
    state: CaptureState,
}

impl<S: FrameSource + 'static, K: FrameSink + 'static> CaptureLoop<S, K> {
    pub fn new(source: S, sink: K, params: SharedParameters, config: CaptureConfig) -> Self {
        Self {
            config,
            params,
            diagnostics: Diagnostics::new(),
            devices: Some((source, sink)),
            worker: None,
            state: CaptureState::Idle,
        }
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Handle for writers; changes apply from the next frame.
    pub fn params(&self) -> &SharedParameters {
        &self.params
    }

    pub fn diagnostics(&self) -> Diagnostics {
        self.diagnostics.clone()
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == CaptureState::Running
    }

    /// Opens source and sink and spawns the loop thread.
    ///
    /// Device errors are returned as is and leave the loop idle with both
    /// devices closed.
    #[instrument(skip(self))]
    pub fn start_capture(&mut self) -> Result<()> {
        if self.state != CaptureState::Idle {
            return Err(PipelineError::AlreadyRunning);
        }
        let (mut source, mut sink) = self.devices.take().ok_or_else(|| {
            PipelineError::DeviceUnavailable("capture devices were lost".to_string())
        })?;

        if let Err(e) = source.open() {
            self.devices = Some((source, sink));
            return Err(e);
        }
        let (width, height, fps) = (
            self.config.frame_width,
            self.config.frame_height,
            self.config.fps,
        );
        if let Err(e) = sink.open(width, height, fps) {
            return Err(self.abort_start(source, sink, e));
        }

        let stop = Arc::new(AtomicBool::new(false));
        let (done_tx, done) = mpsc::channel();
        let (handoff, devices) = mpsc::channel::<(S, K)>();
        let mut runner = LoopRunner {
            stop: stop.clone(),
            params: self.params.clone(),
            diagnostics: self.diagnostics.clone(),
            config: self.config.clone(),
            mapper: ToneMapper::new(),
            histogram: Histogram::default(),
            output: OutputFrame::new(width, height),
            timings: StageTimings::new(),
            rate: RateMeter::new(),
        };
        // Devices only move to the thread once it exists.
        let spawned = thread::Builder::new()
            .name("capture".to_string())
            .spawn(move || {
                let Ok((mut source, mut sink)) = devices.recv() else {
                    return;
                };
                runner.run(&mut source, &mut sink);
                // Nobody is waiting once the loop has been dropped.
                let _ = done_tx.send((source, sink));
            });
        let handle = match spawned {
            Ok(handle) => handle,
            Err(e) => {
                sink.close();
                return Err(self.abort_start(source, sink, e.into()));
            }
        };
        if let Err(mpsc::SendError((source, mut sink))) = handoff.send((source, sink)) {
            let _ = handle.join();
            sink.close();
            let e = PipelineError::DeviceUnavailable("capture thread exited early".to_string());
            return Err(self.abort_start(source, sink, e));
        }

        self.worker = Some(Worker { stop, done, handle });
        self.state = CaptureState::Running;
        info!("Capture started: {}x{} @ {} fps", width, height, fps);
        Ok(())
    }

    /// Closes the already opened source and keeps both devices for the next
    /// start attempt.
    fn abort_start(&mut self, mut source: S, sink: K, error: PipelineError) -> PipelineError {
        source.close();
        self.devices = Some((source, sink));
        self.state = CaptureState::Idle;
        warn!("Capture not started: {}", error);
        error
    }

    /// Asks the loop thread to exit and waits up to `stop_timeout` for it.
    ///
    /// On timeout the thread is left running, the state stays `Stopping` and
    /// `ThreadDidNotTerminate` is returned. Calling this again waits once more.
    #[instrument(skip(self))]
    pub fn stop_capture(&mut self) -> Result<()> {
        let timeout = self.config.stop_timeout;
        let Some(worker) = self.worker.as_ref() else {
            return Err(PipelineError::NotRunning);
        };
        worker.stop.store(true, Ordering::Release);
        self.state = CaptureState::Stopping;

        match worker.done.recv_timeout(timeout) {
            Ok((mut source, mut sink)) => {
                if let Some(worker) = self.worker.take() {
                    if worker.handle.join().is_err() {
                        error!("Capture thread panicked after returning its devices");
                    }
                }
                source.close();
                sink.close();
                self.devices = Some((source, sink));
                self.state = CaptureState::Idle;
                info!(
                    "Capture stopped after {} frames",
                    self.diagnostics.stats().frames_sent()
                );
                Ok(())
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!("Capture thread still running after {:?}", timeout);
                Err(PipelineError::ThreadDidNotTerminate(timeout))
            }
            Err(RecvTimeoutError::Disconnected) => {
                if let Some(worker) = self.worker.take() {
                    let _ = worker.handle.join();
                }
                self.state = CaptureState::Idle;
                error!("Capture thread exited without returning its devices");
                Err(PipelineError::DeviceUnavailable(
                    "capture thread panicked".to_string(),
                ))
            }
        }
    }
}

impl<S: FrameSource + 'static, K: FrameSink + 'static> Drop for CaptureLoop<S, K> {
    fn drop(&mut self) {
        if let Some(worker) = &self.worker {
            worker.stop.store(true, Ordering::Release);
        }
    }
}

/// State owned by the loop thread. Buffers are reused across frames.
struct LoopRunner {
    stop: Arc<AtomicBool>,
    params: SharedParameters,
    diagnostics: Diagnostics,
    config: CaptureConfig,
    mapper: ToneMapper,
    histogram: Histogram,
    output: OutputFrame,
    timings: StageTimings,
    rate: RateMeter,
}

impl LoopRunner {
    fn run<S: FrameSource, K: FrameSink>(&mut self, source: &mut S, sink: &mut K) {
        debug!("Capture loop running");
        while !self.stop.load(Ordering::Acquire) {
            match self.iteration(source, sink) {
                Ok(()) => {
                    let fps = self.rate.tick(Instant::now());
                    self.diagnostics.stats().record_frame(fps);
                    self.timings.finish_frame();
                    self.log_throughput();
                    sink.pace();
                }
                Err((stage, e)) => {
                    self.diagnostics.stats().record_failure(stage);
                    warn!(?stage, "Frame dropped: {}", e);
                    thread::sleep(self.config.error_backoff);
                }
            }
        }
        debug!("Capture loop exiting");
    }

    fn iteration<S: FrameSource, K: FrameSink>(
        &mut self,
        source: &mut S,
        sink: &mut K,
    ) -> std::result::Result<(), (FailureStage, PipelineError)> {
        let params = self.params.snapshot();

        let timer = Timer::start("acquire");
        let frame = source.read().map_err(|e| (FailureStage::Capture, e))?;
        let (name, duration) = timer.stop();
        self.timings.add_step(name, duration);

        let timer = Timer::start("window");
        let histogram = if params.needs_histogram() {
            self.histogram.fill(&frame);
            Some(&self.histogram)
        } else {
            None
        };
        let window = params.resolve_window(&frame, histogram);
        let (frame_min, frame_max) = match histogram {
            Some(h) => (h.min(), h.max()),
            None => frame.min_max(),
        };
        let (name, duration) = timer.stop();
        self.timings.add_step(name, duration);

        let timer = Timer::start("tone_map");
        let mut request = ToneRequest::new(
            window,
            params.gamma,
            &params.colormap_name,
            params.colormap_reverse,
        );
        if params.histogram_equalization {
            if let Some(h) = histogram {
                request = request.with_equalization(h);
            }
        }
        self.mapper
            .map_into(&frame, &request, &mut self.output)
            .map_err(|e| (FailureStage::Process, e))?;
        let (name, duration) = timer.stop();
        self.timings.add_step(name, duration);

        let timer = Timer::start("send");
        sink.send(&self.output).map_err(|e| (FailureStage::Send, e))?;
        let (name, duration) = timer.stop();
        self.timings.add_step(name, duration);

        self.diagnostics.publish(FrameReport {
            frame: Arc::new(frame),
            window,
            frame_min,
            frame_max,
        });
        Ok(())
    }

    fn log_throughput(&mut self) {
        let interval = self.config.stats_interval;
        if interval == 0 || self.timings.frames() < interval {
            return;
        }
        let stats = self.diagnostics.stats().snapshot();
        debug!(
            fps = stats.fps,
            frames = stats.frames_sent,
            capture_failures = stats.capture_failures,
            process_failures = stats.process_failures,
            send_failures = stats.send_failures,
            "Throughput: {}",
            self.timings.summary()
        );
        self.timings.reset();
    }
}
