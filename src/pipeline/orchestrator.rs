//! Pipeline orchestrator: capture → gate → infer → log → publish.
//!
//! One cycle runs to completion before the next chunk is assembled, so
//! captions can never appear out of capture order. Inference failures are
//! skipped per chunk up to a consecutive-failure ceiling; log and caption
//! write failures are warnings only.

use crate::audio::chunk::AudioChunk;
use crate::audio::gate::is_silent;
use crate::audio::source::CaptureSource;
use crate::config::PipelineShape;
use crate::defaults;
use crate::engine::TranscriptionEngine;
use crate::error::{LivecapError, Result};
use crate::session::SessionLogger;
use crate::sink::CaptionSink;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

/// Configuration for the orchestrator loop.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub source_language: String,
    pub target_language: String,
    pub shape: PipelineShape,
    pub silence_rms_threshold: f32,
    pub max_consecutive_failures: u32,
    /// Suppress per-chunk console echo.
    pub quiet: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            source_language: defaults::SOURCE_LANGUAGE.to_string(),
            target_language: defaults::TARGET_LANGUAGE.to_string(),
            shape: PipelineShape::TwoStage,
            silence_rms_threshold: defaults::SILENCE_RMS_THRESHOLD,
            max_consecutive_failures: defaults::MAX_CONSECUTIVE_INFERENCE_FAILURES,
            quiet: true,
        }
    }
}

/// Lifecycle state of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Starting,
    Running,
    Draining,
    Stopped,
    Failed,
}

/// Per-chunk engine output, shaped by the configured pipeline shape.
struct ChunkOutputs {
    transcript: Option<String>,
    translation: Option<String>,
}

/// Drives the capture → gate → infer → log → publish cycle and owns the
/// shutdown protocol. The orchestrator holds every component; no component
/// holds the orchestrator.
pub struct Orchestrator {
    config: OrchestratorConfig,
    source: Option<Box<dyn CaptureSource>>,
    engine: Arc<dyn TranscriptionEngine>,
    logger: Option<SessionLogger>,
    sink: Box<dyn CaptionSink>,
    state: PipelineState,
    consecutive_failures: u32,
}

impl Orchestrator {
    pub fn new(
        config: OrchestratorConfig,
        source: Box<dyn CaptureSource>,
        engine: Arc<dyn TranscriptionEngine>,
        logger: SessionLogger,
        sink: Box<dyn CaptionSink>,
    ) -> Self {
        Self {
            config,
            source: Some(source),
            engine,
            logger: Some(logger),
            sink,
            state: PipelineState::Starting,
            consecutive_failures: 0,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Run the pipeline until `running` is cleared or a fatal error occurs.
    ///
    /// Startup failures (engine not ready, device unavailable) are fatal
    /// before the loop ever runs. On cancellation, an in-flight cycle
    /// finishes, then the device is released and logs are closed.
    pub fn run(&mut self, running: &AtomicBool) -> Result<()> {
        if !self.engine.is_ready() {
            self.state = PipelineState::Failed;
            self.release();
            return Err(LivecapError::EngineUnavailable {
                program: self.engine.name().to_string(),
                message: "engine failed readiness check".to_string(),
            });
        }

        if let Some(source) = self.source.as_mut()
            && let Err(e) = source.start()
        {
            self.state = PipelineState::Failed;
            self.release();
            return Err(e);
        }

        self.state = PipelineState::Running;

        while running.load(Ordering::SeqCst) {
            let chunk = {
                let Some(source) = self.source.as_mut() else {
                    break;
                };
                match source.next_chunk(running) {
                    Ok(Some(chunk)) => chunk,
                    Ok(None) => break,
                    Err(e) => {
                        self.state = PipelineState::Failed;
                        self.release();
                        return Err(e);
                    }
                }
            };

            if is_silent(&chunk, self.config.silence_rms_threshold) {
                continue;
            }

            self.cycle(&chunk)?;
        }

        self.state = PipelineState::Draining;
        self.release();
        self.state = PipelineState::Stopped;
        Ok(())
    }

    /// One full chunk cycle: infer per configured shape, log, publish.
    fn cycle(&mut self, chunk: &AudioChunk) -> Result<()> {
        let outputs = match self.infer(chunk) {
            Ok(outputs) => {
                self.consecutive_failures = 0;
                outputs
            }
            Err(e) => {
                self.consecutive_failures += 1;
                eprintln!(
                    "livecap: skipping chunk, inference failed ({} consecutive): {}",
                    self.consecutive_failures, e
                );
                if self.consecutive_failures >= self.config.max_consecutive_failures {
                    self.state = PipelineState::Failed;
                    self.release();
                    return Err(LivecapError::Inference {
                        message: format!(
                            "{} consecutive engine failures, terminating session",
                            self.consecutive_failures
                        ),
                    });
                }
                return Ok(());
            }
        };

        if let Some(transcript) = outputs
            .transcript
            .as_deref()
            .filter(|t| !t.trim().is_empty())
        {
            if !self.config.quiet {
                println!("[{}] {}", self.config.source_language, transcript);
            }
            if let Some(logger) = self.logger.as_mut() {
                warn_on_error(logger.log_transcript(transcript));
            }
        }

        if let Some(translation) = outputs
            .translation
            .as_deref()
            .filter(|t| !t.trim().is_empty())
        {
            if !self.config.quiet {
                println!("[{}] {}", self.config.target_language, translation);
            }
            if let Some(logger) = self.logger.as_mut() {
                warn_on_error(logger.log_translation(translation));
            }
            warn_on_error(self.sink.publish(translation));
        }

        Ok(())
    }

    /// Invoke the engine per the configured shape.
    ///
    /// Any engine error aborts the whole chunk — partial results from an
    /// earlier call in the same cycle are discarded with it.
    fn infer(&self, chunk: &AudioChunk) -> Result<ChunkOutputs> {
        let src = &self.config.source_language;
        let tgt = &self.config.target_language;

        match self.config.shape {
            PipelineShape::TwoStage => {
                let transcript = self.engine.transcribe(chunk, src)?;
                let translation = if transcript.trim().is_empty() {
                    None
                } else {
                    Some(self.engine.translate_text(&transcript, src, tgt)?)
                };
                Ok(ChunkOutputs {
                    transcript: Some(transcript),
                    translation,
                })
            }
            PipelineShape::OneStage => Ok(ChunkOutputs {
                transcript: None,
                translation: Some(self.engine.translate_audio(chunk, src, tgt)?),
            }),
            PipelineShape::DualIndependent => {
                let transcript = self.engine.transcribe(chunk, src)?;
                let translation = self.engine.translate_audio(chunk, src, tgt)?;
                Ok(ChunkOutputs {
                    transcript: Some(transcript),
                    translation: Some(translation),
                })
            }
        }
    }

    /// Release the device and close log files. Idempotent: both are taken
    /// out of their slots on first call.
    fn release(&mut self) {
        if let Some(mut source) = self.source.take()
            && let Err(e) = source.stop()
        {
            eprintln!("livecap: device release failed: {}", e);
        }
        if let Some(mut logger) = self.logger.take() {
            logger.close();
        }
    }
}

fn warn_on_error(result: Result<()>) {
    if let Err(e) = result {
        eprintln!("livecap: {}", e);
    }
}

/// Handle to a running pipeline.
pub struct PipelineHandle {
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<Result<()>>>,
    done_rx: crossbeam_channel::Receiver<()>,
}

/// Spawn the orchestrator on a worker thread.
pub fn start(mut orchestrator: Orchestrator) -> PipelineHandle {
    let running = Arc::new(AtomicBool::new(true));
    let (done_tx, done_rx) = crossbeam_channel::bounded(1);

    let thread_running = Arc::clone(&running);
    let thread = thread::spawn(move || {
        let result = orchestrator.run(&thread_running);
        let _ = done_tx.send(());
        result
    });

    PipelineHandle {
        running,
        thread: Some(thread),
        done_rx,
    }
}

impl PipelineHandle {
    /// Returns true while the stop flag has not been raised.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Receiver that yields once when the pipeline thread finishes, whether
    /// by cancellation or by fatal error.
    pub fn finished(&self) -> crossbeam_channel::Receiver<()> {
        self.done_rx.clone()
    }

    /// Signal shutdown, wait for the in-flight cycle to drain, and return
    /// the pipeline's result.
    pub fn stop(mut self) -> Result<()> {
        self.running.store(false, Ordering::SeqCst);
        match self.thread.take() {
            Some(thread) => match thread.join() {
                Ok(result) => result,
                Err(panic_info) => {
                    let msg = panic_info
                        .downcast_ref::<&str>()
                        .copied()
                        .or_else(|| panic_info.downcast_ref::<String>().map(|s| s.as_str()))
                        .unwrap_or("unknown panic");
                    Err(LivecapError::Other(format!(
                        "pipeline thread panicked: {msg}"
                    )))
                }
            },
            None => Ok(()),
        }
    }
}
