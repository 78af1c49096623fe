//! Composition root: wires config and components into a running pipeline,
//! then blocks on the cancellation signal.

use crate::audio::capture::CpalCaptureSource;
use crate::config::Config;
use crate::diagnostics;
use crate::engine::command::CommandEngine;
use crate::pipeline::{self, Orchestrator, OrchestratorConfig};
use crate::session::{Session, SessionLogger};
use crate::sink::FileCaptionSink;
use anyhow::Result;
use std::sync::Arc;

/// Run the captioning pipeline until interrupted.
pub async fn run_caption_command(config: Config, quiet: bool) -> Result<()> {
    config.validate()?;
    diagnostics::ensure_startup_dependencies(&config.engine.program)?;

    let session = Session::new(&config.output.log_dir);
    let logger = SessionLogger::open(session)?;
    eprintln!(
        "livecap: session {} → captions at {}",
        logger.session().id(),
        config.output.caption_file.display()
    );

    let source = CpalCaptureSource::new(&config.audio)?;
    let engine = Arc::new(CommandEngine::new(&config.engine.program));
    let sink = FileCaptionSink::new(&config.output.caption_file);

    let orchestrator = Orchestrator::new(
        OrchestratorConfig {
            source_language: config.engine.source_language.clone(),
            target_language: config.engine.target_language.clone(),
            shape: config.engine.shape,
            silence_rms_threshold: config.audio.silence_rms_threshold,
            max_consecutive_failures: config.engine.max_consecutive_failures,
            quiet,
        },
        Box::new(source),
        engine,
        logger,
        Box::new(sink),
    );

    let handle = pipeline::start(orchestrator);
    if !quiet {
        eprintln!("livecap: listening — press Ctrl+C to stop");
    }

    // Block on either the interrupt signal or the pipeline ending on its
    // own (fatal capture/inference error). Never a spin loop.
    let finished = handle.finished();
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            eprintln!("livecap: interrupt received, draining");
        }
        _ = tokio::task::spawn_blocking(move || { let _ = finished.recv(); }) => {}
    }

    handle.stop()?;
    Ok(())
}
