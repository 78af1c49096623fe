//! livecap - Live speech captioning for broadcast overlays
//!
//! Captures microphone speech, transcribes and translates it in bounded
//! windows, and publishes the latest translation to a caption file.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

#[cfg(feature = "cpal-audio")]
pub mod app;
pub mod audio;
pub mod cli;
pub mod config;
pub mod defaults;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod session;
pub mod sink;

// Core traits (source → engine → sinks)
pub use audio::source::CaptureSource;
pub use engine::TranscriptionEngine;
pub use sink::{CaptionSink, CollectorSink, FileCaptionSink};

// Pipeline
pub use pipeline::{Orchestrator, OrchestratorConfig, PipelineHandle, PipelineState};

// Error handling
pub use error::{LivecapError, Result};

// Config
pub use config::{CaptureMode, Config, PipelineShape};

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_cargo_version() {
        let ver = version_string();
        assert!(
            ver.starts_with(env!("CARGO_PKG_VERSION")),
            "version_string should start with CARGO_PKG_VERSION, got: {}",
            ver
        );
    }
}
