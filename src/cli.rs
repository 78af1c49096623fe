//! Command-line interface definitions.

use crate::config::{CaptureMode, PipelineShape};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "livecap",
    about = "Live speech captioning for broadcast overlays",
    version = crate::version_string(),
    long_about = "Captures microphone speech in a source language, transcribes and \
                  translates it in bounded windows, and publishes the latest \
                  translation to a caption file read by a broadcast overlay."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to config file (default: ~/.config/livecap/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Audio input device name (see `livecap devices`)
    #[arg(short, long)]
    pub device: Option<String>,

    /// Language being spoken (e.g. "es")
    #[arg(long)]
    pub source_language: Option<String>,

    /// Language of published captions (e.g. "en")
    #[arg(long)]
    pub target_language: Option<String>,

    /// Transcription engine program
    #[arg(long)]
    pub engine: Option<String>,

    /// Engine calls per chunk
    #[arg(long, value_enum)]
    pub shape: Option<PipelineShape>,

    /// Capture hand-off mode
    #[arg(long, value_enum)]
    pub capture_mode: Option<CaptureMode>,

    /// Caption file path read by the overlay
    #[arg(long)]
    pub caption_file: Option<PathBuf>,

    /// Directory for per-session transcript/translation logs
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Chunk duration in seconds
    #[arg(long)]
    pub chunk_duration: Option<f32>,

    /// Suppress per-chunk console echo
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available audio input devices
    Devices,
    /// Check that required external tools are installed
    Check,
}

impl Cli {
    /// Fold CLI flags over the loaded configuration.
    pub fn apply_to(&self, mut config: crate::config::Config) -> crate::config::Config {
        if let Some(device) = &self.device {
            config.audio.device = Some(device.clone());
        }
        if let Some(language) = &self.source_language {
            config.engine.source_language = language.clone();
        }
        if let Some(language) = &self.target_language {
            config.engine.target_language = language.clone();
        }
        if let Some(program) = &self.engine {
            config.engine.program = program.clone();
        }
        if let Some(shape) = self.shape {
            config.engine.shape = shape;
        }
        if let Some(mode) = self.capture_mode {
            config.audio.capture_mode = mode;
        }
        if let Some(path) = &self.caption_file {
            config.output.caption_file = path.clone();
        }
        if let Some(path) = &self.log_dir {
            config.output.log_dir = path.clone();
        }
        if let Some(duration) = self.chunk_duration {
            config.audio.chunk_duration_secs = duration;
        }
        config
    }
}
