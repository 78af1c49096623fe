//! Error types for livecap.
//!
//! Failure categories map onto the pipeline lifecycle: device/engine errors
//! at startup are fatal, inference errors are recoverable per chunk, and
//! publication errors (log or caption writes) never terminate a session on
//! their own.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LivecapError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Audio capture errors
    #[error("Audio device not found: {device}")]
    AudioDeviceNotFound { device: String },

    #[error("Audio capture failed: {message}")]
    AudioCapture { message: String },

    // Transcription engine errors
    #[error("Transcription engine '{program}' unavailable: {message}")]
    EngineUnavailable { program: String, message: String },

    #[error("Inference failed: {message}")]
    Inference { message: String },

    // Caption/log publication errors
    #[error("Publication failed: {message}")]
    Publication { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, LivecapError>;
