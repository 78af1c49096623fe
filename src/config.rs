use crate::defaults;
use crate::error::{LivecapError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub engine: EngineConfig,
    pub output: OutputConfig,
}

/// Audio capture configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub device: Option<String>,
    pub sample_rate: u32,
    pub chunk_duration_secs: f32,
    pub silence_rms_threshold: f32,
    pub capture_mode: CaptureMode,
}

/// Transcription engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub program: String,
    pub source_language: String,
    pub target_language: String,
    pub shape: PipelineShape,
    pub max_consecutive_failures: u32,
}

/// Caption/log output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub caption_file: PathBuf,
    pub log_dir: PathBuf,
}

/// How the capture source hands off audio windows.
///
/// Synchronous discards anything recorded while the previous chunk was being
/// processed (implicit back-pressure); asynchronous keeps a bounded backlog
/// and drops the oldest samples on overflow.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CaptureMode {
    Synchronous,
    Asynchronous,
}

/// Which engine calls run per chunk.
///
/// `TwoStage` derives the translation from the transcript text; `OneStage`
/// maps audio straight to target-language text; `DualIndependent` runs a
/// transcribe pass and a translate-audio pass independently over the same
/// chunk, trading double inference cost for transcript fidelity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineShape {
    TwoStage,
    OneStage,
    DualIndependent,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: defaults::SAMPLE_RATE,
            chunk_duration_secs: defaults::CHUNK_DURATION_SECS,
            silence_rms_threshold: defaults::SILENCE_RMS_THRESHOLD,
            capture_mode: CaptureMode::Synchronous,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: defaults::ENGINE_PROGRAM.to_string(),
            source_language: defaults::SOURCE_LANGUAGE.to_string(),
            target_language: defaults::TARGET_LANGUAGE.to_string(),
            shape: PipelineShape::TwoStage,
            max_consecutive_failures: defaults::MAX_CONSECUTIVE_INFERENCE_FAILURES,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            caption_file: PathBuf::from(defaults::CAPTION_FILE),
            log_dir: PathBuf::from(defaults::LOG_DIR),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file, or return defaults if the file is missing.
    ///
    /// Invalid TOML is still an error — a broken config file should not be
    /// silently replaced by defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(LivecapError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - LIVECAP_DEVICE → audio.device
    /// - LIVECAP_ENGINE → engine.program
    /// - LIVECAP_SOURCE_LANGUAGE → engine.source_language
    /// - LIVECAP_TARGET_LANGUAGE → engine.target_language
    /// - LIVECAP_CAPTION_FILE → output.caption_file
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(device) = std::env::var("LIVECAP_DEVICE")
            && !device.is_empty()
        {
            self.audio.device = Some(device);
        }

        if let Ok(program) = std::env::var("LIVECAP_ENGINE")
            && !program.is_empty()
        {
            self.engine.program = program;
        }

        if let Ok(language) = std::env::var("LIVECAP_SOURCE_LANGUAGE")
            && !language.is_empty()
        {
            self.engine.source_language = language;
        }

        if let Ok(language) = std::env::var("LIVECAP_TARGET_LANGUAGE")
            && !language.is_empty()
        {
            self.engine.target_language = language;
        }

        if let Ok(path) = std::env::var("LIVECAP_CAPTION_FILE")
            && !path.is_empty()
        {
            self.output.caption_file = PathBuf::from(path);
        }

        self
    }

    /// Validate configuration values that the pipeline depends on.
    pub fn validate(&self) -> Result<()> {
        if self.audio.sample_rate == 0 {
            return Err(LivecapError::ConfigInvalidValue {
                key: "audio.sample_rate".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.audio.chunk_duration_secs <= 0.0 {
            return Err(LivecapError::ConfigInvalidValue {
                key: "audio.chunk_duration_secs".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.audio.silence_rms_threshold < 0.0 {
            return Err(LivecapError::ConfigInvalidValue {
                key: "audio.silence_rms_threshold".to_string(),
                message: "must not be negative".to_string(),
            });
        }
        if self.engine.max_consecutive_failures == 0 {
            return Err(LivecapError::ConfigInvalidValue {
                key: "engine.max_consecutive_failures".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/livecap/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("livecap")
            .join("config.toml")
    }
}
