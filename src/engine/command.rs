//! Engine adapter that shells out to an external whisper-style CLI.
//!
//! The chunk is written as a temporary 16-bit WAV and the program is invoked
//! once per operation; trimmed stdout is the result. The program's model
//! loading, weights, and device placement are its own business — this
//! adapter only owns the handoff.

use crate::audio::chunk::AudioChunk;
use crate::engine::TranscriptionEngine;
use crate::error::{LivecapError, Result};
use std::io::Write;
use std::process::{Command, Stdio};
use tempfile::NamedTempFile;

/// Transcription engine backed by an external command.
///
/// Expected program contract:
/// - `<program> --task transcribe --language <src> <wav>` → source text
/// - `<program> --task translate --language <src> --target <tgt> <wav>` → target text
/// - `<program> --task translate --text --language <src> --target <tgt>` with
///   source text on stdin → target text
pub struct CommandEngine {
    program: String,
}

impl CommandEngine {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }

    /// Write the chunk as a temporary mono 16-bit WAV for the engine to read.
    fn write_wav(&self, chunk: &AudioChunk) -> Result<NamedTempFile> {
        let file = tempfile::Builder::new()
            .prefix("livecap-chunk-")
            .suffix(".wav")
            .tempfile()
            .map_err(|e| LivecapError::Inference {
                message: format!("failed to create temp WAV: {}", e),
            })?;

        let spec = hound::WavSpec {
            channels: chunk.channels,
            sample_rate: chunk.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut writer = hound::WavWriter::create(file.path(), spec).map_err(|e| {
            LivecapError::Inference {
                message: format!("failed to open WAV writer: {}", e),
            }
        })?;
        for &sample in &chunk.samples {
            let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer.write_sample(value).map_err(|e| LivecapError::Inference {
                message: format!("failed to write WAV sample: {}", e),
            })?;
        }
        writer.finalize().map_err(|e| LivecapError::Inference {
            message: format!("failed to finalize WAV: {}", e),
        })?;

        Ok(file)
    }

    /// Run the program with the given arguments, returning trimmed stdout.
    fn run(&self, args: &[&str], stdin: Option<&str>) -> Result<String> {
        let mut command = Command::new(&self.program);
        command.args(args).stdout(Stdio::piped()).stderr(Stdio::piped());
        if stdin.is_some() {
            command.stdin(Stdio::piped());
        } else {
            command.stdin(Stdio::null());
        }

        let mut child = command.spawn().map_err(|e| LivecapError::Inference {
            message: format!("failed to spawn '{}': {}", self.program, e),
        })?;

        if let Some(input) = stdin
            && let Some(mut handle) = child.stdin.take()
        {
            handle
                .write_all(input.as_bytes())
                .map_err(|e| LivecapError::Inference {
                    message: format!("failed to write engine stdin: {}", e),
                })?;
        }

        let output = child.wait_with_output().map_err(|e| LivecapError::Inference {
            message: format!("engine did not produce output: {}", e),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LivecapError::Inference {
                message: format!(
                    "'{}' exited with {}: {}",
                    self.program,
                    output.status,
                    stderr.trim()
                ),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl TranscriptionEngine for CommandEngine {
    fn transcribe(&self, chunk: &AudioChunk, source_lang: &str) -> Result<String> {
        let wav = self.write_wav(chunk)?;
        let path = wav.path().to_string_lossy().to_string();
        self.run(
            &["--task", "transcribe", "--language", source_lang, &path],
            None,
        )
    }

    fn translate_text(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String> {
        self.run(
            &[
                "--task",
                "translate",
                "--text",
                "--language",
                source_lang,
                "--target",
                target_lang,
            ],
            Some(text),
        )
    }

    fn translate_audio(
        &self,
        chunk: &AudioChunk,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String> {
        let wav = self.write_wav(chunk)?;
        let path = wav.path().to_string_lossy().to_string();
        self.run(
            &[
                "--task",
                "translate",
                "--language",
                source_lang,
                "--target",
                target_lang,
                &path,
            ],
            None,
        )
    }

    fn is_ready(&self) -> bool {
        Command::new(&self.program)
            .arg("--help")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok()
    }

    fn name(&self) -> &str {
        &self.program
    }
}
