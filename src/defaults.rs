//! Default configuration constants for livecap.
//!
//! Shared constants used across configuration types to ensure consistency
//! and eliminate duplication.

/// Default audio sample rate in Hz.
///
/// 16kHz is the standard for speech recognition and provides a good balance
/// between quality and computational efficiency for voice applications.
pub const SAMPLE_RATE: u32 = 16000;

/// Default chunk duration in seconds.
///
/// Each captured window is transcribed and translated as a unit; five
/// seconds keeps caption latency acceptable for live streaming while giving
/// the model enough context for coherent sentences.
pub const CHUNK_DURATION_SECS: f32 = 5.0;

/// Default silence gate threshold (RMS over normalized [-1, 1] samples).
///
/// Chunks below this are silence/ambient noise — skip inference entirely.
/// Speech models emit spurious text on near-silence, so gating also guards
/// against hallucinated captions, not just wasted compute.
pub const SILENCE_RMS_THRESHOLD: f32 = 0.005;

/// Default ceiling on consecutive inference failures.
///
/// A single failed chunk is skipped; this many failures in a row means the
/// engine is wedged and the session terminates rather than silently
/// producing no captions.
pub const MAX_CONSECUTIVE_INFERENCE_FAILURES: u32 = 5;

/// Interval between polls of the capture backlog while assembling a chunk.
pub const CAPTURE_POLL_INTERVAL_MS: u64 = 16;

/// Backlog bound for asynchronous capture, in whole chunks.
///
/// When the consumer falls behind by more than this, the oldest samples are
/// dropped — captioning favors recency over completeness.
pub const ASYNC_BACKLOG_CHUNKS: usize = 3;

/// Default source language code (the language being spoken).
pub const SOURCE_LANGUAGE: &str = "es";

/// Default target language code (the language of published captions).
pub const TARGET_LANGUAGE: &str = "en";

/// Default transcription engine program.
///
/// Any whisper-style CLI that accepts a WAV path and prints text to stdout.
pub const ENGINE_PROGRAM: &str = "whisper-cli";

/// Default caption file path, read by the broadcast overlay.
pub const CAPTION_FILE: &str = "captions.txt";

/// Default directory for per-session transcript/translation logs.
pub const LOG_DIR: &str = "logs";

/// External decode toolchain required on PATH at startup.
///
/// Whisper-style tools shell out to it for audio container handling.
pub const DECODE_TOOL: &str = "ffmpeg";
