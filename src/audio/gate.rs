//! Silence gate: energy-based speech/silence classification.
//!
//! Skipping inference on silent chunks avoids hallucinated transcriptions
//! (speech models emit spurious text on near-silence) and wasted compute.

use crate::audio::chunk::AudioChunk;

/// Returns true iff the chunk's RMS energy is below the threshold.
///
/// Pure function, no state. The threshold is over normalized [-1, 1]
/// samples; 0.005 is a reasonable default for typical microphone levels.
pub fn is_silent(chunk: &AudioChunk, threshold: f32) -> bool {
    chunk.rms() < threshold
}
