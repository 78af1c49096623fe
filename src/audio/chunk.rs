//! Audio chunk type: the unit of processing for the whole pipeline.

use std::time::SystemTime;

/// A fixed-duration window of captured audio.
///
/// Samples are mono f32 normalized to [-1, 1]. The sample count is exactly
/// `duration_secs × sample_rate` for every chunk a source produces; sample
/// rate and channel count are constant for a session's lifetime.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
    pub captured_at: SystemTime,
}

impl AudioChunk {
    /// Creates a mono chunk captured now.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
            channels: 1,
            captured_at: SystemTime::now(),
        }
    }

    /// Duration of the chunk in seconds.
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// RMS energy over all samples, in [0, 1] for normalized input.
    ///
    /// Returns 0.0 for an empty chunk.
    pub fn rms(&self) -> f32 {
        rms(&self.samples)
    }
}

/// RMS energy of a sample slice.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum_squares / samples.len() as f64).sqrt() as f32
}

/// Number of samples a chunk of the given duration must contain.
pub fn samples_per_chunk(duration_secs: f32, sample_rate: u32) -> usize {
    (duration_secs as f64 * sample_rate as f64).floor() as usize
}
