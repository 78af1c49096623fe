use crate::audio::chunk::AudioChunk;
use crate::error::{LivecapError, Result};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// Trait for audio capture sources.
///
/// This trait allows swapping implementations (real audio device vs mock).
/// A source exclusively owns its device handle between `start()` and
/// `stop()`; `stop()` is idempotent and safe on every exit path.
pub trait CaptureSource: Send {
    /// Start capturing audio from the source.
    ///
    /// Device unavailability here is fatal — the pipeline never enters its
    /// running state.
    fn start(&mut self) -> Result<()>;

    /// Block until a full chunk of audio has been captured.
    ///
    /// Returns `Ok(None)` when `running` is cleared before a full chunk is
    /// available, so the caller can drain and shut down. A mid-session
    /// device failure returns an error.
    fn next_chunk(&mut self, running: &AtomicBool) -> Result<Option<AudioChunk>>;

    /// Stop capturing and release the device. Idempotent.
    fn stop(&mut self) -> Result<()>;
}

/// Mock capture source for testing.
///
/// Yields a scripted sequence of chunks, then `Ok(None)`. Shared counters
/// let tests observe start/stop calls after the source moves into the
/// pipeline.
pub struct MockCaptureSource {
    chunks: VecDeque<AudioChunk>,
    chunk_delay: Option<Duration>,
    should_fail_start: bool,
    fail_after: Option<usize>,
    chunks_produced: usize,
    error_message: String,
    start_calls: Arc<AtomicUsize>,
    stop_calls: Arc<AtomicUsize>,
}

impl MockCaptureSource {
    /// Create a mock source with no chunks queued.
    pub fn new() -> Self {
        Self {
            chunks: VecDeque::new(),
            chunk_delay: None,
            should_fail_start: false,
            fail_after: None,
            chunks_produced: 0,
            error_message: "mock capture error".to_string(),
            start_calls: Arc::new(AtomicUsize::new(0)),
            stop_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Queue chunks to be returned in order.
    pub fn with_chunks(mut self, chunks: Vec<AudioChunk>) -> Self {
        self.chunks = chunks.into();
        self
    }

    /// Sleep this long before yielding each chunk, simulating real-time pacing.
    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = Some(delay);
        self
    }

    /// Configure the mock to fail on start.
    pub fn with_start_failure(mut self) -> Self {
        self.should_fail_start = true;
        self
    }

    /// Fail with a capture error after producing this many chunks.
    pub fn with_failure_after(mut self, chunks: usize) -> Self {
        self.fail_after = Some(chunks);
        self
    }

    /// Configure the error message for failures.
    pub fn with_error_message(mut self, message: &str) -> Self {
        self.error_message = message.to_string();
        self
    }

    /// Shared counter of `start()` calls.
    pub fn start_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.start_calls)
    }

    /// Shared counter of `stop()` calls.
    pub fn stop_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.stop_calls)
    }
}

impl Default for MockCaptureSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureSource for MockCaptureSource {
    fn start(&mut self) -> Result<()> {
        if self.should_fail_start {
            return Err(LivecapError::AudioCapture {
                message: self.error_message.clone(),
            });
        }
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn next_chunk(&mut self, running: &AtomicBool) -> Result<Option<AudioChunk>> {
        if !running.load(Ordering::SeqCst) {
            return Ok(None);
        }
        if let Some(limit) = self.fail_after
            && self.chunks_produced >= limit
        {
            return Err(LivecapError::AudioCapture {
                message: self.error_message.clone(),
            });
        }
        if let Some(delay) = self.chunk_delay {
            std::thread::sleep(delay);
            if !running.load(Ordering::SeqCst) {
                return Ok(None);
            }
        }
        match self.chunks.pop_front() {
            Some(chunk) => {
                self.chunks_produced += 1;
                Ok(Some(chunk))
            }
            None => Ok(None),
        }
    }

    fn stop(&mut self) -> Result<()> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk_of(value: f32) -> AudioChunk {
        AudioChunk::new(vec![value; 100], 16000)
    }

    #[test]
    fn test_mock_yields_chunks_in_order() {
        let running = AtomicBool::new(true);
        let mut source =
            MockCaptureSource::new().with_chunks(vec![chunk_of(0.1), chunk_of(0.2)]);

        source.start().unwrap();
        let first = source.next_chunk(&running).unwrap().unwrap();
        let second = source.next_chunk(&running).unwrap().unwrap();
        assert_eq!(first.samples[0], 0.1);
        assert_eq!(second.samples[0], 0.2);
    }

    #[test]
    fn test_mock_returns_none_when_exhausted() {
        let running = AtomicBool::new(true);
        let mut source = MockCaptureSource::new().with_chunks(vec![chunk_of(0.1)]);

        assert!(source.next_chunk(&running).unwrap().is_some());
        assert!(source.next_chunk(&running).unwrap().is_none());
    }

    #[test]
    fn test_mock_returns_none_when_cancelled() {
        let running = AtomicBool::new(false);
        let mut source = MockCaptureSource::new().with_chunks(vec![chunk_of(0.1)]);

        assert!(source.next_chunk(&running).unwrap().is_none());
    }

    #[test]
    fn test_mock_start_failure() {
        let mut source = MockCaptureSource::new().with_start_failure();
        match source.start() {
            Err(LivecapError::AudioCapture { message }) => {
                assert_eq!(message, "mock capture error");
            }
            other => panic!("Expected AudioCapture error, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_mock_failure_after_n_chunks() {
        let running = AtomicBool::new(true);
        let mut source = MockCaptureSource::new()
            .with_chunks(vec![chunk_of(0.1), chunk_of(0.2)])
            .with_failure_after(1)
            .with_error_message("device unplugged");

        assert!(source.next_chunk(&running).unwrap().is_some());
        match source.next_chunk(&running) {
            Err(LivecapError::AudioCapture { message }) => {
                assert_eq!(message, "device unplugged");
            }
            other => panic!("Expected AudioCapture error, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_mock_counts_start_and_stop_calls() {
        let mut source = MockCaptureSource::new();
        let starts = source.start_counter();
        let stops = source.stop_counter();

        source.start().unwrap();
        source.stop().unwrap();
        source.stop().unwrap();

        assert_eq!(starts.load(Ordering::SeqCst), 1);
        assert_eq!(stops.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_capture_source_is_object_safe() {
        let running = AtomicBool::new(true);
        let mut source: Box<dyn CaptureSource> =
            Box::new(MockCaptureSource::new().with_chunks(vec![chunk_of(0.3)]));

        assert!(source.start().is_ok());
        assert!(source.next_chunk(&running).unwrap().is_some());
        assert!(source.stop().is_ok());
    }
}
