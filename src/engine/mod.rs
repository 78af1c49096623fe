//! Transcription engine boundary.
//!
//! The acoustic and translation models live behind this narrow synchronous
//! contract; the pipeline never sees model internals. Every call takes one
//! chunk (or one piece of text) — calls are never batched across chunks.

pub mod command;

use crate::audio::chunk::AudioChunk;
use crate::error::{LivecapError, Result};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Trait for speech transcription and translation engines.
///
/// An empty string return is valid: the model detected no speech even
/// though the chunk passed the energy gate. An `Err` means this chunk
/// produced no result; the caller skips it and continues.
pub trait TranscriptionEngine: Send + Sync {
    /// Transcribe a chunk to source-language text.
    fn transcribe(&self, chunk: &AudioChunk, source_lang: &str) -> Result<String>;

    /// Translate source-language text to target-language text.
    fn translate_text(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String>;

    /// Translate a chunk directly to target-language text, bypassing the
    /// intermediate transcript.
    fn translate_audio(
        &self,
        chunk: &AudioChunk,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String>;

    /// Check if the engine is ready (validated at pipeline startup).
    fn is_ready(&self) -> bool;

    /// Name for logging/debugging.
    fn name(&self) -> &str;
}

/// Implement TranscriptionEngine for Arc<T> to allow sharing with tests.
impl<T: TranscriptionEngine> TranscriptionEngine for Arc<T> {
    fn transcribe(&self, chunk: &AudioChunk, source_lang: &str) -> Result<String> {
        (**self).transcribe(chunk, source_lang)
    }

    fn translate_text(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String> {
        (**self).translate_text(text, source_lang, target_lang)
    }

    fn translate_audio(
        &self,
        chunk: &AudioChunk,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String> {
        (**self).translate_audio(chunk, source_lang, target_lang)
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// A scripted reply for [`MockEngine`].
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Return this text.
    Text(String),
    /// Fail with an inference error carrying this message.
    Error(String),
    /// Sleep, then return this text. Used to hold a call in flight.
    Delayed(String, Duration),
}

impl MockReply {
    pub fn text(s: &str) -> Self {
        Self::Text(s.to_string())
    }

    pub fn error(s: &str) -> Self {
        Self::Error(s.to_string())
    }

    pub fn delayed(s: &str, delay: Duration) -> Self {
        Self::Delayed(s.to_string(), delay)
    }

    fn resolve(self) -> Result<String> {
        match self {
            Self::Text(s) => Ok(s),
            Self::Error(message) => Err(LivecapError::Inference { message }),
            Self::Delayed(s, delay) => {
                std::thread::sleep(delay);
                Ok(s)
            }
        }
    }
}

/// Mock engine for testing.
///
/// Transcribe and translate calls each consume from their own scripted
/// queue; an exhausted queue yields the empty string ("heard nothing").
/// Call counters are atomic so tests can hold an `Arc<MockEngine>` clone
/// and inspect them after the pipeline finishes.
pub struct MockEngine {
    name: String,
    ready: bool,
    transcripts: Mutex<VecDeque<MockReply>>,
    translations: Mutex<VecDeque<MockReply>>,
    transcribe_calls: AtomicUsize,
    translate_text_calls: AtomicUsize,
    translate_audio_calls: AtomicUsize,
}

impl MockEngine {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ready: true,
            transcripts: Mutex::new(VecDeque::new()),
            translations: Mutex::new(VecDeque::new()),
            transcribe_calls: AtomicUsize::new(0),
            translate_text_calls: AtomicUsize::new(0),
            translate_audio_calls: AtomicUsize::new(0),
        }
    }

    /// Queue transcribe replies, consumed in order.
    pub fn with_transcripts(self, replies: Vec<MockReply>) -> Self {
        *self.transcripts.lock().unwrap_or_else(|e| e.into_inner()) = replies.into();
        self
    }

    /// Queue translate replies (shared by text and audio translation),
    /// consumed in order.
    pub fn with_translations(self, replies: Vec<MockReply>) -> Self {
        *self.translations.lock().unwrap_or_else(|e| e.into_inner()) = replies.into();
        self
    }

    /// Report not-ready so startup validation fails.
    pub fn with_not_ready(mut self) -> Self {
        self.ready = false;
        self
    }

    pub fn transcribe_calls(&self) -> usize {
        self.transcribe_calls.load(Ordering::SeqCst)
    }

    pub fn translate_text_calls(&self) -> usize {
        self.translate_text_calls.load(Ordering::SeqCst)
    }

    pub fn translate_audio_calls(&self) -> usize {
        self.translate_audio_calls.load(Ordering::SeqCst)
    }

    /// Total engine invocations across all operations.
    pub fn total_calls(&self) -> usize {
        self.transcribe_calls() + self.translate_text_calls() + self.translate_audio_calls()
    }

    fn next_reply(queue: &Mutex<VecDeque<MockReply>>) -> Result<String> {
        let reply = queue
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or(MockReply::Text(String::new()));
        reply.resolve()
    }
}

impl TranscriptionEngine for MockEngine {
    fn transcribe(&self, _chunk: &AudioChunk, _source_lang: &str) -> Result<String> {
        self.transcribe_calls.fetch_add(1, Ordering::SeqCst);
        Self::next_reply(&self.transcripts)
    }

    fn translate_text(&self, _text: &str, _source_lang: &str, _target_lang: &str) -> Result<String> {
        self.translate_text_calls.fetch_add(1, Ordering::SeqCst);
        Self::next_reply(&self.translations)
    }

    fn translate_audio(
        &self,
        _chunk: &AudioChunk,
        _source_lang: &str,
        _target_lang: &str,
    ) -> Result<String> {
        self.translate_audio_calls.fetch_add(1, Ordering::SeqCst);
        Self::next_reply(&self.translations)
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn name(&self) -> &str {
        &self.name
    }
}
