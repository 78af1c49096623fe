//! End-to-end pipeline scenarios with mock capture and a mock engine.

use livecap::audio::chunk::AudioChunk;
use livecap::audio::source::MockCaptureSource;
use livecap::engine::{MockEngine, MockReply};
use livecap::error::LivecapError;
use livecap::pipeline::{self, Orchestrator, OrchestratorConfig, PipelineState};
use livecap::session::{Session, SessionLogger};
use livecap::sink::{CollectorSink, FileCaptionSink};
use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tempfile::TempDir;

fn speech_chunk() -> AudioChunk {
    AudioChunk::new(vec![0.5; 1000], 16000)
}

fn silent_chunk() -> AudioChunk {
    AudioChunk::new(vec![0.0; 1000], 16000)
}

fn logger_in(dir: &TempDir) -> SessionLogger {
    SessionLogger::open(Session::with_id(dir.path(), "scenario")).unwrap()
}

fn transcript_log(dir: &TempDir) -> String {
    fs::read_to_string(dir.path().join("transcript-scenario.log")).unwrap_or_default()
}

fn translation_log(dir: &TempDir) -> String {
    fs::read_to_string(dir.path().join("translation-scenario.log")).unwrap_or_default()
}

/// Scenario A: a loud chunk flows through the two-stage path into both
/// logs and the caption file.
#[test]
fn loud_chunk_reaches_logs_and_caption_file() {
    let dir = TempDir::new().unwrap();
    let caption_path = dir.path().join("captions.txt");

    let source = MockCaptureSource::new().with_chunks(vec![speech_chunk()]);
    let engine = Arc::new(
        MockEngine::new("mock")
            .with_transcripts(vec![MockReply::text("hola")])
            .with_translations(vec![MockReply::text("hello")]),
    );

    let mut orchestrator = Orchestrator::new(
        OrchestratorConfig::default(),
        Box::new(source),
        engine,
        logger_in(&dir),
        Box::new(FileCaptionSink::new(&caption_path)),
    );

    let running = AtomicBool::new(true);
    orchestrator.run(&running).unwrap();

    assert_eq!(transcript_log(&dir), "hola\n");
    assert_eq!(translation_log(&dir), "hello\n");
    assert_eq!(fs::read_to_string(&caption_path).unwrap(), "hello");
    assert_eq!(orchestrator.state(), PipelineState::Stopped);
}

/// Scenario B: an all-zero chunk produces zero engine invocations and
/// leaves caption file and logs untouched.
#[test]
fn silent_chunk_changes_nothing() {
    let dir = TempDir::new().unwrap();
    let caption_path = dir.path().join("captions.txt");
    fs::write(&caption_path, "previous caption").unwrap();

    let source = MockCaptureSource::new().with_chunks(vec![silent_chunk()]);
    let engine = Arc::new(MockEngine::new("mock"));
    let shared = Arc::clone(&engine);

    let mut orchestrator = Orchestrator::new(
        OrchestratorConfig::default(),
        Box::new(source),
        shared,
        logger_in(&dir),
        Box::new(FileCaptionSink::new(&caption_path)),
    );

    let running = AtomicBool::new(true);
    orchestrator.run(&running).unwrap();

    assert_eq!(engine.total_calls(), 0);
    assert_eq!(fs::read_to_string(&caption_path).unwrap(), "previous caption");
    assert_eq!(transcript_log(&dir), "");
    assert_eq!(translation_log(&dir), "");
}

/// Scenario C: the engine raises on chunk 2 only; chunks 1 and 3 still
/// publish, and the loop survives to chunk 3.
#[test]
fn single_inference_failure_skips_only_that_chunk() {
    let dir = TempDir::new().unwrap();

    let source = MockCaptureSource::new().with_chunks(vec![
        speech_chunk(),
        speech_chunk(),
        speech_chunk(),
    ]);
    let engine = Arc::new(
        MockEngine::new("mock")
            .with_transcripts(vec![
                MockReply::text("uno"),
                MockReply::error("transient failure"),
                MockReply::text("tres"),
            ])
            .with_translations(vec![MockReply::text("one"), MockReply::text("three")]),
    );

    let sink = CollectorSink::new();
    let captions = sink.entries();

    let mut orchestrator = Orchestrator::new(
        OrchestratorConfig::default(),
        Box::new(source),
        engine,
        logger_in(&dir),
        Box::new(sink),
    );

    let running = AtomicBool::new(true);
    orchestrator.run(&running).unwrap();

    assert_eq!(transcript_log(&dir), "uno\ntres\n");
    assert_eq!(translation_log(&dir), "one\nthree\n");
    assert_eq!(*captions.lock().unwrap(), vec!["one", "three"]);
    assert_eq!(orchestrator.state(), PipelineState::Stopped);
}

/// Scenario D: cancellation while chunk 2 is mid-inference. The in-flight
/// call finishes, chunk 3 is never processed, and the device is released
/// exactly once.
#[test]
fn cancellation_mid_inference_drains_cleanly() {
    let dir = TempDir::new().unwrap();

    let source = MockCaptureSource::new()
        .with_chunks(vec![speech_chunk(), speech_chunk(), speech_chunk()])
        .with_chunk_delay(Duration::from_millis(10));
    let stops = source.stop_counter();

    let engine = Arc::new(
        MockEngine::new("mock")
            .with_transcripts(vec![
                MockReply::text("uno"),
                MockReply::delayed("dos", Duration::from_millis(400)),
                MockReply::text("tres"),
            ])
            .with_translations(vec![
                MockReply::text("one"),
                MockReply::text("two"),
                MockReply::text("three"),
            ]),
    );

    let sink = CollectorSink::new();
    let captions = sink.entries();

    let orchestrator = Orchestrator::new(
        OrchestratorConfig::default(),
        Box::new(source),
        engine,
        logger_in(&dir),
        Box::new(sink),
    );

    let handle = pipeline::start(orchestrator);
    // Let chunk 1 complete and chunk 2's delayed inference get under way.
    std::thread::sleep(Duration::from_millis(100));
    handle.stop().unwrap();

    let published = captions.lock().unwrap().clone();
    assert!(!published.contains(&"three".to_string()));
    assert!(published.contains(&"one".to_string()));
    assert_eq!(stops.load(Ordering::SeqCst), 1, "device released exactly once");
}

/// FIFO ordering: captions appear in capture order even when one chunk's
/// inference is artificially slow.
#[test]
fn captions_stay_in_capture_order() {
    let dir = TempDir::new().unwrap();

    let source = MockCaptureSource::new().with_chunks(vec![
        speech_chunk(),
        speech_chunk(),
        speech_chunk(),
    ]);
    let engine = Arc::new(
        MockEngine::new("mock")
            .with_transcripts(vec![
                MockReply::text("uno"),
                MockReply::delayed("dos", Duration::from_millis(50)),
                MockReply::text("tres"),
            ])
            .with_translations(vec![
                MockReply::text("one"),
                MockReply::text("two"),
                MockReply::text("three"),
            ]),
    );

    let sink = CollectorSink::new();
    let captions = sink.entries();

    let mut orchestrator = Orchestrator::new(
        OrchestratorConfig::default(),
        Box::new(source),
        engine,
        logger_in(&dir),
        Box::new(sink),
    );

    let running = AtomicBool::new(true);
    orchestrator.run(&running).unwrap();

    assert_eq!(*captions.lock().unwrap(), vec!["one", "two", "three"]);
    assert_eq!(transcript_log(&dir), "uno\ndos\ntres\n");
}

/// A chunk whose translation comes back empty must not blank the caption
/// file: published content only changes on a non-empty result.
#[test]
fn empty_translation_never_blanks_the_caption() {
    let dir = TempDir::new().unwrap();
    let caption_path = dir.path().join("captions.txt");

    let source =
        MockCaptureSource::new().with_chunks(vec![speech_chunk(), speech_chunk()]);
    let engine = Arc::new(
        MockEngine::new("mock")
            .with_transcripts(vec![MockReply::text("hola"), MockReply::text("adiós")])
            .with_translations(vec![MockReply::text("hello"), MockReply::text("")]),
    );

    let mut orchestrator = Orchestrator::new(
        OrchestratorConfig::default(),
        Box::new(source),
        engine,
        logger_in(&dir),
        Box::new(FileCaptionSink::new(&caption_path)),
    );

    let running = AtomicBool::new(true);
    orchestrator.run(&running).unwrap();

    assert_eq!(fs::read_to_string(&caption_path).unwrap(), "hello");
    // The empty translation also never reached the translation log
    assert_eq!(translation_log(&dir), "hello\n");
    // Both transcripts were still recorded
    assert_eq!(transcript_log(&dir), "hola\nadiós\n");
}

/// Exceeding the consecutive-failure ceiling surfaces as a fatal inference
/// error from the handle.
#[test]
fn wedged_engine_terminates_session_via_handle() {
    let dir = TempDir::new().unwrap();

    let source = MockCaptureSource::new().with_chunks(vec![
        speech_chunk(),
        speech_chunk(),
        speech_chunk(),
    ]);
    let stops = source.stop_counter();
    let engine = Arc::new(MockEngine::new("wedged").with_transcripts(vec![
        MockReply::error("fail"),
        MockReply::error("fail"),
        MockReply::error("fail"),
    ]));

    let config = OrchestratorConfig {
        max_consecutive_failures: 3,
        ..OrchestratorConfig::default()
    };

    let orchestrator = Orchestrator::new(
        config,
        Box::new(source),
        engine,
        logger_in(&dir),
        Box::new(CollectorSink::new()),
    );

    let handle = pipeline::start(orchestrator);
    // Pipeline terminates itself; wait for it rather than signalling.
    handle
        .finished()
        .recv_timeout(Duration::from_secs(5))
        .unwrap();

    match handle.stop() {
        Err(LivecapError::Inference { message }) => {
            assert!(message.contains("3 consecutive"));
        }
        other => panic!("Expected Inference error, got {:?}", other.is_ok()),
    }
    assert_eq!(stops.load(Ordering::SeqCst), 1);
}
