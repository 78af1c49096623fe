//! Session identity and per-session transcript/translation logs.

use crate::error::{LivecapError, Result};
use chrono::Local;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// One continuous run of the pipeline, identified by its start time.
///
/// Created once at startup and immutable thereafter. The session owns the
/// paths of its two log files; the logger owns the handles.
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    transcript_path: PathBuf,
    translation_path: PathBuf,
}

impl Session {
    /// Create a session identified by the current local time.
    pub fn new(log_dir: &Path) -> Self {
        Self::with_id(log_dir, &Local::now().format("%Y%m%d-%H%M%S").to_string())
    }

    /// Create a session with an explicit identifier (used by tests).
    pub fn with_id(log_dir: &Path, id: &str) -> Self {
        Self {
            id: id.to_string(),
            transcript_path: log_dir.join(format!("transcript-{}.log", id)),
            translation_path: log_dir.join(format!("translation-{}.log", id)),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn transcript_path(&self) -> &Path {
        &self.transcript_path
    }

    pub fn translation_path(&self) -> &Path {
        &self.translation_path
    }
}

/// Append-only writer for a session's transcript and translation logs.
///
/// Each non-empty line is flushed immediately so the logs are
/// crash-consistent up to the last successful write. Empty text is a no-op:
/// silence and failed chunks must not produce blank lines.
pub struct SessionLogger {
    session: Session,
    transcript: Option<File>,
    translation: Option<File>,
}

impl SessionLogger {
    /// Open both log files in append mode, creating the directory if needed.
    pub fn open(session: Session) -> Result<Self> {
        if let Some(dir) = session.transcript_path().parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir)?;
        }

        let transcript = Self::open_append(session.transcript_path())?;
        let translation = Self::open_append(session.translation_path())?;

        Ok(Self {
            session,
            transcript: Some(transcript),
            translation: Some(translation),
        })
    }

    fn open_append(path: &Path) -> Result<File> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(LivecapError::Io)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Append a non-empty transcript line. Empty text is a no-op.
    pub fn log_transcript(&mut self, text: &str) -> Result<()> {
        Self::append_line(&mut self.transcript, text)
    }

    /// Append a non-empty translation line. Empty text is a no-op.
    pub fn log_translation(&mut self, text: &str) -> Result<()> {
        Self::append_line(&mut self.translation, text)
    }

    fn append_line(file: &mut Option<File>, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Ok(());
        }
        let Some(handle) = file.as_mut() else {
            return Err(LivecapError::Publication {
                message: "session log already closed".to_string(),
            });
        };
        handle
            .write_all(format!("{}\n", text).as_bytes())
            .and_then(|_| handle.flush())
            .map_err(|e| LivecapError::Publication {
                message: format!("log write failed: {}", e),
            })
    }

    /// Flush and release both log handles. Idempotent.
    pub fn close(&mut self) {
        for handle in [self.transcript.take(), self.translation.take()]
            .into_iter()
            .flatten()
        {
            drop(handle); // flushed on every write; drop releases the fd
        }
    }
}

impl Drop for SessionLogger {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_session_paths_include_id() {
        let session = Session::with_id(Path::new("/tmp/logs"), "20260829-120000");
        assert_eq!(session.id(), "20260829-120000");
        assert_eq!(
            session.transcript_path(),
            Path::new("/tmp/logs/transcript-20260829-120000.log")
        );
        assert_eq!(
            session.translation_path(),
            Path::new("/tmp/logs/translation-20260829-120000.log")
        );
    }

    #[test]
    fn test_session_new_id_is_timestamp_like() {
        let session = Session::new(Path::new("/tmp"));
        // YYYYMMDD-HHMMSS
        assert_eq!(session.id().len(), 15);
        assert_eq!(session.id().chars().nth(8), Some('-'));
    }

    #[test]
    fn test_logger_appends_lines_in_order() {
        let dir = TempDir::new().unwrap();
        let session = Session::with_id(dir.path(), "test");
        let mut logger = SessionLogger::open(session).unwrap();

        logger.log_translation("hello").unwrap();
        logger.log_translation("world").unwrap();

        let content =
            fs::read_to_string(dir.path().join("translation-test.log")).unwrap();
        assert_eq!(content, "hello\nworld\n");
    }

    #[test]
    fn test_logger_skips_empty_text() {
        let dir = TempDir::new().unwrap();
        let session = Session::with_id(dir.path(), "test");
        let mut logger = SessionLogger::open(session).unwrap();

        logger.log_transcript("").unwrap();
        logger.log_transcript("   ").unwrap();
        logger.log_transcript("real line").unwrap();

        let content = fs::read_to_string(dir.path().join("transcript-test.log")).unwrap();
        assert_eq!(content, "real line\n");
    }

    #[test]
    fn test_logger_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let session = Session::with_id(&nested, "test");
        let mut logger = SessionLogger::open(session).unwrap();

        logger.log_translation("line").unwrap();
        assert!(nested.join("translation-test.log").exists());
    }

    #[test]
    fn test_logger_appends_across_reopens() {
        let dir = TempDir::new().unwrap();

        {
            let mut logger =
                SessionLogger::open(Session::with_id(dir.path(), "test")).unwrap();
            logger.log_translation("first").unwrap();
        }
        {
            let mut logger =
                SessionLogger::open(Session::with_id(dir.path(), "test")).unwrap();
            logger.log_translation("second").unwrap();
        }

        let content =
            fs::read_to_string(dir.path().join("translation-test.log")).unwrap();
        assert_eq!(content, "first\nsecond\n");
    }

    #[test]
    fn test_close_is_idempotent_and_writes_after_close_fail() {
        let dir = TempDir::new().unwrap();
        let mut logger = SessionLogger::open(Session::with_id(dir.path(), "test")).unwrap();

        logger.close();
        logger.close();

        match logger.log_translation("too late") {
            Err(LivecapError::Publication { message }) => {
                assert!(message.contains("closed"));
            }
            other => panic!("Expected Publication error, got {:?}", other.is_ok()),
        }
    }
}
