//! Caption sinks: where the latest translation gets published.

use crate::error::{LivecapError, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Pluggable caption output handler.
///
/// `publish` is called once per successful translation. Empty text must be
/// a no-op: the previous caption stays visible rather than blanking out.
pub trait CaptionSink: Send + 'static {
    /// Publish the latest caption text.
    fn publish(&mut self, text: &str) -> Result<()>;

    /// Name for logging/debugging.
    fn name(&self) -> &'static str {
        "sink"
    }
}

/// Caption sink backed by a file that an external overlay polls.
///
/// Non-empty text replaces the whole file atomically: the content is
/// written to a temporary file in the same directory and renamed over the
/// destination, so a concurrent reader never observes a partial write.
pub struct FileCaptionSink {
    path: PathBuf,
}

impl FileCaptionSink {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CaptionSink for FileCaptionSink {
    fn publish(&mut self, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Ok(());
        }

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        // Rename is only atomic within a filesystem, so stage alongside the
        // destination.
        let mut temp = tempfile::Builder::new()
            .prefix(".livecap-caption-")
            .tempfile_in(dir)
            .map_err(|e| LivecapError::Publication {
                message: format!("failed to create caption temp file: {}", e),
            })?;
        temp.write_all(text.as_bytes())
            .and_then(|_| temp.flush())
            .map_err(|e| LivecapError::Publication {
                message: format!("failed to write caption: {}", e),
            })?;
        temp.persist(&self.path)
            .map_err(|e| LivecapError::Publication {
                message: format!("failed to replace caption file: {}", e),
            })?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "caption-file"
    }
}

/// Sink that records every published caption, for tests.
///
/// Holds its entries behind an `Arc` so tests keep a handle after the sink
/// moves into the pipeline.
pub struct CollectorSink {
    published: Arc<Mutex<Vec<String>>>,
}

impl CollectorSink {
    pub fn new() -> Self {
        Self {
            published: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared handle to the published captions, in publish order.
    pub fn entries(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.published)
    }
}

impl Default for CollectorSink {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptionSink for CollectorSink {
    fn publish(&mut self, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Ok(());
        }
        self.published
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(text.to_string());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "collector"
    }
}
