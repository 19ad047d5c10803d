//! Clipboard seam used by the copy action.

use std::sync::Mutex;

/// Errors from a clipboard backend.
#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    /// No clipboard is reachable (e.g. output is not a terminal).
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),

    #[error("Clipboard write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Destination for copied fragment text.
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// In-process clipboard that keeps every write.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    writes: Mutex<Vec<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent write, if any.
    pub fn last(&self) -> Option<String> {
        self.writes.lock().ok()?.last().cloned()
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        self.writes
            .lock()
            .map_err(|_| ClipboardError::Unavailable("clipboard lock poisoned".to_string()))?
            .push(text.to_string());
        Ok(())
    }
}
