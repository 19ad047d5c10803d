//! Terminal clipboard using the OSC 52 escape sequence.
//!
//! The terminal emulator receives `ESC ] 52 ; c ; <base64> BEL` and puts
//! the decoded text on the system clipboard. Terminals without OSC 52
//! support silently ignore the sequence.

use std::io::{IsTerminal, Write};
use std::sync::Mutex;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use briefcast_tracker::{Clipboard, ClipboardError};

/// Build the OSC 52 sequence that sets the clipboard to `text`.
pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text))
}

pub struct Osc52Clipboard<W: Write + Send> {
    out: Mutex<W>,
    is_terminal: bool,
}

impl Osc52Clipboard<std::io::Stdout> {
    /// Clipboard writing to this process's stdout.
    pub fn stdout() -> Self {
        let out = std::io::stdout();
        let is_terminal = out.is_terminal();
        Self {
            out: Mutex::new(out),
            is_terminal,
        }
    }
}

impl<W: Write + Send> Osc52Clipboard<W> {
    /// Clipboard writing to an arbitrary sink, treated as a terminal.
    pub fn with_writer(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            is_terminal: true,
        }
    }

    pub fn into_inner(self) -> Option<W> {
        self.out.into_inner().ok()
    }
}

impl<W: Write + Send> Clipboard for Osc52Clipboard<W> {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        if !self.is_terminal {
            return Err(ClipboardError::Unavailable(
                "stdout is not a terminal".to_string(),
            ));
        }
        let mut out = self
            .out
            .lock()
            .map_err(|_| ClipboardError::Unavailable("output lock poisoned".to_string()))?;
        out.write_all(osc52_sequence(text).as_bytes())?;
        out.flush()?;
        Ok(())
    }
}
