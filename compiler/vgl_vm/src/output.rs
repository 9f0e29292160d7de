//! Destinations for text written by builtins.
//!
//! Enum dispatch over the three sinks: the process stdout, a capture buffer
//! (tests, embedding hosts) and a sink that drops everything.

use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;

pub enum Output {
    Stdout,
    /// Captures into a string.
    Buffer(Mutex<String>),
    Silent,
}

impl Output {
    /// Write `text` as is.
    pub fn print(&self, text: &str) {
        match self {
            Self::Stdout => write_stdout(std::io::stdout().lock(), text, false),
            Self::Buffer(buf) => buf.lock().push_str(text),
            Self::Silent => {}
        }
    }

    /// Write `text` followed by a newline.
    pub fn println(&self, text: &str) {
        match self {
            Self::Stdout => write_stdout(std::io::stdout().lock(), text, true),
            Self::Buffer(buf) => {
                let mut buf = buf.lock();
                buf.push_str(text);
                buf.push('\n');
            }
            Self::Silent => {}
        }
    }

    /// Everything captured so far; empty for sinks that do not capture.
    pub fn captured(&self) -> String {
        match self {
            Self::Buffer(buf) => buf.lock().clone(),
            Self::Stdout | Self::Silent => String::new(),
        }
    }

    pub fn clear(&self) {
        if let Self::Buffer(buf) = self {
            buf.lock().clear();
        }
    }
}

/// A closed stdout (e.g. a pipe into `head`) is not a VM error; the text is
/// dropped.
fn write_stdout(mut out: impl Write, text: &str, newline: bool) {
    let _ = out.write_all(text.as_bytes());
    if newline {
        let _ = out.write_all(b"\n");
    }
    let _ = out.flush();
}

/// Output handler shared between an interpreter and its host.
pub type SharedOutput = Arc<Output>;

pub fn stdout_output() -> SharedOutput {
    Arc::new(Output::Stdout)
}

pub fn buffer_output() -> SharedOutput {
    Arc::new(Output::Buffer(Mutex::new(String::new())))
}

pub fn silent_output() -> SharedOutput {
    Arc::new(Output::Silent)
}
