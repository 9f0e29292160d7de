//! Execution modes.
//!
//! Interactive sessions, batch runs and tests share one interpreter but
//! differ in recursion policy and where output goes. The mode is an enum with
//! policy methods rather than a set of independent flags.

use crate::output::{buffer_output, stdout_output, SharedOutput};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ExecMode {
    /// Read-eval-print session; each unit is one statement.
    #[default]
    Interactive,
    /// Whole-file run.
    Batch,
    /// Test execution; output is captured.
    Test,
}

impl ExecMode {
    /// Maximum nesting of VM runs before a stack overflow is reported.
    ///
    /// - `Interactive`: 10 000 (200 on WASM)
    /// - `Batch`: 50 000 (200 on WASM)
    /// - `Test`: 500, so runaway recursion in a test fails fast
    #[inline]
    pub fn max_call_depth(self) -> Option<usize> {
        match self {
            Self::Interactive | Self::Batch if cfg!(target_arch = "wasm32") => Some(200),
            Self::Interactive => Some(10_000),
            Self::Batch => Some(50_000),
            Self::Test => Some(500),
        }
    }

    /// Whether output goes to a capture buffer by default.
    #[inline]
    pub fn captures_output(self) -> bool {
        matches!(self, Self::Test)
    }

    /// Whether a failed unit should leave the session running.
    #[inline]
    pub fn continues_after_error(self) -> bool {
        matches!(self, Self::Interactive | Self::Test)
    }

    /// Output handler used when none is configured.
    pub fn default_output(self) -> SharedOutput {
        if self.captures_output() {
            buffer_output()
        } else {
            stdout_output()
        }
    }
}
