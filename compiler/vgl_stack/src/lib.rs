//! Stack safety for nested VM runs.
//!
//! The interpreter implements calls (user closures, record initializers,
//! builtins calling back into bytecode) as native recursion. Two guards keep a
//! runaway program from crashing the host:
//!
//! - [`ensure_sufficient_stack`] grows the native stack on demand so moderate
//!   recursion never hits the guard page.
//! - [`DepthLimit`] counts nested runs and reports [`DepthExceeded`] once the
//!   configured limit is reached, which the VM turns into a stack overflow
//!   error instead of growing without bound.
//!
//! # Configuration
//!
//! - **Red zone**: 100KB. If less than this remains, the stack is grown.
//! - **Growth size**: 1MB per growth.

use std::fmt;

/// Minimum stack space to keep available (100KB red zone).
const RED_ZONE: usize = 100 * 1024;

/// Stack space allocated on each growth (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first growing the native stack if less than the red zone remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM version: the runtime manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

/// Reported when a nested run would exceed the depth limit.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DepthExceeded {
    pub limit: usize,
}

impl fmt::Display for DepthExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "maximum call depth exceeded (limit: {})", self.limit)
    }
}

impl std::error::Error for DepthExceeded {}

/// Counter of nested runs with an optional upper bound.
///
/// `None` means unlimited; stack growth alone then bounds recursion.
#[derive(Clone, Debug, Default)]
pub struct DepthLimit {
    depth: usize,
    limit: Option<usize>,
}

impl DepthLimit {
    /// Create a counter with the given limit.
    pub fn new(limit: Option<usize>) -> Self {
        DepthLimit { depth: 0, limit }
    }

    /// Record entry into a nested run.
    ///
    /// The depth is not incremented when the limit would be exceeded.
    #[inline]
    pub fn enter(&mut self) -> Result<(), DepthExceeded> {
        if let Some(limit) = self.limit {
            if self.depth >= limit {
                return Err(DepthExceeded { limit });
            }
        }
        self.depth += 1;
        Ok(())
    }

    /// Record exit from a nested run.
    #[inline]
    pub fn exit(&mut self) {
        debug_assert!(self.depth > 0, "DepthLimit::exit without enter");
        self.depth = self.depth.saturating_sub(1);
    }

    /// Current nesting depth.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Configured limit.
    #[inline]
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Forget all recorded nesting, e.g. after an aborted unit.
    pub fn reset(&mut self) {
        self.depth = 0;
    }
}

#[cfg(test)]
mod tests;
