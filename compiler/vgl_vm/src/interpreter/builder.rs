//! `InterpreterBuilder` for configuring an [`Interpreter`].

use vgl_stack::DepthLimit;

use super::Interpreter;
use crate::{ExecMode, Frame, InterruptFlag, SharedOutput};

/// Global slots allocated when the host does not say otherwise.
pub const DEFAULT_GLOBALS: usize = 256;

/// Builder for [`Interpreter`].
///
/// The mode supplies the recursion limit and the output sink unless they are
/// set explicitly.
#[derive(Default)]
pub struct InterpreterBuilder {
    globals: Option<usize>,
    mode: ExecMode,
    output: Option<SharedOutput>,
    interrupt: Option<InterruptFlag>,
    max_call_depth: Option<Option<usize>>,
    trace_instructions: bool,
}

impl InterpreterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Size of the globals frame.
    #[must_use]
    pub fn globals(mut self, slots: usize) -> Self {
        self.globals = Some(slots);
        self
    }

    #[must_use]
    pub fn mode(mut self, mode: ExecMode) -> Self {
        self.mode = mode;
        self
    }

    /// Output sink; overrides the mode's default.
    #[must_use]
    pub fn output(mut self, output: SharedOutput) -> Self {
        self.output = Some(output);
        self
    }

    /// Share an interrupt flag with the host.
    #[must_use]
    pub fn interrupt(mut self, flag: InterruptFlag) -> Self {
        self.interrupt = Some(flag);
        self
    }

    /// Override the mode's call depth limit; `None` is unlimited.
    #[must_use]
    pub fn max_call_depth(mut self, limit: Option<usize>) -> Self {
        self.max_call_depth = Some(limit);
        self
    }

    /// Emit a trace event per executed instruction.
    #[must_use]
    pub fn trace_instructions(mut self, on: bool) -> Self {
        self.trace_instructions = on;
        self
    }

    pub fn build(self) -> Interpreter {
        let mode = self.mode;
        Interpreter {
            operands: Vec::with_capacity(64),
            activations: Vec::new(),
            globals: Frame::new(self.globals.unwrap_or(DEFAULT_GLOBALS)),
            depth: DepthLimit::new(self.max_call_depth.unwrap_or_else(|| mode.max_call_depth())),
            interrupt: self.interrupt.unwrap_or_default(),
            output: self.output.unwrap_or_else(|| mode.default_output()),
            mode,
            trace_instructions: self.trace_instructions,
        }
    }
}
