//! The stack machine.
//!
//! One [`Interpreter`] owns an operand stack shared by every nested run, a
//! globals frame fixed in size at construction, and an activation stack used
//! only to recover positions and backtraces. Calls (user functions, record
//! initializers, builtins calling back into bytecode) recurse natively through
//! [`Interpreter::run_func`], guarded by a depth limit and stack growth.

mod builder;
mod exec;

use std::fmt::Write as _;
use std::rc::Rc;

use tracing::debug;
use vgl_ir::SourcePos;
use vgl_stack::{ensure_sufficient_stack, DepthLimit};

pub use builder::{InterpreterBuilder, DEFAULT_GLOBALS};

use crate::errors::{self, BacktraceFrame, VmBacktrace, VmResult};
use crate::{
    Array, Callable, ExecMode, Frame, InterruptFlag, Item, ItemKind, Lambda, Pair, Record,
    SharedOutput, Triple,
};

/// A running lambda and the offset of its current instruction.
///
/// The offset is refreshed before every call out of the lambda and when an
/// error is located, not on every step.
struct Activation {
    lambda: Rc<Lambda>,
    vars: Frame,
    offset: usize,
}

/// Operand-stack machine executing [`Lambda`] bodies.
pub struct Interpreter {
    operands: Vec<Item>,
    activations: Vec<Activation>,
    globals: Frame,
    depth: DepthLimit,
    interrupt: InterruptFlag,
    output: SharedOutput,
    mode: ExecMode,
    trace_instructions: bool,
}

macro_rules! pop_as {
    ($(#[$meta:meta])* $name:ident -> $ty:ty, $variant:ident, $kind:ident) => {
        $(#[$meta])*
        pub fn $name(&mut self) -> VmResult<$ty> {
            match self.pop()? {
                Item::$variant(v) => Ok(v),
                other => Err(errors::type_mismatch(ItemKind::$kind, other.kind())),
            }
        }
    };
}

impl Interpreter {
    /// Interpreter with `globals` global slots and default settings.
    pub fn new(globals: usize) -> Self {
        InterpreterBuilder::new().globals(globals).build()
    }

    pub fn builder() -> InterpreterBuilder {
        InterpreterBuilder::new()
    }

    // Operand stack

    #[inline]
    pub fn push(&mut self, item: impl Into<Item>) {
        self.operands.push(item.into());
    }

    #[inline]
    pub fn pop(&mut self) -> VmResult<Item> {
        self.operands.pop().ok_or_else(errors::stack_underflow)
    }

    /// The top of the stack, left in place.
    #[inline]
    pub fn top(&self) -> VmResult<&Item> {
        self.operands.last().ok_or_else(errors::stack_underflow)
    }

    pop_as!(pop_bool -> bool, Bool, Bool);
    pop_as!(pop_int -> i64, Int, Int);
    pop_as!(pop_real -> f64, Real, Real);
    pop_as!(pop_str -> Rc<str>, Str, Str);
    pop_as!(pop_pair -> Pair, Pair, Pair);
    pop_as!(pop_triple -> Triple, Triple, Triple);
    pop_as!(pop_callable -> Callable, Callable, Callable);
    pop_as!(
        /// Pop a frame handle; `None` is the null record.
        pop_frame -> Option<Frame>, Frame, Frame
    );
    pop_as!(
        /// Pop an array handle; `None` is the null array.
        pop_array -> Option<Array>, Array, Array
    );

    /// Number of items on the operand stack.
    #[inline]
    pub fn depth(&self) -> usize {
        self.operands.len()
    }

    pub fn operands(&self) -> &[Item] {
        &self.operands
    }

    /// Drop everything left on the operand stack, e.g. after an aborted unit.
    pub fn reset_operands(&mut self) {
        self.operands.clear();
    }

    // Globals

    pub fn globals(&self) -> &Frame {
        &self.globals
    }

    pub fn snapshot_globals(&self) -> Vec<Item> {
        self.globals.snapshot()
    }

    pub fn restore_globals(&mut self, slots: Vec<Item>) {
        self.globals.restore(slots);
    }

    // Host state

    pub fn interrupt_flag(&self) -> &InterruptFlag {
        &self.interrupt
    }

    /// Fail with `Interrupted` if an interrupt has been requested.
    ///
    /// The flag stays set; the host clears it once the unit has unwound.
    #[inline]
    pub fn check_interrupt(&self) -> VmResult<()> {
        if self.interrupt.is_set() {
            return Err(errors::interrupted());
        }
        Ok(())
    }

    pub fn output(&self) -> &SharedOutput {
        &self.output
    }

    pub fn mode(&self) -> ExecMode {
        self.mode
    }

    pub fn set_trace_instructions(&mut self, on: bool) {
        self.trace_instructions = on;
    }

    /// Number of nested runs in progress.
    pub fn call_depth(&self) -> usize {
        self.depth.depth()
    }

    /// Source position of the innermost running instruction, as of its last
    /// call out.
    pub fn current_pos(&self) -> Option<SourcePos> {
        self.activations
            .last()
            .and_then(|a| a.lambda.pos_at(a.offset))
    }

    // Running

    /// Invoke `callable` against the operand stack.
    pub fn run(&mut self, callable: &Callable) -> VmResult<()> {
        callable.call(self)
    }

    /// Run a top-level body with a null closure.
    pub fn run_lambda(&mut self, lambda: &Rc<Lambda>) -> VmResult<()> {
        self.run_func(lambda, None)
    }

    /// Run `lambda` with `closure` in slot 0 of a fresh frame, taking its
    /// arguments off the operand stack.
    pub fn run_func(&mut self, lambda: &Rc<Lambda>, closure: Option<Frame>) -> VmResult<()> {
        self.depth
            .enter()
            .map_err(|e| errors::stack_overflow(e.limit))?;
        let result = ensure_sufficient_stack(|| self.enter_lambda(lambda, closure));
        self.depth.exit();
        result
    }

    fn enter_lambda(&mut self, lambda: &Rc<Lambda>, closure: Option<Frame>) -> VmResult<()> {
        let params = lambda.params;
        let Some(first_arg) = self.operands.len().checked_sub(params) else {
            return Err(errors::stack_underflow());
        };

        // Arguments were pushed left to right: the deepest fills slot 1.
        let mut slots = Vec::with_capacity(lambda.vars);
        slots.push(Item::Frame(closure));
        slots.extend(self.operands.drain(first_arg..));
        slots.resize(lambda.vars.max(params + 1), Item::Void);
        let vars = Frame::from_slots(slots);

        self.activations.push(Activation {
            lambda: Rc::clone(lambda),
            vars: vars.clone(),
            offset: 0,
        });
        let result = self.execute(lambda, &vars);
        self.activations.pop();
        result
    }

    /// Allocate an instance of `record` whose parent link is `parent`.
    ///
    /// The new field frame is pushed on the operand stack, then the
    /// initializer runs with it as its closure. Same path as the `alloc`
    /// instruction.
    pub fn instantiate(&mut self, record: &Rc<Record>, parent: Option<Frame>) -> VmResult<Frame> {
        self.alloc_record(record, parent)
    }

    fn alloc_record(&mut self, record: &Rc<Record>, parent: Option<Frame>) -> VmResult<Frame> {
        let fields = Frame::with_link(record.size, parent);
        debug!(record = ?record.name, size = record.size, "allocating record");
        self.push(fields.clone());
        self.run_func(&record.init, Some(fields.clone()))?;
        Ok(fields)
    }

    // Diagnostics

    fn set_offset(&mut self, offset: usize) {
        if let Some(activation) = self.activations.last_mut() {
            activation.offset = offset;
        }
    }

    fn capture_backtrace(&self) -> VmBacktrace {
        VmBacktrace::new(
            self.activations
                .iter()
                .rev()
                .map(|a| BacktraceFrame {
                    name: a.lambda.name,
                    pos: a.lambda.pos_at(a.offset),
                })
                .collect(),
        )
    }

    /// Debug snapshot: the top of the operand stack, the running frame and
    /// the kinds of the first globals. At most ten entries per line.
    pub fn draw(&self) -> String {
        const SHOWN: usize = 10;
        let mut out = String::new();
        let skip = self.operands.len().saturating_sub(SHOWN);
        let _ = write!(out, "operands ({}):", self.operands.len());
        if skip > 0 {
            out.push_str(" ...");
        }
        for item in &self.operands[skip..] {
            let _ = write!(out, " {item:?}");
        }
        out.push('\n');

        out.push_str("vars:");
        if let Some(activation) = self.activations.last() {
            let vars = &activation.vars;
            out.push_str(if vars.link().is_some() { " link" } else { " 0" });
            for kind in vars.kinds().iter().take(SHOWN).skip(1) {
                let _ = write!(out, " {kind}");
            }
            if vars.len() > SHOWN {
                out.push_str(" ...");
            }
        }
        out.push('\n');
        let _ = writeln!(
            out,
            "activations: {} (depth {})",
            self.activations.len(),
            self.depth.depth()
        );

        out.push_str("globals:");
        let kinds = self.globals.kinds();
        for kind in kinds.iter().take(SHOWN) {
            let _ = write!(out, " {kind}");
        }
        if kinds.len() > SHOWN {
            out.push_str(" ...");
        }
        out.push('\n');
        out
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        InterpreterBuilder::new().build()
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
