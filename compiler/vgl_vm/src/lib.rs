//! VGL VM - bytecode stack machine.
//!
//! Executes compiled [`Lambda`] bodies against a shared operand stack:
//!
//! - [`Item`]: dynamically typed runtime value
//! - [`Frame`]: reference-counted slot array; slot 0 links to the enclosing frame
//! - [`Callable`]: compiled function, native builtin, thunk or the null function
//! - [`Program`] / [`Inst`]: flat instruction stream, assembled by [`ProgramBuilder`]
//! - [`Interpreter`]: the dispatch loop, record allocation and error location
//! - [`disasm`]: textual dumps for tests and diagnostics
//! - [`builtins`]: the core native library
//!
//! The machine is single-threaded. The one piece that crosses threads is the
//! [`InterruptFlag`], which the host may set to cancel the running unit.

pub mod builtins;
mod callable;
pub mod disasm;
pub mod errors;
mod exec_mode;
mod interpreter;
mod interrupt;
mod item;
mod lambda;
mod output;
mod program;

pub use callable::{Builtin, BuiltinFn, Callable, Func, Thunk};
pub use errors::{BacktraceFrame, ErrorCategory, VmBacktrace, VmError, VmErrorKind, VmResult};
pub use exec_mode::ExecMode;
pub use interpreter::{Interpreter, InterpreterBuilder, DEFAULT_GLOBALS};
pub use interrupt::InterruptFlag;
pub use item::{Array, Frame, Item, ItemKind, Pair, Triple};
pub use lambda::{Lambda, PositionTable, Record};
pub use output::{buffer_output, silent_output, stdout_output, Output, SharedOutput};
pub use program::{Inst, JumpKind, Label, Opcode, Program, ProgramBuilder, ProgramError};
