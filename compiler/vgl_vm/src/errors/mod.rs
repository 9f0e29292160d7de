//! Runtime errors raised by the stack machine.
//!
//! `VmErrorKind` carries the structured condition; factory functions build
//! the matching [`VmError`] with its message already rendered. The
//! interpreter attaches a source position and a backtrace the first time an
//! error crosses an instruction boundary.

use std::fmt;

use vgl_ir::{SourcePos, Symbol, SymbolLookup};

use crate::ItemKind;

/// Result of a VM operation.
pub type VmResult<T> = Result<T, VmError>;

/// How far an error unwinds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Type and value errors. Aborts the current unit only.
    Runtime,
    /// Native stack or allocation exhaustion. Reported, then fatal.
    Resource,
    /// User interrupt. Aborts the current unit without a message.
    Cancelled,
    /// Malformed program. Fatal.
    Internal,
}

impl ErrorCategory {
    /// Whether the host may keep running later units.
    #[inline]
    pub fn is_recoverable(self) -> bool {
        matches!(self, Self::Runtime | Self::Cancelled)
    }
}

/// Structured runtime error condition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VmErrorKind {
    // Values
    NullDereference,
    NullArray,
    NullFunction,
    DivisionByZero,
    IndexOutOfBounds { index: i64, len: usize },

    // Stack and types
    StackUnderflow,
    TypeMismatch { expected: ItemKind, got: ItemKind },
    Uninitialized,

    // Resources and control
    StackOverflow { limit: usize },
    AllocationFailed { len: usize },
    Interrupted,

    // Malformed programs
    BadSlot { space: &'static str, slot: usize },
    BadConstant { index: u32 },
    IpOutOfRange { ip: usize },

    /// Raised by builtins with their own message.
    Custom { message: String },
}

impl VmErrorKind {
    /// Category that decides how far the error unwinds.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::StackOverflow { .. } | Self::AllocationFailed { .. } => {
                ErrorCategory::Resource
            }
            Self::Interrupted => ErrorCategory::Cancelled,
            Self::BadSlot { .. } | Self::BadConstant { .. } | Self::IpOutOfRange { .. } => {
                ErrorCategory::Internal
            }
            _ => ErrorCategory::Runtime,
        }
    }
}

impl fmt::Display for VmErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NullDereference => write!(f, "dereference of null pointer"),
            Self::NullArray => write!(f, "dereference of null array"),
            Self::NullFunction => write!(f, "dereference of null function"),
            Self::DivisionByZero => write!(f, "divide by 0"),
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "array index {index} is out of bounds (length {len})")
            }
            Self::StackUnderflow => write!(f, "operand stack underflow"),
            Self::TypeMismatch { expected, got } => {
                write!(f, "type mismatch: expected {expected}, got {got}")
            }
            Self::Uninitialized => write!(f, "trying to use uninitialized value"),
            Self::StackOverflow { limit } => {
                write!(f, "stack overflow: maximum call depth exceeded (limit: {limit})")
            }
            Self::AllocationFailed { len } => {
                write!(f, "out of memory: cannot allocate {len} array elements")
            }
            Self::Interrupted => write!(f, "interrupted"),
            Self::BadSlot { space, slot } => {
                write!(f, "internal VM error: bad {space} slot {slot}")
            }
            Self::BadConstant { index } => {
                write!(f, "internal VM error: bad constant 0x{index:x}")
            }
            Self::IpOutOfRange { ip } => write!(
                f,
                "internal VM error: instruction pointer {ip} is past the end of the program"
            ),
            Self::Custom { message } => f.write_str(message),
        }
    }
}

/// One active call at the point an error was raised.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BacktraceFrame {
    /// Name of the running lambda, if it has one.
    pub name: Option<Symbol>,
    /// Position of the instruction that was executing.
    pub pos: Option<SourcePos>,
}

/// Snapshot of the activation stack, innermost call first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VmBacktrace {
    frames: Vec<BacktraceFrame>,
}

impl VmBacktrace {
    pub fn new(frames: Vec<BacktraceFrame>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[BacktraceFrame] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Render with symbol names, one frame per line.
    pub fn render<L: SymbolLookup + ?Sized>(&self, lookup: &L) -> String {
        let mut out = String::new();
        if self.frames.is_empty() {
            return out;
        }
        out.push_str("stack backtrace:\n");
        for (i, frame) in self.frames.iter().enumerate() {
            let name = frame.name.map_or("<anonymous>", |s| lookup.lookup(s));
            out.push_str(&format!("  {i}: {name}"));
            if let Some(pos) = frame.pos {
                out.push_str(&format!(" at {pos}"));
            }
            out.push('\n');
        }
        out
    }
}

/// Runtime error.
#[derive(Clone, Debug, PartialEq)]
pub struct VmError {
    /// Structured condition.
    pub kind: VmErrorKind,
    /// Rendered message, equal to `kind.to_string()`.
    pub message: String,
    /// Position of the faulting instruction.
    pub pos: Option<SourcePos>,
    /// Activation stack at the faulting instruction.
    ///
    /// Set together with `pos` by the innermost interpreter loop the error
    /// passes through; outer loops leave a located error alone.
    pub backtrace: Option<VmBacktrace>,
}

impl VmError {
    /// Error with a free-form message, for builtins.
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: VmErrorKind::Custom {
                message: message.clone(),
            },
            message,
            pos: None,
            backtrace: None,
        }
    }

    fn from_kind(kind: VmErrorKind) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            message,
            pos: None,
            backtrace: None,
        }
    }

    #[must_use]
    pub fn with_pos(mut self, pos: SourcePos) -> Self {
        self.pos = Some(pos);
        self
    }

    #[must_use]
    pub fn with_backtrace(mut self, backtrace: VmBacktrace) -> Self {
        self.backtrace = Some(backtrace);
        self
    }

    /// Whether an interpreter loop has already attached position data.
    #[inline]
    pub fn is_located(&self) -> bool {
        self.backtrace.is_some()
    }

    #[inline]
    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    #[inline]
    pub fn is_interrupt(&self) -> bool {
        self.kind == VmErrorKind::Interrupted
    }
}

impl fmt::Display for VmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pos {
            Some(pos) => write!(f, "{pos}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for VmError {}

// Value errors

#[cold]
pub fn null_dereference() -> VmError {
    VmError::from_kind(VmErrorKind::NullDereference)
}

#[cold]
pub fn null_array() -> VmError {
    VmError::from_kind(VmErrorKind::NullArray)
}

#[cold]
pub fn null_function() -> VmError {
    VmError::from_kind(VmErrorKind::NullFunction)
}

#[cold]
pub fn division_by_zero() -> VmError {
    VmError::from_kind(VmErrorKind::DivisionByZero)
}

#[cold]
pub fn index_out_of_bounds(index: i64, len: usize) -> VmError {
    VmError::from_kind(VmErrorKind::IndexOutOfBounds { index, len })
}

// Stack and type errors

#[cold]
pub fn stack_underflow() -> VmError {
    VmError::from_kind(VmErrorKind::StackUnderflow)
}

/// Popped `got` where `expected` was required.
///
/// A `Void` item is an unset slot, so it reports as uninitialized rather
/// than as a mismatch.
#[cold]
pub fn type_mismatch(expected: ItemKind, got: ItemKind) -> VmError {
    if got == ItemKind::Void {
        return uninitialized();
    }
    VmError::from_kind(VmErrorKind::TypeMismatch { expected, got })
}

#[cold]
pub fn uninitialized() -> VmError {
    VmError::from_kind(VmErrorKind::Uninitialized)
}

// Resources and control

#[cold]
pub fn stack_overflow(limit: usize) -> VmError {
    VmError::from_kind(VmErrorKind::StackOverflow { limit })
}

#[cold]
pub fn allocation_failed(len: usize) -> VmError {
    VmError::from_kind(VmErrorKind::AllocationFailed { len })
}

#[cold]
pub fn interrupted() -> VmError {
    VmError::from_kind(VmErrorKind::Interrupted)
}

// Malformed programs

#[cold]
pub fn bad_slot(space: &'static str, slot: usize) -> VmError {
    VmError::from_kind(VmErrorKind::BadSlot { space, slot })
}

#[cold]
pub fn bad_constant(index: u32) -> VmError {
    VmError::from_kind(VmErrorKind::BadConstant { index })
}

#[cold]
pub fn ip_out_of_range(ip: usize) -> VmError {
    VmError::from_kind(VmErrorKind::IpOutOfRange { ip })
}
