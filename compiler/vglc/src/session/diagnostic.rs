use std::fmt;

use vgl_ir::{SourcePos, SymbolLookup};
use vgl_table::ResolveError;
use vgl_vm::VmError;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Raised while translating a unit; nothing ran.
    Compile,
    /// Raised by the VM while running a unit.
    Runtime,
}

/// A message about a failed unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub pos: Option<SourcePos>,
    pub message: String,
    /// Rendered call stack for runtime errors; empty otherwise.
    pub backtrace: String,
}

impl Diagnostic {
    pub fn compile(pos: Option<SourcePos>, message: impl Into<String>) -> Self {
        Diagnostic {
            kind: DiagnosticKind::Compile,
            pos,
            message: message.into(),
            backtrace: String::new(),
        }
    }

    /// A name resolution failure at `pos`.
    pub fn resolve<L: SymbolLookup + ?Sized>(
        err: &ResolveError,
        pos: Option<SourcePos>,
        lookup: &L,
    ) -> Self {
        Self::compile(pos, err.describe(lookup))
    }

    pub fn runtime<L: SymbolLookup + ?Sized>(err: &VmError, lookup: &L) -> Self {
        Diagnostic {
            kind: DiagnosticKind::Runtime,
            pos: err.pos,
            message: err.message.clone(),
            backtrace: err
                .backtrace
                .as_ref()
                .map(|b| b.render(lookup))
                .unwrap_or_default(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(pos) = self.pos {
            write!(f, "{pos}: ")?;
        }
        if self.kind == DiagnosticKind::Runtime {
            f.write_str("runtime: ")?;
        }
        f.write_str(&self.message)
    }
}
