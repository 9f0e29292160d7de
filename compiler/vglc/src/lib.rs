//! VGL host driver.
//!
//! Glues the symbol table and the VM together the way an embedding host
//! does:
//!
//! - [`Environment`]: the variable and type namespaces, with global slot
//!   allocation that rolls back with scopes
//! - [`install_builtins`]: registers the core native library
//! - [`Session`]: runs top-level units one at a time, undoing a failed unit's
//!   bindings and global writes
//! - [`Settings`]: command-line style configuration
//! - [`init_tracing`]: logging setup, driven by `VGL_LOG`

mod env;
mod library;
mod session;
mod settings;
mod tracing_setup;

pub use env::{Access, Environment, Signature, TypeEntry, VarEntry};
pub use library::{install_builtins, PRIMITIVE_TYPES};
pub use session::{Diagnostic, DiagnosticKind, RunSummary, Session, Unit, UnitStatus};
pub use settings::{Settings, SettingsError};
pub use tracing_setup::{init_tracing, init_tracing_with_default};
