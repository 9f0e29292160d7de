//! Name resolution errors.
//!
//! These are compile-time errors: a unit that fails to resolve is rejected
//! before any bytecode is built for it, so they never reach the VM.

use std::fmt;

use vgl_ir::{Symbol, SymbolLookup};

/// Failure to resolve or bind a symbol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolveError {
    /// No live binding for the symbol.
    Undefined { symbol: Symbol },
    /// Bindings exist but none fits the requested use.
    NoMatch { symbol: Symbol, candidates: usize },
    /// More than one binding in the deciding scope fits.
    Ambiguous { symbol: Symbol, candidates: usize },
    /// A conflicting binding already exists in the innermost scope.
    Redefinition { symbol: Symbol },
    /// The host ran out of slots of the given kind.
    SlotsExhausted { symbol: Symbol, capacity: usize },
}

impl ResolveError {
    /// The symbol the error is about.
    pub fn symbol(&self) -> Symbol {
        match self {
            Self::Undefined { symbol }
            | Self::NoMatch { symbol, .. }
            | Self::Ambiguous { symbol, .. }
            | Self::Redefinition { symbol }
            | Self::SlotsExhausted { symbol, .. } => *symbol,
        }
    }

    /// Render the error with the symbol's source text.
    pub fn describe<L: SymbolLookup + ?Sized>(&self, lookup: &L) -> String {
        let name = lookup.lookup(self.symbol());
        match self {
            Self::Undefined { .. } => format!("no matching variable '{name}'"),
            Self::NoMatch { candidates, .. } => {
                let word = if *candidates == 1 {
                    "candidate"
                } else {
                    "candidates"
                };
                format!("no matching function for '{name}' ({candidates} {word})")
            }
            Self::Ambiguous { candidates, .. } => {
                format!("call of '{name}' is ambiguous ({candidates} candidates)")
            }
            Self::Redefinition { .. } => format!("'{name}' is already defined in this scope"),
            Self::SlotsExhausted { capacity, .. } => {
                format!("cannot allocate '{name}': all {capacity} global slots are in use")
            }
        }
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined { symbol } => write!(f, "undefined symbol {symbol:?}"),
            Self::NoMatch { symbol, .. } => write!(f, "no matching binding for {symbol:?}"),
            Self::Ambiguous { symbol, .. } => write!(f, "ambiguous binding for {symbol:?}"),
            Self::Redefinition { symbol } => write!(f, "redefinition of {symbol:?}"),
            Self::SlotsExhausted { symbol, .. } => write!(f, "no slot left for {symbol:?}"),
        }
    }
}

impl std::error::Error for ResolveError {}
