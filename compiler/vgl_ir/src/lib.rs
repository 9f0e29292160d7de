//! VGL IR - identifiers and positions shared across the toolchain.
//!
//! - [`Symbol`]: compact interned identifier, O(1) equality
//! - [`SymbolInterner`]: process-lifetime interner, passed explicitly
//! - [`SourcePos`]: line/column position used by runtime diagnostics

/// Compile-time assertion that a type has a specific size.
///
/// Guards frequently copied handle types against size regressions.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod interner;
mod pos;
mod symbol;

pub use interner::{
    InternError, SharedInterner, SpecialSymbols, SymbolInterner, SymbolLookup, OPERATOR_PREFIX,
};
pub use pos::SourcePos;
pub use symbol::Symbol;
