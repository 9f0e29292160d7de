//! Interned identifier handle.
//!
//! A `Symbol` is a 32-bit handle into a [`SymbolInterner`](crate::SymbolInterner).
//! Two symbols are equal exactly when they name the same interned entry, so
//! comparison and hashing never touch the underlying text.

use std::fmt;

/// Interned identifier.
///
/// Layout: 32-bit index split into shard (4 bits) + slot within the shard
/// (28 bits).
/// - Bits 31-28: shard index (0-15)
/// - Bits 27-0: slot index within the shard
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Symbol(u32);

impl Symbol {
    /// Pre-interned empty string.
    pub const EMPTY: Symbol = Symbol(0);

    /// Largest slot index a shard can hand out.
    pub const MAX_SLOT: u32 = 0x0FFF_FFFF;

    /// Number of interner shards.
    pub const NUM_SHARDS: usize = 16;

    #[inline]
    pub(crate) const fn new(shard: u32, slot: u32) -> Self {
        debug_assert!(shard < 16);
        debug_assert!(slot <= Self::MAX_SLOT);
        Symbol((shard << 28) | slot)
    }

    /// Shard this symbol was interned in.
    #[inline]
    pub const fn shard(self) -> usize {
        (self.0 >> 28) as usize
    }

    /// Slot within the shard.
    #[inline]
    pub const fn slot(self) -> usize {
        (self.0 & Self::MAX_SLOT) as usize
    }

    /// Raw handle value, useful as a stable sort key within one interner.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({}:{})", self.shard(), self.slot())
    }
}

impl Default for Symbol {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::Symbol;
    crate::static_assert_size!(Symbol, 4);
    crate::static_assert_size!(Option<Symbol>, 8);
}
