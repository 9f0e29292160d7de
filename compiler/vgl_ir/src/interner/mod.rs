//! Sharded symbol interner.
//!
//! Every distinct identifier (including synthesized operator names such as
//! `"operator +"`) is interned once and lives for the rest of the process.
//! The interner is an explicit object: callers pass `&SymbolInterner` (or a
//! cloned [`SharedInterner`]) instead of reaching for ambient global state.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::Symbol;

/// Prefix used for operator symbols.
pub const OPERATOR_PREFIX: &str = "operator ";

/// Storage for one shard of interned text.
struct Shard {
    /// Text to slot index.
    slots: FxHashMap<&'static str, u32>,
    /// Slot index to text.
    texts: Vec<&'static str>,
}

impl Shard {
    fn new() -> Self {
        Shard {
            slots: FxHashMap::default(),
            texts: Vec::with_capacity(128),
        }
    }

    fn with_empty() -> Self {
        let mut shard = Shard::new();
        shard.slots.insert("", 0);
        shard.texts.push("");
        shard
    }
}

/// Error raised when interning fails.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InternError {
    /// A shard ran out of slot indices.
    ShardFull { shard: usize, count: usize },
}

impl fmt::Display for InternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InternError::ShardFull { shard, count } => write!(
                f,
                "symbol shard {shard} is full: {count} symbols, max is {}",
                Symbol::MAX_SLOT
            ),
        }
    }
}

impl std::error::Error for InternError {}

/// Symbols the translator synthesizes for special functions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SpecialSymbols {
    /// `operator init`, the default initializer of a type.
    pub init: Symbol,
    /// `operator cast`, implicit casts.
    pub cast: Symbol,
    /// `operator ecast`, explicit casts.
    pub ecast: Symbol,
}

/// Sharded string interner producing [`Symbol`]s.
///
/// Lookups take a shard read lock; inserts take the shard write lock and
/// leak the text so that returned `&str`s stay valid for the process
/// lifetime.
pub struct SymbolInterner {
    shards: [RwLock<Shard>; Symbol::NUM_SHARDS],
    count: AtomicUsize,
    specials: SpecialSymbols,
}

impl SymbolInterner {
    /// Create an interner with the empty string and the special operator
    /// symbols already interned.
    pub fn new() -> Self {
        let shards = std::array::from_fn(|i| {
            RwLock::new(if i == 0 {
                Shard::with_empty()
            } else {
                Shard::new()
            })
        });
        let mut interner = SymbolInterner {
            shards,
            count: AtomicUsize::new(1),
            specials: SpecialSymbols {
                init: Symbol::EMPTY,
                cast: Symbol::EMPTY,
                ecast: Symbol::EMPTY,
            },
        };
        interner.specials = SpecialSymbols {
            init: interner.operator("init"),
            cast: interner.operator("cast"),
            ecast: interner.operator("ecast"),
        };
        interner
    }

    #[inline]
    fn shard_for(text: &str) -> usize {
        let hash = text
            .bytes()
            .take(8)
            .fold(0u32, |h, b| h.wrapping_mul(31).wrapping_add(u32::from(b)));
        (hash as usize) % Symbol::NUM_SHARDS
    }

    /// Intern `text`, or report that its shard is full.
    pub fn try_intern(&self, text: &str) -> Result<Symbol, InternError> {
        let shard_idx = Self::shard_for(text);
        #[allow(
            clippy::cast_possible_truncation,
            reason = "shard index is below NUM_SHARDS"
        )]
        let shard_tag = shard_idx as u32;
        let shard = &self.shards[shard_idx];

        if let Some(&slot) = shard.read().slots.get(text) {
            return Ok(Symbol::new(shard_tag, slot));
        }

        let mut guard = shard.write();
        // Another writer may have won the race between the two locks.
        if let Some(&slot) = guard.slots.get(text) {
            return Ok(Symbol::new(shard_tag, slot));
        }

        let count = guard.texts.len();
        let slot = u32::try_from(count)
            .ok()
            .filter(|&s| s <= Symbol::MAX_SLOT)
            .ok_or(InternError::ShardFull {
                shard: shard_idx,
                count,
            })?;
        let leaked: &'static str = Box::leak(text.to_owned().into_boxed_str());
        guard.texts.push(leaked);
        guard.slots.insert(leaked, slot);
        self.count.fetch_add(1, Ordering::Relaxed);

        Ok(Symbol::new(shard_tag, slot))
    }

    /// Intern `text`.
    ///
    /// # Panics
    /// Panics if the shard holding `text` is full (over 268 million symbols).
    #[inline]
    pub fn intern(&self, text: &str) -> Symbol {
        self.try_intern(text).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Intern the operator symbol for `op`, i.e. `"operator " + op`.
    pub fn operator(&self, op: &str) -> Symbol {
        self.intern(&format!("{OPERATOR_PREFIX}{op}"))
    }

    /// Intern source text, choosing the identifier or operator form.
    ///
    /// Text starting with a letter or underscore is an identifier; anything
    /// else (`+`, `--`, `<=`) is an operator.
    pub fn translate(&self, text: &str) -> Symbol {
        match text.chars().next() {
            Some(c) if c.is_alphabetic() || c == '_' => self.intern(text),
            Some(_) => self.operator(text),
            None => Symbol::EMPTY,
        }
    }

    /// Text of an interned symbol.
    pub fn lookup(&self, symbol: Symbol) -> &'static str {
        let guard = self.shards[symbol.shard()].read();
        guard.texts.get(symbol.slot()).copied().unwrap_or("")
    }

    /// Whether `symbol` names an operator.
    pub fn is_operator(&self, symbol: Symbol) -> bool {
        self.lookup(symbol).starts_with(OPERATOR_PREFIX)
    }

    /// The pre-interned special symbols.
    #[inline]
    pub fn specials(&self) -> SpecialSymbols {
        self.specials
    }

    /// Number of interned symbols, including the empty string.
    pub fn len(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }

    /// Whether only the pre-interned entries exist.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for SymbolInterner {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only access to symbol text.
///
/// Lets table and VM code render symbols without depending on the concrete
/// interner type.
pub trait SymbolLookup {
    /// Text of an interned symbol.
    fn lookup(&self, symbol: Symbol) -> &str;
}

impl SymbolLookup for SymbolInterner {
    fn lookup(&self, symbol: Symbol) -> &str {
        SymbolInterner::lookup(self, symbol)
    }
}

/// Reference-counted interner handle for owners that outlive a borrow
/// (the session driver, long-lived tables).
#[derive(Clone)]
pub struct SharedInterner(Arc<SymbolInterner>);

impl SharedInterner {
    /// Create a new shared interner.
    pub fn new() -> Self {
        SharedInterner(Arc::new(SymbolInterner::new()))
    }
}

impl Default for SharedInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for SharedInterner {
    type Target = SymbolInterner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl SymbolLookup for SharedInterner {
    fn lookup(&self, symbol: Symbol) -> &str {
        self.0.lookup(symbol)
    }
}
