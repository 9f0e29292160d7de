//! Scoped symbol table with overloading.
//!
//! Two structures are kept in step:
//!
//! - `scopes`: one entry list per lexical scope, innermost last, recording
//!   which symbols were entered there (in entry order).
//! - `names`: per symbol, the overload list of every live binding. The
//!   *front* of the list (the most recently entered binding) is stored at
//!   the end of the vector so `look` and `end_scope` are O(1).
//!
//! `end_scope` pops exactly one front binding per symbol entered in the
//! closing scope, walking that scope's entries in reverse. Entering the same
//! symbol twice in one scope therefore stacks an overload set that is fully
//! undone when the scope ends, and the previously visible binding reappears.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use vgl_ir::{Symbol, SymbolLookup};

use crate::ResolveError;

/// A live binding and the scope depth it was entered at.
#[derive(Clone, Debug)]
struct Binding<B> {
    value: B,
    depth: usize,
}

/// Overload list for one symbol; most recent binding last.
type Overloads<B> = SmallVec<[Binding<B>; 2]>;

/// Symbols entered in one scope, in entry order.
type ScopeEntries = SmallVec<[Symbol; 8]>;

/// Lexically scoped multimap from [`Symbol`] to bound values.
///
/// Used for both the variable and the type namespace by instantiating over
/// different `B`.
#[derive(Clone, Debug)]
pub struct ScopedTable<B> {
    scopes: Vec<ScopeEntries>,
    names: FxHashMap<Symbol, Overloads<B>>,
}

impl<B> ScopedTable<B> {
    /// Create a table holding only the global scope.
    pub fn new() -> Self {
        ScopedTable {
            scopes: vec![ScopeEntries::new()],
            names: FxHashMap::default(),
        }
    }

    /// Number of open scopes, counting the global scope.
    #[inline]
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Open a new innermost scope.
    pub fn begin_scope(&mut self) {
        self.scopes.push(ScopeEntries::new());
    }

    /// Close the innermost scope, removing every binding entered in it.
    ///
    /// The global scope is never closed; calling this at depth 1 does nothing.
    pub fn end_scope(&mut self) {
        if self.scopes.len() <= 1 {
            return;
        }
        let Some(scope) = self.scopes.pop() else {
            return;
        };
        for symbol in scope.iter().rev() {
            if let Some(list) = self.names.get_mut(symbol) {
                let removed = list.pop();
                debug_assert!(
                    removed.is_some_and(|b| b.depth == self.scopes.len() + 1),
                    "overload list out of step with scope entries"
                );
                if list.is_empty() {
                    self.names.remove(symbol);
                }
            }
        }
    }

    /// Close the innermost scope but keep its bindings, moving them into the
    /// enclosing scope.
    ///
    /// A binding already in the enclosing scope that `same` says a moved
    /// binding duplicates is dropped, so repeating a declaration replaces it
    /// instead of piling up. Calling this at depth 1 does nothing.
    pub fn merge_scope(&mut self, same: impl Fn(&B, &B) -> bool) {
        if self.scopes.len() <= 1 {
            return;
        }
        let Some(scope) = self.scopes.pop() else {
            return;
        };
        let parent = self.scopes.len();
        let Some(parent_entries) = self.scopes.last_mut() else {
            return;
        };

        for &symbol in &scope {
            let Some(list) = self.names.get_mut(&symbol) else {
                continue;
            };
            // Depths never decrease along a list, so the moved bindings are
            // a suffix. Already moved when the symbol repeats in `scope`.
            let moved_from = list
                .iter()
                .rposition(|b| b.depth <= parent)
                .map_or(0, |i| i + 1);
            if moved_from == list.len() {
                continue;
            }
            let (older, moved) = list.split_at(moved_from);
            let replaced: SmallVec<[usize; 2]> = older
                .iter()
                .enumerate()
                .rev()
                .take_while(|(_, b)| b.depth == parent)
                .filter(|(_, b)| moved.iter().any(|m| same(&b.value, &m.value)))
                .map(|(i, _)| i)
                .collect();

            // Indices are descending.
            for &i in &replaced {
                list.remove(i);
                if let Some(pos) = parent_entries.iter().position(|&s| s == symbol) {
                    parent_entries.remove(pos);
                }
            }
            for binding in list.iter_mut().rev() {
                if binding.depth <= parent {
                    break;
                }
                binding.depth = parent;
            }
        }
        parent_entries.extend(scope);
    }

    /// Bind `symbol` to `value` in the innermost scope.
    ///
    /// Existing bindings of `symbol`, including ones in the same scope, stay
    /// live behind the new one as part of its overload set.
    pub fn enter(&mut self, symbol: Symbol, value: B) {
        let depth = self.scopes.len();
        if let Some(scope) = self.scopes.last_mut() {
            scope.push(symbol);
        }
        self.names
            .entry(symbol)
            .or_default()
            .push(Binding { value, depth });
    }

    /// The innermost live binding of `symbol`.
    #[inline]
    pub fn look(&self, symbol: Symbol) -> Option<&B> {
        self.names
            .get(&symbol)
            .and_then(|list| list.last())
            .map(|b| &b.value)
    }

    /// The most recent binding of `symbol`, only if it was entered in the
    /// innermost scope.
    pub fn look_in_top_scope(&self, symbol: Symbol) -> Option<&B> {
        let depth = self.depth();
        self.names
            .get(&symbol)
            .and_then(|list| list.last())
            .filter(|b| b.depth == depth)
            .map(|b| &b.value)
    }

    /// The overload set of `symbol`, most recent binding first.
    pub fn overloads(&self, symbol: Symbol) -> impl Iterator<Item = &B> + '_ {
        self.names
            .get(&symbol)
            .into_iter()
            .flat_map(|list| list.iter().rev().map(|b| &b.value))
    }

    /// Symbols entered in the innermost scope, in entry order.
    pub fn top_scope(&self) -> &[Symbol] {
        self.scopes
            .last()
            .map(|s| s.as_slice())
            .unwrap_or_default()
    }

    /// Every symbol with a live binding whose text starts with `prefix`,
    /// sorted by text.
    pub fn completions<L: SymbolLookup + ?Sized>(&self, prefix: &str, lookup: &L) -> Vec<Symbol> {
        let mut found: Vec<(&str, Symbol)> = self
            .names
            .iter()
            .filter(|(_, list)| !list.is_empty())
            .map(|(&symbol, _)| (lookup.lookup(symbol), symbol))
            .filter(|(text, _)| text.starts_with(prefix))
            .collect();
        found.sort_unstable();
        found.into_iter().map(|(_, symbol)| symbol).collect()
    }

    /// Enter `value` unless the innermost scope already holds a binding of
    /// `symbol` that `same` considers a duplicate.
    pub fn define(
        &mut self,
        symbol: Symbol,
        value: B,
        same: impl Fn(&B, &B) -> bool,
    ) -> Result<(), ResolveError> {
        let depth = self.depth();
        if let Some(list) = self.names.get(&symbol) {
            let clash = list
                .iter()
                .rev()
                .take_while(|b| b.depth == depth)
                .any(|b| same(&b.value, &value));
            if clash {
                return Err(ResolveError::Redefinition { symbol });
            }
        }
        self.enter(symbol, value);
        Ok(())
    }

    /// Pick the binding of `symbol` selected by `matches`.
    ///
    /// The innermost scope holding at least one matching binding decides:
    /// matches in outer scopes are shadowed by it. Exactly one match there
    /// resolves; more than one is ambiguous.
    pub fn resolve(
        &self,
        symbol: Symbol,
        matches: impl Fn(&B) -> bool,
    ) -> Result<&B, ResolveError> {
        let Some(list) = self.names.get(&symbol) else {
            return Err(ResolveError::Undefined { symbol });
        };

        let mut deciding_depth = None;
        let mut chosen = None;
        let mut count = 0usize;
        for binding in list.iter().rev() {
            if deciding_depth.is_some_and(|d| binding.depth != d) {
                break;
            }
            if matches(&binding.value) {
                deciding_depth = Some(binding.depth);
                chosen.get_or_insert(&binding.value);
                count += 1;
            }
        }

        match chosen {
            Some(value) if count == 1 => Ok(value),
            Some(_) => Err(ResolveError::Ambiguous {
                symbol,
                candidates: count,
            }),
            None => Err(ResolveError::NoMatch {
                symbol,
                candidates: list.len(),
            }),
        }
    }
}

impl<B> Default for ScopedTable<B> {
    fn default() -> Self {
        Self::new()
    }
}
