//! Compiled bodies and record descriptors.

use std::rc::Rc;

use vgl_ir::{SourcePos, Symbol};

use crate::Program;

/// Monotonic map from instruction offset to source position.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PositionTable {
    entries: Vec<(usize, SourcePos)>,
}

impl PositionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that code from `offset` on comes from `pos`.
    ///
    /// Offsets must not decrease; a repeated offset replaces the previous
    /// entry.
    pub fn push(&mut self, offset: usize, pos: SourcePos) {
        match self.entries.last_mut() {
            Some(last) if last.0 == offset => last.1 = pos,
            Some(last) => {
                debug_assert!(last.0 < offset, "position offsets must increase");
                self.entries.push((offset, pos));
            }
            None => self.entries.push((offset, pos)),
        }
    }

    /// Position of the nearest entry at or before `offset`.
    pub fn lookup(&self, offset: usize) -> Option<SourcePos> {
        let idx = self.entries.partition_point(|&(o, _)| o <= offset);
        idx.checked_sub(1).map(|i| self.entries[i].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Compiled function body, independent of any closure.
#[derive(Debug)]
pub struct Lambda {
    pub code: Program,
    /// Number of arguments popped into slots `1..=params`.
    pub params: usize,
    /// Total frame size, slot 0 included.
    pub vars: usize,
    pub positions: PositionTable,
    /// Name shown in backtraces and disassembly.
    pub name: Option<Symbol>,
}

impl Lambda {
    /// A body taking `params` arguments in a frame of `vars` slots.
    ///
    /// The frame always has room for the link and every parameter.
    pub fn new(code: Program, params: usize, vars: usize) -> Self {
        Lambda {
            code,
            params,
            vars: vars.max(params + 1),
            positions: PositionTable::new(),
            name: None,
        }
    }

    #[must_use]
    pub fn with_positions(mut self, positions: PositionTable) -> Self {
        self.positions = positions;
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: Symbol) -> Self {
        self.name = Some(name);
        self
    }

    /// Source position of the instruction at `offset`.
    #[inline]
    pub fn pos_at(&self, offset: usize) -> Option<SourcePos> {
        self.positions.lookup(offset)
    }
}

/// Record type: field frame size plus initializer.
///
/// Records are compared by identity only; use [`Record::same`].
#[derive(Debug)]
pub struct Record {
    pub name: Symbol,
    /// Field frame size, slot 0 (the parent link) included.
    pub size: usize,
    /// Zero-parameter body run with the new field frame as its closure.
    pub init: Rc<Lambda>,
}

impl Record {
    pub fn new(name: Symbol, size: usize, init: Rc<Lambda>) -> Self {
        Record {
            name,
            size: size.max(1),
            init,
        }
    }

    #[inline]
    pub fn same(a: &Rc<Record>, b: &Rc<Record>) -> bool {
        Rc::ptr_eq(a, b)
    }
}
