//! Compile-time environment.
//!
//! Two [`ScopedTable`]s opened and closed together: `vars` maps names to
//! variables and function overloads, `types` maps names to types. Global
//! variable slots are handed out in order and given back when the scope that
//! allocated them closes, so a rolled-back unit leaves no holes.

use std::fmt;
use std::rc::Rc;

use vgl_ir::Symbol;
use vgl_table::{ResolveError, ScopedTable};
use vgl_vm::builtins::KindPattern;
use vgl_vm::{Builtin, ItemKind, Record};

/// What a name denotes, for overload selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Signature {
    /// A variable holding one kind of value.
    Value(ItemKind),
    Function {
        params: Vec<KindPattern>,
        result: KindPattern,
    },
}

impl Signature {
    pub fn function(params: &[KindPattern], result: KindPattern) -> Self {
        Signature::Function {
            params: params.to_vec(),
            result,
        }
    }

    #[inline]
    pub fn is_function(&self) -> bool {
        matches!(self, Signature::Function { .. })
    }

    /// Whether a call with arguments of kinds `args` fits, optionally
    /// requiring the result to be of kind `result`.
    pub fn accepts(&self, args: &[ItemKind], result: Option<ItemKind>) -> bool {
        match self {
            Signature::Function {
                params,
                result: produces,
            } => {
                params.len() == args.len()
                    && params.iter().zip(args).all(|(p, &a)| p.matches(a))
                    && result.map_or(true, |k| produces.matches(k))
            }
            Signature::Value(_) => false,
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signature::Value(kind) => write!(f, "{kind}"),
            Signature::Function { params, result } => {
                f.write_str("(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{p}")?;
                }
                write!(f, ") -> {result}")
            }
        }
    }
}

/// Where the code for a name lives at run time.
#[derive(Clone, Debug)]
pub enum Access {
    /// Slot in the interpreter's globals frame.
    Global(usize),
    /// Slot in the enclosing function's frame.
    Local(usize),
    Builtin(Builtin),
}

/// A binding in the variable namespace.
#[derive(Clone, Debug)]
pub struct VarEntry {
    pub signature: Signature,
    pub access: Access,
}

/// A binding in the type namespace.
#[derive(Clone, Debug)]
pub enum TypeEntry {
    Primitive(ItemKind),
    Record(Rc<Record>),
}

/// Two variable bindings conflict when neither could be picked over the
/// other by argument kinds.
fn clashes(existing: &VarEntry, new: &VarEntry) -> bool {
    match (&existing.signature, &new.signature) {
        (Signature::Value(_), Signature::Value(_)) => true,
        (Signature::Function { .. }, Signature::Function { .. }) => {
            existing.signature == new.signature
        }
        _ => false,
    }
}

pub struct Environment {
    vars: ScopedTable<VarEntry>,
    types: ScopedTable<TypeEntry>,
    global_capacity: usize,
    next_global: usize,
    /// `next_global` when each open scope (past the first) began.
    global_marks: Vec<usize>,
}

impl Environment {
    /// Environment whose globals frame has `global_capacity` slots.
    pub fn new(global_capacity: usize) -> Self {
        Environment {
            vars: ScopedTable::new(),
            types: ScopedTable::new(),
            global_capacity,
            next_global: 0,
            global_marks: Vec::new(),
        }
    }

    pub fn begin_scope(&mut self) {
        self.vars.begin_scope();
        self.types.begin_scope();
        self.global_marks.push(self.next_global);
    }

    /// Close the innermost scope in both namespaces and release the global
    /// slots it allocated. No-op on the global scope.
    pub fn end_scope(&mut self) {
        let Some(mark) = self.global_marks.pop() else {
            return;
        };
        self.vars.end_scope();
        self.types.end_scope();
        self.next_global = mark;
    }

    /// Close the innermost scope but keep its bindings and global slots in
    /// the enclosing scope. Earlier bindings there that a kept one
    /// redeclares are dropped. No-op on the global scope.
    pub fn merge_scope(&mut self) {
        if self.global_marks.pop().is_none() {
            return;
        }
        self.vars.merge_scope(clashes);
        self.types.merge_scope(|_, _| true);
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.vars.depth()
    }

    pub fn vars(&self) -> &ScopedTable<VarEntry> {
        &self.vars
    }

    pub fn types(&self) -> &ScopedTable<TypeEntry> {
        &self.types
    }

    /// Global slots currently allocated.
    pub fn globals_used(&self) -> usize {
        self.next_global
    }

    pub fn global_capacity(&self) -> usize {
        self.global_capacity
    }

    /// Declare a global variable in the innermost scope and allocate its
    /// slot.
    pub fn define_global(&mut self, symbol: Symbol, kind: ItemKind) -> Result<usize, ResolveError> {
        if self.next_global >= self.global_capacity {
            return Err(ResolveError::SlotsExhausted {
                symbol,
                capacity: self.global_capacity,
            });
        }
        let slot = self.next_global;
        self.vars.define(
            symbol,
            VarEntry {
                signature: Signature::Value(kind),
                access: Access::Global(slot),
            },
            clashes,
        )?;
        self.next_global += 1;
        Ok(slot)
    }

    /// Declare a variable living in slot `slot` of the current function's
    /// frame.
    pub fn define_local(
        &mut self,
        symbol: Symbol,
        kind: ItemKind,
        slot: usize,
    ) -> Result<(), ResolveError> {
        self.vars.define(
            symbol,
            VarEntry {
                signature: Signature::Value(kind),
                access: Access::Local(slot),
            },
            clashes,
        )
    }

    /// Add a function overload.
    pub fn define_function(
        &mut self,
        symbol: Symbol,
        signature: Signature,
        access: Access,
    ) -> Result<(), ResolveError> {
        self.vars
            .define(symbol, VarEntry { signature, access }, clashes)
    }

    /// Bind a type name. Any other type of the same name in the innermost
    /// scope conflicts.
    pub fn define_type(&mut self, symbol: Symbol, entry: TypeEntry) -> Result<(), ResolveError> {
        self.types.define(symbol, entry, |_, _| true)
    }

    /// The variable `symbol` refers to, ignoring function overloads.
    pub fn lookup_var(&self, symbol: Symbol) -> Result<&VarEntry, ResolveError> {
        self.vars
            .resolve(symbol, |entry| !entry.signature.is_function())
    }

    /// The overload of `symbol` to call with arguments of kinds `args`.
    ///
    /// `result` narrows the choice when overloads differ only in what they
    /// return, as with `null`.
    pub fn lookup_call(
        &self,
        symbol: Symbol,
        args: &[ItemKind],
        result: Option<ItemKind>,
    ) -> Result<&VarEntry, ResolveError> {
        self.vars
            .resolve(symbol, |entry| entry.signature.accepts(args, result))
    }

    pub fn lookup_type(&self, symbol: Symbol) -> Option<&TypeEntry> {
        self.types.look(symbol)
    }
}
