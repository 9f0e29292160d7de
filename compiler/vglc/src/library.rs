//! Registration of the core native library.

use tracing::debug;
use vgl_ir::SymbolInterner;
use vgl_table::ResolveError;
use vgl_vm::builtins::{core_library, BuiltinName};
use vgl_vm::ItemKind;

use crate::{Access, Environment, Signature, TypeEntry};

/// Type names bound in the global scope.
pub const PRIMITIVE_TYPES: &[(&str, ItemKind)] = &[
    ("void", ItemKind::Void),
    ("bool", ItemKind::Bool),
    ("int", ItemKind::Int),
    ("real", ItemKind::Real),
    ("string", ItemKind::Str),
    ("pair", ItemKind::Pair),
    ("triple", ItemKind::Triple),
];

/// Bind every core builtin and primitive type in the current scope.
///
/// Operators are bound under their `operator` symbols, initializers and
/// casts under the special `init` and `cast` symbols. Returns the number of
/// builtins registered.
pub fn install_builtins(
    env: &mut Environment,
    interner: &SymbolInterner,
) -> Result<usize, ResolveError> {
    let specials = interner.specials();
    let library = core_library();
    for entry in library {
        let symbol = match entry.name {
            BuiltinName::Ident(name) => interner.intern(name),
            BuiltinName::Operator(op) => interner.operator(op),
            BuiltinName::Init => specials.init,
            BuiltinName::Cast => specials.cast,
        };
        env.define_function(
            symbol,
            Signature::function(entry.params, entry.result),
            Access::Builtin(entry.builtin),
        )?;
    }
    for &(name, kind) in PRIMITIVE_TYPES {
        env.define_type(interner.intern(name), TypeEntry::Primitive(kind))?;
    }
    debug!(
        builtins = library.len(),
        types = PRIMITIVE_TYPES.len(),
        "installed core library"
    );
    Ok(library.len())
}
