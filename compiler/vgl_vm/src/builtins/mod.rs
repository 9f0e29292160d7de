//! Core builtin library.
//!
//! Every builtin follows the stack calling convention: pop arguments last
//! first, push the result. [`core_library`] lists them with the name and
//! signature a host registers them under.

mod arrays;
mod geometry;
mod io;
mod math;
mod strings;

pub use arrays::{
    array_length, array_push, array_read, array_write, empty_array, new_array, push_null_array,
    push_null_function, push_null_record,
};
pub use geometry::{
    pair_length, pair_minus, pair_negate, pair_plus, pair_x_part, pair_y_part, pair_zero,
    real_real_real_to_triple, real_real_to_pair, triple_length, triple_x_part, triple_y_part,
    triple_z_part, triple_zero,
};
pub use io::{write, writeln};
pub use math::{
    bool_false, bool_true, bool_xor, int_abs, int_int_mod, int_int_pow, int_sgn, int_to_real,
    int_zero, real_abs, real_ceil, real_cos, real_exp, real_floor, real_int_pow, real_log,
    real_pi, real_real_mod, real_real_pow, real_round, real_sin, real_sqrt, real_zero,
};
pub use strings::{string_concat, string_empty, string_length};

use std::fmt;

use crate::{Builtin, BuiltinFn, ItemKind};

/// Source-level name a builtin is bound to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BuiltinName {
    /// Plain identifier, e.g. `sqrt`.
    Ident(&'static str),
    /// Operator, bound as `operator <op>`.
    Operator(&'static str),
    /// Default initializer of the result type (`operator init`).
    Init,
    /// Implicit cast to the result type (`operator cast`).
    Cast,
}

/// Kind accepted or produced at one position of a signature.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum KindPattern {
    Is(ItemKind),
    /// Element-generic position (array elements, written values).
    Any,
}

impl KindPattern {
    #[inline]
    pub fn matches(self, kind: ItemKind) -> bool {
        match self {
            Self::Is(k) => k == kind,
            Self::Any => true,
        }
    }
}

impl fmt::Display for KindPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Is(kind) => write!(f, "{kind}"),
            Self::Any => f.write_str("any"),
        }
    }
}

/// A builtin with the name and signature it is registered under.
#[derive(Copy, Clone, Debug)]
pub struct NativeEntry {
    pub name: BuiltinName,
    pub params: &'static [KindPattern],
    pub result: KindPattern,
    pub builtin: Builtin,
}

const fn native(
    name: BuiltinName,
    params: &'static [KindPattern],
    result: KindPattern,
    id: &'static str,
    func: BuiltinFn,
) -> NativeEntry {
    NativeEntry {
        name,
        params,
        result,
        builtin: Builtin::new(id, func),
    }
}

const VOID: KindPattern = KindPattern::Is(ItemKind::Void);
const BOOL: KindPattern = KindPattern::Is(ItemKind::Bool);
const INT: KindPattern = KindPattern::Is(ItemKind::Int);
const REAL: KindPattern = KindPattern::Is(ItemKind::Real);
const STR: KindPattern = KindPattern::Is(ItemKind::Str);
const PAIR: KindPattern = KindPattern::Is(ItemKind::Pair);
const TRIPLE: KindPattern = KindPattern::Is(ItemKind::Triple);
const FUNC: KindPattern = KindPattern::Is(ItemKind::Callable);
const FRAME: KindPattern = KindPattern::Is(ItemKind::Frame);
const ARRAY: KindPattern = KindPattern::Is(ItemKind::Array);
const ANY: KindPattern = KindPattern::Any;

use BuiltinName::{Cast, Ident, Init, Operator};

static CORE: &[NativeEntry] = &[
    // Arithmetic
    native(Operator("%"), &[INT, INT], INT, "int_int_mod", int_int_mod),
    native(Operator("%"), &[REAL, REAL], REAL, "real_real_mod", real_real_mod),
    native(Operator("^"), &[INT, INT], INT, "int_int_pow", int_int_pow),
    native(Operator("^"), &[REAL, REAL], REAL, "real_real_pow", real_real_pow),
    native(Operator("^"), &[REAL, INT], REAL, "real_int_pow", real_int_pow),
    native(Ident("abs"), &[INT], INT, "int_abs", int_abs),
    native(Ident("abs"), &[REAL], REAL, "real_abs", real_abs),
    native(Ident("sgn"), &[INT], INT, "int_sgn", int_sgn),
    native(Ident("floor"), &[REAL], INT, "real_floor", real_floor),
    native(Ident("ceil"), &[REAL], INT, "real_ceil", real_ceil),
    native(Ident("round"), &[REAL], INT, "real_round", real_round),
    native(Ident("sqrt"), &[REAL], REAL, "real_sqrt", real_sqrt),
    native(Ident("sin"), &[REAL], REAL, "real_sin", real_sin),
    native(Ident("cos"), &[REAL], REAL, "real_cos", real_cos),
    native(Ident("exp"), &[REAL], REAL, "real_exp", real_exp),
    native(Ident("log"), &[REAL], REAL, "real_log", real_log),
    native(Ident("xor"), &[BOOL, BOOL], BOOL, "bool_xor", bool_xor),
    native(Cast, &[INT], REAL, "int_to_real", int_to_real),
    // Constants and initializers
    native(Init, &[], INT, "int_zero", int_zero),
    native(Init, &[], REAL, "real_zero", real_zero),
    native(Init, &[], BOOL, "bool_false", bool_false),
    native(Ident("true"), &[], BOOL, "bool_true", bool_true),
    native(Ident("false"), &[], BOOL, "bool_false", bool_false),
    native(Ident("pi"), &[], REAL, "real_pi", real_pi),
    // Strings
    native(Operator("+"), &[STR, STR], STR, "string_concat", string_concat),
    native(Ident("length"), &[STR], INT, "string_length", string_length),
    native(Init, &[], STR, "string_empty", string_empty),
    // Points
    native(Operator("tuple"), &[REAL, REAL], PAIR, "real_real_to_pair", real_real_to_pair),
    native(Ident("xpart"), &[PAIR], REAL, "pair_x_part", pair_x_part),
    native(Ident("ypart"), &[PAIR], REAL, "pair_y_part", pair_y_part),
    native(Ident("length"), &[PAIR], REAL, "pair_length", pair_length),
    native(Operator("-"), &[PAIR], PAIR, "pair_negate", pair_negate),
    native(Operator("+"), &[PAIR, PAIR], PAIR, "pair_plus", pair_plus),
    native(Operator("-"), &[PAIR, PAIR], PAIR, "pair_minus", pair_minus),
    native(Init, &[], PAIR, "pair_zero", pair_zero),
    native(
        Operator("tuple"),
        &[REAL, REAL, REAL],
        TRIPLE,
        "real_real_real_to_triple",
        real_real_real_to_triple,
    ),
    native(Ident("xpart"), &[TRIPLE], REAL, "triple_x_part", triple_x_part),
    native(Ident("ypart"), &[TRIPLE], REAL, "triple_y_part", triple_y_part),
    native(Ident("zpart"), &[TRIPLE], REAL, "triple_z_part", triple_z_part),
    native(Ident("length"), &[TRIPLE], REAL, "triple_length", triple_length),
    native(Init, &[], TRIPLE, "triple_zero", triple_zero),
    // Null handles
    native(Ident("null"), &[], FRAME, "push_null_record", push_null_record),
    native(Ident("null"), &[], FUNC, "push_null_function", push_null_function),
    native(Ident("null"), &[], ARRAY, "push_null_array", push_null_array),
    // Arrays
    native(Init, &[], ARRAY, "empty_array", empty_array),
    native(Ident("array"), &[INT], ARRAY, "new_array", new_array),
    native(Operator("[]"), &[ARRAY, INT], ANY, "array_read", array_read),
    native(Operator("[]="), &[ARRAY, INT, ANY], ANY, "array_write", array_write),
    native(Ident("length"), &[ARRAY], INT, "array_length", array_length),
    native(Ident("push"), &[ARRAY, ANY], VOID, "array_push", array_push),
    // Output
    native(Ident("write"), &[ANY], VOID, "write", write),
    native(Ident("writeln"), &[ANY], VOID, "writeln", writeln),
];

/// The core library, in registration order.
pub fn core_library() -> &'static [NativeEntry] {
    CORE
}
