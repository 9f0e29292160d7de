//! Runtime values.
//!
//! [`Item`] is the dynamically typed value held in frame slots and on the
//! operand stack. Scalars are stored inline; frames, arrays and callables are
//! shared handles, so cloning an `Item` never deep-copies them.

mod frame;
mod geometry;

use std::fmt;
use std::rc::Rc;

pub use frame::{Array, Frame};
pub use geometry::{Pair, Triple};

use crate::Callable;

/// Tag of an [`Item`] variant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Void,
    Bool,
    Int,
    Real,
    Str,
    Pair,
    Triple,
    Callable,
    Frame,
    Array,
}

impl ItemKind {
    /// Name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::Void => "void",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Real => "real",
            Self::Str => "string",
            Self::Pair => "pair",
            Self::Triple => "triple",
            Self::Callable => "function",
            Self::Frame => "frame",
            Self::Array => "array",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A runtime value.
#[derive(Clone, Default)]
pub enum Item {
    /// Absence of a value; fresh frame slots hold this.
    #[default]
    Void,
    Bool(bool),
    Int(i64),
    Real(f64),
    Str(Rc<str>),
    Pair(Pair),
    Triple(Triple),
    Callable(Callable),
    /// Frame handle; `None` is the null record.
    Frame(Option<Frame>),
    /// Array handle; `None` is the null array.
    Array(Option<Array>),
}

impl Item {
    pub fn kind(&self) -> ItemKind {
        match self {
            Self::Void => ItemKind::Void,
            Self::Bool(_) => ItemKind::Bool,
            Self::Int(_) => ItemKind::Int,
            Self::Real(_) => ItemKind::Real,
            Self::Str(_) => ItemKind::Str,
            Self::Pair(_) => ItemKind::Pair,
            Self::Triple(_) => ItemKind::Triple,
            Self::Callable(_) => ItemKind::Callable,
            Self::Frame(_) => ItemKind::Frame,
            Self::Array(_) => ItemKind::Array,
        }
    }

    #[inline]
    pub fn is_void(&self) -> bool {
        matches!(self, Self::Void)
    }

    /// The null record handle.
    #[inline]
    pub fn null_frame() -> Self {
        Self::Frame(None)
    }

    /// The null array handle.
    #[inline]
    pub fn null_array() -> Self {
        Self::Array(None)
    }
}

/// Scalars compare by value, strings by content, handles by identity.
impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Void, Self::Void) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Real(a), Self::Real(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Pair(a), Self::Pair(b)) => a == b,
            (Self::Triple(a), Self::Triple(b)) => a == b,
            (Self::Callable(a), Self::Callable(b)) => a.compare(b),
            (Self::Frame(a), Self::Frame(b)) => Frame::same(a.as_ref(), b.as_ref()),
            (Self::Array(a), Self::Array(b)) => Array::same(a.as_ref(), b.as_ref()),
            _ => false,
        }
    }
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => write!(f, "Void"),
            Self::Bool(b) => write!(f, "Bool({b})"),
            Self::Int(i) => write!(f, "Int({i})"),
            Self::Real(r) => write!(f, "Real({r})"),
            Self::Str(s) => write!(f, "Str({s:?})"),
            Self::Pair(p) => write!(f, "Pair{p}"),
            Self::Triple(t) => write!(f, "Triple{t}"),
            Self::Callable(c) => write!(f, "Callable({c:?})"),
            Self::Frame(Some(fr)) => write!(f, "{fr:?}"),
            Self::Frame(None) => write!(f, "Frame(null)"),
            Self::Array(Some(a)) => write!(f, "{a:?}"),
            Self::Array(None) => write!(f, "Array(null)"),
        }
    }
}

/// Text written by the `write` builtins.
impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => write!(f, "<void>"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Real(r) => write!(f, "{r}"),
            Self::Str(s) => f.write_str(s),
            Self::Pair(p) => write!(f, "{p}"),
            Self::Triple(t) => write!(f, "{t}"),
            Self::Callable(c) if c.is_null() => write!(f, "<null function>"),
            Self::Callable(_) => write!(f, "<function>"),
            Self::Frame(Some(_)) => write!(f, "<record>"),
            Self::Array(Some(a)) => {
                write!(f, "{{")?;
                for (i, item) in a.to_vec().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "}}")
            }
            Self::Frame(None) | Self::Array(None) => write!(f, "null"),
        }
    }
}

impl From<bool> for Item {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Item {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Item {
    fn from(r: f64) -> Self {
        Self::Real(r)
    }
}

impl From<&str> for Item {
    fn from(s: &str) -> Self {
        Self::Str(Rc::from(s))
    }
}

impl From<String> for Item {
    fn from(s: String) -> Self {
        Self::Str(Rc::from(s))
    }
}

impl From<Rc<str>> for Item {
    fn from(s: Rc<str>) -> Self {
        Self::Str(s)
    }
}

impl From<Pair> for Item {
    fn from(p: Pair) -> Self {
        Self::Pair(p)
    }
}

impl From<Triple> for Item {
    fn from(t: Triple) -> Self {
        Self::Triple(t)
    }
}

impl From<Callable> for Item {
    fn from(c: Callable) -> Self {
        Self::Callable(c)
    }
}

impl From<Frame> for Item {
    fn from(frame: Frame) -> Self {
        Self::Frame(Some(frame))
    }
}

impl From<Array> for Item {
    fn from(array: Array) -> Self {
        Self::Array(Some(array))
    }
}
