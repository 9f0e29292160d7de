//! The units of invocation.

use std::fmt;
use std::rc::Rc;

use crate::errors::{self, VmResult};
use crate::{Frame, Interpreter, Item, Lambda};

/// Native function working directly on the interpreter's operand stack.
///
/// Pops its arguments (last argument first) and pushes its result, if any.
pub type BuiltinFn = fn(&mut Interpreter) -> VmResult<()>;

/// A compiled body bound to its closure frame.
#[derive(Debug)]
pub struct Func {
    pub lambda: Rc<Lambda>,
    pub closure: Option<Frame>,
}

/// A named native function.
#[derive(Copy, Clone)]
pub struct Builtin {
    name: &'static str,
    func: BuiltinFn,
}

impl Builtin {
    pub const fn new(name: &'static str, func: BuiltinFn) -> Self {
        Builtin { name, func }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn call(&self, vm: &mut Interpreter) -> VmResult<()> {
        (self.func)(vm)
    }

    /// Whether both wrap the same native function.
    #[inline]
    pub fn same_fn(&self, other: &Builtin) -> bool {
        self.func as usize == other.func as usize
    }
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Builtin({})", self.name)
    }
}

/// A callable with its first argument already bound.
#[derive(Debug)]
pub struct Thunk {
    pub func: Callable,
    pub arg: Item,
}

/// Function value.
#[derive(Clone, Default)]
pub enum Callable {
    Func(Rc<Func>),
    Builtin(Builtin),
    Thunk(Rc<Thunk>),
    /// The null function; calling it is an error.
    #[default]
    Null,
}

impl Callable {
    pub fn func(lambda: Rc<Lambda>, closure: Option<Frame>) -> Self {
        Callable::Func(Rc::new(Func { lambda, closure }))
    }

    pub const fn builtin(name: &'static str, func: BuiltinFn) -> Self {
        Callable::Builtin(Builtin::new(name, func))
    }

    pub fn thunk(func: Callable, arg: Item) -> Self {
        Callable::Thunk(Rc::new(Thunk { func, arg }))
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Callable::Null)
    }

    /// Invoke against the interpreter's operand stack.
    pub fn call(&self, vm: &mut Interpreter) -> VmResult<()> {
        match self {
            Callable::Func(f) => vm.run_func(&f.lambda, f.closure.clone()),
            Callable::Builtin(b) => b.call(vm),
            Callable::Thunk(t) => {
                vm.push(t.arg.clone());
                t.func.call(vm)
            }
            Callable::Null => Err(errors::null_function()),
        }
    }

    /// Equality of function values.
    ///
    /// Functions match on the same body and closure, builtins on the same
    /// native function. The null function equals only itself. Thunks never
    /// compare equal.
    pub fn compare(&self, other: &Callable) -> bool {
        match (self, other) {
            (Callable::Func(a), Callable::Func(b)) => {
                Rc::ptr_eq(&a.lambda, &b.lambda)
                    && Frame::same(a.closure.as_ref(), b.closure.as_ref())
            }
            (Callable::Builtin(a), Callable::Builtin(b)) => a.same_fn(b),
            (Callable::Null, Callable::Null) => true,
            _ => false,
        }
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Func(func) => match func.lambda.name {
                Some(name) => write!(f, "Func({name:?})"),
                None => write!(f, "Func(<lambda>)"),
            },
            Callable::Builtin(b) => write!(f, "{b:?}"),
            Callable::Thunk(t) => write!(f, "Thunk({:?}, {:?})", t.func, t.arg),
            Callable::Null => write!(f, "Null"),
        }
    }
}
