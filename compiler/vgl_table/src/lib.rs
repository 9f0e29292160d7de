//! VGL Table - compile-time name resolution.
//!
//! [`ScopedTable`] binds symbols to values across nested lexical scopes. It
//! keeps every binding of a name alive as an overload set, so shadowing,
//! un-shadowing and overloading all fall out of one structure. The
//! translator instantiates it twice, once for variables and once for types.

mod errors;
mod table;

pub use errors::ResolveError;
pub use table::ScopedTable;
