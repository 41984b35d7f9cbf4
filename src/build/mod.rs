//! Smart constructors.
//!
//! Every node is built through a method on [`Context`][crate::context::Context].
//! A constructor
//!
//! 1. checks the types of its operands, panicking on a contract violation,
//! 2. looks up the requested shape in the intern table of its kind, and
//! 3. on a miss, simplifies the request and publishes the result.
//!
//! The intern key is always the *requested* shape, and the stored value is
//! the *simplified* node, which may be of a different kind (for example,
//! `and(x, true)` is stored as `x` under the key `(And, x, true)`). As a
//! consequence, equal requests yield the very same node, and structurally
//! equal simplified results yield the very same node as well, since the
//! simplified result is itself built through a constructor.
//!
//! The constructors are grouped by the kind of value they build:
//!
//! - [`constant`]: literals and default values,
//! - [`logic`]: `not`, `and`, `or`, `if`,
//! - [`arith`]: arithmetic, bitwise operations and casts,
//! - [`compare`]: equality and ordering,
//! - [`object`]: records and options,
//! - [`list`]: bounded lists,
//! - [`seq`]: unbounded sequences and strings,
//! - [`map`]: maps and sets,
//! - [`lambda`]: functions and application.

pub mod arith;
pub mod compare;
pub mod constant;
pub mod lambda;
pub mod list;
pub mod logic;
pub mod map;
pub mod object;
pub mod seq;
