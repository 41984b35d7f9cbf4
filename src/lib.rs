//! # zen-rs: Hash-Consed Symbolic Expressions in Rust
//!
//! **`zen-rs`** builds typed symbolic expression graphs for modeling and verification:
//! booleans, fixed-width and unbounded integers, rationals, characters, records,
//! sequences, lists, maps and sets, and first-class functions.
//!
//! ## Key Features
//!
//! - **Context-Centric Architecture**: All nodes are built through a [`Context`][crate::context::Context].
//!   It interns every node (hash-consing), so structurally equal requests yield the very same node,
//!   and equality of expressions is an identity check.
//! - **Simplification at Construction**: Smart constructors fold constants and apply local
//!   algebraic rewrites (identities, De Morgan, record eta, map get-after-set, ...) before interning.
//! - **Thread Safe**: A context can be shared between threads; racing constructions converge on one node.
//! - **Analyses**: Evaluation ([`eval`]), substitution ([`subst`]), shared-subterm detection ([`reuse`]),
//!   path enumeration ([`paths`]) and a readable pretty-printer ([`format`]).
//!
//! ## Basic Usage
//!
//! ```rust
//! use zen_rs::context::Context;
//! use zen_rs::eval::{evaluate, Assignment, Val};
//! use zen_rs::types::Type;
//!
//! let ctx = Context::default();
//!
//! // Inputs:
//! let x = ctx.parameter("x", Type::int32());
//! let y = ctx.parameter("y", Type::int32());
//!
//! // Model: if x < y { y - x } else { x - y }
//! let f = ctx.ite(&ctx.lt(&x, &y), &ctx.sub(&y, &x), &ctx.sub(&x, &y));
//!
//! let mut assignment = Assignment::new();
//! assignment.set(&x, Val::from(3i32)).set(&y, Val::from(10i32));
//! assert_eq!(evaluate(&f, &assignment).unwrap(), Val::from(7i32));
//! ```
//!
//! ## Core Components
//!
//! - **[`context`]**: The [`Context`][crate::context::Context] and its intern tables.
//! - **[`build`]**: The smart constructors and their rewrite rules.
//! - **[`node`]**: The expression node, [`Expr`][crate::node::Expr], and its kinds.
//! - **[`visitor`]**: The [`ExprVisitor`][crate::visitor::ExprVisitor] trait, for passes over expressions.

pub mod build;
pub mod context;
pub mod error;
pub mod eval;
pub mod format;
pub mod node;
pub mod paths;
pub mod reuse;
pub mod subst;
pub mod table;
pub mod types;
pub mod value;
pub mod visitor;
