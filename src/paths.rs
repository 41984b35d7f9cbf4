//! Enumeration of the paths through nested conditionals.
//!
//! A value built from nested `if` nodes is a decision tree: each path from
//! the root picks a branch at every conditional and ends in a leaf that is
//! not a conditional. The path is described by its [`PathConstraint`], the
//! set of guards (or negated guards) that must hold to reach the leaf.
//!
//! Branches whose constraint is trivially unsatisfiable are pruned: those
//! with a `false` guard, and those requiring both a guard and its negation.
//! Since `not` is interned, the negation of a guard is found by a lookup.
//!
//! ```
//! use zen_rs::context::Context;
//! use zen_rs::types::Type;
//!
//! let ctx = Context::default();
//! let g = ctx.symbolic("g", Type::Bool);
//! let x = ctx.symbolic("x", Type::BigInt);
//!
//! // if g { 1 } else { if g { 2 } else { x } }
//! let e = ctx.ite(&g, &ctx.bigint(1), &ctx.ite(&g, &ctx.bigint(2), &x));
//!
//! // The inner `then` branch would require both `g` and `not g`.
//! let leaves: Vec<_> = ctx.paths(&e).map(|p| p.leaf).collect();
//! assert_eq!(leaves, vec![ctx.bigint(1), x]);
//! ```
//!
//! Note: the number of paths can be exponential in the number of
//! conditionals, even when the DAG is small.

use std::collections::BTreeSet;
use std::sync::Arc;

use log::debug;

use crate::context::Context;
use crate::node::{Expr, ExprKind};

/// A conjunction of boolean guards.
///
/// Constraints are persistent: [`with`][PathConstraint::with] shares the
/// guard set with the original until one of them is extended.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct PathConstraint {
    guards: Arc<BTreeSet<Expr>>,
}

impl PathConstraint {
    pub fn new() -> Self {
        Self::default()
    }

    /// This constraint extended by `guard`. A `true` guard is dropped.
    pub fn with(&self, guard: &Expr) -> Self {
        if guard.is_true() || self.guards.contains(guard) {
            return self.clone();
        }
        let mut guards = self.guards.clone();
        Arc::make_mut(&mut guards).insert(guard.clone());
        Self { guards }
    }

    pub fn contains(&self, guard: &Expr) -> bool {
        self.guards.contains(guard)
    }

    pub fn guards(&self) -> impl Iterator<Item = &Expr> {
        self.guards.iter()
    }

    pub fn len(&self) -> usize {
        self.guards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }

    /// The constraint as a single boolean expression.
    pub fn to_expr(&self, ctx: &Context) -> Expr {
        ctx.and_all(self.guards.iter())
    }
}

/// A leaf of a decision tree and the constraint under which it is reached.
#[derive(Debug, Clone)]
pub struct Path {
    pub constraint: PathConstraint,
    pub leaf: Expr,
}

impl Context {
    /// Returns an iterator over the feasible paths through the conditionals of `expr`.
    ///
    /// Paths are produced depth-first, `then` branches before `otherwise` branches.
    pub fn paths(&self, expr: &Expr) -> ExprPaths<'_> {
        ExprPaths::new(self, expr)
    }
}

/// An iterator over the paths of a decision tree.
///
/// Created by [`Context::paths()`]. See its documentation for details.
pub struct ExprPaths<'a> {
    ctx: &'a Context,
    /// Pending subtrees with the constraint under which they are reached.
    stack: Vec<(Expr, PathConstraint)>,
}

impl<'a> ExprPaths<'a> {
    pub fn new(ctx: &'a Context, expr: &Expr) -> Self {
        ExprPaths {
            ctx,
            stack: vec![(expr.clone(), PathConstraint::new())],
        }
    }

    /// Whether adding `guard` to `constraint` is trivially unsatisfiable.
    fn infeasible(&self, constraint: &PathConstraint, guard: &Expr) -> bool {
        guard.is_false() || constraint.contains(&self.ctx.not(guard))
    }

    fn branch(&mut self, leaf: &Expr, constraint: &PathConstraint, guard: &Expr) {
        if self.infeasible(constraint, guard) {
            debug!("pruning branch {:?} under {:?}", leaf, guard);
            return;
        }
        self.stack.push((leaf.clone(), constraint.with(guard)));
    }
}

impl Iterator for ExprPaths<'_> {
    type Item = Path;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (expr, constraint) = self.stack.pop()?;
            match expr.kind() {
                ExprKind::If { guard, then, otherwise } => {
                    // Pushed in reverse, so that `then` is explored first.
                    let negated = self.ctx.not(guard);
                    self.branch(otherwise, &constraint, &negated);
                    self.branch(then, &constraint, guard);
                }
                _ => {
                    return Some(Path {
                        constraint,
                        leaf: expr,
                    })
                }
            }
        }
    }
}
