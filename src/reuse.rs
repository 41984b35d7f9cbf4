//! Detection of shared subexpressions.
//!
//! A node is *reused* when it is reachable from the root along more than
//! one path. Each distinct node is expanded exactly once, so the walk is
//! linear in the size of the DAG, even when the tree it unfolds to is
//! exponentially larger.

use rustc_hash::FxHashSet;

use crate::node::{Expr, ExprId};

/// Walks a DAG once and records every node reached more than once.
#[derive(Debug, Default)]
pub struct ReuseDetector {
    seen: FxHashSet<ExprId>,
    reused: FxHashSet<ExprId>,
    visits: usize,
}

impl ReuseDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walks `root` and everything below it not walked before.
    pub fn visit(&mut self, root: &Expr) {
        let mut stack = vec![root];
        while let Some(e) = stack.pop() {
            self.visits += 1;
            if !self.seen.insert(e.id()) {
                self.reused.insert(e.id());
                continue;
            }
            // Reversed, so that children pop in their natural order.
            stack.extend(e.children().into_iter().rev());
        }
    }

    pub fn is_reused(&self, e: &Expr) -> bool {
        self.reused.contains(&e.id())
    }

    pub fn reused(&self) -> &FxHashSet<ExprId> {
        &self.reused
    }

    pub fn into_reused(self) -> FxHashSet<ExprId> {
        self.reused
    }

    /// Number of node visits so far, including repeated arrivals at shared nodes.
    pub fn visits(&self) -> usize {
        self.visits
    }
}

/// The nodes reachable from `root` along more than one path.
pub fn find_reused(root: &Expr) -> FxHashSet<ExprId> {
    let mut detector = ReuseDetector::new();
    detector.visit(root);
    detector.into_reused()
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::context::Context;
    use crate::types::Type;

    #[test]
    fn test_shared_node_expanded_once() {
        let ctx = Context::default();
        let p = ctx.symbolic("p", Type::Bool);
        let q = ctx.symbolic("q", Type::Bool);
        let shared = ctx.and(&p, &q);
        let root = ctx.and(&shared, &ctx.not(&shared));

        let mut detector = ReuseDetector::new();
        detector.visit(&root);
        assert!(detector.is_reused(&shared));
        assert!(!detector.is_reused(&p));
        assert!(!detector.is_reused(&q));
        assert_eq!(detector.reused().len(), 1);
        // root, shared, p, q, not, shared again: the second arrival at
        // `shared` does not walk p and q again.
        assert_eq!(detector.visits(), 6);
    }

    #[test]
    fn test_tree_has_no_reuse() {
        let ctx = Context::default();
        let x = ctx.symbolic("x", Type::BigInt);
        let y = ctx.symbolic("y", Type::BigInt);
        let e = ctx.add(&ctx.mul(&x, &ctx.bigint(2)), &y);
        assert!(find_reused(&e).is_empty());
    }

    #[test]
    fn test_linear_on_exponential_tree() {
        let ctx = Context::default();
        let mut e = ctx.symbolic("x", Type::BigInt);
        for _ in 0..64 {
            e = ctx.add(&e, &e);
        }
        let mut detector = ReuseDetector::new();
        detector.visit(&e);
        assert_eq!(detector.reused().len(), 64);
        assert_eq!(detector.visits(), 1 + 2 * 64);
    }
}
