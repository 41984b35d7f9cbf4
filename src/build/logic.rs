//! Boolean connectives and conditionals.

use log::debug;

use crate::context::Context;
use crate::error::contract;
use crate::node::{Expr, ExprKind, LogicalOp};
use crate::types::Type;

impl Context {
    pub fn not(&self, e: &Expr) -> Expr {
        contract(e.ty().expect("not", &Type::Bool));
        self.tables.not.get_or_add(e.id(), e, |e| self.simplify_not(e))
    }

    fn simplify_not(&self, e: &Expr) -> Expr {
        debug!("not({:?})", e);

        if let Some(b) = e.as_bool() {
            debug!("not(c) => !c");
            return self.bool(!b);
        }
        if let ExprKind::Not(inner) = e.kind() {
            debug!("not(not(F)) => F");
            return inner.clone();
        }

        self.mk(Type::Bool, ExprKind::Not(e.clone()))
    }

    pub fn and(&self, lhs: &Expr, rhs: &Expr) -> Expr {
        self.logical(LogicalOp::And, lhs, rhs)
    }

    pub fn or(&self, lhs: &Expr, rhs: &Expr) -> Expr {
        self.logical(LogicalOp::Or, lhs, rhs)
    }

    /// `lhs => rhs`, built as `or(not(lhs), rhs)`.
    pub fn implies(&self, lhs: &Expr, rhs: &Expr) -> Expr {
        self.or(&self.not(lhs), rhs)
    }

    /// Left-nested conjunction of all operands; `true` when there are none.
    pub fn and_all<'a>(&self, operands: impl IntoIterator<Item = &'a Expr>) -> Expr {
        operands.into_iter().fold(self.bool(true), |acc, e| self.and(&acc, e))
    }

    /// Left-nested disjunction of all operands; `false` when there are none.
    pub fn or_all<'a>(&self, operands: impl IntoIterator<Item = &'a Expr>) -> Expr {
        operands.into_iter().fold(self.bool(false), |acc, e| self.or(&acc, e))
    }

    pub fn logical(&self, op: LogicalOp, lhs: &Expr, rhs: &Expr) -> Expr {
        contract(lhs.ty().expect(op.name(), &Type::Bool));
        contract(rhs.ty().expect(op.name(), &Type::Bool));
        self.tables
            .logical
            .get_or_add((op, lhs.id(), rhs.id()), (lhs, rhs), |(lhs, rhs)| {
                self.simplify_logical(op, lhs, rhs)
            })
    }

    fn simplify_logical(&self, op: LogicalOp, lhs: &Expr, rhs: &Expr) -> Expr {
        debug!("{}({:?}, {:?})", op.name(), lhs, rhs);
        let identity = op.identity();

        // and(true, G) => G, and(false, G) => false, dually for or
        if let Some(b) = lhs.as_bool() {
            debug!("{}(c,G) => {}", op.name(), if b == identity { "G" } else { "c" });
            return if b == identity { rhs.clone() } else { lhs.clone() };
        }
        if let Some(b) = rhs.as_bool() {
            debug!("{}(F,c) => {}", op.name(), if b == identity { "F" } else { "c" });
            return if b == identity { lhs.clone() } else { rhs.clone() };
        }

        if lhs == rhs {
            debug!("{}(F,F) => F", op.name());
            return lhs.clone();
        }

        // Operands of a `Not` are never `Not` themselves, so this fires at most once.
        if let (ExprKind::Not(a), ExprKind::Not(b)) = (lhs.kind(), rhs.kind()) {
            debug!("{}(~F,~G) => ~{}(F,G)", op.name(), op.dual().name());
            return self.not(&self.logical(op.dual(), a, b));
        }

        self.mk(
            Type::Bool,
            ExprKind::Logical {
                op,
                lhs: lhs.clone(),
                rhs: rhs.clone(),
            },
        )
    }

    /// Conditional `if guard then then else otherwise`.
    pub fn ite(&self, guard: &Expr, then: &Expr, otherwise: &Expr) -> Expr {
        contract(guard.ty().expect("if", &Type::Bool));
        contract(Type::expect_same("if", then.ty(), otherwise.ty()));
        self.tables.ite.get_or_add(
            (guard.id(), then.id(), otherwise.id()),
            (guard, then, otherwise),
            |(g, t, e)| self.simplify_ite(g, t, e),
        )
    }

    fn simplify_ite(&self, guard: &Expr, then: &Expr, otherwise: &Expr) -> Expr {
        debug!("ite(g = {:?}, t = {:?}, e = {:?})", guard, then, otherwise);
        let preserve = self.settings().preserve_branches;

        if guard.is_true() {
            debug!("ite(1,G,H) => G");
            return then.clone();
        }
        if guard.is_false() {
            debug!("ite(0,G,H) => H");
            return otherwise.clone();
        }
        if !preserve && then == otherwise {
            debug!("ite(F,G,G) => G");
            return then.clone();
        }

        if let ExprKind::Not(g) = guard.kind() {
            debug!("ite(~F,G,H) => ite(F,H,G)");
            return self.ite(g, otherwise, then);
        }

        if !preserve && then.ty().is_bool() {
            if then.is_true() {
                debug!("ite(F,1,H) => or(F,H)");
                return self.or(guard, otherwise);
            }
            if then.is_false() {
                debug!("ite(F,0,H) => and(~F,H)");
                return self.and(&self.not(guard), otherwise);
            }
            if otherwise.is_true() {
                debug!("ite(F,G,1) => or(~F,G)");
                return self.or(&self.not(guard), then);
            }
            if otherwise.is_false() {
                debug!("ite(F,G,0) => and(F,G)");
                return self.and(guard, then);
            }
        }

        self.mk(
            then.ty().clone(),
            ExprKind::If {
                guard: guard.clone(),
                then: then.clone(),
                otherwise: otherwise.clone(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::context::Settings;

    fn setup() -> (Context, Expr, Expr, Expr) {
        let ctx = Context::default();
        let x = ctx.symbolic("x", Type::Bool);
        let y = ctx.symbolic("y", Type::Bool);
        let z = ctx.symbolic("z", Type::Bool);
        (ctx, x, y, z)
    }

    #[test]
    fn test_interning_idempotent() {
        let (ctx, x, y, _) = setup();
        let a = ctx.and(&x, &y);
        let b = ctx.and(&x, &y);
        assert!(a.ptr_eq(&b));
        assert!(matches!(a.kind(), ExprKind::Logical { op: LogicalOp::And, .. }));
        // Operand order is part of the identity.
        assert!(!a.ptr_eq(&ctx.and(&y, &x)));
    }

    #[test]
    fn test_and_identities() {
        let (ctx, x, _, _) = setup();
        let t = ctx.bool(true);
        let f = ctx.bool(false);
        assert!(ctx.and(&x, &t).ptr_eq(&x));
        assert!(ctx.and(&t, &x).ptr_eq(&x));
        assert!(ctx.and(&x, &f).is_false());
        assert!(ctx.and(&f, &x).is_false());
        assert!(ctx.and(&x, &x).ptr_eq(&x));
    }

    #[test]
    fn test_or_identities() {
        let (ctx, x, _, _) = setup();
        let t = ctx.bool(true);
        let f = ctx.bool(false);
        assert!(ctx.or(&x, &f).ptr_eq(&x));
        assert!(ctx.or(&f, &x).ptr_eq(&x));
        assert!(ctx.or(&x, &t).is_true());
        assert!(ctx.or(&x, &x).ptr_eq(&x));
    }

    #[test]
    fn test_not() {
        let (ctx, x, _, _) = setup();
        assert!(ctx.not(&ctx.not(&x)).ptr_eq(&x));
        assert!(ctx.not(&ctx.bool(true)).is_false());
        assert!(ctx.not(&x).ptr_eq(&ctx.not(&x)));
    }

    #[test]
    fn test_de_morgan() {
        let (ctx, x, y, _) = setup();
        let e = ctx.and(&ctx.not(&x), &ctx.not(&y));
        assert!(e.ptr_eq(&ctx.not(&ctx.or(&x, &y))));
        let e = ctx.or(&ctx.not(&x), &ctx.not(&y));
        assert!(e.ptr_eq(&ctx.not(&ctx.and(&x, &y))));
    }

    #[test]
    fn test_ite_constant_guard() {
        let ctx = Context::default();
        let a = ctx.symbolic("a", Type::int32());
        let b = ctx.symbolic("b", Type::int32());
        assert!(ctx.ite(&ctx.bool(true), &a, &b).ptr_eq(&a));
        assert!(ctx.ite(&ctx.bool(false), &a, &b).ptr_eq(&b));
    }

    #[test]
    fn test_ite_same_branches() {
        let (ctx, g, _, _) = setup();
        let a = ctx.symbolic("a", Type::Char);
        assert!(ctx.ite(&g, &a, &a).ptr_eq(&a));

        let ctx2 = Context::with_settings(Settings { preserve_branches: true });
        let g2 = ctx2.symbolic("g", Type::Bool);
        let a2 = ctx2.symbolic("a", Type::Char);
        let e = ctx2.ite(&g2, &a2, &a2);
        assert!(matches!(e.kind(), ExprKind::If { .. }));
    }

    #[test]
    fn test_ite_negated_guard() {
        let ctx = Context::default();
        let g = ctx.symbolic("g", Type::Bool);
        let a = ctx.symbolic("a", Type::BigInt);
        let b = ctx.symbolic("b", Type::BigInt);
        let e = ctx.ite(&ctx.not(&g), &a, &b);
        assert!(e.ptr_eq(&ctx.ite(&g, &b, &a)));
    }

    #[test]
    fn test_ite_boolean_branches() {
        let (ctx, g, x, _) = setup();
        let t = ctx.bool(true);
        let f = ctx.bool(false);
        assert!(ctx.ite(&g, &t, &x).ptr_eq(&ctx.or(&g, &x)));
        assert!(ctx.ite(&g, &f, &x).ptr_eq(&ctx.and(&ctx.not(&g), &x)));
        assert!(ctx.ite(&g, &x, &t).ptr_eq(&ctx.or(&ctx.not(&g), &x)));
        assert!(ctx.ite(&g, &x, &f).ptr_eq(&ctx.and(&g, &x)));
        assert!(ctx.ite(&g, &t, &f).ptr_eq(&g));
    }

    #[test]
    fn test_ite_preserve_branches() {
        let ctx = Context::with_settings(Settings { preserve_branches: true });
        let g = ctx.symbolic("g", Type::Bool);
        let x = ctx.symbolic("x", Type::Bool);
        let e = ctx.ite(&g, &ctx.bool(true), &x);
        assert!(matches!(e.kind(), ExprKind::If { .. }));
    }

    #[test]
    fn test_fold_helpers() {
        let (ctx, x, y, z) = setup();
        assert!(ctx.and_all([]).is_true());
        assert!(ctx.or_all([]).is_false());
        let all = ctx.and_all([&x, &y, &z]);
        assert!(all.ptr_eq(&ctx.and(&ctx.and(&x, &y), &z)));
        assert!(ctx.implies(&x, &y).ptr_eq(&ctx.or(&ctx.not(&x), &y)));
    }

    #[test]
    #[should_panic(expected = "contract violation: And: expected bool, found i32")]
    fn test_and_type_mismatch() {
        let ctx = Context::default();
        let x = ctx.symbolic("x", Type::Bool);
        ctx.and(&x, &ctx.int32(1));
    }

    #[test]
    #[should_panic(expected = "contract violation: if: operand types differ (bool vs char)")]
    fn test_ite_branch_mismatch() {
        let ctx = Context::default();
        let g = ctx.symbolic("g", Type::Bool);
        ctx.ite(&g, &g, &ctx.char('c'));
    }
}
