//! Equality and ordering.

use log::debug;

use crate::build::seq::seq_values;
use crate::context::Context;
use crate::error::{contract, TypeError};
use crate::node::{CompareOp, Expr, ExprKind};
use crate::types::Type;
use crate::value::fold_compare;

impl Context {
    /// Structural equality.
    ///
    /// Equality of records is expanded into the conjunction of field-wise
    /// equalities. Functions cannot be compared.
    pub fn eq(&self, lhs: &Expr, rhs: &Expr) -> Expr {
        contract(Type::expect_same("Equals", lhs.ty(), rhs.ty()));
        if let Type::Fun(..) = lhs.ty() {
            contract::<()>(Err(TypeError::Unsupported {
                op: "Equals",
                ty: lhs.ty().clone(),
            }));
        }
        self.tables
            .equals
            .get_or_add((lhs.id(), rhs.id()), (lhs, rhs), |(lhs, rhs)| self.simplify_eq(lhs, rhs))
    }

    fn simplify_eq(&self, lhs: &Expr, rhs: &Expr) -> Expr {
        debug!("Equals({:?}, {:?})", lhs, rhs);

        if lhs == rhs {
            debug!("F == F => 1");
            return self.bool(true);
        }
        if let (Some(a), Some(b)) = (lhs.as_constant(), rhs.as_constant()) {
            debug!("c1 == c2 => c");
            return self.bool(a == b);
        }
        if let (Some(a), Some(b)) = (seq_values(lhs), seq_values(rhs)) {
            debug!("s1 == s2 => c");
            return self.bool(a == b);
        }
        if lhs.ty().is_bool() {
            // Normalize a single constant operand to the right.
            let (lhs, rhs) = if lhs.as_bool().is_some() { (rhs, lhs) } else { (lhs, rhs) };
            if rhs.is_true() {
                debug!("F == 1 => F");
                return lhs.clone();
            }
            if rhs.is_false() {
                debug!("F == 0 => ~F");
                return self.not(lhs);
            }
        }
        if let Type::Object(schema) = lhs.ty() {
            debug!("object equality => field-wise");
            let parts: Vec<Expr> = schema
                .fields()
                .iter()
                .map(|(name, _)| self.eq(&self.get_field(lhs, name), &self.get_field(rhs, name)))
                .collect();
            return self.and_all(&parts);
        }

        self.mk(
            Type::Bool,
            ExprKind::Equals {
                lhs: lhs.clone(),
                rhs: rhs.clone(),
            },
        )
    }

    /// `not(eq(lhs, rhs))`.
    pub fn ne(&self, lhs: &Expr, rhs: &Expr) -> Expr {
        self.not(&self.eq(lhs, rhs))
    }

    pub fn lt(&self, lhs: &Expr, rhs: &Expr) -> Expr {
        self.compare(CompareOp::Lt, lhs, rhs)
    }

    pub fn le(&self, lhs: &Expr, rhs: &Expr) -> Expr {
        self.compare(CompareOp::Le, lhs, rhs)
    }

    pub fn gt(&self, lhs: &Expr, rhs: &Expr) -> Expr {
        self.compare(CompareOp::Gt, lhs, rhs)
    }

    pub fn ge(&self, lhs: &Expr, rhs: &Expr) -> Expr {
        self.compare(CompareOp::Ge, lhs, rhs)
    }

    pub fn compare(&self, op: CompareOp, lhs: &Expr, rhs: &Expr) -> Expr {
        contract(Type::expect_same(op.name(), lhs.ty(), rhs.ty()));
        if !lhs.ty().is_ordered() {
            contract::<()>(Err(TypeError::Unsupported {
                op: op.name(),
                ty: lhs.ty().clone(),
            }));
        }
        self.tables
            .compare
            .get_or_add((op, lhs.id(), rhs.id()), (lhs, rhs), |(lhs, rhs)| {
                debug!("{}({:?}, {:?})", op.name(), lhs, rhs);
                if let (Some(a), Some(b)) = (lhs.as_constant(), rhs.as_constant()) {
                    debug!("{}(c1,c2) => c", op.name());
                    return self.constant(fold_compare(op, a, b));
                }
                if lhs == rhs {
                    debug!("{}(F,F) => c", op.name());
                    return self.bool(matches!(op, CompareOp::Le | CompareOp::Ge));
                }
                self.mk(
                    Type::Bool,
                    ExprKind::Compare {
                        op,
                        lhs: lhs.clone(),
                        rhs: rhs.clone(),
                    },
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::types::ObjectType;

    #[test]
    fn test_eq_simplifications() {
        let ctx = Context::default();
        let x = ctx.symbolic("x", Type::int32());
        let b = ctx.symbolic("b", Type::Bool);
        assert!(ctx.eq(&x, &x).is_true());
        assert!(ctx.eq(&ctx.int32(1), &ctx.int32(1)).is_true());
        assert!(ctx.eq(&ctx.int32(1), &ctx.int32(2)).is_false());
        assert!(ctx.eq(&b, &ctx.bool(true)).ptr_eq(&b));
        assert!(ctx.eq(&ctx.bool(true), &b).ptr_eq(&b));
        assert!(ctx.eq(&b, &ctx.bool(false)).ptr_eq(&ctx.not(&b)));

        let e = ctx.eq(&x, &ctx.int32(3));
        assert!(matches!(e.kind(), ExprKind::Equals { .. }));
        assert!(ctx.ne(&x, &ctx.int32(3)).ptr_eq(&ctx.not(&e)));
    }

    #[test]
    fn test_eq_sequence_literals() {
        let ctx = Context::default();
        let s = ctx.symbolic("s", Type::string());
        assert!(ctx.eq(&ctx.string("ab"), &ctx.string("ac")).is_false());
        assert!(ctx.eq(&ctx.string("ab"), &ctx.string("ab")).is_true());
        assert!(ctx.eq(&ctx.string(""), &ctx.string("a")).is_false());
        assert!(ctx.seq_starts_with(&ctx.string("hello"), &ctx.string("xy")).is_false());
        assert!(ctx.seq_starts_with(&ctx.string("hello"), &ctx.string("he")).is_true());
        assert!(matches!(ctx.eq(&s, &ctx.string("ab")).kind(), ExprKind::Equals { .. }));
    }

    #[test]
    fn test_eq_objects_fieldwise() {
        let ctx = Context::default();
        let point = Type::object(ObjectType::new("Point", [("X", Type::BigInt), ("Y", Type::BigInt)]));
        let p = ctx.symbolic("p", point.clone());
        let x = ctx.symbolic("x", Type::BigInt);
        let q = ctx.create(&point, [("X", x.clone()), ("Y", ctx.bigint(2))]);
        let e = ctx.eq(&p, &q);
        let expected = ctx.and(
            &ctx.eq(&ctx.get_field(&p, "X"), &x),
            &ctx.eq(&ctx.get_field(&p, "Y"), &ctx.bigint(2)),
        );
        assert!(e.ptr_eq(&expected));
    }

    #[test]
    fn test_compare() {
        let ctx = Context::default();
        let c = ctx.symbolic("c", Type::Char);
        assert!(ctx.lt(&ctx.char('a'), &ctx.char('b')).is_true());
        assert!(ctx.ge(&ctx.int8(-1), &ctx.int8(0)).is_false());
        assert!(ctx.gt(&ctx.uint8(255), &ctx.uint8(0)).is_true());
        assert!(ctx.le(&c, &c).is_true());
        assert!(ctx.lt(&c, &c).is_false());
        assert!(matches!(ctx.le(&c, &ctx.char('z')).kind(), ExprKind::Compare { .. }));
    }

    #[test]
    #[should_panic(expected = "Lt is not supported for type bool")]
    fn test_compare_unordered() {
        let ctx = Context::default();
        ctx.lt(&ctx.bool(false), &ctx.bool(true));
    }
}
