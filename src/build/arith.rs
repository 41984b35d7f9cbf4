//! Arithmetic, bitwise operations and casts.
//!
//! Fixed-width integers wrap around on overflow. Multiplication is only
//! supported for arbitrary-precision integers and reals.

use log::debug;

use crate::context::Context;
use crate::error::{contract, TypeError};
use crate::node::{ArithOp, BitwiseOp, Expr, ExprKind};
use crate::types::Type;
use crate::value::{can_cast, fold_arith, fold_bit_not, fold_bitwise, fold_cast, Value};

impl Context {
    pub fn add(&self, lhs: &Expr, rhs: &Expr) -> Expr {
        self.arith(ArithOp::Add, lhs, rhs)
    }

    pub fn sub(&self, lhs: &Expr, rhs: &Expr) -> Expr {
        self.arith(ArithOp::Sub, lhs, rhs)
    }

    pub fn mul(&self, lhs: &Expr, rhs: &Expr) -> Expr {
        self.arith(ArithOp::Mul, lhs, rhs)
    }

    pub fn arith(&self, op: ArithOp, lhs: &Expr, rhs: &Expr) -> Expr {
        contract(Type::expect_same(op.name(), lhs.ty(), rhs.ty()));
        let ty = lhs.ty();
        if !ty.is_numeric() || (op == ArithOp::Mul && ty.is_fixed_int()) {
            contract::<()>(Err(TypeError::Unsupported {
                op: op.name(),
                ty: ty.clone(),
            }));
        }
        self.tables
            .arith
            .get_or_add((op, lhs.id(), rhs.id()), (lhs, rhs), |(lhs, rhs)| {
                self.simplify_arith(op, lhs, rhs)
            })
    }

    fn simplify_arith(&self, op: ArithOp, lhs: &Expr, rhs: &Expr) -> Expr {
        debug!("{}({:?}, {:?})", op.name(), lhs, rhs);

        if let (Some(a), Some(b)) = (lhs.as_constant(), rhs.as_constant()) {
            debug!("{}(c1,c2) => c", op.name());
            return self.constant(fold_arith(op, a, b));
        }

        let zero = |e: &Expr| e.as_constant().is_some_and(Value::is_zero);
        let one = |e: &Expr| e.as_constant().is_some_and(Value::is_one);
        match op {
            ArithOp::Add => {
                if zero(rhs) {
                    debug!("F + 0 => F");
                    return lhs.clone();
                }
                if zero(lhs) {
                    debug!("0 + G => G");
                    return rhs.clone();
                }
            }
            ArithOp::Sub => {
                if zero(rhs) {
                    debug!("F - 0 => F");
                    return lhs.clone();
                }
            }
            ArithOp::Mul => {
                if one(rhs) {
                    debug!("F * 1 => F");
                    return lhs.clone();
                }
                if one(lhs) {
                    debug!("1 * G => G");
                    return rhs.clone();
                }
                if zero(rhs) {
                    debug!("F * 0 => 0");
                    return rhs.clone();
                }
                if zero(lhs) {
                    debug!("0 * G => 0");
                    return lhs.clone();
                }
            }
        }

        self.mk(
            lhs.ty().clone(),
            ExprKind::Arith {
                op,
                lhs: lhs.clone(),
                rhs: rhs.clone(),
            },
        )
    }

    pub fn bit_and(&self, lhs: &Expr, rhs: &Expr) -> Expr {
        self.bitwise(BitwiseOp::And, lhs, rhs)
    }

    pub fn bit_or(&self, lhs: &Expr, rhs: &Expr) -> Expr {
        self.bitwise(BitwiseOp::Or, lhs, rhs)
    }

    pub fn bit_xor(&self, lhs: &Expr, rhs: &Expr) -> Expr {
        self.bitwise(BitwiseOp::Xor, lhs, rhs)
    }

    pub fn bitwise(&self, op: BitwiseOp, lhs: &Expr, rhs: &Expr) -> Expr {
        contract(Type::expect_same(op.name(), lhs.ty(), rhs.ty()));
        if !lhs.ty().is_fixed_int() {
            contract::<()>(Err(TypeError::Unsupported {
                op: op.name(),
                ty: lhs.ty().clone(),
            }));
        }
        // A single constant operand goes to the right, before the lookup.
        let (lhs, rhs) = if lhs.as_constant().is_some() && rhs.as_constant().is_none() {
            (rhs, lhs)
        } else {
            (lhs, rhs)
        };
        self.tables
            .bitwise
            .get_or_add((op, lhs.id(), rhs.id()), (lhs, rhs), |(lhs, rhs)| {
                self.simplify_bitwise(op, lhs, rhs)
            })
    }

    fn simplify_bitwise(&self, op: BitwiseOp, lhs: &Expr, rhs: &Expr) -> Expr {
        debug!("{}({:?}, {:?})", op.name(), lhs, rhs);

        if let (Some(a), Some(b)) = (lhs.as_constant(), rhs.as_constant()) {
            debug!("{}(c1,c2) => c", op.name());
            return self.constant(fold_bitwise(op, a, b));
        }

        let zero = |e: &Expr| matches!(e.as_constant(), Some(Value::Int(i)) if i.is_zero());
        let ones = |e: &Expr| matches!(e.as_constant(), Some(Value::Int(i)) if i.is_all_ones());

        match op {
            BitwiseOp::And => {
                if zero(rhs) {
                    debug!("F & 0 => 0");
                    return rhs.clone();
                }
                if ones(rhs) {
                    debug!("F & ~0 => F");
                    return lhs.clone();
                }
                if lhs == rhs {
                    debug!("F & F => F");
                    return lhs.clone();
                }
            }
            BitwiseOp::Or => {
                if zero(rhs) {
                    debug!("F | 0 => F");
                    return lhs.clone();
                }
                if ones(rhs) {
                    debug!("F | ~0 => ~0");
                    return rhs.clone();
                }
                if lhs == rhs {
                    debug!("F | F => F");
                    return lhs.clone();
                }
            }
            BitwiseOp::Xor => {
                if zero(rhs) {
                    debug!("F ^ 0 => F");
                    return lhs.clone();
                }
                if lhs == rhs {
                    debug!("F ^ F => 0");
                    return self.default_value(lhs.ty());
                }
            }
        }

        self.mk(
            lhs.ty().clone(),
            ExprKind::Bitwise {
                op,
                lhs: lhs.clone(),
                rhs: rhs.clone(),
            },
        )
    }

    pub fn bit_not(&self, e: &Expr) -> Expr {
        if !e.ty().is_fixed_int() {
            contract::<()>(Err(TypeError::Unsupported {
                op: "BitNot",
                ty: e.ty().clone(),
            }));
        }
        self.tables.bit_not.get_or_add(e.id(), e, |e| {
            debug!("BitNot({:?})", e);
            if let Some(c) = e.as_constant() {
                debug!("~c => c'");
                return self.constant(fold_bit_not(c));
            }
            if let ExprKind::BitNot(inner) = e.kind() {
                debug!("~~F => F");
                return inner.clone();
            }
            self.mk(e.ty().clone(), ExprKind::BitNot(e.clone()))
        })
    }

    /// Converts between numeric and character representations.
    ///
    /// Allowed casts: identity, fixed or big integer to any integer or to
    /// real, and between `char` and fixed-width integers. Narrowing wraps.
    pub fn cast(&self, e: &Expr, to: &Type) -> Expr {
        if !can_cast(e.ty(), to) {
            contract::<()>(Err(TypeError::InvalidCast {
                from: e.ty().clone(),
                to: to.clone(),
            }));
        }
        self.tables.cast.get_or_add((e.id(), to.clone()), e, |e| {
            debug!("Cast<{}>({:?})", to, e);
            if e.ty() == to {
                debug!("cast<T>(F: T) => F");
                return e.clone();
            }
            if let Some(c) = e.as_constant() {
                debug!("cast(c) => c'");
                return self.constant(fold_cast(c, to));
            }
            self.mk(to.clone(), ExprKind::Cast { expr: e.clone() })
        })
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::BigInt;
    use test_log::test;

    use super::*;

    #[test]
    fn test_arith_folding() {
        let ctx = Context::default();
        assert!(ctx.add(&ctx.int32(2), &ctx.int32(3)).ptr_eq(&ctx.int32(5)));
        assert!(ctx.sub(&ctx.uint8(1), &ctx.uint8(2)).ptr_eq(&ctx.uint8(255)));
        assert!(ctx.mul(&ctx.bigint(6), &ctx.bigint(7)).ptr_eq(&ctx.bigint(42)));
        assert!(ctx.add(&ctx.real(1, 2), &ctx.real(1, 2)).ptr_eq(&ctx.real(1, 1)));
    }

    #[test]
    fn test_arith_identities() {
        let ctx = Context::default();
        let x = ctx.symbolic("x", Type::BigInt);
        let zero = ctx.bigint(0);
        let one = ctx.bigint(1);
        assert!(ctx.add(&x, &zero).ptr_eq(&x));
        assert!(ctx.add(&zero, &x).ptr_eq(&x));
        assert!(ctx.sub(&x, &zero).ptr_eq(&x));
        assert!(ctx.mul(&x, &one).ptr_eq(&x));
        assert!(ctx.mul(&one, &x).ptr_eq(&x));
        assert!(ctx.mul(&x, &zero).ptr_eq(&zero));

        // Subtraction from zero is not the identity.
        let e = ctx.sub(&zero, &x);
        assert!(matches!(e.kind(), ExprKind::Arith { op: ArithOp::Sub, .. }));
    }

    #[test]
    #[should_panic(expected = "contract violation: Mul is not supported for type i32")]
    fn test_fixed_width_mul_rejected() {
        let ctx = Context::default();
        let x = ctx.symbolic("x", Type::int32());
        ctx.mul(&x, &ctx.int32(2));
    }

    #[test]
    #[should_panic(expected = "operand types differ")]
    fn test_arith_operand_mismatch() {
        let ctx = Context::default();
        ctx.add(&ctx.int32(1), &ctx.int64(1));
    }

    #[test]
    fn test_bitwise() {
        let ctx = Context::default();
        let x = ctx.symbolic("x", Type::uint8());
        assert!(ctx.bit_and(&ctx.uint8(0b1100), &ctx.uint8(0b1010)).ptr_eq(&ctx.uint8(0b1000)));
        assert!(ctx.bit_and(&x, &ctx.uint8(0)).ptr_eq(&ctx.uint8(0)));
        assert!(ctx.bit_and(&ctx.uint8(255), &x).ptr_eq(&x));
        assert!(ctx.bit_or(&x, &ctx.uint8(0)).ptr_eq(&x));
        assert!(ctx.bit_or(&x, &ctx.uint8(255)).ptr_eq(&ctx.uint8(255)));
        assert!(ctx.bit_or(&x, &x).ptr_eq(&x));
        assert!(ctx.bit_xor(&x, &x).ptr_eq(&ctx.uint8(0)));
        assert!(ctx.bit_not(&ctx.bit_not(&x)).ptr_eq(&x));
        assert!(ctx.bit_not(&ctx.uint8(0)).ptr_eq(&ctx.uint8(255)));
    }

    #[test]
    fn test_bitwise_constant_operand_order() {
        let ctx = Context::default();
        let x = ctx.symbolic("x", Type::uint8());
        let c = ctx.uint8(3);
        for op in [BitwiseOp::And, BitwiseOp::Or, BitwiseOp::Xor] {
            let a = ctx.bitwise(op, &c, &x);
            let b = ctx.bitwise(op, &x, &c);
            assert!(a.ptr_eq(&b), "{}: {:?} vs {:?}", op.name(), a, b);
            assert!(matches!(a.kind(), ExprKind::Bitwise { lhs, rhs, .. } if lhs.ptr_eq(&x) && rhs.ptr_eq(&c)));
        }
        assert_eq!(ctx.tables.bitwise.len(), 3);
    }

    #[test]
    fn test_cast() {
        let ctx = Context::default();
        let x = ctx.symbolic("x", Type::int32());
        assert!(ctx.cast(&x, &Type::int32()).ptr_eq(&x));
        assert!(ctx.cast(&ctx.int32(-1), &Type::uint16()).ptr_eq(&ctx.uint16(0xFFFF)));
        assert!(ctx.cast(&ctx.int64(12), &Type::BigInt).ptr_eq(&ctx.bigint(BigInt::from(12))));
        let c = ctx.cast(&x, &Type::int64());
        assert_eq!(c.ty(), &Type::int64());
        assert!(matches!(c.kind(), ExprKind::Cast { .. }));
    }

    #[test]
    #[should_panic(expected = "invalid cast from real to i32")]
    fn test_invalid_cast() {
        let ctx = Context::default();
        ctx.cast(&ctx.real(1, 2), &Type::int32());
    }
}
