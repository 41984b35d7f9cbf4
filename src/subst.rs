//! Substitution of placeholders and variables.
//!
//! Rebuilding goes through the smart constructors, so the result is
//! simplified again: substituting a constant for a variable folds every
//! operation that becomes constant. Subterms that do not mention a
//! substituted variable are rebuilt from unchanged children, which the
//! intern tables answer with the original node.

use std::sync::Arc;

use log::debug;
use rustc_hash::FxHashMap;

use crate::context::Context;
use crate::error::contract;
use crate::node::{ArithOp, BitwiseOp, CombineOp, CompareOp, ConsCase, Expr, ExprId, Lambda, LogicalOp};
use crate::types::{Name, ObjectType};
use crate::value::Value;
use crate::visitor::ExprVisitor;

/// Rebuilds expressions with some leaves replaced.
pub struct Substituter<'a> {
    ctx: &'a Context,
    bindings: FxHashMap<ExprId, Expr>,
    memo: FxHashMap<ExprId, Expr>,
}

impl<'a> Substituter<'a> {
    pub fn new(ctx: &'a Context, bindings: impl IntoIterator<Item = (ExprId, Expr)>) -> Self {
        Self {
            ctx,
            bindings: bindings.into_iter().collect(),
            memo: FxHashMap::default(),
        }
    }

    pub fn apply(&mut self, expr: &Expr) -> Expr {
        if let Some(done) = self.memo.get(&expr.id()) {
            return done.clone();
        }
        let result = expr.accept(self, ());
        self.memo.insert(expr.id(), result.clone());
        result
    }

    fn leaf(&self, expr: &Expr) -> Expr {
        self.bindings.get(&expr.id()).cloned().unwrap_or_else(|| expr.clone())
    }
}

impl Context {
    /// Replaces every occurrence of each `(variable, value)` pair's variable.
    ///
    /// Variables are matched by identity and may be symbolic variables,
    /// parameters or placeholders.
    ///
    /// # Panics
    ///
    /// Panics if a value does not have the type of its variable.
    pub fn substitute(&self, expr: &Expr, bindings: &[(&Expr, &Expr)]) -> Expr {
        for (var, value) in bindings {
            contract(value.ty().expect("substitute", var.ty()));
        }
        debug!("substitute({:?}, {} bindings)", expr, bindings.len());
        let mut substituter = Substituter::new(self, bindings.iter().map(|(var, value)| (var.id(), (*value).clone())));
        substituter.apply(expr)
    }
}

impl ExprVisitor<()> for Substituter<'_> {
    type Output = Expr;

    fn visit_constant(&mut self, expr: &Expr, _value: &Value, _: ()) -> Expr {
        expr.clone()
    }

    fn visit_arbitrary(&mut self, expr: &Expr, _name: &str, _: ()) -> Expr {
        self.leaf(expr)
    }

    fn visit_parameter(&mut self, expr: &Expr, _name: &str, _: ()) -> Expr {
        self.leaf(expr)
    }

    fn visit_argument(&mut self, expr: &Expr, _index: u64, _: ()) -> Expr {
        self.leaf(expr)
    }

    fn visit_not(&mut self, _expr: &Expr, inner: &Expr, _: ()) -> Expr {
        let inner = self.apply(inner);
        self.ctx.not(&inner)
    }

    fn visit_logical(&mut self, _expr: &Expr, op: LogicalOp, lhs: &Expr, rhs: &Expr, _: ()) -> Expr {
        let (lhs, rhs) = (self.apply(lhs), self.apply(rhs));
        self.ctx.logical(op, &lhs, &rhs)
    }

    fn visit_if(&mut self, _expr: &Expr, guard: &Expr, then: &Expr, otherwise: &Expr, _: ()) -> Expr {
        let guard = self.apply(guard);
        let then = self.apply(then);
        let otherwise = self.apply(otherwise);
        self.ctx.ite(&guard, &then, &otherwise)
    }

    fn visit_arith(&mut self, _expr: &Expr, op: ArithOp, lhs: &Expr, rhs: &Expr, _: ()) -> Expr {
        let (lhs, rhs) = (self.apply(lhs), self.apply(rhs));
        self.ctx.arith(op, &lhs, &rhs)
    }

    fn visit_bit_not(&mut self, _expr: &Expr, inner: &Expr, _: ()) -> Expr {
        let inner = self.apply(inner);
        self.ctx.bit_not(&inner)
    }

    fn visit_bitwise(&mut self, _expr: &Expr, op: BitwiseOp, lhs: &Expr, rhs: &Expr, _: ()) -> Expr {
        let (lhs, rhs) = (self.apply(lhs), self.apply(rhs));
        self.ctx.bitwise(op, &lhs, &rhs)
    }

    fn visit_equals(&mut self, _expr: &Expr, lhs: &Expr, rhs: &Expr, _: ()) -> Expr {
        let (lhs, rhs) = (self.apply(lhs), self.apply(rhs));
        self.ctx.eq(&lhs, &rhs)
    }

    fn visit_compare(&mut self, _expr: &Expr, op: CompareOp, lhs: &Expr, rhs: &Expr, _: ()) -> Expr {
        let (lhs, rhs) = (self.apply(lhs), self.apply(rhs));
        self.ctx.compare(op, &lhs, &rhs)
    }

    fn visit_cast(&mut self, expr: &Expr, inner: &Expr, _: ()) -> Expr {
        let inner = self.apply(inner);
        self.ctx.cast(&inner, expr.ty())
    }

    fn visit_create_object(&mut self, _expr: &Expr, schema: &Arc<ObjectType>, fields: &[Expr], _: ()) -> Expr {
        let fields = fields.iter().map(|f| self.apply(f)).collect();
        self.ctx.create_object_sorted(schema, fields)
    }

    fn visit_get_field(&mut self, _expr: &Expr, object: &Expr, field: &Name, _: ()) -> Expr {
        let object = self.apply(object);
        self.ctx.get_field(&object, field)
    }

    fn visit_with_field(&mut self, _expr: &Expr, object: &Expr, field: &Name, value: &Expr, _: ()) -> Expr {
        let (object, value) = (self.apply(object), self.apply(value));
        self.ctx.with_field(&object, field, &value)
    }

    fn visit_list_empty(&mut self, expr: &Expr, _: ()) -> Expr {
        expr.clone()
    }

    fn visit_list_add_front(&mut self, _expr: &Expr, head: &Expr, tail: &Expr, _: ()) -> Expr {
        let (head, tail) = (self.apply(head), self.apply(tail));
        self.ctx.list_add_front(&head, &tail)
    }

    fn visit_list_case(&mut self, _expr: &Expr, list: &Expr, empty: &Expr, cons: &ConsCase, _: ()) -> Expr {
        let (list, empty) = (self.apply(list), self.apply(empty));
        let cons = ConsCase {
            head: cons.head.clone(),
            tail: cons.tail.clone(),
            body: self.apply(&cons.body),
        };
        self.ctx.list_case_with(&list, &empty, cons)
    }

    fn visit_seq_empty(&mut self, expr: &Expr, _: ()) -> Expr {
        expr.clone()
    }

    fn visit_seq_unit(&mut self, _expr: &Expr, elem: &Expr, _: ()) -> Expr {
        let elem = self.apply(elem);
        self.ctx.seq_unit(&elem)
    }

    fn visit_seq_concat(&mut self, _expr: &Expr, lhs: &Expr, rhs: &Expr, _: ()) -> Expr {
        let (lhs, rhs) = (self.apply(lhs), self.apply(rhs));
        self.ctx.seq_concat(&lhs, &rhs)
    }

    fn visit_seq_length(&mut self, _expr: &Expr, seq: &Expr, _: ()) -> Expr {
        let seq = self.apply(seq);
        self.ctx.seq_length(&seq)
    }

    fn visit_seq_at(&mut self, _expr: &Expr, seq: &Expr, index: &Expr, _: ()) -> Expr {
        let (seq, index) = (self.apply(seq), self.apply(index));
        self.ctx.seq_at(&seq, &index)
    }

    fn visit_seq_contains(&mut self, _expr: &Expr, seq: &Expr, sub: &Expr, _: ()) -> Expr {
        let (seq, sub) = (self.apply(seq), self.apply(sub));
        self.ctx.seq_contains(&seq, &sub)
    }

    fn visit_seq_index_of(&mut self, _expr: &Expr, seq: &Expr, sub: &Expr, offset: &Expr, _: ()) -> Expr {
        let seq = self.apply(seq);
        let sub = self.apply(sub);
        let offset = self.apply(offset);
        self.ctx.seq_index_of(&seq, &sub, &offset)
    }

    fn visit_seq_slice(&mut self, _expr: &Expr, seq: &Expr, offset: &Expr, length: &Expr, _: ()) -> Expr {
        let seq = self.apply(seq);
        let offset = self.apply(offset);
        let length = self.apply(length);
        self.ctx.seq_slice(&seq, &offset, &length)
    }

    fn visit_seq_replace_first(
        &mut self,
        _expr: &Expr,
        seq: &Expr,
        pattern: &Expr,
        replacement: &Expr,
        _: (),
    ) -> Expr {
        let seq = self.apply(seq);
        let pattern = self.apply(pattern);
        let replacement = self.apply(replacement);
        self.ctx.seq_replace_first(&seq, &pattern, &replacement)
    }

    fn visit_map_empty(&mut self, expr: &Expr, _: ()) -> Expr {
        expr.clone()
    }

    fn visit_map_set(&mut self, _expr: &Expr, map: &Expr, key: &Expr, value: &Expr, _: ()) -> Expr {
        let map = self.apply(map);
        let key = self.apply(key);
        let value = self.apply(value);
        self.ctx.map_set(&map, &key, &value)
    }

    fn visit_map_get(&mut self, _expr: &Expr, map: &Expr, key: &Expr, _: ()) -> Expr {
        let (map, key) = (self.apply(map), self.apply(key));
        self.ctx.map_get(&map, &key)
    }

    fn visit_map_delete(&mut self, _expr: &Expr, map: &Expr, key: &Expr, _: ()) -> Expr {
        let (map, key) = (self.apply(map), self.apply(key));
        self.ctx.map_delete(&map, &key)
    }

    fn visit_map_combine(&mut self, _expr: &Expr, op: CombineOp, lhs: &Expr, rhs: &Expr, _: ()) -> Expr {
        let (lhs, rhs) = (self.apply(lhs), self.apply(rhs));
        self.ctx.map_combine(op, &lhs, &rhs)
    }

    fn visit_lambda(&mut self, _expr: &Expr, lambda: &Lambda, _: ()) -> Expr {
        let body = self.apply(&lambda.body);
        self.ctx.lambda_with(Lambda {
            argument: lambda.argument.clone(),
            body,
        })
    }

    fn visit_apply(&mut self, _expr: &Expr, lambda: &Expr, arg: &Expr, _: ()) -> Expr {
        let (lambda, arg) = (self.apply(lambda), self.apply(arg));
        self.ctx.apply(&lambda, &arg)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::types::Type;

    #[test]
    fn test_substitute_folds() {
        let ctx = Context::default();
        let x = ctx.symbolic("x", Type::BigInt);
        let y = ctx.symbolic("y", Type::BigInt);
        let e = ctx.lt(&ctx.add(&x, &ctx.bigint(1)), &y);
        let r = ctx.substitute(&e, &[(&x, &ctx.bigint(2)), (&y, &ctx.bigint(10))]);
        assert!(r.is_true());
    }

    #[test]
    fn test_untouched_subterms_are_shared() {
        let ctx = Context::default();
        let x = ctx.symbolic("x", Type::Bool);
        let y = ctx.symbolic("y", Type::Bool);
        let z = ctx.symbolic("z", Type::Bool);
        let left = ctx.and(&x, &y);
        let e = ctx.or(&left, &z);
        assert!(ctx.substitute(&e, &[]).ptr_eq(&e));
        let r = ctx.substitute(&e, &[(&z, &x)]);
        assert!(r.ptr_eq(&ctx.or(&left, &x)));
    }

    #[test]
    fn test_substitute_inside_lambda() {
        let ctx = Context::default();
        let n = ctx.symbolic("n", Type::BigInt);
        let f = ctx.lambda(&Type::BigInt, |ctx, x| ctx.add(x, &n));
        let g = ctx.substitute(&f, &[(&n, &ctx.bigint(0))]);
        assert!(ctx.beta_reduce(&g, &ctx.bigint(5)).ptr_eq(&ctx.bigint(5)));
    }

    #[test]
    #[should_panic(expected = "substitute: expected bool, found char")]
    fn test_substitute_type_mismatch() {
        let ctx = Context::default();
        let x = ctx.symbolic("x", Type::Bool);
        ctx.substitute(&x, &[(&x, &ctx.char('c'))]);
    }
}
