//! Double dispatch over the closed set of node kinds.
//!
//! An [`ExprVisitor`] has one method per kind, receiving the node itself and
//! its destructured payload, plus a caller-defined parameter threaded
//! through the traversal (an indentation level, an environment, ...).
//! [`Expr::accept`] selects the method by an exhaustive `match`, so adding a
//! node kind is a compile error in every visitor until it is handled.
//!
//! Visitors decide themselves whether and in which order to recurse into
//! children.

use std::sync::Arc;

use crate::node::{ArithOp, BitwiseOp, CombineOp, CompareOp, ConsCase, Expr, ExprKind, Lambda, LogicalOp};
use crate::types::{Name, ObjectType};
use crate::value::Value;

pub trait ExprVisitor<P> {
    type Output;

    fn visit_constant(&mut self, expr: &Expr, value: &Value, param: P) -> Self::Output;
    fn visit_arbitrary(&mut self, expr: &Expr, name: &str, param: P) -> Self::Output;
    fn visit_parameter(&mut self, expr: &Expr, name: &str, param: P) -> Self::Output;
    fn visit_argument(&mut self, expr: &Expr, index: u64, param: P) -> Self::Output;

    fn visit_not(&mut self, expr: &Expr, inner: &Expr, param: P) -> Self::Output;
    fn visit_logical(&mut self, expr: &Expr, op: LogicalOp, lhs: &Expr, rhs: &Expr, param: P) -> Self::Output;
    fn visit_if(&mut self, expr: &Expr, guard: &Expr, then: &Expr, otherwise: &Expr, param: P) -> Self::Output;

    fn visit_arith(&mut self, expr: &Expr, op: ArithOp, lhs: &Expr, rhs: &Expr, param: P) -> Self::Output;
    fn visit_bit_not(&mut self, expr: &Expr, inner: &Expr, param: P) -> Self::Output;
    fn visit_bitwise(&mut self, expr: &Expr, op: BitwiseOp, lhs: &Expr, rhs: &Expr, param: P) -> Self::Output;
    fn visit_equals(&mut self, expr: &Expr, lhs: &Expr, rhs: &Expr, param: P) -> Self::Output;
    fn visit_compare(&mut self, expr: &Expr, op: CompareOp, lhs: &Expr, rhs: &Expr, param: P) -> Self::Output;
    /// The target type is the type of `expr`.
    fn visit_cast(&mut self, expr: &Expr, inner: &Expr, param: P) -> Self::Output;

    /// `fields` are in the schema's name order.
    fn visit_create_object(&mut self, expr: &Expr, schema: &Arc<ObjectType>, fields: &[Expr], param: P)
        -> Self::Output;
    fn visit_get_field(&mut self, expr: &Expr, object: &Expr, field: &Name, param: P) -> Self::Output;
    fn visit_with_field(&mut self, expr: &Expr, object: &Expr, field: &Name, value: &Expr, param: P)
        -> Self::Output;

    fn visit_list_empty(&mut self, expr: &Expr, param: P) -> Self::Output;
    fn visit_list_add_front(&mut self, expr: &Expr, head: &Expr, tail: &Expr, param: P) -> Self::Output;
    fn visit_list_case(&mut self, expr: &Expr, list: &Expr, empty: &Expr, cons: &ConsCase, param: P)
        -> Self::Output;

    fn visit_seq_empty(&mut self, expr: &Expr, param: P) -> Self::Output;
    fn visit_seq_unit(&mut self, expr: &Expr, elem: &Expr, param: P) -> Self::Output;
    fn visit_seq_concat(&mut self, expr: &Expr, lhs: &Expr, rhs: &Expr, param: P) -> Self::Output;
    fn visit_seq_length(&mut self, expr: &Expr, seq: &Expr, param: P) -> Self::Output;
    fn visit_seq_at(&mut self, expr: &Expr, seq: &Expr, index: &Expr, param: P) -> Self::Output;
    fn visit_seq_contains(&mut self, expr: &Expr, seq: &Expr, sub: &Expr, param: P) -> Self::Output;
    fn visit_seq_index_of(&mut self, expr: &Expr, seq: &Expr, sub: &Expr, offset: &Expr, param: P)
        -> Self::Output;
    fn visit_seq_slice(&mut self, expr: &Expr, seq: &Expr, offset: &Expr, length: &Expr, param: P)
        -> Self::Output;
    fn visit_seq_replace_first(
        &mut self,
        expr: &Expr,
        seq: &Expr,
        pattern: &Expr,
        replacement: &Expr,
        param: P,
    ) -> Self::Output;

    fn visit_map_empty(&mut self, expr: &Expr, param: P) -> Self::Output;
    fn visit_map_set(&mut self, expr: &Expr, map: &Expr, key: &Expr, value: &Expr, param: P) -> Self::Output;
    fn visit_map_get(&mut self, expr: &Expr, map: &Expr, key: &Expr, param: P) -> Self::Output;
    fn visit_map_delete(&mut self, expr: &Expr, map: &Expr, key: &Expr, param: P) -> Self::Output;
    fn visit_map_combine(&mut self, expr: &Expr, op: CombineOp, lhs: &Expr, rhs: &Expr, param: P)
        -> Self::Output;

    fn visit_lambda(&mut self, expr: &Expr, lambda: &Lambda, param: P) -> Self::Output;
    fn visit_apply(&mut self, expr: &Expr, lambda: &Expr, arg: &Expr, param: P) -> Self::Output;
}

impl Expr {
    /// Dispatches to the visitor method for the kind of this node.
    pub fn accept<P, V>(&self, visitor: &mut V, param: P) -> V::Output
    where
        V: ExprVisitor<P> + ?Sized,
    {
        let e = self;
        match self.kind() {
            ExprKind::Constant(value) => visitor.visit_constant(e, value, param),
            ExprKind::Arbitrary { name } => visitor.visit_arbitrary(e, name, param),
            ExprKind::Parameter { name } => visitor.visit_parameter(e, name, param),
            ExprKind::Argument { index } => visitor.visit_argument(e, *index, param),
            ExprKind::Not(inner) => visitor.visit_not(e, inner, param),
            ExprKind::Logical { op, lhs, rhs } => visitor.visit_logical(e, *op, lhs, rhs, param),
            ExprKind::If { guard, then, otherwise } => visitor.visit_if(e, guard, then, otherwise, param),
            ExprKind::Arith { op, lhs, rhs } => visitor.visit_arith(e, *op, lhs, rhs, param),
            ExprKind::BitNot(inner) => visitor.visit_bit_not(e, inner, param),
            ExprKind::Bitwise { op, lhs, rhs } => visitor.visit_bitwise(e, *op, lhs, rhs, param),
            ExprKind::Equals { lhs, rhs } => visitor.visit_equals(e, lhs, rhs, param),
            ExprKind::Compare { op, lhs, rhs } => visitor.visit_compare(e, *op, lhs, rhs, param),
            ExprKind::Cast { expr } => visitor.visit_cast(e, expr, param),
            ExprKind::CreateObject { schema, fields } => visitor.visit_create_object(e, schema, fields, param),
            ExprKind::GetField { object, field } => visitor.visit_get_field(e, object, field, param),
            ExprKind::WithField { object, field, value } => visitor.visit_with_field(e, object, field, value, param),
            ExprKind::ListEmpty => visitor.visit_list_empty(e, param),
            ExprKind::ListAddFront { head, tail } => visitor.visit_list_add_front(e, head, tail, param),
            ExprKind::ListCase { list, empty, cons } => visitor.visit_list_case(e, list, empty, cons, param),
            ExprKind::SeqEmpty => visitor.visit_seq_empty(e, param),
            ExprKind::SeqUnit(elem) => visitor.visit_seq_unit(e, elem, param),
            ExprKind::SeqConcat { lhs, rhs } => visitor.visit_seq_concat(e, lhs, rhs, param),
            ExprKind::SeqLength(seq) => visitor.visit_seq_length(e, seq, param),
            ExprKind::SeqAt { seq, index } => visitor.visit_seq_at(e, seq, index, param),
            ExprKind::SeqContains { seq, sub } => visitor.visit_seq_contains(e, seq, sub, param),
            ExprKind::SeqIndexOf { seq, sub, offset } => visitor.visit_seq_index_of(e, seq, sub, offset, param),
            ExprKind::SeqSlice { seq, offset, length } => visitor.visit_seq_slice(e, seq, offset, length, param),
            ExprKind::SeqReplaceFirst {
                seq,
                pattern,
                replacement,
            } => visitor.visit_seq_replace_first(e, seq, pattern, replacement, param),
            ExprKind::MapEmpty => visitor.visit_map_empty(e, param),
            ExprKind::MapSet { map, key, value } => visitor.visit_map_set(e, map, key, value, param),
            ExprKind::MapGet { map, key } => visitor.visit_map_get(e, map, key, param),
            ExprKind::MapDelete { map, key } => visitor.visit_map_delete(e, map, key, param),
            ExprKind::MapCombine { op, lhs, rhs } => visitor.visit_map_combine(e, *op, lhs, rhs, param),
            ExprKind::Lambda(lambda) => visitor.visit_lambda(e, lambda, param),
            ExprKind::Apply { lambda, arg } => visitor.visit_apply(e, lambda, arg, param),
        }
    }
}
