//! Concrete interpretation of expressions.
//!
//! The [`Interpreter`] computes the value of an expression under an
//! [`Assignment`] of symbolic variables and parameters. Unassigned symbolic
//! variables take the default value of their type, so any model returned by
//! a solver can be completed and checked. Unassigned parameters are an error.
//!
//! Results are memoized per node, so shared subterms are evaluated once.
//! Inside a function body or a list case the value of a node depends on the
//! bound placeholders, and memoization is suspended.
//!
//! ```
//! use zen_rs::context::Context;
//! use zen_rs::eval::{evaluate, Assignment, Val};
//! use zen_rs::types::Type;
//!
//! let ctx = Context::default();
//! let x = ctx.symbolic("x", Type::int32());
//! let e = ctx.lt(&x, &ctx.int32(10));
//!
//! let mut assignment = Assignment::new();
//! assignment.set(&x, 3i32);
//! assert_eq!(evaluate(&e, &assignment), Ok(Val::from(true)));
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;
use num_bigint::BigInt;
use num_rational::BigRational;
use rustc_hash::FxHashMap;

use crate::error::EvalError;
use crate::node::{ArithOp, BitwiseOp, CombineOp, CompareOp, ConsCase, Expr, ExprId, ExprKind, Lambda, LogicalOp};
use crate::types::{Name, ObjectType, Type};
use crate::value::{self, fold_arith, fold_bit_not, fold_bitwise, fold_cast, fold_compare, Value};
use crate::visitor::ExprVisitor;

/// A runtime value.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub enum Val {
    Prim(Value),
    Seq(Vec<Val>),
    List(Vec<Val>),
    Map(BTreeMap<Val, Val>),
    Object { name: String, fields: Vec<(Name, Val)> },
    Fun(Closure),
}

/// A function value: the lambda and the placeholder bindings it captured.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub struct Closure {
    lambda: Expr,
    env: Vec<(ExprId, Val)>,
}

impl Val {
    /// The default value of a type, or `None` for function types.
    pub fn default_for(ty: &Type) -> Option<Val> {
        if let Some(v) = Value::default_for(ty) {
            return Some(Val::Prim(v));
        }
        match ty {
            Type::Seq(_) => Some(Val::Seq(vec![])),
            Type::List(_) => Some(Val::List(vec![])),
            Type::Map(..) => Some(Val::Map(BTreeMap::new())),
            Type::Object(schema) => {
                let fields = schema
                    .fields()
                    .iter()
                    .map(|(name, t)| Val::default_for(t).map(|v| (name.clone(), v)))
                    .collect::<Option<Vec<_>>>()?;
                Some(Val::Object {
                    name: schema.name().to_string(),
                    fields,
                })
            }
            _ => None,
        }
    }

    /// A string value.
    pub fn string(s: &str) -> Val {
        Val::Seq(s.chars().map(|c| Val::Prim(Value::Char(c))).collect())
    }

    pub fn as_prim(&self) -> Option<&Value> {
        match self {
            Val::Prim(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_prim().and_then(Value::as_bool)
    }

    /// Field of a record value.
    pub fn field(&self, name: &str) -> Option<&Val> {
        match self {
            Val::Object { fields, .. } => fields.iter().find(|(n, _)| &**n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Whether this value inhabits `ty`.
    pub fn has_type(&self, ty: &Type) -> bool {
        match (self, ty) {
            (Val::Prim(v), t) => &v.ty() == t,
            (Val::Seq(xs), Type::Seq(elem)) | (Val::List(xs), Type::List(elem)) => xs.iter().all(|x| x.has_type(elem)),
            (Val::Map(m), Type::Map(k, v)) => m.iter().all(|(key, val)| key.has_type(k) && val.has_type(v)),
            (Val::Object { name, fields }, Type::Object(schema)) => {
                name == schema.name()
                    && fields.len() == schema.fields().len()
                    && fields
                        .iter()
                        .zip(schema.fields())
                        .all(|((n, v), (m, t))| n == m && v.has_type(t))
            }
            (Val::Fun(closure), t) => closure.lambda.ty() == t,
            _ => false,
        }
    }
}

impl From<Value> for Val {
    fn from(v: Value) -> Self {
        Val::Prim(v)
    }
}

macro_rules! impl_from_prim {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for Val {
                fn from(v: $t) -> Self {
                    Val::Prim(Value::from(v))
                }
            }
        )*
    };
}

impl_from_prim!(bool, char, BigInt, BigRational, i8, i16, i32, i64, u8, u16, u32, u64);

/// Values for symbolic variables and parameters, by identity.
#[derive(Debug, Clone, Default)]
pub struct Assignment {
    values: FxHashMap<ExprId, Val>,
}

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, var: &Expr, value: impl Into<Val>) -> &mut Self {
        self.values.insert(var.id(), value.into());
        self
    }

    pub fn get(&self, var: &Expr) -> Option<&Val> {
        self.values.get(&var.id())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Evaluates `expr` under `assignment`.
pub fn evaluate(expr: &Expr, assignment: &Assignment) -> Result<Val, EvalError> {
    Interpreter::new(assignment).eval(expr)
}

/// The evaluating visitor.
pub struct Interpreter<'a> {
    assignment: &'a Assignment,
    /// Placeholder bindings of the enclosing lambdas and list cases, innermost last.
    scope: Vec<(ExprId, Val)>,
    memo: FxHashMap<ExprId, Val>,
}

type Eval = Result<Val, EvalError>;

impl<'a> Interpreter<'a> {
    pub fn new(assignment: &'a Assignment) -> Self {
        Self {
            assignment,
            scope: Vec::new(),
            memo: FxHashMap::default(),
        }
    }

    pub fn eval(&mut self, expr: &Expr) -> Eval {
        if !self.scope.is_empty() {
            return expr.accept(self, ());
        }
        if let Some(v) = self.memo.get(&expr.id()) {
            return Ok(v.clone());
        }
        let v = expr.accept(self, ())?;
        self.memo.insert(expr.id(), v.clone());
        Ok(v)
    }

    fn prim(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        match self.eval(expr)? {
            Val::Prim(v) => Ok(v),
            other => unreachable!("expected a literal for {:?}, got {:?}", expr, other),
        }
    }

    fn boolean(&mut self, expr: &Expr) -> Result<bool, EvalError> {
        match self.prim(expr)? {
            Value::Bool(b) => Ok(b),
            other => unreachable!("expected a boolean for {:?}, got {}", expr, other),
        }
    }

    fn index(&mut self, expr: &Expr) -> Result<BigInt, EvalError> {
        match self.prim(expr)? {
            Value::BigInt(i) => Ok(i),
            other => unreachable!("expected a bigint for {:?}, got {}", expr, other),
        }
    }

    fn elements(&mut self, expr: &Expr) -> Result<Vec<Val>, EvalError> {
        match self.eval(expr)? {
            Val::Seq(xs) | Val::List(xs) => Ok(xs),
            other => unreachable!("expected a sequence for {:?}, got {:?}", expr, other),
        }
    }

    fn entries(&mut self, expr: &Expr) -> Result<BTreeMap<Val, Val>, EvalError> {
        match self.eval(expr)? {
            Val::Map(m) => Ok(m),
            other => unreachable!("expected a map for {:?}, got {:?}", expr, other),
        }
    }

    fn record(&mut self, expr: &Expr) -> Result<(String, Vec<(Name, Val)>), EvalError> {
        match self.eval(expr)? {
            Val::Object { name, fields } => Ok((name, fields)),
            other => unreachable!("expected a record for {:?}, got {:?}", expr, other),
        }
    }

    fn default_for(ty: &Type) -> Eval {
        Val::default_for(ty).ok_or_else(|| EvalError::NoDefault(ty.clone()))
    }

    /// Evaluates `body` with extra placeholder bindings in scope.
    fn with_bindings(&mut self, bindings: Vec<(ExprId, Val)>, body: &Expr) -> Eval {
        let depth = self.scope.len();
        self.scope.extend(bindings);
        let result = self.eval(body);
        self.scope.truncate(depth);
        result
    }

    fn option(ty: &Type, value: Option<Val>) -> Eval {
        let (name, elem) = match ty.as_object() {
            Some(schema) => (schema.name().to_string(), schema.field_type("Value").ok()),
            None => unreachable!("lookup result of type {}", ty),
        };
        let elem = match elem {
            Some(elem) => elem,
            None => unreachable!("option type {} without a value field", ty),
        };
        let has_value = value.is_some();
        let value = match value {
            Some(v) => v,
            None => Self::default_for(elem)?,
        };
        Ok(Val::Object {
            name,
            fields: vec![
                (Name::from("HasValue"), Val::from(has_value)),
                (Name::from("Value"), value),
            ],
        })
    }
}

impl ExprVisitor<()> for Interpreter<'_> {
    type Output = Eval;

    fn visit_constant(&mut self, _expr: &Expr, value: &Value, _: ()) -> Eval {
        Ok(Val::Prim(value.clone()))
    }

    fn visit_arbitrary(&mut self, expr: &Expr, name: &str, _: ()) -> Eval {
        match self.assignment.get(expr) {
            Some(v) if v.has_type(expr.ty()) => Ok(v.clone()),
            Some(_) => Err(EvalError::AssignmentMismatch {
                name: name.to_string(),
                expected: expr.ty().clone(),
            }),
            None => {
                debug!("{} is unassigned, using the default value", name);
                Self::default_for(expr.ty())
            }
        }
    }

    fn visit_parameter(&mut self, expr: &Expr, name: &str, _: ()) -> Eval {
        match self.assignment.get(expr) {
            Some(v) if v.has_type(expr.ty()) => Ok(v.clone()),
            Some(_) => Err(EvalError::AssignmentMismatch {
                name: name.to_string(),
                expected: expr.ty().clone(),
            }),
            None => Err(EvalError::UnboundParameter(name.to_string())),
        }
    }

    fn visit_argument(&mut self, expr: &Expr, index: u64, _: ()) -> Eval {
        self.scope
            .iter()
            .rev()
            .find(|(id, _)| *id == expr.id())
            .map(|(_, v)| v.clone())
            .ok_or(EvalError::UnboundArgument(index))
    }

    fn visit_not(&mut self, _expr: &Expr, inner: &Expr, _: ()) -> Eval {
        Ok(Val::from(!self.boolean(inner)?))
    }

    fn visit_logical(&mut self, _expr: &Expr, op: LogicalOp, lhs: &Expr, rhs: &Expr, _: ()) -> Eval {
        let a = self.boolean(lhs)?;
        // Short-circuit on the absorbing literal.
        if a != op.identity() {
            return Ok(Val::from(a));
        }
        Ok(Val::from(self.boolean(rhs)?))
    }

    fn visit_if(&mut self, _expr: &Expr, guard: &Expr, then: &Expr, otherwise: &Expr, _: ()) -> Eval {
        if self.boolean(guard)? {
            self.eval(then)
        } else {
            self.eval(otherwise)
        }
    }

    fn visit_arith(&mut self, _expr: &Expr, op: ArithOp, lhs: &Expr, rhs: &Expr, _: ()) -> Eval {
        let (a, b) = (self.prim(lhs)?, self.prim(rhs)?);
        Ok(Val::Prim(fold_arith(op, &a, &b)))
    }

    fn visit_bit_not(&mut self, _expr: &Expr, inner: &Expr, _: ()) -> Eval {
        Ok(Val::Prim(fold_bit_not(&self.prim(inner)?)))
    }

    fn visit_bitwise(&mut self, _expr: &Expr, op: BitwiseOp, lhs: &Expr, rhs: &Expr, _: ()) -> Eval {
        let (a, b) = (self.prim(lhs)?, self.prim(rhs)?);
        Ok(Val::Prim(fold_bitwise(op, &a, &b)))
    }

    fn visit_equals(&mut self, _expr: &Expr, lhs: &Expr, rhs: &Expr, _: ()) -> Eval {
        let (a, b) = (self.eval(lhs)?, self.eval(rhs)?);
        Ok(Val::from(a == b))
    }

    fn visit_compare(&mut self, _expr: &Expr, op: CompareOp, lhs: &Expr, rhs: &Expr, _: ()) -> Eval {
        let (a, b) = (self.prim(lhs)?, self.prim(rhs)?);
        Ok(Val::Prim(fold_compare(op, &a, &b)))
    }

    fn visit_cast(&mut self, expr: &Expr, inner: &Expr, _: ()) -> Eval {
        Ok(Val::Prim(fold_cast(&self.prim(inner)?, expr.ty())))
    }

    fn visit_create_object(&mut self, _expr: &Expr, schema: &Arc<ObjectType>, fields: &[Expr], _: ()) -> Eval {
        let mut values = Vec::with_capacity(fields.len());
        for (value, (name, _)) in fields.iter().zip(schema.fields()) {
            values.push((name.clone(), self.eval(value)?));
        }
        Ok(Val::Object {
            name: schema.name().to_string(),
            fields: values,
        })
    }

    fn visit_get_field(&mut self, _expr: &Expr, object: &Expr, field: &Name, _: ()) -> Eval {
        let (_, fields) = self.record(object)?;
        match fields.into_iter().find(|(n, _)| n == field) {
            Some((_, v)) => Ok(v),
            None => unreachable!("record {:?} has no field {}", object, field),
        }
    }

    fn visit_with_field(&mut self, _expr: &Expr, object: &Expr, field: &Name, value: &Expr, _: ()) -> Eval {
        let (name, mut fields) = self.record(object)?;
        let value = self.eval(value)?;
        for (n, v) in fields.iter_mut() {
            if n == field {
                *v = value;
                break;
            }
        }
        Ok(Val::Object { name, fields })
    }

    fn visit_list_empty(&mut self, _expr: &Expr, _: ()) -> Eval {
        Ok(Val::List(vec![]))
    }

    fn visit_list_add_front(&mut self, _expr: &Expr, head: &Expr, tail: &Expr, _: ()) -> Eval {
        let head = self.eval(head)?;
        let mut items = self.elements(tail)?;
        items.insert(0, head);
        Ok(Val::List(items))
    }

    fn visit_list_case(&mut self, _expr: &Expr, list: &Expr, empty: &Expr, cons: &ConsCase, _: ()) -> Eval {
        let mut items = self.elements(list)?;
        if items.is_empty() {
            return self.eval(empty);
        }
        let head = items.remove(0);
        let bindings = vec![(cons.head.id(), head), (cons.tail.id(), Val::List(items))];
        self.with_bindings(bindings, &cons.body)
    }

    fn visit_seq_empty(&mut self, _expr: &Expr, _: ()) -> Eval {
        Ok(Val::Seq(vec![]))
    }

    fn visit_seq_unit(&mut self, _expr: &Expr, elem: &Expr, _: ()) -> Eval {
        Ok(Val::Seq(vec![self.eval(elem)?]))
    }

    fn visit_seq_concat(&mut self, _expr: &Expr, lhs: &Expr, rhs: &Expr, _: ()) -> Eval {
        let mut items = self.elements(lhs)?;
        items.extend(self.elements(rhs)?);
        Ok(Val::Seq(items))
    }

    fn visit_seq_length(&mut self, _expr: &Expr, seq: &Expr, _: ()) -> Eval {
        Ok(Val::from(BigInt::from(self.elements(seq)?.len())))
    }

    fn visit_seq_at(&mut self, _expr: &Expr, seq: &Expr, index: &Expr, _: ()) -> Eval {
        let items = self.elements(seq)?;
        let index = self.index(index)?;
        Ok(Val::Seq(value::seq_at(&items, &index)))
    }

    fn visit_seq_contains(&mut self, _expr: &Expr, seq: &Expr, sub: &Expr, _: ()) -> Eval {
        let (items, sub) = (self.elements(seq)?, self.elements(sub)?);
        Ok(Val::from(value::seq_contains(&items, &sub)))
    }

    fn visit_seq_index_of(&mut self, _expr: &Expr, seq: &Expr, sub: &Expr, offset: &Expr, _: ()) -> Eval {
        let (items, sub) = (self.elements(seq)?, self.elements(sub)?);
        let offset = self.index(offset)?;
        Ok(Val::from(value::seq_index_of(&items, &sub, &offset)))
    }

    fn visit_seq_slice(&mut self, _expr: &Expr, seq: &Expr, offset: &Expr, length: &Expr, _: ()) -> Eval {
        let items = self.elements(seq)?;
        let (offset, length) = (self.index(offset)?, self.index(length)?);
        Ok(Val::Seq(value::seq_slice(&items, &offset, &length)))
    }

    fn visit_seq_replace_first(
        &mut self,
        _expr: &Expr,
        seq: &Expr,
        pattern: &Expr,
        replacement: &Expr,
        _: (),
    ) -> Eval {
        let items = self.elements(seq)?;
        let pattern = self.elements(pattern)?;
        let replacement = self.elements(replacement)?;
        Ok(Val::Seq(value::seq_replace_first(&items, &pattern, &replacement)))
    }

    fn visit_map_empty(&mut self, _expr: &Expr, _: ()) -> Eval {
        Ok(Val::Map(BTreeMap::new()))
    }

    fn visit_map_set(&mut self, _expr: &Expr, map: &Expr, key: &Expr, value: &Expr, _: ()) -> Eval {
        let mut entries = self.entries(map)?;
        entries.insert(self.eval(key)?, self.eval(value)?);
        Ok(Val::Map(entries))
    }

    fn visit_map_get(&mut self, expr: &Expr, map: &Expr, key: &Expr, _: ()) -> Eval {
        let mut entries = self.entries(map)?;
        let key = self.eval(key)?;
        Self::option(expr.ty(), entries.remove(&key))
    }

    fn visit_map_delete(&mut self, _expr: &Expr, map: &Expr, key: &Expr, _: ()) -> Eval {
        let mut entries = self.entries(map)?;
        entries.remove(&self.eval(key)?);
        Ok(Val::Map(entries))
    }

    fn visit_map_combine(&mut self, _expr: &Expr, op: CombineOp, lhs: &Expr, rhs: &Expr, _: ()) -> Eval {
        let (a, b) = (self.entries(lhs)?, self.entries(rhs)?);
        let member = |m: &BTreeMap<Val, Val>, k: &Val| m.get(k).and_then(Val::as_bool).unwrap_or(false);
        let combined = a
            .keys()
            .chain(b.keys())
            .filter(|&k| op.apply(member(&a, k), member(&b, k)))
            .map(|k| (k.clone(), Val::from(true)))
            .collect();
        Ok(Val::Map(combined))
    }

    fn visit_lambda(&mut self, expr: &Expr, _lambda: &Lambda, _: ()) -> Eval {
        Ok(Val::Fun(Closure {
            lambda: expr.clone(),
            env: self.scope.clone(),
        }))
    }

    fn visit_apply(&mut self, _expr: &Expr, lambda: &Expr, arg: &Expr, _: ()) -> Eval {
        let closure = match self.eval(lambda)? {
            Val::Fun(closure) => closure,
            other => unreachable!("expected a function for {:?}, got {:?}", lambda, other),
        };
        let arg = self.eval(arg)?;
        let Lambda { argument, body } = match closure.lambda.kind() {
            ExprKind::Lambda(l) => l.clone(),
            _ => unreachable!("closure over a non-lambda"),
        };
        let mut bindings = closure.env;
        bindings.push((argument.id(), arg));

        // The closure's environment replaces the caller's scope.
        let saved = std::mem::take(&mut self.scope);
        let result = self.with_bindings(bindings, &body);
        self.scope = saved;
        result
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::context::Context;

    #[test]
    fn test_arithmetic_and_logic() {
        let ctx = Context::default();
        let x = ctx.symbolic("x", Type::int32());
        let y = ctx.symbolic("y", Type::int32());
        let e = ctx.and(&ctx.lt(&x, &y), &ctx.eq(&ctx.add(&x, &ctx.int32(1)), &y));

        let mut a = Assignment::new();
        a.set(&x, 4i32).set(&y, 5i32);
        assert_eq!(evaluate(&e, &a), Ok(Val::from(true)));
        a.set(&y, 6i32);
        assert_eq!(evaluate(&e, &a), Ok(Val::from(false)));
    }

    #[test]
    fn test_unassigned_arbitrary_defaults() {
        let ctx = Context::default();
        let x = ctx.symbolic("x", Type::BigInt);
        let e = ctx.add(&x, &ctx.bigint(3));
        assert_eq!(evaluate(&e, &Assignment::new()), Ok(Val::from(BigInt::from(3))));
    }

    #[test]
    fn test_parameter_errors() {
        let ctx = Context::default();
        let p = ctx.parameter("p", Type::Bool);
        let e = ctx.not(&p);
        assert_eq!(
            evaluate(&e, &Assignment::new()),
            Err(EvalError::UnboundParameter("p".to_string()))
        );
        let mut a = Assignment::new();
        a.set(&p, 'c');
        assert!(matches!(evaluate(&e, &a), Err(EvalError::AssignmentMismatch { .. })));
    }

    #[test]
    fn test_records_and_options() {
        let ctx = Context::default();
        let point = Type::object(ObjectType::new("Point", [("X", Type::int32()), ("Y", Type::int32())]));
        let p = ctx.symbolic("p", point);
        let moved = ctx.with_field(&p, "X", &ctx.int32(7));

        let v = evaluate(&moved, &Assignment::new()).unwrap();
        assert_eq!(v.field("X"), Some(&Val::from(7i32)));
        assert_eq!(v.field("Y"), Some(&Val::from(0i32)));
    }

    #[test]
    fn test_strings() {
        let ctx = Context::default();
        let s = ctx.symbolic("s", Type::string());
        let e = ctx.seq_index_of(&ctx.seq_concat(&s, &ctx.string("!")), &ctx.string("!"), &ctx.bigint(0));
        let mut a = Assignment::new();
        a.set(&s, Val::string("hey"));
        assert_eq!(evaluate(&e, &a), Ok(Val::from(BigInt::from(3))));

        let r = ctx.seq_replace_first(&s, &ctx.string("e"), &ctx.string("a"));
        assert_eq!(evaluate(&r, &a), Ok(Val::string("hay")));
        let sl = ctx.seq_slice(&s, &ctx.bigint(1), &ctx.bigint(5));
        assert_eq!(evaluate(&sl, &a), Ok(Val::string("ey")));
    }

    #[test]
    fn test_maps_and_sets() {
        let ctx = Context::default();
        let m = ctx.symbolic("m", Type::map(Type::Char, Type::BigInt));
        let k = ctx.symbolic("k", Type::Char);
        let e = ctx.option_value_or(&ctx.map_get(&ctx.map_set(&m, &ctx.char('a'), &ctx.bigint(1)), &k), &ctx.bigint(-1));

        let mut a = Assignment::new();
        a.set(&k, 'a');
        assert_eq!(evaluate(&e, &a), Ok(Val::from(BigInt::from(1))));
        a.set(&k, 'b');
        assert_eq!(evaluate(&e, &a), Ok(Val::from(BigInt::from(-1))));

        let s1 = ctx.symbolic("s1", Type::set(Type::int32()));
        let s2 = ctx.set_add(&ctx.set_empty(&Type::int32()), &ctx.int32(2));
        let both = ctx.set_contains(&ctx.set_intersect(&s1, &s2), &ctx.int32(2));
        let mut a = Assignment::new();
        let mut members = BTreeMap::new();
        members.insert(Val::from(2i32), Val::from(true));
        members.insert(Val::from(3i32), Val::from(false));
        a.set(&s1, Val::Map(members));
        assert_eq!(evaluate(&both, &a), Ok(Val::from(true)));
    }

    #[test]
    fn test_lists() {
        let ctx = Context::default();
        let l = ctx.symbolic("l", Type::list(Type::BigInt));
        let second = ctx.list_case(&l, &ctx.bigint(0), |ctx, _, tail| {
            ctx.list_case(tail, &ctx.bigint(0), |_, head, _| head.clone())
        });
        let mut a = Assignment::new();
        a.set(&l, Val::List(vec![Val::from(BigInt::from(10)), Val::from(BigInt::from(20))]));
        assert_eq!(evaluate(&second, &a), Ok(Val::from(BigInt::from(20))));
        a.set(&l, Val::List(vec![]));
        assert_eq!(evaluate(&second, &a), Ok(Val::from(BigInt::from(0))));
    }

    #[test]
    fn test_closures() {
        let ctx = Context::default();
        let n = ctx.symbolic("n", Type::BigInt);
        // adder = y -> (z -> y + z)
        let adder = ctx.lambda(&Type::BigInt, |ctx, y| {
            ctx.lambda(&Type::BigInt, |ctx, z| ctx.add(y, z))
        });
        let e = ctx.apply(&ctx.apply(&adder, &n), &ctx.bigint(2));
        let mut a = Assignment::new();
        a.set(&n, BigInt::from(40));
        assert_eq!(evaluate(&e, &a), Ok(Val::from(BigInt::from(42))));
    }

    #[test]
    fn test_folding_agrees_with_evaluation() {
        let ctx = Context::default();
        let x = ctx.symbolic("x", Type::uint8());
        let e = ctx.bit_xor(&ctx.add(&x, &ctx.uint8(200)), &ctx.uint8(0x0F));
        let folded = ctx.substitute(&e, &[(&x, &ctx.uint8(100))]);
        let mut a = Assignment::new();
        a.set(&x, 100u8);
        let v = evaluate(&e, &a).unwrap();
        assert_eq!(folded.as_constant().cloned().map(Val::Prim), Some(v));
    }
}
