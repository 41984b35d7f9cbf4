//! Maps and sets.
//!
//! A lookup yields an `Option<V>`. A set of `T` is a `Map<T, bool>`, where
//! an element is a member when it maps to `true`.

use log::debug;

use crate::build::seq::seq_values;
use crate::context::Context;
use crate::error::{contract, TypeError};
use crate::node::{CombineOp, Expr, ExprKind};
use crate::types::Type;

fn types_of<'a>(op: &'static str, ty: &'a Type) -> (&'a Type, &'a Type) {
    match ty.map_types() {
        Some(kv) => kv,
        None => contract(Err(TypeError::Unsupported { op, ty: ty.clone() })),
    }
}

/// Constants and sequence literals have a unique canonical node.
fn is_literal(e: &Expr) -> bool {
    e.as_constant().is_some() || seq_values(e).is_some()
}

/// Two keys that are known to differ: distinct literals.
fn distinct_keys(a: &Expr, b: &Expr) -> bool {
    a != b && is_literal(a) && is_literal(b)
}

fn is_empty(e: &Expr) -> bool {
    matches!(e.kind(), ExprKind::MapEmpty)
}

impl Context {
    /// The empty map from `key` to `value`.
    pub fn map_empty(&self, key: &Type, value: &Type) -> Expr {
        contract(key.check_key());
        let ty = Type::map(key.clone(), value.clone());
        self.tables.map_empty.get_or_add(ty.clone(), ty, |ty| {
            debug!("MapEmpty<{}>", ty);
            self.mk(ty, ExprKind::MapEmpty)
        })
    }

    pub fn map_set(&self, map: &Expr, key: &Expr, value: &Expr) -> Expr {
        let (k, v) = types_of("MapSet", map.ty());
        contract(key.ty().expect("MapSet", k));
        contract(value.ty().expect("MapSet", v));
        self.tables.map_set.get_or_add(
            (map.id(), key.id(), value.id()),
            (map, key, value),
            |(map, key, value)| {
                debug!("MapSet({:?}, {:?}, {:?})", map, key, value);
                if let ExprKind::MapSet { map: inner, key: k, .. } = map.kind() {
                    if k == key {
                        debug!("set(set(M, k, _), k, v) => set(M, k, v)");
                        return self.map_set(inner, key, value);
                    }
                }
                self.mk(
                    map.ty().clone(),
                    ExprKind::MapSet {
                        map: map.clone(),
                        key: key.clone(),
                        value: value.clone(),
                    },
                )
            },
        )
    }

    /// Looks up `key`, yielding an `Option<V>`.
    pub fn map_get(&self, map: &Expr, key: &Expr) -> Expr {
        let (k, v) = types_of("MapGet", map.ty());
        contract(key.ty().expect("MapGet", k));
        self.tables
            .map_get
            .get_or_add((map.id(), key.id()), (map, key), |(map, key)| {
                debug!("MapGet({:?}, {:?})", map, key);
                match map.kind() {
                    ExprKind::MapEmpty => {
                        debug!("get([], k) => None");
                        return self.none(v);
                    }
                    ExprKind::MapSet { map: inner, key: k, value } => {
                        if k == key {
                            debug!("get(set(M, k, v), k) => Some(v)");
                            return self.some(value);
                        }
                        if distinct_keys(k, key) {
                            debug!("get(set(M, k1, v), k2) => get(M, k2)");
                            return self.map_get(inner, key);
                        }
                    }
                    ExprKind::MapDelete { map: inner, key: k } => {
                        if k == key {
                            debug!("get(delete(M, k), k) => None");
                            return self.none(v);
                        }
                        if distinct_keys(k, key) {
                            debug!("get(delete(M, k1), k2) => get(M, k2)");
                            return self.map_get(inner, key);
                        }
                    }
                    _ => {}
                }
                self.mk(
                    Type::option(v.clone()),
                    ExprKind::MapGet {
                        map: map.clone(),
                        key: key.clone(),
                    },
                )
            })
    }

    pub fn map_delete(&self, map: &Expr, key: &Expr) -> Expr {
        let (k, _) = types_of("MapDelete", map.ty());
        contract(key.ty().expect("MapDelete", k));
        self.tables
            .map_delete
            .get_or_add((map.id(), key.id()), (map, key), |(map, key)| {
                debug!("MapDelete({:?}, {:?})", map, key);
                match map.kind() {
                    ExprKind::MapEmpty => {
                        debug!("delete([], k) => []");
                        return map.clone();
                    }
                    ExprKind::MapSet { map: inner, key: k, .. } if k == key => {
                        debug!("delete(set(M, k, _), k) => delete(M, k)");
                        return self.map_delete(inner, key);
                    }
                    ExprKind::MapDelete { key: k, .. } if k == key => {
                        debug!("delete(delete(M, k), k) => delete(M, k)");
                        return map.clone();
                    }
                    _ => {}
                }
                self.mk(
                    map.ty().clone(),
                    ExprKind::MapDelete {
                        map: map.clone(),
                        key: key.clone(),
                    },
                )
            })
    }

    /// Pointwise combination of two sets.
    pub fn map_combine(&self, op: CombineOp, lhs: &Expr, rhs: &Expr) -> Expr {
        let (_, v) = types_of(op.name(), lhs.ty());
        if !v.is_bool() {
            contract::<()>(Err(TypeError::Unsupported {
                op: op.name(),
                ty: lhs.ty().clone(),
            }));
        }
        contract(Type::expect_same(op.name(), lhs.ty(), rhs.ty()));
        self.tables
            .map_combine
            .get_or_add((op, lhs.id(), rhs.id()), (lhs, rhs), |(lhs, rhs)| {
                self.simplify_combine(op, lhs, rhs)
            })
    }

    fn simplify_combine(&self, op: CombineOp, lhs: &Expr, rhs: &Expr) -> Expr {
        debug!("{}({:?}, {:?})", op.name(), lhs, rhs);

        if lhs == rhs {
            return match op {
                CombineOp::Union | CombineOp::Intersect => {
                    debug!("{}(A,A) => A", op.name());
                    lhs.clone()
                }
                CombineOp::Difference => {
                    debug!("Difference(A,A) => []");
                    let (k, v) = types_of(op.name(), lhs.ty());
                    self.map_empty(k, v)
                }
            };
        }

        match op {
            CombineOp::Union => {
                if is_empty(lhs) {
                    debug!("Union([],B) => B");
                    return rhs.clone();
                }
                if is_empty(rhs) {
                    debug!("Union(A,[]) => A");
                    return lhs.clone();
                }
            }
            CombineOp::Intersect => {
                if is_empty(lhs) || is_empty(rhs) {
                    debug!("Intersect with [] => []");
                    return if is_empty(lhs) { lhs.clone() } else { rhs.clone() };
                }
            }
            CombineOp::Difference => {
                if is_empty(lhs) || is_empty(rhs) {
                    debug!("Difference([],B) => [], Difference(A,[]) => A");
                    return lhs.clone();
                }
            }
        }

        // Absorption and idempotence through one level of nesting.
        if let ExprKind::MapCombine { op: inner, lhs: a, rhs: b } = rhs.kind() {
            if a == lhs || b == lhs {
                match (op, inner) {
                    (CombineOp::Union, CombineOp::Intersect) | (CombineOp::Intersect, CombineOp::Union) => {
                        debug!("{}(A, {}(A,B)) => A", op.name(), inner.name());
                        return lhs.clone();
                    }
                    (CombineOp::Union, CombineOp::Union) | (CombineOp::Intersect, CombineOp::Intersect) => {
                        debug!("{}(A, {}(A,B)) => {}(A,B)", op.name(), inner.name(), inner.name());
                        return rhs.clone();
                    }
                    _ => {}
                }
            }
        }
        if let ExprKind::MapCombine { op: inner, lhs: a, rhs: b } = lhs.kind() {
            let shared = a == rhs || b == rhs;
            match (op, inner) {
                (CombineOp::Union, CombineOp::Intersect) | (CombineOp::Intersect, CombineOp::Union) if shared => {
                    debug!("{}({}(A,B), A) => A", op.name(), inner.name());
                    return rhs.clone();
                }
                (CombineOp::Union, CombineOp::Union) | (CombineOp::Intersect, CombineOp::Intersect) if shared => {
                    debug!("{}({}(A,B), A) => {}(A,B)", op.name(), inner.name(), inner.name());
                    return lhs.clone();
                }
                (CombineOp::Difference, CombineOp::Difference) if b == rhs => {
                    debug!("Difference(Difference(A,B), B) => Difference(A,B)");
                    return lhs.clone();
                }
                _ => {}
            }
        }

        self.mk(
            lhs.ty().clone(),
            ExprKind::MapCombine {
                op,
                lhs: lhs.clone(),
                rhs: rhs.clone(),
            },
        )
    }

    /// The empty set of `elem`.
    pub fn set_empty(&self, elem: &Type) -> Expr {
        self.map_empty(elem, &Type::Bool)
    }

    pub fn set_add(&self, set: &Expr, elem: &Expr) -> Expr {
        self.map_set(set, elem, &self.bool(true))
    }

    pub fn set_remove(&self, set: &Expr, elem: &Expr) -> Expr {
        self.map_delete(set, elem)
    }

    /// Membership: present in the map and mapped to `true`.
    pub fn set_contains(&self, set: &Expr, elem: &Expr) -> Expr {
        let entry = self.map_get(set, elem);
        self.and(&self.option_has_value(&entry), &self.option_value(&entry))
    }

    pub fn set_union(&self, lhs: &Expr, rhs: &Expr) -> Expr {
        self.map_combine(CombineOp::Union, lhs, rhs)
    }

    pub fn set_intersect(&self, lhs: &Expr, rhs: &Expr) -> Expr {
        self.map_combine(CombineOp::Intersect, lhs, rhs)
    }

    pub fn set_difference(&self, lhs: &Expr, rhs: &Expr) -> Expr {
        self.map_combine(CombineOp::Difference, lhs, rhs)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn setup() -> (Context, Expr) {
        let ctx = Context::default();
        let m = ctx.symbolic("m", Type::map(Type::string(), Type::BigInt));
        (ctx, m)
    }

    #[test]
    fn test_get_after_set() {
        let (ctx, m) = setup();
        let k = ctx.string("k");
        let v = ctx.bigint(3);
        let got = ctx.map_get(&ctx.map_set(&m, &k, &v), &k);
        assert!(got.ptr_eq(&ctx.some(&v)));
        assert!(ctx.option_value(&got).ptr_eq(&v));
    }

    #[test]
    fn test_get_skips_other_constant_keys() {
        let (ctx, m) = setup();
        let a = ctx.string("a");
        let b = ctx.string("b");
        let m2 = ctx.map_set(&m, &a, &ctx.bigint(1));
        assert!(ctx.map_get(&m2, &b).ptr_eq(&ctx.map_get(&m, &b)));

        // A symbolic key may alias, so the lookup stays.
        let s = ctx.symbolic("s", Type::string());
        let g = ctx.map_get(&m2, &s);
        assert!(matches!(g.kind(), ExprKind::MapGet { .. }));
        assert_eq!(g.ty(), &Type::option(Type::BigInt));
    }

    #[test]
    fn test_get_from_empty() {
        let ctx = Context::default();
        let m = ctx.map_empty(&Type::Char, &Type::int32());
        let got = ctx.map_get(&m, &ctx.char('x'));
        assert!(got.ptr_eq(&ctx.none(&Type::int32())));
        assert!(ctx.option_has_value(&got).is_false());
    }

    #[test]
    fn test_set_and_delete_rules() {
        let (ctx, m) = setup();
        let k = ctx.string("k");
        let twice = ctx.map_set(&ctx.map_set(&m, &k, &ctx.bigint(1)), &k, &ctx.bigint(2));
        assert!(twice.ptr_eq(&ctx.map_set(&m, &k, &ctx.bigint(2))));

        let deleted = ctx.map_delete(&ctx.map_set(&m, &k, &ctx.bigint(1)), &k);
        assert!(deleted.ptr_eq(&ctx.map_delete(&m, &k)));
        assert!(ctx.map_get(&deleted, &k).ptr_eq(&ctx.none(&Type::BigInt)));

        let empty = ctx.map_empty(&Type::string(), &Type::BigInt);
        assert!(ctx.map_delete(&empty, &k).ptr_eq(&empty));
    }

    #[test]
    fn test_sets() {
        let ctx = Context::default();
        let s = ctx.set_add(&ctx.set_empty(&Type::int32()), &ctx.int32(1));
        assert!(ctx.set_contains(&s, &ctx.int32(1)).is_true());
        assert!(ctx.set_contains(&s, &ctx.int32(2)).is_false());
        assert!(ctx.set_contains(&ctx.set_remove(&s, &ctx.int32(1)), &ctx.int32(1)).is_false());
    }

    #[test]
    fn test_combine_rules() {
        let ctx = Context::default();
        let a = ctx.symbolic("a", Type::set(Type::Char));
        let b = ctx.symbolic("b", Type::set(Type::Char));
        let empty = ctx.set_empty(&Type::Char);

        assert!(ctx.set_union(&a, &a).ptr_eq(&a));
        assert!(ctx.set_intersect(&a, &a).ptr_eq(&a));
        assert!(ctx.set_difference(&a, &a).ptr_eq(&empty));
        assert!(ctx.set_union(&a, &empty).ptr_eq(&a));
        assert!(ctx.set_intersect(&empty, &a).ptr_eq(&empty));
        assert!(ctx.set_difference(&a, &empty).ptr_eq(&a));

        let ab = ctx.set_intersect(&a, &b);
        assert!(ctx.set_union(&a, &ab).ptr_eq(&a));
        assert!(ctx.set_union(&ab, &b).ptr_eq(&b));
        let a_or_b = ctx.set_union(&a, &b);
        assert!(ctx.set_union(&b, &a_or_b).ptr_eq(&a_or_b));
        let d = ctx.set_difference(&a, &b);
        assert!(ctx.set_difference(&d, &b).ptr_eq(&d));
    }

    #[test]
    #[should_panic(expected = "type Map<bool, bool> cannot be used as a map key")]
    fn test_invalid_key() {
        let ctx = Context::default();
        ctx.map_empty(&Type::set(Type::Bool), &Type::Char);
    }

    #[test]
    #[should_panic(expected = "Union is not supported for type Map<char, i32>")]
    fn test_combine_requires_sets() {
        let ctx = Context::default();
        let m = ctx.map_empty(&Type::Char, &Type::int32());
        ctx.map_combine(CombineOp::Union, &m, &m);
    }
}
