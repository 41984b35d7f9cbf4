//! Unbounded sequences and strings.
//!
//! A string is a sequence of `char`. Literal sequences are built as
//! right-nested concatenations of single-element units, so a literal has a
//! unique canonical node regardless of how it was assembled.

use log::debug;

use crate::context::Context;
use crate::error::{contract, TypeError};
use crate::node::{Expr, ExprKind};
use crate::types::Type;
use crate::value::{self, Value};

fn elem_of<'a>(op: &'static str, ty: &'a Type) -> &'a Type {
    match ty.seq_elem() {
        Some(elem) => elem,
        None => contract(Err(TypeError::Unsupported { op, ty: ty.clone() })),
    }
}

/// Elements of a sequence built only from empty, unit and concatenation nodes.
pub(crate) fn seq_elements(e: &Expr) -> Option<Vec<Expr>> {
    let mut out = Vec::new();
    let mut stack = vec![e];
    while let Some(e) = stack.pop() {
        match e.kind() {
            ExprKind::SeqEmpty => {}
            ExprKind::SeqUnit(x) => out.push(x.clone()),
            ExprKind::SeqConcat { lhs, rhs } => {
                stack.push(rhs);
                stack.push(lhs);
            }
            _ => return None,
        }
    }
    Some(out)
}

/// Elements of a sequence literal whose elements are all constants.
pub(crate) fn seq_values(e: &Expr) -> Option<Vec<Value>> {
    seq_elements(e)?
        .iter()
        .map(|x| x.as_constant().cloned())
        .collect()
}

/// The text of a string literal.
pub fn string_literal(e: &Expr) -> Option<String> {
    if !e.ty().is_string() {
        return None;
    }
    seq_values(e)?
        .into_iter()
        .map(|v| match v {
            Value::Char(c) => Some(c),
            _ => None,
        })
        .collect()
}

fn is_empty(e: &Expr) -> bool {
    matches!(e.kind(), ExprKind::SeqEmpty)
}

impl Context {
    pub fn seq_empty(&self, elem: &Type) -> Expr {
        let ty = Type::seq(elem.clone());
        self.tables.seq_empty.get_or_add(ty.clone(), ty, |ty| {
            debug!("SeqEmpty<{}>", ty);
            self.mk(ty, ExprKind::SeqEmpty)
        })
    }

    /// The sequence holding the single element `e`.
    pub fn seq_unit(&self, e: &Expr) -> Expr {
        self.tables.seq_unit.get_or_add(e.id(), e, |e| {
            debug!("SeqUnit({:?})", e);
            self.mk(Type::seq(e.ty().clone()), ExprKind::SeqUnit(e.clone()))
        })
    }

    pub fn seq_concat(&self, lhs: &Expr, rhs: &Expr) -> Expr {
        elem_of("SeqConcat", lhs.ty());
        contract(Type::expect_same("SeqConcat", lhs.ty(), rhs.ty()));
        self.tables
            .seq_concat
            .get_or_add((lhs.id(), rhs.id()), (lhs, rhs), |(lhs, rhs)| {
                debug!("SeqConcat({:?}, {:?})", lhs, rhs);
                if is_empty(lhs) {
                    debug!("[] ++ S => S");
                    return rhs.clone();
                }
                if is_empty(rhs) {
                    debug!("S ++ [] => S");
                    return lhs.clone();
                }
                if let ExprKind::SeqConcat { lhs: a, rhs: b } = lhs.kind() {
                    debug!("(A ++ B) ++ C => A ++ (B ++ C)");
                    return self.seq_concat(a, &self.seq_concat(b, rhs));
                }
                self.mk(
                    lhs.ty().clone(),
                    ExprKind::SeqConcat {
                        lhs: lhs.clone(),
                        rhs: rhs.clone(),
                    },
                )
            })
    }

    /// The sequence of `items`, in order.
    pub fn seq_from<'a>(&self, elem: &Type, items: impl IntoIterator<Item = &'a Expr>) -> Expr {
        let items: Vec<&Expr> = items.into_iter().collect();
        items
            .into_iter()
            .rev()
            .fold(self.seq_empty(elem), |acc, x| self.seq_concat(&self.seq_unit(x), &acc))
    }

    /// The string literal `s`.
    pub fn string(&self, s: &str) -> Expr {
        let chars: Vec<Expr> = s.chars().map(|c| self.char(c)).collect();
        self.seq_from(&Type::Char, &chars)
    }

    /// Number of elements, as a `bigint`.
    pub fn seq_length(&self, seq: &Expr) -> Expr {
        elem_of("SeqLength", seq.ty());
        self.tables.seq_length.get_or_add(seq.id(), seq, |seq| {
            debug!("SeqLength({:?})", seq);
            match seq.kind() {
                ExprKind::SeqEmpty => {
                    debug!("len([]) => 0");
                    return self.bigint(0);
                }
                ExprKind::SeqUnit(_) => {
                    debug!("len([x]) => 1");
                    return self.bigint(1);
                }
                ExprKind::SeqConcat { lhs, rhs } => {
                    debug!("len(A ++ B) => len(A) + len(B)");
                    return self.add(&self.seq_length(lhs), &self.seq_length(rhs));
                }
                _ => {}
            }
            self.mk(Type::BigInt, ExprKind::SeqLength(seq.clone()))
        })
    }

    /// The element at `index` as a sequence of length at most one.
    pub fn seq_at(&self, seq: &Expr, index: &Expr) -> Expr {
        elem_of("SeqAt", seq.ty());
        contract(index.ty().expect("SeqAt", &Type::BigInt));
        self.tables
            .seq_at
            .get_or_add((seq.id(), index.id()), (seq, index), |(seq, index)| {
                debug!("SeqAt({:?}, {:?})", seq, index);
                if is_empty(seq) {
                    debug!("at([], i) => []");
                    return seq.clone();
                }
                if let (Some(elems), Some(i)) = (seq_elements(seq), index.as_constant().and_then(Value::as_bigint)) {
                    debug!("at(c, i) => c'");
                    let elem = elem_of("SeqAt", seq.ty());
                    return self.seq_from(elem, &value::seq_at(&elems, i));
                }
                self.mk(
                    seq.ty().clone(),
                    ExprKind::SeqAt {
                        seq: seq.clone(),
                        index: index.clone(),
                    },
                )
            })
    }

    pub fn seq_contains(&self, seq: &Expr, sub: &Expr) -> Expr {
        elem_of("SeqContains", seq.ty());
        contract(Type::expect_same("SeqContains", seq.ty(), sub.ty()));
        self.tables
            .seq_contains
            .get_or_add((seq.id(), sub.id()), (seq, sub), |(seq, sub)| {
                debug!("SeqContains({:?}, {:?})", seq, sub);
                if is_empty(sub) || seq == sub {
                    debug!("contains(S, []) => 1");
                    return self.bool(true);
                }
                if let (Some(s), Some(t)) = (seq_values(seq), seq_values(sub)) {
                    debug!("contains(c1, c2) => c");
                    return self.bool(value::seq_contains(&s, &t));
                }
                self.mk(
                    Type::Bool,
                    ExprKind::SeqContains {
                        seq: seq.clone(),
                        sub: sub.clone(),
                    },
                )
            })
    }

    /// Position of the first occurrence of `sub` at or after `offset`, or `-1`.
    pub fn seq_index_of(&self, seq: &Expr, sub: &Expr, offset: &Expr) -> Expr {
        elem_of("SeqIndexOf", seq.ty());
        contract(Type::expect_same("SeqIndexOf", seq.ty(), sub.ty()));
        contract(offset.ty().expect("SeqIndexOf", &Type::BigInt));
        self.tables.seq_index_of.get_or_add(
            (seq.id(), sub.id(), offset.id()),
            (seq, sub, offset),
            |(seq, sub, offset)| {
                debug!("SeqIndexOf({:?}, {:?}, {:?})", seq, sub, offset);
                if let (Some(s), Some(t), Some(o)) = (
                    seq_values(seq),
                    seq_values(sub),
                    offset.as_constant().and_then(Value::as_bigint),
                ) {
                    debug!("index_of(c1, c2, c3) => c");
                    return self.bigint(value::seq_index_of(&s, &t, o));
                }
                self.mk(
                    Type::BigInt,
                    ExprKind::SeqIndexOf {
                        seq: seq.clone(),
                        sub: sub.clone(),
                        offset: offset.clone(),
                    },
                )
            },
        )
    }

    /// At most `length` elements starting at `offset`.
    pub fn seq_slice(&self, seq: &Expr, offset: &Expr, length: &Expr) -> Expr {
        elem_of("SeqSlice", seq.ty());
        contract(offset.ty().expect("SeqSlice", &Type::BigInt));
        contract(length.ty().expect("SeqSlice", &Type::BigInt));
        self.tables.seq_slice.get_or_add(
            (seq.id(), offset.id(), length.id()),
            (seq, offset, length),
            |(seq, offset, length)| {
                debug!("SeqSlice({:?}, {:?}, {:?})", seq, offset, length);
                if is_empty(seq) {
                    debug!("slice([], o, n) => []");
                    return seq.clone();
                }
                let bound = |e: &Expr| e.as_constant().and_then(Value::as_bigint).cloned();
                if let (Some(elems), Some(o), Some(n)) = (seq_elements(seq), bound(offset), bound(length)) {
                    debug!("slice(c, o, n) => c'");
                    let elem = elem_of("SeqSlice", seq.ty());
                    return self.seq_from(elem, &value::seq_slice(&elems, &o, &n));
                }
                self.mk(
                    seq.ty().clone(),
                    ExprKind::SeqSlice {
                        seq: seq.clone(),
                        offset: offset.clone(),
                        length: length.clone(),
                    },
                )
            },
        )
    }

    /// Replaces the first occurrence of `pattern` in `seq` by `replacement`.
    pub fn seq_replace_first(&self, seq: &Expr, pattern: &Expr, replacement: &Expr) -> Expr {
        elem_of("SeqReplaceFirst", seq.ty());
        contract(Type::expect_same("SeqReplaceFirst", seq.ty(), pattern.ty()));
        contract(Type::expect_same("SeqReplaceFirst", seq.ty(), replacement.ty()));
        self.tables.seq_replace_first.get_or_add(
            (seq.id(), pattern.id(), replacement.id()),
            (seq, pattern, replacement),
            |(seq, pattern, replacement)| {
                debug!("SeqReplaceFirst({:?}, {:?}, {:?})", seq, pattern, replacement);
                if pattern == replacement {
                    debug!("replace(S, P, P) => S");
                    return seq.clone();
                }
                if let (Some(s), Some(p), Some(r)) = (seq_values(seq), seq_values(pattern), seq_values(replacement)) {
                    debug!("replace(c1, c2, c3) => c");
                    let folded: Vec<Expr> = value::seq_replace_first(&s, &p, &r)
                        .into_iter()
                        .map(|v| self.constant(v))
                        .collect();
                    return self.seq_from(elem_of("SeqReplaceFirst", seq.ty()), &folded);
                }
                self.mk(
                    seq.ty().clone(),
                    ExprKind::SeqReplaceFirst {
                        seq: seq.clone(),
                        pattern: pattern.clone(),
                        replacement: replacement.clone(),
                    },
                )
            },
        )
    }

    /// Whether `seq` begins with `prefix`.
    pub fn seq_starts_with(&self, seq: &Expr, prefix: &Expr) -> Expr {
        let head = self.seq_slice(seq, &self.bigint(0), &self.seq_length(prefix));
        self.eq(&head, prefix)
    }
}
