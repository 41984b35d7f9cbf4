//! Human-readable rendering of expression DAGs.
//!
//! The rendering is a sequence of `let` bindings followed by the root:
//!
//! ```text
//! let p: bool
//! let q: bool
//! let e!0 = And(p, q)
//! And(e!0, Not(e!0))
//! ```
//!
//! - Every free variable is declared first, in name order. Distinct
//!   variables sharing a name are told apart by their identity, e.g. `x!7`.
//! - A node reached along more than one path is bound to a `let` the first
//!   time it is rendered and referred to by name afterwards, so shared
//!   structure is printed once.
//! - A node nested more than [`MAX_DEPTH`] levels deep is bound to a `let`
//!   as well, restarting the nesting at the outermost level.
//! - Chains of the same associative operator are flattened, e.g.
//!   `And(a, And(b, c))` prints as `And(a, b, c)`.
//! - A call prints on one line when all its arguments do and the line is
//!   shorter than [`MAX_WIDTH`]; otherwise each argument goes on its own
//!   line, indented by two spaces per level.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::build::seq::string_literal;
use crate::node::{ArithOp, BitwiseOp, CombineOp, CompareOp, ConsCase, Expr, ExprId, ExprKind, Lambda, LogicalOp};
use crate::reuse::find_reused;
use crate::types::{Name, ObjectType, Type};
use crate::value::Value;
use crate::visitor::ExprVisitor;

pub const MAX_WIDTH: usize = 80;
pub const MAX_DEPTH: usize = 8;
const INDENT: &str = "  ";

/// A rendered subterm and whether it fits on a single line.
type Rendered = (String, bool);

/// Renders `expr` as `let` bindings followed by the root term.
pub fn format(expr: &Expr) -> String {
    let mut formatter = Formatter::new(expr);
    let (root, _) = formatter.render(expr, 0);
    formatter.finish(&root)
}

/// The formatting visitor; its parameter is the nesting level.
pub struct Formatter {
    reused: FxHashSet<ExprId>,
    bound: FxHashMap<ExprId, String>,
    bindings: Vec<(String, String)>,
    free: BTreeMap<String, Type>,
    names: FxHashMap<ExprId, String>,
}

impl Formatter {
    pub fn new(root: &Expr) -> Self {
        Self {
            reused: find_reused(root),
            bound: FxHashMap::default(),
            bindings: Vec::new(),
            free: BTreeMap::new(),
            names: FxHashMap::default(),
        }
    }

    /// Renders a subterm at nesting `level`, binding it to a `let` when it is
    /// shared or nested too deeply.
    pub fn render(&mut self, expr: &Expr, level: usize) -> Rendered {
        if let Some(name) = self.bound.get(&expr.id()) {
            return (name.clone(), true);
        }
        if let Some(s) = string_literal(expr) {
            return (format!("{:?}", s), true);
        }
        if expr.is_basic() {
            return expr.accept(self, level);
        }
        if self.reused.contains(&expr.id()) || level > MAX_DEPTH {
            let (body, _) = expr.accept(self, 0);
            let name = format!("e!{}", self.bindings.len());
            self.bindings.push((name.clone(), body));
            self.bound.insert(expr.id(), name.clone());
            return (name, true);
        }
        expr.accept(self, level)
    }

    /// Assembles the declarations, the bindings and the root.
    pub fn finish(self, root: &str) -> String {
        let mut out = String::new();
        for (name, ty) in &self.free {
            out.push_str(&format!("let {}: {}\n", name, ty));
        }
        for (name, body) in &self.bindings {
            out.push_str(&format!("let {} = {}\n", name, body));
        }
        out.push_str(root);
        out
    }

    fn args(&mut self, children: &[&Expr], level: usize) -> Vec<Rendered> {
        children.iter().map(|c| self.render(c, level + 1)).collect()
    }

    fn call(&mut self, name: &str, children: &[&Expr], level: usize) -> Rendered {
        let args = self.args(children, level);
        layout(name, &args, level)
    }

    /// Operands of a chain of the same associative operator, left to right.
    ///
    /// The walk does not enter shared or already bound nodes, which keep
    /// their own `let`.
    fn flatten(&self, expr: &Expr) -> Vec<Expr> {
        let same = |e: &Expr| match (expr.kind(), e.kind()) {
            (ExprKind::Logical { op: a, .. }, ExprKind::Logical { op: b, .. }) => a == b,
            (ExprKind::Arith { op: a, .. }, ExprKind::Arith { op: b, .. }) => a == b && a.is_associative(),
            (ExprKind::Bitwise { op: a, .. }, ExprKind::Bitwise { op: b, .. }) => a == b,
            (ExprKind::MapCombine { op: a, .. }, ExprKind::MapCombine { op: b, .. }) => {
                a == b && *a != CombineOp::Difference
            }
            _ => false,
        };
        let mut out = Vec::new();
        let mut stack: Vec<Expr> = expr.children().into_iter().rev().cloned().collect();
        while let Some(e) = stack.pop() {
            let opaque = self.reused.contains(&e.id()) || self.bound.contains_key(&e.id());
            if !opaque && same(&e) {
                stack.extend(e.children().into_iter().rev().cloned());
            } else {
                out.push(e);
            }
        }
        out
    }

    fn chain(&mut self, expr: &Expr, name: &str, level: usize) -> Rendered {
        let operands = self.flatten(expr);
        let refs: Vec<&Expr> = operands.iter().collect();
        self.call(name, &refs, level)
    }
}

/// Lays out a call on one line if possible, one argument per line otherwise.
fn layout(name: &str, args: &[Rendered], level: usize) -> Rendered {
    let inline = args.iter().all(|(_, single)| *single);
    let width = name.len() + 2 + args.iter().map(|(s, _)| s.len() + 2).sum::<usize>();
    if inline && width < MAX_WIDTH {
        let joined: Vec<&str> = args.iter().map(|(s, _)| s.as_str()).collect();
        return (format!("{}({})", name, joined.join(", ")), true);
    }
    let indent = INDENT.repeat(level + 1);
    let mut out = format!("{}(", name);
    for (i, (arg, _)) in args.iter().enumerate() {
        out.push('\n');
        out.push_str(&indent);
        out.push_str(arg);
        if i + 1 < args.len() {
            out.push(',');
        }
    }
    out.push(')');
    (out, false)
}

fn word(s: impl Into<String>) -> Rendered {
    (s.into(), true)
}

impl ExprVisitor<usize> for Formatter {
    type Output = Rendered;

    fn visit_constant(&mut self, _expr: &Expr, value: &Value, _level: usize) -> Rendered {
        word(value.to_string())
    }

    fn visit_arbitrary(&mut self, expr: &Expr, name: &str, _level: usize) -> Rendered {
        if let Some(display) = self.names.get(&expr.id()) {
            return word(display.clone());
        }
        let display = if self.free.contains_key(name) {
            format!("{}!{}", name, expr.id().get())
        } else {
            name.to_string()
        };
        self.free.insert(display.clone(), expr.ty().clone());
        self.names.insert(expr.id(), display.clone());
        word(display)
    }

    fn visit_parameter(&mut self, _expr: &Expr, name: &str, _level: usize) -> Rendered {
        word(format!("${}", name))
    }

    fn visit_argument(&mut self, _expr: &Expr, index: u64, _level: usize) -> Rendered {
        word(format!("arg!{}", index))
    }

    fn visit_not(&mut self, _expr: &Expr, inner: &Expr, level: usize) -> Rendered {
        self.call("Not", &[inner], level)
    }

    fn visit_logical(&mut self, expr: &Expr, op: LogicalOp, _lhs: &Expr, _rhs: &Expr, level: usize) -> Rendered {
        self.chain(expr, op.name(), level)
    }

    fn visit_if(&mut self, _expr: &Expr, guard: &Expr, then: &Expr, otherwise: &Expr, level: usize) -> Rendered {
        self.call("If", &[guard, then, otherwise], level)
    }

    fn visit_arith(&mut self, expr: &Expr, op: ArithOp, lhs: &Expr, rhs: &Expr, level: usize) -> Rendered {
        if op.is_associative() {
            self.chain(expr, op.name(), level)
        } else {
            self.call(op.name(), &[lhs, rhs], level)
        }
    }

    fn visit_bit_not(&mut self, _expr: &Expr, inner: &Expr, level: usize) -> Rendered {
        self.call("BitNot", &[inner], level)
    }

    fn visit_bitwise(&mut self, expr: &Expr, op: BitwiseOp, _lhs: &Expr, _rhs: &Expr, level: usize) -> Rendered {
        self.chain(expr, op.name(), level)
    }

    fn visit_equals(&mut self, _expr: &Expr, lhs: &Expr, rhs: &Expr, level: usize) -> Rendered {
        self.call("Equals", &[lhs, rhs], level)
    }

    fn visit_compare(&mut self, _expr: &Expr, op: CompareOp, lhs: &Expr, rhs: &Expr, level: usize) -> Rendered {
        self.call(op.name(), &[lhs, rhs], level)
    }

    fn visit_cast(&mut self, expr: &Expr, inner: &Expr, level: usize) -> Rendered {
        self.call(&format!("Cast<{}>", expr.ty()), &[inner], level)
    }

    fn visit_create_object(
        &mut self,
        _expr: &Expr,
        schema: &Arc<ObjectType>,
        fields: &[Expr],
        level: usize,
    ) -> Rendered {
        let args: Vec<Rendered> = fields
            .iter()
            .zip(schema.fields())
            .map(|(value, (name, _))| {
                let (s, single) = self.render(value, level + 1);
                (format!("{}={}", name, s), single)
            })
            .collect();
        layout(schema.name(), &args, level)
    }

    fn visit_get_field(&mut self, _expr: &Expr, object: &Expr, field: &Name, level: usize) -> Rendered {
        let args = vec![self.render(object, level + 1), word(field.to_string())];
        layout("GetField", &args, level)
    }

    fn visit_with_field(&mut self, _expr: &Expr, object: &Expr, field: &Name, value: &Expr, level: usize) -> Rendered {
        let args = vec![
            self.render(object, level + 1),
            word(field.to_string()),
            self.render(value, level + 1),
        ];
        layout("WithField", &args, level)
    }

    fn visit_list_empty(&mut self, _expr: &Expr, _level: usize) -> Rendered {
        word("ListEmpty")
    }

    fn visit_list_add_front(&mut self, _expr: &Expr, head: &Expr, tail: &Expr, level: usize) -> Rendered {
        self.call("ListAddFront", &[head, tail], level)
    }

    fn visit_list_case(&mut self, _expr: &Expr, list: &Expr, empty: &Expr, cons: &ConsCase, level: usize) -> Rendered {
        self.call("ListCase", &[list, empty, &cons.head, &cons.tail, &cons.body], level)
    }

    fn visit_seq_empty(&mut self, _expr: &Expr, _level: usize) -> Rendered {
        word("SeqEmpty")
    }

    fn visit_seq_unit(&mut self, _expr: &Expr, elem: &Expr, level: usize) -> Rendered {
        self.call("SeqUnit", &[elem], level)
    }

    fn visit_seq_concat(&mut self, _expr: &Expr, lhs: &Expr, rhs: &Expr, level: usize) -> Rendered {
        self.call("SeqConcat", &[lhs, rhs], level)
    }

    fn visit_seq_length(&mut self, _expr: &Expr, seq: &Expr, level: usize) -> Rendered {
        self.call("SeqLength", &[seq], level)
    }

    fn visit_seq_at(&mut self, _expr: &Expr, seq: &Expr, index: &Expr, level: usize) -> Rendered {
        self.call("SeqAt", &[seq, index], level)
    }

    fn visit_seq_contains(&mut self, _expr: &Expr, seq: &Expr, sub: &Expr, level: usize) -> Rendered {
        self.call("SeqContains", &[seq, sub], level)
    }

    fn visit_seq_index_of(&mut self, _expr: &Expr, seq: &Expr, sub: &Expr, offset: &Expr, level: usize) -> Rendered {
        self.call("SeqIndexOf", &[seq, sub, offset], level)
    }

    fn visit_seq_slice(&mut self, _expr: &Expr, seq: &Expr, offset: &Expr, length: &Expr, level: usize) -> Rendered {
        self.call("SeqSlice", &[seq, offset, length], level)
    }

    fn visit_seq_replace_first(
        &mut self,
        _expr: &Expr,
        seq: &Expr,
        pattern: &Expr,
        replacement: &Expr,
        level: usize,
    ) -> Rendered {
        self.call("SeqReplaceFirst", &[seq, pattern, replacement], level)
    }

    fn visit_map_empty(&mut self, _expr: &Expr, _level: usize) -> Rendered {
        word("MapEmpty")
    }

    fn visit_map_set(&mut self, _expr: &Expr, map: &Expr, key: &Expr, value: &Expr, level: usize) -> Rendered {
        self.call("MapSet", &[map, key, value], level)
    }

    fn visit_map_get(&mut self, _expr: &Expr, map: &Expr, key: &Expr, level: usize) -> Rendered {
        self.call("MapGet", &[map, key], level)
    }

    fn visit_map_delete(&mut self, _expr: &Expr, map: &Expr, key: &Expr, level: usize) -> Rendered {
        self.call("MapDelete", &[map, key], level)
    }

    fn visit_map_combine(&mut self, expr: &Expr, op: CombineOp, lhs: &Expr, rhs: &Expr, level: usize) -> Rendered {
        if op == CombineOp::Difference {
            self.call(op.name(), &[lhs, rhs], level)
        } else {
            self.chain(expr, op.name(), level)
        }
    }

    fn visit_lambda(&mut self, _expr: &Expr, lambda: &Lambda, level: usize) -> Rendered {
        self.call("Lambda", &[&lambda.argument, &lambda.body], level)
    }

    fn visit_apply(&mut self, _expr: &Expr, lambda: &Expr, arg: &Expr, level: usize) -> Rendered {
        self.call("Apply", &[lambda, arg], level)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format(self))
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::context::Context;

    #[test]
    fn test_shared_node_bound_once() {
        let ctx = Context::default();
        let p = ctx.symbolic("p", Type::Bool);
        let q = ctx.symbolic("q", Type::Bool);
        let shared = ctx.and(&p, &q);
        let root = ctx.and(&shared, &ctx.not(&shared));
        assert_eq!(
            format(&root),
            "let p: bool\nlet q: bool\nlet e!0 = And(p, q)\nAnd(e!0, Not(e!0))"
        );
    }

    #[test]
    fn test_free_variables_with_same_name() {
        let ctx = Context::default();
        let b = ctx.symbolic("x", Type::Bool);
        let n = ctx.symbolic("x", Type::int32());
        let root = ctx.and(&b, &ctx.eq(&n, &ctx.int32(1)));
        let out = format(&root);
        let decls: Vec<&str> = out.lines().filter(|l| l.starts_with("let x")).collect();
        assert_eq!(decls.len(), 2, "{}", out);
        assert!(decls.contains(&"let x: bool"), "{}", out);
        let renamed = format!("x!{}", n.id().get());
        assert!(decls.contains(&format!("let {}: i32", renamed).as_str()), "{}", out);
        assert!(out.ends_with(&format!("And(x, Equals({}, 1))", renamed)), "{}", out);
    }

    #[test]
    fn test_flatten_associative_chain() {
        let ctx = Context::default();
        let a = ctx.symbolic("a", Type::Bool);
        let b = ctx.symbolic("b", Type::Bool);
        let c = ctx.symbolic("c", Type::Bool);
        let e = ctx.and(&ctx.and(&a, &b), &c);
        assert_eq!(format(&e), "let a: bool\nlet b: bool\nlet c: bool\nAnd(a, b, c)");

        // Subtraction does not flatten.
        let x = ctx.symbolic("x", Type::BigInt);
        let e = ctx.sub(&ctx.sub(&x, &ctx.bigint(1)), &ctx.bigint(2));
        assert_eq!(format(&e), "let x: bigint\nSub(Sub(x, 1), 2)");

        // Neither does a different operator.
        let e = ctx.and(&ctx.or(&a, &b), &c);
        assert_eq!(format(&e), "let a: bool\nlet b: bool\nlet c: bool\nAnd(Or(a, b), c)");
    }

    #[test]
    fn test_literals() {
        let ctx = Context::default();
        let s = ctx.symbolic("s", Type::string());
        let e = ctx.seq_contains(&s, &ctx.string("ab"));
        assert_eq!(format(&e), "let s: string\nSeqContains(s, \"ab\")");
        assert_eq!(format(&ctx.char('x')), "'x'");
        assert_eq!(format(&ctx.real(1, 2)), "1/2");
    }

    #[test]
    fn test_records() {
        let ctx = Context::default();
        let point = Type::object(ObjectType::new("Point", [("X", Type::int32()), ("Y", Type::int32())]));
        let x = ctx.symbolic("x", Type::int32());
        let p = ctx.create(&point, [("Y", ctx.int32(2)), ("X", x.clone())]);
        assert_eq!(format(&p), "let x: i32\nPoint(X=x, Y=2)");
        let obj = ctx.symbolic("obj", point);
        assert_eq!(format(&ctx.get_field(&obj, "X")), "let obj: Point\nGetField(obj, X)");
    }

    #[test]
    fn test_wide_call_breaks_lines() {
        let ctx = Context::default();
        let vars: Vec<Expr> = (0..12)
            .map(|i| ctx.symbolic(format!("variable_{}", i), Type::Bool))
            .collect();
        let e = ctx.or_all(&vars);
        let text = format(&e);
        let body = text.lines().skip(12).collect::<Vec<_>>().join("\n");
        assert!(body.starts_with("Or(\n  variable_0,\n  variable_1,"));
        assert!(body.ends_with("  variable_11)"));
    }

    #[test]
    fn test_deep_nesting_forces_let() {
        let ctx = Context::default();
        let x = ctx.symbolic("x", Type::BigInt);
        let mut e = x.clone();
        for i in 0..12 {
            // Alternate operators so that nothing is flattened.
            e = if i % 2 == 0 {
                ctx.sub(&e, &ctx.bigint(i))
            } else {
                ctx.add(&e, &ctx.bigint(i))
            };
        }
        assert!(find_reused(&e).is_empty());
        let text = format(&e);
        assert!(text.contains("let e!0 = "));
        for line in text.lines() {
            assert!(line.len() < MAX_WIDTH);
        }
    }

    #[test]
    fn test_display() {
        let ctx = Context::default();
        let x = ctx.symbolic("x", Type::Bool);
        assert_eq!(ctx.not(&x).to_string(), "let x: bool\nNot(x)");
    }
}
