//! Expression nodes.
//!
//! An [`Expr`] is a cheap, clonable handle to an immutable, interned node.
//! Every node receives a process-wide unique [`ExprId`] when it is allocated,
//! and equality, hashing and ordering of handles are defined by that id.
//! Because the smart constructors intern every node by its content, two
//! handles with equal ids are the same node, and two structurally equal
//! nodes built through the same [`Context`][crate::context::Context] have
//! equal ids.
//!
//! Nodes only point downwards, to their children. The same child may be
//! shared by many parents, so an expression is a DAG rather than a tree.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

use crate::types::{Name, ObjectType, Type};
use crate::value::Value;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-wide unique identity of a node.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ExprId(u64);

impl ExprId {
    /// Allocates a fresh identity token.
    pub(crate) fn fresh() -> Self {
        ExprId(NEXT_ID.fetch_add(1, AtomicOrdering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BitwiseOp {
    And,
    Or,
    Xor,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CompareOp {
    Lt,
    Le,
    Gt,
    Ge,
}

/// Set-like combination of two boolean-valued maps.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CombineOp {
    Union,
    Intersect,
    Difference,
}

impl LogicalOp {
    pub fn name(self) -> &'static str {
        match self {
            LogicalOp::And => "And",
            LogicalOp::Or => "Or",
        }
    }

    /// The De Morgan dual.
    pub fn dual(self) -> Self {
        match self {
            LogicalOp::And => LogicalOp::Or,
            LogicalOp::Or => LogicalOp::And,
        }
    }

    /// The literal that leaves the other operand unchanged.
    pub fn identity(self) -> bool {
        matches!(self, LogicalOp::And)
    }
}

impl ArithOp {
    pub fn name(self) -> &'static str {
        match self {
            ArithOp::Add => "Add",
            ArithOp::Sub => "Sub",
            ArithOp::Mul => "Mul",
        }
    }

    /// Whether nested chains of this operator may be flattened.
    pub fn is_associative(self) -> bool {
        !matches!(self, ArithOp::Sub)
    }
}

impl BitwiseOp {
    pub fn name(self) -> &'static str {
        match self {
            BitwiseOp::And => "BitAnd",
            BitwiseOp::Or => "BitOr",
            BitwiseOp::Xor => "BitXor",
        }
    }
}

impl CompareOp {
    pub fn name(self) -> &'static str {
        match self {
            CompareOp::Lt => "Lt",
            CompareOp::Le => "Le",
            CompareOp::Gt => "Gt",
            CompareOp::Ge => "Ge",
        }
    }

    /// Whether the comparison holds for the given ordering of its operands.
    pub fn holds(self, ord: Ordering) -> bool {
        match self {
            CompareOp::Lt => ord == Ordering::Less,
            CompareOp::Le => ord != Ordering::Greater,
            CompareOp::Gt => ord == Ordering::Greater,
            CompareOp::Ge => ord != Ordering::Less,
        }
    }
}

impl CombineOp {
    pub fn name(self) -> &'static str {
        match self {
            CombineOp::Union => "Union",
            CombineOp::Intersect => "Intersect",
            CombineOp::Difference => "Difference",
        }
    }

    /// Pointwise combination of membership flags.
    pub fn apply(self, a: bool, b: bool) -> bool {
        match self {
            CombineOp::Union => a || b,
            CombineOp::Intersect => a && b,
            CombineOp::Difference => a && !b,
        }
    }
}

/// A single-argument function value: an argument placeholder and a body.
///
/// The argument is an [`ExprKind::Argument`] node that occurs free in `body`.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Lambda {
    pub argument: Expr,
    pub body: Expr,
}

/// The cons branch of a list case split: placeholders for head and tail, and the body.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct ConsCase {
    pub head: Expr,
    pub tail: Expr,
    pub body: Expr,
}

/// The closed set of node kinds.
#[derive(Debug, Clone)]
pub enum ExprKind {
    Constant(Value),
    /// Free symbolic variable, to be assigned by a solver.
    Arbitrary { name: String },
    /// Named input bound by whoever evaluates the expression.
    Parameter { name: String },
    /// Placeholder bound by an enclosing [`Lambda`] or [`ConsCase`].
    Argument { index: u64 },

    Not(Expr),
    Logical { op: LogicalOp, lhs: Expr, rhs: Expr },
    If { guard: Expr, then: Expr, otherwise: Expr },

    Arith { op: ArithOp, lhs: Expr, rhs: Expr },
    BitNot(Expr),
    Bitwise { op: BitwiseOp, lhs: Expr, rhs: Expr },
    Equals { lhs: Expr, rhs: Expr },
    Compare { op: CompareOp, lhs: Expr, rhs: Expr },
    Cast { expr: Expr },

    /// Record construction, field values in the schema's name order.
    CreateObject { schema: Arc<ObjectType>, fields: Vec<Expr> },
    GetField { object: Expr, field: Name },
    WithField { object: Expr, field: Name, value: Expr },

    ListEmpty,
    ListAddFront { head: Expr, tail: Expr },
    ListCase { list: Expr, empty: Expr, cons: ConsCase },

    SeqEmpty,
    SeqUnit(Expr),
    SeqConcat { lhs: Expr, rhs: Expr },
    SeqLength(Expr),
    SeqAt { seq: Expr, index: Expr },
    SeqContains { seq: Expr, sub: Expr },
    SeqIndexOf { seq: Expr, sub: Expr, offset: Expr },
    SeqSlice { seq: Expr, offset: Expr, length: Expr },
    SeqReplaceFirst { seq: Expr, pattern: Expr, replacement: Expr },

    MapEmpty,
    MapSet { map: Expr, key: Expr, value: Expr },
    MapGet { map: Expr, key: Expr },
    MapDelete { map: Expr, key: Expr },
    MapCombine { op: CombineOp, lhs: Expr, rhs: Expr },

    Lambda(Lambda),
    Apply { lambda: Expr, arg: Expr },
}

impl ExprKind {
    /// Short name of the kind, as used by the formatter.
    pub fn name(&self) -> &'static str {
        match self {
            ExprKind::Constant(_) => "Constant",
            ExprKind::Arbitrary { .. } => "Arbitrary",
            ExprKind::Parameter { .. } => "Parameter",
            ExprKind::Argument { .. } => "Argument",
            ExprKind::Not(_) => "Not",
            ExprKind::Logical { op, .. } => op.name(),
            ExprKind::If { .. } => "If",
            ExprKind::Arith { op, .. } => op.name(),
            ExprKind::BitNot(_) => "BitNot",
            ExprKind::Bitwise { op, .. } => op.name(),
            ExprKind::Equals { .. } => "Equals",
            ExprKind::Compare { op, .. } => op.name(),
            ExprKind::Cast { .. } => "Cast",
            ExprKind::CreateObject { .. } => "Create",
            ExprKind::GetField { .. } => "GetField",
            ExprKind::WithField { .. } => "WithField",
            ExprKind::ListEmpty => "ListEmpty",
            ExprKind::ListAddFront { .. } => "ListAddFront",
            ExprKind::ListCase { .. } => "ListCase",
            ExprKind::SeqEmpty => "SeqEmpty",
            ExprKind::SeqUnit(_) => "SeqUnit",
            ExprKind::SeqConcat { .. } => "SeqConcat",
            ExprKind::SeqLength(_) => "SeqLength",
            ExprKind::SeqAt { .. } => "SeqAt",
            ExprKind::SeqContains { .. } => "SeqContains",
            ExprKind::SeqIndexOf { .. } => "SeqIndexOf",
            ExprKind::SeqSlice { .. } => "SeqSlice",
            ExprKind::SeqReplaceFirst { .. } => "SeqReplaceFirst",
            ExprKind::MapEmpty => "MapEmpty",
            ExprKind::MapSet { .. } => "MapSet",
            ExprKind::MapGet { .. } => "MapGet",
            ExprKind::MapDelete { .. } => "MapDelete",
            ExprKind::MapCombine { op, .. } => op.name(),
            ExprKind::Lambda(_) => "Lambda",
            ExprKind::Apply { .. } => "Apply",
        }
    }

    /// Leaf-like kinds that are cheap to render and never worth a `let`.
    pub fn is_basic(&self) -> bool {
        matches!(
            self,
            ExprKind::Constant(_)
                | ExprKind::Arbitrary { .. }
                | ExprKind::Parameter { .. }
                | ExprKind::Argument { .. }
                | ExprKind::ListEmpty
                | ExprKind::SeqEmpty
                | ExprKind::MapEmpty
        )
    }
}

/// An interned expression node.
#[derive(Debug)]
pub struct ExprNode {
    id: ExprId,
    ty: Type,
    kind: ExprKind,
}

/// Handle to an interned expression node.
#[derive(Clone)]
pub struct Expr(Arc<ExprNode>);

impl Expr {
    /// Allocates a new node with a fresh identity.
    ///
    /// Only the smart constructors call this, from within an intern table builder.
    pub(crate) fn alloc(ty: Type, kind: ExprKind) -> Self {
        Expr(Arc::new(ExprNode {
            id: ExprId::fresh(),
            ty,
            kind,
        }))
    }

    pub fn id(&self) -> ExprId {
        self.0.id
    }

    pub fn ty(&self) -> &Type {
        &self.0.ty
    }

    pub fn kind(&self) -> &ExprKind {
        &self.0.kind
    }

    /// Reference identity.
    pub fn ptr_eq(&self, other: &Expr) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn as_constant(&self) -> Option<&Value> {
        match self.kind() {
            ExprKind::Constant(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.kind() {
            ExprKind::Constant(Value::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn is_true(&self) -> bool {
        self.as_bool() == Some(true)
    }

    pub fn is_false(&self) -> bool {
        self.as_bool() == Some(false)
    }

    pub fn is_basic(&self) -> bool {
        self.kind().is_basic()
    }

    /// Direct children, in a stable order.
    ///
    /// Record fields come in name order. Placeholders bound by a lambda or
    /// a list case are not children; only the bodies are.
    pub fn children(&self) -> Vec<&Expr> {
        match self.kind() {
            ExprKind::Constant(_)
            | ExprKind::Arbitrary { .. }
            | ExprKind::Parameter { .. }
            | ExprKind::Argument { .. }
            | ExprKind::ListEmpty
            | ExprKind::SeqEmpty
            | ExprKind::MapEmpty => vec![],
            ExprKind::Not(e)
            | ExprKind::BitNot(e)
            | ExprKind::Cast { expr: e }
            | ExprKind::SeqUnit(e)
            | ExprKind::SeqLength(e) => vec![e],
            ExprKind::Logical { lhs, rhs, .. }
            | ExprKind::Arith { lhs, rhs, .. }
            | ExprKind::Bitwise { lhs, rhs, .. }
            | ExprKind::Equals { lhs, rhs }
            | ExprKind::Compare { lhs, rhs, .. }
            | ExprKind::SeqConcat { lhs, rhs }
            | ExprKind::MapCombine { lhs, rhs, .. } => vec![lhs, rhs],
            ExprKind::If { guard, then, otherwise } => vec![guard, then, otherwise],
            ExprKind::CreateObject { fields, .. } => fields.iter().collect(),
            ExprKind::GetField { object, .. } => vec![object],
            ExprKind::WithField { object, value, .. } => vec![object, value],
            ExprKind::ListAddFront { head, tail } => vec![head, tail],
            ExprKind::ListCase { list, empty, cons } => vec![list, empty, &cons.body],
            ExprKind::SeqAt { seq, index } => vec![seq, index],
            ExprKind::SeqContains { seq, sub } => vec![seq, sub],
            ExprKind::SeqIndexOf { seq, sub, offset } => vec![seq, sub, offset],
            ExprKind::SeqSlice { seq, offset, length } => vec![seq, offset, length],
            ExprKind::SeqReplaceFirst {
                seq,
                pattern,
                replacement,
            } => vec![seq, pattern, replacement],
            ExprKind::MapSet { map, key, value } => vec![map, key, value],
            ExprKind::MapGet { map, key } | ExprKind::MapDelete { map, key } => vec![map, key],
            ExprKind::Lambda(lambda) => vec![&lambda.body],
            ExprKind::Apply { lambda, arg } => vec![lambda, arg],
        }
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Expr {}

impl Hash for Expr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state)
    }
}

impl PartialOrd for Expr {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Expr {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id().cmp(&other.id())
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}:{}", self.kind().name(), self.id(), self.ty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_ids_are_monotonic() {
        let a = ExprId::fresh();
        let b = ExprId::fresh();
        assert!(a < b);
    }

    #[test]
    fn test_identity_semantics() {
        let a = Expr::alloc(Type::Bool, ExprKind::Arbitrary { name: "a".to_string() });
        let b = Expr::alloc(Type::Bool, ExprKind::Arbitrary { name: "a".to_string() });
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
        assert!(a.ptr_eq(&a.clone()));
        assert!(!a.ptr_eq(&b));
    }

    #[test]
    fn test_children_order() {
        let x = Expr::alloc(Type::Bool, ExprKind::Arbitrary { name: "x".to_string() });
        let y = Expr::alloc(Type::Bool, ExprKind::Arbitrary { name: "y".to_string() });
        let and = Expr::alloc(
            Type::Bool,
            ExprKind::Logical {
                op: LogicalOp::And,
                lhs: x.clone(),
                rhs: y.clone(),
            },
        );
        assert_eq!(and.children(), vec![&x, &y]);
        assert!(x.children().is_empty());
        assert!(x.is_basic());
        assert!(!and.is_basic());
    }

    #[test]
    fn test_compare_holds() {
        assert!(CompareOp::Le.holds(Ordering::Equal));
        assert!(!CompareOp::Lt.holds(Ordering::Equal));
        assert!(CompareOp::Ge.holds(Ordering::Greater));
    }

    #[test]
    fn test_combine_apply() {
        assert!(CombineOp::Union.apply(false, true));
        assert!(!CombineOp::Intersect.apply(false, true));
        assert!(CombineOp::Difference.apply(true, false));
        assert!(!CombineOp::Difference.apply(true, true));
    }
}
