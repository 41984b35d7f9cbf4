//! Construction context.
//!
//! A [`Context`] owns one [`InternTable`] per node kind and is the only way to
//! build expressions: every smart constructor is a method on it (see the
//! [`build`][crate::build] module). Dropping a context releases all of its
//! tables, so independent sessions in one process do not share (or leak)
//! interned nodes.
//!
//! A context is `Sync`: expressions may be built from many threads at once.
//!
//! ```
//! use zen_rs::context::Context;
//! use zen_rs::types::Type;
//!
//! let ctx = Context::default();
//! let x = ctx.symbolic("x", Type::Bool);
//! let y = ctx.symbolic("y", Type::Bool);
//!
//! // Equal requests yield the very same node:
//! let f = ctx.and(&x, &y);
//! assert!(f.ptr_eq(&ctx.and(&x, &y)));
//!
//! // Simplification happens at construction time:
//! assert!(ctx.and(&x, &ctx.bool(true)).ptr_eq(&x));
//! ```

use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::debug;

use crate::node::{ArithOp, BitwiseOp, CombineOp, CompareOp, Expr, ExprId, ExprKind, LogicalOp};
use crate::table::{InternTable, TableStats};
use crate::types::{Name, ObjectType, Type};
use crate::value::Value;

/// Construction settings, fixed for the lifetime of a [`Context`].
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Settings {
    /// Keep explicit conditionals: disables rewriting `if` with a boolean
    /// literal branch into `and`/`or`, and `if(g, e, e) => e`.
    pub preserve_branches: bool,
}

pub(crate) type Key1 = ExprId;
pub(crate) type Key2 = (ExprId, ExprId);
pub(crate) type Key3 = (ExprId, ExprId, ExprId);

pub(crate) struct Tables {
    pub constant: InternTable<Value, Expr>,
    pub not: InternTable<Key1, Expr>,
    pub logical: InternTable<(LogicalOp, ExprId, ExprId), Expr>,
    pub ite: InternTable<Key3, Expr>,
    pub arith: InternTable<(ArithOp, ExprId, ExprId), Expr>,
    pub bit_not: InternTable<Key1, Expr>,
    pub bitwise: InternTable<(BitwiseOp, ExprId, ExprId), Expr>,
    pub equals: InternTable<Key2, Expr>,
    pub compare: InternTable<(CompareOp, ExprId, ExprId), Expr>,
    pub cast: InternTable<(ExprId, Type), Expr>,
    pub create_object: InternTable<(Arc<ObjectType>, Vec<ExprId>), Expr>,
    pub get_field: InternTable<(ExprId, Name), Expr>,
    pub with_field: InternTable<(ExprId, Name, ExprId), Expr>,
    pub list_empty: InternTable<Type, Expr>,
    pub list_add_front: InternTable<Key2, Expr>,
    pub list_case: InternTable<(ExprId, ExprId, ExprId, ExprId, ExprId), Expr>,
    pub seq_empty: InternTable<Type, Expr>,
    pub seq_unit: InternTable<Key1, Expr>,
    pub seq_concat: InternTable<Key2, Expr>,
    pub seq_length: InternTable<Key1, Expr>,
    pub seq_at: InternTable<Key2, Expr>,
    pub seq_contains: InternTable<Key2, Expr>,
    pub seq_index_of: InternTable<Key3, Expr>,
    pub seq_slice: InternTable<Key3, Expr>,
    pub seq_replace_first: InternTable<Key3, Expr>,
    pub map_empty: InternTable<Type, Expr>,
    pub map_set: InternTable<Key3, Expr>,
    pub map_get: InternTable<Key2, Expr>,
    pub map_delete: InternTable<Key2, Expr>,
    pub map_combine: InternTable<(CombineOp, ExprId, ExprId), Expr>,
    pub lambda: InternTable<Key2, Expr>,
    pub apply: InternTable<Key2, Expr>,
}

impl Tables {
    fn new() -> Self {
        Self {
            constant: InternTable::new("constant"),
            not: InternTable::new("not"),
            logical: InternTable::new("logical"),
            ite: InternTable::new("if"),
            arith: InternTable::new("arith"),
            bit_not: InternTable::new("bit_not"),
            bitwise: InternTable::new("bitwise"),
            equals: InternTable::new("equals"),
            compare: InternTable::new("compare"),
            cast: InternTable::new("cast"),
            create_object: InternTable::new("create_object"),
            get_field: InternTable::new("get_field"),
            with_field: InternTable::new("with_field"),
            list_empty: InternTable::new("list_empty"),
            list_add_front: InternTable::new("list_add_front"),
            list_case: InternTable::new("list_case"),
            seq_empty: InternTable::new("seq_empty"),
            seq_unit: InternTable::new("seq_unit"),
            seq_concat: InternTable::new("seq_concat"),
            seq_length: InternTable::new("seq_length"),
            seq_at: InternTable::new("seq_at"),
            seq_contains: InternTable::new("seq_contains"),
            seq_index_of: InternTable::new("seq_index_of"),
            seq_slice: InternTable::new("seq_slice"),
            seq_replace_first: InternTable::new("seq_replace_first"),
            map_empty: InternTable::new("map_empty"),
            map_set: InternTable::new("map_set"),
            map_get: InternTable::new("map_get"),
            map_delete: InternTable::new("map_delete"),
            map_combine: InternTable::new("map_combine"),
            lambda: InternTable::new("lambda"),
            apply: InternTable::new("apply"),
        }
    }

    fn stats(&self) -> Vec<TableStats> {
        vec![
            self.constant.stats(),
            self.not.stats(),
            self.logical.stats(),
            self.ite.stats(),
            self.arith.stats(),
            self.bit_not.stats(),
            self.bitwise.stats(),
            self.equals.stats(),
            self.compare.stats(),
            self.cast.stats(),
            self.create_object.stats(),
            self.get_field.stats(),
            self.with_field.stats(),
            self.list_empty.stats(),
            self.list_add_front.stats(),
            self.list_case.stats(),
            self.seq_empty.stats(),
            self.seq_unit.stats(),
            self.seq_concat.stats(),
            self.seq_length.stats(),
            self.seq_at.stats(),
            self.seq_contains.stats(),
            self.seq_index_of.stats(),
            self.seq_slice.stats(),
            self.seq_replace_first.stats(),
            self.map_empty.stats(),
            self.map_set.stats(),
            self.map_get.stats(),
            self.map_delete.stats(),
            self.map_combine.stats(),
            self.lambda.stats(),
            self.apply.stats(),
        ]
    }
}

/// Owner of all intern tables; entry point of every expression construction.
pub struct Context {
    settings: Settings,
    pub(crate) tables: Tables,
    next_arbitrary: AtomicU64,
    next_argument: AtomicU64,
}

impl Context {
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    pub fn with_settings(settings: Settings) -> Self {
        debug!("new context with {:?}", settings);
        Self {
            settings,
            tables: Tables::new(),
            next_arbitrary: AtomicU64::new(0),
            next_argument: AtomicU64::new(0),
        }
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    /// Statistics of every intern table.
    pub fn stats(&self) -> Vec<TableStats> {
        self.tables.stats()
    }

    /// Total number of interned entries over all tables.
    pub fn size(&self) -> usize {
        self.stats().iter().map(|s| s.len).sum()
    }

    /// Allocates a new node. Callers are responsible for interning it.
    pub(crate) fn mk(&self, ty: Type, kind: ExprKind) -> Expr {
        Expr::alloc(ty, kind)
    }

    /// A fresh free symbolic variable with a generated name.
    pub fn arbitrary(&self, ty: Type) -> Expr {
        let n = self.next_arbitrary.fetch_add(1, Ordering::Relaxed);
        self.symbolic(format!("arbitrary{}", n), ty)
    }

    /// A fresh free symbolic variable.
    ///
    /// Symbolic variables are not interned: every call yields a distinct
    /// variable, even for the same name.
    pub fn symbolic(&self, name: impl Into<String>, ty: Type) -> Expr {
        let name = name.into();
        debug!("symbolic({}: {})", name, ty);
        self.mk(ty, ExprKind::Arbitrary { name })
    }

    /// A fresh named input, bound at evaluation time.
    pub fn parameter(&self, name: impl Into<String>, ty: Type) -> Expr {
        let name = name.into();
        debug!("parameter({}: {})", name, ty);
        self.mk(ty, ExprKind::Parameter { name })
    }

    /// A fresh placeholder, bound by a lambda or a list case.
    pub(crate) fn argument(&self, ty: Type) -> Expr {
        let index = self.next_argument.fetch_add(1, Ordering::Relaxed);
        self.mk(ty, ExprKind::Argument { index })
    }
}

impl Default for Context {
    fn default() -> Self {
        Context::new()
    }
}

impl Debug for Context {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("settings", &self.settings)
            .field("size", &self.size())
            .finish()
    }
}
