//! Error types.
//!
//! Construction of a malformed expression is a programmer error: the smart
//! constructors in [`Context`][crate::context::Context] panic with the
//! message of a [`TypeError`]. The same checks are exposed as fallible
//! queries (e.g. [`ObjectType::field_type`][crate::types::ObjectType::field_type])
//! so callers can validate input before building.

use thiserror::Error;

use crate::types::Type;

/// A type-level contract violation detected while building an expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("{op}: expected {expected}, found {found}")]
    Mismatch { op: &'static str, expected: Type, found: Type },

    #[error("{op}: operand types differ ({lhs} vs {rhs})")]
    OperandMismatch { op: &'static str, lhs: Type, rhs: Type },

    #[error("{op} is not supported for type {ty}")]
    Unsupported { op: &'static str, ty: Type },

    #[error("field `{field}` not found on type {ty}")]
    FieldNotFound { ty: String, field: String },

    #[error("field `{field}` of {ty} has type {expected}, found {found}")]
    FieldMismatch {
        ty: String,
        field: String,
        expected: Type,
        found: Type,
    },

    #[error("missing value for field `{field}` of {ty}")]
    MissingField { ty: String, field: String },

    #[error("duplicate value for field `{field}` of {ty}")]
    DuplicateField { ty: String, field: String },

    #[error("invalid cast from {from} to {to}")]
    InvalidCast { from: Type, to: Type },

    #[error("type {0} cannot be used as a map key")]
    InvalidKey(Type),
}

/// Panics with the message of a contract violation, or returns the checked value.
#[track_caller]
pub(crate) fn contract<T>(result: Result<T, TypeError>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => panic!("contract violation: {}", e),
    }
}

/// A failure while interpreting an expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("no value assigned to parameter `{0}`")]
    UnboundParameter(String),

    #[error("argument placeholder #{0} is not bound by any enclosing lambda")]
    UnboundArgument(u64),

    #[error("value assigned to `{name}` does not have type {expected}")]
    AssignmentMismatch { name: String, expected: Type },

    #[error("type {0} has no default value")]
    NoDefault(Type),
}
