//! Logical result types of expressions.
//!
//! Every [`Expr`][crate::node::Expr] carries a [`Type`] describing the value it
//! denotes. Types are checked eagerly by the smart constructors, so a node
//! that exists is always well-typed.
//!
//! Records are described by an [`ObjectType`] schema whose fields are kept
//! sorted by name. This fixes the order in which record children are
//! presented to every traversal, and therefore the intern key of record
//! construction nodes.

use std::fmt;
use std::sync::Arc;

use crate::error::TypeError;

/// Shared field name.
pub type Name = Arc<str>;

/// A fixed-width integer representation.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct IntType {
    bits: u32,
    signed: bool,
}

impl IntType {
    pub const I8: IntType = IntType::new(8, true);
    pub const I16: IntType = IntType::new(16, true);
    pub const I32: IntType = IntType::new(32, true);
    pub const I64: IntType = IntType::new(64, true);
    pub const U8: IntType = IntType::new(8, false);
    pub const U16: IntType = IntType::new(16, false);
    pub const U32: IntType = IntType::new(32, false);
    pub const U64: IntType = IntType::new(64, false);

    /// Creates a new integer type.
    ///
    /// # Panics
    ///
    /// Panics if `bits` is not one of 8, 16, 32 or 64.
    pub const fn new(bits: u32, signed: bool) -> Self {
        assert!(
            bits == 8 || bits == 16 || bits == 32 || bits == 64,
            "Integer width must be 8, 16, 32 or 64"
        );
        Self { bits, signed }
    }

    pub const fn bits(self) -> u32 {
        self.bits
    }

    pub const fn is_signed(self) -> bool {
        self.signed
    }

    /// Mask selecting the low `bits` bits.
    pub const fn mask(self) -> u64 {
        if self.bits == 64 {
            u64::MAX
        } else {
            (1u64 << self.bits) - 1
        }
    }
}

impl fmt::Display for IntType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", if self.signed { "i" } else { "u" }, self.bits)
    }
}

/// Schema of a record type: a name and its fields, sorted by name.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct ObjectType {
    name: String,
    fields: Vec<(Name, Type)>,
}

impl ObjectType {
    /// Creates a record schema.
    ///
    /// # Panics
    ///
    /// Panics if the same field name is given twice.
    pub fn new<'a>(name: impl Into<String>, fields: impl IntoIterator<Item = (&'a str, Type)>) -> Self {
        let name = name.into();
        let mut fields: Vec<(Name, Type)> = fields.into_iter().map(|(n, t)| (Name::from(n), t)).collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));
        for pair in fields.windows(2) {
            assert_ne!(pair[0].0, pair[1].0, "Duplicate field `{}` in type {}", pair[0].0, name);
        }
        Self { name, fields }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in name order.
    pub fn fields(&self) -> &[(Name, Type)] {
        &self.fields
    }

    /// Position of the field in name order.
    pub fn field_index(&self, field: &str) -> Result<usize, TypeError> {
        self.fields
            .binary_search_by(|(n, _)| (**n).cmp(field))
            .map_err(|_| TypeError::FieldNotFound {
                ty: self.name.clone(),
                field: field.to_string(),
            })
    }

    /// Declared type of the field.
    pub fn field_type(&self, field: &str) -> Result<&Type, TypeError> {
        let i = self.field_index(field)?;
        Ok(&self.fields[i].1)
    }

    /// Check that `field` exists and accepts a value of type `ty`.
    pub fn check_field(&self, field: &str, ty: &Type) -> Result<usize, TypeError> {
        let i = self.field_index(field)?;
        let expected = &self.fields[i].1;
        if expected != ty {
            return Err(TypeError::FieldMismatch {
                ty: self.name.clone(),
                field: field.to_string(),
                expected: expected.clone(),
                found: ty.clone(),
            });
        }
        Ok(i)
    }
}

/// Logical type of an expression.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Type {
    Bool,
    Int(IntType),
    BigInt,
    /// Arbitrary-precision rational.
    Real,
    Char,
    /// Unbounded sequence.
    Seq(Arc<Type>),
    /// Bounded finite list.
    List(Arc<Type>),
    Map(Arc<Type>, Arc<Type>),
    Object(Arc<ObjectType>),
    Fun(Arc<Type>, Arc<Type>),
}

impl Type {
    pub fn int8() -> Self {
        Type::Int(IntType::I8)
    }
    pub fn int16() -> Self {
        Type::Int(IntType::I16)
    }
    pub fn int32() -> Self {
        Type::Int(IntType::I32)
    }
    pub fn int64() -> Self {
        Type::Int(IntType::I64)
    }
    pub fn uint8() -> Self {
        Type::Int(IntType::U8)
    }
    pub fn uint16() -> Self {
        Type::Int(IntType::U16)
    }
    pub fn uint32() -> Self {
        Type::Int(IntType::U32)
    }
    pub fn uint64() -> Self {
        Type::Int(IntType::U64)
    }

    /// Sequence of characters.
    pub fn string() -> Self {
        Type::seq(Type::Char)
    }

    pub fn seq(elem: Type) -> Self {
        Type::Seq(Arc::new(elem))
    }

    pub fn list(elem: Type) -> Self {
        Type::List(Arc::new(elem))
    }

    pub fn map(key: Type, value: Type) -> Self {
        Type::Map(Arc::new(key), Arc::new(value))
    }

    /// A set is a map to booleans.
    pub fn set(elem: Type) -> Self {
        Type::map(elem, Type::Bool)
    }

    pub fn fun(arg: Type, ret: Type) -> Self {
        Type::Fun(Arc::new(arg), Arc::new(ret))
    }

    pub fn object(schema: ObjectType) -> Self {
        Type::Object(Arc::new(schema))
    }

    /// The built-in `Option<T>` record, with fields `HasValue` and `Value`.
    pub fn option(elem: Type) -> Self {
        let name = format!("Option<{}>", elem);
        Type::object(ObjectType::new(name, [("HasValue", Type::Bool), ("Value", elem)]))
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Type::Bool)
    }

    pub fn is_fixed_int(&self) -> bool {
        matches!(self, Type::Int(_))
    }

    /// Fixed-width or arbitrary-precision integer.
    pub fn is_integer(&self) -> bool {
        matches!(self, Type::Int(_) | Type::BigInt)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int(_) | Type::BigInt | Type::Real)
    }

    /// Types with a total order usable by comparisons.
    pub fn is_ordered(&self) -> bool {
        self.is_numeric() || matches!(self, Type::Char)
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Type::Seq(elem) if **elem == Type::Char)
    }

    pub fn as_object(&self) -> Option<&Arc<ObjectType>> {
        match self {
            Type::Object(schema) => Some(schema),
            _ => None,
        }
    }

    pub fn seq_elem(&self) -> Option<&Type> {
        match self {
            Type::Seq(elem) => Some(elem),
            _ => None,
        }
    }

    pub fn list_elem(&self) -> Option<&Type> {
        match self {
            Type::List(elem) => Some(elem),
            _ => None,
        }
    }

    pub fn map_types(&self) -> Option<(&Type, &Type)> {
        match self {
            Type::Map(k, v) => Some((k, v)),
            _ => None,
        }
    }

    pub fn fun_types(&self) -> Option<(&Type, &Type)> {
        match self {
            Type::Fun(a, r) => Some((a, r)),
            _ => None,
        }
    }

    /// Whether values of this type may be used as map keys.
    pub fn check_key(&self) -> Result<(), TypeError> {
        match self {
            Type::Bool | Type::Int(_) | Type::BigInt | Type::Real | Type::Char => Ok(()),
            Type::Seq(elem) | Type::List(elem) => elem.check_key().map_err(|_| TypeError::InvalidKey(self.clone())),
            Type::Object(schema) => {
                for (_, ty) in schema.fields() {
                    ty.check_key().map_err(|_| TypeError::InvalidKey(self.clone()))?;
                }
                Ok(())
            }
            Type::Map(..) | Type::Fun(..) => Err(TypeError::InvalidKey(self.clone())),
        }
    }

    pub(crate) fn expect(&self, op: &'static str, expected: &Type) -> Result<(), TypeError> {
        if self == expected {
            Ok(())
        } else {
            Err(TypeError::Mismatch {
                op,
                expected: expected.clone(),
                found: self.clone(),
            })
        }
    }

    pub(crate) fn expect_same(op: &'static str, lhs: &Type, rhs: &Type) -> Result<(), TypeError> {
        if lhs == rhs {
            Ok(())
        } else {
            Err(TypeError::OperandMismatch {
                op,
                lhs: lhs.clone(),
                rhs: rhs.clone(),
            })
        }
    }
}

impl From<IntType> for Type {
    fn from(ty: IntType) -> Self {
        Type::Int(ty)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Bool => write!(f, "bool"),
            Type::Int(ty) => write!(f, "{}", ty),
            Type::BigInt => write!(f, "bigint"),
            Type::Real => write!(f, "real"),
            Type::Char => write!(f, "char"),
            Type::Seq(elem) if **elem == Type::Char => write!(f, "string"),
            Type::Seq(elem) => write!(f, "Seq<{}>", elem),
            Type::List(elem) => write!(f, "List<{}>", elem),
            Type::Map(k, v) => write!(f, "Map<{}, {}>", k, v),
            Type::Object(schema) => write!(f, "{}", schema.name()),
            Type::Fun(a, r) => write!(f, "Fn({}) -> {}", a, r),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point() -> ObjectType {
        ObjectType::new("Point", [("Y", Type::int32()), ("X", Type::int32())])
    }

    #[test]
    fn test_fields_sorted() {
        let p = point();
        let names: Vec<&str> = p.fields().iter().map(|(n, _)| &**n).collect();
        assert_eq!(names, vec!["X", "Y"]);
        assert_eq!(p.field_index("Y"), Ok(1));
    }

    #[test]
    fn test_field_errors() {
        let p = point();
        assert!(matches!(p.field_type("Z"), Err(TypeError::FieldNotFound { .. })));
        assert!(matches!(
            p.check_field("X", &Type::Bool),
            Err(TypeError::FieldMismatch { .. })
        ));
        assert_eq!(p.check_field("X", &Type::int32()), Ok(0));
    }

    #[test]
    #[should_panic(expected = "Duplicate field")]
    fn test_duplicate_field() {
        ObjectType::new("Bad", [("A", Type::Bool), ("A", Type::Char)]);
    }

    #[test]
    fn test_display() {
        assert_eq!(Type::uint8().to_string(), "u8");
        assert_eq!(Type::string().to_string(), "string");
        assert_eq!(Type::set(Type::int64()).to_string(), "Map<i64, bool>");
        assert_eq!(Type::option(Type::BigInt).to_string(), "Option<bigint>");
        assert_eq!(Type::fun(Type::Bool, Type::Real).to_string(), "Fn(bool) -> real");
    }

    #[test]
    fn test_option_schema() {
        let ty = Type::option(Type::Char);
        let schema = ty.as_object().unwrap();
        assert_eq!(schema.field_type("HasValue"), Ok(&Type::Bool));
        assert_eq!(schema.field_type("Value"), Ok(&Type::Char));
        assert_eq!(ty, Type::option(Type::Char));
    }

    #[test]
    fn test_keys() {
        assert!(Type::string().check_key().is_ok());
        assert!(Type::object(point()).check_key().is_ok());
        assert!(Type::set(Type::Bool).check_key().is_err());
    }
}
