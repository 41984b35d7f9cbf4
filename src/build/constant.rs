use log::debug;
use num_bigint::BigInt;
use num_rational::BigRational;

use crate::context::Context;
use crate::node::{Expr, ExprKind};
use crate::types::{IntType, Type};
use crate::value::Value;

impl Context {
    /// The interned literal `value`.
    pub fn constant(&self, value: impl Into<Value>) -> Expr {
        let value = value.into();
        self.tables.constant.get_or_add(value.clone(), value, |value| {
            debug!("constant({})", value);
            self.mk(value.ty(), ExprKind::Constant(value))
        })
    }

    pub fn bool(&self, b: bool) -> Expr {
        self.constant(b)
    }

    pub fn int(&self, ty: IntType, value: i128) -> Expr {
        self.constant(Value::int(ty, value))
    }

    pub fn int8(&self, value: i8) -> Expr {
        self.constant(value)
    }

    pub fn int16(&self, value: i16) -> Expr {
        self.constant(value)
    }

    pub fn int32(&self, value: i32) -> Expr {
        self.constant(value)
    }

    pub fn int64(&self, value: i64) -> Expr {
        self.constant(value)
    }

    pub fn uint8(&self, value: u8) -> Expr {
        self.constant(value)
    }

    pub fn uint16(&self, value: u16) -> Expr {
        self.constant(value)
    }

    pub fn uint32(&self, value: u32) -> Expr {
        self.constant(value)
    }

    pub fn uint64(&self, value: u64) -> Expr {
        self.constant(value)
    }

    pub fn bigint(&self, value: impl Into<BigInt>) -> Expr {
        self.constant(Value::BigInt(value.into()))
    }

    /// The rational literal `numer / denom`.
    ///
    /// # Panics
    ///
    /// Panics if `denom` is zero.
    pub fn real(&self, numer: i64, denom: i64) -> Expr {
        assert_ne!(denom, 0, "Denominator must be non-zero");
        self.constant(BigRational::new(BigInt::from(numer), BigInt::from(denom)))
    }

    pub fn char(&self, c: char) -> Expr {
        self.constant(c)
    }

    /// The default value of a type: zero, `false`, `'\0'`, empty collections,
    /// a record of defaults, or a constant function returning a default.
    pub fn default_value(&self, ty: &Type) -> Expr {
        if let Some(value) = Value::default_for(ty) {
            return self.constant(value);
        }
        match ty {
            Type::Seq(elem) => self.seq_empty(elem),
            Type::List(elem) => self.list_empty(elem),
            Type::Map(k, v) => self.map_empty(k, v),
            Type::Object(schema) => {
                let fields = schema.fields().iter().map(|(_, t)| self.default_value(t)).collect();
                self.create_object_sorted(schema, fields)
            }
            Type::Fun(arg, ret) => self.lambda(arg, |ctx, _| ctx.default_value(ret)),
            _ => unreachable!("primitive type {} has a default literal", ty),
        }
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::types::ObjectType;

    #[test]
    fn test_constants_interned() {
        let ctx = Context::default();
        assert!(ctx.int32(7).ptr_eq(&ctx.int32(7)));
        assert!(!ctx.int32(7).ptr_eq(&ctx.int64(7)));
        assert!(ctx.bigint(3).ptr_eq(&ctx.constant(Value::BigInt(BigInt::from(3)))));
        assert!(ctx.real(2, 4).ptr_eq(&ctx.real(1, 2)));
        assert_eq!(ctx.uint8(200).ty(), &Type::uint8());
        assert_eq!(ctx.char('z').as_constant(), Some(&Value::Char('z')));
    }

    #[test]
    fn test_default_values() {
        let ctx = Context::default();
        assert!(ctx.default_value(&Type::Bool).is_false());
        assert!(ctx.default_value(&Type::int16()).ptr_eq(&ctx.int16(0)));
        assert!(ctx.default_value(&Type::string()).ptr_eq(&ctx.string("")));
        assert!(ctx.default_value(&Type::list(Type::Char)).ptr_eq(&ctx.list_empty(&Type::Char)));

        let point = Type::object(ObjectType::new("Point", [("X", Type::int32()), ("Y", Type::int32())]));
        let p = ctx.default_value(&point);
        assert_eq!(p.ty(), &point);
        assert!(ctx.get_field(&p, "Y").ptr_eq(&ctx.int32(0)));

        let f = ctx.default_value(&Type::fun(Type::Char, Type::BigInt));
        assert_eq!(f.ty(), &Type::fun(Type::Char, Type::BigInt));
        assert!(ctx.apply(&f, &ctx.char('a')).ptr_eq(&ctx.bigint(0)));
    }
}
