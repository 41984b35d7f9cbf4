//! Records and the built-in `Option<T>` record.
//!
//! Field values of a [`CreateObject`][ExprKind::CreateObject] node are stored
//! in the schema's name order, whatever order they were given in.

use std::sync::Arc;

use log::debug;

use crate::context::Context;
use crate::error::{contract, TypeError};
use crate::node::{Expr, ExprId, ExprKind};
use crate::types::{Name, ObjectType, Type};

const HAS_VALUE: &str = "HasValue";
const VALUE: &str = "Value";

fn schema_of<'a>(op: &'static str, ty: &'a Type) -> &'a Arc<ObjectType> {
    match ty.as_object() {
        Some(schema) => schema,
        None => contract(Err(TypeError::Unsupported { op, ty: ty.clone() })),
    }
}

impl Context {
    /// Creates a record of type `ty` from `(field, value)` pairs, in any order.
    ///
    /// # Panics
    ///
    /// Panics if `ty` is not a record type, or if a field is unknown,
    /// duplicated, missing, or given a value of the wrong type.
    pub fn create<'a>(&self, ty: &Type, fields: impl IntoIterator<Item = (&'a str, Expr)>) -> Expr {
        let schema = schema_of("Create", ty);
        let mut slots: Vec<Option<Expr>> = vec![None; schema.fields().len()];
        for (field, value) in fields {
            let i = contract(schema.check_field(field, value.ty()));
            if slots[i].replace(value).is_some() {
                contract::<()>(Err(TypeError::DuplicateField {
                    ty: schema.name().to_string(),
                    field: field.to_string(),
                }));
            }
        }
        let values = slots
            .into_iter()
            .zip(schema.fields())
            .map(|(slot, (name, _))| match slot {
                Some(value) => value,
                None => contract(Err(TypeError::MissingField {
                    ty: schema.name().to_string(),
                    field: name.to_string(),
                })),
            })
            .collect();
        self.create_object_sorted(schema, values)
    }

    /// Creates a record from field values already in the schema's name order.
    pub(crate) fn create_object_sorted(&self, schema: &Arc<ObjectType>, fields: Vec<Expr>) -> Expr {
        debug_assert_eq!(fields.len(), schema.fields().len());
        let key: (Arc<ObjectType>, Vec<ExprId>) = (schema.clone(), fields.iter().map(Expr::id).collect());
        self.tables.create_object.get_or_add(key, fields, |fields| {
            debug!("Create<{}>({:?})", schema.name(), fields);

            // create(T, f = get(o, f), ...) => o
            if let Some(first) = fields.first() {
                if let ExprKind::GetField { object, .. } = first.kind() {
                    let eta = object.ty().as_object() == Some(schema)
                        && fields.iter().zip(schema.fields()).all(|(value, (name, _))| {
                            matches!(value.kind(), ExprKind::GetField { object: o, field } if o == object && field == name)
                        });
                    if eta {
                        debug!("create(get(o, f)...) => o");
                        return object.clone();
                    }
                }
            }

            self.mk(
                Type::Object(schema.clone()),
                ExprKind::CreateObject {
                    schema: schema.clone(),
                    fields,
                },
            )
        })
    }

    pub fn get_field(&self, object: &Expr, field: &str) -> Expr {
        let schema = schema_of("GetField", object.ty());
        let i = contract(schema.field_index(field));
        let (name, ty) = &schema.fields()[i];
        self.tables
            .get_field
            .get_or_add((object.id(), name.clone()), object, |object| {
                debug!("GetField({:?}, {})", object, name);
                match object.kind() {
                    ExprKind::CreateObject { fields, .. } => {
                        debug!("get(create(.., f = v, ..), f) => v");
                        return fields[i].clone();
                    }
                    ExprKind::WithField { object: inner, field: f, value } => {
                        if f == name {
                            debug!("get(with(o, f, v), f) => v");
                            return value.clone();
                        }
                        debug!("get(with(o, g, v), f) => get(o, f)");
                        return self.get_field(inner, name);
                    }
                    _ => {}
                }
                self.mk(
                    ty.clone(),
                    ExprKind::GetField {
                        object: object.clone(),
                        field: name.clone(),
                    },
                )
            })
    }

    /// A copy of `object` with `field` replaced by `value`.
    pub fn with_field(&self, object: &Expr, field: &str, value: &Expr) -> Expr {
        let schema = schema_of("WithField", object.ty());
        let i = contract(schema.check_field(field, value.ty()));
        let name: &Name = &schema.fields()[i].0;
        self.tables.with_field.get_or_add(
            (object.id(), name.clone(), value.id()),
            (object, value),
            |(object, value)| {
                debug!("WithField({:?}, {}, {:?})", object, name, value);
                match object.kind() {
                    ExprKind::CreateObject { fields, .. } => {
                        debug!("with(create(.., f = _, ..), f, v) => create(.., f = v, ..)");
                        let mut fields = fields.clone();
                        fields[i] = value.clone();
                        return self.create_object_sorted(schema, fields);
                    }
                    ExprKind::WithField { object: inner, field: f, .. } if f == name => {
                        debug!("with(with(o, f, _), f, v) => with(o, f, v)");
                        return self.with_field(inner, name, value);
                    }
                    _ => {}
                }
                if let ExprKind::GetField { object: o, field: f } = value.kind() {
                    if o == object && f == name {
                        debug!("with(o, f, get(o, f)) => o");
                        return object.clone();
                    }
                }
                self.mk(
                    object.ty().clone(),
                    ExprKind::WithField {
                        object: object.clone(),
                        field: name.clone(),
                        value: value.clone(),
                    },
                )
            },
        )
    }

    /// `Some(value)`.
    pub fn some(&self, value: &Expr) -> Expr {
        let ty = Type::option(value.ty().clone());
        self.create(&ty, [(HAS_VALUE, self.bool(true)), (VALUE, value.clone())])
    }

    /// `None` of element type `elem`, holding the default value of `elem`.
    pub fn none(&self, elem: &Type) -> Expr {
        let ty = Type::option(elem.clone());
        self.create(&ty, [(HAS_VALUE, self.bool(false)), (VALUE, self.default_value(elem))])
    }

    pub fn option_has_value(&self, option: &Expr) -> Expr {
        self.get_field(option, HAS_VALUE)
    }

    pub fn option_value(&self, option: &Expr) -> Expr {
        self.get_field(option, VALUE)
    }

    /// The value held by `option`, or `default` when it is empty.
    pub fn option_value_or(&self, option: &Expr, default: &Expr) -> Expr {
        self.ite(&self.option_has_value(option), &self.option_value(option), default)
    }
}
