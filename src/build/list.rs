//! Bounded, finite lists.
//!
//! A list is either empty or a head in front of a tail. Lists are consumed
//! by [`list_case`][Context::list_case], which splits on these two shapes.

use log::debug;

use crate::context::Context;
use crate::error::{contract, TypeError};
use crate::node::{ConsCase, Expr, ExprKind};
use crate::types::Type;

fn elem_of<'a>(op: &'static str, ty: &'a Type) -> &'a Type {
    match ty.list_elem() {
        Some(elem) => elem,
        None => contract(Err(TypeError::Unsupported { op, ty: ty.clone() })),
    }
}

impl Context {
    /// The empty list of element type `elem`.
    pub fn list_empty(&self, elem: &Type) -> Expr {
        let ty = Type::list(elem.clone());
        self.tables.list_empty.get_or_add(ty.clone(), ty, |ty| {
            debug!("ListEmpty<{}>", ty);
            self.mk(ty, ExprKind::ListEmpty)
        })
    }

    /// The list `head :: tail`.
    pub fn list_add_front(&self, head: &Expr, tail: &Expr) -> Expr {
        let elem = elem_of("ListAddFront", tail.ty());
        contract(head.ty().expect("ListAddFront", elem));
        self.tables
            .list_add_front
            .get_or_add((head.id(), tail.id()), (head, tail), |(head, tail)| {
                debug!("ListAddFront({:?}, {:?})", head, tail);
                self.mk(
                    tail.ty().clone(),
                    ExprKind::ListAddFront {
                        head: head.clone(),
                        tail: tail.clone(),
                    },
                )
            })
    }

    /// The list of `items`, in order.
    pub fn list_from<'a>(&self, elem: &Type, items: impl IntoIterator<Item = &'a Expr>) -> Expr {
        let items: Vec<&Expr> = items.into_iter().collect();
        items
            .into_iter()
            .rev()
            .fold(self.list_empty(elem), |tail, head| self.list_add_front(head, &tail))
    }

    /// Splits `list` on its shape: `empty` when it has no elements, and
    /// `cons(head, tail)` otherwise.
    ///
    /// `cons` is invoked once, with placeholders standing for the head and
    /// the tail; the body it returns must have the type of `empty`.
    pub fn list_case<F>(&self, list: &Expr, empty: &Expr, cons: F) -> Expr
    where
        F: FnOnce(&Context, &Expr, &Expr) -> Expr,
    {
        let elem = elem_of("ListCase", list.ty()).clone();
        let head = self.argument(elem);
        let tail = self.argument(list.ty().clone());
        let body = cons(self, &head, &tail);
        self.list_case_with(list, empty, ConsCase { head, tail, body })
    }

    pub(crate) fn list_case_with(&self, list: &Expr, empty: &Expr, cons: ConsCase) -> Expr {
        elem_of("ListCase", list.ty());
        contract(Type::expect_same("ListCase", empty.ty(), cons.body.ty()));
        let key = (list.id(), empty.id(), cons.head.id(), cons.tail.id(), cons.body.id());
        self.tables
            .list_case
            .get_or_add(key, (list, empty, cons), |(list, empty, cons)| {
                debug!("ListCase({:?}, {:?}, {:?})", list, empty, cons.body);
                match list.kind() {
                    ExprKind::ListEmpty => {
                        debug!("case([], E, C) => E");
                        return empty.clone();
                    }
                    ExprKind::ListAddFront { head, tail } => {
                        debug!("case(h :: t, E, C) => C[h, t]");
                        return self.substitute(&cons.body, &[(&cons.head, head), (&cons.tail, tail)]);
                    }
                    _ => {}
                }
                self.mk(
                    empty.ty().clone(),
                    ExprKind::ListCase {
                        list: list.clone(),
                        empty: empty.clone(),
                        cons,
                    },
                )
            })
    }

    pub fn list_is_empty(&self, list: &Expr) -> Expr {
        self.list_case(list, &self.bool(true), |ctx, _, _| ctx.bool(false))
    }

    /// The first element, if any.
    pub fn list_head(&self, list: &Expr) -> Expr {
        let elem = elem_of("ListHead", list.ty()).clone();
        self.list_case(list, &self.none(&elem), |ctx, head, _| ctx.some(head))
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_list_building() {
        let ctx = Context::default();
        let items = [ctx.int32(1), ctx.int32(2)];
        let l = ctx.list_from(&Type::int32(), &items);
        assert_eq!(l.ty(), &Type::list(Type::int32()));
        let expected = ctx.list_add_front(
            &ctx.int32(1),
            &ctx.list_add_front(&ctx.int32(2), &ctx.list_empty(&Type::int32())),
        );
        assert!(l.ptr_eq(&expected));
    }

    #[test]
    fn test_case_on_empty() {
        let ctx = Context::default();
        let empty = ctx.list_empty(&Type::Char);
        assert!(ctx.list_is_empty(&empty).is_true());
        let h = ctx.list_head(&empty);
        assert!(ctx.option_has_value(&h).is_false());
    }

    #[test]
    fn test_case_on_cons_substitutes() {
        let ctx = Context::default();
        let x = ctx.symbolic("x", Type::Char);
        let l = ctx.list_from(&Type::Char, [&x, &ctx.char('b')]);
        assert!(ctx.list_is_empty(&l).is_false());

        let h = ctx.list_head(&l);
        assert!(ctx.option_value(&h).ptr_eq(&x));

        // The tail is bound too.
        let second = ctx.list_case(&l, &ctx.char('?'), |ctx, _, tail| {
            ctx.list_case(tail, &ctx.char('?'), |_, head, _| head.clone())
        });
        assert!(second.ptr_eq(&ctx.char('b')));
    }

    #[test]
    fn test_case_on_symbolic() {
        let ctx = Context::default();
        let l = ctx.symbolic("l", Type::list(Type::BigInt));
        let e = ctx.list_is_empty(&l);
        match e.kind() {
            ExprKind::ListCase { list, empty, cons } => {
                assert_eq!(list, &l);
                assert!(empty.is_true());
                assert!(cons.body.is_false());
            }
            _ => panic!("expected a list case"),
        }
    }

    #[test]
    #[should_panic(expected = "ListAddFront: expected i32, found bool")]
    fn test_add_front_type_mismatch() {
        let ctx = Context::default();
        let l = ctx.list_empty(&Type::int32());
        ctx.list_add_front(&ctx.bool(true), &l);
    }
}
