//! Single-argument functions.

use log::debug;

use crate::context::Context;
use crate::error::{contract, TypeError};
use crate::node::{Expr, ExprKind, Lambda};
use crate::types::Type;

impl Context {
    /// The function `x -> body(x)` over arguments of type `arg`.
    ///
    /// `body` is invoked once, with a placeholder standing for the argument.
    pub fn lambda<F>(&self, arg: &Type, body: F) -> Expr
    where
        F: FnOnce(&Context, &Expr) -> Expr,
    {
        let argument = self.argument(arg.clone());
        let body = body(self, &argument);
        self.lambda_with(Lambda { argument, body })
    }

    pub(crate) fn lambda_with(&self, lambda: Lambda) -> Expr {
        debug_assert!(matches!(lambda.argument.kind(), ExprKind::Argument { .. }));
        let key = (lambda.argument.id(), lambda.body.id());
        self.tables.lambda.get_or_add(key, lambda, |lambda| {
            debug!("Lambda({:?}, {:?})", lambda.argument, lambda.body);
            let ty = Type::fun(lambda.argument.ty().clone(), lambda.body.ty().clone());
            self.mk(ty, ExprKind::Lambda(lambda))
        })
    }

    /// Applies a function to an argument.
    pub fn apply(&self, lambda: &Expr, arg: &Expr) -> Expr {
        let (a, r) = match lambda.ty().fun_types() {
            Some(types) => types,
            None => contract(Err(TypeError::Unsupported {
                op: "Apply",
                ty: lambda.ty().clone(),
            })),
        };
        contract(arg.ty().expect("Apply", a));
        self.tables
            .apply
            .get_or_add((lambda.id(), arg.id()), (lambda, arg), |(lambda, arg)| {
                debug!("Apply({:?}, {:?})", lambda, arg);
                if let ExprKind::Lambda(Lambda { argument, body }) = lambda.kind() {
                    if body.as_constant().is_some() {
                        debug!("apply(x -> c, y) => c");
                        return body.clone();
                    }
                    if body == argument {
                        debug!("apply(x -> x, y) => y");
                        return arg.clone();
                    }
                }
                self.mk(
                    r.clone(),
                    ExprKind::Apply {
                        lambda: lambda.clone(),
                        arg: arg.clone(),
                    },
                )
            })
    }

    /// Applies `lambda` by substituting `arg` for its placeholder.
    pub fn beta_reduce(&self, lambda: &Expr, arg: &Expr) -> Expr {
        match lambda.kind() {
            ExprKind::Lambda(Lambda { argument, body }) => {
                contract(arg.ty().expect("Apply", argument.ty()));
                self.substitute(body, &[(argument, arg)])
            }
            _ => self.apply(lambda, arg),
        }
    }
}
