//! The comptime evaluator: a minimal tree walk over already-typed nodes.
//!
//! Supports literals, variable bindings, calls and `return`. The extern
//! `puts` is the one intrinsic: it prints its arguments at compile time
//! and yields `0 : int`. The result replaces the `comptime` node as a
//! typed constant.

use rustc_hash::FxHashMap;

use gullian_diagnostic::Result;
use gullian_ir::ast::Comptime;
use gullian_ir::{Literal, Name};
use gullian_types::typed::{TypedBody, TypedExpr, TypedExprKind, TypedStmt};
use gullian_types::{FnId, FunctionKind, TypeId};

use crate::Checker;

#[derive(Default)]
struct Env {
    vars: FxHashMap<Name, TypedExpr>,
}

impl<'ctx> Checker<'ctx> {
    pub(crate) fn check_comptime(&mut self, comptime: &Comptime) -> Result<TypedExpr> {
        let line = comptime.line();
        let mut env = Env::default();
        match comptime {
            Comptime::Expr(expr) => {
                let typed = self.check_expression(expr, None)?;
                self.comptime_eval(&typed, &mut env, line)
            }
            Comptime::Block(body) => {
                let typed = self.with_scope(|checker| checker.check_body(body, TypeId::VOID))?;
                self.comptime_eval_body(&typed, &mut env, line)
            }
        }
    }

    fn comptime_eval(&mut self, expr: &TypedExpr, env: &mut Env, line: u32) -> Result<TypedExpr> {
        match &expr.kind {
            TypedExprKind::Literal(_) => Ok(expr.clone()),
            TypedExprKind::Var(name) => env.vars.get(name).cloned().ok_or_else(|| {
                self.type_err(
                    format!("comptime: variable {name} is not a compile-time constant"),
                    line,
                )
            }),
            TypedExprKind::Call { func, args } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.comptime_eval(arg, env, line)?);
                }
                self.comptime_eval_call(*func, values, line)
            }
            _ => Err(self.type_err(
                "comptime supports literals, variable bindings, calls and return",
                line,
            )),
        }
    }

    fn comptime_eval_call(
        &mut self,
        func: FnId,
        args: Vec<TypedExpr>,
        line: u32,
    ) -> Result<TypedExpr> {
        let int_zero = TypedExpr::new(TypedExprKind::Literal(Literal::Int(0)), TypeId::INT);

        if self.ctx.function(func).is_extern() {
            if self.ctx.function(func).head.name.text() == "puts" {
                for arg in &args {
                    if let TypedExprKind::Literal(Literal::Str(text)) = &arg.kind {
                        println!("{text}");
                    } else if let TypedExprKind::Literal(value) = &arg.kind {
                        println!("{value}");
                    }
                }
            }
            return Ok(int_zero);
        }

        let (params, body) = {
            let function = self.ctx.function(func);
            let FunctionKind::User { typed, .. } = &function.kind else {
                return Ok(int_zero);
            };
            let Some(body) = typed.clone() else {
                return Err(self.type_err(
                    "comptime cannot call a function that has not been checked",
                    line,
                ));
            };
            let params: Vec<Name> = function
                .head
                .params
                .iter()
                .map(|(name, _)| name.clone())
                .collect();
            (params, body)
        };

        let mut env = Env::default();
        for (param, value) in params.into_iter().zip(args) {
            env.vars.insert(param, value);
        }
        self.comptime_eval_body(&body, &mut env, line)
    }

    fn comptime_eval_body(
        &mut self,
        body: &TypedBody,
        env: &mut Env,
        line: u32,
    ) -> Result<TypedExpr> {
        let mut result = TypedExpr::new(TypedExprKind::Literal(Literal::Int(0)), TypeId::VOID);

        for stmt in &body.stmts {
            match stmt {
                TypedStmt::Let { name, value, .. } => {
                    let value = self.comptime_eval(value, env, line)?;
                    env.vars.insert(name.clone(), value);
                }
                TypedStmt::Return(value) => return self.comptime_eval(value, env, line),
                TypedStmt::Expr(expr) => {
                    result = self.comptime_eval(expr, env, line)?;
                }
                _ => {
                    return Err(self.type_err(
                        "comptime supports literals, variable bindings, calls and return",
                        line,
                    ));
                }
            }
        }

        Ok(result)
    }
}
