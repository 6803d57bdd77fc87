//! Statement elaboration and the `for` loop lowering.

use gullian_diagnostic::Result;
use gullian_ir::ast::{Body, Call, Expr, For, If, Stmt, VarDecl};
use gullian_ir::Name;
use gullian_types::typed::{TypedBody, TypedElse, TypedExpr, TypedExprKind, TypedIf, TypedStmt};
use gullian_types::TypeId;

use crate::compat::compatible;
use crate::resolve::Member;
use crate::Checker;

impl<'ctx> Checker<'ctx> {
    pub(crate) fn check_body(&mut self, body: &Body, return_ty: TypeId) -> Result<TypedBody> {
        let mut stmts = Vec::with_capacity(body.stmts.len());
        for stmt in &body.stmts {
            match stmt {
                Stmt::Let(decl) => stmts.push(self.check_variable_declaration(decl)?),
                Stmt::Assign { target, op, value } => {
                    stmts.push(self.check_assignment(target, *op, value)?);
                }
                Stmt::If(if_) => stmts.push(TypedStmt::If(self.check_if(if_, return_ty)?)),
                Stmt::While { cond, body } => stmts.push(self.check_while(cond, body, return_ty)?),
                Stmt::For(for_) => stmts.extend(self.check_for(for_, return_ty)?),
                Stmt::Return { value, line } => {
                    stmts.push(TypedStmt::Return(self.check_return(value, return_ty, *line)?));
                }
                Stmt::Break { .. } => stmts.push(TypedStmt::Break),
                Stmt::Continue { .. } => stmts.push(TypedStmt::Continue),
                Stmt::Expr(expr) => {
                    let typed = self.check_expression(expr, None)?;
                    stmts.push(TypedStmt::Expr(typed));
                }
            }
        }
        Ok(TypedBody { stmts })
    }

    pub(crate) fn check_variable_declaration(&mut self, decl: &VarDecl) -> Result<TypedStmt> {
        let (ty, value) = match &decl.hint {
            None => {
                let value = self.check_expression(&decl.value, None)?;
                (value.ty, value)
            }
            Some(hint) => {
                let ty = self.import_type(hint)?;
                let value = self.check_expression(&decl.value, Some(ty))?;
                if !compatible(&self.ctx.pool, ty, value.ty) {
                    return Err(self.type_err(
                        format!(
                            "incompatible types for let {}, expected '{}', got '{}'",
                            decl.name,
                            self.ctx.pool.display(ty),
                            self.ctx.pool.display(value.ty)
                        ),
                        decl.name.line,
                    ));
                }
                (ty, value)
            }
        };

        self.ctx
            .module_mut(self.module)
            .scope
            .bind_variable(decl.name.clone(), ty);

        Ok(TypedStmt::Let {
            name: decl.name.clone(),
            ty,
            value,
        })
    }

    fn check_assignment(
        &mut self,
        target: &Expr,
        op: gullian_ir::ast::AssignOp,
        value: &Expr,
    ) -> Result<TypedStmt> {
        let line = target.line();
        let target_typed = match target {
            Expr::Name(name) => {
                let Some(binding) = self.ctx.module(self.module).scope.variables.get(name) else {
                    return Err(self.name_err(
                        format!("variable {name} not found in current scope"),
                        name.line,
                    ));
                };
                let ty = binding.ty;
                TypedExpr::new(TypedExprKind::Var(name.clone()), ty)
            }
            // Writing a union variant initializes it, so the target side
            // is exempt from the guard requirement.
            Expr::Attribute { left, right } => self.check_attribute(left, right, true)?,
            Expr::Subscript { head, items } => self.check_subscript(head, items)?,
            other => {
                return Err(self.type_err(format!("cannot assign to {other}"), line));
            }
        };

        let value_typed = self.check_expression(value, Some(target_typed.ty))?;
        if !compatible(&self.ctx.pool, target_typed.ty, value_typed.ty) {
            return Err(self.type_err(
                format!(
                    "type mismatch, variable or field '{target}' expects '{}', got a '{}'",
                    self.ctx.pool.display(target_typed.ty),
                    self.ctx.pool.display(value_typed.ty)
                ),
                line,
            ));
        }

        Ok(TypedStmt::Assign {
            target: target_typed,
            op,
            value: value_typed,
        })
    }

    fn check_if(&mut self, if_: &If, return_ty: TypeId) -> Result<TypedIf> {
        let cond = self.check_expression(&if_.cond, None)?;

        // A test-guard condition proves its variant for the true branch
        // only.
        let then_body = self.with_scope(|checker| {
            checker.push_guard_of(&cond);
            checker.check_body(&if_.then_body, return_ty)
        })?;

        let else_body = match &if_.else_body {
            None => None,
            Some(gullian_ir::ast::ElseArm::Else(body)) => Some(TypedElse::Else(
                self.with_scope(|checker| checker.check_body(body, return_ty))?,
            )),
            Some(gullian_ir::ast::ElseArm::Elif(elif)) => {
                Some(TypedElse::Elif(Box::new(self.check_if(elif, return_ty)?)))
            }
        };

        Ok(TypedIf {
            cond,
            then_body,
            else_body,
        })
    }

    fn check_while(&mut self, cond: &Expr, body: &Body, return_ty: TypeId) -> Result<TypedStmt> {
        let cond = self.check_expression(cond, None)?;
        // Like `if`, a guarded condition holds inside the loop body; the
        // `for` lowering depends on this.
        let body = self.with_scope(|checker| {
            checker.push_guard_of(&cond);
            checker.check_body(body, return_ty)
        })?;
        Ok(TypedStmt::While { cond, body })
    }

    fn push_guard_of(&mut self, cond: &TypedExpr) {
        if let TypedExprKind::TestGuard {
            union_ty, variant, ..
        } = &cond.kind
        {
            let uid = self.ctx.pool.get(*union_ty).uid;
            let variant = variant.clone();
            self.ctx
                .module_mut(self.module)
                .scope
                .type_guards
                .push((uid, variant));
        }
    }

    /// Lower `for x in iter { body }` onto the iterator protocol:
    ///
    /// ```text
    /// let iter_N = iter
    /// let x = iter_N.next()
    /// while x.ok? { body; x = iter_N.next() }
    /// ```
    ///
    /// The synthesized statements are checked exactly like hand-written
    /// code; the iterator type is responsible for the Option-shaped
    /// `next`.
    fn check_for(&mut self, for_: &For, return_ty: TypeId) -> Result<Vec<TypedStmt>> {
        self.with_scope(|checker| {
            let line = for_.line;
            let iter_name = Name::new(format!("iter_{line}"), line);
            let next = Name::new("next", line);

            let iter_stmt = checker.check_variable_declaration(&VarDecl {
                name: iter_name.clone(),
                hint: None,
                value: for_.iter.clone(),
            })?;
            let TypedStmt::Let { ty: iter_ty, .. } = &iter_stmt else {
                return Err(checker.internal_err("for loop iterator did not bind", line));
            };

            if !matches!(checker.type_member(*iter_ty, &next), Some(Member::Method(_))) {
                return Err(checker.name_err(
                    format!(
                        "type `{}` does not provide a `fun next(...)` method, so it is not iterable",
                        checker.ctx.pool.display(*iter_ty)
                    ),
                    line,
                ));
            }

            let next_call = Expr::Call(Call {
                callee: Box::new(Expr::Attribute {
                    left: Box::new(Expr::Name(iter_name.clone())),
                    right: next.clone(),
                }),
                args: Vec::new(),
                generics: Vec::new(),
                line,
            });

            let target_stmt = checker.check_variable_declaration(&VarDecl {
                name: for_.target.clone(),
                hint: None,
                value: next_call.clone(),
            })?;

            let guard = Expr::TestGuard(Box::new(Expr::Attribute {
                left: Box::new(Expr::Name(for_.target.clone())),
                right: Name::new("ok", line),
            }));
            let cond = checker.check_expression(&guard, None)?;

            let body = checker.with_scope(|checker| {
                checker.push_guard_of(&cond);
                let mut body = checker.check_body(&for_.body, return_ty)?;
                let advance = checker.check_assignment(
                    &Expr::Name(for_.target.clone()),
                    gullian_ir::ast::AssignOp::Assign,
                    &next_call,
                )?;
                body.stmts.push(advance);
                Ok(body)
            })?;

            Ok(vec![iter_stmt, target_stmt, TypedStmt::While { cond, body }])
        })
    }

    fn check_return(&mut self, value: &Expr, return_ty: TypeId, line: u32) -> Result<TypedExpr> {
        let value = self.check_expression(value, Some(return_ty))?;
        if !compatible(&self.ctx.pool, value.ty, return_ty) {
            return Err(self.type_err(
                format!(
                    "incompatible types for return, function expects {} but a {} was provided",
                    self.ctx.pool.display(return_ty),
                    self.ctx.pool.display(value.ty)
                ),
                line,
            ));
        }
        Ok(value)
    }
}
