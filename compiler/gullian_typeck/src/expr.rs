//! Expression elaboration: every untyped expression becomes a typed node.

use gullian_diagnostic::Result;
use gullian_ir::ast::{
    BinaryOp, Call, Expr, StructArg, StructLiteral, Switch, SwitchPattern, TypeExpr, UnaryOp,
};
use gullian_ir::{Literal, Name};
use gullian_types::typed::{TypedExpr, TypedExprKind, TypedSwitch};
use gullian_types::{TypeDecl, TypeId, TypeRef};

use crate::compat::compatible;
use crate::resolve::{Callee, Member};
use crate::Checker;

impl<'ctx> Checker<'ctx> {
    pub(crate) fn check_expression(
        &mut self,
        expr: &Expr,
        expected: Option<TypeId>,
    ) -> Result<TypedExpr> {
        match expr {
            Expr::Comptime(comptime) => self.check_comptime(comptime),
            Expr::Switch(switch) => self.check_switch(switch),
            Expr::Name(name) => self.check_name(name),
            Expr::Literal { value, .. } => Ok(self.literal_expr(value.clone())),
            Expr::Call(call) => self.check_call(call, expected),
            Expr::Attribute { left, right } => self.check_attribute(left, right, false),
            Expr::Subscript { head, items } => self.check_subscript(head, items),
            Expr::StructLiteral(literal) => self.check_struct_literal(literal),
            Expr::Unary { op, operand, line } => self.check_unary(*op, operand, *line),
            Expr::Binary { left, op, right } => self.check_binary(left, *op, right),
            Expr::TestGuard(inner) => self.check_test_guard(inner),
        }
    }

    pub(crate) fn literal_expr(&self, value: Literal) -> TypedExpr {
        let ty = match value {
            Literal::Str(_) => TypeId::STR,
            Literal::Int(_) => TypeId::INT,
            Literal::Float(_) => TypeId::FLOAT,
            Literal::Bool(_) => TypeId::BOOL,
        };
        TypedExpr::new(TypedExprKind::Literal(value), ty)
    }

    fn check_name(&mut self, name: &Name) -> Result<TypedExpr> {
        let module = self.ctx.module(self.module);

        if let Some(&ty) = module.types.get(name) {
            return Ok(TypedExpr::new(TypedExprKind::TypeValue(ty), TypeId::TYPE));
        }
        if let Some(primitive) = self.ctx.pool.primitive(name.text()) {
            return Ok(TypedExpr::new(
                TypedExprKind::TypeValue(primitive),
                TypeId::TYPE,
            ));
        }
        if module.imports.contains_key(name) {
            return Ok(TypedExpr::new(
                TypedExprKind::Var(name.clone()),
                TypeId::MODULE,
            ));
        }
        if let Some(&func) = module.functions.get(name) {
            return Ok(TypedExpr::new(
                TypedExprKind::FuncRef(func),
                TypeId::FUNCTION,
            ));
        }
        if let Some(&alias) = module.scope.type_variables.get(name) {
            return Ok(TypedExpr::new(TypedExprKind::TypeValue(alias), TypeId::TYPE));
        }
        if let Some(binding) = module.scope.variables.get(name) {
            let ty = binding.ty;
            return Ok(TypedExpr::new(TypedExprKind::Var(name.clone()), ty));
        }

        Err(self.name_err(
            format!("variable {name} not found in current scope"),
            name.line,
        ))
    }

    pub(crate) fn check_call(
        &mut self,
        call: &Call,
        expected: Option<TypeId>,
    ) -> Result<TypedExpr> {
        let callee = self.resolve_callee(&call.callee)?;
        let (func, owner, receiver) = match callee {
            Callee::Func(func) => (func, None, None),
            Callee::Method { assoc, receiver } => (assoc.func, Some(assoc.owner), receiver),
        };

        let mut typed_args = Vec::with_capacity(call.args.len());
        for arg in &call.args {
            typed_args.push(self.check_expression(arg, None)?);
        }

        let func = if self.ctx.function(func).head.is_generic() {
            let type_args = if call.generics.is_empty() {
                let actuals = self.inference_actuals(func, receiver.as_ref(), &typed_args);
                self.infer_type_args(func, &actuals, expected, call.line)?
            } else {
                call.generics
                    .iter()
                    .map(|generic| self.import_type(generic))
                    .collect::<Result<Vec<_>>>()?
            };
            self.monomorphize(func, owner, type_args, call.line)?
        } else {
            if !call.generics.is_empty() {
                let display = self.ctx.function(func).head.display();
                return Err(self.type_err(
                    format!("function '{display}' is not a generic function"),
                    call.line,
                ));
            }
            func
        };

        let head = self.ctx.function(func).head.clone();

        // Implicit `self`: instance calls prepend the receiver, taking its
        // address when the method wants `self: ptr[T]` but the receiver is
        // a value.
        let mut args = typed_args;
        if let Some(receiver) = receiver {
            if head.params.first().is_some_and(|(name, _)| name.text() == "self") {
                let self_ty = head.params[0].1.resolved().ok_or_else(|| {
                    self.internal_err("unresolved self parameter", call.line)
                })?;
                let receiver = if self.ctx.pool.is_pointer(self_ty)
                    && !self.ctx.pool.is_pointer(receiver.ty)
                {
                    let pointer = self.ctx.pool.pointer_to(receiver.ty);
                    TypedExpr::new(
                        TypedExprKind::Unary {
                            op: UnaryOp::AddrOf,
                            operand: Box::new(receiver),
                        },
                        pointer,
                    )
                } else {
                    receiver
                };
                args.insert(0, receiver);
            }
        }

        if args.len() > head.params.len() {
            return Err(self.type_err(
                format!(
                    "too many arguments for function \"{}\". expected {}, got {}",
                    head.display(),
                    head.params.len(),
                    args.len()
                ),
                call.line,
            ));
        }
        if args.len() < head.params.len() {
            return Err(self.type_err(
                format!(
                    "too few arguments for function \"{}\". expected {}, got {}",
                    head.display(),
                    head.params.len(),
                    args.len()
                ),
                call.line,
            ));
        }

        for (arg, (param_name, hint)) in args.iter().zip(&head.params) {
            let param_ty = hint
                .resolved()
                .ok_or_else(|| self.internal_err("unresolved parameter type", call.line))?;
            if !compatible(&self.ctx.pool, param_ty, arg.ty) {
                return Err(self.type_err(
                    format!(
                        "argument '{param_name}' of function '{}' must be a '{}' but a '{}' was provided",
                        head.display(),
                        self.ctx.pool.display(param_ty),
                        self.ctx.pool.display(arg.ty)
                    ),
                    call.line,
                ));
            }
        }

        let return_ty = head
            .return_hint
            .resolved()
            .ok_or_else(|| self.internal_err("unresolved return type", call.line))?;
        Ok(TypedExpr::new(
            TypedExprKind::Call { func, args },
            return_ty,
        ))
    }

    /// Actual types aligned with the signature for inference: the receiver
    /// comes first for instance calls, promoted to a pointer when the
    /// `self` parameter is pointer-shaped.
    fn inference_actuals(
        &mut self,
        func: gullian_types::FnId,
        receiver: Option<&TypedExpr>,
        typed_args: &[TypedExpr],
    ) -> Vec<TypeId> {
        let mut actuals = Vec::with_capacity(typed_args.len() + 1);
        if let Some(receiver) = receiver {
            let (takes_self, pointer_shaped) = {
                let head = &self.ctx.function(func).head;
                let takes_self = head
                    .params
                    .first()
                    .is_some_and(|(name, _)| name.text() == "self");
                let pointer_shaped = takes_self
                    && match &head.params[0].1 {
                        TypeRef::Ast(TypeExpr::Pointer(_)) => true,
                        TypeRef::Ast(TypeExpr::Apply { head, .. }) => {
                            matches!(&**head, TypeExpr::Name(name) if name.text() == "ptr")
                        }
                        TypeRef::Ast(_) => false,
                        TypeRef::Resolved(ty) => self.ctx.pool.is_pointer(*ty),
                    };
                (takes_self, pointer_shaped)
            };
            if takes_self {
                let receiver_ty = if pointer_shaped && !self.ctx.pool.is_pointer(receiver.ty) {
                    self.ctx.pool.pointer_to(receiver.ty)
                } else {
                    receiver.ty
                };
                actuals.push(receiver_ty);
            }
        }
        actuals.extend(typed_args.iter().map(|arg| arg.ty));
        actuals
    }

    /// `x.y`: module members, enum variants, methods, fields, union
    /// variants (guarded), pointer transparency.
    pub(crate) fn check_attribute(
        &mut self,
        left: &Expr,
        right: &Name,
        guarantee: bool,
    ) -> Result<TypedExpr> {
        // Module member access.
        if let Expr::Name(pkg) = left {
            if let Some(&imported) = self.ctx.module(self.module).imports.get(pkg) {
                if let Some(&ty) = self.ctx.module(imported).types.get(right) {
                    return Ok(TypedExpr::new(TypedExprKind::TypeValue(ty), TypeId::TYPE));
                }
                if let Some(&func) = self.ctx.module(imported).functions.get(right) {
                    return Ok(TypedExpr::new(
                        TypedExprKind::FuncRef(func),
                        TypeId::FUNCTION,
                    ));
                }
                return Err(self.name_err(
                    format!(
                        "{right} is not a member of module {}",
                        self.ctx.module(imported).name
                    ),
                    right.line,
                ));
            }
        }

        let left_typed = self.check_expression(left, None)?;

        // Member access on a type: enum variants and static methods.
        if let TypedExprKind::TypeValue(ty) = left_typed.kind {
            if let Some(TypeDecl::Enum(decl)) = &self.ctx.pool.get(ty).decl {
                if decl.variants.contains(right) {
                    return Ok(TypedExpr::new(
                        TypedExprKind::EnumVariant {
                            enum_ty: ty,
                            variant: right.clone(),
                        },
                        ty,
                    ));
                }
            }
            if let Some(Member::Method(assoc)) = self.type_member(ty, right) {
                return Ok(TypedExpr::new(
                    TypedExprKind::FuncRef(assoc.func),
                    TypeId::FUNCTION,
                ));
            }
            return Err(self.name_err(
                format!(
                    "type {} does not contain a member called {right}",
                    self.ctx.pool.display(ty)
                ),
                right.line,
            ));
        }

        let object_ty = left_typed.ty;
        let through_ptr = self.ctx.pool.pointee(object_ty).is_some();
        let effective_ty = self.ctx.pool.pointee(object_ty).unwrap_or(object_ty);

        match self.type_member(object_ty, right) {
            Some(Member::Method(assoc)) => Ok(TypedExpr::new(
                TypedExprKind::FuncRef(assoc.func),
                TypeId::FUNCTION,
            )),
            Some(Member::Field { ty, union_variant }) => {
                if union_variant && !guarantee {
                    let uid = self.ctx.pool.get(effective_ty).uid;
                    if !self
                        .ctx
                        .module(self.module)
                        .scope
                        .has_guard(uid, right)
                    {
                        return Err(self.type_err(
                            format!(
                                "possibly uninitialized variant '{right}' of {}",
                                self.ctx.pool.display(effective_ty)
                            ),
                            right.line,
                        ));
                    }
                }
                Ok(TypedExpr::new(
                    TypedExprKind::Field {
                        object: Box::new(left_typed),
                        field: right.clone(),
                        through_ptr,
                    },
                    ty,
                ))
            }
            Some(Member::EnumVariant) | None => Err(self.name_err(
                format!(
                    "type {} does not contain a member called {right}",
                    self.ctx.pool.display(object_ty)
                ),
                right.line,
            )),
        }
    }

    /// Non-type subscript: indexing into `str` or `ptr[T]`.
    pub(crate) fn check_subscript(&mut self, head: &Expr, items: &[Expr]) -> Result<TypedExpr> {
        let head_typed = self.check_expression(head, None)?;
        let line = head.line();

        let [index] = items else {
            return Err(self.type_err(
                format!("indexing {head} takes exactly one index"),
                line,
            ));
        };
        let index_typed = self.check_expression(index, None)?;
        if !compatible(&self.ctx.pool, TypeId::INT, index_typed.ty) {
            return Err(self.type_err(
                format!(
                    "indexing for {head} must provide an 'int', got {}",
                    self.ctx.pool.display(index_typed.ty)
                ),
                line,
            ));
        }

        let result_ty = if self.ctx.pool.identical(head_typed.ty, TypeId::STR) {
            TypeId::CHAR
        } else if let Some(pointee) = self.ctx.pool.pointee(head_typed.ty) {
            pointee
        } else {
            return Err(self.type_err(
                format!(
                    "cannot index a value of type {}",
                    self.ctx.pool.display(head_typed.ty)
                ),
                line,
            ));
        };

        Ok(TypedExpr::new(
            TypedExprKind::Index {
                head: Box::new(head_typed),
                index: Box::new(index_typed),
            },
            result_ty,
        ))
    }

    pub(crate) fn check_struct_literal(&mut self, literal: &StructLiteral) -> Result<TypedExpr> {
        let ty = self.import_type(&literal.name)?;

        if matches!(self.ctx.pool.get(ty).decl, Some(TypeDecl::Union(_))) {
            return self.check_union_literal(literal, ty);
        }

        let Some(TypeDecl::Struct(decl)) = self.ctx.pool.get(ty).decl.clone() else {
            return Err(self.type_err(
                format!("{} is not a struct type", self.ctx.pool.display(ty)),
                literal.line,
            ));
        };

        let mut args = Vec::with_capacity(literal.args.len());
        for arg in &literal.args {
            let StructArg::Positional(value) = arg else {
                return Err(self.type_err(
                    format!(
                        "struct literal \"{}\" takes positional arguments",
                        literal.name
                    ),
                    literal.line,
                ));
            };
            args.push(self.check_expression(value, None)?);
        }

        if args.len() > decl.fields.len() {
            return Err(self.type_err(
                format!(
                    "too many arguments for struct literal \"{}\", expected {}, got {}",
                    literal.name,
                    decl.fields.len(),
                    args.len()
                ),
                literal.line,
            ));
        }
        if args.len() < decl.fields.len() {
            return Err(self.type_err(
                format!(
                    "too few arguments for struct literal \"{}\", expected {}, got {}",
                    literal.name,
                    decl.fields.len(),
                    args.len()
                ),
                literal.line,
            ));
        }

        for ((field_name, hint), arg) in decl.fields.iter().zip(&args) {
            let field_ty = hint
                .resolved()
                .ok_or_else(|| self.internal_err("unresolved field type", literal.line))?;
            if !compatible(&self.ctx.pool, field_ty, arg.ty) {
                return Err(self.type_err(
                    format!(
                        "incompatible type for struct literal field '{field_name}'. expected '{}', got '{}'",
                        self.ctx.pool.display(field_ty),
                        self.ctx.pool.display(arg.ty)
                    ),
                    literal.line,
                ));
            }
        }

        Ok(TypedExpr::new(
            TypedExprKind::StructLiteral { ty, args },
            ty,
        ))
    }

    /// A union literal carries exactly one named payload; the payload must
    /// be compatible with exactly one variant and the first match wins.
    fn check_union_literal(&mut self, literal: &StructLiteral, ty: TypeId) -> Result<TypedExpr> {
        let Some(TypeDecl::Union(decl)) = self.ctx.pool.get(ty).decl.clone() else {
            return Err(self.internal_err("union literal over non-union type", literal.line));
        };

        if literal.args.len() > 1 {
            return Err(self.type_err(
                format!(
                    "too many arguments for union literal \"{}\", expected 1, got {}",
                    literal.name,
                    literal.args.len()
                ),
                literal.line,
            ));
        }
        let Some(arg) = literal.args.first() else {
            return Err(self.type_err(
                format!(
                    "too few arguments for union literal \"{}\", expected 1, got 0",
                    literal.name
                ),
                literal.line,
            ));
        };
        let StructArg::Named(field, value) = arg else {
            return Err(self.type_err(
                format!(
                    "union literal \"{}\" takes a single 'variant: value' argument",
                    literal.name
                ),
                literal.line,
            ));
        };

        let Some((_, field_hint)) = decl.fields.iter().find(|(name, _)| name == field) else {
            return Err(self.name_err(
                format!("{field} is not a variant of {}", self.ctx.pool.display(ty)),
                field.line,
            ));
        };
        let field_ty = field_hint
            .resolved()
            .ok_or_else(|| self.internal_err("unresolved variant type", literal.line))?;

        let value_typed = self.check_expression(value, Some(field_ty))?;

        let mut matched = None;
        let mut variant_names = Vec::with_capacity(decl.fields.len());
        for (index, (variant, hint)) in decl.fields.iter().enumerate() {
            let variant_ty = hint
                .resolved()
                .ok_or_else(|| self.internal_err("unresolved variant type", literal.line))?;
            variant_names.push(self.ctx.pool.display(variant_ty));
            if matched.is_none() && compatible(&self.ctx.pool, variant_ty, value_typed.ty) {
                matched = Some((index, variant.clone()));
            }
        }

        let Some((variant_index, variant)) = matched else {
            return Err(self.type_err(
                format!(
                    "incompatible type for union literal. expected '{}', got '{}'",
                    variant_names.join(" | "),
                    self.ctx.pool.display(value_typed.ty)
                ),
                literal.line,
            ));
        };

        Ok(TypedExpr::new(
            TypedExprKind::UnionLiteral {
                ty,
                variant,
                variant_index,
                value: Box::new(value_typed),
            },
            ty,
        ))
    }

    fn check_unary(&mut self, op: UnaryOp, operand: &Expr, line: u32) -> Result<TypedExpr> {
        if op == UnaryOp::AddrOf {
            // Address-of applies to variables only.
            let Expr::Name(name) = operand else {
                return Err(self.type_err(
                    format!("cannot take the address of {operand}"),
                    line,
                ));
            };
            let Some(binding) = self.ctx.module(self.module).scope.variables.get(name) else {
                return Err(self.name_err(
                    format!("variable {name} not found in current scope"),
                    name.line,
                ));
            };
            let var_ty = binding.ty;
            let pointer = self.ctx.pool.pointer_to(var_ty);
            let var = TypedExpr::new(TypedExprKind::Var(name.clone()), var_ty);
            return Ok(TypedExpr::new(
                TypedExprKind::Unary {
                    op,
                    operand: Box::new(var),
                },
                pointer,
            ));
        }

        let operand_typed = self.check_expression(operand, None)?;
        let ty = match op {
            UnaryOp::Neg | UnaryOp::Pos => TypeId::INT,
            UnaryOp::Not | UnaryOp::WordNot => TypeId::BOOL,
            UnaryOp::Deref => {
                return Err(self.type_err("unary operator '*' is not supported", line));
            }
            UnaryOp::AddrOf => unreachable!("handled above"),
        };
        Ok(TypedExpr::new(
            TypedExprKind::Unary {
                op,
                operand: Box::new(operand_typed),
            },
            ty,
        ))
    }

    fn check_binary(&mut self, left: &Expr, op: BinaryOp, right: &Expr) -> Result<TypedExpr> {
        let line = left.line();
        let mut left_typed = self.check_expression(left, None)?;
        let mut right_typed = self.check_expression(right, None)?;

        if !compatible(&self.ctx.pool, left_typed.ty, right_typed.ty) {
            // A length-1 text literal in an integer context coerces to its
            // code point.
            if let Some(coerced) = char_literal_coercion(&right_typed) {
                right_typed = coerced;
            } else if let Some(coerced) = char_literal_coercion(&left_typed) {
                left_typed = coerced;
            }
            if !compatible(&self.ctx.pool, left_typed.ty, right_typed.ty) {
                return Err(self.type_err(
                    format!(
                        "type mismatch for binary operation '{}', {} != {}",
                        op.c_lexeme(),
                        self.ctx.pool.display(left_typed.ty),
                        self.ctx.pool.display(right_typed.ty)
                    ),
                    line,
                ));
            }
        }

        let ty = if op.is_comparison() {
            TypeId::BOOL
        } else {
            left_typed.ty
        };
        Ok(TypedExpr::new(
            TypedExprKind::Binary {
                left: Box::new(left_typed),
                op,
                right: Box::new(right_typed),
            },
            ty,
        ))
    }

    /// `u.v?`: typed as bool; the guarded variant is recorded by `if` and
    /// `while` checking.
    pub(crate) fn check_test_guard(&mut self, inner: &Expr) -> Result<TypedExpr> {
        let Expr::Attribute { left, right } = inner else {
            return Err(self.type_err(
                format!("test guards apply to union variants, not {inner}"),
                inner.line(),
            ));
        };

        let object = self.check_expression(left, None)?;
        let union_ty = self.ctx.pool.pointee(object.ty).unwrap_or(object.ty);

        let Some(TypeDecl::Union(decl)) = &self.ctx.pool.get(union_ty).decl else {
            return Err(self.type_err(
                format!(
                    "test guards apply to union variants, but {} is not a union",
                    self.ctx.pool.display(union_ty)
                ),
                right.line,
            ));
        };
        if !decl.fields.iter().any(|(name, _)| name == right) {
            return Err(self.name_err(
                format!("{right} is not a variant of {}", self.ctx.pool.display(union_ty)),
                right.line,
            ));
        }

        Ok(TypedExpr::new(
            TypedExprKind::TestGuard {
                object: Box::new(object),
                union_ty,
                variant: right.clone(),
            },
            TypeId::BOOL,
        ))
    }

    pub(crate) fn check_switch(&mut self, switch: &Switch) -> Result<TypedExpr> {
        let scrutinee = self.check_expression(&switch.scrutinee, None)?;

        let mut branches = Vec::with_capacity(switch.branches.len());
        let mut default_ty = None;
        let mut last_ty = None;
        for branch in &switch.branches {
            let pattern = match &branch.pattern {
                SwitchPattern::Default => None,
                SwitchPattern::Expr(expr) => Some(self.check_expression(expr, None)?),
            };
            let value = self.check_expression(&branch.value, None)?;
            if pattern.is_none() {
                default_ty = Some(value.ty);
            }
            last_ty = Some(value.ty);
            branches.push((pattern, value));
        }

        // The switch takes the default branch's type; without a `_` arm
        // the last branch stands in for it.
        let Some(ty) = default_ty.or(last_ty) else {
            return Err(self.type_err("switch must have at least one branch", switch.line));
        };

        Ok(TypedExpr::new(
            TypedExprKind::Switch(Box::new(TypedSwitch {
                scrutinee,
                branches,
            })),
            ty,
        ))
    }
}

/// Rewrite a length-1 string literal to its code point.
fn char_literal_coercion(expr: &TypedExpr) -> Option<TypedExpr> {
    let TypedExprKind::Literal(Literal::Str(text)) = &expr.kind else {
        return None;
    };
    let mut chars = text.chars();
    let only = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    Some(TypedExpr::new(
        TypedExprKind::Literal(Literal::Int(i64::from(u32::from(only)))),
        TypeId::INT,
    ))
}
