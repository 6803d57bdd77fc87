//! Name and type resolution, generic instantiation and monomorphization.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::debug;

use gullian_diagnostic::Result;
use gullian_ir::ast::{Expr, TypeExpr};
use gullian_ir::Name;
use gullian_types::typed::{TypedExpr, TypedExprKind};
use gullian_types::{
    AssocFn, FnId, Function, FunctionHead, FunctionKind, ModuleId, StructDecl, TypeDecl, TypeId,
    TypeName, TypeRef, UnionDecl,
};

use crate::Checker;

/// What member lookup on a type can find.
pub(crate) enum Member {
    Method(AssocFn),
    Field { ty: TypeId, union_variant: bool },
    EnumVariant,
}

/// A resolved call target.
pub(crate) enum Callee {
    Func(FnId),
    Method {
        assoc: AssocFn,
        /// The checked receiver for instance calls; `None` for static
        /// `T.m(...)` calls.
        receiver: Option<TypedExpr>,
    },
}

impl<'ctx> Checker<'ctx> {
    /// Run `f` with the same session but another current module.
    pub(crate) fn in_module<T>(
        &mut self,
        module: ModuleId,
        f: impl FnOnce(&mut Checker<'_>) -> Result<T>,
    ) -> Result<T> {
        let mut sub = Checker {
            ctx: &mut *self.ctx,
            module,
        };
        f(&mut sub)
    }

    /// Resolve a written type reference to a pool handle.
    pub(crate) fn import_type(&mut self, expr: &TypeExpr) -> Result<TypeId> {
        match expr {
            TypeExpr::Name(name) => {
                if let Some(primitive) = self.ctx.pool.primitive(name.text()) {
                    return Ok(primitive);
                }
                if let Some(&alias) = self
                    .ctx
                    .module(self.module)
                    .scope
                    .type_variables
                    .get(name)
                {
                    return Ok(alias);
                }
                if let Some(&ty) = self.ctx.module(self.module).types.get(name) {
                    return Ok(ty);
                }
                Err(self.name_err(
                    format!("{name} is not a type of module {}", self.module_name()),
                    name.line,
                ))
            }
            TypeExpr::Pointer(inner) => {
                let pointee = self.import_type(inner)?;
                Ok(self.ctx.pool.pointer_to(pointee))
            }
            TypeExpr::Attribute { left, right } => {
                let TypeExpr::Name(pkg) = &**left else {
                    return Err(self.internal_err(
                        format!("unsupported qualified type reference {expr}"),
                        expr.line(),
                    ));
                };
                let Some(&imported) = self.ctx.module(self.module).imports.get(pkg) else {
                    return Err(self.name_err(
                        format!("{pkg} is not an import of module {}", self.module_name()),
                        pkg.line,
                    ));
                };
                self.in_module(imported, |sub| sub.import_type(&TypeExpr::Name(right.clone())))
            }
            TypeExpr::Apply { head, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.import_type(arg))
                    .collect::<Result<Vec<_>>>()?;
                self.apply_type(head, args, expr.line())
            }
        }
    }

    /// Resolve `head[args]` with the argument types already resolved.
    fn apply_type(&mut self, head: &TypeExpr, args: Vec<TypeId>, line: u32) -> Result<TypeId> {
        if let TypeExpr::Name(name) = head {
            if name.text() == "ptr" {
                if args.len() != 1 {
                    return Err(self.type_err(
                        format!(
                            "basic type ptr expects exactly 1 type argument, got {}",
                            args.len()
                        ),
                        line,
                    ));
                }
                return Ok(self.ctx.pool.pointer_to(args[0]));
            }
        }

        let head_ty = self.import_type(head)?;
        if self.ctx.pool.is_primitive(head_ty) {
            return Err(self.type_err(
                format!(
                    "basic type {} is not subscriptable",
                    self.ctx.pool.display(head_ty)
                ),
                line,
            ));
        }

        self.instantiate_type(head_ty, args, line)
    }

    /// Clone a generic declaration with its parameters substituted,
    /// memoized in the declaring module under the fully-applied name.
    pub(crate) fn instantiate_type(
        &mut self,
        head_ty: TypeId,
        args: Vec<TypeId>,
        line: u32,
    ) -> Result<TypeId> {
        let record = self.ctx.pool.get(head_ty);
        let TypeName::Ident(head_name) = record.name.clone() else {
            return Err(self.type_err(
                format!("type {} is not a generic type", self.ctx.pool.display(head_ty)),
                line,
            ));
        };
        let Some(declaring) = record.module else {
            return Err(self.internal_err(
                format!("type {head_name} has no declaring module"),
                line,
            ));
        };
        let Some(decl) = record.decl.clone() else {
            return Err(self.type_err(format!("type {head_name} is not a generic type"), line));
        };

        let generics = decl.generics().to_vec();
        if generics.is_empty() {
            return Err(self.type_err(format!("type {head_name} is not a generic type"), line));
        }
        if args.len() != generics.len() {
            return Err(self.type_err(
                format!(
                    "type {head_name} expects {} type arguments, got {}",
                    generics.len(),
                    args.len()
                ),
                line,
            ));
        }

        let key = self.applied_key(head_name.text(), &args);
        if let Some(&memoized) = self.ctx.module(declaring).type_specs.get(&key) {
            return Ok(memoized);
        }

        // Substitution runs in the declaring module with the parameters
        // installed as type aliases; the ordinary resolution path then
        // rewrites every field hint, nested subscripts included.
        let fields = self.in_module(declaring, |sub| {
            sub.with_scope(|sub| {
                for (generic, &arg) in generics.iter().zip(&args) {
                    sub.ctx
                        .module_mut(declaring)
                        .scope
                        .type_variables
                        .insert(generic.clone(), arg);
                }

                let mut fields = Vec::new();
                if let Some(declared) = decl.fields() {
                    for (field_name, hint) in declared {
                        let ty = match hint {
                            TypeRef::Ast(expr) => sub.import_type(expr)?,
                            TypeRef::Resolved(ty) => *ty,
                        };
                        fields.push((field_name.clone(), TypeRef::Resolved(ty)));
                    }
                }
                Ok(fields)
            })
        })?;

        let new_decl = match decl {
            TypeDecl::Struct(s) => TypeDecl::Struct(StructDecl {
                name: s.name,
                fields,
                generics: Vec::new(),
            }),
            TypeDecl::Union(u) => TypeDecl::Union(UnionDecl {
                name: u.name,
                fields,
                generics: Vec::new(),
            }),
            TypeDecl::Enum(_) => {
                return Err(self.type_err(format!("type {head_name} is not a generic type"), line));
            }
        };

        let new_ty = self.ctx.pool.alloc(
            TypeName::Applied {
                head: head_name.clone(),
                args: SmallVec::from_vec(args),
            },
            Some(new_decl),
            Some(declaring),
        );

        // The method table is copied by reference, rebound to the new
        // owner.
        let copied: Vec<(Name, AssocFn)> = self
            .ctx
            .pool
            .get(head_ty)
            .assoc
            .iter()
            .map(|(name, assoc)| {
                (
                    name.clone(),
                    AssocFn {
                        owner: new_ty,
                        func: assoc.func,
                    },
                )
            })
            .collect();
        for (name, assoc) in copied {
            self.ctx.pool.get_mut(new_ty).assoc.insert(name, assoc);
        }

        debug!(key = %key, "instantiated generic type");
        let module = self.ctx.module_mut(declaring);
        module.type_specs.insert(key, new_ty);
        module.decl_order.push(new_ty);
        Ok(new_ty)
    }

    pub(crate) fn applied_key(&self, base: &str, args: &[TypeId]) -> String {
        let args = args
            .iter()
            .map(|&arg| self.ctx.pool.display(arg))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{base}[{args}]")
    }

    /// Member lookup: associated functions first, then declared fields and
    /// variants, then pointer transparency into the pointee.
    pub(crate) fn type_member(&self, ty: TypeId, name: &Name) -> Option<Member> {
        let record = self.ctx.pool.get(ty);

        if let TypeName::Pointer(inner) = &record.name {
            let inner = *inner;
            if let Some(assoc) = self.ctx.pool.get(TypeId::PTR).assoc.get(name) {
                return Some(Member::Method(*assoc));
            }
            if let Some(assoc) = record.assoc.get(name) {
                return Some(Member::Method(*assoc));
            }
            return self.type_member(inner, name);
        }

        if let Some(assoc) = record.assoc.get(name) {
            return Some(Member::Method(*assoc));
        }

        if let Some(decl) = &record.decl {
            if let Some(fields) = decl.fields() {
                if let Some((_, hint)) = fields.iter().find(|(field, _)| field == name) {
                    let field_ty = hint.resolved()?;
                    return Some(Member::Field {
                        ty: field_ty,
                        union_variant: matches!(decl, TypeDecl::Union(_)),
                    });
                }
            }
            if let TypeDecl::Enum(e) = decl {
                if e.variants.contains(name) {
                    return Some(Member::EnumVariant);
                }
            }
        }

        None
    }

    /// Resolve the target of a call.
    pub(crate) fn resolve_callee(&mut self, callee: &Expr) -> Result<Callee> {
        match callee {
            Expr::Name(name) => {
                if let Some(&func) = self.ctx.module(self.module).functions.get(name) {
                    return Ok(Callee::Func(func));
                }
                // Functor-style constructor: a type with a `call`
                // associated function.
                if let Ok(ty) = self.import_type(&TypeExpr::Name(name.clone())) {
                    if let Some(Member::Method(assoc)) =
                        self.type_member(ty, &Name::synthetic("call"))
                    {
                        return Ok(Callee::Method {
                            assoc,
                            receiver: None,
                        });
                    }
                }
                Err(self.name_err(
                    format!("{name} is not a function of module {}", self.module_name()),
                    name.line,
                ))
            }
            Expr::Attribute { left, right } => {
                if let Expr::Name(pkg) = &**left {
                    if let Some(&imported) = self.ctx.module(self.module).imports.get(pkg) {
                        if let Some(&func) = self.ctx.module(imported).functions.get(right) {
                            return Ok(Callee::Func(func));
                        }
                        return Err(self.name_err(
                            format!(
                                "{right} is not a function of module {}",
                                self.ctx.module(imported).name
                            ),
                            right.line,
                        ));
                    }
                }

                let left_typed = self.check_expression(left, None)?;
                if let TypedExprKind::TypeValue(ty) = left_typed.kind {
                    return match self.type_member(ty, right) {
                        Some(Member::Method(assoc)) => Ok(Callee::Method {
                            assoc,
                            receiver: None,
                        }),
                        _ => Err(self.name_err(
                            format!(
                                "{right} is not an associated function of {}",
                                self.ctx.pool.display(ty)
                            ),
                            right.line,
                        )),
                    };
                }

                match self.type_member(left_typed.ty, right) {
                    Some(Member::Method(assoc)) => Ok(Callee::Method {
                        assoc,
                        receiver: Some(left_typed),
                    }),
                    _ => Err(self.name_err(
                        format!(
                            "{right} is not an associated function of {}",
                            self.ctx.pool.display(left_typed.ty)
                        ),
                        right.line,
                    )),
                }
            }
            other => Err(self.internal_err(format!("cannot call expression {other}"), other.line())),
        }
    }

    /// Monomorphization: substitute the type arguments through a generic
    /// function's signature, clone its body, re-check it in the declaring
    /// module, and memoize the result under the fully-applied name.
    pub(crate) fn monomorphize(
        &mut self,
        func: FnId,
        owner: Option<TypeId>,
        type_args: Vec<TypeId>,
        line: u32,
    ) -> Result<FnId> {
        let head = self.ctx.function(func).head.clone();
        let body = match &self.ctx.function(func).kind {
            FunctionKind::User { body, .. } => body.clone(),
            FunctionKind::Extern => {
                return Err(self.internal_err("extern functions cannot be generic", line));
            }
        };

        if type_args.len() != head.generics.len() {
            return Err(self.type_err(
                format!(
                    "function '{}' expects {} type arguments, got {}",
                    head.display(),
                    head.generics.len(),
                    type_args.len()
                ),
                line,
            ));
        }

        let base = match &head.owner {
            Some(owner_name) => format!("{owner_name}.{}", head.name),
            None => head.name.text().to_string(),
        };
        let key = self.applied_key(&base, &type_args);
        let declaring = head.module;
        if let Some(&memoized) = self.ctx.module(declaring).fn_specs.get(&key) {
            return Ok(memoized);
        }
        debug!(key = %key, "monomorphizing function");

        self.in_module(declaring, |sub| {
            sub.with_scope(|sub| {
                // Type aliases drive both the signature substitution and
                // the body re-check.
                for (generic, &arg) in head.generics.iter().zip(&type_args) {
                    sub.ctx
                        .module_mut(declaring)
                        .scope
                        .type_variables
                        .insert(generic.clone(), arg);
                }

                let mut params = Vec::with_capacity(head.params.len());
                for (name, hint) in &head.params {
                    let ty = match hint {
                        TypeRef::Ast(expr) => sub.import_type(expr)?,
                        TypeRef::Resolved(ty) => *ty,
                    };
                    params.push((name.clone(), TypeRef::Resolved(ty)));
                }
                let return_ty = match &head.return_hint {
                    TypeRef::Ast(expr) => sub.import_type(expr)?,
                    TypeRef::Resolved(ty) => *ty,
                };

                let new_head = FunctionHead {
                    name: head.name.clone(),
                    owner: head.owner.clone(),
                    generics: Vec::new(),
                    spec_args: type_args.clone(),
                    params: params.clone(),
                    return_hint: TypeRef::Resolved(return_ty),
                    module: declaring,
                    line: head.line,
                };
                let new_id = sub.ctx.add_function(Function {
                    head: new_head,
                    kind: FunctionKind::User {
                        body: body.clone(),
                        typed: None,
                    },
                });

                // Memoize (and publish the specialization in the owner's
                // method table) before checking the body, so recursive
                // calls resolve to the instance being built.
                let module = sub.ctx.module_mut(declaring);
                module.fn_specs.insert(key.clone(), new_id);
                module.fn_order.push(new_id);
                if let Some(owner_ty) = owner {
                    sub.ctx.pool.get_mut(owner_ty).assoc.insert(
                        head.name.clone(),
                        AssocFn {
                            owner: owner_ty,
                            func: new_id,
                        },
                    );
                }

                for (name, hint) in &params {
                    if let TypeRef::Resolved(ty) = hint {
                        sub.ctx
                            .module_mut(declaring)
                            .scope
                            .bind_argument(name.clone(), *ty);
                    }
                }

                let typed = sub.check_body(&body, return_ty)?;
                if let FunctionKind::User { typed: slot, .. } =
                    &mut sub.ctx.function_mut(new_id).kind
                {
                    *slot = Some(typed);
                }

                Ok(new_id)
            })
        })
    }

    /// Best-effort structural inference of a generic call's type
    /// arguments. `actuals` is aligned with the function's parameter list
    /// (receiver first for instance calls).
    pub(crate) fn infer_type_args(
        &mut self,
        func: FnId,
        actuals: &[TypeId],
        expected: Option<TypeId>,
        line: u32,
    ) -> Result<Vec<TypeId>> {
        let head = self.ctx.function(func).head.clone();
        let mut bindings: FxHashMap<Name, TypeId> = FxHashMap::default();

        for ((_, hint), &actual) in head.params.iter().zip(actuals) {
            if let TypeRef::Ast(pattern) = hint {
                let _ = self.unify(pattern, actual, &head.generics, &mut bindings);
            }
        }

        if bindings.len() < head.generics.len() {
            if let (Some(expected), TypeRef::Ast(ret)) = (expected, &head.return_hint) {
                let _ = self.unify(ret, expected, &head.generics, &mut bindings);
            }
        }

        let mut out = Vec::with_capacity(head.generics.len());
        for generic in &head.generics {
            match bindings.get(generic) {
                Some(&ty) => out.push(ty),
                None => {
                    return Err(self.type_err(
                        format!(
                            "the called function is generic, you must specify its type parameters in the callee '{}'",
                            head.display()
                        ),
                        line,
                    ));
                }
            }
        }
        Ok(out)
    }

    /// Structural pattern match of a written signature type against an
    /// actual type. Type-parameter names bind; `&p` matches `ptr[p]`;
    /// `str` unifies with `ptr[char]`; applied names unify pointwise.
    fn unify(
        &mut self,
        pattern: &TypeExpr,
        actual: TypeId,
        generics: &[Name],
        bindings: &mut FxHashMap<Name, TypeId>,
    ) -> bool {
        match pattern {
            TypeExpr::Name(name) => {
                if generics.contains(name) {
                    bindings.insert(name.clone(), actual);
                    return true;
                }
                match self.import_type(&TypeExpr::Name(name.clone())) {
                    Ok(ty) => self.ctx.pool.identical(ty, actual),
                    Err(_) => false,
                }
            }
            TypeExpr::Pointer(inner) => self.unify_pointer(inner, actual, generics, bindings),
            TypeExpr::Apply { head, args } => {
                if let TypeExpr::Name(head_name) = &**head {
                    if head_name.text() == "ptr" && args.len() == 1 {
                        return self.unify_pointer(&args[0], actual, generics, bindings);
                    }
                }

                let TypeName::Applied {
                    head: actual_head,
                    args: actual_args,
                } = self.ctx.pool.get(actual).name.clone()
                else {
                    return false;
                };
                let Some(pattern_head) = head.rightmost() else {
                    return false;
                };
                if *pattern_head != actual_head || args.len() != actual_args.len() {
                    return false;
                }
                args.iter()
                    .zip(actual_args.iter())
                    .all(|(pattern, &actual)| self.unify(pattern, actual, generics, bindings))
            }
            TypeExpr::Attribute { .. } => match self.import_type(pattern) {
                Ok(ty) => self.ctx.pool.identical(ty, actual),
                Err(_) => false,
            },
        }
    }

    fn unify_pointer(
        &mut self,
        inner: &TypeExpr,
        actual: TypeId,
        generics: &[Name],
        bindings: &mut FxHashMap<Name, TypeId>,
    ) -> bool {
        if self.ctx.pool.identical(actual, TypeId::STR) {
            return self.unify(inner, TypeId::CHAR, generics, bindings);
        }
        match self.ctx.pool.pointee(actual) {
            Some(pointee) => self.unify(inner, pointee, generics, bindings),
            None => false,
        }
    }
}
