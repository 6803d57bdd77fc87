//! The semantic middle end: name resolution, monomorphizing type checking
//! and comptime evaluation.
//!
//! The [`Checker`] walks a module's items in file order, registering
//! declarations in the [`Context`] and elaborating every function body into
//! the typed AST the emitter consumes. Generic declarations are recorded
//! unchecked; their bodies are only checked when a call site specializes
//! them (see `resolve`).

mod compat;
mod comptime;
mod expr;
mod resolve;
mod stmt;

use std::path::PathBuf;

use tracing::debug;

use gullian_diagnostic::{Diagnostic, Result};
use gullian_ir::ast::{FunctionItem, FunctionSig, Item, TypeExpr, VarDecl};
use gullian_ir::Name;
use gullian_types::{
    AssocFn, Context, EnumDecl, FnId, Function, FunctionHead, FunctionKind, ModuleId, StructDecl,
    TypeDecl, TypeId, TypeName, TypeRef, UnionDecl,
};

pub use compat::compatible;

/// Check a module's items in file order.
pub fn check_module(ctx: &mut Context, module: ModuleId, items: Vec<Item>) -> Result<()> {
    Checker::new(ctx, module).check_items(items)
}

pub struct Checker<'ctx> {
    pub ctx: &'ctx mut Context,
    pub module: ModuleId,
}

impl<'ctx> Checker<'ctx> {
    pub fn new(ctx: &'ctx mut Context, module: ModuleId) -> Self {
        Checker { ctx, module }
    }

    pub(crate) fn module_name(&self) -> String {
        self.ctx.module(self.module).name.clone()
    }

    pub(crate) fn name_err(&self, message: impl Into<String>, line: u32) -> Diagnostic {
        Diagnostic::name(message, line, self.module_name())
    }

    pub(crate) fn type_err(&self, message: impl Into<String>, line: u32) -> Diagnostic {
        Diagnostic::type_(message, line, self.module_name())
    }

    pub(crate) fn import_err(&self, message: impl Into<String>, line: u32) -> Diagnostic {
        Diagnostic::import(message, line, self.module_name())
    }

    pub(crate) fn internal_err(&self, message: impl Into<String>, line: u32) -> Diagnostic {
        Diagnostic::internal(message, line, self.module_name())
    }

    /// Save the module scope, run `f`, restore the scope on every exit
    /// path (including errors), and hand back `f`'s result.
    pub(crate) fn with_scope<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let saved = self.ctx.module(self.module).scope.clone();
        let result = f(self);
        self.ctx.module_mut(self.module).scope = saved;
        result
    }

    pub fn check_items(&mut self, items: Vec<Item>) -> Result<()> {
        for item in items {
            match item {
                Item::Comment { text, .. } => {
                    if text.starts_with("include ") {
                        self.ctx
                            .module_mut(self.module)
                            .includes
                            .push(format!("#{text}"));
                    }
                }
                Item::Import(import) => self.check_import(&import)?,
                Item::Extern(sig) => {
                    self.check_extern(sig)?;
                }
                Item::Enum(item) => {
                    let name = item.name.clone();
                    let decl = TypeDecl::Enum(EnumDecl {
                        name: item.name,
                        variants: item.variants,
                    });
                    self.register_type(name, decl)?;
                }
                Item::Struct(item) => {
                    let name = item.name.clone();
                    let fields = self.declaration_fields(item.fields, &item.generics)?;
                    let decl = TypeDecl::Struct(StructDecl {
                        name: item.name,
                        fields,
                        generics: item.generics,
                    });
                    self.register_type(name, decl)?;
                }
                Item::Union(item) => {
                    let name = item.name.clone();
                    let fields = self.declaration_fields(item.fields, &item.generics)?;
                    let decl = TypeDecl::Union(UnionDecl {
                        name: item.name,
                        fields,
                        generics: item.generics,
                    });
                    self.register_type(name, decl)?;
                }
                Item::Function(function) => {
                    self.check_function_declaration(function)?;
                }
                Item::Let(decl) => {
                    self.check_global(decl)?;
                }
                Item::Comptime(comptime) => {
                    // Evaluated for its compile-time effect; emits nothing.
                    self.check_comptime(&comptime)?;
                }
            }
        }
        Ok(())
    }

    /// Resolve the field hints of a struct/union declaration. Generic
    /// declarations keep their written hints; instantiation substitutes
    /// into them later.
    fn declaration_fields(
        &mut self,
        fields: Vec<(Name, TypeExpr)>,
        generics: &[Name],
    ) -> Result<Vec<(Name, TypeRef)>> {
        if !generics.is_empty() {
            return Ok(fields
                .into_iter()
                .map(|(name, hint)| (name, TypeRef::Ast(hint)))
                .collect());
        }

        fields
            .into_iter()
            .map(|(name, hint)| {
                let ty = self.import_type(&hint)?;
                Ok((name, TypeRef::Resolved(ty)))
            })
            .collect()
    }

    fn register_type(&mut self, name: Name, decl: TypeDecl) -> Result<TypeId> {
        let ty = self.ctx.pool.alloc(
            TypeName::Ident(name.clone()),
            Some(decl),
            Some(self.module),
        );
        debug!(name = %name, module = %self.module_name(), "registered type");
        let module = self.ctx.module_mut(self.module);
        module.types.insert(name, ty);
        module.decl_order.push(ty);
        Ok(ty)
    }

    fn check_extern(&mut self, sig: FunctionSig) -> Result<FnId> {
        if sig.name.owner.is_some() {
            return Err(self.name_err("extern functions must have flat names", sig.name.line()));
        }

        let mut params = Vec::with_capacity(sig.params.len());
        for (name, hint) in sig.params {
            let ty = self.import_type(&hint)?;
            params.push((name, TypeRef::Resolved(ty)));
        }
        let return_hint = TypeRef::Resolved(self.import_type(&sig.return_hint)?);

        let line = sig.name.line();
        let name = sig.name.name;
        let head = FunctionHead {
            name: name.clone(),
            owner: None,
            generics: Vec::new(),
            spec_args: Vec::new(),
            params,
            return_hint,
            module: self.module,
            line,
        };
        let id = self.ctx.add_function(Function {
            head,
            kind: FunctionKind::Extern,
        });
        let module = self.ctx.module_mut(self.module);
        module.functions.insert(name, id);
        module.fn_order.push(id);
        Ok(id)
    }

    pub(crate) fn check_function_declaration(&mut self, function: FunctionItem) -> Result<FnId> {
        let FunctionItem { sig, body } = function;
        let line = sig.name.line();
        let generics = sig.name.generics.clone();
        let is_generic = !generics.is_empty();

        let mut params: Vec<(Name, TypeRef)> = sig
            .params
            .into_iter()
            .map(|(name, hint)| (name, TypeRef::Ast(hint)))
            .collect();
        let mut return_hint = TypeRef::Ast(sig.return_hint);

        if !is_generic {
            for (_, hint) in &mut params {
                if let TypeRef::Ast(expr) = hint {
                    let expr = expr.clone();
                    let ty = self.import_type(&expr)?;
                    *hint = TypeRef::Resolved(ty);
                }
            }
            if let TypeRef::Ast(expr) = &return_hint {
                let expr = expr.clone();
                let ty = self.import_type(&expr)?;
                return_hint = TypeRef::Resolved(ty);
            }
        }

        let head = FunctionHead {
            name: sig.name.name.clone(),
            owner: sig.name.owner.clone(),
            generics,
            spec_args: Vec::new(),
            params: params.clone(),
            return_hint: return_hint.clone(),
            module: self.module,
            line,
        };
        let id = self.ctx.add_function(Function {
            head,
            kind: FunctionKind::User { body, typed: None },
        });
        self.ctx.module_mut(self.module).fn_order.push(id);

        // Registration comes before body checking so recursion resolves.
        if let Some(owner) = &sig.name.owner {
            let known = self.ctx.module(self.module).types.contains_key(owner)
                || self.ctx.pool.primitive(owner.text()).is_some();
            if !known {
                return Err(self.name_err(
                    format!(
                        "associating functions to external types is forbidden. tried to associate to '{owner}'"
                    ),
                    line,
                ));
            }
            let owner_ty = self.import_type(&TypeExpr::Name(owner.clone()))?;
            self.ctx.pool.get_mut(owner_ty).assoc.insert(
                sig.name.name.clone(),
                AssocFn {
                    owner: owner_ty,
                    func: id,
                },
            );
        } else {
            self.ctx
                .module_mut(self.module)
                .functions
                .insert(sig.name.name.clone(), id);
        }

        if !is_generic {
            let return_ty = return_hint
                .resolved()
                .ok_or_else(|| self.internal_err("unresolved return type", line))?;

            let typed = self.with_scope(|checker| {
                for (name, hint) in &params {
                    let ty = hint.resolved().ok_or_else(|| {
                        checker.internal_err("unresolved parameter type", line)
                    })?;
                    checker
                        .ctx
                        .module_mut(checker.module)
                        .scope
                        .bind_argument(name.clone(), ty);
                }
                let body = match &checker.ctx.function(id).kind {
                    FunctionKind::User { body, .. } => body.clone(),
                    FunctionKind::Extern => unreachable!("externs carry no body"),
                };
                checker.check_body(&body, return_ty)
            })?;

            if let FunctionKind::User { typed: slot, .. } = &mut self.ctx.function_mut(id).kind {
                *slot = Some(typed);
            }
        }

        debug!(function = %sig.name, module = %self.module_name(), "checked function");
        Ok(id)
    }

    /// A top-level `let`: checked in the module scope, emitted as a C
    /// global.
    fn check_global(&mut self, decl: VarDecl) -> Result<()> {
        let typed = self.check_variable_declaration(&decl)?;
        if let gullian_types::typed::TypedStmt::Let { name, ty, value } = typed {
            self.ctx
                .module_mut(self.module)
                .globals
                .push((name, ty, value));
        }
        Ok(())
    }

    fn check_import(&mut self, import: &gullian_ir::ast::ImportDecl) -> Result<()> {
        let dotted = import.dotted();
        let relative: PathBuf = import
            .path
            .iter()
            .map(Name::text)
            .collect::<PathBuf>()
            .with_extension("gullian");

        let file = if relative.is_file() {
            relative.clone()
        } else if let Some(home) = self
            .ctx
            .home
            .as_ref()
            .map(|home| home.join(&relative))
            .filter(|p| p.is_file())
        {
            home
        } else {
            let hint = if self.ctx.home.is_some() {
                ""
            } else {
                " Make sure GULLIAN_HOME is set"
            };
            return Err(self.import_err(
                format!("can't import gullian module {dotted}, file not found.{hint}"),
                import.line,
            ));
        };

        // A cyclic import resolves to the in-progress module instead of
        // reparsing.
        let imported = match self.ctx.find_module(&dotted) {
            Some(existing) => existing,
            None => {
                debug!(module = %dotted, file = %file.display(), "parsing imported module");
                let source = std::fs::read_to_string(&file).map_err(|io| {
                    self.import_err(
                        format!("can't import gullian module {dotted}: {io}"),
                        import.line,
                    )
                })?;
                let imported = self.ctx.add_module(dotted.clone());
                let tokens = gullian_lexer::lex(&source, &dotted)?;
                let items = gullian_parse::parse(tokens, &dotted)?;
                Checker::new(self.ctx, imported).check_items(items)?;
                imported
            }
        };

        self.ctx
            .module_mut(self.module)
            .imports
            .insert(import.last().clone(), imported);
        Ok(())
    }
}

#[cfg(test)]
mod tests;
