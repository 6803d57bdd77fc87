//! Name mangling, C type references, type definitions and prototypes.

use gullian_types::{FnId, TypeDecl, TypeId, TypeName};

use crate::CGen;

impl<'ctx> CGen<'ctx> {
    /// Mangled C identifier of a type.
    ///
    /// Plain names pass through; memoized instantiations mangle as
    /// `I_<uid>_S_<head>_<args>`; pointer specializations render as
    /// `<inner>*`.
    pub(crate) fn mangle_type(&self, ty: TypeId) -> String {
        let record = self.ctx.pool.get(ty);
        match &record.name {
            TypeName::Ident(name) => name.text().to_string(),
            TypeName::Applied { head, args } => {
                let args = args
                    .iter()
                    .map(|&arg| self.mangle_type(arg))
                    .collect::<Vec<_>>()
                    .join("_");
                format!("I_{}_S_{head}_{args}", record.uid)
            }
            TypeName::Pointer(inner) => format!("{}*", self.mangle_type(*inner)),
        }
    }

    /// Mangled C identifier of a function.
    ///
    /// Externs and plain functions keep their names; associated functions
    /// mangle as `A_<owner>_<name>`; monomorphized instances carry an
    /// `I_<uid>_S_` prefix where the uid is the function's arena id.
    pub(crate) fn mangle_fn(&self, func: FnId) -> String {
        let head = &self.ctx.function(func).head;
        let base = match &head.owner {
            Some(owner) => format!("A_{owner}_{}", head.name),
            None => head.name.text().to_string(),
        };
        if head.spec_args.is_empty() {
            base
        } else {
            let args = head
                .spec_args
                .iter()
                .map(|&arg| self.mangle_type(arg))
                .collect::<Vec<_>>()
                .join("_");
            format!("I_{}_S_{base}_{args}", func.uid())
        }
    }

    /// The C type used to declare a value of `ty`. Aggregates get a
    /// `struct ` prefix; enums use their typedef name; primitives rely on
    /// the preamble `#define`s.
    pub(crate) fn c_type(&self, ty: TypeId) -> String {
        let record = self.ctx.pool.get(ty);
        if let TypeName::Pointer(inner) = &record.name {
            return format!("{}*", self.c_type(*inner));
        }
        let mangled = self.mangle_type(ty);
        match &record.decl {
            Some(TypeDecl::Struct(_) | TypeDecl::Union(_)) => format!("struct {mangled}"),
            _ => mangled,
        }
    }

    /// Emit the C definition of a checked type.
    pub(crate) fn emit_type_definition(&mut self, ty: TypeId) {
        let Some(decl) = &self.ctx.pool.get(ty).decl else {
            return;
        };
        let mangled = self.mangle_type(ty);

        match decl {
            TypeDecl::Struct(decl) => {
                let fields = decl
                    .fields
                    .iter()
                    .filter_map(|(name, hint)| {
                        hint.resolved()
                            .map(|field_ty| format!("{} {name}", self.c_type(field_ty)))
                    })
                    .collect::<Vec<_>>()
                    .join("; ");
                self.out.line(&format!("struct {mangled}{{{fields}; }};"));
            }
            TypeDecl::Union(decl) => {
                let tags = decl
                    .fields
                    .iter()
                    .map(|(name, _)| format!("{mangled}__{name}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                let fields = decl
                    .fields
                    .iter()
                    .filter_map(|(name, hint)| {
                        hint.resolved()
                            .map(|field_ty| format!("{} {name}", self.c_type(field_ty)))
                    })
                    .collect::<Vec<_>>()
                    .join("; ");
                self.out
                    .line(&format!("enum {mangled}_FIELDS {{ {tags} }};"));
                self.out.line(&format!(
                    "struct {mangled}{{int tag; union {{{fields}; }}; }};"
                ));
            }
            TypeDecl::Enum(decl) => {
                let variants = decl
                    .variants
                    .iter()
                    .map(|name| format!("{mangled}__{name}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                self.out
                    .line(&format!("typedef enum {{ {variants} }} {mangled};"));
            }
        }
    }

    /// Emit a function prototype, or a comment marking an extern whose
    /// real declaration comes from the preamble includes.
    pub(crate) fn emit_prototype(&mut self, func: FnId) {
        let function = self.ctx.function(func);
        if function.is_extern() {
            self.out
                .line(&format!("// extern: {}", function.head.display()));
            return;
        }

        let signature = self.function_signature(func);
        self.out.line(&format!("{signature};"));
    }

    /// `RET MANGLED(T a, U b)` for heads and prototypes.
    pub(crate) fn function_signature(&self, func: FnId) -> String {
        let head = &self.ctx.function(func).head;
        let params = head
            .params
            .iter()
            .filter_map(|(name, hint)| {
                hint.resolved()
                    .map(|param_ty| format!("{} {name}", self.c_type(param_ty)))
            })
            .collect::<Vec<_>>()
            .join(", ");
        let return_ty = head
            .return_hint
            .resolved()
            .map_or_else(|| "void".to_string(), |ty| self.c_type(ty));
        format!("{return_ty} {}({params})", self.mangle_fn(func))
    }
}
