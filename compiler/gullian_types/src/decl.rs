//! Declarations held by the module graph: type declarations and function
//! records.

use std::fmt;

use gullian_ir::ast::{Body, TypeExpr};
use gullian_ir::Name;

use crate::module::ModuleId;
use crate::pool::TypeId;
use crate::typed::TypedBody;

/// A type reference inside a declaration: the written hint until the
/// resolver replaces it with a pool handle. Generic declarations keep
/// their hints so instantiation can substitute into them.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeRef {
    Ast(TypeExpr),
    Resolved(TypeId),
}

impl TypeRef {
    pub fn resolved(&self) -> Option<TypeId> {
        match self {
            TypeRef::Resolved(id) => Some(*id),
            TypeRef::Ast(_) => None,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Ast(expr) => write!(f, "{expr}"),
            TypeRef::Resolved(id) => write!(f, "#{}", id.index()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct StructDecl {
    pub name: Name,
    pub fields: Vec<(Name, TypeRef)>,
    pub generics: Vec<Name>,
}

#[derive(Clone, Debug)]
pub struct UnionDecl {
    pub name: Name,
    /// Fields of a union are its variants.
    pub fields: Vec<(Name, TypeRef)>,
    pub generics: Vec<Name>,
}

#[derive(Clone, Debug)]
pub struct EnumDecl {
    pub name: Name,
    pub variants: Vec<Name>,
}

#[derive(Clone, Debug)]
pub enum TypeDecl {
    Struct(StructDecl),
    Union(UnionDecl),
    Enum(EnumDecl),
}

impl TypeDecl {
    pub fn name(&self) -> &Name {
        match self {
            TypeDecl::Struct(decl) => &decl.name,
            TypeDecl::Union(decl) => &decl.name,
            TypeDecl::Enum(decl) => &decl.name,
        }
    }

    pub fn generics(&self) -> &[Name] {
        match self {
            TypeDecl::Struct(decl) => &decl.generics,
            TypeDecl::Union(decl) => &decl.generics,
            TypeDecl::Enum(_) => &[],
        }
    }

    /// Typed fields, when this declaration has them (structs and unions).
    pub fn fields(&self) -> Option<&[(Name, TypeRef)]> {
        match self {
            TypeDecl::Struct(decl) => Some(&decl.fields),
            TypeDecl::Union(decl) => Some(&decl.fields),
            TypeDecl::Enum(_) => None,
        }
    }

    pub fn is_generic(&self) -> bool {
        !self.generics().is_empty()
    }
}

/// Handle into the session's function arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FnId(u32);

impl FnId {
    pub fn new(index: usize) -> Self {
        FnId(u32::try_from(index).expect("function arena overflow"))
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The uid used when mangling a specialized function.
    #[inline]
    pub fn uid(self) -> u32 {
        self.0
    }
}

#[derive(Clone, Debug)]
pub struct FunctionHead {
    /// Simple name: `main`, `push`.
    pub name: Name,
    /// Owner type name for associated functions (`List.push`).
    pub owner: Option<Name>,
    /// Type parameters of a generic definition.
    pub generics: Vec<Name>,
    /// Applied type arguments of a monomorphized instance.
    pub spec_args: Vec<TypeId>,
    pub params: Vec<(Name, TypeRef)>,
    pub return_hint: TypeRef,
    pub module: ModuleId,
    pub line: u32,
}

impl FunctionHead {
    pub fn is_generic(&self) -> bool {
        !self.generics.is_empty()
    }

    /// Diagnostic rendering: `fun push(...) : void`.
    pub fn display(&self) -> String {
        let owner = self
            .owner
            .as_ref()
            .map(|o| format!("{o}."))
            .unwrap_or_default();
        format!("fun {owner}{}(...) : {}", self.name, self.return_hint)
    }
}

#[derive(Clone, Debug)]
pub enum FunctionKind {
    Extern,
    User {
        body: Body,
        /// Filled by the checker; generic definitions stay `None` and only
        /// their instances carry typed bodies.
        typed: Option<TypedBody>,
    },
}

#[derive(Clone, Debug)]
pub struct Function {
    pub head: FunctionHead,
    pub kind: FunctionKind,
}

impl Function {
    pub fn is_extern(&self) -> bool {
        matches!(self.kind, FunctionKind::Extern)
    }

    pub fn typed_body(&self) -> Option<&TypedBody> {
        match &self.kind {
            FunctionKind::User { typed, .. } => typed.as_ref(),
            FunctionKind::Extern => None,
        }
    }
}

/// An entry in a type's method table.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AssocFn {
    pub owner: TypeId,
    pub func: FnId,
}
