//! Data model of the Gullian compiler: the type pool, declarations, the
//! module graph with its scopes, and the typed AST.
//!
//! Ownership is arena-style: the [`Context`] owns every module, type and
//! function; everything else refers to them through stable handles
//! ([`ModuleId`], [`TypeId`], [`FnId`]).

pub mod decl;
pub mod module;
pub mod pool;
pub mod typed;

pub use decl::{
    AssocFn, EnumDecl, FnId, Function, FunctionHead, FunctionKind, StructDecl, TypeDecl, TypeRef,
    UnionDecl,
};
pub use module::{Binding, BindingKind, Context, Module, ModuleId, Scope};
pub use pool::{Type, TypeId, TypeName, TypePool, PRIMITIVE_NAMES};

#[cfg(test)]
mod proptests;
