//! Modules, lexical scopes and the compilation session.

use std::path::PathBuf;

use rustc_hash::FxHashMap;

use gullian_ir::Name;

use crate::decl::{FnId, Function};
use crate::pool::{TypeId, TypePool};
use crate::typed::TypedExpr;

/// Handle into the session's module arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ModuleId(u32);

impl ModuleId {
    pub fn new(index: usize) -> Self {
        ModuleId(u32::try_from(index).expect("module arena overflow"))
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a scope knows about a bound name.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BindingKind {
    Variable,
    Argument,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    pub ty: TypeId,
    pub kind: BindingKind,
}

/// The mutable lexical scope of a module.
///
/// Saved (cloned) on entry to every function body, `if` arm, loop body and
/// generic specialization, and restored on every exit path.
#[derive(Clone, Debug, Default)]
pub struct Scope {
    pub variables: FxHashMap<Name, Binding>,
    /// Aliases installed while checking a generic body: `T -> int`.
    pub type_variables: FxHashMap<Name, TypeId>,
    /// Union variants proven live by a dominating test guard, keyed by the
    /// union type's uid.
    pub type_guards: Vec<(u32, Name)>,
}

impl Scope {
    pub fn new() -> Self {
        Scope::default()
    }

    pub fn bind_variable(&mut self, name: Name, ty: TypeId) {
        self.variables.insert(
            name,
            Binding {
                ty,
                kind: BindingKind::Variable,
            },
        );
    }

    pub fn bind_argument(&mut self, name: Name, ty: TypeId) {
        self.variables.insert(
            name,
            Binding {
                ty,
                kind: BindingKind::Argument,
            },
        );
    }

    pub fn has_guard(&self, uid: u32, variant: &Name) -> bool {
        self.type_guards
            .iter()
            .any(|(guard_uid, guard_variant)| *guard_uid == uid && guard_variant == variant)
    }
}

/// One compilation unit.
#[derive(Debug)]
pub struct Module {
    pub name: String,
    /// Free functions and externs by simple name.
    pub functions: FxHashMap<Name, FnId>,
    /// Monomorphized functions by fully-applied name, e.g. `id[int]`.
    pub fn_specs: FxHashMap<String, FnId>,
    /// Declared types by simple name.
    pub types: FxHashMap<Name, TypeId>,
    /// Memoized generic instantiations by fully-applied name,
    /// e.g. `List[int]`.
    pub type_specs: FxHashMap<String, TypeId>,
    pub imports: FxHashMap<Name, ModuleId>,
    pub scope: Scope,
    /// `#include ` lines harvested from comments, forwarded to the C
    /// output verbatim.
    pub includes: Vec<String>,
    /// Top-level `let` declarations, emitted as C globals.
    pub globals: Vec<(Name, TypeId, TypedExpr)>,
    /// Types in declaration/instantiation order; C definitions follow it.
    pub decl_order: Vec<TypeId>,
    /// Functions in declaration/specialization order.
    pub fn_order: Vec<FnId>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Module {
            name: name.into(),
            functions: FxHashMap::default(),
            fn_specs: FxHashMap::default(),
            types: FxHashMap::default(),
            type_specs: FxHashMap::default(),
            imports: FxHashMap::default(),
            scope: Scope::new(),
            includes: Vec::new(),
            globals: Vec::new(),
            decl_order: Vec::new(),
            fn_order: Vec::new(),
        }
    }
}

/// The compilation session: owns every module, type and function.
///
/// Back-references between types, methods and modules are stable handles
/// into these arenas rather than pointers.
#[derive(Debug)]
pub struct Context {
    pub pool: TypePool,
    pub functions: Vec<Function>,
    pub modules: Vec<Module>,
    /// `GULLIAN_HOME` fallback root for imports.
    pub home: Option<PathBuf>,
}

impl Context {
    pub fn new() -> Self {
        Context {
            pool: TypePool::new(),
            functions: Vec::new(),
            modules: Vec::new(),
            home: None,
        }
    }

    pub fn add_module(&mut self, name: impl Into<String>) -> ModuleId {
        let id = ModuleId::new(self.modules.len());
        self.modules.push(Module::new(name));
        id
    }

    #[inline]
    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id.index()]
    }

    #[inline]
    pub fn module_mut(&mut self, id: ModuleId) -> &mut Module {
        &mut self.modules[id.index()]
    }

    pub fn add_function(&mut self, function: Function) -> FnId {
        let id = FnId::new(self.functions.len());
        self.functions.push(function);
        id
    }

    #[inline]
    pub fn function(&self, id: FnId) -> &Function {
        &self.functions[id.index()]
    }

    #[inline]
    pub fn function_mut(&mut self, id: FnId) -> &mut Function {
        &mut self.functions[id.index()]
    }

    /// Find a module of the session by its dotted name.
    ///
    /// This is the import cycle breaker: the arena holds every module ever
    /// created, including ones whose check is still in progress, so a
    /// cyclic import resolves to the in-progress module instead of
    /// reparsing it.
    pub fn find_module(&self, name: &str) -> Option<ModuleId> {
        self.modules
            .iter()
            .position(|module| module.name == name)
            .map(ModuleId::new)
    }
}

impl Default for Context {
    fn default() -> Self {
        Context::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn find_module_sees_in_progress_modules() {
        let mut ctx = Context::new();
        let root = ctx.add_module("main");
        let vec = ctx.add_module("std.vec");

        assert_eq!(ctx.find_module("std.vec"), Some(vec));
        assert_eq!(ctx.find_module("main"), Some(root));
        assert_eq!(ctx.find_module("std.map"), None);
    }

    #[test]
    fn guards_match_on_uid_and_variant() {
        let mut scope = Scope::new();
        scope.type_guards.push((7, Name::synthetic("some")));
        assert!(scope.has_guard(7, &Name::synthetic("some")));
        assert!(!scope.has_guard(7, &Name::synthetic("none")));
        assert!(!scope.has_guard(8, &Name::synthetic("some")));
    }
}
