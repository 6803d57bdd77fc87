//! The type pool: arena of every `Type` record in a compilation session.
//!
//! Identity is the `uid`, drawn from a monotonic counter. Handles are
//! [`TypeId`] indexes into the pool; two handles denote the same type
//! exactly when their records carry the same uid. The only records that
//! share a uid are pointer specializations, which all reuse the primitive
//! `ptr`'s uid.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use gullian_ir::Name;

use crate::decl::{AssocFn, TypeDecl};
use crate::module::ModuleId;

/// Handle to a record in the [`TypePool`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeId(u32);

impl TypeId {
    pub const TYPE: TypeId = TypeId(0);
    pub const MODULE: TypeId = TypeId(1);
    pub const VOID: TypeId = TypeId(2);
    pub const BOOL: TypeId = TypeId(3);
    pub const INT: TypeId = TypeId(4);
    pub const U8: TypeId = TypeId(5);
    pub const U16: TypeId = TypeId(6);
    pub const U32: TypeId = TypeId(7);
    pub const FLOAT: TypeId = TypeId(8);
    pub const STR: TypeId = TypeId(9);
    pub const BYTE: TypeId = TypeId(10);
    pub const CHAR: TypeId = TypeId(11);
    pub const PTR: TypeId = TypeId(12);
    pub const FUNCTION: TypeId = TypeId(13);
    pub const ANY: TypeId = TypeId(14);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Names of the built-in primitives, in pool order.
pub const PRIMITIVE_NAMES: &[&str] = &[
    "type", "module", "void", "bool", "int", "u8", "u16", "u32", "float", "str", "byte", "char",
    "ptr", "function", "any",
];

/// The canonical, fully resolved name of a type.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeName {
    /// A plain name: a primitive or a user declaration.
    Ident(Name),
    /// A memoized generic instantiation, e.g. `List[int]`.
    Applied {
        head: Name,
        args: SmallVec<[TypeId; 4]>,
    },
    /// A pointer specialization `ptr[T]`.
    Pointer(TypeId),
}

/// One record in the pool.
#[derive(Debug)]
pub struct Type {
    pub name: TypeName,
    pub uid: u32,
    pub decl: Option<TypeDecl>,
    /// Method table. Grows as associated functions are checked.
    pub assoc: FxHashMap<Name, AssocFn>,
    pub module: Option<ModuleId>,
}

#[derive(Debug)]
pub struct TypePool {
    types: Vec<Type>,
    /// pointee -> `ptr[pointee]` memo.
    pointers: FxHashMap<TypeId, TypeId>,
    next_uid: u32,
}

impl TypePool {
    /// Build a pool with every primitive registered once.
    pub fn new() -> Self {
        let mut pool = TypePool {
            types: Vec::with_capacity(32),
            pointers: FxHashMap::default(),
            next_uid: 0,
        };
        for name in PRIMITIVE_NAMES {
            pool.alloc(TypeName::Ident(Name::synthetic(*name)), None, None);
        }
        pool
    }

    fn fresh_uid(&mut self) -> u32 {
        let uid = self.next_uid;
        self.next_uid += 1;
        uid
    }

    /// Allocate a new type with a fresh uid.
    pub fn alloc(
        &mut self,
        name: TypeName,
        decl: Option<TypeDecl>,
        module: Option<ModuleId>,
    ) -> TypeId {
        let uid = self.fresh_uid();
        let id = TypeId(u32::try_from(self.types.len()).expect("type pool overflow"));
        self.types.push(Type {
            name,
            uid,
            decl,
            assoc: FxHashMap::default(),
            module,
        });
        id
    }

    #[inline]
    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: TypeId) -> &mut Type {
        &mut self.types[id.index()]
    }

    /// Type identity: uid equality.
    #[inline]
    pub fn identical(&self, a: TypeId, b: TypeId) -> bool {
        self.get(a).uid == self.get(b).uid
    }

    /// Look up a primitive by its source name.
    pub fn primitive(&self, name: &str) -> Option<TypeId> {
        PRIMITIVE_NAMES
            .iter()
            .position(|p| *p == name)
            .map(|i| TypeId(u32::try_from(i).expect("primitive table fits in u32")))
    }

    /// The `ptr[T]` specialization for a pointee, created on first use.
    ///
    /// The record shares primitive `ptr`'s uid: every pointer type is
    /// identical to every other for compatibility purposes. Member lookup
    /// sees through it to the pointee.
    pub fn pointer_to(&mut self, pointee: TypeId) -> TypeId {
        if let Some(&existing) = self.pointers.get(&pointee) {
            return existing;
        }
        let uid = self.get(TypeId::PTR).uid;
        let id = TypeId(u32::try_from(self.types.len()).expect("type pool overflow"));
        self.types.push(Type {
            name: TypeName::Pointer(pointee),
            uid,
            decl: None,
            assoc: FxHashMap::default(),
            module: None,
        });
        self.pointers.insert(pointee, id);
        id
    }

    /// The pointee of a pointer specialization, if `id` is one.
    pub fn pointee(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id).name {
            TypeName::Pointer(inner) => Some(inner),
            _ => None,
        }
    }

    /// True when `id` denotes `ptr` or any `ptr[T]`.
    pub fn is_pointer(&self, id: TypeId) -> bool {
        self.get(id).uid == self.get(TypeId::PTR).uid
    }

    /// True when `id` is one of the built-in primitives. Primitives occupy
    /// the first slots of the pool.
    pub fn is_primitive(&self, id: TypeId) -> bool {
        id.index() < PRIMITIVE_NAMES.len()
    }

    /// Canonical display name: `int`, `List[int]`, `ptr[char]`. Also the
    /// memoization key format for specializations.
    pub fn display(&self, id: TypeId) -> String {
        match &self.get(id).name {
            TypeName::Ident(name) => name.text().to_string(),
            TypeName::Applied { head, args } => {
                let args = args
                    .iter()
                    .map(|&arg| self.display(arg))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{head}[{args}]")
            }
            TypeName::Pointer(inner) => format!("ptr[{}]", self.display(*inner)),
        }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for TypePool {
    fn default() -> Self {
        TypePool::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn primitives_are_registered_once() {
        let pool = TypePool::new();
        assert_eq!(pool.len(), PRIMITIVE_NAMES.len());
        assert_eq!(pool.primitive("int"), Some(TypeId::INT));
        assert_eq!(pool.primitive("ptr"), Some(TypeId::PTR));
        assert_eq!(pool.primitive("missing"), None);
        assert_eq!(pool.display(TypeId::INT), "int");
    }

    #[test]
    fn fresh_uids_are_distinct() {
        let mut pool = TypePool::new();
        let a = pool.alloc(TypeName::Ident(Name::synthetic("A")), None, None);
        let b = pool.alloc(TypeName::Ident(Name::synthetic("B")), None, None);
        assert!(!pool.identical(a, b));
        assert!(pool.identical(a, a));
    }

    #[test]
    fn pointer_specializations_share_ptr_uid() {
        let mut pool = TypePool::new();
        let p_int = pool.pointer_to(TypeId::INT);
        let p_char = pool.pointer_to(TypeId::CHAR);
        assert!(pool.identical(p_int, TypeId::PTR));
        assert!(pool.identical(p_int, p_char));
        assert_eq!(pool.pointee(p_int), Some(TypeId::INT));
        assert_eq!(pool.display(p_char), "ptr[char]");
    }

    #[test]
    fn pointer_memoized_per_pointee() {
        let mut pool = TypePool::new();
        let a = pool.pointer_to(TypeId::INT);
        let b = pool.pointer_to(TypeId::INT);
        assert_eq!(a, b);
    }
}
