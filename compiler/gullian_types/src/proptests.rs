//! Property tests over the type pool's identity rules.

use proptest::prelude::*;

use gullian_ir::Name;

use crate::pool::{TypeId, TypeName, TypePool, PRIMITIVE_NAMES};

proptest! {
    /// Identity is uid equality: freshly allocated types never collide,
    /// and every handle is identical to itself.
    #[test]
    fn fresh_types_never_collide(count in 1usize..64) {
        let mut pool = TypePool::new();
        let ids: Vec<TypeId> = (0..count)
            .map(|i| pool.alloc(TypeName::Ident(Name::synthetic(format!("T{i}"))), None, None))
            .collect();

        for (i, &a) in ids.iter().enumerate() {
            prop_assert!(pool.identical(a, a));
            for &b in &ids[i + 1..] {
                prop_assert!(!pool.identical(a, b));
            }
        }
    }

    /// uids are a monotonic counter: allocation order is uid order.
    #[test]
    fn uids_are_monotonic(count in 1usize..32) {
        let mut pool = TypePool::new();
        let mut last = None;
        for i in 0..count {
            let id = pool.alloc(TypeName::Ident(Name::synthetic(format!("T{i}"))), None, None);
            let uid = pool.get(id).uid;
            if let Some(previous) = last {
                prop_assert!(uid > previous);
            }
            last = Some(uid);
        }
    }

    /// Every pointer specialization is identical to `ptr` and to every
    /// other pointer, and is memoized per pointee.
    #[test]
    fn pointers_share_identity(indices in proptest::collection::vec(0usize..PRIMITIVE_NAMES.len(), 1..8)) {
        let mut pool = TypePool::new();
        let pointees: Vec<TypeId> = indices
            .iter()
            .map(|&i| pool.primitive(PRIMITIVE_NAMES[i]).expect("primitive"))
            .collect();

        let pointers: Vec<TypeId> = pointees.iter().map(|&p| pool.pointer_to(p)).collect();

        for &p in &pointers {
            prop_assert!(pool.identical(p, TypeId::PTR));
        }
        for (&pointee, &pointer) in pointees.iter().zip(&pointers) {
            prop_assert_eq!(pool.pointer_to(pointee), pointer);
        }
    }
}

#[test]
fn primitives_resolve_to_fixed_handles() {
    let pool = TypePool::new();
    // The same primitive reached through any path is the same record.
    for (i, name) in PRIMITIVE_NAMES.iter().enumerate() {
        let id = pool.primitive(name).expect("primitive exists");
        assert_eq!(id.index(), i);
        assert_eq!(pool.display(id), *name);
    }
}
