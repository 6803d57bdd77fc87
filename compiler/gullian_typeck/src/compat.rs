//! The type compatibility lattice.

use gullian_types::{TypeId, TypePool};

/// Directed compatibility, tried in both directions.
///
/// `any` is compatible with everything; `ptr` accepts `str` and `int`;
/// `int` accepts `bool`, `char`, `type` and the unsigned widths; otherwise
/// only identity (uid equality) holds.
pub fn compatible(pool: &TypePool, left: TypeId, right: TypeId) -> bool {
    pool.identical(left, right) || one_way(pool, left, right) || one_way(pool, right, left)
}

fn one_way(pool: &TypePool, left: TypeId, right: TypeId) -> bool {
    if pool.identical(left, TypeId::ANY) || pool.identical(right, TypeId::ANY) {
        return true;
    }

    if pool.identical(left, TypeId::PTR) {
        return pool.identical(right, TypeId::STR) || pool.identical(right, TypeId::INT);
    }

    if pool.identical(left, TypeId::INT) {
        return pool.identical(right, TypeId::BOOL)
            || pool.identical(right, TypeId::CHAR)
            || pool.identical(right, TypeId::TYPE)
            || pool.identical(right, TypeId::U8)
            || pool.identical(right, TypeId::U16)
            || pool.identical(right, TypeId::U32);
    }

    false
}
