//! Hash and equality behaviour bound into a table type.
//!
//! A table is parameterized over a zero-sized `KeyOps` implementor instead
//! of a hasher value, so the hash and equality functions are part of the
//! type: `FixedTable<u32, u32, A>` and `FixedTable<u32, u32, B>` are
//! unrelated types even though they store the same key and value.
//!
//! The caller owns the consistency obligation `eq(a, b) => hash(a) == hash(b)`.
//! Breaking it makes lookups miss; it never makes the table unsound.

use core::hash::{BuildHasher, BuildHasherDefault, Hash, Hasher};
use core::marker::PhantomData;
use hashbrown::hash_map::DefaultHashBuilder;

/// Hash and equality functions over `K`.
pub trait KeyOps<K: ?Sized> {
    fn hash(key: &K) -> u64;
    fn eq(a: &K, b: &K) -> bool;
}

/// `Hasher` behind hashbrown's `DefaultHashBuilder`.
pub type DefaultHasher = <DefaultHashBuilder as BuildHasher>::Hasher;

/// `KeyOps` backed by `K: Hash + Eq` and a `Hasher` built with `Default`.
///
/// Every hash starts from `H::default()`, so the same key always lands on
/// the same probe sequence. Randomly seeded builders such as `RandomState`
/// are not hashers and cannot be named here:
///
/// ```compile_fail
/// use fixed_hashtable::{DefaultOps, FixedTable};
/// use std::collections::hash_map::RandomState;
///
/// let m: FixedTable<u32, u32, DefaultOps<RandomState>> = FixedTable::create(8).unwrap();
/// m.contains_key(&1);
/// ```
pub struct DefaultOps<H = DefaultHasher>(PhantomData<fn() -> H>);

impl<K, H> KeyOps<K> for DefaultOps<H>
where
    K: ?Sized + Hash + Eq,
    H: Hasher + Default,
{
    #[inline]
    fn hash(key: &K) -> u64 {
        BuildHasherDefault::<H>::default().hash_one(key)
    }

    #[inline]
    fn eq(a: &K, b: &K) -> bool {
        a == b
    }
}

/// Defines a named table type with its own hash and equality functions.
///
/// ```
/// use fixed_hashtable::fixed_table;
///
/// fixed_table! {
///     /// Case-insensitive ASCII string keys.
///     pub type NoCaseMap = FixedTable<String, u32> via NoCaseOps {
///         hash: |key| key.bytes().fold(0u64, |h, b| h.wrapping_mul(31) ^ u64::from(b.to_ascii_lowercase())),
///         eq: |a, b| a.eq_ignore_ascii_case(b),
///     }
/// }
///
/// let mut m = NoCaseMap::create(8).unwrap();
/// m.insert("Hello".to_string(), 1).unwrap();
/// assert!(m.contains_key(&"HELLO".to_string()));
/// ```
#[macro_export]
macro_rules! fixed_table {
    (
        $(#[$meta:meta])*
        $vis:vis type $name:ident = FixedTable<$key:ty, $value:ty> via $ops:ident {
            hash: |$hk:ident| $hash:expr,
            eq: |$ea:ident, $eb:ident| $eq:expr $(,)?
        }
    ) => {
        #[derive(Clone, Copy, Debug, Default)]
        $vis struct $ops;

        impl $crate::KeyOps<$key> for $ops {
            #[inline]
            fn hash($hk: &$key) -> u64 {
                $hash
            }

            #[inline]
            fn eq($ea: &$key, $eb: &$key) -> bool {
                $eq
            }
        }

        $(#[$meta])*
        $vis type $name = $crate::FixedTable<$key, $value, $ops>;
    };
}
