// FixedTable scenario suite.
//
// Each test replays a reference scenario end to end through the public API.
// The core invariants exercised:
// - Counting: `len` equals the number of keys for which `contains_key` holds.
// - Upsert: `update` on an absent key behaves as `insert`; on a present key it
//   replaces the value and leaves `len` unchanged.
// - Tombstones: deleted slots are skipped by searches and reused by writes.
// - Copy: a copy iterates exactly the source's entries, with no duplicates.
// - Degenerate hashing: constant or near-constant hashes cost probes, never
//   correctness.
use fixed_hashtable::{fixed_table, CreateError, FixedTable};
use std::collections::HashSet;

/// 32-bit FNV-1a over the little-endian bytes of an `i32`.
fn fnv1a_32(key: i32) -> u64 {
    let mut h: u32 = 0x811c_9dc5;
    for b in key.to_le_bytes() {
        h ^= u32::from(b);
        h = h.wrapping_mul(0x0100_0193);
    }
    u64::from(h)
}

fixed_table! {
    type IntToInt = FixedTable<i32, i32> via IntToIntOps {
        hash: |key| fnv1a_32(*key),
        eq: |a, b| a == b,
    }
}

// Test: zero-capacity creation produces no table.
#[test]
fn create_zero_fails() {
    assert!(matches!(
        IntToInt::create(0),
        Err(CreateError::ZeroCapacity)
    ));
}

// Test: an empty single-slot table answers every lookup with "absent".
#[test]
fn single_slot_empty() {
    let mut m = IntToInt::create(1).unwrap();
    assert!(!m.contains_key(&42));
    assert!(!m.contains_key(&69));
    assert_eq!(m.get_or(&42, -1), -1);
    assert_eq!(m.get_or(&69, -1), -1);
    assert!(m.get_mut(&42).is_none());
    assert!(m.get_mut(&69).is_none());
    assert_eq!(m.len(), 0);
    assert_eq!(m.capacity(), 1);
    assert!(m.is_empty());
    assert!(!m.is_full());
}

// Test: one insert fills a single-slot table.
#[test]
fn single_slot_insert() {
    let mut m = IntToInt::create(1).unwrap();
    m.insert(42, 69).unwrap();

    assert!(m.contains_key(&42));
    assert_eq!(m.get_or(&42, -1), 69);
    assert_eq!(m.get_mut(&42).copied(), Some(69));

    assert!(!m.contains_key(&69));
    assert_eq!(m.get_or(&69, -1), -1);
    assert!(m.get_mut(&69).is_none());

    assert_eq!(m.len(), 1);
    assert_eq!(m.capacity(), 1);
    assert!(!m.is_empty());
    assert!(m.is_full());
}

// Test: insert, upsert, overwrite, delete, reinsert, then copy.
// Verifies: final count of 12, tombstone reuse, and a duplicate-free copy in
// which every expected key and value appears.
#[test]
fn sixteen_slot_lifecycle_and_copy() {
    let mut m = IntToInt::create(16).unwrap();

    // insert values (+10)
    for (k, v) in [(20, 421), (1, 422), (53, 423), (71, 424), (113, 425), (902, 426), (1302, 429)] {
        m.insert(k, v).unwrap();
    }
    assert_eq!(m.update(1375, 431), Ok(None));
    assert_eq!(m.update(0, 431), Ok(None));
    assert_eq!(m.update(555, 432), Ok(None));
    assert_eq!(m.len(), 10);

    // replacement of existing values (+0)
    assert_eq!(m.update(71, 23), Ok(Some(424)));
    assert_eq!(m.update(0, 31), Ok(Some(431)));
    assert_eq!(m.update(555, 32), Ok(Some(432)));
    assert_eq!(m.get_mut(&71).copied(), Some(23));
    assert_eq!(m.get_mut(&0).copied(), Some(31));
    assert_eq!(m.get_mut(&555).copied(), Some(32));
    assert_eq!(m.len(), 10);

    // deletion of existing values (-3)
    assert!(m.delete(&71));
    assert!(m.delete(&1302));
    assert!(m.delete(&555));

    // deletion of non-existing values
    assert!(!m.delete(&2));
    assert!(!m.delete(&3));
    assert!(!m.delete(&4));

    assert!(!m.contains_key(&71));
    assert!(!m.contains_key(&1302));
    assert!(!m.contains_key(&555));
    assert_eq!(m.tombstones(), 3);

    // reinsert previous values and others (+5)
    for (k, v) in [(555, 555), (2, 3), (71, 556), (3, 4), (4, 2)] {
        m.insert(k, v).unwrap();
    }
    assert_eq!(m.get_mut(&555).copied(), Some(555));
    assert_eq!(m.get_mut(&71).copied(), Some(556));

    assert_eq!(m.len(), 12);
    assert!(m.capacity() >= 15);
    assert!(!m.is_empty());
    assert!(!m.is_full());

    let mut copy = IntToInt::create(16).unwrap();
    copy.copy_from(&m).unwrap();
    drop(m);
    assert_eq!(copy.len(), 12);

    let mut keys = HashSet::new();
    let mut values = HashSet::new();
    for (_, k, v) in copy.iter() {
        assert!(keys.insert(*k), "duplicate key {k}");
        assert!(values.insert(*v), "duplicate value {v}");
    }
    let expected_keys: HashSet<i32> = [20, 1, 53, 71, 113, 902, 1375, 0, 555, 2, 3, 4].into();
    let expected_values: HashSet<i32> =
        [421, 422, 423, 425, 426, 431, 31, 555, 3, 556, 4, 2].into();
    assert_eq!(keys, expected_keys);
    assert_eq!(values, expected_values);
    for k in &expected_keys {
        assert!(copy.get(k).is_some(), "key {k} not recoverable");
    }
}

// Test: clear, then deletes of absent keys, then upserts into the cleared table.
#[test]
fn thousand_clear_then_update() {
    let mut m = IntToInt::create(1000).unwrap();
    for i in 0..1000 {
        m.insert(1_000_000 - 690 - i, 1_000_000 - i).unwrap();
    }
    m.clear();
    for i in -1000..1000 {
        assert!(!m.delete(&(1_000_000 - 690 - i)));
    }
    for i in 0..100 {
        m.update(1_000_000 - 690 - i, 1_000_000 - 420 - i).unwrap();
    }

    for i in 0..100 {
        assert_eq!(m.get_mut(&(1_000_000 - 690 - i)).copied(), Some(1_000_000 - 420 - i));
    }
    for i in 100..1000 {
        assert!(m.get_mut(&(1_000_000 - 690 - i)).is_none());
    }

    assert_eq!(m.len(), 100);
    assert!(m.capacity() >= 1000);
    assert!(!m.is_empty());
    assert!(!m.is_full());
}

// Test: one million entries, a deleted window, and an overlapping upsert window.
// Verifies: entries deleted and not re-upserted are absent; all others carry the
// upserted value; count is 999,500.
#[test]
fn million_entries_delete_and_update_windows() {
    const N: i32 = 1_000_000;
    let key = |i: i32| N - 420 - i;

    let mut m = IntToInt::create(N as usize).unwrap();
    for i in 0..N {
        m.insert(key(i), N - i).unwrap();
    }
    for i in 0..10_000 {
        assert!(m.delete(&key(i)));
    }
    for i in 500..10_500 {
        m.update(key(i), N - i).unwrap();
    }

    for i in 0..500 {
        assert!(m.get_mut(&key(i)).is_none());
    }
    for i in 500..N {
        assert_eq!(m.get_mut(&key(i)).copied(), Some(N - i));
    }

    assert_eq!(m.len(), (N - 500) as usize);
    assert!(m.capacity() >= N as usize);
    assert!(!m.is_empty());
    assert!(!m.is_full());
}

fn three_letters(i: usize) -> [u8; 3] {
    const M: usize = (b'z' - b'a' + 1) as usize;
    [
        b'a' + ((i / M / M) % M) as u8,
        b'a' + ((i / M) % M) as u8,
        b'a' + (i % M) as u8,
    ]
}

fn key_string(i: usize) -> String {
    String::from_utf8(three_letters(i).to_vec()).unwrap()
}

fn reversed_string(i: usize) -> String {
    let mut b = three_letters(i);
    b.reverse();
    String::from_utf8(b.to_vec()).unwrap()
}

fixed_table! {
    type ConstHashTable = FixedTable<String, usize> via ConstHashOps {
        hash: |_key| 0,
        eq: |a, b| a == b,
    }
}

fixed_table! {
    type FirstCharTable = FixedTable<String, String> via FirstCharOps {
        hash: |key| u64::from(key.bytes().next().unwrap_or(0)),
        eq: |a, b| a == b,
    }
}

// Test: every key hashes to the same slot.
// Verifies: all 1000 lookups still find their own value.
#[test]
fn constant_hash_thousand_strings() {
    let mut m = ConstHashTable::create(1000).unwrap();
    for i in 0..1000 {
        m.insert(key_string(i), i).unwrap();
    }
    for i in 0..1000 {
        assert_eq!(m.get_or(&key_string(i), usize::MAX), i);
    }
    assert_eq!(m.iter().count(), 1000);
}

// Test: a poor hash (first byte only) with owned string keys and values.
#[test]
fn first_char_hash_string_map() {
    let mut m = FirstCharTable::create(1000).unwrap();
    for i in 0..1000 {
        m.insert(key_string(i), reversed_string(i)).unwrap();
    }
    for i in 0..1000 {
        assert_eq!(m.get_mut(&key_string(i)).map(|v| v.as_str()), Some(reversed_string(i).as_str()));
    }
    // Owned payloads are released by the table itself on drop.
    drop(m);
}

#[derive(Clone, Copy, Debug)]
struct AStruct {
    foo: i32,
    bar: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BStruct {
    i: i32,
    j: i32,
}

/// 32-bit MurmurHash3 over `bytes`, seed 0.
fn murmur3_32(bytes: &[u8]) -> u32 {
    const C1: u32 = 0xcc9e_2d51;
    const C2: u32 = 0x1b87_3593;
    let mut h: u32 = 0;
    let mut chunks = bytes.chunks_exact(4);
    for chunk in chunks.by_ref() {
        let mut k = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        k = k.wrapping_mul(C1).rotate_left(15).wrapping_mul(C2);
        h ^= k;
        h = h.rotate_left(13).wrapping_mul(5).wrapping_add(0xe654_6b64);
    }
    let tail = chunks.remainder();
    if !tail.is_empty() {
        let mut k = 0u32;
        for (i, b) in tail.iter().enumerate() {
            k |= u32::from(*b) << (8 * i);
        }
        h ^= k.wrapping_mul(C1).rotate_left(15).wrapping_mul(C2);
    }
    h ^= bytes.len() as u32;
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^ (h >> 16)
}

fixed_table! {
    type StructTable = FixedTable<AStruct, BStruct> via StructOps {
        hash: |key| {
            let mut bytes = [0u8; 8];
            bytes[..4].copy_from_slice(&key.foo.to_le_bytes());
            bytes[4..].copy_from_slice(&key.bar.to_bits().to_le_bytes());
            u64::from(murmur3_32(&bytes))
        },
        eq: |a, b| a.foo == b.foo && (a.bar - b.bar).abs() < 0.0001,
    }
}

// Test: struct keys with an approximate float equality and a byte-wise hash.
#[test]
fn struct_keys_and_values() {
    let key = |i: i32| AStruct {
        foo: i,
        bar: i as f32 + 42.0,
    };
    let mut m = StructTable::create(1000).unwrap();
    for i in 0..1000 {
        m.insert(key(i), BStruct { i, j: i + 1 }).unwrap();
    }
    for i in (0..1000).step_by(2) {
        assert!(m.update(key(i), BStruct { i: i + 1, j: i + 2 }).unwrap().is_some());
    }
    for i in 0..1000 {
        let b = *m.get_mut(&key(i)).unwrap();
        if i % 2 == 0 {
            assert_eq!(b, BStruct { i: i + 1, j: i + 2 });
        } else {
            assert_eq!(b, BStruct { i, j: i + 1 });
        }
    }
}

// Test: borrowed keys. The table stores only the references; the strings they
// point to stay owned by the caller and outlive the table.
#[test]
fn borrowed_keys_leave_pointees_with_caller() {
    let names: Vec<String> = (0..50).map(key_string).collect();
    {
        let mut m: FixedTable<&str, usize> = FixedTable::create(64).unwrap();
        for (i, n) in names.iter().enumerate() {
            m.insert(n.as_str(), i).unwrap();
        }
        assert!(m.delete(&names[3].as_str()));
        m.clear();
        assert!(m.is_empty());
    }
    assert_eq!(names.len(), 50);
    assert_eq!(names[3], key_string(3));
}
