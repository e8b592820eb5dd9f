#![cfg(test)]

// Property tests for FixedTable kept inside the crate next to the engine;
// they cross-check slot-state bookkeeping against a HashMap model.

use crate::error::InsertError;
use crate::fixed_table::FixedTable;
use crate::key_ops::KeyOps;
use crate::slot::SlotState;
use crate::storage::Storage;
use hashbrown::HashMap;
use proptest::prelude::*;
use std::collections::BTreeSet;

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    Update(usize, i32),
    Delete(usize),
    Get(usize),
    Mutate(usize, i32),
    Clear,
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,4}", 1..=24).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Update(i, v)),
            3 => idx.clone().prop_map(OpI::Delete),
            2 => idx.clone().prop_map(OpI::Get),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => Just(OpI::Clear),
            1 => Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Runs `ops` against `sut` and a HashMap model, checking after every step:
// - `len` equals the number of keys the model holds and `contains_key` agrees.
// - Insert/update fail with `TableFull` only when the table is full of live
//   entries; `insert` fails with `DuplicateKey` only for present keys.
// - Iteration yields each live entry once, in ascending slot order.
// - Occupied + tombstone slot counts match `len` and `tombstones()`.
fn run_scenario<O, S>(
    sut: &mut FixedTable<String, i32, O, S>,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError>
where
    O: KeyOps<String>,
    S: Storage<String, i32>,
{
    let mut model: HashMap<String, i32> = HashMap::new();

    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let k = pool[i].clone();
                match sut.insert(k.clone(), v) {
                    Ok(()) => {
                        prop_assert!(model.insert(k, v).is_none());
                    }
                    Err(InsertError::DuplicateKey) => prop_assert!(model.contains_key(&k)),
                    Err(InsertError::TableFull) => {
                        prop_assert!(!model.contains_key(&k));
                        prop_assert_eq!(model.len(), sut.capacity());
                    }
                }
            }
            OpI::Update(i, v) => {
                let k = pool[i].clone();
                match sut.update(k.clone(), v) {
                    Ok(prev) => prop_assert_eq!(prev, model.insert(k, v)),
                    Err(InsertError::TableFull) => {
                        prop_assert!(!model.contains_key(&k));
                        prop_assert_eq!(model.len(), sut.capacity());
                    }
                    Err(InsertError::DuplicateKey) => {
                        prop_assert!(false, "update never reports duplicates")
                    }
                }
            }
            OpI::Delete(i) => {
                let k = &pool[i];
                let present = model.remove(k).is_some();
                prop_assert_eq!(sut.delete(k), present);
                prop_assert!(!sut.contains_key(k));
                prop_assert!(!sut.delete(k));
            }
            OpI::Get(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.get(k), model.get(k));
                prop_assert_eq!(sut.get_or(k, i32::MIN), *model.get(k).unwrap_or(&i32::MIN));
            }
            OpI::Mutate(i, d) => {
                let k = &pool[i];
                match (sut.get_mut(k), model.get_mut(k)) {
                    (Some(sv), Some(mv)) => {
                        *sv = sv.wrapping_add(d);
                        *mv = mv.wrapping_add(d);
                    }
                    (None, None) => {}
                    _ => prop_assert!(false, "get_mut presence differs from model"),
                }
            }
            OpI::Clear => {
                let capacity = sut.capacity();
                sut.clear();
                model.clear();
                prop_assert_eq!(sut.capacity(), capacity);
                prop_assert_eq!(sut.tombstones(), 0);
            }
            OpI::Iterate => {
                let indices: Vec<usize> = sut.iter().map(|(i, _, _)| i).collect();
                prop_assert!(indices.windows(2).all(|w| w[0] < w[1]));
                let s: BTreeSet<(String, i32)> =
                    sut.iter().map(|(_, k, v)| (k.clone(), *v)).collect();
                let m: BTreeSet<(String, i32)> =
                    model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(s, m);
            }
        }

        // Post-conditions after each op
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert_eq!(sut.is_full(), model.len() == sut.capacity());
        let present: BTreeSet<&String> = pool.iter().filter(|k| sut.contains_key(k)).collect();
        prop_assert_eq!(present.len(), sut.len());

        let states: Vec<SlotState> = (0..sut.capacity())
            .filter_map(|i| sut.slot_state(i))
            .collect();
        let occupied = states.iter().filter(|s| **s == SlotState::Occupied).count();
        let tombstones = states.iter().filter(|s| **s == SlotState::Tombstone).count();
        prop_assert_eq!(occupied, sut.len());
        prop_assert_eq!(tombstones, sut.tombstones());
    }
    Ok(())
}

crate::fixed_table! {
    type ConstTable = FixedTable<String, i32> via ConstOps {
        hash: |_key| 0,
        eq: |a, b| a == b,
    }
}

// Property: State-machine equivalence against hashbrown::HashMap, on tables
// small enough that `TableFull` and tombstone reuse are routinely exercised.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario(), min_capacity in 1usize..=16) {
        let mut sut: FixedTable<String, i32> = FixedTable::create(min_capacity).unwrap();
        run_scenario(&mut sut, &pool, ops)?;
    }
}

// Property: Same state-machine invariants under worst-case collision
// behaviour (constant hash). Every key shares one probe sequence.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario(), min_capacity in 1usize..=16) {
        let mut sut = ConstTable::create(min_capacity).unwrap();
        run_scenario(&mut sut, &pool, ops)?;
    }
}

// Property: a copy iterates exactly the entries of its source.
proptest! {
    #[test]
    fn prop_copy_matches_source(entries in proptest::collection::hash_map(any::<u16>(), any::<u32>(), 0..64)) {
        let mut src: FixedTable<u16, u32> = FixedTable::create(64).unwrap();
        for (k, v) in &entries {
            src.insert(*k, *v).unwrap();
        }
        let mut dst: FixedTable<u16, u32> = FixedTable::create(entries.len().max(1)).unwrap();
        dst.copy_from(&src).unwrap();
        prop_assert_eq!(dst.len(), src.len());
        let a: BTreeSet<(u16, u32)> = src.iter().map(|(_, k, v)| (*k, *v)).collect();
        let b: BTreeSet<(u16, u32)> = dst.iter().map(|(_, k, v)| (*k, *v)).collect();
        prop_assert_eq!(a, b);
    }
}
