//! fixed-hashtable: a fixed-capacity, open-addressing hash table that never
//! allocates after construction.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a table whose every operation has a bounded, predictable cost,
//!   suitable for embedded and latency-sensitive code.
//! - Layers:
//!   - Capacity: sizing policy; the slot count is the requested minimum
//!     rounded up to a power of two.
//!   - ProbeSeq: triangular probing over the power-of-two slot array. One
//!     sequence per hash, a permutation of all slot indices, shared by
//!     every lookup and write.
//!   - Storage: the slot array, either owned (`Owned`) or initialised in
//!     caller memory (`Placed`, sized with [`storage::size_of`]).
//!   - FixedTable<K, V, O, S>: the engine. `O: KeyOps<K>` binds the hash
//!     and equality functions into the type.
//!
//! Slot states
//! - Each slot is Empty, Occupied, or Tombstone. A search walks the probe
//!   sequence and stops at the first Empty slot; Tombstones keep it going.
//! - Deleting marks the slot Tombstone. Nothing is shifted; a later insert
//!   or update whose walk reaches the tombstone reuses it.
//! - Only `clear` and `drain` turn tombstones back into Empty; `rebuild`
//!   drains its source.
//!
//! Constraints
//! - Capacity is fixed at construction. A full table reports
//!   `InsertError::TableFull`; growing is an explicit `rebuild` into a new,
//!   larger table.
//! - Single owner: mutation takes `&mut self`, so references returned by
//!   `get_mut`, `iter` and `iter_mut` cannot outlive the next mutation.
//! - The caller guarantees `eq(a, b) => hash(a) == hash(b)`. Violations
//!   cause missed lookups, never unsoundness.
//! - Even under a constant hash every operation terminates after at most
//!   `capacity` probes and answers membership correctly.
//!
//! ```
//! use fixed_hashtable::FixedTable;
//!
//! let mut table: FixedTable<u32, &str> = FixedTable::create(16).unwrap();
//! table.insert(1, "one").unwrap();
//! assert_eq!(table.update(1, "uno"), Ok(Some("one")));
//! assert_eq!(table.get_or(&2, "missing"), "missing");
//! assert!(table.delete(&1));
//! assert!(table.is_empty());
//! ```

mod capacity;
mod error;
pub mod fixed_table;
mod fixed_table_proptest;
mod key_ops;
pub mod probe;
mod slot;
pub mod storage;

// Public surface
pub use capacity::Capacity;
pub use error::{CreateError, InsertError};
pub use fixed_table::{FixedTable, PlacedTable};
pub use key_ops::{DefaultHasher, DefaultOps, KeyOps};
pub use slot::{Slot, SlotState};
