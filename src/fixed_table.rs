//! FixedTable: the open-addressing engine.

use core::fmt;
use core::iter::{Enumerate, FusedIterator};
use core::marker::PhantomData;
use core::mem::MaybeUninit;

use crate::capacity::Capacity;
use crate::error::{CreateError, InsertError};
use crate::key_ops::{DefaultOps, KeyOps};
use crate::probe::ProbeSeq;
use crate::slot::{Slot, SlotState};
use crate::storage::{Owned, Placed, Storage};

/// A fixed-capacity hash table with open addressing and tombstones.
///
/// `O` supplies the hash and equality functions; `S` is the slot storage,
/// either [`Owned`] (the default) or [`Placed`] inside caller memory.
pub struct FixedTable<K, V, O = DefaultOps, S = Owned<K, V>> {
    slots: S,
    capacity: Capacity,
    len: usize,
    // Occupied + Tombstone slots.
    used: usize,
    _ops: PhantomData<(fn() -> O, K, V)>,
}

/// A [`FixedTable`] laid over caller-provided bytes.
pub type PlacedTable<'a, K, V, O = DefaultOps> = FixedTable<K, V, O, Placed<'a, K, V>>;

/// Result of walking the probe sequence for one key.
enum Probe {
    /// Slot holding the key.
    Found(usize),
    /// First reusable slot on the sequence: a tombstone if one was passed,
    /// otherwise the empty slot that ended the walk.
    Vacant(usize),
    /// No matching, empty or tombstone slot on the whole sequence.
    Full,
}

impl<K, V, O> FixedTable<K, V, O> {
    /// Creates a table with at least `min_capacity` slots.
    ///
    /// Fails when `min_capacity` is zero or the slot array cannot be
    /// allocated. The capacity is rounded up to a power of two.
    pub fn create(min_capacity: usize) -> Result<Self, CreateError> {
        let capacity = Capacity::new(min_capacity).inspect_err(|e| {
            log::debug!("fixed table creation failed for {min_capacity} slots: {e}");
        })?;
        let slots = Owned::new(capacity).inspect_err(|e| {
            log::debug!("fixed table creation failed for {min_capacity} slots: {e}");
        })?;
        log::trace!("created fixed table: requested={min_capacity}, capacity={capacity:?}");
        Ok(Self::from_storage(slots, capacity))
    }
}

impl<'a, K, V, O> FixedTable<K, V, O, Placed<'a, K, V>> {
    /// Initialises a table with at least `min_capacity` slots inside `buf`.
    ///
    /// `buf` must hold at least [`size_of::<K, V>(min_capacity)`] bytes; its
    /// address needs no particular alignment. The table never allocates.
    ///
    /// [`size_of::<K, V>(min_capacity)`]: crate::storage::size_of
    pub fn init_in(
        buf: &'a mut [MaybeUninit<u8>],
        min_capacity: usize,
    ) -> Result<Self, CreateError> {
        let capacity = Capacity::new(min_capacity)?;
        let slots = Placed::init(buf, capacity).inspect_err(|e| {
            log::debug!("fixed table placement failed for {min_capacity} slots: {e}");
        })?;
        log::trace!("placed fixed table: requested={min_capacity}, capacity={capacity:?}");
        Ok(Self::from_storage(slots, capacity))
    }
}

impl<K, V, O, S> FixedTable<K, V, O, S> {
    fn from_storage(slots: S, capacity: Capacity) -> Self {
        Self {
            slots,
            capacity,
            len: 0,
            used: 0,
            _ops: PhantomData,
        }
    }

    /// Number of live entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Total slot count, fixed for the table's lifetime.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.capacity.get()
    }

    /// Number of tombstone slots left behind by deletions.
    #[inline]
    pub fn tombstones(&self) -> usize {
        self.used - self.len
    }
}

impl<K, V, O, S> FixedTable<K, V, O, S>
where
    S: Storage<K, V>,
{
    /// State of the slot at `index`, or `None` if out of range.
    pub fn slot_state(&self, index: usize) -> Option<SlotState> {
        self.slots.slots().get(index).map(Slot::state)
    }

    /// Resets every slot to empty, dropping all entries. Capacity is unchanged.
    pub fn clear(&mut self) {
        log::trace!(
            "clearing fixed table: len={}, tombstones={}",
            self.len,
            self.tombstones()
        );
        for slot in self.slots.slots_mut() {
            *slot = Slot::Empty;
        }
        self.len = 0;
        self.used = 0;
    }

    /// Iterates `(index, &key, &value)` over occupied slots in bucket order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            it: self.slots.slots().iter().enumerate(),
            remaining: self.len,
        }
    }

    /// Iterates `(index, &key, &mut value)` over occupied slots in bucket order.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            it: self.slots.slots_mut().iter_mut().enumerate(),
            remaining: self.len,
        }
    }

    /// Removes every entry, yielding owned pairs in bucket order.
    ///
    /// The table is empty once the iterator is dropped, whether or not it
    /// was exhausted. A leaked iterator leaves the slots it has not reached
    /// in place, still counted.
    pub fn drain(&mut self) -> Drain<'_, K, V> {
        Drain {
            it: self.slots.slots_mut().iter_mut(),
            len: &mut self.len,
            used: &mut self.used,
        }
    }
}

impl<K, V, O, S> FixedTable<K, V, O, S>
where
    O: KeyOps<K>,
    S: Storage<K, V>,
{
    fn probe(&self, key: &K) -> Probe {
        let slots = self.slots.slots();
        let mut vacant = None;
        for index in ProbeSeq::new(O::hash(key), self.capacity) {
            match &slots[index] {
                Slot::Empty => return Probe::Vacant(vacant.unwrap_or(index)),
                Slot::Tombstone => {
                    if vacant.is_none() {
                        vacant = Some(index);
                    }
                }
                Slot::Occupied { key: k, .. } if O::eq(k, key) => return Probe::Found(index),
                Slot::Occupied { .. } => {}
            }
        }
        vacant.map_or(Probe::Full, Probe::Vacant)
    }

    fn find(&self, key: &K) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        match self.probe(key) {
            Probe::Found(index) => Some(index),
            Probe::Vacant(_) | Probe::Full => None,
        }
    }

    fn occupy(&mut self, index: usize, key: K, value: V) {
        let slot = &mut self.slots.slots_mut()[index];
        if matches!(slot, Slot::Empty) {
            self.used += 1;
        }
        *slot = Slot::Occupied { key, value };
        self.len += 1;
    }

    fn table_full(&self) -> InsertError {
        log::debug!(
            "fixed table full: len={}, tombstones={}, capacity={}",
            self.len,
            self.tombstones(),
            self.capacity()
        );
        InsertError::TableFull
    }

    /// Inserts an entry for a key that is not yet present.
    ///
    /// Reuses the first tombstone on the key's probe sequence if there is
    /// one. Fails with [`InsertError::DuplicateKey`] if the key is present
    /// and with [`InsertError::TableFull`] if no slot is free.
    pub fn insert(&mut self, key: K, value: V) -> Result<(), InsertError> {
        match self.probe(&key) {
            Probe::Found(_) => Err(InsertError::DuplicateKey),
            Probe::Vacant(index) => {
                self.occupy(index, key, value);
                Ok(())
            }
            Probe::Full => Err(self.table_full()),
        }
    }

    /// Inserts or overwrites. Returns the previous value if the key was present.
    pub fn update(&mut self, key: K, value: V) -> Result<Option<V>, InsertError> {
        match self.probe(&key) {
            Probe::Found(index) => Ok(self.slots.slots_mut()[index]
                .entry_mut()
                .map(|(_, v)| core::mem::replace(v, value))),
            Probe::Vacant(index) => {
                self.occupy(index, key, value);
                Ok(None)
            }
            Probe::Full => Err(self.table_full()),
        }
    }

    /// Removes `key`, leaving a tombstone, and returns the owned entry.
    pub fn remove(&mut self, key: &K) -> Option<(K, V)> {
        let index = self.find(key)?;
        let entry = self.slots.slots_mut()[index].take_entry(Slot::Tombstone)?;
        self.len -= 1;
        Some(entry)
    }

    /// Removes `key`. Returns whether it was present.
    pub fn delete(&mut self, key: &K) -> bool {
        self.remove(key).is_some()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.get_key_value(key).map(|(_, v)| v)
    }

    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        let index = self.find(key)?;
        self.slots.slots()[index].entry()
    }

    /// Returns a copy of the value for `key`, or `default` if absent.
    pub fn get_or(&self, key: &K, default: V) -> V
    where
        V: Clone,
    {
        self.get(key).cloned().unwrap_or(default)
    }

    /// Mutable access to the value for `key`.
    ///
    /// The reference borrows the table, so no other operation can run on
    /// it until the reference is dropped.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let index = self.find(key)?;
        self.slots.slots_mut()[index].entry_mut().map(|(_, v)| v)
    }

    /// Upserts every entry of `src` into `self`.
    ///
    /// `self` is normally freshly created or cleared; its capacity may differ
    /// from `src`'s, and entries are rehashed into its own slots.
    pub fn copy_from<S2>(&mut self, src: &FixedTable<K, V, O, S2>) -> Result<(), InsertError>
    where
        K: Clone,
        V: Clone,
        S2: Storage<K, V>,
    {
        for (_, key, value) in src.iter() {
            self.update(key.clone(), value.clone())?;
        }
        Ok(())
    }

    /// Moves every entry into a new owned table with at least `min_capacity`
    /// slots, leaving `self` empty.
    ///
    /// This is the only way a table grows. On error `self` is untouched.
    pub fn rebuild(&mut self, min_capacity: usize) -> Result<FixedTable<K, V, O>, CreateError> {
        let mut target: FixedTable<K, V, O> = FixedTable::create(min_capacity)?;
        if target.capacity() < self.len {
            return Err(CreateError::InsufficientCapacity {
                len: self.len,
                capacity: target.capacity(),
            });
        }
        log::debug!(
            "rebuilding fixed table: len={}, capacity {} -> {}",
            self.len,
            self.capacity(),
            target.capacity()
        );
        for (key, value) in self.drain() {
            match target.probe(&key) {
                Probe::Vacant(index) => target.occupy(index, key, value),
                // Unreachable while keys are unique under `O::eq` and the
                // target holds `len` entries.
                Probe::Found(_) | Probe::Full => {
                    log::debug!(
                        "rebuild dropped an entry: len={}, capacity={}",
                        target.len,
                        target.capacity()
                    );
                    debug_assert!(false, "rebuild target rejected a source entry");
                }
            }
        }
        Ok(target)
    }
}

impl<K, V, O> Clone for FixedTable<K, V, O>
where
    K: Clone,
    V: Clone,
{
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            capacity: self.capacity,
            len: self.len,
            used: self.used,
            _ops: PhantomData,
        }
    }
}

impl<K, V, O, S> fmt::Debug for FixedTable<K, V, O, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
    S: Storage<K, V>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter().map(|(_, k, v)| (k, v))).finish()
    }
}

impl<'a, K, V, O, S> IntoIterator for &'a FixedTable<K, V, O, S>
where
    S: Storage<K, V>,
{
    type Item = (usize, &'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, O, S> IntoIterator for &'a mut FixedTable<K, V, O, S>
where
    S: Storage<K, V>,
{
    type Item = (usize, &'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// Iterator over immutable entries in `FixedTable`.
pub struct Iter<'a, K, V> {
    it: Enumerate<core::slice::Iter<'a, Slot<K, V>>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (usize, &'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let (index, (key, value)) = self.it.find_map(|(i, s)| s.entry().map(|e| (i, e)))?;
        self.remaining -= 1;
        Some((index, key, value))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            it: self.it.clone(),
            remaining: self.remaining,
        }
    }
}

/// Iterator over mutable entries in `FixedTable`.
pub struct IterMut<'a, K, V> {
    it: Enumerate<core::slice::IterMut<'a, Slot<K, V>>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (usize, &'a K, &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let (index, (key, value)) = self.it.find_map(|(i, s)| s.entry_mut().map(|e| (i, e)))?;
        self.remaining -= 1;
        Some((index, key, value))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}
impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// Draining iterator returned by [`FixedTable::drain`].
///
/// Slots are emptied as the iterator passes them and the table's counters
/// follow, so they stay exact even if the iterator is leaked.
pub struct Drain<'a, K, V> {
    it: core::slice::IterMut<'a, Slot<K, V>>,
    len: &'a mut usize,
    used: &'a mut usize,
}

impl<K, V> Iterator for Drain<'_, K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        for slot in self.it.by_ref() {
            match core::mem::replace(slot, Slot::Empty) {
                Slot::Empty => {}
                Slot::Tombstone => *self.used -= 1,
                Slot::Occupied { key, value } => {
                    *self.len -= 1;
                    *self.used -= 1;
                    return Some((key, value));
                }
            }
        }
        None
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        // Every live entry sits in a slot not yet passed.
        (*self.len, Some(*self.len))
    }
}

impl<K, V> ExactSizeIterator for Drain<'_, K, V> {}
impl<K, V> FusedIterator for Drain<'_, K, V> {}

impl<K, V> Drop for Drain<'_, K, V> {
    fn drop(&mut self) {
        for slot in self.it.by_ref() {
            *slot = Slot::Empty;
        }
        *self.len = 0;
        *self.used = 0;
    }
}
