//! Slot representation.

/// Observable state of a bucket.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SlotState {
    /// Never written since construction or the last `clear`.
    Empty,
    /// Holds a live entry.
    Occupied,
    /// Held an entry that was deleted. Searches probe past it; writes may reuse it.
    Tombstone,
}

/// One bucket of the slot array.
#[derive(Clone, Debug)]
pub enum Slot<K, V> {
    Empty,
    Tombstone,
    Occupied { key: K, value: V },
}

impl<K, V> Slot<K, V> {
    #[inline]
    pub fn state(&self) -> SlotState {
        match self {
            Slot::Empty => SlotState::Empty,
            Slot::Tombstone => SlotState::Tombstone,
            Slot::Occupied { .. } => SlotState::Occupied,
        }
    }

    #[inline]
    pub fn is_occupied(&self) -> bool {
        matches!(self, Slot::Occupied { .. })
    }

    #[inline]
    pub(crate) fn entry(&self) -> Option<(&K, &V)> {
        match self {
            Slot::Occupied { key, value } => Some((key, value)),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn entry_mut(&mut self) -> Option<(&K, &mut V)> {
        match self {
            Slot::Occupied { key, value } => Some((&*key, value)),
            _ => None,
        }
    }

    /// Replaces the slot with `with`, returning the entry it held, if any.
    #[inline]
    pub(crate) fn take_entry(&mut self, with: Slot<K, V>) -> Option<(K, V)> {
        match core::mem::replace(self, with) {
            Slot::Occupied { key, value } => Some((key, value)),
            _ => None,
        }
    }
}
