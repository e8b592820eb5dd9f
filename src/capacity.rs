//! Capacity sizing policy.
//!
//! A table's slot count is the smallest power of two that is at least the
//! requested minimum. Power-of-two sizes let the probe sequence reduce
//! indices with a mask and guarantee that triangular probing visits every
//! slot exactly once.

use core::alloc::Layout;
use core::fmt::{Debug, Formatter, Result as FmtResult};
use core::num::NonZeroUsize;

use crate::error::CreateError;
use crate::slot::Slot;

/// A validated slot count: non-zero and a power of two.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Capacity(NonZeroUsize);

impl Capacity {
    /// Rounds `min_capacity` up to the next power of two.
    ///
    /// ```
    /// use fixed_hashtable::Capacity;
    ///
    /// assert_eq!(Capacity::new(1).unwrap().get(), 1);
    /// assert_eq!(Capacity::new(16).unwrap().get(), 16);
    /// assert_eq!(Capacity::new(1000).unwrap().get(), 1024);
    /// assert!(Capacity::new(0).is_err());
    /// ```
    pub const fn new(min_capacity: usize) -> Result<Self, CreateError> {
        if min_capacity == 0 {
            return Err(CreateError::ZeroCapacity);
        }
        let Some(rounded) = min_capacity.checked_next_power_of_two() else {
            return Err(CreateError::CapacityOverflow);
        };
        match NonZeroUsize::new(rounded) {
            Some(n) => Ok(Self(n)),
            None => Err(CreateError::ZeroCapacity),
        }
    }

    /// Returns the slot count.
    #[inline]
    pub const fn get(self) -> usize {
        self.0.get()
    }

    /// Returns the base-2 logarithm of the slot count.
    #[inline]
    pub const fn log2(self) -> u32 {
        self.0.trailing_zeros()
    }

    /// Mask reducing a hash or probe position to a slot index.
    #[inline]
    pub(crate) const fn mask(self) -> usize {
        self.0.get() - 1
    }

    /// Layout of a slot array with this many `Slot<K, V>` entries.
    pub fn layout<K, V>(self) -> Result<Layout, CreateError> {
        Layout::array::<Slot<K, V>>(self.get()).map_err(|_| CreateError::CapacityOverflow)
    }
}

impl Debug for Capacity {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{:?} (1 << {:?})", self.0, self.log2())
    }
}

impl From<Capacity> for usize {
    #[inline]
    fn from(other: Capacity) -> Self {
        other.get()
    }
}
