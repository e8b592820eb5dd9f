//! Backing storage for the slot array.
//!
//! A table either owns a boxed slot array (`Owned`) or is laid over bytes
//! supplied by the caller (`Placed`), e.g. an arena or a static buffer.
//! Both are allocated or initialised exactly once and never resized.

use core::marker::PhantomData;
use core::mem::MaybeUninit;
use core::ptr::{self, NonNull};
use core::slice;

use crate::capacity::Capacity;
use crate::error::CreateError;
use crate::slot::Slot;

mod private {
    pub trait Sealed {}
}

/// Access to an initialised slot array. Sealed: implemented by [`Owned`]
/// and [`Placed`] only.
pub trait Storage<K, V>: private::Sealed {
    fn slots(&self) -> &[Slot<K, V>];
    fn slots_mut(&mut self) -> &mut [Slot<K, V>];
}

/// Heap-allocated slot array owned by the table.
#[derive(Clone)]
pub struct Owned<K, V> {
    slots: Box<[Slot<K, V>]>,
}

impl<K, V> Owned<K, V> {
    pub(crate) fn new(capacity: Capacity) -> Result<Self, CreateError> {
        capacity.layout::<K, V>()?;
        let mut slots = Vec::new();
        slots.try_reserve_exact(capacity.get())?;
        slots.resize_with(capacity.get(), || Slot::Empty);
        Ok(Self {
            slots: slots.into_boxed_slice(),
        })
    }
}

impl<K, V> private::Sealed for Owned<K, V> {}

impl<K, V> Storage<K, V> for Owned<K, V> {
    #[inline]
    fn slots(&self) -> &[Slot<K, V>] {
        &self.slots
    }

    #[inline]
    fn slots_mut(&mut self) -> &mut [Slot<K, V>] {
        &mut self.slots
    }
}

/// Returns the number of bytes a caller must provide to place a table of at
/// least `min_capacity` slots with [`PlacedTable::init_in`].
///
/// The figure includes worst-case padding for aligning the slot array, so a
/// buffer of this length works at any address.
///
/// [`PlacedTable::init_in`]: crate::FixedTable::init_in
pub fn size_of<K, V>(min_capacity: usize) -> Result<usize, CreateError> {
    let capacity = Capacity::new(min_capacity)?;
    let layout = capacity.layout::<K, V>()?;
    layout
        .size()
        .checked_add(layout.align() - 1)
        .ok_or(CreateError::CapacityOverflow)
}

/// Slot array initialised in place inside caller-provided bytes.
///
/// Dropping it drops every live key and value but leaves the bytes to the
/// caller.
pub struct Placed<'a, K, V> {
    nonnull: NonNull<Slot<K, V>>,
    len: usize,
    _buf: PhantomData<&'a mut [Slot<K, V>]>,
}

impl<'a, K, V> Placed<'a, K, V> {
    pub(crate) fn init(
        buf: &'a mut [MaybeUninit<u8>],
        capacity: Capacity,
    ) -> Result<Self, CreateError> {
        let layout = capacity.layout::<K, V>()?;
        let needed = layout
            .size()
            .checked_add(layout.align() - 1)
            .ok_or(CreateError::CapacityOverflow)?;
        let provided = buf.len();

        let offset = buf.as_mut_ptr().align_offset(layout.align());
        match offset.checked_add(layout.size()) {
            Some(end) if end <= provided => {}
            _ => return Err(CreateError::BufferTooSmall { needed, provided }),
        }

        let base: NonNull<Slot<K, V>> = NonNull::from(&mut buf[offset..]).cast();
        for index in 0..capacity.get() {
            // SAFETY: `offset + capacity * size_of::<Slot>() <= buf.len()`, and
            // `base` is aligned for `Slot<K, V>`.
            unsafe { base.add(index).write(Slot::Empty) };
        }

        Ok(Self {
            nonnull: base,
            len: capacity.get(),
            _buf: PhantomData,
        })
    }
}

impl<K, V> private::Sealed for Placed<'_, K, V> {}

impl<K, V> Storage<K, V> for Placed<'_, K, V> {
    #[inline]
    fn slots(&self) -> &[Slot<K, V>] {
        // SAFETY: `len` slots were initialised in `init` and stay initialised
        // until `drop`; the buffer is exclusively borrowed for `'a`.
        unsafe { slice::from_raw_parts(self.nonnull.as_ptr(), self.len) }
    }

    #[inline]
    fn slots_mut(&mut self) -> &mut [Slot<K, V>] {
        // SAFETY: as in `slots`, with `&mut self` guaranteeing uniqueness.
        unsafe { slice::from_raw_parts_mut(self.nonnull.as_ptr(), self.len) }
    }
}

impl<K, V> Drop for Placed<'_, K, V> {
    fn drop(&mut self) {
        // SAFETY: every slot is initialised and is never touched again.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                self.nonnull.as_ptr(),
                self.len,
            ));
        }
    }
}

// SAFETY: `Placed` behaves like `&'a mut [Slot<K, V>]`.
unsafe impl<K: Send, V: Send> Send for Placed<'_, K, V> {}
// SAFETY: as above.
unsafe impl<K: Sync, V: Sync> Sync for Placed<'_, K, V> {}
