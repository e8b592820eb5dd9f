//! Probe sequence shared by every lookup and write.
//!
//! Attempt `i` visits `(hash + i * (i + 1) / 2) mod capacity`. For a
//! power-of-two capacity the triangular offsets form a permutation of the
//! slot indices, so a full walk of `capacity` attempts sees every slot once
//! and always terminates.

use crate::capacity::Capacity;

/// Closed form of the probe sequence: slot index visited on `attempt`.
#[inline]
pub fn probe_index(hash: u64, attempt: usize, capacity: Capacity) -> usize {
    let offset = attempt.wrapping_mul(attempt.wrapping_add(1)) / 2;
    (hash as usize).wrapping_add(offset) & capacity.mask()
}

/// Iterator over the slot indices for one hash, `capacity` items long.
#[derive(Clone, Debug)]
pub(crate) struct ProbeSeq {
    pos: usize,
    stride: usize,
    mask: usize,
    remaining: usize,
}

impl ProbeSeq {
    #[inline]
    pub(crate) fn new(hash: u64, capacity: Capacity) -> Self {
        Self {
            pos: hash as usize & capacity.mask(),
            stride: 0,
            mask: capacity.mask(),
            remaining: capacity.get(),
        }
    }
}

impl Iterator for ProbeSeq {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let pos = self.pos;
        self.remaining -= 1;
        self.stride += 1;
        self.pos = (self.pos + self.stride) & self.mask;
        Some(pos)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for ProbeSeq {}

impl core::iter::FusedIterator for ProbeSeq {}
