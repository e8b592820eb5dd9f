//! Error types returned by table construction and insertion.

use std::collections::TryReserveError;

/// Reasons a table could not be constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateError {
    /// A capacity of zero was requested.
    ZeroCapacity,

    /// The rounded capacity or its slot array does not fit in the address space.
    CapacityOverflow,

    /// The slot array could not be allocated.
    AllocFailed(TryReserveError),

    /// A placement buffer is shorter than `size_of` for the requested capacity.
    BufferTooSmall { needed: usize, provided: usize },

    /// A rebuild target cannot hold the entries of the source table.
    InsufficientCapacity { len: usize, capacity: usize },
}

impl std::fmt::Display for CreateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroCapacity => f.write_str("requested capacity is zero"),
            Self::CapacityOverflow => f.write_str("requested capacity overflows the address space"),
            Self::AllocFailed(e) => write!(f, "slot array allocation failed: {e}"),
            Self::BufferTooSmall { needed, provided } => {
                write!(f, "placement buffer too small: need {needed} bytes, got {provided}")
            }
            Self::InsufficientCapacity { len, capacity } => {
                write!(f, "capacity {capacity} cannot hold {len} entries")
            }
        }
    }
}

impl std::error::Error for CreateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::AllocFailed(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TryReserveError> for CreateError {
    fn from(value: TryReserveError) -> Self {
        Self::AllocFailed(value)
    }
}

/// Reasons an entry could not be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertError {
    /// No empty or tombstone slot is reachable for the key.
    TableFull,

    /// `insert` was called with a key that is already present.
    DuplicateKey,
}

impl std::fmt::Display for InsertError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TableFull => f.write_str("table is full"),
            Self::DuplicateKey => f.write_str("key is already present"),
        }
    }
}

impl std::error::Error for InsertError {}
