//! Error types for sievecache

use std::collections::TryReserveError;
use std::fmt;

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for cache operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Cache constructed with a capacity of zero
    ZeroCapacity,

    /// Could not allocate room for a new entry
    OutOfMemory(usize),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ZeroCapacity => write!(f, "Capacity must be greater than 0"),
            Error::OutOfMemory(slots) => {
                write!(f, "Out of memory: could not reserve {} entry slot(s)", slots)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<TryReserveError> for Error {
    fn from(_: TryReserveError) -> Self {
        Error::OutOfMemory(1)
    }
}
