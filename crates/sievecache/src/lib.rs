//! # sievecache
//!
//! Fixed-capacity in-memory cache with SIEVE eviction.
//!
//! ## Architecture
//! - **HashMap**: AHash index from key to arena slot (O(1))
//! - **SIEVE List**: Doubly-linked list in insertion order, never reordered on a hit
//! - **Hand**: Persistent eviction cursor, amortizing scans across inserts
//! - **Shared**: Mutex-wrapped handle with hit/miss statistics
//!
//! ```
//! use sievecache::SieveCache;
//!
//! let mut cache = SieveCache::new(2).unwrap();
//! cache.put("a", 1).unwrap();
//! cache.put("b", 2).unwrap();
//! cache.get("a");
//! cache.put("c", 3).unwrap(); // "a" was visited, so "b" goes
//!
//! assert!(cache.contains_key("a"));
//! assert!(!cache.contains_key("b"));
//! ```

#![warn(missing_docs)]

mod error;
mod shared;
mod sieve;
mod stats;

#[cfg(test)]
mod property_tests;

pub use error::{Error, Result};
pub use shared::SharedSieveCache;
pub use sieve::{Iter, SieveCache};
pub use stats::{CacheStats, StatsSnapshot};
