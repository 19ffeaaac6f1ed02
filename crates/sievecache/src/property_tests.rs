//! Property-based tests for the SIEVE cache
//!
//! Random operation traces are replayed against both the cache and a slow,
//! obviously-correct model kept as a plain vector.

use proptest::prelude::*;

use crate::SieveCache;

// == Test Configuration ==
const KEY_SPACE: u8 = 16;

// == Strategies ==
#[derive(Debug, Clone)]
enum CacheOp {
    Put { key: u8, value: u32 },
    Get { key: u8 },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (0..KEY_SPACE, any::<u32>()).prop_map(|(key, value)| CacheOp::Put { key, value }),
        (0..KEY_SPACE).prop_map(|key| CacheOp::Get { key }),
    ]
}

// == Reference Model ==
/// Entries ordered oldest first, each with its visited bit
struct Model {
    entries: Vec<(u8, u32, bool)>,
    hand: Option<u8>,
    capacity: usize,
}

impl Model {
    fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            hand: None,
            capacity,
        }
    }

    fn position(&self, key: u8) -> Option<usize> {
        self.entries.iter().position(|(k, _, _)| *k == key)
    }

    fn get(&mut self, key: u8) -> Option<u32> {
        let pos = self.position(key)?;
        self.entries[pos].2 = true;
        Some(self.entries[pos].1)
    }

    fn put(&mut self, key: u8, value: u32) -> bool {
        if let Some(pos) = self.position(key) {
            self.entries[pos].2 = true;
            return false;
        }
        if self.entries.len() >= self.capacity {
            self.evict();
        }
        self.entries.push((key, value, false));
        true
    }

    fn evict(&mut self) {
        let mut pos = self.hand.and_then(|k| self.position(k)).unwrap_or(0);
        let mut wrapped = false;
        loop {
            if !self.entries[pos].2 {
                break;
            }
            self.entries[pos].2 = false;
            pos += 1;
            if pos == self.entries.len() {
                if wrapped {
                    pos = 0;
                    break;
                }
                wrapped = true;
                pos = 0;
            }
        }
        self.hand = self.entries.get(pos + 1).map(|(k, _, _)| *k);
        self.entries.remove(pos);
    }

    /// Keys newest first, matching `SieveCache::keys`
    fn keys(&self) -> Vec<u8> {
        self.entries.iter().rev().map(|(k, _, _)| *k).collect()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // Every put/get outcome, the list order and the hand agree with the model.
    #[test]
    fn prop_matches_reference_model(
        capacity in 1usize..8,
        ops in prop::collection::vec(cache_op_strategy(), 1..200),
    ) {
        let mut cache = SieveCache::new(capacity).unwrap();
        let mut model = Model::new(capacity);

        for op in ops {
            match op {
                CacheOp::Put { key, value } => {
                    prop_assert_eq!(cache.put(key, value).unwrap(), model.put(key, value));
                }
                CacheOp::Get { key } => {
                    prop_assert_eq!(cache.get(&key).copied(), model.get(key));
                }
            }
            prop_assert_eq!(cache.keys().copied().collect::<Vec<_>>(), model.keys());
            prop_assert_eq!(cache.hand_key().copied(), model.hand);
        }
    }

    // Size never exceeds capacity and equals the number of resolvable keys.
    #[test]
    fn prop_size_bounded_and_consistent(
        capacity in 1usize..8,
        ops in prop::collection::vec(cache_op_strategy(), 1..200),
    ) {
        let mut cache = SieveCache::new(capacity).unwrap();

        for op in ops {
            match op {
                CacheOp::Put { key, value } => {
                    cache.put(key, value).unwrap();
                }
                CacheOp::Get { key } => {
                    cache.get(&key);
                }
            }
            cache.check_invariants();

            let resolvable = (0..KEY_SPACE).filter(|k| cache.contains_key(k)).count();
            prop_assert!(cache.len() <= capacity);
            prop_assert_eq!(cache.len(), resolvable);
            prop_assert_eq!(cache.keys().count(), resolvable);
        }
    }

    // A fresh insert is immediately readable with the value it was given.
    #[test]
    fn prop_round_trip(
        capacity in 1usize..8,
        pairs in prop::collection::vec((0..KEY_SPACE, any::<u32>()), 1..100),
    ) {
        let mut cache = SieveCache::new(capacity).unwrap();

        for (key, value) in pairs {
            if cache.put(key, value).unwrap() {
                prop_assert_eq!(cache.get(&key), Some(&value));
            } else {
                prop_assert!(cache.get(&key).is_some());
            }
        }
    }

    // Without hits, C + 1 distinct inserts evict exactly the first key.
    #[test]
    fn prop_fifo_without_hits(capacity in 1usize..32) {
        let mut cache = SieveCache::new(capacity).unwrap();

        for key in 0..=capacity {
            prop_assert!(cache.put(key, key).unwrap());
        }

        prop_assert!(!cache.contains_key(&0));
        for key in 1..=capacity {
            prop_assert!(cache.contains_key(&key));
        }
        prop_assert_eq!(cache.tail_key(), Some(&1));
    }

    // Re-putting a cached key never changes its value or the size.
    #[test]
    fn prop_touch_keeps_value(
        capacity in 1usize..8,
        key in 0..KEY_SPACE,
        first in any::<u32>(),
        second in any::<u32>(),
    ) {
        let mut cache = SieveCache::new(capacity).unwrap();

        prop_assert!(cache.put(key, first).unwrap());
        let len = cache.len();
        prop_assert!(!cache.put(key, second).unwrap());

        prop_assert_eq!(cache.len(), len);
        prop_assert_eq!(cache.peek(&key), Some(&first));
    }
}
