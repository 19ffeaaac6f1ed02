//! SIEVE (second-chance clock) cache implementation
//!
//! Entries live in an arena of slots linked into a doubly-linked list ordered
//! by insertion: head is the newest entry, tail the oldest. A hit only sets the
//! entry's visited bit, the list itself is never reordered. Eviction walks a
//! persistent hand from the tail toward the head, clearing visited bits until it
//! finds an unvisited entry.

use std::borrow::Borrow;
use std::collections::{HashMap, TryReserveError};
use std::hash::Hash;
use ahash::RandomState;
use tracing::debug;

use crate::error::{Error, Result};

/// Node in the SIEVE doubly-linked list
struct Node<K, V> {
    key: K,
    value: V,
    visited: bool,
    /// Newer neighbour (toward head)
    prev: Option<usize>,
    /// Older neighbour (toward tail)
    next: Option<usize>,
}

/// SIEVE cache with fixed capacity
///
/// Single-threaded. Wrap it in [`SharedSieveCache`](crate::SharedSieveCache)
/// to share one cache between threads.
pub struct SieveCache<K, V> {
    map: HashMap<K, usize, RandomState>,
    nodes: Vec<Option<Node<K, V>>>,
    head: Option<usize>,
    tail: Option<usize>,
    hand: Option<usize>,
    free_list: Vec<usize>,
    capacity: usize,
    #[cfg(test)]
    fail_next_reserve: bool,
}

impl<K, V> SieveCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create a new SIEVE cache with the given capacity
    ///
    /// # Errors
    /// * `Error::ZeroCapacity` - `capacity` is 0
    /// * `Error::OutOfMemory` - the arena or index could not be pre-sized
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::ZeroCapacity);
        }

        let oom = |_: TryReserveError| Error::OutOfMemory(capacity);

        let mut map = HashMap::with_hasher(RandomState::new());
        map.try_reserve(capacity).map_err(oom)?;
        let mut nodes = Vec::new();
        nodes.try_reserve_exact(capacity).map_err(oom)?;
        let mut free_list = Vec::new();
        free_list.try_reserve_exact(capacity).map_err(oom)?;

        Ok(Self {
            map,
            nodes,
            head: None,
            tail: None,
            hand: None,
            free_list,
            capacity,
            #[cfg(test)]
            fail_next_reserve: false,
        })
    }

    /// Look up a value, marking the entry as visited on a hit
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = *self.map.get(key)?;
        let node = self.nodes[idx].as_mut()?;
        node.visited = true;
        Some(&node.value)
    }

    /// Insert a key-value pair into the cache
    ///
    /// A key that is already cached is only touched: its visited bit is set and
    /// the stored value is left as it was.
    ///
    /// # Returns
    /// * `Ok(true)` - the key was inserted as the newest entry
    /// * `Ok(false)` - the key was already present
    ///
    /// # Errors
    /// * `Error::OutOfMemory` - no room could be allocated for the new entry;
    ///   the cache is left unchanged
    pub fn put(&mut self, key: K, value: V) -> Result<bool> {
        if let Some(&idx) = self.map.get(&key) {
            if let Some(node) = &mut self.nodes[idx] {
                node.visited = true;
            }
            return Ok(false);
        }

        // Reserve before touching the list so a failure leaves nothing half-linked
        self.reserve_entry()?;

        if self.map.len() >= self.capacity {
            self.evict();
        }

        let idx = self.alloc_node();
        self.nodes[idx] = Some(Node {
            key: key.clone(),
            value,
            visited: false,
            prev: None,
            next: self.head,
        });

        if let Some(head_idx) = self.head {
            if let Some(head) = &mut self.nodes[head_idx] {
                head.prev = Some(idx);
            }
        }

        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }

        self.map.insert(key, idx);
        Ok(true)
    }

    /// Check whether a key is cached without marking it visited
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(key)
    }

    /// Look up a value without marking it visited
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = *self.map.get(key)?;
        self.nodes[idx].as_ref().map(|node| &node.value)
    }

    /// Visited bit of a cached key, `None` if the key is not cached
    pub fn is_visited<Q>(&self, key: &Q) -> Option<bool>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = *self.map.get(key)?;
        self.nodes[idx].as_ref().map(|node| node.visited)
    }

    /// Get the current size of the cache
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Key of the newest entry
    pub fn head_key(&self) -> Option<&K> {
        self.key_at(self.head)
    }

    /// Key of the oldest entry
    pub fn tail_key(&self) -> Option<&K> {
        self.key_at(self.tail)
    }

    /// Key of the entry the next eviction scan starts from
    ///
    /// `None` means the scan starts from the tail.
    pub fn hand_key(&self) -> Option<&K> {
        self.key_at(self.hand)
    }

    /// Iterate over entries from newest to oldest
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            nodes: &self.nodes,
            current: self.head,
            remaining: self.map.len(),
        }
    }

    /// Iterate over keys from newest to oldest
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(key, _)| key)
    }

    /// Clear the cache, releasing every entry
    pub fn clear(&mut self) {
        self.map.clear();
        self.nodes.clear();
        self.free_list.clear();
        self.head = None;
        self.tail = None;
        self.hand = None;
    }

    fn reserve_entry(&mut self) -> Result<()> {
        #[cfg(test)]
        if std::mem::take(&mut self.fail_next_reserve) {
            return Err(Error::OutOfMemory(1));
        }

        self.map.try_reserve(1)?;
        if self.free_list.is_empty() && self.map.len() < self.capacity {
            self.nodes.try_reserve(1)?;
        }
        Ok(())
    }

    fn key_at(&self, idx: Option<usize>) -> Option<&K> {
        self.nodes[idx?].as_ref().map(|node| &node.key)
    }

    /// Remove one entry chosen by the SIEVE scan
    fn evict(&mut self) {
        let Some(victim) = self.find_victim() else {
            return;
        };

        self.hand = self.nodes[victim].as_ref().and_then(|node| node.prev);
        self.unlink(victim);

        if let Some(node) = self.nodes[victim].take() {
            self.map.remove(&node.key);
            self.free_node(victim);
        }
    }

    fn find_victim(&mut self) -> Option<usize> {
        let mut current = self.hand.or(self.tail);
        let mut wrapped = false;

        loop {
            let idx = current?;
            let node = self.nodes[idx].as_mut()?;
            if !node.visited {
                return Some(idx);
            }

            node.visited = false;
            current = node.prev;

            if current.is_none() {
                // Backstop only: one lap clears every bit, so a victim turns up first
                if wrapped {
                    debug!(capacity = self.capacity, "eviction scan wrapped twice, forcing tail");
                    return self.tail;
                }
                wrapped = true;
                current = self.tail;
            }
        }
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = if let Some(node) = &self.nodes[idx] {
            (node.prev, node.next)
        } else {
            return;
        };

        match prev {
            Some(prev_idx) => {
                if let Some(prev_node) = &mut self.nodes[prev_idx] {
                    prev_node.next = next;
                }
            }
            None => {
                self.head = next;
            }
        }

        match next {
            Some(next_idx) => {
                if let Some(next_node) = &mut self.nodes[next_idx] {
                    next_node.prev = prev;
                }
            }
            None => {
                self.tail = prev;
            }
        }
    }

    fn alloc_node(&mut self) -> usize {
        if let Some(idx) = self.free_list.pop() {
            idx
        } else {
            let idx = self.nodes.len();
            self.nodes.push(None);
            idx
        }
    }

    fn free_node(&mut self, idx: usize) {
        self.free_list.push(idx);
    }

    /// Panic if the list, the index and the hand disagree
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        assert!(self.map.len() <= self.capacity, "size exceeds capacity");

        let mut forward = Vec::new();
        let mut prev = None;
        let mut current = self.head;
        while let Some(idx) = current {
            let node = self.nodes[idx].as_ref().expect("linked slot is empty");
            assert_eq!(node.prev, prev, "broken prev link");
            assert_eq!(self.map.get(&node.key), Some(&idx), "index points elsewhere");
            forward.push(idx);
            assert!(forward.len() <= self.map.len(), "list is longer than index");
            prev = current;
            current = node.next;
        }
        assert_eq!(prev, self.tail, "tail is not the last node");
        assert_eq!(forward.len(), self.map.len(), "list and index sizes differ");

        let mut backward = Vec::new();
        let mut current = self.tail;
        while let Some(idx) = current {
            backward.push(idx);
            current = self.nodes[idx].as_ref().and_then(|node| node.prev);
        }
        backward.reverse();
        assert_eq!(forward, backward, "forward and backward walks differ");

        if let Some(hand) = self.hand {
            assert!(forward.contains(&hand), "hand points at a dead slot");
        }
    }
}

/// Iterator over cache entries from newest to oldest
pub struct Iter<'a, K, V> {
    nodes: &'a [Option<Node<K, V>>],
    current: Option<usize>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.current?;
        let node = self.nodes.get(idx)?.as_ref()?;
        self.current = node.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}
