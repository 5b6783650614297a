//! LRU List Module
//!
//! Implements the recency-ordered entry storage used for LRU eviction.

use std::collections::HashMap;

use crate::cache::CacheEntry;
use crate::error::{CacheError, Result};

#[derive(Debug)]
struct Node<V> {
    key: String,
    entry: CacheEntry<V>,
    prev: Option<usize>,
    next: Option<usize>,
}

// == LRU List ==
/// Entries keyed by string, ordered by access time.
///
/// A hash map points each key at a slot of a slab-allocated, index-linked
/// doubly-linked list:
/// - Head = Least recently used
/// - Tail = Most recently used
///
/// Lookup, move-to-most-recent, removal and eviction of the oldest entry are
/// all O(1) on average.
#[derive(Debug)]
pub struct LruList<V> {
    /// Key -> slot index
    index: HashMap<String, usize>,
    /// Node storage; `None` marks a vacant slot
    slots: Vec<Option<Node<V>>>,
    /// Vacant slot indices available for reuse
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl<V> LruList<V> {
    // == Constructor ==
    /// Creates an empty list with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            index: HashMap::with_capacity(capacity),
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: None,
            tail: None,
        }
    }

    // == Lookup ==
    /// Returns the entry for `key` without changing its recency.
    pub fn get(&self, key: &str) -> Option<&CacheEntry<V>> {
        let idx = *self.index.get(key)?;
        Some(&self.node(idx).entry)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    // == Touch ==
    /// Marks a key as most recently used.
    ///
    /// Returns false if the key is not present.
    pub fn touch(&mut self, key: &str) -> bool {
        let Some(&idx) = self.index.get(key) else {
            return false;
        };
        if self.tail != Some(idx) {
            self.unlink(idx);
            self.link_back(idx);
        }
        true
    }

    // == Insert ==
    /// Stores `entry` under `key` as the most recently used entry.
    ///
    /// An existing entry for the key is replaced in place and returned.
    pub fn insert(&mut self, key: String, entry: CacheEntry<V>) -> Option<CacheEntry<V>> {
        if let Some(&idx) = self.index.get(&key) {
            let old = std::mem::replace(&mut self.node_mut(idx).entry, entry);
            self.touch(&key);
            return Some(old);
        }

        let node = Node {
            key: key.clone(),
            entry,
            prev: None,
            next: None,
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };
        self.index.insert(key, idx);
        self.link_back(idx);
        None
    }

    // == Remove ==
    /// Removes a key and returns its entry.
    pub fn remove(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let idx = self.index.remove(key)?;
        let (_, entry) = self.release(idx)?;
        Some(entry)
    }

    // == Pop Oldest ==
    /// Removes and returns the least recently used entry.
    ///
    /// Returns None if the list is empty.
    pub fn pop_oldest(&mut self) -> Option<(String, CacheEntry<V>)> {
        let idx = self.head?;
        let (key, entry) = self.release(idx)?;
        self.index.remove(&key);
        Some((key, entry))
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn clear(&mut self) {
        self.index.clear();
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
    }

    /// Iterates entries from least to most recently used.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    // == Verify ==
    /// Checks that the links, the key index and the slot storage agree.
    pub fn verify(&self) -> Result<()> {
        let mut count = 0;
        let mut prev = None;
        let mut cursor = self.head;

        while let Some(idx) = cursor {
            let node = self.slots.get(idx).and_then(Option::as_ref).ok_or_else(|| {
                CacheError::Internal(format!("recency list links to vacant slot {}", idx))
            })?;
            if node.prev != prev {
                return Err(CacheError::Internal(format!(
                    "broken back link at key '{}'",
                    node.key
                )));
            }
            if self.index.get(&node.key) != Some(&idx) {
                return Err(CacheError::Internal(format!(
                    "key '{}' is not indexed at its slot",
                    node.key
                )));
            }
            count += 1;
            if count > self.index.len() {
                return Err(CacheError::Internal("recency list has a cycle".to_string()));
            }
            prev = Some(idx);
            cursor = node.next;
        }

        if prev != self.tail {
            return Err(CacheError::Internal("tail does not end the list".to_string()));
        }
        if count != self.index.len() {
            return Err(CacheError::Internal(format!(
                "recency list holds {} nodes but {} keys are indexed",
                count,
                self.index.len()
            )));
        }
        Ok(())
    }

    // == Internal Linking ==
    // Invariant: every index entry, head, tail and link points at an occupied slot.
    fn node(&self, idx: usize) -> &Node<V> {
        self.slots[idx].as_ref().expect("indexed slot is vacant")
    }

    fn node_mut(&mut self, idx: usize) -> &mut Node<V> {
        self.slots[idx].as_mut().expect("indexed slot is vacant")
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = {
            let node = self.node(idx);
            (node.prev, node.next)
        };
        match prev {
            Some(p) => self.node_mut(p).next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.node_mut(n).prev = prev,
            None => self.tail = prev,
        }
        let node = self.node_mut(idx);
        node.prev = None;
        node.next = None;
    }

    fn link_back(&mut self, idx: usize) {
        let old_tail = self.tail;
        {
            let node = self.node_mut(idx);
            node.prev = old_tail;
            node.next = None;
        }
        match old_tail {
            Some(t) => self.node_mut(t).next = Some(idx),
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
    }

    /// Unlinks a slot and frees it. The caller drops the index entry.
    fn release(&mut self, idx: usize) -> Option<(String, CacheEntry<V>)> {
        if self.slots.get(idx)?.is_none() {
            return None;
        }
        self.unlink(idx);
        let node = self.slots[idx].take()?;
        self.free.push(idx);
        Some((node.key, node.entry))
    }
}

/// Iterator over `(key, entry)` pairs, least recently used first.
pub struct Iter<'a, V> {
    list: &'a LruList<V>,
    cursor: Option<usize>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a CacheEntry<V>);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.list.node(self.cursor?);
        self.cursor = node.next;
        Some((node.key.as_str(), &node.entry))
    }
}
