// Append-only memoizing map.
//
// `LazyMap` backs the world-generation caches: a value is computed the first
// time its key is asked for and never recomputed or invalidated afterwards.
// Because generation is a pure function of the key, a cached value is always
// the value a fresh computation would return, and shared readers (every
// `GameState` snapshot holds the same `WorldGen`) can fill it through `&self`.
//
// Interior mutability is a `RefCell`. Borrows never escape a method, so a
// factory that itself reads the map cannot observe a live borrow.

use std::cell::RefCell;
use std::collections::BTreeMap;

#[derive(Debug)]
pub struct LazyMap<K, V> {
    cache: RefCell<BTreeMap<K, V>>,
}

impl<K, V> Default for LazyMap<K, V> {
    fn default() -> Self {
        Self {
            cache: RefCell::new(BTreeMap::new()),
        }
    }
}

impl<K: Ord + Clone, V: Clone> LazyMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached value for `key`, computing and storing it first if needed.
    pub fn get_or_compute(&self, key: K, compute: impl FnOnce(&K) -> V) -> V {
        if let Some(v) = self.cache.borrow().get(&key) {
            return v.clone();
        }
        let value = compute(&key);
        self.cache
            .borrow_mut()
            .entry(key)
            .or_insert(value)
            .clone()
    }

    /// The cached value, without computing.
    pub fn peek(&self, key: &K) -> Option<V> {
        self.cache.borrow().get(key).cloned()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.cache.borrow().contains_key(key)
    }

    /// Store precomputed entries. Keys already present keep their value.
    pub fn extend(&self, entries: impl IntoIterator<Item = (K, V)>) {
        let mut cache = self.cache.borrow_mut();
        for (k, v) in entries {
            cache.entry(k).or_insert(v);
        }
    }

    pub fn len(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.borrow().is_empty()
    }

    /// Snapshot of all cached entries, in key order.
    pub fn entries(&self) -> Vec<(K, V)> {
        self.cache
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}
