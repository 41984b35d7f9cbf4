//! Intern table (flyweight) for hash-consing.
//!
//! An [`InternTable`] maps a content-derived key to the canonical value built
//! for it. The smart constructors keep one table per node kind, keyed by the
//! identities of the (already canonical) children plus any literal data such
//! as an operator tag or a field name.
//!
//! # Concurrency
//!
//! The table is backed by a sharded [`DashMap`], so construction of
//! different node kinds, and of unrelated keys of the same kind, proceeds in
//! parallel. The builder runs *outside* of any shard lock, which lets it
//! recursively intern into the same table. When two threads race to build
//! the same key, the first value published wins: the loser's candidate is
//! dropped and the loser returns the winner's value. Hence, after
//! [`get_or_add`][InternTable::get_or_add] returns, every caller observes a
//! single canonical value per key.
//!
//! # Keys
//!
//! Keys are compared structurally via `Hash + Eq`. Keys holding a sequence
//! of children use `Vec`, whose `Hash` and `Eq` are order-sensitive and
//! element-wise.
//!
//! The table never evicts. It lives as long as its owning
//! [`Context`][crate::context::Context].

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use log::trace;
use rustc_hash::FxBuildHasher;

/// Append-only, thread-safe key to value interning structure.
pub struct InternTable<K, V> {
    name: &'static str,
    map: DashMap<K, V, FxBuildHasher>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl<K, V> InternTable<K, V>
where
    K: Hash + Eq,
{
    /// Creates an empty table. The name is used in log messages only.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            map: DashMap::with_hasher(FxBuildHasher),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the number of entries in the table.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the number of lookups answered from the table.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    /// Returns the number of lookups that had to invoke the builder.
    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }
}

impl<K, V> InternTable<K, V>
where
    K: Hash + Eq + Debug,
    V: Clone,
{
    /// Returns the value stored under `key`, or builds, stores and returns a new one.
    ///
    /// `build` is invoked with `args` only when the key is absent, and is not
    /// invoked at all on a hit.
    pub fn get_or_add<A, F>(&self, key: K, args: A, build: F) -> V
    where
        F: FnOnce(A) -> V,
    {
        if let Some(entry) = self.map.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return entry.value().clone();
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        // No shard lock is held while building.
        let candidate = build(args);

        trace!("{}: publish {:?}", self.name, key);
        self.map.entry(key).or_insert(candidate).value().clone()
    }

    /// Looks up a key without building.
    pub fn get(&self, key: &K) -> Option<V> {
        self.map.get(key).map(|entry| entry.value().clone())
    }
}

/// Size and hit statistics of a single intern table.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TableStats {
    pub name: &'static str,
    pub len: usize,
    pub hits: usize,
    pub misses: usize,
}

impl<K, V> InternTable<K, V>
where
    K: Hash + Eq,
{
    pub fn stats(&self) -> TableStats {
        TableStats {
            name: self.name,
            len: self.len(),
            hits: self.hits(),
            misses: self.misses(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use test_log::test;

    use super::*;

    #[test]
    fn test_get_or_add_builds_once() {
        let table = InternTable::<(u64, u64), i32>::new("pairs");
        let calls = AtomicUsize::new(0);
        let build = |(a, b): (u64, u64)| {
            calls.fetch_add(1, Ordering::Relaxed);
            (a + b) as i32
        };

        assert_eq!(table.get_or_add((1, 2), (1, 2), build), 3);
        assert_eq!(table.get_or_add((1, 2), (1, 2), build), 3);
        assert_eq!(calls.load(Ordering::Relaxed), 1);
        assert_eq!(table.hits(), 1);
        assert_eq!(table.misses(), 1);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_vec_keys_are_order_sensitive() {
        let table = InternTable::<Vec<u64>, usize>::new("arrays");
        let a = table.get_or_add(vec![1, 2, 3], (), |_| 1);
        let b = table.get_or_add(vec![3, 2, 1], (), |_| 2);
        let c = table.get_or_add(vec![1, 2, 3], (), |_| 3);
        assert_eq!((a, b, c), (1, 2, 1));
    }

    #[test]
    fn test_recursive_build() {
        // The builder may intern into the same table.
        fn fib(table: &InternTable<u64, u64>, n: u64) -> u64 {
            table.get_or_add(n, n, |n| if n < 2 { n } else { fib(table, n - 1) + fib(table, n - 2) })
        }
        let table = InternTable::new("fib");
        assert_eq!(fib(&table, 40), 102_334_155);
        assert_eq!(table.len(), 41);
    }

    #[test]
    fn test_racing_builders_converge() {
        let table = InternTable::<u32, Arc<String>>::new("strings");
        let results: Vec<Arc<String>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let table = &table;
                    s.spawn(move || table.get_or_add(7, i, |i| Arc::new(format!("built by {}", i))))
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        for r in &results {
            assert!(Arc::ptr_eq(r, &results[0]));
        }
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_stats() {
        let table = InternTable::<u8, u8>::new("bytes");
        table.get_or_add(1, (), |_| 1);
        table.get_or_add(1, (), |_| 1);
        table.get_or_add(2, (), |_| 2);
        assert_eq!(
            table.stats(),
            TableStats {
                name: "bytes",
                len: 2,
                hits: 1,
                misses: 2,
            }
        );
        assert_eq!(table.get(&2), Some(2));
        assert_eq!(table.get(&3), None);
    }
}
