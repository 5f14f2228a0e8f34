//! # Common Types

cfg_if::cfg_if! {
    if #[cfg(feature = "ahash")] {
        /// Type Alias for hash maps in this crate.
        pub type WSHashMap<K, V> = ahash::AHashMap<K, V>;

        /// Type Alias for hash sets in this crate.
        pub type WSHashSet<V> = ahash::AHashSet<V>;

        /// Create a new hash map with the given capacity.
        pub fn hash_map_with_capacity<K, V>(capacity: usize) -> WSHashMap<K, V> {
            WSHashMap::with_capacity(capacity)
        }

        /// Create a new empty hash set.
        pub fn hash_set_new<V>() -> WSHashSet<V> {
            WSHashSet::new()
        }

    } else if #[cfg(feature = "foldhash")] {
        /// Type Alias for hash maps in this crate.
        pub type WSHashMap<K, V> = foldhash::HashMap<K, V>;

        /// Type Alias for hash sets in this crate.
        pub type WSHashSet<V> = foldhash::HashSet<V>;

        /// Create a new hash map with the given capacity.
        pub fn hash_map_with_capacity<K, V>(capacity: usize) -> WSHashMap<K, V> {
            foldhash::HashMapExt::with_capacity(capacity)
        }

        /// Create a new empty hash set.
        pub fn hash_set_new<V>() -> WSHashSet<V> {
            foldhash::HashSetExt::new()
        }

    } else {
        /// Type Alias for hash maps in this crate.
        pub type WSHashMap<K, V> = std::collections::HashMap<K, V>;

        /// Type Alias for hash sets in this crate.
        pub type WSHashSet<V> = std::collections::HashSet<V>;

        /// Create a new hash map with the given capacity.
        pub fn hash_map_with_capacity<K, V>(capacity: usize) -> WSHashMap<K, V> {
            WSHashMap::with_capacity(capacity)
        }

        /// Create a new empty hash set.
        pub fn hash_set_new<V>() -> WSHashSet<V> {
            WSHashSet::new()
        }
    }
}

/// A token occurrence count.
pub type Count = u64;

/// A 1-based position in the descending-count frequency order.
pub type Rank = usize;
