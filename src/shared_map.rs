use parking_lot::RwLock;
use std::{borrow::Borrow, sync::Arc};

use crate::bidirectional_map::BidirectionalMap;

/// Wrapper for a BidirectionalMap which is shareable across thread
/// boundaries. Every operation takes the one lock guarding the whole map, so
/// nothing in progress is ever visible to another thread.
pub struct SharedBidirectionalMap<K, V>(Arc<RwLock<BidirectionalMap<K, V>>>)
where
    K: Ord + Clone,
    V: Ord + Clone;

impl<K, V> SharedBidirectionalMap<K, V>
where
    K: Ord + Clone,
    V: Ord + Clone,
{
    /// Wraps a map into a shared accessor, making it safe to move across
    /// thread boundaries. Enforces an additional constraint of Clone on both
    /// keys and values.
    pub fn with_map(map: BidirectionalMap<K, V>) -> Self {
        Self(Arc::from(RwLock::from(map)))
    }

    /// Adds a pair to the map. False if the key or the value was taken.
    pub fn put(&self, k: K, v: V) -> bool {
        self.0.write().put(k, v)
    }

    /// Get the value paired with a key. This clones it to minimize the lock
    /// time of the map.
    pub fn get_value<Q>(&self, k: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.0.read().get_value(k).cloned()
    }

    /// Get the key paired with a value, cloned.
    pub fn get_key<Q>(&self, v: &Q) -> Option<K>
    where
        V: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.0.read().get_key(v).cloned()
    }

    pub fn contains_key<Q>(&self, k: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.0.read().contains_key(k)
    }

    pub fn contains_value<Q>(&self, v: &Q) -> bool
    where
        V: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.0.read().contains_value(v)
    }

    /// Remove an entry by key, returning its value if it existed.
    pub fn remove<Q>(&self, k: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.0.write().remove(k)
    }

    /// Clears the map.
    pub fn clear(&self) {
        self.0.write().clear()
    }

    /// The number of entries in the map at present.
    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// See [`BidirectionalMap::in_order_traverse_by_keys`].
    pub fn in_order_traverse_by_keys(&self) -> String
    where
        K: std::fmt::Display,
        V: std::fmt::Display,
    {
        self.0.read().in_order_traverse_by_keys()
    }

    /// See [`BidirectionalMap::in_order_traverse_by_values`].
    pub fn in_order_traverse_by_values(&self) -> String
    where
        K: std::fmt::Display,
        V: std::fmt::Display,
    {
        self.0.read().in_order_traverse_by_values()
    }
}

impl<K, V> Clone for SharedBidirectionalMap<K, V>
where
    K: Ord + Clone,
    V: Ord + Clone,
{
    fn clone(&self) -> Self {
        SharedBidirectionalMap(self.0.clone())
    }
}
