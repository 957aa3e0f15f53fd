//! A map that can be read from either side: key to value and value to key.

use std::{
    borrow::Borrow,
    fmt::{self, Debug, Display},
    iter::FromIterator,
};

use crate::error::{InvariantViolation, TreeSide};
use crate::tracing_helpers::{debug_log, trace_log};
use crate::tree::Tree;

/// A one-to-one map that looks up values by key and keys by value, both in
/// O(log n) on reasonably shuffled input.
///
/// Keys and values each live in their own binary search tree, and every node
/// in one tree is linked to its partner in the other. Neither side tolerates
/// duplicates: [`put`](Self::put) refuses a pair if either its key or its
/// value is already present, rather than overwriting anything.
///
/// The trees are never rebalanced, so inserting in sorted order degrades
/// every operation to O(n).
pub struct BidirectionalMap<K, V>
where
    K: Ord,
    V: Ord,
{
    keys: Tree<K>,
    values: Tree<V>,
    size: usize,
}

impl<K, V> BidirectionalMap<K, V>
where
    K: Ord,
    V: Ord,
{
    /// Makes a new, empty map.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Makes a new map with room for `capacity` entries before either tree
    /// has to grow.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            keys: Tree::with_capacity(capacity),
            values: Tree::with_capacity(capacity),
            size: 0,
        }
    }

    /// Whether some entry has this key.
    pub fn contains_key<Q>(&self, k: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get_value(k).is_some()
    }

    /// Whether some entry has this value.
    pub fn contains_value<Q>(&self, v: &Q) -> bool
    where
        V: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get_key(v).is_some()
    }

    /// The number of entries in the map.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Adds the pair `k <-> v`. Returns false, leaving the map untouched, if
    /// either `k` or `v` is already in the map.
    pub fn put(&mut self, k: K, v: V) -> bool {
        let key_taken = self.contains_key(&k);
        let value_taken = self.contains_value(&v);
        if key_taken || value_taken {
            trace_log!(key_taken, value_taken, "rejected duplicate pair");
            return false;
        }

        // each node is built knowing where its partner is about to land
        let k_handle = self.keys.next_handle();
        let v_handle = self.values.next_handle();
        let inserted_k = self.keys.insert(k, v_handle);
        let inserted_v = self.values.insert(v, k_handle);
        debug_assert_eq!(k_handle, inserted_k);
        debug_assert_eq!(v_handle, inserted_v);

        self.size += 1;

        #[cfg(test)]
        self.assert_valid();

        true
    }

    /// Gets the value paired with `k`.
    pub fn get_value<Q>(&self, k: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.keys
            .find(k)
            .map(|handle| self.values.item(self.keys.link(handle)))
    }

    /// Gets the key paired with `v`.
    pub fn get_key<Q>(&self, v: &Q) -> Option<&K>
    where
        V: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.values
            .find(v)
            .map(|handle| self.keys.item(self.values.link(handle)))
    }

    /// Removes the entry with key `k`, returning its value if there was one.
    pub fn remove<Q>(&mut self, k: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let k_handle = self.keys.find(k)?;

        let removed_k = self.keys.remove(k_handle);
        if let Some((slot, partner)) = removed_k.relinked {
            trace_log!(slot = slot.index(), "key predecessor moved up");
            self.values.set_link(partner, slot);
        }

        // the value node is removed by handle, not searched for again
        let removed_v = self.values.remove(removed_k.link);
        if let Some((slot, partner)) = removed_v.relinked {
            trace_log!(slot = slot.index(), "value predecessor moved up");
            self.keys.set_link(partner, slot);
        }

        self.size -= 1;
        debug_log!(len = self.size, "removed entry");

        #[cfg(test)]
        self.assert_valid();

        Some(removed_v.item)
    }

    /// Empties the map.
    pub fn clear(&mut self) {
        debug_log!(len = self.size, "clearing map");
        self.keys.clear();
        self.values.clear();
        self.size = 0;
    }

    /// Lists every entry as `"(key, value)"`, ordered by key and separated by
    /// commas, e.g. `"(apple, 3), (banana, 5)"`. Empty maps give `""`.
    pub fn in_order_traverse_by_keys(&self) -> String
    where
        K: Display,
        V: Display,
    {
        self.keys
            .iter()
            .map(|(_, k, link)| format!("({}, {})", k, self.values.item(link)))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Lists every entry as `"(key, value)"`, ordered by value.
    pub fn in_order_traverse_by_values(&self) -> String
    where
        K: Display,
        V: Display,
    {
        self.values
            .iter()
            .map(|(_, v, link)| format!("({}, {})", self.keys.item(link), v))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Checks every structural invariant of both trees and the links between
    /// them. Each tree is checked on its own first: ordering, parent handles,
    /// and that every stored node is reachable. Then every link is followed
    /// to make sure it points back.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        self.keys.validate(TreeSide::Keys)?;
        self.values.validate(TreeSide::Values)?;

        for (side, nodes) in [
            (TreeSide::Keys, self.keys.len()),
            (TreeSide::Values, self.values.len()),
        ] {
            if nodes != self.size {
                return Err(InvariantViolation::LengthMismatch {
                    side,
                    nodes,
                    len: self.size,
                });
            }
        }

        for (handle, _, link) in self.keys.iter() {
            if self.values.try_link(link) != Some(handle) {
                return Err(InvariantViolation::BrokenLink {
                    side: TreeSide::Keys,
                    slot: handle.index(),
                    link: link.index(),
                });
            }
        }

        for (handle, _, link) in self.values.iter() {
            if self.keys.try_link(link) != Some(handle) {
                return Err(InvariantViolation::BrokenLink {
                    side: TreeSide::Values,
                    slot: handle.index(),
                    link: link.index(),
                });
            }
        }

        Ok(())
    }

    #[cfg(test)]
    fn assert_valid(&self) {
        if let Err(violation) = self.validate() {
            panic!("{}", violation);
        }
    }
}

impl<K, V> Default for BidirectionalMap<K, V>
where
    K: Ord,
    V: Ord,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Extend<(K, V)> for BidirectionalMap<K, V>
where
    K: Ord,
    V: Ord,
{
    /// Puts every pair in turn. Pairs that clash with something already in
    /// the map are dropped.
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.put(k, v);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for BidirectionalMap<K, V>
where
    K: Ord,
    V: Ord,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K, V> Debug for BidirectionalMap<K, V>
where
    K: Ord + Debug,
    V: Ord + Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.keys
                    .iter()
                    .map(|(_, k, link)| (k, self.values.item(link))),
            )
            .finish()
    }
}

impl<K, V> Display for BidirectionalMap<K, V>
where
    K: Ord + Display,
    V: Ord + Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (_, k, link)) in self.keys.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "({}, {})", k, self.values.item(link))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::BidirectionalMap;

    fn produce() -> BidirectionalMap<&'static str, u32> {
        let mut map = BidirectionalMap::new();
        assert!(map.put("apple", 3));
        assert!(map.put("banana", 5));
        assert!(map.put("carrot", 4));
        assert!(map.put("date", 6));
        assert!(map.put("eggplant", 1));
        assert!(map.put("fig", 2));
        map
    }

    /// Keys 40 at the root with full subtrees on both sides, paired with
    /// values that land in a different shape in the value tree.
    fn seven() -> BidirectionalMap<u32, u32> {
        [
            (40, 100),
            (20, 700),
            (60, 300),
            (10, 500),
            (30, 200),
            (50, 600),
            (70, 400),
        ]
        .iter()
        .copied()
        .collect()
    }

    #[test]
    fn traversals() {
        let map = produce();

        assert_eq!(6, map.len());
        assert_eq!(
            "(apple, 3), (banana, 5), (carrot, 4), (date, 6), (eggplant, 1), (fig, 2)",
            map.in_order_traverse_by_keys()
        );
        assert_eq!(
            "(eggplant, 1), (fig, 2), (apple, 3), (carrot, 4), (banana, 5), (date, 6)",
            map.in_order_traverse_by_values()
        );
        assert_eq!(map.in_order_traverse_by_keys(), map.to_string());
    }

    #[test]
    fn lookups_go_both_ways() {
        let map = produce();

        assert_eq!(Some(&4), map.get_value("carrot"));
        assert_eq!(Some(&"carrot"), map.get_key(&4));
        assert_eq!(None, map.get_value("grape"));
        assert_eq!(None, map.get_key(&7));
        assert!(map.contains_key("fig"));
        assert!(map.contains_value(&6));
        assert!(!map.contains_key("grape"));
        assert!(!map.contains_value(&0));
    }

    #[test]
    fn duplicate_key_is_rejected() {
        let mut map = BidirectionalMap::new();

        assert!(map.put("a", 1));
        assert!(!map.put("a", 2));

        assert_eq!(Some(&1), map.get_value("a"));
        assert!(!map.contains_value(&2));
        assert_eq!(1, map.len());
    }

    #[test]
    fn duplicate_value_is_rejected() {
        let mut map = BidirectionalMap::new();

        assert!(map.put("a", 1));
        assert!(!map.put("b", 1));

        assert_eq!(Some(&"a"), map.get_key(&1));
        assert!(!map.contains_key("b"));
        assert_eq!(1, map.len());
    }

    #[test]
    fn remove_round_trip() {
        let mut map = produce();

        assert_eq!(Some(5), map.remove("banana"));
        assert!(!map.contains_key("banana"));
        assert!(!map.contains_value(&5));
        assert_eq!(5, map.len());

        // second time around there's nothing there
        assert_eq!(None, map.remove("banana"));
        assert_eq!(5, map.len());
    }

    #[test]
    fn remove_two_child_key_relinks_predecessor() {
        let mut map = seven();

        assert_eq!(Some(100), map.remove(&40));

        // 30 has been copied up into the old root's slot, and its link must
        // have come with it
        let root = map.keys.root().unwrap();
        assert_eq!(30, *map.keys.item(root));
        let partner = map.keys.link(root);
        assert_eq!(200, *map.values.item(partner));
        assert_eq!(root, map.values.link(partner));

        assert_eq!(Some(&200), map.get_value(&30));
        assert_eq!(Some(&30), map.get_key(&200));
        assert_eq!(
            "(10, 500), (20, 700), (30, 200), (50, 600), (60, 300), (70, 400)",
            map.in_order_traverse_by_keys()
        );
        assert_eq!(
            "(30, 200), (60, 300), (70, 400), (10, 500), (50, 600), (20, 700)",
            map.in_order_traverse_by_values()
        );
        map.validate().unwrap();
    }

    #[test]
    fn remove_two_child_value_relinks_predecessor() {
        // in the value tree, 500 sits under 300 with 400 on its left and 600
        // on its right
        let mut map = seven();

        assert_eq!(Some(500), map.remove(&10));

        assert_eq!(Some(&400), map.get_value(&70));
        assert_eq!(Some(&70), map.get_key(&400));
        assert!(!map.contains_value(&500));
        assert_eq!(6, map.len());
        map.validate().unwrap();
    }

    #[test]
    fn remove_everything_in_insertion_order() {
        let mut map = seven();

        for (k, v) in [(40, 100), (20, 700), (60, 300), (10, 500)] {
            assert_eq!(Some(v), map.remove(&k));
        }
        assert_eq!("(30, 200), (50, 600), (70, 400)", map.to_string());

        for (k, v) in [(30, 200), (50, 600), (70, 400)] {
            assert_eq!(Some(v), map.remove(&k));
        }
        assert!(map.is_empty());
        assert_eq!("", map.in_order_traverse_by_values());
    }

    #[test]
    fn clear() {
        let mut map = produce();

        map.clear();

        assert_eq!(0, map.len());
        assert_eq!("", map.in_order_traverse_by_keys());
        assert_eq!("", map.in_order_traverse_by_values());
        assert!(!map.contains_key("apple"));
        assert!(!map.contains_value(&3));
        map.validate().unwrap();

        // the map is still usable afterwards
        assert!(map.put("apple", 30));
        assert_eq!(Some(&30), map.get_value("apple"));
    }

    #[test]
    fn slots_are_reused_after_remove() {
        let mut map = seven();

        map.remove(&40);
        map.remove(&70);
        assert!(map.put(80, 800));
        assert!(map.put(90, 900));

        assert_eq!(7, map.keys.slots());
        assert_eq!(7, map.values.slots());
        assert_eq!(Some(&800), map.get_value(&80));
        assert_eq!(Some(&90), map.get_key(&900));
    }

    #[test]
    fn validate_catches_a_broken_link() {
        let mut map = seven();
        let root = map.keys.root().unwrap();
        let other = map.keys.link(map.keys.find(&10).unwrap());
        map.keys.set_link(root, other);

        assert!(map.validate().is_err());
    }

    #[test]
    fn collect_drops_clashing_pairs() {
        let map: BidirectionalMap<char, u8> =
            vec![('a', 1), ('b', 2), ('a', 3), ('c', 2), ('d', 4)]
                .into_iter()
                .collect();

        assert_eq!(3, map.len());
        assert_eq!("{'a': 1, 'b': 2, 'd': 4}", format!("{:?}", map));
    }

    #[test]
    fn borrowed_lookups() {
        let mut map: BidirectionalMap<String, String> = BidirectionalMap::default();
        map.put("one".to_owned(), "uno".to_owned());

        assert_eq!(Some(&"uno".to_owned()), map.get_value("one"));
        assert_eq!(Some(&"one".to_owned()), map.get_key("uno"));
        assert_eq!(Some("uno".to_owned()), map.remove("one"));
    }
}
