//! Associative store built from two parallel sequences
//!
//! Keys and values live in separate [`Sequence`]s kept in lock-step: the
//! value for `keys[i]` is always `values[i]`. Lookups are linear scans
//! comparing whole keys, which is fine for the handful of buffers a device
//! holds at once.

use super::sequence::Sequence;

/// Insertion-ordered key/value map with unique keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressMap<K, V> {
    keys: Sequence<K>,
    values: Sequence<V>,
}

impl<K, V> Default for AddressMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> AddressMap<K, V> {
    /// Create an empty map
    pub const fn new() -> Self {
        Self {
            keys: Sequence::new(),
            values: Sequence::new(),
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the map holds no entries
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.keys.clear();
        self.values.clear();
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.keys.iter().zip(self.values.iter())
    }

    /// Iterate keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.keys.iter()
    }
}

impl<K: PartialEq, V> AddressMap<K, V> {
    fn index_of(&self, key: &K) -> Option<usize> {
        self.keys.position(|candidate| candidate == key)
    }

    /// Insert or overwrite
    ///
    /// An existing key keeps its position and gets the new value; the
    /// previous value is returned. New keys are appended.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        match self.index_of(&key) {
            Some(index) => self
                .values
                .at_mut(index)
                .map(|slot| core::mem::replace(slot, value)),
            None => {
                self.keys.append(key);
                self.values.append(value);
                None
            }
        }
    }

    /// Value stored under `key`
    pub fn get(&self, key: &K) -> Option<&V> {
        self.index_of(key).and_then(|index| self.values.at(index))
    }

    /// Mutable value stored under `key`
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let index = self.index_of(key)?;
        self.values.at_mut(index)
    }

    /// Whether `key` is present
    pub fn contains_key(&self, key: &K) -> bool {
        self.index_of(key).is_some()
    }

    /// Remove the entry for `key`, handing its value back
    ///
    /// Absent keys are a no-op.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let index = self.index_of(key)?;
        self.keys.remove(index);
        self.values.remove(index)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    #[test]
    fn test_put_then_get() {
        let mut map = AddressMap::new();
        map.put(7u16, vec![1u8, 2, 3]);
        assert_eq!(map.get(&7), Some(&vec![1, 2, 3]));
        assert_eq!(map.get(&8), None);
    }

    #[test]
    fn test_put_existing_key_overwrites_without_growing() {
        let mut map = AddressMap::new();
        map.put(1u16, 'a');
        map.put(2u16, 'b');
        assert_eq!(map.put(1, 'z'), Some('a'));
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&1), Some(&'z'));
        assert_eq!(map.keys().copied().collect::<Vec<_>>(), [1, 2]);
    }

    #[test]
    fn test_keys_compare_on_full_value() {
        // Keys sharing a low byte must stay distinct
        let mut map = AddressMap::new();
        map.put(0x0001u16, "low");
        map.put(0x0101u16, "high");
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&0x0001), Some(&"low"));
        assert_eq!(map.get(&0x0101), Some(&"high"));
        assert_eq!(map.get(&0x0201), None);
    }

    #[test]
    fn test_remove() {
        let mut map = AddressMap::new();
        map.put(1u16, 10u8);
        map.put(2u16, 20u8);
        map.put(3u16, 30u8);

        assert_eq!(map.remove(&2), Some(20));
        assert_eq!(map.remove(&2), None);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&3), Some(&30));
        assert_eq!(map.iter().collect::<Vec<_>>(), [(&1u16, &10u8), (&3, &30)]);
    }

    #[test]
    fn test_clear() {
        let mut map = AddressMap::new();
        map.put(5u16, ());
        map.clear();
        assert!(map.is_empty());
        assert!(!map.contains_key(&5));
    }

    proptest! {
        #[test]
        fn prop_keys_stay_unique(
            entries in proptest::collection::vec((0u16..16, any::<u8>()), 0..48),
        ) {
            let mut map = AddressMap::new();
            for (key, value) in &entries {
                map.put(*key, *value);
                prop_assert_eq!(map.get(key), Some(value));
            }

            let mut keys: Vec<u16> = map.keys().copied().collect();
            let total = keys.len();
            keys.sort_unstable();
            keys.dedup();
            prop_assert_eq!(keys.len(), total);

            // Last write wins
            for key in keys {
                let last = entries.iter().rev().find(|(k, _)| *k == key).map(|(_, v)| v);
                prop_assert_eq!(map.get(&key), last);
            }
        }
    }
}
