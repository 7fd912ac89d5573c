use core::fmt::Debug;

use crate::hash::HashMap;
use crate::hash::hashbrown::hash_map::Entry;

// -----------------------------------------------------------------------------
// TypeIdMap

/// A map container with the 16-bit object type id as the fixed key type.
///
/// Id `0` is reserved by the object model and is never stored: inserting it
/// is refused and looking it up always misses.
///
/// The container's interface is fully abstracted, exposing no [`HashMap`]
/// specific APIs.
pub struct TypeIdMap<V>(HashMap<u16, V>);

impl<V> TypeIdMap<V> {
    /// Creates an empty `TypeIdMap`.
    ///
    /// # Examples
    ///
    /// ```
    /// use og_utils::TypeIdMap;
    /// let map = TypeIdMap::<i32>::new();
    /// assert!(map.is_empty());
    /// ```
    #[inline]
    pub const fn new() -> Self {
        Self(HashMap::with_hasher(crate::hash::FixedHashState))
    }

    /// Attempts to insert a key-value pair into the map.
    ///
    /// - Returns `true` if the key was not present and the pair was inserted.
    /// - Returns `false` if the key already exists or is `0`, leaving the map
    ///   unchanged.
    ///
    /// The closure `f` is only called if the pair is inserted.
    ///
    /// # Examples
    ///
    /// ```
    /// use og_utils::TypeIdMap;
    ///
    /// let mut map = TypeIdMap::new();
    /// assert!(map.try_insert(3, || "three"));
    /// assert!(!map.try_insert(3, || "again"));
    /// assert!(!map.try_insert(0, || "reserved"));
    /// assert_eq!(map.get(3), Some(&"three"));
    /// ```
    #[inline]
    pub fn try_insert(&mut self, type_id: u16, f: impl FnOnce() -> V) -> bool {
        if type_id == 0 {
            return false;
        }
        match self.0.entry(type_id) {
            Entry::Vacant(entry) => {
                entry.insert(f());
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Inserts a key-value pair, returning the previous value.
    ///
    /// Id `0` is refused and `value` is handed back.
    pub fn insert(&mut self, type_id: u16, value: V) -> Option<V> {
        if type_id == 0 {
            return Some(value);
        }
        self.0.insert(type_id, value)
    }

    /// Returns a reference to the value stored for `type_id`.
    #[inline]
    pub fn get(&self, type_id: u16) -> Option<&V> {
        self.0.get(&type_id)
    }

    /// Returns a mutable reference to the value stored for `type_id`.
    #[inline]
    pub fn get_mut(&mut self, type_id: u16) -> Option<&mut V> {
        self.0.get_mut(&type_id)
    }

    /// Removes a key from the map, returning its value.
    pub fn remove(&mut self, type_id: u16) -> Option<V> {
        self.0.remove(&type_id)
    }

    /// Clears the map, keeping the allocated memory for reuse.
    #[inline]
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Returns `true` if the map contains a value for `type_id`.
    #[inline]
    pub fn contains(&self, type_id: u16) -> bool {
        self.0.contains_key(&type_id)
    }

    /// Returns the number of elements in the map.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the map contains no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// An iterator visiting all id-value pairs in arbitrary order.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (u16, &V)> {
        self.0.iter().map(|(id, v)| (*id, v))
    }

    /// An iterator visiting all ids in arbitrary order.
    #[inline]
    pub fn ids(&self) -> impl ExactSizeIterator<Item = u16> + '_ {
        self.0.keys().copied()
    }
}

// -----------------------------------------------------------------------------
// Traits

impl<T> Default for TypeIdMap<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for TypeIdMap<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: Debug> Debug for TypeIdMap<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::TypeIdMap;

    #[test]
    fn reserved_id() {
        let mut map = TypeIdMap::new();
        assert_eq!(map.insert(0, 1_u8), Some(1));
        assert!(!map.contains(0));
        assert!(map.get(0).is_none());
        assert!(map.is_empty());
    }

    #[test]
    fn insert_remove() {
        let mut map = TypeIdMap::new();
        assert!(map.insert(7, 'a').is_none());
        assert_eq!(map.insert(7, 'b'), Some('a'));
        assert_eq!(map.len(), 1);
        assert_eq!(map.ids().collect::<alloc::vec::Vec<_>>(), [7]);

        *map.get_mut(7).unwrap() = 'c';
        assert_eq!(map.remove(7), Some('c'));
        assert!(map.is_empty());
    }
}
