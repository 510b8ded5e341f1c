/// A key into an `IdVec`.  Keys are handed out in increasing order and are
/// never reused, so a key held after its entry is removed can never alias a
/// newer entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdVecKey(usize);

impl IdVecKey {
    pub fn index(self) -> usize {
        self.0
    }
}

/// An append-only arena that assigns stable keys to inserted values.
/// Removing a value leaves a tombstone behind; iteration skips tombstones and
/// yields live entries in insertion order.
pub struct IdVec<T> {
    slots: Vec<Option<T>>,
    live: usize,
}

impl<T> IdVec<T> {
    /// Creates a new, empty IdVec.
    pub fn new() -> Self {
        IdVec {
            slots: Vec::new(),
            live: 0,
        }
    }

    /// Gets the number of live entries in the `IdVec`.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Checks if the `IdVec` is empty.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Inserts a new value into the `IdVec`, returning its key.
    pub fn insert(&mut self, value: T) -> IdVecKey {
        let key = IdVecKey(self.slots.len());
        self.slots.push(Some(value));
        self.live += 1;
        key
    }

    /// Removes the value at the given key, returning it if it was live.
    pub fn remove(&mut self, key: IdVecKey) -> Option<T> {
        let value = self.slots.get_mut(key.0)?.take();
        if value.is_some() {
            self.live -= 1;
        }
        value
    }

    /// Checks whether the given key refers to a live entry.
    pub fn contains(&self, key: IdVecKey) -> bool {
        self.get(key).is_some()
    }

    /// Gets a reference to the item at the given key, if it exists.
    pub fn get(&self, key: IdVecKey) -> Option<&T> {
        self.slots.get(key.0).and_then(Option::as_ref)
    }

    /// Gets a mutable reference to the item at the given key, if it exists.
    pub fn get_mut(&mut self, key: IdVecKey) -> Option<&mut T> {
        self.slots.get_mut(key.0).and_then(Option::as_mut)
    }

    /// Iterates over all live keys in insertion order.
    pub fn iter_keys(&self) -> impl Iterator<Item = IdVecKey> + '_ {
        self.iter_pairs().map(|(key, _)| key)
    }

    /// Iterates over all live values in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.iter_pairs().map(|(_, value)| value)
    }

    /// Iterates over all live values with their keys in insertion order.
    pub fn iter_pairs(&self) -> impl Iterator<Item = (IdVecKey, &T)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|value| (IdVecKey(index), value)))
    }

    /// Removes every entry.  Keys handed out earlier stay retired.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.live = 0;
    }
}

impl<T> Default for IdVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut vec = IdVec::new();
        let a = vec.insert("a");
        let b = vec.insert("b");
        assert_eq!(vec.len(), 2);
        assert_eq!(vec.get(a), Some(&"a"));
        assert_eq!(vec.get(b), Some(&"b"));
    }

    #[test]
    fn test_remove_leaves_other_keys_valid() {
        let mut vec = IdVec::new();
        let a = vec.insert(1);
        let b = vec.insert(2);
        let c = vec.insert(3);
        assert_eq!(vec.remove(b), Some(2));
        assert_eq!(vec.remove(b), None);
        assert_eq!(vec.len(), 2);
        assert_eq!(vec.get(a), Some(&1));
        assert_eq!(vec.get(c), Some(&3));
        assert_eq!(vec.iter().copied().collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn test_keys_are_never_reused() {
        let mut vec = IdVec::new();
        let a = vec.insert(1);
        vec.remove(a);
        let b = vec.insert(2);
        assert_ne!(a, b);
        assert!(!vec.contains(a));
        assert!(vec.contains(b));
    }

    #[test]
    fn test_clear() {
        let mut vec = IdVec::new();
        let a = vec.insert(1);
        vec.insert(2);
        vec.clear();
        assert!(vec.is_empty());
        assert_eq!(vec.get(a), None);
        let c = vec.insert(3);
        assert_eq!(c.index(), 2);
    }

    #[test]
    fn test_iter_keys_in_insertion_order() {
        let mut vec = IdVec::new();
        let keys: Vec<_> = (0..5).map(|i| vec.insert(i)).collect();
        vec.remove(keys[1]);
        vec.remove(keys[3]);
        assert_eq!(
            vec.iter_keys().collect::<Vec<_>>(),
            vec![keys[0], keys[2], keys[4]]
        );
    }
}
