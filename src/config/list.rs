// Ordered object lists with stable typed handles
//
// Configuration objects reference each other through `Handle<T>` values
// instead of pointers. A handle stays valid while its object is in the list;
// after removal it simply no longer resolves.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Stable identity of an object inside a `ConfigList<T>`
pub struct Handle<T> {
    id: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    fn new(id: u32) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.id)
    }
}

impl<T> Serialize for Handle<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.id)
    }
}

impl<'de, T> Deserialize<'de> for Handle<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u32::deserialize(deserializer).map(Handle::new)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry<T> {
    pub id: Handle<T>,
    pub item: T,
}

/// Ordered list of configuration objects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigList<T> {
    entries: Vec<Entry<T>>,
    #[serde(default)]
    next_id: u32,
}

impl<T> Default for ConfigList<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }
}

impl<T> ConfigList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> Handle<T> {
        // Lists read from JSON may come without a counter
        if self.next_id == 0 {
            self.next_id = self.entries.iter().map(|e| e.id.id).max().unwrap_or(0) + 1;
        }
        let handle = Handle::new(self.next_id);
        self.next_id += 1;
        handle
    }

    /// Append `item`, returning its handle
    pub fn add(&mut self, item: T) -> Handle<T> {
        let id = self.allocate();
        self.entries.push(Entry { id, item });
        id
    }

    /// Insert `item` at `index` (clamped to the list length)
    pub fn insert(&mut self, index: usize, item: T) -> Handle<T> {
        let id = self.allocate();
        let index = index.min(self.entries.len());
        self.entries.insert(index, Entry { id, item });
        id
    }

    /// Remove the object behind `handle`; returns it if it was present
    pub fn remove(&mut self, handle: Handle<T>) -> Option<T> {
        let index = self.index_of(handle)?;
        Some(self.entries.remove(index).item)
    }

    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        self.entries.iter().find(|e| e.id == handle).map(|e| &e.item)
    }

    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        self.entries
            .iter_mut()
            .find(|e| e.id == handle)
            .map(|e| &mut e.item)
    }

    /// Position of `handle` in the list
    pub fn index_of(&self, handle: Handle<T>) -> Option<usize> {
        self.entries.iter().position(|e| e.id == handle)
    }

    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.index_of(handle).is_some()
    }

    /// Handle of the object at position `index`
    pub fn handle_at(&self, index: usize) -> Option<Handle<T>> {
        self.entries.get(index).map(|e| e.id)
    }

    pub fn at(&self, index: usize) -> Option<&T> {
        self.entries.get(index).map(|e| &e.item)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        self.entries.iter().map(|e| (e.id, &e.item))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle<T>, &mut T)> {
        self.entries.iter_mut().map(|e| (e.id, &mut e.item))
    }

    pub fn handles(&self) -> Vec<Handle<T>> {
        self.entries.iter().map(|e| e.id).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_are_stable() {
        let mut list = ConfigList::new();
        let a = list.add("a");
        let b = list.add("b");
        let c = list.add("c");
        assert_eq!(list.index_of(c), Some(2));

        assert_eq!(list.remove(b), Some("b"));
        assert_eq!(list.index_of(c), Some(1));
        assert_eq!(list.get(a), Some(&"a"));
        assert!(list.get(b).is_none());

        // Ids are never reused
        let d = list.add("d");
        assert_ne!(d, b);
    }

    #[test]
    fn test_insert() {
        let mut list = ConfigList::new();
        list.add(1);
        list.add(3);
        let two = list.insert(1, 2);
        let values: Vec<i32> = list.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![1, 2, 3]);
        assert_eq!(list.handle_at(1), Some(two));
    }

    #[test]
    fn test_json_round_trip_keeps_ids() {
        let mut list = ConfigList::new();
        let a = list.add("x".to_string());
        let json = serde_json::to_string(&list).unwrap();
        let mut back: ConfigList<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.get(a).map(String::as_str), Some("x"));
        let b = back.add("y".to_string());
        assert_ne!(a, b);
    }

    #[test]
    fn test_missing_counter_in_json() {
        let json = r#"{"entries":[{"id":7,"item":1}]}"#;
        let mut list: ConfigList<i32> = serde_json::from_str(json).unwrap();
        let h = list.add(2);
        assert_eq!(h.id(), 8);
    }
}
