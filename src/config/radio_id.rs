// Radio (DMR) IDs of this radio, one of which is the default

use super::list::{ConfigList, Handle};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadioId {
    pub name: String,
    pub number: u32,
}

impl RadioId {
    pub fn new(name: impl Into<String>, number: u32) -> Self {
        Self {
            name: name.into(),
            number,
        }
    }
}

/// List of radio IDs with an explicit, nullable default.
///
/// The default is a plain handle. It is validated whenever it is read, so a
/// removed ID can never be returned as the default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RadioIdList {
    ids: ConfigList<RadioId>,
    #[serde(default)]
    default: Option<Handle<RadioId>>,
}

impl RadioIdList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an ID. The first ID added to an empty list becomes the default.
    pub fn add(&mut self, id: RadioId) -> Handle<RadioId> {
        let was_empty = self.ids.is_empty();
        let handle = self.ids.add(id);
        if was_empty && self.default_id().is_none() {
            self.default = Some(handle);
        }
        handle
    }

    /// Remove an ID. Removing the default leaves the list without a default.
    pub fn remove(&mut self, handle: Handle<RadioId>) -> Option<RadioId> {
        let removed = self.ids.remove(handle)?;
        if self.default == Some(handle) {
            self.default = None;
        }
        Some(removed)
    }

    /// Remove the first ID with the given number
    pub fn remove_number(&mut self, number: u32) -> bool {
        match self.find(number) {
            Some(handle) => self.remove(handle).is_some(),
            None => false,
        }
    }

    /// Current default, if it is still part of the list
    pub fn default_id(&self) -> Option<Handle<RadioId>> {
        self.default.filter(|&h| self.ids.contains(h))
    }

    /// Select the default; `None` clears it. Fails for handles not in the list.
    pub fn set_default(&mut self, handle: Option<Handle<RadioId>>) -> bool {
        if let Some(h) = handle {
            if !self.ids.contains(h) {
                return false;
            }
        }
        let changed = self.default_id() != handle;
        self.default = handle;
        changed
    }

    /// The default ID, falling back to the first one
    pub fn effective_default(&self) -> Option<Handle<RadioId>> {
        self.default_id().or_else(|| self.ids.handle_at(0))
    }

    pub fn find(&self, number: u32) -> Option<Handle<RadioId>> {
        self.ids
            .iter()
            .find(|(_, id)| id.number == number)
            .map(|(h, _)| h)
    }

    pub fn get(&self, handle: Handle<RadioId>) -> Option<&RadioId> {
        self.ids.get(handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle<RadioId>, &RadioId)> {
        self.ids.iter()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.default = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_id_becomes_default() {
        let mut ids = RadioIdList::new();
        let first = ids.add(RadioId::new("Home", 2621370));
        let second = ids.add(RadioId::new("Club", 2621371));
        assert_eq!(ids.default_id(), Some(first));
        assert_ne!(ids.default_id(), Some(second));
    }

    #[test]
    fn test_removing_default_clears_it() {
        let mut ids = RadioIdList::new();
        let a = ids.add(RadioId::new("A", 1));
        let b = ids.add(RadioId::new("B", 2));
        let c = ids.add(RadioId::new("C", 3));
        assert!(ids.set_default(Some(b)));

        ids.remove(b);
        assert_eq!(ids.default_id(), None);
        let order: Vec<_> = ids.iter().map(|(h, _)| h).collect();
        assert_eq!(order, vec![a, c]);

        // A non-empty list does not gain a default by adding
        ids.add(RadioId::new("D", 4));
        assert_eq!(ids.default_id(), None);
    }

    #[test]
    fn test_add_after_removing_default() {
        let mut ids = RadioIdList::new();
        let a = ids.add(RadioId::new("A", 1));
        ids.add(RadioId::new("B", 2));
        ids.remove(a);
        ids.add(RadioId::new("C", 3));
        assert_eq!(ids.default_id(), None);

        ids.clear();
        let d = ids.add(RadioId::new("D", 4));
        assert_eq!(ids.default_id(), Some(d));
    }

    #[test]
    fn test_set_default_validates() {
        let mut ids = RadioIdList::new();
        let a = ids.add(RadioId::new("A", 1));
        let mut other = RadioIdList::new();
        other.add(RadioId::new("X", 9));
        let foreign = other.add(RadioId::new("Y", 10));

        assert!(!ids.set_default(Some(foreign)));
        assert!(!ids.set_default(Some(a)));
        assert!(ids.set_default(None));
        assert_eq!(ids.effective_default(), Some(a));
        assert!(ids.remove_number(1));
        assert!(ids.effective_default().is_none());
    }
}
