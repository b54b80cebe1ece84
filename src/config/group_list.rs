// RX group lists: the contacts a channel listens to

use super::contact::Contact;
use super::list::Handle;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RxGroupList {
    pub name: String,
    #[serde(default)]
    pub contacts: Vec<Handle<Contact>>,
}

impl RxGroupList {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contacts: Vec::new(),
        }
    }

    /// Append `contact` unless it is already a member
    pub fn add_contact(&mut self, contact: Handle<Contact>) -> bool {
        if self.contacts.contains(&contact) {
            return false;
        }
        self.contacts.push(contact);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::contact::{CallType, DigitalContact};
    use crate::config::ContactList;

    #[test]
    fn test_no_duplicate_members() {
        let mut contacts = ContactList::new();
        let tg = contacts.add(Contact::Digital(DigitalContact::new(
            "TG9",
            CallType::GroupCall,
            9,
        )));
        let mut list = RxGroupList::new("Local");
        assert!(list.add_contact(tg));
        assert!(!list.add_contact(tg));
        assert_eq!(list.contacts.len(), 1);
    }
}
