// Contacts: digital (DMR) and analog DTMF

use super::list::{ConfigList, Handle};
use crate::core::MAX_DMR_ID;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static::lazy_static! {
    static ref DTMF_NUMBER: Regex = Regex::new(r"^[0-9A-Da-d*#]+$").unwrap();
}

/// DMR call types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CallType {
    #[default]
    PrivateCall,
    GroupCall,
    AllCall,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigitalContact {
    pub name: String,
    #[serde(default)]
    pub ring: bool,
    pub call_type: CallType,
    pub number: u32,
}

impl DigitalContact {
    pub fn new(name: impl Into<String>, call_type: CallType, number: u32) -> Self {
        Self {
            name: name.into(),
            ring: false,
            call_type,
            number,
        }
    }

    /// Set the DMR number; rejects values that do not fit 24 bits
    pub fn set_number(&mut self, number: u32) -> bool {
        if number > MAX_DMR_ID || number == self.number {
            return false;
        }
        self.number = number;
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DtmfContact {
    pub name: String,
    #[serde(default)]
    pub ring: bool,
    pub number: String,
}

impl DtmfContact {
    /// Create a DTMF contact, `None` if `number` is not a valid DTMF string
    pub fn new(name: impl Into<String>, number: &str) -> Option<Self> {
        if !is_valid_dtmf(number) {
            return None;
        }
        Some(Self {
            name: name.into(),
            ring: false,
            number: number.to_string(),
        })
    }

    pub fn set_number(&mut self, number: &str) -> bool {
        if !is_valid_dtmf(number) || number == self.number {
            return false;
        }
        self.number = number.to_string();
        true
    }
}

pub fn is_valid_dtmf(number: &str) -> bool {
    DTMF_NUMBER.is_match(number)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Contact {
    Digital(DigitalContact),
    Dtmf(DtmfContact),
}

impl Contact {
    pub fn name(&self) -> &str {
        match self {
            Contact::Digital(c) => &c.name,
            Contact::Dtmf(c) => &c.name,
        }
    }

    /// Rename; empty names are rejected
    pub fn set_name(&mut self, name: &str) -> bool {
        let current = match self {
            Contact::Digital(c) => &mut c.name,
            Contact::Dtmf(c) => &mut c.name,
        };
        if name.trim().is_empty() || current == name {
            return false;
        }
        *current = name.to_string();
        true
    }

    pub fn ring(&self) -> bool {
        match self {
            Contact::Digital(c) => c.ring,
            Contact::Dtmf(c) => c.ring,
        }
    }

    pub fn as_digital(&self) -> Option<&DigitalContact> {
        match self {
            Contact::Digital(c) => Some(c),
            Contact::Dtmf(_) => None,
        }
    }
}

/// Contact list with helpers for the digital subset
pub type ContactList = ConfigList<Contact>;

impl ConfigList<Contact> {
    pub fn digital_count(&self) -> usize {
        self.iter().filter(|(_, c)| c.as_digital().is_some()).count()
    }

    /// Handle of the `n`-th digital contact
    pub fn digital_contact(&self, n: usize) -> Option<Handle<Contact>> {
        self.iter()
            .filter(|(_, c)| c.as_digital().is_some())
            .nth(n)
            .map(|(h, _)| h)
    }

    /// Position of `handle` among digital contacts
    pub fn index_of_digital(&self, handle: Handle<Contact>) -> Option<usize> {
        self.iter()
            .filter(|(_, c)| c.as_digital().is_some())
            .position(|(h, _)| h == handle)
    }

    /// First digital contact with the given number
    pub fn find_digital(&self, number: u32) -> Option<Handle<Contact>> {
        self.iter()
            .find(|(_, c)| c.as_digital().is_some_and(|d| d.number == number))
            .map(|(h, _)| h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dtmf_validation() {
        assert!(DtmfContact::new("Gate", "123*#ABCD").is_some());
        assert!(DtmfContact::new("Bad", "12x").is_none());
        assert!(DtmfContact::new("Empty", "").is_none());

        let mut c = DtmfContact::new("Gate", "1").unwrap();
        assert!(c.set_number("2"));
        assert!(!c.set_number("2"));
        assert!(!c.set_number("?"));
    }

    #[test]
    fn test_digital_subset() {
        let mut list = ContactList::new();
        let dtmf = list.add(Contact::Dtmf(DtmfContact::new("Gate", "1").unwrap()));
        let tg = list.add(Contact::Digital(DigitalContact::new(
            "Local",
            CallType::GroupCall,
            9,
        )));
        let alice = list.add(Contact::Digital(DigitalContact::new(
            "Alice",
            CallType::PrivateCall,
            1234,
        )));

        assert_eq!(list.digital_count(), 2);
        assert_eq!(list.digital_contact(1), Some(alice));
        assert_eq!(list.index_of_digital(tg), Some(0));
        assert_eq!(list.index_of_digital(dtmf), None);
        assert_eq!(list.find_digital(1234), Some(alice));
        assert_eq!(list.find_digital(99), None);
    }

    #[test]
    fn test_setters_report_change() {
        let mut c = Contact::Digital(DigitalContact::new("A", CallType::AllCall, 16777215));
        assert!(c.set_name("B"));
        assert!(!c.set_name("B"));
        assert!(!c.set_name(" "));
        if let Contact::Digital(d) = &mut c {
            assert!(!d.set_number(0x0100_0000));
            assert!(d.set_number(1));
        }
    }
}
