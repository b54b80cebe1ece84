// Digital contact record

use super::NAME_CHARS;
use crate::bitwise::elements::Result as ElementResult;
use crate::bitwise::Element;
use crate::codeplug::{Codeplug, CodeplugContext, CodeplugResult, Flags};
use crate::config::{CallType, Config, Contact, DigitalContact};
use tracing::debug;

const CALL_NONE: u8 = 0;
const CALL_GROUP: u8 = 1;
const CALL_PRIVATE: u8 = 2;
const CALL_ALL: u8 = 3;

/// Contact record (36 bytes)
///
/// Byte layout:
/// - 0x00: DMR ID (u24 LE)
/// - 0x03: call type (bits 0-1, 1=group 2=private 3=all), ring (bit 5), bits 6-7 set
/// - 0x04: name (16 x UTF-16LE)
#[derive(Debug)]
pub struct ContactElement<B>(Element<B>);

impl<B: AsRef<[u8]>> ContactElement<B> {
    pub const SIZE: usize = 0x24;

    pub fn new(data: B) -> ElementResult<Self> {
        Ok(Self(Element::new(data, Self::SIZE)?))
    }

    /// Keyed on the call type only; a contact may have an empty name
    pub fn is_valid(&self) -> bool {
        self.0.uint(0x03, 0, 2) != CALL_NONE
    }

    pub fn number(&self) -> u32 {
        self.0.u24_le(0x00)
    }

    pub fn call_type(&self) -> CallType {
        match self.0.uint(0x03, 0, 2) {
            CALL_GROUP => CallType::GroupCall,
            CALL_ALL => CallType::AllCall,
            _ => CallType::PrivateCall,
        }
    }

    pub fn ring(&self) -> bool {
        self.0.bit(0x03, 5)
    }

    pub fn name(&self) -> String {
        self.0.utf16(0x04, NAME_CHARS)
    }

    pub fn to_contact(&self) -> Contact {
        let mut contact = DigitalContact::new(self.name(), self.call_type(), self.number());
        contact.ring = self.ring();
        Contact::Digital(contact)
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> ContactElement<B> {
    pub fn clear(&mut self) {
        self.0.fill(0x00, 3, 0xff);
        self.0.set_u8(0x03, 0xc0);
        self.0.fill(0x04, NAME_CHARS * 2, 0x00);
    }

    pub fn set_number(&mut self, number: u32) {
        self.0.set_u24_le(0x00, number & 0x00ff_ffff);
    }

    pub fn set_call_type(&mut self, call_type: CallType) {
        let code = match call_type {
            CallType::GroupCall => CALL_GROUP,
            CallType::PrivateCall => CALL_PRIVATE,
            CallType::AllCall => CALL_ALL,
        };
        self.0.set_uint(0x03, 0, 2, code);
    }

    pub fn set_ring(&mut self, ring: bool) {
        self.0.set_bit(0x03, 5, ring);
    }

    pub fn set_name(&mut self, name: &str) {
        self.0.set_utf16(0x04, NAME_CHARS, name, 0x0000);
    }

    pub fn set_contact(&mut self, contact: &DigitalContact) {
        self.clear();
        self.set_number(contact.number);
        self.set_call_type(contact.call_type);
        self.set_ring(contact.ring);
        self.set_name(&contact.name);
    }
}

impl Codeplug {
    pub fn clear_contacts(&mut self) -> CodeplugResult<()> {
        let table = self.layout.contacts;
        for i in 0..table.count {
            ContactElement::new(self.table_record_mut(&table, i)?)?.clear();
        }
        Ok(())
    }

    /// Encode digital contacts; DTMF contacts have no record on TyT radios
    pub fn encode_contacts(
        &mut self,
        config: &Config,
        _flags: &Flags,
        ctx: &mut CodeplugContext,
    ) -> CodeplugResult<()> {
        self.clear_contacts()?;
        let table = self.layout.contacts;
        let digital = config.contacts.digital_count();
        if digital > table.count {
            ctx.log.warning(format!(
                "{} digital contacts exceed the limit of {}, truncated",
                digital, table.count
            ));
        }

        for (handle, contact) in config.contacts.iter() {
            match contact {
                Contact::Digital(digital) => {
                    let Some(index) = ctx.contacts.index(handle) else {
                        continue;
                    };
                    ContactElement::new(self.table_record_mut(&table, index as usize)?)?
                        .set_contact(digital);
                }
                Contact::Dtmf(dtmf) => {
                    ctx.log
                        .hint(format!("DTMF contact '{}' is not supported, skipped", dtmf.name));
                }
            }
        }
        Ok(())
    }

    pub fn create_contacts(
        &self,
        config: &mut Config,
        ctx: &mut CodeplugContext,
    ) -> CodeplugResult<()> {
        let table = self.layout.contacts;
        for i in 0..table.count {
            let el = ContactElement::new(self.table_record(&table, i)?)?;
            if !el.is_valid() {
                continue;
            }
            let handle = config.contacts.add(el.to_contact());
            ctx.contacts.register(i as u32, handle);
        }
        debug!("Created {} contacts", ctx.contacts.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codeplug::MD390;
    use crate::config::DtmfContact;

    #[test]
    fn test_record_layout() {
        let mut el = ContactElement::new(vec![0u8; ContactElement::<Vec<u8>>::SIZE]).unwrap();
        el.clear();
        assert!(!el.is_valid());

        let mut contact = DigitalContact::new("Alice", CallType::PrivateCall, 2621370);
        contact.ring = true;
        el.set_contact(&contact);
        assert_eq!(&el.0.data()[..4], &[0xba, 0xff, 0x27, 0xe2]);
        assert_eq!(&el.0.data()[4..8], &[b'A', 0, b'l', 0]);
        assert!(el.is_valid());
        assert_eq!(el.to_contact(), Contact::Digital(contact));
    }

    #[test]
    fn test_unnamed_contact_keeps_channel_reference() {
        use crate::config::{Channel, DigitalChannel};

        let mut config = Config::new();
        config.contacts.add(Contact::Digital(DigitalContact::new(
            "Local",
            CallType::GroupCall,
            9,
        )));
        let unnamed = config.contacts.add(Contact::Digital(DigitalContact::new(
            "",
            CallType::PrivateCall,
            4242,
        )));
        let mut ch = DigitalChannel::new("Direct", 439_000_000, 439_000_000);
        ch.tx_contact = Some(unnamed);
        config.channels.add(Channel::Digital(ch));

        let mut codeplug = Codeplug::new(&crate::codeplug::UV390);
        codeplug
            .encode(&config, &crate::codeplug::Flags::default())
            .unwrap();
        let mut decoded = Config::new();
        let log = codeplug.decode(&mut decoded).unwrap();
        assert!(!log.has_warnings());

        assert_eq!(decoded.contacts.len(), 2);
        let ch = decoded.channels.at(0).unwrap().as_digital().unwrap();
        let contact = decoded.contacts.get(ch.tx_contact.unwrap()).unwrap();
        let contact = contact.as_digital().unwrap();
        assert!(contact.name.is_empty());
        assert_eq!(contact.number, 4242);
    }

    #[test]
    fn test_dtmf_contacts_skipped() {
        let mut config = Config::new();
        config
            .contacts
            .add(Contact::Dtmf(DtmfContact::new("Gate", "*123#").unwrap()));
        config.contacts.add(Contact::Digital(DigitalContact::new(
            "World",
            CallType::GroupCall,
            91,
        )));

        let mut codeplug = Codeplug::new(&MD390);
        let log = codeplug
            .encode(&config, &crate::codeplug::Flags::default())
            .unwrap();
        assert!(log
            .texts(crate::core::Severity::Hint)
            .iter()
            .any(|t| t.contains("Gate")));

        let mut decoded = Config::new();
        codeplug.decode(&mut decoded).unwrap();
        assert_eq!(decoded.contacts.len(), 1);
        assert_eq!(decoded.contacts.at(0).unwrap().name(), "World");
    }
}
