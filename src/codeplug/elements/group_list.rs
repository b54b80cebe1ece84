// RX group list record

use super::{check_members, member_codes, name_unset, resolve_members, NAME_CHARS};
use crate::bitwise::elements::Result as ElementResult;
use crate::bitwise::{Element, Endianness};
use crate::codeplug::{Codeplug, CodeplugContext, CodeplugResult, Flags};
use crate::config::{Config, RxGroupList};
use tracing::debug;

/// Group list record (96 bytes): name (16 x UTF-16LE) and 32 members as +1
/// contact indices, 0-terminated
#[derive(Debug)]
pub struct GroupListElement<B>(Element<B>);

impl<B: AsRef<[u8]>> GroupListElement<B> {
    pub const SIZE: usize = 0x60;
    pub const MEMBERS: usize = 32;

    pub fn new(data: B) -> ElementResult<Self> {
        Ok(Self(Element::new(data, Self::SIZE)?))
    }

    pub fn is_valid(&self) -> bool {
        !name_unset(self.0.u16(0x00, Endianness::Little))
    }

    pub fn name(&self) -> String {
        self.0.utf16(0x00, NAME_CHARS)
    }

    pub fn member(&self, n: usize) -> u16 {
        self.0.u16(0x20 + 2 * n, Endianness::Little)
    }

    pub fn members(&self) -> Vec<u16> {
        (0..Self::MEMBERS).map(|n| self.member(n)).collect()
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> GroupListElement<B> {
    pub fn clear(&mut self) {
        self.0.fill(0x00, Self::SIZE, 0x00);
    }

    pub fn set_name(&mut self, name: &str) {
        self.0.set_utf16(0x00, NAME_CHARS, name, 0x0000);
    }

    pub fn set_member(&mut self, n: usize, code: u16) {
        self.0.set_u16(0x20 + 2 * n, code, Endianness::Little);
    }
}

impl Codeplug {
    pub fn clear_group_lists(&mut self) -> CodeplugResult<()> {
        let table = self.layout.group_lists;
        for i in 0..table.count {
            GroupListElement::new(self.table_record_mut(&table, i)?)?.clear();
        }
        Ok(())
    }

    pub fn encode_group_lists(
        &mut self,
        config: &Config,
        _flags: &Flags,
        ctx: &mut CodeplugContext,
    ) -> CodeplugResult<()> {
        self.clear_group_lists()?;
        let table = self.layout.group_lists;
        check_members(config.group_lists.len(), table.count, "group lists", &mut ctx.log);
        let max = GroupListElement::<&[u8]>::MEMBERS;

        for (handle, list) in config.group_lists.iter() {
            let Some(index) = ctx.group_lists.index(handle) else {
                continue;
            };
            ctx.log.push(format!("group list {}", index + 1));
            let codes = member_codes(&list.contacts, &ctx.contacts, "contact", &mut ctx.log)?;
            check_members(codes.len(), max, "contacts", &mut ctx.log);

            let mut el = GroupListElement::new(self.table_record_mut(&table, index as usize)?)?;
            el.set_name(&list.name);
            for (n, &code) in codes.iter().take(max).enumerate() {
                el.set_member(n, code);
            }
            ctx.log.pop();
        }
        Ok(())
    }

    pub fn create_group_lists(
        &self,
        config: &mut Config,
        ctx: &mut CodeplugContext,
    ) -> CodeplugResult<()> {
        let table = self.layout.group_lists;
        for i in 0..table.count {
            let el = GroupListElement::new(self.table_record(&table, i)?)?;
            if !el.is_valid() {
                continue;
            }
            let handle = config.group_lists.add(RxGroupList::new(el.name()));
            ctx.group_lists.register(i as u32, handle);
        }
        debug!("Created {} group lists", ctx.group_lists.len());
        Ok(())
    }

    pub fn link_group_lists(
        &self,
        config: &mut Config,
        ctx: &mut CodeplugContext,
    ) -> CodeplugResult<()> {
        let table = self.layout.group_lists;
        for i in 0..table.count {
            let Some(handle) = ctx.group_lists.handle(i as u32) else {
                continue;
            };
            ctx.log.push(format!("group list {}", i + 1));
            let codes = GroupListElement::new(self.table_record(&table, i)?)?.members();
            let contacts = resolve_members(codes, &ctx.contacts, "contact", &mut ctx.log);
            if let Some(list) = config.group_lists.get_mut(handle) {
                list.contacts = contacts;
            }
            ctx.log.pop();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codeplug::MD390;
    use crate::config::{CallType, Contact, DigitalContact, DtmfContact};

    #[test]
    fn test_members_skip_dtmf_contacts() {
        let mut config = Config::new();
        let dtmf = config
            .contacts
            .add(Contact::Dtmf(DtmfContact::new("Gate", "123").unwrap()));
        let tg = config.contacts.add(Contact::Digital(DigitalContact::new(
            "TG 262",
            CallType::GroupCall,
            262,
        )));
        let mut list = RxGroupList::new("DL");
        list.add_contact(dtmf);
        list.add_contact(tg);
        config.group_lists.add(list);

        let mut codeplug = Codeplug::new(&MD390);
        codeplug.encode(&config, &Flags::default()).unwrap();
        let el = GroupListElement::new(codeplug.table_record(&MD390.group_lists, 0).unwrap())
            .unwrap();
        assert_eq!(el.members()[..2], [1, 0]);

        let mut decoded = Config::new();
        codeplug.decode(&mut decoded).unwrap();
        let list = decoded.group_lists.at(0).unwrap();
        assert_eq!(list.name, "DL");
        assert_eq!(list.contacts.len(), 1);
        assert_eq!(decoded.contacts.get(list.contacts[0]).unwrap().name(), "TG 262");
    }

    #[test]
    fn test_zero_terminates_members() {
        let mut el = GroupListElement::new(vec![0u8; GroupListElement::<Vec<u8>>::SIZE]).unwrap();
        el.clear();
        assert!(!el.is_valid());
        el.set_name("X");
        el.set_member(0, 3);
        el.set_member(2, 5);
        assert!(el.is_valid());
        assert_eq!(el.members()[..3], [3, 0, 5]);
    }
}
