// GPS system record

use crate::bitwise::elements::Result as ElementResult;
use crate::bitwise::{Element, Endianness};
use crate::codeplug::{Codeplug, CodeplugContext, CodeplugResult, Flags};
use crate::config::{Config, GpsSystem};
use tracing::debug;

/// GPS system record (16 bytes)
///
/// Byte layout:
/// - 0x00: revert channel (u16 LE, 0=selected, otherwise +1 channel index)
/// - 0x02: repeat interval in 30s steps, 0=disabled
/// - 0x04: destination contact (u16 LE, +1 index, 0=disabled)
/// - rest: 0xff
#[derive(Debug)]
pub struct GpsSystemElement<B>(Element<B>);

impl<B: AsRef<[u8]>> GpsSystemElement<B> {
    pub const SIZE: usize = 0x10;

    pub fn new(data: B) -> ElementResult<Self> {
        Ok(Self(Element::new(data, Self::SIZE)?))
    }

    /// GPS systems without destination are unused slots
    pub fn is_valid(&self) -> bool {
        let dest = self.destination_index();
        dest != 0 && dest != 0xffff
    }

    pub fn revert_channel(&self) -> u16 {
        self.0.u16(0x00, Endianness::Little)
    }

    pub fn repeat_interval_s(&self) -> u32 {
        self.0.u8(0x02) as u32 * 30
    }

    pub fn destination_index(&self) -> u16 {
        self.0.u16(0x04, Endianness::Little)
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> GpsSystemElement<B> {
    pub fn clear(&mut self) {
        self.0.fill(0x00, Self::SIZE, 0xff);
        self.set_revert_channel(0);
        self.set_repeat_interval_s(0);
        self.set_destination_index(0);
    }

    pub fn set_revert_channel(&mut self, code: u16) {
        self.0.set_u16(0x00, code, Endianness::Little);
    }

    pub fn set_repeat_interval_s(&mut self, seconds: u32) {
        self.0.set_u8(0x02, (seconds / 30).min(0xff) as u8);
        self.0.set_u8(0x03, 0xff);
    }

    pub fn set_destination_index(&mut self, index: u16) {
        self.0.set_u16(0x04, index, Endianness::Little);
    }
}

impl Codeplug {
    pub fn clear_gps_systems(&mut self) -> CodeplugResult<()> {
        let Some(table) = self.layout.gps_systems else {
            return Ok(());
        };
        for i in 0..table.count {
            GpsSystemElement::new(self.table_record_mut(&table, i)?)?.clear();
        }
        Ok(())
    }

    pub fn encode_gps_systems(
        &mut self,
        config: &Config,
        _flags: &Flags,
        ctx: &mut CodeplugContext,
    ) -> CodeplugResult<()> {
        self.clear_gps_systems()?;
        let Some(table) = self.layout.gps_systems else {
            if !config.gps_systems.is_empty() {
                ctx.log.warning("GPS systems are not supported by this device");
            }
            return Ok(());
        };
        if config.gps_systems.len() > table.count {
            ctx.log.warning(format!(
                "{} GPS systems exceed the limit of {}, truncated",
                config.gps_systems.len(),
                table.count
            ));
        }

        for (handle, gps) in config.gps_systems.iter() {
            let Some(index) = ctx.gps_systems.index(handle) else {
                continue;
            };
            ctx.log.push(format!("GPS system {}", index + 1));
            let revert = ctx.encode_channel_ref(gps.revert_channel, None)?;
            let dest = ctx.contacts.encode(gps.contact, "contact", &mut ctx.log)?;
            if dest == 0 {
                ctx.log
                    .warning("GPS system without destination contact is disabled on the device");
            }
            let mut el = GpsSystemElement::new(self.table_record_mut(&table, index as usize)?)?;
            el.set_revert_channel(revert);
            el.set_repeat_interval_s(gps.period_s);
            el.set_destination_index(dest as u16);
            ctx.log.pop();
        }
        Ok(())
    }

    /// GPS systems carry no name on the device; decoded systems are numbered
    pub fn create_gps_systems(
        &self,
        config: &mut Config,
        ctx: &mut CodeplugContext,
    ) -> CodeplugResult<()> {
        let Some(table) = self.layout.gps_systems else {
            return Ok(());
        };
        for i in 0..table.count {
            let el = GpsSystemElement::new(self.table_record(&table, i)?)?;
            if !el.is_valid() {
                continue;
            }
            let gps = GpsSystem::new(format!("GPS System {}", i + 1), None, el.repeat_interval_s());
            let handle = config.gps_systems.add(gps);
            ctx.gps_systems.register(i as u32, handle);
        }
        debug!("Created {} GPS systems", ctx.gps_systems.len());
        Ok(())
    }

    pub fn link_gps_systems(
        &self,
        config: &mut Config,
        ctx: &mut CodeplugContext,
    ) -> CodeplugResult<()> {
        let Some(table) = self.layout.gps_systems else {
            return Ok(());
        };
        for i in 0..table.count {
            let Some(handle) = ctx.gps_systems.handle(i as u32) else {
                continue;
            };
            ctx.log.push(format!("GPS system {}", i + 1));
            let el = GpsSystemElement::new(self.table_record(&table, i)?)?;
            let contact =
                ctx.contacts
                    .resolve(el.destination_index() as u32, "contact", &mut ctx.log);
            let revert = ctx.resolve_channel_ref(el.revert_channel(), None);
            if let Some(gps) = config.gps_systems.get_mut(handle) {
                gps.contact = contact;
                gps.revert_channel = revert;
            }
            ctx.log.pop();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codeplug::UV390;
    use crate::config::{CallType, ChannelRef, Contact, DigitalContact};

    #[test]
    fn test_round_trip_numbers_systems() {
        let mut config = Config::new();
        let aprs = config.contacts.add(Contact::Digital(DigitalContact::new(
            "APRS",
            CallType::PrivateCall,
            262999,
        )));
        config
            .gps_systems
            .add(GpsSystem::new("Brandmeister", Some(aprs), 300));

        let mut codeplug = Codeplug::new(&UV390);
        codeplug.encode(&config, &Flags::default()).unwrap();
        let el = GpsSystemElement::new(
            codeplug
                .table_record(UV390.gps_systems.as_ref().unwrap(), 0)
                .unwrap(),
        )
        .unwrap();
        assert_eq!(el.0.data()[..6], [0x00, 0x00, 10, 0xff, 0x01, 0x00]);

        let mut decoded = Config::new();
        codeplug.decode(&mut decoded).unwrap();
        let gps = decoded.gps_systems.at(0).unwrap();
        assert_eq!(gps.name, "GPS System 1");
        assert_eq!(gps.period_s, 300);
        assert_eq!(gps.revert_channel, ChannelRef::Selected);
        assert_eq!(decoded.contacts.get(gps.contact.unwrap()).unwrap().name(), "APRS");
    }

    #[test]
    fn test_cleared_slot_is_invalid() {
        let mut el = GpsSystemElement::new([0u8; 16]).unwrap();
        el.clear();
        assert!(!el.is_valid());
        assert_eq!(el.0.data()[6..], [0xff; 10]);
    }
}
