// Zone record and zone extension record

use super::{check_members, member_codes, name_unset, resolve_members, NAME_CHARS};
use crate::bitwise::elements::Result as ElementResult;
use crate::bitwise::{Element, Endianness};
use crate::codeplug::{Codeplug, CodeplugContext, CodeplugResult, Flags};
use crate::config::{Config, Zone};
use tracing::debug;

/// Zone record (64 bytes): name (16 x UTF-16LE) and the first 16 members of
/// list A as +1 channel indices, 0-terminated
#[derive(Debug)]
pub struct ZoneElement<B>(Element<B>);

impl<B: AsRef<[u8]>> ZoneElement<B> {
    pub const SIZE: usize = 0x40;
    pub const MEMBERS: usize = 16;

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

impl<B: AsRef<[u8]> + AsMut<[u8]>> ZoneElement<B> {
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

/// Zone extension (224 bytes) at the same index as its zone: 48 further
/// members of list A followed by 64 members of list B
#[derive(Debug)]
pub struct ZoneExtElement<B>(Element<B>);

impl<B: AsRef<[u8]>> ZoneExtElement<B> {
    pub const SIZE: usize = 0xe0;
    pub const A_MEMBERS: usize = 48;
    pub const B_MEMBERS: usize = 64;

    pub fn new(data: B) -> ElementResult<Self> {
        Ok(Self(Element::new(data, Self::SIZE)?))
    }

    pub fn member_a(&self, n: usize) -> u16 {
        self.0.u16(2 * n, Endianness::Little)
    }

    pub fn member_b(&self, n: usize) -> u16 {
        self.0.u16(0x60 + 2 * n, Endianness::Little)
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> ZoneExtElement<B> {
    pub fn clear(&mut self) {
        self.0.fill(0x00, Self::SIZE, 0x00);
    }

    pub fn set_member_a(&mut self, n: usize, code: u16) {
        self.0.set_u16(2 * n, code, Endianness::Little);
    }

    pub fn set_member_b(&mut self, n: usize, code: u16) {
        self.0.set_u16(0x60 + 2 * n, code, Endianness::Little);
    }
}

impl Codeplug {
    pub fn clear_zones(&mut self) -> CodeplugResult<()> {
        let table = self.layout.zones;
        for i in 0..table.count {
            ZoneElement::new(self.table_record_mut(&table, i)?)?.clear();
        }
        if let Some(ext) = self.layout.zone_extensions {
            for i in 0..ext.count {
                ZoneExtElement::new(self.table_record_mut(&ext, i)?)?.clear();
            }
        }
        Ok(())
    }

    pub fn encode_zones(
        &mut self,
        config: &Config,
        _flags: &Flags,
        ctx: &mut CodeplugContext,
    ) -> CodeplugResult<()> {
        self.clear_zones()?;
        let table = self.layout.zones;
        check_members(config.zones.len(), table.count, "zones", &mut ctx.log);
        let a_max = self.layout.zone_a_capacity();
        let b_max = self.layout.zone_b_capacity();

        for (handle, zone) in config.zones.iter() {
            let Some(index) = ctx.zones.index(handle) else {
                continue;
            };
            let index = index as usize;
            ctx.log.push(format!("zone {}", index + 1));

            let a = member_codes(&zone.a, &ctx.channels, "channel", &mut ctx.log)?;
            let b = member_codes(&zone.b, &ctx.channels, "channel", &mut ctx.log)?;
            check_members(a.len(), a_max, "channels in list A", &mut ctx.log);
            if b_max == 0 && !b.is_empty() {
                ctx.log
                    .warning("list B is not supported by this device, members dropped");
            } else {
                check_members(b.len(), b_max, "channels in list B", &mut ctx.log);
            }

            let mut el = ZoneElement::new(self.table_record_mut(&table, index)?)?;
            el.set_name(&zone.name);
            for (n, &code) in a.iter().take(ZoneElement::<&[u8]>::MEMBERS).enumerate() {
                el.set_member(n, code);
            }

            if let Some(ext_table) = self.layout.zone_extensions {
                let mut ext = ZoneExtElement::new(self.table_record_mut(&ext_table, index)?)?;
                let rest = a.iter().skip(ZoneElement::<&[u8]>::MEMBERS);
                for (n, &code) in rest.take(ZoneExtElement::<&[u8]>::A_MEMBERS).enumerate() {
                    ext.set_member_a(n, code);
                }
                for (n, &code) in b.iter().take(ZoneExtElement::<&[u8]>::B_MEMBERS).enumerate() {
                    ext.set_member_b(n, code);
                }
            }
            ctx.log.pop();
        }
        Ok(())
    }

    pub fn create_zones(&self, config: &mut Config, ctx: &mut CodeplugContext) -> CodeplugResult<()> {
        let table = self.layout.zones;
        for i in 0..table.count {
            let el = ZoneElement::new(self.table_record(&table, i)?)?;
            if !el.is_valid() {
                continue;
            }
            let handle = config.zones.add(Zone::new(el.name()));
            ctx.zones.register(i as u32, handle);
        }
        debug!("Created {} zones", ctx.zones.len());
        Ok(())
    }

    pub fn link_zones(&self, config: &mut Config, ctx: &mut CodeplugContext) -> CodeplugResult<()> {
        let table = self.layout.zones;
        for i in 0..table.count {
            let Some(handle) = ctx.zones.handle(i as u32) else {
                continue;
            };
            ctx.log.push(format!("zone {}", i + 1));
            let mut codes_a = ZoneElement::new(self.table_record(&table, i)?)?.members();
            let mut codes_b = Vec::new();
            if let Some(ext_table) = self.layout.zone_extensions {
                let ext = ZoneExtElement::new(self.table_record(&ext_table, i)?)?;
                codes_a.extend((0..ZoneExtElement::<&[u8]>::A_MEMBERS).map(|n| ext.member_a(n)));
                codes_b.extend((0..ZoneExtElement::<&[u8]>::B_MEMBERS).map(|n| ext.member_b(n)));
            }
            let a = resolve_members(codes_a, &ctx.channels, "channel", &mut ctx.log);
            let b = resolve_members(codes_b, &ctx.channels, "channel", &mut ctx.log);
            if let Some(zone) = config.zones.get_mut(handle) {
                zone.a = a;
                zone.b = b;
            }
            ctx.log.pop();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codeplug::{MD390, UV390};
    use crate::config::{AnalogChannel, Channel, Handle};

    fn config_with_channels(n: usize) -> (Config, Vec<Handle<Channel>>) {
        let mut config = Config::new();
        let handles = (0..n)
            .map(|i| {
                config.channels.add(Channel::Analog(AnalogChannel::new(
                    format!("CH{}", i + 1),
                    145_000_000 + i as u64 * 12_500,
                    145_000_000 + i as u64 * 12_500,
                )))
            })
            .collect();
        (config, handles)
    }

    #[test]
    fn test_extension_holds_long_lists() {
        let (mut config, channels) = config_with_channels(40);
        let mut zone = Zone::new("Big");
        zone.a = channels[..30].to_vec();
        zone.b = channels[30..].to_vec();
        config.zones.add(zone);

        let mut codeplug = Codeplug::new(&UV390);
        let log = codeplug.encode(&config, &Flags::default()).unwrap();
        assert!(!log.has_warnings());

        let ext =
            ZoneExtElement::new(codeplug.table_record(UV390.zone_extensions.as_ref().unwrap(), 0).unwrap())
                .unwrap();
        assert_eq!(ext.member_a(0), 17);
        assert_eq!(ext.member_b(0), 31);

        let mut decoded = Config::new();
        codeplug.decode(&mut decoded).unwrap();
        let zone = decoded.zones.at(0).unwrap();
        assert_eq!(zone.a.len(), 30);
        assert_eq!(zone.b.len(), 10);
        assert_eq!(decoded.channels.get(zone.b[0]).unwrap().name(), "CH31");
    }

    #[test]
    fn test_list_b_dropped_without_extension() {
        let (mut config, channels) = config_with_channels(20);
        let mut zone = Zone::new("Z");
        zone.a = channels.clone();
        zone.b = channels[..2].to_vec();
        config.zones.add(zone);

        let mut codeplug = Codeplug::new(&MD390);
        let log = codeplug.encode(&config, &Flags::default()).unwrap();
        assert_eq!(log.texts(crate::core::Severity::Warning).len(), 2);

        let mut decoded = Config::new();
        codeplug.decode(&mut decoded).unwrap();
        let zone = decoded.zones.at(0).unwrap();
        assert_eq!(zone.a.len(), 16);
        assert!(zone.b.is_empty());
    }
}
