// Boot zone and channel selection record

use crate::bitwise::elements::Result as ElementResult;
use crate::bitwise::Element;
use crate::codeplug::{Codeplug, CodeplugContext, CodeplugResult, Flags};
use crate::config::{BootSettings, Channel, Config, Handle};
use crate::core::MessageLog;

/// Boot settings (16 bytes)
///
/// Byte layout:
/// - 0x00: 0x01
/// - 0x01: zone (+1 index, 0=last used)
/// - 0x02/0x03: channel A/B (+1 position within the zone's A/B list, 0=last used)
/// - rest: 0xff
#[derive(Debug)]
pub struct BootSettingsElement<B>(Element<B>);

impl<B: AsRef<[u8]>> BootSettingsElement<B> {
    pub const SIZE: usize = 0x10;

    pub fn new(data: B) -> ElementResult<Self> {
        Ok(Self(Element::new(data, Self::SIZE)?))
    }

    pub fn zone(&self) -> u8 {
        self.0.u8(0x01)
    }

    pub fn channel_a(&self) -> u8 {
        self.0.u8(0x02)
    }

    pub fn channel_b(&self) -> u8 {
        self.0.u8(0x03)
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> BootSettingsElement<B> {
    pub fn clear(&mut self) {
        self.0.fill(0x00, Self::SIZE, 0xff);
        self.0.set_u8(0x00, 0x01);
        self.set_zone(0);
        self.set_channel_a(0);
        self.set_channel_b(0);
    }

    pub fn set_zone(&mut self, code: u8) {
        self.0.set_u8(0x01, code);
    }

    pub fn set_channel_a(&mut self, code: u8) {
        self.0.set_u8(0x02, code);
    }

    pub fn set_channel_b(&mut self, code: u8) {
        self.0.set_u8(0x03, code);
    }
}

/// +1 position of `channel` in `members`, 0 if unset or not a member
fn member_position(
    members: &[Handle<Channel>],
    channel: Option<Handle<Channel>>,
    capacity: usize,
    list: &str,
    log: &mut MessageLog,
) -> u8 {
    let Some(channel) = channel else {
        return 0;
    };
    match members.iter().position(|&h| h == channel) {
        Some(n) if n < capacity => (n + 1) as u8,
        _ => {
            log.warning(format!("boot channel is not part of the zone's {} list", list));
            0
        }
    }
}

impl Codeplug {
    pub fn clear_boot_settings(&mut self) -> CodeplugResult<()> {
        let Some(address) = self.layout.boot_settings else {
            return Ok(());
        };
        BootSettingsElement::new(self.record_mut(address, BootSettingsElement::<&[u8]>::SIZE)?)?
            .clear();
        Ok(())
    }

    pub fn encode_boot_settings(
        &mut self,
        config: &Config,
        _flags: &Flags,
        ctx: &mut CodeplugContext,
    ) -> CodeplugResult<()> {
        let Some(address) = self.layout.boot_settings else {
            if config.boot.zone.is_some() {
                ctx.log.hint("boot zone selection is not supported by this device");
            }
            return Ok(());
        };
        ctx.log.push("boot settings");
        let zone_code = ctx.zones.encode(config.boot.zone, "zone", &mut ctx.log)?;
        let (a, b) = match config.boot.zone.and_then(|h| config.zones.get(h)) {
            Some(zone) if zone_code != 0 => (
                member_position(
                    &zone.a,
                    config.boot.channel_a,
                    self.layout.zone_a_capacity(),
                    "A",
                    &mut ctx.log,
                ),
                member_position(
                    &zone.b,
                    config.boot.channel_b,
                    self.layout.zone_b_capacity(),
                    "B",
                    &mut ctx.log,
                ),
            ),
            _ => (0, 0),
        };

        let mut el =
            BootSettingsElement::new(self.record_mut(address, BootSettingsElement::<&[u8]>::SIZE)?)?;
        el.clear();
        el.set_zone(zone_code.min(0xff) as u8);
        el.set_channel_a(a);
        el.set_channel_b(b);
        ctx.log.pop();
        Ok(())
    }

    /// Runs after zones are linked, channels are looked up in the zone's lists
    pub fn decode_boot_settings(
        &self,
        config: &mut Config,
        ctx: &mut CodeplugContext,
    ) -> CodeplugResult<()> {
        let Some(address) = self.layout.boot_settings else {
            return Ok(());
        };
        let el = BootSettingsElement::new(self.record(address, BootSettingsElement::<&[u8]>::SIZE)?)?;

        ctx.log.push("boot settings");
        let mut boot = BootSettings {
            zone: ctx.zones.resolve(el.zone() as u32, "zone", &mut ctx.log),
            ..BootSettings::default()
        };
        if let Some(zone) = boot.zone.and_then(|h| config.zones.get(h)) {
            let lookup = |members: &[Handle<Channel>], code: u8| {
                (code as usize)
                    .checked_sub(1)
                    .and_then(|n| members.get(n).copied())
            };
            boot.channel_a = lookup(&zone.a, el.channel_a());
            boot.channel_b = lookup(&zone.b, el.channel_b());
            if el.channel_a() != 0 && boot.channel_a.is_none() {
                ctx.log.warning(format!("boot channel A {} not in zone", el.channel_a()));
            }
            if el.channel_b() != 0 && boot.channel_b.is_none() {
                ctx.log.warning(format!("boot channel B {} not in zone", el.channel_b()));
            }
        }
        ctx.log.pop();
        config.boot = boot;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codeplug::{MD390, UV390};
    use crate::config::{AnalogChannel, Zone};

    fn config_with_zone() -> Config {
        let mut config = Config::new();
        let ch1 = config
            .channels
            .add(Channel::Analog(AnalogChannel::new("1", 145_000_000, 145_000_000)));
        let ch2 = config
            .channels
            .add(Channel::Analog(AnalogChannel::new("2", 145_500_000, 145_500_000)));
        config.zones.add(Zone::new("Other"));
        let mut zone = Zone::new("Home");
        zone.a = vec![ch1, ch2];
        zone.b = vec![ch1];
        let zone = config.zones.add(zone);
        config.boot = BootSettings {
            zone: Some(zone),
            channel_a: Some(ch2),
            channel_b: Some(ch1),
        };
        config
    }

    #[test]
    fn test_boot_positions() {
        let config = config_with_zone();
        let mut codeplug = Codeplug::new(&UV390);
        let log = codeplug.encode(&config, &Flags::default()).unwrap();
        assert!(!log.has_warnings());
        let el = BootSettingsElement::new(
            codeplug
                .record(UV390.boot_settings.unwrap(), BootSettingsElement::<&[u8]>::SIZE)
                .unwrap(),
        )
        .unwrap();
        assert_eq!((el.zone(), el.channel_a(), el.channel_b()), (2, 2, 1));

        let mut decoded = Config::new();
        codeplug.decode(&mut decoded).unwrap();
        let zone = decoded.zones.handle_at(1);
        assert_eq!(decoded.boot.zone, zone);
        assert_eq!(decoded.boot.channel_a, decoded.channels.handle_at(1));
        assert_eq!(decoded.boot.channel_b, decoded.channels.handle_at(0));
    }

    #[test]
    fn test_channel_outside_zone_warns() {
        let mut config = config_with_zone();
        let stray = config
            .channels
            .add(Channel::Analog(AnalogChannel::new("3", 146_000_000, 146_000_000)));
        config.boot.channel_a = Some(stray);
        let mut codeplug = Codeplug::new(&UV390);
        let log = codeplug.encode(&config, &Flags::default()).unwrap();
        assert!(log.has_warnings());
    }

    #[test]
    fn test_unsupported_device_skips() {
        let config = config_with_zone();
        let mut codeplug = Codeplug::new(&MD390);
        let log = codeplug.encode(&config, &Flags::default()).unwrap();
        assert!(log
            .messages()
            .iter()
            .any(|m| m.text.contains("boot zone selection")));
    }
}
