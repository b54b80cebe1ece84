// Emergency settings and emergency system records

use super::NAME_CHARS;
use crate::bitwise::elements::Result as ElementResult;
use crate::bitwise::{Element, Endianness};
use crate::codeplug::{Codeplug, CodeplugContext, CodeplugResult, Flags};
use crate::config::{AlarmMode, AlarmType, Config, EmergencySettings, EmergencySystem};
use tracing::debug;

/// Global emergency settings (16 bytes)
///
/// Byte layout:
/// - 0x00: radio disable decode (bit 0), remote monitor decode (bit 1),
///   emergency remote monitor decode (bit 2)
/// - 0x01: remote monitor duration in 10s steps
/// - 0x02: TX sync wakeup in 25ms steps
/// - 0x03: TX wakeup message limit
#[derive(Debug)]
pub struct EmergencySettingsElement<B>(Element<B>);

impl<B: AsRef<[u8]>> EmergencySettingsElement<B> {
    pub const SIZE: usize = 0x10;

    pub fn new(data: B) -> ElementResult<Self> {
        Ok(Self(Element::new(data, Self::SIZE)?))
    }

    pub fn to_settings(&self) -> EmergencySettings {
        EmergencySettings {
            radio_disable_decode: self.0.bit(0x00, 0),
            remote_monitor_decode: self.0.bit(0x00, 1),
            emergency_remote_monitor_decode: self.0.bit(0x00, 2),
            remote_monitor_duration_s: self.0.u8(0x01) as u32 * 10,
            tx_sync_wakeup_ms: self.0.u8(0x02) as u32 * 25,
            tx_wakeup_message_limit: self.0.u8(0x03),
        }
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> EmergencySettingsElement<B> {
    pub fn clear(&mut self) {
        self.0.fill(0x00, Self::SIZE, 0xff);
        self.set_settings(&EmergencySettings::default());
    }

    pub fn set_settings(&mut self, settings: &EmergencySettings) {
        self.0.set_u8(0x00, 0xf8);
        self.0.set_bit(0x00, 0, settings.radio_disable_decode);
        self.0.set_bit(0x00, 1, settings.remote_monitor_decode);
        self.0.set_bit(0x00, 2, settings.emergency_remote_monitor_decode);
        self.0
            .set_u8(0x01, (settings.remote_monitor_duration_s / 10).min(0xff) as u8);
        self.0
            .set_u8(0x02, (settings.tx_sync_wakeup_ms / 25).min(0xff) as u8);
        self.0.set_u8(0x03, settings.tx_wakeup_message_limit);
    }
}

/// Emergency system record (40 bytes)
///
/// Byte layout:
/// - 0x00: name (16 x UTF-16LE)
/// - 0x20: alarm type (bits 0-1), alarm mode (bits 4-5)
/// - 0x21: impolite retries, 0x22: polite retries
/// - 0x23: hot mic duration in 10s steps
/// - 0x24: revert channel (u16 LE, 0=selected, otherwise +1 channel index)
#[derive(Debug)]
pub struct EmergencySystemElement<B>(Element<B>);

impl<B: AsRef<[u8]>> EmergencySystemElement<B> {
    pub const SIZE: usize = 0x28;

    pub fn new(data: B) -> ElementResult<Self> {
        Ok(Self(Element::new(data, Self::SIZE)?))
    }

    pub fn is_valid(&self) -> bool {
        !self.name().is_empty()
    }

    pub fn name(&self) -> String {
        self.0.utf16(0x00, NAME_CHARS)
    }

    pub fn alarm_type(&self) -> AlarmType {
        match self.0.uint(0x20, 0, 2) {
            1 => AlarmType::Regular,
            2 => AlarmType::Silent,
            3 => AlarmType::SilentWithVoice,
            _ => AlarmType::Disabled,
        }
    }

    pub fn alarm_mode(&self) -> AlarmMode {
        match self.0.uint(0x20, 4, 2) {
            1 => AlarmMode::AlarmWithCall,
            2 => AlarmMode::AlarmWithVoice,
            _ => AlarmMode::Alarm,
        }
    }

    pub fn revert_channel(&self) -> u16 {
        self.0.u16(0x24, Endianness::Little)
    }

    /// System with intrinsic fields only, the revert channel is linked later
    pub fn to_system(&self) -> EmergencySystem {
        let mut sys = EmergencySystem::new(self.name());
        sys.alarm_type = self.alarm_type();
        sys.alarm_mode = self.alarm_mode();
        sys.impolite_retries = self.0.u8(0x21);
        sys.polite_retries = self.0.u8(0x22);
        sys.hot_mic_duration_s = self.0.u8(0x23) as u32 * 10;
        sys
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> EmergencySystemElement<B> {
    pub fn clear(&mut self) {
        self.0.fill(0x00, NAME_CHARS * 2, 0x00);
        self.0.fill(0x20, Self::SIZE - 0x20, 0xff);
        self.0.set_u8(0x20, 0x00);
        self.set_revert_channel(0);
    }

    pub fn set_system(&mut self, sys: &EmergencySystem) {
        self.0.set_utf16(0x00, NAME_CHARS, &sys.name, 0x0000);
        let alarm_type = match sys.alarm_type {
            AlarmType::Disabled => 0,
            AlarmType::Regular => 1,
            AlarmType::Silent => 2,
            AlarmType::SilentWithVoice => 3,
        };
        let alarm_mode = match sys.alarm_mode {
            AlarmMode::Alarm => 0,
            AlarmMode::AlarmWithCall => 1,
            AlarmMode::AlarmWithVoice => 2,
        };
        self.0.set_uint(0x20, 0, 2, alarm_type);
        self.0.set_uint(0x20, 4, 2, alarm_mode);
        self.0.set_u8(0x21, sys.impolite_retries);
        self.0.set_u8(0x22, sys.polite_retries);
        self.0
            .set_u8(0x23, (sys.hot_mic_duration_s / 10).min(0xff) as u8);
    }

    pub fn set_revert_channel(&mut self, code: u16) {
        self.0.set_u16(0x24, code, Endianness::Little);
    }
}

impl Codeplug {
    pub fn clear_emergency_settings(&mut self) -> CodeplugResult<()> {
        let address = self.layout.emergency_settings;
        EmergencySettingsElement::new(
            self.record_mut(address, EmergencySettingsElement::<&[u8]>::SIZE)?,
        )?
        .clear();
        Ok(())
    }

    pub fn encode_emergency_settings(
        &mut self,
        config: &Config,
        _flags: &Flags,
        _ctx: &mut CodeplugContext,
    ) -> CodeplugResult<()> {
        let address = self.layout.emergency_settings;
        let mut el = EmergencySettingsElement::new(
            self.record_mut(address, EmergencySettingsElement::<&[u8]>::SIZE)?,
        )?;
        el.clear();
        el.set_settings(&config.emergency);
        Ok(())
    }

    pub fn decode_emergency_settings(
        &self,
        config: &mut Config,
        _ctx: &mut CodeplugContext,
    ) -> CodeplugResult<()> {
        let address = self.layout.emergency_settings;
        let el = EmergencySettingsElement::new(
            self.record(address, EmergencySettingsElement::<&[u8]>::SIZE)?,
        )?;
        config.emergency = el.to_settings();
        Ok(())
    }

    pub fn clear_emergency_systems(&mut self) -> CodeplugResult<()> {
        let table = self.layout.emergency_systems;
        for i in 0..table.count {
            EmergencySystemElement::new(self.table_record_mut(&table, i)?)?.clear();
        }
        Ok(())
    }

    pub fn encode_emergency_systems(
        &mut self,
        config: &Config,
        _flags: &Flags,
        ctx: &mut CodeplugContext,
    ) -> CodeplugResult<()> {
        self.clear_emergency_systems()?;
        let table = self.layout.emergency_systems;
        if config.emergency_systems.len() > table.count {
            ctx.log.warning(format!(
                "{} emergency systems exceed the limit of {}, truncated",
                config.emergency_systems.len(),
                table.count
            ));
        }

        for (handle, sys) in config.emergency_systems.iter() {
            let Some(index) = ctx.emergency_systems.index(handle) else {
                continue;
            };
            ctx.log.push(format!("emergency system {}", index + 1));
            let revert = ctx.encode_channel_ref(sys.revert_channel, None)?;
            let mut el =
                EmergencySystemElement::new(self.table_record_mut(&table, index as usize)?)?;
            el.set_system(sys);
            el.set_revert_channel(revert);
            ctx.log.pop();
        }
        Ok(())
    }

    pub fn create_emergency_systems(
        &self,
        config: &mut Config,
        ctx: &mut CodeplugContext,
    ) -> CodeplugResult<()> {
        let table = self.layout.emergency_systems;
        for i in 0..table.count {
            let el = EmergencySystemElement::new(self.table_record(&table, i)?)?;
            if !el.is_valid() {
                continue;
            }
            let handle = config.emergency_systems.add(el.to_system());
            ctx.emergency_systems.register(i as u32, handle);
        }
        debug!("Created {} emergency systems", ctx.emergency_systems.len());
        Ok(())
    }

    pub fn link_emergency_systems(
        &self,
        config: &mut Config,
        ctx: &mut CodeplugContext,
    ) -> CodeplugResult<()> {
        let table = self.layout.emergency_systems;
        for i in 0..table.count {
            let Some(handle) = ctx.emergency_systems.handle(i as u32) else {
                continue;
            };
            ctx.log.push(format!("emergency system {}", i + 1));
            let el = EmergencySystemElement::new(self.table_record(&table, i)?)?;
            let revert = ctx.resolve_channel_ref(el.revert_channel(), None);
            if let Some(sys) = config.emergency_systems.get_mut(handle) {
                sys.revert_channel = revert;
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
    use crate::config::{AnalogChannel, Channel, ChannelRef, DigitalChannel};

    #[test]
    fn test_settings_round_trip() {
        let mut el = EmergencySettingsElement::new([0u8; 16]).unwrap();
        el.clear();
        assert_eq!(el.to_settings(), EmergencySettings::default());

        let settings = EmergencySettings {
            remote_monitor_decode: true,
            remote_monitor_duration_s: 30,
            tx_sync_wakeup_ms: 250,
            ..EmergencySettings::default()
        };
        el.set_settings(&settings);
        assert_eq!(el.0.u8(0x00), 0xfa);
        assert_eq!(el.to_settings(), settings);
    }

    #[test]
    fn test_system_revert_channel_links() {
        let mut config = Config::new();
        config
            .channels
            .add(Channel::Analog(AnalogChannel::new("A", 145_000_000, 145_000_000)));
        let revert = config
            .channels
            .add(Channel::Analog(AnalogChannel::new("B", 145_500_000, 145_500_000)));
        let mut sys = EmergencySystem::new("Alarm");
        sys.alarm_type = AlarmType::Silent;
        sys.hot_mic_duration_s = 30;
        sys.revert_channel = ChannelRef::Channel(revert);
        let sys = config.emergency_systems.add(sys);
        let mut dmr = DigitalChannel::new("D", 439_000_000, 439_000_000);
        dmr.emergency_system = Some(sys);
        config.channels.add(Channel::Digital(dmr));

        let mut codeplug = Codeplug::new(&MD390);
        codeplug.encode(&config, &Flags::default()).unwrap();
        let mut decoded = Config::new();
        codeplug.decode(&mut decoded).unwrap();

        let sys = decoded.emergency_systems.at(0).unwrap();
        assert_eq!(sys.name, "Alarm");
        assert_eq!(sys.alarm_type, AlarmType::Silent);
        assert_eq!(sys.hot_mic_duration_s, 30);
        assert_eq!(
            sys.revert_channel,
            ChannelRef::Channel(decoded.channels.handle_at(1).unwrap())
        );
        let dmr = decoded.channels.at(2).unwrap().as_digital().unwrap();
        assert_eq!(dmr.emergency_system, decoded.emergency_systems.handle_at(0));
    }
}
