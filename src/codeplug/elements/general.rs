// General settings record

use crate::bitwise::elements::Result as ElementResult;
use crate::bitwise::{Element, Endianness};
use crate::codeplug::{Codeplug, CodeplugContext, CodeplugResult, Flags};
use crate::config::{Config, GeneralSettings, RadioId};
use crate::core::{MessageLog, MAX_DMR_ID};

const INTRO_CHARS: usize = 10;
const RADIO_NAME_CHARS: usize = 16;
const ADDITIONAL_IDS: usize = 4;
const PASSWORD_DISABLED: u32 = 0xffff_ffff;
const KEYPAD_LOCK_MANUAL: u8 = 0xff;

/// (byte, bit) of every boolean setting
const OPEN_SQUELCH_MONITOR: (usize, u8) = (0x40, 0);
const DISABLE_ALL_LEDS: (usize, u8) = (0x40, 2);
const SAVE_PREAMBLE: (usize, u8) = (0x40, 3);
const SAVE_MODE_RX: (usize, u8) = (0x40, 4);
const DISABLE_ALL_TONES: (usize, u8) = (0x40, 5);
const CHANNEL_FREE_TONE: (usize, u8) = (0x40, 6);
const TALK_PERMIT_DIGITAL: (usize, u8) = (0x41, 0);
const TALK_PERMIT_ANALOG: (usize, u8) = (0x41, 1);
const SPEECH: (usize, u8) = (0x41, 2);
const INTRO_PICTURE: (usize, u8) = (0x41, 3);
const KEYPAD_TONES: (usize, u8) = (0x41, 4);
const CHANNEL_MODE_A: (usize, u8) = (0x42, 0);
const CHANNEL_MODE_B: (usize, u8) = (0x42, 1);
const GROUP_CALL_MATCH: (usize, u8) = (0x68, 0);
const PRIVATE_CALL_MATCH: (usize, u8) = (0x68, 1);
const PUBLIC_ZONE: (usize, u8) = (0x91, 0);
const EDIT_RADIO_ID: (usize, u8) = (0xa5, 0);

/// General settings (176 bytes)
///
/// Byte layout:
/// - 0x00/0x14: intro lines 1/2 (10 x UTF-16LE each)
/// - 0x40-0x42: flag bytes (see the bit constants above)
/// - 0x44: DMR ID (u24 LE)
/// - 0x48: TX preamble in 60ms steps, 0x49/0x4a: group/private call hang in 100ms steps
/// - 0x4b: VOX sensitivity
/// - 0x4e: low battery interval in 5s steps, 0x4f: call alert duration in 5s steps
/// - 0x50/0x51: lone worker response time (min) and reminder time (s)
/// - 0x53/0x54: digital/analog scan hang time in 5ms steps
/// - 0x55: backlight time in 5s steps, 0x56: keypad lock in 5s steps (0xff=manual)
/// - 0x58/0x5c: power-on and radio programming password (8 digit LE BCD, 0xffffffff=off)
/// - 0x60: PC programming password (8 ASCII, 0xff=off)
/// - 0x68: call match flags, 0x6b: time zone + 12
/// - 0x70: radio name (16 x UTF-16LE)
/// - 0x90: channel hang time in 100ms steps, 0x91: public zone
/// - 0x94: 4 additional DMR IDs (u32 LE, 0 or 0xffffffff=unused)
/// - 0xa4: mic level, 0xa5: edit radio ID
#[derive(Debug)]
pub struct GeneralSettingsElement<B>(Element<B>);

impl<B: AsRef<[u8]>> GeneralSettingsElement<B> {
    pub const SIZE: usize = 0xb0;

    pub fn new(data: B) -> ElementResult<Self> {
        Ok(Self(Element::new(data, Self::SIZE)?))
    }

    fn flag(&self, (offset, bit): (usize, u8)) -> bool {
        self.0.bit(offset, bit)
    }

    pub fn dmr_id(&self) -> u32 {
        self.0.u24_le(0x44)
    }

    pub fn radio_name(&self) -> String {
        self.0.utf16(0x70, RADIO_NAME_CHARS)
    }

    pub fn additional_ids(&self) -> Vec<u32> {
        (0..ADDITIONAL_IDS)
            .map(|n| self.0.u32(0x94 + 4 * n, Endianness::Little))
            .filter(|&id| id != 0 && id != 0xffff_ffff)
            .collect()
    }

    fn password(&self, offset: usize) -> Option<u32> {
        if self.0.u32(offset, Endianness::Little) == PASSWORD_DISABLED {
            return None;
        }
        self.0
            .bcd(offset, 4, Endianness::Little)
            .map(|value| value as u32)
    }

    pub fn to_settings(&self) -> GeneralSettings {
        let pc_password = self.0.ascii(0x60, 8);
        let keypad_lock = self.0.u8(0x56);
        GeneralSettings {
            radio_name: self.radio_name(),
            intro_line1: self.0.utf16(0x00, INTRO_CHARS),
            intro_line2: self.0.utf16(0x14, INTRO_CHARS),
            mic_level: self.0.u8(0xa4),
            speech: self.flag(SPEECH),
            keypad_tones: self.flag(KEYPAD_TONES),
            talk_permit_digital: self.flag(TALK_PERMIT_DIGITAL),
            talk_permit_analog: self.flag(TALK_PERMIT_ANALOG),
            channel_free_tone: self.flag(CHANNEL_FREE_TONE),
            disable_all_leds: self.flag(DISABLE_ALL_LEDS),
            disable_all_tones: self.flag(DISABLE_ALL_TONES),
            intro_picture: self.flag(INTRO_PICTURE),
            save_preamble: self.flag(SAVE_PREAMBLE),
            save_mode_rx: self.flag(SAVE_MODE_RX),
            open_squelch_monitor: self.flag(OPEN_SQUELCH_MONITOR),
            channel_mode_a: self.flag(CHANNEL_MODE_A),
            channel_mode_b: self.flag(CHANNEL_MODE_B),
            tx_preamble_ms: self.0.u8(0x48) as u32 * 60,
            group_call_hang_ms: self.0.u8(0x49) as u32 * 100,
            private_call_hang_ms: self.0.u8(0x4a) as u32 * 100,
            vox_sensitivity: self.0.u8(0x4b),
            low_battery_interval_s: self.0.u8(0x4e) as u32 * 5,
            call_alert_duration_s: self.0.u8(0x4f) as u32 * 5,
            lone_worker_response_min: self.0.u8(0x50),
            lone_worker_reminder_s: self.0.u8(0x51),
            scan_digital_hang_ms: self.0.u8(0x53) as u32 * 5,
            scan_analog_hang_ms: self.0.u8(0x54) as u32 * 5,
            backlight_s: self.0.u8(0x55) as u32 * 5,
            keypad_lock_s: (keypad_lock != KEYPAD_LOCK_MANUAL).then(|| keypad_lock as u32 * 5),
            power_on_password: self.password(0x58),
            radio_prog_password: self.password(0x5c),
            pc_prog_password: (!pc_password.is_empty()).then_some(pc_password),
            group_call_match: self.flag(GROUP_CALL_MATCH),
            private_call_match: self.flag(PRIVATE_CALL_MATCH),
            time_zone: (self.0.u8(0x6b) as i16 - 12).clamp(-12, 12) as i8,
            channel_hang_time_ms: self.0.u8(0x90) as u32 * 100,
            public_zone: self.flag(PUBLIC_ZONE),
            edit_radio_id: self.flag(EDIT_RADIO_ID),
        }
    }
}

fn steps(value: u32, step: u32) -> u8 {
    (value / step).min(0xff) as u8
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> GeneralSettingsElement<B> {
    pub fn clear(&mut self) {
        self.0.fill(0x00, Self::SIZE, 0xff);
        self.0.fill(0x00, INTRO_CHARS * 4, 0x00);
        self.0.fill(0x70, RADIO_NAME_CHARS * 2, 0x00);
        self.0.fill(0x94, ADDITIONAL_IDS * 4, 0x00);
        self.set_dmr_id(0);
        self.set_settings(&GeneralSettings::default(), &mut MessageLog::new());
    }

    fn set_flag(&mut self, (offset, bit): (usize, u8), value: bool) {
        self.0.set_bit(offset, bit, value);
    }

    pub fn set_dmr_id(&mut self, id: u32) {
        self.0.set_u24_le(0x44, id);
        self.0.set_u8(0x47, 0x00);
    }

    pub fn set_additional_ids(&mut self, ids: &[u32]) {
        for n in 0..ADDITIONAL_IDS {
            let id = ids.get(n).copied().unwrap_or(0);
            self.0.set_u32(0x94 + 4 * n, id, Endianness::Little);
        }
    }

    fn set_password(&mut self, offset: usize, password: Option<u32>, log: &mut MessageLog) {
        let stored = password.map(|p| self.0.set_bcd(offset, 4, p as u64, Endianness::Little));
        match stored {
            Some(Ok(())) => {}
            Some(Err(err)) => {
                log.warning(format!("password not stored: {}", err));
                self.0.set_u32(offset, PASSWORD_DISABLED, Endianness::Little);
            }
            None => self.0.set_u32(offset, PASSWORD_DISABLED, Endianness::Little),
        }
    }

    pub fn set_settings(&mut self, s: &GeneralSettings, log: &mut MessageLog) {
        self.0.set_utf16(0x70, RADIO_NAME_CHARS, &s.radio_name, 0x0000);
        self.0.set_utf16(0x00, INTRO_CHARS, &s.intro_line1, 0x0000);
        self.0.set_utf16(0x14, INTRO_CHARS, &s.intro_line2, 0x0000);
        self.0.set_u8(0xa4, s.mic_level);

        self.set_flag(SPEECH, s.speech);
        self.set_flag(KEYPAD_TONES, s.keypad_tones);
        self.set_flag(TALK_PERMIT_DIGITAL, s.talk_permit_digital);
        self.set_flag(TALK_PERMIT_ANALOG, s.talk_permit_analog);
        self.set_flag(CHANNEL_FREE_TONE, s.channel_free_tone);
        self.set_flag(DISABLE_ALL_LEDS, s.disable_all_leds);
        self.set_flag(DISABLE_ALL_TONES, s.disable_all_tones);
        self.set_flag(INTRO_PICTURE, s.intro_picture);
        self.set_flag(SAVE_PREAMBLE, s.save_preamble);
        self.set_flag(SAVE_MODE_RX, s.save_mode_rx);
        self.set_flag(OPEN_SQUELCH_MONITOR, s.open_squelch_monitor);
        self.set_flag(CHANNEL_MODE_A, s.channel_mode_a);
        self.set_flag(CHANNEL_MODE_B, s.channel_mode_b);
        self.set_flag(GROUP_CALL_MATCH, s.group_call_match);
        self.set_flag(PRIVATE_CALL_MATCH, s.private_call_match);
        self.set_flag(PUBLIC_ZONE, s.public_zone);
        self.set_flag(EDIT_RADIO_ID, s.edit_radio_id);

        self.0.set_u8(0x48, steps(s.tx_preamble_ms, 60));
        self.0.set_u8(0x49, steps(s.group_call_hang_ms, 100));
        self.0.set_u8(0x4a, steps(s.private_call_hang_ms, 100));
        self.0.set_u8(0x4b, s.vox_sensitivity);
        self.0.set_u8(0x4e, steps(s.low_battery_interval_s, 5));
        self.0.set_u8(0x4f, steps(s.call_alert_duration_s, 5));
        self.0.set_u8(0x50, s.lone_worker_response_min);
        self.0.set_u8(0x51, s.lone_worker_reminder_s);
        self.0.set_u8(0x53, steps(s.scan_digital_hang_ms, 5));
        self.0.set_u8(0x54, steps(s.scan_analog_hang_ms, 5));
        self.0.set_u8(0x55, steps(s.backlight_s, 5));
        let keypad_lock = s
            .keypad_lock_s
            .map_or(KEYPAD_LOCK_MANUAL, |secs| steps(secs, 5).min(0xfe));
        self.0.set_u8(0x56, keypad_lock);
        self.0.set_u8(0x6b, (s.time_zone.clamp(-12, 12) + 12) as u8);
        self.0.set_u8(0x90, steps(s.channel_hang_time_ms, 100));

        self.set_password(0x58, s.power_on_password, log);
        self.set_password(0x5c, s.radio_prog_password, log);
        match &s.pc_prog_password {
            Some(password) => self.0.set_ascii(0x60, 8, password, 0xff),
            None => self.0.fill(0x60, 8, 0xff),
        }
    }
}

impl Codeplug {
    pub fn clear_general_settings(&mut self) -> CodeplugResult<()> {
        let address = self.layout.general_settings;
        GeneralSettingsElement::new(
            self.record_mut(address, GeneralSettingsElement::<&[u8]>::SIZE)?,
        )?
        .clear();
        Ok(())
    }

    /// Settings plus the radio IDs: the default ID is the primary DMR ID, up to
    /// four more go into the additional ID slots
    pub fn encode_general_settings(
        &mut self,
        config: &Config,
        _flags: &Flags,
        ctx: &mut CodeplugContext,
    ) -> CodeplugResult<()> {
        ctx.log.push("general settings");
        let address = self.layout.general_settings;
        let mut el = GeneralSettingsElement::new(
            self.record_mut(address, GeneralSettingsElement::<&[u8]>::SIZE)?,
        )?;
        el.clear();
        el.set_settings(&config.settings, &mut ctx.log);

        let default = config.radio_ids.effective_default();
        match default.and_then(|h| config.radio_ids.get(h)) {
            Some(id) if id.number > MAX_DMR_ID => {
                ctx.log
                    .warning(format!("radio ID {} does not fit 24 bits", id.number));
            }
            Some(id) => el.set_dmr_id(id.number),
            None => ctx.log.hint("no radio ID defined"),
        }

        let additional: Vec<u32> = config
            .radio_ids
            .iter()
            .filter(|(h, _)| Some(*h) != default)
            .map(|(_, id)| id.number)
            .collect();
        if additional.len() > ADDITIONAL_IDS {
            ctx.log.warning(format!(
                "{} additional radio IDs exceed the limit of {}, truncated",
                additional.len(),
                ADDITIONAL_IDS
            ));
        }
        el.set_additional_ids(&additional);
        ctx.log.pop();
        Ok(())
    }

    pub fn decode_general_settings(
        &self,
        config: &mut Config,
        _ctx: &mut CodeplugContext,
    ) -> CodeplugResult<()> {
        let address = self.layout.general_settings;
        let el = GeneralSettingsElement::new(
            self.record(address, GeneralSettingsElement::<&[u8]>::SIZE)?,
        )?;
        config.settings = el.to_settings();

        let name = match el.radio_name() {
            name if name.is_empty() => el.dmr_id().to_string(),
            name => name,
        };
        config.radio_ids.clear();
        if el.dmr_id() != 0 && el.dmr_id() != MAX_DMR_ID {
            config.radio_ids.add(RadioId::new(name, el.dmr_id()));
        }
        for id in el.additional_ids() {
            config.radio_ids.add(RadioId::new(id.to_string(), id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codeplug::MD390;

    fn record() -> GeneralSettingsElement<Vec<u8>> {
        let mut el =
            GeneralSettingsElement::new(vec![0u8; GeneralSettingsElement::<Vec<u8>>::SIZE]).unwrap();
        el.clear();
        el
    }

    #[test]
    fn test_cleared_block_decodes_to_defaults() {
        let el = record();
        assert_eq!(el.to_settings(), GeneralSettings::default());
        assert!(el.additional_ids().is_empty());
    }

    #[test]
    fn test_settings_round_trip() {
        let mut el = record();
        let settings = GeneralSettings {
            radio_name: "DM3MAT".to_string(),
            intro_line1: "Hello".to_string(),
            time_zone: -5,
            keypad_lock_s: Some(15),
            power_on_password: Some(1234),
            pc_prog_password: Some("secret".to_string()),
            disable_all_leds: true,
            ..GeneralSettings::default()
        };
        let mut log = MessageLog::new();
        el.set_settings(&settings, &mut log);
        assert!(log.is_empty());
        assert_eq!(el.0.u8(0x6b), 7);
        assert_eq!(&el.0.data()[0x58..0x5c], &[0x34, 0x12, 0x00, 0x00]);
        assert_eq!(el.to_settings(), settings);
    }

    #[test]
    fn test_radio_ids() {
        let mut config = Config::new();
        config.radio_ids.add(RadioId::new("Main", 2621370));
        config.radio_ids.add(RadioId::new("Club", 2621371));

        let mut codeplug = Codeplug::new(&MD390);
        codeplug.encode(&config, &Flags::default()).unwrap();
        let el = GeneralSettingsElement::new(
            codeplug
                .record(MD390.general_settings, GeneralSettingsElement::<&[u8]>::SIZE)
                .unwrap(),
        )
        .unwrap();
        assert_eq!(el.dmr_id(), 2621370);
        assert_eq!(el.additional_ids(), vec![2621371]);

        let mut decoded = Config::new();
        codeplug.decode(&mut decoded).unwrap();
        assert_eq!(decoded.radio_ids.len(), 2);
        let default = decoded.radio_ids.default_id().unwrap();
        assert_eq!(decoded.radio_ids.get(default).unwrap().number, 2621370);
    }
}
