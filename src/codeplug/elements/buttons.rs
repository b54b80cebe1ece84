// Button settings record: side buttons and one-touch access

use crate::bitwise::elements::Result as ElementResult;
use crate::bitwise::{Element, Endianness};
use crate::codeplug::{Codeplug, CodeplugContext, CodeplugResult, Flags};
use crate::config::{ButtonAction, ButtonSettings, Config, OneTouch, OneTouchKind};

const ONE_TOUCH_OFFSET: usize = 0x14;
const ONE_TOUCH_SIZE: usize = 4;

const MODE_ANALOG: u8 = 0;
const MODE_DIGITAL: u8 = 1;
const MODE_DISABLED: u8 = 3;
const ACTION_CALL: u8 = 0;
const ACTION_MESSAGE: u8 = 1;

impl ButtonAction {
    pub fn from_code(code: u8) -> Self {
        match code {
            0x00 => ButtonAction::Disabled,
            0x01 => ButtonAction::ToggleAllAlertTones,
            0x02 => ButtonAction::EmergencyOn,
            0x03 => ButtonAction::EmergencyOff,
            0x04 => ButtonAction::PowerSelect,
            0x05 => ButtonAction::Monitor,
            0x06 => ButtonAction::NuisanceDelete,
            0x07..=0x0c => ButtonAction::OneTouch(code - 0x06),
            0x0d => ButtonAction::ToggleTalkaround,
            0x0e => ButtonAction::ToggleScan,
            0x0f => ButtonAction::ToggleEncryption,
            0x10 => ButtonAction::ToggleVox,
            0x11 => ButtonAction::ZoneSelect,
            0x12 => ButtonAction::BatteryIndicator,
            0x13 => ButtonAction::ToggleLoneWorker,
            0x15 => ButtonAction::ToggleRecording,
            0x16 => ButtonAction::PlaybackRecording,
            0x17 => ButtonAction::DeleteAllRecordings,
            0x1e => ButtonAction::ManualDial,
            other => ButtonAction::Reserved(other),
        }
    }

    /// Device code; one-touch slots outside 1..=6 map to `Disabled`
    pub fn code(&self) -> u8 {
        match *self {
            ButtonAction::Disabled => 0x00,
            ButtonAction::ToggleAllAlertTones => 0x01,
            ButtonAction::EmergencyOn => 0x02,
            ButtonAction::EmergencyOff => 0x03,
            ButtonAction::PowerSelect => 0x04,
            ButtonAction::Monitor => 0x05,
            ButtonAction::NuisanceDelete => 0x06,
            ButtonAction::OneTouch(n @ 1..=6) => 0x06 + n,
            ButtonAction::OneTouch(_) => 0x00,
            ButtonAction::ToggleTalkaround => 0x0d,
            ButtonAction::ToggleScan => 0x0e,
            ButtonAction::ToggleEncryption => 0x0f,
            ButtonAction::ToggleVox => 0x10,
            ButtonAction::ZoneSelect => 0x11,
            ButtonAction::BatteryIndicator => 0x12,
            ButtonAction::ToggleLoneWorker => 0x13,
            ButtonAction::ToggleRecording => 0x15,
            ButtonAction::PlaybackRecording => 0x16,
            ButtonAction::DeleteAllRecordings => 0x17,
            ButtonAction::ManualDial => 0x1e,
            ButtonAction::Reserved(code) => code,
        }
    }
}

/// Button settings (128 bytes)
///
/// Byte layout:
/// - 0x02/0x03: side button 1 short/long press action
/// - 0x04/0x05: side button 2 short/long press action
/// - 0x11: long press duration in 250ms steps
/// - 0x14: 6 one-touch entries of 4 bytes:
///   - byte 0: action (bits 0-1, 0=call, 1=message), mode (bits 4-5, 0=analog, 1=digital, 3=off)
///   - byte 1: text message number
///   - bytes 2-3: contact (u16 LE, +1 index, 0=none)
/// - rest: 0xff
#[derive(Debug)]
pub struct ButtonSettingsElement<B>(Element<B>);

impl<B: AsRef<[u8]>> ButtonSettingsElement<B> {
    pub const SIZE: usize = 0x80;
    pub const ONE_TOUCH: usize = 6;

    pub fn new(data: B) -> ElementResult<Self> {
        Ok(Self(Element::new(data, Self::SIZE)?))
    }

    pub fn action(&self, offset: usize) -> ButtonAction {
        ButtonAction::from_code(self.0.u8(offset))
    }

    pub fn long_press_ms(&self) -> u32 {
        self.0.u8(0x11) as u32 * 250
    }

    fn one_touch_offset(n: usize) -> usize {
        ONE_TOUCH_OFFSET + n * ONE_TOUCH_SIZE
    }

    pub fn one_touch_enabled(&self, n: usize) -> bool {
        self.0.uint(Self::one_touch_offset(n), 4, 2) != MODE_DISABLED
    }

    /// One-touch entry `n` without its contact, `None` if disabled
    pub fn one_touch_kind(&self, n: usize) -> Option<OneTouchKind> {
        let offset = Self::one_touch_offset(n);
        match self.0.uint(offset, 4, 2) {
            MODE_DIGITAL if self.0.uint(offset, 0, 2) == ACTION_MESSAGE => {
                Some(OneTouchKind::DigitalMessage)
            }
            MODE_DIGITAL => Some(OneTouchKind::DigitalCall),
            MODE_ANALOG => Some(OneTouchKind::AnalogDtmf),
            _ => None,
        }
    }

    pub fn one_touch_message(&self, n: usize) -> u8 {
        self.0.u8(Self::one_touch_offset(n) + 1)
    }

    pub fn one_touch_contact(&self, n: usize) -> u16 {
        self.0
            .u16(Self::one_touch_offset(n) + 2, Endianness::Little)
    }

    /// Settings without one-touch entries, those need the contact table
    pub fn to_settings(&self) -> ButtonSettings {
        ButtonSettings {
            side_button_1_short: self.action(0x02),
            side_button_1_long: self.action(0x03),
            side_button_2_short: self.action(0x04),
            side_button_2_long: self.action(0x05),
            long_press_ms: self.long_press_ms(),
            one_touch: Vec::new(),
        }
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> ButtonSettingsElement<B> {
    pub fn clear(&mut self) {
        self.0.fill(0x00, Self::SIZE, 0xff);
        for n in 0..Self::ONE_TOUCH {
            self.clear_one_touch(n);
        }
        self.set_settings(&ButtonSettings::default());
    }

    pub fn set_settings(&mut self, s: &ButtonSettings) {
        self.0.set_u8(0x02, s.side_button_1_short.code());
        self.0.set_u8(0x03, s.side_button_1_long.code());
        self.0.set_u8(0x04, s.side_button_2_short.code());
        self.0.set_u8(0x05, s.side_button_2_long.code());
        self.0.set_u8(0x11, (s.long_press_ms / 250).min(0xff) as u8);
    }

    pub fn clear_one_touch(&mut self, n: usize) {
        let offset = Self::one_touch_offset(n);
        self.0.set_u8(offset, 0xff);
        self.0.set_uint(offset, 4, 2, MODE_DISABLED);
        self.0.set_uint(offset, 0, 2, ACTION_CALL);
        self.0.set_u8(offset + 1, 0x00);
        self.0.set_u16(offset + 2, 0, Endianness::Little);
    }

    pub fn set_one_touch(&mut self, n: usize, kind: OneTouchKind, message: u8, contact: u16) {
        let offset = Self::one_touch_offset(n);
        let (mode, action) = match kind {
            OneTouchKind::DigitalCall => (MODE_DIGITAL, ACTION_CALL),
            OneTouchKind::DigitalMessage => (MODE_DIGITAL, ACTION_MESSAGE),
            OneTouchKind::AnalogDtmf => (MODE_ANALOG, ACTION_CALL),
        };
        self.0.set_uint(offset, 4, 2, mode);
        self.0.set_uint(offset, 0, 2, action);
        self.0.set_u8(offset + 1, message);
        self.0.set_u16(offset + 2, contact, Endianness::Little);
    }
}

impl Codeplug {
    pub fn clear_button_settings(&mut self) -> CodeplugResult<()> {
        let address = self.layout.button_settings;
        ButtonSettingsElement::new(
            self.record_mut(address, ButtonSettingsElement::<&[u8]>::SIZE)?,
        )?
        .clear();
        Ok(())
    }

    pub fn encode_button_settings(
        &mut self,
        config: &Config,
        _flags: &Flags,
        ctx: &mut CodeplugContext,
    ) -> CodeplugResult<()> {
        ctx.log.push("button settings");
        let max = ButtonSettingsElement::<&[u8]>::ONE_TOUCH;
        let buttons = &config.buttons;
        if buttons.one_touch.len() > max {
            ctx.log.hint(format!(
                "only {} of {} one-touch entries fit the device",
                max,
                buttons.one_touch.len()
            ));
        }

        let mut entries = Vec::new();
        for (n, entry) in buttons.one_touch.iter().take(max).enumerate() {
            ctx.log.push(format!("one-touch {}", n + 1));
            let contact = ctx.contacts.encode(entry.contact, "contact", &mut ctx.log)?;
            entries.push((entry.kind, entry.message, contact as u16));
            ctx.log.pop();
        }

        let address = self.layout.button_settings;
        let mut el = ButtonSettingsElement::new(
            self.record_mut(address, ButtonSettingsElement::<&[u8]>::SIZE)?,
        )?;
        el.clear();
        el.set_settings(buttons);
        for (n, (kind, message, contact)) in entries.into_iter().enumerate() {
            el.set_one_touch(n, kind, message, contact);
        }
        ctx.log.pop();
        Ok(())
    }

    /// Runs after contacts are created, one-touch entries refer to them
    pub fn decode_button_settings(
        &self,
        config: &mut Config,
        ctx: &mut CodeplugContext,
    ) -> CodeplugResult<()> {
        let address = self.layout.button_settings;
        let el =
            ButtonSettingsElement::new(self.record(address, ButtonSettingsElement::<&[u8]>::SIZE)?)?;
        let mut settings = el.to_settings();

        ctx.log.push("button settings");
        for n in 0..ButtonSettingsElement::<&[u8]>::ONE_TOUCH {
            let Some(kind) = el.one_touch_kind(n) else {
                continue;
            };
            ctx.log.push(format!("one-touch {}", n + 1));
            let contact = match kind {
                OneTouchKind::AnalogDtmf => None,
                _ => ctx
                    .contacts
                    .resolve(el.one_touch_contact(n) as u32, "contact", &mut ctx.log),
            };
            settings.one_touch.push(OneTouch {
                kind,
                contact,
                message: el.one_touch_message(n),
            });
            ctx.log.pop();
        }
        ctx.log.pop();
        config.buttons = settings;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codeplug::MD390;
    use crate::config::{CallType, Contact, DigitalContact};

    #[test]
    fn test_action_codes() {
        assert_eq!(ButtonAction::from_code(0x09), ButtonAction::OneTouch(3));
        assert_eq!(ButtonAction::OneTouch(3).code(), 0x09);
        assert_eq!(ButtonAction::from_code(0x1e), ButtonAction::ManualDial);
        assert_eq!(ButtonAction::from_code(0x14), ButtonAction::Reserved(0x14));
        assert_eq!(ButtonAction::Reserved(0x14).code(), 0x14);
        assert_eq!(ButtonAction::OneTouch(7).code(), 0x00);
    }

    #[test]
    fn test_cleared_block() {
        let mut el =
            ButtonSettingsElement::new(vec![0u8; ButtonSettingsElement::<Vec<u8>>::SIZE]).unwrap();
        el.clear();
        assert_eq!(el.to_settings(), ButtonSettings::default());
        assert!(!el.one_touch_enabled(0));
        assert_eq!(el.one_touch_kind(5), None);
        assert_eq!(el.0.data()[0x14..0x18], [0xfc, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_one_touch_contacts() {
        let mut config = Config::new();
        config.contacts.add(Contact::Digital(DigitalContact::new(
            "Local",
            CallType::GroupCall,
            9,
        )));
        let bob = config.contacts.add(Contact::Digital(DigitalContact::new(
            "Bob",
            CallType::PrivateCall,
            2621371,
        )));
        config.buttons.side_button_2_long = ButtonAction::OneTouch(1);
        config.buttons.one_touch.push(OneTouch {
            kind: OneTouchKind::DigitalMessage,
            contact: Some(bob),
            message: 2,
        });

        let mut codeplug = Codeplug::new(&MD390);
        let log = codeplug.encode(&config, &Flags::default()).unwrap();
        assert!(!log.has_warnings());

        let mut decoded = Config::new();
        codeplug.decode(&mut decoded).unwrap();
        assert_eq!(decoded.buttons.side_button_2_long, ButtonAction::OneTouch(1));
        assert_eq!(decoded.buttons.one_touch.len(), 1);
        let entry = &decoded.buttons.one_touch[0];
        assert_eq!(entry.kind, OneTouchKind::DigitalMessage);
        assert_eq!(entry.message, 2);
        let contact = decoded.contacts.get(entry.contact.unwrap()).unwrap();
        assert_eq!(contact.name(), "Bob");
    }

    #[test]
    fn test_excess_one_touch_entries_dropped() {
        let mut config = Config::new();
        for _ in 0..8 {
            config.buttons.one_touch.push(OneTouch {
                kind: OneTouchKind::AnalogDtmf,
                contact: None,
                message: 0,
            });
        }
        let mut codeplug = Codeplug::new(&MD390);
        let log = codeplug.encode(&config, &Flags::default()).unwrap();
        assert!(!log.has_warnings());
        assert!(log.messages().iter().any(|m| m.text.contains("one-touch")));

        let mut decoded = Config::new();
        codeplug.decode(&mut decoded).unwrap();
        assert_eq!(decoded.buttons.one_touch.len(), 6);
    }
}
