// Menu settings record

use crate::bitwise::elements::Result as ElementResult;
use crate::bitwise::Element;
use crate::codeplug::{Codeplug, CodeplugContext, CodeplugResult, Flags};
use crate::config::{Config, MenuItem, MenuSettings};

/// Menu settings (16 bytes)
///
/// Byte layout:
/// - 0x00: menu hang time in seconds, 0=infinite
/// - 0x01-0x04: one enable bit per menu item, in `MenuItem::ALL` order
/// - rest: 0xff
#[derive(Debug)]
pub struct MenuSettingsElement<B>(Element<B>);

/// Byte and bit of a menu item's enable flag
fn position(item: MenuItem) -> (usize, u8) {
    let n = MenuItem::ALL
        .iter()
        .position(|&other| other == item)
        .unwrap_or_default();
    (0x01 + n / 8, (n % 8) as u8)
}

impl<B: AsRef<[u8]>> MenuSettingsElement<B> {
    pub const SIZE: usize = 0x10;

    pub fn new(data: B) -> ElementResult<Self> {
        Ok(Self(Element::new(data, Self::SIZE)?))
    }

    pub fn hang_time_s(&self) -> u8 {
        self.0.u8(0x00)
    }

    pub fn is_enabled(&self, item: MenuItem) -> bool {
        let (offset, bit) = position(item);
        self.0.bit(offset, bit)
    }

    pub fn to_settings(&self) -> MenuSettings {
        MenuSettings {
            hang_time_s: self.hang_time_s(),
            enabled: MenuItem::ALL
                .into_iter()
                .filter(|&item| self.is_enabled(item))
                .collect(),
        }
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> MenuSettingsElement<B> {
    pub fn clear(&mut self) {
        self.0.fill(0x00, Self::SIZE, 0xff);
        self.0.set_u8(0x00, 0x00);
    }

    pub fn set_enabled(&mut self, item: MenuItem, enabled: bool) {
        let (offset, bit) = position(item);
        self.0.set_bit(offset, bit, enabled);
    }

    pub fn set_settings(&mut self, settings: &MenuSettings) {
        self.0.set_u8(0x00, settings.hang_time_s);
        for item in MenuItem::ALL {
            self.set_enabled(item, settings.enabled.contains(&item));
        }
    }
}

impl Codeplug {
    pub fn clear_menu_settings(&mut self) -> CodeplugResult<()> {
        let address = self.layout.menu_settings;
        MenuSettingsElement::new(self.record_mut(address, MenuSettingsElement::<&[u8]>::SIZE)?)?
            .clear();
        Ok(())
    }

    pub fn encode_menu_settings(
        &mut self,
        config: &Config,
        _flags: &Flags,
        _ctx: &mut CodeplugContext,
    ) -> CodeplugResult<()> {
        let address = self.layout.menu_settings;
        let mut el =
            MenuSettingsElement::new(self.record_mut(address, MenuSettingsElement::<&[u8]>::SIZE)?)?;
        el.clear();
        el.set_settings(&config.menu);
        Ok(())
    }

    pub fn decode_menu_settings(
        &self,
        config: &mut Config,
        _ctx: &mut CodeplugContext,
    ) -> CodeplugResult<()> {
        let address = self.layout.menu_settings;
        let el = MenuSettingsElement::new(self.record(address, MenuSettingsElement::<&[u8]>::SIZE)?)?;
        config.menu = el.to_settings();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleared_menu_enables_everything() {
        let mut el = MenuSettingsElement::new([0u8; 16]).unwrap();
        el.clear();
        assert_eq!(el.to_settings(), MenuSettings::default());
    }

    #[test]
    fn test_disabled_items() {
        let mut el = MenuSettingsElement::new([0u8; 16]).unwrap();
        el.clear();
        let mut settings = MenuSettings {
            hang_time_s: 10,
            ..MenuSettings::default()
        };
        settings.enabled.remove(&MenuItem::TextMessage);
        settings.enabled.remove(&MenuItem::GpsInformation);
        el.set_settings(&settings);

        assert_eq!(el.0.u8(0x01), 0xfe);
        assert_eq!(el.0.u8(0x04), 0xfd);
        assert_eq!(el.0.u8(0x05), 0xff);
        assert_eq!(el.to_settings(), settings);
    }
}
