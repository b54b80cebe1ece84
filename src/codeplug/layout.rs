// Memory layout tables of the supported TyT radios
//
// A device is described entirely by data: which image elements to allocate
// and where each record table lives. The codec engine in `Codeplug` reads
// these tables and never branches on the device model.

use super::elements::{
    BootSettingsElement, ButtonSettingsElement, ChannelElement, ContactElement,
    EmergencySettingsElement, EmergencySystemElement, EnhancedKeyElement,
    GeneralSettingsElement, GpsSystemElement, GroupListElement, MenuSettingsElement,
    ScanListElement, TextMessageElement, TimestampElement, BasicKeyElement, VfoChannelElement,
    ZoneElement, ZoneExtElement,
};
use super::error::{CodeplugError, CodeplugResult};

/// A table of `count` records of `size` bytes starting at `address`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableLayout {
    pub address: u32,
    pub count: usize,
    pub size: usize,
}

impl TableLayout {
    pub const fn new(address: u32, count: usize, size: usize) -> Self {
        Self {
            address,
            count,
            size,
        }
    }

    /// Address of record `index`
    pub fn address_of(&self, index: usize) -> u32 {
        self.address + (index * self.size) as u32
    }

    /// One past the last byte of the table
    pub fn end(&self) -> u64 {
        self.address as u64 + (self.count * self.size) as u64
    }
}

#[derive(Debug, Clone)]
pub struct DeviceLayout {
    pub name: &'static str,
    /// Image elements (bank 0) as (address, size)
    pub elements: &'static [(u32, usize)],
    pub timestamp: u32,
    pub general_settings: u32,
    pub menu_settings: u32,
    pub button_settings: u32,
    pub text_messages: TableLayout,
    pub enhanced_keys: TableLayout,
    pub basic_keys: TableLayout,
    pub emergency_settings: u32,
    pub emergency_systems: TableLayout,
    pub contacts: TableLayout,
    pub group_lists: TableLayout,
    pub zones: TableLayout,
    /// Extra zone members (rest of list A and list B), if supported
    pub zone_extensions: Option<TableLayout>,
    pub scan_lists: TableLayout,
    pub channels: TableLayout,
    pub gps_systems: Option<TableLayout>,
    pub boot_settings: Option<u32>,
    pub vfo_channels: Option<TableLayout>,
}

pub static MD390: DeviceLayout = DeviceLayout {
    name: "MD-390",
    elements: &[(0x002000, 0x3e000)],
    timestamp: 0x002000,
    general_settings: 0x002040,
    menu_settings: 0x0020f0,
    button_settings: 0x002100,
    text_messages: TableLayout::new(0x002180, 50, 0x120),
    enhanced_keys: TableLayout::new(0x0059c0, 8, 0x10),
    basic_keys: TableLayout::new(0x005a40, 8, 0x02),
    emergency_settings: 0x005a50,
    emergency_systems: TableLayout::new(0x005a60, 32, 0x28),
    contacts: TableLayout::new(0x005f80, 1000, 0x24),
    group_lists: TableLayout::new(0x00ec20, 250, 0x60),
    zones: TableLayout::new(0x0149e0, 250, 0x40),
    zone_extensions: None,
    scan_lists: TableLayout::new(0x018860, 250, 0x68),
    channels: TableLayout::new(0x01ee00, 1000, 0x40),
    gps_systems: Some(TableLayout::new(0x03ec40, 16, 0x10)),
    boot_settings: None,
    vfo_channels: None,
};

pub static UV390: DeviceLayout = DeviceLayout {
    name: "MD-UV390",
    elements: &[(0x002000, 0x3e000), (0x110000, 0x90000)],
    timestamp: 0x002000,
    general_settings: 0x002040,
    menu_settings: 0x0020f0,
    button_settings: 0x002100,
    text_messages: TableLayout::new(0x002180, 50, 0x120),
    enhanced_keys: TableLayout::new(0x0059c0, 8, 0x10),
    basic_keys: TableLayout::new(0x005a40, 8, 0x02),
    emergency_settings: 0x005a50,
    emergency_systems: TableLayout::new(0x005a60, 32, 0x28),
    contacts: TableLayout::new(0x140000, 10000, 0x24),
    group_lists: TableLayout::new(0x00ec20, 250, 0x60),
    zones: TableLayout::new(0x0149e0, 250, 0x40),
    zone_extensions: Some(TableLayout::new(0x031000, 250, 0xe0)),
    scan_lists: TableLayout::new(0x018860, 250, 0x68),
    channels: TableLayout::new(0x110000, 3000, 0x40),
    gps_systems: Some(TableLayout::new(0x03ec40, 16, 0x10)),
    boot_settings: Some(0x02f000),
    vfo_channels: Some(TableLayout::new(0x02ef00, 2, 0x40)),
};

impl DeviceLayout {
    /// Every table as (name, table, record size expected by its codec)
    fn tables(&self) -> Vec<(&'static str, TableLayout, usize)> {
        let single = |address: u32, size: usize| TableLayout::new(address, 1, size);
        let mut tables = vec![
            (
                "timestamp",
                single(self.timestamp, TimestampElement::<&[u8]>::SIZE),
                TimestampElement::<&[u8]>::SIZE,
            ),
            (
                "general settings",
                single(self.general_settings, GeneralSettingsElement::<&[u8]>::SIZE),
                GeneralSettingsElement::<&[u8]>::SIZE,
            ),
            (
                "menu settings",
                single(self.menu_settings, MenuSettingsElement::<&[u8]>::SIZE),
                MenuSettingsElement::<&[u8]>::SIZE,
            ),
            (
                "button settings",
                single(self.button_settings, ButtonSettingsElement::<&[u8]>::SIZE),
                ButtonSettingsElement::<&[u8]>::SIZE,
            ),
            (
                "text messages",
                self.text_messages,
                TextMessageElement::<&[u8]>::SIZE,
            ),
            (
                "enhanced keys",
                self.enhanced_keys,
                EnhancedKeyElement::<&[u8]>::SIZE,
            ),
            ("basic keys", self.basic_keys, BasicKeyElement::<&[u8]>::SIZE),
            (
                "emergency settings",
                single(
                    self.emergency_settings,
                    EmergencySettingsElement::<&[u8]>::SIZE,
                ),
                EmergencySettingsElement::<&[u8]>::SIZE,
            ),
            (
                "emergency systems",
                self.emergency_systems,
                EmergencySystemElement::<&[u8]>::SIZE,
            ),
            ("contacts", self.contacts, ContactElement::<&[u8]>::SIZE),
            ("group lists", self.group_lists, GroupListElement::<&[u8]>::SIZE),
            ("zones", self.zones, ZoneElement::<&[u8]>::SIZE),
            ("scan lists", self.scan_lists, ScanListElement::<&[u8]>::SIZE),
            ("channels", self.channels, ChannelElement::<&[u8]>::SIZE),
        ];
        if let Some(t) = self.zone_extensions {
            tables.push(("zone extensions", t, ZoneExtElement::<&[u8]>::SIZE));
        }
        if let Some(t) = self.gps_systems {
            tables.push(("GPS systems", t, GpsSystemElement::<&[u8]>::SIZE));
        }
        if let Some(address) = self.boot_settings {
            let size = BootSettingsElement::<&[u8]>::SIZE;
            tables.push(("boot settings", single(address, size), size));
        }
        if let Some(t) = self.vfo_channels {
            tables.push(("VFO channels", t, VfoChannelElement::<&[u8]>::SIZE));
        }
        tables
    }

    /// Check that every table fits into an element, matches its record size and
    /// does not overlap another table
    pub fn validate(&self) -> CodeplugResult<()> {
        let tables = self.tables();

        for (name, table, record_size) in &tables {
            if table.size != *record_size {
                return Err(CodeplugError::Layout(format!(
                    "{}: {} record size {:#x} differs from codec size {:#x}",
                    self.name, name, table.size, record_size
                )));
            }
            let inside = self.elements.iter().any(|&(address, size)| {
                table.address >= address && table.end() <= address as u64 + size as u64
            });
            if !inside {
                return Err(CodeplugError::Layout(format!(
                    "{}: {} at {:#010x} is not covered by an image element",
                    self.name, name, table.address
                )));
            }
        }

        for (i, (name_a, a, _)) in tables.iter().enumerate() {
            for (name_b, b, _) in tables.iter().skip(i + 1) {
                if (a.address as u64) < b.end() && (b.address as u64) < a.end() {
                    return Err(CodeplugError::Layout(format!(
                        "{}: {} overlaps {}",
                        self.name, name_a, name_b
                    )));
                }
            }
        }

        Ok(())
    }

    /// Members of list A that fit into a zone record plus its extension
    pub fn zone_a_capacity(&self) -> usize {
        ZoneElement::<&[u8]>::MEMBERS
            + self
                .zone_extensions
                .map_or(0, |_| ZoneExtElement::<&[u8]>::A_MEMBERS)
    }

    pub fn zone_b_capacity(&self) -> usize {
        self.zone_extensions
            .map_or(0, |_| ZoneExtElement::<&[u8]>::B_MEMBERS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_layouts_are_consistent() {
        MD390.validate().unwrap();
        UV390.validate().unwrap();
    }

    #[test]
    fn test_table_addresses() {
        assert_eq!(UV390.channels.address_of(0), 0x110000);
        assert_eq!(UV390.channels.address_of(2), 0x110080);
        assert_eq!(MD390.group_lists.end(), MD390.zones.address as u64);
        assert_eq!(UV390.zone_a_capacity(), 64);
        assert_eq!(UV390.zone_b_capacity(), 64);
        assert_eq!(MD390.zone_a_capacity(), 16);
        assert_eq!(MD390.zone_b_capacity(), 0);
    }

    #[test]
    fn test_overlap_detected() {
        let broken = DeviceLayout {
            name: "broken",
            scan_lists: TableLayout::new(0x018800, 250, 0x68),
            ..MD390.clone()
        };
        assert!(matches!(broken.validate(), Err(CodeplugError::Layout(_))));
    }

    #[test]
    fn test_uncovered_table_detected() {
        let broken = DeviceLayout {
            name: "broken",
            channels: TableLayout::new(0x110000, 1000, 0x40),
            ..MD390.clone()
        };
        assert!(broken.validate().is_err());
    }
}
