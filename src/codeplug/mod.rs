// Codeplug binary codec
//
// `Codeplug` is one engine for every supported TyT radio. The device
// differences live in its `DeviceLayout`; every entity type has the same
// clear / encode / create / link shape, implemented next to its record
// codec in `elements`.

pub mod context;
pub mod elements;
pub mod error;
pub mod layout;

pub use context::{CodeplugContext, IndexTable};
pub use error::{CodeplugError, CodeplugResult};
pub use layout::{DeviceLayout, TableLayout, MD390, UV390};

use crate::config::Config;
use crate::core::MessageLog;
use crate::memmap::MemoryImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Optional behavior of an encode run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Flags {
    /// Stamp the current time as programming time
    pub update_timestamp: bool,
    /// Enable the GPS flags of every digital channel that carries a GPS system
    pub auto_enable_gps: bool,
}

impl Default for Flags {
    fn default() -> Self {
        Self {
            update_timestamp: true,
            auto_enable_gps: false,
        }
    }
}

/// Binary codeplug of one device
#[derive(Debug)]
pub struct Codeplug {
    layout: &'static DeviceLayout,
    images: Vec<MemoryImage>,
}

impl Codeplug {
    /// Create an empty codeplug; call `clear()` or load an image before use
    pub fn new(layout: &'static DeviceLayout) -> Self {
        Self {
            layout,
            images: vec![MemoryImage::new()],
        }
    }

    /// Wrap images read from a device or file
    pub fn from_images(
        layout: &'static DeviceLayout,
        images: Vec<MemoryImage>,
    ) -> CodeplugResult<Self> {
        if images.is_empty() {
            return Err(CodeplugError::InvalidBank(0));
        }
        Ok(Self { layout, images })
    }

    pub fn layout(&self) -> &'static DeviceLayout {
        self.layout
    }

    pub fn images(&self) -> &[MemoryImage] {
        &self.images
    }

    pub fn into_images(self) -> Vec<MemoryImage> {
        self.images
    }

    pub fn image(&self, bank: usize) -> CodeplugResult<&MemoryImage> {
        self.images.get(bank).ok_or(CodeplugError::InvalidBank(bank))
    }

    pub fn image_mut(&mut self, bank: usize) -> CodeplugResult<&mut MemoryImage> {
        self.images
            .get_mut(bank)
            .ok_or(CodeplugError::InvalidBank(bank))
    }

    /// Sort the elements of every image by address, as required before a transfer
    pub fn sort(&mut self) {
        for image in &mut self.images {
            image.sort();
        }
    }

    /// Record window of `size` bytes at `address`
    pub(crate) fn record(&self, address: u32, size: usize) -> CodeplugResult<&[u8]> {
        Ok(self.images[0].data(address, size)?)
    }

    pub(crate) fn record_mut(&mut self, address: u32, size: usize) -> CodeplugResult<&mut [u8]> {
        Ok(self.images[0].data_mut(address, size)?)
    }

    /// Rebuild the image elements of the layout, all bytes zero
    fn allocate(&mut self) -> CodeplugResult<()> {
        let mut image = MemoryImage::new();
        for &(address, size) in self.layout.elements {
            image.add_element(address, size)?;
        }
        image.sort();
        self.images = vec![image];
        Ok(())
    }

    /// Reset the whole codeplug to device defaults
    pub fn clear(&mut self) -> CodeplugResult<()> {
        self.allocate()?;
        self.clear_timestamp()?;
        self.clear_general_settings()?;
        self.clear_menu_settings()?;
        self.clear_button_settings()?;
        self.clear_text_messages()?;
        self.clear_privacy_keys()?;
        self.clear_emergency_settings()?;
        self.clear_emergency_systems()?;
        self.clear_contacts()?;
        self.clear_group_lists()?;
        self.clear_channels()?;
        self.clear_zones()?;
        self.clear_scan_lists()?;
        self.clear_gps_systems()?;
        self.clear_boot_settings()?;
        self.clear_vfo_channels()?;
        debug!("Cleared {} codeplug", self.layout.name);
        Ok(())
    }

    /// Encode `config` into a freshly cleared image.
    ///
    /// Non-fatal issues are returned in the message log. Dangling references and
    /// configurations beyond a hard device limit abort the run.
    pub fn encode(&mut self, config: &Config, flags: &Flags) -> CodeplugResult<MessageLog> {
        self.clear()?;
        let mut ctx = CodeplugContext::for_encode(config, self.layout);

        self.encode_timestamp(config, flags, &mut ctx)?;
        self.encode_general_settings(config, flags, &mut ctx)?;
        self.encode_menu_settings(config, flags, &mut ctx)?;
        self.encode_button_settings(config, flags, &mut ctx)?;
        self.encode_text_messages(config, flags, &mut ctx)?;
        self.encode_privacy_keys(config, flags, &mut ctx)?;
        self.encode_emergency_settings(config, flags, &mut ctx)?;
        self.encode_emergency_systems(config, flags, &mut ctx)?;
        self.encode_contacts(config, flags, &mut ctx)?;
        self.encode_group_lists(config, flags, &mut ctx)?;
        self.encode_channels(config, flags, &mut ctx)?;
        self.encode_zones(config, flags, &mut ctx)?;
        self.encode_scan_lists(config, flags, &mut ctx)?;
        self.encode_gps_systems(config, flags, &mut ctx)?;
        self.encode_boot_settings(config, flags, &mut ctx)?;

        info!(
            "Encoded {} codeplug: {} channels, {} contacts, {} zones, {} messages",
            self.layout.name,
            ctx.channels.len(),
            ctx.contacts.len(),
            ctx.zones.len(),
            ctx.log.len()
        );
        Ok(ctx.log)
    }

    /// Decode the image into `config`, replacing its previous content
    pub fn decode(&self, config: &mut Config) -> CodeplugResult<MessageLog> {
        config.clear();
        let mut ctx = CodeplugContext::new();

        self.decode_timestamp(config, &mut ctx)?;
        self.decode_general_settings(config, &mut ctx)?;
        self.decode_menu_settings(config, &mut ctx)?;
        self.decode_text_messages(config, &mut ctx)?;
        self.decode_emergency_settings(config, &mut ctx)?;

        // Every object must exist before any reference is resolved
        self.create_privacy_keys(config, &mut ctx)?;
        self.create_contacts(config, &mut ctx)?;
        self.create_group_lists(config, &mut ctx)?;
        self.create_channels(config, &mut ctx)?;
        self.create_zones(config, &mut ctx)?;
        self.create_scan_lists(config, &mut ctx)?;
        self.create_gps_systems(config, &mut ctx)?;
        self.create_emergency_systems(config, &mut ctx)?;

        self.link_group_lists(config, &mut ctx)?;
        self.link_channels(config, &mut ctx)?;
        self.link_zones(config, &mut ctx)?;
        self.link_scan_lists(config, &mut ctx)?;
        self.link_gps_systems(config, &mut ctx)?;
        self.link_emergency_systems(config, &mut ctx)?;
        self.decode_button_settings(config, &mut ctx)?;
        self.decode_boot_settings(config, &mut ctx)?;

        info!(
            "Decoded {} codeplug: {} channels, {} contacts, {} zones, {} messages",
            self.layout.name,
            config.channels.len(),
            config.contacts.len(),
            config.zones.len(),
            ctx.log.len()
        );
        Ok(ctx.log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::*;

    fn sample_config() -> Config {
        let mut config = Config::new();
        config.settings.radio_name = "DM3MAT".to_string();
        config.radio_ids.add(RadioId::new("DM3MAT", 2621370));

        let alice = config.contacts.add(Contact::Digital(DigitalContact::new(
            "Alice",
            CallType::PrivateCall,
            1234,
        )));
        let tg = config.contacts.add(Contact::Digital(DigitalContact::new(
            "Local",
            CallType::GroupCall,
            9,
        )));

        let mut rx = RxGroupList::new("Locals");
        rx.add_contact(tg);
        let rx = config.group_lists.add(rx);

        let mut dmr = DigitalChannel::new("DMR Simplex", 439_562_500, 439_562_500);
        dmr.tx_contact = Some(alice);
        dmr.group_list = Some(rx);
        dmr.time_slot = TimeSlot::TS2;
        dmr.color_code = 3;
        let dmr = config.channels.add(Channel::Digital(dmr));

        let mut fm = AnalogChannel::new("Calling", 145_500_000, 145_500_000);
        fm.rx_tone = Signaling::Ctcss(885);
        fm.tx_tone = Signaling::Dcs {
            code: 23,
            inverted: true,
        };
        fm.bandwidth = Bandwidth::Wide;
        let fm = config.channels.add(Channel::Analog(fm));

        let mut zone = Zone::new("Home");
        zone.a = vec![dmr, fm];
        config.zones.add(zone);

        let mut scan = ScanList::new("All");
        scan.channels = vec![dmr, fm];
        scan.primary = ChannelRef::Channel(fm);
        let scan = config.scan_lists.add(scan);
        if let Some(ch) = config.channels.get_mut(dmr) {
            ch.common_mut().scan_list = Some(scan);
        }
        config
    }

    #[test]
    fn test_clear_allocates_layout() {
        let mut codeplug = Codeplug::new(&UV390);
        codeplug.clear().unwrap();
        let image = codeplug.image(0).unwrap();
        assert_eq!(image.num_elements(), 2);
        assert_eq!(image.element(0).unwrap().address(), 0x2000);
        assert_eq!(image.element(1).unwrap().address(), 0x110000);
        assert!(codeplug.image(1).is_err());
    }

    #[test]
    fn test_round_trip() {
        let config = sample_config();
        let mut codeplug = Codeplug::new(&UV390);
        let log = codeplug.encode(&config, &Flags::default()).unwrap();
        assert!(!log.has_critical());

        let mut decoded = Config::new();
        let log = codeplug.decode(&mut decoded).unwrap();
        assert!(!log.has_warnings(), "{:?}", log.messages());

        assert_eq!(decoded.settings.radio_name, "DM3MAT");
        assert_eq!(decoded.contacts.len(), 2);
        assert_eq!(decoded.channels.len(), 2);

        let dmr = decoded.channels.at(0).unwrap().as_digital().unwrap();
        assert_eq!(dmr.common.name, "DMR Simplex");
        assert_eq!(dmr.common.rx_frequency, 439_562_500);
        assert_eq!(dmr.time_slot, TimeSlot::TS2);
        assert_eq!(dmr.color_code, 3);
        let rx = decoded.group_lists.get(dmr.group_list.unwrap()).unwrap();
        assert_eq!(rx.name, "Locals");
        assert_eq!(rx.contacts.len(), 1);

        match decoded.channels.at(1).unwrap() {
            Channel::Analog(fm) => {
                assert_eq!(fm.rx_tone, Signaling::Ctcss(885));
                assert_eq!(
                    fm.tx_tone,
                    Signaling::Dcs {
                        code: 23,
                        inverted: true
                    }
                );
                assert_eq!(fm.bandwidth, Bandwidth::Wide);
            }
            other => panic!("unexpected channel {:?}", other),
        }

        let zone = decoded.zones.at(0).unwrap();
        assert_eq!(zone.name, "Home");
        assert_eq!(zone.a.len(), 2);

        let scan = decoded.scan_lists.at(0).unwrap();
        assert_eq!(scan.channels.len(), 2);
        assert_eq!(
            scan.primary,
            ChannelRef::Channel(decoded.channels.handle_at(1).unwrap())
        );
    }

    #[test]
    fn test_contact_reference_resolves_to_object() {
        let mut config = Config::new();
        let alice = config.contacts.add(Contact::Digital(DigitalContact::new(
            "Alice",
            CallType::PrivateCall,
            1234,
        )));
        let mut ch = DigitalChannel::new("Direct", 439_000_000, 439_000_000);
        ch.tx_contact = Some(alice);
        config.channels.add(Channel::Digital(ch));

        let mut codeplug = Codeplug::new(&MD390);
        codeplug.encode(&config, &Flags::default()).unwrap();
        let mut decoded = Config::new();
        codeplug.decode(&mut decoded).unwrap();

        let ch = decoded.channels.at(0).unwrap().as_digital().unwrap();
        let contact = decoded.contacts.get(ch.tx_contact.unwrap()).unwrap();
        let contact = contact.as_digital().unwrap();
        assert_eq!(contact.name, "Alice");
        assert_eq!(contact.number, 1234);
        assert_eq!(contact.call_type, CallType::PrivateCall);
    }

    #[test]
    fn test_dangling_reference_aborts_encode() {
        let mut config = Config::new();
        let mut other = Config::new();
        let foreign = other.contacts.add(Contact::Digital(DigitalContact::new(
            "Ghost",
            CallType::GroupCall,
            1,
        )));
        let mut ch = DigitalChannel::new("Direct", 439_000_000, 439_000_000);
        ch.tx_contact = Some(foreign);
        config.channels.add(Channel::Digital(ch));

        let mut codeplug = Codeplug::new(&MD390);
        let err = codeplug.encode(&config, &Flags::default()).unwrap_err();
        match err {
            CodeplugError::UnresolvedReference { kind, stack } => {
                assert_eq!(kind, "contact");
                assert!(stack.contains("channel 1"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_decode_of_cleared_image_is_empty() {
        let mut codeplug = Codeplug::new(&MD390);
        codeplug.clear().unwrap();
        let mut config = Config::new();
        codeplug.decode(&mut config).unwrap();
        assert!(config.channels.is_empty());
        assert!(config.contacts.is_empty());
        assert!(config.zones.is_empty());
        assert!(config.scan_lists.is_empty());
        assert!(config.gps_systems.is_empty());
        assert!(config.encryption_keys.is_empty());
    }

    #[test]
    fn test_flags_from_json() {
        let flags: Flags = serde_json::from_str(r#"{"auto_enable_gps": true}"#).unwrap();
        assert!(flags.update_timestamp);
        assert!(flags.auto_enable_gps);
    }
}
