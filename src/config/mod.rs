// Radio-agnostic configuration tree
//
// The tree is the decode target and the encode source of every device
// codeplug. Objects reference each other through typed handles.

pub mod channel;
pub mod contact;
pub mod emergency;
pub mod encryption;
pub mod gps;
pub mod group_list;
pub mod list;
pub mod radio_id;
pub mod scan_list;
pub mod settings;
pub mod zone;

pub use channel::{
    AnalogAdmit, AnalogChannel, Bandwidth, Channel, ChannelCommon, ChannelRef, DigitalAdmit,
    DigitalChannel, InCallCriteria, Power, RefFrequency, Signaling, TimeSlot, TurnOffFrequency,
    TyTChannelExtension,
};
pub use contact::{CallType, Contact, ContactList, DigitalContact, DtmfContact};
pub use emergency::{AlarmMode, AlarmType, EmergencySettings, EmergencySystem};
pub use encryption::{EncryptionKey, KeyMaterial};
pub use gps::GpsSystem;
pub use group_list::RxGroupList;
pub use list::{ConfigList, Handle};
pub use radio_id::{RadioId, RadioIdList};
pub use scan_list::ScanList;
pub use settings::{
    BootSettings, ButtonAction, ButtonSettings, GeneralSettings, MenuItem, MenuSettings,
    OneTouch, OneTouchKind, Timestamp,
};
pub use zone::Zone;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub settings: GeneralSettings,
    pub radio_ids: RadioIdList,
    pub contacts: ContactList,
    pub group_lists: ConfigList<RxGroupList>,
    pub channels: ConfigList<Channel>,
    pub zones: ConfigList<Zone>,
    pub scan_lists: ConfigList<ScanList>,
    pub gps_systems: ConfigList<GpsSystem>,
    pub encryption_keys: ConfigList<EncryptionKey>,
    pub emergency_systems: ConfigList<EmergencySystem>,
    pub emergency: EmergencySettings,
    pub boot: BootSettings,
    pub menu: MenuSettings,
    pub buttons: ButtonSettings,
    pub text_messages: Vec<String>,
    pub timestamp: Option<Timestamp>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to an empty configuration with default settings
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Remove a channel and every reference to it
    pub fn remove_channel(&mut self, channel: Handle<Channel>) -> Option<Channel> {
        let removed = self.channels.remove(channel)?;
        for (_, zone) in self.zones.iter_mut() {
            zone.remove_channel(channel);
        }
        let drop_ref = |r: &mut ChannelRef| {
            if *r == ChannelRef::Channel(channel) {
                *r = ChannelRef::None;
            }
        };
        for (_, list) in self.scan_lists.iter_mut() {
            list.channels.retain(|&c| c != channel);
            drop_ref(&mut list.primary);
            drop_ref(&mut list.secondary);
            drop_ref(&mut list.tx_channel);
        }
        for (_, gps) in self.gps_systems.iter_mut() {
            drop_ref(&mut gps.revert_channel);
        }
        for (_, sys) in self.emergency_systems.iter_mut() {
            drop_ref(&mut sys.revert_channel);
        }
        if self.boot.channel_a == Some(channel) {
            self.boot.channel_a = None;
        }
        if self.boot.channel_b == Some(channel) {
            self.boot.channel_b = None;
        }
        Some(removed)
    }

    /// Remove a contact and every reference to it
    pub fn remove_contact(&mut self, contact: Handle<Contact>) -> Option<Contact> {
        let removed = self.contacts.remove(contact)?;
        for (_, list) in self.group_lists.iter_mut() {
            list.contacts.retain(|&c| c != contact);
        }
        for (_, ch) in self.channels.iter_mut() {
            if let Channel::Digital(d) = ch {
                if d.tx_contact == Some(contact) {
                    d.tx_contact = None;
                }
            }
        }
        for (_, gps) in self.gps_systems.iter_mut() {
            if gps.contact == Some(contact) {
                gps.contact = None;
            }
        }
        for touch in self.buttons.one_touch.iter_mut() {
            if touch.contact == Some(contact) {
                touch.contact = None;
            }
        }
        Some(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_channel_drops_references() {
        let mut config = Config::new();
        let ch = config
            .channels
            .add(Channel::Analog(AnalogChannel::new("A", 145_500_000, 145_500_000)));
        let mut zone = Zone::new("Z");
        zone.a.push(ch);
        config.zones.add(zone);
        let mut scan = ScanList::new("S");
        scan.channels.push(ch);
        scan.primary = ChannelRef::Channel(ch);
        let scan = config.scan_lists.add(scan);

        assert!(config.remove_channel(ch).is_some());
        let scan = config.scan_lists.get(scan).unwrap();
        assert!(scan.channels.is_empty());
        assert_eq!(scan.primary, ChannelRef::None);
        assert!(config.zones.at(0).unwrap().a.is_empty());
    }

    #[test]
    fn test_remove_contact_drops_references() {
        let mut config = Config::new();
        let c = config.contacts.add(Contact::Digital(DigitalContact::new(
            "TG",
            CallType::GroupCall,
            9,
        )));
        let mut ch = DigitalChannel::new("D", 439_000_000, 439_000_000);
        ch.tx_contact = Some(c);
        let ch = config.channels.add(Channel::Digital(ch));

        config.remove_contact(c);
        let ch = config.channels.get(ch).unwrap().as_digital().unwrap();
        assert_eq!(ch.tx_contact, None);
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = Config::new();
        config.settings.radio_name = "DM3MAT".to_string();
        config.radio_ids.add(RadioId::new("DM3MAT", 2621370));
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
