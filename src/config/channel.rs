// Analog and digital channels

use super::contact::Contact;
use super::emergency::EmergencySystem;
use super::encryption::EncryptionKey;
use super::gps::GpsSystem;
use super::group_list::RxGroupList;
use super::list::Handle;
use super::scan_list::ScanList;
use crate::core::{is_standard_ctcss, is_standard_dcs, COLOR_CODES};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Power {
    Min,
    Low,
    Mid,
    #[default]
    High,
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Bandwidth {
    #[default]
    Narrow,
    Wide,
}

/// Sub-audio signaling of an analog channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Signaling {
    #[default]
    None,
    /// CTCSS tone in tenths of a Hz
    Ctcss(u16),
    /// DCS code given by its octal digits, e.g. 23 for D023
    Dcs { code: u16, inverted: bool },
}

impl Signaling {
    /// True for no signaling and for tones/codes from the standard tables
    pub fn is_standard(&self) -> bool {
        match self {
            Signaling::None => true,
            Signaling::Ctcss(tenths) => is_standard_ctcss(*tenths),
            Signaling::Dcs { code, .. } => is_standard_dcs(*code),
        }
    }
}

/// Reference to a channel that may also mean "the selected channel"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ChannelRef {
    #[default]
    None,
    Selected,
    Channel(Handle<Channel>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TimeSlot {
    #[default]
    TS1,
    TS2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AnalogAdmit {
    #[default]
    Always,
    ChannelFree,
    Tone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DigitalAdmit {
    #[default]
    Always,
    ChannelFree,
    ColorCode,
}

/// Reference frequency setting of TyT radios; its effect is undocumented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RefFrequency {
    #[default]
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum InCallCriteria {
    #[default]
    Always,
    FollowAdmitCriteria,
    TxInterrupt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TurnOffFrequency {
    #[default]
    Off,
    Hz259_2,
    Hz55_2,
}

/// TyT specific channel settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TyTChannelExtension {
    pub lone_worker: bool,
    pub auto_scan: bool,
    pub talkaround: bool,
    pub data_call_confirm: bool,
    pub private_call_confirm: bool,
    pub emergency_alarm_ack: bool,
    pub display_ptt_id: bool,
    pub rx_ref_frequency: RefFrequency,
    pub tx_ref_frequency: RefFrequency,
    pub in_call_criteria: InCallCriteria,
    pub turn_off_frequency: TurnOffFrequency,
    /// Seconds
    pub rekey_delay: u8,
    pub allow_interrupt: bool,
    pub dual_capacity_direct_mode: bool,
    pub leader_or_ms: bool,
    pub tx_gps_info: bool,
    pub rx_gps_info: bool,
    /// One bit per DTMF decode system
    pub dtmf_decode: u8,
}

impl Default for TyTChannelExtension {
    fn default() -> Self {
        Self {
            lone_worker: false,
            auto_scan: false,
            talkaround: false,
            data_call_confirm: false,
            private_call_confirm: false,
            emergency_alarm_ack: false,
            display_ptt_id: true,
            rx_ref_frequency: RefFrequency::Low,
            tx_ref_frequency: RefFrequency::Low,
            in_call_criteria: InCallCriteria::Always,
            turn_off_frequency: TurnOffFrequency::Off,
            rekey_delay: 0,
            allow_interrupt: false,
            dual_capacity_direct_mode: false,
            leader_or_ms: false,
            tx_gps_info: false,
            rx_gps_info: false,
            dtmf_decode: 0,
        }
    }
}

/// Fields shared by analog and digital channels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelCommon {
    pub name: String,
    /// Hz
    pub rx_frequency: u64,
    /// Hz
    pub tx_frequency: u64,
    #[serde(default)]
    pub power: Power,
    /// Transmit timeout in seconds, 0 disables it
    #[serde(default)]
    pub timeout_s: u32,
    #[serde(default)]
    pub rx_only: bool,
    #[serde(default)]
    pub vox: bool,
    #[serde(default)]
    pub scan_list: Option<Handle<ScanList>>,
    #[serde(default)]
    pub tyt: TyTChannelExtension,
}

impl ChannelCommon {
    pub fn new(name: impl Into<String>, rx_frequency: u64, tx_frequency: u64) -> Self {
        Self {
            name: name.into(),
            rx_frequency,
            tx_frequency,
            power: Power::default(),
            timeout_s: 0,
            rx_only: false,
            vox: false,
            scan_list: None,
            tyt: TyTChannelExtension::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalogChannel {
    #[serde(flatten)]
    pub common: ChannelCommon,
    #[serde(default)]
    pub admit: AnalogAdmit,
    #[serde(default)]
    pub bandwidth: Bandwidth,
    /// 0 (open) to 10
    #[serde(default)]
    pub squelch: u8,
    #[serde(default)]
    pub rx_tone: Signaling,
    #[serde(default)]
    pub tx_tone: Signaling,
}

impl AnalogChannel {
    pub fn new(name: impl Into<String>, rx_frequency: u64, tx_frequency: u64) -> Self {
        Self {
            common: ChannelCommon::new(name, rx_frequency, tx_frequency),
            admit: AnalogAdmit::Always,
            bandwidth: Bandwidth::Narrow,
            squelch: 1,
            rx_tone: Signaling::None,
            tx_tone: Signaling::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigitalChannel {
    #[serde(flatten)]
    pub common: ChannelCommon,
    #[serde(default)]
    pub admit: DigitalAdmit,
    #[serde(default)]
    pub color_code: u8,
    #[serde(default)]
    pub time_slot: TimeSlot,
    #[serde(default)]
    pub tx_contact: Option<Handle<Contact>>,
    #[serde(default)]
    pub group_list: Option<Handle<RxGroupList>>,
    #[serde(default)]
    pub gps_system: Option<Handle<GpsSystem>>,
    #[serde(default)]
    pub encryption_key: Option<Handle<EncryptionKey>>,
    #[serde(default)]
    pub emergency_system: Option<Handle<EmergencySystem>>,
}

impl DigitalChannel {
    pub fn new(name: impl Into<String>, rx_frequency: u64, tx_frequency: u64) -> Self {
        Self {
            common: ChannelCommon::new(name, rx_frequency, tx_frequency),
            admit: DigitalAdmit::Always,
            color_code: 1,
            time_slot: TimeSlot::TS1,
            tx_contact: None,
            group_list: None,
            gps_system: None,
            encryption_key: None,
            emergency_system: None,
        }
    }

    /// Set the color code, rejecting values outside 0..=15
    pub fn set_color_code(&mut self, cc: u8) -> bool {
        if !COLOR_CODES.contains(&cc) || cc == self.color_code {
            return false;
        }
        self.color_code = cc;
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Channel {
    Analog(AnalogChannel),
    Digital(DigitalChannel),
}

impl Channel {
    pub fn common(&self) -> &ChannelCommon {
        match self {
            Channel::Analog(ch) => &ch.common,
            Channel::Digital(ch) => &ch.common,
        }
    }

    pub fn common_mut(&mut self) -> &mut ChannelCommon {
        match self {
            Channel::Analog(ch) => &mut ch.common,
            Channel::Digital(ch) => &mut ch.common,
        }
    }

    pub fn name(&self) -> &str {
        &self.common().name
    }

    pub fn is_digital(&self) -> bool {
        matches!(self, Channel::Digital(_))
    }

    pub fn as_digital(&self) -> Option<&DigitalChannel> {
        match self {
            Channel::Digital(ch) => Some(ch),
            Channel::Analog(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_access() {
        let mut ch = Channel::Analog(AnalogChannel::new("Calling", 145_500_000, 145_500_000));
        assert_eq!(ch.name(), "Calling");
        assert!(!ch.is_digital());
        ch.common_mut().power = Power::Low;
        assert_eq!(ch.common().power, Power::Low);
        assert!(ch.as_digital().is_none());
    }

    #[test]
    fn test_color_code() {
        let mut ch = DigitalChannel::new("DMR", 439_562_500, 431_962_500);
        assert!(ch.set_color_code(7));
        assert!(!ch.set_color_code(7));
        assert!(!ch.set_color_code(16));
        assert_eq!(ch.color_code, 7);
    }

    #[test]
    fn test_signaling_tables() {
        assert!(Signaling::Ctcss(885).is_standard());
        assert!(!Signaling::Ctcss(886).is_standard());
        assert!(Signaling::Dcs { code: 23, inverted: true }.is_standard());
        assert!(Signaling::None.is_standard());
    }

    #[test]
    fn test_json_tagging() {
        let ch = Channel::Digital(DigitalChannel::new("DMR", 439_562_500, 431_962_500));
        let json = serde_json::to_string(&ch).unwrap();
        assert!(json.contains("\"type\":\"Digital\""));
        let back: Channel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ch);
    }
}
