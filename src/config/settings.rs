// Device-global settings blocks

use super::channel::Channel;
use super::contact::Contact;
use super::list::Handle;
use super::zone::Zone;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    pub radio_name: String,
    pub intro_line1: String,
    pub intro_line2: String,
    pub mic_level: u8,
    pub speech: bool,
    pub keypad_tones: bool,
    pub talk_permit_digital: bool,
    pub talk_permit_analog: bool,
    pub channel_free_tone: bool,
    pub disable_all_leds: bool,
    pub disable_all_tones: bool,
    pub intro_picture: bool,
    pub save_preamble: bool,
    pub save_mode_rx: bool,
    pub open_squelch_monitor: bool,
    /// true: channel mode, false: frequency mode
    pub channel_mode_a: bool,
    pub channel_mode_b: bool,
    pub tx_preamble_ms: u32,
    pub group_call_hang_ms: u32,
    pub private_call_hang_ms: u32,
    pub vox_sensitivity: u8,
    pub low_battery_interval_s: u32,
    /// 0 means continuous
    pub call_alert_duration_s: u32,
    pub lone_worker_response_min: u8,
    pub lone_worker_reminder_s: u8,
    pub scan_digital_hang_ms: u32,
    pub scan_analog_hang_ms: u32,
    /// 0 means always on
    pub backlight_s: u32,
    /// `None` means manual lock only
    pub keypad_lock_s: Option<u32>,
    pub power_on_password: Option<u32>,
    pub radio_prog_password: Option<u32>,
    pub pc_prog_password: Option<String>,
    pub group_call_match: bool,
    pub private_call_match: bool,
    /// Hours relative to UTC, -12..=12
    pub time_zone: i8,
    pub channel_hang_time_ms: u32,
    pub public_zone: bool,
    pub edit_radio_id: bool,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            radio_name: String::new(),
            intro_line1: String::new(),
            intro_line2: String::new(),
            mic_level: 2,
            speech: false,
            keypad_tones: true,
            talk_permit_digital: true,
            talk_permit_analog: false,
            channel_free_tone: false,
            disable_all_leds: false,
            disable_all_tones: false,
            intro_picture: true,
            save_preamble: true,
            save_mode_rx: true,
            open_squelch_monitor: true,
            channel_mode_a: true,
            channel_mode_b: true,
            tx_preamble_ms: 600,
            group_call_hang_ms: 3000,
            private_call_hang_ms: 4000,
            vox_sensitivity: 3,
            low_battery_interval_s: 120,
            call_alert_duration_s: 0,
            lone_worker_response_min: 1,
            lone_worker_reminder_s: 10,
            scan_digital_hang_ms: 1000,
            scan_analog_hang_ms: 1000,
            backlight_s: 10,
            keypad_lock_s: None,
            power_on_password: None,
            radio_prog_password: None,
            pc_prog_password: None,
            group_call_match: true,
            private_call_match: true,
            time_zone: 0,
            channel_hang_time_ms: 3000,
            public_zone: true,
            edit_radio_id: true,
        }
    }
}

/// Zone and channels the radio starts on
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootSettings {
    pub zone: Option<Handle<Zone>>,
    /// Member of the zone's A list
    pub channel_a: Option<Handle<Channel>>,
    /// Member of the zone's B list
    pub channel_b: Option<Handle<Channel>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MenuItem {
    TextMessage,
    CallAlert,
    ContactsEdit,
    ManualDial,
    RadioCheck,
    RemoteMonitor,
    RadioEnable,
    RadioDisable,
    Scan,
    EditScanList,
    CallLogMissed,
    CallLogAnswered,
    CallLogOutgoing,
    Talkaround,
    ToneOrAlert,
    Power,
    Backlight,
    IntroScreen,
    KeypadLock,
    LedIndicator,
    Squelch,
    Vox,
    Password,
    DisplayMode,
    ProgramRadio,
    GpsInformation,
}

impl MenuItem {
    pub const ALL: [MenuItem; 26] = [
        MenuItem::TextMessage,
        MenuItem::CallAlert,
        MenuItem::ContactsEdit,
        MenuItem::ManualDial,
        MenuItem::RadioCheck,
        MenuItem::RemoteMonitor,
        MenuItem::RadioEnable,
        MenuItem::RadioDisable,
        MenuItem::Scan,
        MenuItem::EditScanList,
        MenuItem::CallLogMissed,
        MenuItem::CallLogAnswered,
        MenuItem::CallLogOutgoing,
        MenuItem::Talkaround,
        MenuItem::ToneOrAlert,
        MenuItem::Power,
        MenuItem::Backlight,
        MenuItem::IntroScreen,
        MenuItem::KeypadLock,
        MenuItem::LedIndicator,
        MenuItem::Squelch,
        MenuItem::Vox,
        MenuItem::Password,
        MenuItem::DisplayMode,
        MenuItem::ProgramRadio,
        MenuItem::GpsInformation,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuSettings {
    /// Seconds, 0 keeps the menu open
    pub hang_time_s: u8,
    pub enabled: BTreeSet<MenuItem>,
}

impl Default for MenuSettings {
    fn default() -> Self {
        Self {
            hang_time_s: 0,
            enabled: MenuItem::ALL.into_iter().collect(),
        }
    }
}

/// Action bound to a programmable button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ButtonAction {
    #[default]
    Disabled,
    ToggleAllAlertTones,
    EmergencyOn,
    EmergencyOff,
    PowerSelect,
    Monitor,
    NuisanceDelete,
    /// One-touch access slot 1..=6
    OneTouch(u8),
    ToggleTalkaround,
    ToggleScan,
    ToggleEncryption,
    ToggleVox,
    ZoneSelect,
    BatteryIndicator,
    ToggleLoneWorker,
    ToggleRecording,
    PlaybackRecording,
    DeleteAllRecordings,
    ManualDial,
    /// Code without known meaning, kept as read from the device
    Reserved(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OneTouchKind {
    DigitalCall,
    DigitalMessage,
    AnalogDtmf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneTouch {
    pub kind: OneTouchKind,
    #[serde(default)]
    pub contact: Option<Handle<Contact>>,
    /// Preset text message number, 0 for none
    #[serde(default)]
    pub message: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonSettings {
    pub side_button_1_short: ButtonAction,
    pub side_button_1_long: ButtonAction,
    pub side_button_2_short: ButtonAction,
    pub side_button_2_long: ButtonAction,
    pub long_press_ms: u32,
    pub one_touch: Vec<OneTouch>,
}

impl Default for ButtonSettings {
    fn default() -> Self {
        Self {
            side_button_1_short: ButtonAction::ToggleAllAlertTones,
            side_button_1_long: ButtonAction::PowerSelect,
            side_button_2_short: ButtonAction::Monitor,
            side_button_2_long: ButtonAction::ZoneSelect,
            long_press_ms: 1000,
            one_touch: Vec::new(),
        }
    }
}

/// Programming time stamp (UTC)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamp {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl Timestamp {
    /// Current system time
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self::from_unix(secs)
    }

    /// Convert seconds since the Unix epoch to a calendar date (proleptic Gregorian)
    pub fn from_unix(secs: u64) -> Self {
        let days = (secs / 86_400) as i64;
        let rem = secs % 86_400;

        // Days to civil date, eras of 400 years starting 0000-03-01
        let z = days + 719_468;
        let era = z.div_euclid(146_097);
        let doe = z.rem_euclid(146_097);
        let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
        let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
        let mp = (5 * doy + 2) / 153;
        let day = (doy - (153 * mp + 2) / 5 + 1) as u8;
        let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u8;
        let year = (yoe + era * 400 + i64::from(month <= 2)) as u16;

        Self {
            year,
            month,
            day,
            hour: (rem / 3600) as u8,
            minute: ((rem % 3600) / 60) as u8,
            second: (rem % 60) as u8,
        }
    }

    pub fn is_valid(&self) -> bool {
        (1..=12).contains(&self.month)
            && (1..=31).contains(&self.day)
            && self.hour < 24
            && self.minute < 60
            && self.second < 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unix_conversion() {
        let epoch = Timestamp::from_unix(0);
        assert_eq!((epoch.year, epoch.month, epoch.day), (1970, 1, 1));

        // 2024-02-29 12:34:56 UTC
        let leap = Timestamp::from_unix(1_709_210_096);
        assert_eq!((leap.year, leap.month, leap.day), (2024, 2, 29));
        assert_eq!((leap.hour, leap.minute, leap.second), (12, 34, 56));
        assert!(leap.is_valid());
    }

    #[test]
    fn test_now_is_valid() {
        let now = Timestamp::now();
        assert!(now.year >= 2024);
        assert!(now.is_valid());
    }

    #[test]
    fn test_menu_defaults_enable_everything() {
        let menu = MenuSettings::default();
        assert_eq!(menu.enabled.len(), MenuItem::ALL.len());
    }
}
