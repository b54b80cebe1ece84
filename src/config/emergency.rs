// Emergency systems and the global emergency settings

use super::channel::ChannelRef;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AlarmType {
    #[default]
    Disabled,
    Regular,
    Silent,
    SilentWithVoice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AlarmMode {
    #[default]
    Alarm,
    AlarmWithCall,
    AlarmWithVoice,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencySystem {
    pub name: String,
    #[serde(default)]
    pub alarm_type: AlarmType,
    #[serde(default)]
    pub alarm_mode: AlarmMode,
    #[serde(default)]
    pub impolite_retries: u8,
    #[serde(default)]
    pub polite_retries: u8,
    /// Seconds
    #[serde(default)]
    pub hot_mic_duration_s: u32,
    #[serde(default)]
    pub revert_channel: ChannelRef,
}

impl EmergencySystem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alarm_type: AlarmType::Regular,
            alarm_mode: AlarmMode::Alarm,
            impolite_retries: 15,
            polite_retries: 5,
            hot_mic_duration_s: 100,
            revert_channel: ChannelRef::Selected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmergencySettings {
    pub radio_disable_decode: bool,
    pub remote_monitor_decode: bool,
    pub emergency_remote_monitor_decode: bool,
    /// Seconds
    pub remote_monitor_duration_s: u32,
    /// Milliseconds
    pub tx_sync_wakeup_ms: u32,
    pub tx_wakeup_message_limit: u8,
}

impl Default for EmergencySettings {
    fn default() -> Self {
        Self {
            radio_disable_decode: false,
            remote_monitor_decode: false,
            emergency_remote_monitor_decode: false,
            remote_monitor_duration_s: 10,
            tx_sync_wakeup_ms: 500,
            tx_wakeup_message_limit: 2,
        }
    }
}
