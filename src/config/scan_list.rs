// Scan lists

use super::channel::{Channel, ChannelRef};
use super::list::Handle;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanList {
    pub name: String,
    #[serde(default)]
    pub channels: Vec<Handle<Channel>>,
    #[serde(default)]
    pub primary: ChannelRef,
    #[serde(default)]
    pub secondary: ChannelRef,
    #[serde(default)]
    pub tx_channel: ChannelRef,
    #[serde(default = "default_hold_time")]
    pub hold_time_ms: u32,
    #[serde(default = "default_sample_time")]
    pub priority_sample_time_ms: u32,
}

fn default_hold_time() -> u32 {
    500
}

fn default_sample_time() -> u32 {
    2000
}

impl ScanList {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            channels: Vec::new(),
            primary: ChannelRef::None,
            secondary: ChannelRef::None,
            tx_channel: ChannelRef::Selected,
            hold_time_ms: default_hold_time(),
            priority_sample_time_ms: default_sample_time(),
        }
    }
}
