// GPS (position reporting) systems

use super::channel::ChannelRef;
use super::contact::Contact;
use super::list::Handle;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsSystem {
    pub name: String,
    /// Destination of position reports
    #[serde(default)]
    pub contact: Option<Handle<Contact>>,
    #[serde(default = "selected")]
    pub revert_channel: ChannelRef,
    /// Repeat interval in seconds, 0 disables periodic reports
    #[serde(default)]
    pub period_s: u32,
}

fn selected() -> ChannelRef {
    ChannelRef::Selected
}

impl GpsSystem {
    pub fn new(name: impl Into<String>, contact: Option<Handle<Contact>>, period_s: u32) -> Self {
        Self {
            name: name.into(),
            contact,
            revert_channel: ChannelRef::Selected,
            period_s,
        }
    }
}
