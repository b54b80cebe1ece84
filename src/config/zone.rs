// Zones group channels into two parallel member lists (A and B)

use super::channel::Channel;
use super::list::Handle;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    #[serde(default)]
    pub a: Vec<Handle<Channel>>,
    #[serde(default)]
    pub b: Vec<Handle<Channel>>,
}

impl Zone {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Drop `channel` from both member lists
    pub fn remove_channel(&mut self, channel: Handle<Channel>) -> bool {
        let before = self.a.len() + self.b.len();
        self.a.retain(|&c| c != channel);
        self.b.retain(|&c| c != channel);
        before != self.a.len() + self.b.len()
    }
}
