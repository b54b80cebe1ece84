// Record codecs of the TyT codeplug
//
// One file per record type: the typed view over the record bytes and the
// `Codeplug` clear/encode/create/link methods for the entity it stores.

pub mod boot;
pub mod buttons;
pub mod channel;
pub mod contact;
pub mod emergency;
pub mod general;
pub mod gps;
pub mod group_list;
pub mod menu;
pub mod privacy;
pub mod scan_list;
pub mod text_message;
pub mod timestamp;
pub mod vfo;
pub mod zone;

pub use boot::BootSettingsElement;
pub use buttons::ButtonSettingsElement;
pub use channel::ChannelElement;
pub use contact::ContactElement;
pub use emergency::{EmergencySettingsElement, EmergencySystemElement};
pub use general::GeneralSettingsElement;
pub use gps::GpsSystemElement;
pub use group_list::GroupListElement;
pub use menu::MenuSettingsElement;
pub use privacy::{BasicKeyElement, EnhancedKeyElement};
pub use scan_list::ScanListElement;
pub use text_message::TextMessageElement;
pub use timestamp::TimestampElement;
pub use vfo::VfoChannelElement;
pub use zone::{ZoneElement, ZoneExtElement};

use super::context::IndexTable;
use super::error::CodeplugResult;
use super::layout::TableLayout;
use super::Codeplug;
use crate::config::Handle;
use crate::core::MessageLog;

/// Name fields hold 16 UTF-16 code units
pub(crate) const NAME_CHARS: usize = 16;

/// True for the first u16 of an unused name field
pub(crate) fn name_unset(first: u16) -> bool {
    first == 0x0000 || first == 0xffff
}

impl Codeplug {
    /// Record `index` of `table`
    pub(crate) fn table_record(&self, table: &TableLayout, index: usize) -> CodeplugResult<&[u8]> {
        self.record(table.address_of(index), table.size)
    }

    pub(crate) fn table_record_mut(
        &mut self,
        table: &TableLayout,
        index: usize,
    ) -> CodeplugResult<&mut [u8]> {
        self.record_mut(table.address_of(index), table.size)
    }
}

/// +1 indices of `members` that have a device record. Members without a
/// record are left out.
pub(crate) fn member_codes<T>(
    members: &[Handle<T>],
    table: &IndexTable<T>,
    kind: &'static str,
    log: &mut MessageLog,
) -> CodeplugResult<Vec<u16>> {
    let mut codes = Vec::with_capacity(members.len());
    for &member in members {
        if let Some(index) = table.position(member, kind, log)? {
            codes.push(index as u16 + 1);
        }
    }
    Ok(codes)
}

/// Resolve a 0-terminated list of +1 indices
pub(crate) fn resolve_members<T>(
    codes: impl IntoIterator<Item = u16>,
    table: &IndexTable<T>,
    kind: &str,
    log: &mut MessageLog,
) -> Vec<Handle<T>> {
    codes
        .into_iter()
        .take_while(|&code| code != 0 && code != 0xffff)
        .filter_map(|code| table.resolve(code as u32, kind, log))
        .collect()
}

/// Warn when a member list is longer than the record holds
pub(crate) fn check_members(len: usize, max: usize, kind: &str, log: &mut MessageLog) {
    if len > max {
        log.warning(format!(
            "{} {} exceed the limit of {}, truncated",
            len, kind, max
        ));
    }
}
