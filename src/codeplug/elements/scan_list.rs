// Scan list record

use super::{check_members, member_codes, name_unset, resolve_members, NAME_CHARS};
use crate::bitwise::elements::Result as ElementResult;
use crate::bitwise::{Element, Endianness};
use crate::codeplug::{Codeplug, CodeplugContext, CodeplugResult, Flags};
use crate::config::{Config, ScanList};
use tracing::debug;

/// Channel reference code meaning "no channel"
const CHANNEL_NONE: u16 = 0xffff;

/// Scan list record (104 bytes)
///
/// Byte layout:
/// - 0x00: name (16 x UTF-16LE)
/// - 0x20/0x22: priority channels 1/2, 0x24: tx channel
///   (u16 LE: 0xffff=none, 0=selected, otherwise +1 channel index)
/// - 0x27: signal hold time in 25ms steps
/// - 0x28: priority sample time in 250ms steps
/// - 0x2a: 31 members as +1 channel indices, 0-terminated
#[derive(Debug)]
pub struct ScanListElement<B>(Element<B>);

impl<B: AsRef<[u8]>> ScanListElement<B> {
    pub const SIZE: usize = 0x68;
    pub const MEMBERS: usize = 31;

    pub fn new(data: B) -> ElementResult<Self> {
        Ok(Self(Element::new(data, Self::SIZE)?))
    }

    pub fn is_valid(&self) -> bool {
        !name_unset(self.0.u16(0x00, Endianness::Little))
    }

    pub fn name(&self) -> String {
        self.0.utf16(0x00, NAME_CHARS)
    }

    pub fn priority_channel_1(&self) -> u16 {
        self.0.u16(0x20, Endianness::Little)
    }

    pub fn priority_channel_2(&self) -> u16 {
        self.0.u16(0x22, Endianness::Little)
    }

    pub fn tx_channel(&self) -> u16 {
        self.0.u16(0x24, Endianness::Little)
    }

    pub fn hold_time_ms(&self) -> u32 {
        self.0.u8(0x27) as u32 * 25
    }

    pub fn priority_sample_time_ms(&self) -> u32 {
        self.0.u8(0x28) as u32 * 250
    }

    pub fn member(&self, n: usize) -> u16 {
        self.0.u16(0x2a + 2 * n, Endianness::Little)
    }

    pub fn members(&self) -> Vec<u16> {
        (0..Self::MEMBERS).map(|n| self.member(n)).collect()
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> ScanListElement<B> {
    pub fn clear(&mut self) {
        self.0.fill(0x00, Self::SIZE, 0x00);
        self.set_priority_channel_1(CHANNEL_NONE);
        self.set_priority_channel_2(CHANNEL_NONE);
        self.set_tx_channel(0);
        self.0.set_u8(0x26, 0xff);
        self.set_hold_time_ms(500);
        self.set_priority_sample_time_ms(2000);
    }

    pub fn set_name(&mut self, name: &str) {
        self.0.set_utf16(0x00, NAME_CHARS, name, 0x0000);
    }

    pub fn set_priority_channel_1(&mut self, code: u16) {
        self.0.set_u16(0x20, code, Endianness::Little);
    }

    pub fn set_priority_channel_2(&mut self, code: u16) {
        self.0.set_u16(0x22, code, Endianness::Little);
    }

    pub fn set_tx_channel(&mut self, code: u16) {
        self.0.set_u16(0x24, code, Endianness::Little);
    }

    pub fn set_hold_time_ms(&mut self, ms: u32) {
        self.0.set_u8(0x27, (ms / 25).min(0xff) as u8);
    }

    pub fn set_priority_sample_time_ms(&mut self, ms: u32) {
        self.0.set_u8(0x28, (ms / 250).min(0xff) as u8);
    }

    pub fn set_member(&mut self, n: usize, code: u16) {
        self.0.set_u16(0x2a + 2 * n, code, Endianness::Little);
    }
}

impl Codeplug {
    pub fn clear_scan_lists(&mut self) -> CodeplugResult<()> {
        let table = self.layout.scan_lists;
        for i in 0..table.count {
            ScanListElement::new(self.table_record_mut(&table, i)?)?.clear();
        }
        Ok(())
    }

    pub fn encode_scan_lists(
        &mut self,
        config: &Config,
        _flags: &Flags,
        ctx: &mut CodeplugContext,
    ) -> CodeplugResult<()> {
        self.clear_scan_lists()?;
        let table = self.layout.scan_lists;
        check_members(config.scan_lists.len(), table.count, "scan lists", &mut ctx.log);
        let max = ScanListElement::<&[u8]>::MEMBERS;

        for (handle, list) in config.scan_lists.iter() {
            let Some(index) = ctx.scan_lists.index(handle) else {
                continue;
            };
            ctx.log.push(format!("scan list {}", index + 1));
            let codes = member_codes(&list.channels, &ctx.channels, "channel", &mut ctx.log)?;
            check_members(codes.len(), max, "channels", &mut ctx.log);
            let primary = ctx.encode_channel_ref(list.primary, Some(CHANNEL_NONE))?;
            let secondary = ctx.encode_channel_ref(list.secondary, Some(CHANNEL_NONE))?;
            let tx = ctx.encode_channel_ref(list.tx_channel, Some(CHANNEL_NONE))?;

            let mut el = ScanListElement::new(self.table_record_mut(&table, index as usize)?)?;
            el.set_name(&list.name);
            el.set_priority_channel_1(primary);
            el.set_priority_channel_2(secondary);
            el.set_tx_channel(tx);
            el.set_hold_time_ms(list.hold_time_ms);
            el.set_priority_sample_time_ms(list.priority_sample_time_ms);
            for (n, &code) in codes.iter().take(max).enumerate() {
                el.set_member(n, code);
            }
            ctx.log.pop();
        }
        Ok(())
    }

    pub fn create_scan_lists(
        &self,
        config: &mut Config,
        ctx: &mut CodeplugContext,
    ) -> CodeplugResult<()> {
        let table = self.layout.scan_lists;
        for i in 0..table.count {
            let el = ScanListElement::new(self.table_record(&table, i)?)?;
            if !el.is_valid() {
                continue;
            }
            let mut list = ScanList::new(el.name());
            list.hold_time_ms = el.hold_time_ms();
            list.priority_sample_time_ms = el.priority_sample_time_ms();
            let handle = config.scan_lists.add(list);
            ctx.scan_lists.register(i as u32, handle);
        }
        debug!("Created {} scan lists", ctx.scan_lists.len());
        Ok(())
    }

    pub fn link_scan_lists(
        &self,
        config: &mut Config,
        ctx: &mut CodeplugContext,
    ) -> CodeplugResult<()> {
        let table = self.layout.scan_lists;
        for i in 0..table.count {
            let Some(handle) = ctx.scan_lists.handle(i as u32) else {
                continue;
            };
            ctx.log.push(format!("scan list {}", i + 1));
            let el = ScanListElement::new(self.table_record(&table, i)?)?;
            let channels = resolve_members(el.members(), &ctx.channels, "channel", &mut ctx.log);
            let primary = ctx.resolve_channel_ref(el.priority_channel_1(), Some(CHANNEL_NONE));
            let secondary = ctx.resolve_channel_ref(el.priority_channel_2(), Some(CHANNEL_NONE));
            let tx_channel = ctx.resolve_channel_ref(el.tx_channel(), Some(CHANNEL_NONE));
            if let Some(list) = config.scan_lists.get_mut(handle) {
                list.channels = channels;
                list.primary = primary;
                list.secondary = secondary;
                list.tx_channel = tx_channel;
            }
            ctx.log.pop();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChannelRef;

    #[test]
    fn test_channel_reference_codes() {
        let mut el = ScanListElement::new(vec![0u8; ScanListElement::<Vec<u8>>::SIZE]).unwrap();
        el.clear();
        assert_eq!(el.priority_channel_1(), 0xffff);
        assert_eq!(el.tx_channel(), 0);
        assert_eq!(el.hold_time_ms(), 500);

        let mut ctx = CodeplugContext::new();
        assert_eq!(
            ctx.resolve_channel_ref(el.priority_channel_1(), Some(CHANNEL_NONE)),
            ChannelRef::None
        );
        assert_eq!(
            ctx.resolve_channel_ref(el.tx_channel(), Some(CHANNEL_NONE)),
            ChannelRef::Selected
        );
    }

    #[test]
    fn test_times_are_quantized() {
        let mut el = ScanListElement::new(vec![0u8; ScanListElement::<Vec<u8>>::SIZE]).unwrap();
        el.set_hold_time_ms(510);
        el.set_priority_sample_time_ms(1900);
        assert_eq!(el.hold_time_ms(), 500);
        assert_eq!(el.priority_sample_time_ms(), 1750);
    }
}
