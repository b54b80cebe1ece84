// VFO channel records

use super::ChannelElement;
use crate::bitwise::elements::Result as ElementResult;
use crate::bitwise::Element;
use crate::codeplug::{Codeplug, CodeplugResult};

/// Step code for 12.5 kHz
const DEFAULT_STEP: u8 = 4;

/// VFO channel (64 bytes): a channel record carrying the tuning step where
/// the name would be
///
/// Byte layout:
/// - 0x00-0x1f: as the channel record
/// - 0x20: step size code, 12.5 kHz after clearing
/// - rest: 0xff
#[derive(Debug)]
pub struct VfoChannelElement<B>(Element<B>);

impl<B: AsRef<[u8]>> VfoChannelElement<B> {
    pub const SIZE: usize = 0x40;

    pub fn new(data: B) -> ElementResult<Self> {
        Ok(Self(Element::new(data, Self::SIZE)?))
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> VfoChannelElement<B> {
    pub fn clear(&mut self) -> ElementResult<()> {
        ChannelElement::new(self.0.bytes_mut(0x00, Self::SIZE))?.clear();
        self.0.fill(0x20, Self::SIZE - 0x20, 0xff);
        self.0.set_u8(0x20, DEFAULT_STEP);
        Ok(())
    }
}

impl Codeplug {
    pub fn clear_vfo_channels(&mut self) -> CodeplugResult<()> {
        let Some(table) = self.layout.vfo_channels else {
            return Ok(());
        };
        for i in 0..table.count {
            VfoChannelElement::new(self.table_record_mut(&table, i)?)?.clear()?;
        }
        Ok(())
    }
}
