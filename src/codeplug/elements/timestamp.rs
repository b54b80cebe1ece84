// Programming timestamp record

use crate::bitwise::elements::Result as ElementResult;
use crate::bitwise::{bcd, Element, Endianness};
use crate::codeplug::{Codeplug, CodeplugContext, CodeplugResult, Flags};
use crate::config::{Config, Timestamp};

/// CPS version written with every timestamp, one digit per byte
const CPS_VERSION: [u8; 4] = [0x00, 0x01, 0x00, 0x00];

/// Timestamp of the last programming (16 bytes)
///
/// Byte layout:
/// - 0x00: 0x62
/// - 0x01: year (4 digit BCD, big endian)
/// - 0x03-0x07: month, day, hour, minute, second (BCD)
/// - 0x0c: CPS version (4 digits, one per byte)
/// - rest: 0xff
#[derive(Debug)]
pub struct TimestampElement<B>(Element<B>);

impl<B: AsRef<[u8]>> TimestampElement<B> {
    pub const SIZE: usize = 0x10;

    pub fn new(data: B) -> ElementResult<Self> {
        Ok(Self(Element::new(data, Self::SIZE)?))
    }

    fn field(&self, offset: usize, len: usize) -> Option<u64> {
        self.0.bcd(offset, len, Endianness::Big)
    }

    /// `None` for erased or garbled timestamps
    pub fn timestamp(&self) -> Option<Timestamp> {
        let ts = Timestamp {
            year: self.field(0x01, 2)? as u16,
            month: self.field(0x03, 1)? as u8,
            day: self.field(0x04, 1)? as u8,
            hour: self.field(0x05, 1)? as u8,
            minute: self.field(0x06, 1)? as u8,
            second: self.field(0x07, 1)? as u8,
        };
        ts.is_valid().then_some(ts)
    }

    pub fn cps_version(&self) -> [u8; 4] {
        let mut version = [0u8; 4];
        version.copy_from_slice(self.0.bytes(0x0c, 4));
        version
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> TimestampElement<B> {
    pub fn clear(&mut self) {
        self.0.fill(0x00, Self::SIZE, 0xff);
    }

    pub fn set_timestamp(&mut self, ts: &Timestamp) -> bcd::Result<()> {
        self.0.set_u8(0x00, 0x62);
        self.0.set_bcd(0x01, 2, ts.year as u64, Endianness::Big)?;
        let fields = [ts.month, ts.day, ts.hour, ts.minute, ts.second];
        for (n, value) in fields.into_iter().enumerate() {
            self.0.set_bcd(0x03 + n, 1, value as u64, Endianness::Big)?;
        }
        self.0.bytes_mut(0x0c, 4).copy_from_slice(&CPS_VERSION);
        Ok(())
    }
}

impl Codeplug {
    pub fn clear_timestamp(&mut self) -> CodeplugResult<()> {
        let address = self.layout.timestamp;
        TimestampElement::new(self.record_mut(address, TimestampElement::<&[u8]>::SIZE)?)?.clear();
        Ok(())
    }

    /// Writes the current time if requested, otherwise the configured timestamp if any
    pub fn encode_timestamp(
        &mut self,
        config: &Config,
        flags: &Flags,
        ctx: &mut CodeplugContext,
    ) -> CodeplugResult<()> {
        let ts = if flags.update_timestamp {
            Some(Timestamp::now())
        } else {
            config.timestamp
        };
        let address = self.layout.timestamp;
        let mut el =
            TimestampElement::new(self.record_mut(address, TimestampElement::<&[u8]>::SIZE)?)?;
        el.clear();
        match ts {
            Some(ts) if ts.is_valid() => el.set_timestamp(&ts)?,
            Some(ts) => ctx.log.warning(format!("invalid timestamp {:?} not written", ts)),
            None => {}
        }
        Ok(())
    }

    pub fn decode_timestamp(
        &self,
        config: &mut Config,
        _ctx: &mut CodeplugContext,
    ) -> CodeplugResult<()> {
        let address = self.layout.timestamp;
        let el = TimestampElement::new(self.record(address, TimestampElement::<&[u8]>::SIZE)?)?;
        config.timestamp = el.timestamp();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codeplug::MD390;

    #[test]
    fn test_timestamp_bytes() {
        let mut el = TimestampElement::new([0u8; 16]).unwrap();
        el.clear();
        assert_eq!(el.timestamp(), None);

        let ts = Timestamp {
            year: 2024,
            month: 2,
            day: 29,
            hour: 12,
            minute: 34,
            second: 56,
        };
        el.set_timestamp(&ts).unwrap();
        assert_eq!(
            el.0.data()[..8],
            [0x62, 0x20, 0x24, 0x02, 0x29, 0x12, 0x34, 0x56]
        );
        assert_eq!(el.cps_version(), CPS_VERSION);
        assert_eq!(el.timestamp(), Some(ts));
    }

    #[test]
    fn test_configured_timestamp_kept_without_update() {
        let mut config = Config::new();
        config.timestamp = Some(Timestamp::from_unix(1_709_210_096));
        let flags = Flags {
            update_timestamp: false,
            ..Flags::default()
        };
        let mut codeplug = Codeplug::new(&MD390);
        codeplug.encode(&config, &flags).unwrap();

        let mut decoded = Config::new();
        let log = codeplug.decode(&mut decoded).unwrap();
        assert!(!log.has_warnings());
        assert_eq!(decoded.timestamp, config.timestamp);
    }

    #[test]
    fn test_missing_timestamp_decodes_silently() {
        let flags = Flags {
            update_timestamp: false,
            ..Flags::default()
        };
        let mut codeplug = Codeplug::new(&MD390);
        codeplug.encode(&Config::new(), &flags).unwrap();
        let mut decoded = Config::new();
        let log = codeplug.decode(&mut decoded).unwrap();
        assert!(!log.has_warnings());
        assert_eq!(decoded.timestamp, None);
    }
}
