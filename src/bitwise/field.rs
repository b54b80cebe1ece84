// Typed field access over a fixed-size record window
//
// Every device record (channel, contact, zone, ...) wraps an `Element` that
// borrows exactly its own bytes from a memory image. Offsets passed to the
// accessors are record-relative. A field outside the window reads as zero
// (strings as empty) and is not written.

use super::bcd::{self, decode_bcd, encode_bcd_into};
use super::elements::{ElementError, Result};
use super::types::Endianness;
use tracing::warn;

/// A typed view over `size` bytes of a buffer
#[derive(Debug)]
pub struct Element<B> {
    data: B,
    size: usize,
}

impl<B: AsRef<[u8]>> Element<B> {
    /// Wrap `data`, which must hold at least `size` bytes
    pub fn new(data: B, size: usize) -> Result<Self> {
        let actual = data.as_ref().len();
        if actual < size {
            return Err(ElementError::InsufficientData {
                expected: size,
                actual,
            });
        }
        Ok(Self { data, size })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// The whole record window
    pub fn data(&self) -> &[u8] {
        &self.data.as_ref()[..self.size]
    }

    /// `None` if the field does not fit the window
    pub fn field(&self, offset: usize, len: usize) -> Option<&[u8]> {
        let field = offset
            .checked_add(len)
            .and_then(|end| self.data().get(offset..end));
        if field.is_none() {
            warn!(offset, len, size = self.size, "field outside record window");
        }
        field
    }

    /// Field bytes, empty if the field does not fit the window
    pub fn bytes(&self, offset: usize, len: usize) -> &[u8] {
        self.field(offset, len).unwrap_or_default()
    }

    fn array<const N: usize>(&self, offset: usize) -> [u8; N] {
        self.bytes(offset, N).try_into().unwrap_or([0; N])
    }

    pub fn u8(&self, offset: usize) -> u8 {
        self.array::<1>(offset)[0]
    }

    pub fn bit(&self, offset: usize, bit: u8) -> bool {
        (self.u8(offset) >> bit) & 0x01 == 0x01
    }

    /// Read a `width`-bit unsigned field starting at `bit` of byte `offset`
    pub fn uint(&self, offset: usize, bit: u8, width: u8) -> u8 {
        let mask = ((1u16 << width) - 1) as u8;
        (self.u8(offset) >> bit) & mask
    }

    pub fn u16(&self, offset: usize, endianness: Endianness) -> u16 {
        let b = self.array(offset);
        match endianness {
            Endianness::Big => u16::from_be_bytes(b),
            Endianness::Little => u16::from_le_bytes(b),
        }
    }

    pub fn u24_le(&self, offset: usize) -> u32 {
        let [b0, b1, b2] = self.array(offset);
        u32::from_le_bytes([b0, b1, b2, 0])
    }

    pub fn u32(&self, offset: usize, endianness: Endianness) -> u32 {
        let b = self.array(offset);
        match endianness {
            Endianness::Big => u32::from_be_bytes(b),
            Endianness::Little => u32::from_le_bytes(b),
        }
    }

    /// Packed BCD over `len` bytes, `None` when a nibble is not a decimal digit
    pub fn bcd(&self, offset: usize, len: usize, endianness: Endianness) -> Option<u64> {
        decode_bcd(self.field(offset, len)?, endianness).ok()
    }

    /// UTF-16LE string of at most `chars` code units, terminated by 0x0000 or 0xffff
    pub fn utf16(&self, offset: usize, chars: usize) -> String {
        let units: Vec<u16> = self
            .bytes(offset, chars * 2)
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .take_while(|&u| u != 0x0000 && u != 0xffff)
            .collect();
        String::from_utf16_lossy(&units)
    }

    /// Single-byte string of at most `len` bytes, terminated by 0x00 or 0xff
    pub fn ascii(&self, offset: usize, len: usize) -> String {
        self.bytes(offset, len)
            .iter()
            .take_while(|&&b| b != 0x00 && b != 0xff)
            .map(|&b| b as char)
            .collect()
    }

    /// True if all `len` bytes at `offset` equal `value`
    pub fn is_filled(&self, offset: usize, len: usize, value: u8) -> bool {
        self.bytes(offset, len).iter().all(|&b| b == value)
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> Element<B> {
    /// Field bytes, empty if the field does not fit the window
    pub fn bytes_mut(&mut self, offset: usize, len: usize) -> &mut [u8] {
        let size = self.size;
        let field = offset
            .checked_add(len)
            .filter(|&end| end <= size)
            .and_then(|end| self.data.as_mut().get_mut(offset..end));
        match field {
            Some(field) => field,
            None => {
                warn!(offset, len, size, "field outside record window");
                Default::default()
            }
        }
    }

    fn write(&mut self, offset: usize, bytes: &[u8]) {
        let field = self.bytes_mut(offset, bytes.len());
        if field.len() == bytes.len() {
            field.copy_from_slice(bytes);
        }
    }

    pub fn fill(&mut self, offset: usize, len: usize, value: u8) {
        self.bytes_mut(offset, len).fill(value);
    }

    pub fn set_u8(&mut self, offset: usize, value: u8) {
        self.write(offset, &[value]);
    }

    /// Set or clear one bit, leaving the others untouched
    pub fn set_bit(&mut self, offset: usize, bit: u8, value: bool) {
        let Some(byte) = self.bytes_mut(offset, 1).first_mut() else {
            return;
        };
        if value {
            *byte |= 1 << bit;
        } else {
            *byte &= !(1 << bit);
        }
    }

    /// Write a `width`-bit field starting at `bit`; excess high bits of `value` are dropped
    pub fn set_uint(&mut self, offset: usize, bit: u8, width: u8, value: u8) {
        let mask = (((1u16 << width) - 1) as u8) << bit;
        if let Some(byte) = self.bytes_mut(offset, 1).first_mut() {
            *byte = (*byte & !mask) | ((value << bit) & mask);
        }
    }

    pub fn set_u16(&mut self, offset: usize, value: u16, endianness: Endianness) {
        let bytes = match endianness {
            Endianness::Big => value.to_be_bytes(),
            Endianness::Little => value.to_le_bytes(),
        };
        self.write(offset, &bytes);
    }

    pub fn set_u24_le(&mut self, offset: usize, value: u32) {
        self.write(offset, &value.to_le_bytes()[..3]);
    }

    pub fn set_u32(&mut self, offset: usize, value: u32, endianness: Endianness) {
        let bytes = match endianness {
            Endianness::Big => value.to_be_bytes(),
            Endianness::Little => value.to_le_bytes(),
        };
        self.write(offset, &bytes);
    }

    pub fn set_bcd(
        &mut self,
        offset: usize,
        len: usize,
        value: u64,
        endianness: Endianness,
    ) -> bcd::Result<()> {
        encode_bcd_into(value, self.bytes_mut(offset, len), endianness)
    }

    /// Write `s` as UTF-16LE into `chars` code units; extra characters are dropped,
    /// unused units are set to `pad`
    pub fn set_utf16(&mut self, offset: usize, chars: usize, s: &str, pad: u16) {
        let mut units: Vec<u16> = s.encode_utf16().take(chars).collect();
        units.resize(chars, pad);
        let field = self.bytes_mut(offset, chars * 2);
        for (dst, unit) in field.chunks_exact_mut(2).zip(units) {
            dst.copy_from_slice(&unit.to_le_bytes());
        }
    }

    /// Write `s` as single bytes into `len` bytes, padding with `pad`.
    /// Characters outside Latin-1 are stored as '?'.
    pub fn set_ascii(&mut self, offset: usize, len: usize, s: &str, pad: u8) {
        let field = self.bytes_mut(offset, len);
        field.fill(pad);
        for (dst, c) in field.iter_mut().zip(s.chars()) {
            *dst = u8::try_from(c as u32).unwrap_or(b'?');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_check() {
        let data = [0u8; 4];
        assert!(Element::new(&data[..], 8).is_err());
        let el = Element::new(&data[..], 4).unwrap();
        assert_eq!(el.size(), 4);
    }

    #[test]
    fn test_field_outside_window() {
        let mut data = vec![0x12u8, 0x34, 0x56, 0x78, 0xaa, 0xaa];
        let mut el = Element::new(&mut data[..], 4).unwrap();
        assert!(el.field(2, 4).is_none());
        assert!(el.field(usize::MAX, 2).is_none());
        assert_eq!(el.u8(4), 0);
        assert_eq!(el.u32(2, Endianness::Little), 0);
        assert_eq!(el.u16(2, Endianness::Little), 0x7856);
        assert_eq!(el.bcd(3, 2, Endianness::Big), None);
        assert_eq!(el.utf16(2, 2), "");
        el.set_u8(4, 0xff);
        el.set_bit(5, 0, false);
        el.set_u32(2, 0, Endianness::Big);
        el.fill(3, 8, 0x00);
        assert_eq!(el.data(), &[0x12, 0x34, 0x56, 0x78]);
        assert_eq!(&data[4..], &[0xaa, 0xaa]);
    }

    #[test]
    fn test_bits_leave_neighbours() {
        let mut data = vec![0b1010_0000u8, 0];
        let mut el = Element::new(&mut data[..], 2).unwrap();
        el.set_bit(0, 0, true);
        assert_eq!(el.u8(0), 0b1010_0001);
        el.set_uint(0, 1, 2, 0b11);
        assert_eq!(el.u8(0), 0b1010_0111);
        assert_eq!(el.uint(0, 5, 3), 0b101);
        el.set_uint(0, 4, 4, 0x1f);
        assert_eq!(el.u8(0), 0b1111_0111);
        assert!(!el.bit(1, 3));
    }

    #[test]
    fn test_integers() {
        let mut data = vec![0u8; 8];
        let mut el = Element::new(&mut data[..], 8).unwrap();
        el.set_u16(0, 0x1234, Endianness::Little);
        el.set_u24_le(2, 0xabcdef);
        assert_eq!(el.bytes(0, 5), &[0x34, 0x12, 0xef, 0xcd, 0xab]);
        assert_eq!(el.u16(0, Endianness::Big), 0x3412);
        assert_eq!(el.u24_le(2), 0xabcdef);
        el.set_u32(4, 0xdeadbeef, Endianness::Big);
        assert_eq!(el.u32(4, Endianness::Big), 0xdeadbeef);
    }

    #[test]
    fn test_bcd_field() {
        let mut data = vec![0xffu8; 4];
        let mut el = Element::new(&mut data[..], 4).unwrap();
        assert_eq!(el.bcd(0, 4, Endianness::Little), None);
        el.set_bcd(0, 4, 14652000, Endianness::Little).unwrap();
        assert_eq!(el.bytes(0, 4), &[0x00, 0x20, 0x65, 0x14]);
        assert_eq!(el.bcd(0, 4, Endianness::Little), Some(14652000));
        assert!(el.set_bcd(0, 1, 100, Endianness::Big).is_err());
    }

    #[test]
    fn test_utf16_truncates_and_pads() {
        let mut data = vec![0xffu8; 8];
        let mut el = Element::new(&mut data[..], 8).unwrap();
        el.set_utf16(0, 4, "Hello", 0x0000);
        assert_eq!(el.utf16(0, 4), "Hell");
        el.set_utf16(0, 4, "Hi", 0x0000);
        assert_eq!(el.bytes(0, 8), &[b'H', 0, b'i', 0, 0, 0, 0, 0]);
        assert_eq!(el.utf16(0, 4), "Hi");
    }

    #[test]
    fn test_ascii() {
        let mut data = vec![0u8; 6];
        let mut el = Element::new(&mut data[..], 6).unwrap();
        el.set_ascii(0, 6, "AB\u{263a}CDEFG", 0xff);
        assert_eq!(el.bytes(0, 6), b"AB?CDE");
        el.set_ascii(0, 6, "pw", 0xff);
        assert_eq!(el.ascii(0, 6), "pw");
        assert!(el.is_filled(2, 4, 0xff));
    }
}
