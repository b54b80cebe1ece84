// Binary-Coded Decimal (BCD) encoding/decoding
// DMR IDs, frequencies, passwords and timestamps are stored as packed BCD.

use super::types::Endianness;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BcdError {
    #[error("Invalid BCD digit: {0:#x}")]
    InvalidDigit(u8),

    #[error("Value too large for {digits} BCD digits: {value}")]
    ValueTooLarge { value: u64, digits: usize },
}

pub type Result<T> = std::result::Result<T, BcdError>;

/// Convert a BCD byte to its two decimal digits (tens, ones)
/// Example: 0x12 -> (1, 2), 0x95 -> (9, 5)
pub fn bcd_byte_to_digits(byte: u8) -> Result<(u8, u8)> {
    let tens = (byte & 0xF0) >> 4;
    let ones = byte & 0x0F;

    if tens > 9 || ones > 9 {
        return Err(BcdError::InvalidDigit(byte));
    }

    Ok((tens, ones))
}

/// Decode packed BCD bytes into an integer
/// Example: [0x12, 0x34] big-endian -> 1234, little-endian -> 3412
pub fn decode_bcd(bytes: &[u8], endianness: Endianness) -> Result<u64> {
    let mut value: u64 = 0;
    let mut push = |byte: u8| -> Result<()> {
        let (tens, ones) = bcd_byte_to_digits(byte)?;
        value = value * 100 + (tens * 10 + ones) as u64;
        Ok(())
    };

    match endianness {
        Endianness::Big => bytes.iter().try_for_each(|&b| push(b))?,
        Endianness::Little => bytes.iter().rev().try_for_each(|&b| push(b))?,
    }

    Ok(value)
}

/// Encode `value` as packed BCD into `out`, using all of its bytes
/// Example: 1234 into 2 bytes big-endian -> [0x12, 0x34]
pub fn encode_bcd_into(value: u64, out: &mut [u8], endianness: Endianness) -> Result<()> {
    let mut remaining = value;

    for i in (0..out.len()).rev() {
        let two_digits = (remaining % 100) as u8;
        remaining /= 100;
        out[i] = ((two_digits / 10) << 4) | (two_digits % 10);
    }

    if remaining > 0 {
        return Err(BcdError::ValueTooLarge {
            value,
            digits: out.len() * 2,
        });
    }

    endianness.arrange(out);
    Ok(())
}

/// Encode `value` as `num_bytes` of packed BCD
pub fn encode_bcd(value: u64, num_bytes: usize, endianness: Endianness) -> Result<Vec<u8>> {
    let mut out = vec![0u8; num_bytes];
    encode_bcd_into(value, &mut out, endianness)?;
    Ok(out)
}

/// Encode a DMR ID as 8 BCD digits, most significant digit first
/// Example: 2621370 -> [0x02, 0x62, 0x13, 0x70]
pub fn encode_dmr_id_bcd(id: u32) -> Result<[u8; 4]> {
    let mut out = [0u8; 4];
    encode_bcd_into(id as u64, &mut out, Endianness::Big)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bcd_byte_conversion() {
        assert_eq!(bcd_byte_to_digits(0x12).unwrap(), (1, 2));
        assert_eq!(bcd_byte_to_digits(0x95).unwrap(), (9, 5));
        assert!(bcd_byte_to_digits(0xAB).is_err());
    }

    #[test]
    fn test_decode_both_orders() {
        assert_eq!(decode_bcd(&[0x12, 0x34, 0x56], Endianness::Big).unwrap(), 123456);
        assert_eq!(decode_bcd(&[0x56, 0x34, 0x12], Endianness::Little).unwrap(), 123456);
        assert!(decode_bcd(&[0xff, 0xff], Endianness::Little).is_err());
    }

    #[test]
    fn test_frequency_encoding() {
        // 439.5625 MHz in 10 Hz units, 4 bytes little-endian
        let bytes = encode_bcd(43956250, 4, Endianness::Little).unwrap();
        assert_eq!(bytes, vec![0x50, 0x62, 0x95, 0x43]);
        assert_eq!(decode_bcd(&bytes, Endianness::Little).unwrap(), 43956250);
    }

    #[test]
    fn test_value_too_large() {
        assert!(encode_bcd(12345, 2, Endianness::Big).is_err());
        assert!(encode_bcd(1234, 2, Endianness::Big).is_ok());
    }

    #[test]
    fn test_dmr_id() {
        assert_eq!(encode_dmr_id_bcd(2621370).unwrap(), [0x02, 0x62, 0x13, 0x70]);
        assert!(encode_dmr_id_bcd(100_000_000).is_err());
    }
}
