// Callsign database records: entries, index entries and the limits record

use super::users::User;
use super::Result;
use crate::bitwise::bcd::encode_dmr_id_bcd;
use crate::bitwise::{encode_bcd, parse_bcd, parse_cstring, write_u32_le, Endianness};
use crate::bitwise::parser::parse_byte;
use nom::number::complete::le_u32;
use nom::{IResult, Parser};

const PRIVATE_CALL: u8 = 0x00;
const RING_NONE: u8 = 0x00;
const HEADER_SIZE: usize = 6;

/// Byte caps of the entry strings: name, city, call, state, country
const NAME_CAP: usize = 16;
const CITY_CAP: usize = 16;
const CALL_CAP: usize = 8;
const STATE_CAP: usize = 16;
const COUNTRY_CAP: usize = 16;

/// Largest possible encoded entry
pub const MAX_ENTRY_SIZE: usize =
    HEADER_SIZE + NAME_CAP + CITY_CAP + CALL_CAP + STATE_CAP + COUNTRY_CAP + 5 + 1;

/// Single-byte encoding, characters outside Latin-1 become '?'
fn latin1(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

fn fields(user: &User) -> [(&str, usize); 5] {
    [
        (&user.name, NAME_CAP),
        (&user.city, CITY_CAP),
        (&user.call, CALL_CAP),
        (&user.state, STATE_CAP),
        (&user.country, COUNTRY_CAP),
    ]
}

/// Encoded size of `user`'s entry
pub fn entry_size(user: &User) -> usize {
    HEADER_SIZE
        + fields(user)
            .iter()
            .map(|(s, cap)| s.chars().count().min(*cap) + 1)
            .sum::<usize>()
        + 1
}

/// Callsign entry
///
/// Byte layout:
/// - 0x00: call type (0=private call)
/// - 0x01: DMR ID (8 digit BCD, big endian)
/// - 0x05: ring style (0=none)
/// - 0x06: name, city, call, state, country, each truncated and 0-terminated
/// - last: 0x00 (empty comment)
pub fn encode_entry(user: &User) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(entry_size(user));
    out.push(PRIVATE_CALL);
    out.extend_from_slice(&encode_dmr_id_bcd(user.id)?);
    out.push(RING_NONE);
    for (s, cap) in fields(user) {
        let bytes = latin1(s);
        out.extend_from_slice(&bytes[..bytes.len().min(cap)]);
        out.push(0x00);
    }
    out.push(0x00);
    Ok(out)
}

/// Parse an entry, the comment is discarded
pub fn parse_entry(input: &[u8]) -> IResult<&[u8], User> {
    let (rest, (_call_type, id, _ring, name, city, call, state, country, _comment)) = (
        parse_byte,
        parse_bcd(4, Endianness::Big),
        parse_byte,
        parse_cstring,
        parse_cstring,
        parse_cstring,
        parse_cstring,
        parse_cstring,
        parse_cstring,
    )
        .parse(input)?;
    Ok((
        rest,
        User {
            id: id as u32,
            call,
            name,
            city,
            state,
            country,
        },
    ))
}

/// Index entry: DMR ID (8 digit BCD, little endian) and virtual entry offset (u32 LE)
pub fn encode_index_entry(id: u32, offset: u32) -> Result<[u8; 8]> {
    let mut out = [0u8; 8];
    out[..4].copy_from_slice(&encode_bcd(id as u64, 4, Endianness::Little)?);
    write_u32_le(&mut out[4..], offset)?;
    Ok(out)
}

pub fn parse_index_entry(input: &[u8]) -> IResult<&[u8], (u32, u32)> {
    let (rest, (id, offset)) = (parse_bcd(4, Endianness::Little), le_u32).parse(input)?;
    Ok((rest, (id as u32, offset)))
}

/// Limits record: entry count and end address of the entry data (u32 LE each)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub count: u32,
    pub end_of_db: u32,
}

impl Limits {
    pub fn encode(&self) -> Result<[u8; 16]> {
        let mut out = [0u8; 16];
        write_u32_le(&mut out[0..4], self.count)?;
        write_u32_le(&mut out[4..8], self.end_of_db)?;
        Ok(out)
    }

    pub fn parse(input: &[u8]) -> IResult<&[u8], Self> {
        let (rest, (count, end_of_db)) = (le_u32, le_u32).parse(input)?;
        Ok((rest, Self { count, end_of_db }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: 2621370,
            call: "DM3MAT".to_string(),
            name: "Hannes".to_string(),
            city: "Berlin".to_string(),
            state: "BE".to_string(),
            country: "Germany".to_string(),
        }
    }

    #[test]
    fn test_entry_bytes() {
        let user = user();
        let bytes = encode_entry(&user).unwrap();
        assert_eq!(bytes.len(), entry_size(&user));
        assert_eq!(bytes[..6], [0x00, 0x02, 0x62, 0x13, 0x70, 0x00]);
        assert_eq!(&bytes[6..13], b"Hannes\0");
        assert_eq!(bytes[bytes.len() - 2..], [0x00, 0x00]);

        let (rest, parsed) = parse_entry(&bytes).unwrap();
        assert!(rest.is_empty());
        assert_eq!(parsed, user);
    }

    #[test]
    fn test_long_name_truncated_to_cap() {
        let mut user = user();
        user.name = "A".repeat(20);
        let base = entry_size(&User {
            name: String::new(),
            ..user.clone()
        });
        assert_eq!(entry_size(&user) - base, 16);
        let bytes = encode_entry(&user).unwrap();
        assert_eq!(&bytes[6..23], format!("{}\0", "A".repeat(16)).as_bytes());
    }

    #[test]
    fn test_non_latin1_replaced() {
        let mut user = user();
        user.name = "Łukasz".to_string();
        user.city = "Köln".to_string();
        let bytes = encode_entry(&user).unwrap();
        let (_, parsed) = parse_entry(&bytes).unwrap();
        assert_eq!(parsed.name, "?ukasz");
        assert_eq!(parsed.city, "Köln");
    }

    #[test]
    fn test_index_entry() {
        let bytes = encode_index_entry(1234, 0x0102).unwrap();
        assert_eq!(bytes, [0x34, 0x12, 0x00, 0x00, 0x02, 0x01, 0x00, 0x00]);
        assert_eq!(parse_index_entry(&bytes).unwrap().1, (1234, 0x0102));
    }

    #[test]
    fn test_limits() {
        let limits = Limits {
            count: 2,
            end_of_db: 0x0450_0040,
        };
        let bytes = limits.encode().unwrap();
        assert_eq!(bytes[8..], [0u8; 8]);
        assert_eq!(Limits::parse(&bytes).unwrap().1, limits);
    }
}
