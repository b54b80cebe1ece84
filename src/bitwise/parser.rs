// Parser combinators using nom for variable-length binary structures

use super::bcd::decode_bcd;
use super::types::Endianness;
use nom::{
    bytes::complete::{take, take_till},
    combinator::{map, map_res},
    number::complete::u8 as byte,
    sequence::terminated,
    IResult, Parser,
};

/// Parse a packed BCD value of `num_bytes` bytes
pub fn parse_bcd<'a>(
    num_bytes: usize,
    endianness: Endianness,
) -> impl Parser<&'a [u8], Output = u64, Error = nom::error::Error<&'a [u8]>> {
    map_res(take(num_bytes), move |bytes: &[u8]| {
        decode_bcd(bytes, endianness)
    })
}

/// Parse a null-terminated single-byte string (Latin-1) of any length
pub fn parse_cstring(input: &[u8]) -> IResult<&[u8], String> {
    map(
        terminated(take_till(|b| b == 0), take(1usize)),
        |bytes: &[u8]| bytes.iter().map(|&b| b as char).collect(),
    )
    .parse(input)
}

/// Parse a single byte
pub fn parse_byte(input: &[u8]) -> IResult<&[u8], u8> {
    byte(input)
}
