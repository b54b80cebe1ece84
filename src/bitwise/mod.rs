// Binary record access: BCD, integers, typed record windows and nom parsers

pub mod bcd;
pub mod elements;
pub mod field;
pub mod parser;
pub mod types;

pub use bcd::{decode_bcd, encode_bcd, BcdError};
pub use elements::{read_u32_le, write_u32_le, ElementError};
pub use field::Element;
pub use parser::{parse_bcd, parse_cstring};
pub use types::Endianness;
