// Common type definitions for binary record access

use serde::{Deserialize, Serialize};

/// Byte order of multi-byte fields (integers and packed BCD)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Endianness {
    Big,
    #[default]
    Little,
}

impl Endianness {
    pub fn is_big(&self) -> bool {
        matches!(self, Endianness::Big)
    }

    pub fn is_little(&self) -> bool {
        matches!(self, Endianness::Little)
    }

    /// Arrange `bytes` (given most significant first) in this byte order
    pub fn arrange(&self, bytes: &mut [u8]) {
        if self.is_little() {
            bytes.reverse();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_little() {
        assert!(Endianness::default().is_little());
        assert!(Endianness::Big.is_big());
    }

    #[test]
    fn test_arrange() {
        let mut bytes = [0x12, 0x34, 0x56];
        Endianness::Big.arrange(&mut bytes);
        assert_eq!(bytes, [0x12, 0x34, 0x56]);
        Endianness::Little.arrange(&mut bytes);
        assert_eq!(bytes, [0x56, 0x34, 0x12]);
    }
}
