// Encryption keys (key material only, no cryptography)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyMaterial {
    /// 16 bit basic DMR privacy key
    Dmr([u8; 2]),
    /// 128 bit AES key
    Aes([u8; 16]),
}

impl KeyMaterial {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            KeyMaterial::Dmr(k) => k,
            KeyMaterial::Aes(k) => k,
        }
    }

    pub fn to_hex(&self) -> String {
        self.as_bytes().iter().map(|b| format!("{:02X}", b)).collect()
    }

    /// Parse 4 hex digits as a DMR key or 32 hex digits as an AES key
    pub fn from_hex(hex: &str) -> Option<Self> {
        let bytes = hex_to_bytes(hex)?;
        match bytes.len() {
            2 => Some(KeyMaterial::Dmr([bytes[0], bytes[1]])),
            16 => {
                let mut key = [0u8; 16];
                key.copy_from_slice(&bytes);
                Some(KeyMaterial::Aes(key))
            }
            _ => None,
        }
    }
}

fn hex_to_bytes(hex: &str) -> Option<Vec<u8>> {
    let hex = hex.trim();
    if hex.len() % 2 != 0 || !hex.is_ascii() {
        return None;
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncryptionKey {
    pub name: String,
    pub material: KeyMaterial,
}

impl EncryptionKey {
    pub fn new(name: impl Into<String>, material: KeyMaterial) -> Self {
        Self {
            name: name.into(),
            material,
        }
    }

    /// Replace the key from a hex string of the same kind; returns false if rejected
    pub fn set_hex(&mut self, hex: &str) -> bool {
        match (KeyMaterial::from_hex(hex), self.material) {
            (Some(m @ KeyMaterial::Dmr(_)), KeyMaterial::Dmr(_))
            | (Some(m @ KeyMaterial::Aes(_)), KeyMaterial::Aes(_)) => {
                let changed = m != self.material;
                self.material = m;
                changed
            }
            _ => false,
        }
    }

    pub fn is_aes(&self) -> bool {
        matches!(self.material, KeyMaterial::Aes(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        let dmr = KeyMaterial::from_hex("12aB").unwrap();
        assert_eq!(dmr, KeyMaterial::Dmr([0x12, 0xab]));
        assert_eq!(dmr.to_hex(), "12AB");

        let aes = KeyMaterial::from_hex("000102030405060708090A0B0C0D0E0F").unwrap();
        assert!(matches!(aes, KeyMaterial::Aes(k) if k[15] == 0x0f));
        assert_eq!(aes.to_hex(), "000102030405060708090A0B0C0D0E0F");
    }

    #[test]
    fn test_invalid_hex() {
        assert!(KeyMaterial::from_hex("123").is_none());
        assert!(KeyMaterial::from_hex("zz00").is_none());
        assert!(KeyMaterial::from_hex("123456").is_none());
    }

    #[test]
    fn test_set_hex_keeps_kind() {
        let mut key = EncryptionKey::new("Basic", KeyMaterial::Dmr([0, 1]));
        assert!(key.set_hex("BEEF"));
        assert!(!key.set_hex("BEEF"));
        assert!(!key.set_hex("000102030405060708090A0B0C0D0E0F"));
        assert_eq!(key.material.to_hex(), "BEEF");
        assert!(!key.is_aes());
    }
}
