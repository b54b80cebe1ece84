// Integer reading/writing helpers for raw byte buffers

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ElementError {
    #[error("Insufficient data: expected {expected} bytes, got {actual}")]
    InsufficientData { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, ElementError>;

fn check_len(data: &[u8], expected: usize) -> Result<()> {
    if data.len() < expected {
        return Err(ElementError::InsufficientData {
            expected,
            actual: data.len(),
        });
    }
    Ok(())
}

/// Read a u32 in little-endian format
pub fn read_u32_le(data: &[u8]) -> Result<u32> {
    check_len(data, 4)?;
    Ok(u32::from_le_bytes([data[0], data[1], data[2], data[3]]))
}

/// Write a u32 in little-endian format
pub fn write_u32_le(data: &mut [u8], value: u32) -> Result<()> {
    check_len(data, 4)?;
    data[..4].copy_from_slice(&value.to_le_bytes());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_write_le() {
        let mut buf = [0u8; 4];
        write_u32_le(&mut buf, 0x04500000).unwrap();
        assert_eq!(buf, [0x00, 0x00, 0x50, 0x04]);
        assert_eq!(read_u32_le(&buf).unwrap(), 0x04500000);
    }

    #[test]
    fn test_insufficient_data() {
        assert!(read_u32_le(&[1, 2, 3]).is_err());
        let mut short = [0u8; 3];
        assert!(write_u32_le(&mut short, 1).is_err());
    }
}
