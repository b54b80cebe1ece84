// Image file format for multi-bank sparse memory images
//
// Layout: u32 element count, then per element u32 bank, u32 address,
// u32 size and the data (all integers little-endian). An optional
// metadata block follows: MAGIC and base64-encoded JSON.

use super::metadata::Metadata;
use crate::memmap::{ImageElement, ImageError, MemoryImage};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use nom::multi::{count, length_data};
use nom::number::complete::le_u32;
use nom::{IResult, Parser};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ImgError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode metadata: {0}")]
    MetadataDecode(String),

    #[error("Failed to parse metadata JSON: {0}")]
    MetadataJson(#[from] serde_json::Error),

    #[error("Failed to decode base64 metadata: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    #[error("Image container is truncated or malformed")]
    Truncated,

    #[error("Bank {0} exceeds the supported number of banks")]
    InvalidBank(u32),

    #[error("Invalid image: {0}")]
    Image(#[from] ImageError),
}

pub type Result<T> = std::result::Result<T, ImgError>;

/// Separates the element container from the metadata
pub const MAGIC: &[u8] = b"\x00\xffdmrcp\xeeimg\x00\x01";

pub const MAX_BANKS: u32 = 16;

/// Serialize images (index = bank) and metadata into a byte buffer
pub fn to_bytes(images: &[MemoryImage], metadata: &Metadata) -> Result<Vec<u8>> {
    let num_elements: usize = images.iter().map(|image| image.num_elements()).sum();
    let mut out = Vec::with_capacity(
        4 + images.iter().map(|i| i.total_size()).sum::<usize>() + 12 * num_elements,
    );
    out.extend_from_slice(&(num_elements as u32).to_le_bytes());
    for (bank, image) in images.iter().enumerate() {
        let mut elements: Vec<_> = image.elements().collect();
        elements.sort_by_key(|el| el.address());
        for element in elements {
            out.extend_from_slice(&(bank as u32).to_le_bytes());
            out.extend_from_slice(&element.address().to_le_bytes());
            out.extend_from_slice(&(element.size() as u32).to_le_bytes());
            out.extend_from_slice(element.data());
        }
    }

    out.extend_from_slice(MAGIC);
    let metadata_json = metadata.to_json()?;
    out.extend_from_slice(STANDARD.encode(metadata_json.as_bytes()).as_bytes());
    Ok(out)
}

fn parse_element(input: &[u8]) -> IResult<&[u8], (u32, u32, &[u8])> {
    (le_u32, le_u32, length_data(le_u32)).parse(input)
}

fn parse_container(input: &[u8]) -> IResult<&[u8], Vec<(u32, u32, &[u8])>> {
    let (rest, n) = le_u32(input)?;
    count(parse_element, n as usize).parse(rest)
}

/// Restore images and metadata from a byte buffer
pub fn from_bytes(data: &[u8]) -> Result<(Vec<MemoryImage>, Metadata)> {
    let (rest, elements) = parse_container(data).map_err(|_| ImgError::Truncated)?;

    let mut images = vec![MemoryImage::new()];
    for (bank, address, bytes) in elements {
        if bank >= MAX_BANKS {
            return Err(ImgError::InvalidBank(bank));
        }
        let bank = bank as usize;
        if images.len() <= bank {
            images.resize_with(bank + 1, MemoryImage::new);
        }
        debug!("Loaded element {:#010x}+{:#x} of bank {}", address, bytes.len(), bank);
        images[bank].insert(ImageElement::with_data(address, bytes.to_vec()))?;
    }
    for image in &mut images {
        image.sort();
    }

    let metadata = if rest.is_empty() {
        Metadata::default()
    } else {
        let encoded = rest.strip_prefix(MAGIC).ok_or(ImgError::Truncated)?;
        decode_metadata(encoded)?
    };
    Ok((images, metadata))
}

/// Load an image file
pub fn load_img(filename: impl AsRef<Path>) -> Result<(Vec<MemoryImage>, Metadata)> {
    let mut file = File::open(filename)?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)?;
    from_bytes(&data)
}

/// Save images and metadata to a file
pub fn save_img(
    filename: impl AsRef<Path>,
    images: &[MemoryImage],
    metadata: &Metadata,
) -> Result<()> {
    let data = to_bytes(images, metadata)?;
    let mut file = File::create(filename)?;
    file.write_all(&data)?;
    Ok(())
}

fn decode_metadata(encoded: &[u8]) -> Result<Metadata> {
    let decoded = STANDARD.decode(encoded)?;
    let json_str =
        String::from_utf8(decoded).map_err(|e| ImgError::MetadataDecode(e.to_string()))?;
    Ok(Metadata::from_json(&json_str)?)
}
