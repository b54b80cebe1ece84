// Transfer of codeplug and callsign DB images to and from a radio
pub mod interface;
pub mod transfer;

#[cfg(test)]
pub mod mock;

pub use interface::RadioInterface;
pub use transfer::{
    download_codeplug, download_in_background, upload_callsign_db, upload_codeplug,
    upload_in_background, BlockTransfer, ProgressCallback, DEFAULT_BLOCK_SIZE,
};

use crate::codeplug::CodeplugError;
use crate::memmap::ImageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Cannot read {len} bytes at 0x{address:08x} of bank {bank}: {reason}")]
    Read {
        bank: u32,
        address: u32,
        len: usize,
        reason: String,
    },

    #[error("Cannot write {len} bytes at 0x{address:08x} of bank {bank}: {reason}")]
    Write {
        bank: u32,
        address: u32,
        len: usize,
        reason: String,
    },

    #[error("Device did not respond")]
    NoResponse,

    #[error("Codeplug error: {0}")]
    Codeplug(#[from] CodeplugError),

    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    #[error("Transfer task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type TransportResult<T> = std::result::Result<T, TransportError>;
