// Codeplug errors

use crate::bitwise::{BcdError, ElementError};
use crate::memmap::ImageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodeplugError {
    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    #[error("Record error: {0}")]
    Element(#[from] ElementError),

    #[error("BCD error: {0}")]
    Bcd(#[from] BcdError),

    #[error("Unknown image bank {0}")]
    InvalidBank(usize),

    #[error("{stack}: cannot encode reference to {kind}, object is not part of the configuration")]
    UnresolvedReference { kind: &'static str, stack: String },

    #[error("{stack}: {count} {kind} exceed the device limit of {max}")]
    Capacity {
        kind: &'static str,
        count: usize,
        max: usize,
        stack: String,
    },

    #[error("Invalid layout: {0}")]
    Layout(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

pub type CodeplugResult<T> = std::result::Result<T, CodeplugError>;
