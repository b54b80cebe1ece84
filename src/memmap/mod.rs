// Sparse memory images holding codeplug binary data
pub mod image;

pub use image::{ImageElement, ImageError, MemoryImage};
