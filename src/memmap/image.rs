// Sparse memory image of a radio's address space
//
// A codeplug rarely covers the whole device memory. An image is a set of
// non-overlapping elements, each a contiguous byte buffer at an absolute
// device address. Transfers iterate the elements in address order.

use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Address {0:#010x} not found in any image element")]
    AddressNotFound(u32),

    #[error("Element {address:#010x}+{size:#x} overlaps element at {existing:#010x}")]
    Overlap {
        address: u32,
        size: usize,
        existing: u32,
    },

    #[error("Range {address:#010x}+{len:#x} runs past the end of its element")]
    OutOfBounds { address: u32, len: usize },
}

pub type Result<T> = std::result::Result<T, ImageError>;

/// One contiguous region of an image
#[derive(Debug, Clone, PartialEq)]
pub struct ImageElement {
    address: u32,
    data: Vec<u8>,
}

impl ImageElement {
    /// Create a zero-filled element
    pub fn new(address: u32, size: usize) -> Self {
        Self {
            address,
            data: vec![0u8; size],
        }
    }

    /// Create an element from existing bytes
    pub fn with_data(address: u32, data: Vec<u8>) -> Self {
        Self { address, data }
    }

    pub fn address(&self) -> u32 {
        self.address
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// One past the last address covered by this element
    pub fn end(&self) -> u64 {
        self.address as u64 + self.data.len() as u64
    }

    pub fn contains(&self, address: u32) -> bool {
        address >= self.address && (address as u64) < self.end()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Get a printable hex representation of (part of) the element
    pub fn printable(&self, start: Option<usize>, end: Option<usize>) -> String {
        let start = start.unwrap_or(0).min(self.data.len());
        let end = end.unwrap_or(self.data.len()).clamp(start, self.data.len());
        hexdump(self.address as usize + start, &self.data[start..end])
    }
}

/// Sparse memory image made of non-overlapping elements
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryImage {
    elements: Vec<ImageElement>,
}

impl MemoryImage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a zero-filled element of `size` bytes at `address`
    pub fn add_element(&mut self, address: u32, size: usize) -> Result<()> {
        self.insert(ImageElement::new(address, size))
    }

    /// Add an already populated element
    pub fn insert(&mut self, element: ImageElement) -> Result<()> {
        let start = element.address() as u64;
        let end = element.end();
        if let Some(other) = self
            .elements
            .iter()
            .find(|e| start < e.end() && (e.address() as u64) < end)
        {
            return Err(ImageError::Overlap {
                address: element.address(),
                size: element.size(),
                existing: other.address(),
            });
        }
        tracing::debug!(
            "Allocated image element {:#010x}+{:#x}",
            element.address(),
            element.size()
        );
        self.elements.push(element);
        Ok(())
    }

    /// True if `address` lies inside any element
    pub fn is_allocated(&self, address: u32) -> bool {
        self.elements.iter().any(|e| e.contains(address))
    }

    fn locate(&self, address: u32, len: usize) -> Result<(usize, usize)> {
        let index = self
            .elements
            .iter()
            .position(|e| e.contains(address))
            .ok_or(ImageError::AddressNotFound(address))?;
        let element = &self.elements[index];
        let offset = (address - element.address()) as usize;
        if offset + len > element.size() {
            return Err(ImageError::OutOfBounds { address, len });
        }
        Ok((index, offset))
    }

    /// Borrow `len` bytes starting at the absolute `address`
    pub fn data(&self, address: u32, len: usize) -> Result<&[u8]> {
        let (index, offset) = self.locate(address, len)?;
        Ok(&self.elements[index].data()[offset..offset + len])
    }

    /// Mutably borrow `len` bytes starting at the absolute `address`
    pub fn data_mut(&mut self, address: u32, len: usize) -> Result<&mut [u8]> {
        let (index, offset) = self.locate(address, len)?;
        Ok(&mut self.elements[index].data_mut()[offset..offset + len])
    }

    /// Mutable view from `address` to the end of the element containing it
    pub fn data_ptr(&mut self, address: u32) -> Result<&mut [u8]> {
        let (index, offset) = self.locate(address, 0)?;
        Ok(&mut self.elements[index].data_mut()[offset..])
    }

    /// Order elements by ascending address
    pub fn sort(&mut self) {
        self.elements.sort_by_key(|e| e.address());
    }

    pub fn num_elements(&self) -> usize {
        self.elements.len()
    }

    pub fn element(&self, n: usize) -> Option<&ImageElement> {
        self.elements.get(n)
    }

    pub fn element_mut(&mut self, n: usize) -> Option<&mut ImageElement> {
        self.elements.get_mut(n)
    }

    pub fn elements(&self) -> impl Iterator<Item = &ImageElement> {
        self.elements.iter()
    }

    /// Total number of allocated bytes
    pub fn total_size(&self) -> usize {
        self.elements.iter().map(|e| e.size()).sum()
    }

    /// Drop every element
    pub fn clear(&mut self) {
        self.elements.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl fmt::Display for MemoryImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MemoryImage({} elements, {} bytes)",
            self.elements.len(),
            self.total_size()
        )
    }
}

/// Create a hex dump of bytes (similar to hexdump -C), offsets start at `base`
fn hexdump(base: usize, data: &[u8]) -> String {
    let mut output = String::new();

    for (i, chunk) in data.chunks(16).enumerate() {
        output.push_str(&format!("{:08x}  ", base + i * 16));

        for (j, byte) in chunk.iter().enumerate() {
            if j == 8 {
                output.push(' ');
            }
            output.push_str(&format!("{:02x} ", byte));
        }

        for j in chunk.len()..16 {
            if j == 8 {
                output.push(' ');
            }
            output.push_str("   ");
        }

        output.push_str(" |");
        for byte in chunk {
            if (0x20..=0x7e).contains(byte) {
                output.push(*byte as char);
            } else {
                output.push('.');
            }
        }
        output.push_str("|\n");
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_lookup() {
        let mut image = MemoryImage::new();
        image.add_element(0x1000, 0x100).unwrap();
        image.add_element(0x4000, 0x10).unwrap();
        assert_eq!(image.num_elements(), 2);
        assert_eq!(image.total_size(), 0x110);

        image.data_mut(0x1010, 2).unwrap().copy_from_slice(&[0xaa, 0xbb]);
        assert_eq!(image.data(0x1010, 2).unwrap(), &[0xaa, 0xbb]);
        assert_eq!(image.data_ptr(0x10f0).unwrap().len(), 0x10);
        assert!(image.is_allocated(0x400f));
        assert!(!image.is_allocated(0x4010));
    }

    #[test]
    fn test_address_not_found() {
        let mut image = MemoryImage::new();
        image.add_element(0x1000, 0x100).unwrap();
        assert!(matches!(
            image.data_ptr(0x2000),
            Err(ImageError::AddressNotFound(0x2000))
        ));
        assert!(matches!(
            image.data(0x10f0, 0x20),
            Err(ImageError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_overlap_rejected() {
        let mut image = MemoryImage::new();
        image.add_element(0x1000, 0x100).unwrap();
        assert!(image.add_element(0x10ff, 0x10).is_err());
        assert!(image.add_element(0x0f00, 0x101).is_err());
        assert!(image.add_element(0x1100, 0x10).is_ok());
        assert!(image.add_element(0x0f00, 0x100).is_ok());
    }

    #[test]
    fn test_sort() {
        let mut image = MemoryImage::new();
        image.add_element(0x3000, 1).unwrap();
        image.add_element(0x1000, 1).unwrap();
        image.add_element(0x2000, 1).unwrap();
        image.sort();
        let addresses: Vec<u32> = image.elements().map(|e| e.address()).collect();
        assert_eq!(addresses, vec![0x1000, 0x2000, 0x3000]);
    }

    #[test]
    fn test_hexdump() {
        let element = ImageElement::with_data(0x2000, vec![0x00, 0x01, 0x41, 0x42, 0x43]);
        let dump = element.printable(None, None);
        assert!(dump.starts_with("00002000"));
        assert!(dump.contains("41 42 43"));
        assert!(dump.contains("|..ABC|"));
    }
}
