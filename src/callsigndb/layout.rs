// Memory layout of the callsign database

/// Bank geometry of a callsign database.
///
/// Index and entry data live in banks of fixed size that are spaced
/// further apart than their size. Entry offsets stored in the index are
/// virtual: they count bytes as if the entry banks were contiguous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallsignDbLayout {
    pub name: &'static str,
    pub max_entries: usize,
    pub index_bank0: u32,
    pub index_bank_offset: u32,
    pub index_bank_size: u32,
    pub bank0: u32,
    pub bank_offset: u32,
    pub bank_size: u32,
    pub limits: u32,
}

/// Size of the limits record
pub const LIMITS_SIZE: usize = 0x10;

/// Size of an index entry: BCD ID and virtual entry offset
pub const INDEX_ENTRY_SIZE: usize = 8;

/// AnyTone AT-D868UV, AT-D878UV, AT-D578UV and BTECH DMR-6X2UV
pub static ANYTONE: CallsignDbLayout = CallsignDbLayout {
    name: "AnyTone",
    max_entries: 200_000,
    index_bank0: 0x0400_0000,
    index_bank_offset: 0x0004_0000,
    index_bank_size: 0x0001_f400,
    bank0: 0x0450_0000,
    bank_offset: 0x0004_0000,
    bank_size: 0x0001_86a0,
    limits: 0x044c_0000,
};

/// Round `size` up to a multiple of `align`
pub fn align_size(size: usize, align: usize) -> usize {
    size.div_ceil(align) * align
}

impl CallsignDbLayout {
    /// Physical address of virtual entry offset `offset`
    pub fn entry_address(&self, offset: u32) -> u32 {
        self.bank0 + (offset / self.bank_size) * self.bank_offset + offset % self.bank_size
    }

    /// Physical address of index entry `n`
    pub fn index_address(&self, n: usize) -> u32 {
        let offset = (n * INDEX_ENTRY_SIZE) as u32;
        self.index_bank0
            + (offset / self.index_bank_size) * self.index_bank_offset
            + offset % self.index_bank_size
    }

    /// (address, size) of the banks needed for `total` bytes, sizes aligned to 16
    pub fn banks(&self, base: u32, stride: u32, bank_size: u32, total: usize) -> Vec<(u32, usize)> {
        let mut banks = Vec::new();
        let mut remaining = total;
        let mut address = base;
        while remaining > 0 {
            let chunk = remaining.min(bank_size as usize);
            banks.push((address, align_size(chunk, 16)));
            remaining -= chunk;
            address += stride;
        }
        banks
    }

    pub fn index_banks(&self, entries: usize) -> Vec<(u32, usize)> {
        self.banks(
            self.index_bank0,
            self.index_bank_offset,
            self.index_bank_size,
            entries * INDEX_ENTRY_SIZE,
        )
    }

    pub fn entry_banks(&self, total: usize) -> Vec<(u32, usize)> {
        self.banks(self.bank0, self.bank_offset, self.bank_size, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_to_physical() {
        assert_eq!(ANYTONE.entry_address(0), 0x0450_0000);
        assert_eq!(ANYTONE.entry_address(0x186a0 - 1), 0x0450_0000 + 0x186a0 - 1);
        assert_eq!(ANYTONE.entry_address(0x186a0), 0x0454_0000);
        assert_eq!(ANYTONE.entry_address(0x186a0 + 5), 0x0454_0005);
    }

    #[test]
    fn test_index_addresses() {
        assert_eq!(ANYTONE.index_address(1), 0x0400_0008);
        // 16000 index entries per bank
        assert_eq!(ANYTONE.index_address(16_000), 0x0404_0000);
    }

    #[test]
    fn test_bank_allocation() {
        assert!(ANYTONE.entry_banks(0).is_empty());
        assert_eq!(ANYTONE.entry_banks(20), vec![(0x0450_0000, 32)]);
        assert_eq!(
            ANYTONE.entry_banks(0x186a0 + 1),
            vec![(0x0450_0000, 0x186a0), (0x0454_0000, 16)]
        );
        assert_eq!(ANYTONE.index_banks(3), vec![(0x0400_0000, 32)]);
    }

    #[test]
    fn test_align_size() {
        assert_eq!(align_size(0, 16), 0);
        assert_eq!(align_size(1, 16), 16);
        assert_eq!(align_size(32, 16), 32);
    }
}
