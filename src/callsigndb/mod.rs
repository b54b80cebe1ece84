// Callsign database codec
//
// The radio keeps a sorted ID index in one set of banks and the variable
// sized user entries in another. Entries are addressed by virtual offsets
// that ignore the gaps between entry banks.

pub mod entry;
pub mod layout;
pub mod users;

pub use entry::{encode_entry, entry_size, parse_entry, Limits};
pub use layout::{CallsignDbLayout, ANYTONE};
pub use users::{User, UserDatabase};

use crate::bitwise::{BcdError, ElementError};
use crate::memmap::{ImageError, MemoryImage};
use entry::{encode_index_entry, parse_index_entry, MAX_ENTRY_SIZE};
use layout::{INDEX_ENTRY_SIZE, LIMITS_SIZE};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, trace};

#[derive(Error, Debug)]
pub enum CallsignDbError {
    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    #[error("Element error: {0}")]
    Element(#[from] ElementError),

    #[error("BCD error: {0}")]
    Bcd(#[from] BcdError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed {what} at 0x{address:08x}")]
    Malformed { what: &'static str, address: u32 },
}

pub type Result<T> = std::result::Result<T, CallsignDbError>;

/// Which users go into the database
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selection {
    /// Upper bound on the number of entries, below the device maximum
    pub limit: Option<usize>,
}

impl Selection {
    pub fn with_limit(limit: usize) -> Self {
        Self { limit: Some(limit) }
    }
}

/// Callsign database image of one device
#[derive(Debug)]
pub struct CallsignDb {
    layout: &'static CallsignDbLayout,
    image: MemoryImage,
}

impl CallsignDb {
    pub fn new(layout: &'static CallsignDbLayout) -> Self {
        Self {
            layout,
            image: MemoryImage::new(),
        }
    }

    pub fn from_image(layout: &'static CallsignDbLayout, image: MemoryImage) -> Self {
        Self { layout, image }
    }

    pub fn layout(&self) -> &'static CallsignDbLayout {
        self.layout
    }

    pub fn image(&self) -> &MemoryImage {
        &self.image
    }

    pub fn into_image(self) -> MemoryImage {
        self.image
    }

    /// Encode the first users of `db` selected by `selection`, sorted by ID.
    /// Returns the number of entries written.
    pub fn encode(&mut self, db: &UserDatabase, selection: &Selection) -> Result<usize> {
        let layout = self.layout;
        let n = db
            .len()
            .min(layout.max_entries)
            .min(selection.limit.unwrap_or(usize::MAX));

        let mut users: Vec<&User> = db.iter().take(n).collect();
        users.sort_by_key(|u| u.id);

        let sizes: Vec<usize> = users.iter().map(|u| entry_size(u)).collect();
        let total: usize = sizes.iter().sum();

        let mut image = MemoryImage::new();
        image.add_element(layout.limits, LIMITS_SIZE)?;
        let limits = Limits {
            count: n as u32,
            end_of_db: layout.bank0 + total as u32,
        };
        image
            .data_mut(layout.limits, LIMITS_SIZE)?
            .copy_from_slice(&limits.encode()?);

        for (address, size) in layout.index_banks(n) {
            image.add_element(address, size)?;
            image.data_mut(address, size)?.fill(0xff);
        }
        for (address, size) in layout.entry_banks(total) {
            image.add_element(address, size)?;
            image.data_mut(address, size)?.fill(0x00);
        }
        debug!(
            "Allocated callsign DB: {} entries, {} bytes of entry data",
            n, total
        );

        let mut offset: u32 = 0;
        for (i, (user, size)) in users.iter().zip(&sizes).enumerate() {
            let index = encode_index_entry(user.id, offset)?;
            image
                .data_mut(layout.index_address(i), INDEX_ENTRY_SIZE)?
                .copy_from_slice(&index);

            let bytes = encode_entry(user)?;
            let room = (layout.bank_size - offset % layout.bank_size) as usize;
            let first = bytes.len().min(room);
            image
                .data_mut(layout.entry_address(offset), first)?
                .copy_from_slice(&bytes[..first]);
            if first < bytes.len() {
                let next = offset + first as u32;
                trace!(
                    "Entry {} (ID {}) split at bank boundary 0x{:08x}",
                    i,
                    user.id,
                    layout.entry_address(next)
                );
                image
                    .data_mut(layout.entry_address(next), bytes.len() - first)?
                    .copy_from_slice(&bytes[first..]);
            }
            offset += *size as u32;
        }

        image.sort();
        self.image = image;
        info!("Encoded {} callsign DB with {} entries", layout.name, n);
        Ok(n)
    }

    /// Read `len` bytes of entry data at virtual `offset`, across bank gaps
    fn read_virtual(&self, offset: u32, len: usize) -> Result<Vec<u8>> {
        let layout = self.layout;
        let mut out = Vec::with_capacity(len);
        let mut offset = offset;
        while out.len() < len {
            let room = (layout.bank_size - offset % layout.bank_size) as usize;
            let chunk = room.min(len - out.len());
            out.extend_from_slice(self.image.data(layout.entry_address(offset), chunk)?);
            offset += chunk as u32;
        }
        Ok(out)
    }

    /// Decode all entries, in index order
    pub fn decode(&self) -> Result<Vec<User>> {
        let layout = self.layout;
        let malformed = |what, address| CallsignDbError::Malformed { what, address };

        let (_, limits) = Limits::parse(self.image.data(layout.limits, LIMITS_SIZE)?)
            .map_err(|_| malformed("limits record", layout.limits))?;
        let total = limits.end_of_db.saturating_sub(layout.bank0);

        let mut users = Vec::with_capacity(limits.count as usize);
        for i in 0..limits.count as usize {
            let address = layout.index_address(i);
            let (_, (id, offset)) = parse_index_entry(self.image.data(address, INDEX_ENTRY_SIZE)?)
                .map_err(|_| malformed("index entry", address))?;

            let len = MAX_ENTRY_SIZE.min(total.saturating_sub(offset) as usize);
            let bytes = self.read_virtual(offset, len)?;
            let entry_address = layout.entry_address(offset);
            let (_, user) =
                parse_entry(&bytes).map_err(|_| malformed("entry", entry_address))?;
            if user.id != id {
                return Err(malformed("entry", entry_address));
            }
            users.push(user);
        }
        debug!("Decoded {} callsign DB entries", users.len());
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitwise::read_u32_le;

    fn user(id: u32, call: &str) -> User {
        User {
            id,
            call: call.to_string(),
            name: format!("Op {}", call),
            city: "Berlin".to_string(),
            state: "BE".to_string(),
            country: "Germany".to_string(),
        }
    }

    #[test]
    fn test_entries_sorted_by_id() {
        let mut db = UserDatabase::new();
        db.add(user(100, "DL1AAA"));
        db.add(user(5, "DL1BBB"));

        let mut cdb = CallsignDb::new(&ANYTONE);
        assert_eq!(cdb.encode(&db, &Selection::default()).unwrap(), 2);

        let index = cdb.image().data(ANYTONE.index_bank0, 16).unwrap();
        assert_eq!(index[..4], [0x05, 0x00, 0x00, 0x00]);
        assert_eq!(index[8..12], [0x00, 0x01, 0x00, 0x00]);
        // second entry starts right after the first
        let first_size = entry_size(&user(5, "DL1BBB")) as u32;
        assert_eq!(read_u32_le(&index[12..]).unwrap(), first_size);

        let decoded = cdb.decode().unwrap();
        assert_eq!(decoded[0].call, "DL1BBB");
        assert_eq!(decoded[1].call, "DL1AAA");
    }

    #[test]
    fn test_limits_record() {
        let mut db = UserDatabase::new();
        db.add(user(1, "A"));
        db.add(user(2, "B"));
        db.add(user(3, "C"));
        db.add(user(4, "D"));
        let mut cdb = CallsignDb::new(&ANYTONE);
        cdb.encode(&db, &Selection::with_limit(3)).unwrap();

        let limits = cdb.image().data(ANYTONE.limits, LIMITS_SIZE).unwrap();
        let total: usize = db.iter().take(3).map(entry_size).sum();
        assert_eq!(read_u32_le(&limits[0..4]).unwrap(), 3);
        assert_eq!(
            read_u32_le(&limits[4..8]).unwrap(),
            ANYTONE.bank0 + total as u32
        );
        // index banks are 0xff padded
        let index = cdb.image().data(ANYTONE.index_bank0, 32).unwrap();
        assert_eq!(index[24..], [0xff; 8]);
    }

    #[test]
    fn test_entry_split_across_banks() {
        let mut db = UserDatabase::new();
        let mut n = 0u32;
        let mut total = 0usize;
        while total <= ANYTONE.bank_size as usize {
            let u = user(1000 + n, &format!("C{}", n));
            total += entry_size(&u);
            db.add(u);
            n += 1;
        }
        let mut cdb = CallsignDb::new(&ANYTONE);
        cdb.encode(&db, &Selection::default()).unwrap();
        assert!(cdb.image().data(0x0454_0000, 16).is_ok());

        // find the entry that straddles the boundary and rebuild it from both banks
        let bank_size = ANYTONE.bank_size as usize;
        let mut offset = 0usize;
        for u in db.iter() {
            let size = entry_size(u);
            if offset < bank_size && offset + size > bank_size {
                let head = bank_size - offset;
                let mut bytes = cdb
                    .image()
                    .data(ANYTONE.entry_address(offset as u32), head)
                    .unwrap()
                    .to_vec();
                bytes.extend_from_slice(cdb.image().data(0x0454_0000, size - head).unwrap());
                assert_eq!(bytes, encode_entry(u).unwrap());
            }
            offset += size;
        }

        let decoded = cdb.decode().unwrap();
        assert_eq!(decoded.len(), db.len());
        assert_eq!(decoded.last(), db.iter().last());
    }

    #[test]
    fn test_virtual_offsets_are_gap_free() {
        let mut db = UserDatabase::new();
        for id in 1..=10 {
            db.add(user(id, &format!("X{}", id)));
        }
        let mut cdb = CallsignDb::new(&ANYTONE);
        cdb.encode(&db, &Selection::default()).unwrap();

        let mut expected = 0u32;
        for (i, u) in db.iter().enumerate() {
            let index = cdb.image().data(ANYTONE.index_address(i), 8).unwrap();
            assert_eq!(read_u32_le(&index[4..]).unwrap(), expected);
            expected += entry_size(u) as u32;
        }
    }

    #[test]
    fn test_empty_database() {
        let mut cdb = CallsignDb::new(&ANYTONE);
        assert_eq!(cdb.encode(&UserDatabase::new(), &Selection::default()).unwrap(), 0);
        assert_eq!(cdb.image().num_elements(), 1);
        assert!(cdb.decode().unwrap().is_empty());
    }
}
