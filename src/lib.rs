// DMR-CODEPLUG: codeplug and callsign database codecs for DMR radios

pub mod bitwise;
pub mod callsigndb;
pub mod codeplug;
pub mod config;
pub mod core;
pub mod drivers;
pub mod formats;
pub mod memmap;
pub mod transport;

// Re-export commonly used types
pub use callsigndb::{CallsignDb, CallsignDbError, Selection, User, UserDatabase};
pub use codeplug::{Codeplug, CodeplugError, DeviceLayout, Flags, MD390, UV390};
pub use config::Config;
pub use core::{Message, MessageLog, Severity};
pub use drivers::{find_driver, get_driver, init_drivers, list_drivers, DriverInfo};
pub use formats::{load_img, save_img, ImageKind, Metadata};
pub use memmap::{ImageElement, MemoryImage};
pub use transport::{RadioInterface, TransportError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
