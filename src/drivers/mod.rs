// Catalogue of supported devices
pub mod registry;

pub use registry::{find_driver, get_driver, list_drivers, register_driver, DriverInfo};

use crate::callsigndb::ANYTONE;
use crate::codeplug::{MD390, UV390};

/// Initialize and register all supported devices
///
/// Must be called once at startup before the registry is queried.
pub fn init_drivers() {
    register_driver(
        DriverInfo::new("TyT", "MD-390", "Single-band DMR handheld").with_codeplug(&MD390),
    );
    // Retevis RT8 is a rebadged MD-390
    register_driver(
        DriverInfo::new("Retevis", "RT8", "Single-band DMR handheld").with_codeplug(&MD390),
    );
    register_driver(
        DriverInfo::new("TyT", "MD-UV390", "Dual-band DMR handheld").with_codeplug(&UV390),
    );
    register_driver(
        DriverInfo::new("Retevis", "RT3S", "Dual-band DMR handheld").with_codeplug(&UV390),
    );

    for (vendor, model, description) in [
        ("AnyTone", "AT-D868UV", "Dual-band DMR handheld"),
        ("AnyTone", "AT-D878UV", "Dual-band DMR handheld with APRS"),
        ("AnyTone", "AT-D578UV", "Dual-band DMR mobile"),
        ("BTECH", "DMR-6X2UV", "Dual-band DMR handheld"),
    ] {
        register_driver(DriverInfo::new(vendor, model, description).with_callsign_db(&ANYTONE));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_drivers() {
        init_drivers();

        let drivers = list_drivers();
        assert!(drivers.len() >= 8, "Expected at least 8 drivers");

        let uv390 = get_driver("TyT", "MD-UV390").unwrap();
        assert_eq!(uv390.codeplug.unwrap().name, UV390.name);
        assert!(uv390.callsign_db.is_none());

        let d878 = get_driver("AnyTone", "AT-D878UV").unwrap();
        assert!(d878.codeplug.is_none());
        assert_eq!(d878.callsign_db.unwrap().max_entries, 200_000);

        let vendors: std::collections::HashSet<String> =
            drivers.iter().map(|d| d.vendor.clone()).collect();
        assert!(vendors.contains("TyT"));
        assert!(vendors.contains("BTECH"));
    }
}
