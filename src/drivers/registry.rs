// Device registry: which codeplug and callsign DB layout belongs to which radio

use crate::callsigndb::CallsignDbLayout;
use crate::codeplug::DeviceLayout;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Information about a supported device
#[derive(Debug, Clone)]
pub struct DriverInfo {
    pub vendor: String,
    pub model: String,
    pub description: String,
    pub codeplug: Option<&'static DeviceLayout>,
    pub callsign_db: Option<&'static CallsignDbLayout>,
}

impl DriverInfo {
    pub fn new(
        vendor: impl Into<String>,
        model: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            vendor: vendor.into(),
            model: model.into(),
            description: description.into(),
            codeplug: None,
            callsign_db: None,
        }
    }

    pub fn with_codeplug(mut self, layout: &'static DeviceLayout) -> Self {
        self.codeplug = Some(layout);
        self
    }

    pub fn with_callsign_db(mut self, layout: &'static CallsignDbLayout) -> Self {
        self.callsign_db = Some(layout);
        self
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.vendor, self.model)
    }
}

/// Global driver registry
lazy_static::lazy_static! {
    static ref DRIVER_REGISTRY: Mutex<HashMap<String, DriverInfo>> = Mutex::new(HashMap::new());
}

fn registry() -> MutexGuard<'static, HashMap<String, DriverInfo>> {
    DRIVER_REGISTRY
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn key(vendor: &str, model: &str) -> String {
    format!("{}::{}", vendor, model).to_lowercase()
}

/// Register a driver in the global registry
pub fn register_driver(info: DriverInfo) {
    registry().insert(key(&info.vendor, &info.model), info);
}

/// Get information about a specific driver
pub fn get_driver(vendor: &str, model: &str) -> Option<DriverInfo> {
    registry().get(&key(vendor, model)).cloned()
}

/// Find a driver by model name alone, ignoring case
pub fn find_driver(model: &str) -> Option<DriverInfo> {
    registry()
        .values()
        .find(|info| info.model.eq_ignore_ascii_case(model))
        .cloned()
}

/// List all registered drivers, sorted by vendor and model
pub fn list_drivers() -> Vec<DriverInfo> {
    let mut drivers: Vec<DriverInfo> = registry().values().cloned().collect();
    drivers.sort_by(|a, b| (&a.vendor, &a.model).cmp(&(&b.vendor, &b.model)));
    drivers
}
