// Metadata stored behind the binary part of an image file

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What kind of image a file carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImageKind {
    #[default]
    Codeplug,
    CallsignDb,
}

/// Metadata stored in image files
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Metadata {
    #[serde(default)]
    pub kind: ImageKind,

    /// Vendor name
    #[serde(default)]
    pub vendor: String,

    /// Model name
    #[serde(default)]
    pub model: String,

    /// Version of the tool that wrote the file
    #[serde(default)]
    pub tool_version: String,

    /// Additional properties
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Metadata {
    pub fn new(vendor: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            vendor: vendor.into(),
            model: model.into(),
            tool_version: crate::VERSION.to_string(),
            ..Default::default()
        }
    }

    pub fn with_kind(mut self, kind: ImageKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn set_extra(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.extra.insert(key.into(), value);
    }

    pub fn get_extra(&self, key: &str) -> Option<&serde_json::Value> {
        self.extra.get(key)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_creation() {
        let meta = Metadata::new("TyT", "MD-UV390");
        assert_eq!(meta.vendor, "TyT");
        assert_eq!(meta.kind, ImageKind::Codeplug);
        assert!(!meta.tool_version.is_empty());
    }

    #[test]
    fn test_metadata_serialization() {
        let mut meta = Metadata::new("AnyTone", "AT-D878UV").with_kind(ImageKind::CallsignDb);
        meta.set_extra("entries", serde_json::json!(1234));

        let json = meta.to_json().unwrap();
        assert!(json.contains("\"kind\":\"callsign_db\""));
        let meta2 = Metadata::from_json(&json).unwrap();

        assert_eq!(meta2.model, "AT-D878UV");
        assert_eq!(meta2.kind, ImageKind::CallsignDb);
        assert_eq!(meta2.get_extra("entries"), Some(&serde_json::json!(1234)));
    }

    #[test]
    fn test_missing_fields_default() {
        let meta = Metadata::from_json(r#"{"vendor":"TyT"}"#).unwrap();
        assert_eq!(meta.vendor, "TyT");
        assert!(meta.model.is_empty());
        assert_eq!(meta.kind, ImageKind::Codeplug);
    }
}
