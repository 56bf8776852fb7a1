//! The manually curated address correction table.
//!
//! On disk the table is `{"mappings": {"<raw location text>": {...}}}`. A
//! missing or malformed file never stops a run: it degrades to an empty
//! table with a log line.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use markt_core::AddressMapping;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct MappingFile {
    #[serde(default)]
    mappings: BTreeMap<String, AddressMapping>,
}

/// Lookup table from exact raw location text to its correction.
#[derive(Debug, Clone, Default)]
pub struct AddressMappings {
    entries: BTreeMap<String, AddressMapping>,
}

impl AddressMappings {
    #[must_use]
    pub fn new(entries: BTreeMap<String, AddressMapping>) -> Self {
        Self { entries }
    }

    /// Parses the JSON mapping document.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error when `json` is not a valid
    /// mapping document.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let file: MappingFile = serde_json::from_str(json)?;
        Ok(Self::new(file.mappings))
    }

    /// Loads the table from `path`, falling back to an empty table when the
    /// file is absent, unreadable or not valid JSON.
    #[must_use]
    pub fn load_or_empty(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "no address mappings file found, using empty table");
                return Self::default();
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "could not read address mappings, using empty table");
                return Self::default();
            }
        };

        match Self::from_json_str(&raw) {
            Ok(table) => {
                tracing::info!(path = %path.display(), count = table.len(), "loaded address mappings");
                table
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "invalid JSON in address mappings, using empty table");
                Self::default()
            }
        }
    }

    #[must_use]
    pub fn get(&self, location_key: &str) -> Option<&AddressMapping> {
        self.entries.get(location_key)
    }

    #[must_use]
    pub fn contains(&self, location_key: &str) -> bool {
        self.entries.contains_key(location_key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AddressMapping)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "mappings": {
            "Evenementenhal\nHallenweg 1\nGorinchem": {
                "corrected_address": "Franklinweg 2, 4207 HX Gorinchem",
                "venue": "Evenementenhal Gorinchem",
                "location_address": "Franklinweg 2",
                "postal_code": "4207 HX",
                "city": "Gorinchem",
                "note": "Postcode missing on site"
            }
        }
    }"#;

    #[test]
    fn parses_mapping_document() {
        let table = AddressMappings::from_json_str(SAMPLE).unwrap();
        assert_eq!(table.len(), 1);
        let mapping = table.get("Evenementenhal\nHallenweg 1\nGorinchem").unwrap();
        assert_eq!(mapping.corrected_address, "Franklinweg 2, 4207 HX Gorinchem");
        assert_eq!(mapping.street.as_deref(), Some("Franklinweg 2"));
        assert_eq!(mapping.note.as_deref(), Some("Postcode missing on site"));
    }

    #[test]
    fn document_without_mappings_key_is_empty() {
        let table = AddressMappings::from_json_str("{}").unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(AddressMappings::from_json_str("{\"mappings\": [").is_err());
    }

    #[test]
    fn missing_file_loads_as_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let table = AddressMappings::load_or_empty(&dir.path().join("address_mappings.json"));
        assert!(table.is_empty());
    }

    #[test]
    fn malformed_file_loads_as_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("address_mappings.json");
        std::fs::write(&path, "not json at all").unwrap();
        let table = AddressMappings::load_or_empty(&path);
        assert!(table.is_empty());
    }

    #[test]
    fn valid_file_loads_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("address_mappings.json");
        std::fs::write(&path, SAMPLE).unwrap();
        let table = AddressMappings::load_or_empty(&path);
        assert!(table.contains("Evenementenhal\nHallenweg 1\nGorinchem"));
    }
}
