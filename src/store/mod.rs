//! Flat-file persistence for appliance records and telemetry history
//!
//! Both collections round-trip wholesale through a JSON array file; there is
//! no incremental append format and no schema versioning. A missing file
//! loads as an empty collection, any other failure maps to
//! [`Error::Persistence`] and is recoverable at the call site.

use crate::core::{ApplianceRecord, Error, PushedReading, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Appliance list file name, kept from the legacy dashboard
pub const APPLIANCES_FILE: &str = "data_listrik.json";
/// Pushed telemetry file name, kept from the legacy dashboard
pub const TELEMETRY_FILE: &str = "data_esp32.json";

/// JSON-file store rooted at a data directory
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    /// Store under the platform data directory
    pub fn new() -> Result<Self> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| Error::Persistence("Could not determine data directory".to_string()))?;
        Self::with_dir(data_dir.join("home-energy-monitor"))
    }

    /// Store rooted at an explicit directory
    pub fn with_dir(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the full appliance list
    pub fn save_appliances(&self, records: &[ApplianceRecord]) -> Result<()> {
        self.write_json(APPLIANCES_FILE, records)
    }

    /// Read the full appliance list; empty when the file does not exist yet
    pub fn load_appliances(&self) -> Result<Vec<ApplianceRecord>> {
        self.read_json(APPLIANCES_FILE)
    }

    /// Write the full pushed-telemetry history
    pub fn save_readings(&self, readings: &[PushedReading]) -> Result<()> {
        self.write_json(TELEMETRY_FILE, readings)
    }

    /// Read the full pushed-telemetry history
    pub fn load_readings(&self) -> Result<Vec<PushedReading>> {
        self.read_json(TELEMETRY_FILE)
    }

    fn write_json<T: Serialize>(&self, file: &str, value: &[T]) -> Result<()> {
        let path = self.dir.join(file);
        let content = serde_json::to_string_pretty(value)
            .map_err(|e| Error::Persistence(format!("serialize {}: {}", file, e)))?;
        fs::write(&path, content)
            .map_err(|e| Error::Persistence(format!("write {}: {}", path.display(), e)))?;
        log::debug!("Saved {} entries to {}", value.len(), path.display());
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>> {
        let path = self.dir.join(file);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path)
            .map_err(|e| Error::Persistence(format!("read {}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Persistence(format!("parse {}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Category;

    fn store() -> (tempfile::TempDir, JsonStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::with_dir(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_appliances_round_trip() {
        let (_dir, store) = store();
        let records = vec![
            ApplianceRecord::new("Kulkas", Some(Category::AcPendingin), 150.0, 24.0, 30, 1500.0)
                .unwrap(),
            ApplianceRecord::new("Lampu", Some(Category::Penerangan), 40.0, 6.0, 30, 1500.0)
                .unwrap(),
        ];

        store.save_appliances(&records).unwrap();
        let loaded = store.load_appliances().unwrap();
        assert_eq!(loaded, records);
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let (_dir, store) = store();
        assert!(store.load_appliances().unwrap().is_empty());
        assert!(store.load_readings().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_file_is_persistence_error() {
        let (_dir, store) = store();
        std::fs::write(store.dir().join(APPLIANCES_FILE), "{ not json").unwrap();

        let result = store.load_appliances();
        assert!(matches!(result, Err(Error::Persistence(_))));
    }

    #[test]
    fn test_save_overwrites_wholesale() {
        let (_dir, store) = store();
        let first = vec![ApplianceRecord::new("TV", None, 100.0, 5.0, 30, 1500.0).unwrap()];
        store.save_appliances(&first).unwrap();

        store.save_appliances(&[]).unwrap();
        assert!(store.load_appliances().unwrap().is_empty());
    }
}
