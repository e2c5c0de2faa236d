//! Local key-value store and the color snapshot kept in it.
//!
//! The store is a flat JSON object on disk (`drape_store.json`). The only key
//! written today is [`K_COLORS`]. Unknown or malformed snapshots load as the
//! default colors with a warning; they are never fatal.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::design::GarmentColors;
use super::keys::K_COLORS;

/// Current snapshot layout version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Flat string key -> string value store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: String) -> Result<()>;
}

/// In-memory store (tests, `--dump-materials`).
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    map: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.map.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.map.insert(key.to_string(), value);
        Ok(())
    }
}

/// Store backed by one JSON file, rewritten on every `set`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let text = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read store: {}", self.path.display()))?;
        if text.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse store: {}", self.path.display()))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_map()?.remove(key))
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        // A corrupt file is replaced rather than blocking the save.
        let mut map = self.read_map().unwrap_or_else(|e| {
            warn!("{:#}; starting a fresh store", e);
            BTreeMap::new()
        });
        map.insert(key.to_string(), value);
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let text = serde_json::to_string_pretty(&map)?;
        std::fs::write(&self.path, text)
            .with_context(|| format!("Failed to write store: {}", self.path.display()))?;
        debug!("Store: wrote key '{}' to {}", key, self.path.display());
        Ok(())
    }
}

/// Persisted form of the garment colors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorSnapshot {
    #[serde(default = "default_version")]
    pub version: u32,
    pub colors: GarmentColors,
}

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

/// Read the color snapshot; missing or unreadable data yields `None`.
pub fn load_colors(store: &dyn KeyValueStore) -> Option<GarmentColors> {
    let raw = match store.get(K_COLORS) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!("Color snapshot unavailable: {:#}", e);
            return None;
        }
    };
    match serde_json::from_str::<ColorSnapshot>(&raw) {
        Ok(snapshot) if snapshot.version <= SNAPSHOT_VERSION => Some(snapshot.colors),
        Ok(snapshot) => {
            warn!(
                "Color snapshot version {} is newer than supported {}, ignoring",
                snapshot.version, SNAPSHOT_VERSION
            );
            None
        }
        Err(e) => {
            warn!("Malformed color snapshot, using defaults: {}", e);
            None
        }
    }
}

/// Write the color snapshot.
pub fn save_colors(store: &mut dyn KeyValueStore, colors: &GarmentColors) -> Result<()> {
    let snapshot = ColorSnapshot {
        version: SNAPSHOT_VERSION,
        colors: *colors,
    };
    let raw = serde_json::to_string(&snapshot).context("Failed to serialize color snapshot")?;
    store.set(K_COLORS, raw)
}
