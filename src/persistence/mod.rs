//! Fee configuration persistence
//!
//! A string key-value store (the same contract as browser local storage)
//! and a typed layer that keeps one fee set per delivery plan under
//! `<prefix>:<plan slug>`. Each value is a flat JSON object mapping fee
//! names to percentages.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{PricingError, Result};
use crate::types::{DeliveryPlan, FeeSet};

pub const DEFAULT_KEY_PREFIX: &str = "delivery-pricing";

/// Key under which a plan's fee set is stored
pub fn storage_key(prefix: &str, plan: DeliveryPlan) -> String {
    format!("{}:{}", prefix, plan.slug())
}

/// String key-value store
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
    fn keys(&self) -> Result<Vec<String>>;
}

/// Volatile store, used by tests and one-off quotes
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self.entries.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

/// Store backed by a single JSON object file.
///
/// The file is read once on open and rewritten (temp file + rename) after
/// every mutation. A missing file is an empty store.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let json = fs::read_to_string(&path)?;
            if json.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&json).map_err(|e| {
                    PricingError::Store(format!("{} is not a JSON object: {}", path.display(), e))
                })?
            }
        } else {
            BTreeMap::new()
        };

        info!("📂 Fee store opened at {} ({} keys)", path.display(), entries.len());
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        debug!("Fee store flushed to {}", self.path.display());
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }
}

/// Typed fee-set access on top of a [`KeyValueStore`]
#[derive(Debug)]
pub struct FeeStore<S> {
    store: S,
    prefix: String,
}

impl<S: KeyValueStore> FeeStore<S> {
    pub fn new(store: S, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn key_for(&self, plan: DeliveryPlan) -> String {
        storage_key(&self.prefix, plan)
    }

    /// Persisted fee set for a plan, `None` when nothing is saved
    pub fn load(&self, plan: DeliveryPlan) -> Result<Option<FeeSet>> {
        let key = self.key_for(plan);
        match self.store.get(&key)? {
            Some(raw) => {
                let fees: FeeSet = serde_json::from_str(&raw).map_err(|e| {
                    PricingError::Store(format!("value under {} is not a fee map: {}", key, e))
                })?;
                Ok(Some(fees))
            }
            None => Ok(None),
        }
    }

    pub fn save(&mut self, plan: DeliveryPlan, fees: &FeeSet) -> Result<()> {
        let key = self.key_for(plan);
        let raw = serde_json::to_string(fees)?;
        self.store.set(&key, &raw)?;
        info!("💾 Saved {} fees under {}", fees.len(), key);
        Ok(())
    }

    pub fn clear(&mut self, plan: DeliveryPlan) -> Result<()> {
        self.store.remove(&self.key_for(plan))
    }

    /// Every key in the underlying store, including foreign ones
    pub fn keys(&self) -> Result<Vec<String>> {
        self.store.keys()
    }

    pub fn inner(&self) -> &S {
        &self.store
    }
}
