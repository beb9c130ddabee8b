//! Enum-keyed record store.
//!
//! Records are persisted as a JSON document of `{ key, record }` pairs where
//! `key` is the stringified enum name. Keys that no longer name a variant
//! are skipped with a warning on load instead of failing the whole file.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("catalog parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A closed set of stable keys, such as a fieldless enum.
pub trait CatalogKey: Copy + Ord + fmt::Debug + 'static {
    fn all() -> &'static [Self];
    fn name(self) -> &'static str;

    fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|key| key.name() == name)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CatalogRecord<R> {
    key: String,
    record: R,
}

#[derive(Debug, Serialize, Deserialize)]
struct CatalogDocument<R> {
    records: Vec<CatalogRecord<R>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Catalog<K, R> {
    records: BTreeMap<K, R>,
}

impl<K: CatalogKey, R> Default for Catalog<K, R> {
    fn default() -> Self {
        Self {
            records: BTreeMap::new(),
        }
    }
}

impl<K: CatalogKey, R> Catalog<K, R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: K, record: R) -> Option<R> {
        self.records.insert(key, record)
    }

    pub fn get(&self, key: K) -> Option<&R> {
        self.records.get(&key)
    }

    /// Lookup by stringified key. Unknown names are logged and yield `None`.
    pub fn get_by_name(&self, name: &str) -> Option<&R> {
        let Some(key) = K::from_name(name) else {
            tracing::warn!(target: "hexworld::catalog", key = name, "catalog.unknown_key");
            return None;
        };
        self.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (K, &R)> {
        self.records.iter().map(|(key, record)| (*key, record))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Keys from [`CatalogKey::all`] with no record.
    pub fn missing_keys(&self) -> Vec<K> {
        K::all()
            .iter()
            .copied()
            .filter(|key| !self.records.contains_key(key))
            .collect()
    }
}

impl<K, R> Catalog<K, R>
where
    K: CatalogKey,
    R: Serialize + DeserializeOwned + Clone,
{
    pub fn to_json(&self) -> Result<String, CatalogError> {
        let document = CatalogDocument {
            records: self
                .records
                .iter()
                .map(|(key, record)| CatalogRecord {
                    key: key.name().to_string(),
                    record: record.clone(),
                })
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }

    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument<R> = serde_json::from_str(text)?;
        let mut catalog = Self::new();
        for entry in document.records {
            match K::from_name(&entry.key) {
                Some(key) => {
                    catalog.insert(key, entry.record);
                }
                None => {
                    tracing::warn!(
                        target: "hexworld::catalog",
                        key = %entry.key,
                        "catalog.load.skipped_unknown_key"
                    );
                }
            }
        }
        Ok(catalog)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CatalogError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

impl<K: CatalogKey, R> FromIterator<(K, R)> for Catalog<K, R> {
    fn from_iter<I: IntoIterator<Item = (K, R)>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
