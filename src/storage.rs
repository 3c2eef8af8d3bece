use crate::errors::StorageError;
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, warn};

pub const REMINDERS_KEY: &str = "budgetbuddy_reminders";
pub const NOTIFICATIONS_KEY: &str = "budgetbuddy_notifications";

/// Local key-value store: one JSON array per key, overwritten wholesale on
/// every write. A store without a directory keeps nothing between runs.
#[derive(Debug, Clone, Default)]
pub struct Storage {
    dir: Option<PathBuf>,
}

impl Storage {
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    pub fn in_memory() -> Self {
        Self { dir: None }
    }

    pub fn is_persistent(&self) -> bool {
        self.dir.is_some()
    }

    pub fn path_for(&self, key: &str) -> Option<PathBuf> {
        self.dir.as_ref().map(|dir| dir.join(format!("{key}.json")))
    }

    /// Loads the records stored under `key`, skipping any record that no
    /// longer decodes.
    pub async fn load_records<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let Some(path) = self.path_for(key) else {
            return Vec::new();
        };

        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(err) => {
                error!("failed to read {}: {err}", path.display());
                return Vec::new();
            }
        };

        decode_records(&path, &bytes)
    }

    pub async fn persist<T: Serialize>(&self, key: &str, records: &[T]) -> Result<(), StorageError> {
        let Some(path) = self.path_for(key) else {
            return Ok(());
        };

        let payload = serde_json::to_vec_pretty(records)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, payload).await?;
        Ok(())
    }
}

fn decode_records<T: DeserializeOwned>(path: &Path, bytes: &[u8]) -> Vec<T> {
    let values: Vec<serde_json::Value> = match serde_json::from_slice(bytes) {
        Ok(values) => values,
        Err(err) => {
            error!("failed to parse {}: {err}", path.display());
            return Vec::new();
        }
    };

    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!("skipping record {index} in {}: {err}", path.display());
                None
            }
        })
        .collect()
}

#[cfg(test)]
pub(crate) fn unique_test_dir(label: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!(
        "budget_reminders_{label}_{}_{}",
        std::process::id(),
        nanos
    ));
    path
}
