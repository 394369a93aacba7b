//! File-backed key/value storage.
//!
//! Each logical key maps to one JSON document (`<key>.json`) in the data
//! directory. Reads never fail the caller: a missing file, unreadable bytes
//! or undeserializable JSON all come back as `None`, so corrupt or foreign
//! data never poisons the in-memory state built on top of it.

use std::fs;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to serialize record {key}: {source}")]
    Serialize {
        key: String,
        source: serde_json::Error,
    },

    #[error("failed to write record {key}: {source}")]
    Write {
        key: String,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct KvStore {
    dir: PathBuf,
}

impl KvStore {
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        if let Err(e) = fs::create_dir_all(&dir) {
            tracing::warn!("could not create data dir {}: {e}", dir.display());
        }
        Self { dir }
    }

    pub(crate) fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = fs::read(self.path_for(key)).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    pub fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(value).map_err(|source| StorageError::Serialize {
            key: key.to_string(),
            source,
        })?;

        fs::write(self.path_for(key), bytes).map_err(|source| StorageError::Write {
            key: key.to_string(),
            source,
        })
    }
}
