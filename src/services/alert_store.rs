//! Durable price-alert store.
//!
//! One process-wide mapping `coin id -> target price (USD)`, hydrated once
//! from the `price_alerts` record and written back after every mutation.
//! Entries that fail the positive-finite invariant on load are dropped
//! rather than surfaced, and persistence failures leave the in-memory
//! mapping authoritative for the rest of the process.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::storage::KvStore;

pub const ALERTS_KEY: &str = "price_alerts";

#[derive(Debug, Error, PartialEq)]
pub enum AlertValidationError {
    #[error("coin id must not be empty")]
    EmptyId,

    #[error("target price must be a positive number")]
    InvalidTarget,
}

/// Canonical form of a coin identifier: trimmed, lowercase.
/// An empty result means the input was invalid/absent.
pub fn normalize_id(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[derive(Clone)]
pub struct AlertStore {
    kv: KvStore,
    inner: Arc<Mutex<HashMap<String, f64>>>,
}

impl AlertStore {
    pub fn open(kv: KvStore) -> Self {
        let loaded = load(&kv);
        Self {
            kv,
            inner: Arc::new(Mutex::new(loaded)),
        }
    }

    /// Register or overwrite the alert for a coin. Invalid input is rejected
    /// before the mapping is touched and is never persisted.
    pub fn set(&self, raw_id: &str, target: f64) -> Result<(), AlertValidationError> {
        let id = normalize_id(raw_id);
        if id.is_empty() {
            return Err(AlertValidationError::EmptyId);
        }
        if !target.is_finite() || target <= 0.0 {
            return Err(AlertValidationError::InvalidTarget);
        }

        let mut map = self.inner.lock().unwrap();
        map.insert(id, target);
        self.persist(&map);
        Ok(())
    }

    pub fn target(&self, raw_id: &str) -> Option<f64> {
        let id = normalize_id(raw_id);
        self.inner.lock().unwrap().get(&id).copied()
    }

    pub fn remove(&self, raw_id: &str) -> bool {
        let id = normalize_id(raw_id);
        let mut map = self.inner.lock().unwrap();
        let removed = map.remove(&id).is_some();
        if removed {
            self.persist(&map);
        }
        removed
    }

    /// Remove a batch of triggered ids with a single write-back.
    ///
    /// This is a set-difference against the mapping as it is *now*, not an
    /// overwrite with a snapshot taken before the price query, so an alert
    /// registered for a different coin while the query was in flight
    /// survives untouched.
    pub fn remove_all(&self, raw_ids: &[String]) {
        if raw_ids.is_empty() {
            return;
        }

        let mut map = self.inner.lock().unwrap();
        let mut changed = false;
        for raw in raw_ids {
            if map.remove(&normalize_id(raw)).is_some() {
                changed = true;
            }
        }
        if changed {
            self.persist(&map);
        }
    }

    pub fn ids(&self) -> Vec<String> {
        self.inner.lock().unwrap().keys().cloned().collect()
    }

    pub fn snapshot(&self) -> HashMap<String, f64> {
        self.inner.lock().unwrap().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().is_empty()
    }

    fn persist(&self, map: &HashMap<String, f64>) {
        if let Err(e) = self.kv.write(ALERTS_KEY, map) {
            tracing::warn!("could not persist alerts: {e}");
        }
    }
}

/// Deserialize the persisted record, keeping only entries whose key
/// normalizes to a non-empty id and whose value is finite and > 0.
/// Absent or corrupt data yields an empty mapping, never an error.
fn load(kv: &KvStore) -> HashMap<String, f64> {
    let raw: HashMap<String, f64> = match kv.read(ALERTS_KEY) {
        Some(m) => m,
        None => return HashMap::new(),
    };

    raw.into_iter()
        .filter_map(|(k, v)| {
            let id = normalize_id(&k);
            if !id.is_empty() && v.is_finite() && v > 0.0 {
                Some((id, v))
            } else {
                None
            }
        })
        .collect()
}
