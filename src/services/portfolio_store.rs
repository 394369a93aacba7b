//! Durable portfolio holdings: `coin id -> quantity`, persisted under the
//! `portfolio` record with the same load/filter rules as the alert store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::services::alert_store::normalize_id;
use crate::storage::KvStore;

pub const PORTFOLIO_KEY: &str = "portfolio";

#[derive(Debug, Error, PartialEq)]
pub enum HoldingValidationError {
    #[error("coin id must not be empty")]
    EmptyId,

    #[error("quantity must be a positive number")]
    InvalidQuantity,
}

#[derive(Clone)]
pub struct PortfolioStore {
    kv: KvStore,
    inner: Arc<Mutex<HashMap<String, f64>>>,
}

impl PortfolioStore {
    pub fn open(kv: KvStore) -> Self {
        let loaded = load(&kv);
        Self {
            kv,
            inner: Arc::new(Mutex::new(loaded)),
        }
    }

    /// Add a holding; adding an id that already exists accumulates into the
    /// existing quantity.
    pub fn add(&self, raw_id: &str, quantity: f64) -> Result<(), HoldingValidationError> {
        let id = normalize_id(raw_id);
        if id.is_empty() {
            return Err(HoldingValidationError::EmptyId);
        }
        if !quantity.is_finite() || quantity <= 0.0 {
            return Err(HoldingValidationError::InvalidQuantity);
        }

        let mut map = self.inner.lock().unwrap();
        *map.entry(id).or_insert(0.0) += quantity;
        self.persist(&map);
        Ok(())
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

    pub fn snapshot(&self) -> HashMap<String, f64> {
        self.inner.lock().unwrap().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().is_empty()
    }

    fn persist(&self, map: &HashMap<String, f64>) {
        if let Err(e) = self.kv.write(PORTFOLIO_KEY, map) {
            tracing::warn!("could not persist portfolio: {e}");
        }
    }
}

fn load(kv: &KvStore) -> HashMap<String, f64> {
    let raw: HashMap<String, f64> = match kv.read(PORTFOLIO_KEY) {
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

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::{HoldingValidationError, PortfolioStore};
    use crate::storage::KvStore;

    fn temp_store(name: &str) -> PortfolioStore {
        static SEQ: AtomicU64 = AtomicU64::new(0);
        let dir = std::env::temp_dir().join(format!(
            "cointracker-portfolio-{name}-{}-{}",
            std::process::id(),
            SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        PortfolioStore::open(KvStore::open(dir))
    }

    #[test]
    fn add_accumulates_quantity_for_existing_id() {
        let store = temp_store("accumulate");
        store.add("Bitcoin", 0.25).expect("first add");
        store.add("bitcoin", 0.5).expect("second add");

        assert_eq!(store.snapshot().get("bitcoin"), Some(&0.75));
    }

    #[test]
    fn add_rejects_invalid_input() {
        let store = temp_store("invalid");

        assert_eq!(store.add(" ", 1.0), Err(HoldingValidationError::EmptyId));
        assert_eq!(
            store.add("bitcoin", 0.0),
            Err(HoldingValidationError::InvalidQuantity)
        );
        assert_eq!(
            store.add("bitcoin", f64::NAN),
            Err(HoldingValidationError::InvalidQuantity)
        );
        assert!(store.is_empty());
    }

    #[test]
    fn remove_unknown_id_is_a_noop() {
        let store = temp_store("remove");
        store.add("bitcoin", 1.0).expect("add");

        assert!(!store.remove("ethereum"));
        assert!(store.remove("BITCOIN"));
        assert!(store.is_empty());
    }
}
