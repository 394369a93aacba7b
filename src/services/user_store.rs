//! Durable account records: `email -> User`, persisted under the `users`
//! record. A deliberately small CRUD layer; the whole account system is a
//! demo flow, not a hardened credential store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::models::User;
use crate::storage::KvStore;

pub const USERS_KEY: &str = "users";

#[derive(Clone)]
pub struct UserStore {
    kv: KvStore,
    inner: Arc<Mutex<HashMap<String, User>>>,
}

impl UserStore {
    pub fn open(kv: KvStore) -> Self {
        let loaded: HashMap<String, User> = kv.read(USERS_KEY).unwrap_or_default();
        Self {
            kv,
            inner: Arc::new(Mutex::new(loaded)),
        }
    }

    pub fn find_by_email(&self, email: &str) -> Option<User> {
        self.inner.lock().unwrap().get(email).cloned()
    }

    pub fn username_taken(&self, username: &str) -> bool {
        self.inner
            .lock()
            .unwrap()
            .values()
            .any(|u| u.username == username)
    }

    /// Insert a new user. Returns false (and leaves the store unchanged)
    /// when the email is already registered.
    pub fn insert(&self, user: User) -> bool {
        let mut map = self.inner.lock().unwrap();
        if map.contains_key(&user.email) {
            return false;
        }
        map.insert(user.email.clone(), user);
        self.persist(&map);
        true
    }

    /// Replace the record for an existing email.
    pub fn update(&self, user: User) -> bool {
        let mut map = self.inner.lock().unwrap();
        if !map.contains_key(&user.email) {
            return false;
        }
        map.insert(user.email.clone(), user);
        self.persist(&map);
        true
    }

    fn persist(&self, map: &HashMap<String, User>) {
        if let Err(e) = self.kv.write(USERS_KEY, map) {
            tracing::warn!("could not persist users: {e}");
        }
    }
}
