use serde::{Deserialize, Serialize};

/// Persisted account record. Stored in the `users` document keyed by email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub username: String,
    pub password_hash: String,

    // unix timestamp (seconds)
    pub created_at: i64,
}

/// The logged-in user as seen by request handlers, injected into request
/// extensions by the auth middleware.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub email: String,
    pub username: String,
}

impl From<User> for CurrentUser {
    fn from(u: User) -> Self {
        Self {
            email: u.email,
            username: u.username,
        }
    }
}
