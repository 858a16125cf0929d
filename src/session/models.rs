use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Server-side session record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionModel {
    pub id: String,            // UUID v4, also the signed cookie value
    pub token: Option<String>, // Access token once the login flow completed
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
}

impl SessionModel {
    /// Creates an anonymous session with a fresh ID that lives for `ttl`
    pub fn new(ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4().to_string(),
            token: None,
            created_at: now,
            expires_at: now + ttl,
            last_accessed: now,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Marks the session as used now and pushes its expiry `ttl` into the future
    pub fn touch(&mut self, ttl: Duration) {
        let now = Utc::now();
        self.last_accessed = now;
        self.expires_at = now + ttl;
    }
}
