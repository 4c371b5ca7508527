//! Login session held in client storage

use serde::{Deserialize, Serialize};

use crate::config::SessionConfig;
use crate::error::ClientResult;
use crate::storage::KeyValueStore;

/// Buyer id used for orders placed without a username
pub const GUEST_BUYER: &str = "guest";

/// Credentials kept after login
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
}

impl Session {
    /// Read the session keys; blank values count as absent
    pub fn load(store: &impl KeyValueStore, keys: &SessionConfig) -> Self {
        let read = |key: &str| store.get(key).filter(|v| !v.trim().is_empty());
        Self {
            access_token: read(&keys.token_key),
            username: read(&keys.username_key),
            email: read(&keys.email_key),
        }
    }

    /// Persist a session after a successful login
    pub fn save(&self, store: &impl KeyValueStore, keys: &SessionConfig) -> ClientResult<()> {
        let fields = [
            (&keys.token_key, &self.access_token),
            (&keys.username_key, &self.username),
            (&keys.email_key, &self.email),
        ];
        for (key, value) in fields {
            match value {
                Some(v) => store.set(key, v)?,
                None => store.remove(key)?,
            }
        }
        tracing::debug!(username = ?self.username, "session saved");
        Ok(())
    }

    /// Remove every session key from the store
    pub fn logout(store: &impl KeyValueStore, keys: &SessionConfig) -> ClientResult<()> {
        store.remove(&keys.token_key)?;
        store.remove(&keys.username_key)?;
        store.remove(&keys.email_key)?;
        tracing::debug!("session cleared");
        Ok(())
    }

    pub fn is_logged_in(&self) -> bool {
        self.access_token.is_some()
    }

    pub fn buyer_id(&self) -> &str {
        self.username.as_deref().unwrap_or(GUEST_BUYER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_save_load_logout() {
        let store = MemoryStore::new();
        let keys = SessionConfig::default();
        let session = Session {
            access_token: Some("jwt".into()),
            username: Some("ravi".into()),
            email: None,
        };
        session.save(&store, &keys).unwrap();

        let loaded = Session::load(&store, &keys);
        assert_eq!(loaded, session);
        assert!(loaded.is_logged_in());
        assert_eq!(loaded.buyer_id(), "ravi");

        Session::logout(&store, &keys).unwrap();
        assert!(store.is_empty());
        assert!(!Session::load(&store, &keys).is_logged_in());
    }

    #[test]
    fn test_blank_token_is_logged_out() {
        let store = MemoryStore::new();
        store.set("access_token", "  ").unwrap();
        let session = Session::load(&store, &SessionConfig::default());
        assert!(!session.is_logged_in());
        assert_eq!(session.buyer_id(), GUEST_BUYER);
    }
}
