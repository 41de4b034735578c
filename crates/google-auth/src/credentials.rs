//! In-memory credential storage keyed by state token
//!
//! Holds completed exchanges until the copy step picks them up. Entries are
//! process-local (a restart drops every pending flow) and expire after a TTL
//! so abandoned flows don't pin tokens in memory. Tokens never touch disk
//! and never appear in logs.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::debug;

use crate::token::CredentialSet;

/// Default lifetime of a stored credential set.
pub const DEFAULT_CREDENTIAL_TTL: Duration = Duration::from_secs(3600); // 1 hour

struct StoredEntry {
    credentials: CredentialSet,
    stored_at: Instant,
}

/// Store mapping state tokens to exchanged credentials.
///
/// Reads clone and never consume: the copy step may run more than once while
/// an entry is live. `put` under an existing state replaces the previous set.
pub struct CredentialStore {
    ttl: Duration,
    entries: Mutex<HashMap<String, StoredEntry>>,
}

impl CredentialStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Store credentials under a state token, replacing any previous set.
    pub async fn put(&self, state: String, credentials: CredentialSet) {
        let mut entries = self.entries.lock().await;
        // Lazy cleanup: drop expired entries while holding the lock
        entries.retain(|_, e| e.stored_at.elapsed() < self.ttl);
        entries.insert(
            state,
            StoredEntry {
                credentials,
                stored_at: Instant::now(),
            },
        );
        debug!(stored = entries.len(), "credential set stored");
    }

    /// Clone the credentials for a state token, if present and not expired.
    pub async fn get(&self, state: &str) -> Option<CredentialSet> {
        let entries = self.entries.lock().await;
        entries
            .get(state)
            .filter(|e| e.stored_at.elapsed() < self.ttl)
            .map(|e| e.credentials.clone())
    }

    /// Number of live credential sets.
    pub async fn len(&self) -> usize {
        let entries = self.entries.lock().await;
        entries
            .values()
            .filter(|e| e.stored_at.elapsed() < self.ttl)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new(DEFAULT_CREDENTIAL_TTL)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn test_credentials(suffix: &str) -> CredentialSet {
        CredentialSet {
            access_token: format!("ya29.{suffix}"),
            id_token: Some(format!("idt.{suffix}")),
            refresh_token: None,
            scopes: vec!["openid".into(), "https://www.googleapis.com/auth/drive".into()],
            expires_at: 1774000000000,
        }
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let store = CredentialStore::default();
        store.put("state-1".into(), test_credentials("a")).await;

        let creds = store.get("state-1").await.unwrap();
        assert_eq!(creds.access_token, "ya29.a");
        assert_eq!(creds.id_token.as_deref(), Some("idt.a"));
        assert_eq!(creds.scopes.len(), 2);
    }

    #[tokio::test]
    async fn get_unknown_state_returns_none() {
        let store = CredentialStore::default();
        store.put("state-1".into(), test_credentials("a")).await;

        assert!(store.get("state-2").await.is_none());
        assert!(store.get("").await.is_none());
    }

    #[tokio::test]
    async fn reads_do_not_consume() {
        let store = CredentialStore::default();
        store.put("state-1".into(), test_credentials("a")).await;

        assert!(store.get("state-1").await.is_some());
        assert!(
            store.get("state-1").await.is_some(),
            "get must not remove the entry"
        );
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn put_replaces_previous_set() {
        let store = CredentialStore::default();
        store.put("state-1".into(), test_credentials("old")).await;
        store.put("state-1".into(), test_credentials("new")).await;

        assert_eq!(store.len().await, 1);
        assert_eq!(store.get("state-1").await.unwrap().access_token, "ya29.new");
    }

    #[tokio::test]
    async fn expired_entries_are_not_returned() {
        let store = CredentialStore::new(Duration::ZERO);
        store.put("state-1".into(), test_credentials("a")).await;

        assert!(store.get("state-1").await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn concurrent_puts_land_under_their_own_states() {
        let store = Arc::new(CredentialStore::default());

        let mut handles = vec![];
        for i in 0..10 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .put(format!("state-{i}"), test_credentials(&i.to_string()))
                    .await;
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        assert_eq!(store.len().await, 10);
        for i in 0..10 {
            let creds = store.get(&format!("state-{i}")).await.unwrap();
            assert_eq!(creds.access_token, format!("ya29.{i}"));
        }
    }
}
