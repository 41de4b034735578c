//! Anti-forgery state tokens for the authorization flow
//!
//! Each flow start mints a random state token that Google echoes back in the
//! callback. A callback is only honored if its state is found in the registry
//! and removed in the same operation, so forged and replayed callbacks fail
//! before any token endpoint traffic happens. Entries expire after a TTL to
//! keep abandoned flows from accumulating.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngExt;
use tokio::sync::Mutex;
use tracing::debug;

/// Default lifetime of a pending state token.
pub const DEFAULT_STATE_TTL: Duration = Duration::from_secs(600); // 10 minutes

/// Registry of outstanding state tokens.
///
/// A single Mutex around the map makes validate-and-consume atomic: under
/// concurrent callbacks carrying the same state, exactly one caller observes
/// the entry and removes it.
pub struct StateRegistry {
    ttl: Duration,
    pending: Mutex<HashMap<String, Instant>>,
}

impl StateRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Mint a fresh single-use state token and register it as pending.
    pub async fn issue(&self) -> String {
        let token = generate_state_token();
        let mut pending = self.pending.lock().await;
        // Lazy cleanup: drop expired entries while holding the lock
        pending.retain(|_, issued| issued.elapsed() < self.ttl);
        pending.insert(token.clone(), Instant::now());
        debug!(pending = pending.len(), "issued state token");
        token
    }

    /// Atomically check and consume a state token.
    ///
    /// Returns true exactly once for each token issued within the TTL.
    /// Unknown, already-consumed, expired, and empty tokens return false.
    pub async fn validate_and_consume(&self, token: &str) -> bool {
        if token.is_empty() {
            return false;
        }
        let mut pending = self.pending.lock().await;
        match pending.remove(token) {
            Some(issued) => issued.elapsed() < self.ttl,
            None => false,
        }
    }

    /// Number of pending (issued, not yet consumed or expired) tokens.
    pub async fn len(&self) -> usize {
        let pending = self.pending.lock().await;
        pending
            .values()
            .filter(|issued| issued.elapsed() < self.ttl)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for StateRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_STATE_TTL)
    }
}

/// Generate a cryptographically random URL-safe state token.
///
/// 32 random bytes encoded as URL-safe base64 (no padding), 43 characters.
/// Unguessable, and needs no further URL encoding in the authorization URL.
fn generate_state_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
