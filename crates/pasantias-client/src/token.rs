//! Bearer token storage with invalidation signalling.

use tokio::sync::watch;

/// Holds the session's bearer token.
///
/// Every change is published on a watch channel, so the session learns
/// about a 401-triggered invalidation without polling.
#[derive(Debug)]
pub struct TokenStore {
    tx: watch::Sender<Option<String>>,
}

impl TokenStore {
    /// Create a store, optionally already authenticated.
    pub fn new(token: Option<String>) -> Self {
        let (tx, _rx) = watch::channel(token.filter(|t| !t.trim().is_empty()));
        Self { tx }
    }

    /// The current token, if any.
    pub fn get(&self) -> Option<String> {
        self.tx.borrow().clone()
    }

    /// Whether a token is present.
    pub fn is_authenticated(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// Replace the token.
    pub fn set(&self, token: impl Into<String>) {
        self.tx.send_replace(Some(token.into()));
    }

    /// Drop the token. Subscribers observe `None`.
    pub fn clear(&self) {
        let previous = self.tx.send_replace(None);
        if previous.is_some() {
            tracing::info!("Session token cleared");
        }
    }

    /// Subscribe to token changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.tx.subscribe()
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new(None)
    }
}
