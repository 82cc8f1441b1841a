//! Bearer token sources.
//!
//! The engine only consumes a resolved token string. Where it comes from
//! (config file, CLI flag, credentials file) is up to the caller.

use std::sync::Arc;

use parking_lot::RwLock;

/// Supplies the bearer token on demand; `None` means "no token yet"
pub trait TokenSource: Send + Sync {
    fn token(&self) -> Option<String>;
}

/// Fixed token resolved at startup
#[derive(Debug, Clone, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    pub fn new(token: Option<String>) -> Self {
        Self(token.filter(|t| !t.trim().is_empty()))
    }
}

impl TokenSource for StaticToken {
    fn token(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Token that can be replaced at runtime (e.g. after the user enters one).
///
/// Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct SharedToken {
    inner: Arc<RwLock<Option<String>>>,
}

impl SharedToken {
    pub fn new(token: Option<String>) -> Self {
        let shared = Self::default();
        shared.set(token);
        shared
    }

    /// Replace the token; blank strings clear it
    pub fn set(&self, token: Option<String>) {
        let token = token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        *self.inner.write() = token;
    }

    pub fn is_set(&self) -> bool {
        self.inner.read().is_some()
    }
}

impl TokenSource for SharedToken {
    fn token(&self) -> Option<String> {
        self.inner.read().clone()
    }
}
