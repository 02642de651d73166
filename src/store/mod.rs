//! Persistent client store: the key-value capability the session layer reads
//! and writes across reloads, plus the path-scoped cookie jar.
//! Keep the public surface thin and split backends across sub-modules.

mod memory;
mod file;
pub mod cookies;


use serde_json::Value as JsonValue;

use crate::error::SessionResult;

pub use cookies::{Cookie, CookieJar, CookieOptions, MemoryCookieJar};
pub use file::FileStore;
pub use memory::MemoryStore;

/// Keys the session layer owns inside the client store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    /// Selected group, sent to the gateway on the next load.
    MiqGroup,
    /// Group override applied while building the snapshot.
    SelectedMiqGroup,
    /// Cached authorization payload (identity + product features).
    User,
    /// API credential for the authorization gateway.
    AuthToken,
}

impl StoreKey {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreKey::MiqGroup => "miqGroup",
            StoreKey::SelectedMiqGroup => "selectedMiqGroup",
            StoreKey::User => "user",
            StoreKey::AuthToken => "miq_token",
        }
    }
}

impl std::fmt::Display for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Injected storage capability. Writes complete before they return so that
/// dependent reads never observe a stale value.
pub trait ClientStore: Send + Sync {
    fn get(&self, key: &str) -> Option<JsonValue>;
    fn set(&self, key: &str, value: JsonValue) -> SessionResult<()>;
    /// Returns true if the key existed.
    fn remove(&self, key: &str) -> SessionResult<bool>;

    /// Non-empty string value for `key`, if any.
    fn get_str(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            JsonValue::String(s) if !s.is_empty() => Some(s),
            _ => None,
        }
    }
}
