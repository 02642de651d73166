//! Runtime configuration for the portal session client.
//! Values come from `SSUI_*` environment variables with local-dev defaults.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

use crate::error::{SessionError, SessionResult};

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:3000";
pub const DEFAULT_AUTHORIZATION_PATH: &str = "/api?attributes=authorization";
pub const DEFAULT_WS_TOKEN_PATH: &str = "/api/auth?requester_type=ws";
pub const DEFAULT_STORE_PATH: &str = ".ssui/session.json";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Base URL of the portal API (scheme, host, port).
    pub api_base: Url,
    pub authorization_path: String,
    /// Token issuance endpoint used when `request_ws_token` is given an empty path.
    pub ws_token_path: String,
    /// Where `FileStore` keeps the persisted session between runs.
    pub store_path: PathBuf,
    pub request_timeout: Duration,
    /// Optional API token to seed the store with on startup.
    pub auth_token: Option<String>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            api_base: Url::parse(DEFAULT_API_BASE).expect("default api base is a valid URL"),
            authorization_path: DEFAULT_AUTHORIZATION_PATH.to_string(),
            ws_token_path: DEFAULT_WS_TOKEN_PATH.to_string(),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            auth_token: None,
        }
    }
}

impl PortalConfig {
    pub fn from_env() -> SessionResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> SessionResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(base) = lookup("SSUI_API_BASE").filter(|v| !v.trim().is_empty()) {
            cfg.api_base = Url::parse(base.trim())
                .map_err(|e| SessionError::Config(format!("SSUI_API_BASE '{}': {}", base, e)))?;
        }
        if let Some(path) = lookup("SSUI_STORE_PATH").filter(|v| !v.trim().is_empty()) {
            cfg.store_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("SSUI_WS_TOKEN_PATH").filter(|v| !v.trim().is_empty()) {
            cfg.ws_token_path = path;
        }
        if let Some(secs) = lookup("SSUI_TIMEOUT_SECS") {
            let parsed: u64 = secs
                .trim()
                .parse()
                .map_err(|_| SessionError::Config(format!("SSUI_TIMEOUT_SECS '{}' is not a number", secs)))?;
            cfg.request_timeout = Duration::from_secs(parsed);
        }
        cfg.auth_token = lookup("SSUI_AUTH_TOKEN").filter(|v| !v.is_empty());
        Ok(cfg)
    }

    /// Resolve a path (possibly carrying a query string) against the API base.
    pub fn endpoint(&self, path: &str) -> SessionResult<Url> {
        self.api_base
            .join(path)
            .map_err(|e| SessionError::Config(format!("bad endpoint '{}': {}", path, e)))
    }
}
