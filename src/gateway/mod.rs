//! Remote authorization gateway boundary.
//!
//! The session layer only depends on [`AuthGateway`]; [`HttpGateway`] is the
//! portal-API implementation and tests substitute their own.

mod http;

use async_trait::async_trait;

use crate::error::SessionResult;
use crate::identity::{AuthorizationPayload, WsTokenCredential};

pub use http::HttpGateway;

/// What the session presents to the gateway on each call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credential {
    /// API auth token (`X-Auth-Token`).
    pub token: Option<String>,
    /// Group to act under (`X-MIQ-Group`).
    pub group: Option<String>,
}

#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// `GET /api?attributes=authorization`. Errors are `AuthFetch`.
    async fn fetch_authorization(&self, credential: &Credential) -> SessionResult<AuthorizationPayload>;

    /// Issue a fresh websocket token. An empty `path` means the default
    /// issuance endpoint. Errors are `TokenIssuance`.
    async fn issue_ws_token(&self, credential: &Credential, path: &str) -> SessionResult<WsTokenCredential>;
}
