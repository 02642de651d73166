//! Session error model shared by the store, gateway, RBAC and session layers.
//! Every failure is reported through the operation's own result; nothing here
//! ever degrades to "permitted".

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// Authorization gateway call failed (network, non-2xx, undecodable body).
    #[error("authorization fetch failed: {0}")]
    AuthFetch(String),
    /// Cached or fetched identity is missing required fields.
    #[error("incomplete user snapshot: missing {}", .0.join(", "))]
    IncompleteSnapshot(Vec<&'static str>),
    #[error("websocket token issuance failed: {0}")]
    TokenIssuance(String),
    #[error("invalid group switch: {0}")]
    InvalidGroupSwitch(String),
    #[error("invalid pause: {0} seconds")]
    InvalidPause(i64),
    /// A group switch already scheduled a reload; this instance is finished.
    #[error("session is reloading")]
    Reloading,
    #[error("no live connection available: {0}")]
    NoLiveConnection(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("config error: {0}")]
    Config(String),
}

pub type SessionResult<T> = Result<T, SessionError>;

impl SessionError {
    pub fn code_str(&self) -> &'static str {
        match self {
            SessionError::AuthFetch(_) => "auth_fetch_failure",
            SessionError::IncompleteSnapshot(_) => "incomplete_snapshot",
            SessionError::TokenIssuance(_) => "token_issuance_failure",
            SessionError::InvalidGroupSwitch(_) => "invalid_group_switch",
            SessionError::InvalidPause(_) => "invalid_pause",
            SessionError::Reloading => "reloading",
            SessionError::NoLiveConnection(_) => "no_live_connection",
            SessionError::Storage(_) => "storage_error",
            SessionError::Config(_) => "config_error",
        }
    }

    /// Failures after which consumers must treat the actor as unauthenticated.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, SessionError::AuthFetch(_) | SessionError::IncompleteSnapshot(_))
    }
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        SessionError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_mapping() {
        assert_eq!(SessionError::AuthFetch("x".into()).code_str(), "auth_fetch_failure");
        assert_eq!(SessionError::IncompleteSnapshot(vec!["name"]).code_str(), "incomplete_snapshot");
        assert_eq!(SessionError::TokenIssuance("x".into()).code_str(), "token_issuance_failure");
        assert_eq!(SessionError::InvalidGroupSwitch("".into()).code_str(), "invalid_group_switch");
        assert_eq!(SessionError::InvalidPause(-1).code_str(), "invalid_pause");
        assert_eq!(SessionError::Reloading.code_str(), "reloading");
        assert_eq!(SessionError::NoLiveConnection("x".into()).code_str(), "no_live_connection");
        assert_eq!(SessionError::Storage("x".into()).code_str(), "storage_error");
        assert_eq!(SessionError::Config("x".into()).code_str(), "config_error");
    }

    #[test]
    fn incomplete_snapshot_lists_fields() {
        let err = SessionError::IncompleteSnapshot(vec!["userid", "tenant"]);
        assert_eq!(err.to_string(), "incomplete user snapshot: missing userid, tenant");
        assert!(err.is_auth_failure());
        assert!(!SessionError::TokenIssuance("boom".into()).is_auth_failure());
    }

    #[test]
    fn io_errors_map_to_storage() {
        let err: SessionError = std::io::Error::new(std::io::ErrorKind::Other, "disk").into();
        assert!(matches!(err, SessionError::Storage(m) if m == "disk"));
    }
}
