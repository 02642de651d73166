use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cookie carrying the websocket token.
pub const WS_TOKEN_COOKIE: &str = "ws_token";
/// Path the websocket token cookie is scoped to.
pub const WS_NOTIFICATIONS_PATH: &str = "/ws/notifications";

/// Short-lived credential for the live notification/console channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WsTokenCredential {
    #[serde(rename = "auth_token")]
    pub token: String,
    #[serde(rename = "token_ttl")]
    pub ttl_seconds: u64,
    pub expires_on: DateTime<Utc>,
}

impl WsTokenCredential {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_on
    }
}

/// Token endpoint body; some deployments wrap it in `data`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum WsTokenBody {
    Wrapped { data: WsTokenCredential },
    Flat(WsTokenCredential),
}

impl WsTokenBody {
    pub(crate) fn into_credential(self) -> WsTokenCredential {
        match self {
            WsTokenBody::Wrapped { data } => data,
            WsTokenBody::Flat(c) => c,
        }
    }
}
