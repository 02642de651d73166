//! Session management for the portal client: who the current actor is, which
//! group they act under, and the auxiliary websocket credential.
//! Keep the public surface thin and split implementation across sub-modules.

mod session;
mod user;
mod reload;
pub mod pause;
pub mod ws_token;

pub use session::{SessionManager, SessionState};
pub use user::{AuthorizationBlock, AuthorizationPayload, GroupRef, RawIdentity, UserSnapshot};
pub use reload::{PageReloader, ReloadSignal};
pub use ws_token::{WsTokenCredential, WS_NOTIFICATIONS_PATH, WS_TOKEN_COOKIE};
