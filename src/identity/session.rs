use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value as JsonValue;

use super::pause;
use super::reload::PageReloader;
use super::user::{AuthorizationPayload, UserSnapshot};
use super::ws_token::{WsTokenCredential, WS_NOTIFICATIONS_PATH, WS_TOKEN_COOKIE};
use crate::error::{SessionError, SessionResult};
use crate::gateway::{AuthGateway, Credential};
use crate::rbac::{Authorization, Rbac};
use crate::store::{ClientStore, CookieJar, CookieOptions, StoreKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No snapshot; consumers see the deny-all gate tables.
    Anonymous,
    /// The first authorization load is in flight. A refresh of a loaded
    /// session stays `Loaded` until the new snapshot is published.
    Loading,
    /// Snapshot and gate tables are valid.
    Loaded,
    /// A group switch requested a full reload; this instance is finished.
    Reloading,
}

#[derive(Debug)]
struct SessionInner {
    state: SessionState,
    user: Option<UserSnapshot>,
}

/// Returns a session left in `Loading` by a dropped load to `Anonymous`.
struct LoadingGuard<'a> {
    inner: &'a RwLock<SessionInner>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let mut inner = self.inner.write();
        if inner.state == SessionState::Loading {
            inner.state = SessionState::Anonymous;
            inner.user = None;
            tracing::debug!(target: "ssui::session", "load cancelled before completion");
        }
    }
}

/// The session context object: owns the current-user snapshot and the
/// published RBAC state, and is handed to every consumer by the application
/// root.
pub struct SessionManager {
    gateway: Arc<dyn AuthGateway>,
    store: Arc<dyn ClientStore>,
    cookies: Arc<dyn CookieJar>,
    reloader: Arc<dyn PageReloader>,
    rbac: Arc<Rbac>,
    inner: RwLock<SessionInner>,
    // Serializes loads; `loads_completed` lets waiters reuse the outcome of a
    // load that finished while they were queued.
    load_lock: tokio::sync::Mutex<()>,
    loads_completed: AtomicU64,
    last_outcome: RwLock<Option<SessionResult<UserSnapshot>>>,
}

impl SessionManager {
    pub fn new(
        gateway: Arc<dyn AuthGateway>,
        store: Arc<dyn ClientStore>,
        cookies: Arc<dyn CookieJar>,
        reloader: Arc<dyn PageReloader>,
    ) -> Self {
        Self {
            gateway,
            store,
            cookies,
            reloader,
            rbac: Arc::new(Rbac::new()),
            inner: RwLock::new(SessionInner { state: SessionState::Anonymous, user: None }),
            load_lock: tokio::sync::Mutex::new(()),
            loads_completed: AtomicU64::new(0),
            last_outcome: RwLock::new(None),
        }
    }

    /// Shared RBAC authority for consumers.
    pub fn rbac(&self) -> Arc<Rbac> {
        self.rbac.clone()
    }

    pub fn state(&self) -> SessionState {
        self.inner.read().state
    }

    /// Public identity fields of the loaded user; `None` means not authenticated.
    pub fn current_user(&self) -> Option<UserSnapshot> {
        let inner = self.inner.read();
        match inner.state {
            SessionState::Loaded => inner.user.clone(),
            _ => None,
        }
    }

    /// Store the API credential used for subsequent gateway calls.
    pub fn create(&self, token: &str) -> SessionResult<()> {
        if token.is_empty() {
            return Err(SessionError::Config("empty auth token".into()));
        }
        self.store.set(StoreKey::AuthToken.as_str(), JsonValue::String(token.to_string()))
    }

    /// True when an API credential is stored.
    pub fn is_active(&self) -> bool {
        self.store.get_str(StoreKey::AuthToken.as_str()).is_some()
    }

    /// Log out: forget credential, cached identity, group selection and the
    /// websocket token, and fall back to the deny-all tables.
    pub fn destroy(&self) -> SessionResult<()> {
        for key in [StoreKey::AuthToken, StoreKey::User, StoreKey::MiqGroup, StoreKey::SelectedMiqGroup] {
            self.store.remove(key.as_str())?;
        }
        self.cookies.remove(WS_TOKEN_COOKIE);
        *self.last_outcome.write() = None;
        {
            let mut inner = self.inner.write();
            inner.user = None;
            if inner.state != SessionState::Reloading {
                inner.state = SessionState::Anonymous;
            }
        }
        self.rbac.invalidate();
        tracing::info!(target: "ssui::session", "session destroyed");
        Ok(())
    }

    /// Bootstrap the user: adopt a complete cached payload from the store, or
    /// fetch one from the gateway. Concurrent callers share a single load.
    pub async fn load_user(&self) -> SessionResult<UserSnapshot> {
        self.load(true).await
    }

    /// Like [`load_user`](Self::load_user) but always asks the gateway.
    pub async fn refresh_user(&self) -> SessionResult<UserSnapshot> {
        self.load(false).await
    }

    async fn load(&self, cache_first: bool) -> SessionResult<UserSnapshot> {
        let observed = self.loads_completed.load(Ordering::Acquire);
        let _guard = self.load_lock.lock().await;

        {
            let mut inner = self.inner.write();
            if inner.state == SessionState::Reloading {
                return Err(SessionError::Reloading);
            }
            if self.loads_completed.load(Ordering::Acquire) != observed {
                if let Some(outcome) = self.last_outcome.read().clone() {
                    return outcome;
                }
            }
            if cache_first && inner.state == SessionState::Loaded {
                if let Some(user) = &inner.user {
                    return Ok(user.clone());
                }
            }
            // A loaded session stays visible while it refreshes.
            if inner.state == SessionState::Anonymous {
                inner.state = SessionState::Loading;
            }
        }

        let cancel = LoadingGuard { inner: &self.inner };
        let result = self.load_locked(cache_first).await;
        *self.last_outcome.write() = Some(result.clone());
        self.loads_completed.fetch_add(1, Ordering::AcqRel);

        let outcome = match result {
            Ok(user) => Ok(user),
            Err(err) => {
                {
                    let mut inner = self.inner.write();
                    if inner.state != SessionState::Reloading {
                        inner.user = None;
                        inner.state = SessionState::Anonymous;
                    }
                }
                self.rbac.invalidate();
                tracing::warn!(target: "ssui::session", "load user failed: {}", err);
                Err(err)
            }
        };
        drop(cancel);
        outcome
    }

    async fn load_locked(&self, cache_first: bool) -> SessionResult<UserSnapshot> {
        let cached = if cache_first { self.cached_payload() } else { None };
        let (payload, from_cache) = match cached {
            Some(payload) => (payload, true),
            None => {
                let credential = self.credential();
                (self.gateway.fetch_authorization(&credential).await?, false)
            }
        };

        // compute
        let mut user = payload.identity.to_snapshot()?;
        if let Some(selected) = self.store.get_str(StoreKey::SelectedMiqGroup.as_str()) {
            if selected != user.group {
                let href = payload.identity.group_href_for(&selected).map(str::to_string);
                match &href {
                    Some(_) => tracing::debug!(
                        target: "ssui::session",
                        "selected group '{}' overrides reported '{}'",
                        selected,
                        user.group
                    ),
                    None => tracing::warn!(
                        target: "ssui::session",
                        "selected group '{}' is not among the user's groups; group_href cleared",
                        selected
                    ),
                }
                user.group_href = href.unwrap_or_default();
                user.group = selected;
            }
        }
        let authorization = Authorization::evaluate(payload.permissions().clone(), Some(user.role.clone()));

        // persist and publish; a group switch that landed mid-load wins
        let epoch = {
            let mut inner = self.inner.write();
            if inner.state == SessionState::Reloading {
                return Err(SessionError::Reloading);
            }
            if !from_cache {
                self.store.set(StoreKey::User.as_str(), serde_json::to_value(&payload)?)?;
            }
            self.store.set(StoreKey::MiqGroup.as_str(), JsonValue::String(user.group.clone()))?;
            let epoch = self.rbac.publish(authorization);
            inner.user = Some(user.clone());
            inner.state = SessionState::Loaded;
            epoch
        };
        tracing::info!(
            target: "ssui::session",
            "user loaded userid={} group={} source={} epoch={}",
            user.userid,
            user.group,
            if from_cache { "store" } else { "gateway" },
            epoch
        );
        Ok(user)
    }

    /// Complete cached payload, if any. Unusable entries are dropped so the
    /// next load goes to the gateway.
    fn cached_payload(&self) -> Option<AuthorizationPayload> {
        let key = StoreKey::User.as_str();
        let value = self.store.get(key)?;
        let usable = AuthorizationPayload::from_cached(value).and_then(|p| {
            p.identity.to_snapshot()?;
            Ok(p)
        });
        match usable {
            Ok(payload) => Some(payload),
            Err(err) => {
                tracing::warn!(target: "ssui::session", "discarding cached user: {}", err);
                if let Err(e) = self.store.remove(key) {
                    tracing::warn!(target: "ssui::session", "failed to drop cached user: {}", e);
                }
                None
            }
        }
    }

    fn credential(&self) -> Credential {
        let group = self
            .store
            .get_str(StoreKey::MiqGroup.as_str())
            .or_else(|| self.store.get_str(StoreKey::SelectedMiqGroup.as_str()));
        Credential { token: self.store.get_str(StoreKey::AuthToken.as_str()), group }
    }

    /// Select another authorization group and force a full reload.
    ///
    /// Nothing derived from the old group's permissions survives: the cached
    /// payload, the snapshot and the published gate tables are all dropped
    /// before the reload is triggered. The name is not checked against the
    /// user's `groups`; the server rejects unknown groups on the next load.
    pub fn switch_group(&self, name: &str) -> SessionResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::InvalidGroupSwitch("group name is empty".into()));
        }
        {
            let mut inner = self.inner.write();
            if inner.state == SessionState::Reloading {
                return Err(SessionError::Reloading);
            }
            if let Some(user) = &inner.user {
                if !user.groups.iter().any(|g| g == name) {
                    tracing::warn!(target: "ssui::session", "switching to group '{}' not listed for user {}", name, user.userid);
                }
            }

            // Cached payload goes first; the group keys are written as a
            // pair or not at all.
            self.store.remove(StoreKey::User.as_str())?;
            let previous = self.store.get(StoreKey::MiqGroup.as_str());
            self.store.set(StoreKey::MiqGroup.as_str(), JsonValue::String(name.to_string()))?;
            if let Err(err) = self.store.set(StoreKey::SelectedMiqGroup.as_str(), JsonValue::String(name.to_string())) {
                let restored = match previous {
                    Some(value) => self.store.set(StoreKey::MiqGroup.as_str(), value),
                    None => self.store.remove(StoreKey::MiqGroup.as_str()).map(|_| ()),
                };
                if let Err(e) = restored {
                    tracing::warn!(target: "ssui::session", "failed to restore miqGroup: {}", e);
                }
                return Err(err);
            }

            inner.user = None;
            inner.state = SessionState::Reloading;
        }
        self.rbac.invalidate();
        tracing::info!(target: "ssui::session", "switched group to '{}', reloading", name);
        self.reloader.reload();
        Ok(())
    }

    /// Set the global inter-request pause; returns the stored milliseconds.
    pub fn set_pause(&self, seconds: i64) -> SessionResult<u64> {
        pause::set_pause(seconds)
    }

    /// Ask for a fresh websocket token and scope it to the notifications path.
    /// Never retries; on failure no cookie is written.
    pub async fn request_ws_token(&self, path: &str) -> SessionResult<WsTokenCredential> {
        let credential = self.credential();
        let token = self.gateway.issue_ws_token(&credential, path).await.map_err(|e| match e {
            SessionError::TokenIssuance(msg) => SessionError::TokenIssuance(msg),
            other => SessionError::TokenIssuance(other.to_string()),
        })?;
        self.cookies.put(WS_TOKEN_COOKIE, &token.token, CookieOptions::with_path(WS_NOTIFICATIONS_PATH));
        tracing::info!(
            target: "ssui::session",
            "ws token issued ttl={}s expires_on={}",
            token.ttl_seconds,
            token.expires_on.to_rfc3339()
        );
        Ok(token)
    }

    /// Forget the websocket token; returns true if one was present.
    pub fn destroy_ws_token(&self) -> bool {
        self.cookies.remove(WS_TOKEN_COOKIE)
    }
}
