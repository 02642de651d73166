//! Published authorization state read by every consumer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use super::actions::{ActionFeature, ActionGateTable};
use super::features::{PermissionSet, ProductFeature};
use super::navigation::NavigationGateTable;

/// Everything derived from one authorization payload. Built in one step and
/// swapped in whole, so consumers never see a half-updated table.
#[derive(Debug, Clone, Default)]
pub struct Authorization {
    pub permissions: PermissionSet,
    pub navigation: NavigationGateTable,
    pub actions: ActionGateTable,
    /// Role name of the acting user, when known.
    pub role: Option<String>,
}

impl Authorization {
    pub fn evaluate(permissions: PermissionSet, role: Option<String>) -> Self {
        let navigation = NavigationGateTable::compute(&permissions);
        let actions = ActionGateTable::compute(&permissions);
        Self { permissions, navigation, actions, role }
    }
}

/// Consumer-facing RBAC authority. Starts (and resets to) the deny-all table.
///
/// `epoch` advances on every publish or invalidation; consumers that cache
/// anything derived from permissions compare it to detect staleness.
#[derive(Debug, Default)]
pub struct Rbac {
    current: RwLock<Arc<Authorization>>,
    epoch: AtomicU64,
}

impl Rbac {
    pub fn new() -> Self { Self::default() }

    pub fn publish(&self, authorization: Authorization) -> u64 {
        let next = Arc::new(authorization);
        let mut w = self.current.write();
        *w = next;
        let epoch = self.epoch.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::debug!(
            target: "ssui::rbac",
            "published authorization epoch={} features={} navigation_enabled={}",
            epoch,
            w.permissions.len(),
            w.navigation.any_shown()
        );
        epoch
    }

    /// Drop all permission-derived state in favour of the deny-all table.
    pub fn invalidate(&self) -> u64 {
        self.publish(Authorization::default())
    }

    pub fn snapshot(&self) -> Arc<Authorization> {
        self.current.read().clone()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    pub fn get_nav_features(&self) -> NavigationGateTable {
        self.current.read().navigation
    }

    pub fn navigation_enabled(&self) -> bool {
        self.current.read().navigation.any_shown()
    }

    pub fn get_action_features(&self) -> ActionGateTable {
        self.current.read().actions.clone()
    }

    pub fn allows(&self, action: ActionFeature) -> bool {
        self.current.read().actions.allows(action)
    }

    pub fn has(&self, feature: ProductFeature) -> bool {
        self.current.read().permissions.contains(feature)
    }

    pub fn has_any(&self, features: &[ProductFeature]) -> bool {
        let cur = self.current.read();
        features.iter().any(|f| cur.permissions.contains(*f))
    }

    /// Raw key lookup for features outside [`ProductFeature`].
    pub fn has_key(&self, key: &str) -> bool {
        self.current.read().permissions.contains_key(key)
    }

    /// True if the acting role is one of `roles`.
    pub fn has_role(&self, roles: &[&str]) -> bool {
        match self.current.read().role.as_deref() {
            Some(role) => roles.iter().any(|r| *r == role),
            None => false,
        }
    }
}
