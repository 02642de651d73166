use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{SessionError, SessionResult};
use crate::rbac::PermissionSet;

/// Identity of the acting user as exposed to consumers. Serializes to exactly
/// these nine keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub userid: String,
    pub name: String,
    pub user_href: String,
    pub group: String,
    pub group_href: String,
    pub role: String,
    pub role_href: String,
    pub tenant: String,
    pub groups: Vec<String>,
}

/// `identity` block as reported by the gateway or found in the store; every
/// field optional until checked. Unknown fields are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawIdentity {
    #[serde(default)]
    pub userid: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub user_href: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub group_href: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub role_href: Option<String>,
    #[serde(default)]
    pub tenant: Option<String>,
    #[serde(default)]
    pub groups: Option<Vec<String>>,
    /// Group references (name and href) reported alongside `groups`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub miq_groups: Option<Vec<GroupRef>>,
}

/// Entry of the identity's `miq_groups` list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRef {
    #[serde(default)]
    pub href: Option<String>,
    /// Group name, as used in `groups` and `miqGroup`.
    #[serde(default)]
    pub description: Option<String>,
}

impl RawIdentity {
    /// Href of the named group, if the identity lists one for it.
    pub fn group_href_for(&self, name: &str) -> Option<&str> {
        self.miq_groups
            .as_deref()?
            .iter()
            .find(|g| g.description.as_deref() == Some(name))
            .and_then(|g| g.href.as_deref())
    }

    /// Promote to a [`UserSnapshot`]; any missing field makes the whole
    /// identity untrusted.
    pub fn to_snapshot(&self) -> SessionResult<UserSnapshot> {
        let mut missing: Vec<&'static str> = Vec::new();
        let mut take = |field: &'static str, v: &Option<String>| -> String {
            match v {
                Some(s) => s.clone(),
                None => {
                    missing.push(field);
                    String::new()
                }
            }
        };
        let userid = take("userid", &self.userid);
        let name = take("name", &self.name);
        let user_href = take("user_href", &self.user_href);
        let group = take("group", &self.group);
        let group_href = take("group_href", &self.group_href);
        let role = take("role", &self.role);
        let role_href = take("role_href", &self.role_href);
        let tenant = take("tenant", &self.tenant);
        let groups = match &self.groups {
            Some(g) => g.clone(),
            None => {
                missing.push("groups");
                Vec::new()
            }
        };
        if !missing.is_empty() {
            return Err(SessionError::IncompleteSnapshot(missing));
        }
        Ok(UserSnapshot { userid, name, user_href, group, group_href, role, role_href, tenant, groups })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationBlock {
    #[serde(default)]
    pub product_features: PermissionSet,
}

/// Response of `GET /api?attributes=authorization`; also the shape cached
/// under the store's `user` key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationPayload {
    #[serde(default)]
    pub identity: RawIdentity,
    #[serde(default)]
    pub authorization: AuthorizationBlock,
}

impl AuthorizationPayload {
    /// Decode a cached `user` entry. Accepts the full payload, a bare identity
    /// object (no permissions), or either one stringified.
    pub fn from_cached(value: JsonValue) -> SessionResult<Self> {
        let value = match value {
            JsonValue::String(s) => serde_json::from_str(&s)?,
            other => other,
        };
        if !value.is_object() {
            return Err(SessionError::Storage("cached user entry is not an object".into()));
        }
        if value.get("identity").is_some() || value.get("authorization").is_some() {
            Ok(serde_json::from_value(value)?)
        } else {
            Ok(Self { identity: serde_json::from_value(value)?, authorization: AuthorizationBlock::default() })
        }
    }

    pub fn permissions(&self) -> &PermissionSet {
        &self.authorization.product_features
    }
}
