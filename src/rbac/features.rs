//! Product-feature vocabulary and the sparse permission set returned by the
//! authorization gateway.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Permission keys the portal evaluates. Keys outside this list may still be
/// present in a [`PermissionSet`]; gate evaluation ignores them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductFeature {
    DashboardView,
    ServiceView,
    ServiceEdit,
    ServiceDelete,
    ServiceTag,
    ServiceRetire,
    ServiceRetireNow,
    ServiceOwnership,
    ServiceReconfigure,
    CatalogItemsView,
    SvcCatalogProvision,
    MiqRequestView,
    MiqRequestApproval,
    MiqRequestDelete,
    VmConsole,
}

impl ProductFeature {
    pub const ALL: [ProductFeature; 15] = [
        ProductFeature::DashboardView,
        ProductFeature::ServiceView,
        ProductFeature::ServiceEdit,
        ProductFeature::ServiceDelete,
        ProductFeature::ServiceTag,
        ProductFeature::ServiceRetire,
        ProductFeature::ServiceRetireNow,
        ProductFeature::ServiceOwnership,
        ProductFeature::ServiceReconfigure,
        ProductFeature::CatalogItemsView,
        ProductFeature::SvcCatalogProvision,
        ProductFeature::MiqRequestView,
        ProductFeature::MiqRequestApproval,
        ProductFeature::MiqRequestDelete,
        ProductFeature::VmConsole,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProductFeature::DashboardView => "dashboard_view",
            ProductFeature::ServiceView => "service_view",
            ProductFeature::ServiceEdit => "service_edit",
            ProductFeature::ServiceDelete => "service_delete",
            ProductFeature::ServiceTag => "service_tag",
            ProductFeature::ServiceRetire => "service_retire",
            ProductFeature::ServiceRetireNow => "service_retire_now",
            ProductFeature::ServiceOwnership => "service_ownership",
            ProductFeature::ServiceReconfigure => "service_reconfigure",
            ProductFeature::CatalogItemsView => "catalog_items_view",
            ProductFeature::SvcCatalogProvision => "svc_catalog_provision",
            ProductFeature::MiqRequestView => "miq_request_view",
            ProductFeature::MiqRequestApproval => "miq_request_approval",
            ProductFeature::MiqRequestDelete => "miq_request_delete",
            ProductFeature::VmConsole => "vm_console",
        }
    }
}

impl std::fmt::Display for ProductFeature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProductFeature {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ProductFeature::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == value)
            .ok_or(())
    }
}

/// Sparse set of granted permission keys. Absent means not granted.
///
/// On the wire this is the `product_features` object (`{key: {...}}`); the
/// values are ignored on read and written back as empty objects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, JsonValue>", into = "BTreeMap<String, JsonValue>")]
pub struct PermissionSet {
    keys: BTreeSet<String>,
}

impl PermissionSet {
    pub fn new() -> Self { Self::default() }

    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { keys: keys.into_iter().map(Into::into).collect() }
    }

    pub fn contains(&self, feature: ProductFeature) -> bool {
        self.keys.contains(feature.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Granted keys that belong to the known vocabulary.
    pub fn known(&self) -> impl Iterator<Item = ProductFeature> + '_ {
        self.keys.iter().filter_map(|k| k.parse().ok())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize { self.keys.len() }
    pub fn is_empty(&self) -> bool { self.keys.is_empty() }
}

impl From<BTreeMap<String, JsonValue>> for PermissionSet {
    fn from(map: BTreeMap<String, JsonValue>) -> Self {
        Self { keys: map.into_keys().collect() }
    }
}

impl From<PermissionSet> for BTreeMap<String, JsonValue> {
    fn from(set: PermissionSet) -> Self {
        set.keys
            .into_iter()
            .map(|k| (k, JsonValue::Object(Default::default())))
            .collect()
    }
}
