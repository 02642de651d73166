use std::collections::BTreeMap;

use serde::Serialize;

use super::features::{PermissionSet, ProductFeature};

/// Action buttons on service and request screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionFeature {
    ServiceEdit,
    ServiceDelete,
    ServiceTag,
    ServiceRetire,
    ServiceRetireNow,
    ServiceOwnership,
    ServiceReconfigure,
    /// "Service Request" button on catalog item details.
    ServiceRequest,
    RequestApproval,
    RequestDelete,
    Console,
}

impl ActionFeature {
    pub const ALL: [ActionFeature; 11] = [
        ActionFeature::ServiceEdit,
        ActionFeature::ServiceDelete,
        ActionFeature::ServiceTag,
        ActionFeature::ServiceRetire,
        ActionFeature::ServiceRetireNow,
        ActionFeature::ServiceOwnership,
        ActionFeature::ServiceReconfigure,
        ActionFeature::ServiceRequest,
        ActionFeature::RequestApproval,
        ActionFeature::RequestDelete,
        ActionFeature::Console,
    ];

    pub fn required_features(self) -> &'static [ProductFeature] {
        match self {
            ActionFeature::ServiceEdit => &[ProductFeature::ServiceEdit],
            ActionFeature::ServiceDelete => &[ProductFeature::ServiceDelete],
            ActionFeature::ServiceTag => &[ProductFeature::ServiceTag],
            ActionFeature::ServiceRetire => &[ProductFeature::ServiceRetire],
            ActionFeature::ServiceRetireNow => &[ProductFeature::ServiceRetireNow],
            ActionFeature::ServiceOwnership => &[ProductFeature::ServiceOwnership],
            ActionFeature::ServiceReconfigure => &[ProductFeature::ServiceReconfigure],
            ActionFeature::ServiceRequest => &[ProductFeature::SvcCatalogProvision],
            ActionFeature::RequestApproval => &[ProductFeature::MiqRequestApproval],
            ActionFeature::RequestDelete => &[ProductFeature::MiqRequestDelete],
            ActionFeature::Console => &[ProductFeature::VmConsole],
        }
    }
}

/// Enabled/disabled decision for every [`ActionFeature`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ActionGateTable {
    gates: BTreeMap<ActionFeature, bool>,
}

impl ActionGateTable {
    pub fn compute(permissions: &PermissionSet) -> Self {
        let gates = ActionFeature::ALL
            .into_iter()
            .map(|action| {
                let granted = action.required_features().iter().any(|f| permissions.contains(*f));
                (action, granted)
            })
            .collect();
        Self { gates }
    }

    pub fn allows(&self, action: ActionFeature) -> bool {
        self.gates.get(&action).copied().unwrap_or(false)
    }

    pub fn enabled(&self) -> impl Iterator<Item = ActionFeature> + '_ {
        self.gates.iter().filter(|(_, on)| **on).map(|(a, _)| *a)
    }
}

impl Default for ActionGateTable {
    fn default() -> Self {
        Self::compute(&PermissionSet::new())
    }
}
