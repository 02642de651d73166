//! Navigation gate table: which top-level portal areas are shown.

use serde::Serialize;

use super::features::{PermissionSet, ProductFeature};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavArea {
    Dashboard,
    Services,
    Orders,
    Catalogs,
}

impl NavArea {
    pub const ALL: [NavArea; 4] = [NavArea::Dashboard, NavArea::Services, NavArea::Orders, NavArea::Catalogs];

    pub fn as_str(self) -> &'static str {
        match self {
            NavArea::Dashboard => "dashboard",
            NavArea::Services => "services",
            NavArea::Orders => "orders",
            NavArea::Catalogs => "catalogs",
        }
    }

    /// Rule table: the area is shown if any of these features is granted.
    pub fn required_features(self) -> &'static [ProductFeature] {
        match self {
            NavArea::Dashboard => &[ProductFeature::DashboardView],
            NavArea::Services => &[ProductFeature::ServiceView],
            NavArea::Orders | NavArea::Catalogs => {
                &[ProductFeature::CatalogItemsView, ProductFeature::SvcCatalogProvision]
            }
        }
    }

    pub fn is_granted(self, permissions: &PermissionSet) -> bool {
        self.required_features().iter().any(|f| permissions.contains(*f))
    }
}

impl std::fmt::Display for NavArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NavGate {
    pub show: bool,
}

/// One entry per [`NavArea`], always all four. `Default` hides everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NavigationGateTable {
    pub dashboard: NavGate,
    pub services: NavGate,
    pub orders: NavGate,
    pub catalogs: NavGate,
}

impl NavigationGateTable {
    pub fn compute(permissions: &PermissionSet) -> Self {
        let gate = |area: NavArea| NavGate { show: area.is_granted(permissions) };
        Self {
            dashboard: gate(NavArea::Dashboard),
            services: gate(NavArea::Services),
            orders: gate(NavArea::Orders),
            catalogs: gate(NavArea::Catalogs),
        }
    }

    pub fn get(&self, area: NavArea) -> NavGate {
        match area {
            NavArea::Dashboard => self.dashboard,
            NavArea::Services => self.services,
            NavArea::Orders => self.orders,
            NavArea::Catalogs => self.catalogs,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (NavArea, NavGate)> + '_ {
        NavArea::ALL.into_iter().map(move |area| (area, self.get(area)))
    }

    pub fn any_shown(&self) -> bool {
        self.iter().any(|(_, gate)| gate.show)
    }
}

pub fn compute_gate_table(permissions: &PermissionSet) -> NavigationGateTable {
    NavigationGateTable::compute(permissions)
}

/// True iff at least one navigation area is shown.
pub fn is_navigation_enabled(permissions: &PermissionSet) -> bool {
    compute_gate_table(permissions).any_shown()
}
