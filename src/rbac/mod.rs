//! Role-based feature gating.
//!
//! Turns the sparse `product_features` set from the authorization gateway into
//! fixed-shape gate tables (navigation areas and action buttons) and publishes
//! them for consumers. Rule tables are exhaustive matches over closed enums,
//! so adding an area or action is a compile-time-checked change.

mod actions;
mod evaluator;
mod features;
mod navigation;

pub use actions::{ActionFeature, ActionGateTable};
pub use evaluator::{Authorization, Rbac};
pub use features::{PermissionSet, ProductFeature};
pub use navigation::{compute_gate_table, is_navigation_enabled, NavArea, NavGate, NavigationGateTable};
