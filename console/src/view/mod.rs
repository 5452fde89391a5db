//! Deployment list view: projection, rendered state and reconciliation

pub mod projection;
pub mod reconcile;
pub mod state;
