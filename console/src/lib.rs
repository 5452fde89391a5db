//! dashsync library
//!
//! Live deployment state synchronizer for the cluster dashboard.

pub mod app;
pub mod authn;
pub mod dashboard;
pub mod errors;
pub mod http;
pub mod logs;
pub mod models;
pub mod notify;
pub mod server;
pub mod storage;
pub mod store;
pub mod utils;
pub mod validate;
pub mod view;
pub mod workers;
