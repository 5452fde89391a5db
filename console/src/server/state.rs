//! Server state

use std::sync::Arc;

use crate::authn::session::Session;
use crate::dashboard::Dashboard;

/// Server state shared across handlers
pub struct ServerState {
    pub session: Arc<Session>,
    pub dashboard: Arc<Dashboard>,
}

impl ServerState {
    pub fn new(session: Arc<Session>, dashboard: Arc<Dashboard>) -> Self {
        Self { session, dashboard }
    }
}
