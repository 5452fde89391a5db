//! Application state management

use std::sync::Arc;

use tracing::{info, warn};

use crate::app::options::AppOptions;
use crate::authn::session::{AccessToken, Session};
use crate::dashboard::Dashboard;
use crate::errors::ConsoleError;
use crate::http::client::HttpClient;
use crate::notify::Notifier;
use crate::view::reconcile::Reconciler;

/// Main application state
pub struct AppState {
    /// HTTP client for backend communication
    pub http_client: Arc<HttpClient>,

    /// Session holding the bearer token
    pub session: Arc<Session>,

    /// Deployments view synchronizer
    pub dashboard: Arc<Dashboard>,
}

impl AppState {
    /// Initialize application state
    pub fn init(options: &AppOptions) -> Result<Self, ConsoleError> {
        info!("Initializing application state...");

        let http_client = Arc::new(HttpClient::new(
            &options.backend_base_url,
            options.request_timeout,
        )?);

        let session = match options.access_token.clone() {
            Some(raw) => {
                let token = AccessToken::from_raw(raw)?;
                if token.is_expired() {
                    warn!("Configured access token is expired, starting signed out");
                    Arc::new(Session::new())
                } else {
                    Arc::new(Session::with_token(token))
                }
            }
            None => Arc::new(Session::new()),
        };

        let dashboard = Arc::new(Dashboard::new(
            http_client.clone(),
            session.clone(),
            Reconciler::new(options.highlight_duration),
            Notifier::new(options.notification_ttl),
        ));
        if options.start_visible {
            dashboard.set_visible(true);
        }

        Ok(Self {
            http_client,
            session,
            dashboard,
        })
    }

    /// Shutdown application state
    pub async fn shutdown(&self) -> Result<(), ConsoleError> {
        info!("Shutting down application state...");
        self.dashboard.set_visible(false);
        Ok(())
    }
}
