//! Application configuration options

use std::time::Duration;

use crate::workers::poller;

/// Main application options
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Lifecycle configuration
    pub lifecycle: LifecycleOptions,

    /// Backend API base URL
    pub backend_base_url: String,

    /// Per-request timeout for backend calls
    pub request_timeout: Duration,

    /// Enable local HTTP server
    pub enable_socket_server: bool,

    /// Treat the deployments view as visible from startup
    pub start_visible: bool,

    /// Server configuration
    pub server: ServerOptions,

    /// Poller worker options
    pub poller: poller::Options,

    /// How long a status-change highlight stays on a row
    pub highlight_duration: Duration,

    /// Lifetime of a notification
    pub notification_ttl: Duration,

    /// Access token to start the session with
    pub access_token: Option<String>,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            lifecycle: LifecycleOptions::default(),
            backend_base_url: "http://localhost:8000".to_string(),
            request_timeout: Duration::from_secs(30),
            enable_socket_server: true,
            start_visible: false,
            server: ServerOptions::default(),
            poller: poller::Options::default(),
            highlight_duration: Duration::from_millis(1500),
            notification_ttl: Duration::from_secs(5),
            access_token: None,
        }
    }
}

/// Lifecycle options
#[derive(Debug, Clone)]
pub struct LifecycleOptions {
    /// Maximum delay for graceful shutdown
    pub max_shutdown_delay: Duration,
}

impl Default for LifecycleOptions {
    fn default() -> Self {
        Self {
            max_shutdown_delay: Duration::from_secs(30),
        }
    }
}

/// Local HTTP server options
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8090,
        }
    }
}
