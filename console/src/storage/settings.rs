//! Settings file management

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::app::options::{AppOptions, LifecycleOptions, ServerOptions};
use crate::errors::ConsoleError;
use crate::logs::LogLevel;
use crate::workers::poller;

/// Synchronizer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Emit JSON log lines
    #[serde(default)]
    pub log_json: bool,

    /// Backend configuration
    #[serde(default)]
    pub backend: BackendSettings,

    /// Local HTTP server configuration
    #[serde(default)]
    pub server: ServerSettings,

    /// Enable local HTTP server
    #[serde(default = "default_true")]
    pub enable_socket_server: bool,

    /// Treat the deployments view as visible from startup
    #[serde(default)]
    pub start_visible: bool,

    /// Polling interval in seconds
    #[serde(default = "default_polling_interval")]
    pub polling_interval_secs: u64,

    /// Delay of the extra refresh after the view becomes visible
    #[serde(default = "default_visible_refresh_delay")]
    pub visible_refresh_delay_ms: u64,

    /// How long a status-change highlight stays on a row
    #[serde(default = "default_highlight_duration")]
    pub highlight_duration_ms: u64,

    /// Lifetime of a notification
    #[serde(default = "default_notification_ttl")]
    pub notification_ttl_secs: u64,

    /// Access token to start the session with
    #[serde(default)]
    pub access_token: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_polling_interval() -> u64 {
    5
}

fn default_visible_refresh_delay() -> u64 {
    1000
}

fn default_highlight_duration() -> u64 {
    1500
}

fn default_notification_ttl() -> u64 {
    5
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_json: false,
            backend: BackendSettings::default(),
            server: ServerSettings::default(),
            enable_socket_server: true,
            start_visible: false,
            polling_interval_secs: default_polling_interval(),
            visible_refresh_delay_ms: default_visible_refresh_delay(),
            highlight_duration_ms: default_highlight_duration(),
            notification_ttl_secs: default_notification_ttl(),
            access_token: None,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConsoleError> {
        let contents = tokio::fs::read_to_string(path.as_ref()).await?;
        let settings: Settings = serde_json::from_str(&contents)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConsoleError> {
        let url = Url::parse(&self.backend.base_url).map_err(|e| {
            ConsoleError::ConfigError(format!("invalid backend URL {}: {}", self.backend.base_url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConsoleError::ConfigError(format!(
                "backend URL must be http or https, got {}",
                url.scheme()
            )));
        }
        if self.polling_interval_secs == 0 {
            return Err(ConsoleError::ConfigError(
                "polling_interval_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn into_app_options(self) -> AppOptions {
        AppOptions {
            lifecycle: LifecycleOptions::default(),
            backend_base_url: self.backend.base_url,
            request_timeout: Duration::from_secs(self.backend.request_timeout_secs),
            enable_socket_server: self.enable_socket_server,
            start_visible: self.start_visible,
            server: ServerOptions {
                host: self.server.host,
                port: self.server.port,
            },
            poller: poller::Options {
                interval: Duration::from_secs(self.polling_interval_secs),
                visible_refresh_delay: Duration::from_millis(self.visible_refresh_delay_ms),
            },
            highlight_duration: Duration::from_millis(self.highlight_duration_ms),
            notification_ttl: Duration::from_secs(self.notification_ttl_secs),
            access_token: self.access_token,
        }
    }
}

/// Backend API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Base URL for the backend API
    #[serde(default = "default_backend_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_backend_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: default_backend_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Local HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_server_host")]
    pub host: String,

    #[serde(default = "default_server_port")]
    pub port: u16,
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8090
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}
