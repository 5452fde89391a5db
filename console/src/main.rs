//! dashsync - Entry Point
//!
//! Keeps the cluster dashboard's deployment list in step with the backend.

use std::env;

use dashsync::app::run::run;
use dashsync::logs::{init_logging, LogOptions};
use dashsync::storage::settings::Settings;
use dashsync::utils::{parse_cli_args, version_info};

use tracing::{error, info};

/// Environment variable overriding the configured access token
const TOKEN_ENV_VAR: &str = "DASHSYNC_TOKEN";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli_args = parse_cli_args(env::args().skip(1));

    // Print version and exit
    if cli_args.contains_key("version") {
        match serde_json::to_string_pretty(&version_info()) {
            Ok(version) => println!("{}", version),
            Err(e) => eprintln!("Failed to serialize version info: {e}"),
        }
        return;
    }

    // Retrieve the settings file
    let mut settings = match cli_args.get("settings") {
        Some(path) => match Settings::load(path).await {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("Unable to read settings file {path}: {e}");
                return;
            }
        },
        None => Settings::default(),
    };

    // Token precedence: environment, then command line, then settings file
    if let Some(token) = cli_args.get("token") {
        settings.access_token = Some(token.clone());
    }
    if let Ok(token) = env::var(TOKEN_ENV_VAR) {
        if !token.trim().is_empty() {
            settings.access_token = Some(token);
        }
    }
    if cli_args.contains_key("visible") {
        settings.start_visible = true;
    }

    // Initialize logging
    let log_options = LogOptions {
        log_level: settings.log_level,
        json_format: settings.log_json,
        ..Default::default()
    };
    if let Err(e) = init_logging(log_options) {
        println!("Failed to initialize logging: {e}");
    }

    let options = settings.into_app_options();
    info!(
        "Running dashsync against {} (poll every {:?})",
        options.backend_base_url, options.poller.interval
    );
    if let Err(e) = run(options, await_shutdown_signal()).await {
        error!("Failed to run dashsync: {e}");
    }
}

async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                error!("Unable to listen for SIGTERM: {e}");
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };

        tokio::select! {
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down...");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl+C received, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Unable to listen for Ctrl+C: {e}");
        }
        info!("Ctrl+C received, shutting down...");
    }
}
