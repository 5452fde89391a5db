//! Polling worker for the deployments view

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior, Sleep};
use tracing::{debug, error, info};

use crate::dashboard::{Dashboard, TickOutcome};

/// Poller worker options
#[derive(Debug, Clone)]
pub struct Options {
    /// Polling interval
    pub interval: Duration,

    /// Delay of the extra refresh after the view becomes visible
    pub visible_refresh_delay: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            visible_refresh_delay: Duration::from_secs(1),
        }
    }
}

/// Run the poller worker.
///
/// Ticks on a fixed period; ticks missed while a cycle is running are
/// skipped. Each time the view becomes visible an extra tick fires after
/// `visible_refresh_delay`, together with a reload of the dependency
/// candidates.
pub async fn run(
    options: &Options,
    dashboard: &Dashboard,
    mut shutdown_signal: Pin<Box<dyn Future<Output = ()> + Send>>,
) {
    info!("Poller worker starting...");

    let mut ticker = interval_at(Instant::now() + options.interval, options.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut visibility = dashboard.signals().subscribe();
    let mut visible_refresh: Option<Pin<Box<Sleep>>> = None;
    if visibility.borrow_and_update().visible {
        visible_refresh = Some(Box::pin(sleep(options.visible_refresh_delay)));
    }

    loop {
        let out_of_band = tokio::select! {
            _ = &mut shutdown_signal => {
                info!("Poller worker shutting down...");
                return;
            }
            _ = ticker.tick() => false,
            _ = wait_for(&mut visible_refresh) => {
                visible_refresh = None;
                true
            }
            changed = visibility.changed() => {
                if changed.is_err() {
                    info!("View signals closed, poller worker exiting...");
                    return;
                }
                let visible = visibility.borrow_and_update().visible;
                visible_refresh = visible.then(|| Box::pin(sleep(options.visible_refresh_delay)));
                continue;
            }
        };

        if out_of_band {
            if let Some(Err(e)) = dashboard.refresh_candidates_if_visible().await {
                error!("Dependency candidate refresh failed: {}", e);
            }
        }

        match dashboard.refresh().await {
            TickOutcome::Reconciled(outcome) => {
                debug!("Poll reconciled: {:?}", outcome);
            }
            TickOutcome::Failed { message } => {
                error!("Poll failed: {}", message);
            }
            other => {
                debug!("Poll skipped: {:?}", other);
            }
        }
    }
}

async fn wait_for(deadline: &mut Option<Pin<Box<Sleep>>>) {
    match deadline.as_mut() {
        Some(sleep) => sleep.as_mut().await,
        None => std::future::pending().await,
    }
}
