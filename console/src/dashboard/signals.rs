//! View visibility signals

use serde::Serialize;
use tokio::sync::watch;
use tracing::debug;

/// Visibility of the deployments view
///
/// `epoch` increases on every change, so a result computed for one showing of
/// the view can be told apart from a later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Visibility {
    pub visible: bool,
    pub epoch: u64,
}

/// Publishes whether the deployments view is the one on screen
pub struct ViewSignals {
    tx: watch::Sender<Visibility>,
}

impl ViewSignals {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Visibility {
            visible: false,
            epoch: 0,
        });
        Self { tx }
    }

    /// Show or hide the view; returns the resulting visibility
    pub fn set_visible(&self, visible: bool) -> Visibility {
        self.tx.send_if_modified(|current| {
            if current.visible == visible {
                return false;
            }
            current.visible = visible;
            current.epoch += 1;
            debug!("Deployments view visible={} (epoch {})", visible, current.epoch);
            true
        });
        self.current()
    }

    pub fn current(&self) -> Visibility {
        *self.tx.borrow()
    }

    /// Whether the view is still visible in the same showing as `epoch`
    pub fn is_current(&self, epoch: u64) -> bool {
        let current = self.current();
        current.visible && current.epoch == epoch
    }

    pub fn subscribe(&self) -> watch::Receiver<Visibility> {
        self.tx.subscribe()
    }
}

impl Default for ViewSignals {
    fn default() -> Self {
        Self::new()
    }
}
