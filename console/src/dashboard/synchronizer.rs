//! Deployment view synchronization

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::authn::session::SessionExt;
use crate::dashboard::in_flight::InFlight;
use crate::dashboard::signals::{ViewSignals, Visibility};
use crate::errors::ConsoleError;
use crate::http::deployments::DeploymentsApi;
use crate::models::deployment::{DeploymentAction, DeploymentId, Priority};
use crate::notify::Notifier;
use crate::store::snapshot::{Snapshot, SnapshotStore};
use crate::validate::dependencies::DependencyWarning;
use crate::validate::form::{DeploymentDetails, DependencyForm, FormView};
use crate::view::reconcile::{ReconcileOutcome, Reconciler};
use crate::view::state::{HandlerId, ViewState};

/// Result of one poll tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum TickOutcome {
    /// The deployments view is not on screen; nothing fetched
    Hidden,
    /// No usable session; nothing fetched
    Unauthenticated,
    /// A previous cycle is still waiting on its fetch
    Overlapping,
    /// The fetch failed; the previous view stands
    Failed { message: String },
    /// The view changed while the fetch was outstanding
    Discarded,
    Reconciled(ReconcileOutcome),
}

/// Poll bookkeeping
#[derive(Debug, Clone, Default, Serialize)]
pub struct PollState {
    pub last_attempted_at: Option<DateTime<Utc>>,
    pub last_reconciled_at: Option<DateTime<Utc>>,
    pub err_streak: u32,
}

/// Owns the deployments view and everything that feeds it
pub struct Dashboard {
    api: Arc<dyn DeploymentsApi>,
    session: Arc<dyn SessionExt>,
    signals: ViewSignals,
    store: SnapshotStore,
    view: RwLock<ViewState>,
    form: RwLock<DependencyForm>,
    notifier: Notifier,
    reconciler: Reconciler,
    in_flight: InFlight,
    poll_state: RwLock<PollState>,
}

impl Dashboard {
    pub fn new(
        api: Arc<dyn DeploymentsApi>,
        session: Arc<dyn SessionExt>,
        reconciler: Reconciler,
        notifier: Notifier,
    ) -> Self {
        Self {
            api,
            session,
            signals: ViewSignals::new(),
            store: SnapshotStore::new(),
            view: RwLock::new(ViewState::default()),
            form: RwLock::new(DependencyForm::new()),
            notifier,
            reconciler,
            in_flight: InFlight::new(),
            poll_state: RwLock::new(PollState::default()),
        }
    }

    pub fn signals(&self) -> &ViewSignals {
        &self.signals
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Show or hide the deployments view
    pub fn set_visible(&self, visible: bool) -> Visibility {
        self.signals.set_visible(visible)
    }

    pub async fn view(&self) -> ViewState {
        self.view.read().await.clone()
    }

    pub async fn poll_state(&self) -> PollState {
        self.poll_state.read().await.clone()
    }

    /// Run one fetch-and-reconcile cycle, if the guards allow it
    pub async fn refresh(&self) -> TickOutcome {
        let visibility = self.signals.current();
        if !visibility.visible {
            return TickOutcome::Hidden;
        }
        if !self.session.is_authenticated().await {
            return TickOutcome::Unauthenticated;
        }
        let Some(_slot) = self.in_flight.try_acquire() else {
            debug!("Previous poll still outstanding, dropping tick");
            return TickOutcome::Overlapping;
        };

        self.poll_state.write().await.last_attempted_at = Some(Utc::now());

        let snapshot = match self.fetch_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(ConsoleError::Unauthenticated) => return TickOutcome::Unauthenticated,
            Err(e) => {
                let mut state = self.poll_state.write().await;
                state.err_streak += 1;
                warn!("Refreshing deployments failed (attempt {}): {}", state.err_streak, e);
                let message = e.user_message();
                self.notifier.error(message.clone());
                return TickOutcome::Failed { message };
            }
        };

        if !self.signals.is_current(visibility.epoch) {
            debug!("Deployments view changed during fetch, discarding response");
            return TickOutcome::Discarded;
        }

        let snapshot = self.store.replace(snapshot);
        let outcome = {
            let mut view = self.view.write().await;
            let mut current = std::mem::take(&mut *view);
            current.clear_expired_emphasis(Instant::now());
            let (next, outcome) = self.reconciler.reconcile(current, &snapshot);
            *view = next;
            outcome
        };

        let mut state = self.poll_state.write().await;
        state.last_reconciled_at = Some(Utc::now());
        state.err_streak = 0;
        debug!(
            "Reconciled {} deployments via {:?}, {} highlighted",
            snapshot.len(),
            outcome.path,
            outcome.highlighted.len()
        );
        TickOutcome::Reconciled(outcome)
    }

    /// Fire the control bound to `handler_id`.
    ///
    /// Handlers that are no longer bound resolve to `Ok(None)` and do nothing.
    pub async fn dispatch(
        &self,
        handler_id: HandlerId,
    ) -> Result<Option<(DeploymentId, DeploymentAction)>, ConsoleError> {
        let resolved = self.view.read().await.resolve_handler(handler_id);
        let Some((deployment_id, action)) = resolved else {
            warn!("Ignoring stale control handler {}", handler_id);
            return Ok(None);
        };

        self.request_action(deployment_id, action).await?;
        Ok(Some((deployment_id, action)))
    }

    /// Ask the backend for a status transition and refresh right away
    pub async fn request_action(
        &self,
        deployment_id: DeploymentId,
        action: DeploymentAction,
    ) -> Result<(), ConsoleError> {
        let result = match self.session.bearer_token().await {
            Ok(token) => self.api.request_action(&token, deployment_id, action).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                info!("Requested {:?} for deployment {}", action, deployment_id);
                self.notifier.success(action.success_message());
                let outcome = self.refresh().await;
                debug!("Refresh after {:?}: {:?}", action, outcome);
                Ok(())
            }
            Err(e) => {
                error!("Failed to {:?} deployment {}: {}", action, deployment_id, e);
                self.notifier.error(e.user_message());
                Err(e)
            }
        }
    }

    /// Reload the dependency candidates for the creation form
    pub async fn refresh_candidates(&self) -> Result<Option<DependencyWarning>, ConsoleError> {
        let snapshot = match self.fetch_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!("Error loading deployments for dependencies: {}", e);
                return Err(e);
            }
        };
        let mut form = self.form.write().await;
        Ok(form.set_candidates(&snapshot).cloned())
    }

    /// Reload the candidates only while the list view is showing
    pub async fn refresh_candidates_if_visible(
        &self,
    ) -> Option<Result<Option<DependencyWarning>, ConsoleError>> {
        if !self.signals.current().visible {
            return None;
        }
        Some(self.refresh_candidates().await)
    }

    pub async fn set_priority(&self, priority: Priority) -> Option<DependencyWarning> {
        let mut form = self.form.write().await;
        form.set_priority(priority).cloned()
    }

    pub async fn select_dependencies(
        &self,
        ids: Vec<DeploymentId>,
    ) -> Result<Option<DependencyWarning>, ConsoleError> {
        let mut form = self.form.write().await;
        Ok(form.select(ids)?.cloned())
    }

    pub async fn form(&self) -> FormView {
        self.form.read().await.view()
    }

    /// Submit the creation form. A dependency warning does not block this;
    /// the backend decides.
    pub async fn submit(&self, details: DeploymentDetails) -> Result<DeploymentId, ConsoleError> {
        let request = self.form.read().await.create_request(details);
        let result = match self.session.bearer_token().await {
            Ok(token) => self.api.create_deployment(&token, &request).await,
            Err(e) => Err(e),
        };

        let created = match result {
            Ok(created) => created,
            Err(e) => {
                error!("Failed to create deployment {}: {}", request.name, e);
                self.notifier.error(e.user_message());
                return Err(e);
            }
        };

        info!("Created deployment {} ({})", created.name, created.id);
        self.notifier
            .success(format!("Deployment \"{}\" created successfully!", request.name));
        self.form.write().await.clear_selection();

        let (outcome, candidates) = futures::join!(self.refresh(), self.refresh_candidates());
        debug!("Refresh after create: {:?}", outcome);
        if let Err(e) = candidates {
            warn!("Candidate refresh after create failed: {}", e);
        }
        Ok(created.id)
    }

    async fn fetch_snapshot(&self) -> Result<Snapshot, ConsoleError> {
        let token = self.session.bearer_token().await?;
        let infos = self.api.list_deployments(&token).await?;
        Snapshot::from_wire(infos)
    }
}
