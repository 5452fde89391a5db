//! Deployment snapshot store

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use openapi_client::models::DeploymentInfo;

use crate::errors::ConsoleError;
use crate::models::deployment::{Deployment, DeploymentId};

/// Ordered list of deployments observed at one fetch instant
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    deployments: Vec<Deployment>,
}

impl Snapshot {
    /// Build a snapshot, rejecting duplicate ids
    pub fn new(deployments: Vec<Deployment>) -> Result<Self, ConsoleError> {
        let mut seen = HashSet::with_capacity(deployments.len());
        for deployment in &deployments {
            if !seen.insert(deployment.id) {
                return Err(ConsoleError::MalformedSnapshot(format!(
                    "duplicate deployment id {}",
                    deployment.id
                )));
            }
        }
        Ok(Self { deployments })
    }

    /// Normalize a backend listing into a snapshot
    pub fn from_wire(infos: Vec<DeploymentInfo>) -> Result<Self, ConsoleError> {
        let deployments = infos
            .into_iter()
            .map(Deployment::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(deployments)
    }

    pub fn deployments(&self) -> &[Deployment] {
        &self.deployments
    }

    pub fn iter(&self) -> impl Iterator<Item = &Deployment> {
        self.deployments.iter()
    }

    pub fn ids(&self) -> HashSet<DeploymentId> {
        self.deployments.iter().map(|d| d.id).collect()
    }

    pub fn get(&self, id: DeploymentId) -> Option<&Deployment> {
        self.deployments.iter().find(|d| d.id == id)
    }

    pub fn len(&self) -> usize {
        self.deployments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deployments.is_empty()
    }
}

/// Store entry
#[derive(Debug, Clone)]
pub struct StoredSnapshot {
    pub snapshot: Arc<Snapshot>,
    pub fetched_at: Option<DateTime<Utc>>,
}

/// Holds the most recent snapshot
///
/// Readers receive an `Arc` to a whole snapshot, so a replacement is never
/// observed half-applied.
pub struct SnapshotStore {
    current: RwLock<StoredSnapshot>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(StoredSnapshot {
                snapshot: Arc::new(Snapshot::default()),
                fetched_at: None,
            }),
        }
    }

    /// Replace the current snapshot wholesale
    pub fn replace(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        *current = StoredSnapshot {
            snapshot: snapshot.clone(),
            fetched_at: Some(Utc::now()),
        };
        snapshot
    }

    /// Get the current snapshot
    pub fn current(&self) -> Arc<Snapshot> {
        let current = self.current.read().unwrap_or_else(|e| e.into_inner());
        current.snapshot.clone()
    }

    /// Time of the last successful fetch, if any
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        let current = self.current.read().unwrap_or_else(|e| e.into_inner());
        current.fetched_at
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}
