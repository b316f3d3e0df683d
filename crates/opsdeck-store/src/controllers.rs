//! Controller roster module
//!
//! Holds the current status of every managed controller instance. The
//! backend is the single source of truth for liveness, so the roster is
//! always replaced wholesale on fetch; start/stop commands round-trip
//! through the backend and are followed by a refresh rather than an
//! assumed local transition.

use crate::error::StoreError;
use crate::types::Controller;
use opsdeck_gateway::{ApiGateway, Method};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct RosterState {
    controllers: BTreeMap<String, Controller>,
    loading: bool,
    error: Option<String>,
}

/// Clears the loading flag on every exit path of a refresh
struct LoadingGuard<'a> {
    state: &'a RwLock<RosterState>,
}

impl<'a> LoadingGuard<'a> {
    fn engage(state: &'a RwLock<RosterState>) -> Self {
        state.write().loading = true;
        Self { state }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state.write().loading = false;
    }
}

/// Namespaced roster subtree with command round-trips
pub struct ControllerRoster {
    gateway: Arc<dyn ApiGateway>,
    state: RwLock<RosterState>,
    generation: AtomicU64,
}

impl ControllerRoster {
    pub(crate) fn new(gateway: Arc<dyn ApiGateway>) -> Self {
        Self {
            gateway,
            state: RwLock::new(RosterState::default()),
            generation: AtomicU64::new(0),
        }
    }

    /// Fetch the roster and replace it wholesale
    ///
    /// A refresh that resolves after a newer one has already committed is
    /// discarded, so out-of-order network completions cannot overwrite
    /// fresher data.
    pub async fn refresh(&self) -> Result<(), StoreError> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let _loading = LoadingGuard::engage(&self.state);

        let payload = self
            .gateway
            .request(Method::Get, "/controllers", None)
            .await
            .map_err(|e| self.record_failure(e.into()))?;
        let mut roster: BTreeMap<String, Controller> = serde_json::from_value(payload)
            .map_err(|e| self.record_failure(StoreError::validation(e.to_string())))?;

        // The map key is authoritative; entries without an inline id get it
        // from the key.
        for (id, controller) in roster.iter_mut() {
            if controller.id.is_empty() {
                controller.id = id.clone();
            }
        }

        if self.generation.load(Ordering::SeqCst) == ticket {
            let mut state = self.state.write();
            state.controllers = roster;
            state.error = None;
            tracing::info!("roster refreshed: {} controllers", state.controllers.len());
        } else {
            tracing::debug!("stale roster refresh discarded");
        }
        Ok(())
    }

    /// Start a controller, then refresh the roster
    pub async fn start(&self, id: &str) -> Result<(), StoreError> {
        self.command(id, "start").await
    }

    /// Stop a controller, then refresh the roster
    pub async fn stop(&self, id: &str) -> Result<(), StoreError> {
        self.command(id, "stop").await
    }

    /// One-shot health query; returns the payload and mutates nothing
    ///
    /// Health is informational — the roster's status field stays owned by
    /// `refresh`.
    pub async fn health_check(&self, id: &str) -> Result<Value, StoreError> {
        let path = format!("/controllers/{id}/health");
        let payload = self.gateway.request(Method::Get, &path, None).await?;
        Ok(payload)
    }

    /// Issue a lifecycle command; a rejected command surfaces before any
    /// refresh is attempted
    async fn command(&self, id: &str, verb: &str) -> Result<(), StoreError> {
        let path = format!("/controllers/{id}/{verb}");
        if let Err(source) = self.gateway.request(Method::Post, &path, None).await {
            tracing::warn!("{} rejected for controller {}: {}", verb, id, source);
            self.state.write().error = Some(source.to_string());
            return Err(StoreError::CommandRejected {
                controller: id.to_string(),
                source,
            });
        }

        tracing::info!("{} accepted for controller {}", verb, id);
        self.refresh().await
    }

    fn record_failure(&self, err: StoreError) -> StoreError {
        tracing::error!("roster operation failed: {}", err);
        self.state.write().error = Some(err.to_string());
        err
    }

    /// Snapshot of the roster in id order
    #[must_use]
    pub fn controllers(&self) -> Vec<Controller> {
        self.state.read().controllers.values().cloned().collect()
    }

    /// Snapshot of one controller by id
    #[must_use]
    pub fn controller(&self, id: &str) -> Option<Controller> {
        self.state.read().controllers.get(id).cloned()
    }

    /// Whether a refresh is currently in flight
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.read().loading
    }

    /// Most recent recorded failure, for passive display
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.state.read().error.clone()
    }
}
