//! Root store
//!
//! Composes the namespaced modules into one explicitly constructed state
//! container. There is no ambient global: callers build a [`Store`]
//! against a gateway and hand it (by reference or `Arc`) to whatever
//! needs it. The root owns the alert queue and the cross-cutting
//! loading/error flags; modules own their subtrees exclusively.

use crate::alerts::AlertQueue;
use crate::comparison::ComparisonModule;
use crate::config::ConfigModule;
use crate::controllers::ControllerRoster;
use crate::error::StoreError;
use crate::types::AlertKind;
use opsdeck_gateway::ApiGateway;
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;

/// Construction-time settings for the store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory exported report artifacts are written to
    pub export_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            export_dir: std::env::temp_dir(),
        }
    }
}

#[derive(Debug, Default)]
struct GlobalFlags {
    loading: bool,
    error: Option<String>,
}

/// Top-level state container for the dashboard
pub struct Store {
    alerts: AlertQueue,
    config: ConfigModule,
    controllers: ControllerRoster,
    comparison: ComparisonModule,
    flags: RwLock<GlobalFlags>,
}

impl Store {
    /// Build a store with default settings
    #[must_use]
    pub fn new(gateway: Arc<dyn ApiGateway>) -> Self {
        Self::with_config(gateway, StoreConfig::default())
    }

    /// Build a store with explicit settings
    #[must_use]
    pub fn with_config(gateway: Arc<dyn ApiGateway>, config: StoreConfig) -> Self {
        Self {
            alerts: AlertQueue::new(),
            config: ConfigModule::new(gateway.clone()),
            controllers: ControllerRoster::new(gateway.clone()),
            comparison: ComparisonModule::new(gateway, config.export_dir),
            flags: RwLock::new(GlobalFlags::default()),
        }
    }

    /// Load configuration and the controller roster
    ///
    /// A configuration failure propagates to the caller — the dashboard
    /// must not continue on local defaults — and is raised as an error
    /// alert for passive display. The roster is only refreshed once the
    /// configuration load succeeded.
    pub async fn initialize(&self) -> Result<(), StoreError> {
        if let Err(err) = self.config.load_all().await {
            self.alerts
                .raise(AlertKind::Error, format!("configuration load failed: {err}"));
            return Err(err);
        }
        if let Err(err) = self.controllers.refresh().await {
            self.alerts
                .raise(AlertKind::Error, format!("roster refresh failed: {err}"));
            return Err(err);
        }
        tracing::info!("store initialized");
        Ok(())
    }

    /// The alert queue (raise/dismiss/list)
    #[must_use]
    pub fn alerts(&self) -> &AlertQueue {
        &self.alerts
    }

    /// The configuration module
    #[must_use]
    pub fn config(&self) -> &ConfigModule {
        &self.config
    }

    /// The controller roster module
    #[must_use]
    pub fn controllers(&self) -> &ControllerRoster {
        &self.controllers
    }

    /// The comparison/test-results module
    #[must_use]
    pub fn comparison(&self) -> &ComparisonModule {
        &self.comparison
    }

    /// Set the cross-cutting loading flag
    pub fn set_loading(&self, loading: bool) {
        self.flags.write().loading = loading;
    }

    /// Cross-cutting loading flag
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.flags.read().loading
    }

    /// Set or clear the cross-cutting error
    pub fn set_error(&self, error: Option<String>) {
        self.flags.write().error = error;
    }

    /// Cross-cutting error, if any
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.flags.read().error.clone()
    }
}
