//! Configuration module
//!
//! Mirrors the server-held multi-section configuration: scheduler
//! parameters, alert thresholds, system parameters. Section updates are
//! shallow merges that never drop keys absent from the patch; only a full
//! load/save/reset replaces sections wholesale. Every persisting operation
//! commits locally **after** the remote call succeeds, so unsaved state is
//! never shown as saved.

use crate::error::StoreError;
use crate::types::Section;
use chrono::{DateTime, Utc};
use opsdeck_gateway::{ApiGateway, Method};
use parking_lot::RwLock;
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// The fixed set of named config sections
pub const CONFIG_SECTIONS: [&str; 3] = ["scheduler", "alerting", "system"];

/// Full-config payload: section name → section object
pub type ConfigPayload = Map<String, Value>;

/// Scheduler pool bounds, derived from the scheduler section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerLimits {
    pub min: u64,
    pub max: u64,
}

/// Alerting thresholds, derived from the alerting section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertThresholds {
    pub load: u64,
    pub latency: u64,
    pub error: u64,
}

#[derive(Debug, Clone)]
struct ConfigState {
    scheduler: Section,
    alerting: Section,
    system: Section,
    last_update: Option<DateTime<Utc>>,
    initialized: bool,
    error: Option<String>,
}

impl ConfigState {
    fn section(&self, name: &str) -> Option<&Section> {
        match name {
            "scheduler" => Some(&self.scheduler),
            "alerting" => Some(&self.alerting),
            "system" => Some(&self.system),
            _ => None,
        }
    }

    fn section_mut(&mut self, name: &str) -> Option<&mut Section> {
        match name {
            "scheduler" => Some(&mut self.scheduler),
            "alerting" => Some(&mut self.alerting),
            "system" => Some(&mut self.system),
            _ => None,
        }
    }
}

impl Default for ConfigState {
    fn default() -> Self {
        Self {
            scheduler: seeded(&[
                ("schedulerStrategy", json!("health_aware")),
                ("minControllers", json!(2)),
                ("maxControllers", json!(5)),
                ("scheduleInterval", json!(5)),
                ("switchCooldown", json!(30)),
            ]),
            alerting: seeded(&[
                ("loadThreshold", json!(80)),
                ("latencyThreshold", json!(1000)),
                ("errorThreshold", json!(10)),
                ("checkInterval", json!(30)),
            ]),
            system: seeded(&[
                ("dataRetention", json!(30)),
                ("monitorInterval", json!(5)),
                ("logLevel", json!("info")),
                ("autoBackup", json!(true)),
                ("backupInterval", json!(12)),
            ]),
            last_update: None,
            initialized: false,
            error: None,
        }
    }
}

fn seeded(entries: &[(&str, Value)]) -> Section {
    entries
        .iter()
        .map(|(key, value)| ((*key).to_string(), value.clone()))
        .collect()
}

/// Namespaced config subtree with merge-correct section updates
pub struct ConfigModule {
    gateway: Arc<dyn ApiGateway>,
    state: RwLock<ConfigState>,
}

impl ConfigModule {
    pub(crate) fn new(gateway: Arc<dyn ApiGateway>) -> Self {
        Self {
            gateway,
            state: RwLock::new(ConfigState::default()),
        }
    }

    /// Fetch the full configuration and replace every section wholesale
    ///
    /// The first successful load flips `initialized`; a later failure
    /// leaves the flag (and all sections) at their previous values.
    /// Initialization callers must propagate the failure instead of
    /// continuing with local defaults.
    pub async fn load_all(&self) -> Result<(), StoreError> {
        let payload = self
            .gateway
            .request(Method::Get, "/config", None)
            .await
            .map_err(|e| self.record_failure(e.into()))?;
        self.apply_full(&payload, true)
            .map_err(|e| self.record_failure(e))?;
        tracing::info!("configuration loaded");
        Ok(())
    }

    /// Persist a full configuration, then apply it locally
    ///
    /// No optimistic apply: a persistence failure leaves local state
    /// untouched.
    pub async fn save_all(&self, config: ConfigPayload) -> Result<(), StoreError> {
        let payload = Value::Object(config);
        self.gateway
            .request(Method::Put, "/config", Some(payload.clone()))
            .await
            .map_err(|e| self.record_failure(StoreError::Persistence(e)))?;
        self.apply_full(&payload, false)
            .map_err(|e| self.record_failure(e))?;
        tracing::info!("configuration saved");
        Ok(())
    }

    /// Request a server-side reset and apply the returned defaults
    ///
    /// The server is authoritative for what "default" means; local
    /// constants are never applied here.
    pub async fn reset_to_defaults(&self) -> Result<(), StoreError> {
        let defaults = self
            .gateway
            .request(Method::Post, "/config/reset", None)
            .await
            .map_err(|e| self.record_failure(e.into()))?;
        self.apply_full(&defaults, false)
            .map_err(|e| self.record_failure(e))?;
        tracing::info!("configuration reset to server defaults");
        Ok(())
    }

    /// Merge a partial patch into one section, persisting before the
    /// local commit
    ///
    /// Exactly one remote persist request is issued per call; patch keys
    /// win, keys absent from the patch survive. On persistence failure the
    /// local section is exactly what it was before the call.
    pub async fn update_section(&self, name: &str, patch: Section) -> Result<(), StoreError> {
        let merged = {
            let state = self.state.read();
            let current = state
                .section(name)
                .ok_or_else(|| StoreError::UnknownSection(name.to_string()))?;
            let mut merged = current.clone();
            for (key, value) in patch {
                merged.insert(key, value);
            }
            merged
        };

        let mut body = Map::new();
        body.insert(name.to_string(), Value::Object(merged.clone()));
        self.gateway
            .request(Method::Put, "/config", Some(Value::Object(body)))
            .await
            .map_err(|e| self.record_failure(StoreError::Persistence(e)))?;

        let mut state = self.state.write();
        if let Some(section) = state.section_mut(name) {
            *section = merged;
        }
        state.error = None;
        tracing::info!("config section {} updated", name);
        Ok(())
    }

    /// Replace the sections present in `payload`, validating the whole
    /// payload before committing anything
    fn apply_full(&self, payload: &Value, mark_initialized: bool) -> Result<(), StoreError> {
        let sections = payload
            .as_object()
            .ok_or_else(|| StoreError::validation("config payload must be an object"))?;

        let mut staged: Vec<(&str, Section)> = Vec::new();
        for name in CONFIG_SECTIONS {
            if let Some(value) = sections.get(name) {
                let section = value.as_object().ok_or_else(|| {
                    StoreError::validation(format!("config section {name} must be an object"))
                })?;
                staged.push((name, section.clone()));
            }
        }

        let mut state = self.state.write();
        for (name, section) in staged {
            if let Some(slot) = state.section_mut(name) {
                *slot = section;
            }
        }
        state.last_update = Some(Utc::now());
        if mark_initialized {
            state.initialized = true;
        }
        state.error = None;
        Ok(())
    }

    fn record_failure(&self, err: StoreError) -> StoreError {
        tracing::error!("config operation failed: {}", err);
        self.state.write().error = Some(err.to_string());
        err
    }

    // ---- derived views (pure, recomputed from current sections) ----

    /// `{min, max}` controller bounds from the scheduler section
    #[must_use]
    pub fn scheduler_limits(&self) -> ControllerLimits {
        let state = self.state.read();
        ControllerLimits {
            min: value_u64(&state.scheduler, "minControllers"),
            max: value_u64(&state.scheduler, "maxControllers"),
        }
    }

    /// Active scheduler strategy name
    #[must_use]
    pub fn scheduler_strategy(&self) -> Option<String> {
        value_string(&self.state.read().scheduler, "schedulerStrategy")
    }

    /// Load/latency/error thresholds from the alerting section
    #[must_use]
    pub fn alert_thresholds(&self) -> AlertThresholds {
        let state = self.state.read();
        AlertThresholds {
            load: value_u64(&state.alerting, "loadThreshold"),
            latency: value_u64(&state.alerting, "latencyThreshold"),
            error: value_u64(&state.alerting, "errorThreshold"),
        }
    }

    /// Configured log level from the system section
    #[must_use]
    pub fn log_level(&self) -> Option<String> {
        value_string(&self.state.read().system, "logLevel")
    }

    /// Snapshot of one section by name
    #[must_use]
    pub fn section(&self, name: &str) -> Option<Section> {
        self.state.read().section(name).cloned()
    }

    /// Whether the first full load has succeeded
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state.read().initialized
    }

    /// Timestamp of the last successful full load or explicit update
    #[must_use]
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.state.read().last_update
    }

    /// Most recent recorded failure, for passive display
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.state.read().error.clone()
    }
}

fn value_u64(section: &Section, key: &str) -> u64 {
    section.get(key).and_then(Value::as_u64).unwrap_or(0)
}

fn value_string(section: &Section, key: &str) -> Option<String> {
    section.get(key).and_then(Value::as_str).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    use opsdeck_test_utils::FakeGateway;

    fn module() -> (Arc<FakeGateway>, ConfigModule) {
        let gateway = Arc::new(FakeGateway::new());
        let config = ConfigModule::new(gateway.clone());
        (gateway, config)
    }

    #[test]
    fn seeded_defaults_feed_the_views() {
        let (_, config) = module();

        assert_eq!(config.scheduler_limits(), ControllerLimits { min: 2, max: 5 });
        assert_eq!(config.scheduler_strategy().as_deref(), Some("health_aware"));
        assert_eq!(
            config.alert_thresholds(),
            AlertThresholds {
                load: 80,
                latency: 1000,
                error: 10
            }
        );
        assert_eq!(config.log_level().as_deref(), Some("info"));
        assert!(!config.is_initialized());
        assert!(config.last_update().is_none());
    }

    #[test]
    fn unknown_section_lookup_is_none() {
        let (_, config) = module();
        assert!(config.section("topology").is_none());
        assert!(config.section("scheduler").is_some());
    }

    #[tokio::test]
    async fn update_unknown_section_fails_without_a_request() {
        let (gateway, config) = module();

        let result = config.update_section("topology", Section::new()).await;

        assert!(matches!(result, Err(StoreError::UnknownSection(name)) if name == "topology"));
        assert!(gateway.requests().is_empty());
    }
}
