//! Shared types for the store modules
//!
//! Wire-facing types keep the backend's camelCase keys; identifiers that
//! only exist client-side (alert ids) are plain newtypes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

/// Open key→value record, the shape of a config section and of controller
/// health metadata
pub type Section = Map<String, Value>;

/// Strictly increasing alert identifier
///
/// Ids are handed out by a process-local atomic counter and never reused,
/// so the queue renders and de-duplicates deterministically even when
/// several alerts are raised within the same millisecond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AlertId(pub u64);

impl std::fmt::Display for AlertId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Severity class of a queued alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertKind {
    Info,
    Warning,
    Error,
    Success,
}

/// A queued, optionally time-bounded notification
#[derive(Debug, Clone)]
pub struct Alert {
    pub id: AlertId,
    pub kind: AlertKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
    /// `None` (or zero) means the alert persists until dismissed
    pub ttl: Option<Duration>,
}

/// Liveness state reported by the backend for a managed controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerState {
    Running,
    Stopped,
    Error,
}

/// One managed controller instance as the backend reports it
///
/// The roster is keyed by controller id; the backend is the single source
/// of truth for liveness, so these entries are only ever replaced
/// wholesale, never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Controller {
    #[serde(default)]
    pub id: String,
    pub status: ControllerState,
    #[serde(default)]
    pub health: Section,
}

/// Recommendation priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// One behavioral difference found between controller implementations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Difference {
    pub description: String,
    /// Impact score in `[0, 1]`
    pub impact: f64,
}

/// One ranked recommendation from the comparison run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}
