//! Time-bounded alert queue
//!
//! Producers raise alerts; each alert with a non-zero TTL gets its own
//! cancellable timer task that expires it. Expiry and dismissal are both
//! idempotent because the timer and a manual dismiss may race — either
//! order is safe.

use crate::types::{Alert, AlertId, AlertKind};
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// TTL applied by [`AlertQueue::raise`]
pub const DEFAULT_ALERT_TTL: Duration = Duration::from_millis(3000);

#[derive(Debug)]
struct AlertQueueInner {
    next_id: AtomicU64,
    alerts: RwLock<Vec<Alert>>,
    timers: DashMap<AlertId, JoinHandle<()>>,
}

/// Insertion-ordered queue of alerts with automatic expiry
///
/// Cheap to clone; clones share the same queue. Raising an alert with a
/// non-zero TTL spawns its expiry timer on the current tokio runtime.
#[derive(Debug, Clone)]
pub struct AlertQueue {
    inner: Arc<AlertQueueInner>,
}

impl Default for AlertQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertQueue {
    /// Create an empty queue
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(AlertQueueInner {
                next_id: AtomicU64::new(1),
                alerts: RwLock::new(Vec::new()),
                timers: DashMap::new(),
            }),
        }
    }

    /// Raise an alert with the default TTL
    pub fn raise(&self, kind: AlertKind, message: impl Into<String>) -> AlertId {
        self.raise_with_ttl(kind, message, Some(DEFAULT_ALERT_TTL))
    }

    /// Raise an alert with an explicit TTL
    ///
    /// `None` or a zero duration means the alert persists until dismissed.
    /// Duplicate messages are allowed and produce distinct entries.
    pub fn raise_with_ttl(
        &self,
        kind: AlertKind,
        message: impl Into<String>,
        ttl: Option<Duration>,
    ) -> AlertId {
        let id = AlertId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let alert = Alert {
            id,
            kind,
            message: message.into(),
            created_at: Utc::now(),
            ttl,
        };
        tracing::debug!("alert {} raised ({:?}): {}", id, kind, alert.message);
        self.inner.alerts.write().push(alert);

        if let Some(ttl) = ttl.filter(|ttl| !ttl.is_zero()) {
            let queue = self.clone();
            let handle = tokio::spawn(async move {
                tokio::time::sleep(ttl).await;
                queue.expire(id);
            });
            self.inner.timers.insert(id, handle);
        }

        id
    }

    /// Remove an alert whose TTL elapsed; no-op if already removed
    pub fn expire(&self, id: AlertId) {
        let removed = {
            let mut alerts = self.inner.alerts.write();
            let before = alerts.len();
            alerts.retain(|alert| alert.id != id);
            alerts.len() != before
        };
        self.inner.timers.remove(&id);
        if removed {
            tracing::debug!("alert {} expired", id);
        }
    }

    /// User-initiated removal; cancels the pending timer
    ///
    /// Safe to call twice, and safe after natural expiry — aborting a
    /// timer that already fired is a no-op.
    pub fn dismiss(&self, id: AlertId) {
        if let Some((_, handle)) = self.inner.timers.remove(&id) {
            handle.abort();
        }
        self.inner.alerts.write().retain(|alert| alert.id != id);
    }

    /// Current alerts in insertion order
    #[must_use]
    pub fn list(&self) -> Vec<Alert> {
        self.inner.alerts.read().clone()
    }

    /// Number of queued alerts
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.alerts.read().len()
    }

    /// Whether the queue is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.alerts.read().is_empty()
    }
}
