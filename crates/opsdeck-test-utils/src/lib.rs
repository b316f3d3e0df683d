//! Testing utilities for the opsdeck workspace
//!
//! Shared test helpers: a scripted gateway fake and payload fixtures.

#![allow(missing_docs)]

use async_trait::async_trait;
use bytes::Bytes;
use opsdeck_gateway::{ApiGateway, GatewayError, Method};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

/// One request as the store issued it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Debug)]
struct Scripted {
    result: Result<Value, GatewayError>,
    delay: Option<Duration>,
}

/// Scripted [`ApiGateway`] double
///
/// Responses are queued per (method, path) and consumed in order; every
/// request the store issues is recorded so tests can assert on exact
/// round-trip counts and bodies. An unscripted request fails with a
/// distinctive status rather than panicking inside the store.
#[derive(Debug, Default)]
pub struct FakeGateway {
    responses: Mutex<HashMap<(Method, String), VecDeque<Scripted>>>,
    binary: Mutex<HashMap<String, VecDeque<Result<Bytes, GatewayError>>>>,
    log: Mutex<Vec<RecordedRequest>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response
    pub fn respond(&self, method: Method, path: &str, payload: Value) {
        self.push(method, path, Ok(payload), None);
    }

    /// Queue a successful response that resolves after `delay`
    ///
    /// Used with a paused tokio clock to interleave in-flight requests
    /// deterministically.
    pub fn respond_after(&self, method: Method, path: &str, delay: Duration, payload: Value) {
        self.push(method, path, Ok(payload), Some(delay));
    }

    /// Queue a failure
    pub fn fail(&self, method: Method, path: &str, error: GatewayError) {
        self.push(method, path, Err(error), None);
    }

    /// Queue a successful binary response
    pub fn respond_bytes(&self, path: &str, payload: impl Into<Bytes>) {
        self.binary
            .lock()
            .entry(path.to_string())
            .or_default()
            .push_back(Ok(payload.into()));
    }

    /// Queue a binary failure
    pub fn fail_bytes(&self, path: &str, error: GatewayError) {
        self.binary
            .lock()
            .entry(path.to_string())
            .or_default()
            .push_back(Err(error));
    }

    /// Every request issued so far, in order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.log.lock().clone()
    }

    /// Number of requests issued against one (method, path)
    pub fn requests_to(&self, method: Method, path: &str) -> usize {
        self.log
            .lock()
            .iter()
            .filter(|req| req.method == method && req.path == path)
            .count()
    }

    fn push(
        &self,
        method: Method,
        path: &str,
        result: Result<Value, GatewayError>,
        delay: Option<Duration>,
    ) {
        self.responses
            .lock()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(Scripted { result, delay });
    }

    fn unscripted(method: Method, path: &str) -> GatewayError {
        GatewayError::Status {
            status: 599,
            message: format!("no scripted response for {method} {path}"),
        }
    }
}

#[async_trait]
impl ApiGateway for FakeGateway {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, GatewayError> {
        self.log.lock().push(RecordedRequest {
            method,
            path: path.to_string(),
            body,
        });

        let scripted = self
            .responses
            .lock()
            .get_mut(&(method, path.to_string()))
            .and_then(VecDeque::pop_front);
        match scripted {
            Some(Scripted { result, delay }) => {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                result
            }
            None => Err(Self::unscripted(method, path)),
        }
    }

    async fn request_bytes(&self, method: Method, path: &str) -> Result<Bytes, GatewayError> {
        self.log.lock().push(RecordedRequest {
            method,
            path: path.to_string(),
            body: None,
        });

        let scripted = self
            .binary
            .lock()
            .get_mut(path)
            .and_then(VecDeque::pop_front);
        scripted.unwrap_or_else(|| Err(Self::unscripted(method, path)))
    }
}

/// Install a test subscriber once; later calls are no-ops
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A full config payload with all three sections, distinct from the
/// seeded defaults
pub fn config_payload() -> Value {
    json!({
        "scheduler": {
            "schedulerStrategy": "load_balanced",
            "minControllers": 3,
            "maxControllers": 7,
            "scheduleInterval": 10,
            "switchCooldown": 60
        },
        "alerting": {
            "loadThreshold": 70,
            "latencyThreshold": 800,
            "errorThreshold": 5,
            "checkInterval": 15
        },
        "system": {
            "dataRetention": 60,
            "monitorInterval": 10,
            "logLevel": "debug",
            "autoBackup": false,
            "backupInterval": 24
        }
    })
}

/// A three-controller roster payload covering every liveness state
pub fn controllers_payload() -> Value {
    json!({
        "controller-a": {
            "id": "controller-a",
            "status": "running",
            "health": {"cpuLoad": 12.5, "uptimeSecs": 3600}
        },
        "controller-b": {
            "status": "stopped",
            "health": {}
        },
        "controller-c": {
            "status": "error",
            "health": {"lastError": "connection refused"}
        }
    })
}

/// A valid comparison dataset: three time points, three consistent
/// series, mixed-impact differences, mixed-priority recommendations
pub fn comparison_payload() -> Value {
    json!({
        "totalTests": 128,
        "successRate": 0.92,
        "timeLabels": ["t0", "t1", "t2"],
        "responseTimes": {
            "controllerA": [10.0, 11.0, 9.5],
            "controllerB": [12.0, 14.0, 13.0],
            "controllerC": [9.0, 9.2, 9.1]
        },
        "performanceMetrics": {
            "successRates": [0.95, 0.88, 0.93],
            "performanceScores": [87.0, 74.0, 81.0],
            "securityScores": [90.0, 70.0, 85.0]
        },
        "differences": [
            {"description": "flow install ordering diverges under churn", "impact": 0.9},
            {"description": "LLDP timer drift between implementations", "impact": 0.4}
        ],
        "securityMetrics": {
            "vulnerability": 82.0,
            "errorHandling": 76.0,
            "inputValidation": 88.0
        },
        "securityDetails": {
            "vulnerability": [{"id": "V-3", "summary": "stale session token accepted"}],
            "errorHandling": [],
            "inputValidation": []
        },
        "recommendations": [
            {
                "priority": "high",
                "text": "pin controller-B flow table version",
                "timestamp": "2026-01-10T12:00:00Z"
            },
            {
                "priority": "low",
                "text": "tune LLDP interval",
                "timestamp": "2026-01-12T12:00:00Z"
            },
            {
                "priority": "high",
                "text": "quarantine controller-C until error handling is fixed",
                "timestamp": "2026-01-11T12:00:00Z"
            }
        ]
    })
}
