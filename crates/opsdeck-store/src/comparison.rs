//! Comparison/test-results module
//!
//! Holds the multi-controller performance/security comparison produced by
//! the test harness: parallel-indexed time series, aggregate scores,
//! per-dimension findings, and ranked recommendations. The dataset is
//! refreshed wholesale from a single fetch and swapped atomically so the
//! UI never pairs stale recommendations with fresh scores.

use crate::error::StoreError;
use crate::memo::Memo;
use crate::types::{Difference, Priority, Recommendation};
use opsdeck_gateway::{ApiGateway, Method};
use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Labels of the compared controller implementations, in series order
pub const CONTROLLER_LABELS: [&str; 3] = ["controller-A", "controller-B", "controller-C"];

/// Impact bound above which a difference counts as critical
pub const CRITICAL_IMPACT: f64 = 0.8;

/// Filename of the exported report artifact
pub const REPORT_FILENAME: &str = "test_report.pdf";

/// Per-controller response-time series, all sharing one time axis
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResponseTimes {
    pub controller_a: Vec<f64>,
    pub controller_b: Vec<f64>,
    pub controller_c: Vec<f64>,
}

/// Aggregate score vectors, one entry per controller in label order
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PerformanceMetrics {
    pub success_rates: Vec<f64>,
    pub performance_scores: Vec<f64>,
    pub security_scores: Vec<f64>,
}

/// Aggregate security scores per assessment dimension
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SecurityMetrics {
    pub vulnerability: f64,
    pub error_handling: f64,
    pub input_validation: f64,
}

/// Per-dimension security finding lists
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SecurityDetails {
    pub vulnerability: Vec<Value>,
    pub error_handling: Vec<Value>,
    pub input_validation: Vec<Value>,
}

/// The full comparison dataset as fetched from the backend
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComparisonDataset {
    pub total_tests: u64,
    pub success_rate: f64,
    pub time_labels: Vec<String>,
    pub response_times: ResponseTimes,
    pub performance_metrics: PerformanceMetrics,
    pub differences: Vec<Difference>,
    pub security_metrics: SecurityMetrics,
    pub security_details: SecurityDetails,
    pub recommendations: Vec<Recommendation>,
}

impl ComparisonDataset {
    /// Check that every response-time series shares the time-label axis
    fn validate(&self) -> Result<(), StoreError> {
        let expected = self.time_labels.len();
        let series = [
            (CONTROLLER_LABELS[0], &self.response_times.controller_a),
            (CONTROLLER_LABELS[1], &self.response_times.controller_b),
            (CONTROLLER_LABELS[2], &self.response_times.controller_c),
        ];
        for (label, values) in series {
            if values.len() != expected {
                return Err(StoreError::validation(format!(
                    "response-time series for {label} has {} points, expected {expected}",
                    values.len()
                )));
            }
        }
        Ok(())
    }
}

/// Headline numbers for the results page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestOverview {
    pub total_tests: u64,
    pub success_rate: f64,
    pub differences: usize,
}

/// Score vectors paired with the fixed controller label set
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerPerformance {
    pub labels: [&'static str; 3],
    pub success_rates: Vec<f64>,
    pub performance_scores: Vec<f64>,
    pub security_scores: Vec<f64>,
}

/// Security metrics bundled with their finding lists
#[derive(Debug, Clone, PartialEq)]
pub struct SecurityAssessment {
    pub metrics: SecurityMetrics,
    pub details: SecurityDetails,
}

#[derive(Debug, Default)]
struct ComparisonState {
    dataset: ComparisonDataset,
    loading: bool,
    error: Option<String>,
}

struct LoadingGuard<'a> {
    state: &'a RwLock<ComparisonState>,
}

impl<'a> LoadingGuard<'a> {
    fn engage(state: &'a RwLock<ComparisonState>) -> Self {
        state.write().loading = true;
        Self { state }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state.write().loading = false;
    }
}

/// Namespaced comparison subtree with memoized derived views
pub struct ComparisonModule {
    gateway: Arc<dyn ApiGateway>,
    state: RwLock<ComparisonState>,
    /// Bumped on every dataset commit; keys the view memos
    version: AtomicU64,
    generation: AtomicU64,
    export_dir: PathBuf,
    overview: Memo<TestOverview>,
    performance: Memo<ControllerPerformance>,
    critical: Memo<Vec<Difference>>,
    priority: Memo<Vec<Recommendation>>,
    security: Memo<SecurityAssessment>,
}

impl ComparisonModule {
    pub(crate) fn new(gateway: Arc<dyn ApiGateway>, export_dir: impl Into<PathBuf>) -> Self {
        Self {
            gateway,
            state: RwLock::new(ComparisonState::default()),
            version: AtomicU64::new(0),
            generation: AtomicU64::new(0),
            export_dir: export_dir.into(),
            overview: Memo::new(),
            performance: Memo::new(),
            critical: Memo::new(),
            priority: Memo::new(),
            security: Memo::new(),
        }
    }

    /// Fetch the dataset and swap it in atomically
    ///
    /// A payload that fails series validation is rejected whole: the
    /// previous dataset stays fully intact and the inconsistency is
    /// reported. Stale completions (an older refresh resolving after a
    /// newer one) do not commit.
    pub async fn refresh(&self) -> Result<(), StoreError> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let _loading = LoadingGuard::engage(&self.state);

        let payload = self
            .gateway
            .request(Method::Get, "/test-results", None)
            .await
            .map_err(|e| self.record_failure(e.into()))?;
        let dataset: ComparisonDataset = serde_json::from_value(payload)
            .map_err(|e| self.record_failure(StoreError::validation(e.to_string())))?;
        dataset.validate().map_err(|e| self.record_failure(e))?;

        if self.generation.load(Ordering::SeqCst) == ticket {
            let mut state = self.state.write();
            state.dataset = dataset;
            state.error = None;
            self.version.fetch_add(1, Ordering::SeqCst);
            tracing::info!("comparison dataset refreshed: {} tests", state.dataset.total_tests);
        } else {
            tracing::debug!("stale comparison refresh discarded");
        }
        Ok(())
    }

    /// Fetch the binary report and save it under the fixed filename
    ///
    /// Returns the written path. Failure propagates without mutating any
    /// module state.
    pub async fn export_report(&self) -> Result<PathBuf, StoreError> {
        let bytes = self
            .gateway
            .request_bytes(Method::Get, "/test-results/export")
            .await?;
        let path = self.export_dir.join(REPORT_FILENAME);
        tokio::fs::write(&path, &bytes).await?;
        tracing::info!("report exported to {}", path.display());
        Ok(path)
    }

    fn record_failure(&self, err: StoreError) -> StoreError {
        tracing::error!("comparison operation failed: {}", err);
        self.state.write().error = Some(err.to_string());
        err
    }

    // ---- derived views (memoized per dataset version) ----

    /// Total test count, overall success rate, difference count
    #[must_use]
    pub fn overview(&self) -> TestOverview {
        self.overview.get_or_compute(self.version(), || {
            let state = self.state.read();
            TestOverview {
                total_tests: state.dataset.total_tests,
                success_rate: state.dataset.success_rate,
                differences: state.dataset.differences.len(),
            }
        })
    }

    /// Per-controller score comparison under the fixed label set
    #[must_use]
    pub fn controller_performance(&self) -> ControllerPerformance {
        self.performance.get_or_compute(self.version(), || {
            let state = self.state.read();
            let metrics = &state.dataset.performance_metrics;
            ControllerPerformance {
                labels: CONTROLLER_LABELS,
                success_rates: metrics.success_rates.clone(),
                performance_scores: metrics.performance_scores.clone(),
                security_scores: metrics.security_scores.clone(),
            }
        })
    }

    /// Differences with `impact >= 0.8`
    #[must_use]
    pub fn critical_differences(&self) -> Vec<Difference> {
        self.critical.get_or_compute(self.version(), || {
            let state = self.state.read();
            state
                .dataset
                .differences
                .iter()
                .filter(|diff| diff.impact >= CRITICAL_IMPACT)
                .cloned()
                .collect()
        })
    }

    /// High-priority recommendations, most recent first
    ///
    /// The descending-timestamp order is contractual: the UI renders only
    /// the head of this list.
    #[must_use]
    pub fn priority_recommendations(&self) -> Vec<Recommendation> {
        self.priority.get_or_compute(self.version(), || {
            let state = self.state.read();
            let mut picks: Vec<Recommendation> = state
                .dataset
                .recommendations
                .iter()
                .filter(|rec| rec.priority == Priority::High)
                .cloned()
                .collect();
            picks.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
            picks
        })
    }

    /// Security metrics with their per-dimension finding lists
    #[must_use]
    pub fn security_assessment(&self) -> SecurityAssessment {
        self.security.get_or_compute(self.version(), || {
            let state = self.state.read();
            SecurityAssessment {
                metrics: state.dataset.security_metrics,
                details: state.dataset.security_details.clone(),
            }
        })
    }

    /// Snapshot of the raw dataset
    #[must_use]
    pub fn dataset(&self) -> ComparisonDataset {
        self.state.read().dataset.clone()
    }

    /// Directory the exported report is written to
    #[must_use]
    pub fn export_dir(&self) -> &Path {
        &self.export_dir
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

    fn version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }
}
