//! Metrics
//!
//! Task retry metrics collection interfaces and implementations.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Metric labels.
pub type MetricLabels = HashMap<String, String>;

/// Task retry metrics interface.
pub trait TaskMetrics: Send + Sync {
    /// Record a dispatched task attempt.
    fn record_attempt(&self, attempt: u32);

    /// Record an authorization failure from the target.
    fn record_authorization_failure(&self, attempt: u32);

    /// Record a credential fetched from the issuer.
    fn record_credential_issued(&self);

    /// Record a backoff wait.
    fn record_backoff(&self, delay: Duration);

    /// Record the terminal outcome of a run.
    fn record_outcome(&self, outcome: &str, attempts_used: u32);
}

/// No-op metrics implementation.
pub struct NoOpMetrics;

impl TaskMetrics for NoOpMetrics {
    fn record_attempt(&self, _attempt: u32) {}
    fn record_authorization_failure(&self, _attempt: u32) {}
    fn record_credential_issued(&self) {}
    fn record_backoff(&self, _delay: Duration) {}
    fn record_outcome(&self, _outcome: &str, _attempts_used: u32) {}
}

/// No-op metrics singleton.
pub fn no_op_metrics() -> NoOpMetrics {
    NoOpMetrics
}

/// Metric entry for in-memory storage.
#[derive(Debug, Clone)]
pub struct MetricEntry {
    pub name: String,
    pub value: f64,
    pub labels: MetricLabels,
    pub timestamp: u64,
}

/// In-memory metrics for testing.
pub struct InMemoryMetrics {
    entries: Mutex<Vec<MetricEntry>>,
}

impl InMemoryMetrics {
    /// Create new in-memory metrics.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Get all recorded entries.
    pub fn get_entries(&self) -> Vec<MetricEntry> {
        self.entries.lock().unwrap().clone()
    }

    /// Get entries by name.
    pub fn get_entries_by_name(&self, name: &str) -> Vec<MetricEntry> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.name == name)
            .cloned()
            .collect()
    }

    /// Sum of all values recorded under `name`.
    pub fn total(&self, name: &str) -> f64 {
        self.get_entries_by_name(name).iter().map(|e| e.value).sum()
    }

    /// Clear all entries.
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    fn record(&self, name: &str, value: f64, labels: MetricLabels) {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        self.entries.lock().unwrap().push(MetricEntry {
            name: name.to_string(),
            value,
            labels,
            timestamp: now,
        });
    }
}

impl Default for InMemoryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskMetrics for InMemoryMetrics {
    fn record_attempt(&self, attempt: u32) {
        let mut labels = MetricLabels::new();
        labels.insert("attempt".to_string(), attempt.to_string());
        self.record("task_attempts_total", 1.0, labels);
    }

    fn record_authorization_failure(&self, attempt: u32) {
        let mut labels = MetricLabels::new();
        labels.insert("attempt".to_string(), attempt.to_string());
        self.record("task_authorization_failures_total", 1.0, labels);
    }

    fn record_credential_issued(&self) {
        self.record("task_credentials_issued_total", 1.0, MetricLabels::new());
    }

    fn record_backoff(&self, delay: Duration) {
        self.record(
            "task_backoff_ms",
            delay.as_millis() as f64,
            MetricLabels::new(),
        );
    }

    fn record_outcome(&self, outcome: &str, attempts_used: u32) {
        let mut labels = MetricLabels::new();
        labels.insert("outcome".to_string(), outcome.to_string());
        self.record("task_runs_total", 1.0, labels.clone());
        self.record("task_attempts_used", attempts_used as f64, labels);
    }
}

/// Create in-memory metrics for testing.
pub fn create_in_memory_metrics() -> InMemoryMetrics {
    InMemoryMetrics::new()
}
