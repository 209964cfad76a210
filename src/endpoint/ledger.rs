//! Execution Ledger
//!
//! Record of which logical executions the target endpoint has already seen.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::types::ExecutionId;

/// Execution ledger interface.
///
/// `check_and_mark` is the only mutual-exclusion boundary of the target
/// endpoint: for a given id exactly one caller ever observes `true`.
pub trait ExecutionLedger: Send + Sync {
    /// Record the id as seen. Returns `true` iff it was not seen before.
    fn check_and_mark(&self, id: &ExecutionId) -> bool;

    /// Check if the id has been seen.
    fn contains(&self, id: &ExecutionId) -> bool;

    /// Number of recorded executions.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop entries older than the ledger TTL. Returns how many were removed.
    fn clear_expired(&self) -> usize;
}

/// In-memory ledger. Entries live for the process lifetime unless a TTL
/// is set, and even then only go away on an explicit `clear_expired`.
pub struct InMemoryExecutionLedger {
    seen: Mutex<HashMap<ExecutionId, Instant>>,
    ttl: Option<Duration>,
}

impl InMemoryExecutionLedger {
    /// Create new ledger without expiry.
    pub fn new() -> Self {
        Self {
            seen: Mutex::new(HashMap::new()),
            ttl: None,
        }
    }

    /// Create ledger whose entries may be pruned after `ttl`.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            seen: Mutex::new(HashMap::new()),
            ttl: Some(ttl),
        }
    }
}

impl Default for InMemoryExecutionLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionLedger for InMemoryExecutionLedger {
    fn check_and_mark(&self, id: &ExecutionId) -> bool {
        let mut seen = self.seen.lock().unwrap();
        if seen.contains_key(id) {
            return false;
        }
        seen.insert(id.clone(), Instant::now());
        true
    }

    fn contains(&self, id: &ExecutionId) -> bool {
        self.seen.lock().unwrap().contains_key(id)
    }

    fn len(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    fn clear_expired(&self) -> usize {
        let Some(ttl) = self.ttl else {
            return 0;
        };

        let mut seen = self.seen.lock().unwrap();
        let initial_count = seen.len();
        seen.retain(|_, recorded_at| recorded_at.elapsed() < ttl);
        initial_count - seen.len()
    }
}

/// Create in-memory execution ledger.
pub fn create_execution_ledger() -> InMemoryExecutionLedger {
    InMemoryExecutionLedger::new()
}
