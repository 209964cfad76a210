//! Run Outcome Types
//!
//! What a run of the retry protocol reports back to its caller.

use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::error::TaskError;
use crate::types::ExecutionId;

/// Result of a single invocation attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Target answered 200.
    Success,
    /// Target answered 401.
    AuthorizationFailure,
    /// Anything else (transport, malformed response, unexpected status).
    OtherError { code: String, message: String },
    /// Cancelled while the call was in flight.
    Cancelled,
}

/// Orchestrator-local record of one attempt.
#[derive(Clone, Debug)]
pub struct AttemptRecord {
    /// 1-based attempt number.
    pub attempt: u32,
    /// Fingerprint of the credential presented.
    pub credential_fingerprint: String,
    pub outcome: AttemptOutcome,
    /// When the attempt was dispatched.
    pub started_at: DateTime<Utc>,
    /// Backoff waited after this attempt, if a retry followed.
    pub backoff: Option<Duration>,
}

/// Terminal outcome of a run.
#[derive(Debug)]
pub enum TaskOutcome {
    /// The target accepted an attempt.
    Success { attempts_used: u32 },
    /// Every permitted attempt failed authorization.
    Exhausted { attempts_used: u32 },
    /// A non-retryable failure ended the run.
    FatalError { attempts_used: u32, error: TaskError },
    /// The caller cancelled the run at a suspension point.
    Cancelled { attempts_used: u32 },
}

impl TaskOutcome {
    /// Number of target invocations dispatched.
    pub fn attempts_used(&self) -> u32 {
        match self {
            Self::Success { attempts_used }
            | Self::Exhausted { attempts_used }
            | Self::FatalError { attempts_used, .. }
            | Self::Cancelled { attempts_used } => *attempts_used,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::Exhausted { .. } => "exhausted",
            Self::FatalError { .. } => "fatal_error",
            Self::Cancelled { .. } => "cancelled",
        }
    }
}

/// Full report of one run.
#[derive(Debug)]
pub struct RunReport {
    pub execution_id: ExecutionId,
    pub outcome: TaskOutcome,
    pub attempts: Vec<AttemptRecord>,
}

impl RunReport {
    /// Backoff waits performed, in order.
    pub fn backoffs(&self) -> Vec<Duration> {
        self.attempts.iter().filter_map(|a| a.backoff).collect()
    }
}
