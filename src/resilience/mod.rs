//! Resilience
//!
//! Retry policy and statistics for task invocations.

pub mod retry;

pub use retry::{RetryPolicy, RetryStats};
