//! Target Endpoint
//!
//! Server side of the task contract: the execution ledger and the
//! idempotent task operation built on it.

pub mod ledger;
pub mod target;

pub use ledger::{create_execution_ledger, ExecutionLedger, InMemoryExecutionLedger};
pub use target::{IdempotentTargetEndpoint, InvocationResult, UNAUTHORIZED_MESSAGE};
