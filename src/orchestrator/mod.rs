//! Orchestrator
//!
//! Credential-refresh retry protocol: a pure state machine, a credential
//! cache and the async runner that drives them.

pub mod cache;
pub mod invoker;
pub mod runner;
pub mod state;

pub use cache::CredentialCache;
pub use invoker::{HttpTaskInvoker, TaskInvoker};
pub use runner::RetryOrchestrator;
pub use state::{AttemptResult, RunState, RunStateMachine, Terminal};

#[cfg(test)]
pub use invoker::MockTaskInvoker;
