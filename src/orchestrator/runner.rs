//! Retry Orchestrator
//!
//! Drives one logical execution through credential acquisition, invocation
//! and bounded backoff. Every await is raced against the caller's
//! cancellation token.

use chrono::Utc;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::{ProtocolError, TaskError};
use crate::issuer::CredentialIssuer;
use crate::orchestrator::{
    AttemptResult, CredentialCache, RunState, RunStateMachine, TaskInvoker, Terminal,
};
use crate::resilience::{RetryPolicy, RetryStats};
use crate::telemetry::{NoOpMetrics, TaskMetrics};
use crate::types::{
    AttemptOutcome, AttemptRecord, Credential, ExecutionId, RunReport, TaskOutcome, TaskRequest,
};

/// Retry orchestrator.
///
/// The credential cache lives as long as the orchestrator, not a single run.
/// A credential the target accepted is reused by later runs until it expires
/// or is rejected, so a run can finish without calling the issuer.
pub struct RetryOrchestrator<I: CredentialIssuer, V: TaskInvoker> {
    issuer: Arc<I>,
    invoker: Arc<V>,
    policy: RetryPolicy,
    cache: CredentialCache,
    metrics: Arc<dyn TaskMetrics>,
    stats: Mutex<RetryStats>,
}

impl<I: CredentialIssuer, V: TaskInvoker> RetryOrchestrator<I, V> {
    /// Create orchestrator.
    pub fn new(issuer: Arc<I>, invoker: Arc<V>, policy: RetryPolicy) -> Self {
        Self {
            issuer,
            invoker,
            policy,
            cache: CredentialCache::new(),
            metrics: Arc::new(NoOpMetrics),
            stats: Mutex::new(RetryStats::default()),
        }
    }

    /// Set metrics sink.
    pub fn with_metrics(mut self, metrics: Arc<dyn TaskMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn cache(&self) -> &CredentialCache {
        &self.cache
    }

    /// Snapshot of accumulated statistics.
    pub fn stats(&self) -> RetryStats {
        self.stats.lock().unwrap().clone()
    }

    /// Run without external cancellation.
    pub async fn run(&self, request: &TaskRequest) -> RunReport {
        self.run_task(request, &CancellationToken::new()).await
    }

    /// Run the retry protocol for `request` until it reaches a terminal
    /// outcome or `cancel` fires.
    pub async fn run_task(&self, request: &TaskRequest, cancel: &CancellationToken) -> RunReport {
        let execution_id = request.execution_id.clone();
        info!(
            execution_id = %execution_id,
            endpoint = %request.endpoint,
            method = request.method.as_str(),
            max_attempts = self.policy.max_attempts,
            "Starting task run"
        );

        let mut machine = RunStateMachine::new(self.policy.max_attempts);
        let mut attempts: Vec<AttemptRecord> = Vec::new();
        let mut fatal: Option<TaskError> = None;

        loop {
            match machine.state() {
                RunState::Done(_) => break,

                RunState::NeedCredential => {
                    let acquired = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => None,
                        result = self.acquire_credential() => Some(result),
                    };

                    match acquired {
                        None => {
                            debug!(execution_id = %execution_id, "Cancelled while acquiring credential");
                            machine.cancel();
                        }
                        Some(Ok(credential)) => {
                            machine.credential_ready(credential);
                        }
                        Some(Err(e)) => {
                            error!(
                                execution_id = %execution_id,
                                error = %e,
                                "Credential issuance failed"
                            );
                            fatal = Some(e);
                            machine.credential_failed();
                        }
                    }
                }

                RunState::Invoking(credential) => {
                    let credential = credential.clone();
                    let Some(attempt) = machine.begin_attempt() else {
                        break;
                    };

                    let record = self
                        .attempt(request, &credential, attempt, cancel, &mut machine, &mut fatal)
                        .await;
                    attempts.push(record);
                }

                RunState::AwaitBackoff { failed_attempt } => {
                    let delay = self.policy.backoff(*failed_attempt);
                    info!(
                        execution_id = %execution_id,
                        attempt = *failed_attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Backing off before retry"
                    );

                    let elapsed = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => false,
                        _ = tokio::time::sleep(delay) => true,
                    };

                    if elapsed {
                        self.metrics.record_backoff(delay);
                        if let Some(last) = attempts.last_mut() {
                            last.backoff = Some(delay);
                        }
                        machine.backoff_elapsed();
                    } else {
                        debug!(execution_id = %execution_id, "Cancelled during backoff");
                        machine.cancel();
                    }
                }
            }
        }

        let attempts_used = machine.attempts();
        let outcome = match (machine.state(), fatal) {
            (RunState::Done(Terminal::Success), _) => TaskOutcome::Success { attempts_used },
            (RunState::Done(Terminal::Exhausted), _) => TaskOutcome::Exhausted { attempts_used },
            (RunState::Done(Terminal::Cancelled), _) => TaskOutcome::Cancelled { attempts_used },
            (_, Some(error)) => TaskOutcome::FatalError {
                attempts_used,
                error,
            },
            (_, None) => TaskOutcome::FatalError {
                attempts_used,
                error: TaskError::Protocol(ProtocolError::InvalidResponse {
                    message: "run ended without a result".to_string(),
                }),
            },
        };

        self.finish(&execution_id, &outcome);

        RunReport {
            execution_id,
            outcome,
            attempts,
        }
    }

    /// Cached credential if usable, otherwise a fresh one from the issuer.
    async fn acquire_credential(&self) -> Result<Credential, TaskError> {
        if let Some(credential) = self.cache.get() {
            debug!(credential = %credential.fingerprint(), "Reusing cached credential");
            return Ok(credential);
        }

        let credential = self.issuer.issue_token().await?;
        self.metrics.record_credential_issued();
        debug!(credential = %credential.fingerprint(), "Issued new credential");

        self.cache.store(credential.clone());
        Ok(credential)
    }

    /// Perform one dispatched attempt and feed its result to `machine`.
    async fn attempt(
        &self,
        request: &TaskRequest,
        credential: &Credential,
        attempt: u32,
        cancel: &CancellationToken,
        machine: &mut RunStateMachine,
        fatal: &mut Option<TaskError>,
    ) -> AttemptRecord {
        let execution_id = &request.execution_id;
        let started_at = Utc::now();
        let credential_fingerprint = credential.fingerprint();

        self.metrics.record_attempt(attempt);
        debug!(
            execution_id = %execution_id,
            attempt,
            credential = %credential_fingerprint,
            "Invoking task"
        );

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = self.invoker.invoke(request, credential) => Some(result),
        };

        let outcome = match result {
            None => {
                debug!(execution_id = %execution_id, attempt, "Cancelled during invocation");
                machine.cancel();
                AttemptOutcome::Cancelled
            }
            Some(Ok(_)) => {
                info!(execution_id = %execution_id, attempt, "Task invocation succeeded");
                machine.record_result(AttemptResult::Success);
                AttemptOutcome::Success
            }
            Some(Err(e)) if self.policy.is_retryable(&e) => {
                warn!(
                    execution_id = %execution_id,
                    attempt,
                    credential = %credential_fingerprint,
                    "Task invocation unauthorized; discarding credential"
                );
                self.cache.invalidate(credential);
                self.metrics.record_authorization_failure(attempt);
                machine.record_result(AttemptResult::AuthorizationFailure);
                AttemptOutcome::AuthorizationFailure
            }
            Some(Err(e)) => {
                error!(
                    execution_id = %execution_id,
                    attempt,
                    code = %e.failure_code(),
                    error = %e,
                    "Task invocation failed"
                );
                let outcome = if e.is_authorization_failure() {
                    self.cache.invalidate(credential);
                    self.metrics.record_authorization_failure(attempt);
                    AttemptOutcome::AuthorizationFailure
                } else {
                    AttemptOutcome::OtherError {
                        code: e.failure_code(),
                        message: e.to_string(),
                    }
                };
                *fatal = Some(e);
                machine.record_result(AttemptResult::Fatal);
                outcome
            }
        };

        AttemptRecord {
            attempt,
            credential_fingerprint,
            outcome,
            started_at,
            backoff: None,
        }
    }

    fn finish(&self, execution_id: &ExecutionId, outcome: &TaskOutcome) {
        let attempts_used = outcome.attempts_used();
        self.metrics.record_outcome(outcome.label(), attempts_used);

        {
            let mut stats = self.stats.lock().unwrap();
            stats.total_runs += 1;
            stats.total_attempts += attempts_used;
            match outcome {
                TaskOutcome::Success { attempts_used } if *attempts_used > 1 => {
                    stats.successful_retries += 1
                }
                TaskOutcome::Success { .. } => {}
                TaskOutcome::Exhausted { .. } => stats.exhausted += 1,
                TaskOutcome::FatalError { .. } => stats.fatal_errors += 1,
                TaskOutcome::Cancelled { .. } => stats.cancelled += 1,
            }
        }

        match outcome {
            TaskOutcome::Success { .. } => {
                info!(execution_id = %execution_id, attempts_used, "Task run succeeded")
            }
            TaskOutcome::FatalError { error, .. } => {
                error!(execution_id = %execution_id, attempts_used, error = %error, "Task run failed")
            }
            other => {
                warn!(
                    execution_id = %execution_id,
                    attempts_used,
                    outcome = other.label(),
                    "Task run did not succeed"
                )
            }
        }
    }
}
