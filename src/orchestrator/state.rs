//! Run State Machine
//!
//! Pure transition logic of one run: no I/O, no clocks. The runner feeds it
//! events and performs whatever the resulting state asks for.

use crate::types::Credential;

/// Terminal state of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Terminal {
    Success,
    Exhausted,
    FatalError,
    Cancelled,
}

/// Current state of a run.
#[derive(Clone, Debug)]
pub enum RunState {
    /// A credential must be obtained before the next attempt.
    NeedCredential,
    /// Ready to invoke the target with this credential.
    Invoking(Credential),
    /// Waiting out the backoff after `failed_attempt`.
    AwaitBackoff { failed_attempt: u32 },
    Done(Terminal),
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done(_))
    }
}

/// Classified result of one attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttemptResult {
    Success,
    /// Retryable authorization failure.
    AuthorizationFailure,
    /// Anything that must not be retried.
    Fatal,
}

/// State machine for one logical execution.
#[derive(Debug)]
pub struct RunStateMachine {
    state: RunState,
    attempts: u32,
    max_attempts: u32,
    in_flight: bool,
}

impl RunStateMachine {
    /// Start in `NeedCredential` with zero attempts.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            state: RunState::NeedCredential,
            attempts: 0,
            max_attempts: max_attempts.max(1),
            in_flight: false,
        }
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Attempts dispatched so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// `NeedCredential` -> `Invoking`.
    pub fn credential_ready(&mut self, credential: Credential) -> &RunState {
        if matches!(self.state, RunState::NeedCredential) {
            self.state = RunState::Invoking(credential);
        }
        &self.state
    }

    /// The issuer could not provide a credential.
    pub fn credential_failed(&mut self) -> &RunState {
        if matches!(self.state, RunState::NeedCredential) {
            self.state = RunState::Done(Terminal::FatalError);
        }
        &self.state
    }

    /// Count an attempt as dispatched. Returns its 1-based number, or `None`
    /// outside `Invoking` or while an attempt is already in flight.
    pub fn begin_attempt(&mut self) -> Option<u32> {
        if !matches!(self.state, RunState::Invoking(_)) || self.in_flight {
            return None;
        }
        self.attempts += 1;
        self.in_flight = true;
        Some(self.attempts)
    }

    /// Apply the result of the in-flight attempt.
    ///
    /// An authorization failure drops the credential; the run ends as
    /// `Exhausted` once `max_attempts` invocations have been made.
    pub fn record_result(&mut self, result: AttemptResult) -> &RunState {
        if !matches!(self.state, RunState::Invoking(_)) || !self.in_flight {
            return &self.state;
        }
        self.in_flight = false;

        self.state = match result {
            AttemptResult::Success => RunState::Done(Terminal::Success),
            AttemptResult::AuthorizationFailure if self.attempts >= self.max_attempts => {
                RunState::Done(Terminal::Exhausted)
            }
            AttemptResult::AuthorizationFailure => RunState::AwaitBackoff {
                failed_attempt: self.attempts,
            },
            AttemptResult::Fatal => RunState::Done(Terminal::FatalError),
        };
        &self.state
    }

    /// `AwaitBackoff` -> `NeedCredential`.
    pub fn backoff_elapsed(&mut self) -> &RunState {
        if matches!(self.state, RunState::AwaitBackoff { .. }) {
            self.state = RunState::NeedCredential;
        }
        &self.state
    }

    /// Any non-terminal state -> `Done(Cancelled)`.
    pub fn cancel(&mut self) -> &RunState {
        if !self.state.is_terminal() {
            self.in_flight = false;
            self.state = RunState::Done(Terminal::Cancelled);
        }
        &self.state
    }
}
