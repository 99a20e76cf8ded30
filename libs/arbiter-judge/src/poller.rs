//! Polling Coordinator - Waiting for a Terminal Verdict
//!
//! **Core Responsibility:**
//! Drive `JudgeClient::fetch_status` on a fixed interval until the judge
//! reports a terminal status or the wall-clock budget runs out.
//!
//! **State Machine:**
//! ```text
//! Submitted -> Polling -> Finished   (terminal status observed)
//!                      -> TimedOut   (budget exhausted)
//!                      -> Failed     (non-transient error)
//! ```
//!
//! **Retry Rules:**
//! - EmptyResponse / Network: logged and retried after one interval
//! - Decode / RemoteRejected: fatal, a parse failure will not fix itself
//! - The budget is wall clock from session start; retries do not extend it
//! - An in-flight fetch is cancelled when the budget expires mid-call

use crate::client::JudgeClient;
use crate::error::{JudgeError, Result};
use crate::status;
use arbiter_common::types::{ExecutionResult, JudgeToken};
use std::time::Duration;
use tokio::time::{sleep_until, timeout_at, Instant};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Submitted,
    Polling,
    Finished,
    TimedOut,
    Failed,
}

impl PollState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PollState::Finished | PollState::TimedOut | PollState::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingCoordinator {
    poll_interval: Duration,
    overall_timeout: Duration,
}

impl PollingCoordinator {
    pub fn new(poll_interval: Duration, overall_timeout: Duration) -> Self {
        Self {
            poll_interval,
            overall_timeout,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn overall_timeout(&self) -> Duration {
        self.overall_timeout
    }

    pub fn session<'a, C>(&self, client: &'a C, token: JudgeToken) -> PollSession<'a, C>
    where
        C: JudgeClient + ?Sized,
    {
        PollSession {
            client,
            token,
            poll_interval: self.poll_interval,
            overall_timeout: self.overall_timeout,
            state: PollState::Submitted,
            attempts: 0,
        }
    }

    /// Poll until terminal; consumes the token
    pub async fn poll<C>(&self, client: &C, token: JudgeToken) -> Result<ExecutionResult>
    where
        C: JudgeClient + ?Sized,
    {
        self.session(client, token).drive().await
    }
}

/// One polling session for one token
pub struct PollSession<'a, C: JudgeClient + ?Sized> {
    client: &'a C,
    token: JudgeToken,
    poll_interval: Duration,
    overall_timeout: Duration,
    state: PollState,
    attempts: u32,
}

impl<'a, C: JudgeClient + ?Sized> PollSession<'a, C> {
    pub fn state(&self) -> PollState {
        self.state
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn token(&self) -> &JudgeToken {
        &self.token
    }

    fn transition(&mut self, next: PollState) {
        debug!(token = %self.token, from = ?self.state, to = ?next, "Poll state transition");
        self.state = next;
    }

    /// Sleep one interval, never past the deadline.
    /// Returns false when the deadline has been reached.
    async fn pause(&self, deadline: Instant) -> bool {
        let wake = (Instant::now() + self.poll_interval).min(deadline);
        sleep_until(wake).await;
        Instant::now() < deadline
    }

    fn time_out(&mut self, started: Instant) -> JudgeError {
        let elapsed_ms = started.elapsed().as_millis() as u64;
        self.transition(PollState::TimedOut);
        warn!(
            token = %self.token,
            attempts = self.attempts,
            elapsed_ms = elapsed_ms,
            "Judge did not finish within the polling budget"
        );
        JudgeError::Timeout { elapsed_ms }
    }

    pub async fn drive(&mut self) -> Result<ExecutionResult> {
        if self.state != PollState::Submitted {
            return Err(JudgeError::Aborted(format!(
                "polling session for {} already ran (state {:?})",
                self.token, self.state
            )));
        }

        let started = Instant::now();
        let deadline = started + self.overall_timeout;
        self.transition(PollState::Polling);

        // Remote execution needs lead time before the first poll
        if !self.pause(deadline).await {
            return Err(self.time_out(started));
        }

        loop {
            self.attempts += 1;
            let attempt = self.attempts;

            let fetched = match timeout_at(deadline, self.client.fetch_status(&self.token)).await {
                Ok(fetched) => fetched,
                Err(_) => return Err(self.time_out(started)),
            };

            match fetched {
                Ok(raw) => {
                    let status = status::translate(raw.status.id, &raw.status.description);
                    if status.is_terminal() {
                        self.transition(PollState::Finished);
                        info!(
                            token = %self.token,
                            attempt = attempt,
                            status = %status,
                            description = %raw.status.description,
                            elapsed_ms = started.elapsed().as_millis() as u64,
                            "Judge reached terminal status"
                        );
                        return Ok(raw.into_result(self.token.clone(), status));
                    }
                    debug!(
                        token = %self.token,
                        attempt = attempt,
                        status = %status,
                        "Submission still running"
                    );
                }
                Err(e) if e.is_transient() => {
                    warn!(
                        token = %self.token,
                        attempt = attempt,
                        error = %e,
                        "Transient judge error, retrying"
                    );
                }
                Err(e) => {
                    self.transition(PollState::Failed);
                    error!(
                        token = %self.token,
                        attempt = attempt,
                        error = %e,
                        "Polling failed"
                    );
                    return Err(e);
                }
            }

            if !self.pause(deadline).await {
                return Err(self.time_out(started));
            }
        }
    }
}
