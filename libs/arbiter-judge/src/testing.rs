// Scripted in-memory judge used by unit tests

use crate::client::{JudgeClient, RawStatus, RawStatusCode};
use crate::error::{JudgeError, Result};
use arbiter_common::types::{ExecutionRequest, JudgeToken};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// One scripted poll response. The last step of a script repeats forever.
#[derive(Debug, Clone)]
pub enum Step {
    Status(RawStatus),
    Empty,
    Network,
    Garbage,
    Reject(u16),
    Hang,
    Panic,
}

impl Step {
    fn status(id: i64, description: &str) -> RawStatus {
        RawStatus {
            stdout: None,
            stderr: None,
            compile_output: None,
            message: None,
            time: Some("0.010".to_string()),
            memory: Some(3072),
            status: RawStatusCode {
                id,
                description: description.to_string(),
            },
        }
    }

    pub fn queued() -> Self {
        Step::Status(Self::status(1, "In Queue"))
    }

    pub fn processing() -> Self {
        Step::Status(Self::status(2, "Processing"))
    }

    pub fn accepted(stdout: &str) -> Self {
        let mut raw = Self::status(3, "Accepted");
        raw.stdout = Some(stdout.to_string());
        Step::Status(raw)
    }

    pub fn compile_error(output: &str) -> Self {
        let mut raw = Self::status(6, "Compilation Error");
        raw.compile_output = Some(output.to_string());
        Step::Status(raw)
    }

    pub fn runtime_error(stderr: &str) -> Self {
        let mut raw = Self::status(11, "Runtime Error (NZEC)");
        raw.stderr = Some(stderr.to_string());
        Step::Status(raw)
    }
}

#[derive(Clone)]
enum SubmitBehavior {
    Script(Vec<Step>),
    Reject(u16),
    Hang,
}

#[derive(Default)]
pub struct FakeJudge {
    by_source: Mutex<HashMap<String, SubmitBehavior>>,
    by_token: Mutex<HashMap<JudgeToken, VecDeque<Step>>>,
    fetches: Mutex<HashMap<JudgeToken, usize>>,
    submits: AtomicUsize,
}

impl FakeJudge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the poll responses for any submission with this source
    pub fn on_source(self, source: &str, steps: Vec<Step>) -> Self {
        assert!(!steps.is_empty(), "script needs at least one step");
        self.by_source
            .lock()
            .unwrap()
            .insert(source.to_string(), SubmitBehavior::Script(steps));
        self
    }

    /// Reject submissions with this source at submit time
    pub fn reject_source(self, source: &str, status: u16) -> Self {
        self.by_source
            .lock()
            .unwrap()
            .insert(source.to_string(), SubmitBehavior::Reject(status));
        self
    }

    /// Never answer submissions with this source
    pub fn hang_source(self, source: &str) -> Self {
        self.by_source
            .lock()
            .unwrap()
            .insert(source.to_string(), SubmitBehavior::Hang);
        self
    }

    pub fn submit_count(&self) -> usize {
        self.submits.load(Ordering::SeqCst)
    }

    pub fn fetch_count(&self, token: &JudgeToken) -> usize {
        self.fetches.lock().unwrap().get(token).copied().unwrap_or(0)
    }
}

#[async_trait]
impl JudgeClient for FakeJudge {
    async fn submit(&self, request: &ExecutionRequest) -> Result<JudgeToken> {
        let n = self.submits.fetch_add(1, Ordering::SeqCst);
        let behavior = self.by_source.lock().unwrap().get(&request.source_code).cloned();
        let steps = match behavior {
            Some(SubmitBehavior::Script(steps)) => steps,
            Some(SubmitBehavior::Reject(status)) => {
                return Err(JudgeError::RemoteRejected {
                    status,
                    body: "rejected by fake judge".to_string(),
                })
            }
            Some(SubmitBehavior::Hang) => std::future::pending().await,
            None => return Err(JudgeError::Network("connection refused".to_string())),
        };

        let token = JudgeToken::new(format!("fake-token-{}", n));
        self.by_token
            .lock()
            .unwrap()
            .insert(token.clone(), steps.into_iter().collect());
        Ok(token)
    }

    async fn fetch_status(&self, token: &JudgeToken) -> Result<RawStatus> {
        *self.fetches.lock().unwrap().entry(token.clone()).or_insert(0) += 1;

        let step = {
            let mut by_token = self.by_token.lock().unwrap();
            let script = by_token
                .get_mut(token)
                .ok_or_else(|| JudgeError::RemoteRejected {
                    status: 404,
                    body: "unknown token".to_string(),
                })?;
            if script.len() > 1 {
                script.pop_front()
            } else {
                script.front().cloned()
            }
        };

        match step {
            Some(Step::Status(raw)) => Ok(raw),
            Some(Step::Empty) => Err(JudgeError::EmptyResponse),
            Some(Step::Network) => Err(JudgeError::Network("connection reset".to_string())),
            Some(Step::Garbage) => Err(JudgeError::Decode("expected value at line 1".to_string())),
            Some(Step::Reject(status)) => Err(JudgeError::RemoteRejected {
                status,
                body: "submission not found".to_string(),
            }),
            Some(Step::Hang) => std::future::pending().await,
            Some(Step::Panic) => panic!("fake judge crashed on {}", token),
            None => Err(JudgeError::EmptyResponse),
        }
    }
}
