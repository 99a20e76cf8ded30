use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Execution Request (Immutable Input)
/// A request is write-once - never mutate fields after construction
///
/// `is_sanity_check` restricts evaluation to the sanity-check subset
/// of the problem's test cases (quick pre-submission validation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub problem_id: i64,
    pub language_id: i64,
    pub source_code: String,
    #[serde(default)]
    pub is_sanity_check: bool,
}

impl ExecutionRequest {
    pub fn new(problem_id: i64, language_id: i64, source_code: impl Into<String>) -> Self {
        Self {
            problem_id,
            language_id,
            source_code: source_code.into(),
            is_sanity_check: false,
        }
    }

    pub fn sanity_check(mut self) -> Self {
        self.is_sanity_check = true;
        self
    }
}

/// Opaque handle the judge hands back for one in-flight submission
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JudgeToken(String);

impl JudgeToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JudgeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Execution State Machine (judge side)
///
/// `Queued` and `Processing` are the only non-terminal states.
/// `Unknown` covers status codes the judge introduced after this
/// table was written; it is terminal so polling always converges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Queued,
    Processing,
    Accepted,
    WrongAnswer,
    TimeLimitExceeded,
    CompileError,
    RuntimeError,
    InternalError,
    Unknown,
}

impl ExecutionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ExecutionStatus::Queued | ExecutionStatus::Processing)
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, ExecutionStatus::Accepted)
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExecutionStatus::Queued => "queued",
            ExecutionStatus::Processing => "processing",
            ExecutionStatus::Accepted => "accepted",
            ExecutionStatus::WrongAnswer => "wrong_answer",
            ExecutionStatus::TimeLimitExceeded => "time_limit_exceeded",
            ExecutionStatus::CompileError => "compile_error",
            ExecutionStatus::RuntimeError => "runtime_error",
            ExecutionStatus::InternalError => "internal_error",
            ExecutionStatus::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// Execution Output
/// Built exactly once per submission, when the judge reports a terminal status.
///
/// ## Field Semantics:
/// - time: judge-reported CPU seconds as a decimal string ("0.012")
/// - memory_kb: peak memory in kilobytes
/// - raw_description: the judge's own status text, preserved verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub token: JudgeToken,
    pub stdout: String,
    pub stderr: Option<String>,
    pub compile_output: String,
    pub message: String,
    pub time: Option<String>,
    pub memory_kb: Option<u64>,
    pub status: ExecutionStatus,
    pub raw_status_id: i64,
    pub raw_description: String,
    pub finished_at: DateTime<Utc>,
}

impl ExecutionResult {
    /// Judge-reported execution time in milliseconds, when parseable
    pub fn time_ms(&self) -> Option<u64> {
        let secs: f64 = self.time.as_deref()?.trim().parse().ok()?;
        if secs.is_sign_negative() || !secs.is_finite() {
            return None;
        }
        Some((secs * 1000.0).round() as u64)
    }
}

/// Test Case Definition (Immutable Input)
/// Owned by the problem store; evaluation only reads it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub problem_id: i64,
    pub input: String,
    pub expected_output: String,
    #[serde(default)]
    pub is_sanity_check: bool,
}

impl TestCase {
    pub fn new(problem_id: i64, input: impl Into<String>, expected_output: impl Into<String>) -> Self {
        Self {
            id: None,
            problem_id,
            input: input.into(),
            expected_output: expected_output.into(),
            is_sanity_check: false,
        }
    }

    pub fn sanity_check(mut self) -> Self {
        self.is_sanity_check = true;
        self
    }
}

/// Per-Test Verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestVerdict {
    pub test_case: TestCase,
    pub actual_output: String,
    pub passed: bool,
}

/// Aggregate verdict for one submission
///
/// ## Pass Semantics:
/// - passed is true iff every verdict passed AND at least one test case was evaluated
/// - execution is the terminal judge result all verdicts were computed from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub passed: bool,
    pub test_verdicts: Vec<TestVerdict>,
    pub execution: ExecutionResult,
}

impl SubmissionResult {
    pub fn passed_count(&self) -> usize {
        self.test_verdicts.iter().filter(|v| v.passed).count()
    }
}
