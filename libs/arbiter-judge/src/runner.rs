//! Submission Runner - High-Level Orchestration
//!
//! **Responsibility:**
//! Take one submission from request to verdict:
//! validate -> submit -> poll -> evaluate every selected test case.
//!
//! This module is the glue layer. It knows nothing about:
//! - How the judge is reached (client's job)
//! - How long to wait (coordinator's job)
//! - How outputs compare (evaluator's job)
//!
//! Submitting and polling each get the full overall timeout.
//! Errors before a terminal status are returned as-is. Once the judge
//! reports a terminal status every test case is evaluated; a compile or
//! runtime error fails the test cases, it does not fail the run.

use crate::client::JudgeClient;
use crate::error::{JudgeError, Result};
use crate::evaluator;
use crate::poller::PollingCoordinator;
use arbiter_common::config::JudgeConfig;
use arbiter_common::language::LanguageTable;
use arbiter_common::types::{ExecutionRequest, SubmissionResult, TestCase, TestVerdict};
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, error, info, instrument, warn};

/// Safety limit to keep pathological sources away from the judge
pub const MAX_SOURCE_CODE_BYTES: usize = 1024 * 1024; // 1MB

pub struct SubmissionRunner<C: ?Sized> {
    client: Arc<C>,
    coordinator: PollingCoordinator,
    languages: Arc<LanguageTable>,
}

impl<C: JudgeClient + ?Sized> SubmissionRunner<C> {
    pub fn new(client: Arc<C>, coordinator: PollingCoordinator, languages: LanguageTable) -> Self {
        Self {
            client,
            coordinator,
            languages: Arc::new(languages),
        }
    }

    pub fn from_config(client: Arc<C>, config: &JudgeConfig, languages: LanguageTable) -> Self {
        let coordinator = PollingCoordinator::new(config.poll_interval(), config.overall_timeout());
        Self::new(client, coordinator, languages)
    }

    pub fn coordinator(&self) -> &PollingCoordinator {
        &self.coordinator
    }

    pub fn languages(&self) -> &LanguageTable {
        &self.languages
    }

    /// Reject malformed input before any network call
    pub fn validate(&self, request: &ExecutionRequest, test_cases: &[TestCase]) -> Result<()> {
        if request.source_code.trim().is_empty() {
            return Err(JudgeError::Validation("source code is empty".to_string()));
        }
        if request.source_code.len() > MAX_SOURCE_CODE_BYTES {
            return Err(JudgeError::Validation(format!(
                "source code exceeds maximum size of {} bytes",
                MAX_SOURCE_CODE_BYTES
            )));
        }
        if !self.languages.supports_id(request.language_id) {
            return Err(JudgeError::Validation(format!(
                "unsupported language id {}",
                request.language_id
            )));
        }
        if !test_cases.iter().any(|tc| tc.problem_id == request.problem_id) {
            return Err(JudgeError::Validation(format!(
                "no test cases supplied for problem {}",
                request.problem_id
            )));
        }
        Ok(())
    }

    /// Test cases of the request's problem; only sanity checks for a sanity run
    pub fn select_test_cases<'t>(
        request: &ExecutionRequest,
        test_cases: &'t [TestCase],
    ) -> Vec<&'t TestCase> {
        test_cases
            .iter()
            .filter(|tc| tc.problem_id == request.problem_id)
            .filter(|tc| !request.is_sanity_check || tc.is_sanity_check)
            .collect()
    }

    #[instrument(
        skip_all,
        fields(
            problem_id = request.problem_id,
            language_id = request.language_id,
            sanity = request.is_sanity_check
        )
    )]
    pub async fn run(
        &self,
        request: &ExecutionRequest,
        test_cases: &[TestCase],
    ) -> Result<SubmissionResult> {
        self.validate(request, test_cases)?;

        let selected = Self::select_test_cases(request, test_cases);
        if selected.is_empty() {
            warn!("No test cases selected; submission cannot pass");
        }

        let submit_budget = self.coordinator.overall_timeout();
        let token = match timeout(submit_budget, self.client.submit(request)).await {
            Ok(submitted) => submitted?,
            Err(_) => {
                let elapsed_ms = submit_budget.as_millis() as u64;
                error!(elapsed_ms = elapsed_ms, "Judge did not accept the submission in time");
                return Err(JudgeError::Timeout { elapsed_ms });
            }
        };
        info!(token = %token, test_cases = selected.len(), "Submitted to judge");

        let execution = self.coordinator.poll(self.client.as_ref(), token).await?;

        let verdicts: Vec<TestVerdict> = selected
            .into_iter()
            .map(|tc| evaluator::evaluate(&execution, tc))
            .collect();

        for (idx, verdict) in verdicts.iter().enumerate() {
            debug!(
                test_num = idx + 1,
                test_id = ?verdict.test_case.id,
                passed = verdict.passed,
                "Test verdict"
            );
        }

        let result = evaluator::aggregate(verdicts, execution);
        info!(
            token = %result.execution.token,
            status = %result.execution.status,
            passed = result.passed,
            passed_tests = result.passed_count(),
            total_tests = result.test_verdicts.len(),
            "Submission judged"
        );
        Ok(result)
    }
}
