//! Batch Runner - Concurrent Fan-Out
//!
//! **Responsibility:**
//! Run many submissions at once and hand back one slot per request,
//! in request order.
//!
//! **Guarantees:**
//! - Each submission is its own tokio task
//! - A shared semaphore caps in-flight submissions across all batches
//! - A failed or panicked submission only poisons its own slot
//! - The batch call itself never fails

use crate::client::JudgeClient;
use crate::error::{JudgeError, Result};
use crate::runner::SubmissionRunner;
use arbiter_common::types::{ExecutionRequest, SubmissionResult, TestCase};
use futures_util::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{info, info_span, instrument, Instrument};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
}

impl BatchSummary {
    pub fn summarize(results: &[Result<SubmissionResult>]) -> Self {
        results.iter().fold(Self::default(), |mut summary, slot| {
            match slot {
                Ok(result) if result.passed => summary.passed += 1,
                Ok(_) => summary.failed += 1,
                Err(_) => summary.errored += 1,
            }
            summary
        })
    }
}

pub struct BatchRunner<C: ?Sized> {
    runner: Arc<SubmissionRunner<C>>,
    permits: Arc<Semaphore>,
    max_concurrency: usize,
}

impl<C: JudgeClient + ?Sized + 'static> BatchRunner<C> {
    pub fn new(runner: Arc<SubmissionRunner<C>>, max_concurrency: usize) -> Self {
        let max_concurrency = max_concurrency.max(1);
        Self {
            runner,
            permits: Arc::new(Semaphore::new(max_concurrency)),
            max_concurrency,
        }
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub fn runner(&self) -> &Arc<SubmissionRunner<C>> {
        &self.runner
    }

    #[instrument(skip_all, fields(batch_id = %Uuid::new_v4(), size = requests.len()))]
    pub async fn run_batch(
        &self,
        requests: Vec<ExecutionRequest>,
        test_cases_by_problem: &HashMap<i64, Vec<TestCase>>,
    ) -> Vec<Result<SubmissionResult>> {
        let handles: Vec<_> = requests
            .into_iter()
            .enumerate()
            .map(|(index, request)| {
                let runner = Arc::clone(&self.runner);
                let permits = Arc::clone(&self.permits);
                let test_cases = test_cases_by_problem
                    .get(&request.problem_id)
                    .cloned()
                    .unwrap_or_default();

                let span = info_span!("submission", index = index, problem_id = request.problem_id);
                tokio::spawn(
                    async move {
                        let _permit = permits
                            .acquire_owned()
                            .await
                            .map_err(|_| JudgeError::Aborted("batch limiter closed".to_string()))?;
                        runner.run(&request, &test_cases).await
                    }
                    .instrument(span),
                )
            })
            .collect();

        let results: Vec<Result<SubmissionResult>> = join_all(handles)
            .await
            .into_iter()
            .map(|joined| match joined {
                Ok(slot) => slot,
                Err(e) => Err(JudgeError::Aborted(e.to_string())),
            })
            .collect();

        let summary = BatchSummary::summarize(&results);
        info!(
            passed = summary.passed,
            failed = summary.failed,
            errored = summary.errored,
            "Batch complete"
        );
        results
    }
}
