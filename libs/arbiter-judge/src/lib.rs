pub mod batch;
pub mod client;
pub mod error;
pub mod evaluator;
pub mod poller;
pub mod runner;
pub mod status;

#[cfg(test)]
pub(crate) mod testing;

pub use batch::{BatchRunner, BatchSummary};
pub use client::{Judge0Client, JudgeClient, RawStatus};
pub use error::{JudgeError, Result};
pub use poller::{PollState, PollingCoordinator};
pub use runner::SubmissionRunner;

use arbiter_common::config::JudgeConfig;
use arbiter_common::language::LanguageTable;
use std::sync::Arc;

/// Wire a single Judge0-backed submission runner from configuration.
pub fn connect_runner(
    config: &JudgeConfig,
    languages: LanguageTable,
) -> Result<Arc<SubmissionRunner<Judge0Client>>> {
    config
        .validate()
        .map_err(|e| JudgeError::Validation(e.to_string()))?;

    let client = Arc::new(Judge0Client::new(&config.judge_url, config.request_timeout())?);
    Ok(Arc::new(SubmissionRunner::from_config(client, config, languages)))
}

/// Wire a Judge0-backed batch runner from configuration.
/// The single `Judge0Client` (and its connection pool) is shared by every submission.
pub fn connect(config: &JudgeConfig, languages: LanguageTable) -> Result<BatchRunner<Judge0Client>> {
    let runner = connect_runner(config, languages)?;
    Ok(BatchRunner::new(runner, config.max_concurrency))
}
