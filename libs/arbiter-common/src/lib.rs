pub mod config;
pub mod language;
pub mod types;

// Re-export commonly used types for convenience
pub use config::JudgeConfig;
pub use language::LanguageTable;
pub use types::{
    ExecutionRequest, ExecutionResult, ExecutionStatus, JudgeToken, SubmissionResult, TestCase,
    TestVerdict,
};
