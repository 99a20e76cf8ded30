//! Status Translator - Judge Status Codes to Verdicts
//!
//! **Core Responsibility:**
//! Map the judge's numeric status id onto `ExecutionStatus`.
//!
//! **Critical Properties:**
//! - Pure and total: every i64 maps to a status, nothing fails
//! - Unmapped ids become `Unknown`, which is terminal
//!
//! **Judge0 Code Table:**
//! - 1 In Queue, 2 Processing (non-terminal)
//! - 3 Accepted, 4 Wrong Answer, 5 Time Limit Exceeded, 6 Compilation Error
//! - 7..=12 Runtime Error (SIGSEGV, SIGXFSZ, SIGFPE, SIGABRT, NZEC, Other)
//! - 13 Internal Error, 14 Exec Format Error

use arbiter_common::types::ExecutionStatus;
use tracing::warn;

pub const STATUS_IN_QUEUE: i64 = 1;
pub const STATUS_PROCESSING: i64 = 2;
pub const STATUS_ACCEPTED: i64 = 3;

pub fn translate(status_id: i64, description: &str) -> ExecutionStatus {
    match status_id {
        STATUS_IN_QUEUE => ExecutionStatus::Queued,
        STATUS_PROCESSING => ExecutionStatus::Processing,
        STATUS_ACCEPTED => ExecutionStatus::Accepted,
        4 => ExecutionStatus::WrongAnswer,
        5 => ExecutionStatus::TimeLimitExceeded,
        6 => ExecutionStatus::CompileError,
        7..=12 => ExecutionStatus::RuntimeError,
        13 | 14 => ExecutionStatus::InternalError,
        _ => {
            warn!(
                status_id = status_id,
                description = description,
                "Unmapped judge status id; treating as unknown terminal status"
            );
            ExecutionStatus::Unknown
        }
    }
}
