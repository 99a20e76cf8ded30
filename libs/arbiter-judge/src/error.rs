use thiserror::Error;

#[derive(Debug, Error)]
pub enum JudgeError {
    #[error("network error talking to judge: {0}")]
    Network(String),

    #[error("judge returned an empty response body")]
    EmptyResponse,

    #[error("could not decode judge response: {0}")]
    Decode(String),

    #[error("judge did not reach a terminal status within {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    #[error("judge rejected request with HTTP {status}: {body}")]
    RemoteRejected { status: u16, body: String },

    #[error("invalid request: {0}")]
    Validation(String),

    #[error("submission task aborted: {0}")]
    Aborted(String),
}

impl JudgeError {
    /// Transient errors are retried by the polling loop; everything else aborts
    pub fn is_transient(&self) -> bool {
        matches!(self, JudgeError::Network(_) | JudgeError::EmptyResponse)
    }

    /// Stable label for logs and machine-readable output
    pub fn kind(&self) -> &'static str {
        match self {
            JudgeError::Network(_) => "network_error",
            JudgeError::EmptyResponse => "empty_response",
            JudgeError::Decode(_) => "decode_error",
            JudgeError::Timeout { .. } => "timeout_error",
            JudgeError::RemoteRejected { .. } => "remote_rejected",
            JudgeError::Validation(_) => "validation_error",
            JudgeError::Aborted(_) => "aborted",
        }
    }
}

impl From<reqwest::Error> for JudgeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            JudgeError::Decode(err.to_string())
        } else {
            JudgeError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for JudgeError {
    fn from(err: serde_json::Error) -> Self {
        JudgeError::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, JudgeError>;
