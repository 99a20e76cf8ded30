//! Remote Judge Client - The Network Boundary
//!
//! **Core Responsibility:**
//! Hand source code to the judge and read back its current status.
//!
//! **Critical Architectural Boundary:**
//! - Client knows HOW to talk to the judge (Judge0 over HTTP)
//! - Client does NOT retry; one method call is one network call
//! - Client does NOT interpret statuses; the poller and translator do
//!
//! Swappable backends implement `JudgeClient`: `Judge0Client` in
//! production, scripted fakes in tests.

use crate::error::{JudgeError, Result};
use arbiter_common::types::{ExecutionRequest, ExecutionResult, ExecutionStatus, JudgeToken};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Fields requested when polling; keeps the response small
pub const POLL_FIELDS: &str = "stdout,time,memory,stderr,compile_output,message,status";

/// Upper bound on how much of a rejected body is kept in the error
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Judge client trait
///
/// Any implementation must guarantee:
/// 1. Exactly one remote call per method invocation
/// 2. Transport failures surface as `Network`
/// 3. Non-success HTTP statuses surface as `RemoteRejected`
/// 4. Unparseable bodies surface as `Decode`
/// 5. A zero-length poll body surfaces as `EmptyResponse`
#[async_trait]
pub trait JudgeClient: Send + Sync {
    async fn submit(&self, request: &ExecutionRequest) -> Result<JudgeToken>;

    async fn fetch_status(&self, token: &JudgeToken) -> Result<RawStatus>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawStatusCode {
    pub id: i64,
    #[serde(default)]
    pub description: String,
}

/// Decoded poll body
/// Judge0 sends `null` for any output the program never produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawStatus {
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
    #[serde(default)]
    pub compile_output: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub memory: Option<u64>,
    pub status: RawStatusCode,
}

impl RawStatus {
    /// Freeze this poll body into the terminal execution result
    pub fn into_result(self, token: JudgeToken, status: ExecutionStatus) -> ExecutionResult {
        ExecutionResult {
            token,
            stdout: self.stdout.unwrap_or_default(),
            stderr: self.stderr,
            compile_output: self.compile_output.unwrap_or_default(),
            message: self.message.unwrap_or_default(),
            time: self.time,
            memory_kb: self.memory,
            status,
            raw_status_id: self.status.id,
            raw_description: self.status.description,
            finished_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CreateSubmissionBody<'a> {
    language_id: i64,
    source_code: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreateSubmissionResponse {
    token: String,
}

/// Judge0 HTTP client
///
/// The inner `reqwest::Client` is a connection pool; clones share it, so one
/// `Judge0Client` can serve every concurrent submission.
#[derive(Debug, Clone)]
pub struct Judge0Client {
    http: Client,
    base_url: String,
}

impl Judge0Client {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| JudgeError::Network(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self::with_http_client(http, base_url))
    }

    /// Reuse an existing connection pool
    pub fn with_http_client(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn submissions_url(&self) -> String {
        format!("{}/submissions", self.base_url)
    }

    fn submission_url(&self, token: &JudgeToken) -> String {
        format!("{}/submissions/{}", self.base_url, token)
    }
}

#[async_trait]
impl JudgeClient for Judge0Client {
    async fn submit(&self, request: &ExecutionRequest) -> Result<JudgeToken> {
        let body = CreateSubmissionBody {
            language_id: request.language_id,
            source_code: &request.source_code,
        };

        let response = self
            .http
            .post(self.submissions_url())
            .query(&[("base64_encoded", "false"), ("wait", "false")])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        ensure_success(status, &bytes)?;

        if is_blank(&bytes) {
            return Err(JudgeError::Decode("submission response had no body".to_string()));
        }

        let created: CreateSubmissionResponse = serde_json::from_slice(&bytes)?;
        if created.token.trim().is_empty() {
            return Err(JudgeError::Decode("submission response carried an empty token".to_string()));
        }

        debug!(
            token = %created.token,
            problem_id = request.problem_id,
            language_id = request.language_id,
            "Submission accepted by judge"
        );
        Ok(JudgeToken::new(created.token))
    }

    async fn fetch_status(&self, token: &JudgeToken) -> Result<RawStatus> {
        let response = self
            .http
            .get(self.submission_url(token))
            .query(&[("base64_encoded", "false"), ("fields", POLL_FIELDS)])
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        ensure_success(status, &bytes)?;

        if is_blank(&bytes) {
            return Err(JudgeError::EmptyResponse);
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn ensure_success(status: StatusCode, body: &[u8]) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }
    let text = String::from_utf8_lossy(body);
    Err(JudgeError::RemoteRejected {
        status: status.as_u16(),
        body: text.trim().chars().take(MAX_ERROR_BODY_CHARS).collect(),
    })
}

fn is_blank(body: &[u8]) -> bool {
    body.iter().all(u8::is_ascii_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_full_poll_body() {
        let raw: RawStatus = serde_json::from_str(
            r#"{
                "stdout": "5\n",
                "time": "0.011",
                "memory": 3212,
                "stderr": null,
                "compile_output": null,
                "message": null,
                "status": {"id": 3, "description": "Accepted"}
            }"#,
        )
        .unwrap();

        assert_eq!(raw.stdout.as_deref(), Some("5\n"));
        assert_eq!(raw.memory, Some(3212));
        assert_eq!(raw.status.id, 3);

        let result = raw.into_result(JudgeToken::new("t-1"), ExecutionStatus::Accepted);
        assert_eq!(result.stdout, "5\n");
        assert_eq!(result.stderr, None);
        assert_eq!(result.compile_output, "");
        assert_eq!(result.raw_description, "Accepted");
        assert_eq!(result.time_ms(), Some(11));
    }

    #[test]
    fn test_decode_queued_body_with_missing_fields() {
        let raw: RawStatus =
            serde_json::from_str(r#"{"status": {"id": 1, "description": "In Queue"}}"#).unwrap();
        assert_eq!(raw.stdout, None);
        assert_eq!(raw.time, None);
    }

    #[test]
    fn test_body_without_status_is_rejected() {
        let result: std::result::Result<RawStatus, _> = serde_json::from_str(r#"{"stdout": "5"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejection_keeps_status_and_truncates_body() {
        let body = "x".repeat(2000);
        match ensure_success(StatusCode::UNPROCESSABLE_ENTITY, body.as_bytes()) {
            Err(JudgeError::RemoteRejected { status, body }) => {
                assert_eq!(status, 422);
                assert_eq!(body.len(), MAX_ERROR_BODY_CHARS);
            }
            other => panic!("expected RemoteRejected, got {:?}", other),
        }
        assert!(ensure_success(StatusCode::CREATED, b"").is_ok());
    }

    #[test]
    fn test_blank_bodies() {
        assert!(is_blank(b""));
        assert!(is_blank(b" \n"));
        assert!(!is_blank(b"{}"));
    }

    #[test]
    fn test_urls_strip_trailing_slash() {
        let client = Judge0Client::with_http_client(Client::new(), "http://judge:2358/");
        assert_eq!(client.base_url(), "http://judge:2358");
        assert_eq!(
            client.submission_url(&JudgeToken::new("abc")),
            "http://judge:2358/submissions/abc"
        );
    }
}
