//! Test Evaluator - Output Comparison
//!
//! **Core Responsibility:**
//! Compare the judge's stdout against each test case's expected output.
//!
//! **Critical Properties:**
//! - Knows nothing about HTTP or polling
//! - Pure function: (terminal result, test case) -> verdict
//! - Idempotent: same inputs, same verdict
//!
//! **Normalization Rules:**
//! - `\r\n` is treated as `\n`
//! - Trailing whitespace on every line is ignored
//! - Trailing blank lines are ignored
//! - Leading whitespace and case are significant
//!
//! **Non-Accepted Results:**
//! Every test case fails; `actual_output` carries the first non-empty of
//! stderr, compile_output, message (then the judge's status description)
//! so the failure can be diagnosed.

use arbiter_common::types::{ExecutionResult, SubmissionResult, TestCase, TestVerdict};

/// Normalize output string for comparison
pub fn normalize_output(output: &str) -> String {
    let lines: Vec<&str> = output
        .split('\n')
        .map(|line| line.trim_end_matches('\r').trim_end())
        .collect();
    lines.join("\n").trim_end().to_string()
}

fn diagnostic_output(result: &ExecutionResult) -> String {
    [
        result.stderr.as_deref().unwrap_or(""),
        result.compile_output.as_str(),
        result.message.as_str(),
    ]
    .into_iter()
    .find(|text| !text.trim().is_empty())
    .unwrap_or(result.raw_description.as_str())
    .to_string()
}

/// Evaluate a single test case against the terminal judge result
pub fn evaluate(result: &ExecutionResult, test_case: &TestCase) -> TestVerdict {
    if !result.status.is_accepted() {
        return TestVerdict {
            test_case: test_case.clone(),
            actual_output: diagnostic_output(result),
            passed: false,
        };
    }

    let passed = normalize_output(&result.stdout) == normalize_output(&test_case.expected_output);

    TestVerdict {
        test_case: test_case.clone(),
        actual_output: result.stdout.clone(),
        passed,
    }
}

/// Fold per-test verdicts into the submission verdict.
/// An empty verdict list never passes.
pub fn aggregate(test_verdicts: Vec<TestVerdict>, execution: ExecutionResult) -> SubmissionResult {
    let passed = !test_verdicts.is_empty() && test_verdicts.iter().all(|v| v.passed);
    SubmissionResult {
        passed,
        test_verdicts,
        execution,
    }
}
