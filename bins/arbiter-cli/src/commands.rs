// CLI commands: load inputs, drive the judge, print JSON
use anyhow::{bail, Context as _, Result};
use arbiter_common::config::JudgeConfig;
use arbiter_common::language::LanguageTable;
use arbiter_common::types::{ExecutionRequest, SubmissionResult, TestCase};
use arbiter_judge::{connect, connect_runner, JudgeError};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// One entry of a batch manifest
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestEntry {
    pub problem_id: i64,
    pub language: String,
    pub source_file: PathBuf,
    #[serde(default)]
    pub is_sanity_check: bool,
}

/// Everything a command needs, loaded once at startup
pub struct Context {
    pub config: JudgeConfig,
    pub languages: LanguageTable,
}

impl Context {
    pub fn load() -> Result<Self> {
        let config = JudgeConfig::from_env();
        config.validate().context("Invalid judge configuration")?;

        let languages = match &config.language_config_path {
            Some(path) => LanguageTable::load_from_file(path)?,
            None => LanguageTable::default(),
        };

        info!(
            judge_url = %config.judge_url,
            languages = ?languages.names(),
            "Configuration loaded"
        );
        Ok(Self { config, languages })
    }
}

pub fn init_tracing(json_logs: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // logs go to stderr so stdout stays machine-readable
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_line_number(true)
        .with_writer(std::io::stderr);

    if json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_test_cases(path: &Path) -> Result<Vec<TestCase>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read test cases from {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse test cases in {}", path.display()))
}

fn load_manifest(path: &Path) -> Result<Vec<ManifestEntry>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse manifest {}", path.display()))
}

fn resolve_language(languages: &LanguageTable, name: &str) -> Result<i64> {
    match languages.id_for(name) {
        Some(id) => Ok(id),
        None => bail!(
            "Unknown language '{}'. Available: {}",
            name,
            languages.names().join(", ")
        ),
    }
}

fn build_request(
    languages: &LanguageTable,
    problem_id: i64,
    language: &str,
    source: &Path,
    sanity: bool,
) -> Result<ExecutionRequest> {
    let language_id = resolve_language(languages, language)?;
    let source_code = fs::read_to_string(source)
        .with_context(|| format!("Failed to read source {}", source.display()))?;

    let request = ExecutionRequest::new(problem_id, language_id, source_code);
    Ok(if sanity { request.sanity_check() } else { request })
}

/// Group test cases by problem for the batch runner
fn group_by_problem(test_cases: Vec<TestCase>) -> HashMap<i64, Vec<TestCase>> {
    let mut grouped: HashMap<i64, Vec<TestCase>> = HashMap::new();
    for tc in test_cases {
        grouped.entry(tc.problem_id).or_default().push(tc);
    }
    grouped
}

/// Machine-readable line for one batch slot
fn slot_json(index: usize, slot: &arbiter_judge::Result<SubmissionResult>) -> Result<Value> {
    Ok(match slot {
        Ok(result) => json!({ "index": index, "ok": serde_json::to_value(result)? }),
        Err(e) => error_json(index, e),
    })
}

fn error_json(index: usize, err: &JudgeError) -> Value {
    json!({
        "index": index,
        "error": { "kind": err.kind(), "message": err.to_string() }
    })
}

pub async fn run_one(
    ctx: &Context,
    problem_id: i64,
    language: &str,
    source: &Path,
    tests: &Path,
    sanity: bool,
) -> Result<()> {
    let request = build_request(&ctx.languages, problem_id, language, source, sanity)?;
    let test_cases = load_test_cases(tests)?;

    let runner = connect_runner(&ctx.config, ctx.languages.clone())?;
    match runner.run(&request, &test_cases).await {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            if result.passed {
                info!("All {} test cases passed", result.test_verdicts.len());
            } else {
                info!(
                    "{}/{} test cases passed",
                    result.passed_count(),
                    result.test_verdicts.len()
                );
            }
            Ok(())
        }
        Err(e) => {
            error!(kind = e.kind(), "Submission failed: {}", e);
            Err(e).context("Submission could not be judged")
        }
    }
}

/// Resolve each manifest entry on its own; a bad entry only poisons its slot
fn prepare_slots(
    languages: &LanguageTable,
    entries: &[ManifestEntry],
    base_dir: &Path,
) -> Vec<arbiter_judge::Result<ExecutionRequest>> {
    entries
        .iter()
        .map(|entry| {
            let source = base_dir.join(&entry.source_file);
            build_request(
                languages,
                entry.problem_id,
                &entry.language,
                &source,
                entry.is_sanity_check,
            )
            .map_err(|e| JudgeError::Validation(format!("{:#}", e)))
        })
        .collect()
}

/// Put dispatched results back at their manifest index
fn merge_slots(
    prepared: Vec<arbiter_judge::Result<()>>,
    dispatched: Vec<arbiter_judge::Result<SubmissionResult>>,
) -> Vec<arbiter_judge::Result<SubmissionResult>> {
    let mut dispatched = dispatched.into_iter();
    prepared
        .into_iter()
        .map(|slot| match slot {
            Ok(()) => dispatched
                .next()
                .unwrap_or_else(|| Err(JudgeError::Aborted("batch returned no result for slot".to_string()))),
            Err(e) => Err(e),
        })
        .collect()
}

pub async fn run_batch(ctx: &Context, manifest: &Path, tests: &Path) -> Result<()> {
    let entries = load_manifest(manifest)?;
    let test_cases = group_by_problem(load_test_cases(tests)?);
    let base_dir = manifest.parent().unwrap_or_else(|| Path::new("."));

    let mut requests = Vec::with_capacity(entries.len());
    let mut prepared = Vec::with_capacity(entries.len());
    for (index, slot) in prepare_slots(&ctx.languages, &entries, base_dir)
        .into_iter()
        .enumerate()
    {
        match slot {
            Ok(request) => {
                requests.push(request);
                prepared.push(Ok(()));
            }
            Err(e) => {
                warn!(index = index, "Skipping manifest entry: {}", e);
                prepared.push(Err(e));
            }
        }
    }

    let batch = connect(&ctx.config, ctx.languages.clone())?;
    let dispatched = batch.run_batch(requests, &test_cases).await;

    for (index, slot) in merge_slots(prepared, dispatched).iter().enumerate() {
        println!("{}", serde_json::to_string(&slot_json(index, slot)?)?);
    }
    Ok(())
}

pub fn list_languages(ctx: &Context) {
    println!("Configured languages:");
    for (name, judge_id) in ctx.languages.entries() {
        println!("  {:<12} -> judge id {}", name, judge_id);
    }
}
