mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "arbiter")]
#[command(about = "Arbiter - Run submissions against a remote Judge0 instance", long_about = None)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true, default_value = "false")]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Judge a single source file
    Run {
        /// Problem the submission belongs to
        #[arg(short, long)]
        problem_id: i64,

        /// Language name from the language table (e.g., python3)
        #[arg(short, long)]
        language: String,

        /// Path to the source file
        #[arg(short, long)]
        source: PathBuf,

        /// Path to a JSON array of test cases
        #[arg(short, long)]
        tests: PathBuf,

        /// Only evaluate sanity-check test cases
        #[arg(long, default_value = "false")]
        sanity: bool,
    },

    /// Judge every entry of a manifest concurrently
    Batch {
        /// Path to a JSON array of {problem_id, language, source_file, is_sanity_check}
        #[arg(short, long)]
        manifest: PathBuf,

        /// Path to a JSON array of test cases
        #[arg(short, long)]
        tests: PathBuf,
    },

    /// List configured languages
    Languages,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    commands::init_tracing(cli.json_logs);

    let ctx = commands::Context::load()?;

    match cli.command {
        Commands::Run {
            problem_id,
            language,
            source,
            tests,
            sanity,
        } => {
            commands::run_one(&ctx, problem_id, &language, &source, &tests, sanity).await?;
        }
        Commands::Batch { manifest, tests } => {
            commands::run_batch(&ctx, &manifest, &tests).await?;
        }
        Commands::Languages => {
            commands::list_languages(&ctx);
        }
    }

    Ok(())
}
