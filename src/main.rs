//! dealer-verify entry point
//!
//! Runs the verification scenarios under `scenarios/` against a running
//! instance of the dealership app and writes screenshots plus a
//! results.json for manual review.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use dealer_verify::runner::RunnerConfig;
use dealer_verify::script::{BrowserKind, ScriptConfig};
use dealer_verify::target::TargetConfig;
use dealer_verify::{VerifyResult, VerifyRunner};

#[derive(Parser, Debug)]
#[command(name = "dealer-verify")]
#[command(about = "Browser verification runner for the dealership web UI")]
struct Args {
    /// Path to the scenario directory
    #[arg(short, long, default_value = "scenarios")]
    scenarios: PathBuf,

    /// Base URL of the running target app
    #[arg(long, default_value = "http://localhost:3000", env = "DEALER_VERIFY_BASE_URL")]
    base_url: String,

    /// Run only scenarios carrying this tag
    #[arg(short, long)]
    tag: Option<String>,

    /// Run only the scenario with this name
    #[arg(short, long)]
    name: Option<String>,

    /// Browser to use (chromium, firefox, webkit)
    #[arg(long, default_value = "chromium")]
    browser: String,

    /// Run the browser headless
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    headless: bool,

    /// Seconds to wait for the target app to answer
    #[arg(long, default_value = "30")]
    ready_timeout: u64,

    /// Hard cap in seconds on a single scenario
    #[arg(long, default_value = "180")]
    scenario_timeout: u64,

    /// Output directory for screenshots, artifacts, and results
    #[arg(short, long, default_value = "verify-results")]
    output: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    match rt.block_on(run(args)) {
        Ok(all_passed) => {
            if all_passed {
                std::process::exit(0);
            } else {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

async fn run(args: Args) -> VerifyResult<bool> {
    let config = RunnerConfig {
        scenario_dir: args.scenarios,
        output_dir: args.output.clone(),
        script: ScriptConfig {
            base_url: args.base_url.clone(),
            screenshot_dir: args.output.join("screenshots"),
            artifact_dir: args.output.join("artifacts"),
            browser: BrowserKind::parse(&args.browser),
            headless: args.headless,
            scenario_timeout: Duration::from_secs(args.scenario_timeout),
        },
        target: TargetConfig {
            base_url: args.base_url,
            ready_timeout: Duration::from_secs(args.ready_timeout),
            ..Default::default()
        },
    };

    let runner = VerifyRunner::with_config(config);

    let results = if let Some(name) = &args.name {
        runner.run_named(name).await?
    } else if let Some(tag) = &args.tag {
        runner.run_tagged(tag).await?
    } else {
        runner.run_all().await?
    };

    runner.write_results(&results)?;

    Ok(results.failed == 0)
}
