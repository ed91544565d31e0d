//! Scenario orchestration: probe the target, run scenarios in order,
//! hash captured screenshots, and write a results file

use std::path::PathBuf;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, error, info};

use crate::compose;
use crate::error::{VerifyError, VerifyResult};
use crate::scenario::Scenario;
use crate::script::{self, ScriptConfig, StepReport};
use crate::target::{self, TargetConfig};

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub success: bool,
    pub duration_ms: u64,
    pub steps: Vec<StepReport>,
    pub screenshots: Vec<ScreenshotRecord>,
    pub error: Option<String>,
}

/// A screenshot that exists on disk after the run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenshotRecord {
    pub name: String,
    pub path: String,
    pub sha256: String,
}

/// Result of running the whole scenario set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub started_at: DateTime<Utc>,
    pub results: Vec<ScenarioResult>,
}

/// Configuration for the verification runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub scenario_dir: PathBuf,
    pub output_dir: PathBuf,
    pub script: ScriptConfig,
    pub target: TargetConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            scenario_dir: PathBuf::from("scenarios"),
            output_dir: PathBuf::from("verify-results"),
            script: ScriptConfig::default(),
            target: TargetConfig::default(),
        }
    }
}

/// Main verification runner
pub struct VerifyRunner {
    config: RunnerConfig,
}

impl VerifyRunner {
    pub fn new() -> Self {
        Self::with_config(RunnerConfig::default())
    }

    pub fn with_config(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Run every scenario in the scenario directory
    pub async fn run_all(&self) -> VerifyResult<SuiteResult> {
        let scenarios = Scenario::load_all(&self.config.scenario_dir)?;
        self.run_scenarios(&scenarios).await
    }

    /// Run scenarios matching a tag
    pub async fn run_tagged(&self, tag: &str) -> VerifyResult<SuiteResult> {
        let scenarios = Scenario::load_all(&self.config.scenario_dir)?;
        let filtered: Vec<Scenario> = scenarios
            .into_iter()
            .filter(|s| s.tags.iter().any(|t| t == tag))
            .collect();
        self.run_scenarios(&filtered).await
    }

    /// Run one scenario by name
    pub async fn run_named(&self, name: &str) -> VerifyResult<SuiteResult> {
        let scenarios = Scenario::load_all(&self.config.scenario_dir)?;
        let scenario = scenarios
            .into_iter()
            .find(|s| s.name == name)
            .ok_or_else(|| VerifyError::ScenarioNotFound(name.to_string()))?;
        self.run_scenarios(std::slice::from_ref(&scenario)).await
    }

    /// Run a list of scenarios sequentially
    pub async fn run_scenarios(&self, scenarios: &[Scenario]) -> VerifyResult<SuiteResult> {
        let started_at = Utc::now();
        let start = Instant::now();

        script::check_playwright_installed()?;
        target::wait_for_ready(&self.config.target).await?;

        let mut results = Vec::new();
        let mut passed = 0;
        let mut failed = 0;

        info!("Running {} scenario(s)...", scenarios.len());

        for scenario in scenarios {
            match self.run_scenario(scenario).await {
                Ok(result) => {
                    if result.success {
                        passed += 1;
                        info!("✓ {} ({} ms)", result.name, result.duration_ms);
                    } else {
                        failed += 1;
                        error!(
                            "✗ {} - {}",
                            result.name,
                            result.error.as_deref().unwrap_or("unknown error")
                        );
                    }
                    results.push(result);
                }
                Err(e) => {
                    failed += 1;
                    error!("✗ {} - {}", scenario.name, e);
                    results.push(ScenarioResult {
                        name: scenario.name.clone(),
                        success: false,
                        duration_ms: 0,
                        steps: vec![],
                        screenshots: vec![],
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        let duration_ms = start.elapsed().as_millis() as u64;

        info!("");
        info!(
            "Results: {} passed, {} failed ({} ms)",
            passed, failed, duration_ms
        );

        Ok(SuiteResult {
            total: scenarios.len(),
            passed,
            failed,
            duration_ms,
            started_at,
            results,
        })
    }

    /// Run a single scenario end to end
    pub async fn run_scenario(&self, scenario: &Scenario) -> VerifyResult<ScenarioResult> {
        let start = Instant::now();
        debug!("Running scenario: {}", scenario.name);

        let js = script::build_script(scenario, &self.config.script);
        let outcome = script::run_script(&js, &self.config.script).await?;

        let screenshots = self.record_screenshots(scenario)?;

        let mut scenario_error = outcome.error;
        if outcome.success {
            if let Some(composite) = &scenario.composite {
                // Branch arms mean not every declared screenshot must exist;
                // compose only when all inputs were actually captured.
                let captured: Vec<&str> = screenshots.iter().map(|s| s.name.as_str()).collect();
                if composite.inputs.iter().all(|i| captured.contains(&i.as_str())) {
                    match compose::write_composite(
                        &self.config.script.screenshot_dir,
                        &composite.name,
                        &composite.inputs,
                    ) {
                        Ok(_) => {}
                        Err(e) => scenario_error = Some(format!("composite failed: {}", e)),
                    }
                } else {
                    info!(
                        "Skipping composite '{}': not all inputs captured",
                        composite.name
                    );
                }
            }
        }

        Ok(ScenarioResult {
            name: scenario.name.clone(),
            success: scenario_error.is_none(),
            duration_ms: start.elapsed().as_millis() as u64,
            steps: outcome.steps,
            screenshots,
            error: scenario_error,
        })
    }

    /// Hash whichever declared screenshots exist on disk after the run
    fn record_screenshots(&self, scenario: &Scenario) -> VerifyResult<Vec<ScreenshotRecord>> {
        let mut records = Vec::new();

        for name in scenario.screenshot_names() {
            let path = self
                .config
                .script
                .screenshot_dir
                .join(format!("{}.png", name));
            if !path.exists() {
                continue;
            }

            let data = std::fs::read(&path)?;
            let mut hasher = Sha256::new();
            hasher.update(&data);

            records.push(ScreenshotRecord {
                name,
                path: path.to_string_lossy().to_string(),
                sha256: hex::encode(hasher.finalize()),
            });
        }

        Ok(records)
    }

    /// Write the suite result to `<output>/results.json`
    pub fn write_results(&self, results: &SuiteResult) -> VerifyResult<PathBuf> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let path = self.config.output_dir.join("results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

impl Default for VerifyRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn results_serialize_round_trip() {
        let suite = SuiteResult {
            total: 1,
            passed: 0,
            failed: 1,
            duration_ms: 1234,
            started_at: Utc::now(),
            results: vec![ScenarioResult {
                name: "drawers".to_string(),
                success: false,
                duration_ms: 1234,
                steps: vec![StepReport {
                    step: "navigate:/catalog".to_string(),
                    ok: true,
                    ms: 800,
                    error: None,
                    note: None,
                }],
                screenshots: vec![],
                error: Some("timeout".to_string()),
            }],
        };

        let json = serde_json::to_string(&suite).unwrap();
        let back: SuiteResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.failed, 1);
        assert_eq!(back.results[0].steps[0].step, "navigate:/catalog");
    }

    #[test]
    fn missing_scenario_dir_is_empty_not_error() {
        let scenarios = Scenario::load_all(std::path::Path::new("does-not-exist")).unwrap();
        assert!(scenarios.is_empty());
    }
}
