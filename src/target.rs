//! Target app reachability probe
//!
//! The dealership app is an external deployment; nothing is spawned here.
//! Before running scenarios we poll the base URL until it answers, so an
//! unreachable target fails fast instead of burning every scenario's
//! navigation timeout one by one.

use std::time::Duration;

use tracing::{info, warn};

use crate::error::{VerifyError, VerifyResult};

/// Configuration for the reachability probe
#[derive(Debug, Clone)]
pub struct TargetConfig {
    /// Base URL of the target app
    pub base_url: String,

    /// Total time to wait for the target to answer
    pub ready_timeout: Duration,

    /// Delay between probe attempts
    pub poll_interval: Duration,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            ready_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(500),
        }
    }
}

/// Poll the target until it responds to HTTP at all.
///
/// Any HTTP status counts as reachable: the probe checks that a server is
/// listening and answering, not that a given route renders.
pub async fn wait_for_ready(config: &TargetConfig) -> VerifyResult<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()?;

    let start = std::time::Instant::now();
    let mut attempts = 0usize;

    while start.elapsed() < config.ready_timeout {
        attempts += 1;

        match client.get(&config.base_url).send().await {
            Ok(resp) => {
                if !resp.status().is_success() {
                    warn!("Target answered with {}", resp.status());
                }
                info!("Target reachable at {}", config.base_url);
                return Ok(());
            }
            Err(e) => {
                if attempts == 1 {
                    info!("Waiting for target at {}...", config.base_url);
                }
                // Connection refused is expected while the app warms up
                if !e.is_connect() && !e.is_timeout() {
                    warn!("Probe error: {}", e);
                }
            }
        }

        tokio::time::sleep(config.poll_interval).await;
    }

    Err(VerifyError::TargetUnreachable {
        url: config.base_url.clone(),
        attempts,
    })
}
