//! Error types for the verification runner

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("Target app unreachable at {url} after {attempts} attempts")]
    TargetUnreachable { url: String, attempts: usize },

    #[error("Playwright not found. Install with: npm install playwright && npx playwright install")]
    PlaywrightNotFound,

    #[error("Playwright run failed: {0}")]
    Playwright(String),

    #[error("Scenario timed out after {0} seconds")]
    ScenarioTimeout(u64),

    #[error("Scenario parse error: {0}")]
    ScenarioParse(String),

    #[error("Scenario not found: {0}")]
    ScenarioNotFound(String),

    #[error("Invalid URL pattern '{pattern}': {reason}")]
    InvalidUrlPattern { pattern: String, reason: String },

    #[error("Composite '{name}' references screenshot '{input}' that no step produces")]
    CompositeInput { name: String, input: String },

    #[error("Composite '{0}' has no input images")]
    EmptyComposite(String),

    #[error("Screenshot missing after run: {0}")]
    ScreenshotMissing(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type VerifyResult<T> = Result<T, VerifyError>;
