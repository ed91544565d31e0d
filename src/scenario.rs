//! Declarative YAML verification scenarios

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{VerifyError, VerifyResult};

/// A complete verification scenario parsed from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Unique name for this scenario
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Tags for filtering scenarios
    #[serde(default)]
    pub tags: Vec<String>,

    /// Viewport size for the browser
    #[serde(default = "default_viewport")]
    pub viewport: Viewport,

    /// Playwright device preset name (e.g. "iPhone 12 Pro").
    /// Takes precedence over `viewport` for the initial context.
    #[serde(default)]
    pub device: Option<String>,

    /// Steps to execute in order
    pub steps: Vec<Step>,

    /// Optional side-by-side composite built from captured screenshots
    #[serde(default)]
    pub composite: Option<Composite>,
}

fn default_viewport() -> Viewport {
    Viewport { width: 1280, height: 720 }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Horizontal concatenation of captured screenshots into one image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Composite {
    /// Output name (without extension)
    pub name: String,
    /// Screenshot names to paste left-to-right
    pub inputs: Vec<String>,
}

/// A single step in a scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Navigate to a URL (relative to base)
    Navigate {
        url: String,
        #[serde(default)]
        wait_until: Option<WaitUntil>,
        #[serde(default = "default_nav_timeout")]
        timeout_ms: u64,
    },

    /// Wait for an element to reach a state
    Wait {
        selector: String,
        #[serde(default)]
        state: WaitState,
        #[serde(default = "default_wait_timeout")]
        timeout_ms: u64,
    },

    /// Click an element
    Click {
        selector: String,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },

    /// Press a key on an element, or on the page when no selector is given
    Press {
        key: String,
        #[serde(default)]
        selector: Option<String>,
    },

    /// Pointer drag over an element: press, move in interpolated steps, release
    Swipe {
        selector: String,
        dx: i32,
        dy: i32,
        #[serde(default = "default_swipe_steps")]
        steps: u32,
    },

    /// Change the viewport mid-scenario (desktop/mobile sections)
    SetViewport {
        width: u32,
        height: u32,
    },

    /// Fixed settle delay for animations and hydration (use sparingly)
    Sleep {
        ms: u64,
    },

    /// Immediate check on an element, no retry
    Assert {
        selector: String,
        #[serde(default)]
        visible: Option<bool>,
        #[serde(default)]
        count: Option<usize>,
        #[serde(default)]
        text_contains: Option<String>,
    },

    /// Exact attribute equality within a timeout
    AssertAttribute {
        selector: String,
        name: String,
        value: String,
        #[serde(default = "default_attr_timeout")]
        timeout_ms: u64,
    },

    /// Page URL matches a regex within a timeout
    AssertUrl {
        pattern: String,
        #[serde(default = "default_url_timeout")]
        timeout_ms: u64,
    },

    /// Capture a screenshot, overwriting any prior file
    Screenshot {
        name: String,
        #[serde(default)]
        full_page: bool,
    },

    /// Soft-fallback branch: run `then` if the probe element becomes
    /// visible, otherwise log and run `otherwise`. Never fails on its own.
    IfVisible {
        selector: String,
        #[serde(default = "default_probe_timeout")]
        timeout_ms: u64,
        then: Vec<Step>,
        #[serde(default)]
        otherwise: Vec<Step>,
    },

    /// Log a message
    Log {
        message: String,
    },
}

fn default_nav_timeout() -> u64 {
    60_000
}

fn default_wait_timeout() -> u64 {
    10_000
}

fn default_attr_timeout() -> u64 {
    5_000
}

fn default_url_timeout() -> u64 {
    15_000
}

fn default_probe_timeout() -> u64 {
    5_000
}

fn default_swipe_steps() -> u32 {
    10
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitUntil {
    Load,
    Domcontentloaded,
    Networkidle,
}

impl WaitUntil {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaitUntil::Load => "load",
            WaitUntil::Domcontentloaded => "domcontentloaded",
            WaitUntil::Networkidle => "networkidle",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitState {
    #[default]
    Visible,
    Hidden,
    Attached,
    Detached,
}

impl WaitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaitState::Visible => "visible",
            WaitState::Hidden => "hidden",
            WaitState::Attached => "attached",
            WaitState::Detached => "detached",
        }
    }
}

impl Step {
    /// Short name used in step reports and logs
    pub fn name(&self) -> String {
        match self {
            Step::Navigate { url, .. } => format!("navigate:{}", url),
            Step::Wait { selector, .. } => format!("wait:{}", selector),
            Step::Click { selector, .. } => format!("click:{}", selector),
            Step::Press { key, .. } => format!("press:{}", key),
            Step::Swipe { selector, .. } => format!("swipe:{}", selector),
            Step::SetViewport { width, height } => format!("set_viewport:{}x{}", width, height),
            Step::Sleep { ms } => format!("sleep:{}ms", ms),
            Step::Assert { selector, .. } => format!("assert:{}", selector),
            Step::AssertAttribute { selector, name, .. } => {
                format!("assert_attribute:{}@{}", selector, name)
            }
            Step::AssertUrl { pattern, .. } => format!("assert_url:{}", pattern),
            Step::Screenshot { name, .. } => format!("screenshot:{}", name),
            Step::IfVisible { selector, .. } => format!("if_visible:{}", selector),
            Step::Log { message } => {
                format!("log:{}", message.chars().take(30).collect::<String>())
            }
        }
    }
}

impl Scenario {
    /// Parse a scenario from a YAML string and validate it
    pub fn from_yaml(yaml: &str) -> VerifyResult<Self> {
        let scenario: Scenario = serde_yaml::from_str(yaml)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Parse a scenario from a YAML file
    pub fn from_file(path: &Path) -> VerifyResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            VerifyError::ScenarioParse(format!("{}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    /// Load all scenarios from a directory, sorted by file name
    pub fn load_all(dir: &Path) -> VerifyResult<Vec<Self>> {
        let mut entries: Vec<_> = walkdir::WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
            .collect();
        entries.sort_by(|a, b| a.path().cmp(b.path()));

        let mut scenarios = Vec::new();
        for entry in entries {
            scenarios.push(Self::from_file(entry.path())?);
        }
        Ok(scenarios)
    }

    /// All screenshot names this scenario can produce, including branch arms
    pub fn screenshot_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        collect_screenshots(&self.steps, &mut names);
        names
    }

    /// Structural checks that are cheaper to fail at load time than mid-run
    pub fn validate(&self) -> VerifyResult<()> {
        if self.steps.is_empty() {
            return Err(VerifyError::ScenarioParse(format!(
                "scenario '{}' has no steps",
                self.name
            )));
        }

        validate_steps(&self.steps)?;

        if let Some(composite) = &self.composite {
            if composite.inputs.is_empty() {
                return Err(VerifyError::EmptyComposite(composite.name.clone()));
            }
            let produced = self.screenshot_names();
            for input in &composite.inputs {
                if !produced.contains(input) {
                    return Err(VerifyError::CompositeInput {
                        name: composite.name.clone(),
                        input: input.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

fn collect_screenshots(steps: &[Step], names: &mut Vec<String>) {
    for step in steps {
        match step {
            Step::Screenshot { name, .. } => names.push(name.clone()),
            Step::IfVisible { then, otherwise, .. } => {
                collect_screenshots(then, names);
                collect_screenshots(otherwise, names);
            }
            _ => {}
        }
    }
}

fn validate_steps(steps: &[Step]) -> VerifyResult<()> {
    for step in steps {
        match step {
            Step::AssertUrl { pattern, .. } => {
                regex::Regex::new(pattern).map_err(|e| VerifyError::InvalidUrlPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })?;
            }
            Step::Swipe { steps: n, .. } => {
                if *n == 0 {
                    return Err(VerifyError::ScenarioParse(
                        "swipe needs at least one interpolation step".to_string(),
                    ));
                }
            }
            Step::IfVisible { then, otherwise, .. } => {
                validate_steps(then)?;
                validate_steps(otherwise)?;
            }
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_drawer_scenario() {
        let yaml = r#"
name: booking-drawer
description: Booking drawer opens from the car detail page
tags:
  - drawers
steps:
  - action: navigate
    url: /catalog
    timeout_ms: 60000
  - action: wait
    selector: '.car-card-link'
    timeout_ms: 30000
  - action: click
    selector: '.car-card-link'
  - action: click
    selector: 'role=button[name="Записаться на просмотр"]'
  - action: wait
    selector: '.universal-drawer-content'
  - action: screenshot
    name: booking-drawer
"#;
        let scenario = Scenario::from_yaml(yaml).unwrap();
        assert_eq!(scenario.name, "booking-drawer");
        assert_eq!(scenario.steps.len(), 6);
        assert_eq!(scenario.screenshot_names(), vec!["booking-drawer"]);
        assert_eq!(scenario.viewport.width, 1280);
    }

    #[test]
    fn parse_soft_fallback() {
        let yaml = r#"
name: reviews
steps:
  - action: navigate
    url: /reviews
  - action: if_visible
    selector: 'text=Читать полностью'
    then:
      - action: click
        selector: 'text=Читать полностью'
      - action: screenshot
        name: review-drawer
    otherwise:
      - action: log
        message: no expandable review found
      - action: screenshot
        name: review-page
"#;
        let scenario = Scenario::from_yaml(yaml).unwrap();
        let names = scenario.screenshot_names();
        assert_eq!(names, vec!["review-drawer", "review-page"]);
    }

    #[test]
    fn invalid_url_pattern_rejected() {
        let yaml = r#"
name: bad-pattern
steps:
  - action: assert_url
    pattern: 'make=('
"#;
        let err = Scenario::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, VerifyError::InvalidUrlPattern { .. }));
    }

    #[test]
    fn composite_must_reference_produced_screenshots() {
        let yaml = r#"
name: themes
steps:
  - action: navigate
    url: /
  - action: screenshot
    name: light
composite:
  name: combined
  inputs:
    - light
    - dark
"#;
        let err = Scenario::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, VerifyError::CompositeInput { .. }));
    }

    #[test]
    fn empty_scenario_rejected() {
        let yaml = "name: empty\nsteps: []\n";
        let err = Scenario::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, VerifyError::ScenarioParse(_)));
    }

    #[test]
    fn device_preset_parsed() {
        let yaml = r#"
name: mobile
device: iPhone 12 Pro
steps:
  - action: navigate
    url: /
"#;
        let scenario = Scenario::from_yaml(yaml).unwrap();
        assert_eq!(scenario.device.as_deref(), Some("iPhone 12 Pro"));
    }
}
