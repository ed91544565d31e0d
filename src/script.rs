//! Playwright script generation and execution
//!
//! A scenario is translated into one standalone Playwright (Node) script
//! that runs the whole step sequence in a single browser session. Every
//! step reports a JSON line on stdout, and the browser is closed in a
//! `finally` block on success and failure alike. On failure the script
//! dumps the page HTML and a diagnostic screenshot before closing.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{VerifyError, VerifyResult};
use crate::scenario::{Scenario, Step};

const STEP_PREFIX: &str = "@@STEP ";
const DONE_PREFIX: &str = "@@DONE ";

#[derive(Debug, Clone, Copy, Default)]
pub enum BrowserKind {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl BrowserKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserKind::Chromium => "chromium",
            BrowserKind::Firefox => "firefox",
            BrowserKind::Webkit => "webkit",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "firefox" => BrowserKind::Firefox,
            "webkit" => BrowserKind::Webkit,
            _ => BrowserKind::Chromium,
        }
    }
}

/// Configuration for script generation and execution
#[derive(Debug, Clone)]
pub struct ScriptConfig {
    /// Base URL of the target app
    pub base_url: String,

    /// Directory for captured screenshots
    pub screenshot_dir: PathBuf,

    /// Directory for error-path diagnostics (HTML dump, error screenshot)
    pub artifact_dir: PathBuf,

    pub browser: BrowserKind,
    pub headless: bool,

    /// Hard cap on one scenario's wall-clock time
    pub scenario_timeout: Duration,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            screenshot_dir: PathBuf::from("verify-results/screenshots"),
            artifact_dir: PathBuf::from("verify-results/artifacts"),
            browser: BrowserKind::Chromium,
            headless: true,
            scenario_timeout: Duration::from_secs(180),
        }
    }
}

/// One line of the generated script's per-step protocol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepReport {
    pub step: String,
    pub ok: bool,
    #[serde(default)]
    pub ms: u64,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Outcome of one script run
#[derive(Debug, Clone)]
pub struct ScriptOutcome {
    pub success: bool,
    pub steps: Vec<StepReport>,
    pub error: Option<String>,
}

/// Verify that node can resolve the playwright package
pub fn check_playwright_installed() -> VerifyResult<()> {
    let status = std::process::Command::new("node")
        .args(["-e", "require.resolve('playwright')"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match status {
        Ok(status) if status.success() => Ok(()),
        _ => Err(VerifyError::PlaywrightNotFound),
    }
}

/// Escape a string into a single-quoted JS literal
fn js_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

fn path_str(path: &PathBuf) -> String {
    js_str(&path.to_string_lossy())
}

/// Build the complete Playwright script for a scenario
pub fn build_script(scenario: &Scenario, config: &ScriptConfig) -> String {
    let context_options = match &scenario.device {
        Some(device) => format!("{{ ...devices[{}] }}", js_str(device)),
        None => format!(
            "{{ viewport: {{ width: {}, height: {} }} }}",
            scenario.viewport.width, scenario.viewport.height
        ),
    };

    let error_png = path_str(&config.artifact_dir.join(format!("{}-error.png", scenario.name)));
    let error_html = path_str(&config.artifact_dir.join(format!("{}-error.html", scenario.name)));

    let mut script = String::new();
    script.push_str(&format!(
        r#"const {{ chromium, firefox, webkit, devices }} = require('playwright');
const fs = require('fs');

function report(obj) {{
  console.log('{step_prefix}' + JSON.stringify(obj));
}}

async function step(name, fn) {{
  const t0 = Date.now();
  try {{
    await fn();
    report({{ step: name, ok: true, ms: Date.now() - t0 }});
  }} catch (err) {{
    report({{ step: name, ok: false, ms: Date.now() - t0, error: String((err && err.message) || err) }});
    throw err;
  }}
}}

(async () => {{
  const browser = await {browser}.launch({{ headless: {headless} }});
  const context = await browser.newContext({context_options});
  const page = await context.newPage();
  const base = {base_url};

  try {{
"#,
        step_prefix = STEP_PREFIX,
        browser = config.browser.as_str(),
        headless = config.headless,
        context_options = context_options,
        base_url = js_str(&config.base_url),
    ));

    emit_steps(&scenario.steps, config, 4, &mut script);

    script.push_str(&format!(
        r#"
    console.log('{done_prefix}' + JSON.stringify({{ success: true }}));
  }} catch (err) {{
    try {{
      fs.writeFileSync({error_html}, await page.content());
      await page.screenshot({{ path: {error_png} }});
    }} catch (_) {{
      // Diagnostics are best effort
    }}
    console.log('{done_prefix}' + JSON.stringify({{ success: false, error: String((err && err.message) || err) }}));
    process.exitCode = 1;
  }} finally {{
    await browser.close();
  }}
}})();
"#,
        done_prefix = DONE_PREFIX,
        error_html = error_html,
        error_png = error_png,
    ));

    script
}

fn emit_steps(steps: &[Step], config: &ScriptConfig, indent: usize, out: &mut String) {
    for step in steps {
        emit_step(step, config, indent, out);
    }
}

fn emit_step(step: &Step, config: &ScriptConfig, indent: usize, out: &mut String) {
    let pad = " ".repeat(indent);
    let name = js_str(&step.name());

    match step {
        Step::Navigate { url, wait_until, timeout_ms } => {
            let wait = wait_until
                .as_ref()
                .map(|w| format!(", waitUntil: '{}'", w.as_str()))
                .unwrap_or_default();
            out.push_str(&format!(
                "{pad}await step({name}, () => page.goto(base + {url}, {{ timeout: {timeout_ms}{wait} }}));\n",
                url = js_str(url),
            ));
        }
        Step::Wait { selector, state, timeout_ms } => {
            out.push_str(&format!(
                "{pad}await step({name}, () => page.locator({sel}).first().waitFor({{ state: '{state}', timeout: {timeout_ms} }}));\n",
                sel = js_str(selector),
                state = state.as_str(),
            ));
        }
        Step::Click { selector, timeout_ms } => {
            let timeout = timeout_ms.unwrap_or(10_000u64);
            out.push_str(&format!(
                "{pad}await step({name}, () => page.locator({sel}).first().click({{ timeout: {timeout} }}));\n",
                sel = js_str(selector),
            ));
        }
        Step::Press { key, selector } => match selector {
            Some(sel) => out.push_str(&format!(
                "{pad}await step({name}, () => page.locator({sel}).first().press({key}));\n",
                sel = js_str(sel),
                key = js_str(key),
            )),
            None => out.push_str(&format!(
                "{pad}await step({name}, () => page.keyboard.press({key}));\n",
                key = js_str(key),
            )),
        },
        Step::Swipe { selector, dx, dy, steps } => {
            out.push_str(&format!(
                r#"{pad}await step({name}, async () => {{
{pad}  const box = await page.locator({sel}).first().boundingBox();
{pad}  if (!box) throw new Error('no bounding box for swipe target');
{pad}  const cx = box.x + box.width / 2;
{pad}  const cy = box.y + box.height / 2;
{pad}  await page.mouse.move(cx, cy);
{pad}  await page.mouse.down();
{pad}  await page.mouse.move(cx + {dx}, cy + {dy}, {{ steps: {steps} }});
{pad}  await page.mouse.up();
{pad}}});
"#,
                sel = js_str(selector),
            ));
        }
        Step::SetViewport { width, height } => {
            out.push_str(&format!(
                "{pad}await step({name}, () => page.setViewportSize({{ width: {width}, height: {height} }}));\n",
            ));
        }
        Step::Sleep { ms } => {
            out.push_str(&format!(
                "{pad}await step({name}, () => page.waitForTimeout({ms}));\n",
            ));
        }
        Step::Assert { selector, visible, count, text_contains } => {
            let sel = js_str(selector);
            out.push_str(&format!("{pad}await step({name}, async () => {{\n"));
            if let Some(expected) = visible {
                out.push_str(&format!(
                    "{pad}  const vis = await page.locator({sel}).first().isVisible();\n\
                     {pad}  if (vis !== {expected}) throw new Error('expected visible={expected} for ' + {sel});\n",
                ));
            }
            if let Some(expected) = count {
                out.push_str(&format!(
                    "{pad}  const n = await page.locator({sel}).count();\n\
                     {pad}  if (n !== {expected}) throw new Error('expected count {expected}, got ' + n);\n",
                ));
            }
            if let Some(fragment) = text_contains {
                out.push_str(&format!(
                    "{pad}  const text = await page.locator({sel}).first().textContent();\n\
                     {pad}  if (!text || !text.includes({fragment})) throw new Error('missing text ' + {fragment});\n",
                    fragment = js_str(fragment),
                ));
            }
            out.push_str(&format!("{pad}}});\n"));
        }
        Step::AssertAttribute { selector, name: attr, value, timeout_ms } => {
            out.push_str(&format!(
                r#"{pad}await step({name}, () => page.waitForFunction(
{pad}  ([sel, attr, val]) => {{
{pad}    const el = document.querySelector(sel);
{pad}    return !!el && el.getAttribute(attr) === val;
{pad}  }},
{pad}  [{sel}, {attr}, {val}],
{pad}  {{ timeout: {timeout_ms} }}
{pad}));
"#,
                sel = js_str(selector),
                attr = js_str(attr),
                val = js_str(value),
            ));
        }
        Step::AssertUrl { pattern, timeout_ms } => {
            out.push_str(&format!(
                "{pad}await step({name}, () => page.waitForURL(new RegExp({pattern}), {{ timeout: {timeout_ms} }}));\n",
                pattern = js_str(pattern),
            ));
        }
        Step::Screenshot { name: shot, full_page } => {
            let path = path_str(&config.screenshot_dir.join(format!("{}.png", shot)));
            out.push_str(&format!(
                "{pad}await step({name}, () => page.screenshot({{ path: {path}, fullPage: {full_page} }}));\n",
            ));
        }
        Step::IfVisible { selector, timeout_ms, then, otherwise } => {
            let sel = js_str(selector);
            out.push_str(&format!(
                "{pad}if (await page.locator({sel}).first().waitFor({{ state: 'visible', timeout: {timeout_ms} }}).then(() => true, () => false)) {{\n\
                 {pad}  report({{ step: {name}, ok: true, note: 'visible' }});\n",
            ));
            emit_steps(then, config, indent + 2, out);
            out.push_str(&format!(
                "{pad}}} else {{\n\
                 {pad}  report({{ step: {name}, ok: true, note: 'fallback' }});\n",
            ));
            emit_steps(otherwise, config, indent + 2, out);
            out.push_str(&format!("{pad}}}\n"));
        }
        Step::Log { message } => {
            out.push_str(&format!(
                "{pad}report({{ step: 'log', ok: true, note: {msg} }});\n",
                msg = js_str(message),
            ));
        }
    }
}

/// Run a generated script with node and parse the per-step protocol
pub async fn run_script(script: &str, config: &ScriptConfig) -> VerifyResult<ScriptOutcome> {
    std::fs::create_dir_all(&config.screenshot_dir)?;
    std::fs::create_dir_all(&config.artifact_dir)?;

    let temp_dir = tempfile::tempdir()?;
    let script_path = temp_dir.path().join("scenario.js");
    std::fs::write(&script_path, script)?;

    debug!("Running Playwright script: {}", script_path.display());

    // The script lives in a tempdir, so point node at the project's
    // node_modules for the playwright package.
    let node_path = std::env::current_dir()
        .map(|d| d.join("node_modules"))
        .unwrap_or_else(|_| PathBuf::from("node_modules"));

    let output = tokio::time::timeout(
        config.scenario_timeout,
        tokio::process::Command::new("node")
            .arg(&script_path)
            .env("NODE_PATH", &node_path)
            .output(),
    )
    .await
    .map_err(|_| VerifyError::ScenarioTimeout(config.scenario_timeout.as_secs()))??;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let outcome = parse_output(&stdout);

    if outcome.is_none() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(VerifyError::Playwright(format!(
            "no completion marker in script output\nstdout: {}\nstderr: {}",
            stdout, stderr
        )));
    }

    let outcome = outcome.unwrap();
    if !outcome.success {
        warn!(
            "Scenario script failed: {}",
            outcome.error.as_deref().unwrap_or("unknown error")
        );
    }

    Ok(outcome)
}

/// Extract step reports and the completion marker from script stdout.
/// Any other console noise (app logs, warnings) is ignored.
fn parse_output(stdout: &str) -> Option<ScriptOutcome> {
    #[derive(Deserialize)]
    struct Done {
        success: bool,
        #[serde(default)]
        error: Option<String>,
    }

    let mut steps = Vec::new();
    let mut done: Option<Done> = None;

    for line in stdout.lines() {
        if let Some(json) = line.strip_prefix(STEP_PREFIX) {
            if let Ok(report) = serde_json::from_str::<StepReport>(json) {
                steps.push(report);
            }
        } else if let Some(json) = line.strip_prefix(DONE_PREFIX) {
            done = serde_json::from_str(json).ok();
        }
    }

    done.map(|d| ScriptOutcome {
        success: d.success,
        steps,
        error: d.error,
    })
}
