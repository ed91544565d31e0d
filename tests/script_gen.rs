//! Codegen checks over the shipped scenarios.
//!
//! The generated Playwright scripts never run here; the assertions pin
//! down the parts that past regressions would make silently wrong:
//! cleanup on every exit path, error diagnostics, and the handful of
//! step translations with non-obvious JS.

use std::path::Path;

use dealer_verify::scenario::Scenario;
use dealer_verify::script::{build_script, ScriptConfig};

fn shipped() -> Vec<Scenario> {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios");
    Scenario::load_all(&dir).expect("shipped scenarios must parse")
}

fn script_for(name: &str) -> String {
    let scenarios = shipped();
    let scenario = scenarios.iter().find(|s| s.name == name).unwrap();
    build_script(scenario, &ScriptConfig::default())
}

#[test]
fn every_script_closes_the_browser_on_all_paths() {
    for scenario in shipped() {
        let script = build_script(&scenario, &ScriptConfig::default());
        assert!(
            script.contains("} finally {") && script.contains("await browser.close();"),
            "scenario '{}' lacks guaranteed cleanup",
            scenario.name
        );
    }
}

#[test]
fn every_script_dumps_diagnostics_on_error() {
    for scenario in shipped() {
        let script = build_script(&scenario, &ScriptConfig::default());
        assert!(
            script.contains(&format!("{}-error.html", scenario.name)),
            "scenario '{}' has no HTML dump path",
            scenario.name
        );
        assert!(
            script.contains(&format!("{}-error.png", scenario.name)),
            "scenario '{}' has no error screenshot path",
            scenario.name
        );
    }
}

#[test]
fn theme_assertions_compare_the_exact_class() {
    let script = script_for("themes");
    assert!(script.contains("el.getAttribute(attr) === val"));
    assert!(script.contains("'amoled'"));
    assert!(script.contains("'dark'"));
    // Two toggles happen after the viewport shrinks to mobile
    assert!(script.contains("page.setViewportSize({ width: 375, height: 812 })"));
}

#[test]
fn filter_scenario_waits_for_the_make_parameter() {
    let script = script_for("catalog-filter");
    assert!(script.contains("page.waitForURL(new RegExp('make='), { timeout: 15000 })"));
}

#[test]
fn mobile_stack_emulates_a_device_and_swipes() {
    let script = script_for("mobile-stack");
    assert!(script.contains("...devices['iPhone 12 Pro']"));
    assert!(script.contains("await page.mouse.down();"));
    assert!(script.contains("cx + 150"));
    assert!(script.contains("{ steps: 10 }"));
    assert!(script.contains("await page.mouse.up();"));
}

#[test]
fn warranty_screenshot_is_full_page_in_js() {
    let script = script_for("warranty-mobile");
    assert!(script.contains("fullPage: true"));
}

#[test]
fn soft_branches_report_the_fallback_arm() {
    for name in ["all-drawers", "simple-drawers", "mobile-stack"] {
        let script = script_for(name);
        assert!(
            script.contains("note: 'fallback'"),
            "scenario '{}' has no fallback report",
            name
        );
    }
}

#[test]
fn drawer_close_waits_for_hidden_state() {
    let script = script_for("drawers");
    assert!(script.contains("state: 'hidden'"));
}

#[test]
fn navigation_is_relative_to_the_base_url() {
    for scenario in shipped() {
        let script = build_script(&scenario, &ScriptConfig::default());
        assert!(
            script.contains("page.goto(base + '/"),
            "scenario '{}' navigates without the base URL",
            scenario.name
        );
        assert!(script.contains("const base = 'http://localhost:3000';"));
    }
}
