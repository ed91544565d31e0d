//! Validates the shipped scenario files against the runner's model.
//!
//! These run without a browser or a target app: they catch broken YAML,
//! bad URL patterns, and screenshot-name collisions before anyone burns
//! time on a live run.

use std::collections::HashSet;
use std::path::Path;

use dealer_verify::Scenario;

fn shipped() -> Vec<Scenario> {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios");
    Scenario::load_all(&dir).expect("shipped scenarios must parse")
}

#[test]
fn all_shipped_scenarios_parse() {
    let scenarios = shipped();
    assert_eq!(scenarios.len(), 10, "unexpected scenario count");

    let names: HashSet<&str> = scenarios.iter().map(|s| s.name.as_str()).collect();
    for expected in [
        "drawers",
        "all-drawers",
        "catalog-filter",
        "financial-calculator",
        "reviews",
        "simple-drawers",
        "themes",
        "mobile-stack",
        "warranty-mobile",
        "catalog-smoke",
    ] {
        assert!(names.contains(expected), "missing scenario '{}'", expected);
    }
}

#[test]
fn every_scenario_captures_something() {
    for scenario in shipped() {
        assert!(
            !scenario.screenshot_names().is_empty(),
            "scenario '{}' captures no screenshots",
            scenario.name
        );
    }
}

#[test]
fn screenshot_names_are_unique_across_the_suite() {
    // All scenarios share one screenshot directory; a duplicate name
    // would silently overwrite another scenario's capture.
    let mut seen = HashSet::new();
    for scenario in shipped() {
        for name in scenario.screenshot_names() {
            assert!(
                seen.insert(name.clone()),
                "screenshot name '{}' used more than once",
                name
            );
        }
        if let Some(composite) = &scenario.composite {
            assert!(
                seen.insert(composite.name.clone()),
                "composite name '{}' collides with a screenshot",
                composite.name
            );
        }
    }
}

#[test]
fn themes_composite_covers_all_four_captures() {
    let scenarios = shipped();
    let themes = scenarios.iter().find(|s| s.name == "themes").unwrap();
    let composite = themes.composite.as_ref().expect("themes has a composite");

    assert_eq!(composite.name, "themes-combined");
    assert_eq!(
        composite.inputs,
        vec!["desktop-light", "desktop-dark", "desktop-amoled", "mobile-amoled"]
    );
}

#[test]
fn mobile_stack_uses_device_emulation() {
    let scenarios = shipped();
    let stack = scenarios.iter().find(|s| s.name == "mobile-stack").unwrap();
    assert_eq!(stack.device.as_deref(), Some("iPhone 12 Pro"));
}

#[test]
fn warranty_screenshot_is_full_page() {
    use dealer_verify::Step;

    let scenarios = shipped();
    let warranty = scenarios
        .iter()
        .find(|s| s.name == "warranty-mobile")
        .unwrap();

    let full_page = warranty.steps.iter().any(|s| {
        matches!(s, Step::Screenshot { full_page: true, .. })
    });
    assert!(full_page);
    assert_eq!(warranty.viewport.width, 375);
    assert_eq!(warranty.viewport.height, 812);
}

#[test]
fn review_scenarios_fall_back_softly() {
    use dealer_verify::Step;

    fn has_soft_branch(steps: &[Step]) -> bool {
        steps.iter().any(|s| match s {
            Step::IfVisible { selector, .. } => selector.contains("Читать полностью"),
            _ => false,
        })
    }

    let scenarios = shipped();
    for name in ["all-drawers", "simple-drawers"] {
        let scenario = scenarios.iter().find(|s| s.name == name).unwrap();
        assert!(
            has_soft_branch(&scenario.steps),
            "scenario '{}' should probe the read-more affordance softly",
            name
        );
    }
}
