//! Dealer-verify: browser verification runner for the dealership web UI
//!
//! This crate drives a headless browser (via Playwright) through fixed
//! navigational scenarios against a running instance of the dealership
//! app, asserts visibility/attribute/URL conditions, and captures
//! screenshots for manual visual review.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Verification Runner (Rust)                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  VerifyRunner                                               │
//! │    ├── wait_for_ready(target)   -> reachability probe       │
//! │    ├── run_scenario(scenario)   -> ScenarioResult           │
//! │    ├── record_screenshots()     -> sha256 per capture       │
//! │    └── write_results()          -> results.json             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Scenario (YAML)                                            │
//! │    ├── name, tags, viewport | device preset                 │
//! │    ├── steps: [Step]                                        │
//! │    │     ├── navigate { url, wait_until }                   │
//! │    │     ├── click / press / swipe / set_viewport / sleep   │
//! │    │     ├── wait { selector, state, timeout_ms }           │
//! │    │     ├── assert / assert_attribute / assert_url         │
//! │    │     ├── screenshot { name, full_page }                 │
//! │    │     └── if_visible { then, otherwise }  (soft branch)  │
//! │    └── composite: side-by-side image of named screenshots   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each scenario becomes one generated Playwright script run under node,
//! so the browser session, its cleanup, and the error-path diagnostics
//! (HTML dump plus screenshot) live in a single `try/catch/finally`.

pub mod compose;
pub mod error;
pub mod runner;
pub mod scenario;
pub mod script;
pub mod target;

pub use error::{VerifyError, VerifyResult};
pub use runner::{RunnerConfig, SuiteResult, VerifyRunner};
pub use scenario::{Scenario, Step};
