//! # snapcheck
//!
//! Scripted UI verification. Define a scenario in YAML — which elements to
//! wait for, what to click, when to screenshot — and run it against a live
//! application. Every step persists at most one screenshot artifact under a
//! deterministic path, so successive runs can be diffed for visual
//! regressions.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use snapcheck::{EokaEngine, Scenario};
//!
//! # #[tokio::main]
//! # async fn main() -> snapcheck::Result<()> {
//! let scenario = Scenario::load("login-flow.yaml")?;
//! let engine = EokaEngine::launch(&scenario.browser).await?;
//! let result = snapcheck::run_scenario(engine, &scenario).await?;
//! println!("status: {:?}", result.status);
//! # Ok(())
//! # }
//! ```

mod capture;
mod config;
mod engine;
mod locator;
mod runner;
mod wait;

pub use config::{
    ArtifactsConfig, BrowserConfig, CaptureSpec, Scenario, Step, StepAction, TargetUrl, Viewport,
    WaitSpec,
};
pub use engine::{EokaEngine, Engine, ResolvedElement};
pub use locator::Locator;
pub use runner::{
    run_scenario, run_scenario_until, FailureKind, RunResult, RunStatus, StepOutcome, StepStatus,
};
pub use wait::{wait_for, WaitCondition};

/// Result type for snapcheck operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during config loading or a scenario run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("browser error: {0}")]
    Engine(#[from] eoka::Error),

    #[error("browser launch failed: {0}")]
    SessionLaunch(String),

    #[error("timed out after {elapsed_ms}ms waiting for {locator} to become {condition}")]
    ElementTimeout {
        locator: String,
        condition: String,
        elapsed_ms: u64,
    },

    #[error("action rejected on {locator}: {reason}")]
    ActionRejected { locator: String, reason: String },

    #[error("failed to write artifact {path}: {source}")]
    CaptureIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("interrupted")]
    Interrupted,
}
