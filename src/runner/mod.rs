mod executor;

use serde::Serialize;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::capture;
use crate::config::Scenario;
use crate::engine::Engine;
use crate::{Error, Result};

/// Scenario execution states. A run is idle until the initial navigation
/// lands, then `Running(step)` until a terminal state; `Completed` and
/// `Failed` are terminal and never resumed past.
#[derive(Debug, Clone, Copy, PartialEq)]
enum RunState {
    Running(usize),
    Completed,
    Failed { step: usize, reason: FailureKind },
}

/// Why a step — and therefore the run — failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The expected element never satisfied its wait condition; likely an
    /// application regression or locator drift.
    ElementTimeout,
    /// The engine refused the action on a resolved element.
    ActionRejected,
    /// The step's artifact could not be written.
    CaptureIo,
    /// The engine itself failed mid-step.
    Engine,
}

impl FailureKind {
    fn classify(err: &Error) -> Self {
        match err {
            Error::ElementTimeout { .. } => Self::ElementTimeout,
            Error::ActionRejected { .. } => Self::ActionRejected,
            Error::CaptureIo { .. } => Self::CaptureIo,
            _ => Self::Engine,
        }
    }
}

/// Outcome of a single executed step.
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub index: usize,
    pub label: String,
    pub status: StepStatus,
    pub artifact: Option<PathBuf>,
    /// Failure detail (locator, condition, elapsed time) when the step
    /// failed.
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Success,
    Failed(FailureKind),
}

/// Result of one scenario run. Immutable after completion.
#[derive(Debug, Serialize)]
pub struct RunResult {
    pub scenario: String,
    pub status: RunStatus,
    pub outcomes: Vec<StepOutcome>,
    /// Every artifact the run produced, including the diagnostic screenshot
    /// of a failed run.
    pub artifacts: Vec<PathBuf>,
    pub duration_ms: u64,
}

impl RunResult {
    pub fn succeeded(&self) -> bool {
        self.status == RunStatus::Completed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    Failed { step: usize, reason: FailureKind },
}

/// Run a scenario on the given session, then release it.
///
/// The engine is moved in and closed exactly once on every exit path:
/// normal completion, a failed step, or an infrastructure error while
/// driving the page. Step-level failures never surface as `Err`; they are
/// recorded in the returned [`RunResult`].
pub async fn run_scenario<E: Engine>(engine: E, scenario: &Scenario) -> Result<RunResult> {
    run_scenario_until(engine, scenario, std::future::pending()).await
}

/// Same as [`run_scenario`], but the run is abandoned when `shutdown`
/// resolves. The session is still released before returning, so an
/// interrupted run never leaks a live browser.
pub async fn run_scenario_until<E, S>(
    engine: E,
    scenario: &Scenario,
    shutdown: S,
) -> Result<RunResult>
where
    E: Engine,
    S: Future<Output = ()>,
{
    let outcome = tokio::select! {
        result = drive(&engine, scenario) => result,
        () = shutdown => {
            warn!("scenario '{}' interrupted, releasing session", scenario.name);
            Err(Error::Interrupted)
        }
    };
    let close_result = engine.close().await;
    let result = outcome?;
    close_result?;
    Ok(result)
}

async fn drive<E: Engine>(engine: &E, scenario: &Scenario) -> Result<RunResult> {
    let started = Instant::now();
    let artifact_root = Path::new(&scenario.artifacts.dir);

    info!(
        "running scenario '{}' against {}",
        scenario.name, scenario.target.url
    );
    engine.goto(&scenario.target.url).await?;
    let mut state = if scenario.steps.is_empty() {
        RunState::Completed
    } else {
        RunState::Running(0)
    };

    let mut outcomes = Vec::with_capacity(scenario.steps.len());
    let mut artifacts = Vec::new();

    while let RunState::Running(i) = state {
        let step = &scenario.steps[i];
        debug!("step {}/{}: {}", i + 1, scenario.steps.len(), step.label);
        let path = capture::artifact_path(artifact_root, &scenario.name, i, &step.label);

        match executor::execute_step(engine, step, &scenario.target.url, &path).await {
            Ok(artifact) => {
                if let Some(ref produced) = artifact {
                    artifacts.push(produced.clone());
                }
                outcomes.push(StepOutcome {
                    index: i,
                    label: step.label.clone(),
                    status: StepStatus::Success,
                    artifact,
                    error: None,
                });
                state = if i + 1 < scenario.steps.len() {
                    RunState::Running(i + 1)
                } else {
                    RunState::Completed
                };
            }
            Err(err) => {
                let reason = FailureKind::classify(&err);
                warn!("step '{}' failed: {}", step.label, err);
                if let Ok(url) = engine.current_url().await {
                    warn!("page was at {} when the step failed", url);
                }
                if let Some(diagnostic) = diagnostic_capture(engine, scenario, artifact_root).await
                {
                    artifacts.push(diagnostic);
                }
                outcomes.push(StepOutcome {
                    index: i,
                    label: step.label.clone(),
                    status: StepStatus::Failed(reason),
                    artifact: None,
                    error: Some(err.to_string()),
                });
                state = RunState::Failed { step: i, reason };
            }
        }
    }

    let status = match state {
        RunState::Completed => RunStatus::Completed,
        RunState::Failed { step, reason } => RunStatus::Failed { step, reason },
        RunState::Running(_) => unreachable!("loop exits in a terminal state"),
    };
    info!("scenario '{}' finished: {:?}", scenario.name, status);

    Ok(RunResult {
        scenario: scenario.name.clone(),
        status,
        outcomes,
        artifacts,
        duration_ms: started.elapsed().as_millis() as u64,
    })
}

/// Best-effort screenshot of whatever the page looked like when a step
/// failed. Its own errors are logged and swallowed so they never mask the
/// step's failure reason.
async fn diagnostic_capture<E: Engine>(
    engine: &E,
    scenario: &Scenario,
    artifact_root: &Path,
) -> Option<PathBuf> {
    let path = capture::failure_path(artifact_root, &scenario.name, &scenario.artifacts.on_failure);
    match capture::capture(engine, false, &path).await {
        Ok(written) => {
            info!("diagnostic screenshot: {}", written.display());
            Some(written)
        }
        Err(err) => {
            warn!("failed to save diagnostic screenshot: {}", err);
            None
        }
    }
}
