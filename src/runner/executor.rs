use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::capture;
use crate::config::{Step, StepAction};
use crate::engine::Engine;
use crate::wait;
use crate::Result;

/// Execute one step against the page: navigate if the step carries a
/// navigation, wait for the locator, act on the resolved element, settle,
/// capture. Returns the artifact path when the step persisted one.
pub async fn execute_step<E: Engine>(
    engine: &E,
    step: &Step,
    base_url: &str,
    artifact_path: &Path,
) -> Result<Option<PathBuf>> {
    // A navigation establishes the page the wait below inspects, so it runs
    // first; element actions run on the resolved element afterwards.
    if let Some(StepAction::Navigate(url)) = &step.action {
        let target = resolve_url(base_url, url);
        info!("navigate: {}", target);
        engine.goto(&target).await?;
    }

    let timeout = Duration::from_millis(step.wait.timeout_ms);
    let element = wait::wait_for(engine, &step.locate, step.wait.until, timeout).await?;
    debug!("resolved {} -> {}", step.locate, element.selector);

    match &step.action {
        Some(StepAction::Click) => {
            info!("click: {}", element.selector);
            engine.click(&element).await?;
        }
        Some(StepAction::Fill(text)) => {
            info!("fill: {} = '{}'", element.selector, text);
            engine.fill(&element, text).await?;
        }
        Some(StepAction::Navigate(_)) | None => {}
    }

    if step.settle_ms > 0 {
        debug!("settle: {}ms", step.settle_ms);
        tokio::time::sleep(Duration::from_millis(step.settle_ms)).await;
    }

    match &step.capture {
        Some(spec) => {
            info!("capture: {}", artifact_path.display());
            let path = capture::capture(engine, spec.full_page, artifact_path).await?;
            Ok(Some(path))
        }
        None => Ok(None),
    }
}

/// Join a possibly relative step URL onto the scenario base URL.
pub fn resolve_url(base: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!(
            "{}/{}",
            base.trim_end_matches('/'),
            url.trim_start_matches('/')
        )
    }
}
