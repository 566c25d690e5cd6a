//! Screenshot persistence. The only component with durable side effects.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::engine::Engine;
use crate::{Error, Result};

/// Artifact location for one step: `<root>/<scenario>/<NN>-<label>.png`.
/// Step numbers are 1-based so filenames sort in execution order, and the
/// index prefix keeps paths unique across steps of one run.
pub fn artifact_path(root: &Path, scenario: &str, step_index: usize, label: &str) -> PathBuf {
    root.join(scenario)
        .join(format!("{:02}-{}.png", step_index + 1, label))
}

/// Location of the diagnostic screenshot taken when a step fails.
pub fn failure_path(root: &Path, scenario: &str, file_name: &str) -> PathBuf {
    root.join(scenario).join(file_name)
}

/// Capture the current page state to `path`, overwriting any previous run's
/// artifact at the same location. No settling happens here — callers insert
/// a settle delay in the step when animations are in flight.
pub async fn capture<E: Engine>(engine: &E, full_page: bool, path: &Path) -> Result<PathBuf> {
    let data = engine.screenshot(full_page).await?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::CaptureIo {
            path: path.display().to_string(),
            source: e,
        })?;
    }
    fs::write(path, data).map_err(|e| Error::CaptureIo {
        path: path.display().to_string(),
        source: e,
    })?;
    debug!("wrote artifact: {}", path.display());
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::mock::MockEngine;

    #[test]
    fn test_artifact_path_scheme() {
        let path = artifact_path(Path::new("shots"), "login-flow", 0, "landing");
        assert_eq!(path, Path::new("shots/login-flow/01-landing.png"));

        let path = artifact_path(Path::new("shots"), "login-flow", 11, "done");
        assert_eq!(path, Path::new("shots/login-flow/12-done.png"));
    }

    #[test]
    fn test_failure_path_is_scenario_namespaced() {
        let path = failure_path(Path::new("shots"), "login-flow", "error.png");
        assert_eq!(path, Path::new("shots/login-flow/error.png"));
    }

    #[tokio::test]
    async fn test_capture_creates_directories_and_writes() {
        let dir = tempfile::tempdir().unwrap();
        let (engine, state) = MockEngine::new();
        let path = artifact_path(dir.path(), "smoke", 0, "landing");

        let written = capture(&engine, false, &path).await.unwrap();
        assert_eq!(written, path);
        assert!(path.is_file());
        assert_eq!(state.lock().unwrap().screenshots, 1);
    }

    #[tokio::test]
    async fn test_capture_overwrites_existing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let (engine, _state) = MockEngine::new();
        let path = artifact_path(dir.path(), "smoke", 0, "landing");

        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"stale").unwrap();

        capture(&engine, false, &path).await.unwrap();
        let contents = fs::read(&path).unwrap();
        assert_ne!(contents, b"stale");
    }

    #[tokio::test]
    async fn test_capture_failure_is_capture_io() {
        let dir = tempfile::tempdir().unwrap();
        let (engine, _state) = MockEngine::new();
        let engine = engine.failing_screenshots();
        let path = artifact_path(dir.path(), "smoke", 0, "landing");

        let err = capture(&engine, false, &path).await.unwrap_err();
        assert!(matches!(err, Error::CaptureIo { .. }));
        assert!(!path.exists());
    }
}
