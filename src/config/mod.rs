pub mod schema;
pub mod steps;

pub use schema::{ArtifactsConfig, BrowserConfig, Scenario, TargetUrl, Viewport};
pub use steps::{CaptureSpec, Step, StepAction, WaitSpec};
