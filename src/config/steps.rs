use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;

use crate::locator::Locator;
use crate::wait::WaitCondition;

fn default_timeout_ms() -> u64 {
    10_000
}

/// One interaction state: wait for an element, optionally act on it,
/// optionally let the UI settle, then capture.
#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    /// Short name; appears in the artifact filename.
    pub label: String,

    /// Element this step is about.
    pub locate: Locator,

    /// Condition and timeout for the wait phase.
    #[serde(default)]
    pub wait: WaitSpec,

    /// Action to perform once the element resolved.
    #[serde(default)]
    pub action: Option<StepAction>,

    /// Pause after the action, before capture, while animations or async
    /// rendering finish.
    #[serde(default)]
    pub settle_ms: u64,

    /// Screenshot to persist at the end of the step; omit for no artifact.
    #[serde(default)]
    pub capture: Option<CaptureSpec>,
}

/// Wait phase of a step. Different UI transitions warrant different bounds:
/// a full navigation gets a generous timeout, an animated modal a short one.
#[derive(Debug, Clone, Deserialize)]
pub struct WaitSpec {
    #[serde(default)]
    pub until: WaitCondition,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for WaitSpec {
    fn default() -> Self {
        Self {
            until: WaitCondition::default(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// User action a step performs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAction {
    /// Click the resolved element.
    Click,
    /// Navigate to a URL, absolute or relative to the scenario base URL.
    /// Runs before the step's wait, since it establishes the page the wait
    /// inspects.
    Navigate(String),
    /// Type text into the resolved element.
    Fill(String),
}

impl<'de> Deserialize<'de> for StepAction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(StepActionVisitor)
    }
}

struct StepActionVisitor;

impl<'de> Visitor<'de> for StepActionVisitor {
    type Value = StepAction;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("'click', or a map with navigate or fill")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        match value {
            "click" => Ok(StepAction::Click),
            other => Err(de::Error::unknown_variant(other, &["click"])),
        }
    }

    fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        let key: String = map
            .next_key()?
            .ok_or_else(|| de::Error::custom("expected action type key"))?;

        match key.as_str() {
            "click" => {
                let _: serde_yaml::Value = map.next_value()?;
                Ok(StepAction::Click)
            }
            "navigate" => Ok(StepAction::Navigate(map.next_value()?)),
            "fill" => Ok(StepAction::Fill(map.next_value()?)),
            other => Err(de::Error::unknown_variant(
                other,
                &["click", "navigate", "fill"],
            )),
        }
    }
}

/// Screenshot spec for a step.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaptureSpec {
    /// Capture the full scrollable page instead of the viewport, on engines
    /// that support it.
    #[serde(default)]
    pub full_page: bool,
}
