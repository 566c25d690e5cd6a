//! Element wait predicate: poll the engine until a locator satisfies its
//! condition or the per-call deadline passes.

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::time::{Duration, Instant};

use crate::engine::{Engine, ResolvedElement};
use crate::locator::Locator;
use crate::{Error, Result};

/// Cadence at which the predicate re-queries the engine.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Condition a locator must satisfy before a step proceeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitCondition {
    /// The first matching element reports a nonzero, unhidden box.
    #[default]
    Visible,
    /// At least one matching element exists in the document.
    Attached,
    /// Exactly this many elements match the locator.
    CountEquals(u32),
}

impl fmt::Display for WaitCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Visible => write!(f, "visible"),
            Self::Attached => write!(f, "attached"),
            Self::CountEquals(n) => write!(f, "count == {}", n),
        }
    }
}

impl<'de> Deserialize<'de> for WaitCondition {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(WaitConditionVisitor)
    }
}

struct WaitConditionVisitor;

impl<'de> Visitor<'de> for WaitConditionVisitor {
    type Value = WaitCondition;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("'visible', 'attached', or a map with count_equals")
    }

    fn visit_str<E>(self, value: &str) -> std::result::Result<Self::Value, E>
    where
        E: de::Error,
    {
        match value {
            "visible" => Ok(WaitCondition::Visible),
            "attached" => Ok(WaitCondition::Attached),
            other => Err(de::Error::unknown_variant(other, &["visible", "attached"])),
        }
    }

    fn visit_map<M>(self, mut map: M) -> std::result::Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        let key: String = map
            .next_key()?
            .ok_or_else(|| de::Error::custom("expected condition type key"))?;

        match key.as_str() {
            "count_equals" => Ok(WaitCondition::CountEquals(map.next_value()?)),
            other => Err(de::Error::unknown_variant(other, &["count_equals"])),
        }
    }
}

/// Block until `locator` satisfies `condition`, returning a handle to the
/// resolved element, or fail with [`Error::ElementTimeout`] once `timeout`
/// elapses. Read-only: nothing on the page is touched beyond the polling.
pub async fn wait_for<E: Engine>(
    engine: &E,
    locator: &Locator,
    condition: WaitCondition,
    timeout: Duration,
) -> Result<ResolvedElement> {
    let started = Instant::now();
    let deadline = started + timeout;

    loop {
        if let Some(element) = check(engine, locator, condition).await? {
            return Ok(element);
        }
        if Instant::now() >= deadline {
            return Err(Error::ElementTimeout {
                locator: locator.to_string(),
                condition: condition.to_string(),
                elapsed_ms: started.elapsed().as_millis() as u64,
            });
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

async fn check<E: Engine>(
    engine: &E,
    locator: &Locator,
    condition: WaitCondition,
) -> Result<Option<ResolvedElement>> {
    let matches = engine.query(locator).await?;
    match condition {
        WaitCondition::Attached => Ok(matches.into_iter().next()),
        WaitCondition::Visible => {
            // Ambiguous locators resolve to the first match in document
            // order; visibility is judged on that element only.
            let Some(element) = matches.into_iter().next() else {
                return Ok(None);
            };
            if engine.is_visible(&element).await? {
                Ok(Some(element))
            } else {
                Ok(None)
            }
        }
        WaitCondition::CountEquals(n) => {
            if matches.len() as u32 == n {
                Ok(matches.into_iter().next())
            } else {
                Ok(None)
            }
        }
    }
}
