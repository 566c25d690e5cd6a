//! Capability set the harness needs from a browser engine. The runner, wait
//! predicate, and capturer depend only on this trait, never on a concrete
//! engine API.

mod eoka;
#[cfg(test)]
pub(crate) mod mock;

pub use self::eoka::EokaEngine;

use async_trait::async_trait;

use crate::locator::Locator;
use crate::Result;

/// Engine-resolved handle to a single element, valid for follow-up actions
/// within the same step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedElement {
    /// Unique CSS path the engine resolved the locator to.
    pub selector: String,
}

/// One live browser page, owned exclusively by a single scenario run.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Navigate the page to `url`.
    async fn goto(&self, url: &str) -> Result<()>;

    /// URL the page is currently at.
    async fn current_url(&self) -> Result<String>;

    /// All elements matching the locator, in document order.
    async fn query(&self, locator: &Locator) -> Result<Vec<ResolvedElement>>;

    /// Whether the element renders a nonzero, unhidden box.
    async fn is_visible(&self, element: &ResolvedElement) -> Result<bool>;

    /// Click the element. Fails with `ActionRejected` if the engine reports
    /// it not actionable; never retried here.
    async fn click(&self, element: &ResolvedElement) -> Result<()>;

    /// Type `text` into the element.
    async fn fill(&self, element: &ResolvedElement, text: &str) -> Result<()>;

    /// PNG bytes of the current rendering. `full_page` is honored by
    /// engines that can capture beyond the viewport.
    async fn screenshot(&self, full_page: bool) -> Result<Vec<u8>>;

    /// Release the session. Consumes the engine: there is no page to talk
    /// to afterwards.
    async fn close(self) -> Result<()>;
}
