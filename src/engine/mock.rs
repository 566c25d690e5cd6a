//! Scripted engine for runner and wait tests. Elements appear after a
//! configurable number of polls, and every call is counted so tests can
//! assert what the runner did — and did not — invoke.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::{Engine, ResolvedElement};
use crate::locator::Locator;
use crate::{Error, Result};

#[derive(Default)]
pub struct MockState {
    elements: HashMap<String, MockElement>,
    pub goto_urls: Vec<String>,
    pub clicked: Vec<String>,
    pub filled: Vec<(String, String)>,
    pub screenshots: usize,
    pub closes: usize,
    fail_screenshots: bool,
    url: String,
}

#[derive(Default)]
struct MockElement {
    selectors: Vec<String>,
    appears_after: u32,
    polls: u32,
    hidden: bool,
    reject_click: bool,
}

pub struct MockEngine {
    state: Arc<Mutex<MockState>>,
}

impl MockEngine {
    pub fn new() -> (Self, Arc<Mutex<MockState>>) {
        let state = Arc::new(Mutex::new(MockState::default()));
        (
            Self {
                state: Arc::clone(&state),
            },
            state,
        )
    }

    fn insert(self, locator: &Locator, selectors: &[&str], element: MockElement) -> Self {
        let element = MockElement {
            selectors: selectors.iter().map(|s| s.to_string()).collect(),
            ..element
        };
        self.state
            .lock()
            .unwrap()
            .elements
            .insert(locator.to_string(), element);
        self
    }

    /// Element present and visible from the first poll.
    pub fn with_element(self, locator: &Locator, selectors: &[&str]) -> Self {
        self.insert(locator, selectors, MockElement::default())
    }

    /// Element that only starts matching after `appears_after` polls.
    pub fn with_element_after(
        self,
        locator: &Locator,
        selectors: &[&str],
        appears_after: u32,
    ) -> Self {
        self.insert(
            locator,
            selectors,
            MockElement {
                appears_after,
                ..Default::default()
            },
        )
    }

    /// Element attached to the document but never visible.
    pub fn with_hidden_element(self, locator: &Locator, selectors: &[&str]) -> Self {
        self.insert(
            locator,
            selectors,
            MockElement {
                hidden: true,
                ..Default::default()
            },
        )
    }

    /// Element that refuses clicks, as if covered by another element.
    pub fn with_rejecting_element(self, locator: &Locator, selectors: &[&str]) -> Self {
        self.insert(
            locator,
            selectors,
            MockElement {
                reject_click: true,
                ..Default::default()
            },
        )
    }

    /// All screenshot calls fail.
    pub fn failing_screenshots(self) -> Self {
        self.state.lock().unwrap().fail_screenshots = true;
        self
    }
}

#[async_trait]
impl Engine for MockEngine {
    async fn goto(&self, url: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.goto_urls.push(url.to_string());
        state.url = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.state.lock().unwrap().url.clone())
    }

    async fn query(&self, locator: &Locator) -> Result<Vec<ResolvedElement>> {
        let mut state = self.state.lock().unwrap();
        let Some(element) = state.elements.get_mut(&locator.to_string()) else {
            return Ok(Vec::new());
        };
        element.polls += 1;
        if element.polls <= element.appears_after {
            return Ok(Vec::new());
        }
        Ok(element
            .selectors
            .iter()
            .map(|selector| ResolvedElement {
                selector: selector.clone(),
            })
            .collect())
    }

    async fn is_visible(&self, element: &ResolvedElement) -> Result<bool> {
        let state = self.state.lock().unwrap();
        Ok(state.elements.values().any(|e| {
            e.polls > e.appears_after && !e.hidden && e.selectors.contains(&element.selector)
        }))
    }

    async fn click(&self, element: &ResolvedElement) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let rejected = state
            .elements
            .values()
            .any(|e| e.reject_click && e.selectors.contains(&element.selector));
        if rejected {
            return Err(Error::ActionRejected {
                locator: element.selector.clone(),
                reason: "covered by another element".into(),
            });
        }
        state.clicked.push(element.selector.clone());
        Ok(())
    }

    async fn fill(&self, element: &ResolvedElement, text: &str) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .filled
            .push((element.selector.clone(), text.to_string()));
        Ok(())
    }

    async fn screenshot(&self, _full_page: bool) -> Result<Vec<u8>> {
        let mut state = self.state.lock().unwrap();
        state.screenshots += 1;
        if state.fail_screenshots {
            return Err(Error::CaptureIo {
                path: "<mock>".into(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "screenshot refused"),
            });
        }
        Ok(b"mock-png".to_vec())
    }

    async fn close(self) -> Result<()> {
        self.state.lock().unwrap().closes += 1;
        Ok(())
    }
}
