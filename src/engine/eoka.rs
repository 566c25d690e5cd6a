//! Engine adapter backed by the `eoka` browser.

use async_trait::async_trait;
use tracing::debug;

use ::eoka::{Browser, Page, StealthConfig};

use super::{Engine, ResolvedElement};
use crate::config::BrowserConfig;
use crate::locator::Locator;
use crate::{Error, Result};

/// Resolve a locator to the unique CSS paths of every match, in document
/// order. Role locators understand the explicit `role` attribute plus the
/// common implicit roles; text locators keep only the deepest matching
/// elements so a page-wide container never shadows the actual target.
const QUERY_JS: &str = r#"(() => {
    const locator = __LOCATOR__;
    const cssPath = (el) => {
        const path = [];
        let node = el;
        while (node && node !== document.documentElement) {
            if (node.id) {
                path.unshift('#' + CSS.escape(node.id));
                break;
            }
            let selector = node.tagName.toLowerCase();
            const siblings = Array.from(node.parentNode ? node.parentNode.children : []);
            if (siblings.length > 1) selector += ':nth-child(' + (siblings.indexOf(node) + 1) + ')';
            path.unshift(selector);
            node = node.parentNode;
        }
        return path.join(' > ');
    };
    const normalize = (s) => (s || '').trim().replace(/\s+/g, ' ');
    const accessibleName = (el) => {
        const aria = el.getAttribute('aria-label');
        if (aria) return normalize(aria);
        const labelledBy = el.getAttribute('aria-labelledby');
        if (labelledBy) {
            const lbl = document.getElementById(labelledBy);
            if (lbl) return normalize(lbl.textContent);
        }
        return normalize(el.textContent);
    };
    const implicitRole = (el) => {
        const tag = el.tagName.toLowerCase();
        if (tag === 'button') return 'button';
        if (tag === 'a' && el.hasAttribute('href')) return 'link';
        if (/^h[1-6]$/.test(tag)) return 'heading';
        if (tag === 'textarea') return 'textbox';
        if (tag === 'select') return 'combobox';
        if (tag === 'img') return 'img';
        if (tag === 'input') {
            const type = el.getAttribute('type') || 'text';
            if (type === 'button' || type === 'submit' || type === 'reset') return 'button';
            if (type === 'checkbox' || type === 'radio') return type;
            return 'textbox';
        }
        return null;
    };
    let matches = [];
    if (locator.css) {
        matches = Array.from(document.querySelectorAll(locator.css));
    } else if (locator.text) {
        const holds = Array.from(document.querySelectorAll('*'))
            .filter(el => (el.textContent || '').includes(locator.text));
        matches = holds.filter(el =>
            !Array.from(el.children).some(c => (c.textContent || '').includes(locator.text)));
    } else if (locator.role) {
        matches = Array.from(document.querySelectorAll('*'))
            .filter(el => (el.getAttribute('role') || implicitRole(el)) === locator.role);
        if (locator.name) {
            matches = matches.filter(el => accessibleName(el) === normalize(locator.name));
        }
    }
    return matches.map(cssPath);
})()"#;

/// Visibility check for a resolved selector: present, nonzero box, not
/// hidden by style.
const VISIBLE_JS: &str = r#"(() => {
    const el = document.querySelector(__SELECTOR__);
    if (!el) return false;
    const rect = el.getBoundingClientRect();
    if (rect.width < 1 || rect.height < 1) return false;
    const style = getComputedStyle(el);
    return style.display !== 'none'
        && style.visibility !== 'hidden'
        && parseFloat(style.opacity) >= 0.1;
})()"#;

fn locator_json(locator: &Locator) -> String {
    let value = match locator {
        Locator::Css(selector) => serde_json::json!({ "css": selector }),
        Locator::Text(text) => serde_json::json!({ "text": text }),
        Locator::Role { role, name } => serde_json::json!({ "role": role, "name": name }),
    };
    value.to_string()
}

/// A launched browser plus its single page.
pub struct EokaEngine {
    browser: Browser,
    page: Page,
}

impl EokaEngine {
    /// Launch a browser session. Fails with [`Error::SessionLaunch`] if the
    /// browser or its page cannot be brought up; nothing is left running in
    /// that case.
    pub async fn launch(config: &BrowserConfig) -> Result<Self> {
        let stealth = StealthConfig {
            headless: config.headless,
            proxy: config.proxy.clone(),
            user_agent: config.user_agent.clone(),
            viewport_width: config.viewport.as_ref().map(|v| v.width).unwrap_or(1280),
            viewport_height: config.viewport.as_ref().map(|v| v.height).unwrap_or(720),
            ..Default::default()
        };

        debug!(
            "launching browser (headless: {}, proxy: {:?})",
            config.headless, config.proxy
        );
        let browser = Browser::launch_with_config(stealth)
            .await
            .map_err(|e| Error::SessionLaunch(e.to_string()))?;
        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.close().await;
                return Err(Error::SessionLaunch(e.to_string()));
            }
        };

        Ok(Self { browser, page })
    }
}

#[async_trait]
impl Engine for EokaEngine {
    async fn goto(&self, url: &str) -> Result<()> {
        self.page.goto(url).await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.page.url().await?)
    }

    async fn query(&self, locator: &Locator) -> Result<Vec<ResolvedElement>> {
        let js = QUERY_JS.replace("__LOCATOR__", &locator_json(locator));
        let selectors: Vec<String> = self.page.evaluate(&js).await?;
        Ok(selectors
            .into_iter()
            .map(|selector| ResolvedElement { selector })
            .collect())
    }

    async fn is_visible(&self, element: &ResolvedElement) -> Result<bool> {
        let js = VISIBLE_JS.replace(
            "__SELECTOR__",
            &serde_json::to_string(&element.selector).unwrap(),
        );
        Ok(self.page.evaluate(&js).await?)
    }

    async fn click(&self, element: &ResolvedElement) -> Result<()> {
        self.page
            .click(&element.selector)
            .await
            .map_err(|e| Error::ActionRejected {
                locator: element.selector.clone(),
                reason: e.to_string(),
            })
    }

    async fn fill(&self, element: &ResolvedElement, text: &str) -> Result<()> {
        self.page
            .fill(&element.selector, text)
            .await
            .map_err(|e| Error::ActionRejected {
                locator: element.selector.clone(),
                reason: e.to_string(),
            })
    }

    async fn screenshot(&self, full_page: bool) -> Result<Vec<u8>> {
        if full_page {
            // The page API captures the viewport; the flag stays advisory.
            debug!("full-page capture not supported by this engine, capturing viewport");
        }
        Ok(self.page.screenshot().await?)
    }

    async fn close(self) -> Result<()> {
        self.browser.close().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_json_shapes() {
        let css = Locator::Css("p.question".into());
        assert_eq!(locator_json(&css), r#"{"css":"p.question"}"#);

        let text = Locator::Text("Sign in".into());
        assert_eq!(locator_json(&text), r#"{"text":"Sign in"}"#);

        let role = Locator::Role {
            role: "button".into(),
            name: None,
        };
        assert_eq!(locator_json(&role), r#"{"name":null,"role":"button"}"#);
    }

    #[test]
    fn test_locator_json_escapes_quotes() {
        let text = Locator::Text(r#"say "hi""#.into());
        let json = locator_json(&text);
        assert!(json.contains(r#"\"hi\""#));
    }
}
