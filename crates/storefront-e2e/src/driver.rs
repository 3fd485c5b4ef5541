// Browser capability
//
// Page objects talk to the browser only through `PageDriver`. The
// Playwright-backed implementation bounds every call by the configured
// deadline and converts a missed deadline into `Error::Timeout`.
//
// Architecture:
// - `Selector` is an inert description; nothing is queried until an action runs
// - `BrowserSession` owns one Playwright server and browser
// - Each scenario gets its own context + page via `BrowserSession::new_driver`

use crate::config::{BrowserConfig, BrowserKind, Timeouts};
use crate::error::{Error, Result};
use async_trait::async_trait;
use playwright_rs::{
    Browser, BrowserContext, CheckOptions, ClickOptions, FillOptions, GotoOptions, LaunchOptions,
    Locator, Page, Playwright,
};
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Identifies zero or more elements on a page.
///
/// Rendered to a Playwright selector for actions and to a DOM lookup for
/// in-page evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Element id, without the leading `#`
    Id(String),
    /// CSS selector
    Css(String),
    /// XPath expression
    XPath(String),
    /// CSS selector narrowed to elements whose text contains `text`
    CssWithText { css: String, text: String },
    /// The `index`-th match of another selector (zero based)
    Nth { inner: Box<Selector>, index: usize },
}

impl Selector {
    pub fn id(id: impl Into<String>) -> Self {
        Selector::Id(id.into())
    }

    pub fn css(css: impl Into<String>) -> Self {
        Selector::Css(css.into())
    }

    pub fn xpath(xpath: impl Into<String>) -> Self {
        Selector::XPath(xpath.into())
    }

    pub fn css_with_text(css: impl Into<String>, text: impl Into<String>) -> Self {
        Selector::CssWithText {
            css: css.into(),
            text: text.into(),
        }
    }

    pub fn nth(self, index: usize) -> Self {
        Selector::Nth {
            inner: Box::new(self),
            index,
        }
    }

    pub fn first(self) -> Self {
        self.nth(0)
    }

    /// Selector string understood by Playwright locators.
    pub fn to_playwright(&self) -> String {
        match self {
            Selector::Id(id) => format!("#{}", id),
            Selector::Css(css) => css.clone(),
            Selector::XPath(xpath) => format!("xpath={}", xpath),
            Selector::CssWithText { css, text } => {
                format!("{}:has-text({})", css, js_string(text))
            }
            Selector::Nth { inner, index } => format!("{} >> nth={}", inner.to_playwright(), index),
        }
    }

    /// JavaScript expression evaluating to an array of the matched elements.
    pub fn js_lookup_all(&self) -> String {
        match self {
            Selector::Id(id) => format!("[document.getElementById({})].filter(Boolean)", js_string(id)),
            Selector::Css(css) => format!("Array.from(document.querySelectorAll({}))", js_string(css)),
            Selector::XPath(xpath) => format!(
                "(() => {{ const r = document.evaluate({}, document, null, \
                 XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null); \
                 return Array.from({{ length: r.snapshotLength }}, (_, i) => r.snapshotItem(i)); }})()",
                js_string(xpath)
            ),
            Selector::CssWithText { css, text } => format!(
                "Array.from(document.querySelectorAll({})).filter(el => (el.textContent || '').includes({}))",
                js_string(css),
                js_string(text)
            ),
            Selector::Nth { inner, index } => {
                format!("[({})[{}]].filter(Boolean)", inner.js_lookup_all(), index)
            }
        }
    }

    /// JavaScript expression reading `property` of the first match as a string.
    ///
    /// Evaluates to `null` when nothing matches.
    pub fn js_property(&self, property: &str) -> String {
        format!(
            "(() => {{ const el = ({})[0]; if (!el) return null; \
             const v = el[{}]; return v == null ? '' : String(v); }})()",
            self.js_lookup_all(),
            js_string(property)
        )
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_playwright())
    }
}

fn js_string(s: &str) -> String {
    // A JSON string literal is a valid JS string literal
    serde_json::Value::String(s.to_string()).to_string()
}

/// Browser operations a page object needs.
///
/// Implementations decide how long each call may take; a missed deadline
/// must surface as [`Error::Timeout`], an unresolvable selector as
/// [`Error::ElementNotFound`] or [`Error::Timeout`].
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigates to `url`.
    async fn goto(&self, url: &str) -> Result<()>;

    /// Current document title.
    async fn title(&self) -> Result<String>;

    /// Current page URL.
    async fn url(&self) -> Result<String>;

    async fn fill(&self, selector: &Selector, value: &str) -> Result<()>;

    async fn click(&self, selector: &Selector) -> Result<()>;

    /// Ensures a checkbox or radio is checked.
    async fn check(&self, selector: &Selector) -> Result<()>;

    /// Text content of the element, `None` when it has none.
    async fn text_content(&self, selector: &Selector) -> Result<Option<String>>;

    async fn is_visible(&self, selector: &Selector) -> Result<bool>;

    async fn is_enabled(&self, selector: &Selector) -> Result<bool>;

    /// Reads a DOM property of the element, e.g. `validationMessage`.
    async fn element_property(&self, selector: &Selector, property: &str) -> Result<String>;
}

/// [`PageDriver`] backed by a Playwright page.
pub struct PlaywrightDriver {
    context: Option<BrowserContext>,
    page: Page,
    timeouts: Timeouts,
}

impl PlaywrightDriver {
    /// Wraps a page the caller already owns.
    pub fn new(page: Page, timeouts: Timeouts) -> Self {
        Self {
            context: None,
            page,
            timeouts,
        }
    }

    fn with_context(context: BrowserContext, page: Page, timeouts: Timeouts) -> Self {
        Self {
            context: Some(context),
            page,
            timeouts,
        }
    }

    /// The underlying Playwright page, for calls the trait does not cover.
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Closes the page's context when this driver created it.
    pub async fn close(self) -> Result<()> {
        match self.context {
            Some(context) => context.close().await?,
            None => self.page.close().await?,
        }
        Ok(())
    }

    async fn locator(&self, selector: &Selector) -> Locator {
        self.page.locator(&selector.to_playwright()).await
    }

    fn action_timeout_ms(&self) -> f64 {
        self.timeouts.action_ms as f64
    }

    async fn bounded<T, F>(&self, what: String, deadline: Duration, fut: F) -> Result<T>
    where
        F: Future<Output = playwright_rs::Result<T>> + Send,
    {
        match tokio::time::timeout(deadline, fut).await {
            Ok(result) => result.map_err(Error::from),
            Err(_) => Err(Error::Timeout(format!("{} exceeded {:?}", what, deadline))),
        }
    }
}

#[async_trait]
impl PageDriver for PlaywrightDriver {
    async fn goto(&self, url: &str) -> Result<()> {
        tracing::debug!(url, "navigating");
        let deadline = self.timeouts.navigation();
        let options = GotoOptions::new().timeout(deadline);
        self.bounded(
            format!("navigation to '{}'", url),
            deadline,
            self.page.goto(url, Some(options)),
        )
        .await?;
        Ok(())
    }

    async fn title(&self) -> Result<String> {
        self.bounded("reading title".to_string(), self.timeouts.action(), self.page.title())
            .await
    }

    async fn url(&self) -> Result<String> {
        Ok(self.page.url())
    }

    async fn fill(&self, selector: &Selector, value: &str) -> Result<()> {
        let locator = self.locator(selector).await;
        let options = FillOptions::builder().timeout(self.action_timeout_ms()).build();
        self.bounded(
            format!("fill {}", selector),
            self.timeouts.action(),
            locator.fill(value, Some(options)),
        )
        .await
    }

    async fn click(&self, selector: &Selector) -> Result<()> {
        let locator = self.locator(selector).await;
        let options = ClickOptions::builder().timeout(self.action_timeout_ms()).build();
        self.bounded(
            format!("click {}", selector),
            self.timeouts.action(),
            locator.click(Some(options)),
        )
        .await
    }

    async fn check(&self, selector: &Selector) -> Result<()> {
        let locator = self.locator(selector).await;
        let options = CheckOptions::builder().timeout(self.action_timeout_ms()).build();
        self.bounded(
            format!("check {}", selector),
            self.timeouts.action(),
            locator.check(Some(options)),
        )
        .await
    }

    async fn text_content(&self, selector: &Selector) -> Result<Option<String>> {
        let locator = self.locator(selector).await;
        self.bounded(
            format!("text of {}", selector),
            self.timeouts.action(),
            locator.text_content(),
        )
        .await
    }

    async fn is_visible(&self, selector: &Selector) -> Result<bool> {
        let locator = self.locator(selector).await;
        self.bounded(
            format!("visibility of {}", selector),
            self.timeouts.action(),
            locator.is_visible(),
        )
        .await
    }

    async fn is_enabled(&self, selector: &Selector) -> Result<bool> {
        let locator = self.locator(selector).await;
        self.bounded(
            format!("enabled state of {}", selector),
            self.timeouts.action(),
            locator.is_enabled(),
        )
        .await
    }

    async fn element_property(&self, selector: &Selector, property: &str) -> Result<String> {
        let expression = selector.js_property(property);
        let value: Option<String> = self
            .bounded(
                format!("{} of {}", property, selector),
                self.timeouts.action(),
                self.page.evaluate::<(), Option<String>>(&expression, None),
            )
            .await?;
        value.ok_or_else(|| Error::ElementNotFound(selector.to_string()))
    }
}

/// One Playwright server plus one launched browser.
///
/// Scenarios share a session but never a page: call
/// [`BrowserSession::new_driver`] once per scenario.
pub struct BrowserSession {
    playwright: Playwright,
    browser: Browser,
    timeouts: Timeouts,
}

impl BrowserSession {
    /// Starts Playwright and launches the configured browser.
    pub async fn launch(config: &BrowserConfig, timeouts: Timeouts) -> Result<Self> {
        let playwright = Playwright::launch().await?;

        let browser_type = match config.kind {
            BrowserKind::Chromium => playwright.chromium(),
            BrowserKind::Firefox => playwright.firefox(),
            BrowserKind::Webkit => playwright.webkit(),
        };

        let mut options = LaunchOptions::new()
            .headless(config.headless)
            .timeout(timeouts.navigation_ms as f64);
        if let Some(channel) = &config.channel {
            options = options.channel(channel.clone());
        }

        tracing::info!(browser = ?config.kind, headless = config.headless, "launching browser");
        let browser = browser_type.launch_with_options(options).await?;

        Ok(Self {
            playwright,
            browser,
            timeouts,
        })
    }

    /// Opens an isolated context and page for one scenario.
    pub async fn new_driver(&self) -> Result<PlaywrightDriver> {
        let context = self.browser.new_context().await?;
        let page = context.new_page().await?;
        Ok(PlaywrightDriver::with_context(
            context,
            page,
            self.timeouts.clone(),
        ))
    }

    pub async fn close(self) -> Result<()> {
        self.browser.close().await?;
        self.playwright.shutdown().await?;
        Ok(())
    }
}
