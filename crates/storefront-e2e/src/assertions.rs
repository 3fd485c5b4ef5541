// Assertions - Auto-retrying UI expectations and JSON property checks
//
// UI expectations poll the page until the condition holds or the timeout
// passes; a condition that never holds is an assertion failure, not a
// timeout. Each driver call is cut off at the assertion deadline. A driver
// call that fails with its own deadline first still surfaces as
// `Error::Timeout`.
//
// JSON expectations check a response body once.

use crate::driver::{PageDriver, Selector};
use crate::error::{Error, Result};
use serde_json::Value;
use std::future::Future;
use std::time::{Duration, Instant};

/// Default timeout for assertions (5 seconds, matching Playwright)
pub const DEFAULT_ASSERTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Default polling interval for assertions (100ms)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Creates an expectation on the element(s) matched by `selector`.
///
/// # Example
///
/// ```ignore
/// let login = LoginPage::new(&driver, &config.web);
/// expect(&driver, login.error_message_selector())
///     .to_have_text("No active account found with the given credentials")
///     .await?;
/// ```
pub fn expect<'a, D: PageDriver + ?Sized>(driver: &'a D, selector: &'a Selector) -> Expectation<'a, D> {
    Expectation {
        driver,
        selector,
        timeout: DEFAULT_ASSERTION_TIMEOUT,
        poll_interval: DEFAULT_POLL_INTERVAL,
        negate: false,
    }
}

/// Creates an expectation on the page as a whole (title).
pub fn expect_page<D: PageDriver + ?Sized>(driver: &D) -> PageExpectation<'_, D> {
    PageExpectation {
        driver,
        timeout: DEFAULT_ASSERTION_TIMEOUT,
        poll_interval: DEFAULT_POLL_INTERVAL,
    }
}

/// Creates an expectation on a JSON response body.
pub fn expect_json(value: &Value) -> JsonExpectation<'_> {
    JsonExpectation { value }
}

/// Polls `check` until it reports a match or `timeout` passes.
///
/// `check` yields `(matches, actual)`; the last `actual` goes into the
/// failure message built by `describe`. A call still pending at the
/// deadline counts as a miss.
async fn poll_until<F, Fut, M>(
    timeout: Duration,
    poll_interval: Duration,
    mut check: F,
    describe: M,
) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(bool, String)>>,
    M: FnOnce(&str) -> String,
{
    let start = Instant::now();
    loop {
        let remaining = timeout.saturating_sub(start.elapsed());
        let (matches, actual) = match tokio::time::timeout(remaining, check()).await {
            Ok(result) => result?,
            Err(_) => (false, "no answer from the page".to_string()),
        };
        if matches {
            return Ok(());
        }

        if start.elapsed() >= timeout {
            return Err(Error::Assertion(format!(
                "{} after {:?}",
                describe(&actual),
                timeout
            )));
        }

        tokio::time::sleep(poll_interval).await;
    }
}

/// Expectation on a selector, retried until it holds or times out.
#[derive(Debug)]
pub struct Expectation<'a, D: PageDriver + ?Sized> {
    driver: &'a D,
    selector: &'a Selector,
    timeout: Duration,
    poll_interval: Duration,
    negate: bool,
}

// to_* methods consume self, matching the chained expect() style
#[allow(clippy::wrong_self_convention)]
impl<'a, D: PageDriver + ?Sized> Expectation<'a, D> {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Default is 100ms.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Negates the assertion.
    #[allow(clippy::should_implement_trait)]
    pub fn not(mut self) -> Self {
        self.negate = !self.negate;
        self
    }

    pub async fn to_be_visible(self) -> Result<()> {
        let (driver, selector, negate) = (self.driver, self.selector, self.negate);
        poll_until(
            self.timeout,
            self.poll_interval,
            move || async move {
                let visible = driver.is_visible(selector).await?;
                Ok((visible != negate, visible.to_string()))
            },
            |_| {
                if negate {
                    format!("Expected element '{}' NOT to be visible, but it was visible", selector)
                } else {
                    format!("Expected element '{}' to be visible, but it was not visible", selector)
                }
            },
        )
        .await
    }

    pub async fn to_be_hidden(self) -> Result<()> {
        self.not().to_be_visible().await
    }

    pub async fn to_be_enabled(self) -> Result<()> {
        let (driver, selector, negate) = (self.driver, self.selector, self.negate);
        poll_until(
            self.timeout,
            self.poll_interval,
            move || async move {
                let enabled = driver.is_enabled(selector).await?;
                Ok((enabled != negate, enabled.to_string()))
            },
            |_| {
                if negate {
                    format!("Expected element '{}' NOT to be enabled, but it was enabled", selector)
                } else {
                    format!("Expected element '{}' to be enabled, but it was disabled", selector)
                }
            },
        )
        .await
    }

    /// Exact match on the trimmed text content.
    pub async fn to_have_text(self, expected: &str) -> Result<()> {
        let (driver, selector, negate) = (self.driver, self.selector, self.negate);
        poll_until(
            self.timeout,
            self.poll_interval,
            move || async move {
                let text = driver.text_content(selector).await?.unwrap_or_default();
                let actual = text.trim().to_string();
                Ok(((actual == expected) != negate, actual))
            },
            |actual| {
                if negate {
                    format!("Expected element '{}' NOT to have text '{}', but it did", selector, expected)
                } else {
                    format!(
                        "Expected element '{}' to have text '{}', but had '{}'",
                        selector, expected, actual
                    )
                }
            },
        )
        .await
    }

    /// Substring match on the text content.
    pub async fn to_contain_text(self, expected: &str) -> Result<()> {
        let (driver, selector, negate) = (self.driver, self.selector, self.negate);
        poll_until(
            self.timeout,
            self.poll_interval,
            move || async move {
                let actual = driver.text_content(selector).await?.unwrap_or_default();
                Ok((actual.contains(expected) != negate, actual))
            },
            |actual| {
                if negate {
                    format!(
                        "Expected element '{}' NOT to contain text '{}', but it did",
                        selector, expected
                    )
                } else {
                    format!(
                        "Expected element '{}' to contain text '{}', but had '{}'",
                        selector, expected, actual
                    )
                }
            },
        )
        .await
    }
}

/// Page-level expectation, retried until it holds or times out.
#[derive(Debug)]
pub struct PageExpectation<'a, D: PageDriver + ?Sized> {
    driver: &'a D,
    timeout: Duration,
    poll_interval: Duration,
}

#[allow(clippy::wrong_self_convention)]
impl<'a, D: PageDriver + ?Sized> PageExpectation<'a, D> {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub async fn to_have_title(self, expected: &str) -> Result<()> {
        let driver = self.driver;
        poll_until(
            self.timeout,
            self.poll_interval,
            move || async move {
                let title = driver.title().await?;
                Ok((title == expected, title))
            },
            |actual| format!("Expected page title '{}', but was '{}'", expected, actual),
        )
        .await
    }
}

/// One-shot checks on a JSON object.
#[derive(Debug)]
pub struct JsonExpectation<'a> {
    value: &'a Value,
}

#[allow(clippy::wrong_self_convention)]
impl<'a> JsonExpectation<'a> {
    /// The property exists (any value, including null).
    pub fn to_have_property(&self, key: &str) -> Result<&Self> {
        if self.value.get(key).is_none() {
            return Err(Error::Assertion(format!(
                "Expected property '{}' in {}",
                key, self.value
            )));
        }
        Ok(self)
    }

    /// The property exists and equals `expected`.
    pub fn to_have_property_value(&self, key: &str, expected: impl Into<Value>) -> Result<&Self> {
        let expected = expected.into();
        match self.value.get(key) {
            Some(actual) if *actual == expected => Ok(self),
            Some(actual) => Err(Error::Assertion(format!(
                "Expected property '{}' to be {}, but was {}",
                key, expected, actual
            ))),
            None => Err(Error::Assertion(format!(
                "Expected property '{}' to be {}, but it is missing from {}",
                key, expected, self.value
            ))),
        }
    }

    /// The property is a string equal to `expected`, ignoring ASCII case.
    pub fn to_have_property_ignore_case(&self, key: &str, expected: &str) -> Result<&Self> {
        match self.value.get(key).and_then(Value::as_str) {
            Some(actual) if actual.eq_ignore_ascii_case(expected) => Ok(self),
            other => Err(Error::Assertion(format!(
                "Expected property '{}' to equal '{}' ignoring case, but was {:?}",
                key, expected, other
            ))),
        }
    }
}
