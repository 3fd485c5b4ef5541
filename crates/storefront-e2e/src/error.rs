// Error types for storefront-e2e

use thiserror::Error;

/// Result type alias for suite operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can end a scenario.
///
/// Variants fall into four triage buckets: assertion failures (real
/// regressions), missing-element failures, timeouts (usually flaky
/// infrastructure) and plumbing errors from the browser, HTTP or database
/// layers. Use [`Error::is_timeout`] and [`Error::is_assertion`] to sort a
/// failure into its bucket.
#[derive(Debug, Error)]
pub enum Error {
    /// Actual value differs from the expected one
    #[error("Assertion failed: {0}")]
    Assertion(String),

    /// Element was found but carries no text content
    ///
    /// Distinct from [`Error::ElementNotFound`]: the locator resolved, the
    /// element simply had nothing to read.
    #[error("{0} is missing!")]
    MissingElement(String),

    /// Element not found by selector
    #[error("Element not found: selector '{0}'")]
    ElementNotFound(String),

    /// An operation exceeded its deadline
    ///
    /// Raised for navigation, element actions, HTTP calls and retrying
    /// assertions alike, so infrastructure slowness can be triaged apart
    /// from regressions.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// HTTP response status was not the expected one
    #[error("{method} {url} returned {status}: {body}")]
    UnexpectedStatus {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    /// HTTP response body was not valid JSON
    #[error("Response from {url} is not valid JSON: {source}")]
    InvalidJson {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// Browser automation error
    #[error("Browser error: {0}")]
    Browser(#[source] playwright_rs::Error),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument provided to a helper
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Error with additional context
    #[error("{0}: {1}")]
    Context(String, #[source] Box<Error>),
}

impl Error {
    /// Adds context to the error
    pub fn context(self, msg: impl Into<String>) -> Self {
        Error::Context(msg.into(), Box::new(self))
    }

    /// Returns true when the failure was a deadline being exceeded.
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Timeout(_) => true,
            Error::Http(e) => e.is_timeout(),
            Error::Context(_, inner) => inner.is_timeout(),
            _ => false,
        }
    }

    /// Returns true when the failure was an expectation mismatch.
    pub fn is_assertion(&self) -> bool {
        match self {
            Error::Assertion(_) | Error::UnexpectedStatus { .. } => true,
            Error::Context(_, inner) => inner.is_assertion(),
            _ => false,
        }
    }
}

impl From<playwright_rs::Error> for Error {
    fn from(error: playwright_rs::Error) -> Self {
        use playwright_rs::Error as Pw;

        match error {
            Pw::Timeout(msg) | Pw::AssertionTimeout(msg) => Error::Timeout(msg),
            Pw::NavigationTimeout { url, duration_ms } => Error::Timeout(format!(
                "navigation to '{}' exceeded {}ms",
                url, duration_ms
            )),
            Pw::ElementNotFound(selector) => Error::ElementNotFound(selector),
            // The driver reports action deadlines as protocol errors
            Pw::ProtocolError(msg) if msg.contains("Timeout") && msg.contains("exceeded") => {
                Error::Timeout(msg)
            }
            other => Error::Browser(other),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            let url = error
                .url()
                .map(|u| u.to_string())
                .unwrap_or_else(|| "<unknown>".to_string());
            return Error::Timeout(format!("request to {} timed out", url));
        }
        Error::Http(error)
    }
}
