//! storefront-e2e: End-to-end and API tests for the storefront web application
//!
//! This crate holds the reusable layers the scenarios under `tests/` are
//! built from: random test data, the HTTP request helper, page objects over
//! a Playwright-driven browser, retrying assertions and fixture cleanup.
//!
//! # Examples
//!
//! ## Login With a Wrong Password
//!
//! ```ignore
//! use storefront_e2e::pages::LoginPage;
//! use storefront_e2e::{BrowserSession, Credentials, SuiteConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SuiteConfig::load()?;
//!     let session = BrowserSession::launch(&config.browser, config.timeouts.clone()).await?;
//!     let driver = session.new_driver().await?;
//!
//!     let login = LoginPage::new(&driver, &config.web);
//!     login.goto().await?;
//!     login
//!         .login(&Credentials::new(&config.fixtures.existing_user.email, "wrong-password"))
//!         .await?;
//!
//!     assert_eq!(
//!         login.error_message_text().await?,
//!         "No active account found with the given credentials"
//!     );
//!
//!     driver.close().await?;
//!     session.close().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Create and Delete a Product
//!
//! ```ignore
//! use storefront_e2e::api::{self, NewProduct};
//! use storefront_e2e::{CleanupAction, ScenarioContext, SuiteConfig, expect_json};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut ctx = ScenarioContext::new(SuiteConfig::load()?)?;
//!
//!     let created = api::create_product(&ctx.api, &NewProduct::sample()).await?;
//!     expect_json(&created)
//!         .to_have_property("_id")?
//!         .to_have_property_value("price", "123.45")?;
//!
//!     ctx.track(CleanupAction::ProductById(created["_id"].as_i64().unwrap()));
//!     ctx.teardown().await;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod assertions;
pub mod cleanup;
pub mod config;
pub mod data;
pub mod driver;
mod error;
pub mod pages;
pub mod request;

// Re-export error types
pub use error::{Error, Result};

// Re-export assertions API
pub use assertions::{expect, expect_json, expect_page};

// Re-export the browser capability
pub use driver::{BrowserSession, PageDriver, PlaywrightDriver, Selector};

// Re-export test data
pub use data::{
    Credentials, RegistrationData, generate_random_email, generate_random_name,
    generate_random_password,
};

// Re-export request helper and scenario plumbing
pub use cleanup::{CleanupAction, ScenarioContext, delete_user_from_db, fixture_account_lock};
pub use config::SuiteConfig;
pub use request::{ApiClient, Headers, make_request};

/// Installs a `tracing` subscriber honouring `RUST_LOG` (default `info`).
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
