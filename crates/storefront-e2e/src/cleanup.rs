// Fixture cleanup
//
// Scenarios that create users or products record them on their own
// `ScenarioContext`; `teardown` removes them afterwards. Cleanup failures
// are logged and swallowed so they never mask the scenario's own result.
// A failed cleanup leaves the record behind for later runs.

use crate::api;
use crate::config::{DbConfig, SuiteConfig, is_plain_identifier};
use crate::error::{Error, Result};
use crate::request::ApiClient;
use sqlx::{AnyConnection, Connection};
use std::sync::Once;
use tokio::sync::{Mutex, MutexGuard};

static INSTALL_DRIVERS: Once = Once::new();

static FIXTURE_ACCOUNT: Mutex<()> = Mutex::const_new(());

/// Serializes scenarios that sign in as, or register over, the shared
/// fixture account. Hold the guard for the whole scenario.
pub async fn fixture_account_lock() -> MutexGuard<'static, ()> {
    FIXTURE_ACCOUNT.lock().await
}

/// Deletes the user rows matching `email` and returns how many went.
///
/// The connection is closed whether or not the delete succeeded.
pub async fn try_delete_user_from_db(config: &DbConfig, email: &str) -> Result<u64> {
    if !is_plain_identifier(&config.user_table) {
        return Err(Error::Config(format!(
            "user table '{}' is not a plain identifier",
            config.user_table
        )));
    }
    INSTALL_DRIVERS.call_once(sqlx::any::install_default_drivers);

    let mut conn = AnyConnection::connect(&config.connection_url()?).await?;
    let statement = format!("DELETE FROM {} WHERE email = ?", config.user_table);
    let outcome = sqlx::query(&statement).bind(email).execute(&mut conn).await;

    if let Err(e) = conn.close().await {
        tracing::warn!(error = %e, "failed to close cleanup connection");
    }
    Ok(outcome?.rows_affected())
}

/// Deletes the user rows matching `email`, logging instead of failing.
///
/// Deleting an email that has no rows is a no-op.
pub async fn delete_user_from_db(config: &DbConfig, email: &str) {
    match try_delete_user_from_db(config, email).await {
        Ok(0) => tracing::debug!(email, "no user rows to delete"),
        Ok(rows) => tracing::info!(email, rows, "deleted user from database"),
        Err(e) => tracing::warn!(email, error = %e, "failed to delete user from database"),
    }
}

/// Something a scenario created and teardown must remove.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupAction {
    /// Delete user rows by email directly in the database
    UserRowByEmail(String),
    /// Delete a user through the API
    UserById(i64),
    /// Delete a product through the API
    ProductById(i64),
}

/// Per-scenario state carried from setup to teardown.
///
/// Each scenario builds its own context; nothing is shared between
/// scenarios apart from [`fixture_account_lock`].
pub struct ScenarioContext {
    pub config: SuiteConfig,
    pub api: ApiClient,
    cleanup: Vec<CleanupAction>,
}

impl ScenarioContext {
    /// Builds a context with a fresh API client.
    pub fn new(config: SuiteConfig) -> Result<Self> {
        let api = ApiClient::from_config(&config.api, config.timeouts.request())?;
        Ok(Self::with_client(config, api))
    }

    /// Builds a context whose API client carries a bearer token.
    ///
    /// Uses the configured token when there is one; otherwise logs in as the
    /// fixture user and takes the token from the login response.
    pub async fn authorised(config: SuiteConfig) -> Result<Self> {
        let api = ApiClient::from_config(&config.api, config.timeouts.request())?;
        let api = match config.api.token {
            Some(_) => api,
            None => {
                let credentials = config.fixtures.existing_user.credentials()?;
                tracing::debug!(email = %credentials.email, "deriving API token from login");
                api::authenticate(&api, &credentials)
                    .await
                    .map_err(|e| e.context("deriving API token"))?
            }
        };
        Ok(Self::with_client(config, api))
    }

    pub fn with_client(config: SuiteConfig, api: ApiClient) -> Self {
        Self {
            config,
            api,
            cleanup: Vec::new(),
        }
    }

    pub fn track(&mut self, action: CleanupAction) {
        tracing::debug!(?action, "tracking for cleanup");
        self.cleanup.push(action);
    }

    /// Pending cleanup actions, in the order they were tracked.
    pub fn pending(&self) -> &[CleanupAction] {
        &self.cleanup
    }

    /// Removes everything tracked, newest first.
    ///
    /// Returns the number of actions that failed; each failure is logged.
    pub async fn teardown(mut self) -> usize {
        let mut failures = 0;
        while let Some(action) = self.cleanup.pop() {
            let result = match &action {
                CleanupAction::UserRowByEmail(email) => {
                    try_delete_user_from_db(&self.config.database, email)
                        .await
                        .map(|_| ())
                }
                CleanupAction::UserById(id) => api::delete_user(&self.api, *id).await,
                CleanupAction::ProductById(id) => api::delete_product(&self.api, *id).await,
            };
            if let Err(e) = result {
                failures += 1;
                tracing::warn!(?action, error = %e, "cleanup failed; record left behind");
            }
        }
        failures
    }

    /// Runs teardown, then hands back the scenario's own result.
    pub async fn finish<T>(self, outcome: Result<T>) -> Result<T> {
        let left_behind = self.teardown().await;
        if left_behind > 0 {
            tracing::warn!(left_behind, "teardown incomplete");
        }
        outcome
    }
}
