// Register page object

use super::read_text;
use crate::assertions::{DEFAULT_ASSERTION_TIMEOUT, expect};
use crate::config::WebConfig;
use crate::data::RegistrationData;
use crate::driver::{PageDriver, Selector};
use crate::error::Result;
use std::time::Duration;

/// Client-side message shown when the confirmation differs from the password.
pub const PASSWORDS_DO_NOT_MATCH_MESSAGE: &str = "Passwords do not match";

/// Backend message for an email that already has an account.
pub const USER_ALREADY_EXISTS_MESSAGE: &str = "User with this email already exists";

/// The account registration form.
pub struct RegisterPage<'a, D: PageDriver + ?Sized> {
    driver: &'a D,
    url: String,
    assertion_timeout: Duration,
    pub name: Selector,
    pub email: Selector,
    pub password: Selector,
    pub confirm_password: Selector,
    pub submit_button: Selector,
    pub alert_message: Selector,
    pub username: Selector,
}

impl<'a, D: PageDriver + ?Sized> RegisterPage<'a, D> {
    pub fn new(driver: &'a D, web: &WebConfig) -> Self {
        Self {
            driver,
            url: web.register_url(),
            assertion_timeout: DEFAULT_ASSERTION_TIMEOUT,
            name: Selector::id("name"),
            email: Selector::id("email"),
            password: Selector::id("password"),
            confirm_password: Selector::id("passwordConfirm"),
            submit_button: Selector::css("form button[type=\"submit\"]"),
            alert_message: Selector::css(".alert"),
            username: Selector::id("username"),
        }
    }

    pub fn with_assertion_timeout(mut self, timeout: Duration) -> Self {
        self.assertion_timeout = timeout;
        self
    }

    pub async fn goto(&self) -> Result<()> {
        self.driver.goto(&self.url).await
    }

    /// Types every field; no client-side validation happens here.
    pub async fn fill_registration_form(&self, data: &RegistrationData) -> Result<()> {
        self.driver.fill(&self.name, &data.name).await?;
        self.driver.fill(&self.email, &data.email).await?;
        self.driver.fill(&self.password, &data.password).await?;
        self.driver
            .fill(&self.confirm_password, &data.confirm_password)
            .await
    }

    pub async fn submit(&self) -> Result<()> {
        self.driver.click(&self.submit_button).await
    }

    pub async fn register(&self, data: &RegistrationData) -> Result<()> {
        self.fill_registration_form(data).await?;
        self.submit().await
    }

    pub async fn alert_message_text(&self) -> Result<String> {
        read_text(self.driver, &self.alert_message, "Alert message").await
    }

    /// Waits until the signed-in user's name shows in the header.
    pub async fn expect_account_creation_success(&self, data: &RegistrationData) -> Result<()> {
        expect(self.driver, &self.username)
            .with_timeout(self.assertion_timeout)
            .to_contain_text(&data.name)
            .await
    }

    /// Waits until the password mismatch alert shows.
    pub async fn expect_password_mismatch(&self) -> Result<()> {
        expect(self.driver, &self.alert_message)
            .with_timeout(self.assertion_timeout)
            .to_have_text(PASSWORDS_DO_NOT_MATCH_MESSAGE)
            .await
    }
}
