// Login page object

use super::read_text;
use crate::config::WebConfig;
use crate::data::Credentials;
use crate::driver::{PageDriver, Selector};
use crate::error::Result;

/// Error shown by the backend for an unknown email or wrong password.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "No active account found with the given credentials";

/// The sign-in form.
pub struct LoginPage<'a, D: PageDriver + ?Sized> {
    driver: &'a D,
    url: String,
    pub email: Selector,
    pub password: Selector,
    pub sign_in_button: Selector,
    pub register_link: Selector,
    pub error_message: Selector,
}

impl<'a, D: PageDriver + ?Sized> LoginPage<'a, D> {
    pub fn new(driver: &'a D, web: &WebConfig) -> Self {
        Self {
            driver,
            url: web.login_url(),
            email: Selector::id("email"),
            password: Selector::id("password"),
            sign_in_button: Selector::xpath("//*[@id=\"root\"]/main/div/div/div/div/form/button"),
            register_link: Selector::xpath("//*[@id=\"root\"]/main/div/div/div/div/div/div/a"),
            error_message: Selector::xpath("//*[@id=\"root\"]/main/div/div/div/div/div[1]"),
        }
    }

    pub async fn goto(&self) -> Result<()> {
        self.driver.goto(&self.url).await
    }

    pub async fn fill_login_form(&self, credentials: &Credentials) -> Result<()> {
        self.driver.fill(&self.email, &credentials.email).await?;
        self.driver.fill(&self.password, &credentials.password).await
    }

    pub async fn submit(&self) -> Result<()> {
        self.driver.click(&self.sign_in_button).await
    }

    /// Fills the form and submits it.
    pub async fn login(&self, credentials: &Credentials) -> Result<()> {
        self.fill_login_form(credentials).await?;
        self.submit().await
    }

    pub async fn click_register(&self) -> Result<()> {
        self.driver.click(&self.register_link).await
    }

    pub async fn error_message_text(&self) -> Result<String> {
        read_text(self.driver, &self.error_message, "Error message").await
    }

    /// The browser's native constraint-validation message for the email input.
    pub async fn email_validation_message(&self) -> Result<String> {
        self.driver
            .element_property(&self.email, "validationMessage")
            .await
    }
}
