// Home page object

use super::read_text;
use crate::config::WebConfig;
use crate::driver::{PageDriver, Selector};
use crate::error::Result;

/// Landing page: header navigation and the product grid.
pub struct HomePage<'a, D: PageDriver + ?Sized> {
    driver: &'a D,
    url: String,
    pub username: Selector,
    pub logout_link: Selector,
    pub login_link: Selector,
    pub product_cards: Selector,
}

impl<'a, D: PageDriver + ?Sized> HomePage<'a, D> {
    pub fn new(driver: &'a D, web: &WebConfig) -> Self {
        Self {
            driver,
            url: web.home_url(),
            username: Selector::id("username"),
            logout_link: Selector::css_with_text("a.dropdown-item", "Logout"),
            login_link: Selector::css_with_text("a.nav-link", "Login"),
            product_cards: Selector::css(".product-card"),
        }
    }

    pub async fn goto(&self) -> Result<()> {
        self.driver.goto(&self.url).await
    }

    /// Signed-in user's name from the header, lower-cased.
    pub async fn username(&self) -> Result<String> {
        let name = read_text(self.driver, &self.username, "Username message").await?;
        Ok(name.to_lowercase())
    }

    pub async fn click_login(&self) -> Result<()> {
        self.driver.click(&self.login_link).await
    }

    /// Opens the user dropdown and clicks Logout.
    pub async fn logout(&self) -> Result<()> {
        self.driver.click(&self.username).await?;
        self.driver.click(&self.logout_link).await
    }

    pub async fn open_first_product(&self) -> Result<()> {
        self.driver.click(&self.product_cards.clone().first()).await
    }
}
