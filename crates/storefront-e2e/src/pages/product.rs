// Product detail page object

use super::read_text;
use crate::assertions::{DEFAULT_ASSERTION_TIMEOUT, expect};
use crate::driver::{PageDriver, Selector};
use crate::error::Result;
use std::time::Duration;

/// Detail view reached by opening a product card.
pub struct ProductPage<'a, D: PageDriver + ?Sized> {
    driver: &'a D,
    assertion_timeout: Duration,
    pub title: Selector,
    pub price: Selector,
    pub add_to_cart: Selector,
}

impl<'a, D: PageDriver + ?Sized> ProductPage<'a, D> {
    pub fn new(driver: &'a D) -> Self {
        Self {
            driver,
            assertion_timeout: DEFAULT_ASSERTION_TIMEOUT,
            title: Selector::css(".product-title"),
            price: Selector::css(".product-price"),
            add_to_cart: Selector::css(".add-to-cart"),
        }
    }

    pub fn with_assertion_timeout(mut self, timeout: Duration) -> Self {
        self.assertion_timeout = timeout;
        self
    }

    pub async fn title_text(&self) -> Result<String> {
        read_text(self.driver, &self.title, "Product title").await
    }

    pub async fn price_text(&self) -> Result<String> {
        read_text(self.driver, &self.price, "Product price").await
    }

    pub async fn add_to_cart(&self) -> Result<()> {
        self.driver.click(&self.add_to_cart).await
    }

    /// Title and price visible, add-to-cart enabled.
    pub async fn expect_details_shown(&self) -> Result<()> {
        expect(self.driver, &self.title)
            .with_timeout(self.assertion_timeout)
            .to_be_visible()
            .await?;
        expect(self.driver, &self.price)
            .with_timeout(self.assertion_timeout)
            .to_be_visible()
            .await?;
        expect(self.driver, &self.add_to_cart)
            .with_timeout(self.assertion_timeout)
            .to_be_enabled()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::fake::FakeDriver;

    #[tokio::test]
    async fn test_details_shown() {
        let driver = FakeDriver::default()
            .with_visible(&Selector::css(".product-title"), true)
            .with_visible(&Selector::css(".product-price"), true)
            .with_enabled(&Selector::css(".add-to-cart"), true)
            .with_text(&Selector::css(".product-price"), Some("$1998.99"));
        let page = ProductPage::new(&driver);

        page.expect_details_shown().await.unwrap();
        assert_eq!(page.price_text().await.unwrap(), "$1998.99");
    }

    #[tokio::test]
    async fn test_disabled_cart_fails() {
        let driver = FakeDriver::default()
            .with_visible(&Selector::css(".product-title"), true)
            .with_visible(&Selector::css(".product-price"), true)
            .with_enabled(&Selector::css(".add-to-cart"), false);
        let page = ProductPage::new(&driver).with_assertion_timeout(Duration::from_millis(30));

        let err = page.expect_details_shown().await.unwrap_err();
        assert!(err.is_assertion());
    }
}
