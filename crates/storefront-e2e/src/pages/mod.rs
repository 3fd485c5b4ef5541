// Page objects
//
// Each page object binds one storefront page's selectors at construction
// and exposes the user actions a scenario performs on it. Page objects
// hold no state of their own; everything lives in the browser page.

mod home;
mod login;
mod product;
mod register;

pub use home::HomePage;
pub use login::{INVALID_CREDENTIALS_MESSAGE, LoginPage};
pub use product::ProductPage;
pub use register::{PASSWORDS_DO_NOT_MATCH_MESSAGE, RegisterPage, USER_ALREADY_EXISTS_MESSAGE};

use crate::driver::{PageDriver, Selector};
use crate::error::{Error, Result};

/// Reads the trimmed text of `selector`.
///
/// An element with no (or only whitespace) text is reported as
/// [`Error::MissingElement`] named by `what`.
pub(crate) async fn read_text<D: PageDriver + ?Sized>(
    driver: &D,
    selector: &Selector,
    what: &str,
) -> Result<String> {
    match driver.text_content(selector).await? {
        Some(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
        _ => Err(Error::MissingElement(what.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::fake::FakeDriver;

    #[tokio::test]
    async fn test_read_text() {
        let present = Selector::css(".present");
        let empty = Selector::css(".empty");
        let blank = Selector::css(".blank");
        let driver = FakeDriver::default()
            .with_text(&present, Some("  hello \n"))
            .with_text(&empty, None)
            .with_text(&blank, Some("   "));

        assert_eq!(read_text(&driver, &present, "Greeting").await.unwrap(), "hello");

        let err = read_text(&driver, &empty, "Alert message").await.unwrap_err();
        assert_eq!(err.to_string(), "Alert message is missing!");
        assert!(matches!(
            read_text(&driver, &blank, "Alert message").await,
            Err(Error::MissingElement(_))
        ));

        let err = read_text(&driver, &Selector::css(".absent"), "x").await.unwrap_err();
        assert!(matches!(err, Error::ElementNotFound(_)));
    }
}
