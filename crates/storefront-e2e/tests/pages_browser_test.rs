// Integration tests for the page objects in a real browser
//
// Drives Playwright against the stand-in storefront pages served by
// test_server.rs. Needs the Playwright driver and browsers installed:
//
//   cargo test -p storefront-e2e --test pages_browser_test -- --ignored
//
// Tests cover:
// - Login failure message and native email validation
// - Registration: password mismatch, success, duplicate email
// - Home navigation into a product detail page and logout


use std::time::Duration;
use storefront_e2e::data::{self, RegistrationData};
use storefront_e2e::pages::{
    HomePage, INVALID_CREDENTIALS_MESSAGE, LoginPage, ProductPage, RegisterPage,
    USER_ALREADY_EXISTS_MESSAGE,
};
use storefront_e2e::{BrowserSession, Credentials, PageDriver, Selector, expect, expect_page};
use test_server::{FIXTURE_EMAIL, FIXTURE_NAME, FIXTURE_PASSWORD, TestServer};

#[tokio::test]
#[ignore = "requires Playwright browsers (npx playwright install)"]
async fn test_login_page_messages() {
    storefront_e2e::init_tracing();
    let server = TestServer::start().await;
    let config = server.config();
    let session = BrowserSession::launch(&config.browser, config.timeouts.clone())
        .await
        .expect("Failed to launch browser");
    let driver = session.new_driver().await.expect("Failed to create page");

    let login = LoginPage::new(&driver, &config.web);
    login.goto().await.unwrap();
    expect_page(&driver).to_have_title("Login").await.unwrap();

    // Wrong password: backend message shown under the form
    login
        .login(&Credentials::new(FIXTURE_EMAIL, "wrong-password"))
        .await
        .unwrap();
    expect(&driver, &login.error_message)
        .to_have_text(INVALID_CREDENTIALS_MESSAGE)
        .await
        .unwrap();
    assert_eq!(login.error_message_text().await.unwrap(), INVALID_CREDENTIALS_MESSAGE);

    // Malformed email: the browser blocks submission
    login.goto().await.unwrap();
    login
        .login(&Credentials::new("not-an-email", "whatever"))
        .await
        .unwrap();
    let message = login.email_validation_message().await.unwrap();
    assert!(!message.is_empty(), "expected a native validation message");
    assert!(driver.url().await.unwrap().ends_with("/login"));

    login.click_register().await.unwrap();
    expect_page(&driver).to_have_title("Register").await.unwrap();

    driver.close().await.unwrap();
    session.close().await.unwrap();
    server.shutdown();
}

#[tokio::test]
#[ignore = "requires Playwright browsers (npx playwright install)"]
async fn test_register_page_flows() {
    storefront_e2e::init_tracing();
    let server = TestServer::start().await;
    let config = server.config();
    let session = BrowserSession::launch(&config.browser, config.timeouts.clone())
        .await
        .expect("Failed to launch browser");

    // Mismatched confirmation never reaches the backend
    let driver = session.new_driver().await.unwrap();
    let register = RegisterPage::new(&driver, &config.web).with_assertion_timeout(Duration::from_secs(5));
    register.goto().await.unwrap();
    let mismatched = RegistrationData::mismatched(
        data::generate_random_name(),
        data::generate_random_email(data::DEFAULT_EMAIL_DOMAIN),
        "Secret1!",
        "Secret2?",
    );
    register.register(&mismatched).await.unwrap();
    register.expect_password_mismatch().await.unwrap();
    assert_eq!(server.register_posts(), 0);
    driver.close().await.unwrap();

    // Fresh account lands signed in on the home page
    let driver = session.new_driver().await.unwrap();
    let register = RegisterPage::new(&driver, &config.web);
    register.goto().await.unwrap();
    let fresh = data::generate_registration().unwrap();
    register.register(&fresh).await.unwrap();
    register.expect_account_creation_success(&fresh).await.unwrap();
    let home = HomePage::new(&driver, &config.web);
    assert_eq!(home.username().await.unwrap(), fresh.name.to_lowercase());
    driver.close().await.unwrap();

    // Existing email is refused by the backend
    let driver = session.new_driver().await.unwrap();
    let register = RegisterPage::new(&driver, &config.web);
    register.goto().await.unwrap();
    let duplicate = RegistrationData::matching(FIXTURE_NAME, FIXTURE_EMAIL, "Another1!");
    register.register(&duplicate).await.unwrap();
    expect(&driver, &register.alert_message)
        .to_have_text(USER_ALREADY_EXISTS_MESSAGE)
        .await
        .unwrap();
    driver.close().await.unwrap();

    assert_eq!(server.register_posts(), 2);
    session.close().await.unwrap();
    server.shutdown();
}

#[tokio::test]
#[ignore = "requires Playwright browsers (npx playwright install)"]
async fn test_home_product_and_logout() {
    storefront_e2e::init_tracing();
    let server = TestServer::start().await;
    let config = server.config();
    let session = BrowserSession::launch(&config.browser, config.timeouts.clone())
        .await
        .expect("Failed to launch browser");
    let driver = session.new_driver().await.unwrap();

    let login = LoginPage::new(&driver, &config.web);
    login.goto().await.unwrap();
    login
        .login(&Credentials::new(FIXTURE_EMAIL, FIXTURE_PASSWORD))
        .await
        .unwrap();

    let home = HomePage::new(&driver, &config.web);
    expect(&driver, &home.username)
        .to_contain_text(FIXTURE_NAME)
        .await
        .unwrap();
    assert_eq!(home.username().await.unwrap(), FIXTURE_NAME.to_lowercase());

    home.open_first_product().await.unwrap();
    let product = ProductPage::new(&driver);
    product.expect_details_shown().await.unwrap();
    assert_eq!(product.title_text().await.unwrap(), "Product 1");
    product.add_to_cart().await.unwrap();

    home.goto().await.unwrap();
    home.logout().await.unwrap();
    expect_page(&driver).to_have_title("Login").await.unwrap();

    home.goto().await.unwrap();
    expect(&driver, &Selector::id("username"))
        .not()
        .to_be_visible()
        .await
        .unwrap();
    home.click_login().await.unwrap();
    expect_page(&driver).to_have_title("Login").await.unwrap();

    driver.close().await.unwrap();
    session.close().await.unwrap();
    server.shutdown();
}
