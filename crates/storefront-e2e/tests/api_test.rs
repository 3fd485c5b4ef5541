// Integration tests for the API scenario helpers
//
// The same product and user flows the live suite runs, pointed at the mock
// API in test_server.rs.
//
// Tests cover:
// - Product lookup, create, update and delete
// - User register, lookup, update, login and delete
// - Token derivation through login
// - Scenario teardown removing what a scenario created


use regex::Regex;
use storefront_e2e::api::{self, NewProduct, NewUser, Product, User, UserUpdate};
use storefront_e2e::data::{self, DEFAULT_EMAIL_DOMAIN};
use storefront_e2e::{ApiClient, CleanupAction, Credentials, Error, ScenarioContext, expect_json};
use test_server::{FIXTURE_EMAIL, FIXTURE_PASSWORD, TestServer};

// ============================================================================
// Products
// ============================================================================

#[tokio::test]
async fn test_product_lookup_returns_catalogue_values() {
    storefront_e2e::init_tracing();
    let server = TestServer::start().await;
    let ctx = ScenarioContext::new(server.config()).unwrap();

    let body = api::get_product(&ctx.api, 1).await.unwrap();
    expect_json(&body)
        .to_have_property_value("_id", 1)
        .unwrap()
        .to_have_property_value("name", "Airpods Wireless Bluetooth Headphones")
        .unwrap()
        .to_have_property_value("image", "/images/airpods_rueLkRx.jpg")
        .unwrap()
        .to_have_property_value("brand", "Apple")
        .unwrap()
        .to_have_property_value("category", "Electronics")
        .unwrap()
        .to_have_property_value("price", "1998.99")
        .unwrap()
        .to_have_property_value("countInStock", 18)
        .unwrap()
        .to_have_property_value("createdAt", "2024-08-13T19:30:16.537131Z")
        .unwrap();

    let product: Product = api::decode(body).unwrap();
    assert_eq!(product.id, 1);
    assert_eq!(product.description.as_deref(), Some(test_server::AIRPODS_DESCRIPTION));

    assert_eq!(ctx.teardown().await, 0);
    server.shutdown();
}

#[tokio::test]
async fn test_product_create_update_delete() {
    storefront_e2e::init_tracing();
    let server = TestServer::start().await;
    let mut ctx = ScenarioContext::new(server.config()).unwrap();

    let sample = NewProduct::sample();
    let created = api::create_product(&ctx.api, &sample).await.unwrap();
    expect_json(&created)
        .to_have_property("_id")
        .unwrap()
        .to_have_property("createdAt")
        .unwrap()
        .to_have_property_value("name", "Test Product")
        .unwrap()
        .to_have_property_value("image", "/images/images/test_product.jpg")
        .unwrap()
        .to_have_property_value("price", "123.45")
        .unwrap()
        .to_have_property_value("countInStock", 10)
        .unwrap();

    let timestamp = Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d+)?Z$").unwrap();
    assert!(timestamp.is_match(created["createdAt"].as_str().unwrap()));

    let id = created["_id"].as_i64().unwrap();
    ctx.track(CleanupAction::ProductById(id));

    let update = NewProduct {
        name: "Updated Test Product".to_string(),
        price: "150.00".to_string(),
        ..sample
    };
    let updated = api::update_product(&ctx.api, id, &update).await.unwrap();
    expect_json(&updated)
        .to_have_property_value("_id", id)
        .unwrap()
        .to_have_property_value("name", "Updated Test Product")
        .unwrap()
        .to_have_property_value("price", "150.00")
        .unwrap();

    // Teardown issues the DELETE and expects 200
    assert_eq!(ctx.teardown().await, 0);

    let api = ApiClient::from_config(&server.config().api, std::time::Duration::from_secs(1)).unwrap();
    let err = api::get_product(&api, id).await.unwrap_err();
    assert!(matches!(err, Error::UnexpectedStatus { status: 404, .. }));

    server.shutdown();
}

// ============================================================================
// Users
// ============================================================================

#[tokio::test]
async fn test_user_register_lookup_update_delete() {
    storefront_e2e::init_tracing();
    let server = TestServer::start().await;
    let mut ctx = ScenarioContext::new(server.config()).unwrap();

    let email = data::generate_random_email(DEFAULT_EMAIL_DOMAIN).to_uppercase();
    let new_user = NewUser {
        name: "Test User".to_string(),
        email: email.clone(),
        password: data::generate_random_password(12).unwrap(),
    };
    let registered: User = api::decode(api::register_user(&ctx.api, &new_user).await.unwrap()).unwrap();
    ctx.track(CleanupAction::UserById(registered.id));
    assert!(registered.token.is_some());

    // The backend lowercases emails; lookups compare ignoring case
    let fetched = api::get_user(&ctx.api, registered.id).await.unwrap();
    expect_json(&fetched)
        .to_have_property_value("name", "Test User")
        .unwrap()
        .to_have_property_ignore_case("email", &email)
        .unwrap()
        .to_have_property_value("isAdmin", false)
        .unwrap();

    let update = UserUpdate {
        name: "Edited Name".to_string(),
        email: "edited@mainModule.com".to_string(),
        is_admin: false,
    };
    let updated = api::update_user(&ctx.api, registered.id, &update).await.unwrap();
    expect_json(&updated)
        .to_have_property_value("name", "Edited Name")
        .unwrap()
        .to_have_property_value("email", "edited@mainModule.com")
        .unwrap()
        .to_have_property_value("isAdmin", false)
        .unwrap();

    assert_eq!(ctx.teardown().await, 0);
    server.shutdown();
}

#[tokio::test]
async fn test_duplicate_registration_is_rejected() {
    storefront_e2e::init_tracing();
    let server = TestServer::start().await;
    let ctx = ScenarioContext::new(server.config()).unwrap();

    let err = api::register_user(
        &ctx.api,
        &NewUser {
            name: "Someone".to_string(),
            email: FIXTURE_EMAIL.to_string(),
            password: "Whatever1!".to_string(),
        },
    )
    .await
    .unwrap_err();

    match err {
        Error::UnexpectedStatus { status, body, .. } => {
            assert_eq!(status, 400);
            assert!(body.contains("User with this email already exists"));
        }
        other => panic!("expected UnexpectedStatus, got {:?}", other),
    }

    server.shutdown();
}

#[tokio::test]
async fn test_disposable_email_is_rejected() {
    storefront_e2e::init_tracing();
    let server = TestServer::start().await;
    let ctx = ScenarioContext::new(server.config()).unwrap();

    let email = data::generate_disposable_email(&ctx.config.fixtures.disposable_email_domains)
        .expect("config lists a disposable domain");
    let err = api::register_user(
        &ctx.api,
        &NewUser {
            name: data::generate_random_name(),
            email,
            password: data::generate_random_password(12).unwrap(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::UnexpectedStatus { status: 400, .. }));
    assert_eq!(server.register_posts(), 1);

    server.shutdown();
}

#[tokio::test]
async fn test_login_as_fixture_user() {
    storefront_e2e::init_tracing();
    let server = TestServer::start().await;
    let _guard = storefront_e2e::fixture_account_lock().await;
    let ctx = ScenarioContext::new(server.config()).unwrap();

    let credentials = ctx.config.fixtures.existing_user.credentials().unwrap();
    let body = api::login(&ctx.api, &credentials).await.unwrap();
    expect_json(&body)
        .to_have_property("token")
        .unwrap()
        .to_have_property_value("_id", test_server::FIXTURE_USER_ID)
        .unwrap()
        .to_have_property_value("email", FIXTURE_EMAIL)
        .unwrap()
        .to_have_property_value("isAdmin", true)
        .unwrap();

    let err = api::login(&ctx.api, &Credentials::new(FIXTURE_EMAIL, "wrong-password"))
        .await
        .unwrap_err();
    match err {
        Error::UnexpectedStatus { status, body, .. } => {
            assert_eq!(status, 401);
            assert!(body.contains(storefront_e2e::pages::INVALID_CREDENTIALS_MESSAGE));
        }
        other => panic!("expected UnexpectedStatus, got {:?}", other),
    }

    server.shutdown();
}

#[tokio::test]
async fn test_authenticate_derives_bearer_token() {
    storefront_e2e::init_tracing();
    let server = TestServer::start().await;

    // No token configured: admin endpoints are refused
    let mut config = server.config();
    config.api.token = None;
    let anonymous = ApiClient::from_config(&config.api, config.timeouts.request()).unwrap();
    let err = api::get_user(&anonymous, 1).await.unwrap_err();
    assert!(matches!(err, Error::UnexpectedStatus { status: 401, .. }));

    let authorised = api::authenticate(&anonymous, &Credentials::new(FIXTURE_EMAIL, FIXTURE_PASSWORD))
        .await
        .unwrap();
    let user: User = api::decode(api::get_user(&authorised, 1).await.unwrap()).unwrap();
    assert_eq!(user.email, FIXTURE_EMAIL);
    assert!(user.is_admin);

    server.shutdown();
}

#[tokio::test]
async fn test_teardown_reports_records_left_behind() {
    storefront_e2e::init_tracing();
    let server = TestServer::start().await;
    let mut ctx = ScenarioContext::new(server.config()).unwrap();

    let created = api::create_product(&ctx.api, &NewProduct::sample()).await.unwrap();
    let id = created["_id"].as_i64().unwrap();
    ctx.track(CleanupAction::ProductById(id));
    // Already gone by the time teardown runs
    api::delete_product(&ctx.api, id).await.unwrap();

    assert_eq!(ctx.pending().len(), 1);
    assert_eq!(ctx.teardown().await, 1);

    // finish hands back the scenario's own result regardless
    let mut ctx = ScenarioContext::new(server.config()).unwrap();
    ctx.track(CleanupAction::ProductById(id));
    let outcome = ctx.finish(Ok::<_, Error>(id)).await;
    assert_eq!(outcome.unwrap(), id);

    server.shutdown();
}

#[tokio::test]
async fn test_authorised_context_signs_in_without_token() {
    storefront_e2e::init_tracing();
    let server = TestServer::start().await;
    let _guard = storefront_e2e::fixture_account_lock().await;

    let mut config = server.config();
    config.api.token = None;
    let ctx = ScenarioContext::authorised(config).await.unwrap();
    assert_eq!(
        ctx.api.headers()["authorization"],
        format!("Bearer {}", test_server::TOKEN)
    );
    api::get_user(&ctx.api, test_server::FIXTURE_USER_ID)
        .await
        .unwrap();

    // Wrong fixture password: the context cannot be built
    let mut config = server.config();
    config.api.token = None;
    config.fixtures.existing_user.password = Some("wrong".to_string());
    let err = ScenarioContext::authorised(config).await.err().unwrap();
    assert!(err.is_assertion(), "got {:?}", err);

    server.shutdown();
}
