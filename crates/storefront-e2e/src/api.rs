// Storefront REST endpoints
//
// Thin typed wrappers over `ApiClient::make_request` for the product and
// user resources. Wire names follow the Django backend (`_id`,
// `countInStock`, `isAdmin`, `createdAt`).

use crate::data::Credentials;
use crate::error::{Error, Result};
use crate::request::{ApiClient, Headers};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body for creating or updating a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub image: String,
    pub brand: String,
    pub category: String,
    pub description: String,
    /// Decimal as a string, e.g. `"123.45"`
    pub price: String,
    pub count_in_stock: i64,
}

impl NewProduct {
    /// The fixed product body used by the create/update scenarios.
    pub fn sample() -> Self {
        Self {
            name: "Test Product".to_string(),
            image: "/images/test_product.jpg".to_string(),
            brand: "Test Brand".to_string(),
            category: "Test Category".to_string(),
            description: "This is a test product description.".to_string(),
            price: "123.45".to_string(),
            count_in_stock: 10,
        }
    }
}

/// A product as returned by the API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub price: String,
    pub count_in_stock: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub name: String,
    pub email: String,
    pub is_admin: bool,
}

/// A user as returned by register, lookup, update and login.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub token: Option<String>,
}

/// Parses a response body into a typed record.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    Ok(serde_json::from_value(value)?)
}

fn encode<T: Serialize>(body: &T) -> Result<Value> {
    Ok(serde_json::to_value(body)?)
}

pub async fn get_product(client: &ApiClient, id: i64) -> Result<Value> {
    client
        .make_request(Method::GET, &format!("/products/{}", id), None)
        .await
}

pub async fn create_product(client: &ApiClient, product: &NewProduct) -> Result<Value> {
    client
        .make_request(Method::POST, "/products/create/", Some(&encode(product)?))
        .await
}

pub async fn update_product(client: &ApiClient, id: i64, product: &NewProduct) -> Result<Value> {
    client
        .make_request(
            Method::PUT,
            &format!("/products/update/{}/", id),
            Some(&encode(product)?),
        )
        .await
}

/// Deletes a product, requiring status 200.
pub async fn delete_product(client: &ApiClient, id: i64) -> Result<()> {
    client
        .expect_status(
            Method::DELETE,
            &format!("/products/delete/{}/", id),
            StatusCode::OK,
        )
        .await?;
    tracing::info!(product_id = id, "deleted product");
    Ok(())
}

pub async fn register_user(client: &ApiClient, user: &NewUser) -> Result<Value> {
    client
        .make_request(Method::POST, "/users/register/", Some(&encode(user)?))
        .await
}

pub async fn get_user(client: &ApiClient, id: i64) -> Result<Value> {
    client
        .make_request(Method::GET, &format!("/users/{}", id), None)
        .await
}

pub async fn update_user(client: &ApiClient, id: i64, update: &UserUpdate) -> Result<Value> {
    client
        .make_request(
            Method::PUT,
            &format!("/users/update/{}/", id),
            Some(&encode(update)?),
        )
        .await
}

/// Deletes a user, requiring status 200.
pub async fn delete_user(client: &ApiClient, id: i64) -> Result<()> {
    client
        .expect_status(
            Method::DELETE,
            &format!("/users/delete/{}/", id),
            StatusCode::OK,
        )
        .await?;
    tracing::info!(user_id = id, "deleted user");
    Ok(())
}

/// Logs in with `credentials`, sending only a JSON content type.
///
/// The login endpoint takes the email as `username`.
pub async fn login(client: &ApiClient, credentials: &Credentials) -> Result<Value> {
    let mut headers = Headers::new();
    headers.insert("Content-Type".to_string(), "application/json".to_string());
    let body = serde_json::json!({
        "username": credentials.email,
        "password": credentials.password,
    });
    client
        .make_request_with_headers(Method::POST, "/users/login/", &headers, Some(&body))
        .await
}

/// Logs in and returns a copy of `client` authorised with the issued token.
///
/// # Errors
///
/// Returns [`Error::Assertion`] when the login response carries no token.
pub async fn authenticate(client: &ApiClient, credentials: &Credentials) -> Result<ApiClient> {
    let user: User = decode(login(client, credentials).await?)?;
    let token = user.token.ok_or_else(|| {
        Error::Assertion(format!("login for {} returned no token", credentials.email))
    })?;
    Ok(client.clone().with_bearer_token(&token))
}
