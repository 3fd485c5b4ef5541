// Suite configuration
//
// Static data the scenarios run against: base URLs, fixture account,
// disposable domains, browser choice, timeouts and the cleanup database.
// Loaded from a JSON file, then overridden from the environment. Secrets
// (passwords, API token) only ever come from the environment.

use crate::data::Credentials;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Environment variable naming the JSON config file.
pub const CONFIG_PATH_ENV: &str = "STOREFRONT_E2E_CONFIG";

/// Config file used when [`CONFIG_PATH_ENV`] is unset and the file exists.
pub const DEFAULT_CONFIG_PATH: &str = "test-data/suite.json";

const ENV_PREFIX: &str = "STOREFRONT_E2E_";

/// Complete suite configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    pub web: WebConfig,
    pub api: ApiConfig,
    pub fixtures: Fixtures,
    pub browser: BrowserConfig,
    pub timeouts: Timeouts,
    pub database: DbConfig,
}

/// Frontend location and page paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub base_url: String,
    pub home_path: String,
    pub login_path: String,
    pub register_path: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            home_path: "/".to_string(),
            login_path: "/login".to_string(),
            register_path: "/register".to_string(),
        }
    }
}

impl WebConfig {
    pub fn home_url(&self) -> String {
        join_url(&self.base_url, &self.home_path)
    }

    pub fn login_url(&self) -> String {
        join_url(&self.base_url, &self.login_path)
    }

    pub fn register_url(&self) -> String {
        join_url(&self.base_url, &self.register_path)
    }
}

/// REST API location and default headers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub headers: BTreeMap<String, String>,
    /// Bearer token; environment only.
    #[serde(skip)]
    pub token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Self {
            base_url: "http://127.0.0.1:8000/api".to_string(),
            headers,
            token: None,
        }
    }
}

/// Pre-existing records the scenarios rely on.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Fixtures {
    pub existing_user: FixtureUser,
    pub disposable_email_domains: Vec<String>,
}

/// The fixture account that already exists in the storefront.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureUser {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    /// Environment only.
    #[serde(skip)]
    pub password: Option<String>,
}

impl FixtureUser {
    /// Login credentials for the fixture account.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the email or password is not configured.
    pub fn credentials(&self) -> Result<Credentials> {
        if self.email.is_empty() {
            return Err(Error::Config(format!(
                "fixture user email is not set (use {}FIXTURE_EMAIL)",
                ENV_PREFIX
            )));
        }
        let password = self.password.clone().ok_or_else(|| {
            Error::Config(format!(
                "fixture user password is not set (use {}FIXTURE_PASSWORD)",
                ENV_PREFIX
            ))
        })?;
        Ok(Credentials::new(self.email.clone(), password))
    }
}

/// Which Playwright browser engine to launch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl std::str::FromStr for BrowserKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(BrowserKind::Chromium),
            "firefox" => Ok(BrowserKind::Firefox),
            "webkit" => Ok(BrowserKind::Webkit),
            other => Err(Error::Config(format!("unknown browser '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub kind: BrowserKind,
    pub headless: bool,
    /// Browser distribution channel, e.g. `chrome`
    pub channel: Option<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            kind: BrowserKind::Chromium,
            headless: true,
            channel: None,
        }
    }
}

/// Per-operation deadlines, stored as milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    pub action_ms: u64,
    pub navigation_ms: u64,
    pub request_ms: u64,
    pub assertion_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            action_ms: 10_000,
            navigation_ms: 30_000,
            request_ms: 15_000,
            assertion_ms: 5_000,
        }
    }
}

impl Timeouts {
    pub fn action(&self) -> Duration {
        Duration::from_millis(self.action_ms)
    }

    pub fn navigation(&self) -> Duration {
        Duration::from_millis(self.navigation_ms)
    }

    pub fn request(&self) -> Duration {
        Duration::from_millis(self.request_ms)
    }

    pub fn assertion(&self) -> Duration {
        Duration::from_millis(self.assertion_ms)
    }
}

/// Connection settings for the cleanup database.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    /// Full connection URL; takes precedence over the discrete fields.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    /// Environment only.
    #[serde(skip)]
    pub password: Option<String>,
    pub database: String,
    pub user_table: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "127.0.0.1".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: None,
            database: "storefront".to_string(),
            user_table: "auth_user".to_string(),
        }
    }
}

impl DbConfig {
    /// Returns the connection URL, building a MySQL URL when none is set.
    ///
    /// User and password are percent-encoded.
    pub fn connection_url(&self) -> Result<String> {
        if let Some(url) = &self.url {
            return Ok(url.clone());
        }
        let unusable = |what: &str| Error::Config(format!("database {} cannot go in a URL", what));

        let mut url = Url::parse("mysql://localhost").map_err(|e| Error::Config(e.to_string()))?;
        url.set_host(Some(&self.host))
            .map_err(|e| Error::Config(format!("database host '{}': {}", self.host, e)))?;
        url.set_port(Some(self.port)).map_err(|_| unusable("port"))?;
        url.set_username(&self.user).map_err(|_| unusable("user"))?;
        url.set_password(self.password.as_deref())
            .map_err(|_| unusable("password"))?;
        url.set_path(&format!("/{}", self.database));
        Ok(url.into())
    }
}

impl SuiteConfig {
    /// Loads the config file (if any) and applies environment overrides.
    ///
    /// The file is taken from [`CONFIG_PATH_ENV`], else
    /// [`DEFAULT_CONFIG_PATH`] when it exists, else built-in defaults.
    pub fn load() -> Result<Self> {
        let config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(&path)?,
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(DEFAULT_CONFIG_PATH)?
            }
            Err(_) => Self::default(),
        };
        let config = config.with_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON config file without applying overrides.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::from(e).context(format!("reading {}", path.display())))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Applies `STOREFRONT_E2E_*` overrides looked up through `lookup`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        if let Some(url) = var("WEB_URL") {
            self.web.base_url = url;
        }
        if let Some(url) = var("API_URL") {
            self.api.base_url = url;
        }
        if let Some(token) = var("API_TOKEN") {
            self.api.token = Some(token);
        }
        if let Some(email) = var("FIXTURE_EMAIL") {
            self.fixtures.existing_user.email = email;
        }
        if let Some(password) = var("FIXTURE_PASSWORD") {
            self.fixtures.existing_user.password = Some(password);
        }
        if let Some(url) = var("DB_URL") {
            self.database.url = Some(url);
        }
        if let Some(password) = var("DB_PASSWORD") {
            self.database.password = Some(password);
        }
        if let Some(browser) = var("BROWSER") {
            self.browser.kind = browser.parse()?;
        }
        if let Some(headless) = var("HEADLESS") {
            self.browser.headless = parse_bool(&headless)?;
        }
        Ok(self)
    }

    /// Rejects configurations no scenario could run with.
    pub fn validate(&self) -> Result<()> {
        for (name, url) in [("web.base_url", &self.web.base_url), ("api.base_url", &self.api.base_url)] {
            let scheme = Url::parse(url).map(|parsed| parsed.scheme().to_string());
            if !matches!(scheme.as_deref(), Ok("http" | "https")) {
                return Err(Error::Config(format!(
                    "{} must be an http(s) URL, got '{}'",
                    name, url
                )));
            }
        }
        self.database.connection_url()?;
        if !is_plain_identifier(&self.database.user_table) {
            return Err(Error::Config(format!(
                "database.user_table '{}' is not a plain identifier",
                self.database.user_table
            )));
        }
        Ok(())
    }
}

/// Returns true for `[A-Za-z_][A-Za-z0-9_]*`.
pub(crate) fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(Error::Config(format!("expected a boolean, got '{}'", other))),
    }
}

/// Resolves `path` under `base`, keeping any path prefix `base` carries.
fn join_url(base: &str, path: &str) -> String {
    let relative = path.trim_start_matches('/');
    let joined = Url::parse(base).and_then(|mut root| {
        if !root.path().ends_with('/') {
            let dir = format!("{}/", root.path());
            root.set_path(&dir);
        }
        root.join(relative)
    });
    match joined {
        Ok(url) => url.into(),
        Err(_) => format!("{}/{}", base.trim_end_matches('/'), relative),
    }
}
