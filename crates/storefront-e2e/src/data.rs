// Test data - Random emails, passwords, names and fixture records
//
// Emails are made unique by the wall clock (millisecond resolution).
// Passwords satisfy the storefront's policy: at least one uppercase,
// lowercase, digit and special character.

use crate::error::{Error, Result};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Domain used by [`generate_random_email`] when none is given.
pub const DEFAULT_EMAIL_DOMAIN: &str = "test.com";

/// Password length used by [`generate_random_password`] callers by default.
pub const DEFAULT_PASSWORD_LENGTH: usize = 12;

/// Smallest length that fits one character of every required class.
pub const MIN_PASSWORD_LENGTH: usize = 4;

pub const UPPERCASE_CHARS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const LOWERCASE_CHARS: &str = "abcdefghijklmnopqrstuvwxyz";
pub const DIGIT_CHARS: &str = "0123456789";
pub const SPECIAL_CHARS: &str = "!@#$%^&*?";

pub const FIRST_NAMES: [&str; 10] = [
    "John", "Jane", "Alice", "Bob", "Charlie", "David", "Emily", "Frank", "Grace", "Hannah",
];

pub const LAST_NAMES: [&str; 10] = [
    "Doe", "Smith", "Johnson", "Williams", "Brown", "Davis", "Miller", "Wilson", "Moore", "Taylor",
];

/// Email and password pair submitted to a login form or endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Values typed into the registration form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationData {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegistrationData {
    /// Registration whose confirmation matches the password.
    pub fn matching(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let password = password.into();
        Self {
            name: name.into(),
            email: email.into(),
            confirm_password: password.clone(),
            password,
        }
    }

    /// Registration whose confirmation differs from the password.
    pub fn mismatched(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            confirm_password: confirm_password.into(),
        }
    }

    pub fn passwords_match(&self) -> bool {
        self.password == self.confirm_password
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.email.clone(), self.password.clone())
    }
}

/// Returns `user<unix-millis>@<domain>`.
pub fn generate_random_email(domain: &str) -> String {
    generate_random_email_at(domain, SystemTime::now())
}

/// Same as [`generate_random_email`] with an explicit clock reading.
///
/// Times before the Unix epoch collapse to `user0@<domain>`.
pub fn generate_random_email_at(domain: &str, now: SystemTime) -> String {
    let millis = now
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    format!("user{}@{}", millis, domain)
}

/// Picks a random disposable domain and builds an email on it.
///
/// Returns `None` when `domains` is empty.
pub fn generate_disposable_email(domains: &[String]) -> Option<String> {
    let domain = domains.choose(&mut rand::thread_rng())?;
    Some(generate_random_email(domain))
}

/// Generates a password of exactly `length` characters satisfying the policy.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] when `length` is below
/// [`MIN_PASSWORD_LENGTH`].
pub fn generate_random_password(length: usize) -> Result<String> {
    generate_random_password_with(&mut rand::thread_rng(), length)
}

/// [`generate_random_password`] driven by a caller-supplied RNG.
pub fn generate_random_password_with<R: Rng>(rng: &mut R, length: usize) -> Result<String> {
    if length < MIN_PASSWORD_LENGTH {
        return Err(Error::InvalidArgument(format!(
            "password length {} cannot hold one character of each of the {} required classes",
            length, MIN_PASSWORD_LENGTH
        )));
    }

    let classes = [UPPERCASE_CHARS, LOWERCASE_CHARS, DIGIT_CHARS, SPECIAL_CHARS];
    let all: Vec<char> = classes.iter().flat_map(|c| c.chars()).collect();

    let mut password: Vec<char> = Vec::with_capacity(length);
    for class in classes {
        password.push(pick(rng, class));
    }
    while password.len() < length {
        password.push(all[rng.gen_range(0..all.len())]);
    }

    password.shuffle(rng);
    Ok(password.into_iter().collect())
}

fn pick<R: Rng>(rng: &mut R, chars: &str) -> char {
    let chars: Vec<char> = chars.chars().collect();
    chars[rng.gen_range(0..chars.len())]
}

/// Returns `"<first> <last>"` drawn from [`FIRST_NAMES`] and [`LAST_NAMES`].
pub fn generate_random_name() -> String {
    let mut rng = rand::thread_rng();
    let first = FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())];
    let last = LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())];
    format!("{} {}", first, last)
}

/// Fresh credentials on [`DEFAULT_EMAIL_DOMAIN`].
pub fn generate_credentials() -> Result<Credentials> {
    Ok(Credentials::new(
        generate_random_email(DEFAULT_EMAIL_DOMAIN),
        generate_random_password(DEFAULT_PASSWORD_LENGTH)?,
    ))
}

/// A happy-path registration with generated name, email and password.
pub fn generate_registration() -> Result<RegistrationData> {
    let credentials = generate_credentials()?;
    Ok(RegistrationData::matching(
        generate_random_name(),
        credentials.email,
        credentials.password,
    ))
}

/// Returns true when `password` has every required character class.
pub fn satisfies_password_policy(password: &str, min_length: usize) -> bool {
    password.chars().count() >= min_length
        && password.chars().any(|c| UPPERCASE_CHARS.contains(c))
        && password.chars().any(|c| LOWERCASE_CHARS.contains(c))
        && password.chars().any(|c| DIGIT_CHARS.contains(c))
        && password.chars().any(|c| SPECIAL_CHARS.contains(c))
}
