//! Secure credential handling using the secrecy crate
//!
//! Passwords taken from the command line are wrapped in a [`SecretString`]
//! until they are handed to the CLI-arguments source. The wrapper zeroes its
//! memory on drop and redacts itself in `Debug` output.
//!
//! # Example
//!
//! ```rust
//! use conflux::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let password = secret_string("my-password".to_string());
//! assert_eq!(password.expose_secret().as_ref(), "my-password");
//! assert!(!format!("{password:?}").contains("my-password"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret};
use std::str::FromStr;
use zeroize::Zeroize;

/// Newtype wrapper for String that implements the required traits for Secret
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SecretValue {
    /// Check if the secret value is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A string held in a zeroizing, debug-redacting container
pub type SecretString = Secret<SecretValue>;

/// Wraps a String in a [`SecretString`]
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

/// Wraps an optional String in an optional [`SecretString`]
#[inline]
pub fn secret_string_opt(value: Option<String>) -> Option<SecretString> {
    value.map(secret_string)
}

/// Parser for clap arguments that must not linger in plain memory
///
/// # Errors
///
/// Never fails; the signature matches clap's value parser contract.
pub fn parse_secret(value: &str) -> Result<SecretString, std::convert::Infallible> {
    Ok(secret_string(value.to_string()))
}

/// Wrapper used by clap to parse a secret
#[derive(Clone, Debug)]
pub struct SecretArg(pub SecretString);

impl FromStr for SecretArg {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_secret(s).map(SecretArg)
    }
}
