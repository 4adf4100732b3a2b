//! Pushover credentials and inbound bearer-token verification.
//!
//! The relay holds exactly two secrets, both read from the process
//! environment at startup:
//!
//! | Variable | Use |
//! |----------|-----|
//! | `PUSHOVER_USER_KEY` | Recipient of every notification |
//! | `PUSHOVER_API_TOKEN` | Pushover application token, and the bearer token callers must present |
//!
//! Neither has a default. The API token doubles as the inbound credential, so
//! the FluxCD `Provider` secret and the Pushover application token are the
//! same value.

use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Environment variable holding the Pushover user key.
pub const USER_KEY_VAR: &str = "PUSHOVER_USER_KEY";

/// Environment variable holding the Pushover application token.
pub const API_TOKEN_VAR: &str = "PUSHOVER_API_TOKEN";

/// Credential loading errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialsError {
    #[error("Pushover user key or API token is not configured: {variable} is missing or empty")]
    Missing { variable: &'static str },
}

/// The Pushover user key and application token.
///
/// Both values are wiped from memory on drop and never appear in `Debug`
/// output.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    user_key: String,
    api_token: String,
}

impl Credentials {
    /// Construct credentials from explicit values.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialsError::Missing`] when either value is empty.
    pub fn new(
        user_key: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Result<Self, CredentialsError> {
        let user_key = user_key.into();
        let api_token = api_token.into();

        if user_key.is_empty() {
            return Err(CredentialsError::Missing {
                variable: USER_KEY_VAR,
            });
        }
        if api_token.is_empty() {
            return Err(CredentialsError::Missing {
                variable: API_TOKEN_VAR,
            });
        }

        Ok(Self {
            user_key,
            api_token,
        })
    }

    /// Load credentials from `PUSHOVER_USER_KEY` and `PUSHOVER_API_TOKEN`.
    pub fn from_env() -> Result<Self, CredentialsError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load credentials through an arbitrary variable lookup.
    ///
    /// Used by [`Credentials::from_env`] and by tests that must not touch the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CredentialsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let user_key = lookup(USER_KEY_VAR).unwrap_or_default();
        let api_token = lookup(API_TOKEN_VAR).unwrap_or_default();
        Self::new(user_key, api_token)
    }

    pub fn user_key(&self) -> &str {
        &self.user_key
    }

    pub fn api_token(&self) -> &str {
        &self.api_token
    }

    /// Check an `Authorization` header value against `Bearer <api_token>`.
    ///
    /// The comparison is exact (scheme is case-sensitive, no trimming) and
    /// runs in constant time for equal-length inputs.
    pub fn authorizes(&self, authorization: Option<&str>) -> bool {
        let Some(presented) = authorization else {
            return false;
        };

        let mut expected = format!("Bearer {}", self.api_token);
        let matches: bool = presented.as_bytes().ct_eq(expected.as_bytes()).into();
        expected.zeroize();
        matches
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user_key", &"<REDACTED>")
            .field("api_token", &"<REDACTED>")
            .finish()
    }
}

#[cfg(test)]
#[path = "credentials_tests.rs"]
mod tests;
