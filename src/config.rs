//! Identity and connection settings for the ApiPort service.
//!
//! The binary binds these to CLI flags with environment fallbacks:
//! - `APIPORT_API_URL` - Base URL (default: `https://api.apiport.hu`)
//! - `APIPORT_EMAIL` - Account email (required)
//! - `APIPORT_PASSWORD` - Account password (required)
//! - `VERIFY_SSL` - Set to `false` to skip TLS certificate checks
//! - `APIPORT_TIMEOUT_SECS` - Per-request timeout in seconds (default: 30)

use std::fmt;
use std::time::Duration;

use crate::client::ClientError;

/// Default ApiPort deployment.
pub const DEFAULT_API_URL: &str = "https://api.apiport.hu";

/// Upper bound on a whole request, login included.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound on establishing the TCP/TLS connection.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Immutable identity used for every login.
#[derive(Clone)]
pub struct Config {
    pub api_url: String,
    pub email: String,
    pub password: String,
    pub verify_ssl: bool,
    pub timeout: Duration,
}

// Keep the password out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_url", &self.api_url)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("verify_ssl", &self.verify_ssl)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Config {
    /// Build a configuration, failing when the identity is incomplete.
    pub fn new(
        api_url: Option<String>,
        email: Option<String>,
        password: Option<String>,
        verify_ssl: bool,
    ) -> Result<Self, ClientError> {
        let email = email.filter(|e| !e.trim().is_empty());
        let password = password.filter(|p| !p.is_empty());

        let (Some(email), Some(password)) = (email, password) else {
            return Err(ClientError::Configuration(
                "APIPORT_EMAIL and APIPORT_PASSWORD must be set".to_string(),
            ));
        };

        let api_url = api_url
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            email,
            password,
            verify_ssl,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Token endpoint used by the credential manager.
    pub fn token_url(&self) -> String {
        format!("{}/api/accounts/token/", self.api_url)
    }

    /// Prefix every domain endpoint suffix is appended to.
    pub fn tracker_url(&self) -> String {
        format!("{}/api/tracker/", self.api_url)
    }
}

/// TLS verification stays on unless `VERIFY_SSL` explicitly disables it.
pub fn verify_ssl_from_env() -> bool {
    std::env::var("VERIFY_SSL")
        .map(|v| parse_flag(&v).unwrap_or(true))
        .unwrap_or(true)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
