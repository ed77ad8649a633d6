//! Access token lifecycle for the configured identity.
//!
//! The manager holds one access token at a time. A token is reused until it
//! is within [`REFRESH_MARGIN`] of its expiry; after that the next caller
//! logs in again. Logins are single-flight: callers that arrive while a
//! login is running wait for that login instead of starting their own.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex};
use tokio::time::Instant;

use super::ClientError;
use crate::config::Config;

/// Lifetime the ApiPort token endpoint grants to access tokens.
pub const TOKEN_LIFETIME: Duration = Duration::from_secs(60 * 60);

/// Tokens closer than this to expiry are treated as expired.
pub const REFRESH_MARGIN: Duration = Duration::from_secs(5 * 60);

type LoginOutcome = Result<String, ClientError>;

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access: Option<String>,
    refresh: Option<String>,
}

/// Tokens returned by a successful login.
#[derive(Debug)]
struct Session {
    access: String,
    refresh: Option<String>,
}

#[derive(Debug, Default)]
struct CredentialState {
    access: Option<String>,
    /// Captured from the login response. Renewal always goes through a full
    /// login, so this is informational only.
    refresh: Option<String>,
    expires_at: Option<Instant>,
    /// Present while a login task is running.
    in_flight: Option<watch::Receiver<Option<LoginOutcome>>>,
}

impl CredentialState {
    fn valid_access(&self, now: Instant) -> Option<&str> {
        match (&self.access, self.expires_at) {
            (Some(token), Some(expires_at)) if now + REFRESH_MARGIN < expires_at => Some(token),
            _ => None,
        }
    }

    fn store(&mut self, session: Session, minted_at: Instant) {
        self.access = Some(session.access);
        self.refresh = session.refresh;
        self.expires_at = Some(minted_at + TOKEN_LIFETIME);
    }
}

/// Point-in-time view of the held credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialStatus {
    pub held: bool,
    pub has_refresh: bool,
    /// Time left before the token expires, ignoring the refresh margin.
    pub expires_in: Option<Duration>,
}

struct Inner {
    http: Client,
    token_url: String,
    email: String,
    password: String,
    state: Mutex<CredentialState>,
}

/// Shared handle to the credential state. Cloning is cheap and every clone
/// sees the same token.
#[derive(Clone)]
pub struct CredentialManager {
    inner: Arc<Inner>,
}

impl CredentialManager {
    pub fn new(http: Client, config: &Config) -> Self {
        Self {
            inner: Arc::new(Inner {
                http,
                token_url: config.token_url(),
                email: config.email.clone(),
                password: config.password.clone(),
                state: Mutex::new(CredentialState::default()),
            }),
        }
    }

    /// Return an access token that is valid for at least [`REFRESH_MARGIN`].
    ///
    /// Logs in when no such token is held. The login runs on its own task,
    /// so dropping this future does not abandon it: the token is still
    /// stored for the next caller.
    pub async fn acquire_valid_credential(&self) -> Result<String, ClientError> {
        let mut outcome = {
            let mut state = self.inner.state.lock().await;
            if let Some(token) = state.valid_access(Instant::now()) {
                return Ok(token.to_string());
            }

            match state.in_flight.clone() {
                Some(rx) => {
                    tracing::debug!("Waiting for in-flight login");
                    rx
                }
                None => {
                    let (tx, rx) = watch::channel(None);
                    state.in_flight = Some(rx.clone());
                    tokio::spawn(Arc::clone(&self.inner).login_and_publish(tx));
                    rx
                }
            }
        };

        let result = outcome
            .wait_for(Option::is_some)
            .await
            .ok()
            .and_then(|seen| (*seen).clone());

        result.unwrap_or_else(|| {
            Err(ClientError::Authentication {
                status: None,
                message: "login task ended without a result".to_string(),
            })
        })
    }

    pub async fn status(&self) -> CredentialStatus {
        let state = self.inner.state.lock().await;
        let now = Instant::now();
        CredentialStatus {
            held: state.access.is_some(),
            has_refresh: state.refresh.is_some(),
            expires_in: state
                .expires_at
                .map(|expires_at| expires_at.saturating_duration_since(now)),
        }
    }
}

impl Inner {
    async fn login_and_publish(self: Arc<Self>, tx: watch::Sender<Option<LoginOutcome>>) {
        let result = self.login().await;
        let minted_at = Instant::now();

        let outcome = {
            let mut state = self.state.lock().await;
            state.in_flight = None;
            match result {
                Ok(session) => {
                    let access = session.access.clone();
                    state.store(session, minted_at);
                    Ok(access)
                }
                // Previous state is left exactly as it was.
                Err(e) => Err(e),
            }
        };

        tx.send_replace(Some(outcome));
    }

    async fn login(&self) -> Result<Session, ClientError> {
        let response = self
            .http
            .post(&self.token_url)
            .json(&LoginRequest {
                email: &self.email,
                password: &self.password,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable body: {}>", e));
            tracing::warn!("Login rejected with status {}", status);
            return Err(ClientError::Authentication {
                status: Some(status),
                message: format!("{}: {}", status, body),
            });
        }

        let body: LoginResponse =
            response
                .json()
                .await
                .map_err(|e| ClientError::Authentication {
                    status: Some(status),
                    message: format!("malformed token response: {}", e),
                })?;

        let access = body
            .access
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ClientError::Authentication {
                status: Some(status),
                message: "token response has no access token".to_string(),
            })?;

        tracing::info!("Successfully obtained new access token");
        Ok(Session {
            access,
            refresh: body.refresh,
        })
    }
}
