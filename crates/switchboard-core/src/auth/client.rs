//! HTTP client for the `/api/auth` endpoints.
//!
//! Transport is a bearer token: every authenticated call sends
//! `Authorization: Bearer <token>`.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::AuthError;
use crate::config::Config;
use crate::session::{Role, User};

/// Standard User-Agent header for switchboard requests.
pub const USER_AGENT: &str = concat!("switchboard/", env!("CARGO_PKG_VERSION"));

const LOGIN_PATH: &str = "/api/auth/login";
const LOGOUT_PATH: &str = "/api/auth/logout";
const SESSION_PATH: &str = "/api/auth/session";
const SESSIONS_PATH: &str = "/api/auth/sessions";
const INVALIDATE_PATH: &str = "/api/auth/invalidate";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Successful login payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user_id: i64,
    pub username: String,
    pub ruolo: Role,
}

impl LoginResponse {
    /// The profile persisted under `auth_user`.
    pub fn user(&self) -> User {
        User {
            id: self.user_id,
            username: self.username.clone(),
            role: self.ruolo.clone(),
        }
    }
}

/// Server-side session record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionInfo {
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub ruolo: Option<Role>,
    pub attiva: bool,
    pub created_at: Option<String>,
}

impl SessionInfo {
    /// The user profile, when the record carries all of it.
    pub fn user(&self) -> Option<User> {
        Some(User {
            id: self.user_id?,
            username: self.username.clone()?,
            role: self.ruolo.clone()?,
        })
    }
}

/// Client for the console auth API.
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
}

impl AuthClient {
    /// Creates a client without a request timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Builds a client from configuration (base URL and timeout).
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        let base_url = config.resolve_api_base_url()?;
        Self::with_timeout(base_url, config.request_timeout())
    }

    /// Creates a client with an optional per-request timeout.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `POST /api/auth/login`.
    ///
    /// # Errors
    /// `InvalidCredentials` on any non-success status, `Network` on transport
    /// or decode failure.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, AuthError> {
        let response = self
            .http
            .post(self.url(LOGIN_PATH))
            .header("accept", "application/json")
            .json(&LoginRequest { username, password })
            .send()
            .await
            .map_err(|e| AuthError::from_reqwest(&e))?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        response
            .json::<LoginResponse>()
            .await
            .map_err(|e| AuthError::from_reqwest(&e))
    }

    /// `POST /api/auth/logout`.
    ///
    /// # Errors
    /// `Network` on transport failure, `Rejected` on a non-success status.
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        let response = self
            .http
            .post(self.url(LOGOUT_PATH))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AuthError::from_reqwest(&e))?;

        check_status(response.status())
    }

    /// `GET /api/auth/session`.
    ///
    /// Returns the session record if the body could be decoded; a valid
    /// session with an empty or unfamiliar body yields `Ok(None)`.
    ///
    /// # Errors
    /// `SessionExpired` on 401/403, `Rejected` on other failures, `Network`
    /// on transport failure.
    pub async fn session(&self, token: &str) -> Result<Option<SessionInfo>, AuthError> {
        let response = self
            .http
            .get(self.url(SESSION_PATH))
            .header("accept", "application/json")
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AuthError::from_reqwest(&e))?;

        check_status(response.status())?;

        let body = response
            .text()
            .await
            .map_err(|e| AuthError::from_reqwest(&e))?;
        Ok(serde_json::from_str(&body).ok())
    }

    /// `GET /api/auth/sessions`: active sessions across all users.
    ///
    /// # Errors
    /// Same classification as [`AuthClient::session`]; a body that is not a
    /// session list is a `Network` error.
    pub async fn active_sessions(&self, token: &str) -> Result<Vec<SessionInfo>, AuthError> {
        let response = self
            .http
            .get(self.url(SESSIONS_PATH))
            .header("accept", "application/json")
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AuthError::from_reqwest(&e))?;

        check_status(response.status())?;

        response
            .json::<Vec<SessionInfo>>()
            .await
            .map_err(|e| AuthError::from_reqwest(&e))
    }

    /// `POST /api/auth/invalidate/{userId}`: ends every session of a user.
    ///
    /// # Errors
    /// Same classification as [`AuthClient::session`].
    pub async fn invalidate_user(&self, token: &str, user_id: i64) -> Result<(), AuthError> {
        let response = self
            .http
            .post(self.url(&format!("{INVALIDATE_PATH}/{user_id}")))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AuthError::from_reqwest(&e))?;

        check_status(response.status())
    }
}

fn check_status(status: StatusCode) -> Result<(), AuthError> {
    if status.is_success() {
        Ok(())
    } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        Err(AuthError::SessionExpired)
    } else {
        Err(AuthError::Rejected(status.as_u16()))
    }
}
