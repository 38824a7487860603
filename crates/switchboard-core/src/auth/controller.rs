//! Session controller.
//!
//! Owns the reactive [`AuthState`] and writes every session change through
//! to the [`SessionCache`]. The in-memory state is the single source of
//! truth; the cache is only read once, at construction.

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::{AuthClient, AuthError, LoginResponse, SessionInfo};
use crate::request_id::RequestGate;
use crate::session::{Session, User};
use crate::storage::SessionCache;
use crate::store::Store;

/// Reactive authentication view read by the host UI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub session: Session,
    /// True while a login or logout is in progress.
    pub loading: bool,
    /// Message of the last failed login, for display.
    pub error: Option<String>,
}

/// Login, logout and session validation against the auth API.
#[derive(Debug)]
pub struct AuthController {
    client: AuthClient,
    cache: SessionCache,
    state: Store<AuthState>,
    requests: RequestGate,
}

impl AuthController {
    /// Creates the controller, restoring any cached session.
    pub fn new(client: AuthClient, cache: SessionCache) -> Self {
        let session = match cache.load() {
            Some(credentials) => {
                debug!(username = %credentials.user.username, "restored cached session");
                Session::authenticated(credentials.token, credentials.user)
            }
            None => Session::anonymous(),
        };

        Self {
            client,
            cache,
            state: Store::new(AuthState {
                session,
                ..AuthState::default()
            }),
            requests: RequestGate::default(),
        }
    }

    pub fn client(&self) -> &AuthClient {
        &self.client
    }

    pub fn state(&self) -> AuthState {
        self.state.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn session(&self) -> Session {
        self.state.with(|s| s.session.clone())
    }

    pub fn token(&self) -> Option<String> {
        self.state.with(|s| s.session.token().map(str::to_string))
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.with(|s| s.session.is_authenticated())
    }

    pub fn is_admin(&self) -> bool {
        self.state.with(|s| s.session.is_admin())
    }

    /// Authenticates and stores the session.
    ///
    /// On failure the previous session is kept and `error` is set. `loading`
    /// is cleared on every outcome except a superseded response, whose
    /// successor owns the flag.
    ///
    /// # Errors
    /// `InvalidCredentials`, `Network`, or `Superseded` when a logout or a
    /// newer login started while this request was in flight.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, AuthError> {
        let ticket = self.requests.begin();
        self.state.update(|s| {
            s.loading = true;
            s.error = None;
        });

        let result = self.client.login(username, password).await;

        if !self.requests.is_active(ticket) {
            debug!(username, "discarding superseded login response");
            return Err(AuthError::Superseded);
        }

        match result {
            Ok(response) => {
                let user = response.user();
                if let Err(e) = self.cache.save(&response.token, &user) {
                    warn!("failed to persist session: {e:#}");
                }
                let session = Session::authenticated(response.token.clone(), user);
                self.state.update(|s| {
                    s.session = session;
                    s.loading = false;
                });
                info!(username = %response.username, role = %response.ruolo, "logged in");
                Ok(response)
            }
            Err(e) => {
                debug!(username, "login failed: {e}");
                self.state.update(|s| {
                    s.error = Some(e.to_string());
                    s.loading = false;
                });
                Err(e)
            }
        }
    }

    /// Ends the session. Never fails; server errors are only logged.
    ///
    /// The local session is cleared before the server is notified, so a
    /// login that starts during the notification is not undone by it.
    pub async fn logout(&self) {
        self.requests.cancel();
        let ticket = self.requests.begin();
        let token = self.token();

        if let Err(e) = self.cache.clear() {
            warn!("failed to clear stored session: {e:#}");
        }
        self.state.update(|s| {
            s.session = Session::anonymous();
            s.loading = true;
        });

        if let Some(token) = token
            && let Err(e) = self.client.logout(&token).await
        {
            warn!("logout notification failed: {e}");
        }

        // A newer login owns the loading flag.
        if self.requests.is_active(ticket) {
            self.state.update(|s| s.loading = false);
        }
        info!("logged out");
    }

    /// Validates the current token with the server.
    ///
    /// Returns false without side effects when there is no token. A rejected
    /// token or a network failure forces a logout, unless the session was
    /// replaced while the check was in flight.
    pub async fn check_session(&self) -> bool {
        let Some(token) = self.token() else {
            return false;
        };

        match self.client.session(&token).await {
            Ok(info) => {
                if let Some(user) = info.as_ref().and_then(SessionInfo::user) {
                    self.refresh_user(&token, user);
                }
                true
            }
            Err(e) => {
                if self.token().as_deref() != Some(token.as_str()) {
                    debug!("ignoring failed check of a replaced session: {e}");
                    return false;
                }
                warn!("session check failed: {e}");
                self.logout().await;
                false
            }
        }
    }

    /// Lists active sessions (admin).
    ///
    /// # Errors
    /// `SessionExpired` when not logged in or the token is rejected, which
    /// also forces a logout; other client errors are returned unchanged.
    pub async fn active_sessions(&self) -> Result<Vec<SessionInfo>, AuthError> {
        let token = self.token().ok_or(AuthError::SessionExpired)?;
        let result = self.client.active_sessions(&token).await;
        self.logout_if_expired(result).await
    }

    /// Ends every session of `user_id` (admin).
    ///
    /// # Errors
    /// Same as [`AuthController::active_sessions`].
    pub async fn invalidate_user(&self, user_id: i64) -> Result<(), AuthError> {
        let token = self.token().ok_or(AuthError::SessionExpired)?;
        let result = self.client.invalidate_user(&token, user_id).await;
        self.logout_if_expired(result).await
    }

    async fn logout_if_expired<T>(&self, result: Result<T, AuthError>) -> Result<T, AuthError> {
        if matches!(result, Err(AuthError::SessionExpired)) {
            self.logout().await;
        }
        result
    }

    /// Writes a newer profile for the same token through to state and cache.
    fn refresh_user(&self, token: &str, user: User) {
        let changed = self
            .state
            .with(|s| s.session.token() == Some(token) && s.session.user() != Some(&user));
        if !changed {
            return;
        }

        if let Err(e) = self.cache.save(token, &user) {
            warn!("failed to persist refreshed profile: {e:#}");
        }
        debug!(username = %user.username, "refreshed user profile");
        self.state
            .update(|s| s.session = Session::authenticated(token, user));
    }
}
