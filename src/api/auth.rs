//! Registration, login and token lifecycle
//!
//! Every successful auth call that returns a token stores it in the local
//! store under [`TOKEN_KEY`] and clears the response cache, so nothing cached
//! for a previous identity is served to the new one.

use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, error};

use super::UserApi;
use crate::cache::ResponseCache;
use crate::error::ApiError;
use crate::http::HttpClient;
use crate::models::{AuthResponse, Credentials, RegistrationRequest, Role};
use crate::storage::{LocalStore, TOKEN_KEY};
use crate::validation::{LoginForm, SignupForm};

/// Shown when a login is rejected without a server message
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed";

/// Shown when signup fails without a server message
pub const SIGNUP_FAILED_MESSAGE: &str = "Failed to create account. Please try again.";

/// Shown when Google sign-in is rejected without a server message
pub const GOOGLE_AUTH_FAILED_MESSAGE: &str = "Google authentication failed";

/// Auth endpoints
#[derive(Clone)]
pub struct AuthApi {
    http: HttpClient,
    cache: Arc<ResponseCache>,
    store: Arc<dyn LocalStore>,
    users: UserApi,
}

impl std::fmt::Debug for AuthApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthApi").field("http", &self.http).finish()
    }
}

impl AuthApi {
    pub(crate) fn new(
        http: HttpClient,
        cache: Arc<ResponseCache>,
        store: Arc<dyn LocalStore>,
        users: UserApi,
    ) -> Self {
        Self {
            http,
            cache,
            store,
            users,
        }
    }

    /// Creates an account for `role`
    pub async fn register(
        &self,
        request: &RegistrationRequest,
        role: Role,
    ) -> Result<AuthResponse, ApiError> {
        self.authenticate(&["auth", "register", role.as_str()], request)
            .await
            .inspect_err(|e| error!(%role, error = %e, "error registering user"))
    }

    /// Signs in with email and password
    pub async fn login(
        &self,
        credentials: &Credentials,
        role: Role,
    ) -> Result<AuthResponse, ApiError> {
        self.authenticate(&["auth", "login", role.as_str()], credentials)
            .await
            .inspect_err(|e| error!(%role, error = %e, "error logging in"))
    }

    /// Exchanges a Google token response for a session
    ///
    /// # Arguments
    /// * `token_response` - The object returned by Google sign-in, sent as-is
    /// * `role` - Role to sign in as; added to the payload as `role`
    pub async fn google_auth(
        &self,
        token_response: Map<String, Value>,
        role: Role,
    ) -> Result<AuthResponse, ApiError> {
        let mut body = token_response;
        body.insert("role".to_string(), Value::from(role.as_str()));

        self.authenticate(&["auth", "google"], &body)
            .await
            .inspect_err(|e| error!(%role, error = %e, "error authenticating with Google"))
    }

    /// Signs out: drops every cached response and the stored token
    pub fn logout(&self) -> Result<(), ApiError> {
        self.cache.clear();
        self.store.remove(TOKEN_KEY)?;
        debug!("signed out");
        Ok(())
    }

    /// Whether a token is currently stored
    pub fn is_signed_in(&self) -> Result<bool, ApiError> {
        Ok(self
            .store
            .get(TOKEN_KEY)?
            .is_some_and(|token| !token.is_empty()))
    }

    /// Validates a talent signup form, checks the email is free, then registers
    pub async fn signup_talent(&self, form: &SignupForm) -> Result<AuthResponse, ApiError> {
        let request = form.to_registration()?;

        let check = self.users.check_user_exists(&request.email, Role::Talent).await?;
        if check.exists {
            return Err(ApiError::EmailTaken);
        }

        self.register(&request, Role::Talent).await
    }

    /// Validates a login form and signs in
    ///
    /// A 2xx answer with `success: false` becomes [`ApiError::Rejected`]
    /// carrying the server's message, or "Login failed" without one.
    pub async fn sign_in(&self, form: &LoginForm) -> Result<AuthResponse, ApiError> {
        let credentials = form.to_credentials()?;
        let response = self.login(&credentials, form.role).await?;
        require_success(response, LOGIN_FAILED_MESSAGE)
    }

    /// Google sign-in that treats `success: false` as a failure
    ///
    /// The rejection carries the server's message, or "Google authentication
    /// failed" without one.
    pub async fn sign_in_with_google(
        &self,
        token_response: Map<String, Value>,
        role: Role,
    ) -> Result<AuthResponse, ApiError> {
        let response = self.google_auth(token_response, role).await?;
        require_success(response, GOOGLE_AUTH_FAILED_MESSAGE)
    }

    async fn authenticate<B: serde::Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<AuthResponse, ApiError> {
        let response: AuthResponse = self.http.post_json(segments, body).await?.json()?;

        if let Some(token) = response.token.as_deref().filter(|t| !t.is_empty()) {
            self.store.set(TOKEN_KEY, token)?;
            self.cache.clear();
            debug!("stored new auth token");
        }

        Ok(response)
    }
}

/// Turns a 2xx auth answer with `success: false` into [`ApiError::Rejected`]
fn require_success(response: AuthResponse, fallback: &str) -> Result<AuthResponse, ApiError> {
    if response.success {
        return Ok(response);
    }

    let message = response
        .message
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| fallback.to_string());
    Err(ApiError::Rejected(message))
}
