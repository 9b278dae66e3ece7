// crates/titanic-e2e/src/auth.rs
// ============================================================================
// Module: Credential Bootstrap
// Description: Register-or-login helper and auth endpoint wrappers.
// Purpose: Give scenarios a usable bearer token without caring whether the
//          identity already exists on the long-lived auth service.
// Dependencies: client, fixtures, serde, thiserror, tokio, tracing
// ============================================================================

//! ## Overview
//! [`obtain_token`] is the only place in the harness that recovers from an
//! unexpected response: a registration conflict falls back to an explicit
//! login. Every other failure is a hard [`AuthError`] and is never retried.
//! [`AdminBootstrap`] caches the administrator token for the lifetime of the
//! test process so the privileged identity is claimed exactly once per run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::client::ApiClient;
use crate::client::ApiResponse;
use crate::client::ClientError;
use crate::fixtures::Credentials;
use crate::fixtures::system_admin;

// ============================================================================
// SECTION: Paths
// ============================================================================

/// Registration endpoint.
pub const REGISTER_PATH: &str = "/api/auth/register";
/// Login endpoint.
pub const LOGIN_PATH: &str = "/api/auth/login";
/// Refresh endpoint.
pub const REFRESH_PATH: &str = "/api/auth/refresh";
/// Logout endpoint.
pub const LOGOUT_PATH: &str = "/api/auth/logout";
/// Caller profile endpoint.
pub const ME_PATH: &str = "/api/auth/me";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Token pair returned by register, login and refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived bearer token.
    pub access_token: String,
    /// Long-lived token used to mint new access tokens.
    pub refresh_token: String,
    /// Token kind, `bearer`.
    pub token_type: String,
    /// Access-token lifetime in seconds.
    pub expires_in: u64,
}

/// Caller profile returned by `GET /api/auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserProfile {
    /// Login name.
    pub username: String,
    /// Contact address.
    pub email: String,
    /// Whether the account is active.
    pub is_active: bool,
}

/// Failures of the credential bootstrap.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Transport failure talking to the auth surface.
    #[error(transparent)]
    Client(#[from] ClientError),
    /// Registration failed with something other than a conflict.
    #[error("registration failed for {username} with status {status}: {detail}")]
    Registration {
        /// Identity being registered.
        username: String,
        /// Response status.
        status: u16,
        /// Response detail or raw body.
        detail: String,
    },
    /// Login after a registration conflict was rejected.
    #[error("login failed during auth bootstrap for {username} with status {status}: {detail}")]
    FallbackLogin {
        /// Identity being logged in.
        username: String,
        /// Response status.
        status: u16,
        /// Response detail or raw body.
        detail: String,
    },
    /// A success response carried no access token.
    #[error("{stage} response for {username} carried no access_token")]
    MissingToken {
        /// `register` or `login`.
        stage: &'static str,
        /// Identity involved.
        username: String,
    },
}

// ============================================================================
// SECTION: Bootstrap
// ============================================================================

/// Returns an access token for `credentials`, registering the identity if it
/// does not exist yet and logging in if it does.
///
/// # Errors
///
/// Returns [`AuthError`] when registration fails for a reason other than a
/// conflict, when the fallback login is rejected, or when the token is absent.
pub async fn obtain_token(client: &ApiClient, credentials: &Credentials) -> Result<String, AuthError> {
    let registration = client.post_json(REGISTER_PATH, credentials).await?;
    if is_conflict(registration.status) {
        tracing::debug!(username = %credentials.username, "identity exists, falling back to login");
        let login = client.post_json(LOGIN_PATH, &credentials.login_body()).await?;
        if !login.is_success() {
            return Err(AuthError::FallbackLogin {
                username: credentials.username.clone(),
                status: login.status,
                detail: describe(&login),
            });
        }
        return access_token(&login, "login", &credentials.username);
    }
    if !registration.is_success() {
        return Err(AuthError::Registration {
            username: credentials.username.clone(),
            status: registration.status,
            detail: describe(&registration),
        });
    }
    access_token(&registration, "register", &credentials.username)
}

/// Process-wide administrator token.
static ADMIN_TOKEN: OnceCell<String> = OnceCell::const_new();

/// Claims (or re-enters) the fixed administrator identity once per process.
///
/// On a fresh deployment the first registered identity is promoted to admin,
/// so suites that need the elevated role call [`AdminBootstrap::token`]
/// before registering anyone else.
#[derive(Debug, Clone, Copy)]
pub struct AdminBootstrap;

impl AdminBootstrap {
    /// Returns the cached admin token, obtaining it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] when the bootstrap fails; a later call retries.
    pub async fn token(client: &ApiClient) -> Result<String, AuthError> {
        let token = ADMIN_TOKEN
            .get_or_try_init(|| async {
                let token = obtain_token(client, &system_admin()).await?;
                tracing::info!("admin token obtained");
                Ok::<String, AuthError>(token)
            })
            .await?;
        Ok(token.clone())
    }
}

// ============================================================================
// SECTION: Endpoint Wrappers
// ============================================================================

/// Raw wrappers over the auth endpoints for suites that assert on them.
#[derive(Clone, Copy)]
pub struct AuthApi<'a> {
    /// Client pointed at the gateway.
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    /// Wraps `client`.
    #[must_use]
    pub const fn new(client: &'a ApiClient) -> Self {
        Self {
            client,
        }
    }

    /// `POST /api/auth/register`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure.
    pub async fn register(&self, credentials: &Credentials) -> Result<ApiResponse, ClientError> {
        self.client.post_json(REGISTER_PATH, credentials).await
    }

    /// `POST /api/auth/login` with an explicit username and password.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure.
    pub async fn login(&self, username: &str, password: &str) -> Result<ApiResponse, ClientError> {
        self.client
            .post_json(LOGIN_PATH, &json!({"username": username, "password": password}))
            .await
    }

    /// `POST /api/auth/refresh`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure.
    pub async fn refresh(&self, refresh_token: &str) -> Result<ApiResponse, ClientError> {
        self.client.post_json(REFRESH_PATH, &json!({"refresh_token": refresh_token})).await
    }

    /// `POST /api/auth/logout` revoking `refresh_token`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure.
    pub async fn logout(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<ApiResponse, ClientError> {
        self.client
            .post_json_authed(LOGOUT_PATH, access_token, &json!({"refresh_token": refresh_token}))
            .await
    }

    /// `GET /api/auth/me`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure.
    pub async fn me(&self, access_token: &str) -> Result<ApiResponse, ClientError> {
        self.client.get_authed(ME_PATH, access_token).await
    }

    /// `PUT /api/auth/me` with a partial profile update.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure.
    pub async fn update_me(
        &self,
        access_token: &str,
        update: &serde_json::Value,
    ) -> Result<ApiResponse, ClientError> {
        self.client.put_json_authed(ME_PATH, access_token, update).await
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Registration statuses meaning "identity already exists".
const fn is_conflict(status: u16) -> bool {
    matches!(status, 400 | 409)
}

/// Extracts `access_token` from a success response.
fn access_token(
    response: &ApiResponse,
    stage: &'static str,
    username: &str,
) -> Result<String, AuthError> {
    response
        .str_field("/access_token")
        .filter(|token| !token.is_empty())
        .map(ToString::to_string)
        .ok_or_else(|| AuthError::MissingToken {
            stage,
            username: username.to_string(),
        })
}

/// Renders the `detail` field, or the raw body when there is none.
fn describe(response: &ApiResponse) -> String {
    response.detail().map_or_else(|| response.raw.clone(), ToString::to_string)
}
