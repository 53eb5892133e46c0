// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authenticated CRM API client.
//!
//! Handles:
//! - Bearer credentials on every request
//! - One refresh-and-retry when a request comes back 401
//! - Serialized refresh so concurrent 401s share one refresh call
//! - Clearing the session and redirecting to login when recovery fails

pub mod request;

pub use request::ApiRequest;

use crate::error::{AppError, Result};
use crate::session::{Navigator, Session};
use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Token refresh endpoint (SimpleJWT).
pub const TOKEN_REFRESH_PATH: &str = "/api/token/refresh/";

/// Notice shown when the refresh token is rejected.
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

/// CRM API client with transparent token refresh.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    login_path: String,
    session: Arc<Session>,
    navigator: Arc<dyn Navigator>,
    /// Serializes refresh and logout so they run at most once per session change.
    refresh_lock: Arc<Mutex<()>>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        login_path: impl Into<String>,
        session: Arc<Session>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            login_path: login_path.into(),
            session,
            navigator,
            refresh_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ─── Authenticated requests ──────────────────────────────────────────────

    /// GET a JSON resource.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send_json(ApiRequest::get(path)).await
    }

    /// Send a request and decode the JSON response.
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let response = self.execute(request).await?;
        decode_json(response).await
    }

    /// Send a request, ignoring the response body.
    pub async fn send(&self, request: ApiRequest) -> Result<()> {
        self.execute(request).await?;
        Ok(())
    }

    /// Send a request, recovering from one expired access token.
    ///
    /// Per request:
    /// 1. Send with the stored access token (or none)
    /// 2. On 401, if this request was already retried, fail
    /// 3. Otherwise refresh the session (or end it) and send once more
    ///
    /// Any other failure is returned unchanged.
    pub async fn execute(&self, mut request: ApiRequest) -> Result<reqwest::Response> {
        loop {
            // Read the generation before the token so a refresh that lands
            // in between is seen as a change below.
            let generation = self.session.generation();
            let token = self.session.access_token();

            let response = self.dispatch(&request, token.as_deref()).await?;

            if response.status() != StatusCode::UNAUTHORIZED {
                return check_response(response).await;
            }

            if request.retried {
                tracing::warn!(
                    method = %request.method,
                    path = %request.path,
                    "Request still unauthorized after token refresh"
                );
                return Err(AppError::Unauthorized);
            }

            tracing::info!(
                method = %request.method,
                path = %request.path,
                "Received 401, attempting token refresh"
            );
            request.retried = true;
            self.recover_session(generation).await?;
        }
    }

    async fn dispatch(
        &self,
        request: &ApiRequest,
        access_token: Option<&str>,
    ) -> Result<reqwest::Response> {
        let mut builder = self
            .http
            .request(request.method.clone(), self.url(&request.path));

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        match access_token {
            Some(token) => builder = builder.bearer_auth(token),
            None => tracing::warn!(path = %request.path, "No auth token available for request"),
        }

        builder
            .send()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))
    }

    // ─── Token Management ────────────────────────────────────────────────────

    /// Refresh the access token now, through the same serialized path used
    /// after a 401.
    pub async fn refresh_session(&self) -> Result<()> {
        let generation = self.session.generation();
        self.recover_session(generation).await
    }

    /// Recover after a 401 seen at session generation `observed`.
    ///
    /// Only one task runs this at a time. A waiter that finds the
    /// generation moved on reuses the winner's result instead of refreshing
    /// again, so the refresh call, the session clear, the redirect and the
    /// notice each happen once per failure.
    async fn recover_session(&self, observed: u64) -> Result<()> {
        let _guard = self.refresh_lock.lock().await;

        if self.session.generation() != observed {
            if self.session.is_authenticated() {
                tracing::debug!("Session refreshed by another request, retrying");
                return Ok(());
            }
            tracing::debug!("Session ended by another request");
            return Err(AppError::SessionExpired);
        }

        let Some(refresh_token) = self.session.refresh_token() else {
            tracing::warn!("No refresh token available, redirecting to login");
            self.end_session(false);
            return Err(AppError::Unauthorized);
        };

        match self.request_new_access_token(&refresh_token).await {
            Ok(tokens) => {
                self.session
                    .apply_refresh(&tokens.access, tokens.refresh.as_deref())?;
                tracing::info!("Token refreshed successfully");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Token refresh failed");
                self.end_session(true);
                Err(AppError::RefreshFailed(e.to_string()))
            }
        }
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// Goes straight to the wire: no bearer header, no retry.
    async fn request_new_access_token(&self, refresh_token: &str) -> Result<TokenRefreshResponse> {
        self.post_public(
            TOKEN_REFRESH_PATH,
            &TokenRefreshRequest {
                refresh: refresh_token,
            },
        )
        .await
    }

    /// Clear credentials, remember where the user was, and send them to login.
    ///
    /// Failures here are logged but not returned; the caller reports the
    /// auth error that got us here.
    fn end_session(&self, notify: bool) {
        if let Err(e) = self.session.clear() {
            tracing::error!(error = %e, "Failed to clear session");
        }

        let location = self.navigator.current_location();
        if let Err(e) = self.session.set_redirect_after_login(&location) {
            tracing::error!(error = %e, "Failed to store redirect location");
        }

        if notify {
            self.navigator
                .notify_session_expired(SESSION_EXPIRED_MESSAGE);
        }
        self.navigator.redirect_to_login(&self.login_path);
    }

    // ─── Unauthenticated requests ────────────────────────────────────────────

    /// POST JSON without credentials or refresh handling (login, refresh).
    pub async fn post_public<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;

        let response = check_response(response).await?;
        decode_json(response).await
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("session", &self.session)
            .finish()
    }
}

#[derive(Serialize)]
struct TokenRefreshRequest<'a> {
    refresh: &'a str,
}

/// Token refresh response. `refresh` is only present when the server
/// rotates refresh tokens.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRefreshResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Check response status and return error if not successful.
async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::UNAUTHORIZED {
        return Err(AppError::Unauthorized);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::debug!(status = %status, body = %body, "API request failed");
    Err(AppError::Http {
        status: status.as_u16(),
        body,
    })
}

async fn decode_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    response
        .json()
        .await
        .map_err(|e| AppError::Decode(e.to_string()))
}
