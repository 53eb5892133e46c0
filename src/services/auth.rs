// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sign-in, sign-out, and session restore.

use crate::client::ApiClient;
use crate::error::{AppError, Result};
use crate::models::RecordId;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, decode_header, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Token obtain endpoint.
pub const TOKEN_OBTAIN_PATH: &str = "/api/token/";
/// Current user endpoint.
pub const CURRENT_USER_PATH: &str = "/api/users/me/";

/// Access token claims the client cares about.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    /// Expiration time (Unix timestamp)
    #[serde(default)]
    pub exp: Option<i64>,
    /// Subject user id, as issued by SimpleJWT
    #[serde(default)]
    pub user_id: Option<RecordId>,
}

/// Read the claims of an access token.
///
/// The signature is not checked: the client cannot verify it and only uses
/// the claims to decide when to refresh. The server stays authoritative.
pub fn decode_claims(token: &str) -> Result<Claims> {
    let header = decode_header(token).map_err(|_| AppError::InvalidToken)?;

    let mut validation = Validation::new(header.alg);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|_| AppError::InvalidToken)
}

/// Expiry of an access token, if it carries one.
pub fn token_expiry(token: &str) -> Result<Option<DateTime<Utc>>> {
    let claims = decode_claims(token)?;
    Ok(claims.exp.and_then(|exp| DateTime::from_timestamp(exp, 0)))
}

/// True when the token is past its expiry. Undecodable tokens count as expired.
pub fn is_token_expired(token: &str, now: DateTime<Utc>) -> bool {
    match token_expiry(token) {
        Ok(Some(expires_at)) => expires_at <= now,
        Ok(None) => false,
        Err(_) => true,
    }
}

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenPair {
    access: String,
    refresh: String,
}

#[derive(Deserialize)]
struct CurrentUser {
    id: RecordId,
}

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginOutcome {
    pub user_id: RecordId,
    /// Where the user was when the previous session ended, if anywhere
    pub redirect_to: Option<String>,
}

/// Session lifecycle on top of [`ApiClient`].
#[derive(Debug, Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Exchange credentials for a token pair and start a session.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome> {
        let pair: TokenPair = self
            .client
            .post_public(TOKEN_OBTAIN_PATH, &Credentials { username, password })
            .await?;

        let session = self.client.session();
        session.set_tokens(&pair.access, &pair.refresh)?;

        let user_id = match self.establish_user(&pair.access).await {
            Ok(user_id) => user_id,
            Err(e) => {
                tracing::warn!(error = %e, "Login incomplete, discarding new tokens");
                if let Err(clear_err) = session.clear() {
                    tracing::error!(error = %clear_err, "Failed to clear session");
                }
                return Err(e);
            }
        };

        let redirect_to = session.take_redirect_after_login()?;
        tracing::info!(user_id = %user_id, "Logged in");

        Ok(LoginOutcome {
            user_id,
            redirect_to,
        })
    }

    /// Resolve and store the user id for a freshly stored token pair.
    async fn establish_user(&self, access_token: &str) -> Result<RecordId> {
        let user_id = match decode_claims(access_token).ok().and_then(|c| c.user_id) {
            Some(id) => id,
            None => {
                let me: CurrentUser = self.client.get_json(CURRENT_USER_PATH).await?;
                me.id
            }
        };
        self.client.session().set_user_id(user_id.as_str())?;
        Ok(user_id)
    }

    pub fn logout(&self) -> Result<()> {
        self.client.session().clear()?;
        tracing::info!("Logged out");
        Ok(())
    }

    /// Check the stored session at startup.
    ///
    /// An expired access token is refreshed when a refresh token is
    /// available; otherwise the session is dropped. Returns whether a usable
    /// session remains.
    pub async fn restore_session(&self) -> Result<bool> {
        let session = self.client.session();
        let Some(token) = session.access_token() else {
            return Ok(false);
        };

        if !is_token_expired(&token, Utc::now()) {
            return Ok(true);
        }

        if session.refresh_token().is_none() {
            tracing::info!("Access token expired and no refresh token stored");
            self.logout()?;
            return Ok(false);
        }

        match self.client.refresh_session().await {
            Ok(()) => Ok(true),
            Err(e) if e.is_auth_error() => {
                tracing::warn!(error = %e, "Could not restore session");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Restore the session, failing with `Unauthorized` when none remains.
    ///
    /// Commands that need credentials call this first so an ended session
    /// is reported once instead of again by the first request.
    pub async fn require_session(&self) -> Result<()> {
        if self.restore_session().await? {
            Ok(())
        } else {
            Err(AppError::Unauthorized)
        }
    }
}
