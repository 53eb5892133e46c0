// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client error types.

/// Errors surfaced by the CRM calendar client.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A required field is missing or malformed; no request was sent.
    #[error("Invalid request: {0}")]
    Validation(String),

    /// The request never produced a response.
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    /// Another request already ended the session while this one waited.
    #[error("Session expired")]
    SessionExpired,

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Session storage error: {0}")]
    Storage(String),
}

impl AppError {
    /// True when the failure means the user has to sign in again.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            AppError::Unauthorized
                | AppError::InvalidToken
                | AppError::RefreshFailed(_)
                | AppError::SessionExpired
        )
    }

    /// HTTP status returned by the server, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Unauthorized => Some(401),
            AppError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, AppError>;
