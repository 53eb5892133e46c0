// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_LOGIN_PATH: &str = "/login";
const DEFAULT_SESSION_FILE: &str = "crm-calendar-session.json";

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the CRM backend
    pub api_url: String,
    /// Login entry point used when the session cannot be recovered
    pub login_path: String,
    /// Where tokens and the post-login redirect are persisted
    pub session_file: PathBuf,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is read first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let api_url = env::var("CRM_API_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                var: "CRM_API_URL",
                reason: format!("expected an http(s) URL, got {:?}", api_url),
            });
        }

        Ok(Self {
            api_url,
            login_path: env::var("CRM_LOGIN_PATH")
                .unwrap_or_else(|_| DEFAULT_LOGIN_PATH.to_string()),
            session_file: env::var("CRM_SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_SESSION_FILE)),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}
