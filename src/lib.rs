// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! CRM Calendar: client for the CRM calendar API
//!
//! This crate lists, shows and edits calendar events and their participants
//! over the CRM REST API, refreshing expired access tokens transparently.

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod session;
pub mod time_utils;
pub mod views;

use client::ApiClient;
use config::Config;
use services::{AuthService, CalendarService};
use session::{Navigator, Session, TokenStore};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub session: Arc<Session>,
    pub calendar: CalendarService,
    pub auth: AuthService,
}

impl AppState {
    /// Wire the services to one session and one HTTP client.
    pub fn new(config: Config, store: Arc<dyn TokenStore>, navigator: Arc<dyn Navigator>) -> Self {
        let session = Arc::new(Session::new(store));
        let client = ApiClient::new(
            config.api_url.clone(),
            config.login_path.clone(),
            session.clone(),
            navigator,
        );

        Self {
            config,
            session,
            calendar: CalendarService::new(client.clone()),
            auth: AuthService::new(client),
        }
    }
}
