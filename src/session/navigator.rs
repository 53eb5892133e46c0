// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Navigation boundary used when a session cannot be recovered.

/// Side effects the request client triggers after an unrecoverable auth failure.
pub trait Navigator: Send + Sync {
    /// Location to return to once the user has signed in again.
    fn current_location(&self) -> String;

    /// Hard navigation to the login entry point.
    fn redirect_to_login(&self, login_path: &str);

    /// User-visible notice that the session has ended.
    fn notify_session_expired(&self, message: &str);
}

/// Terminal navigator for the CLI.
#[derive(Debug, Clone)]
pub struct ConsoleNavigator {
    location: String,
}

impl ConsoleNavigator {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
        }
    }
}

impl Navigator for ConsoleNavigator {
    fn current_location(&self) -> String {
        self.location.clone()
    }

    fn redirect_to_login(&self, login_path: &str) {
        tracing::info!(login_path, from = %self.location, "Redirecting to login");
        eprintln!("Not signed in. Run `crm-calendar login` to continue.");
    }

    fn notify_session_expired(&self, message: &str) {
        tracing::warn!("Session expired");
        eprintln!("{}", message);
    }
}
