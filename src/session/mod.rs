// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session state: tokens, user identity, and the post-login redirect.

pub mod navigator;
pub mod store;

pub use navigator::{ConsoleNavigator, Navigator};
pub use store::{FileStore, MemoryStore, TokenStore};

use crate::error::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Storage keys as constants.
pub mod keys {
    pub const ACCESS_TOKEN: &str = "access_token";
    pub const REFRESH_TOKEN: &str = "refresh_token";
    pub const USER_ID: &str = "user_id";
    /// One-shot location to return to after the next login
    pub const REDIRECT_AFTER_LOGIN: &str = "redirect_after_login";
}

/// Typed view over a [`TokenStore`].
///
/// Every credential change bumps a generation counter. The request client
/// compares generations to tell whether another request already refreshed
/// or cleared the session while it was waiting.
pub struct Session {
    store: Arc<dyn TokenStore>,
    generation: AtomicU64,
}

impl Session {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self {
            store,
            generation: AtomicU64::new(0),
        }
    }

    /// Session backed by a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn access_token(&self) -> Option<String> {
        self.store.get(keys::ACCESS_TOKEN)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.store.get(keys::REFRESH_TOKEN)
    }

    pub fn user_id(&self) -> Option<String> {
        self.store.get(keys::USER_ID)
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Store a full credential pair, as issued at login.
    ///
    /// Any stored user id belonged to the previous pair and is dropped; the
    /// caller sets the new one once it is known.
    pub fn set_tokens(&self, access_token: &str, refresh_token: &str) -> Result<()> {
        let result = self
            .store
            .set_many(&[
                (keys::ACCESS_TOKEN, access_token),
                (keys::REFRESH_TOKEN, refresh_token),
            ])
            .and_then(|()| self.store.remove(keys::USER_ID));
        self.bump();
        result
    }

    /// Apply the result of a token refresh. The refresh token is only
    /// replaced when the server rotated it.
    pub fn apply_refresh(&self, access_token: &str, refresh_token: Option<&str>) -> Result<()> {
        match refresh_token {
            Some(refresh_token) => self.store.set_many(&[
                (keys::ACCESS_TOKEN, access_token),
                (keys::REFRESH_TOKEN, refresh_token),
            ])?,
            None => self.store.set(keys::ACCESS_TOKEN, access_token)?,
        }
        self.bump();
        Ok(())
    }

    pub fn set_user_id(&self, user_id: &str) -> Result<()> {
        self.store.set(keys::USER_ID, user_id)
    }

    /// Drop both tokens and the user identity.
    pub fn clear(&self) -> Result<()> {
        let result =
            self.store
                .remove_all(&[keys::ACCESS_TOKEN, keys::REFRESH_TOKEN, keys::USER_ID]);
        self.bump();
        result
    }

    pub fn set_redirect_after_login(&self, location: &str) -> Result<()> {
        self.store.set(keys::REDIRECT_AFTER_LOGIN, location)
    }

    /// Return and forget the pending post-login redirect.
    pub fn take_redirect_after_login(&self) -> Result<Option<String>> {
        let location = self.store.get(keys::REDIRECT_AFTER_LOGIN);
        if location.is_some() {
            self.store.remove(keys::REDIRECT_AFTER_LOGIN)?;
        }
        Ok(location)
    }

    fn bump(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print token values.
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .field("generation", &self.generation())
            .finish()
    }
}
