//! Login session.
//!
//! Holds the user profile and the bearer token issued by the auth API.
//! The token is kept in a `SecretString` so it never lands in logs.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use tracing::info;

use super::AuthProvider;

/// Public profile of the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Default)]
struct SessionState {
    user: Option<UserProfile>,
    token: Option<SecretString>,
}

/// Shared login state. Cheap to read from any thread.
#[derive(Default)]
pub struct Session {
    state: RwLock<SessionState>,
}

impl Session {
    /// A session with nobody logged in.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A session for a user who already holds a token.
    pub fn authenticated(user: UserProfile, token: SecretString) -> Self {
        Self {
            state: RwLock::new(SessionState {
                user: Some(user),
                token: Some(token),
            }),
        }
    }

    /// Record a successful login.
    pub fn login(&self, user: UserProfile, token: SecretString) {
        info!(user_id = %user.id, "Logged in");
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.user = Some(user);
        state.token = Some(token);
    }

    /// Forget the user and token.
    pub fn logout(&self) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        if let Some(user) = state.user.take() {
            info!(user_id = %user.id, "Logged out");
        }
        state.token = None;
    }

    /// Copy of the bearer token, if logged in.
    pub fn token(&self) -> Option<SecretString> {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        state
            .token
            .as_ref()
            .map(|t| SecretString::new(t.expose_secret().clone()))
    }
}

impl AuthProvider for Session {
    fn is_authenticated(&self) -> bool {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        state.token.is_some()
    }

    fn user(&self) -> Option<UserProfile> {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        state.user.clone()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .field("user", &self.user())
            .finish()
    }
}
