use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::client::{api::ApiClient, error::ClientError, store::TokenStore};
use crate::models::{
    account::{AccountView, ProfileUpdate},
    auth::{ChangePasswordRequest, LoginRequest, RegisterRequest},
};

/// What the UI renders from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// The signed-in account, if any.
    pub current_user: Option<AccountView>,
    /// True while a session-changing call is in flight, including the
    /// startup token check.
    pub is_loading: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        // Loading until `start` has looked for a stored token.
        Self {
            current_user: None,
            is_loading: true,
        }
    }
}

/// The result of a session operation, shaped for inline display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Outcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Owns the client-side authentication lifecycle.
///
/// One instance per application root; views hold a receiver from
/// [`subscribe`](Self::subscribe). Public methods never return `Err`.
pub struct SessionManager {
    api: ApiClient,
    state: watch::Sender<SessionState>,
}

impl SessionManager {
    pub fn new(api: ApiClient) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self { api, state }
    }

    /// Convenience constructor over a fresh [`ApiClient`].
    pub fn connect(base_url: impl Into<String>, tokens: Arc<dyn TokenStore>) -> Self {
        Self::new(ApiClient::new(base_url, tokens))
    }

    /// A receiver that sees every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// A snapshot of the current state.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn current_user(&self) -> Option<AccountView> {
        self.state.borrow().current_user.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    /// Restores a session from a stored token.
    ///
    /// A rejected or unreachable verification silently leaves the session
    /// signed out and discards the token.
    pub async fn start(&self) {
        self.set_loading(true);

        if self.api.tokens().get().is_some() {
            match self.api.verify().await {
                Ok(user) => self.set_user(Some(user)),
                Err(e) => {
                    tracing::debug!("Stored session rejected: {}", e);
                    self.api.tokens().clear();
                    self.set_user(None);
                }
            }
        }

        self.set_loading(false);
    }

    pub async fn login(&self, email: &str, password: &str) -> Outcome {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        self.set_loading(true);
        let result = self.api.login(&request).await;
        self.set_loading(false);

        match result {
            Ok(session) => {
                self.set_user(Some(session.user));
                Outcome::ok()
            }
            Err(e) => self.fail(e, "Login failed"),
        }
    }

    pub async fn register(&self, request: &RegisterRequest) -> Outcome {
        self.set_loading(true);
        let result = self.api.register(request).await;
        self.set_loading(false);

        match result {
            Ok(session) => {
                self.set_user(Some(session.user));
                Outcome::ok()
            }
            Err(e) => self.fail(e, "Registration failed"),
        }
    }

    /// Forgets the token and the user. The server is not told.
    pub fn logout(&self) {
        self.api.tokens().clear();
        self.set_user(None);
    }

    /// Sends a partial update and adopts the server's copy of the profile.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Outcome {
        self.set_loading(true);
        let result = self.api.update_profile(update).await;
        self.set_loading(false);

        match result {
            Ok(user) => {
                self.set_user(Some(user));
                Outcome::ok()
            }
            Err(e) => self.fail(e, "Profile update failed"),
        }
    }

    /// Re-reads the profile. On failure the current state is kept unless the
    /// server rejected the token.
    pub async fn refresh_profile(&self) {
        match self.api.profile().await {
            Ok(user) => self.set_user(Some(user)),
            Err(e) => {
                tracing::error!("Refresh profile failed: {}", e);
                self.fail(e, "Failed to fetch profile");
            }
        }
    }

    pub async fn change_password(&self, old_password: &str, new_password: &str) -> Outcome {
        let request = ChangePasswordRequest {
            old_password: old_password.to_string(),
            new_password: new_password.to_string(),
        };

        match self.api.change_password(&request).await {
            Ok(_) => Outcome::ok(),
            Err(e) => self.fail(e, "Password change failed"),
        }
    }

    fn fail(&self, error: ClientError, fallback: &str) -> Outcome {
        if error.is_unauthorized() {
            self.set_user(None);
        }
        Outcome::failed(error.user_message(fallback))
    }

    fn set_user(&self, user: Option<AccountView>) {
        self.state.send_modify(|state| state.current_user = user);
    }

    fn set_loading(&self, loading: bool) {
        self.state.send_if_modified(|state| {
            let changed = state.is_loading != loading;
            state.is_loading = loading;
            changed
        });
    }
}
