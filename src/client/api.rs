use std::sync::Arc;

use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use crate::client::{error::ClientError, store::TokenStore};
use crate::models::{
    account::{AccountView, ProfileUpdate},
    auth::{
        AuthResponse, ChangePasswordRequest, ErrorBody, LoginRequest, RegisterRequest,
        SessionResponse, UserResponse, VerifyResponse,
    },
};

/// Thin HTTP client for the identity service.
///
/// Register and login store the returned token. Every authenticated call
/// sends the stored token as a bearer header, and any 401 answer discards it.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl ApiClient {
    /// `base_url` is the service root, e.g. `http://localhost:4000/api`.
    pub fn new(base_url: impl Into<String>, tokens: Arc<dyn TokenStore>) -> Self {
        Self::with_http(reqwest::Client::new(), base_url, tokens)
    }

    pub fn with_http(
        http: reqwest::Client,
        base_url: impl Into<String>,
        tokens: Arc<dyn TokenStore>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            tokens,
        }
    }

    /// The token store this client reads and writes.
    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<SessionResponse, ClientError> {
        let session: SessionResponse = self
            .send(self.http.post(self.url("/auth/register")).json(request))
            .await?;
        self.tokens.set(&session.token);
        Ok(session)
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<SessionResponse, ClientError> {
        let session: SessionResponse = self
            .send(self.http.post(self.url("/auth/login")).json(request))
            .await?;
        self.tokens.set(&session.token);
        Ok(session)
    }

    pub async fn verify(&self) -> Result<AccountView, ClientError> {
        let response: VerifyResponse = self
            .send_authenticated(self.http.get(self.url("/auth/verify")))
            .await?;
        Ok(response.user)
    }

    pub async fn profile(&self) -> Result<AccountView, ClientError> {
        let response: UserResponse = self
            .send_authenticated(self.http.get(self.url("/auth/profile")))
            .await?;
        Ok(response.user)
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<AccountView, ClientError> {
        let response: UserResponse = self
            .send_authenticated(self.http.put(self.url("/auth/profile")).json(update))
            .await?;
        Ok(response.user)
    }

    pub async fn change_password(
        &self,
        request: &ChangePasswordRequest,
    ) -> Result<AuthResponse, ClientError> {
        self.send_authenticated(self.http.post(self.url("/auth/change-password")).json(request))
            .await
    }

    async fn send_authenticated<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        let token = self.tokens.get().ok_or(ClientError::NotSignedIn)?;
        self.send(request.bearer_auth(token)).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.send().await.map_err(|e| {
            tracing::error!("API request failed: {}", e);
            ClientError::from(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        if status == StatusCode::UNAUTHORIZED {
            tracing::debug!("Discarding stored token after 401");
            self.tokens.clear();
        }

        let message = response.json::<ErrorBody>().await.ok().map(|body| body.error);
        tracing::warn!("API request failed with {}: {:?}", status, message);

        Err(ClientError::Api { status, message })
    }
}
