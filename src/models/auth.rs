//! Request and response bodies of the auth routes.
//!
//! Shared by the handlers and by [`crate::client`], so both sides agree on
//! the wire shape.

use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::models::account::AccountView;

/// The request payload for registration.
#[derive(Deserialize, Serialize, Validate, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[garde(length(chars, min = 1, max = 100))]
    pub name: String,
    #[garde(email)]
    pub email: String,
    #[garde(length(chars, min = 6, max = 128))]
    pub password: String,
    #[garde(skip)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirm_password: Option<String>,
}

/// The request payload for login.
#[derive(Deserialize, Serialize, Validate, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[garde(length(min = 1))]
    pub email: String,
    #[garde(length(min = 1))]
    pub password: String,
}

/// The request payload for changing a password.
#[derive(Deserialize, Serialize, Validate, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[garde(length(min = 1))]
    pub old_password: String,
    #[garde(length(chars, min = 6, max = 128))]
    pub new_password: String,
}

/// Returned by register and login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub token: String,
    pub user: AccountView,
}

/// Returned by the profile routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub user: AccountView,
}

/// Returned by the verify route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub user: AccountView,
}

/// The response payload for operations without a resource to return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
}

/// The body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
