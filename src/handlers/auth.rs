use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};

use crate::{
    error::Result,
    models::{
        auth::{
            AuthResponse, ChangePasswordRequest, LoginRequest, RegisterRequest, VerifyResponse,
        },
        session::AuthenticatedAccount,
    },
    services::auth as auth_service,
    state::AppState,
    validation::auth::*,
};

/// Handles account registration.
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Response> {
    let mut payload = json_body(payload)?;
    tracing::info!("📝 Register attempt for: {}", payload.email.trim());

    validate_registration(&mut payload)?;

    let session = auth_service::register(&state, payload).await?;
    tracing::info!("✅ Account registered: {}", session.user.id);

    Ok((StatusCode::CREATED, Json(session)).into_response())
}

/// Handles credential login.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response> {
    let mut payload = json_body(payload)?;
    validate_login(&mut payload)?;
    tracing::info!("🔐 Login attempt for: {}", payload.email);

    let session = auth_service::login(&state, &payload.email, payload.password).await?;

    Ok((StatusCode::OK, Json(session)).into_response())
}

/// Confirms that the caller's token is still good.
#[axum::debug_handler]
pub async fn verify(
    Extension(auth): Extension<AuthenticatedAccount>,
) -> Result<Response> {
    let response = VerifyResponse {
        valid: true,
        user: auth.account.view(),
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Handles changing the caller's password.
#[axum::debug_handler]
pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedAccount>,
    payload: std::result::Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<Response> {
    let payload = json_body(payload)?;
    validate_password_change(&payload)?;

    auth_service::change_password(
        &state,
        auth.account.id,
        payload.old_password,
        payload.new_password,
    )
    .await?;

    let response = AuthResponse {
        success: true,
        message: "Password changed successfully".to_string(),
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}
