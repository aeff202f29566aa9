use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};

use crate::{
    error::Result,
    models::{account::ProfileUpdate, auth::UserResponse, session::AuthenticatedAccount},
    services::profile as profile_service,
    state::AppState,
    validation::auth::{json_body, validate_profile_update},
};

/// Returns the caller's profile. Also served as `GET /api/me`.
#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedAccount>,
) -> Result<Response> {
    let user = profile_service::get_profile(&state, auth.account.id).await?;
    Ok((StatusCode::OK, Json(UserResponse { user })).into_response())
}

/// Applies a partial update to the caller's profile.
#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedAccount>,
    payload: std::result::Result<Json<ProfileUpdate>, JsonRejection>,
) -> Result<Response> {
    let update = json_body(payload)?;
    validate_profile_update(&update)?;

    let user = profile_service::update_profile(&state, auth.account.id, &update).await?;
    Ok((StatusCode::OK, Json(UserResponse { user })).into_response())
}
