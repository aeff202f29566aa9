use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Request},
    middleware::Next,
    response::Response,
};

use crate::{
    error::AppError,
    services::auth as auth_service,
    state::AppState,
};

/// Extracts the token from an `Authorization: Bearer <token>` header.
///
/// The scheme is matched case-insensitively; an empty token is rejected.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.splitn(2, ' ');

    let scheme = parts.next()?;
    let token = parts.next()?.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }

    Some(token)
}

/// A middleware that requires a valid bearer token for a live account.
///
/// On success the [`AuthenticatedAccount`](crate::models::session::AuthenticatedAccount)
/// is inserted into the request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    tracing::debug!("🔐 Checking authentication...");

    let token = extract_bearer_token(request.headers())
        .map(str::to_string)
        .ok_or_else(|| {
            tracing::warn!("❌ No bearer token found");
            AppError::Unauthorized
        })?;

    let authenticated = auth_service::authenticate_token(&state, &token).await?;
    tracing::debug!(
        "✅ Account authenticated: {} (role {}, token expires at {})",
        authenticated.account.id,
        authenticated.claims.role,
        authenticated.claims.exp
    );

    request.extensions_mut().insert(authenticated);

    Ok(next.run(request).await)
}
