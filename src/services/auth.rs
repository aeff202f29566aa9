use chrono::Utc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{
    account::{NewAccount, Role},
    auth::{RegisterRequest, SessionResponse},
    session::AuthenticatedAccount,
};
use crate::state::AppState;

/// Creates an account and issues its first token.
///
/// `payload` must already be normalised and validated.
pub async fn register(state: &AppState, payload: RegisterRequest) -> Result<SessionResponse> {
    tracing::debug!("🔐 Creating account: {}", payload.email);

    if state.accounts.find_by_email(&payload.email).await?.is_some() {
        return Err(AppError::AlreadyExists);
    }

    let password_hash = state.hasher.hash(payload.password).await?;

    let account = state
        .accounts
        .insert(NewAccount {
            id: Uuid::new_v4(),
            name: payload.name,
            email: payload.email,
            password_hash,
            role: Role::User,
            created_at: Utc::now(),
        })
        .await?;

    let token = state.tokens.issue(&account)?;
    tracing::info!("✅ Account created with ID: {}", account.id);

    Ok(SessionResponse {
        token,
        user: account.view(),
    })
}

/// Checks credentials and issues a token.
///
/// Unknown email and wrong password fail identically.
pub async fn login(state: &AppState, email: &str, password: String) -> Result<SessionResponse> {
    tracing::debug!("🔐 Authenticating account: {}", email);

    let Some(account) = state.accounts.find_by_email(email).await? else {
        state.hasher.verify_dummy(password).await?;
        return Err(AppError::InvalidCredentials);
    };

    if !state
        .hasher
        .verify(password, account.password_hash.clone())
        .await?
    {
        return Err(AppError::InvalidCredentials);
    }

    let token = state.tokens.issue(&account)?;
    tracing::info!("✅ Account authenticated: {}", account.id);

    Ok(SessionResponse {
        token,
        user: account.view(),
    })
}

/// Verifies a bearer token and resolves it to a live account.
pub async fn authenticate_token(state: &AppState, token: &str) -> Result<AuthenticatedAccount> {
    let claims = state.tokens.verify(token)?;

    let account = state
        .accounts
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| {
            tracing::warn!("❌ Token subject no longer exists: {}", claims.sub);
            AppError::Unauthorized
        })?;

    Ok(AuthenticatedAccount { claims, account })
}

/// Changes an account's password after checking the current one.
///
/// Tokens issued before the change stay valid until they expire.
pub async fn change_password(
    state: &AppState,
    account_id: Uuid,
    old_password: String,
    new_password: String,
) -> Result<()> {
    tracing::info!("🔑 Changing password for account: {}", account_id);

    let account = state
        .accounts
        .find_by_id(account_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if !state
        .hasher
        .verify(old_password, account.password_hash)
        .await?
    {
        // Not a 401: the caller's token is fine, only the typed password is wrong.
        return Err(AppError::Validation("Current password is incorrect".to_string()));
    }

    let new_hash = state.hasher.hash(new_password).await?;

    if !state
        .accounts
        .update_password(account_id, new_hash, Utc::now())
        .await?
    {
        return Err(AppError::NotFound);
    }

    tracing::info!("✅ Password changed for account: {}", account_id);
    Ok(())
}
