use chrono::Utc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::account::{AccountView, ProfileUpdate};
use crate::state::AppState;

/// Reads the sanitized profile of `account_id`.
pub async fn get_profile(state: &AppState, account_id: Uuid) -> Result<AccountView> {
    state
        .accounts
        .find_by_id(account_id)
        .await?
        .map(|account| account.view())
        .ok_or(AppError::NotFound)
}

/// Applies a partial update and returns the stored result.
pub async fn update_profile(
    state: &AppState,
    account_id: Uuid,
    update: &ProfileUpdate,
) -> Result<AccountView> {
    let account = state
        .accounts
        .update_profile(account_id, update, Utc::now())
        .await?
        .ok_or(AppError::NotFound)?;

    tracing::info!("✅ Profile updated for account: {}", account_id);
    Ok(account.view())
}
