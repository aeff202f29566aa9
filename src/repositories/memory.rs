use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::account::{Account, NewAccount, ProfileUpdate},
    repositories::account::AccountRepository,
};

#[derive(Default)]
struct Accounts {
    by_id: HashMap<Uuid, Account>,
    id_by_email: HashMap<String, Uuid>,
}

/// Accounts kept in process memory. Selected with `DATABASE_URL=memory://`.
///
/// The uniqueness check and the insert happen under one lock, so concurrent
/// registrations for the same email cannot both succeed.
#[derive(Clone, Default)]
pub struct MemoryAccountRepository {
    inner: Arc<Mutex<Accounts>>,
}

impl MemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.by_id.len()
    }

    /// Whether no account is stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drops an account. No route does this; it exists so callers can model
    /// an account disappearing behind a still-valid token.
    pub async fn remove(&self, id: Uuid) -> Option<Account> {
        let mut accounts = self.inner.lock().await;
        let removed = accounts.by_id.remove(&id)?;
        accounts.id_by_email.remove(&removed.email);
        Some(removed)
    }
}

#[async_trait]
impl AccountRepository for MemoryAccountRepository {
    async fn insert(&self, account: NewAccount) -> Result<Account> {
        let mut accounts = self.inner.lock().await;
        if accounts.id_by_email.contains_key(&account.email) {
            return Err(AppError::AlreadyExists);
        }

        let account = account.into_account();
        accounts.id_by_email.insert(account.email.clone(), account.id);
        accounts.by_id.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let accounts = self.inner.lock().await;
        Ok(accounts
            .id_by_email
            .get(email)
            .and_then(|id| accounts.by_id.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>> {
        Ok(self.inner.lock().await.by_id.get(&id).cloned())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: &ProfileUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<Account>> {
        let mut accounts = self.inner.lock().await;
        Ok(accounts.by_id.get_mut(&id).map(|account| {
            account.apply(update, now);
            account.clone()
        }))
    }

    async fn update_password(
        &self,
        id: Uuid,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let mut accounts = self.inner.lock().await;
        Ok(match accounts.by_id.get_mut(&id) {
            Some(account) => {
                account.password_hash = password_hash;
                account.updated_at = now;
                true
            }
            None => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::account::{AvailabilitySlot, Role};

    fn new_account(email: &str) -> NewAccount {
        NewAccount {
            id: Uuid::new_v4(),
            name: "Test".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: Role::User,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let repo = MemoryAccountRepository::new();
        repo.insert(new_account("a@x.com")).await.unwrap();

        let second = repo.insert(new_account("a@x.com")).await;
        assert!(matches!(second, Err(AppError::AlreadyExists)));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_lookup_by_email_and_id() {
        let repo = MemoryAccountRepository::new();
        let created = repo.insert(new_account("b@x.com")).await.unwrap();

        let by_email = repo.find_by_email("b@x.com").await.unwrap().unwrap();
        let by_id = repo.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(by_email.id, created.id);
        assert_eq!(by_id.email, "b@x.com");
        assert!(repo.find_by_email("c@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_partial_update_is_idempotent() {
        let repo = MemoryAccountRepository::new();
        let created = repo.insert(new_account("d@x.com")).await.unwrap();
        let seed = ProfileUpdate {
            grade_level: Some("Senior".to_string()),
            availability: Some(vec![AvailabilitySlot {
                day: "Monday".to_string(),
                slot: "09:00-11:00".to_string(),
            }]),
            ..Default::default()
        };
        repo.update_profile(created.id, &seed, Utc::now()).await.unwrap();

        let update = ProfileUpdate {
            major: Some("Biology".to_string()),
            ..Default::default()
        };
        let now = Utc::now();
        let once = repo.update_profile(created.id, &update, now).await.unwrap().unwrap();
        let twice = repo.update_profile(created.id, &update, now).await.unwrap().unwrap();

        assert_eq!(once.view(), twice.view());
        assert_eq!(twice.major, "Biology");
        assert_eq!(twice.grade_level, "Senior");
        assert_eq!(twice.availability.len(), 1);
    }

    #[tokio::test]
    async fn test_update_of_missing_account_is_none() {
        let repo = MemoryAccountRepository::new();
        let result = repo
            .update_profile(Uuid::new_v4(), &ProfileUpdate::default(), Utc::now())
            .await
            .unwrap();
        assert!(result.is_none());
        assert!(!repo.update_password(Uuid::new_v4(), "h".into(), Utc::now()).await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_frees_the_email() {
        let repo = MemoryAccountRepository::new();
        let created = repo.insert(new_account("e@x.com")).await.unwrap();
        assert!(repo.remove(created.id).await.is_some());
        assert!(repo.is_empty().await);
        assert!(repo.insert(new_account("e@x.com")).await.is_ok());
    }
}
