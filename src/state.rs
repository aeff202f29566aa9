use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::crypto::{password::PasswordHasher, token::TokenKeys};
use crate::error::Result;
use crate::repositories::{
    account::{AccountRepository, PgAccountRepository},
    memory::MemoryAccountRepository,
};

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// The account store.
    pub accounts: Arc<dyn AccountRepository>,
    /// Session token signing keys.
    pub tokens: TokenKeys,
    /// Password hashing.
    pub hasher: PasswordHasher,
    /// The application's configuration.
    pub config: Arc<Config>,
    /// When the process started serving.
    pub started_at: Instant,
}

impl AppState {
    /// Creates a new `AppState`, connecting to the store named by
    /// `config.database_url`.
    pub async fn new(config: &Config) -> Result<Self> {
        let accounts: Arc<dyn AccountRepository> = if config.uses_memory_store() {
            tracing::warn!("⚠️ Using in-memory account store, data is lost on exit");
            Arc::new(MemoryAccountRepository::new())
        } else {
            let pool = crate::db::create_pool(&config.database_url)?;
            crate::db::ensure_schema(&pool).await?;
            tracing::info!("✅ PostgreSQL Pool initialized with deadpool-postgres");
            Arc::new(PgAccountRepository::new(pool))
        };

        Self::with_repository(config, accounts)
    }

    /// Creates a new `AppState` over an existing account store.
    pub fn with_repository(config: &Config, accounts: Arc<dyn AccountRepository>) -> Result<Self> {
        let tokens = TokenKeys::new(config.jwt_secret.as_bytes(), config.token_ttl_days)?;
        tracing::info!("✅ Token keys initialized ({} day lifetime)", config.token_ttl_days);

        let hasher = PasswordHasher::new(config.hash_params)?;
        tracing::info!("✅ Password hasher initialized");

        Ok(AppState {
            accounts,
            tokens,
            hasher,
            config: Arc::new(config.clone()),
            started_at: Instant::now(),
        })
    }
}
