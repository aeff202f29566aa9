use std::sync::Arc;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder,
};
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use crate::config::HashParams;
use crate::error::{AppError, Result};

/// Hashes and verifies passwords with Argon2id.
///
/// Both operations are CPU bound and run on the blocking pool.
#[derive(Clone)]
pub struct PasswordHasher {
    params: HashParams,
    /// Verified against when the account does not exist, so an unknown email
    /// costs about as much as a wrong password.
    dummy_hash: Arc<str>,
}

impl PasswordHasher {
    /// Creates a hasher using `params` for new hashes.
    pub fn new(params: HashParams) -> Result<Self> {
        let dummy_hash = hash_password(&params, "flightplan-dummy-password")?;
        Ok(Self {
            params,
            dummy_hash: Arc::from(dummy_hash),
        })
    }

    /// Hashes `password` with a fresh random salt.
    pub async fn hash(&self, password: String) -> Result<String> {
        let params = self.params;
        let password = Zeroizing::new(password);
        tokio::task::spawn_blocking(move || hash_password(&params, &password))
            .await
            .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))?
    }

    /// Checks `password` against a stored PHC string.
    pub async fn verify(&self, password: String, hash: String) -> Result<bool> {
        let password = Zeroizing::new(password);
        tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| AppError::Internal(format!("Verification task failed: {}", e)))?
    }

    /// Burns one verification against the dummy hash. Always `false`.
    pub async fn verify_dummy(&self, password: String) -> Result<bool> {
        let hash = self.dummy_hash.to_string();
        self.verify(password, hash).await.map(|_| false)
    }
}

fn hash_password(params: &HashParams, password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        ParamsBuilder::new()
            .m_cost(params.memory_kib)
            .t_cost(params.iterations)
            .p_cost(params.parallelism)
            .build()
            .map_err(|e| AppError::Hashing(format!("Argon2 params: {}", e)))?,
    );

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Hashing(format!("Argon2 hash error: {}", e)))?
        .to_string();

    tracing::debug!("Password hashed successfully with Argon2");
    Ok(password_hash)
}

fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Hashing(format!("Hash parse error: {}", e)))?;
    let result = Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok();

    tracing::debug!("Password verification completed");
    Ok(result)
}
