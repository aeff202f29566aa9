use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::config::MIN_JWT_SECRET_LEN;
use crate::error::{AppError, Result};
use crate::models::{account::Account, session::Claims};

/// Signs and verifies HS256 session tokens.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenKeys {
    /// Builds the keys from the signing secret.
    ///
    /// Refuses short secrets so a token can never be minted with a
    /// guessable key.
    pub fn new(secret: &[u8], ttl_days: i64) -> Result<Self> {
        if secret.len() < MIN_JWT_SECRET_LEN {
            return Err(AppError::Token(format!(
                "signing secret must be at least {} bytes",
                MIN_JWT_SECRET_LEN
            )));
        }
        if ttl_days <= 0 {
            return Err(AppError::Token("token lifetime must be positive".to_string()));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl: Duration::days(ttl_days),
        })
    }

    /// Issues a token for `account` valid from now.
    pub fn issue(&self, account: &Account) -> Result<String> {
        self.issue_at(account, Utc::now())
    }

    /// Issues a token for `account` as if signed at `issued_at`.
    pub fn issue_at(&self, account: &Account, issued_at: DateTime<Utc>) -> Result<String> {
        let claims = Claims {
            sub: account.id,
            email: account.email.clone(),
            role: account.role,
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Token(format!("JWT encode failed: {}", e)))
    }

    /// Checks signature and expiry and returns the claims.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("❌ Token rejected: {}", e);
                AppError::Unauthorized
            })
    }
}
