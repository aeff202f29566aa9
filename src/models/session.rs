use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::account::{Account, Role};

/// Claims embedded in every session token.
///
/// The server keeps no record of issued tokens; `exp` is the only way a
/// token stops being accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// The account id.
    pub sub: Uuid,
    /// The account's email at issue time.
    pub email: String,
    /// The account's role at issue time.
    pub role: Role,
    /// Issued-at (Unix timestamp, seconds).
    pub iat: i64,
    /// Expiry (Unix timestamp, seconds).
    pub exp: i64,
}

/// The caller of a protected route, resolved from its bearer token.
#[derive(Debug, Clone)]
pub struct AuthenticatedAccount {
    /// The verified token claims.
    pub claims: Claims,
    /// The account the claims resolved to.
    pub account: Account,
}
