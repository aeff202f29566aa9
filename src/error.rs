use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// The message returned for any failed login, whatever the cause.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";

/// The application's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A database error.
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    /// The connection pool could not hand out a client.
    #[error("Pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    /// The connection pool could not be built.
    #[error("Pool setup error: {0}")]
    PoolSetup(#[from] deadpool_postgres::CreatePoolError),

    /// A validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An account with this email already exists.
    #[error("Email already registered")]
    AlreadyExists,

    /// Unknown email or wrong password. The two causes are never told apart.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Missing, malformed, expired or otherwise unacceptable bearer token.
    #[error("Unauthorized")]
    Unauthorized,

    /// A resource not found error.
    #[error("Resource not found")]
    NotFound,

    /// A password hashing error.
    #[error("Hashing error: {0}")]
    Hashing(String),

    /// A token signing error.
    #[error("Token error: {0}")]
    Token(String),

    /// An internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// The HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::AlreadyExists => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Database(_)
            | AppError::Pool(_)
            | AppError::PoolSetup(_)
            | AppError::Hashing(_)
            | AppError::Token(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                "Database error".to_string()
            }

            AppError::Pool(ref e) => {
                tracing::error!("Pool error: {}", e);
                "Database error".to_string()
            }

            AppError::PoolSetup(ref e) => {
                tracing::error!("Pool setup error: {}", e);
                "Database error".to_string()
            }

            AppError::Validation(ref msg) => {
                tracing::debug!("Validation error: {}", msg);
                msg.clone()
            }

            AppError::AlreadyExists => {
                tracing::debug!("Duplicate registration rejected");
                "Email already registered".to_string()
            }

            AppError::InvalidCredentials => {
                tracing::warn!("Login rejected");
                INVALID_CREDENTIALS_MESSAGE.to_string()
            }

            AppError::Unauthorized => {
                tracing::warn!("Bearer authentication failed");
                "Invalid or expired token".to_string()
            }

            AppError::NotFound => {
                tracing::debug!("Resource not found");
                "User not found".to_string()
            }

            AppError::Hashing(ref msg) => {
                tracing::error!("Hashing error: {}", msg);
                "Internal server error".to_string()
            }

            AppError::Token(ref msg) => {
                tracing::error!("Token error: {}", msg);
                "Internal server error".to_string()
            }

            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
        };

        let body = sonic_rs::to_string(&sonic_rs::json!({
            "error": message
        }))
        .unwrap_or_else(|_| r#"{"error":"Internal server error"}"#.to_string());

        (
            self.status(),
            [(http::header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response()
    }
}
