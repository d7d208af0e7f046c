//! Authentication error types.

use std::time::Duration;
use thiserror::Error;

/// Failure reported by a storage collaborator.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Storage call did not finish in time
    #[error("Storage operation timed out after {0:?}")]
    Timeout(Duration),

    /// Backend-specific failure (in-memory stores, poisoned locks)
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email already registered
    #[error("Email already exists")]
    EmailTaken,

    /// Unknown email or wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Unknown, revoked or expired refresh token, or its account is gone
    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    /// Access token failed signature or expiry validation
    #[error("Invalid access token")]
    InvalidAccessToken,

    /// Rejected input (empty email or password)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Password hashing failed
    #[error("Password hashing failed")]
    HashingFailed,

    /// Access token signing failed
    #[error("Token signing failed: {0}")]
    SigningFailed(#[from] jsonwebtoken::errors::Error),

    /// Configured token lifetime pushes an expiry past the representable range
    #[error("Token lifetime out of range")]
    TokenLifetimeOverflow,

    /// Storage collaborator failed
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        AuthError::Storage(StorageError::Database(err))
    }
}

impl AuthError {
    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// Storage and signing errors are sanitized so SQL details and key
    /// material problems never reach the caller.
    pub fn client_message(&self) -> String {
        match self {
            AuthError::Storage(_) => "Internal server error".to_string(),
            AuthError::SigningFailed(_)
            | AuthError::HashingFailed
            | AuthError::TokenLifetimeOverflow => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        }
    }

    /// Whether the caller caused this error (as opposed to a collaborator failure).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AuthError::EmailTaken
                | AuthError::InvalidCredentials
                | AuthError::InvalidRefreshToken
                | AuthError::InvalidAccessToken
                | AuthError::InvalidInput(_)
        )
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
