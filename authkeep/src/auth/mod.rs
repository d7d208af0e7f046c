//! Authentication module providing account registration, login, and
//! refresh-session rotation.
//!
//! This module implements:
//! - Account registration with Argon2id password hashing (via [`crate::security`])
//! - Login issuing a JWT access token and an opaque refresh token
//! - Single-use refresh token rotation (create-then-claim, exactly one winner)
//! - Merged rejection errors so callers cannot enumerate accounts or sessions
//!
//! ## Example
//!
//! ```
//! use authkeep::auth::AuthManager;
//! use authkeep::db::{InMemoryAccountRepository, InMemorySessionRepository};
//! use authkeep::security::{Argon2Hasher, JwtTokenIssuer, TokenConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let auth = AuthManager::new(
//!         Arc::new(InMemoryAccountRepository::new()),
//!         Arc::new(InMemorySessionRepository::new()),
//!         Arc::new(Argon2Hasher::new("secret_pepper".to_string())),
//!         Arc::new(JwtTokenIssuer::new("jwt_secret", TokenConfig::default())),
//!     );
//!
//!     let account = auth.register("player@example.com", "SecurePass123").await?;
//!     let login = auth.authenticate("player@example.com", "SecurePass123").await?;
//!     let rotated = auth.refresh(&login.tokens.refresh_token).await?;
//!
//!     assert_eq!(rotated.account, account);
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{AuthError, AuthResult, StorageError};
pub use manager::AuthManager;
pub use models::{
    AccessTokenClaims, Account, AccountId, AccountView, AuthenticatedAccount, Credentials,
    Session, SessionId, SessionState, TokenPair,
};
