//! Security capabilities consumed by the authentication engine.
//!
//! - [`PasswordHasher`]: one-way salted password hashing, implemented by
//!   [`Argon2Hasher`] (Argon2id with a server-side pepper)
//! - [`TokenIssuer`]: signed access tokens plus unguessable refresh values,
//!   implemented by [`JwtTokenIssuer`] (HS256)
//!
//! ## Example
//!
//! ```
//! use authkeep::security::{Argon2Hasher, JwtTokenIssuer, PasswordHasher, TokenConfig, TokenIssuer};
//! use uuid::Uuid;
//!
//! let hasher = Argon2Hasher::new("pepper".to_string());
//! let hash = hasher.hash("SecurePass123").unwrap();
//! assert!(hasher.verify(&hash, "SecurePass123"));
//!
//! let issuer = JwtTokenIssuer::new("jwt_secret", TokenConfig::default());
//! let pair = issuer.generate(Uuid::new_v4(), "player@example.com").unwrap();
//! assert!(pair.expires_at > pair.access_expires_at);
//! ```

pub mod hasher;
pub mod tokens;

pub use hasher::{Argon2Hasher, PasswordHasher};
pub use tokens::{JwtTokenIssuer, TokenConfig, TokenIssuer};
