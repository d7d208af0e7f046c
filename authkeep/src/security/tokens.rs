//! Token issuing capability and its JWT implementation.

use crate::auth::{AccessTokenClaims, AccountId, AuthError, AuthResult, TokenPair};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

/// Mints signed access tokens paired with fresh refresh values.
pub trait TokenIssuer: Send + Sync {
    /// Generate a new token pair for a subject.
    ///
    /// The refresh value must be unguessable; `TokenPair::expires_at` is the
    /// absolute expiry of the refresh session it will back.
    fn generate(&self, subject: AccountId, email: &str) -> AuthResult<TokenPair>;

    /// Validate an access token and return its claims.
    fn verify(&self, token: &str) -> AuthResult<AccessTokenClaims>;
}

/// Token lifetimes
#[derive(Debug, Clone, Copy)]
pub struct TokenConfig {
    /// Lifetime of the signed access token
    pub access_ttl: Duration,
    /// Lifetime of the refresh session
    pub refresh_ttl: Duration,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            access_ttl: Duration::minutes(15),
            refresh_ttl: Duration::days(7),
        }
    }
}

/// HS256 JWT issuer with UUID v4 refresh values
#[derive(Clone)]
pub struct JwtTokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    config: TokenConfig,
}

impl JwtTokenIssuer {
    /// Create a new issuer
    ///
    /// # Arguments
    ///
    /// * `jwt_secret` - Secret key for JWT signing
    /// * `config` - Access and refresh lifetimes
    pub fn new(jwt_secret: &str, config: TokenConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            config,
        }
    }

    pub fn config(&self) -> TokenConfig {
        self.config
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn generate(&self, subject: AccountId, email: &str) -> AuthResult<TokenPair> {
        let now = Utc::now();
        let access_expires_at = now
            .checked_add_signed(self.config.access_ttl)
            .ok_or(AuthError::TokenLifetimeOverflow)?;
        let expires_at = now
            .checked_add_signed(self.config.refresh_ttl)
            .ok_or(AuthError::TokenLifetimeOverflow)?;
        let claims = AccessTokenClaims {
            sub: subject,
            email: email.to_string(),
            exp: access_expires_at.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4(),
        };

        let access_token = encode(&Header::default(), &claims, &self.encoding_key)?;

        Ok(TokenPair {
            access_token,
            refresh_token: Uuid::new_v4().to_string(),
            expires_at,
            access_expires_at,
        })
    }

    fn verify(&self, token: &str) -> AuthResult<AccessTokenClaims> {
        let token_data =
            decode::<AccessTokenClaims>(token, &self.decoding_key, &Validation::default())
                .map_err(|_| AuthError::InvalidAccessToken)?;

        Ok(token_data.claims)
    }
}
