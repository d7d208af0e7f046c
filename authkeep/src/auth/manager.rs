//! Authentication manager implementation.

use super::{
    errors::{AuthError, AuthResult},
    models::{
        AccessTokenClaims, Account, AccountView, AuthenticatedAccount, Credentials, Session,
        SessionId, SessionState,
    },
};
use crate::db::{AccountRepository, SessionRepository};
use crate::security::{PasswordHasher, TokenIssuer};
use chrono::Utc;
use log::{debug, info, warn};
use std::sync::{Arc, OnceLock};

/// Compared against when the email is unknown, so both rejection paths pay for one hash check.
const DUMMY_PASSWORD: &str = "authkeep-dummy-password";

/// Authentication manager
///
/// Stateless apart from its collaborators; cheap to clone and safe to share
/// between tasks.
#[derive(Clone)]
pub struct AuthManager {
    accounts: Arc<dyn AccountRepository>,
    sessions: Arc<dyn SessionRepository>,
    hasher: Arc<dyn PasswordHasher>,
    issuer: Arc<dyn TokenIssuer>,
    dummy_hash: Arc<OnceLock<String>>,
}

impl AuthManager {
    /// Create a new authentication manager
    ///
    /// # Arguments
    ///
    /// * `accounts` - Account store
    /// * `sessions` - Refresh session store
    /// * `hasher` - Password hasher
    /// * `issuer` - Access/refresh token issuer
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        sessions: Arc<dyn SessionRepository>,
        hasher: Arc<dyn PasswordHasher>,
        issuer: Arc<dyn TokenIssuer>,
    ) -> Self {
        let dummy_hash = OnceLock::new();
        match hasher.hash(DUMMY_PASSWORD) {
            Ok(hash) => {
                let _ = dummy_hash.set(hash);
            }
            Err(e) => warn!("Dummy hash unavailable, retrying on first unknown email: {}", e),
        }

        Self {
            accounts,
            sessions,
            hasher,
            issuer,
            dummy_hash: Arc::new(dummy_hash),
        }
    }

    /// Register a new account
    ///
    /// Does not issue tokens; call [`AuthManager::authenticate`] afterwards.
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidInput` - Empty email or password
    /// * `AuthError::HashingFailed` - Hasher failed
    /// * `AuthError::EmailTaken` - Email already exists
    /// * `AuthError::Storage` - Account store failed
    pub async fn register(&self, email: &str, password: &str) -> AuthResult<AccountView> {
        if email.is_empty() {
            return Err(AuthError::InvalidInput("email must not be empty".to_string()));
        }
        if password.is_empty() {
            return Err(AuthError::InvalidInput(
                "password must not be empty".to_string(),
            ));
        }

        let password_hash = self.hasher.hash(password)?;
        let account = Account::new(email.to_string(), password_hash);

        self.accounts.create(&account).await?;

        info!("Registered account {}", account.id);
        Ok(AccountView::from(&account))
    }

    /// Verify credentials and open a new refresh session
    ///
    /// Existing sessions of the account are left untouched.
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidCredentials` - Unknown email or wrong password
    /// * `AuthError::SigningFailed` / `AuthError::TokenLifetimeOverflow` - Token issuer failed
    /// * `AuthError::Storage` - Account or session store failed
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> AuthResult<AuthenticatedAccount> {
        let Some(account) = self.accounts.find_by_email(email).await? else {
            self.burn_password_check(password);
            debug!("Authentication rejected: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.hasher.verify(&account.password_hash, password) {
            debug!("Authentication rejected for account {}", account.id);
            return Err(AuthError::InvalidCredentials);
        }

        let (_, result) = self.open_session(&account).await?;
        info!("Account {} authenticated", account.id);
        Ok(result)
    }

    /// Convenience wrapper over [`AuthManager::authenticate`]
    pub async fn login(&self, credentials: &Credentials) -> AuthResult<AuthenticatedAccount> {
        self.authenticate(&credentials.email, &credentials.password)
            .await
    }

    /// Rotate a refresh token
    ///
    /// The presented session must be active. A new session is persisted
    /// before the old one is claimed, so a storage failure never leaves the
    /// caller without any refresh path. The claim is a conditional revoke: if
    /// a concurrent call already rotated the same token, this call loses,
    /// revokes the session it just created, and is rejected.
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidRefreshToken` - Unknown, revoked or expired token,
    ///   vanished account, or lost rotation race
    /// * `AuthError::SigningFailed` / `AuthError::TokenLifetimeOverflow` - Token issuer failed
    /// * `AuthError::Storage` - Account or session store failed
    pub async fn refresh(&self, refresh_token: &str) -> AuthResult<AuthenticatedAccount> {
        if refresh_token.is_empty() {
            return Err(AuthError::InvalidRefreshToken);
        }

        let current = self
            .sessions
            .find_by_token(refresh_token)
            .await?
            .ok_or(AuthError::InvalidRefreshToken)?;

        let state = current.state(Utc::now());
        if state != SessionState::Active {
            debug!("Refresh rejected: session {} is {:?}", current.id, state);
            return Err(AuthError::InvalidRefreshToken);
        }

        let account = match self.accounts.find_by_id(current.account_id).await? {
            Some(account) => account,
            None => {
                warn!("Refresh rejected: session {} has no account", current.id);
                return Err(AuthError::InvalidRefreshToken);
            }
        };

        let (rotated_id, result) = self.open_session(&account).await?;

        if !self.sessions.revoke_if_active(current.id).await? {
            warn!(
                "Refresh race lost for session {}; discarding rotated-in session {}",
                current.id, rotated_id
            );
            if let Err(e) = self.sessions.revoke(rotated_id).await {
                warn!("Failed to revoke discarded session {}: {}", rotated_id, e);
            }
            return Err(AuthError::InvalidRefreshToken);
        }

        info!("Rotated session {} for account {}", current.id, account.id);
        Ok(result)
    }

    /// Verify an access token
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidAccessToken` - Bad signature, malformed or expired token
    pub fn verify_access_token(&self, token: &str) -> AuthResult<AccessTokenClaims> {
        self.issuer.verify(token)
    }

    /// Issue a token pair for an account and persist the backing session.
    async fn open_session(
        &self,
        account: &Account,
    ) -> AuthResult<(SessionId, AuthenticatedAccount)> {
        let tokens = self.issuer.generate(account.id, &account.email)?;
        let session = Session::issue(account.id, &tokens);

        self.sessions.create(&session).await?;

        Ok((
            session.id,
            AuthenticatedAccount {
                account: AccountView::from(account),
                tokens,
            },
        ))
    }

    /// Run one verification against a throwaway hash.
    ///
    /// The hash is normally computed in [`AuthManager::new`]; if that failed
    /// it is retried here until it succeeds once.
    fn burn_password_check(&self, password: &str) {
        if let Some(hash) = self.dummy_hash.get() {
            let _ = self.hasher.verify(hash, password);
            return;
        }

        match self.hasher.hash(DUMMY_PASSWORD) {
            Ok(hash) => {
                let _ = self.hasher.verify(&hash, password);
                let _ = self.dummy_hash.set(hash);
            }
            Err(e) => warn!("Dummy hash unavailable: {}", e),
        }
    }
}
