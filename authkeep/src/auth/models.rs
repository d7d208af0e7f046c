//! Authentication data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account ID type
pub type AccountId = Uuid;

/// Refresh session ID type
pub type SessionId = Uuid;

/// Account record as held by the account store
#[derive(Debug, Clone)]
pub struct Account {
    pub id: AccountId,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Build a new account with a fresh identifier stamped at the current UTC time.
    pub fn new(email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            created_at: Utc::now(),
        }
    }
}

/// Public projection of an account. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountView {
    pub id: AccountId,
    pub email: String,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
        }
    }
}

/// State of a refresh session as observed at a point in time.
///
/// An unknown session has no record at all and is represented by `None`
/// at the store boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Revoked,
    Expired,
}

/// Refresh session model
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub account_id: AccountId,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub is_revoked: bool,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Build the session backing a freshly issued token pair.
    pub fn issue(account_id: AccountId, tokens: &TokenPair) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            token: tokens.refresh_token.clone(),
            expires_at: tokens.expires_at,
            is_revoked: false,
            created_at: Utc::now(),
        }
    }

    /// Revocation wins over expiry; a session expiring exactly at `now` is expired.
    pub fn state(&self, now: DateTime<Utc>) -> SessionState {
        if self.is_revoked {
            SessionState::Revoked
        } else if self.expires_at <= now {
            SessionState::Expired
        } else {
            SessionState::Active
        }
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.state(now) == SessionState::Active
    }
}

/// Access/refresh token pair
///
/// `expires_at` is the absolute expiry of the refresh session; the access
/// token carries its own (shorter) expiry in `access_expires_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub access_expires_at: DateTime<Utc>,
}

/// Result of a successful login or refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedAccount {
    pub account: AccountView,
    pub tokens: TokenPair,
}

/// Email and password pair submitted for registration or login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// JWT claims for access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: AccountId,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(expires_in: Duration, is_revoked: bool) -> Session {
        let now = Utc::now();
        Session {
            id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            token: Uuid::new_v4().to_string(),
            expires_at: now + expires_in,
            is_revoked,
            created_at: now,
        }
    }

    #[test]
    fn test_session_states() {
        let now = Utc::now();
        assert_eq!(
            session(Duration::minutes(5), false).state(now),
            SessionState::Active
        );
        assert_eq!(
            session(Duration::minutes(-5), false).state(now),
            SessionState::Expired
        );
        assert_eq!(
            session(Duration::minutes(5), true).state(now),
            SessionState::Revoked
        );
        assert_eq!(
            session(Duration::minutes(-5), true).state(now),
            SessionState::Revoked
        );
    }

    #[test]
    fn test_session_expiring_now_is_expired() {
        let mut s = session(Duration::minutes(5), false);
        let now = s.expires_at;
        s.created_at = now - Duration::minutes(5);
        assert_eq!(s.state(now), SessionState::Expired);
        assert!(!s.is_active(now));
    }

    #[test]
    fn test_account_view_hides_hash() {
        let account = Account::new("a@x.com".to_string(), "$argon2id$secret".to_string());
        let view = AccountView::from(&account);
        let json = serde_json::to_string(&view).unwrap();

        assert_eq!(view.id, account.id);
        assert_eq!(view.email, "a@x.com");
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("password"));
    }

    #[test]
    fn test_issued_session_copies_refresh_expiry() {
        let now = Utc::now();
        let tokens = TokenPair {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at: now + Duration::days(7),
            access_expires_at: now + Duration::minutes(15),
        };
        let account_id = Uuid::new_v4();
        let s = Session::issue(account_id, &tokens);

        assert_eq!(s.account_id, account_id);
        assert_eq!(s.token, "refresh");
        assert_eq!(s.expires_at, tokens.expires_at);
        assert!(!s.is_revoked);
    }
}
