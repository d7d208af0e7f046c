//! In-memory account and session stores.
//!
//! Same contracts as the PostgreSQL repositories (unique emails, atomic
//! conditional revoke), held in process memory. Used by tests and for
//! running the server without a database.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

use super::repository::{AccountRepository, SessionRepository};
use crate::auth::{Account, AccountId, AuthError, AuthResult, Session, SessionId, StorageError};

fn lock<T>(mutex: &Mutex<T>) -> AuthResult<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| StorageError::Backend("store lock poisoned".to_string()).into())
}

/// In-memory `AccountRepository`
#[derive(Default)]
pub struct InMemoryAccountRepository {
    accounts: Mutex<HashMap<AccountId, Account>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts
    pub fn len(&self) -> usize {
        self.accounts.lock().map(|a| a.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop an account, leaving its sessions dangling
    pub fn remove(&self, id: AccountId) -> Option<Account> {
        self.accounts.lock().ok()?.remove(&id)
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn create(&self, account: &Account) -> AuthResult<()> {
        let mut accounts = lock(&self.accounts)?;
        if accounts.values().any(|a| a.email == account.email) {
            return Err(AuthError::EmailTaken);
        }
        accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: AccountId) -> AuthResult<Option<Account>> {
        Ok(lock(&self.accounts)?.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AuthResult<Option<Account>> {
        Ok(lock(&self.accounts)?
            .values()
            .find(|a| a.email == email)
            .cloned())
    }
}

/// In-memory `SessionRepository`
#[derive(Default)]
pub struct InMemorySessionRepository {
    sessions: Mutex<HashMap<SessionId, Session>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored session, revoked and expired included
    pub fn sessions(&self) -> Vec<Session> {
        self.sessions
            .lock()
            .map(|s| s.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Sessions for one account
    pub fn sessions_for(&self, account_id: AccountId) -> Vec<Session> {
        self.sessions()
            .into_iter()
            .filter(|s| s.account_id == account_id)
            .collect()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn create(&self, session: &Session) -> AuthResult<()> {
        let mut sessions = lock(&self.sessions)?;
        if sessions.values().any(|s| s.token == session.token) {
            return Err(StorageError::Backend("duplicate refresh token".to_string()).into());
        }
        sessions.insert(session.id, session.clone());
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> AuthResult<Option<Session>> {
        let sessions = lock(&self.sessions)?;
        let candidates: Vec<&Session> = sessions.values().collect();

        // Every entry is compared; the hit index is picked without branching
        let mut found = Choice::from(0);
        let mut index = 0u64;
        for (i, session) in candidates.iter().enumerate() {
            let hit = session.token.as_bytes().ct_eq(token.as_bytes());
            index.conditional_assign(&(i as u64), hit);
            found |= hit;
        }

        if bool::from(found) {
            Ok(candidates.get(index as usize).map(|s| (*s).clone()))
        } else {
            Ok(None)
        }
    }

    async fn revoke(&self, id: SessionId) -> AuthResult<()> {
        if let Some(session) = lock(&self.sessions)?.get_mut(&id) {
            session.is_revoked = true;
        }
        Ok(())
    }

    async fn revoke_if_active(&self, id: SessionId) -> AuthResult<bool> {
        let mut sessions = lock(&self.sessions)?;
        match sessions.get_mut(&id) {
            Some(session) if !session.is_revoked => {
                session.is_revoked = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn session(account_id: AccountId) -> Session {
        let now = Utc::now();
        Session {
            id: Uuid::new_v4(),
            account_id,
            token: Uuid::new_v4().to_string(),
            expires_at: now + Duration::days(7),
            is_revoked: false,
            created_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_and_find_account() {
        let repo = InMemoryAccountRepository::new();
        let account = Account::new("a@x.com".to_string(), "hash".to_string());

        repo.create(&account).await.expect("Failed to create account");

        let by_email = repo.find_by_email("a@x.com").await.unwrap();
        assert_eq!(by_email.unwrap().id, account.id);

        let by_id = repo.find_by_id(account.id).await.unwrap();
        assert_eq!(by_id.unwrap().email, "a@x.com");

        assert!(repo.find_by_email("b@x.com").await.unwrap().is_none());
        assert!(repo.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let repo = InMemoryAccountRepository::new();
        repo.create(&Account::new("a@x.com".to_string(), "h1".to_string()))
            .await
            .unwrap();

        let result = repo
            .create(&Account::new("a@x.com".to_string(), "h2".to_string()))
            .await;

        assert!(matches!(result, Err(AuthError::EmailTaken)));
        assert_eq!(repo.len(), 1);
        let stored = repo.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(stored.password_hash, "h1", "Original account must not be overwritten");
    }

    #[tokio::test]
    async fn test_email_lookup_is_case_sensitive() {
        let repo = InMemoryAccountRepository::new();
        repo.create(&Account::new("A@x.com".to_string(), "h".to_string()))
            .await
            .unwrap();

        assert!(repo.find_by_email("a@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_session_by_token() {
        let repo = InMemorySessionRepository::new();
        let s = session(Uuid::new_v4());
        repo.create(&s).await.unwrap();

        let found = repo.find_by_token(&s.token).await.unwrap();
        assert_eq!(found.unwrap().id, s.id);
        assert!(repo.find_by_token("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_session_by_token_among_many() {
        let repo = InMemorySessionRepository::new();
        let stored: Vec<Session> = (0..16).map(|_| session(Uuid::new_v4())).collect();
        for s in &stored {
            repo.create(s).await.unwrap();
        }

        for s in &stored {
            let found = repo.find_by_token(&s.token).await.unwrap().unwrap();
            assert_eq!(found.id, s.id);
            assert_eq!(found.token, s.token);
        }

        let unknown = Uuid::new_v4().to_string();
        assert!(repo.find_by_token(&unknown).await.unwrap().is_none());
        assert!(repo.find_by_token("").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_token_on_empty_store() {
        let repo = InMemorySessionRepository::new();
        assert!(repo.find_by_token("anything").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_revoke_if_active_wins_once() {
        let repo = InMemorySessionRepository::new();
        let s = session(Uuid::new_v4());
        repo.create(&s).await.unwrap();

        assert!(repo.revoke_if_active(s.id).await.unwrap());
        assert!(!repo.revoke_if_active(s.id).await.unwrap());
        assert!(!repo.revoke_if_active(Uuid::new_v4()).await.unwrap());

        let stored = repo.find_by_token(&s.token).await.unwrap().unwrap();
        assert!(stored.is_revoked);
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let repo = InMemorySessionRepository::new();
        let s = session(Uuid::new_v4());
        repo.create(&s).await.unwrap();

        repo.revoke(s.id).await.unwrap();
        repo.revoke(s.id).await.unwrap();
        repo.revoke(Uuid::new_v4()).await.unwrap();

        assert!(repo.sessions()[0].is_revoked);
    }

    #[tokio::test]
    async fn test_sessions_for_account() {
        let repo = InMemorySessionRepository::new();
        let account_id = Uuid::new_v4();
        repo.create(&session(account_id)).await.unwrap();
        repo.create(&session(account_id)).await.unwrap();
        repo.create(&session(Uuid::new_v4())).await.unwrap();

        assert_eq!(repo.sessions_for(account_id).len(), 2);
        assert_eq!(repo.sessions().len(), 3);
    }
}
