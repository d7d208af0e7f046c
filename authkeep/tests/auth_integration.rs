//! Integration tests for the authentication engine.
//!
//! Runs registration, login and refresh rotation flows against the
//! in-memory stores. The PostgreSQL variants at the bottom need a running
//! database (`DATABASE_URL`) and are ignored by default.

use authkeep::auth::{AuthError, AuthManager, SessionState};
use authkeep::db::{
    AccountRepository, Database, DatabaseConfig, InMemoryAccountRepository,
    InMemorySessionRepository, PgAccountRepository, PgSessionRepository,
};
use authkeep::security::{Argon2Hasher, JwtTokenIssuer, TokenConfig};
use chrono::Utc;
use std::sync::Arc;

const JWT_SECRET: &str = "test_secret_key_for_jwt_signing_0123";

/// Helper to create test auth manager with in-memory stores
fn setup_auth_manager() -> (AuthManager, Arc<InMemorySessionRepository>) {
    let sessions = Arc::new(InMemorySessionRepository::new());
    let auth = AuthManager::new(
        Arc::new(InMemoryAccountRepository::new()),
        sessions.clone(),
        Arc::new(Argon2Hasher::with_params("test_pepper".to_string(), 8, 1, 1).unwrap()),
        Arc::new(JwtTokenIssuer::new(JWT_SECRET, TokenConfig::default())),
    );
    (auth, sessions)
}

#[tokio::test]
async fn test_full_rotation_scenario() {
    let (auth, _) = setup_auth_manager();

    auth.register("a@x.com", "pw1")
        .await
        .expect("Registration should succeed");

    let t1 = auth
        .authenticate("a@x.com", "pw1")
        .await
        .expect("Login should succeed");

    let t2 = auth
        .refresh(&t1.tokens.refresh_token)
        .await
        .expect("First refresh should succeed");
    assert_ne!(t2.tokens.refresh_token, t1.tokens.refresh_token);

    let replay = auth.refresh(&t1.tokens.refresh_token).await;
    assert!(
        matches!(replay, Err(AuthError::InvalidRefreshToken)),
        "Rotated-out token must be rejected"
    );

    auth.refresh(&t2.tokens.refresh_token)
        .await
        .expect("Rotated-in token should work");
}

#[tokio::test]
async fn test_register_projection_has_no_secret() {
    let (auth, _) = setup_auth_manager();

    let view = auth
        .register("player@example.com", "SecurePass123")
        .await
        .unwrap();
    let json = serde_json::to_value(&view).unwrap();

    let object = json.as_object().unwrap();
    assert_eq!(object.len(), 2);
    assert!(object.contains_key("id"));
    assert_eq!(object["email"], "player@example.com");
    assert!(!json.to_string().contains("SecurePass123"));
    assert!(!json.to_string().contains("argon2"));
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let (auth, _) = setup_auth_manager();

    auth.register("dup@example.com", "Password123")
        .await
        .expect("First registration should succeed");

    let result = auth.register("dup@example.com", "Password456").await;
    assert!(
        matches!(result, Err(AuthError::EmailTaken)),
        "Should return EmailTaken error"
    );

    // The original password still works
    assert!(auth.authenticate("dup@example.com", "Password123").await.is_ok());
}

#[tokio::test]
async fn test_login_expiry_is_in_the_future() {
    let (auth, sessions) = setup_auth_manager();
    auth.register("a@x.com", "pw1").await.unwrap();

    let before = Utc::now();
    let result = auth.authenticate("a@x.com", "pw1").await.unwrap();

    assert!(result.tokens.expires_at > before);
    assert!(result.tokens.access_expires_at > before);

    let stored = sessions.sessions();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].state(Utc::now()), SessionState::Active);
}

#[tokio::test]
async fn test_login_errors_do_not_enumerate() {
    let (auth, _) = setup_auth_manager();
    auth.register("known@example.com", "CorrectPass123")
        .await
        .unwrap();

    let wrong = auth
        .authenticate("known@example.com", "WrongPass123")
        .await
        .unwrap_err();
    let unknown = auth
        .authenticate("unknown@example.com", "CorrectPass123")
        .await
        .unwrap_err();

    assert!(matches!(wrong, AuthError::InvalidCredentials));
    assert!(matches!(unknown, AuthError::InvalidCredentials));
    assert_eq!(wrong.client_message(), unknown.client_message());
}

#[tokio::test]
async fn test_concurrent_registrations() {
    let (auth, _) = setup_auth_manager();
    let auth = Arc::new(auth);

    let mut handles = vec![];
    for i in 0..10 {
        let auth_clone = Arc::clone(&auth);
        handles.push(tokio::spawn(async move {
            auth_clone
                .register(&format!("concurrent_{i}@example.com"), "Password123")
                .await
        }));
    }

    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }
}

#[tokio::test]
async fn test_concurrent_duplicate_registration_has_one_winner() {
    let (auth, _) = setup_auth_manager();
    let auth = Arc::new(auth);

    let mut handles = vec![];
    for _ in 0..5 {
        let auth_clone = Arc::clone(&auth);
        handles.push(tokio::spawn(async move {
            auth_clone.register("same@example.com", "Password123").await
        }));
    }

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(e) => assert!(matches!(e, AuthError::EmailTaken)),
        }
    }
    assert_eq!(created, 1);
}

// ============================================================================
// PostgreSQL-backed tests
// ============================================================================

async fn setup_pg_auth_manager() -> (AuthManager, Database) {
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://postgres@localhost/authkeep_test".to_string());

    let config = DatabaseConfig {
        database_url,
        max_connections: 5,
        min_connections: 1,
        connection_timeout_secs: 5,
        idle_timeout_secs: 300,
        max_lifetime_secs: 1800,
    };

    let db = Database::new(&config)
        .await
        .expect("Failed to create test database");
    db.migrate().await.expect("Migration failed");

    let auth = AuthManager::new(
        Arc::new(PgAccountRepository::new(db.pool().clone())),
        Arc::new(PgSessionRepository::new(db.pool().clone())),
        Arc::new(Argon2Hasher::with_params("test_pepper".to_string(), 8, 1, 1).unwrap()),
        Arc::new(JwtTokenIssuer::new(JWT_SECRET, TokenConfig::default())),
    );
    (auth, db)
}

fn unique_email(prefix: &str) -> String {
    format!("{}_{}@example.com", prefix, uuid::Uuid::new_v4().simple())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
async fn test_pg_rotation_scenario() {
    let (auth, _db) = setup_pg_auth_manager().await;
    let email = unique_email("pg_rotation");

    auth.register(&email, "pw1").await.unwrap();
    let t1 = auth.authenticate(&email, "pw1").await.unwrap();
    let t2 = auth.refresh(&t1.tokens.refresh_token).await.unwrap();

    assert!(matches!(
        auth.refresh(&t1.tokens.refresh_token).await,
        Err(AuthError::InvalidRefreshToken)
    ));
    assert!(auth.refresh(&t2.tokens.refresh_token).await.is_ok());
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
async fn test_pg_duplicate_email_maps_to_conflict() {
    let (auth, db) = setup_pg_auth_manager().await;
    let email = unique_email("pg_duplicate");

    auth.register(&email, "pw1").await.unwrap();
    assert!(matches!(
        auth.register(&email, "pw2").await,
        Err(AuthError::EmailTaken)
    ));

    let accounts = PgAccountRepository::new(db.pool().clone());
    assert!(accounts.find_by_email(&email).await.unwrap().is_some());
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
async fn test_pg_concurrent_refresh_has_one_winner() {
    let (auth, _db) = setup_pg_auth_manager().await;
    let email = unique_email("pg_race");

    auth.register(&email, "pw1").await.unwrap();
    let t1 = auth.authenticate(&email, "pw1").await.unwrap();

    let mut handles = vec![];
    for _ in 0..8 {
        let auth = auth.clone();
        let token = t1.tokens.refresh_token.clone();
        handles.push(tokio::spawn(async move { auth.refresh(&token).await }));
    }

    let mut winners = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
}
