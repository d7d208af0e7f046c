//! # Authkeep
//!
//! Credential and refresh-session lifecycle engine.
//!
//! The engine registers accounts, verifies passwords, and mints short-lived
//! access tokens backed by long-lived, single-use refresh tokens. Storage,
//! hashing and signing are reached through traits so the engine itself stays
//! free of transport and persistence details.
//!
//! ## Refresh session lifecycle
//!
//! A refresh session, as seen by a refresh call, is in one of four states:
//!
//! - **Unknown**: no session carries the presented token
//! - **Revoked**: already rotated out
//! - **Expired**: past its absolute expiry
//! - **Active**: may be rotated exactly once
//!
//! Only an active session can be rotated. Rotation persists the new session
//! first and then atomically claims the old one, so concurrent callers
//! presenting the same token get exactly one winner.
//!
//! ## Core Modules
//!
//! - [`auth`]: The engine ([`AuthManager`]), models and errors
//! - [`security`]: Password hashing and token issuing capabilities
//! - [`db`]: Account and session stores (PostgreSQL and in-memory)

/// Registration, login and refresh rotation.
pub mod auth;
pub use auth::{AuthError, AuthManager, AuthResult};

/// Storage collaborators.
pub mod db;

/// Hashing and signing collaborators.
pub mod security;
