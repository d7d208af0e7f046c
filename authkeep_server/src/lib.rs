//! HTTP front end for the authkeep credential engine.
//!
//! The binary in `main.rs` wires configuration, logging and storage together
//! and serves the router from [`api::create_router`].

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
