//! Credential service: register, login and refresh-token rotation over HTTP.
//!
//! Accounts and sessions live in PostgreSQL by default; `--storage memory`
//! runs the service without a database for local development.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Error};
use authkeep::{
    AuthManager,
    db::{
        AccountRepository, Database, InMemoryAccountRepository, InMemorySessionRepository,
        PgAccountRepository, PgSessionRepository, SessionRepository,
    },
    security::{Argon2Hasher, JwtTokenIssuer},
};
use authkeep_server::{
    api,
    config::{self, ServerConfig, StorageBackend},
    logging, metrics,
};
use pico_args::Arguments;
use tracing::info;

const HELP: &str = "\
Run the authkeep credential service

USAGE:
  authkeep_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8080]
  --db-url     URL         Database connection string  [default: env DATABASE_URL]
  --storage    BACKEND     postgres or memory          [default: env STORAGE_BACKEND or postgres]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  DATABASE_URL             PostgreSQL connection string
  JWT_SECRET               JWT signing secret (at least 32 characters)
  PASSWORD_PEPPER          Password hashing pepper (at least 16 characters)
  ACCESS_TOKEN_TTL_SECS    Access token lifetime  [default: 900]
  REFRESH_TOKEN_TTL_SECS   Refresh token lifetime [default: 604800]
  METRICS_BIND             Prometheus exporter address (disabled when unset)
  RUST_LOG                 Log filter [default: info,sqlx=warn,hyper=warn]
";

struct Args {
    bind: Option<SocketAddr>,
    database_url: Option<String>,
    storage: Option<StorageBackend>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        bind: pargs.opt_value_from_str("--bind")?,
        database_url: pargs.opt_value_from_str("--db-url")?,
        storage: pargs.opt_value_from_fn("--storage", config::parse_storage)?,
    };

    logging::init();

    let config = ServerConfig::from_env(args.bind, args.database_url, args.storage)?;

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(|e| anyhow::anyhow!(e))?;
        info!("Prometheus exporter listening on {}", addr);
    }

    let (accounts, sessions, database): (
        Arc<dyn AccountRepository>,
        Arc<dyn SessionRepository>,
        Option<Database>,
    ) = match config.storage {
        StorageBackend::Postgres => {
            info!("Connecting to database");
            let db = Database::new(&config.database)
                .await
                .context("Failed to connect to database")?;
            db.migrate().await.context("Failed to apply schema")?;
            info!("Database connected successfully");

            (
                Arc::new(PgAccountRepository::new(db.pool().clone())),
                Arc::new(PgSessionRepository::new(db.pool().clone())),
                Some(db),
            )
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; accounts are lost on restart");
            (
                Arc::new(InMemoryAccountRepository::new()),
                Arc::new(InMemorySessionRepository::new()),
                None,
            )
        }
    };

    let auth_manager = Arc::new(AuthManager::new(
        accounts,
        sessions,
        Arc::new(Argon2Hasher::new(config.security.password_pepper.clone())),
        Arc::new(JwtTokenIssuer::new(
            &config.security.jwt_secret,
            config.tokens.to_token_config()?,
        )),
    ));

    let app = api::create_router(api::AppState {
        auth_manager,
        database: database.clone(),
    });

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down server...");
    if let Some(db) = database {
        db.close().await;
    }

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
