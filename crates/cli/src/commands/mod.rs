//! CLI subcommands.

pub mod admin;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use stockroom_admin::db::{self, PoolSettings};

/// Failure to reach the admin database.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("Missing environment variable: ADMIN_DATABASE_URL (or DATABASE_URL)")]
    MissingDatabaseUrl,

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Connect to the admin database named by `ADMIN_DATABASE_URL` or `DATABASE_URL`.
///
/// # Errors
///
/// Returns `ConnectError` if neither variable is set or the connection fails.
pub async fn connect() -> Result<PgPool, ConnectError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("ADMIN_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| ConnectError::MissingDatabaseUrl)?;

    tracing::info!("Connecting to admin database...");
    let settings = PoolSettings {
        max_connections: 2,
        ..PoolSettings::default()
    };
    Ok(db::create_pool(&database_url, settings).await?)
}
