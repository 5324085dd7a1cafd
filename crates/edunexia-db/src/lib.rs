//! # EdunexIA DB
//!
//! PostgreSQL connection pool initialization and schema migrations.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
//!
//! # Example
//!
//! ```ignore
//! use edunexia_db::{init_db_pool, run_migrations};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pool = init_db_pool().await?;
//!     run_migrations(&pool).await?;
//!     Ok(())
//! }
//! ```

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::env;

pub use sqlx::PgPool;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Connects a pool using `DATABASE_URL`.
///
/// The returned pool is cheaply cloneable and is shared through `AppState`.
pub async fn init_db_pool() -> anyhow::Result<PgPool> {
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_MAX_CONNECTIONS);

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!(max_connections, "Database pool initialized");
    Ok(pool)
}

/// Applies the SQL migrations embedded from the workspace `migrations/` directory.
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations applied");
    Ok(())
}
