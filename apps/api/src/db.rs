use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates the connection pool for the navigation menu tables.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to menu database...");

    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect(database_url)
        .await
        .context("Failed to connect to the menu database (DATABASE_URL)")?;

    info!("Menu database pool established");
    Ok(pool)
}

/// Applies the menu table migrations under `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to apply menu database migrations")?;

    info!("Menu database migrations applied");
    Ok(())
}
