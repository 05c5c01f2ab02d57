use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::info;

use crate::config::AppConfig;

pub type DbPool = SqlitePool;

/// Application state holding the database connection pool
pub struct AppState {
  pub db: DbPool,
}

/// Initialize the database connection pool and run migrations
pub async fn initialize_db(config: &AppConfig) -> Result<DbPool, Box<dyn std::error::Error>> {
  info!(url = %config.database_url, "initializing database");

  let pool = SqlitePoolOptions::new()
    .max_connections(config.max_connections)
    .connect(&config.database_url)
    .await?;

  sqlx::migrate!("./migrations").run(&pool).await?;

  info!("database initialized");

  Ok(pool)
}
