/**
 * Server Configuration
 *
 * Selects the persistence backend at startup.
 *
 * # Error Handling
 *
 * Database problems are logged but do not prevent server startup. When
 * `DATABASE_URL` is unset or the connection fails, the server runs on the
 * in-memory store and state is lost on restart.
 */

use sqlx::PgPool;
use std::sync::Arc;

use crate::backend::store::{ChatStore, MemoryStore, PgStore};
use crate::shared::AppConfig;

/// Database configuration result
///
/// Contains the connection pool if successfully configured, or `None` if
/// the database is not available.
pub type DatabaseConfig = Option<PgPool>;

/// Connect to PostgreSQL and run the embedded migrations
///
/// # Returns
///
/// - `Some(PgPool)` if the database is reachable
/// - `None` if no URL is configured or the connection fails
pub async fn load_database(database_url: Option<&str>) -> DatabaseConfig {
    let Some(database_url) = database_url else {
        tracing::warn!("[Server] DATABASE_URL not set. Using the in-memory store.");
        return None;
    };

    tracing::info!("[Server] Connecting to database...");

    let pool = match PgPool::connect(database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("[Server] Failed to create database connection pool: {:?}", e);
            tracing::warn!("[Server] Falling back to the in-memory store.");
            return None;
        }
    };

    tracing::info!("[Server] Running database migrations...");
    match sqlx::migrate!().run(&pool).await {
        Ok(_) => tracing::info!("[Server] Database migrations completed successfully"),
        Err(e) => {
            tracing::error!("[Server] Failed to run database migrations: {}", e);
            // Continue anyway - migrations might have already been run
            tracing::warn!("[Server] Continuing without migrations - schema might not be up to date");
        }
    }

    Some(pool)
}

/// Build the store the server will use
pub async fn load_store(config: &AppConfig) -> Arc<dyn ChatStore> {
    match load_database(config.database_url.as_deref()).await {
        Some(pool) => Arc::new(PgStore::new(pool)),
        None => Arc::new(MemoryStore::new()),
    }
}
