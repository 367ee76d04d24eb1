/**
 * Server Configuration
 *
 * Opens the SQLite event log described by the configuration and makes sure
 * its schema exists. Unlike optional services, the event log is required:
 * a failure here aborts startup.
 */

#[cfg(feature = "ssr")]
use sqlx::SqlitePool;

#[cfg(feature = "ssr")]
use crate::backend::persistence::{init_schema, open_pool};
#[cfg(feature = "ssr")]
use crate::shared::AppConfig;

/// Open the event log database and apply the schema
///
/// # Example
///
/// ```rust,no_run
/// use livecount::backend::server::config::load_database;
/// use livecount::shared::AppConfig;
///
/// # async fn example() -> Result<(), sqlx::Error> {
/// let pool = load_database(&AppConfig::default()).await?;
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "ssr")]
pub async fn load_database(config: &AppConfig) -> Result<SqlitePool, sqlx::Error> {
    tracing::info!("[Server] Opening event log at {}", config.database_url);

    let pool = open_pool(&config.database_url).await.map_err(|e| {
        tracing::error!("[Server] Failed to open database: {}", e);
        e
    })?;

    init_schema(&pool).await.map_err(|e| {
        tracing::error!("[Server] Failed to apply schema: {}", e);
        e
    })?;

    tracing::info!("[Server] Event log ready");
    Ok(pool)
}
