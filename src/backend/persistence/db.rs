/**
 * SQLite Event Log
 *
 * The persistent log is an append-only `counter_events` table in SQLite.
 * The pool is restricted to a single connection: the batch writer is the
 * only writer, and one connection avoids lock contention inside the
 * embedded database.
 *
 * Batches are written through the [`EventStore`] trait so the writer can be
 * exercised against other stores; [`SqliteEventStore`] is the production
 * implementation and commits each batch as one transaction.
 */
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::shared::{CounterAction, MutationEvent};

/// Schema of the persistent event log
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS counter_events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    client_id TEXT NOT NULL CHECK (length(client_id) > 0),
    action TEXT NOT NULL CHECK (action IN ('increment', 'decrement', 'reset')),
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_counter_events_created_at ON counter_events (created_at);
"#;

const INSERT_EVENT: &str =
    "INSERT INTO counter_events (client_id, action, created_at) VALUES (?, ?, ?)";

/// Errors raised by the persistent log
#[derive(Debug, Error)]
pub enum StoreError {
    /// Any database failure (begin, insert, commit, query)
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// An insert failed and rolling the transaction back failed too
    #[error("insert failed: {insert}; rollback failed: {rollback}")]
    Rollback {
        insert: sqlx::Error,
        rollback: sqlx::Error,
    },

    /// A stored row could not be turned back into an event
    #[error("corrupt event row {id}: {message}")]
    CorruptRow { id: i64, message: String },
}

/// Destination of committed mutation event batches
pub trait EventStore: Send + Sync + 'static {
    /// Persist `events` atomically: all of them or none
    fn insert_batch(
        &self,
        events: &[MutationEvent],
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Open the SQLite pool used by the event log
///
/// Creates the database file if needed, switches it to WAL with
/// `synchronous=NORMAL` and a one second busy timeout, and limits the pool
/// to a single long-lived connection.
pub async fn open_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_millis(1000));

    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
}

/// Create the event table if it does not exist
pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    Ok(())
}

/// Number of events in the log
pub async fn count_events(pool: &SqlitePool) -> Result<i64, StoreError> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM counter_events")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Most recent events, newest first
pub async fn recent_events(pool: &SqlitePool, limit: u32) -> Result<Vec<MutationEvent>, StoreError> {
    let rows = sqlx::query(
        "SELECT id, client_id, action, created_at FROM counter_events ORDER BY id DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| -> Result<MutationEvent, StoreError> {
            let id: i64 = row.try_get("id")?;
            let action: String = row.try_get("action")?;
            let action = CounterAction::from_str(&action).map_err(|e| StoreError::CorruptRow {
                id,
                message: e.to_string(),
            })?;
            let created_at: DateTime<Utc> = row.try_get("created_at")?;
            Ok(MutationEvent::at(
                row.try_get::<String, _>("client_id")?,
                action,
                created_at,
            ))
        })
        .collect()
}

/// Event log backed by a SQLite pool
#[derive(Clone, Debug)]
pub struct SqliteEventStore {
    pool: SqlitePool,
}

impl SqliteEventStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl EventStore for SqliteEventStore {
    async fn insert_batch(&self, events: &[MutationEvent]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        for event in events {
            let inserted = sqlx::query(INSERT_EVENT)
                .bind(&event.client_id)
                .bind(event.action.as_str())
                .bind(event.created_at)
                .execute(&mut *tx)
                .await;

            if let Err(insert) = inserted {
                return match tx.rollback().await {
                    Ok(()) => Err(StoreError::Database(insert)),
                    Err(rollback) => Err(StoreError::Rollback { insert, rollback }),
                };
            }
        }

        tx.commit().await?;
        Ok(())
    }
}
