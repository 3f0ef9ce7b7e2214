//! Album DB - SQLite implementations of the storage traits.

pub mod exchange_store;
pub mod notification_store;
pub mod sticker_store;
pub mod user_sticker_store;
pub mod user_store;

pub use exchange_store::SqliteExchangeStore;
pub use notification_store::SqliteNotificationStore;
pub use sticker_store::SqliteStickerStore;
pub use user_sticker_store::SqliteUserStickerStore;
pub use user_store::SqliteUserStore;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

use album_core::StorageError;

/// Initialize the database connection pool with recommended pragmas.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_secs(5))
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

    SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await
}

/// Create the schema. Statements are idempotent and ordered so that
/// referenced tables exist first.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in [
        include_str!("../migrations/001_users.sql"),
        include_str!("../migrations/002_stickers.sql"),
        include_str!("../migrations/003_user_stickers.sql"),
        include_str!("../migrations/004_notifications.sql"),
        include_str!("../migrations/005_exchanges.sql"),
    ] {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

pub(crate) fn db_err(e: sqlx::Error) -> StorageError {
    StorageError::Database(e.to_string())
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    // A single connection keeps every query on the same in-memory database.
    // Each store is exercised in isolation against its own table, so foreign
    // keys are left unenforced here rather than seeding the whole graph.
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(false);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();
    run_migrations(&pool).await.unwrap();
    pool
}
