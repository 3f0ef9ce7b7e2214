use async_trait::async_trait;
use sqlx::SqlitePool;

use album_core::exchange::{Exchange, NewExchange};
use album_core::storage::ExchangeStore;
use album_core::StorageError;

use crate::db_err;

/// SQLite implementation of ExchangeStore.
#[derive(Clone)]
pub struct SqliteExchangeStore {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct ExchangeRow {
    id: i64,
    notification_id: i64,
    sticker_number: i64,
    user_id: i64,
}

impl From<ExchangeRow> for Exchange {
    fn from(row: ExchangeRow) -> Self {
        Self {
            id: row.id,
            notification_id: row.notification_id,
            sticker_number: row.sticker_number,
            user_id: row.user_id,
        }
    }
}

impl SqliteExchangeStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExchangeStore for SqliteExchangeStore {
    async fn insert(&self, exchange: NewExchange) -> Result<Exchange, StorageError> {
        let result = sqlx::query(
            "INSERT INTO exchanges (notification_id, sticker_number, user_id) VALUES (?, ?, ?)",
        )
        .bind(exchange.notification_id)
        .bind(exchange.sticker_number)
        .bind(exchange.user_id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        let id = result.last_insert_rowid();
        let row = sqlx::query_as::<_, ExchangeRow>(
            "SELECT id, notification_id, sticker_number, user_id FROM exchanges WHERE id = ?",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(row.into())
    }

    async fn list_for_notification(
        &self,
        notification_id: i64,
    ) -> Result<Vec<Exchange>, StorageError> {
        let rows = sqlx::query_as::<_, ExchangeRow>(
            r#"
            SELECT id, notification_id, sticker_number, user_id
            FROM exchanges
            WHERE notification_id = ?
            ORDER BY id ASC
            "#,
        )
        .bind(notification_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
