use async_trait::async_trait;
use sqlx::SqlitePool;

use album_core::notification::{NewNotification, Notification};
use album_core::storage::NotificationStore;
use album_core::StorageError;

use crate::db_err;

/// SQLite implementation of NotificationStore.
#[derive(Clone)]
pub struct SqliteNotificationStore {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct NotificationRow {
    id: i64,
    from_user: i64,
    to_user: i64,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Self {
            id: row.id,
            from: row.from_user,
            to: row.to_user,
        }
    }
}

impl SqliteNotificationStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for SqliteNotificationStore {
    async fn insert(&self, notification: NewNotification) -> Result<Notification, StorageError> {
        let result = sqlx::query("INSERT INTO notifications (from_user, to_user) VALUES (?, ?)")
            .bind(notification.from)
            .bind(notification.to)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        let id = result.last_insert_rowid();
        self.find_by_id(id).await?.ok_or(StorageError::RowNotFound(id))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Notification>, StorageError> {
        let row = sqlx::query_as::<_, NotificationRow>(
            "SELECT id, from_user, to_user FROM notifications WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(row.map(Into::into))
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Notification>, StorageError> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            "SELECT id, from_user, to_user FROM notifications WHERE to_user = ? ORDER BY id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
