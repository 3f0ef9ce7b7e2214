use async_trait::async_trait;
use sqlx::SqlitePool;

use album_core::sticker::Sticker;
use album_core::storage::UserStickerStore;
use album_core::user_sticker::{NewUserSticker, OwnedSticker};
use album_core::StorageError;

use crate::db_err;

/// SQLite implementation of UserStickerStore.
#[derive(Clone)]
pub struct SqliteUserStickerStore {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct OwnedStickerRow {
    id: i64,
    amount: i64,
    user_id: i64,
    sticker_id: i64,
    catalog_id: i64,
    number: i64,
    name: Option<String>,
    team: Option<String>,
}

impl From<OwnedStickerRow> for OwnedSticker {
    fn from(row: OwnedStickerRow) -> Self {
        Self {
            id: row.id,
            amount: row.amount,
            user_id: row.user_id,
            sticker_id: row.sticker_id,
            sticker: Sticker {
                id: row.catalog_id,
                number: row.number,
                name: row.name,
                team: row.team,
            },
        }
    }
}

impl SqliteUserStickerStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStickerStore for SqliteUserStickerStore {
    async fn add_one(&self, row: NewUserSticker) -> Result<OwnedSticker, StorageError> {
        // Insert-or-increment in one statement so concurrent collects of the
        // same pair cannot lose an update.
        sqlx::query(
            r#"
            INSERT INTO user_stickers (user_id, sticker_id, amount)
            VALUES (?, ?, ?)
            ON CONFLICT (user_id, sticker_id)
            DO UPDATE SET amount = amount + 1, updated_at = datetime('now')
            "#,
        )
        .bind(row.user_id)
        .bind(row.sticker_id)
        .bind(row.amount)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        let fetched = sqlx::query_as::<_, OwnedStickerRow>(
            r#"
            SELECT us.id, us.amount, us.user_id, us.sticker_id,
                   s.id AS catalog_id, s.number, s.name, s.team
            FROM user_stickers us
            JOIN stickers s ON s.id = us.sticker_id
            WHERE us.user_id = ? AND us.sticker_id = ?
            "#,
        )
        .bind(row.user_id)
        .bind(row.sticker_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(fetched.into())
    }

    async fn find_by_user_and_number(
        &self,
        user_id: i64,
        number: i64,
    ) -> Result<Option<OwnedSticker>, StorageError> {
        let row = sqlx::query_as::<_, OwnedStickerRow>(
            r#"
            SELECT us.id, us.amount, us.user_id, us.sticker_id,
                   s.id AS catalog_id, s.number, s.name, s.team
            FROM user_stickers us
            JOIN stickers s ON s.id = us.sticker_id
            WHERE us.user_id = ? AND s.number = ?
            "#,
        )
        .bind(user_id)
        .bind(number)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(row.map(Into::into))
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<OwnedSticker>, StorageError> {
        let rows = sqlx::query_as::<_, OwnedStickerRow>(
            r#"
            SELECT us.id, us.amount, us.user_id, us.sticker_id,
                   s.id AS catalog_id, s.number, s.name, s.team
            FROM user_stickers us
            JOIN stickers s ON s.id = us.sticker_id
            WHERE us.user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_duplicates_by_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<OwnedSticker>, StorageError> {
        let rows = sqlx::query_as::<_, OwnedStickerRow>(
            r#"
            SELECT us.id, us.amount, us.user_id, us.sticker_id,
                   s.id AS catalog_id, s.number, s.name, s.team
            FROM user_stickers us
            JOIN stickers s ON s.id = us.sticker_id
            WHERE us.user_id = ? AND us.amount > 1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn decrement_amount(&self, id: i64) -> Result<(), StorageError> {
        // Guarded so an interleaved decrement can never drive amount below 1.
        sqlx::query(
            r#"
            UPDATE user_stickers
            SET amount = amount - 1, updated_at = datetime('now')
            WHERE id = ? AND amount > 1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM user_stickers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }
}
