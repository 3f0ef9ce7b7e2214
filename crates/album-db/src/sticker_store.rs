use async_trait::async_trait;
use sqlx::SqlitePool;

use album_core::sticker::{NewSticker, Sticker};
use album_core::storage::StickerStore;
use album_core::StorageError;

use crate::db_err;

/// SQLite implementation of StickerStore.
#[derive(Clone)]
pub struct SqliteStickerStore {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct StickerRow {
    id: i64,
    number: i64,
    name: Option<String>,
    team: Option<String>,
}

impl From<StickerRow> for Sticker {
    fn from(row: StickerRow) -> Self {
        Self {
            id: row.id,
            number: row.number,
            name: row.name,
            team: row.team,
        }
    }
}

impl SqliteStickerStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, id: i64) -> Result<Option<Sticker>, StorageError> {
        let row = sqlx::query_as::<_, StickerRow>(
            "SELECT id, number, name, team FROM stickers WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(row.map(Into::into))
    }
}

#[async_trait]
impl StickerStore for SqliteStickerStore {
    async fn insert(&self, sticker: NewSticker) -> Result<Sticker, StorageError> {
        let result = sqlx::query("INSERT INTO stickers (number, name, team) VALUES (?, ?, ?)")
            .bind(sticker.number)
            .bind(&sticker.name)
            .bind(&sticker.team)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        let id = result.last_insert_rowid();
        self.fetch(id).await?.ok_or(StorageError::RowNotFound(id))
    }

    async fn insert_number(&self, number: i64) -> Result<Sticker, StorageError> {
        let result = sqlx::query("INSERT INTO stickers (number) VALUES (?)")
            .bind(number)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        let id = result.last_insert_rowid();
        self.fetch(id).await?.ok_or(StorageError::RowNotFound(id))
    }

    async fn find_by_number(&self, number: i64) -> Result<Option<Sticker>, StorageError> {
        let row = sqlx::query_as::<_, StickerRow>(
            "SELECT id, number, name, team FROM stickers WHERE number = ?",
        )
        .bind(number)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(row.map(Into::into))
    }

    async fn list(&self) -> Result<Vec<Sticker>, StorageError> {
        let rows = sqlx::query_as::<_, StickerRow>(
            "SELECT id, number, name, team FROM stickers ORDER BY number ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_pool;

    #[tokio::test]
    async fn insert_number_leaves_name_and_team_empty() {
        let store = SqliteStickerStore::new(test_pool().await);

        let sticker = store.insert_number(7).await.unwrap();
        assert_eq!(sticker.number, 7);
        assert_eq!(sticker.name, None);
        assert_eq!(sticker.team, None);
    }

    #[tokio::test]
    async fn insert_full_entry_and_find_by_number() {
        let store = SqliteStickerStore::new(test_pool().await);

        store
            .insert(NewSticker {
                number: 10,
                name: "Player 10".to_string(),
                team: "Brazil".to_string(),
            })
            .await
            .unwrap();

        let found = store.find_by_number(10).await.unwrap().unwrap();
        assert_eq!(found.name.as_deref(), Some("Player 10"));
        assert_eq!(found.team.as_deref(), Some("Brazil"));
        assert!(store.find_by_number(11).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_number_violates_constraint() {
        let store = SqliteStickerStore::new(test_pool().await);
        store.insert_number(7).await.unwrap();

        let result = store.insert_number(7).await;
        assert!(matches!(result, Err(StorageError::Database(_))));
    }

    #[tokio::test]
    async fn list_is_ordered_by_number() {
        let store = SqliteStickerStore::new(test_pool().await);
        store.insert_number(3).await.unwrap();
        store.insert_number(1).await.unwrap();
        store.insert_number(2).await.unwrap();

        let numbers: Vec<i64> = store.list().await.unwrap().iter().map(|s| s.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }
}
