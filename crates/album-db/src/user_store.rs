use async_trait::async_trait;
use sqlx::SqlitePool;

use album_core::storage::UserStore;
use album_core::user::{NewUser, User, UserPatch};
use album_core::StorageError;

use crate::db_err;

/// SQLite implementation of UserStore.
#[derive(Clone)]
pub struct SqliteUserStore {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    password: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            password: row.password,
        }
    }
}

impl SqliteUserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, id: i64) -> Result<Option<User>, StorageError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, password FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(row.map(Into::into))
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn insert(&self, user: NewUser) -> Result<User, StorageError> {
        let result = sqlx::query("INSERT INTO users (name, email, password) VALUES (?, ?, ?)")
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        let id = result.last_insert_rowid();
        self.fetch(id).await?.ok_or(StorageError::RowNotFound(id))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StorageError> {
        self.fetch(id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, password FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(row.map(Into::into))
    }

    async fn list_except(&self, user_id: i64) -> Result<Vec<User>, StorageError> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, password FROM users WHERE id != ? ORDER BY id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(&self, id: i64, patch: UserPatch) -> Result<User, StorageError> {
        sqlx::query(
            r#"
            UPDATE users
            SET name = COALESCE(?, name),
                email = COALESCE(?, email),
                password = COALESCE(?, password),
                updated_at = datetime('now')
            WHERE id = ?
            "#,
        )
        .bind(&patch.name)
        .bind(&patch.email)
        .bind(&patch.password)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        self.fetch(id).await?.ok_or(StorageError::RowNotFound(id))
    }

    async fn delete(&self, id: i64) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }
}
