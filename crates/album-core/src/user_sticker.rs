use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, ValidationError};
use crate::sticker::{Sticker, StickerService};
use crate::storage::{StickerStore, UserStickerStore};
use crate::user::UserService;
use crate::validation::required_i64;

/// A per-user count of copies of one catalog sticker. At most one row
/// exists per (user, sticker) pair; extra copies increment `amount`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSticker {
    pub id: i64,
    pub amount: i64,
    pub user_id: i64,
    pub sticker_id: i64,
}

/// A user-sticker row joined with its catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnedSticker {
    pub id: i64,
    pub amount: i64,
    pub user_id: i64,
    pub sticker_id: i64,
    pub sticker: Sticker,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserStickerInput {
    pub amount: Option<i64>,
    pub user_id: Option<i64>,
    pub sticker_id: Option<i64>,
}

/// A validated, not-yet-persisted user-sticker row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUserSticker {
    pub amount: i64,
    pub user_id: i64,
    pub sticker_id: i64,
}

impl NewUserSticker {
    /// First violation wins: amount, then user_id, then sticker_id.
    pub fn new(input: UserStickerInput) -> Result<Self, ValidationError> {
        let amount = required_i64(input.amount, "amount")?;
        if amount < 1 {
            return Err(ValidationError::AmountTooSmall(amount));
        }
        let user_id = required_i64(input.user_id, "user_id")?;
        let sticker_id = required_i64(input.sticker_id, "sticker_id")?;
        Ok(Self {
            amount,
            user_id,
            sticker_id,
        })
    }
}

/// Accounting over collected stickers: collecting increments, returning
/// decrements, and a row disappears with its last copy.
#[derive(Clone)]
pub struct UserStickerService {
    store: Arc<dyn UserStickerStore>,
    sticker_store: Arc<dyn StickerStore>,
    users: UserService,
    stickers: StickerService,
}

impl UserStickerService {
    pub fn new(
        store: Arc<dyn UserStickerStore>,
        sticker_store: Arc<dyn StickerStore>,
        users: UserService,
        stickers: StickerService,
    ) -> Self {
        Self {
            store,
            sticker_store,
            users,
            stickers,
        }
    }

    /// Record one collected copy of the given catalog number.
    ///
    /// The catalog row is created on first sight of the number. The owned
    /// row is inserted with amount 1 or incremented, in a single upsert at
    /// the store so concurrent collects cannot lose an update.
    pub async fn create(
        &self,
        user_id: i64,
        sticker_number: i64,
    ) -> Result<OwnedSticker, ServiceError> {
        let user = self.users.get_by_id(user_id).await?;
        let sticker = match self.stickers.get_by_number(sticker_number).await? {
            Some(sticker) => sticker,
            None => self.sticker_store.insert_number(sticker_number).await?,
        };
        let row = NewUserSticker::new(UserStickerInput {
            amount: Some(1),
            user_id: Some(user.id),
            sticker_id: Some(sticker.id),
        })?;
        Ok(self.store.add_one(row).await?)
    }

    /// Return one copy of the given catalog number; the row is deleted when
    /// the last copy goes, decremented otherwise.
    pub async fn delete_by_number(
        &self,
        user_id: i64,
        sticker_number: i64,
    ) -> Result<(), ServiceError> {
        self.users.get_by_id(user_id).await?;
        let owned = self.get_sticker_by_user(user_id, sticker_number).await?;
        if owned.amount == 1 {
            self.store.delete(owned.id).await?;
        } else {
            self.store.decrement_amount(owned.id).await?;
        }
        Ok(())
    }

    /// The single owned row for a user and catalog number.
    pub async fn get_sticker_by_user(
        &self,
        user_id: i64,
        sticker_number: i64,
    ) -> Result<OwnedSticker, ServiceError> {
        self.store
            .find_by_user_and_number(user_id, sticker_number)
            .await?
            .ok_or_else(|| {
                ServiceError::Query(format!(
                    "User {user_id} does not own sticker {sticker_number}"
                ))
            })
    }

    /// Album listing, ascending by catalog number regardless of the order
    /// the store yields rows in.
    pub async fn get_all_stickers_by_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<OwnedSticker>, ServiceError> {
        let mut rows = self.store.list_by_user(user_id).await?;
        rows.sort_by_key(|row| row.sticker.number);
        Ok(rows)
    }

    /// Rows holding more than one copy. No ordering guarantee.
    pub async fn get_all_duplicates_by_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<OwnedSticker>, ServiceError> {
        Ok(self.store.list_duplicates_by_user(user_id).await?)
    }
}
