use async_trait::async_trait;

use crate::error::StorageError;
use crate::exchange::{Exchange, NewExchange};
use crate::notification::{NewNotification, Notification};
use crate::sticker::{NewSticker, Sticker};
use crate::user::{NewUser, User, UserPatch};
use crate::user_sticker::{NewUserSticker, OwnedSticker};

/// Store for collector accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: NewUser) -> Result<User, StorageError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StorageError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StorageError>;

    /// Every user except the given one.
    async fn list_except(&self, user_id: i64) -> Result<Vec<User>, StorageError>;

    async fn update(&self, id: i64, patch: UserPatch) -> Result<User, StorageError>;

    /// Returns false when no row existed.
    async fn delete(&self, id: i64) -> Result<bool, StorageError>;
}

/// Store for the sticker catalog.
#[async_trait]
pub trait StickerStore: Send + Sync {
    async fn insert(&self, sticker: NewSticker) -> Result<Sticker, StorageError>;

    /// Catalog row created from the collecting path: number only, name and
    /// team left empty.
    async fn insert_number(&self, number: i64) -> Result<Sticker, StorageError>;

    async fn find_by_number(&self, number: i64) -> Result<Option<Sticker>, StorageError>;

    /// Full catalog, ascending by number.
    async fn list(&self) -> Result<Vec<Sticker>, StorageError>;
}

/// Store for per-user sticker counts.
#[async_trait]
pub trait UserStickerStore: Send + Sync {
    /// Insert the row or, when the (user, sticker) pair already exists,
    /// increment its amount by one. A single atomic step either way; the
    /// row's amount is only used for the insert arm.
    async fn add_one(&self, row: NewUserSticker) -> Result<OwnedSticker, StorageError>;

    async fn find_by_user_and_number(
        &self,
        user_id: i64,
        number: i64,
    ) -> Result<Option<OwnedSticker>, StorageError>;

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<OwnedSticker>, StorageError>;

    /// Rows with amount > 1 only.
    async fn list_duplicates_by_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<OwnedSticker>, StorageError>;

    /// Decrement amount by one. A no-op when amount is already 1, so the
    /// amount >= 1 invariant holds under any interleaving.
    async fn decrement_amount(&self, id: i64) -> Result<(), StorageError>;

    /// Returns false when no row existed.
    async fn delete(&self, id: i64) -> Result<bool, StorageError>;
}

/// Store for exchange-offer notifications.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert(&self, notification: NewNotification) -> Result<Notification, StorageError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Notification>, StorageError>;

    /// Notifications addressed to the user.
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Notification>, StorageError>;
}

/// Store for exchange records.
#[async_trait]
pub trait ExchangeStore: Send + Sync {
    async fn insert(&self, exchange: NewExchange) -> Result<Exchange, StorageError>;

    async fn list_for_notification(
        &self,
        notification_id: i64,
    ) -> Result<Vec<Exchange>, StorageError>;
}

// In-memory implementations for testing
#[cfg(any(test, feature = "test-utils"))]
pub mod memory {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::{Arc, RwLock};

    use crate::user_sticker::UserSticker;

    fn next(counter: &AtomicI64) -> i64 {
        counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// In-memory user store for testing.
    #[derive(Default)]
    pub struct InMemoryUserStore {
        users: RwLock<Vec<User>>,
        next_id: AtomicI64,
    }

    impl InMemoryUserStore {
        pub fn new() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl UserStore for InMemoryUserStore {
        async fn insert(&self, user: NewUser) -> Result<User, StorageError> {
            let mut users = self.users.write().unwrap();
            let user = User {
                id: next(&self.next_id),
                name: user.name,
                email: user.email,
                password: user.password,
            };
            users.push(user.clone());
            Ok(user)
        }

        async fn find_by_id(&self, id: i64) -> Result<Option<User>, StorageError> {
            let users = self.users.read().unwrap();
            Ok(users.iter().find(|u| u.id == id).cloned())
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
            let users = self.users.read().unwrap();
            Ok(users.iter().find(|u| u.email == email).cloned())
        }

        async fn list_except(&self, user_id: i64) -> Result<Vec<User>, StorageError> {
            let users = self.users.read().unwrap();
            Ok(users.iter().filter(|u| u.id != user_id).cloned().collect())
        }

        async fn update(&self, id: i64, patch: UserPatch) -> Result<User, StorageError> {
            let mut users = self.users.write().unwrap();
            let user = users
                .iter_mut()
                .find(|u| u.id == id)
                .ok_or(StorageError::RowNotFound(id))?;
            if let Some(name) = patch.name {
                user.name = name;
            }
            if let Some(email) = patch.email {
                user.email = email;
            }
            if let Some(password) = patch.password {
                user.password = password;
            }
            Ok(user.clone())
        }

        async fn delete(&self, id: i64) -> Result<bool, StorageError> {
            let mut users = self.users.write().unwrap();
            let before = users.len();
            users.retain(|u| u.id != id);
            Ok(users.len() < before)
        }
    }

    /// In-memory catalog store for testing.
    #[derive(Default)]
    pub struct InMemoryStickerStore {
        stickers: RwLock<Vec<Sticker>>,
        next_id: AtomicI64,
    }

    impl InMemoryStickerStore {
        pub fn new() -> Self {
            Self::default()
        }

        fn by_id(&self, id: i64) -> Option<Sticker> {
            self.stickers.read().unwrap().iter().find(|s| s.id == id).cloned()
        }

        fn push(&self, number: i64, name: Option<String>, team: Option<String>) -> Sticker {
            let mut stickers = self.stickers.write().unwrap();
            let sticker = Sticker {
                id: next(&self.next_id),
                number,
                name,
                team,
            };
            stickers.push(sticker.clone());
            sticker
        }
    }

    #[async_trait]
    impl StickerStore for InMemoryStickerStore {
        async fn insert(&self, sticker: NewSticker) -> Result<Sticker, StorageError> {
            Ok(self.push(sticker.number, Some(sticker.name), Some(sticker.team)))
        }

        async fn insert_number(&self, number: i64) -> Result<Sticker, StorageError> {
            Ok(self.push(number, None, None))
        }

        async fn find_by_number(&self, number: i64) -> Result<Option<Sticker>, StorageError> {
            let stickers = self.stickers.read().unwrap();
            Ok(stickers.iter().find(|s| s.number == number).cloned())
        }

        async fn list(&self) -> Result<Vec<Sticker>, StorageError> {
            let mut stickers = self.stickers.read().unwrap().clone();
            stickers.sort_by_key(|s| s.number);
            Ok(stickers)
        }
    }

    /// In-memory user-sticker store for testing. Joins resolve against the
    /// shared catalog store.
    pub struct InMemoryUserStickerStore {
        rows: RwLock<Vec<UserSticker>>,
        next_id: AtomicI64,
        catalog: Arc<InMemoryStickerStore>,
    }

    impl InMemoryUserStickerStore {
        pub fn new(catalog: Arc<InMemoryStickerStore>) -> Self {
            Self {
                rows: RwLock::new(Vec::new()),
                next_id: AtomicI64::new(0),
                catalog,
            }
        }

        fn joined(&self, row: &UserSticker) -> Result<OwnedSticker, StorageError> {
            let sticker = self
                .catalog
                .by_id(row.sticker_id)
                .ok_or(StorageError::RowNotFound(row.sticker_id))?;
            Ok(OwnedSticker {
                id: row.id,
                amount: row.amount,
                user_id: row.user_id,
                sticker_id: row.sticker_id,
                sticker,
            })
        }
    }

    #[async_trait]
    impl UserStickerStore for InMemoryUserStickerStore {
        async fn add_one(&self, row: NewUserSticker) -> Result<OwnedSticker, StorageError> {
            let mut rows = self.rows.write().unwrap();
            let existing = rows
                .iter()
                .position(|r| r.user_id == row.user_id && r.sticker_id == row.sticker_id);
            let updated = match existing {
                Some(index) => {
                    rows[index].amount += 1;
                    rows[index].clone()
                }
                None => {
                    let created = UserSticker {
                        id: next(&self.next_id),
                        amount: row.amount,
                        user_id: row.user_id,
                        sticker_id: row.sticker_id,
                    };
                    rows.push(created.clone());
                    created
                }
            };
            drop(rows);
            self.joined(&updated)
        }

        async fn find_by_user_and_number(
            &self,
            user_id: i64,
            number: i64,
        ) -> Result<Option<OwnedSticker>, StorageError> {
            let sticker = match self.catalog.find_by_number(number).await? {
                Some(sticker) => sticker,
                None => return Ok(None),
            };
            let rows = self.rows.read().unwrap();
            rows.iter()
                .find(|r| r.user_id == user_id && r.sticker_id == sticker.id)
                .map(|r| self.joined(r))
                .transpose()
        }

        async fn list_by_user(&self, user_id: i64) -> Result<Vec<OwnedSticker>, StorageError> {
            let rows = self.rows.read().unwrap().clone();
            rows.iter()
                .filter(|r| r.user_id == user_id)
                .map(|r| self.joined(r))
                .collect()
        }

        async fn list_duplicates_by_user(
            &self,
            user_id: i64,
        ) -> Result<Vec<OwnedSticker>, StorageError> {
            let rows = self.rows.read().unwrap().clone();
            rows.iter()
                .filter(|r| r.user_id == user_id && r.amount > 1)
                .map(|r| self.joined(r))
                .collect()
        }

        async fn decrement_amount(&self, id: i64) -> Result<(), StorageError> {
            let mut rows = self.rows.write().unwrap();
            if let Some(row) = rows.iter_mut().find(|r| r.id == id && r.amount > 1) {
                row.amount -= 1;
            }
            Ok(())
        }

        async fn delete(&self, id: i64) -> Result<bool, StorageError> {
            let mut rows = self.rows.write().unwrap();
            let before = rows.len();
            rows.retain(|r| r.id != id);
            Ok(rows.len() < before)
        }
    }

    /// In-memory notification store for testing.
    #[derive(Default)]
    pub struct InMemoryNotificationStore {
        notifications: RwLock<Vec<Notification>>,
        next_id: AtomicI64,
    }

    impl InMemoryNotificationStore {
        pub fn new() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl NotificationStore for InMemoryNotificationStore {
        async fn insert(
            &self,
            notification: NewNotification,
        ) -> Result<Notification, StorageError> {
            let mut notifications = self.notifications.write().unwrap();
            let notification = Notification {
                id: next(&self.next_id),
                from: notification.from,
                to: notification.to,
            };
            notifications.push(notification.clone());
            Ok(notification)
        }

        async fn find_by_id(&self, id: i64) -> Result<Option<Notification>, StorageError> {
            let notifications = self.notifications.read().unwrap();
            Ok(notifications.iter().find(|n| n.id == id).cloned())
        }

        async fn list_for_user(&self, user_id: i64) -> Result<Vec<Notification>, StorageError> {
            let notifications = self.notifications.read().unwrap();
            Ok(notifications
                .iter()
                .filter(|n| n.to == user_id)
                .cloned()
                .collect())
        }
    }

    /// In-memory exchange store for testing.
    #[derive(Default)]
    pub struct InMemoryExchangeStore {
        exchanges: RwLock<Vec<Exchange>>,
        next_id: AtomicI64,
    }

    impl InMemoryExchangeStore {
        pub fn new() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl ExchangeStore for InMemoryExchangeStore {
        async fn insert(&self, exchange: NewExchange) -> Result<Exchange, StorageError> {
            let mut exchanges = self.exchanges.write().unwrap();
            let exchange = Exchange {
                id: next(&self.next_id),
                notification_id: exchange.notification_id,
                sticker_number: exchange.sticker_number,
                user_id: exchange.user_id,
            };
            exchanges.push(exchange.clone());
            Ok(exchange)
        }

        async fn list_for_notification(
            &self,
            notification_id: i64,
        ) -> Result<Vec<Exchange>, StorageError> {
            let exchanges = self.exchanges.read().unwrap();
            Ok(exchanges
                .iter()
                .filter(|e| e.notification_id == notification_id)
                .cloned()
                .collect())
        }
    }

}
