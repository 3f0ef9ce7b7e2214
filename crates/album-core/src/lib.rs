//! Album Core - Domain records, validation, and services.
//!
//! This crate contains the domain logic for the sticker album backend:
//! collectors, the sticker catalog, per-user sticker accounting, and the
//! exchange notifications between collectors. It has no dependency on the
//! HTTP or database crates; persistence is reached through the storage
//! traits.

pub mod error;
pub mod exchange;
pub mod notification;
pub mod sticker;
pub mod storage;
pub mod user;
pub mod user_sticker;
mod validation;

// Re-exports for convenience
pub use error::{ServiceError, StorageError, ValidationError};
pub use exchange::{Exchange, ExchangeInput, ExchangeService, NewExchange};
pub use notification::{NewNotification, Notification, NotificationInput, NotificationService};
pub use sticker::{NewSticker, Sticker, StickerInput, StickerService};
pub use storage::{ExchangeStore, NotificationStore, StickerStore, UserStickerStore, UserStore};
pub use user::{NewUser, User, UserInput, UserPatch, UserService, MIN_PASSWORD_LEN};
pub use user_sticker::{
    NewUserSticker, OwnedSticker, UserSticker, UserStickerInput, UserStickerService,
};

#[cfg(any(test, feature = "test-utils"))]
pub use storage::memory::{
    InMemoryExchangeStore, InMemoryNotificationStore, InMemoryStickerStore,
    InMemoryUserStickerStore, InMemoryUserStore,
};
