use std::sync::Arc;

use sqlx::SqlitePool;

use album_core::{
    ExchangeService, NotificationService, StickerService, UserService, UserStickerService,
};
use album_db::{
    SqliteExchangeStore, SqliteNotificationStore, SqliteStickerStore, SqliteUserStickerStore,
    SqliteUserStore,
};

/// Application state shared across handlers: the service graph wired over
/// the SQLite stores.
#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub stickers: StickerService,
    pub user_stickers: UserStickerService,
    pub notifications: NotificationService,
    pub exchanges: ExchangeService,
}

impl AppState {
    pub fn new(pool: SqlitePool) -> Self {
        let sticker_store = Arc::new(SqliteStickerStore::new(pool.clone()));
        let users = UserService::new(Arc::new(SqliteUserStore::new(pool.clone())));
        let stickers = StickerService::new(sticker_store.clone());
        let user_stickers = UserStickerService::new(
            Arc::new(SqliteUserStickerStore::new(pool.clone())),
            sticker_store,
            users.clone(),
            stickers.clone(),
        );
        let notifications =
            NotificationService::new(Arc::new(SqliteNotificationStore::new(pool.clone())));
        let exchanges = ExchangeService::new(
            Arc::new(SqliteExchangeStore::new(pool)),
            notifications.clone(),
        );
        Self {
            users,
            stickers,
            user_stickers,
            notifications,
            exchanges,
        }
    }
}
