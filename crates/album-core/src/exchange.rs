use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, ValidationError};
use crate::notification::NotificationService;
use crate::storage::ExchangeStore;
use crate::validation::required_i64;

/// A sticker offered within a notification's exchange thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    pub id: i64,
    pub notification_id: i64,
    pub sticker_number: i64,
    pub user_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeInput {
    pub notification_id: Option<i64>,
    pub sticker_number: Option<i64>,
    pub user_id: Option<i64>,
}

/// A validated, not-yet-persisted exchange record.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExchange {
    pub notification_id: i64,
    pub sticker_number: i64,
    pub user_id: i64,
}

impl NewExchange {
    /// First violation wins: notification_id, then sticker_number, then
    /// user_id.
    pub fn new(input: ExchangeInput) -> Result<Self, ValidationError> {
        let notification_id = required_i64(input.notification_id, "notification_id")?;
        let sticker_number = required_i64(input.sticker_number, "sticker_number")?;
        let user_id = required_i64(input.user_id, "user_id")?;
        Ok(Self {
            notification_id,
            sticker_number,
            user_id,
        })
    }
}

#[derive(Clone)]
pub struct ExchangeService {
    store: Arc<dyn ExchangeStore>,
    notifications: NotificationService,
}

impl ExchangeService {
    pub fn new(store: Arc<dyn ExchangeStore>, notifications: NotificationService) -> Self {
        Self {
            store,
            notifications,
        }
    }

    /// Record a sticker offered in a thread. The notification must exist.
    pub async fn create(&self, input: ExchangeInput) -> Result<Exchange, ServiceError> {
        let exchange = NewExchange::new(input)?;
        self.notifications.get_by_id(exchange.notification_id).await?;
        Ok(self.store.insert(exchange).await?)
    }

    /// The full exchange thread for one notification.
    pub async fn get_all_by_notification(
        &self,
        notification_id: i64,
    ) -> Result<Vec<Exchange>, ServiceError> {
        Ok(self.store.list_for_notification(notification_id).await?)
    }
}
