use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, ValidationError};
use crate::storage::NotificationStore;
use crate::validation::required_positive;

/// An exchange-offer notification from one collector to another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub from: i64,
    pub to: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationInput {
    pub from: Option<i64>,
    pub to: Option<i64>,
}

/// A validated, not-yet-persisted notification.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub from: i64,
    pub to: i64,
}

impl NewNotification {
    /// First violation wins: from, then to, then the cross-field rule that
    /// a collector cannot notify themselves.
    pub fn new(input: NotificationInput) -> Result<Self, ValidationError> {
        let from = required_positive(input.from, "from")?;
        let to = required_positive(input.to, "to")?;
        if from == to {
            return Err(ValidationError::SelfNotification);
        }
        Ok(Self { from, to })
    }
}

#[derive(Clone)]
pub struct NotificationService {
    store: Arc<dyn NotificationStore>,
}

impl NotificationService {
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, input: NotificationInput) -> Result<Notification, ServiceError> {
        let notification = NewNotification::new(input)?;
        Ok(self.store.insert(notification).await?)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Notification, ServiceError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::Query(format!("Notification not found: {id}")))
    }

    /// Inbox: notifications addressed to the user.
    pub async fn get_all_by_user(&self, user_id: i64) -> Result<Vec<Notification>, ServiceError> {
        Ok(self.store.list_for_user(user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::InMemoryNotificationStore;

    fn service() -> NotificationService {
        NotificationService::new(Arc::new(InMemoryNotificationStore::new()))
    }

    #[test]
    fn valid_input_passes_through_unchanged() {
        let notification = NewNotification::new(NotificationInput {
            from: Some(1),
            to: Some(2),
        })
        .unwrap();
        assert_eq!(notification.from, 1);
        assert_eq!(notification.to, 2);
    }

    #[test]
    fn missing_sender_rejected() {
        let input = NotificationInput {
            from: None,
            to: Some(2),
        };
        assert_eq!(
            NewNotification::new(input),
            Err(ValidationError::Missing("from"))
        );
    }

    #[test]
    fn non_positive_sender_rejected() {
        let input = NotificationInput {
            from: Some(0),
            to: Some(2),
        };
        assert_eq!(
            NewNotification::new(input),
            Err(ValidationError::NotPositive("from"))
        );
    }

    #[test]
    fn non_positive_recipient_rejected() {
        let input = NotificationInput {
            from: Some(1),
            to: Some(-2),
        };
        assert_eq!(
            NewNotification::new(input),
            Err(ValidationError::NotPositive("to"))
        );
    }

    #[test]
    fn sender_equal_to_recipient_rejected() {
        let input = NotificationInput {
            from: Some(3),
            to: Some(3),
        };
        assert_eq!(
            NewNotification::new(input),
            Err(ValidationError::SelfNotification)
        );
    }

    #[tokio::test]
    async fn create_and_list_inbox() {
        let service = service();
        service
            .create(NotificationInput {
                from: Some(1),
                to: Some(2),
            })
            .await
            .unwrap();
        service
            .create(NotificationInput {
                from: Some(3),
                to: Some(2),
            })
            .await
            .unwrap();
        service
            .create(NotificationInput {
                from: Some(2),
                to: Some(1),
            })
            .await
            .unwrap();

        let inbox = service.get_all_by_user(2).await.unwrap();
        assert_eq!(inbox.len(), 2);
        assert!(inbox.iter().all(|n| n.to == 2));
    }

    #[tokio::test]
    async fn get_by_id_unknown_fails() {
        let err = service().get_by_id(9).await.unwrap_err();
        assert!(matches!(err, ServiceError::Query(_)));
    }
}
