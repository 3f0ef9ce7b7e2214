use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, ValidationError};
use crate::storage::StickerStore;
use crate::validation::{required_i64, required_string};

/// A catalog sticker, identified externally by its album number.
///
/// Rows created from the collecting path carry only a number; name and team
/// are filled in when the entry is registered explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sticker {
    pub id: i64,
    pub number: i64,
    pub name: Option<String>,
    pub team: Option<String>,
}

/// Raw catalog entry input.
#[derive(Debug, Clone, Deserialize)]
pub struct StickerInput {
    pub number: Option<i64>,
    pub name: Option<String>,
    pub team: Option<String>,
}

/// A validated catalog entry: explicit registration requires all fields.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSticker {
    pub number: i64,
    pub name: String,
    pub team: String,
}

impl NewSticker {
    /// First violation wins: number, then name, then team.
    pub fn new(input: StickerInput) -> Result<Self, ValidationError> {
        let number = required_i64(input.number, "number")?;
        let name = required_string(input.name, "name")?;
        let team = required_string(input.team, "team")?;
        Ok(Self { number, name, team })
    }
}

/// Lookup and registration over the sticker catalog.
#[derive(Clone)]
pub struct StickerService {
    store: Arc<dyn StickerStore>,
}

impl StickerService {
    pub fn new(store: Arc<dyn StickerStore>) -> Self {
        Self { store }
    }

    /// Register a catalog entry. The number must not already be present.
    pub async fn create(&self, input: StickerInput) -> Result<Sticker, ServiceError> {
        let sticker = NewSticker::new(input)?;
        if self.store.find_by_number(sticker.number).await?.is_some() {
            return Err(ServiceError::Query(format!(
                "Sticker number already in catalog: {}",
                sticker.number
            )));
        }
        Ok(self.store.insert(sticker).await?)
    }

    /// Absence is not an error here; callers branch on it to decide between
    /// reusing and creating a catalog entry.
    pub async fn get_by_number(&self, number: i64) -> Result<Option<Sticker>, ServiceError> {
        Ok(self.store.find_by_number(number).await?)
    }

    pub async fn get_all(&self) -> Result<Vec<Sticker>, ServiceError> {
        Ok(self.store.list().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::InMemoryStickerStore;

    fn valid_input() -> StickerInput {
        StickerInput {
            number: Some(10),
            name: Some("Player 10".to_string()),
            team: Some("Brazil".to_string()),
        }
    }

    fn service() -> StickerService {
        StickerService::new(Arc::new(InMemoryStickerStore::new()))
    }

    #[test]
    fn valid_input_passes_through_unchanged() {
        let sticker = NewSticker::new(valid_input()).unwrap();
        assert_eq!(sticker.number, 10);
        assert_eq!(sticker.name, "Player 10");
        assert_eq!(sticker.team, "Brazil");
    }

    #[test]
    fn missing_number_rejected_first() {
        let input = StickerInput {
            number: None,
            name: None,
            team: None,
        };
        assert_eq!(
            NewSticker::new(input),
            Err(ValidationError::Missing("number"))
        );
    }

    #[test]
    fn missing_name_rejected() {
        let input = StickerInput {
            name: None,
            ..valid_input()
        };
        assert_eq!(NewSticker::new(input), Err(ValidationError::Missing("name")));
    }

    #[test]
    fn missing_team_rejected() {
        let input = StickerInput {
            team: None,
            ..valid_input()
        };
        assert_eq!(NewSticker::new(input), Err(ValidationError::Missing("team")));
    }

    #[tokio::test]
    async fn create_then_lookup_by_number() {
        let service = service();
        service.create(valid_input()).await.unwrap();

        let found = service.get_by_number(10).await.unwrap().unwrap();
        assert_eq!(found.name.as_deref(), Some("Player 10"));
    }

    #[tokio::test]
    async fn create_rejects_duplicate_number() {
        let service = service();
        service.create(valid_input()).await.unwrap();

        let err = service.create(valid_input()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Query(_)));
    }

    #[tokio::test]
    async fn lookup_of_unknown_number_is_none() {
        assert!(service().get_by_number(42).await.unwrap().is_none());
    }
}
