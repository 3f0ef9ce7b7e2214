use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, ValidationError};
use crate::storage::UserStore;
use crate::validation::required_string;

pub const MIN_PASSWORD_LEN: usize = 8;

/// A persisted collector account.
///
/// The password is stored but never serialized into responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
}

/// Raw registration input, as deserialized from a request body.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// A validated, not-yet-persisted user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl NewUser {
    /// Validate raw input. Rules are checked in a fixed order and the first
    /// violation wins: name, then email, then password length. Email
    /// uniqueness is the service's job, not the entity's.
    pub fn new(input: UserInput) -> Result<Self, ValidationError> {
        let name = required_string(input.name, "name")?;
        let email = required_string(input.email, "email")?;
        let password = required_string(input.password, "password")?;
        if password.len() < MIN_PASSWORD_LEN {
            return Err(ValidationError::PasswordTooShort(password.len()));
        }
        Ok(Self {
            name,
            email,
            password,
        })
    }
}

/// Partial update for a user record; absent fields are left untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// CRUD and authorization rules over collector accounts.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Register a new collector. The email must not already be taken.
    pub async fn create(&self, input: UserInput) -> Result<User, ServiceError> {
        let user = NewUser::new(input)?;
        if self.store.find_by_email(&user.email).await?.is_some() {
            return Err(ServiceError::Query(format!(
                "Email already in use: {}",
                user.email
            )));
        }
        Ok(self.store.insert(user).await?)
    }

    /// List every collector except the requester.
    pub async fn get_all(&self, requester_id: i64) -> Result<Vec<User>, ServiceError> {
        Ok(self.store.list_except(requester_id).await?)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<User, ServiceError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::Query(format!("User not found: {id}")))
    }

    /// Apply a partial update. Users may only update their own profile.
    pub async fn update(
        &self,
        id: i64,
        patch: UserPatch,
        acting_user_id: i64,
    ) -> Result<User, ServiceError> {
        let user = self.get_by_id(id).await?;
        if acting_user_id != user.id {
            return Err(ServiceError::NotAuthorized(
                "Users can only update their own profile".to_string(),
            ));
        }
        Ok(self.store.update(user.id, patch).await?)
    }

    /// Remove a collector. Self-deletion is forbidden regardless of actor.
    pub async fn delete(&self, id: i64, acting_user_id: i64) -> Result<(), ServiceError> {
        if acting_user_id == id {
            return Err(ServiceError::Permission(
                "Users cannot delete their own account".to_string(),
            ));
        }
        let user = self.get_by_id(id).await?;
        self.store.delete(user.id).await?;
        Ok(())
    }
}
