use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    Missing(&'static str),

    #[error("Password too short: {0} characters (min 8)")]
    PasswordTooShort(usize),

    #[error("Invalid {0}: must be a positive id")]
    NotPositive(&'static str),

    #[error("Invalid amount {0}: must be at least 1")]
    AmountTooSmall(i64),

    #[error("Sender and recipient must be different users")]
    SelfNotification,
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Row not found: {0}")]
    RowNotFound(i64),

    #[error("Database error: {0}")]
    Database(String),
}

/// Error taxonomy surfaced by the services. The HTTP layer maps each kind
/// to a status code; the services themselves never recover or retry.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Malformed input to an entity constructor.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Expected-but-absent persistence result.
    #[error("{0}")]
    Query(String),

    /// The actor lacks permission for the requested mutation.
    #[error("{0}")]
    NotAuthorized(String),

    /// The action is structurally forbidden regardless of actor.
    #[error("{0}")]
    Permission(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
