use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Your name must not be empty.")]
    EmptyName,
    #[error("At least one nomination is required.")]
    EmptyNominations,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("record {id} has an unreadable cast_at {value:?}: {source}")]
    Timestamp {
        id: i64,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("{name} must be a positive integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

// Shown to users in place of any store failure
pub const SERVER_ERROR_MESSAGE: &str = "Server error, please try again later.";

impl SubmitError {
    pub fn user_message(&self) -> String {
        match self {
            SubmitError::Validation(e) => e.to_string(),
            SubmitError::Store(_) => SERVER_ERROR_MESSAGE.to_string(),
        }
    }
}
