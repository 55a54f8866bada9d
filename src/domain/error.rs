use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Bill {bill_id} is already paid")]
    AlreadySettled { bill_id: i32 },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl DomainError {
    pub fn not_found(entity: &'static str, field: &'static str, value: impl ToString) -> Self {
        DomainError::NotFound {
            entity,
            field,
            value: value.to_string(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        DomainError::InvalidInput(message.into())
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
