//! Store error types
//!
//! Error codes:
//! - MODEL_UNKNOWN_MODEL
//! - MODEL_NO_PRIMARY_KEY
//! - MODEL_NOT_FOUND
//! - MODEL_DUPLICATE_KEY
//! - MODEL_UNKNOWN_FIELD
//! - MODEL_UNKEYABLE_VALUE

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by the query store
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The model has not been declared in the backing registry
    #[error("model '{model}' has not been declared")]
    UnknownModel { model: String },

    /// The model declares no primary-key attribute
    #[error("model '{model}' has no primary-key attribute")]
    NoPrimaryKey { model: String },

    /// No row matched the lookup
    #[error("no '{model}' row matches the given constraints")]
    NotFound { model: String },

    /// A unique attribute already holds this value
    #[error("duplicate value {value} for unique attribute '{attribute}' of model '{model}'")]
    DuplicateKey {
        model: String,
        attribute: String,
        value: String,
    },

    /// A constraint names an attribute the model does not declare
    #[error("'{field}' is not an attribute of model '{model}'")]
    UnknownField { model: String, field: String },

    /// A key attribute holds a value with no key form
    #[error("attribute '{attribute}' of model '{model}' holds a value that cannot serve as a key")]
    UnkeyableValue { model: String, attribute: String },
}

impl StoreError {
    /// Returns the stable string code.
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::UnknownModel { .. } => "MODEL_UNKNOWN_MODEL",
            StoreError::NoPrimaryKey { .. } => "MODEL_NO_PRIMARY_KEY",
            StoreError::NotFound { .. } => "MODEL_NOT_FOUND",
            StoreError::DuplicateKey { .. } => "MODEL_DUPLICATE_KEY",
            StoreError::UnknownField { .. } => "MODEL_UNKNOWN_FIELD",
            StoreError::UnkeyableValue { .. } => "MODEL_UNKEYABLE_VALUE",
        }
    }
}
