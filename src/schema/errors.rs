//! Declaration-time error types
//!
//! Error codes:
//! - MODEL_UNKNOWN_PARENT
//! - MODEL_DUPLICATE_MODEL
//! - MODEL_DUPLICATE_ATTRIBUTE
//! - MODEL_MULTIPLE_PRIMARY_KEYS
//! - MODEL_INVALID_DEFAULT
//! - MODEL_INVALID_FIELD_OPTION
//!
//! All of these abort the declaration: no schema is registered and the
//! registry is left exactly as it was. They are distinct from the
//! per-construction `InvalidModelError`, which is recoverable.

use std::fmt;

use crate::schema::types::TypeExpr;
use crate::value::Value;

/// Declaration-time error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// A named parent model has not been declared
    ModelUnknownParent,
    /// A model with this name is already registered
    ModelDuplicateModel,
    /// The same attribute name appears twice in one declaration
    ModelDuplicateAttribute,
    /// More than one primary-key attribute survives the merge
    ModelMultiplePrimaryKeys,
    /// A default value violates its declared type
    ModelInvalidDefault,
    /// Conflicting or unsupported field options
    ModelInvalidFieldOption,
}

impl SchemaErrorCode {
    /// Returns the stable string code.
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::ModelUnknownParent => "MODEL_UNKNOWN_PARENT",
            SchemaErrorCode::ModelDuplicateModel => "MODEL_DUPLICATE_MODEL",
            SchemaErrorCode::ModelDuplicateAttribute => "MODEL_DUPLICATE_ATTRIBUTE",
            SchemaErrorCode::ModelMultiplePrimaryKeys => "MODEL_MULTIPLE_PRIMARY_KEYS",
            SchemaErrorCode::ModelInvalidDefault => "MODEL_INVALID_DEFAULT",
            SchemaErrorCode::ModelInvalidFieldOption => "MODEL_INVALID_FIELD_OPTION",
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Declaration-time error with full context
#[derive(Debug, Clone)]
pub struct SchemaError {
    /// Error code
    code: SchemaErrorCode,
    /// Human-readable message
    message: String,
    /// Model being declared
    model: String,
    /// Attribute at fault, if applicable
    attribute: Option<String>,
}

impl SchemaError {
    /// Create an unknown parent error
    pub fn unknown_parent(model: impl Into<String>, parent: &str) -> Self {
        Self {
            code: SchemaErrorCode::ModelUnknownParent,
            message: format!("parent model '{}' has not been declared", parent),
            model: model.into(),
            attribute: None,
        }
    }

    /// Create a duplicate model error
    pub fn duplicate_model(model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            code: SchemaErrorCode::ModelDuplicateModel,
            message: format!("model '{}' is already declared", model),
            model,
            attribute: None,
        }
    }

    /// Create a duplicate attribute error
    pub fn duplicate_attribute(model: impl Into<String>, attribute: &str) -> Self {
        Self {
            code: SchemaErrorCode::ModelDuplicateAttribute,
            message: format!("attribute '{}' is declared twice", attribute),
            model: model.into(),
            attribute: Some(attribute.to_string()),
        }
    }

    /// Create a multiple primary keys error
    pub fn multiple_primary_keys(model: impl Into<String>, first: &str, second: &str) -> Self {
        Self {
            code: SchemaErrorCode::ModelMultiplePrimaryKeys,
            message: format!(
                "cannot have multiple primary keys: '{}' and '{}'",
                first, second
            ),
            model: model.into(),
            attribute: Some(second.to_string()),
        }
    }

    /// Create an invalid default error
    pub fn invalid_default(
        model: impl Into<String>,
        attribute: &str,
        default: &Value,
        declared: &TypeExpr,
    ) -> Self {
        Self {
            code: SchemaErrorCode::ModelInvalidDefault,
            message: format!(
                "default {} of type {} does not match declared type {}",
                default,
                default.type_name(),
                declared.describe()
            ),
            model: model.into(),
            attribute: Some(attribute.to_string()),
        }
    }

    /// Create an invalid field option error
    pub fn invalid_field_option(
        model: impl Into<String>,
        attribute: &str,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            code: SchemaErrorCode::ModelInvalidFieldOption,
            message: reason.into(),
            model: model.into(),
            attribute: Some(attribute.to_string()),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the model being declared
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the attribute at fault, if applicable
    pub fn attribute(&self) -> Option<&str> {
        self.attribute.as_deref()
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] model '{}'", self.code.code(), self.model)?;
        if let Some(attr) = &self.attribute {
            write!(f, ", attribute '{}'", attr)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for declaration-time operations
pub type SchemaResult<T> = Result<T, SchemaError>;
