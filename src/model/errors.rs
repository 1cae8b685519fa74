//! Construction-time error types
//!
//! One construction call produces at most one error, and that error
//! carries every per-field problem found during both resolution
//! passes. Nothing fails fast and nothing is silently dropped: every
//! supplied argument and every schema attribute is either validated,
//! defaulted, derived, or named in the report.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Report key for problems attributed to the model itself rather than
/// a single attribute (abstract instantiation, undeclared model).
pub const MODEL_KEY: &str = "__model__";

/// Aggregated per-field validation failures for one construction call.
///
/// Maps attribute name to a human-readable message naming the actual
/// value, its runtime type, and the expected declared type. Iteration
/// order is deterministic (sorted by field name).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationReport {
    entries: BTreeMap<String, String>,
}

impl ValidationReport {
    /// Creates an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure for the given field.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.entries.insert(field.into(), message.into());
    }

    /// Returns the message for a field, if it failed.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.entries.get(field).map(String::as_str)
    }

    /// Returns true if the field failed.
    pub fn contains(&self, field: &str) -> bool {
        self.entries.contains_key(field)
    }

    /// Returns the number of failing fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing failed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(field, message)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the failing field names in order.
    pub fn fields(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", field, message)?;
        }
        Ok(())
    }
}

/// Construction failed; carries the full aggregated report.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid model '{model}': {report}")]
pub struct InvalidModelError {
    /// Model that failed to construct
    pub model: String,
    /// Per-field failure report
    pub report: ValidationReport,
}

impl InvalidModelError {
    pub fn new(model: impl Into<String>, report: ValidationReport) -> Self {
        Self {
            model: model.into(),
            report,
        }
    }
}
