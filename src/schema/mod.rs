//! Schema subsystem for modeldb
//!
//! Models are declared explicitly and registered once; the registry
//! produces each model's merged schema at declaration time and caches
//! it for the lifetime of the process.
//!
//! # Design Principles
//!
//! - Declaration is explicit: a builder surface, no reflection.
//! - Inheritance is a linearization step, not a language feature.
//! - Defaults are validated when the model is declared, never at
//!   first construction.
//! - A registered schema is immutable and shared by every instance.

mod errors;
mod registry;
mod types;

pub use errors::{SchemaError, SchemaErrorCode, SchemaResult};
pub use registry::ModelRegistry;
pub use types::{AttributeDef, Derivation, FieldOptions, ModelDecl, ModelSchema, TypeExpr};
