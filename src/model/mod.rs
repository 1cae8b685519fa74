//! Instance construction subsystem for modeldb
//!
//! Takes a merged schema plus keyword-style arguments and produces
//! either a fully validated immutable instance or one aggregated
//! error naming every failing field.
//!
//! # Design Principles
//!
//! - Resolution precedence is explicit > derived > default.
//! - Both passes always complete; errors aggregate, never fail fast.
//! - Unknown argument names are failures, not noise to ignore.
//! - A nested instance passed through unchanged keeps its identity.

mod builder;
mod errors;
mod instance;

pub use builder::{construct, AttrView};
pub use errors::{InvalidModelError, ValidationReport, MODEL_KEY};
pub use instance::Instance;
