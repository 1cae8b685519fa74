//! Type matching subsystem
//!
//! The matcher is the engine's one pure leaf: a value either matches a
//! declared type expression or it does not. It never raises, never
//! coerces, and never mutates. Both the registry (eager default
//! validation) and the instance builder (per-field validation) consult
//! it; nothing else decides type questions.

mod matcher;

pub use matcher::TypeMatcher;
