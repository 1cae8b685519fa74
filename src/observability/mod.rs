//! Observability subsystem for modeldb
//!
//! Structured logs only: JSON, synchronous, deterministic key order.
//! The engine stays silent on success paths apart from declaration
//! and insert events at INFO/TRACE.

mod logger;

pub use logger::{Logger, Severity};
