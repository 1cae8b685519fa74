//! modeldb - A strict, deterministic runtime data-modeling engine
//!
//! Models are declared once with typed attributes, instantiated with
//! keyword-style arguments, and validated against their declared types
//! at construction. A failed construction reports every bad field in
//! one structured error; a successful one yields an immutable,
//! `Arc`-shared instance. Declared models double as table schemas for
//! an in-memory query store keyed by primary attribute.
//!
//! ```
//! use modeldb::args;
//! use modeldb::schema::{FieldOptions, ModelDecl, ModelRegistry, TypeExpr};
//! use modeldb::value::Value;
//!
//! let registry = ModelRegistry::new();
//! registry
//!     .declare(
//!         ModelDecl::new("Person")
//!             .attr("name", TypeExpr::Str)
//!             .attr("age", TypeExpr::Int)
//!             .attr_with(
//!                 "is_adult",
//!                 TypeExpr::Bool,
//!                 FieldOptions::new().derived(|v| {
//!                     Value::Bool(v.get("age").and_then(Value::as_int).unwrap_or(0) >= 18)
//!                 }),
//!             ),
//!     )
//!     .unwrap();
//!
//! let person = registry
//!     .construct("Person", args! { name: "Alice", age: 30 })
//!     .unwrap();
//! assert_eq!(person.get("is_adult"), Some(&Value::Bool(true)));
//! ```

pub mod model;
pub mod observability;
pub mod schema;
pub mod store;
pub mod validate;
pub mod value;
