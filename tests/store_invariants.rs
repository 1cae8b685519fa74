//! Query Store Invariant Tests
//!
//! Invariants of the store collaborator:
//! - Rows come back in insertion order
//! - Primary-key and unique duplicates are rejected with no effect
//! - Filtering is strict equality; unknown fields are errors
//! - The store holds the engine's instances by reference

use std::sync::Arc;

use modeldb::args;
use modeldb::model::Instance;
use modeldb::schema::{FieldOptions, ModelDecl, ModelRegistry, TypeExpr};
use modeldb::store::QueryStore;
use modeldb::value::Value;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup() -> (Arc<ModelRegistry>, QueryStore) {
    let registry = ModelRegistry::new();
    registry
        .declare(
            ModelDecl::new("Book")
                .attr_with("isbn", TypeExpr::Str, FieldOptions::new().primary_key())
                .attr("title", TypeExpr::Str)
                .attr("year", TypeExpr::Int),
        )
        .unwrap();
    let registry = Arc::new(registry);
    let store = QueryStore::new(registry.clone());
    (registry, store)
}

fn book(registry: &ModelRegistry, isbn: &str, title: &str, year: i64) -> Arc<Instance> {
    registry
        .construct(
            "Book",
            args! { isbn: isbn, title: title, year: year },
        )
        .unwrap()
}

// =============================================================================
// Point Lookup Tests
// =============================================================================

/// get() resolves a row by primary-key value.
#[test]
fn test_get_by_primary_key() {
    let (registry, mut store) = setup();
    store
        .insert(book(&registry, "978-1", "Dune", 1965))
        .unwrap();

    let row = store.get("Book", &Value::Str("978-1".into())).unwrap();
    assert_eq!(row.get("title"), Some(&Value::Str("Dune".into())));

    let err = store.get("Book", &Value::Str("978-2".into())).unwrap_err();
    assert_eq!(err.code(), "MODEL_NOT_FOUND");
}

/// The stored row is the same instance the engine produced.
#[test]
fn test_store_holds_rows_by_reference() {
    let (registry, mut store) = setup();
    let original = book(&registry, "978-1", "Dune", 1965);
    store.insert(original.clone()).unwrap();

    let fetched = store.get("Book", &Value::Str("978-1".into())).unwrap();
    assert!(Arc::ptr_eq(&original, &fetched));
}

/// Repeated lookups return the same row.
#[test]
fn test_get_is_deterministic() {
    let (registry, mut store) = setup();
    store
        .insert(book(&registry, "978-1", "Dune", 1965))
        .unwrap();
    for _ in 0..50 {
        let row = store.get("Book", &Value::Str("978-1".into())).unwrap();
        assert_eq!(row.get("year"), Some(&Value::Int(1965)));
    }
}

// =============================================================================
// Uniqueness Tests
// =============================================================================

/// A second row with the same primary key is rejected and nothing
/// changes.
#[test]
fn test_duplicate_primary_key_rejected() {
    let (registry, mut store) = setup();
    store
        .insert(book(&registry, "978-1", "Dune", 1965))
        .unwrap();

    let err = store
        .insert(book(&registry, "978-1", "Dune Messiah", 1969))
        .unwrap_err();
    assert_eq!(err.code(), "MODEL_DUPLICATE_KEY");
    assert_eq!(store.count("Book"), 1);
    let kept = store.get("Book", &Value::Str("978-1".into())).unwrap();
    assert_eq!(kept.get("title"), Some(&Value::Str("Dune".into())));
}

/// Unique attributes reject duplicates across rows; null stays free.
#[test]
fn test_unique_attribute_enforced() {
    let registry = ModelRegistry::new();
    registry
        .declare(
            ModelDecl::new("Account")
                .attr_with("id", TypeExpr::Int, FieldOptions::new().primary_key())
                .attr_with(
                    "handle",
                    TypeExpr::optional(TypeExpr::Str),
                    FieldOptions::new().unique().default_value(Value::Null),
                ),
        )
        .unwrap();
    let registry = Arc::new(registry);
    let mut store = QueryStore::new(registry.clone());

    store
        .insert(
            registry
                .construct("Account", args! { id: 1, handle: "ada" })
                .unwrap(),
        )
        .unwrap();
    let err = store
        .insert(
            registry
                .construct("Account", args! { id: 2, handle: "ada" })
                .unwrap(),
        )
        .unwrap_err();
    assert_eq!(err.code(), "MODEL_DUPLICATE_KEY");

    // Any number of rows may leave the unique attribute null.
    for id in 3..6 {
        store
            .insert(registry.construct("Account", args! { id: id }).unwrap())
            .unwrap();
    }
    assert_eq!(store.count("Account"), 4);
}

// =============================================================================
// Filter Tests
// =============================================================================

/// filter() returns all matches in insertion order and an empty vector
/// when nothing matches.
#[test]
fn test_filter_returns_insertion_order() {
    let (registry, mut store) = setup();
    store
        .insert(book(&registry, "978-3", "Foundation", 1951))
        .unwrap();
    store
        .insert(book(&registry, "978-1", "Dune", 1965))
        .unwrap();
    store
        .insert(book(&registry, "978-2", "Second Foundation", 1951))
        .unwrap();

    let from_1951 = store.filter("Book", &[("year", 1951.into())]).unwrap();
    let isbns: Vec<_> = from_1951
        .iter()
        .map(|row| row.get("isbn").and_then(Value::as_str).unwrap().to_string())
        .collect();
    assert_eq!(isbns, ["978-3", "978-2"]);

    assert!(store
        .filter("Book", &[("year", 2001.into())])
        .unwrap()
        .is_empty());
}

/// Multiple constraints AND together.
#[test]
fn test_filter_multiple_constraints() {
    let (registry, mut store) = setup();
    store
        .insert(book(&registry, "978-3", "Foundation", 1951))
        .unwrap();
    store
        .insert(book(&registry, "978-2", "Second Foundation", 1951))
        .unwrap();

    let rows = store
        .filter(
            "Book",
            &[("year", 1951.into()), ("title", "Foundation".into())],
        )
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("isbn"), Some(&Value::Str("978-3".into())));
}

/// Equality in filters is strict: no cross-type matches.
#[test]
fn test_filter_equality_is_strict() {
    let (registry, mut store) = setup();
    store
        .insert(book(&registry, "978-1", "Dune", 1965))
        .unwrap();

    // A float constraint never matches an int attribute value.
    let rows = store.filter("Book", &[("year", 1965.0.into())]).unwrap();
    assert!(rows.is_empty());
}

/// A constraint naming an undeclared attribute is an error, not an
/// empty result.
#[test]
fn test_filter_unknown_field_is_an_error() {
    let (_registry, store) = setup();
    let err = store
        .filter("Book", &[("publisher", "x".into())])
        .unwrap_err();
    assert_eq!(err.code(), "MODEL_UNKNOWN_FIELD");
}

/// Querying an undeclared model is an error.
#[test]
fn test_unknown_model_is_an_error() {
    let (_registry, store) = setup();
    let err = store.filter("Magazine", &[]).unwrap_err();
    assert_eq!(err.code(), "MODEL_UNKNOWN_MODEL");
}

/// find() yields the first match in insertion order, or not-found.
#[test]
fn test_find_first_match() {
    let (registry, mut store) = setup();
    store
        .insert(book(&registry, "978-3", "Foundation", 1951))
        .unwrap();
    store
        .insert(book(&registry, "978-2", "Second Foundation", 1951))
        .unwrap();

    let row = store.find("Book", &[("year", 1951.into())]).unwrap();
    assert_eq!(row.get("isbn"), Some(&Value::Str("978-3".into())));

    let err = store
        .find("Book", &[("year", 1999.into())])
        .unwrap_err();
    assert_eq!(err.code(), "MODEL_NOT_FOUND");
}

/// all() lists every row of one model, in insertion order, and is
/// empty before any insert.
#[test]
fn test_all_rows() {
    let (registry, mut store) = setup();
    assert!(store.all("Book").unwrap().is_empty());

    store
        .insert(book(&registry, "978-2", "B", 1990))
        .unwrap();
    store
        .insert(book(&registry, "978-1", "A", 1980))
        .unwrap();

    let isbns: Vec<_> = store
        .all("Book")
        .unwrap()
        .iter()
        .map(|row| row.get("isbn").and_then(Value::as_str).unwrap().to_string())
        .collect();
    assert_eq!(isbns, ["978-2", "978-1"]);
}
