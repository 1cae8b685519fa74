//! Runtime type matching
//!
//! Decides whether a runtime value matches a declared type expression.
//! The matcher is pure, always returns a boolean, and never errors:
//! anything it cannot positively match is a non-match.
//!
//! Strictness rules:
//! - No coercion: a bool never matches int or float, an int never
//!   matches float, a date never matches timestamp.
//! - A union matches if any alternative matches; evaluation
//!   short-circuits and the winning alternative is unspecified.
//! - Containers match by kind, then element-wise; empty containers
//!   match regardless of the element type.
//! - A model reference matches structurally: the value's own model
//!   must be the named model or a descendant of it. Resolution is by
//!   name, so self-referential declarations terminate without
//!   expanding the type.

use crate::schema::TypeExpr;
use crate::value::Value;

/// Matches runtime values against declared type expressions.
pub struct TypeMatcher;

impl TypeMatcher {
    /// Returns true if `value` matches `declared`.
    pub fn matches(value: &Value, declared: &TypeExpr) -> bool {
        match declared {
            TypeExpr::Null => value.is_null(),
            TypeExpr::Bool => matches!(value, Value::Bool(_)),
            TypeExpr::Int => matches!(value, Value::Int(_)),
            TypeExpr::Float => matches!(value, Value::Float(_)),
            TypeExpr::Str => matches!(value, Value::Str(_)),
            TypeExpr::Date => matches!(value, Value::Date(_)),
            TypeExpr::Timestamp => matches!(value, Value::Timestamp(_)),
            TypeExpr::List { element } => match value {
                Value::List(items) => items.iter().all(|item| Self::matches(item, element)),
                _ => false,
            },
            TypeExpr::Map { key, value: val_ty } => match value {
                Value::Map(entries) => entries.iter().all(|(k, v)| {
                    Self::matches(&Value::Str(k.clone()), key) && Self::matches(v, val_ty)
                }),
                _ => false,
            },
            TypeExpr::Union { alternatives } => alternatives
                .iter()
                .any(|alt| Self::matches(value, alt)),
            TypeExpr::Model { name } => match value {
                Value::Instance(inst) => inst.schema().is_subtype_of(name),
                _ => false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_matches_only_null() {
        assert!(TypeMatcher::matches(&Value::Null, &TypeExpr::Null));
        assert!(!TypeMatcher::matches(&Value::Int(0), &TypeExpr::Null));
        assert!(!TypeMatcher::matches(&Value::Null, &TypeExpr::Int));
    }

    #[test]
    fn test_exact_primitives() {
        assert!(TypeMatcher::matches(&Value::Bool(true), &TypeExpr::Bool));
        assert!(TypeMatcher::matches(&Value::Int(1), &TypeExpr::Int));
        assert!(TypeMatcher::matches(&Value::Float(1.5), &TypeExpr::Float));
        assert!(TypeMatcher::matches(&Value::Str("x".into()), &TypeExpr::Str));
    }

    #[test]
    fn test_bool_never_matches_numeric() {
        assert!(!TypeMatcher::matches(&Value::Bool(true), &TypeExpr::Int));
        assert!(!TypeMatcher::matches(&Value::Bool(false), &TypeExpr::Float));
    }

    #[test]
    fn test_no_numeric_widening() {
        assert!(!TypeMatcher::matches(&Value::Int(1), &TypeExpr::Float));
        assert!(!TypeMatcher::matches(&Value::Float(1.0), &TypeExpr::Int));
    }

    #[test]
    fn test_date_never_matches_timestamp() {
        let d = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(TypeMatcher::matches(&Value::Date(d), &TypeExpr::Date));
        assert!(!TypeMatcher::matches(&Value::Date(d), &TypeExpr::Timestamp));
    }

    #[test]
    fn test_union_matches_any_alternative() {
        let ty = TypeExpr::union([TypeExpr::Int, TypeExpr::Str]);
        assert!(TypeMatcher::matches(&Value::Int(1), &ty));
        assert!(TypeMatcher::matches(&Value::Str("x".into()), &ty));
        assert!(!TypeMatcher::matches(&Value::Float(1.0), &ty));
    }

    #[test]
    fn test_optional_admits_null() {
        let ty = TypeExpr::optional(TypeExpr::Str);
        assert!(TypeMatcher::matches(&Value::Null, &ty));
        assert!(TypeMatcher::matches(&Value::Str("x".into()), &ty));
        assert!(!TypeMatcher::matches(&Value::Int(1), &ty));
    }

    #[test]
    fn test_list_elements_checked_recursively() {
        let ty = TypeExpr::list(TypeExpr::Int);
        assert!(TypeMatcher::matches(
            &Value::List(vec![Value::Int(1), Value::Int(2)]),
            &ty
        ));
        assert!(!TypeMatcher::matches(
            &Value::List(vec![Value::Int(1), Value::Str("x".into())]),
            &ty
        ));
        assert!(!TypeMatcher::matches(&Value::Int(1), &ty));
    }

    #[test]
    fn test_empty_containers_match() {
        assert!(TypeMatcher::matches(
            &Value::List(vec![]),
            &TypeExpr::list(TypeExpr::model("Person"))
        ));
        assert!(TypeMatcher::matches(
            &Value::Map(Default::default()),
            &TypeExpr::map(TypeExpr::Str, TypeExpr::Int)
        ));
    }

    #[test]
    fn test_nested_list_of_union() {
        let ty = TypeExpr::list(TypeExpr::union([TypeExpr::Int, TypeExpr::Null]));
        assert!(TypeMatcher::matches(
            &Value::List(vec![Value::Int(1), Value::Null]),
            &ty
        ));
        assert!(!TypeMatcher::matches(
            &Value::List(vec![Value::Bool(true)]),
            &ty
        ));
    }

    #[test]
    fn test_map_keys_and_values_checked() {
        let ty = TypeExpr::map(TypeExpr::Str, TypeExpr::Int);
        let mut entries = std::collections::BTreeMap::new();
        entries.insert("a".to_string(), Value::Int(1));
        assert!(TypeMatcher::matches(&Value::Map(entries.clone()), &ty));

        entries.insert("b".to_string(), Value::Str("oops".into()));
        assert!(!TypeMatcher::matches(&Value::Map(entries), &ty));

        // A non-string key type can never match a runtime map.
        let int_keyed = TypeExpr::map(TypeExpr::Int, TypeExpr::Int);
        let mut entries = std::collections::BTreeMap::new();
        entries.insert("a".to_string(), Value::Int(1));
        assert!(!TypeMatcher::matches(&Value::Map(entries), &int_keyed));
    }

    #[test]
    fn test_model_reference_requires_instance() {
        // Non-instance values never match a model reference; instance
        // matching itself is covered by the registry tests, where real
        // schemas exist.
        assert!(!TypeMatcher::matches(
            &Value::Int(1),
            &TypeExpr::model("Person")
        ));
        assert!(!TypeMatcher::matches(
            &Value::Null,
            &TypeExpr::model("Person")
        ));
    }
}
