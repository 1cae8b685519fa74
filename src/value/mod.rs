//! Runtime values for modeldb
//!
//! Every attribute of a model instance holds exactly one `Value`. The
//! enum is closed: the engine never stores a value kind it cannot name
//! in an error message. Nested instances are held behind `Arc`, so a
//! value passed through construction unchanged keeps its identity.
//!
//! No coercion happens anywhere in this module: a `Value::Int` never
//! becomes a `Value::Float`, and `Value::Bool` is not a number.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};

use crate::model::Instance;

/// A runtime value held by a model attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absence of a value (the null sentinel)
    Null,
    /// Boolean
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point
    Float(f64),
    /// UTF-8 string
    Str(String),
    /// Calendar date
    Date(NaiveDate),
    /// Point in time (UTC)
    Timestamp(DateTime<Utc>),
    /// Ordered sequence of values
    List(Vec<Value>),
    /// String-keyed mapping
    Map(BTreeMap<String, Value>),
    /// Nested model instance, shared by reference
    Instance(Arc<Instance>),
}

impl Value {
    /// Returns the runtime type name used in validation messages.
    ///
    /// For nested instances this is the instance's model name, which is
    /// what a mismatch report should show.
    pub fn type_name(&self) -> String {
        match self {
            Value::Null => "null".into(),
            Value::Bool(_) => "bool".into(),
            Value::Int(_) => "int".into(),
            Value::Float(_) => "float".into(),
            Value::Str(_) => "str".into(),
            Value::Date(_) => "date".into(),
            Value::Timestamp(_) => "timestamp".into(),
            Value::List(_) => "list".into(),
            Value::Map(_) => "map".into(),
            Value::Instance(inst) => inst.model_name().to_string(),
        }
    }

    /// Returns true for the null sentinel.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the boolean payload, if this is a bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer payload, if this is an int.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the float payload, if this is a float.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the list payload, if this is a list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the nested instance, if this is an instance.
    pub fn as_instance(&self) -> Option<&Arc<Instance>> {
        match self {
            Value::Instance(inst) => Some(inst),
            _ => None,
        }
    }

    /// Converts to a `serde_json::Value` for export.
    ///
    /// Dates and timestamps become ISO-8601 strings; nested instances
    /// become objects. Non-finite floats have no JSON form and export
    /// as null.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::Number((*i).into()),
            Value::Float(f) => match serde_json::Number::from_f64(*f) {
                Some(n) => serde_json::Value::Number(n),
                None => serde_json::Value::Null,
            },
            Value::Str(s) => serde_json::Value::String(s.clone()),
            Value::Date(d) => serde_json::Value::String(d.to_string()),
            Value::Timestamp(t) => serde_json::Value::String(t.to_rfc3339()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Value::Instance(inst) => inst.to_json(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Date(d) => write!(f, "{}", d),
            Value::Timestamp(t) => write!(f, "{}", t.to_rfc3339()),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}: {}", k, v)?;
                }
                write!(f, "}}")
            }
            Value::Instance(inst) => write!(f, "{}", inst.model_name()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(v: BTreeMap<String, Value>) -> Self {
        Value::Map(v)
    }
}

impl From<Arc<Instance>> for Value {
    fn from(v: Arc<Instance>) -> Self {
        Value::Instance(v)
    }
}

/// Builds the argument set for a construction call.
///
/// ```
/// use modeldb::args;
/// let kwargs = args! { name: "Alice", age: 30 };
/// assert_eq!(kwargs.len(), 2);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<(&str, $crate::value::Value)>::new()
    };
    ($($name:ident : $value:expr),* $(,)?) => {
        vec![ $( (stringify!($name), $crate::value::Value::from($value)) ),* ]
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::Bool(true).type_name(), "bool");
        assert_eq!(Value::Int(1).type_name(), "int");
        assert_eq!(Value::Float(1.5).type_name(), "float");
        assert_eq!(Value::Str("x".into()).type_name(), "str");
        assert_eq!(Value::List(vec![]).type_name(), "list");
        assert_eq!(Value::Map(BTreeMap::new()).type_name(), "map");
    }

    #[test]
    fn test_bool_is_not_numeric() {
        // The accessors enforce the same strictness as the matcher.
        assert_eq!(Value::Bool(true).as_int(), None);
        assert_eq!(Value::Bool(true).as_float(), None);
        assert_eq!(Value::Int(1).as_bool(), None);
        assert_eq!(Value::Int(1).as_float(), None);
    }

    #[test]
    fn test_equality_is_deep() {
        let a = Value::List(vec![Value::Int(1), Value::Str("x".into())]);
        let b = Value::List(vec![Value::Int(1), Value::Str("x".into())]);
        assert_eq!(a, b);

        let c = Value::List(vec![Value::Int(2)]);
        assert_ne!(a, c);
    }

    #[test]
    fn test_json_export() {
        let mut map = BTreeMap::new();
        map.insert("k".to_string(), Value::Int(7));
        let v = Value::List(vec![Value::Null, Value::Bool(false), Value::Map(map)]);
        assert_eq!(v.to_json(), serde_json::json!([null, false, {"k": 7}]));
    }

    #[test]
    fn test_non_finite_float_exports_as_null() {
        assert_eq!(Value::Float(f64::NAN).to_json(), serde_json::Value::Null);
    }

    #[test]
    fn test_display_quotes_strings() {
        assert_eq!(format!("{}", Value::Str("a".into())), "\"a\"");
        assert_eq!(format!("{}", Value::Int(3)), "3");
        assert_eq!(
            format!("{}", Value::List(vec![Value::Int(1), Value::Int(2)])),
            "[1, 2]"
        );
    }

    #[test]
    fn test_args_macro() {
        let kwargs = args! { name: "A", age: 20, score: 1.5 };
        assert_eq!(kwargs[0], ("name", Value::Str("A".into())));
        assert_eq!(kwargs[1], ("age", Value::Int(20)));
        assert_eq!(kwargs[2], ("score", Value::Float(1.5)));

        let empty = args! {};
        assert!(empty.is_empty());
    }
}
