//! Point-index keys
//!
//! Primary-key and unique indexes need scalar values as map keys.
//! Floats carry no `Eq`/`Ord`/`Hash`, so they are keyed by an
//! order-preserving bit transform instead of their raw bits.
//! Non-scalar values (null, lists, maps, instances) have no key form.

use chrono::{DateTime, NaiveDate, Utc};

use crate::value::Value;

/// A total-ordered, hashable key derived from a scalar value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StoreKey {
    /// Boolean value (false < true)
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Float value (stored as order-preserving bits)
    Float(u64),
    /// String value
    Str(String),
    /// Calendar date
    Date(NaiveDate),
    /// Point in time (UTC)
    Timestamp(DateTime<Utc>),
}

impl StoreKey {
    /// Derives a key from a runtime value.
    ///
    /// Returns `None` for value kinds that cannot serve as keys.
    pub fn from_value(value: &Value) -> Option<StoreKey> {
        match value {
            Value::Bool(b) => Some(StoreKey::Bool(*b)),
            Value::Int(i) => Some(StoreKey::Int(*i)),
            Value::Float(f) => Some(StoreKey::Float(ordered_bits(*f))),
            Value::Str(s) => Some(StoreKey::Str(s.clone())),
            Value::Date(d) => Some(StoreKey::Date(*d)),
            Value::Timestamp(t) => Some(StoreKey::Timestamp(*t)),
            Value::Null | Value::List(_) | Value::Map(_) | Value::Instance(_) => None,
        }
    }
}

/// Maps a float to bits whose unsigned order matches numeric order:
/// negatives flip entirely, positives flip the sign bit.
fn ordered_bits(f: f64) -> u64 {
    let bits = f.to_bits();
    if (bits >> 63) == 1 {
        !bits
    } else {
        bits ^ (1 << 63)
    }
}
