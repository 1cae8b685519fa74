//! Validated model instances
//!
//! An instance owns one value per attribute of its merged schema.
//! Every value matched its declared type when the instance was built,
//! and the API hands instances out as `Arc<Instance>` with no mutable
//! access, so that guarantee holds for the instance's lifetime.

use std::fmt;
use std::sync::Arc;

use crate::schema::ModelSchema;
use crate::value::Value;

/// A fully validated, immutable model instance.
pub struct Instance {
    schema: Arc<ModelSchema>,
    /// One value per schema attribute, in declaration order
    values: Vec<Value>,
}

impl Instance {
    pub(crate) fn new(schema: Arc<ModelSchema>, values: Vec<Value>) -> Self {
        Self { schema, values }
    }

    /// Returns the model name.
    pub fn model_name(&self) -> &str {
        self.schema.name()
    }

    /// Returns the merged schema this instance was built against.
    pub fn schema(&self) -> &Arc<ModelSchema> {
        &self.schema
    }

    /// Returns an attribute's value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schema
            .position(name)
            .map(|pos| &self.values[pos])
    }

    /// Returns the primary-key value, if the model declares one.
    pub fn primary_key_value(&self) -> Option<&Value> {
        self.schema.primary_key().and_then(|name| self.get(name))
    }

    /// Iterates over `(attribute name, value)` pairs in declaration
    /// order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.schema
            .attributes()
            .zip(self.values.iter())
            .map(|(attr, value)| (attr.name.as_str(), value))
    }

    /// Exports the instance as a JSON object, nested instances
    /// included.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.iter()
                .map(|(name, value)| (name.to_string(), value.to_json()))
                .collect(),
        )
    }
}

impl PartialEq for Instance {
    /// Two instances are equal when they are of the same model and all
    /// attribute values are equal. Nested instances compare by their
    /// own equality.
    fn eq(&self, other: &Self) -> bool {
        self.model_name() == other.model_name() && self.values == other.values
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(self.model_name());
        for (name, value) in self.iter() {
            s.field(name, &format_args!("{}", value));
        }
        s.finish()
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.model_name())?;
        if let Some(pk) = self.primary_key_value() {
            write!(f, "({})", pk)?;
        }
        Ok(())
    }
}
