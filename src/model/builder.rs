//! Instance construction
//!
//! Resolution runs in two passes over the merged schema:
//!
//! 1. Non-derived attributes, in declaration order: explicit value if
//!    supplied, else default, else "missing required value". Each
//!    resolved value is type-checked immediately.
//! 2. Derived attributes, in declaration order: an explicit value wins
//!    and the derivation never runs; otherwise the derivation sees a
//!    read-only view of everything resolved so far, which is why a
//!    derivation may read attributes declared after its own and
//!    derived attributes resolved earlier in the same pass.
//!
//! Both passes always run to completion. Failures accumulate into one
//! report, so a caller sees every bad field at once, and unknown
//! argument names are reported rather than ignored.

use std::collections::HashMap;
use std::sync::Arc;

use crate::model::errors::{InvalidModelError, ValidationReport, MODEL_KEY};
use crate::model::instance::Instance;
use crate::observability::Logger;
use crate::schema::{AttributeDef, ModelSchema};
use crate::validate::TypeMatcher;
use crate::value::Value;

/// Read-only view of the in-progress instance handed to derivations.
///
/// `get` returns `None` for attributes that have not resolved (yet),
/// including ones that failed validation earlier in the same call.
pub struct AttrView<'a> {
    schema: &'a ModelSchema,
    resolved: &'a [Option<Value>],
}

impl<'a> AttrView<'a> {
    /// Returns the resolved value of an attribute, if available.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schema
            .position(name)
            .and_then(|pos| self.resolved[pos].as_ref())
    }

    /// Returns the model name being constructed.
    pub fn model_name(&self) -> &str {
        self.schema.name()
    }
}

/// Constructs a validated instance from keyword-style arguments.
///
/// Returns the instance, or an [`InvalidModelError`] aggregating every
/// failing field. The registry's
/// [`construct`](crate::schema::ModelRegistry::construct) method is the
/// usual entry point; this function is the engine behind it.
pub fn construct(
    schema: &Arc<ModelSchema>,
    kwargs: Vec<(&str, Value)>,
) -> Result<Arc<Instance>, InvalidModelError> {
    let mut report = ValidationReport::new();

    if schema.is_abstract() {
        report.insert(
            MODEL_KEY,
            format!("cannot instantiate abstract model '{}'", schema.name()),
        );
        return Err(reject(schema.name(), report));
    }

    // Partition the arguments; unknown and repeated names go straight
    // into the report.
    let mut supplied: HashMap<String, Value> = HashMap::with_capacity(kwargs.len());
    for (name, value) in kwargs {
        if schema.get(name).is_none() {
            report.insert(
                name,
                format!("not a declared attribute of model '{}'", schema.name()),
            );
        } else if supplied.insert(name.to_string(), value).is_some() {
            report.insert(name, "argument supplied more than once");
        }
    }

    // A slot stays empty exactly when the report names its attribute.
    let mut resolved: Vec<Option<Value>> = vec![None; schema.len()];

    // Pass 1: non-derived attributes.
    for (pos, attr) in schema.attributes().enumerate() {
        if attr.is_derived() {
            continue;
        }
        let value = supplied
            .remove(&attr.name)
            .or_else(|| attr.default.clone());
        match value {
            Some(value) => {
                if let Some(message) = check(attr, &value) {
                    report.insert(attr.name.as_str(), message);
                } else {
                    resolved[pos] = Some(value);
                }
            }
            None => {
                report.insert(
                    attr.name.as_str(),
                    "missing required value (no explicit value, no default, no derivation)",
                );
            }
        }
    }

    // Pass 2: derived attributes, declaration order. An explicit value
    // suppresses the derivation entirely.
    for (pos, attr) in schema.attributes().enumerate() {
        let Some(derivation) = &attr.derivation else {
            continue;
        };
        let value = match supplied.remove(&attr.name) {
            Some(explicit) => explicit,
            None => {
                let view = AttrView {
                    schema: schema.as_ref(),
                    resolved: &resolved,
                };
                derivation(&view)
            }
        };
        if let Some(message) = check(attr, &value) {
            report.insert(attr.name.as_str(), message);
        } else {
            resolved[pos] = Some(value);
        }
    }

    if report.is_empty() {
        if let Some(values) = resolved.into_iter().collect::<Option<Vec<_>>>() {
            return Ok(Arc::new(Instance::new(schema.clone(), values)));
        }
    }
    Err(reject(schema.name(), report))
}

/// Validates one resolved value: type match first, then choices
/// membership. Returns the failure message, if any.
fn check(attr: &AttributeDef, value: &Value) -> Option<String> {
    if !TypeMatcher::matches(value, &attr.declared_type) {
        return Some(format!(
            "value {} of type {} does not match declared type {}",
            value,
            value.type_name(),
            attr.declared_type.describe()
        ));
    }
    if let Some(choices) = &attr.choices {
        if !choices.contains(value) {
            return Some(format!(
                "value {} is not one of the allowed choices",
                value
            ));
        }
    }
    None
}

fn reject(model: &str, report: ValidationReport) -> InvalidModelError {
    Logger::trace(
        "construction_rejected",
        &[("model", model), ("errors", &report.len().to_string())],
    );
    InvalidModelError::new(model, report)
}
