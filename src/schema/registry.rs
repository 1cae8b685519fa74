//! Model registry and schema merging
//!
//! Declarations are registered explicitly; the registry linearizes the
//! ancestor graph, merges attribute declarations into one flat ordered
//! schema per model, and validates every default eagerly, so a bad
//! default fails the declaration rather than the first construction.
//!
//! # Merge rules
//!
//! - Parents are merged left to right; among parents the first
//!   occurrence of an attribute name wins. This keeps diamond graphs
//!   deterministic: a shared ancestor contributes one declaration, and
//!   precedence follows the parent list.
//! - The declaring model's own attributes override any inherited
//!   declaration in place, keeping the inherited position; new names
//!   append in declaration order.
//! - No positional constraint exists between attributes with and
//!   without defaults.
//!
//! The registry is append-only. Merged schemas are published behind a
//! lock as `Arc<ModelSchema>`: a reader either sees nothing or the
//! complete schema, and two threads racing to declare the same model
//! resolve to one winner and one duplicate-model error.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::model::{self, Instance, InvalidModelError, ValidationReport, MODEL_KEY};
use crate::observability::Logger;
use crate::schema::errors::{SchemaError, SchemaResult};
use crate::schema::types::{AttributeDef, ModelDecl, ModelSchema};
use crate::validate::TypeMatcher;
use crate::value::Value;

/// Process-wide registry of declared models.
pub struct ModelRegistry {
    models: RwLock<HashMap<String, Arc<ModelSchema>>>,
}

impl ModelRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            models: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a model declaration and returns its merged schema.
    ///
    /// All declaration-time checks run before anything is published:
    /// a failed declaration leaves the registry untouched.
    pub fn declare(&self, decl: ModelDecl) -> SchemaResult<Arc<ModelSchema>> {
        let ModelDecl {
            name,
            parents,
            attributes,
            is_abstract,
        } = decl;

        let (mut merged, mut index, ancestors) = self.merge_parents(&name, &parents)?;

        let mut seen = HashSet::new();
        for attr in attributes {
            if !seen.insert(attr.name.clone()) {
                return Err(SchemaError::duplicate_attribute(name.as_str(), &attr.name));
            }
            self.check_field_options(&name, &attr)?;
            match index.get(&attr.name) {
                // Redeclaration replaces the inherited attribute in place.
                Some(&pos) => merged[pos] = attr,
                None => {
                    index.insert(attr.name.clone(), merged.len());
                    merged.push(attr);
                }
            }
        }

        let mut primary_key: Option<String> = None;
        for attr in &merged {
            if attr.primary_key {
                if let Some(first) = &primary_key {
                    return Err(SchemaError::multiple_primary_keys(
                        name.as_str(),
                        first,
                        &attr.name,
                    ));
                }
                primary_key = Some(attr.name.clone());
            }
        }

        let attribute_count = merged.len();
        let schema = Arc::new(ModelSchema::new(
            name.clone(),
            is_abstract,
            merged,
            ancestors,
            primary_key,
        ));

        {
            // Sole writer section; published atomically. A racing
            // duplicate declaration loses here, after doing its own
            // throwaway merge.
            let mut models = self.models.write().expect("model registry lock poisoned");
            if models.contains_key(&name) {
                return Err(SchemaError::duplicate_model(name.clone()));
            }
            models.insert(name.clone(), schema.clone());
        }

        Logger::info(
            "model_declared",
            &[
                ("model", name.as_str()),
                ("attributes", &attribute_count.to_string()),
            ],
        );
        Ok(schema)
    }

    /// Walks the parent list and folds the already-merged parent
    /// schemas into one ordered attribute list plus the transitive
    /// ancestor set.
    fn merge_parents(
        &self,
        name: &str,
        parents: &[String],
    ) -> SchemaResult<(Vec<AttributeDef>, HashMap<String, usize>, HashSet<String>)> {
        let mut merged: Vec<AttributeDef> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut ancestors: HashSet<String> = HashSet::new();

        let models = self.models.read().expect("model registry lock poisoned");
        if models.contains_key(name) {
            return Err(SchemaError::duplicate_model(name));
        }
        for parent_name in parents {
            let parent = models
                .get(parent_name)
                .ok_or_else(|| SchemaError::unknown_parent(name, parent_name))?;
            ancestors.insert(parent_name.clone());
            ancestors.extend(parent.ancestors().iter().cloned());
            for attr in parent.attributes() {
                if !index.contains_key(&attr.name) {
                    index.insert(attr.name.clone(), merged.len());
                    merged.push(attr.clone());
                }
            }
        }
        Ok((merged, index, ancestors))
    }

    /// Eager per-attribute checks: option conflicts, key type, default
    /// and choices validity.
    fn check_field_options(&self, model: &str, attr: &AttributeDef) -> SchemaResult<()> {
        if attr.default.is_some() && attr.primary_key {
            return Err(SchemaError::invalid_field_option(
                model,
                &attr.name,
                "cannot specify both default and primary_key",
            ));
        }
        if attr.primary_key && !attr.declared_type.is_scalar() {
            return Err(SchemaError::invalid_field_option(
                model,
                &attr.name,
                format!(
                    "type {} cannot serve as a primary key",
                    attr.declared_type.describe()
                ),
            ));
        }
        if attr.unique && !attr.primary_key && !attr.declared_type.is_keyable() {
            return Err(SchemaError::invalid_field_option(
                model,
                &attr.name,
                format!(
                    "type {} cannot serve as a unique key",
                    attr.declared_type.describe()
                ),
            ));
        }
        if let Some(choices) = &attr.choices {
            for choice in choices {
                if !TypeMatcher::matches(choice, &attr.declared_type) {
                    return Err(SchemaError::invalid_field_option(
                        model,
                        &attr.name,
                        format!(
                            "choice {} of type {} does not match declared type {}",
                            choice,
                            choice.type_name(),
                            attr.declared_type.describe()
                        ),
                    ));
                }
            }
        }
        if let Some(default) = &attr.default {
            if !TypeMatcher::matches(default, &attr.declared_type) {
                return Err(SchemaError::invalid_default(
                    model,
                    &attr.name,
                    default,
                    &attr.declared_type,
                ));
            }
            if let Some(choices) = &attr.choices {
                if !choices.contains(default) {
                    return Err(SchemaError::invalid_field_option(
                        model,
                        &attr.name,
                        format!("default {} is not one of the allowed choices", default),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Returns the merged schema for a declared model.
    pub fn get(&self, name: &str) -> Option<Arc<ModelSchema>> {
        self.models
            .read()
            .expect("model registry lock poisoned")
            .get(name)
            .cloned()
    }

    /// Returns true if the model has been declared.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns the number of declared models.
    pub fn len(&self) -> usize {
        self.models
            .read()
            .expect("model registry lock poisoned")
            .len()
    }

    /// Returns true if no models have been declared.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Constructs a validated instance of a declared model.
    ///
    /// Convenience over [`model::construct`]; an unknown model name is
    /// reported through the same error surface as any other
    /// construction failure.
    pub fn construct(
        &self,
        model: &str,
        kwargs: Vec<(&str, Value)>,
    ) -> Result<Arc<Instance>, InvalidModelError> {
        match self.get(model) {
            Some(schema) => model::construct(&schema, kwargs),
            None => {
                let mut report = ValidationReport::new();
                report.insert(MODEL_KEY, format!("model '{}' has not been declared", model));
                Err(InvalidModelError::new(model, report))
            }
        }
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}
