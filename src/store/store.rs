//! In-memory query store
//!
//! Treats declared models as table schemas and validated instances as
//! rows. One table per model, rows in insertion order, a point index
//! on the primary key, and one point index per unique attribute.
//!
//! The store consumes only the engine's output: every row was fully
//! validated at construction, so queries never re-validate. Filtering
//! is strict equality with AND semantics and no coercion; results come
//! back in insertion order.

use std::collections::HashMap;
use std::sync::Arc;

use crate::model::Instance;
use crate::observability::Logger;
use crate::schema::{ModelRegistry, ModelSchema};
use crate::store::errors::{StoreError, StoreResult};
use crate::store::key::StoreKey;
use crate::value::Value;

/// One table of rows for a single model.
struct Table {
    /// Rows in insertion order
    rows: Vec<Arc<Instance>>,
    /// Primary-key value to row position
    pk_index: HashMap<StoreKey, usize>,
    /// Unique attribute name to (value to row position)
    unique_indexes: HashMap<String, HashMap<StoreKey, usize>>,
}

impl Table {
    fn new(schema: &ModelSchema) -> Self {
        let unique_indexes = schema
            .attributes()
            .filter(|attr| attr.unique && !attr.primary_key)
            .map(|attr| (attr.name.clone(), HashMap::new()))
            .collect();
        Self {
            rows: Vec::new(),
            pk_index: HashMap::new(),
            unique_indexes,
        }
    }
}

/// In-memory, registry-backed collection of validated instances.
pub struct QueryStore {
    registry: Arc<ModelRegistry>,
    tables: HashMap<String, Table>,
}

impl QueryStore {
    /// Creates an empty store over the given registry.
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self {
            registry,
            tables: HashMap::new(),
        }
    }

    /// Inserts a row.
    ///
    /// Rejects models without a primary key, duplicate primary-key
    /// values, and duplicate values for unique attributes. All checks
    /// run before any index is touched, so a rejected insert leaves
    /// the store unchanged.
    pub fn insert(&mut self, instance: Arc<Instance>) -> StoreResult<()> {
        let schema = instance.schema().clone();
        let model = schema.name();

        let pk_attr = schema
            .primary_key()
            .ok_or_else(|| StoreError::NoPrimaryKey {
                model: model.to_string(),
            })?;
        let pk_value = instance
            .primary_key_value()
            .ok_or_else(|| StoreError::NoPrimaryKey {
                model: model.to_string(),
            })?;
        let pk_key = StoreKey::from_value(pk_value).ok_or_else(|| StoreError::UnkeyableValue {
            model: model.to_string(),
            attribute: pk_attr.to_string(),
        })?;

        let table = self
            .tables
            .entry(model.to_string())
            .or_insert_with(|| Table::new(&schema));

        if table.pk_index.contains_key(&pk_key) {
            Logger::warn(
                "row_rejected",
                &[("model", model), ("attribute", pk_attr)],
            );
            return Err(StoreError::DuplicateKey {
                model: model.to_string(),
                attribute: pk_attr.to_string(),
                value: pk_value.to_string(),
            });
        }

        // Unique attributes are checked before anything is written.
        // Null and other unkeyable values are not indexed, so an
        // optional unique attribute may stay null on any number of
        // rows.
        let mut unique_entries: Vec<(String, StoreKey)> = Vec::new();
        for (attribute, index) in &table.unique_indexes {
            let Some(value) = instance.get(attribute) else {
                continue;
            };
            let Some(key) = StoreKey::from_value(value) else {
                continue;
            };
            if index.contains_key(&key) {
                Logger::warn(
                    "row_rejected",
                    &[("model", model), ("attribute", attribute.as_str())],
                );
                return Err(StoreError::DuplicateKey {
                    model: model.to_string(),
                    attribute: attribute.clone(),
                    value: value.to_string(),
                });
            }
            unique_entries.push((attribute.clone(), key));
        }

        let pos = table.rows.len();
        table.pk_index.insert(pk_key, pos);
        for (attribute, key) in unique_entries {
            if let Some(index) = table.unique_indexes.get_mut(&attribute) {
                index.insert(key, pos);
            }
        }
        table.rows.push(instance);

        Logger::trace("row_inserted", &[("model", model)]);
        Ok(())
    }

    /// Point lookup by primary-key value.
    pub fn get(&self, model: &str, pk_value: &Value) -> StoreResult<Arc<Instance>> {
        let schema = self.schema(model)?;
        schema
            .primary_key()
            .ok_or_else(|| StoreError::NoPrimaryKey {
                model: model.to_string(),
            })?;

        self.tables
            .get(model)
            .and_then(|table| {
                StoreKey::from_value(pk_value)
                    .and_then(|key| table.pk_index.get(&key))
                    .map(|&pos| table.rows[pos].clone())
            })
            .ok_or_else(|| StoreError::NotFound {
                model: model.to_string(),
            })
    }

    /// Returns the single first row matching the constraints, in
    /// insertion order, or not-found.
    pub fn find(
        &self,
        model: &str,
        constraints: &[(&str, Value)],
    ) -> StoreResult<Arc<Instance>> {
        self.filter(model, constraints)?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound {
                model: model.to_string(),
            })
    }

    /// Returns every row matching the constraints by strict equality,
    /// in insertion order; possibly empty.
    ///
    /// A constraint naming an undeclared attribute is an error, not an
    /// empty result.
    pub fn filter(
        &self,
        model: &str,
        constraints: &[(&str, Value)],
    ) -> StoreResult<Vec<Arc<Instance>>> {
        let schema = self.schema(model)?;
        for (field, _) in constraints {
            if schema.get(field).is_none() {
                return Err(StoreError::UnknownField {
                    model: model.to_string(),
                    field: field.to_string(),
                });
            }
        }

        let Some(table) = self.tables.get(model) else {
            return Ok(Vec::new());
        };
        Ok(table
            .rows
            .iter()
            .filter(|row| {
                constraints
                    .iter()
                    .all(|(field, expected)| row.get(field) == Some(expected))
            })
            .cloned()
            .collect())
    }

    /// Returns every stored row of the model, in insertion order.
    pub fn all(&self, model: &str) -> StoreResult<Vec<Arc<Instance>>> {
        self.filter(model, &[])
    }

    /// Returns the number of stored rows for the model.
    pub fn count(&self, model: &str) -> usize {
        self.tables.get(model).map_or(0, |table| table.rows.len())
    }

    fn schema(&self, model: &str) -> StoreResult<Arc<ModelSchema>> {
        self.registry
            .get(model)
            .ok_or_else(|| StoreError::UnknownModel {
                model: model.to_string(),
            })
    }
}
