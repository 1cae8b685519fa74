//! Schema type definitions
//!
//! Declared types are a closed tagged enum built once per schema and
//! interpreted structurally at match time, never re-parsed per value.
//! A model reference is carried by name, so self-referential and
//! forward-referenced declarations cost nothing to build.
//!
//! Supported types:
//! - null: the null sentinel only
//! - bool, int, float, str: exact primitives, no widening
//! - date, timestamp: calendar date and UTC point in time
//! - list: homogeneous sequence with element type
//! - map: string-keyed mapping with key and value types
//! - union: any of several alternatives
//! - model: instance of a named model or a descendant

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::model::AttrView;
use crate::value::Value;

/// A declared type expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TypeExpr {
    /// Matches only the null sentinel
    Null,
    /// Boolean
    Bool,
    /// 64-bit signed integer
    Int,
    /// 64-bit floating point
    Float,
    /// UTF-8 string
    Str,
    /// Calendar date
    Date,
    /// Point in time (UTC)
    Timestamp,
    /// Homogeneous sequence with a single element type
    List {
        /// Element type (boxed to allow recursive declarations)
        element: Box<TypeExpr>,
    },
    /// String-keyed mapping
    Map {
        /// Key type; only string-admitting keys can ever match
        key: Box<TypeExpr>,
        /// Value type
        value: Box<TypeExpr>,
    },
    /// Any of several alternatives
    Union {
        /// Alternatives, tried in declaration order
        alternatives: Vec<TypeExpr>,
    },
    /// Instance of a named model or a descendant of it
    Model {
        /// Model name, resolved structurally at match time
        name: String,
    },
}

impl TypeExpr {
    /// A list of the given element type.
    pub fn list(element: TypeExpr) -> Self {
        TypeExpr::List {
            element: Box::new(element),
        }
    }

    /// A string-keyed map with the given key and value types.
    pub fn map(key: TypeExpr, value: TypeExpr) -> Self {
        TypeExpr::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// A union over the given alternatives.
    pub fn union(alternatives: impl IntoIterator<Item = TypeExpr>) -> Self {
        TypeExpr::Union {
            alternatives: alternatives.into_iter().collect(),
        }
    }

    /// Shorthand for `union([inner, null])`.
    pub fn optional(inner: TypeExpr) -> Self {
        TypeExpr::union([inner, TypeExpr::Null])
    }

    /// A reference to a named model, by name.
    ///
    /// The name does not have to be declared yet; it is resolved
    /// against the value's own model at match time, which is what makes
    /// self-referential declarations work.
    pub fn model(name: impl Into<String>) -> Self {
        TypeExpr::Model { name: name.into() }
    }

    /// Returns true for types every value of which can serve as a
    /// point-index key. Primary keys require this.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            TypeExpr::Bool
                | TypeExpr::Int
                | TypeExpr::Float
                | TypeExpr::Str
                | TypeExpr::Date
                | TypeExpr::Timestamp
        )
    }

    /// Returns true for types at least some values of which have a key
    /// form. Unique attributes require only this much: an optional
    /// unique attribute may hold null, and null rows stay outside the
    /// unique index.
    pub fn is_keyable(&self) -> bool {
        match self {
            TypeExpr::Union { alternatives } => alternatives.iter().any(TypeExpr::is_keyable),
            other => other.is_scalar(),
        }
    }

    /// Renders the declared type for error messages.
    pub fn describe(&self) -> String {
        match self {
            TypeExpr::Null => "null".into(),
            TypeExpr::Bool => "bool".into(),
            TypeExpr::Int => "int".into(),
            TypeExpr::Float => "float".into(),
            TypeExpr::Str => "str".into(),
            TypeExpr::Date => "date".into(),
            TypeExpr::Timestamp => "timestamp".into(),
            TypeExpr::List { element } => format!("list<{}>", element.describe()),
            TypeExpr::Map { key, value } => {
                format!("map<{}, {}>", key.describe(), value.describe())
            }
            TypeExpr::Union { alternatives } => alternatives
                .iter()
                .map(TypeExpr::describe)
                .collect::<Vec<_>>()
                .join(" | "),
            TypeExpr::Model { name } => name.clone(),
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}

/// A derivation computes an attribute's value from the other attributes
/// of the in-progress instance when no explicit value is supplied.
pub type Derivation = Arc<dyn Fn(&AttrView<'_>) -> Value + Send + Sync>;

/// Configuration options for one attribute declaration.
///
/// Mirrors the construction surface: `primary_key`, `unique`, a
/// pre-validated `default`, an allowed-value `choices` list, and a
/// `derived` function. Conflicting combinations are rejected when the
/// declaration is registered, not at first construction.
#[derive(Clone, Default)]
pub struct FieldOptions {
    pub(crate) primary_key: bool,
    pub(crate) unique: bool,
    pub(crate) default: Option<Value>,
    pub(crate) choices: Option<Vec<Value>>,
    pub(crate) derived: Option<Derivation>,
}

impl FieldOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the attribute as the model's primary key (implies unique).
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Requires the attribute's value to be unique across stored rows.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Sets the default value, used when no explicit value and no
    /// derivation result is available.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Restricts the attribute to the given allowed values.
    pub fn choices(mut self, choices: impl IntoIterator<Item = Value>) -> Self {
        self.choices = Some(choices.into_iter().collect());
        self
    }

    /// Attaches a derivation function.
    pub fn derived(
        mut self,
        derive: impl Fn(&AttrView<'_>) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.derived = Some(Arc::new(derive));
        self
    }
}

impl fmt::Debug for FieldOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldOptions")
            .field("primary_key", &self.primary_key)
            .field("unique", &self.unique)
            .field("default", &self.default)
            .field("choices", &self.choices)
            .field("derived", &self.derived.is_some())
            .finish()
    }
}

/// One attribute declaration, shared by every instance of its model.
#[derive(Clone)]
pub struct AttributeDef {
    /// Attribute name, unique within the merged schema
    pub name: String,
    /// Declared type
    pub declared_type: TypeExpr,
    /// Default value, validated at declaration time
    pub default: Option<Value>,
    /// Derivation function; takes precedence over the default
    pub derivation: Option<Derivation>,
    /// Primary-key flag; at most one per model
    pub primary_key: bool,
    /// Unique flag; true whenever primary_key is true
    pub unique: bool,
    /// Allowed values, if restricted
    pub choices: Option<Vec<Value>>,
}

impl AttributeDef {
    pub(crate) fn new(name: impl Into<String>, declared_type: TypeExpr, opts: FieldOptions) -> Self {
        Self {
            name: name.into(),
            declared_type,
            default: opts.default,
            derivation: opts.derived,
            primary_key: opts.primary_key,
            unique: opts.primary_key || opts.unique,
            choices: opts.choices,
        }
    }

    /// Returns true if a derivation function is attached.
    pub fn is_derived(&self) -> bool {
        self.derivation.is_some()
    }
}

impl fmt::Debug for AttributeDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeDef")
            .field("name", &self.name)
            .field("declared_type", &self.declared_type)
            .field("default", &self.default)
            .field("derived", &self.derivation.is_some())
            .field("primary_key", &self.primary_key)
            .field("unique", &self.unique)
            .field("choices", &self.choices)
            .finish()
    }
}

/// A model declaration: name, parents, ordered attributes.
///
/// Built with the fluent surface and handed to
/// [`ModelRegistry::declare`](crate::schema::ModelRegistry::declare):
///
/// ```
/// use modeldb::schema::{ModelDecl, ModelRegistry, TypeExpr, FieldOptions};
///
/// let registry = ModelRegistry::new();
/// registry
///     .declare(
///         ModelDecl::new("Person")
///             .attr_with("name", TypeExpr::Str, FieldOptions::new().primary_key())
///             .attr("age", TypeExpr::Int),
///     )
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ModelDecl {
    pub(crate) name: String,
    pub(crate) parents: Vec<String>,
    pub(crate) attributes: Vec<AttributeDef>,
    pub(crate) is_abstract: bool,
}

impl ModelDecl {
    /// Starts a declaration for the named model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parents: Vec::new(),
            attributes: Vec::new(),
            is_abstract: false,
        }
    }

    /// Adds a parent model. Parents are merged left to right; the first
    /// occurrence of an attribute name wins among parents, and the
    /// declaring model's own attributes override all of them.
    pub fn parent(mut self, name: impl Into<String>) -> Self {
        self.parents.push(name.into());
        self
    }

    /// Declares an attribute with no options.
    pub fn attr(self, name: impl Into<String>, declared_type: TypeExpr) -> Self {
        self.attr_with(name, declared_type, FieldOptions::new())
    }

    /// Declares an attribute with field options.
    pub fn attr_with(
        mut self,
        name: impl Into<String>,
        declared_type: TypeExpr,
        opts: FieldOptions,
    ) -> Self {
        self.attributes
            .push(AttributeDef::new(name, declared_type, opts));
        self
    }

    /// Marks the model abstract: it can be inherited from but not
    /// instantiated.
    pub fn abstract_model(mut self) -> Self {
        self.is_abstract = true;
        self
    }
}

/// The merged, override-resolved schema for one model.
///
/// Produced once by the registry when the model is declared, cached for
/// the lifetime of the process, and shared by every instance.
#[derive(Debug)]
pub struct ModelSchema {
    name: String,
    is_abstract: bool,
    /// Merged attributes in first-declaration order
    attributes: Vec<AttributeDef>,
    /// Attribute name to position in `attributes`
    index: HashMap<String, usize>,
    /// Every ancestor model name, transitively
    ancestors: HashSet<String>,
    /// Name of the primary-key attribute, if any
    primary_key: Option<String>,
}

impl ModelSchema {
    pub(crate) fn new(
        name: String,
        is_abstract: bool,
        attributes: Vec<AttributeDef>,
        ancestors: HashSet<String>,
        primary_key: Option<String>,
    ) -> Self {
        let index = attributes
            .iter()
            .enumerate()
            .map(|(pos, attr)| (attr.name.clone(), pos))
            .collect();
        Self {
            name,
            is_abstract,
            attributes,
            index,
            ancestors,
            primary_key,
        }
    }

    /// Returns the model name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if the model cannot be instantiated.
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Returns the merged attributes in declaration order.
    pub fn attributes(&self) -> impl Iterator<Item = &AttributeDef> {
        self.attributes.iter()
    }

    /// Returns the number of attributes in the merged schema.
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Returns true if the merged schema has no attributes.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Looks up an attribute by name.
    pub fn get(&self, name: &str) -> Option<&AttributeDef> {
        self.index.get(name).map(|&pos| &self.attributes[pos])
    }

    /// Returns an attribute's position in declaration order.
    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Returns the primary-key attribute name, if one is declared.
    pub fn primary_key(&self) -> Option<&str> {
        self.primary_key.as_deref()
    }

    /// Returns true if this model is `name` or a descendant of it.
    pub fn is_subtype_of(&self, name: &str) -> bool {
        self.name == name || self.ancestors.contains(name)
    }

    /// Returns the transitive ancestor set.
    pub fn ancestors(&self) -> &HashSet<String> {
        &self.ancestors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_renders_nested_types() {
        assert_eq!(TypeExpr::Str.describe(), "str");
        assert_eq!(TypeExpr::list(TypeExpr::Int).describe(), "list<int>");
        assert_eq!(
            TypeExpr::map(TypeExpr::Str, TypeExpr::Float).describe(),
            "map<str, float>"
        );
        assert_eq!(
            TypeExpr::optional(TypeExpr::Str).describe(),
            "str | null"
        );
        assert_eq!(TypeExpr::model("Person").describe(), "Person");
        assert_eq!(
            TypeExpr::list(TypeExpr::model("Person")).describe(),
            "list<Person>"
        );
    }

    #[test]
    fn test_scalar_classification() {
        assert!(TypeExpr::Int.is_scalar());
        assert!(TypeExpr::Str.is_scalar());
        assert!(TypeExpr::Date.is_scalar());
        assert!(!TypeExpr::Null.is_scalar());
        assert!(!TypeExpr::list(TypeExpr::Int).is_scalar());
        assert!(!TypeExpr::model("Person").is_scalar());
        assert!(!TypeExpr::optional(TypeExpr::Int).is_scalar());
    }

    #[test]
    fn test_keyable_admits_optional_scalars() {
        assert!(TypeExpr::Int.is_keyable());
        assert!(TypeExpr::optional(TypeExpr::Str).is_keyable());
        assert!(!TypeExpr::Null.is_keyable());
        assert!(!TypeExpr::list(TypeExpr::Int).is_keyable());
        assert!(!TypeExpr::union([TypeExpr::Null, TypeExpr::list(TypeExpr::Int)]).is_keyable());
    }

    #[test]
    fn test_type_expr_serialization() {
        let ty = TypeExpr::list(TypeExpr::Str);
        let json = serde_json::to_value(&ty).unwrap();
        assert_eq!(json["type"], "list");
        assert_eq!(json["element"]["type"], "str");

        let back: TypeExpr = serde_json::from_value(json).unwrap();
        assert_eq!(back, ty);
    }

    #[test]
    fn test_primary_key_implies_unique() {
        let attr = AttributeDef::new("id", TypeExpr::Int, FieldOptions::new().primary_key());
        assert!(attr.primary_key);
        assert!(attr.unique);
    }

    #[test]
    fn test_decl_collects_attributes_in_order() {
        let decl = ModelDecl::new("Person")
            .attr("name", TypeExpr::Str)
            .attr("age", TypeExpr::Int);
        assert_eq!(decl.attributes[0].name, "name");
        assert_eq!(decl.attributes[1].name, "age");
        assert!(!decl.is_abstract);
    }
}
