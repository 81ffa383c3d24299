//! Schema Model: JSON-Schema-like type definitions and the registry that owns them.
//!
//! Named schemas live in a [`SchemaRegistry`] arena and are addressed by a stable
//! identity key (the declared type name). Inline nodes refer to named schemas through
//! [`SchemaKind::Reference`], which is resolved by key only after every schema has been
//! registered, so forward and mutually recursive references need no ordering.

use std::collections::HashMap;

/// Index of a named schema inside a [`SchemaRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaId(usize);

impl SchemaId {
    /// Position in registration order.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Scalar kinds with a fixed target-language mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// `string`
    String,
    /// `integer`
    Integer,
    /// `number`
    Number,
    /// `boolean`
    Boolean,
    /// Calendar date (`format: date`)
    Date,
    /// Timestamp (`format: date-time`)
    DateTime,
    /// Raw bytes / file content (`format: binary`)
    Binary,
    /// No usable type information
    Any,
}

/// A single enum member value.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumValue {
    /// String member
    String(String),
    /// Integer member
    Integer(i64),
    /// Non-integral numeric member
    Float(f64),
    /// Boolean member
    Bool(bool),
}

/// Enumeration of literal values.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumSchema {
    /// Member values in declaration order.
    pub values: Vec<EnumValue>,
    /// Optional member names, parallel to `values`.
    pub names: Vec<String>,
}

/// Discriminator of a polymorphic base schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discriminator {
    /// Name of the property that carries the discriminator value.
    pub property_name: String,
    /// Discriminator value → schema key of the derived type.
    pub mapping: Vec<(String, String)>,
}

/// One named member of an object schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Name as it appears in JSON.
    pub name: String,
    /// Value type.
    pub schema: SchemaNode,
    /// Required properties are never `undefined`.
    pub required: bool,
}

/// Object schema: ordered properties, optional base type and generic parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSchema {
    /// Own properties in declaration order.
    pub properties: Vec<Property>,
    /// Single-parent inheritance. Always a [`SchemaKind::Reference`] once linked.
    pub base: Option<Box<SchemaNode>>,
    /// Names of the generic parameters this declaration accepts (empty if non-generic).
    pub generic_params: Vec<String>,
    /// Value type of an `additionalProperties` index signature.
    pub additional_properties: Option<Box<SchemaNode>>,
    /// Present on a polymorphic base.
    pub discriminator: Option<Discriminator>,
}

impl ObjectSchema {
    /// Empty object schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a property.
    pub fn property(mut self, name: impl Into<String>, schema: SchemaNode, required: bool) -> Self {
        self.properties.push(Property {
            name: name.into(),
            schema,
            required,
        });
        self
    }

    /// Set the base type (normally a [`SchemaNode::reference`] or [`SchemaNode::generic`]).
    pub fn extends(mut self, base: SchemaNode) -> Self {
        self.base = Some(Box::new(base));
        self
    }

    /// Declare generic parameters, turning this object into a generic declaration.
    pub fn generic_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.generic_params = params.into_iter().map(Into::into).collect();
        self
    }

    /// Add an `additionalProperties` index signature with the given value type.
    pub fn additional_properties(mut self, value: SchemaNode) -> Self {
        self.additional_properties = Some(Box::new(value));
        self
    }

    /// Mark this object as a polymorphic base discriminated by `property_name`.
    pub fn discriminator<I, K, V>(mut self, property_name: impl Into<String>, mapping: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.discriminator = Some(Discriminator {
            property_name: property_name.into(),
            mapping: mapping
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        });
        self
    }

    /// Whether this object declares generic parameters.
    pub fn is_generic(&self) -> bool {
        !self.generic_params.is_empty()
    }
}

impl From<ObjectSchema> for SchemaNode {
    fn from(object: ObjectSchema) -> Self {
        SchemaNode::new(SchemaKind::Object(object))
    }
}

/// The shape of a schema node.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    /// Scalar
    Primitive(Primitive),
    /// Object with properties
    Object(ObjectSchema),
    /// Array of items
    Array(Box<SchemaNode>),
    /// String-keyed dictionary with uniform values.
    Map(Box<SchemaNode>),
    /// Enumeration
    Enum(EnumSchema),
    /// One of several alternatives without a shared base.
    Union(Vec<SchemaNode>),
    /// A placeholder for a generic argument, optionally bounded by an abstract constraint.
    GenericParam {
        /// Parameter name, e.g. `T`
        name: String,
        /// Abstract constraint on the argument
        bound: Option<Box<SchemaNode>>,
    },
    /// Reference to a named schema; `args` instantiates a generic declaration.
    Reference {
        /// Key of the referenced schema
        key: String,
        /// Generic arguments, empty for a plain reference
        args: Vec<SchemaNode>,
    },
}

/// A schema node, either registered under a key or nested inline.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    /// Shape of the node.
    pub kind: SchemaKind,
    /// `null` is an accepted value.
    pub nullable: bool,
    /// Description from the API document.
    pub description: Option<String>,
}

impl SchemaNode {
    /// Node of the given kind, non-nullable and undescribed.
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            nullable: false,
            description: None,
        }
    }

    /// Primitive node.
    pub fn primitive(primitive: Primitive) -> Self {
        Self::new(SchemaKind::Primitive(primitive))
    }

    /// `string`
    pub fn string() -> Self {
        Self::primitive(Primitive::String)
    }

    /// `integer`
    pub fn integer() -> Self {
        Self::primitive(Primitive::Integer)
    }

    /// `number`
    pub fn number() -> Self {
        Self::primitive(Primitive::Number)
    }

    /// `boolean`
    pub fn boolean() -> Self {
        Self::primitive(Primitive::Boolean)
    }

    /// Calendar date.
    pub fn date() -> Self {
        Self::primitive(Primitive::Date)
    }

    /// Timestamp.
    pub fn date_time() -> Self {
        Self::primitive(Primitive::DateTime)
    }

    /// Raw file content.
    pub fn binary() -> Self {
        Self::primitive(Primitive::Binary)
    }

    /// Untyped value.
    pub fn any() -> Self {
        Self::primitive(Primitive::Any)
    }

    /// Array of `item`.
    pub fn array(item: SchemaNode) -> Self {
        Self::new(SchemaKind::Array(Box::new(item)))
    }

    /// String-keyed dictionary of `value`.
    pub fn map(value: SchemaNode) -> Self {
        Self::new(SchemaKind::Map(Box::new(value)))
    }

    /// Start an object schema.
    pub fn object() -> ObjectSchema {
        ObjectSchema::new()
    }

    /// Reference to the named schema `key`.
    pub fn reference(key: impl Into<String>) -> Self {
        Self::new(SchemaKind::Reference {
            key: key.into(),
            args: Vec::new(),
        })
    }

    /// Instantiate the generic declaration `key` with `args`.
    pub fn generic<I>(key: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = SchemaNode>,
    {
        Self::new(SchemaKind::Reference {
            key: key.into(),
            args: args.into_iter().collect(),
        })
    }

    /// Unbounded generic parameter.
    pub fn generic_param(name: impl Into<String>) -> Self {
        Self::new(SchemaKind::GenericParam {
            name: name.into(),
            bound: None,
        })
    }

    /// Generic parameter constrained to `bound`.
    pub fn bounded_generic_param(name: impl Into<String>, bound: SchemaNode) -> Self {
        Self::new(SchemaKind::GenericParam {
            name: name.into(),
            bound: Some(Box::new(bound)),
        })
    }

    /// String enum with member names derived from the values.
    pub fn string_enum<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(SchemaKind::Enum(EnumSchema {
            values: values
                .into_iter()
                .map(|v| EnumValue::String(v.into()))
                .collect(),
            names: Vec::new(),
        }))
    }

    /// Union of several alternatives.
    pub fn union<I>(variants: I) -> Self
    where
        I: IntoIterator<Item = SchemaNode>,
    {
        Self::new(SchemaKind::Union(variants.into_iter().collect()))
    }

    /// Accept `null`.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Attach a description.
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Key of the referenced schema, if this node is a reference.
    pub fn reference_key(&self) -> Option<&str> {
        match &self.kind {
            SchemaKind::Reference { key, .. } => Some(key),
            _ => None,
        }
    }

    /// Object schema of this node, if it is one.
    pub fn as_object(&self) -> Option<&ObjectSchema> {
        match &self.kind {
            SchemaKind::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Whether this is a binary (file) primitive.
    pub fn is_binary(&self) -> bool {
        matches!(self.kind, SchemaKind::Primitive(Primitive::Binary))
    }

    /// Visit this node and every node nested inside it (not following references).
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a SchemaNode)) {
        visit(self);
        match &self.kind {
            SchemaKind::Primitive(_) | SchemaKind::Enum(_) => {}
            SchemaKind::Object(object) => {
                for prop in &object.properties {
                    prop.schema.walk(visit);
                }
                if let Some(base) = &object.base {
                    base.walk(visit);
                }
                if let Some(additional) = &object.additional_properties {
                    additional.walk(visit);
                }
            }
            SchemaKind::Array(inner) | SchemaKind::Map(inner) => inner.walk(visit),
            SchemaKind::Union(variants) => {
                for variant in variants {
                    variant.walk(visit);
                }
            }
            SchemaKind::GenericParam { bound, .. } => {
                if let Some(bound) = bound {
                    bound.walk(visit);
                }
            }
            SchemaKind::Reference { args, .. } => {
                for arg in args {
                    arg.walk(visit);
                }
            }
        }
    }
}

/// A schema registered under its identity key.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaEntry {
    /// Identity key, usually the declared type name.
    pub key: String,
    /// Registered node.
    pub node: SchemaNode,
}

/// Arena of named schemas, in registration order.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    entries: Vec<SchemaEntry>,
    by_key: HashMap<String, SchemaId>,
}

impl SchemaRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `node` under `key`. Re-registering a key replaces the node in place.
    pub fn register(&mut self, key: impl Into<String>, node: SchemaNode) -> SchemaId {
        let key = key.into();
        if let Some(&id) = self.by_key.get(&key) {
            self.entries[id.0].node = node;
            return id;
        }
        let id = SchemaId(self.entries.len());
        self.by_key.insert(key.clone(), id);
        self.entries.push(SchemaEntry { key, node });
        id
    }

    /// Id registered under `key`.
    pub fn lookup(&self, key: &str) -> Option<SchemaId> {
        self.by_key.get(key).copied()
    }

    /// Entry of a registry-issued id.
    pub fn get(&self, id: SchemaId) -> &SchemaEntry {
        &self.entries[id.0]
    }

    /// Entries with their ids, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (SchemaId, &SchemaEntry)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (SchemaId(i), entry))
    }

    /// Number of registered schemas.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no schema is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered object schemas whose base is a plain reference to `key`.
    pub fn derived_from(&self, key: &str) -> Vec<SchemaId> {
        self.iter()
            .filter(|(_, entry)| {
                entry
                    .node
                    .as_object()
                    .and_then(|object| object.base.as_deref())
                    .is_some_and(|base| {
                        matches!(&base.kind, SchemaKind::Reference { key: k, args } if k == key && args.is_empty())
                    })
            })
            .map(|(id, _)| id)
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = SchemaRegistry::new();
        let a = registry.register("A", SchemaNode::string());
        let b = registry.register("B", SchemaNode::reference("A"));
        assert_ne!(a, b);
        assert_eq!(registry.lookup("A"), Some(a));
        assert_eq!(registry.get(b).key, "B");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_reregister_keeps_identity() {
        let mut registry = SchemaRegistry::new();
        let first = registry.register("A", SchemaNode::string());
        let second = registry.register("A", SchemaNode::integer());
        assert_eq!(first, second);
        assert_eq!(registry.get(first).node, SchemaNode::integer());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_derived_from() {
        let mut registry = SchemaRegistry::new();
        registry.register("Pet", SchemaNode::object().into());
        let dog = registry.register(
            "Dog",
            SchemaNode::object().extends(SchemaNode::reference("Pet")).into(),
        );
        registry.register(
            "Box",
            SchemaNode::object()
                .extends(SchemaNode::generic("Pet", [SchemaNode::string()]))
                .into(),
        );
        assert_eq!(registry.derived_from("Pet"), vec![dog]);
    }

    #[test]
    fn test_walk_visits_nested_references() {
        let node: SchemaNode = SchemaNode::object()
            .property("a", SchemaNode::array(SchemaNode::reference("X")), true)
            .property("b", SchemaNode::generic("G", [SchemaNode::reference("Y")]), false)
            .into();
        let mut keys = Vec::new();
        node.walk(&mut |n| {
            if let Some(key) = n.reference_key() {
                keys.push(key.to_string());
            }
        });
        assert_eq!(keys, vec!["X", "G", "Y"]);
    }
}
