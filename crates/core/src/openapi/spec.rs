//! OpenAPI structs for serde deserialization.
//!
//! Covers the subset of OpenAPI 3.x and Swagger 2.0 the importer reads. Maps are
//! `IndexMap`s so schemas, paths and responses keep their document order, which
//! fixes the order of the generated declarations.

use indexmap::IndexMap;
use serde::Deserialize;

/// Root of an OpenAPI 3.x or Swagger 2.0 document.
#[derive(Debug, Default, Deserialize)]
pub struct OpenApiSpec {
    /// OpenAPI 3.x version string.
    pub openapi: Option<String>,
    /// Swagger 2.0 version string.
    pub swagger: Option<String>,
    /// Document metadata.
    pub info: Option<Info>,
    /// Path templates and their operations.
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
    /// Reusable components (OpenAPI 3.x).
    pub components: Option<Components>,
    /// Swagger 2.0 schema definitions.
    pub definitions: Option<IndexMap<String, Schema>>,
    /// Swagger 2.0 document-wide request content types.
    pub consumes: Option<Vec<String>>,
}

/// Document metadata.
#[derive(Debug, Default, Deserialize)]
pub struct Info {
    /// API title.
    pub title: Option<String>,
    /// API version.
    pub version: Option<String>,
}

/// Components section containing reusable schemas.
#[derive(Debug, Default, Deserialize)]
pub struct Components {
    /// Named schemas.
    pub schemas: Option<IndexMap<String, Schema>>,
}

/// A path item containing operations for different HTTP methods.
#[derive(Debug, Default, Deserialize)]
pub struct PathItem {
    /// `GET` operation.
    pub get: Option<Operation>,
    /// `PUT` operation.
    pub put: Option<Operation>,
    /// `POST` operation.
    pub post: Option<Operation>,
    /// `DELETE` operation.
    pub delete: Option<Operation>,
    /// `OPTIONS` operation.
    pub options: Option<Operation>,
    /// `HEAD` operation.
    pub head: Option<Operation>,
    /// `PATCH` operation.
    pub patch: Option<Operation>,
    /// `TRACE` operation.
    pub trace: Option<Operation>,
    /// Path-level parameters shared by all operations.
    pub parameters: Option<Vec<Parameter>>,
}

/// An API operation (endpoint).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Logical name, e.g. `Pets_GetPet`.
    pub operation_id: Option<String>,
    /// Short summary.
    pub summary: Option<String>,
    /// Long description.
    pub description: Option<String>,
    /// Grouping tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Whether the operation is deprecated.
    #[serde(default)]
    pub deprecated: bool,
    /// Operation-level parameters.
    pub parameters: Option<Vec<Parameter>>,
    /// OpenAPI 3.x request body.
    pub request_body: Option<RequestBody>,
    /// Swagger 2.0 request content types.
    pub consumes: Option<Vec<String>>,
    /// Responses keyed by status code, range or `default`.
    #[serde(default)]
    pub responses: IndexMap<String, Response>,
    /// Name of the generated body parameter.
    #[serde(rename = "x-codegen-request-body-name")]
    pub request_body_name: Option<String>,
}

/// A parameter (path, query, header, cookie; Swagger 2.0 also body and formData).
#[derive(Debug, Clone, Deserialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// `path`, `query`, `header`, `cookie`, `body` or `formData`.
    #[serde(rename = "in")]
    pub location: String,
    /// Whether the parameter must be supplied.
    #[serde(default)]
    pub required: bool,
    /// Parameter description.
    pub description: Option<String>,
    /// Parameter schema.
    pub schema: Option<Schema>,

    // Swagger 2.0 non-body parameters carry their type inline
    /// Inline type.
    #[serde(rename = "type")]
    pub param_type: Option<String>,
    /// Inline format.
    pub format: Option<String>,
    /// Inline array item schema.
    pub items: Option<Box<Schema>>,
    /// Inline enum values.
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<EnumValue>>,
}

/// A request body definition.
#[derive(Debug, Default, Deserialize)]
pub struct RequestBody {
    /// Whether a body must be sent.
    #[serde(default)]
    pub required: bool,
    /// Body description.
    pub description: Option<String>,
    /// Body schema per media type.
    pub content: Option<IndexMap<String, MediaType>>,
}

/// A response definition.
#[derive(Debug, Default, Deserialize)]
pub struct Response {
    /// Response description.
    pub description: Option<String>,
    /// Response body per media type (OpenAPI 3.x).
    pub content: Option<IndexMap<String, MediaType>>,
    /// Swagger 2.0 response schema.
    pub schema: Option<Schema>,
}

/// Media type content (e.g., application/json).
#[derive(Debug, Default, Deserialize)]
pub struct MediaType {
    /// Schema of the content.
    pub schema: Option<Schema>,
}

/// JSON Schema definition used in OpenAPI.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// The type of the schema (string, number, integer, boolean, object, array).
    #[serde(rename = "type")]
    pub schema_type: Option<SchemaType>,

    /// Reference to another schema.
    #[serde(rename = "$ref")]
    pub ref_path: Option<String>,

    /// Schema description.
    pub description: Option<String>,

    /// Properties for object types.
    pub properties: Option<IndexMap<String, Schema>>,

    /// Required property names for object types.
    pub required: Option<Vec<String>>,

    /// Item schema for array types.
    pub items: Option<Box<Schema>>,

    /// Enum values (can be strings, integers, floats, booleans, or null).
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<EnumValue>>,

    /// Union type (any of these schemas).
    #[serde(rename = "anyOf")]
    pub any_of: Option<Vec<Schema>>,

    /// Union type (exactly one of these schemas).
    #[serde(rename = "oneOf")]
    pub one_of: Option<Vec<Schema>>,

    /// Intersection type (all of these schemas combined).
    #[serde(rename = "allOf")]
    pub all_of: Option<Vec<Schema>>,

    /// Additional properties for object types (for Record/dict types).
    pub additional_properties: Option<AdditionalProperties>,

    /// Discriminator for polymorphic schemas.
    pub discriminator: Option<Discriminator>,

    /// Format hint (e.g., date-time, binary).
    pub format: Option<String>,

    /// OpenAPI 3.0 nullable flag (3.1 uses type arrays instead).
    pub nullable: Option<bool>,

    /// Member names for `enum` values, index-aligned.
    #[serde(rename = "x-enum-varnames")]
    pub enum_var_names: Option<Vec<String>>,

    /// Declares this component as a generic declaration over the named parameters.
    #[serde(rename = "x-generic-parameters")]
    pub generic_parameters: Option<Vec<String>>,

    /// Marks this node as a use of a generic parameter.
    #[serde(rename = "x-generic-parameter")]
    pub generic_parameter: Option<String>,

    /// Constraint of a generic parameter use.
    #[serde(rename = "x-generic-bound")]
    pub generic_bound: Option<Box<Schema>>,

    /// Arguments of a generic instantiation alongside `$ref`.
    #[serde(rename = "x-generic-arguments")]
    pub generic_arguments: Option<Vec<Schema>>,
}

/// Enum value can be string, integer, float, boolean, or null.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EnumValue {
    /// String value
    String(String),
    /// Integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// Boolean value
    Bool(bool),
    /// `null`
    Null,
}

/// Discriminator for polymorphic schemas.
///
/// Swagger 2.0 writes the discriminator as a bare property name.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Discriminator {
    /// OpenAPI 3.x form
    Object {
        /// Property carrying the discriminator value.
        #[serde(rename = "propertyName")]
        property_name: String,
        /// Optional mapping from discriminator values to schema refs.
        mapping: Option<IndexMap<String, String>>,
    },
    /// Swagger 2.0 form
    PropertyName(String),
}

impl Discriminator {
    /// Name of the discriminating property.
    pub fn property_name(&self) -> &str {
        match self {
            Discriminator::Object { property_name, .. } | Discriminator::PropertyName(property_name) => {
                property_name
            }
        }
    }

    /// Explicit value → schema ref pairs.
    pub fn mapping(&self) -> impl Iterator<Item = (&String, &String)> {
        let mapping = match self {
            Discriminator::Object { mapping, .. } => mapping.as_ref(),
            Discriminator::PropertyName(_) => None,
        };
        mapping.into_iter().flat_map(IndexMap::iter)
    }
}

/// Schema type can be a single type or an array of types (for nullable).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    /// `"type": "string"`
    Single(String),
    /// `"type": ["string", "null"]`
    Multiple(Vec<String>),
}

/// Additional properties can be a boolean or a schema.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    /// `true` or `false`
    Bool(bool),
    /// Value schema
    Schema(Box<Schema>),
}

impl OpenApiSpec {
    /// Parse a document from JSON.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a document from YAML.
    pub fn from_yaml(yaml: &str) -> crate::Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse JSON when the first non-whitespace character is `{`, YAML otherwise.
    pub fn parse(text: &str) -> crate::Result<Self> {
        if text.trim_start().starts_with('{') {
            Self::from_json(text)
        } else {
            Self::from_yaml(text)
        }
    }
}

impl Schema {
    fn is_null_type(&self) -> bool {
        matches!(&self.schema_type, Some(SchemaType::Single(t)) if t == "null")
    }

    /// Check if this schema is nullable (null member in anyOf/oneOf, type array, or nullable flag).
    pub fn is_nullable(&self) -> bool {
        // OpenAPI 3.0 nullable flag
        if self.nullable == Some(true) {
            return true;
        }

        let variants = self.any_of.iter().chain(self.one_of.iter()).flatten();
        if variants.into_iter().any(Schema::is_null_type) {
            return true;
        }

        matches!(&self.schema_type, Some(SchemaType::Multiple(types)) if types.iter().any(|t| t == "null"))
    }

    /// The single declared type other than `null`, if any.
    pub fn primary_type(&self) -> Option<&str> {
        match &self.schema_type {
            Some(SchemaType::Single(t)) => Some(t),
            Some(SchemaType::Multiple(types)) => {
                types.iter().map(String::as_str).find(|t| *t != "null")
            }
            None => None,
        }
    }

    /// Members of `anyOf`/`oneOf` that are not the `null` type.
    pub fn non_null_variants(&self) -> Vec<&Schema> {
        self.any_of
            .iter()
            .chain(self.one_of.iter())
            .flatten()
            .filter(|s| !s.is_null_type())
            .collect()
    }
}
