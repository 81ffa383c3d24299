//! Import of an OpenAPI 3.x / Swagger 2.0 document into a [`Document`].
//!
//! Handles all the OpenAPI-specific logic:
//! - Schema conversion (`allOf` bases, nullable unions, generic extensions)
//! - Parameter merging (path-level parameters overridden per operation)
//! - Request bodies (form properties become form-bound parameters)
//! - Response tables and binary media types

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::{debug, warn};

use super::spec::{
    AdditionalProperties, EnumValue, MediaType, OpenApiSpec, Operation, Parameter, PathItem,
    Response, Schema, SchemaType,
};
use crate::document::{
    self, Document, DocumentBuilder, EnumSchema, HttpMethod, ObjectSchema, ParamLocation,
    SchemaKind, SchemaNode, StatusKey,
};
use crate::error::{Result, Warning};
use crate::utils::sanitize_ts_identifier;

const URLENCODED: &str = "application/x-www-form-urlencoded";
const MULTIPART: &str = "multipart/form-data";

/// Convert a parsed OpenAPI document into a linked [`Document`].
pub fn import(spec: &OpenApiSpec) -> Result<Document> {
    let mut importer = Importer::new(spec);

    for (key, schema) in &importer.schemas {
        let node = importer.component_node(schema);
        importer.builder.add_schema(*key, node);
    }

    for (path, item) in &spec.paths {
        for method in HttpMethod::ALL {
            if let Some(op) = path_operation(item, method) {
                let operation = importer.operation(path, method, op, item.parameters.as_deref());
                importer.builder.add_operation(operation);
            }
        }
    }

    debug!(
        schemas = importer.schemas.len(),
        paths = spec.paths.len(),
        "Imported OpenAPI document"
    );
    let mut builder = importer.builder;
    builder.set_title(spec.info.as_ref().and_then(|info| info.title.clone()));
    builder.build()
}

fn path_operation(item: &PathItem, method: HttpMethod) -> Option<&Operation> {
    match method {
        HttpMethod::Get => item.get.as_ref(),
        HttpMethod::Put => item.put.as_ref(),
        HttpMethod::Post => item.post.as_ref(),
        HttpMethod::Delete => item.delete.as_ref(),
        HttpMethod::Options => item.options.as_ref(),
        HttpMethod::Head => item.head.as_ref(),
        HttpMethod::Patch => item.patch.as_ref(),
        HttpMethod::Trace => item.trace.as_ref(),
    }
}

/// Extract the schema key from a `$ref` path
fn ref_to_key(ref_path: &str) -> &str {
    ref_path
        .strip_prefix("#/components/schemas/")
        .or_else(|| ref_path.strip_prefix("#/definitions/"))
        .unwrap_or(ref_path)
}

/// Media type without parameters, lowercased.
fn essence(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn is_json_media_type(media_type: &str) -> bool {
    let media_type = essence(media_type);
    matches!(media_type.as_str(), "application/json" | "text/json" | "*/*")
        || media_type.ends_with("+json")
}

fn is_binary_media_type(media_type: &str) -> bool {
    let media_type = essence(media_type);
    media_type == "application/octet-stream"
        || media_type.starts_with("image/")
        || media_type.starts_with("audio/")
        || media_type.starts_with("video/")
        || media_type == "application/pdf"
}

/// The schema carried by a content map: a JSON-compatible media type first, then the
/// first media type with a schema.
fn content_schema(content: &IndexMap<String, MediaType>) -> Option<(&str, &Schema)> {
    fn with_schema<'c>(
        (media_type, media): (&'c String, &'c MediaType),
    ) -> Option<(&'c str, &'c Schema)> {
        media.schema.as_ref().map(|schema| (media_type.as_str(), schema))
    }
    content
        .iter()
        .filter(|(media_type, _)| is_json_media_type(media_type))
        .find_map(with_schema)
        .or_else(|| content.iter().find_map(with_schema))
}

fn enum_value(value: &EnumValue) -> Option<document::EnumValue> {
    match value {
        EnumValue::String(s) => Some(document::EnumValue::String(s.clone())),
        EnumValue::Integer(i) => Some(document::EnumValue::Integer(*i)),
        EnumValue::Float(f) => Some(document::EnumValue::Float(*f)),
        EnumValue::Bool(b) => Some(document::EnumValue::Bool(*b)),
        EnumValue::Null => None,
    }
}

/// Derive an operation name from the method and the static path segments.
fn derived_operation_name(path: &str, method: HttpMethod) -> String {
    let segments: Vec<_> = path
        .split('/')
        .filter(|s| !s.is_empty() && !s.starts_with('{'))
        .collect();
    sanitize_ts_identifier(&format!("{} {}", method.as_str(), segments.join(" ")))
}

fn param_location(raw: &str) -> Option<ParamLocation> {
    match raw {
        "path" => Some(ParamLocation::Path),
        "query" => Some(ParamLocation::Query),
        "header" => Some(ParamLocation::Header),
        "body" => Some(ParamLocation::Body),
        "formData" => Some(ParamLocation::Form),
        _ => None,
    }
}

struct Importer<'a> {
    spec: &'a OpenApiSpec,
    /// Component schemas and Swagger 2.0 definitions, in document order.
    schemas: IndexMap<&'a str, &'a Schema>,
    builder: DocumentBuilder,
}

impl<'a> Importer<'a> {
    fn new(spec: &'a OpenApiSpec) -> Self {
        let components = spec
            .components
            .as_ref()
            .and_then(|components| components.schemas.as_ref());
        let schemas = components
            .into_iter()
            .chain(spec.definitions.as_ref())
            .flatten()
            .map(|(key, schema)| (key.as_str(), schema))
            .collect();
        Self {
            spec,
            schemas,
            builder: DocumentBuilder::new(),
        }
    }

    fn warn(&mut self, operation: &str, message: String) {
        warn!(operation, "{}", message);
        self.builder.warn(Warning::new(Some(operation), message));
    }

    // ------------------------------------------------------------------
    // Schemas
    // ------------------------------------------------------------------

    /// Convert a registered component. Objects stay objects even when empty or
    /// composed of a single `allOf` reference.
    fn component_node(&self, schema: &Schema) -> SchemaNode {
        let is_object_like = schema.all_of.is_some()
            || schema.properties.is_some()
            || schema.generic_parameters.is_some()
            || schema.discriminator.is_some()
            || (schema.primary_type() == Some("object")
                && !matches!(
                    schema.additional_properties,
                    Some(AdditionalProperties::Schema(_) | AdditionalProperties::Bool(true))
                ));
        if is_object_like && schema.ref_path.is_none() && schema.enum_values.is_none() {
            let mut node: SchemaNode = self.object_schema(schema).into();
            node.nullable = schema.is_nullable();
            node.description = schema.description.clone();
            return node;
        }
        self.schema_node(schema)
    }

    fn schema_node(&self, schema: &Schema) -> SchemaNode {
        let mut node = self.schema_kind(schema);
        node.nullable |= schema.is_nullable();
        if schema.description.is_some() {
            node.description = schema.description.clone();
        }
        node
    }

    fn schema_kind(&self, schema: &Schema) -> SchemaNode {
        if let Some(name) = &schema.generic_parameter {
            return match schema.generic_bound.as_deref() {
                Some(bound) => SchemaNode::bounded_generic_param(name, self.schema_node(bound)),
                None => SchemaNode::generic_param(name),
            };
        }

        if let Some(ref_path) = &schema.ref_path {
            let args = schema
                .generic_arguments
                .iter()
                .flatten()
                .map(|arg| self.schema_node(arg));
            return SchemaNode::generic(ref_to_key(ref_path), args);
        }

        if let Some(all_of) = &schema.all_of {
            // `allOf: [{$ref}]` with nothing else is the usual way to annotate a reference
            if let [only] = all_of.as_slice()
                && schema.properties.is_none()
            {
                return self.schema_node(only);
            }
            return self.object_schema(schema).into();
        }

        if schema.any_of.is_some() || schema.one_of.is_some() {
            let variants = schema.non_null_variants();
            return match variants.as_slice() {
                [] => SchemaNode::any(),
                [only] => self.schema_node(only),
                _ => SchemaNode::union(variants.iter().map(|v| self.schema_node(v))),
            };
        }

        if let Some(values) = &schema.enum_values {
            return SchemaNode::new(SchemaKind::Enum(EnumSchema {
                values: values.iter().filter_map(enum_value).collect(),
                names: schema.enum_var_names.clone().unwrap_or_default(),
            }));
        }

        match schema.primary_type() {
            Some("string") => match schema.format.as_deref() {
                Some("date") => SchemaNode::date(),
                Some("date-time") => SchemaNode::date_time(),
                Some("binary") => SchemaNode::binary(),
                _ => SchemaNode::string(),
            },
            Some("file") => SchemaNode::binary(),
            Some("integer") => SchemaNode::integer(),
            Some("number") => SchemaNode::number(),
            Some("boolean") => SchemaNode::boolean(),
            Some("array") => SchemaNode::array(
                schema
                    .items
                    .as_deref()
                    .map_or_else(SchemaNode::any, |items| self.schema_node(items)),
            ),
            Some("object") | None => self.object_node(schema),
            Some(_) => SchemaNode::any(),
        }
    }

    /// Inline object: a dictionary when it only has `additionalProperties`, `any` when
    /// it has nothing at all.
    fn object_node(&self, schema: &Schema) -> SchemaNode {
        let has_properties = schema.properties.as_ref().is_some_and(|p| !p.is_empty());
        if !has_properties && schema.discriminator.is_none() {
            return match &schema.additional_properties {
                Some(AdditionalProperties::Schema(value)) => {
                    SchemaNode::map(self.schema_node(value))
                }
                Some(AdditionalProperties::Bool(true)) => SchemaNode::map(SchemaNode::any()),
                _ => SchemaNode::any(),
            };
        }
        self.object_schema(schema).into()
    }

    fn object_schema(&self, schema: &Schema) -> ObjectSchema {
        let mut object = ObjectSchema::new();
        if let Some(params) = &schema.generic_parameters {
            object = object.generic_params(params.iter().cloned());
        }

        let mut base = None;
        for member in schema.all_of.iter().flatten() {
            if member.ref_path.is_some() && base.is_none() {
                base = Some(self.schema_node(member));
            } else {
                let mut visited = HashSet::new();
                self.merge_members(&mut object, member, &mut visited);
            }
        }
        if let Some(base) = base {
            object = object.extends(base);
        }
        self.merge_own(&mut object, schema);
        object
    }

    /// Merge an `allOf` member into `object`, following extra references.
    fn merge_members<'s>(
        &'s self,
        object: &mut ObjectSchema,
        member: &'s Schema,
        visited: &mut HashSet<&'s str>,
    ) {
        if let Some(ref_path) = &member.ref_path {
            let key = ref_to_key(ref_path);
            if !visited.insert(key) {
                return;
            }
            if let Some(target) = self.schemas.get(key).copied() {
                for nested in target.all_of.iter().flatten() {
                    self.merge_members(object, nested, visited);
                }
                self.merge_own(object, target);
            }
            return;
        }
        for nested in member.all_of.iter().flatten() {
            self.merge_members(object, nested, visited);
        }
        self.merge_own(object, member);
    }

    /// Properties, index signature and discriminator declared directly on `schema`.
    fn merge_own(&self, object: &mut ObjectSchema, schema: &Schema) {
        let required = schema.required.as_deref().unwrap_or_default();
        for (name, property) in schema.properties.iter().flatten() {
            if object.properties.iter().any(|p| &p.name == name) {
                continue;
            }
            object.properties.push(document::Property {
                name: name.clone(),
                schema: self.schema_node(property),
                required: required.contains(name),
            });
        }
        match &schema.additional_properties {
            Some(AdditionalProperties::Schema(value)) => {
                object.additional_properties = Some(Box::new(self.schema_node(value)));
            }
            Some(AdditionalProperties::Bool(true)) => {
                object.additional_properties = Some(Box::new(SchemaNode::any()));
            }
            Some(AdditionalProperties::Bool(false)) | None => {}
        }
        if let Some(discriminator) = &schema.discriminator {
            object.discriminator = Some(document::Discriminator {
                property_name: discriminator.property_name().to_string(),
                mapping: discriminator
                    .mapping()
                    .map(|(value, target)| (value.clone(), ref_to_key(target).to_string()))
                    .collect(),
            });
        }
    }

    /// Properties of a form body schema, following `$ref` and `allOf`.
    fn form_properties(&self, schema: &Schema) -> ObjectSchema {
        let mut object = ObjectSchema::new();
        let mut visited = HashSet::new();
        self.merge_members(&mut object, schema, &mut visited);
        object
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    fn operation(
        &mut self,
        path: &str,
        method: HttpMethod,
        op: &Operation,
        path_params: Option<&[Parameter]>,
    ) -> document::Operation {
        let name = op
            .operation_id
            .clone()
            .unwrap_or_else(|| derived_operation_name(path, method));

        let mut operation = document::Operation::new(name.clone(), method, path);
        operation.tags = op.tags.clone();
        operation.summary = op.summary.clone();
        operation.description = op.description.clone();
        operation.deprecated = op.deprecated;

        // Operation-level parameters override path-level ones of the same name
        let mut params: Vec<&Parameter> = Vec::new();
        for param in path_params.into_iter().flatten().chain(op.parameters.iter().flatten()) {
            params.retain(|p| p.name != param.name);
            params.push(param);
        }
        for param in params {
            if let Some(parameter) = self.parameter(&name, param) {
                operation.parameters.push(parameter);
            }
        }

        if let Some(consumes) = op.consumes.as_ref().or(self.spec.consumes.as_ref()) {
            operation.content_types.extend(consumes.iter().cloned());
        }
        self.request_body(&mut operation, op);

        for (raw, response) in &op.responses {
            let Some(status) = StatusKey::parse(raw) else {
                self.warn(&name, format!("skipping response with unrecognised status key '{raw}'"));
                continue;
            };
            operation.responses.insert(
                status,
                document::Response {
                    schema: self.response_schema(response),
                    description: response.description.clone(),
                },
            );
        }
        operation
    }

    fn parameter(&mut self, operation: &str, param: &Parameter) -> Option<document::Parameter> {
        if param.location == "cookie" {
            return None;
        }
        let Some(location) = param_location(&param.location) else {
            self.warn(
                operation,
                format!(
                    "skipping parameter '{}' with unknown location '{}'",
                    param.name, param.location
                ),
            );
            return None;
        };

        let schema = match &param.schema {
            Some(schema) => self.schema_node(schema),
            None => {
                let inline = Schema {
                    schema_type: param.param_type.clone().map(SchemaType::Single),
                    format: param.format.clone(),
                    items: param.items.clone(),
                    enum_values: param.enum_values.clone(),
                    ..Schema::default()
                };
                if inline.schema_type.is_none() {
                    SchemaNode::string()
                } else {
                    self.schema_node(&inline)
                }
            }
        };

        let mut parameter = document::Parameter::new(
            &param.name,
            location,
            schema,
            param.required || location == ParamLocation::Path,
        );
        parameter.description = param.description.clone();
        Some(parameter)
    }

    /// OpenAPI 3 request body: form content becomes form-bound parameters, anything
    /// else a single body parameter.
    fn request_body(&self, operation: &mut document::Operation, op: &Operation) {
        let Some(body) = &op.request_body else {
            return;
        };
        let content = body.content.as_ref();
        operation
            .content_types
            .extend(content.into_iter().flat_map(IndexMap::keys).cloned());

        let form = content.and_then(|content| {
            content
                .iter()
                .find(|(media_type, _)| matches!(essence(media_type).as_str(), MULTIPART | URLENCODED))
        });
        if let Some((_, media)) = form {
            let object = media
                .schema
                .as_ref()
                .map(|schema| self.form_properties(schema))
                .unwrap_or_default();
            for property in object.properties {
                operation.parameters.push(document::Parameter::form(
                    property.name,
                    property.schema,
                    property.required,
                ));
            }
            return;
        }

        let schema = match content.and_then(content_schema) {
            Some((_, schema)) => self.schema_node(schema),
            None if content.is_some_and(|c| c.keys().any(|m| is_binary_media_type(m))) => {
                SchemaNode::binary()
            }
            None => SchemaNode::any(),
        };
        let name = op.request_body_name.as_deref().unwrap_or("body");
        let mut parameter = document::Parameter::body(name, schema, body.required);
        parameter.description = body.description.clone();
        operation.parameters.push(parameter);
    }

    fn response_schema(&self, response: &Response) -> Option<SchemaNode> {
        if let Some(schema) = &response.schema {
            return Some(self.schema_node(schema));
        }
        let content = response.content.as_ref()?;
        match content_schema(content) {
            Some((media_type, schema)) if is_binary_media_type(media_type) => {
                let node = self.schema_node(schema);
                Some(if matches!(node.kind, SchemaKind::Primitive(_)) {
                    SchemaNode::binary()
                } else {
                    node
                })
            }
            Some((_, schema)) => Some(self.schema_node(schema)),
            None if content.keys().any(|m| is_binary_media_type(m)) => Some(SchemaNode::binary()),
            None => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::document::{Primitive, SchemaKind};
    use crate::error::Error;

    fn import_json(json: &str) -> Result<Document> {
        import(&OpenApiSpec::from_json(json)?)
    }

    #[test]
    fn test_derived_operation_name() {
        assert_eq!(derived_operation_name("/pets/{id}/toys", HttpMethod::Get), "getPetsToys");
        assert_eq!(derived_operation_name("/", HttpMethod::Post), "post");
    }

    #[test]
    fn test_components_in_document_order() {
        let doc = import_json(
            r##"{
  "openapi": "3.0.1",
  "info": { "title": "Zoo" },
  "paths": {},
  "components": { "schemas": {
    "Zebra": { "type": "object", "properties": { "stripes": { "type": "integer" } } },
    "Animal": { "type": "object" },
    "Tags": { "type": "object", "additionalProperties": { "type": "string" } }
  } }
}"##,
        )
        .unwrap();
        let keys: Vec<_> = doc.schemas().iter().map(|(_, e)| e.key.clone()).collect();
        assert_eq!(keys, vec!["Zebra", "Animal", "Tags"]);
        assert_eq!(doc.title(), Some("Zoo"));
        assert!(doc.schema("Animal").unwrap().as_object().is_some());
        assert!(matches!(doc.schema("Tags").unwrap().kind, SchemaKind::Map(_)));
    }

    #[test]
    fn test_all_of_base_and_flattening() {
        let doc = import_json(
            r##"{
  "openapi": "3.0.1",
  "paths": {},
  "components": { "schemas": {
    "Pet": { "type": "object", "discriminator": { "propertyName": "kind" },
             "properties": { "kind": { "type": "string" } }, "required": ["kind"] },
    "Named": { "type": "object", "properties": { "name": { "type": "string" } } },
    "Dog": { "allOf": [
      { "$ref": "#/components/schemas/Pet" },
      { "$ref": "#/components/schemas/Named" },
      { "type": "object", "properties": { "bark": { "type": "boolean" } }, "required": ["bark"] }
    ] }
  } }
}"##,
        )
        .unwrap();
        let dog = doc.schema("Dog").unwrap().as_object().unwrap();
        assert_eq!(dog.base.as_deref().unwrap().reference_key(), Some("Pet"));
        let props: Vec<_> = dog.properties.iter().map(|p| (p.name.as_str(), p.required)).collect();
        assert_eq!(props, vec![("name", false), ("bark", true)]);
        let pet = doc.schema("Pet").unwrap().as_object().unwrap();
        assert_eq!(pet.discriminator.as_ref().unwrap().property_name, "kind");
    }

    #[test]
    fn test_nullable_and_unions() {
        let doc = import_json(
            r##"{
  "openapi": "3.1.0",
  "paths": {},
  "components": { "schemas": {
    "A": { "type": "object" },
    "B": { "type": "object" },
    "Holder": { "type": "object", "properties": {
      "maybe": { "anyOf": [{ "$ref": "#/components/schemas/A" }, { "type": "null" }] },
      "either": { "oneOf": [{ "$ref": "#/components/schemas/A" }, { "$ref": "#/components/schemas/B" }] },
      "when": { "type": ["string", "null"], "format": "date-time" }
    } }
  } }
}"##,
        )
        .unwrap();
        let holder = doc.schema("Holder").unwrap().as_object().unwrap();
        let maybe = &holder.properties[0].schema;
        assert!(maybe.nullable);
        assert_eq!(maybe.reference_key(), Some("A"));
        assert!(matches!(&holder.properties[1].schema.kind, SchemaKind::Union(v) if v.len() == 2));
        let when = &holder.properties[2].schema;
        assert!(when.nullable);
        assert_eq!(when.kind, SchemaKind::Primitive(Primitive::DateTime));
    }

    #[test]
    fn test_enum_var_names() {
        let doc = import_json(
            r##"{
  "openapi": "3.0.1",
  "paths": {},
  "components": { "schemas": {
    "Level": { "type": "integer", "enum": [1, 2], "x-enum-varnames": ["Low", "High"] }
  } }
}"##,
        )
        .unwrap();
        let SchemaKind::Enum(level) = &doc.schema("Level").unwrap().kind else {
            unreachable!("Level is an enum");
        };
        assert_eq!(level.names, vec!["Low", "High"]);
        assert_eq!(level.values[1], document::EnumValue::Integer(2));
    }

    #[test]
    fn test_generic_extensions() {
        let doc = import_json(
            r##"{
  "openapi": "3.0.1",
  "paths": {},
  "components": { "schemas": {
    "Base": { "type": "object" },
    "Envelope": { "type": "object", "x-generic-parameters": ["T"], "properties": {
      "payload": { "x-generic-parameter": "T", "x-generic-bound": { "$ref": "#/components/schemas/Base" } }
    } },
    "User": { "type": "object", "properties": {
      "wrapped": { "$ref": "#/components/schemas/Envelope", "x-generic-arguments": [{ "$ref": "#/components/schemas/Base" }] }
    } }
  } }
}"##,
        )
        .unwrap();
        let envelope = doc.schema("Envelope").unwrap().as_object().unwrap();
        assert_eq!(envelope.generic_params, vec!["T"]);
        assert!(matches!(
            &envelope.properties[0].schema.kind,
            SchemaKind::GenericParam { name, bound: Some(_) } if name == "T"
        ));
        let user = doc.schema("User").unwrap().as_object().unwrap();
        assert!(matches!(
            &user.properties[0].schema.kind,
            SchemaKind::Reference { key, args } if key == "Envelope" && args.len() == 1
        ));
    }

    #[test]
    fn test_operation_parameters_and_body() {
        let doc = import_json(
            r##"{
  "openapi": "3.0.1",
  "paths": {
    "/pets/{id}": {
      "parameters": [
        { "name": "id", "in": "path", "schema": { "type": "string" } },
        { "name": "trace", "in": "header", "schema": { "type": "string" } }
      ],
      "put": {
        "operationId": "Pets_Update",
        "tags": ["Pets"],
        "parameters": [
          { "name": "id", "in": "path", "required": true, "schema": { "type": "integer" } },
          { "name": "session", "in": "cookie", "schema": { "type": "string" } }
        ],
        "requestBody": { "required": true, "x-ignored": 1,
          "content": { "application/json": { "schema": { "type": "object", "properties": { "name": { "type": "string" } } } } } },
        "x-codegen-request-body-name": "pet",
        "responses": { "204": { "description": "Updated" } }
      },
      "get": {
        "responses": {
          "200": { "description": "OK", "content": { "application/octet-stream": {} } },
          "bogus": { "description": "?" }
        }
      }
    }
  }
}"##,
        )
        .unwrap();
        let ops = doc.operations();
        assert_eq!(ops[0].name, "getPets");
        assert_eq!(ops[1].name, "Pets_Update");

        let put = &ops[1];
        let params: Vec<_> = put.parameters.iter().map(|p| (p.name.as_str(), p.location)).collect();
        assert_eq!(
            params,
            vec![
                ("trace", ParamLocation::Header),
                ("id", ParamLocation::Path),
                ("pet", ParamLocation::Body),
            ]
        );
        assert_eq!(put.parameters[1].schema, SchemaNode::integer());
        assert_eq!(put.content_types, vec!["application/json"]);
        assert!(put.responses[&StatusKey::Code(204)].schema.is_none());

        let get = &ops[0];
        assert!(get.responses[&StatusKey::Code(200)].schema.as_ref().unwrap().is_binary());
        assert_eq!(get.responses.len(), 1);
        assert_eq!(doc.warnings().len(), 1);
        assert_eq!(doc.warnings()[0].operation.as_deref(), Some("getPets"));
    }

    #[test]
    fn test_form_body_becomes_form_params() {
        let doc = import_json(
            r##"{
  "openapi": "3.0.1",
  "paths": { "/upload": { "post": {
    "operationId": "Upload",
    "requestBody": { "content": { "multipart/form-data": { "schema": {
      "type": "object", "required": ["file"],
      "properties": { "file": { "type": "string", "format": "binary" }, "note": { "type": "string" } }
    } } } },
    "responses": {}
  } } }
}"##,
        )
        .unwrap();
        let op = &doc.operations()[0];
        assert_eq!(op.content_types, vec!["multipart/form-data"]);
        assert_eq!(op.parameters.len(), 2);
        assert!(op.parameters.iter().all(|p| p.location == ParamLocation::Form));
        assert!(op.parameters[0].schema.is_binary());
        assert!(op.parameters[0].required);
    }

    #[test]
    fn test_swagger2_document() {
        let doc = import_json(
            r##"{
  "swagger": "2.0",
  "consumes": ["application/x-www-form-urlencoded"],
  "paths": { "/login": { "post": {
    "operationId": "Auth_Login",
    "parameters": [
      { "name": "user", "in": "formData", "required": true, "type": "string" },
      { "name": "tries", "in": "formData", "type": "integer" }
    ],
    "responses": { "200": { "description": "OK", "schema": { "$ref": "#/definitions/Token" } } }
  } } },
  "definitions": { "Token": { "type": "object", "properties": { "value": { "type": "string" } } } }
}"##,
        )
        .unwrap();
        let op = &doc.operations()[0];
        assert_eq!(op.content_types, vec![URLENCODED]);
        assert_eq!(op.parameters[1].schema, SchemaNode::integer());
        assert_eq!(
            op.responses[&StatusKey::Code(200)].schema.as_ref().unwrap().reference_key(),
            Some("Token")
        );
    }

    #[test]
    fn test_unresolved_reference_is_fatal() {
        let err = import_json(
            r##"{
  "openapi": "3.0.1",
  "paths": { "/x": { "get": { "responses": {
    "200": { "description": "OK", "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Nope" } } } }
  } } } }
}"##,
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnresolvedSchema { key } if key == "Nope"));
    }
}
