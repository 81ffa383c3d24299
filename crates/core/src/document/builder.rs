//! Declarative registration API for building a [`Document`].
//!
//! Phase one registers schemas and operations in any order; [`DocumentBuilder::build`]
//! runs phase two, which checks every reference against the complete registry.

use std::collections::HashSet;

use tracing::debug;

use super::operation::Operation;
use super::schema::{SchemaKind, SchemaNode, SchemaRegistry};
use super::Document;
use crate::error::{Error, Result, Warning};

/// Collects schemas and operations for a single generation run.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    title: Option<String>,
    schemas: SchemaRegistry,
    operations: Vec<Operation>,
    warnings: Vec<Warning>,
}

impl DocumentBuilder {
    /// Empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// API title shown in the generated file banner.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Register a named schema. Forward references to schemas registered later are fine.
    pub fn schema(mut self, key: impl Into<String>, node: impl Into<SchemaNode>) -> Self {
        self.schemas.register(key, node.into());
        self
    }

    /// Register an operation. Operations are emitted in registration order.
    pub fn operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    pub(crate) fn add_schema(&mut self, key: impl Into<String>, node: SchemaNode) {
        self.schemas.register(key, node);
    }

    pub(crate) fn add_operation(&mut self, operation: Operation) {
        self.operations.push(operation);
    }

    pub(crate) fn set_title(&mut self, title: Option<String>) {
        self.title = title;
    }

    pub(crate) fn warn(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }

    /// Link every reference and validate the schema graph.
    pub fn build(self) -> Result<Document> {
        link(&self.schemas, &self.operations)?;
        debug!(
            schemas = self.schemas.len(),
            operations = self.operations.len(),
            "Linked document"
        );
        Ok(Document {
            title: self.title,
            schemas: self.schemas,
            operations: self.operations,
            warnings: self.warnings,
        })
    }
}

/// Phase two: resolve references by key, check generic arity, reject base cycles and
/// duplicate parameters.
fn link(schemas: &SchemaRegistry, operations: &[Operation]) -> Result<()> {
    for (_, entry) in schemas.iter() {
        check_references(schemas, &entry.node)?;
    }

    for op in operations {
        let mut seen = HashSet::new();
        for param in &op.parameters {
            if !seen.insert((param.name.as_str(), param.location)) {
                return Err(Error::DuplicateParameter {
                    operation: op.name.clone(),
                    name: param.name.clone(),
                });
            }
            check_references(schemas, &param.schema)?;
        }
        for response in op.responses.values() {
            if let Some(schema) = &response.schema {
                check_references(schemas, schema)?;
            }
        }
    }

    for (_, entry) in schemas.iter() {
        check_base_chain(schemas, &entry.key)?;
    }
    Ok(())
}

fn check_references(schemas: &SchemaRegistry, node: &SchemaNode) -> Result<()> {
    let mut failure = None;
    node.walk(&mut |n| {
        if failure.is_some() {
            return;
        }
        if let SchemaKind::Reference { key, args } = &n.kind {
            failure = check_reference(schemas, key, args.len()).err();
        }
    });
    failure.map_or(Ok(()), Err)
}

fn check_reference(schemas: &SchemaRegistry, key: &str, found: usize) -> Result<()> {
    let Some(id) = schemas.lookup(key) else {
        return Err(Error::UnresolvedSchema {
            key: key.to_string(),
        });
    };
    let expected = schemas
        .get(id)
        .node
        .as_object()
        .map_or(0, |object| object.generic_params.len());
    if expected != found {
        return Err(Error::GenericArity {
            key: key.to_string(),
            expected,
            found,
        });
    }
    Ok(())
}

fn check_base_chain(schemas: &SchemaRegistry, start: &str) -> Result<()> {
    let mut visited = HashSet::new();
    let mut current = start.to_string();
    loop {
        if !visited.insert(current.clone()) {
            return Err(Error::InheritanceCycle { key: current });
        }
        let next = schemas
            .lookup(&current)
            .and_then(|id| schemas.get(id).node.as_object())
            .and_then(|object| object.base.as_deref())
            .and_then(|base| base.reference_key());
        match next {
            Some(key) => current = key.to_string(),
            None => return Ok(()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::document::{HttpMethod, Parameter};

    #[test]
    fn test_forward_reference_links() {
        let doc = DocumentBuilder::new()
            .schema(
                "Order",
                SchemaNode::object().property("customer", SchemaNode::reference("Customer"), true),
            )
            .schema("Customer", SchemaNode::object().property("name", SchemaNode::string(), true))
            .build()
            .unwrap();
        assert_eq!(doc.schemas().len(), 2);
    }

    #[test]
    fn test_mutual_recursion_is_allowed() {
        let doc = DocumentBuilder::new()
            .schema("A", SchemaNode::object().property("b", SchemaNode::reference("B"), false))
            .schema("B", SchemaNode::object().property("a", SchemaNode::reference("A"), false))
            .build();
        assert!(doc.is_ok());
    }

    #[test]
    fn test_unresolved_reference_in_operation() {
        let err = DocumentBuilder::new()
            .operation(
                Operation::new("Get", HttpMethod::Get, "/")
                    .response(200, Some(SchemaNode::reference("Missing"))),
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::UnresolvedSchema { key } if key == "Missing"));
    }

    #[test]
    fn test_generic_arity_mismatch() {
        let err = DocumentBuilder::new()
            .schema(
                "Page",
                SchemaNode::object()
                    .generic_params(["T"])
                    .property("items", SchemaNode::array(SchemaNode::generic_param("T")), true),
            )
            .schema("Bad", SchemaNode::object().extends(SchemaNode::reference("Page")))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            Error::GenericArity { expected: 1, found: 0, .. }
        ));
    }

    #[test]
    fn test_inheritance_cycle() {
        let err = DocumentBuilder::new()
            .schema("A", SchemaNode::object().extends(SchemaNode::reference("B")))
            .schema("B", SchemaNode::object().extends(SchemaNode::reference("A")))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InheritanceCycle { .. }));
    }

    #[test]
    fn test_duplicate_parameter() {
        let err = DocumentBuilder::new()
            .operation(
                Operation::new("Find", HttpMethod::Get, "/")
                    .param(Parameter::query("q", SchemaNode::string(), false))
                    .param(Parameter::query("q", SchemaNode::string(), true)),
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateParameter { name, .. } if name == "q"));
    }
}
