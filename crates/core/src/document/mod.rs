//! The in-memory API description consumed by the emitter.

mod builder;
mod operation;
mod schema;

pub use builder::DocumentBuilder;
pub use operation::{
    HttpMethod, Operation, ParamLocation, Parameter, Response, ResponseTable, StatusKey,
};
pub use schema::{
    Discriminator, EnumSchema, EnumValue, ObjectSchema, Primitive, Property, SchemaEntry,
    SchemaId, SchemaKind, SchemaNode, SchemaRegistry,
};

use crate::error::Warning;

/// A fully linked API description: every schema reference resolves, base chains are
/// acyclic and generic arities match.
#[derive(Debug)]
pub struct Document {
    pub(crate) title: Option<String>,
    pub(crate) schemas: SchemaRegistry,
    pub(crate) operations: Vec<Operation>,
    /// Non-fatal conditions met while importing the description.
    pub(crate) warnings: Vec<Warning>,
}

impl Document {
    /// Start a declarative registration.
    pub fn builder() -> DocumentBuilder {
        DocumentBuilder::new()
    }

    /// API title, if one was given.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Every registered schema, in registration order.
    pub fn schemas(&self) -> &SchemaRegistry {
        &self.schemas
    }

    /// Every registered operation, in registration order.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Non-fatal conditions met while building the document.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Look up a registered schema by key.
    pub fn schema(&self, key: &str) -> Option<&SchemaNode> {
        self.schemas
            .lookup(key)
            .map(|id| &self.schemas.get(id).node)
    }
}
