//! OpenAPI input.
//!
//! Parses OpenAPI 3.x and Swagger 2.0 documents (JSON or YAML) and imports them into
//! a linked [`Document`](crate::document::Document).

mod import;
mod spec;

pub use import::import;
pub use spec::OpenApiSpec;

use crate::document::Document;
use crate::error::Result;

/// Parse and import an API description. JSON when the first non-whitespace character
/// is `{`, YAML otherwise.
pub fn parse_document(text: &str) -> Result<Document> {
    import(&OpenApiSpec::parse(text)?)
}
