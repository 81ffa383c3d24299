//! Operation Model: one API endpoint (method + route + parameters + responses).

use std::collections::BTreeMap;
use std::fmt;

use super::schema::SchemaNode;

/// HTTP verb of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `PUT`
    Put,
    /// `POST`
    Post,
    /// `DELETE`
    Delete,
    /// `OPTIONS`
    Options,
    /// `HEAD`
    Head,
    /// `PATCH`
    Patch,
    /// `TRACE`
    Trace,
}

impl HttpMethod {
    /// Every method, in the order path items are scanned.
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Patch,
        HttpMethod::Trace,
    ];

    /// Lowercase verb as passed to `HttpClient.request`.
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Patch => "patch",
            HttpMethod::Trace => "trace",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

/// Where a parameter is bound in the HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamLocation {
    /// Substituted into the route template
    Path,
    /// Appended to the query string
    Query,
    /// Sent as a request header
    Header,
    /// The whole request body
    Body,
    /// One field of a form-encoded (urlencoded or multipart) body
    Form,
}

impl ParamLocation {
    /// Position group in the generated method signature.
    pub(crate) fn signature_rank(self) -> u8 {
        match self {
            ParamLocation::Path => 0,
            ParamLocation::Query | ParamLocation::Header => 1,
            ParamLocation::Body | ParamLocation::Form => 2,
        }
    }

    /// Whether the parameter is part of the request body.
    pub fn is_body_bound(self) -> bool {
        matches!(self, ParamLocation::Body | ParamLocation::Form)
    }
}

/// A single operation parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Name as declared; also the key used on the wire.
    pub name: String,
    /// Where the value is bound.
    pub location: ParamLocation,
    /// Value type.
    pub schema: SchemaNode,
    /// Required parameters are validated before the request is sent.
    pub required: bool,
    /// Description copied into the method's doc comment.
    pub description: Option<String>,
}

impl Parameter {
    /// Parameter bound at `location`.
    pub fn new(
        name: impl Into<String>,
        location: ParamLocation,
        schema: SchemaNode,
        required: bool,
    ) -> Self {
        Self {
            name: name.into(),
            location,
            schema,
            required,
            description: None,
        }
    }

    /// Path parameters are always required.
    pub fn path(name: impl Into<String>, schema: SchemaNode) -> Self {
        Self::new(name, ParamLocation::Path, schema, true)
    }

    /// Query string parameter.
    pub fn query(name: impl Into<String>, schema: SchemaNode, required: bool) -> Self {
        Self::new(name, ParamLocation::Query, schema, required)
    }

    /// Header parameter.
    pub fn header(name: impl Into<String>, schema: SchemaNode, required: bool) -> Self {
        Self::new(name, ParamLocation::Header, schema, required)
    }

    /// The whole request body.
    pub fn body(name: impl Into<String>, schema: SchemaNode, required: bool) -> Self {
        Self::new(name, ParamLocation::Body, schema, required)
    }

    /// One field of a form body.
    pub fn form(name: impl Into<String>, schema: SchemaNode, required: bool) -> Self {
        Self::new(name, ParamLocation::Form, schema, required)
    }

    /// Attach a description.
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Key of a response table entry.
///
/// The derived ordering is the evaluation order of response branches: literal codes
/// ascending, then status ranges (`2XX`), then `default`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatusKey {
    /// Literal status code
    Code(u16),
    /// `nXX` range, holding the leading digit
    Range(u8),
    /// `default` entry
    Default,
}

impl StatusKey {
    /// Parse a response key as written in an API description (`"200"`, `"2XX"`, `"default"`).
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("default") {
            return Some(StatusKey::Default);
        }
        let bytes = raw.as_bytes();
        if bytes.len() == 3
            && (b'1'..=b'5').contains(&bytes[0])
            && bytes[1..].iter().all(|b| b.eq_ignore_ascii_case(&b'x'))
        {
            return Some(StatusKey::Range(bytes[0] - b'0'));
        }
        raw.parse::<u16>()
            .ok()
            .filter(|code| (100..600).contains(code))
            .map(StatusKey::Code)
    }

    /// Whether the key lies in the conventional 2xx success range.
    pub fn is_success_range(self) -> bool {
        match self {
            StatusKey::Code(code) => (200..300).contains(&code),
            StatusKey::Range(digit) => digit == 2,
            StatusKey::Default => false,
        }
    }
}

impl From<u16> for StatusKey {
    fn from(code: u16) -> Self {
        StatusKey::Code(code)
    }
}

impl fmt::Display for StatusKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusKey::Code(code) => write!(f, "{code}"),
            StatusKey::Range(digit) => write!(f, "{digit}XX"),
            StatusKey::Default => f.write_str("default"),
        }
    }
}

/// A declared response: optional body schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    /// Body schema; `None` for a response without content.
    pub schema: Option<SchemaNode>,
    /// Description copied into the method's doc comment.
    pub description: Option<String>,
}

/// Responses keyed by status, iterated in branch evaluation order.
pub type ResponseTable = BTreeMap<StatusKey, Response>;

/// One API operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    /// Logical name (`operationId`), e.g. `Pets_GetPet`.
    pub name: String,
    /// HTTP verb.
    pub method: HttpMethod,
    /// Route template with `{param}` placeholders.
    pub path: String,
    /// Parameters in declaration order.
    pub parameters: Vec<Parameter>,
    /// Declared request content types; empty means none declared.
    pub content_types: Vec<String>,
    /// Declared responses.
    pub responses: ResponseTable,
    /// Tags, used for `first_tag` client grouping.
    pub tags: Vec<String>,
    /// Short summary for the method's doc comment.
    pub summary: Option<String>,
    /// Long description for the method's doc comment.
    pub description: Option<String>,
    /// Marks the generated method `@deprecated`.
    pub deprecated: bool,
}

impl Operation {
    /// Operation without parameters, content types or responses.
    pub fn new(name: impl Into<String>, method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method,
            path: path.into(),
            parameters: Vec::new(),
            content_types: Vec::new(),
            responses: ResponseTable::new(),
            tags: Vec::new(),
            summary: None,
            description: None,
            deprecated: false,
        }
    }

    /// Append a parameter.
    pub fn param(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Declare a request content type.
    pub fn consumes(mut self, content_type: impl Into<String>) -> Self {
        self.content_types.push(content_type.into());
        self
    }

    /// Declare a response; `schema == None` means the response carries no body.
    pub fn response(mut self, status: impl Into<StatusKey>, schema: Option<SchemaNode>) -> Self {
        self.responses.insert(
            status.into(),
            Response {
                schema,
                description: None,
            },
        );
        self
    }

    /// Add a tag.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Set the summary.
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Mark the operation deprecated.
    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    /// Parameters in generated-signature order: path, query/header, body/form.
    /// Declaration order is kept within each group.
    pub fn signature_params(&self) -> Vec<&Parameter> {
        let mut params: Vec<&Parameter> = self.parameters.iter().collect();
        params.sort_by_key(|p| p.location.signature_rank());
        params
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_key_parse() {
        assert_eq!(StatusKey::parse("200"), Some(StatusKey::Code(200)));
        assert_eq!(StatusKey::parse("2XX"), Some(StatusKey::Range(2)));
        assert_eq!(StatusKey::parse("4xx"), Some(StatusKey::Range(4)));
        assert_eq!(StatusKey::parse("default"), Some(StatusKey::Default));
        assert_eq!(StatusKey::parse("ok"), None);
        assert_eq!(StatusKey::parse("99"), None);
        assert_eq!(StatusKey::parse("9XX"), None);
    }

    #[test]
    fn test_status_key_order() {
        let mut keys = vec![
            StatusKey::Default,
            StatusKey::Code(404),
            StatusKey::Range(2),
            StatusKey::Code(204),
            StatusKey::Code(200),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                StatusKey::Code(200),
                StatusKey::Code(204),
                StatusKey::Code(404),
                StatusKey::Range(2),
                StatusKey::Default,
            ]
        );
    }

    #[test]
    fn test_success_range() {
        assert!(StatusKey::Code(204).is_success_range());
        assert!(StatusKey::Range(2).is_success_range());
        assert!(!StatusKey::Code(302).is_success_range());
        assert!(!StatusKey::Default.is_success_range());
    }

    #[test]
    fn test_signature_params_order() {
        let op = Operation::new("Items_Update", HttpMethod::Put, "/items/{id}")
            .param(Parameter::body("body", SchemaNode::reference("Item"), true))
            .param(Parameter::query("dryRun", SchemaNode::boolean(), false))
            .param(Parameter::path("id", SchemaNode::integer()))
            .param(Parameter::header("X-Trace", SchemaNode::string(), false));
        let names: Vec<_> = op.signature_params().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["id", "dryRun", "X-Trace", "body"]);
    }
}
