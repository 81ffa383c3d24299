//! Request Body Strategy Resolver: how the generated method builds its request body.

use tracing::warn;

use crate::document::{Operation, ParamLocation, Parameter};
use crate::error::Warning;

/// Body construction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEncoding {
    /// No body-bound parameters
    None,
    /// `JSON.stringify(...)` with `Content-Type: application/json`
    Json,
    /// `key=value` pairs joined by `&`
    UrlEncoded,
    /// `FormData` container; the transport sets the boundary header
    Multipart,
}

/// Body construction plan of one operation.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyPlan {
    /// How the body is built.
    pub encoding: BodyEncoding,
    /// Body- and form-bound parameters, in declaration order.
    pub fields: Vec<Parameter>,
    /// Set when an unsupported content type forced the JSON fallback.
    pub warning: Option<Warning>,
}

impl BodyPlan {
    /// Literal `Content-Type` request header, if the encoding sets one.
    pub fn content_type_header(&self) -> Option<&'static str> {
        match self.encoding {
            BodyEncoding::Json => Some("application/json"),
            BodyEncoding::UrlEncoded => Some("application/x-www-form-urlencoded"),
            BodyEncoding::None | BodyEncoding::Multipart => None,
        }
    }

    /// Whether the JSON body is the single body parameter itself (as opposed to an
    /// object literal assembled from several fields).
    pub fn is_single_json_body(&self) -> bool {
        self.encoding == BodyEncoding::Json
            && matches!(self.fields.as_slice(), [p] if p.location == ParamLocation::Body)
    }
}

/// Media type without parameters, lowercased.
fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn is_json(essence: &str) -> bool {
    matches!(essence, "application/json" | "text/json" | "*/*") || essence.ends_with("+json")
}

/// Decide the body construction plan of `op`.
///
/// Urlencoded wins over multipart, which wins over JSON: a multipart container is only
/// built when the operation declares multipart and not urlencoded. With no declared
/// content type the body is JSON; a body whose declared types are all unsupported also
/// falls back to JSON, with a warning.
pub fn plan(op: &Operation) -> BodyPlan {
    let fields: Vec<Parameter> = op
        .parameters
        .iter()
        .filter(|p| p.location.is_body_bound())
        .cloned()
        .collect();
    if fields.is_empty() {
        return BodyPlan {
            encoding: BodyEncoding::None,
            fields,
            warning: None,
        };
    }

    let declared: Vec<String> = op.content_types.iter().map(|ct| essence(ct)).collect();
    let has = |wanted: &str| declared.iter().any(|ct| ct == wanted);

    let (encoding, warning) = if has("application/x-www-form-urlencoded") {
        (BodyEncoding::UrlEncoded, None)
    } else if has("multipart/form-data") {
        (BodyEncoding::Multipart, None)
    } else if declared.is_empty() || declared.iter().any(|ct| is_json(ct)) {
        (BodyEncoding::Json, None)
    } else {
        let message = format!(
            "unsupported request content type '{}', falling back to JSON",
            op.content_types.join(", ")
        );
        warn!(operation = %op.name, "{}", message);
        (BodyEncoding::Json, Some(Warning::new(Some(&op.name), message)))
    };

    BodyPlan {
        encoding,
        fields,
        warning,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::document::{HttpMethod, SchemaNode};

    fn post() -> Operation {
        Operation::new("Submit", HttpMethod::Post, "/submit")
    }

    #[test]
    fn test_no_body_params() {
        let op = post()
            .consumes("application/json")
            .param(Parameter::query("q", SchemaNode::string(), false));
        let plan = plan(&op);
        assert_eq!(plan.encoding, BodyEncoding::None);
        assert!(plan.warning.is_none());
    }

    #[test]
    fn test_absent_content_type_is_json() {
        let op = post().param(Parameter::body("body", SchemaNode::reference("Item"), true));
        let plan = plan(&op);
        assert_eq!(plan.encoding, BodyEncoding::Json);
        assert_eq!(plan.content_type_header(), Some("application/json"));
        assert!(plan.is_single_json_body());
    }

    #[test]
    fn test_json_compatible_types() {
        for ct in ["application/json; charset=utf-8", "application/problem+json", "text/json"] {
            let op = post()
                .consumes(ct)
                .param(Parameter::body("body", SchemaNode::string(), true));
            assert_eq!(plan(&op).encoding, BodyEncoding::Json, "{ct}");
        }
    }

    #[test]
    fn test_urlencoded() {
        let op = post()
            .consumes("application/x-www-form-urlencoded")
            .param(Parameter::form("name", SchemaNode::string(), true))
            .param(Parameter::form("age", SchemaNode::integer(), false))
            .param(Parameter::path("id", SchemaNode::integer()));
        let plan = plan(&op);
        assert_eq!(plan.encoding, BodyEncoding::UrlEncoded);
        assert_eq!(plan.content_type_header(), Some("application/x-www-form-urlencoded"));
        let names: Vec<_> = plan.fields.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["name", "age"]);
    }

    #[test]
    fn test_multipart_sets_no_header() {
        let op = post()
            .consumes("multipart/form-data")
            .param(Parameter::form("file", SchemaNode::binary(), true));
        let plan = plan(&op);
        assert_eq!(plan.encoding, BodyEncoding::Multipart);
        assert_eq!(plan.content_type_header(), None);
    }

    #[test]
    fn test_urlencoded_wins_over_multipart() {
        for types in [
            ["application/x-www-form-urlencoded", "multipart/form-data"],
            ["multipart/form-data", "application/x-www-form-urlencoded"],
        ] {
            let op = post()
                .consumes(types[0])
                .consumes(types[1])
                .param(Parameter::form("file", SchemaNode::binary(), true));
            let plan = plan(&op);
            assert_eq!(plan.encoding, BodyEncoding::UrlEncoded, "{types:?}");
            assert_eq!(plan.content_type_header(), Some("application/x-www-form-urlencoded"));
        }
    }

    #[test]
    fn test_unsupported_falls_back_with_warning() {
        let op = post()
            .consumes("application/xml")
            .param(Parameter::body("body", SchemaNode::string(), true));
        let plan = plan(&op);
        assert_eq!(plan.encoding, BodyEncoding::Json);
        let warning = plan.warning.unwrap();
        assert_eq!(warning.operation.as_deref(), Some("Submit"));
        assert!(warning.message.contains("application/xml"));
    }
}
