//! Code Emitter: drives the resolvers over a [`Document`] and prints one TypeScript
//! module.
//!
//! Output order is fixed: banner, imports, injection token, clients, DTOs, runtime
//! helpers. Nothing in the output depends on the clock or the environment, so the
//! same document and policy always yield the same text.

mod client;
mod dto;
mod runtime;
pub mod syntax;

use tracing::debug;

use crate::document::Document;
use crate::error::{Result, Warning};
use crate::policy::GenerationPolicy;
use crate::resolve::TypeResolver;
use crate::ts::{Emit, ImportItem, TsImport, TsModule};

pub use syntax::{RxFlavor, Syntax, TsSyntax};

/// Source text of one generation run plus its non-fatal warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct Generated {
    /// The complete TypeScript module.
    pub source: String,
    /// Import warnings of the document followed by emission warnings, in discovery order.
    pub warnings: Vec<Warning>,
}

fn banner(document: &Document) -> Vec<String> {
    let mut lines = vec![
        "//----------------------".to_string(),
        "// <auto-generated>".to_string(),
        "//     Generated by ngapi. Changes to this file will be lost on regeneration.".to_string(),
        "// </auto-generated>".to_string(),
        "//----------------------".to_string(),
    ];
    if let Some(title) = document.title() {
        lines.push(format!("// API: {}", title.lines().next().unwrap_or_default()));
    }
    lines.push(String::new());
    lines.push("/* tslint:disable */".to_string());
    lines.push("/* eslint-disable */".to_string());
    lines
}

fn angular_imports() -> Vec<TsImport> {
    vec![
        TsImport::new(
            "@angular/core",
            ["Injectable", "Inject", "Optional", "InjectionToken"]
                .into_iter()
                .map(ImportItem::plain)
                .collect(),
        ),
        TsImport::new(
            "@angular/common/http",
            ["HttpClient", "HttpHeaders", "HttpResponse", "HttpResponseBase"]
                .into_iter()
                .map(ImportItem::plain)
                .collect(),
        ),
    ]
}

/// Generate the client module for `document` under `policy`.
pub fn emit(document: &Document, policy: &GenerationPolicy) -> Result<Generated> {
    let syntax = Syntax::from_policy(policy);
    debug!(?syntax, template = ?policy.template, "Emitting TypeScript client");

    let mut resolver = TypeResolver::new(document, policy);
    let clients = client::clients(&mut resolver, policy, syntax)?;
    let dtos = if policy.generate_dto_types {
        dto::declarations(&mut resolver, policy.export_types)?
    } else {
        Vec::new()
    };
    debug!(
        clients = clients.items.len(),
        declarations = dtos.len(),
        instances = resolver.instance_count(),
        "Resolved declarations"
    );

    let mut module = TsModule {
        banner: banner(document),
        imports: Vec::new(),
        items: Vec::new(),
    };
    let has_clients = !clients.is_empty();
    if has_clients {
        module.imports.extend(syntax.rx.imports());
        module.imports.extend(angular_imports());
        module
            .items
            .push(runtime::injection_token(&policy.injection_token, policy.export_types));
    }
    module.items.extend(clients.items);
    module.items.extend(dtos);
    if has_clients {
        let needs = runtime::RuntimeNeeds {
            file_parameter: clients.uses_file_parameter,
            file_response: clients.uses_file_response,
        };
        module
            .items
            .extend(runtime::helpers(syntax, needs, policy.export_types));
    }

    let mut warnings = document.warnings().to_vec();
    warnings.extend(clients.warnings);
    Ok(Generated {
        source: module.emit(),
        warnings,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::document::{HttpMethod, Operation, Parameter, SchemaNode};

    fn document() -> Document {
        Document::builder()
            .title("Pet Store")
            .schema("Pet", SchemaNode::object().property("name", SchemaNode::string(), true))
            .operation(
                Operation::new("Pets_List", HttpMethod::Get, "/pets")
                    .response(200, Some(SchemaNode::array(SchemaNode::reference("Pet")))),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_artefact_order() {
        let out = emit(&document(), &GenerationPolicy::default()).unwrap().source;
        let position = |needle: &str| out.find(needle).unwrap();
        assert!(out.starts_with("//----------------------\n// <auto-generated>"));
        assert!(out.contains("// API: Pet Store"));
        assert!(position("from 'rxjs/operators'") < position("from '@angular/core'"));
        assert!(position("export const API_BASE_URL") < position("export class PetsClient"));
        assert!(position("export class PetsClient") < position("export class Pet implements IPet"));
        assert!(position("export class Pet implements IPet") < position("export class ApiException"));
        assert!(out.ends_with("}\n"));
        assert!(!out.ends_with("\n\n"));
    }

    #[test]
    fn test_schemas_only_has_no_runtime() {
        let doc = Document::builder()
            .schema("Pet", SchemaNode::object())
            .build()
            .unwrap();
        let out = emit(&doc, &GenerationPolicy::default()).unwrap().source;
        assert!(out.contains("export class Pet"));
        assert!(!out.contains("import "));
        assert!(!out.contains("ApiException"));
    }

    #[test]
    fn test_dto_generation_off_inlines_types() {
        let doc = Document::builder()
            .schema(
                "Pet",
                SchemaNode::object()
                    .property("name", SchemaNode::string(), true)
                    .property("born", SchemaNode::date_time(), false),
            )
            .operation(
                Operation::new("Save", HttpMethod::Post, "/pets")
                    .param(Parameter::body("pet", SchemaNode::reference("Pet"), true))
                    .response(200, Some(SchemaNode::reference("Pet"))),
            )
            .build()
            .unwrap();
        let policy = GenerationPolicy::default().with_dto_types(false);
        let out = emit(&doc, &policy).unwrap().source;
        assert!(out.contains(
            "save(pet: { name: string; born?: string | undefined; }): Observable<{ name: string; born?: string | undefined; }> {"
        ));
        assert!(out.contains("result200 = resultData200 !== undefined ? resultData200 : null as any;"));
        assert!(!out.contains("class Pet"));
        assert!(!out.contains("fromJS"));
    }

    #[test]
    fn test_warnings_are_collected() {
        let doc = Document::builder()
            .operation(
                Operation::new("Upload", HttpMethod::Post, "/upload")
                    .consumes("application/xml")
                    .param(Parameter::body("body", SchemaNode::string(), true)),
            )
            .build()
            .unwrap();
        let generated = emit(&doc, &GenerationPolicy::default()).unwrap();
        assert_eq!(generated.warnings.len(), 1);
        assert_eq!(generated.warnings[0].operation.as_deref(), Some("Upload"));
        assert!(generated.source.contains("const content_ = JSON.stringify(body);"));
    }
}
