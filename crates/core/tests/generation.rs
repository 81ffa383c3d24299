//! End-to-end generation through the declarative builder.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use ngapi_core::document::{HttpMethod, Operation, Parameter, SchemaNode};
use ngapi_core::{Document, Error, GenerationPolicy, emit};

/// Source text of `export class <name> ...` up to its closing brace.
fn class_block<'a>(out: &'a str, name: &str) -> &'a str {
    let start = out
        .find(&format!("class {name} "))
        .unwrap_or_else(|| unreachable!("class {name} not emitted"));
    let end = out[start..].find("\n}\n").map_or(out.len(), |i| start + i);
    &out[start..end]
}

/// Every `class X extends Base` comes after `class Base`.
fn assert_bases_declared_first(out: &str) {
    let mut checked = 0;
    for (at, _) in out.match_indices(" extends ") {
        let line_start = out[..at].rfind('\n').map_or(0, |i| i + 1);
        if !out[line_start..at].contains("class ") {
            continue;
        }
        let base = out[at + " extends ".len()..]
            .split_whitespace()
            .next()
            .unwrap();
        // Built-in bases such as `Error` are not declared in the module
        let Some(declared) = out.find(&format!("class {base} ")) else {
            continue;
        };
        assert!(
            declared < line_start,
            "class {base} declared at {declared}, extended at {line_start}"
        );
        checked += 1;
    }
    assert!(checked > 0, "no derived class emitted");
}

fn generic_request_document() -> Document {
    Document::builder()
        .schema(
            "RequestBodyBase",
            SchemaNode::object().property("name", SchemaNode::string(), false),
        )
        .schema(
            "RequestBody",
            SchemaNode::object()
                .extends(SchemaNode::reference("RequestBodyBase"))
                .property("extra", SchemaNode::integer(), false),
        )
        .schema(
            "GenericRequestBase",
            SchemaNode::object().generic_params(["T"]).property(
                "request",
                SchemaNode::bounded_generic_param("T", SchemaNode::reference("RequestBodyBase")),
                true,
            ),
        )
        .schema(
            "GenericRequest1",
            SchemaNode::object().extends(SchemaNode::generic(
                "GenericRequestBase",
                [SchemaNode::reference("RequestBodyBase")],
            )),
        )
        .schema(
            "GenericRequest2",
            SchemaNode::object().extends(SchemaNode::generic(
                "GenericRequestBase",
                [SchemaNode::reference("RequestBody")],
            )),
        )
        .operation(
            Operation::new("Requests_Send1", HttpMethod::Post, "/requests/1")
                .param(Parameter::body("request", SchemaNode::reference("GenericRequest1"), true)),
        )
        .operation(
            Operation::new("Requests_Send2", HttpMethod::Post, "/requests/2")
                .param(Parameter::body("request", SchemaNode::reference("GenericRequest2"), true)),
        )
        .build()
        .unwrap()
}

fn item_document() -> Document {
    Document::builder()
        .schema(
            "Item",
            SchemaNode::object()
                .property("id", SchemaNode::integer(), true)
                .property("createdAt", SchemaNode::date_time(), false),
        )
        .operation(
            Operation::new("Items_Get", HttpMethod::Get, "/items/{id}")
                .param(Parameter::path("id", SchemaNode::integer()))
                .response(200, Some(SchemaNode::reference("Item")))
                .response(204, None)
                .response(404, None),
        )
        .build()
        .unwrap()
}

#[test]
fn test_generic_instances_construct_their_concrete_argument() {
    let out = emit(&generic_request_document(), &GenerationPolicy::default())
        .unwrap()
        .source;

    assert!(out.contains(
        "export class GenericRequest1 extends GenericRequestBaseOfRequestBodyBase implements IGenericRequest1 {"
    ));
    assert!(out.contains(
        "export class GenericRequest2 extends GenericRequestBaseOfRequestBody implements IGenericRequest2 {"
    ));

    let base_instance = class_block(&out, "GenericRequestBaseOfRequestBodyBase");
    assert!(base_instance.contains("this.request = new RequestBodyBase();"));
    assert!(!base_instance.contains("new RequestBody();"));

    let derived_instance = class_block(&out, "GenericRequestBaseOfRequestBody");
    assert!(derived_instance.contains("this.request = new RequestBody();"));
    assert!(derived_instance.contains("RequestBody.fromJS(_data[\"request\"]) : new RequestBody();"));
    assert!(!derived_instance.contains("new RequestBodyBase()"));

    // The generic declaration itself is never emitted
    assert!(!out.contains("class GenericRequestBase "));
}

#[test]
fn test_generic_instances_precede_their_subclasses() {
    let out = emit(&generic_request_document(), &GenerationPolicy::default())
        .unwrap()
        .source;
    assert_bases_declared_first(&out);
    let base = out.find("class GenericRequestBaseOfRequestBodyBase ").unwrap();
    let derived = out.find("class GenericRequest1 ").unwrap();
    assert!(base < derived);
}

#[test]
fn test_bases_registered_later_are_declared_first() {
    let doc = Document::builder()
        .schema(
            "Puppy",
            SchemaNode::object()
                .extends(SchemaNode::reference("Dog"))
                .property("ageInWeeks", SchemaNode::integer(), true),
        )
        .schema(
            "Dog",
            SchemaNode::object()
                .extends(SchemaNode::reference("Pet"))
                .property("breed", SchemaNode::string(), false),
        )
        .schema("Owner", SchemaNode::object().property("name", SchemaNode::string(), true))
        .schema("Pet", SchemaNode::object().property("name", SchemaNode::string(), true))
        .build()
        .unwrap();
    let out = emit(&doc, &GenerationPolicy::default()).unwrap().source;
    assert_bases_declared_first(&out);

    let order: Vec<usize> = ["Pet", "Dog", "Puppy", "Owner"]
        .iter()
        .map(|name| out.find(&format!("export class {name} ")).unwrap())
        .collect();
    assert!(order.windows(2).all(|pair| pair[0] < pair[1]), "{order:?}");
}

#[test]
fn test_200_and_204_branches() {
    let out = emit(&item_document(), &GenerationPolicy::default()).unwrap().source;
    assert!(out.contains("get(id: number): Observable<Item | null> {"));
    assert!(out.contains("result200 = resultData200 ? Item.fromJS(resultData200) : null as any;"));
    assert!(out.contains(
        "} else if (status === 204) {\n            return _observableOf<Item | null>(null as any);"
    ));
    assert!(out.contains("} else if (status === 404) {"));
    assert!(out.contains("this.createdAt = _data[\"createdAt\"] ? new Date(_data[\"createdAt\"].toString()) : undefined as any;"));
    assert!(out.contains("data[\"createdAt\"] = this.createdAt ? this.createdAt.toISOString() : undefined as any;"));
}

#[test]
fn test_no_declared_responses_resolve_void() {
    let doc = Document::builder()
        .schema("Item", SchemaNode::object().property("id", SchemaNode::integer(), true))
        .operation(
            Operation::new("Items_Save", HttpMethod::Post, "/items")
                .param(Parameter::body("item", SchemaNode::reference("Item"), true)),
        )
        .build()
        .unwrap();
    let out = emit(&doc, &GenerationPolicy::default()).unwrap().source;
    assert!(out.contains("save(item: Item): Observable<void> {"));
    assert!(out.contains("protected processSave(response: HttpResponseBase): Observable<void> {"));
    assert!(!out.contains("resultData"));
}

#[test]
fn test_urlencoded_form() {
    let doc = Document::builder()
        .operation(
            Operation::new("Auth_Login", HttpMethod::Post, "/login")
                .consumes("application/x-www-form-urlencoded")
                .param(Parameter::form("user", SchemaNode::string(), true))
                .param(Parameter::form("password", SchemaNode::string(), true))
                .response(200, Some(SchemaNode::string())),
        )
        .build()
        .unwrap();
    let out = emit(&doc, &GenerationPolicy::default()).unwrap().source;
    assert!(out.contains("const content_ = contentPairs_.join(\"&\");"));
    assert!(out.contains("\"Content-Type\": \"application/x-www-form-urlencoded\""));
    assert!(!out.contains("FormData"));
}

#[test]
fn test_export_toggle() {
    let doc = item_document();
    let exported = emit(&doc, &GenerationPolicy::default()).unwrap().source;
    assert!(exported.contains("export class Item implements IItem {"));
    assert!(exported.contains("export interface IItem {"));
    assert!(exported.contains("export class ItemsClient {"));

    let hidden = emit(&doc, &GenerationPolicy::default().with_export_types(false))
        .unwrap()
        .source;
    assert!(hidden.contains("class Item implements IItem {"));
    assert!(hidden.contains("interface IItem {"));
    assert!(!hidden.contains("export "));
}

#[test]
fn test_client_interfaces() {
    let policy = GenerationPolicy::default().with_client_interfaces(true);
    let out = emit(&item_document(), &policy).unwrap().source;
    let interface = out.find("export interface IItemsClient {").unwrap();
    let class = out.find("export class ItemsClient implements IItemsClient {").unwrap();
    assert!(interface < class);
    assert!(out.contains("    get(id: number): Observable<Item | null>;"));
}

#[test]
fn test_rx_versions_select_one_form() {
    let doc = item_document();
    let rx6 = emit(&doc, &GenerationPolicy::default().with_rxjs_version(6.0))
        .unwrap()
        .source;
    assert!(rx6.contains("return _observableThrow(new Error(\"The parameter 'id' must be defined.\"));"));
    assert!(!rx6.contains("_observableThrow(() =>"));

    let rx7 = emit(&doc, &GenerationPolicy::default().with_rxjs_version(7.0))
        .unwrap()
        .source;
    assert!(rx7.contains("return _observableThrow(() => new Error(\"The parameter 'id' must be defined.\"));"));
    assert!(!rx7.contains("_observableThrow(new Error("));

    let rx5 = emit(&doc, &GenerationPolicy::default().with_rxjs_version(5.0))
        .unwrap()
        .source;
    assert!(rx5.contains("import 'rxjs/add/operator/mergeMap';"));
    assert!(!rx5.contains("_observable"));
}

#[test]
fn test_typescript_versions() {
    let doc = item_document();
    let modern = emit(&doc, &GenerationPolicy::default()).unwrap().source;
    assert!(modern.contains("    id!: number;"));
    assert!(modern.contains("    createdAt?: Date | undefined;"));

    let strict = emit(&doc, &GenerationPolicy::default().with_typescript_version(2.4))
        .unwrap()
        .source;
    assert!(strict.contains("    id: number;"));
    assert!(strict.contains("    createdAt?: Date | undefined;"));

    let legacy = emit(&doc, &GenerationPolicy::default().with_typescript_version(1.8))
        .unwrap()
        .source;
    assert!(legacy.contains("    createdAt?: Date;"));
    assert!(!legacy.contains("| undefined"));
}

#[test]
fn test_generation_is_idempotent() {
    let policy = GenerationPolicy::default().with_client_interfaces(true);
    let first = emit(&generic_request_document(), &policy).unwrap();
    let second = emit(&generic_request_document(), &policy).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_unresolved_reference_is_fatal() {
    let err = Document::builder()
        .schema("Order", SchemaNode::object().property("customer", SchemaNode::reference("Customer"), true))
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::UnresolvedSchema { ref key } if key == "Customer"));
    assert_eq!(err.to_string(), "unresolved schema reference 'Customer'");
}

#[test]
fn test_unsupported_content_type_falls_back_to_json() {
    let doc = Document::builder()
        .schema("Note", SchemaNode::object().property("text", SchemaNode::string(), true))
        .operation(
            Operation::new("Notes_Create", HttpMethod::Post, "/notes")
                .consumes("application/xml")
                .param(Parameter::body("note", SchemaNode::reference("Note"), true)),
        )
        .build()
        .unwrap();
    let generated = emit(&doc, &GenerationPolicy::default()).unwrap();
    assert_eq!(generated.warnings.len(), 1);
    assert!(generated.warnings[0].message.contains("application/xml"));
    assert!(generated.source.contains("const content_ = JSON.stringify(note);"));
    assert!(generated.source.contains("\"Content-Type\": \"application/json\""));
}
