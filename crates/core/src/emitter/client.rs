//! Client classes: one `@Injectable()` class per operation group, with one public
//! method and one `process<Method>` helper per operation.

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::document::{Operation, ParamLocation, Parameter, SchemaKind, SchemaNode};
use crate::emitter::dto::{decode_into, Fallback};
use crate::emitter::syntax::{Syntax, TsSyntax};
use crate::error::{Error, Result, Warning};
use crate::policy::{ClientGrouping, GenerationPolicy};
use crate::resolve::{body, response};
use crate::resolve::{BodyEncoding, BodyPlan, ResponseBranch, ResponsePlan, TypeRef, TypeResolver};
use crate::ts::{
    ClassMember, Emit, InterfaceMember, TsClass, TsDoc, TsExpr, TsField, TsInterface, TsItem,
    TsLiteral, TsMethod, TsParam, TsStmt, TsType,
};
use crate::utils::{capitalize_first, sanitize_ts_identifier, to_type_name};

const UNEXPECTED_ERROR: &str = "An unexpected server error occurred.";
const SERVER_ERROR: &str = "A server side error occurred.";

/// Emitted clients plus the runtime helpers they rely on.
#[derive(Debug, Default)]
pub(crate) struct Clients {
    pub items: Vec<TsItem>,
    pub warnings: Vec<Warning>,
    pub uses_file_parameter: bool,
    pub uses_file_response: bool,
}

impl Clients {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

struct Group<'d> {
    class: String,
    interface: Option<String>,
    operations: Vec<(String, &'d Operation)>,
}

/// Split an operation's logical name into (group, method) under `grouping`.
fn split_name(operation: &Operation, grouping: ClientGrouping) -> (String, String) {
    match grouping {
        ClientGrouping::OperationId => match operation.name.split_once('_') {
            Some((group, method)) if !method.is_empty() => (group.to_string(), method.to_string()),
            _ => (String::new(), operation.name.clone()),
        },
        ClientGrouping::FirstTag => (
            operation.tags.first().cloned().unwrap_or_default(),
            operation.name.clone(),
        ),
        ClientGrouping::Single => (String::new(), operation.name.clone()),
    }
}

fn quoted(value: &str) -> String {
    TsLiteral::String(value.to_string()).emit()
}

/// Emit every client of the document.
///
/// Client names are claimed before any operation type is resolved, so generic
/// instances discovered while building methods never take a client's name.
pub(crate) fn clients(
    resolver: &mut TypeResolver<'_>,
    policy: &GenerationPolicy,
    syntax: Syntax,
) -> Result<Clients> {
    let document = resolver.document();
    let interfaces = policy.generate_client_interfaces && syntax.ts != TsSyntax::Legacy;
    if policy.generate_client_interfaces && !interfaces {
        debug!(
            typescript_version = policy.typescript_version,
            "Client interfaces need TypeScript 2.0, emitting classes only"
        );
    }

    let mut grouped: IndexMap<String, Vec<(String, &Operation)>> = IndexMap::new();
    for operation in document.operations() {
        let (group, method) = split_name(operation, policy.client_grouping);
        grouped
            .entry(group)
            .or_default()
            .push((sanitize_ts_identifier(&method), operation));
    }

    let mut groups = Vec::with_capacity(grouped.len());
    for (group, operations) in grouped {
        let prefix = if group.is_empty() {
            String::new()
        } else {
            to_type_name(&group)
        };
        let class = resolver.claim_client_name(&format!("{prefix}Client"), interfaces);
        groups.push(Group {
            interface: interfaces.then(|| format!("I{class}")),
            class,
            operations,
        });
    }

    let mut out = Clients::default();
    for group in &groups {
        let mut builder = ClientBuilder {
            resolver: &mut *resolver,
            policy,
            syntax,
            out: &mut out,
        };
        let (class, interface) = builder.client(group)?;
        debug!(client = %class.name, operations = group.operations.len(), "Emitted client");
        if let Some(interface) = interface {
            out.items.push(TsItem::Interface(interface));
        }
        out.items.push(TsItem::Class(class));
    }
    Ok(out)
}

/// Signature parameter of a generated method.
struct MethodParam<'o> {
    param: &'o Parameter,
    ident: String,
    ty: TypeRef,
    /// Declared type; a multipart file field is declared as `FileParameter`.
    ts: TsType,
    file: bool,
}

impl MethodParam<'_> {
    fn is_array(&self) -> bool {
        matches!(self.ty.non_null(), TypeRef::Array(_))
    }

    fn item_type(&self) -> &TypeRef {
        match self.ty.non_null() {
            TypeRef::Array(item) => item,
            other => other,
        }
    }
}

/// How one response branch treats the body.
enum BranchBody {
    Empty,
    File,
    Json(TypeRef),
}

fn is_file_schema(schema: &SchemaNode) -> bool {
    match &schema.kind {
        SchemaKind::Array(item) => item.is_binary(),
        _ => schema.is_binary(),
    }
}

/// `"" + value`, with dates serialised as ISO strings.
fn string_value(expr: &str, ty: &TypeRef) -> String {
    match ty.non_null() {
        TypeRef::Date => format!("{expr}.toISOString()"),
        _ => format!("\"\" + {expr}"),
    }
}

/// Form field value: structured values are sent as JSON text.
fn form_value(expr: &str, ty: &TypeRef) -> String {
    match ty.non_null() {
        TypeRef::Class(_) | TypeRef::Object { .. } | TypeRef::Map(_) | TypeRef::Any => {
            format!("JSON.stringify({expr})")
        }
        other => string_value(expr, other),
    }
}

/// Wrap `stmts` in a null/undefined guard unless `required`.
fn guarded(required: bool, ident: &str, stmts: Vec<TsStmt>) -> Vec<TsStmt> {
    if required {
        stmts
    } else {
        vec![TsStmt::if_(
            TsExpr::raw(format!("{ident} !== undefined && {ident} !== null")),
            stmts,
        )]
    }
}

/// Names of the `{placeholder}` segments of a route template.
fn placeholders(path: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = path;
    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        names.push(&rest[start + 1..start + len]);
        rest = &rest[start + len + 1..];
    }
    names
}

struct ClientBuilder<'a, 'd> {
    resolver: &'a mut TypeResolver<'d>,
    policy: &'a GenerationPolicy,
    syntax: Syntax,
    out: &'a mut Clients,
}

impl<'d> ClientBuilder<'_, 'd> {
    fn warn(&mut self, operation: &Operation, message: String) {
        warn!(operation = %operation.name, "{}", message);
        self.out.warnings.push(Warning::new(Some(&operation.name), message));
    }

    fn client(&mut self, group: &Group<'d>) -> Result<(TsClass, Option<TsInterface>)> {
        let mut members = self.client_preamble();
        let mut signatures = Vec::new();
        let mut seen = HashSet::new();

        for (method, operation) in &group.operations {
            if !seen.insert(method.clone()) {
                return Err(Error::DuplicateOperation {
                    client: group.class.clone(),
                    name: method.clone(),
                });
            }
            let (public, process) = self.operation(method, operation)?;
            if group.interface.is_some() {
                signatures.push(InterfaceMember::Method(public.clone()));
            }
            members.push(ClassMember::Method(public));
            members.push(ClassMember::Method(process));
        }

        let exported = self.policy.export_types;
        let interface = group.interface.as_ref().map(|name| TsInterface {
            exported,
            name: name.clone(),
            extends: Vec::new(),
            members: signatures,
        });
        let class = TsClass {
            exported,
            decorators: vec!["@Injectable()".to_string()],
            name: group.class.clone(),
            extends: None,
            implements: group.interface.iter().cloned().collect(),
            members,
        };
        Ok((class, interface))
    }

    /// Fields and constructor shared by every client.
    fn client_preamble(&self) -> Vec<ClassMember> {
        let ts = self.syntax.ts;
        let reviver = TsType::named("((key: string, value: any) => any)");
        let constructor = TsMethod::new(
            "constructor",
            vec![
                TsParam::new("http", TsType::named("HttpClient")).decorated("@Inject(HttpClient)"),
                TsParam::new("baseUrl", TsType::String)
                    .optional()
                    .decorated("@Optional()")
                    .decorated(format!("@Inject({})", self.policy.injection_token)),
            ],
            None,
        )
        .with_body(vec![
            TsStmt::raw("this.http = http;"),
            TsStmt::raw(format!(
                "this.baseUrl = baseUrl !== undefined && baseUrl !== null ? baseUrl : {};",
                quoted(&self.policy.base_url)
            )),
        ]);

        vec![
            ClassMember::Field(TsField {
                modifiers: vec!["private"],
                name: "http".to_string(),
                optional: false,
                definite: false,
                ty: TsType::named("HttpClient"),
                init: None,
            }),
            ClassMember::Field(TsField {
                modifiers: vec!["private"],
                name: "baseUrl".to_string(),
                optional: false,
                definite: false,
                ty: TsType::String,
                init: None,
            }),
            ClassMember::Field(TsField {
                modifiers: vec!["protected"],
                name: "jsonParseReviver".to_string(),
                optional: false,
                definite: false,
                ty: ts.optional(reviver),
                init: Some(TsExpr::ident("undefined")),
            }),
            ClassMember::Method(constructor),
        ]
    }

    fn method_params<'o>(
        &mut self,
        operation: &'o Operation,
        plan: &BodyPlan,
    ) -> Result<Vec<MethodParam<'o>>> {
        let mut taken = HashSet::new();
        let mut params = Vec::new();
        for param in operation.signature_params() {
            let base = sanitize_ts_identifier(&param.name);
            let mut ident = base.clone();
            let mut counter = 2;
            while !taken.insert(ident.clone()) {
                ident = format!("{base}{counter}");
                counter += 1;
            }

            let ty = self.resolver.resolve(&param.schema)?;
            let file = plan.encoding == BodyEncoding::Multipart
                && param.location.is_body_bound()
                && is_file_schema(&param.schema);
            let ts = if file {
                self.out.uses_file_parameter = true;
                let file_ty = TsType::named("FileParameter");
                let file_ty = if matches!(param.schema.kind, SchemaKind::Array(_)) {
                    TsType::array(file_ty)
                } else {
                    file_ty
                };
                if param.schema.nullable {
                    self.syntax.ts.nullable(file_ty)
                } else {
                    file_ty
                }
            } else {
                ty.to_ts(self.syntax.ts)
            };
            params.push(MethodParam {
                param,
                ident,
                ty,
                ts,
                file,
            });
        }
        Ok(params)
    }

    fn branch_body(&mut self, branch: &ResponseBranch) -> Result<BranchBody> {
        match &branch.schema {
            None => Ok(BranchBody::Empty),
            Some(schema) if schema.is_binary() => {
                if branch.is_success {
                    self.out.uses_file_response = true;
                    Ok(BranchBody::File)
                } else {
                    Ok(BranchBody::Empty)
                }
            }
            Some(schema) => Ok(BranchBody::Json(self.resolver.resolve(schema)?)),
        }
    }

    /// Union of the success types; `void` when no success carries a body.
    fn result_type(&self, plan: &ResponsePlan, bodies: &[BranchBody]) -> TsType {
        let mut members = Vec::new();
        let mut has_empty = false;
        for (branch, body) in plan.branches.iter().zip(bodies) {
            if !branch.is_success {
                continue;
            }
            match body {
                BranchBody::Empty => has_empty = true,
                BranchBody::File => members.push(TsType::named("FileResponse")),
                BranchBody::Json(ty) => members.push(ty.to_ts(self.syntax.ts)),
            }
        }
        if members.is_empty() {
            return TsType::Void;
        }
        let ty = TsType::union(members);
        if has_empty {
            self.syntax.ts.nullable(ty)
        } else {
            ty
        }
    }

    fn operation(&mut self, method: &str, operation: &Operation) -> Result<(TsMethod, TsMethod)> {
        let plan = body::plan(operation);
        if let Some(warning) = &plan.warning {
            self.out.warnings.push(warning.clone());
        }
        let params = self.method_params(operation, &plan)?;

        let responses = response::classify(&operation.responses, self.policy.default_response_is_success);
        let mut bodies = Vec::with_capacity(responses.branches.len());
        for branch in &responses.branches {
            bodies.push(self.branch_body(branch)?);
        }
        let result_ty = self.result_type(&responses, &bodies);
        let observable = TsType::generic("Observable", result_ty.clone());
        let process_name = format!("process{}", capitalize_first(method));

        let mut stmts = self.url_statements(operation, &params);
        let content = self.content_statements(&plan, &params);
        let has_content = !content.is_empty();
        if has_content {
            stmts.push(TsStmt::Blank);
            stmts.extend(content);
        }
        stmts.push(TsStmt::Blank);
        stmts.push(TsStmt::let_(
            "options_",
            Some(TsType::Any),
            self.options(&plan, &params, &responses, &bodies, has_content),
        ));
        stmts.push(TsStmt::Blank);
        stmts.push(TsStmt::ret(self.request(operation, &process_name, &observable)));

        let last_required = params.iter().rposition(|p| p.param.required);
        let signature = params
            .iter()
            .enumerate()
            .map(|(i, p)| {
                if p.param.required {
                    TsParam::new(p.ident.clone(), p.ts.clone())
                } else {
                    let param = TsParam::new(p.ident.clone(), self.syntax.ts.optional(p.ts.clone()));
                    // `?` only when nothing required follows
                    if last_required.is_none_or(|last| i > last) {
                        param.optional()
                    } else {
                        param
                    }
                }
            })
            .collect();

        let mut public = TsMethod::new(method, signature, Some(observable.clone())).with_body(stmts);
        public.doc = method_doc(operation, &params, &responses);

        let process = TsMethod::new(
            process_name,
            vec![TsParam::new("response", TsType::named("HttpResponseBase"))],
            Some(observable),
        )
        .with_modifier("protected")
        .with_body(self.process_body(&responses, &bodies, &result_ty));

        Ok((public, process))
    }

    fn url_statements(&mut self, operation: &Operation, params: &[MethodParam<'_>]) -> Vec<TsStmt> {
        let has_query = params.iter().any(|p| p.param.location == ParamLocation::Query);
        let route = if has_query {
            format!("{}?", operation.path)
        } else {
            operation.path.clone()
        };
        let mut stmts = vec![TsStmt::raw(format!("let url_ = this.baseUrl + {};", quoted(&route)))];

        // Checks come first so a rejected call has no side effects
        for p in params {
            let checked = matches!(
                p.param.location,
                ParamLocation::Path | ParamLocation::Query | ParamLocation::Form
            );
            if checked && p.param.required {
                let error = TsExpr::New {
                    callee: "Error".to_string(),
                    args: vec![TsExpr::string(format!(
                        "The parameter '{}' must be defined.",
                        p.ident
                    ))],
                };
                stmts.push(TsStmt::if_(
                    TsExpr::raw(format!("{0} === undefined || {0} === null", p.ident)),
                    vec![TsStmt::ret(self.syntax.rx.throw(error))],
                ));
            }
        }

        let declared = placeholders(&operation.path);
        for p in params.iter().filter(|p| p.param.location == ParamLocation::Path) {
            if !declared.contains(&p.param.name.as_str()) {
                self.warn(
                    operation,
                    format!(
                        "path parameter '{}' does not appear in route '{}'",
                        p.param.name, operation.path
                    ),
                );
                continue;
            }
            stmts.push(TsStmt::raw(format!(
                "url_ = url_.replace({}, encodeURIComponent({}));",
                quoted(&format!("{{{}}}", p.param.name)),
                string_value(&p.ident, &p.ty)
            )));
        }
        for placeholder in declared {
            let bound = params
                .iter()
                .any(|p| p.param.location == ParamLocation::Path && p.param.name == placeholder);
            if !bound {
                self.warn(
                    operation,
                    format!("route placeholder '{{{placeholder}}}' has no path parameter"),
                );
            }
        }

        for p in params.iter().filter(|p| p.param.location == ParamLocation::Query) {
            let key = quoted(&format!("{}=", p.param.name));
            let append = if p.is_array() {
                TsStmt::raw(format!(
                    "{}.forEach(item_ => {{ url_ += {key} + encodeURIComponent({}) + \"&\"; }});",
                    p.ident,
                    string_value("item_", p.item_type())
                ))
            } else {
                TsStmt::raw(format!(
                    "url_ += {key} + encodeURIComponent({}) + \"&\";",
                    string_value(&p.ident, &p.ty)
                ))
            };
            stmts.extend(guarded(p.param.required, &p.ident, vec![append]));
        }
        stmts.push(TsStmt::raw("url_ = url_.replace(/[?&]$/, \"\");"));
        stmts
    }

    fn content_statements(&self, plan: &BodyPlan, params: &[MethodParam<'_>]) -> Vec<TsStmt> {
        let fields: Vec<&MethodParam<'_>> = params
            .iter()
            .filter(|p| p.param.location.is_body_bound())
            .collect();

        match plan.encoding {
            BodyEncoding::None => Vec::new(),
            BodyEncoding::Json if plan.is_single_json_body() => fields
                .first()
                .map(|p| {
                    TsStmt::const_(
                        "content_",
                        None,
                        TsExpr::call("JSON.stringify", vec![TsExpr::ident(p.ident.clone())]),
                    )
                })
                .into_iter()
                .collect(),
            BodyEncoding::Json => {
                let entries = fields
                    .iter()
                    .map(|p| (p.param.name.clone(), TsExpr::ident(p.ident.clone())))
                    .collect();
                vec![TsStmt::const_(
                    "content_",
                    None,
                    TsExpr::call("JSON.stringify", vec![TsExpr::Object(entries)]),
                )]
            }
            BodyEncoding::UrlEncoded => {
                let mut stmts = vec![TsStmt::const_(
                    "contentPairs_",
                    Some(TsType::array(TsType::String)),
                    TsExpr::raw("[]"),
                )];
                for p in &fields {
                    let key = format!("encodeURIComponent({}) + \"=\"", quoted(&p.param.name));
                    let push = if p.is_array() {
                        TsStmt::raw(format!(
                            "{}.forEach(item_ => contentPairs_.push({key} + encodeURIComponent({})));",
                            p.ident,
                            form_value("item_", p.item_type())
                        ))
                    } else {
                        TsStmt::raw(format!(
                            "contentPairs_.push({key} + encodeURIComponent({}));",
                            form_value(&p.ident, &p.ty)
                        ))
                    };
                    stmts.extend(guarded(p.param.required, &p.ident, vec![push]));
                }
                stmts.push(TsStmt::raw("const content_ = contentPairs_.join(\"&\");"));
                stmts
            }
            BodyEncoding::Multipart => {
                let mut stmts = vec![TsStmt::const_(
                    "content_",
                    None,
                    TsExpr::New {
                        callee: "FormData".to_string(),
                        args: Vec::new(),
                    },
                )];
                for p in &fields {
                    let name = quoted(&p.param.name);
                    let append = |item: &str| {
                        if p.file {
                            format!(
                                "content_.append({name}, {item}.data, {item}.fileName ? {item}.fileName : {name})"
                            )
                        } else {
                            format!("content_.append({name}, {})", form_value(item, p.item_type()))
                        }
                    };
                    let stmt = if p.is_array() {
                        TsStmt::raw(format!("{}.forEach(item_ => {});", p.ident, append("item_")))
                    } else {
                        TsStmt::raw(format!("{};", append(&p.ident)))
                    };
                    stmts.extend(guarded(p.param.required, &p.ident, vec![stmt]));
                }
                stmts
            }
        }
    }

    fn options(
        &self,
        plan: &BodyPlan,
        params: &[MethodParam<'_>],
        responses: &ResponsePlan,
        bodies: &[BranchBody],
        has_content: bool,
    ) -> TsExpr {
        let mut headers = Vec::new();
        if let Some(content_type) = plan.content_type_header() {
            headers.push(("Content-Type".to_string(), TsExpr::string(content_type)));
        }
        for p in params.iter().filter(|p| p.param.location == ParamLocation::Header) {
            headers.push((
                p.param.name.clone(),
                TsExpr::raw(format!(
                    "{0} !== undefined && {0} !== null ? {1} : \"\"",
                    p.ident,
                    string_value(&p.ident, &p.ty)
                )),
            ));
        }
        if let Some(accept) = accept_header(responses, bodies) {
            headers.push(("Accept".to_string(), TsExpr::string(accept)));
        }

        let mut entries = Vec::new();
        if has_content {
            entries.push(("body".to_string(), TsExpr::ident("content_")));
        }
        entries.push(("observe".to_string(), TsExpr::string("response")));
        entries.push(("responseType".to_string(), TsExpr::string("blob")));
        if !headers.is_empty() {
            entries.push((
                "headers".to_string(),
                TsExpr::New {
                    callee: "HttpHeaders".to_string(),
                    args: vec![TsExpr::Object(headers)],
                },
            ));
        }
        TsExpr::Object(entries)
    }

    /// `this.http.request(...)` piped into the process helper, with transport errors
    /// routed through it as well.
    fn request(&self, operation: &Operation, process_name: &str, observable: &TsType) -> TsExpr {
        let rx = self.syntax.rx;
        let process = |arg: &str| TsExpr::raw(format!("this.{process_name}({arg})"));
        let fail = |error: TsExpr| rx.throw(error).cast(TsType::Any).cast(observable.clone());
        let response_param = || vec![TsParam::new("response_", TsType::Any)];

        let request = TsExpr::ident("this.http").method(
            "request",
            vec![
                TsExpr::string(operation.method.as_str()),
                TsExpr::ident("url_"),
                TsExpr::ident("options_"),
            ],
        );
        let mapped = rx.merge_map(
            request,
            TsExpr::arrow(response_param(), vec![TsStmt::ret(process("response_"))]),
        );
        rx.catch_error(
            mapped,
            TsExpr::arrow(
                response_param(),
                vec![TsStmt::if_else(
                    TsExpr::raw("response_ instanceof HttpResponseBase"),
                    vec![TsStmt::Try {
                        body: vec![TsStmt::ret(process("response_ as any"))],
                        binding: "e".to_string(),
                        handler: vec![TsStmt::ret(fail(TsExpr::ident("e")))],
                    }],
                    vec![TsStmt::ret(fail(TsExpr::ident("response_")))],
                )],
            ),
        )
    }

    fn process_body(&self, responses: &ResponsePlan, bodies: &[BranchBody], result_ty: &TsType) -> Vec<TsStmt> {
        let rx = self.syntax.rx;
        let mut stmts = vec![
            TsStmt::raw("const status = response.status;"),
            TsStmt::raw(
                "const responseBlob =\n    response instanceof HttpResponse ? response.body :\n    (response as any).error instanceof Blob ? (response as any).error : undefined;",
            ),
            TsStmt::Blank,
            TsStmt::raw("let _headers: any = {};"),
            TsStmt::if_(
                TsExpr::raw("response.headers"),
                vec![TsStmt::For {
                    head: "let key of response.headers.keys()".to_string(),
                    body: vec![TsStmt::raw("_headers[key] = response.headers.get(key);")],
                }],
            ),
        ];

        let mut arms: Vec<(Option<String>, Vec<TsStmt>)> = responses
            .branches
            .iter()
            .zip(bodies)
            .map(|(branch, body)| (branch.predicate.condition(), self.branch(branch, body, result_ty)))
            .collect();
        let has_default = responses.has_default();
        if !has_default {
            arms.push((
                Some("status < 200 || status >= 300".to_string()),
                vec![TsStmt::ret(self.read_text(vec![TsStmt::raw(format!(
                    "return throwException({}, status, _responseText, _headers);",
                    quoted(UNEXPECTED_ERROR)
                ))]))],
            ));
        }

        let mut chain: Option<Vec<TsStmt>> = None;
        for (cond, body) in arms.into_iter().rev() {
            chain = Some(match cond {
                Some(cond) => vec![TsStmt::If {
                    cond: TsExpr::raw(cond),
                    then_body: body,
                    else_body: chain,
                }],
                None => body,
            });
        }
        stmts.extend(chain.unwrap_or_default());

        if !has_default {
            // Undeclared 2xx statuses
            stmts.push(TsStmt::ret(rx.of(TsExpr::raw("null as any"), Some(result_ty))));
        }
        stmts
    }

    fn read_text(&self, body: Vec<TsStmt>) -> TsExpr {
        self.syntax.rx.merge_map(
            TsExpr::call("blobToText", vec![TsExpr::ident("responseBlob")]),
            TsExpr::arrow(vec![TsParam::new("_responseText", TsType::String)], body),
        )
    }

    fn decode_json(&self, label: &str, ty: &TypeRef) -> Vec<TsStmt> {
        let mut stmts = vec![
            TsStmt::raw(format!("let result{label}: any = null;")),
            TsStmt::raw(format!(
                "let resultData{label} = _responseText === \"\" ? null : JSON.parse(_responseText, this.jsonParseReviver);"
            )),
        ];
        stmts.extend(decode_into(
            &format!("result{label}"),
            &format!("resultData{label}"),
            ty,
            Fallback::Result("null as any"),
            self.syntax.ts,
        ));
        stmts
    }

    fn branch(&self, branch: &ResponseBranch, body: &BranchBody, result_ty: &TsType) -> Vec<TsStmt> {
        let rx = self.syntax.rx;
        let label = branch.label();

        if branch.is_success {
            return match body {
                BranchBody::Empty => {
                    vec![TsStmt::ret(rx.of(TsExpr::raw("null as any"), Some(result_ty)))]
                }
                BranchBody::File => {
                    let file = TsExpr::Object(vec![
                        ("fileName".to_string(), TsExpr::ident("fileName")),
                        ("data".to_string(), TsExpr::raw("responseBlob as any")),
                        ("status".to_string(), TsExpr::ident("status")),
                        ("headers".to_string(), TsExpr::ident("_headers")),
                    ]);
                    vec![
                        TsStmt::raw(
                            "const contentDisposition = response.headers ? response.headers.get(\"content-disposition\") : undefined;",
                        ),
                        TsStmt::raw(
                            r#"const fileNameMatch = contentDisposition ? /filename\*?=(?:UTF-8'')?"?([^";]+)"?/i.exec(contentDisposition) : undefined;"#,
                        ),
                        TsStmt::raw(
                            "const fileName = fileNameMatch && fileNameMatch.length > 1 ? decodeURIComponent(fileNameMatch[1]) : undefined;",
                        ),
                        TsStmt::ret(rx.of(file, None)),
                    ]
                }
                BranchBody::Json(ty) => {
                    let mut inner = self.decode_json(&label, ty);
                    inner.push(TsStmt::ret(rx.of(TsExpr::ident(format!("result{label}")), None)));
                    vec![TsStmt::ret(self.read_text(inner))]
                }
            };
        }

        let message = branch
            .description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(SERVER_ERROR);
        let mut inner = Vec::new();
        let mut args = format!("{}, status, _responseText, _headers", quoted(message));
        if let BranchBody::Json(ty) = body {
            inner.extend(self.decode_json(&label, ty));
            args.push_str(&format!(", result{label}"));
        }
        inner.push(TsStmt::raw(format!("return throwException({args});")));
        vec![TsStmt::ret(self.read_text(inner))]
    }
}

/// Media type the method asks for, taken from the first success that carries a body.
fn accept_header(responses: &ResponsePlan, bodies: &[BranchBody]) -> Option<&'static str> {
    let pick = |success: bool| {
        responses
            .branches
            .iter()
            .zip(bodies)
            .filter(|(branch, _)| branch.is_success == success)
            .find_map(|(_, body)| match body {
                BranchBody::Empty => None,
                BranchBody::File => Some("application/octet-stream"),
                BranchBody::Json(_) => Some("application/json"),
            })
    };
    pick(true).or_else(|| pick(false))
}

fn method_doc(operation: &Operation, params: &[MethodParam<'_>], responses: &ResponsePlan) -> TsDoc {
    let mut lines = Vec::new();
    for text in [&operation.summary, &operation.description].into_iter().flatten() {
        lines.extend(text.lines().map(|l| l.trim_end().to_string()));
    }
    for p in params {
        let optional = if p.param.required { "" } else { "(optional) " };
        match &p.param.description {
            Some(description) => lines.push(format!("@param {} {optional}{description}", p.ident)),
            None if !p.param.required => lines.push(format!("@param {} (optional)", p.ident)),
            None => {}
        }
    }
    if let Some(description) = responses.successes().find_map(|b| b.description.as_deref()) {
        lines.push(format!("@return {description}"));
    }
    if operation.deprecated {
        lines.push("@deprecated".to_string());
    }
    TsDoc(lines)
}
