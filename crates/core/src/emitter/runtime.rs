//! Runtime helpers emitted after the DTOs: file wrappers, `ApiException`,
//! `throwException` and `blobToText`.

use crate::emitter::syntax::Syntax;
use crate::ts::{
    ClassMember, InterfaceMember, TsClass, TsConst, TsExpr, TsField, TsFunction, TsInterface,
    TsItem, TsMethod, TsParam, TsProp, TsStmt, TsType,
};

/// Which optional helpers the clients reference.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct RuntimeNeeds {
    pub file_parameter: bool,
    pub file_response: bool,
}

fn headers_type() -> TsType {
    TsType::Map(Box::new(TsType::Any))
}

/// `const API_BASE_URL = new InjectionToken<string>('API_BASE_URL');`
pub(crate) fn injection_token(name: &str, exported: bool) -> TsItem {
    TsItem::Const(TsConst {
        exported,
        name: name.to_string(),
        init: TsExpr::raw(format!("new InjectionToken<string>('{name}')")),
    })
}

pub(crate) fn helpers(syntax: Syntax, needs: RuntimeNeeds, exported: bool) -> Vec<TsItem> {
    let mut items = Vec::new();
    if needs.file_parameter {
        items.push(TsItem::Interface(TsInterface {
            exported,
            name: "FileParameter".to_string(),
            extends: Vec::new(),
            members: vec![
                InterfaceMember::Property(TsProp {
                    name: "data".to_string(),
                    ty: TsType::Any,
                    optional: false,
                }),
                InterfaceMember::Property(TsProp {
                    name: "fileName".to_string(),
                    ty: TsType::String,
                    optional: false,
                }),
            ],
        }));
    }
    if needs.file_response {
        items.push(TsItem::Interface(TsInterface {
            exported,
            name: "FileResponse".to_string(),
            extends: Vec::new(),
            members: vec![
                InterfaceMember::Property(TsProp {
                    name: "data".to_string(),
                    ty: TsType::named("Blob"),
                    optional: false,
                }),
                InterfaceMember::Property(TsProp {
                    name: "status".to_string(),
                    ty: TsType::Number,
                    optional: false,
                }),
                InterfaceMember::Property(TsProp {
                    name: "fileName".to_string(),
                    ty: TsType::String,
                    optional: true,
                }),
                InterfaceMember::Property(TsProp {
                    name: "headers".to_string(),
                    ty: headers_type(),
                    optional: true,
                }),
            ],
        }));
    }
    items.push(TsItem::Class(api_exception(exported)));
    items.push(TsItem::Function(throw_exception(syntax)));
    items.push(TsItem::Function(blob_to_text()));
    items
}

fn api_exception(exported: bool) -> TsClass {
    let field = |name: &str, ty: TsType| {
        ClassMember::Field(TsField {
            modifiers: Vec::new(),
            name: name.to_string(),
            optional: false,
            definite: false,
            ty,
            init: None,
        })
    };

    let constructor = TsMethod::new(
        "constructor",
        vec![
            TsParam::new("message", TsType::String),
            TsParam::new("status", TsType::Number),
            TsParam::new("response", TsType::String),
            TsParam::new("headers", headers_type()),
            TsParam::new("result", TsType::Any),
        ],
        None,
    )
    .with_body(vec![
        TsStmt::raw("super();"),
        TsStmt::Blank,
        TsStmt::raw("this.message = message;"),
        TsStmt::raw("this.status = status;"),
        TsStmt::raw("this.response = response;"),
        TsStmt::raw("this.headers = headers;"),
        TsStmt::raw("this.result = result;"),
    ]);

    let is_api_exception = TsMethod::new(
        "isApiException",
        vec![TsParam::new("obj", TsType::Any)],
        Some(TsType::named("obj is ApiException")),
    )
    .with_modifier("static")
    .with_body(vec![TsStmt::raw("return obj.isApiException === true;")]);

    TsClass {
        exported,
        decorators: Vec::new(),
        name: "ApiException".to_string(),
        extends: Some("Error".to_string()),
        implements: Vec::new(),
        members: vec![
            field("message", TsType::String),
            field("status", TsType::Number),
            field("response", TsType::String),
            field("headers", headers_type()),
            field("result", TsType::Any),
            ClassMember::Method(constructor),
            ClassMember::Field(TsField {
                modifiers: vec!["protected"],
                name: "isApiException".to_string(),
                optional: false,
                definite: false,
                ty: TsType::Boolean,
                init: Some(TsExpr::ident("true")),
            }),
            ClassMember::Method(is_api_exception),
        ],
    }
}

/// Rejects with the decoded error body when there is one, else with an `ApiException`.
fn throw_exception(syntax: Syntax) -> TsFunction {
    let rx = syntax.rx;
    let exception = TsExpr::New {
        callee: "ApiException".to_string(),
        args: ["message", "status", "response", "headers", "null"]
            .into_iter()
            .map(TsExpr::ident)
            .collect(),
    };
    TsFunction {
        exported: false,
        name: "throwException".to_string(),
        params: vec![
            TsParam::new("message", TsType::String),
            TsParam::new("status", TsType::Number),
            TsParam::new("response", TsType::String),
            TsParam::new("headers", headers_type()),
            TsParam::new("result", TsType::Any).optional(),
        ],
        return_type: Some(TsType::generic("Observable", TsType::Any)),
        body: vec![TsStmt::if_else(
            TsExpr::raw("result !== null && result !== undefined"),
            vec![TsStmt::ret(rx.throw(TsExpr::ident("result")))],
            vec![TsStmt::ret(rx.throw(exception))],
        )],
    }
}

fn blob_to_text() -> TsFunction {
    TsFunction {
        exported: false,
        name: "blobToText".to_string(),
        params: vec![TsParam::new("blob", TsType::Any)],
        return_type: Some(TsType::generic("Observable", TsType::String)),
        body: vec![TsStmt::ret(TsExpr::New {
            callee: "Observable<string>".to_string(),
            args: vec![TsExpr::arrow(
                vec![TsParam::new("observer", TsType::Any)],
                vec![TsStmt::if_else(
                    TsExpr::raw("!blob"),
                    vec![
                        TsStmt::raw("observer.next(\"\");"),
                        TsStmt::raw("observer.complete();"),
                    ],
                    vec![
                        TsStmt::raw("let reader = new FileReader();"),
                        TsStmt::raw(
                            "reader.onload = event => {\n    observer.next((event.target as any).result);\n    observer.complete();\n};",
                        ),
                        TsStmt::raw("reader.readAsText(blob);"),
                    ],
                )],
            )],
        })],
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::emitter::syntax::{RxFlavor, TsSyntax};
    use crate::ts::Emit;

    fn syntax(rx: RxFlavor) -> Syntax {
        Syntax {
            ts: TsSyntax::DefiniteAssignment,
            rx,
        }
    }

    #[test]
    fn test_optional_helpers_only_when_needed() {
        let items = helpers(syntax(RxFlavor::Pipeable), RuntimeNeeds::default(), true);
        let out: String = items.iter().map(Emit::emit).collect();
        assert!(!out.contains("FileParameter"));
        assert!(!out.contains("FileResponse"));
        assert!(out.contains("export class ApiException extends Error {"));
        assert!(out.contains("function blobToText(blob: any): Observable<string> {"));

        let needs = RuntimeNeeds {
            file_parameter: true,
            file_response: true,
        };
        let out: String = helpers(syntax(RxFlavor::Pipeable), needs, false)
            .iter()
            .map(Emit::emit)
            .collect();
        assert!(out.contains("interface FileParameter {\n    data: any;\n    fileName: string;\n}"));
        assert!(out.contains("    headers?: { [key: string]: any; };"));
        assert!(!out.contains("export "));
    }

    #[test]
    fn test_throw_exception_follows_rx_flavor() {
        let pipeable = throw_exception(syntax(RxFlavor::Pipeable)).emit();
        assert!(pipeable.contains("return _observableThrow(result);"));
        let factory = throw_exception(syntax(RxFlavor::PipeableThrowFactory)).emit();
        assert!(factory.contains("return _observableThrow(() => result);"));
        assert!(factory.contains(
            "return _observableThrow(() => new ApiException(message, status, response, headers, null));"
        ));
        let patch = throw_exception(syntax(RxFlavor::PrototypePatch)).emit();
        assert!(patch.contains("return Observable.throw(result);"));
    }

    #[test]
    fn test_injection_token() {
        assert_eq!(
            injection_token("API_BASE_URL", true).emit(),
            "export const API_BASE_URL = new InjectionToken<string>('API_BASE_URL');\n"
        );
    }
}
