//! TypeScript code emission via the Emit trait.
//!
//! Each AST type implements `Emit`; block-level nodes also expose `emit_indented`,
//! which prints at a given nesting depth (4 spaces per level).

use super::ast::{
    ArrowBody, ClassMember, ImportItem, InterfaceMember, TsClass, TsConst, TsDoc, TsEnum,
    TsExpr, TsField, TsFunction, TsImport, TsInterface, TsItem, TsLiteral, TsMethod, TsModule,
    TsParam, TsProp, TsStmt, TsType, TsTypeAlias, VarKind,
};
use crate::utils::{escape_js_string, quote_if_needed};

const INDENT: &str = "    ";

/// Trait for emitting TypeScript code from AST nodes.
pub trait Emit {
    /// Convert the AST node to its TypeScript string representation.
    fn emit(&self) -> String;
}

fn join<T: Emit>(items: &[T], sep: &str) -> String {
    items.iter().map(Emit::emit).collect::<Vec<_>>().join(sep)
}

/// Prefix every line after the first with `prefix`, leaving empty lines empty.
fn indent_rest(text: &str, prefix: &str) -> String {
    let mut out = String::new();
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
            if !line.is_empty() {
                out.push_str(prefix);
            }
        }
        out.push_str(line);
    }
    out
}

fn emit_block(stmts: &[TsStmt], indent: usize) -> String {
    stmts.iter().map(|s| s.emit_indented(indent)).collect()
}

// =============================================================================
// Types
// =============================================================================

impl Emit for TsLiteral {
    fn emit(&self) -> String {
        match self {
            TsLiteral::String(s) => format!("\"{}\"", escape_js_string(s)),
            TsLiteral::Int(i) => i.to_string(),
            TsLiteral::Float(f) => f.to_string(),
            TsLiteral::Bool(b) => b.to_string(),
            TsLiteral::Null => "null".to_string(),
        }
    }
}

impl Emit for TsType {
    fn emit(&self) -> String {
        match self {
            TsType::Any => "any".to_string(),
            TsType::String => "string".to_string(),
            TsType::Number => "number".to_string(),
            TsType::Boolean => "boolean".to_string(),
            TsType::Void => "void".to_string(),
            TsType::Null => "null".to_string(),
            TsType::Undefined => "undefined".to_string(),
            TsType::Ref(name) => name.clone(),
            TsType::Generic { name, args } => format!("{name}<{}>", join(args, ", ")),
            TsType::Array(inner) => {
                // Wrap unions so the suffix binds to the whole union
                if matches!(**inner, TsType::Union(_)) {
                    format!("({})[]", inner.emit())
                } else {
                    format!("{}[]", inner.emit())
                }
            }
            TsType::Union(types) => join(types, " | "),
            TsType::Intersection(types) => types
                .iter()
                .map(|t| {
                    if matches!(t, TsType::Union(_)) {
                        format!("({})", t.emit())
                    } else {
                        t.emit()
                    }
                })
                .collect::<Vec<_>>()
                .join(" & "),
            TsType::Map(value) => format!("{{ [key: string]: {}; }}", value.emit()),
            TsType::Object(props) => {
                if props.is_empty() {
                    "{}".to_string()
                } else {
                    let parts: Vec<_> = props.iter().map(|p| format!("{};", p.emit())).collect();
                    format!("{{ {} }}", parts.join(" "))
                }
            }
            TsType::Literal(lit) => lit.emit(),
        }
    }
}

impl Emit for TsProp {
    fn emit(&self) -> String {
        let key = quote_if_needed(&self.name);
        let opt = if self.optional { "?" } else { "" };
        format!("{key}{opt}: {}", self.ty.emit())
    }
}

// =============================================================================
// Expressions
// =============================================================================

impl Emit for TsParam {
    fn emit(&self) -> String {
        let mut out = String::new();
        for decorator in &self.decorators {
            out.push_str(decorator);
            out.push(' ');
        }
        out.push_str(&self.name);
        if self.optional {
            out.push('?');
        }
        if let Some(ty) = &self.ty {
            out.push_str(": ");
            out.push_str(&ty.emit());
        }
        out
    }
}

impl Emit for TsExpr {
    fn emit(&self) -> String {
        match self {
            TsExpr::Ident(name) => name.clone(),
            TsExpr::Literal(lit) => lit.emit(),
            TsExpr::Call { callee, args } => format!("{}({})", callee.emit(), join(args, ", ")),
            TsExpr::Member { object, prop } => format!("{}.{prop}", object.emit()),
            TsExpr::New { callee, args } => format!("new {callee}({})", join(args, ", ")),
            TsExpr::Arrow { params, body } => {
                let head = format!("({}) =>", join(params, ", "));
                match body {
                    ArrowBody::Expr(expr) => format!("{head} {}", expr.emit()),
                    ArrowBody::Block(stmts) => format!("{head} {{\n{}}}", emit_block(stmts, 1)),
                }
            }
            TsExpr::Object(entries) => {
                if entries.is_empty() {
                    return "{}".to_string();
                }
                let lines: Vec<_> = entries
                    .iter()
                    .map(|(key, value)| {
                        let entry = format!("{}: {}", quote_if_needed(key), value.emit());
                        format!("{INDENT}{}", indent_rest(&entry, INDENT))
                    })
                    .collect();
                format!("{{\n{}\n}}", lines.join(",\n"))
            }
            TsExpr::Cast { expr, ty } => format!("{} as {}", expr.emit(), ty.emit()),
            TsExpr::Raw(code) => code.clone(),
        }
    }
}

// =============================================================================
// Statements
// =============================================================================

impl Emit for TsStmt {
    fn emit(&self) -> String {
        self.emit_indented(0)
    }
}

impl TsStmt {
    /// Emit with the given indentation level (4 spaces per level)
    pub fn emit_indented(&self, indent: usize) -> String {
        let prefix = INDENT.repeat(indent);
        match self {
            TsStmt::VarDecl {
                kind,
                name,
                ty,
                init,
            } => {
                let kw = match kind {
                    VarKind::Const => "const",
                    VarKind::Let => "let",
                };
                let ty_str = ty.as_ref().map(|t| format!(": {}", t.emit())).unwrap_or_default();
                let line = format!("{kw} {name}{ty_str} = {};", init.emit());
                format!("{prefix}{}\n", indent_rest(&line, &prefix))
            }
            TsStmt::Expr(expr) => format!("{prefix}{};\n", indent_rest(&expr.emit(), &prefix)),
            TsStmt::Return(expr) => match expr {
                Some(e) => format!("{prefix}return {};\n", indent_rest(&e.emit(), &prefix)),
                None => format!("{prefix}return;\n"),
            },
            TsStmt::If { .. } => {
                let mut out = prefix;
                self.emit_if_chain(indent, &mut out);
                out
            }
            TsStmt::For { head, body } => {
                format!("{prefix}for ({head}) {{\n{}{prefix}}}\n", emit_block(body, indent + 1))
            }
            TsStmt::Try {
                body,
                binding,
                handler,
            } => format!(
                "{prefix}try {{\n{}{prefix}}} catch ({binding}) {{\n{}{prefix}}}\n",
                emit_block(body, indent + 1),
                emit_block(handler, indent + 1)
            ),
            TsStmt::Throw(expr) => format!("{prefix}throw {};\n", indent_rest(&expr.emit(), &prefix)),
            TsStmt::Blank => "\n".to_string(),
            TsStmt::Raw(code) => code
                .lines()
                .map(|line| {
                    if line.is_empty() {
                        "\n".to_string()
                    } else {
                        format!("{prefix}{line}\n")
                    }
                })
                .collect(),
        }
    }

    /// Print an `if` whose leading indentation is already in `out`.
    fn emit_if_chain(&self, indent: usize, out: &mut String) {
        let TsStmt::If {
            cond,
            then_body,
            else_body,
        } = self
        else {
            out.push_str(self.emit_indented(indent).trim_start());
            return;
        };
        let prefix = INDENT.repeat(indent);
        out.push_str(&format!(
            "if ({}) {{\n{}{prefix}}}",
            indent_rest(&cond.emit(), &prefix),
            emit_block(then_body, indent + 1)
        ));
        match else_body.as_deref() {
            None => out.push('\n'),
            Some([nested @ TsStmt::If { .. }]) => {
                out.push_str(" else ");
                nested.emit_if_chain(indent, out);
            }
            Some(stmts) => {
                out.push_str(&format!(" else {{\n{}{prefix}}}\n", emit_block(stmts, indent + 1)));
            }
        }
    }
}

// =============================================================================
// Declarations
// =============================================================================

impl TsDoc {
    /// Print the block at `indent`, escaping comment terminators in the text.
    pub fn emit_indented(&self, indent: usize) -> String {
        if self.0.is_empty() {
            return String::new();
        }
        let prefix = INDENT.repeat(indent);
        let mut out = format!("{prefix}/**\n");
        for line in &self.0 {
            if line.is_empty() {
                out.push_str(&format!("{prefix} *\n"));
            } else {
                // A literal `*/` would close the comment early
                let line = line.replace("*/", "*\\/");
                out.push_str(&format!("{prefix} * {line}\n"));
            }
        }
        out.push_str(&format!("{prefix} */\n"));
        out
    }
}

fn export_kw(exported: bool) -> &'static str {
    if exported { "export " } else { "" }
}

fn modifiers(mods: &[&str]) -> String {
    mods.iter().map(|m| format!("{m} ")).collect()
}

impl TsField {
    fn emit_indented(&self, indent: usize) -> String {
        let marker = if self.optional {
            "?"
        } else if self.definite {
            "!"
        } else {
            ""
        };
        let init = self
            .init
            .as_ref()
            .map(|e| format!(" = {}", e.emit()))
            .unwrap_or_default();
        format!(
            "{}{}{}{marker}: {}{init};\n",
            INDENT.repeat(indent),
            modifiers(&self.modifiers),
            quote_if_needed(&self.name),
            self.ty.emit()
        )
    }
}

impl TsMethod {
    fn signature(&self) -> String {
        let ret = self
            .return_type
            .as_ref()
            .map(|t| format!(": {}", t.emit()))
            .unwrap_or_default();
        format!(
            "{}{}({}){ret}",
            modifiers(&self.modifiers),
            self.name,
            join(&self.params, ", ")
        )
    }

    /// Method with body, as a class member.
    pub fn emit_indented(&self, indent: usize) -> String {
        let prefix = INDENT.repeat(indent);
        format!(
            "{}{prefix}{} {{\n{}{prefix}}}\n",
            self.doc.emit_indented(indent),
            self.signature(),
            emit_block(&self.body, indent + 1)
        )
    }

    /// Signature only, as an interface member.
    fn emit_signature(&self, indent: usize) -> String {
        format!(
            "{}{}{};\n",
            self.doc.emit_indented(indent),
            INDENT.repeat(indent),
            self.signature()
        )
    }
}

impl Emit for TsClass {
    fn emit(&self) -> String {
        let mut out = String::new();
        for decorator in &self.decorators {
            out.push_str(decorator);
            out.push('\n');
        }
        out.push_str(&format!("{}class {}", export_kw(self.exported), self.name));
        if let Some(base) = &self.extends {
            out.push_str(&format!(" extends {base}"));
        }
        if !self.implements.is_empty() {
            out.push_str(&format!(" implements {}", self.implements.join(", ")));
        }
        out.push_str(" {\n");

        let mut prev_was_method = None;
        for member in &self.members {
            let is_method = matches!(member, ClassMember::Method(_));
            if prev_was_method.is_some_and(|prev| prev || is_method) {
                out.push('\n');
            }
            match member {
                ClassMember::Field(field) => out.push_str(&field.emit_indented(1)),
                ClassMember::IndexSignature(ty) => {
                    out.push_str(&format!("{INDENT}[key: string]: {};\n", ty.emit()));
                }
                ClassMember::Method(method) => out.push_str(&method.emit_indented(1)),
            }
            prev_was_method = Some(is_method);
        }
        out.push_str("}\n");
        out
    }
}

impl Emit for TsInterface {
    fn emit(&self) -> String {
        let mut out = format!("{}interface {}", export_kw(self.exported), self.name);
        if !self.extends.is_empty() {
            out.push_str(&format!(" extends {}", self.extends.join(", ")));
        }
        out.push_str(" {\n");
        for member in &self.members {
            match member {
                InterfaceMember::Property(prop) => {
                    out.push_str(&format!("{INDENT}{};\n", prop.emit()));
                }
                InterfaceMember::IndexSignature(ty) => {
                    out.push_str(&format!("{INDENT}[key: string]: {};\n", ty.emit()));
                }
                InterfaceMember::Method(method) => out.push_str(&method.emit_signature(1)),
            }
        }
        out.push_str("}\n");
        out
    }
}

impl Emit for TsEnum {
    fn emit(&self) -> String {
        let mut out = format!("{}enum {} {{\n", export_kw(self.exported), self.name);
        for (name, value) in &self.members {
            out.push_str(&format!("{INDENT}{} = {},\n", quote_if_needed(name), value.emit()));
        }
        out.push_str("}\n");
        out
    }
}

impl Emit for TsTypeAlias {
    fn emit(&self) -> String {
        format!("{}type {} = {};\n", export_kw(self.exported), self.name, self.ty.emit())
    }
}

impl Emit for TsConst {
    fn emit(&self) -> String {
        format!("{}const {} = {};\n", export_kw(self.exported), self.name, self.init.emit())
    }
}

impl Emit for TsFunction {
    fn emit(&self) -> String {
        let ret = self
            .return_type
            .as_ref()
            .map(|t| format!(": {}", t.emit()))
            .unwrap_or_default();
        format!(
            "{}function {}({}){ret} {{\n{}}}\n",
            export_kw(self.exported),
            self.name,
            join(&self.params, ", "),
            emit_block(&self.body, 1)
        )
    }
}

impl Emit for TsItem {
    fn emit(&self) -> String {
        match self {
            TsItem::Class(class) => class.emit(),
            TsItem::Interface(interface) => interface.emit(),
            TsItem::Enum(e) => e.emit(),
            TsItem::TypeAlias(alias) => alias.emit(),
            TsItem::Const(c) => c.emit(),
            TsItem::Function(f) => f.emit(),
        }
    }
}

// =============================================================================
// Imports & module
// =============================================================================

impl Emit for ImportItem {
    fn emit(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{} as {alias}", self.name),
            None => self.name.clone(),
        }
    }
}

impl Emit for TsImport {
    fn emit(&self) -> String {
        if self.items.is_empty() {
            format!("import '{}';\n", self.from)
        } else {
            format!("import {{ {} }} from '{}';\n", join(&self.items, ", "), self.from)
        }
    }
}

impl Emit for TsModule {
    fn emit(&self) -> String {
        let mut output = String::new();

        for line in &self.banner {
            output.push_str(line);
            output.push('\n');
        }
        if !self.banner.is_empty() {
            output.push('\n');
        }

        for import in &self.imports {
            output.push_str(&import.emit());
        }
        if !self.imports.is_empty() {
            output.push('\n');
        }

        for item in &self.items {
            output.push_str(&item.emit());
            output.push('\n');
        }

        let trimmed = output.trim_end();
        format!("{trimmed}\n")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_types() {
        assert_eq!(TsType::String.emit(), "string");
        assert_eq!(TsType::array(TsType::named("Pet")).emit(), "Pet[]");
        assert_eq!(
            TsType::array(TsType::union([TsType::String, TsType::Number])).emit(),
            "(string | number)[]"
        );
        assert_eq!(TsType::Map(Box::new(TsType::Number)).emit(), "{ [key: string]: number; }");
        assert_eq!(
            TsType::generic("Observable", TsType::Void).emit(),
            "Observable<void>"
        );
    }

    #[test]
    fn test_union_flattens_and_dedupes() {
        let ty = TsType::union([
            TsType::named("Pet"),
            TsType::union([TsType::named("Pet"), TsType::Null]),
        ]);
        assert_eq!(ty.emit(), "Pet | null");
    }

    #[test]
    fn test_emit_inline_object() {
        let ty = TsType::Object(vec![
            TsProp {
                name: "name".to_string(),
                ty: TsType::String,
                optional: false,
            },
            TsProp {
                name: "x-rate".to_string(),
                ty: TsType::Number,
                optional: true,
            },
        ]);
        assert_eq!(ty.emit(), "{ name: string; \"x-rate\"?: number; }");
    }

    #[test]
    fn test_emit_param_with_decorators() {
        let param = TsParam::new("baseUrl", TsType::String)
            .optional()
            .decorated("@Optional()")
            .decorated("@Inject(API_BASE_URL)");
        assert_eq!(param.emit(), "@Optional() @Inject(API_BASE_URL) baseUrl?: string");
    }

    #[test]
    fn test_emit_else_if_chain() {
        let stmt = TsStmt::if_else(
            TsExpr::raw("status === 200"),
            vec![TsStmt::ret(TsExpr::raw("a"))],
            vec![TsStmt::if_else(
                TsExpr::raw("status === 204"),
                vec![TsStmt::ret(TsExpr::raw("b"))],
                vec![TsStmt::ret(TsExpr::raw("c"))],
            )],
        );
        assert_eq!(
            stmt.emit_indented(1),
            "    if (status === 200) {\n        return a;\n    } else if (status === 204) {\n        return b;\n    } else {\n        return c;\n    }\n"
        );
    }

    #[test]
    fn test_emit_arrow_block_nests_indentation() {
        let stmt = TsStmt::ret(TsExpr::call(
            "map",
            vec![TsExpr::arrow(
                vec![TsParam::new("x", TsType::Any)],
                vec![TsStmt::ret(TsExpr::raw("x"))],
            )],
        ));
        assert_eq!(
            stmt.emit_indented(1),
            "    return map((x: any) => {\n        return x;\n    });\n"
        );
    }

    #[test]
    fn test_emit_object_literal() {
        let stmt = TsStmt::let_(
            "options_",
            Some(TsType::Any),
            TsExpr::Object(vec![
                ("observe".to_string(), TsExpr::string("response")),
                (
                    "headers".to_string(),
                    TsExpr::New {
                        callee: "HttpHeaders".to_string(),
                        args: vec![TsExpr::Object(vec![(
                            "Accept".to_string(),
                            TsExpr::string("application/json"),
                        )])],
                    },
                ),
            ]),
        );
        assert_eq!(
            stmt.emit_indented(1),
            "    let options_: any = {\n        observe: \"response\",\n        headers: new HttpHeaders({\n            Accept: \"application/json\"\n        })\n    };\n"
        );
    }

    #[test]
    fn test_emit_class() {
        let class = TsClass {
            exported: true,
            decorators: vec!["@Injectable()".to_string()],
            name: "PetsClient".to_string(),
            extends: None,
            implements: vec!["IPetsClient".to_string()],
            members: vec![
                ClassMember::Field(TsField {
                    modifiers: vec!["private"],
                    name: "http".to_string(),
                    optional: false,
                    definite: false,
                    ty: TsType::named("HttpClient"),
                    init: None,
                }),
                ClassMember::Method(
                    TsMethod::new("ping", Vec::new(), Some(TsType::Void))
                        .with_body(vec![TsStmt::Return(None)]),
                ),
            ],
        };
        assert_eq!(
            class.emit(),
            "@Injectable()\nexport class PetsClient implements IPetsClient {\n    private http: HttpClient;\n\n    ping(): void {\n        return;\n    }\n}\n"
        );
    }

    #[test]
    fn test_emit_enum_and_alias_without_export() {
        let e = TsEnum {
            exported: false,
            name: "Status".to_string(),
            members: vec![("Active".to_string(), TsLiteral::String("active".to_string()))],
        };
        assert_eq!(e.emit(), "enum Status {\n    Active = \"active\",\n}\n");
        let alias = TsTypeAlias {
            exported: false,
            name: "Shape".to_string(),
            ty: TsType::union([TsType::named("Circle"), TsType::named("Square")]),
        };
        assert_eq!(alias.emit(), "type Shape = Circle | Square;\n");
    }

    #[test]
    fn test_doc_escapes_comment_terminator() {
        let doc = TsDoc(vec!["Matches a/*/b paths".to_string(), String::new(), "ok".to_string()]);
        assert_eq!(
            doc.emit_indented(1),
            "    /**\n     * Matches a/*\\/b paths\n     *\n     * ok\n     */\n"
        );
    }

    #[test]
    fn test_emit_imports() {
        assert_eq!(
            TsImport::side_effect("rxjs/add/operator/catch").emit(),
            "import 'rxjs/add/operator/catch';\n"
        );
        let import = TsImport::new(
            "rxjs/operators",
            vec![ImportItem::aliased("mergeMap", "_observableMergeMap")],
        );
        assert_eq!(
            import.emit(),
            "import { mergeMap as _observableMergeMap } from 'rxjs/operators';\n"
        );
    }
}
