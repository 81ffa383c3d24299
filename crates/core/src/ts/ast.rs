//! TypeScript AST for the emitted client module.
//!
//! - `TsType`: type annotations (primitives, references, unions, inline objects)
//! - `TsExpr` / `TsStmt`: expressions and statements of method bodies
//! - `TsItem`: top-level declarations (classes, interfaces, enums, aliases, functions)

/// TypeScript type annotation
#[derive(Debug, Clone, PartialEq)]
pub enum TsType {
    /// `any`
    Any,
    /// `string`
    String,
    /// `number`
    Number,
    /// `boolean`
    Boolean,
    /// `void`
    Void,
    /// `null`
    Null,
    /// `undefined`
    Undefined,
    /// Named type reference: `Pet`, `Blob`
    Ref(String),
    /// Generic reference: `Observable<Pet>`
    Generic {
        /// Generic type name
        name: String,
        /// Type arguments
        args: Vec<TsType>,
    },
    /// `T[]`
    Array(Box<TsType>),
    /// `A | B | C`
    Union(Vec<TsType>),
    /// `{ [key: string]: T; }`
    Map(Box<TsType>),
    /// Inline structural type: `{ name: string; age?: number; }`
    Object(Vec<TsProp>),
    /// `A & B`
    Intersection(Vec<TsType>),
    /// Literal type: `"active"`, `42`
    Literal(TsLiteral),
}

impl TsType {
    /// Named type reference.
    pub fn named(name: impl Into<String>) -> Self {
        TsType::Ref(name.into())
    }

    /// Generic reference with a single argument.
    pub fn generic(name: impl Into<String>, arg: TsType) -> Self {
        TsType::Generic {
            name: name.into(),
            args: vec![arg],
        }
    }

    /// `T[]`
    pub fn array(inner: TsType) -> Self {
        TsType::Array(Box::new(inner))
    }

    /// Union that flattens nested unions and drops duplicate members.
    pub fn union(members: impl IntoIterator<Item = TsType>) -> Self {
        let mut flat: Vec<TsType> = Vec::new();
        for member in members {
            let parts = match member {
                TsType::Union(inner) => inner,
                other => vec![other],
            };
            for part in parts {
                if !flat.contains(&part) {
                    flat.push(part);
                }
            }
        }
        if flat.len() == 1 {
            flat.remove(0)
        } else {
            TsType::Union(flat)
        }
    }
}

/// Property of an inline object type or interface
#[derive(Debug, Clone, PartialEq)]
pub struct TsProp {
    /// Property name.
    pub name: String,
    /// Property type.
    pub ty: TsType,
    /// Printed with `?`.
    pub optional: bool,
}

/// TypeScript literal values
#[derive(Debug, Clone, PartialEq)]
pub enum TsLiteral {
    /// Quoted string
    String(String),
    /// Integer
    Int(i64),
    /// Non-integral number
    Float(f64),
    /// `true` / `false`
    Bool(bool),
    /// `null`
    Null,
}

/// TypeScript expression
#[derive(Debug, Clone, PartialEq)]
pub enum TsExpr {
    /// Identifier or dotted path: `url_`, `this.http`
    Ident(String),
    /// Literal value
    Literal(TsLiteral),
    /// Function call: `foo(a, b)`
    Call {
        /// Called expression
        callee: Box<TsExpr>,
        /// Arguments
        args: Vec<TsExpr>,
    },
    /// Member access: `foo.bar`
    Member {
        /// Accessed object
        object: Box<TsExpr>,
        /// Property name
        prop: String,
    },
    /// `new Foo(a)`
    New {
        /// Constructed class
        callee: String,
        /// Constructor arguments
        args: Vec<TsExpr>,
    },
    /// Arrow function: `(x: T) => expr` or `(x: T) => { ... }`
    Arrow {
        /// Parameters
        params: Vec<TsParam>,
        /// Expression or block body
        body: ArrowBody,
    },
    /// Object literal, printed one entry per line
    Object(Vec<(String, TsExpr)>),
    /// `expr as T`
    Cast {
        /// Converted expression
        expr: Box<TsExpr>,
        /// Target type
        ty: TsType,
    },
    /// Raw code that doesn't fit the AST
    Raw(String),
}

impl TsExpr {
    /// Identifier.
    pub fn ident(name: impl Into<String>) -> Self {
        TsExpr::Ident(name.into())
    }

    /// Raw code.
    pub fn raw(code: impl Into<String>) -> Self {
        TsExpr::Raw(code.into())
    }

    /// String literal.
    pub fn string(value: impl Into<String>) -> Self {
        TsExpr::Literal(TsLiteral::String(value.into()))
    }

    /// Call of a named function.
    pub fn call(callee: impl Into<String>, args: Vec<TsExpr>) -> Self {
        TsExpr::Call {
            callee: Box::new(TsExpr::Ident(callee.into())),
            args,
        }
    }

    /// `self.method(args)`
    pub fn method(self, name: impl Into<String>, args: Vec<TsExpr>) -> Self {
        TsExpr::Call {
            callee: Box::new(TsExpr::Member {
                object: Box::new(self),
                prop: name.into(),
            }),
            args,
        }
    }

    /// `expr as ty`
    pub fn cast(self, ty: TsType) -> Self {
        TsExpr::Cast {
            expr: Box::new(self),
            ty,
        }
    }

    /// Arrow function with a block body.
    pub fn arrow(params: Vec<TsParam>, body: Vec<TsStmt>) -> Self {
        TsExpr::Arrow {
            params,
            body: ArrowBody::Block(body),
        }
    }
}

/// Body of an arrow function
#[derive(Debug, Clone, PartialEq)]
pub enum ArrowBody {
    /// `=> expr`
    Expr(Box<TsExpr>),
    /// `=> { ... }`
    Block(Vec<TsStmt>),
}

/// Function or constructor parameter
#[derive(Debug, Clone, PartialEq)]
pub struct TsParam {
    /// Parameter decorators: `@Optional()`, `@Inject(API_BASE_URL)`
    pub decorators: Vec<String>,
    /// Parameter name.
    pub name: String,
    /// Type annotation; omitted when `None`.
    pub ty: Option<TsType>,
    /// Printed with `?`.
    pub optional: bool,
}

impl TsParam {
    /// Required, undecorated parameter.
    pub fn new(name: impl Into<String>, ty: TsType) -> Self {
        Self {
            decorators: Vec::new(),
            name: name.into(),
            ty: Some(ty),
            optional: false,
        }
    }

    /// Mark the parameter optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Add a decorator.
    pub fn decorated(mut self, decorator: impl Into<String>) -> Self {
        self.decorators.push(decorator.into());
        self
    }
}

/// Variable declaration kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    /// `const`
    Const,
    /// `let`
    Let,
}

/// Statement in a function body
#[derive(Debug, Clone, PartialEq)]
pub enum TsStmt {
    /// const/let declaration
    VarDecl {
        /// `const` or `let`
        kind: VarKind,
        /// Variable name
        name: String,
        /// Type annotation
        ty: Option<TsType>,
        /// Initializer
        init: TsExpr,
    },
    /// Expression statement
    Expr(TsExpr),
    /// Return statement
    Return(Option<TsExpr>),
    /// If statement; an `else_body` holding a single `If` prints as `else if`
    If {
        /// Condition
        cond: TsExpr,
        /// Statements when the condition holds
        then_body: Vec<TsStmt>,
        /// Statements otherwise
        else_body: Option<Vec<TsStmt>>,
    },
    /// `for (head) { ... }`
    For {
        /// Loop header between the parentheses
        head: String,
        /// Loop body
        body: Vec<TsStmt>,
    },
    /// `try { ... } catch (binding) { ... }`
    Try {
        /// Guarded statements
        body: Vec<TsStmt>,
        /// Name bound to the caught error
        binding: String,
        /// Handler statements
        handler: Vec<TsStmt>,
    },
    /// `throw expr;`
    Throw(TsExpr),
    /// Empty line
    Blank,
    /// Raw code block (for patterns that don't fit the AST)
    Raw(String),
}

impl TsStmt {
    /// Raw code statement.
    pub fn raw(code: impl Into<String>) -> Self {
        TsStmt::Raw(code.into())
    }

    /// `let name: ty = init;`
    pub fn let_(name: impl Into<String>, ty: Option<TsType>, init: TsExpr) -> Self {
        TsStmt::VarDecl {
            kind: VarKind::Let,
            name: name.into(),
            ty,
            init,
        }
    }

    /// `const name: ty = init;`
    pub fn const_(name: impl Into<String>, ty: Option<TsType>, init: TsExpr) -> Self {
        TsStmt::VarDecl {
            kind: VarKind::Const,
            name: name.into(),
            ty,
            init,
        }
    }

    /// `return expr;`
    pub fn ret(expr: TsExpr) -> Self {
        TsStmt::Return(Some(expr))
    }

    /// `if` without `else`.
    pub fn if_(cond: TsExpr, then_body: Vec<TsStmt>) -> Self {
        TsStmt::If {
            cond,
            then_body,
            else_body: None,
        }
    }

    /// `if` with an `else` block.
    pub fn if_else(cond: TsExpr, then_body: Vec<TsStmt>, else_body: Vec<TsStmt>) -> Self {
        TsStmt::If {
            cond,
            then_body,
            else_body: Some(else_body),
        }
    }
}

/// JSDoc block: one entry per line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TsDoc(pub Vec<String>);

impl TsDoc {
    /// Whether the block has no lines.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Import statement
#[derive(Debug, Clone, PartialEq)]
pub struct TsImport {
    /// Items to import; empty for a side-effect import
    pub items: Vec<ImportItem>,
    /// Module specifier.
    pub from: String,
}

impl TsImport {
    /// Named imports from `from`.
    pub fn new(from: impl Into<String>, items: Vec<ImportItem>) -> Self {
        Self {
            items,
            from: from.into(),
        }
    }

    /// `import 'rxjs/add/operator/catch';`
    pub fn side_effect(from: impl Into<String>) -> Self {
        Self::new(from, Vec::new())
    }
}

/// Import item
#[derive(Debug, Clone, PartialEq)]
pub struct ImportItem {
    /// Exported name.
    pub name: String,
    /// Local alias (`name as alias`).
    pub alias: Option<String>,
}

impl ImportItem {
    /// `import { name }`
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }

    /// `import { name as alias }`
    pub fn aliased(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: Some(alias.into()),
        }
    }
}

/// Class field
#[derive(Debug, Clone, PartialEq)]
pub struct TsField {
    /// `private`, `protected`, `static`
    pub modifiers: Vec<&'static str>,
    /// Field name.
    pub name: String,
    /// `name?: T`
    pub optional: bool,
    /// `name!: T`
    pub definite: bool,
    /// Field type.
    pub ty: TsType,
    /// Initializer.
    pub init: Option<TsExpr>,
}

/// Class method, constructor (named `constructor`) or interface method signature
#[derive(Debug, Clone, PartialEq)]
pub struct TsMethod {
    /// JSDoc printed above the method.
    pub doc: TsDoc,
    /// `public`, `protected`, `static`, ...
    pub modifiers: Vec<&'static str>,
    /// Method name.
    pub name: String,
    /// Parameters.
    pub params: Vec<TsParam>,
    /// Return type annotation.
    pub return_type: Option<TsType>,
    /// Statements of the body.
    pub body: Vec<TsStmt>,
}

impl TsMethod {
    /// Method without modifiers or body.
    pub fn new(name: impl Into<String>, params: Vec<TsParam>, return_type: Option<TsType>) -> Self {
        Self {
            doc: TsDoc::default(),
            modifiers: Vec::new(),
            name: name.into(),
            params,
            return_type,
            body: Vec::new(),
        }
    }

    /// Set the body.
    pub fn with_body(mut self, body: Vec<TsStmt>) -> Self {
        self.body = body;
        self
    }

    /// Add a modifier.
    pub fn with_modifier(mut self, modifier: &'static str) -> Self {
        self.modifiers.push(modifier);
        self
    }
}

/// Class member
#[derive(Debug, Clone, PartialEq)]
pub enum ClassMember {
    /// Field declaration
    Field(TsField),
    /// `[key: string]: T;`
    IndexSignature(TsType),
    /// Method or constructor
    Method(TsMethod),
}

/// Class declaration
#[derive(Debug, Clone, PartialEq)]
pub struct TsClass {
    /// Prefix with `export`.
    pub exported: bool,
    /// Decorators, e.g. `@Injectable()`.
    pub decorators: Vec<String>,
    /// Class name.
    pub name: String,
    /// Base class.
    pub extends: Option<String>,
    /// Implemented interfaces.
    pub implements: Vec<String>,
    /// Members in print order.
    pub members: Vec<ClassMember>,
}

/// Interface member
#[derive(Debug, Clone, PartialEq)]
pub enum InterfaceMember {
    /// Property signature
    Property(TsProp),
    /// `[key: string]: T;`
    IndexSignature(TsType),
    /// Method signature (body ignored)
    Method(TsMethod),
}

/// Interface declaration
#[derive(Debug, Clone, PartialEq)]
pub struct TsInterface {
    /// Prefix with `export`.
    pub exported: bool,
    /// Interface name.
    pub name: String,
    /// Extended interfaces.
    pub extends: Vec<String>,
    /// Members in print order.
    pub members: Vec<InterfaceMember>,
}

/// `enum Name { A = "a", B = 1 }`
#[derive(Debug, Clone, PartialEq)]
pub struct TsEnum {
    /// Prefix with `export`.
    pub exported: bool,
    /// Enum name.
    pub name: String,
    /// Member names and values.
    pub members: Vec<(String, TsLiteral)>,
}

/// `type Name = ...;`
#[derive(Debug, Clone, PartialEq)]
pub struct TsTypeAlias {
    /// Prefix with `export`.
    pub exported: bool,
    /// Alias name.
    pub name: String,
    /// Aliased type.
    pub ty: TsType,
}

/// `const Name = init;`
#[derive(Debug, Clone, PartialEq)]
pub struct TsConst {
    /// Prefix with `export`.
    pub exported: bool,
    /// Constant name.
    pub name: String,
    /// Initializer.
    pub init: TsExpr,
}

/// Top-level function
#[derive(Debug, Clone, PartialEq)]
pub struct TsFunction {
    /// Prefix with `export`.
    pub exported: bool,
    /// Function name.
    pub name: String,
    /// Parameters.
    pub params: Vec<TsParam>,
    /// Return type annotation.
    pub return_type: Option<TsType>,
    /// Statements of the body.
    pub body: Vec<TsStmt>,
}

/// Top-level declaration
#[derive(Debug, Clone, PartialEq)]
pub enum TsItem {
    /// `class`
    Class(TsClass),
    /// `interface`
    Interface(TsInterface),
    /// `enum`
    Enum(TsEnum),
    /// `type`
    TypeAlias(TsTypeAlias),
    /// `const`
    Const(TsConst),
    /// `function`
    Function(TsFunction),
}

/// Complete TypeScript module
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TsModule {
    /// Leading comment lines
    pub banner: Vec<String>,
    /// Import declarations.
    pub imports: Vec<TsImport>,
    /// Top-level declarations.
    pub items: Vec<TsItem>,
}
