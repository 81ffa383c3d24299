//! Type Resolver: schema nodes → target-language type references.
//!
//! Owns the name table of the run and the generic instantiation cache. Every
//! registered declaration gets its name claimed up front, in registration order;
//! generic instances are claimed lazily the first time they are resolved, keyed by
//! (declaration, canonical argument keys), so `Base<A>` and `Base<B>` become two
//! distinct generated types while repeated uses of `Base<A>` share one.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use tracing::debug;

use crate::document::{
    Document, EnumValue, ObjectSchema, Primitive, Property, SchemaId, SchemaKind, SchemaNode,
};
use crate::emitter::syntax::TsSyntax;
use crate::error::{Error, Result};
use crate::policy::GenerationPolicy;
use crate::ts::{TsLiteral, TsProp, TsType};
use crate::utils::to_type_name;

/// Names the emitted runtime already defines or imports.
const RUNTIME_NAMES: &[&str] = &[
    "ApiException",
    "FileParameter",
    "FileResponse",
    "Observable",
    "HttpClient",
    "HttpHeaders",
    "HttpResponse",
    "HttpResponseBase",
    "Injectable",
    "Inject",
    "Optional",
    "InjectionToken",
    "Array",
    "Blob",
    "Boolean",
    "Date",
    "Error",
    "FileReader",
    "FormData",
    "Number",
    "Object",
    "Promise",
    "String",
];

/// Resolved type of a schema node.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    /// `any`
    Any,
    /// `string`
    String,
    /// `number`
    Number,
    /// `boolean`
    Boolean,
    /// Decoded into a `Date` object
    Date,
    /// Generated DTO class (including generic instances)
    Class(String),
    /// Generated enum
    Enum(String),
    /// Named union alias
    Alias(String),
    /// `T[]`
    Array(Box<TypeRef>),
    /// `{ [key: string]: T; }`
    Map(Box<TypeRef>),
    /// `A | B`
    Union(Vec<TypeRef>),
    /// Literal type of an inlined enum member
    Literal(TsLiteral),
    /// Inline structural type, with an optional index signature
    Object {
        /// Properties in declaration order
        props: Vec<InlineProp>,
        /// Value type of the index signature
        index: Option<Box<TypeRef>>,
    },
    /// `T | null`
    Nullable(Box<TypeRef>),
}

/// Property of an inline structural type.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineProp {
    /// Property name.
    pub name: String,
    /// Property type.
    pub ty: TypeRef,
    /// Emitted with `?`.
    pub optional: bool,
}

impl TypeRef {
    /// The type without a `Nullable` wrapper.
    pub fn non_null(&self) -> &TypeRef {
        match self {
            TypeRef::Nullable(inner) => inner.non_null(),
            other => other,
        }
    }

    /// Name of the generated class, if this is one.
    pub fn class_name(&self) -> Option<&str> {
        match self.non_null() {
            TypeRef::Class(name) => Some(name),
            _ => None,
        }
    }

    /// Whether decoding from raw JSON needs conversion code (classes or dates, at any depth).
    pub fn needs_conversion(&self) -> bool {
        match self.non_null() {
            TypeRef::Class(_) | TypeRef::Date => true,
            TypeRef::Array(inner) | TypeRef::Map(inner) => inner.needs_conversion(),
            _ => false,
        }
    }

    /// TypeScript type for `syntax`.
    pub fn to_ts(&self, syntax: TsSyntax) -> TsType {
        match self {
            TypeRef::Any => TsType::Any,
            TypeRef::String => TsType::String,
            TypeRef::Number => TsType::Number,
            TypeRef::Boolean => TsType::Boolean,
            TypeRef::Date => TsType::named("Date"),
            TypeRef::Class(name) | TypeRef::Enum(name) | TypeRef::Alias(name) => {
                TsType::named(name.clone())
            }
            TypeRef::Array(inner) => TsType::array(inner.to_ts(syntax)),
            TypeRef::Map(inner) => TsType::Map(Box::new(inner.to_ts(syntax))),
            TypeRef::Union(members) => TsType::union(members.iter().map(|m| m.to_ts(syntax))),
            TypeRef::Literal(lit) => TsType::Literal(lit.clone()),
            TypeRef::Object { props, index } => {
                let object = TsType::Object(
                    props
                        .iter()
                        .map(|p| TsProp {
                            name: p.name.clone(),
                            ty: if p.optional {
                                syntax.optional(p.ty.to_ts(syntax))
                            } else {
                                p.ty.to_ts(syntax)
                            },
                            optional: p.optional,
                        })
                        .collect(),
                );
                match index {
                    None => object,
                    Some(value) if props.is_empty() => TsType::Map(Box::new(value.to_ts(syntax))),
                    Some(value) => {
                        TsType::Intersection(vec![object, TsType::Map(Box::new(value.to_ts(syntax)))])
                    }
                }
            }
            TypeRef::Nullable(inner) => syntax.nullable(inner.to_ts(syntax)),
        }
    }
}

/// Allocates unique top-level names, appending a numeric suffix on collision.
#[derive(Debug, Default)]
pub struct NameTable {
    taken: HashSet<String>,
}

impl NameTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `name` as used.
    pub fn reserve(&mut self, name: impl Into<String>) {
        self.taken.insert(name.into());
    }

    /// Whether `name` is used.
    pub fn is_taken(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    /// Claim `desired`, or the first free `desired2`, `desired3`, ...
    pub fn claim(&mut self, desired: &str) -> String {
        self.claim_where(desired, |table, name| !table.is_taken(name))
    }

    /// Claim a name `X` such that both `X` and its interface `IX` are free.
    pub fn claim_with_interface(&mut self, desired: &str) -> String {
        let name = self.claim_where(desired, |table, name| {
            !table.is_taken(name) && !table.is_taken(&format!("I{name}"))
        });
        self.taken.insert(format!("I{name}"));
        name
    }

    fn claim_where(&mut self, desired: &str, free: impl Fn(&Self, &str) -> bool) -> String {
        let mut candidate = desired.to_string();
        let mut counter = 2;
        while !free(self, &candidate) {
            candidate = format!("{desired}{counter}");
            counter += 1;
        }
        self.taken.insert(candidate.clone());
        candidate
    }
}

/// A generic declaration bound to concrete arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    /// Generated class name, e.g. `GenericRequestBaseOfRequestBody`.
    pub name: String,
    /// The generic declaration.
    pub decl: SchemaId,
    /// Concrete arguments, parallel to the declaration's parameters.
    pub args: Vec<SchemaNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct InstanceKey {
    decl: SchemaId,
    args: Vec<String>,
}

/// Generic parameter name → bound argument.
pub type Env = HashMap<String, SchemaNode>;

/// Resolves schema nodes for one generation run.
#[derive(Debug)]
pub struct TypeResolver<'d> {
    document: &'d Document,
    syntax: TsSyntax,
    dto_types: bool,
    names: NameTable,
    declared: HashMap<SchemaId, String>,
    instances: IndexMap<InstanceKey, Instance>,
    /// Named schemas currently being inlined; re-entering one yields `any`.
    inlining: Vec<SchemaId>,
}

impl<'d> TypeResolver<'d> {
    /// Resolver for `document`; registered declarations are named up front.
    pub fn new(document: &'d Document, policy: &GenerationPolicy) -> Self {
        let mut names = NameTable::new();
        for name in RUNTIME_NAMES {
            names.reserve(*name);
        }
        names.reserve(policy.injection_token.clone());

        let mut declared = HashMap::new();
        if policy.generate_dto_types {
            for (id, entry) in document.schemas().iter() {
                let desired = to_type_name(&entry.key);
                let name = match &entry.node.kind {
                    SchemaKind::Object(object) if object.is_generic() => continue,
                    SchemaKind::Object(_) => names.claim_with_interface(&desired),
                    SchemaKind::Enum(_) | SchemaKind::Union(_) => names.claim(&desired),
                    _ => continue,
                };
                declared.insert(id, name);
            }
        }

        Self {
            document,
            syntax: TsSyntax::from_version(policy.typescript_version),
            dto_types: policy.generate_dto_types,
            names,
            declared,
            instances: IndexMap::new(),
            inlining: Vec::new(),
        }
    }

    /// The document being resolved.
    pub fn document(&self) -> &'d Document {
        self.document
    }

    /// Language level of the run.
    pub fn syntax(&self) -> TsSyntax {
        self.syntax
    }

    /// Whether DTO classes are emitted.
    pub fn dto_types(&self) -> bool {
        self.dto_types
    }

    /// Claim a client class name (and its interface name when `with_interface`).
    pub fn claim_client_name(&mut self, desired: &str, with_interface: bool) -> String {
        if with_interface {
            self.names.claim_with_interface(desired)
        } else {
            self.names.claim(desired)
        }
    }

    /// Generated name of a registered declaration.
    pub fn declared_name(&self, id: SchemaId) -> Option<&str> {
        self.declared.get(&id).map(String::as_str)
    }

    /// Generated class name of the registered schema `key`, if it is a DTO class.
    pub fn class_name_of(&self, key: &str) -> Option<&str> {
        let id = self.document.schemas().lookup(key)?;
        self.document.schemas().get(id).node.as_object()?;
        self.declared_name(id)
    }

    /// Instance at `index` in discovery order.
    pub fn instance(&self, index: usize) -> Option<&Instance> {
        self.instances.get_index(index).map(|(_, instance)| instance)
    }

    /// Number of generic instances discovered so far.
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Resolve a node to its target type.
    pub fn resolve(&mut self, node: &SchemaNode) -> Result<TypeRef> {
        let ty = self.resolve_kind(node)?;
        if node.nullable && self.syntax.has_null_types() && !matches!(ty, TypeRef::Nullable(_)) {
            Ok(TypeRef::Nullable(Box::new(ty)))
        } else {
            Ok(ty)
        }
    }

    fn resolve_kind(&mut self, node: &SchemaNode) -> Result<TypeRef> {
        match &node.kind {
            SchemaKind::Primitive(primitive) => Ok(self.resolve_primitive(*primitive)),
            SchemaKind::Array(item) => Ok(TypeRef::Array(Box::new(self.resolve(item)?))),
            SchemaKind::Map(value) => Ok(TypeRef::Map(Box::new(self.resolve(value)?))),
            SchemaKind::Enum(schema) => Ok(literal_union(&schema.values)),
            SchemaKind::Union(variants) => {
                let mut members = Vec::with_capacity(variants.len());
                for variant in variants {
                    let ty = self.resolve(variant)?;
                    if !members.contains(&ty) {
                        members.push(ty);
                    }
                }
                Ok(if members.len() == 1 {
                    members.remove(0)
                } else {
                    TypeRef::Union(members)
                })
            }
            SchemaKind::GenericParam { bound, .. } => match bound {
                Some(bound) => self.resolve(bound),
                None => Ok(TypeRef::Any),
            },
            SchemaKind::Object(object) => self.inline_object(object, &Env::new()),
            SchemaKind::Reference { key, args } => self.resolve_reference(key, args),
        }
    }

    fn resolve_primitive(&self, primitive: Primitive) -> TypeRef {
        match primitive {
            Primitive::String | Primitive::Binary => TypeRef::String,
            Primitive::Integer | Primitive::Number => TypeRef::Number,
            Primitive::Boolean => TypeRef::Boolean,
            Primitive::Date | Primitive::DateTime if self.dto_types => TypeRef::Date,
            Primitive::Date | Primitive::DateTime => TypeRef::String,
            Primitive::Any => TypeRef::Any,
        }
    }

    fn resolve_reference(&mut self, key: &str, args: &[SchemaNode]) -> Result<TypeRef> {
        let document = self.document;
        let id = document
            .schemas()
            .lookup(key)
            .ok_or_else(|| Error::UnresolvedSchema {
                key: key.to_string(),
            })?;
        let node = &document.schemas().get(id).node;

        match &node.kind {
            SchemaKind::Object(object) if object.is_generic() || !args.is_empty() => {
                if object.generic_params.len() != args.len() {
                    return Err(Error::GenericArity {
                        key: key.to_string(),
                        expected: object.generic_params.len(),
                        found: args.len(),
                    });
                }
                if self.dto_types {
                    Ok(TypeRef::Class(self.instantiate(id, args)?))
                } else {
                    let env = bind(object, args);
                    self.guarded(id, |this| this.inline_object(object, &env))
                }
            }
            SchemaKind::Object(object) => match self.declared.get(&id) {
                Some(name) => Ok(TypeRef::Class(name.clone())),
                None => self.guarded(id, |this| this.inline_object(object, &Env::new())),
            },
            SchemaKind::Enum(_) | SchemaKind::Union(_) => match self.declared.get(&id) {
                Some(name) if matches!(node.kind, SchemaKind::Enum(_)) => {
                    Ok(TypeRef::Enum(name.clone()))
                }
                Some(name) => Ok(TypeRef::Alias(name.clone())),
                None => self.guarded(id, |this| this.resolve(node)),
            },
            _ => self.guarded(id, |this| this.resolve(node)),
        }
    }

    /// Inline a named schema, breaking cycles with `any`.
    fn guarded(
        &mut self,
        id: SchemaId,
        resolve: impl FnOnce(&mut Self) -> Result<TypeRef>,
    ) -> Result<TypeRef> {
        if self.inlining.contains(&id) {
            return Ok(TypeRef::Any);
        }
        self.inlining.push(id);
        let result = resolve(self);
        self.inlining.pop();
        result
    }

    fn inline_object(&mut self, object: &ObjectSchema, env: &Env) -> Result<TypeRef> {
        let properties = self.flatten_properties(object, env)?;
        let mut props = Vec::with_capacity(properties.len());
        for property in properties {
            props.push(InlineProp {
                ty: self.resolve(&property.schema)?,
                name: property.name,
                optional: !property.required,
            });
        }
        let index = match &object.additional_properties {
            Some(value) => Some(Box::new(self.resolve(&substitute(value, env))?)),
            None => None,
        };
        Ok(TypeRef::Object { props, index })
    }

    /// Base properties followed by own properties, generic parameters substituted.
    /// An own property replaces a base property of the same name in place.
    pub fn flatten_properties(&self, object: &ObjectSchema, env: &Env) -> Result<Vec<Property>> {
        let mut properties = match self.base_of(object, env)? {
            Some((base, base_env)) => self.flatten_properties(base, &base_env)?,
            None => Vec::new(),
        };
        for own in &object.properties {
            let own = Property {
                name: own.name.clone(),
                schema: substitute(&own.schema, env),
                required: own.required,
            };
            match properties.iter_mut().find(|p| p.name == own.name) {
                Some(existing) => *existing = own,
                None => properties.push(own),
            }
        }
        Ok(properties)
    }

    /// The base object of `object` together with the environment its parameters bind to.
    fn base_of(&self, object: &ObjectSchema, env: &Env) -> Result<Option<(&'d ObjectSchema, Env)>> {
        let Some(base) = object.base.as_deref() else {
            return Ok(None);
        };
        let SchemaKind::Reference { key, args } = &substitute(base, env).kind else {
            return Ok(None);
        };
        let document = self.document;
        let id = document
            .schemas()
            .lookup(key)
            .ok_or_else(|| Error::UnresolvedSchema { key: key.clone() })?;
        Ok(document
            .schemas()
            .get(id)
            .node
            .as_object()
            .map(|base| (base, bind(base, args))))
    }

    /// The declaration of `instance` with its generic parameters bound to the arguments.
    pub fn specialize(&self, instance: &Instance) -> Option<ObjectSchema> {
        let object = self.document.schemas().get(instance.decl).node.as_object()?;
        let env = bind(object, &instance.args);
        Some(ObjectSchema {
            properties: object
                .properties
                .iter()
                .map(|p| Property {
                    name: p.name.clone(),
                    schema: substitute(&p.schema, &env),
                    required: p.required,
                })
                .collect(),
            base: object
                .base
                .as_deref()
                .map(|base| Box::new(substitute(base, &env))),
            generic_params: Vec::new(),
            additional_properties: object
                .additional_properties
                .as_deref()
                .map(|value| Box::new(substitute(value, &env))),
            discriminator: object.discriminator.clone(),
        })
    }

    fn instantiate(&mut self, decl: SchemaId, args: &[SchemaNode]) -> Result<String> {
        let key = InstanceKey {
            decl,
            args: args.iter().map(canonical_key).collect(),
        };
        if let Some(instance) = self.instances.get(&key) {
            return Ok(instance.name.clone());
        }

        let decl_key = &self.document.schemas().get(decl).key;
        let desired = format!(
            "{}Of{}",
            to_type_name(decl_key),
            args.iter().map(arg_name).collect::<Vec<_>>().join("And")
        );
        let name = self.names.claim_with_interface(&desired);
        debug!(declaration = %decl_key, instance = %name, "Instantiated generic schema");
        self.instances.insert(
            key,
            Instance {
                name: name.clone(),
                decl,
                args: args.to_vec(),
            },
        );

        // Arguments that are themselves instances are discovered before their users' bodies
        for arg in args {
            self.resolve(arg)?;
        }
        Ok(name)
    }
}

/// Bind an object's generic parameters to `args` positionally.
fn bind(object: &ObjectSchema, args: &[SchemaNode]) -> Env {
    object
        .generic_params
        .iter()
        .cloned()
        .zip(args.iter().cloned())
        .collect()
}

/// Replace generic parameters bound in `env`, keeping the outer nullability.
pub fn substitute(node: &SchemaNode, env: &Env) -> SchemaNode {
    if env.is_empty() {
        return node.clone();
    }
    let kind = match &node.kind {
        SchemaKind::GenericParam { name, .. } => {
            if let Some(arg) = env.get(name) {
                let mut bound = arg.clone();
                bound.nullable |= node.nullable;
                return bound;
            }
            node.kind.clone()
        }
        SchemaKind::Array(item) => SchemaKind::Array(Box::new(substitute(item, env))),
        SchemaKind::Map(value) => SchemaKind::Map(Box::new(substitute(value, env))),
        SchemaKind::Union(variants) => {
            SchemaKind::Union(variants.iter().map(|v| substitute(v, env)).collect())
        }
        SchemaKind::Reference { key, args } => SchemaKind::Reference {
            key: key.clone(),
            args: args.iter().map(|a| substitute(a, env)).collect(),
        },
        SchemaKind::Object(object) => {
            let mut object = object.clone();
            for property in &mut object.properties {
                property.schema = substitute(&property.schema, env);
            }
            object.base = object.base.map(|base| Box::new(substitute(&base, env)));
            object.additional_properties = object
                .additional_properties
                .map(|value| Box::new(substitute(&value, env)));
            SchemaKind::Object(object)
        }
        SchemaKind::Primitive(_) | SchemaKind::Enum(_) => node.kind.clone(),
    };
    SchemaNode {
        kind,
        nullable: node.nullable,
        description: node.description.clone(),
    }
}

/// Stable identity of a generic argument, used as part of the instance cache key.
fn canonical_key(node: &SchemaNode) -> String {
    let base = match &node.kind {
        SchemaKind::Primitive(primitive) => format!("{primitive:?}").to_lowercase(),
        SchemaKind::Reference { key, args } if args.is_empty() => key.clone(),
        SchemaKind::Reference { key, args } => format!(
            "{key}<{}>",
            args.iter().map(canonical_key).collect::<Vec<_>>().join(",")
        ),
        SchemaKind::Array(item) => format!("[{}]", canonical_key(item)),
        SchemaKind::Map(value) => format!("{{{}}}", canonical_key(value)),
        SchemaKind::Union(variants) => format!(
            "({})",
            variants.iter().map(canonical_key).collect::<Vec<_>>().join("|")
        ),
        SchemaKind::Enum(schema) => format!(
            "enum({})",
            schema
                .values
                .iter()
                .map(|v| format!("{v:?}"))
                .collect::<Vec<_>>()
                .join(",")
        ),
        SchemaKind::GenericParam { name, .. } => format!("${name}"),
        SchemaKind::Object(object) => format!(
            "object{{{}}}",
            object
                .properties
                .iter()
                .map(|p| format!("{}:{}", p.name, canonical_key(&p.schema)))
                .collect::<Vec<_>>()
                .join(";")
        ),
    };
    if node.nullable { format!("{base}?") } else { base }
}

/// Readable name fragment of a generic argument.
fn arg_name(node: &SchemaNode) -> String {
    match &node.kind {
        SchemaKind::Primitive(primitive) => match primitive {
            Primitive::String => "String",
            Primitive::Integer | Primitive::Number => "Number",
            Primitive::Boolean => "Boolean",
            Primitive::Date | Primitive::DateTime => "Date",
            Primitive::Binary => "File",
            Primitive::Any => "Object",
        }
        .to_string(),
        SchemaKind::Reference { key, args } if args.is_empty() => to_type_name(key),
        SchemaKind::Reference { key, args } => format!(
            "{}Of{}",
            to_type_name(key),
            args.iter().map(arg_name).collect::<Vec<_>>().join("And")
        ),
        SchemaKind::Array(item) => format!("{}Array", arg_name(item)),
        SchemaKind::Map(value) => format!("{}Dictionary", arg_name(value)),
        SchemaKind::Union(variants) => variants.iter().map(arg_name).collect::<Vec<_>>().join("Or"),
        SchemaKind::Enum(_) => "Enum".to_string(),
        SchemaKind::GenericParam { name, .. } => to_type_name(name),
        SchemaKind::Object(_) => "Object".to_string(),
    }
}

fn literal_union(values: &[EnumValue]) -> TypeRef {
    let members: Vec<TypeRef> = values
        .iter()
        .map(|value| TypeRef::Literal(enum_literal(value)))
        .collect();
    match members.len() {
        0 => TypeRef::Any,
        1 => members.into_iter().next().unwrap_or(TypeRef::Any),
        _ => TypeRef::Union(members),
    }
}

pub(crate) fn enum_literal(value: &EnumValue) -> TsLiteral {
    match value {
        EnumValue::String(s) => TsLiteral::String(s.clone()),
        EnumValue::Integer(i) => TsLiteral::Int(*i),
        EnumValue::Float(f) => TsLiteral::Float(*f),
        EnumValue::Bool(b) => TsLiteral::Bool(*b),
    }
}
