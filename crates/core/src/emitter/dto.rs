//! DTO declarations: classes with their `I<Name>` interfaces, enums and union aliases.
//!
//! Also holds the JSON conversion helpers shared with the client emitter, which decode
//! raw response data with the same rules DTO `init` methods use.

use std::collections::{HashMap, HashSet};

use crate::document::{
    Discriminator, Document, EnumSchema, EnumValue, ObjectSchema, SchemaKind, SchemaNode,
};
use crate::emitter::syntax::TsSyntax;
use crate::error::Result;
use crate::resolve::types::enum_literal;
use crate::resolve::{TypeRef, TypeResolver};
use crate::ts::{
    ClassMember, Emit, InterfaceMember, TsClass, TsEnum, TsExpr, TsField, TsInterface, TsItem,
    TsLiteral, TsMethod, TsParam, TsProp, TsStmt, TsType, TsTypeAlias,
};
use crate::utils::{format_key_access, format_property_access, to_type_name};

/// What a decoded value falls back to when the raw value is missing.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Fallback<'a> {
    /// DTO property: plain values are copied as-is, class and date values fall back to
    /// the given expression.
    Property(&'a str),
    /// Response result: every shape falls back to the given expression.
    Result(&'a str),
}

/// Expression converting one raw JSON value into `ty`.
fn decode_expr(src: &str, ty: &TypeRef) -> String {
    match ty.non_null() {
        TypeRef::Class(name) => format!("{name}.fromJS({src})"),
        TypeRef::Date => format!("new Date({src}.toString())"),
        _ => src.to_string(),
    }
}

/// Statements assigning the decoded form of the raw value `src` to `target`.
pub(crate) fn decode_into(
    target: &str,
    src: &str,
    ty: &TypeRef,
    fallback: Fallback<'_>,
    syntax: TsSyntax,
) -> Vec<TsStmt> {
    let (value_fallback, strict) = match fallback {
        Fallback::Property(value) => (value, false),
        Fallback::Result(value) => (value, true),
    };
    let otherwise = |cond: String, body: Vec<TsStmt>| {
        if strict {
            TsStmt::if_else(
                TsExpr::raw(cond),
                body,
                vec![TsStmt::raw(format!("{target} = {value_fallback};"))],
            )
        } else {
            TsStmt::if_(TsExpr::raw(cond), body)
        }
    };

    match ty.non_null() {
        TypeRef::Class(_) | TypeRef::Date => vec![TsStmt::raw(format!(
            "{target} = {src} ? {} : {value_fallback};",
            decode_expr(src, ty)
        ))],
        TypeRef::Array(item) => vec![otherwise(
            format!("Array.isArray({src})"),
            vec![
                TsStmt::raw(format!("{target} = [] as any;")),
                TsStmt::For {
                    head: format!("let item of {src}"),
                    body: vec![TsStmt::raw(format!(
                        "{target}{}.push({});",
                        syntax.non_null(),
                        decode_expr("item", item)
                    ))],
                },
            ],
        )],
        TypeRef::Map(value) => vec![otherwise(
            src.to_string(),
            vec![
                TsStmt::raw(format!("{target} = {{}} as any;")),
                TsStmt::For {
                    head: format!("let key in {src}"),
                    body: vec![TsStmt::if_(
                        TsExpr::raw(format!("{src}.hasOwnProperty(key)")),
                        vec![TsStmt::raw(format!(
                            "({target} as any)[key] = {};",
                            decode_expr(&format!("{src}[key]"), value)
                        ))],
                    )],
                },
            ],
        )],
        _ if strict => vec![TsStmt::raw(format!(
            "{target} = {src} !== undefined ? {src} : {value_fallback};"
        ))],
        _ => vec![TsStmt::raw(format!("{target} = {src};"))],
    }
}

/// Expression converting one typed value back into plain JSON.
fn encode_expr(src: &str, ty: &TypeRef) -> String {
    match ty.non_null() {
        TypeRef::Class(_) => format!("{src} ? {src}.toJSON() : undefined as any"),
        TypeRef::Date => format!("{src} ? {src}.toISOString() : undefined as any"),
        _ => src.to_string(),
    }
}

/// Statements assigning the JSON form of `src` to `target`.
fn encode_into(target: &str, src: &str, ty: &TypeRef) -> Vec<TsStmt> {
    match ty.non_null() {
        TypeRef::Array(item) => vec![TsStmt::if_(
            TsExpr::raw(format!("Array.isArray({src})")),
            vec![
                TsStmt::raw(format!("{target} = [];")),
                TsStmt::For {
                    head: format!("let item of {src}"),
                    body: vec![TsStmt::raw(format!(
                        "{target}.push({});",
                        encode_expr("item", item)
                    ))],
                },
            ],
        )],
        TypeRef::Map(value) => vec![TsStmt::if_(
            TsExpr::raw(src.to_string()),
            vec![
                TsStmt::raw(format!("{target} = {{}};")),
                TsStmt::For {
                    head: format!("let key in {src}"),
                    body: vec![TsStmt::if_(
                        TsExpr::raw(format!("{src}.hasOwnProperty(key)")),
                        vec![TsStmt::raw(format!(
                            "({target} as any)[key] = {};",
                            encode_expr(&format!("({src} as any)[key]"), value)
                        ))],
                    )],
                },
            ],
        )],
        _ => vec![TsStmt::raw(format!("{target} = {};", encode_expr(src, ty)))],
    }
}

/// Every DTO declaration: registered schemas in registration order, then generic
/// instances in discovery order, with each class moved after the class it extends.
pub(crate) fn declarations(resolver: &mut TypeResolver<'_>, exported: bool) -> Result<Vec<TsItem>> {
    let document = resolver.document();
    let syntax = resolver.syntax();
    let mut groups = Vec::new();

    for (id, entry) in document.schemas().iter() {
        let Some(name) = resolver.declared_name(id).map(str::to_string) else {
            continue;
        };
        match &entry.node.kind {
            SchemaKind::Object(object) => {
                groups.push(class_items(resolver, &name, object, Some(&entry.key), exported)?);
            }
            SchemaKind::Enum(schema) => groups.push(vec![enum_item(&name, schema, exported)]),
            SchemaKind::Union(_) => {
                let ty = resolver.resolve(&entry.node)?;
                groups.push(vec![TsItem::TypeAlias(TsTypeAlias {
                    exported,
                    name,
                    ty: ty.to_ts(syntax),
                })]);
            }
            _ => {}
        }
    }

    let mut index = 0;
    while let Some(instance) = resolver.instance(index).cloned() {
        if let Some(object) = resolver.specialize(&instance) {
            groups.push(class_items(resolver, &instance.name, &object, None, exported)?);
        }
        index += 1;
    }
    Ok(base_first(groups))
}

fn group_class(group: &[TsItem]) -> Option<&TsClass> {
    group.iter().find_map(|item| match item {
        TsItem::Class(class) => Some(class),
        _ => None,
    })
}

/// Flatten declaration groups so that no class precedes the class it extends.
///
/// Class declarations are not hoisted, so `class B extends A` must come after
/// `class A`. Groups keep their relative order unless a base has to move up.
fn base_first(groups: Vec<Vec<TsItem>>) -> Vec<TsItem> {
    let by_name: HashMap<String, usize> = groups
        .iter()
        .enumerate()
        .filter_map(|(i, group)| group_class(group).map(|class| (class.name.clone(), i)))
        .collect();

    let mut placed = vec![false; groups.len()];
    let mut order = Vec::with_capacity(groups.len());
    for start in 0..groups.len() {
        let mut chain = Vec::new();
        let mut current = Some(start);
        while let Some(i) = current {
            if placed[i] || chain.contains(&i) {
                break;
            }
            chain.push(i);
            current = group_class(&groups[i])
                .and_then(|class| class.extends.as_deref())
                .and_then(|base| by_name.get(base).copied());
        }
        for &i in chain.iter().rev() {
            placed[i] = true;
            order.push(i);
        }
    }

    let mut slots: Vec<Option<Vec<TsItem>>> = groups.into_iter().map(Some).collect();
    order
        .into_iter()
        .filter_map(|i| slots.get_mut(i).and_then(Option::take))
        .flatten()
        .collect()
}

fn enum_item(name: &str, schema: &EnumSchema, exported: bool) -> TsItem {
    let literals: Vec<TsLiteral> = schema.values.iter().map(enum_literal).collect();
    if schema.values.iter().any(|v| matches!(v, EnumValue::Bool(_))) {
        return TsItem::TypeAlias(TsTypeAlias {
            exported,
            name: name.to_string(),
            ty: TsType::union(literals.into_iter().map(TsType::Literal)),
        });
    }

    let mut seen = HashSet::new();
    let members = schema
        .values
        .iter()
        .zip(literals)
        .enumerate()
        .map(|(i, (value, literal))| {
            let desired = match schema.names.get(i) {
                Some(given) => to_type_name(given),
                None => member_name(value),
            };
            let mut member = desired.clone();
            let mut counter = 2;
            while !seen.insert(member.clone()) {
                member = format!("{desired}{counter}");
                counter += 1;
            }
            (member, literal)
        })
        .collect();

    TsItem::Enum(TsEnum {
        exported,
        name: name.to_string(),
        members,
    })
}

fn member_name(value: &EnumValue) -> String {
    match value {
        EnumValue::String(s) => to_type_name(s),
        EnumValue::Integer(i) if *i < 0 => format!("_minus{}", i.unsigned_abs()),
        EnumValue::Integer(i) => format!("_{i}"),
        EnumValue::Float(f) => to_type_name(&f.to_string().replace('.', "_")),
        EnumValue::Bool(b) => to_type_name(&b.to_string()),
    }
}

/// Discriminator declared on `object` or its nearest ancestor, and whether it is `object`'s own.
fn find_discriminator<'d>(
    document: &'d Document,
    object: &'d ObjectSchema,
) -> Option<(&'d Discriminator, bool)> {
    if let Some(own) = &object.discriminator {
        return Some((own, true));
    }
    let mut current = object;
    // Base chains are acyclic once the document is linked
    while let Some(key) = current.base.as_deref().and_then(SchemaNode::reference_key) {
        current = document.schema(key)?.as_object()?;
        if let Some(found) = &current.discriminator {
            return Some((found, false));
        }
    }
    None
}

/// Discriminator value identifying the schema `key`.
fn discriminator_value(discriminator: &Discriminator, key: &str) -> String {
    discriminator
        .mapping
        .iter()
        .find(|(_, target)| target == key)
        .map_or_else(|| key.to_string(), |(value, _)| value.clone())
}

/// (discriminator value, class name) of every class `fromJS` on the root `key` dispatches to.
fn dispatch_targets(
    resolver: &TypeResolver<'_>,
    discriminator: &Discriminator,
    key: &str,
) -> Vec<(String, String)> {
    let mut targets = Vec::new();
    if !discriminator.mapping.is_empty() {
        for (value, target) in &discriminator.mapping {
            if target == key {
                continue;
            }
            if let Some(class) = resolver.class_name_of(target) {
                targets.push((value.clone(), class.to_string()));
            }
        }
        return targets;
    }

    let schemas = resolver.document().schemas();
    let mut queue = vec![key.to_string()];
    let mut seen = HashSet::new();
    while let Some(parent) = queue.pop() {
        for id in schemas.derived_from(&parent) {
            let child = &schemas.get(id).key;
            if !seen.insert(child.clone()) {
                continue;
            }
            if let Some(class) = resolver.class_name_of(child) {
                targets.push((child.clone(), class.to_string()));
            }
            queue.push(child.clone());
        }
    }
    targets
}

struct ClassProperty {
    name: String,
    ty: TypeRef,
    required: bool,
}

/// Class and interface for one object schema (registered or generic instance).
fn class_items(
    resolver: &mut TypeResolver<'_>,
    name: &str,
    object: &ObjectSchema,
    key: Option<&str>,
    exported: bool,
) -> Result<Vec<TsItem>> {
    let syntax = resolver.syntax();
    let document = resolver.document();

    let base = match object.base.as_deref() {
        Some(base) => resolver.resolve(base)?.class_name().map(str::to_string),
        None => None,
    };

    let discriminator = find_discriminator(document, object);
    let skipped = discriminator.map(|(d, _)| d.property_name.as_str());

    let mut properties = Vec::new();
    for property in &object.properties {
        if Some(property.name.as_str()) == skipped {
            continue;
        }
        properties.push(ClassProperty {
            name: property.name.clone(),
            ty: resolver.resolve(&property.schema)?,
            required: property.required,
        });
    }
    let has_index = object.additional_properties.is_some();

    let mut members = Vec::new();
    if let Some((_, true)) = discriminator {
        members.push(ClassMember::Field(TsField {
            modifiers: vec!["protected"],
            name: "_discriminator".to_string(),
            optional: false,
            definite: false,
            ty: TsType::String,
            init: None,
        }));
    }
    for property in &properties {
        let ty = property.ty.to_ts(syntax);
        members.push(ClassMember::Field(TsField {
            modifiers: Vec::new(),
            name: property.name.clone(),
            optional: !property.required,
            definite: property.required && syntax.definite_fields(),
            ty: if property.required { ty } else { syntax.optional(ty) },
            init: None,
        }));
    }
    if has_index {
        members.push(ClassMember::IndexSignature(TsType::Any));
    }

    let interface_name = format!("I{name}");
    let tag = discriminator.map(|(d, _)| discriminator_value(d, key.unwrap_or(name)));

    members.push(ClassMember::Method(constructor(
        &interface_name,
        base.is_some(),
        &properties,
        tag.as_deref(),
    )));
    members.push(ClassMember::Method(init_method(base.is_some(), &properties, has_index, syntax)));

    let targets = match (discriminator, key) {
        (Some((d, true)), Some(key)) => dispatch_targets(resolver, d, key),
        _ => Vec::new(),
    };
    let dispatch_property = discriminator.map(|(d, _)| d.property_name.as_str());
    members.push(ClassMember::Method(from_js_method(name, dispatch_property, &targets)));
    members.push(ClassMember::Method(to_json_method(
        base.is_some(),
        &properties,
        has_index,
        discriminator.and_then(|(d, own)| own.then_some(d.property_name.as_str())),
    )));

    let class = TsClass {
        exported,
        decorators: Vec::new(),
        name: name.to_string(),
        extends: base.clone(),
        implements: vec![interface_name.clone()],
        members,
    };

    let mut interface_members: Vec<InterfaceMember> = properties
        .iter()
        .map(|property| {
            let ty = property.ty.to_ts(syntax);
            InterfaceMember::Property(TsProp {
                name: property.name.clone(),
                ty: if property.required { ty } else { syntax.optional(ty) },
                optional: !property.required,
            })
        })
        .collect();
    if has_index {
        interface_members.push(InterfaceMember::IndexSignature(TsType::Any));
    }
    let interface = TsInterface {
        exported,
        name: interface_name,
        extends: base.map(|b| format!("I{b}")).into_iter().collect(),
        members: interface_members,
    };

    Ok(vec![TsItem::Class(class), TsItem::Interface(interface)])
}

fn constructor(
    interface_name: &str,
    derived: bool,
    properties: &[ClassProperty],
    discriminator_value: Option<&str>,
) -> TsMethod {
    let mut body = Vec::new();
    if derived {
        body.push(TsStmt::raw("super(data);"));
    } else {
        body.push(TsStmt::if_(
            TsExpr::raw("data"),
            vec![TsStmt::For {
                head: "var property in data".to_string(),
                body: vec![TsStmt::if_(
                    TsExpr::raw("data.hasOwnProperty(property)"),
                    vec![TsStmt::raw("(this as any)[property] = (data as any)[property];")],
                )],
            }],
        ));
    }

    // Required members get concrete defaults so nested state is never undefined
    let defaults: Vec<TsStmt> = properties
        .iter()
        .filter(|p| p.required)
        .filter_map(|p| {
            let target = format_property_access("this", &p.name);
            match p.ty.non_null() {
                TypeRef::Class(class) => Some(TsStmt::raw(format!("{target} = new {class}();"))),
                TypeRef::Array(_) => Some(TsStmt::raw(format!("{target} = [];"))),
                TypeRef::Map(_) => Some(TsStmt::raw(format!("{target} = {{}};"))),
                _ => None,
            }
        })
        .collect();
    if !defaults.is_empty() {
        body.push(TsStmt::if_(TsExpr::raw("!data"), defaults));
    }

    if let Some(value) = discriminator_value {
        body.push(TsStmt::raw(format!(
            "this._discriminator = {};",
            TsLiteral::String(value.to_string()).emit()
        )));
    }

    TsMethod::new(
        "constructor",
        vec![TsParam::new("data", TsType::named(interface_name)).optional()],
        None,
    )
    .with_body(body)
}

fn init_method(derived: bool, properties: &[ClassProperty], has_index: bool, syntax: TsSyntax) -> TsMethod {
    let mut body = Vec::new();
    if derived {
        body.push(TsStmt::raw("super.init(_data);"));
    }

    let mut assigns = Vec::new();
    if has_index {
        assigns.push(TsStmt::For {
            head: "var property in _data".to_string(),
            body: vec![TsStmt::if_(
                TsExpr::raw("_data.hasOwnProperty(property)"),
                vec![TsStmt::raw("(this as any)[property] = _data[property];")],
            )],
        });
    }
    for property in properties {
        let fallback = match property.ty.non_null() {
            TypeRef::Class(class) if property.required => format!("new {class}()"),
            _ => "undefined as any".to_string(),
        };
        assigns.extend(decode_into(
            &format_property_access("this", &property.name),
            &format_key_access("_data", &property.name),
            &property.ty,
            Fallback::Property(&fallback),
            syntax,
        ));
    }
    if !assigns.is_empty() {
        body.push(TsStmt::if_(TsExpr::raw("_data"), assigns));
    }

    TsMethod::new(
        "init",
        vec![TsParam::new("_data", TsType::Any).optional()],
        None,
    )
    .with_body(body)
}

fn from_js_method(name: &str, dispatch_property: Option<&str>, targets: &[(String, String)]) -> TsMethod {
    let mut body = vec![TsStmt::raw("data = typeof data === 'object' ? data : {};")];
    if let Some(property) = dispatch_property {
        for (value, class) in targets {
            body.push(TsStmt::if_(
                TsExpr::raw(format!(
                    "{} === {}",
                    format_key_access("data", property),
                    TsLiteral::String(value.clone()).emit()
                )),
                vec![
                    TsStmt::raw(format!("let result = new {class}();")),
                    TsStmt::raw("result.init(data);"),
                    TsStmt::raw("return result;"),
                ],
            ));
        }
    }
    body.push(TsStmt::raw(format!("let result = new {name}();")));
    body.push(TsStmt::raw("result.init(data);"));
    body.push(TsStmt::raw("return result;"));

    TsMethod::new(
        "fromJS",
        vec![TsParam::new("data", TsType::Any)],
        Some(TsType::named(name)),
    )
    .with_modifier("static")
    .with_body(body)
}

fn to_json_method(
    derived: bool,
    properties: &[ClassProperty],
    has_index: bool,
    own_discriminator: Option<&str>,
) -> TsMethod {
    let mut body = vec![TsStmt::raw("data = typeof data === 'object' ? data : {};")];
    if has_index {
        body.push(TsStmt::For {
            head: "var property in this".to_string(),
            body: vec![TsStmt::if_(
                TsExpr::raw("this.hasOwnProperty(property)"),
                vec![TsStmt::raw("data[property] = (this as any)[property];")],
            )],
        });
    }
    if let Some(property) = own_discriminator {
        body.push(TsStmt::raw(format!(
            "{} = this._discriminator;",
            format_key_access("data", property)
        )));
    }
    for property in properties {
        body.extend(encode_into(
            &format_key_access("data", &property.name),
            &format_property_access("this", &property.name),
            &property.ty,
        ));
    }
    if derived {
        body.push(TsStmt::raw("super.toJSON(data);"));
    }
    body.push(TsStmt::raw("return data;"));

    TsMethod::new(
        "toJSON",
        vec![TsParam::new("data", TsType::Any).optional()],
        None,
    )
    .with_body(body)
}
