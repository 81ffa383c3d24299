//! Identifier and string helpers shared by the resolvers and the emitter.

use std::collections::HashSet;
use std::sync::LazyLock;

/// TypeScript reserved words that cannot be used as identifiers.
pub static TS_RESERVED_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "break",
        "case",
        "catch",
        "class",
        "const",
        "continue",
        "debugger",
        "default",
        "delete",
        "do",
        "else",
        "enum",
        "export",
        "extends",
        "false",
        "finally",
        "for",
        "function",
        "if",
        "import",
        "in",
        "instanceof",
        "new",
        "null",
        "return",
        "super",
        "switch",
        "this",
        "throw",
        "true",
        "try",
        "typeof",
        "var",
        "void",
        "while",
        "with",
        "yield",
        "let",
        "static",
        "implements",
        "interface",
        "package",
        "private",
        "protected",
        "public",
        "await",
        "async",
    ]
    .into_iter()
    .collect()
});

/// Check if a name needs quoting (or bracket notation) to be used as a property key.
pub fn needs_bracket_notation(name: &str) -> bool {
    name.is_empty()
        || !name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Escape a string for use inside a double-quoted JavaScript string literal.
pub fn escape_js_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Quote a property key if it is not a plain identifier.
pub fn quote_if_needed(name: &str) -> String {
    if needs_bracket_notation(name) {
        format!("\"{}\"", escape_js_string(name))
    } else {
        name.to_string()
    }
}

/// Format a property access expression, using bracket notation when needed.
pub fn format_property_access(obj: &str, prop: &str) -> String {
    if needs_bracket_notation(prop) {
        format!("{obj}[\"{}\"]", escape_js_string(prop))
    } else {
        format!("{obj}.{prop}")
    }
}

/// Format a bracket access with a string key: `obj["prop"]`.
pub fn format_key_access(obj: &str, prop: &str) -> String {
    format!("{obj}[\"{}\"]", escape_js_string(prop))
}

/// Split a raw name into word parts on separators and non-identifier characters.
fn split_words(name: &str) -> Vec<&str> {
    name.split(|c: char| !(c.is_ascii_alphanumeric() || c == '$'))
        .filter(|part| !part.is_empty())
        .collect()
}

/// Sanitize a name into a lowerCamelCase TypeScript identifier.
///
/// - Separators (`-`, `.`, `_`, spaces, brackets, ...) start a new word
/// - Prepends `_` if the result starts with a digit
/// - Escapes reserved words with a `_` prefix
pub fn sanitize_ts_identifier(name: &str) -> String {
    let mut result = String::new();
    for (i, part) in split_words(name).into_iter().enumerate() {
        if i == 0 {
            result.push_str(&lower_first(part));
        } else {
            result.push_str(&capitalize_first(part));
        }
    }

    if result.is_empty() {
        return "_empty".to_string();
    }

    if result.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        result = format!("_{result}");
    }

    if TS_RESERVED_WORDS.contains(result.as_str()) {
        result = format!("_{result}");
    }

    result
}

/// Sanitize a name into a PascalCase TypeScript type name.
pub fn to_type_name(name: &str) -> String {
    let result: String = split_words(name)
        .into_iter()
        .map(capitalize_first)
        .collect();

    if result.is_empty() {
        "Anonymous".to_string()
    } else if result.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        format!("_{result}")
    } else {
        result
    }
}

/// Capitalize the first letter of a string.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Lowercase the first letter of a string.
pub fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().chain(chars).collect(),
    }
}
