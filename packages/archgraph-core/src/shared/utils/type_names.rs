//! Go-style type string helpers
//!
//! Field types arrive as raw source text (`*engine.Engine`,
//! `map[string]*store.Item`, `chan<- Job`). These helpers peel the
//! container syntax off and split what remains into qualifier and bare name.

/// Strip channel, pointer, slice/array and map-key syntax, leaving the
/// possibly qualified element type (`[]*store.Item` → `store.Item`).
fn element_type(type_str: &str) -> &str {
    let mut t = type_str.trim();
    for prefix in ["<-chan", "chan<-", "chan"] {
        if let Some(rest) = t.strip_prefix(prefix) {
            if rest.starts_with(char::is_whitespace) {
                t = rest.trim_start();
                break;
            }
        }
    }
    t = t.trim_start_matches('*');
    if let Some(rest) = t.strip_prefix('[') {
        if let Some(close) = rest.find(']') {
            if rest[..close].chars().all(|c| c.is_ascii_digit()) {
                t = &rest[close + 1..];
            }
        }
    }
    if let Some(rest) = t.strip_prefix("map[") {
        if let Some(close) = rest.find(']') {
            t = rest[close + 1..].trim();
        }
    }
    t.trim_start_matches('*')
}

/// Bare type name used for lookups (`*engine.Engine` → `Engine`)
pub fn normalize_field_type(type_str: &str) -> &str {
    let t = element_type(type_str);
    match t.rfind('.') {
        Some(dot) => &t[dot + 1..],
        None => t,
    }
}

/// Package qualifier of a field type, if any (`[]store.Store` → `store`).
///
/// Only a simple identifier counts; anything else is treated as unqualified.
pub fn type_qualifier(type_str: &str) -> Option<&str> {
    let t = element_type(type_str);
    let dot = t.find('.')?;
    let qualifier = &t[..dot];
    let mut chars = qualifier.chars();
    let first = chars.next()?;
    if (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        Some(qualifier)
    } else {
        None
    }
}
