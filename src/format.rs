//! Rendering of log values
//!
//! Pure functions that turn a [`LogValue`] into the text of one log record.
//! Containers render as an indented tree; strings that look like JSON objects
//! or arrays are decoded and rendered as a tree with a `JSON ` tag.

use crate::value::LogValue;

/// Tag placed before a string that was decoded as JSON
pub const JSON_TAG: &str = "JSON ";

/// Spaces added per level of tree nesting
const INDENT: usize = 4;

/// Render a value as the text of a log record
pub fn render(value: &LogValue) -> String {
    match value {
        LogValue::Text(text) => render_text(text),
        LogValue::Sequence(_) | LogValue::Mapping(_) => render_tree(value, 0),
        other => render_leaf(other),
    }
}

/// Render a string, decoding it first if it looks like a JSON object or array
///
/// The bracket test is purely syntactic. Anything that fails to parse is
/// printed as given, untrimmed.
pub fn render_text(text: &str) -> String {
    match detect_json(text) {
        Some(json) => format!("{}{}", JSON_TAG, render_tree(&json, 0)),
        None => text.to_string(),
    }
}

/// Decode `text` if it is bracket-delimited and parses to a JSON object or array
pub fn detect_json(text: &str) -> Option<LogValue> {
    let trimmed = text.trim_matches(is_trimmed);
    let delimited = (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'));
    if !delimited {
        return None;
    }

    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(json) if json.is_object() || json.is_array() => Some(LogValue::from(&json)),
        _ => None,
    }
}

/// Whitespace stripped before the bracket test; ASCII only, so a leading
/// non-breaking space keeps a string literal
fn is_trimmed(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\0' | '\x0B')
}

/// Render a value without JSON detection
fn render_leaf(value: &LogValue) -> String {
    match value {
        LogValue::Boolean(true) => "true".to_string(),
        LogValue::Boolean(false) => "false".to_string(),
        LogValue::Number(n) => n.to_string(),
        LogValue::Null => "NULL".to_string(),
        LogValue::Text(text) => text.clone(),
        LogValue::Object(type_name) => format!("object({})", type_name),
        LogValue::Handle(kind) => format!("resource({})", kind),
        LogValue::Unknown(text) => text.clone(),
        LogValue::Sequence(_) | LogValue::Mapping(_) => render_tree(value, 0),
    }
}

/// Render a container as an indented tree
///
/// `pad` is the column of the opening parenthesis. Entries sit one indent
/// further in; nested containers open two indents past their entry.
fn render_tree(value: &LogValue, pad: usize) -> String {
    let (header, entries): (&str, Vec<(String, &LogValue)>) = match value {
        LogValue::Sequence(items) => (
            "Array",
            items
                .iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
        ),
        LogValue::Mapping(pairs) => ("Map", pairs.iter().map(|(k, v)| (k.clone(), v)).collect()),
        other => return render_leaf(other),
    };

    let margin = " ".repeat(pad);
    let entry_margin = " ".repeat(pad + INDENT);

    let mut out = String::new();
    out.push_str(header);
    out.push('\n');
    out.push_str(&margin);
    out.push_str("(\n");
    for (key, child) in entries {
        let rendered = if child.is_container() {
            render_tree(child, pad + 2 * INDENT)
        } else {
            render_leaf(child)
        };
        out.push_str(&format!("{}[{}] => {}\n", entry_margin, key, rendered));
    }
    out.push_str(&margin);
    out.push(')');
    out
}
