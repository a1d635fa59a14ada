//! `{variable}` placeholders in template prompts.

use std::collections::HashMap;

/// Placeholder names in order of first appearance, without duplicates.
///
/// A placeholder is `{` followed by one or more characters other than `}`,
/// then `}`. An unclosed `{` is left as literal text.
pub fn extract_variables(content: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for (_, name) in placeholders(content) {
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Replace every placeholder with its value; unknown names become empty.
pub fn fill_template(content: &str, values: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(content.len());
    let mut last = 0;
    for (start, name) in placeholders(content) {
        out.push_str(&content[last..start]);
        if let Some(value) = values.get(name) {
            out.push_str(value);
        }
        // name plus both braces
        last = start + name.len() + 2;
    }
    out.push_str(&content[last..]);
    out
}

/// Byte offset of each `{` that opens a placeholder, with the inner name.
fn placeholders(content: &str) -> Vec<(usize, &str)> {
    let mut found = Vec::new();
    let mut search_from = 0;
    while let Some(offset) = content[search_from..].find('{') {
        let start = search_from + offset;
        let rest = &content[start + 1..];
        match rest.find('}') {
            Some(0) => search_from = start + 1,
            Some(end) => {
                // `{a {b}` names `a {b`, matching a `\{([^}]+)\}` scan
                found.push((start, &rest[..end]));
                search_from = start + end + 2;
            }
            None => break,
        }
    }
    found
}
