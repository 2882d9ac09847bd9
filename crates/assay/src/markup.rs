//! Report markup
//!
//! Recorded descriptions carry a small amount of HTML (`<b>`, `<i>`,
//! `<pre>`) that the HTML report renders as-is. Values coming from the
//! application or the test author are escaped here, before they are
//! wrapped, so the comparison code never deals with markup.

use serde_json::Value;

/// Escape HTML special characters
#[must_use]
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `<b>value</b>`
#[must_use]
pub fn bold(value: &str) -> String {
    format!("<b>{}</b>", escape(value))
}

/// `<i>value</i>`
#[must_use]
pub fn italic(value: &str) -> String {
    format!("<i>{}</i>", escape(value))
}

/// Bold rendering of a list, e.g. `<b>[a, b, c]</b>`
#[must_use]
pub fn bold_list<S: AsRef<str>>(values: &[S]) -> String {
    let joined = values
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(", ");
    bold(&format!("[{joined}]"))
}

/// Pretty-printed JSON inside a `<pre>` block
#[must_use]
pub fn json_block(value: &Value) -> String {
    let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    format!("<pre>{}</pre>", escape(&text))
}

/// Remove tags, leaving text (used for plain-text report formats)
#[must_use]
pub fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Upper-case the first letter, skipping over leading tags
#[must_use]
pub fn capitalize(s: &str) -> String {
    recase_first(s, true)
}

/// Lower-case the first letter, skipping over leading tags
#[must_use]
pub fn decapitalize(s: &str) -> String {
    recase_first(s, false)
}

fn recase_first(s: &str, upper: bool) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    let mut in_entity = false;
    let mut done = false;
    for c in s.chars() {
        if done {
            out.push(c);
            continue;
        }
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            '&' if !in_tag => in_entity = true,
            ';' if in_entity => in_entity = false,
            _ if !in_tag && !in_entity && c.is_alphabetic() => {
                if upper {
                    out.extend(c.to_uppercase());
                } else {
                    out.extend(c.to_lowercase());
                }
                done = true;
                continue;
            }
            _ => {}
        }
        out.push(c);
    }
    out
}
