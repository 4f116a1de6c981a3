//! Coerce free-form model replies into JSON.
//!
//! Replies often arrive wrapped in Markdown fences, with trailing commas or
//! raw control characters inside strings. Repairs here track string
//! literals, so punctuation inside string values is never touched.

use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SanitizeError {
    #[error("{0}")]
    Parse(#[from] serde_json::Error),
}

/// Parse a model reply as JSON, repairing common defects.
///
/// 1. Take the inner content of a fenced block (a `json` fence wins).
/// 2. Repair and parse.
/// 3. On failure, retry on the first balanced `{ ... }` object, or the span
///    between the first `{` and the last `}`.
/// 4. A second failure returns that parse error.
pub fn coerce_json(raw: &str) -> Result<Value, SanitizeError> {
    let body = fenced_content(raw).unwrap_or(raw).trim();

    let first_error = match serde_json::from_str(&repair(body)) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    let Some(candidate) = first_balanced_object(body).or_else(|| outer_braces(body)) else {
        return Err(first_error.into());
    };
    Ok(serde_json::from_str(&repair(candidate))?)
}

/// Inner content of the first ```json fence, else of the first fence of any kind.
/// An unclosed fence runs to the end of the text.
fn fenced_content(raw: &str) -> Option<&str> {
    let open = raw.find("```json").or_else(|| raw.find("```"))?;
    let after = &raw[open + 3..];
    let info_len = after
        .find(|c: char| c.is_whitespace() || c == '{' || c == '[')
        .unwrap_or(after.len());
    let body = &after[info_len..];
    let end = body.find("```").unwrap_or(body.len());
    Some(&body[..end])
}

/// Drop control characters and trailing commas outside strings;
/// escape raw control characters inside strings.
fn repair(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
                out.push(c);
                continue;
            }
            match c {
                '\\' => {
                    escaped = true;
                    out.push(c);
                }
                '"' => {
                    in_string = false;
                    out.push(c);
                }
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
                c => out.push(c),
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' if closes_next(&text[i + 1..]) => {}
            '\n' | '\r' | '\t' => out.push(c),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }

    out
}

/// Whether the next significant character is `]` or `}`.
fn closes_next(rest: &str) -> bool {
    matches!(
        rest.chars().find(|c| !c.is_whitespace() && !c.is_control()),
        Some(']') | Some('}')
    )
}

/// Span of the first `{ ... }` whose braces balance, ignoring braces in strings.
fn first_balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

fn outer_braces(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fenced_json_with_trailing_comma() {
        assert_eq!(coerce_json("```json\n{\"a\":1,}\n```").unwrap(), json!({"a": 1}));
    }

    #[test]
    fn plain_fence_and_prose_around_it() {
        let raw = "Here you go:\n```\n{\"tasks\": [\"Read\", \"Solve\",]}\n```\nGood luck!";
        assert_eq!(coerce_json(raw).unwrap(), json!({"tasks": ["Read", "Solve"]}));
    }

    #[test]
    fn json_fence_preferred_over_earlier_fence() {
        let raw = "```text\nnot this\n```\n```json\n{\"ok\": true}\n```";
        assert_eq!(coerce_json(raw).unwrap(), json!({"ok": true}));
    }

    #[test]
    fn unclosed_fence_runs_to_end() {
        assert_eq!(coerce_json("```json\n{\"a\": [1, 2]}").unwrap(), json!({"a": [1, 2]}));
    }

    #[test]
    fn punctuation_inside_strings_survives() {
        let raw = r#"{"label": "Sets {A, B}, ]", "note": "a,}", "list": [1, 2,],}"#;
        assert_eq!(
            coerce_json(raw).unwrap(),
            json!({"label": "Sets {A, B}, ]", "note": "a,}", "list": [1, 2]})
        );
    }

    #[test]
    fn raw_newline_in_string_is_escaped() {
        let raw = "{\"title\": \"From course: Bio\nReason: cells\"}";
        assert_eq!(
            coerce_json(raw).unwrap(),
            json!({"title": "From course: Bio\nReason: cells"})
        );
    }

    #[test]
    fn control_characters_outside_strings_dropped() {
        let raw = "{\u{0001}\"a\": 1\u{0007}}";
        assert_eq!(coerce_json(raw).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn escaped_quotes_do_not_end_strings() {
        let raw = r#"{"q": "say \"hi\", }", "n": 2,}"#;
        assert_eq!(coerce_json(raw).unwrap(), json!({"q": "say \"hi\", }", "n": 2}));
    }

    #[test]
    fn falls_back_to_first_balanced_object() {
        let raw = r#"Sure! {"nodes": [], "edges": []} Let me know if {you need more}."#;
        assert_eq!(coerce_json(raw).unwrap(), json!({"nodes": [], "edges": []}));
    }

    #[test]
    fn falls_back_to_outer_braces_when_unbalanced() {
        // The first `{` never closes, so the outer span is used.
        let raw = r#"x {{"a": 1} y"#;
        assert!(first_balanced_object(raw).is_none());
        assert_eq!(outer_braces(raw), Some(r#"{{"a": 1}"#));
        assert!(coerce_json(raw).is_err());
    }

    #[test]
    fn top_level_array_parses_directly() {
        assert_eq!(coerce_json("[1, 2, 3,]").unwrap(), json!([1, 2, 3]));
    }

    #[test]
    fn second_failure_is_reported() {
        assert!(coerce_json("no json here").is_err());
        assert!(coerce_json("{not: valid}").is_err());
        assert!(coerce_json("").is_err());
    }
}
