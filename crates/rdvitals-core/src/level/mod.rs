//! Tolerant .rdlevel decoding.
//!
//! The level editor emits a format that resembles JSON but routinely
//! violates it: a missing comma between a short value and the next key,
//! literal newlines/tabs in odd places, and the occasional stray control
//! character. Decoding applies a fixed, ordered repair pipeline:
//!
//! 1. strip a leading BOM,
//! 2. insert the known-missing separators (see [`repair`]),
//! 3. delete every `\r`, `\n`, `\t` (multi-line strings do not exist in
//!    this format, so this is deliberately destructive),
//! 4. parse as JSON with trailing commas tolerated,
//! 5. if parsing failed and the text contains non-printable characters,
//!    strip them and parse once more. No second retry.

pub mod package;
pub mod repair;

pub use package::{parse_rdzip, parse_url, PackageError, MAIN_LEVEL};

use serde_json::Value;
use thiserror::Error;

/// A decoded level document: key order preserved, values untyped.
pub type Level = serde_json::Map<String, Value>;

/// Terminal decode failure, after the single sanitization retry (when
/// applicable). Position and snippet locate the offending text.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid level at line {line}, column {column}: {message} (near {snippet:?})")]
    Parse {
        line: usize,
        column: usize,
        message: String,
        snippet: String,
    },
    #[error("level document is not an object")]
    NotAnObject,
}

/// Decodes level text into a [`Level`], repairing the editor's known
/// syntax errors along the way. Pure function of its input.
pub fn decode_level(text: &str) -> Result<Level, DecodeError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let repaired = repair::insert_missing_separators(text);

    // The format has no multi-line strings; newlines and tabs anywhere are
    // editor noise.
    let normalized: String = repaired
        .chars()
        .filter(|c| !matches!(c, '\r' | '\n' | '\t'))
        .collect();

    match parse_relaxed(&normalized) {
        Ok(value) => into_object(value),
        Err(err) => {
            if normalized.chars().any(|c| !is_printable(c)) {
                let sanitized: String =
                    normalized.chars().filter(|c| is_printable(*c)).collect();
                match parse_relaxed(&sanitized) {
                    Ok(value) => into_object(value),
                    Err(err) => Err(to_decode_error(&sanitized, &err)),
                }
            } else {
                Err(to_decode_error(&normalized, &err))
            }
        }
    }
}

fn into_object(value: Value) -> Result<Level, DecodeError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(DecodeError::NotAnObject),
    }
}

/// JSON parse tolerating trailing commas before `}` / `]`.
fn parse_relaxed(text: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(&strip_trailing_commas(text))
}

/// Removes a comma whose next non-whitespace character closes an object or
/// array. String contents are left untouched.
fn strip_trailing_commas(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                let next = text[i + c.len_utf8()..].trim_start().chars().next();
                if !matches!(next, Some('}') | Some(']')) {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Printable set used by the sanitization fallback. Mirrors the YAML
/// definition of printable characters, minus U+FFFD: the replacement
/// character only appears here as the residue of an invalid byte sequence,
/// so the fallback strips it too.
fn is_printable(c: char) -> bool {
    if c == '\u{fffd}' {
        return false;
    }
    matches!(c,
        '\t' | '\n' | '\r'
        | '\u{20}'..='\u{7e}'
        | '\u{85}'
        | '\u{a0}'..='\u{d7ff}'
        | '\u{e000}'..='\u{fffd}'
        | '\u{10000}'..='\u{10ffff}')
}

fn to_decode_error(text: &str, err: &serde_json::Error) -> DecodeError {
    DecodeError::Parse {
        line: err.line(),
        column: err.column(),
        message: err.to_string(),
        snippet: snippet_around(text, err.line(), err.column()),
    }
}

/// Up to 60 characters of the offending line, centered on the error column.
fn snippet_around(text: &str, line: usize, column: usize) -> String {
    let line_text = text.lines().nth(line.saturating_sub(1)).unwrap_or("");
    let col = column.min(line_text.len());

    let mut start = col.saturating_sub(30);
    while start > 0 && !line_text.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = (col + 30).min(line_text.len());
    while end < line_text.len() && !line_text.is_char_boundary(end) {
        end += 1;
    }
    line_text[start..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_document() {
        let doc = decode_level(r#"{"settings": {"song": "Chips"}, "rows": []}"#).unwrap();
        assert_eq!(doc["settings"]["song"], "Chips");
        assert!(doc["rows"].as_array().unwrap().is_empty());
    }

    #[test]
    fn bom_is_stripped() {
        let doc = decode_level("\u{feff}{\"a\": 1}").unwrap();
        assert_eq!(doc["a"], 1);
    }

    #[test]
    fn missing_separator_between_pairs_is_repaired() {
        let doc = decode_level(r#"{"difficulty": 5 "tags": "abc"}"#).unwrap();
        assert_eq!(doc["difficulty"], 5);
        assert_eq!(doc["tags"], "abc");
    }

    #[test]
    fn newlines_and_tabs_are_removed_even_inside_strings() {
        let doc = decode_level("{\"song\":\n\t\"Hail\nSatan\"\r\n}").unwrap();
        assert_eq!(doc["song"], "HailSatan");
    }

    #[test]
    fn trailing_commas_are_tolerated() {
        let doc = decode_level(r#"{"rows": [1, 2, 3,], "events": [],}"#).unwrap();
        assert_eq!(doc["rows"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn control_character_triggers_sanitize_retry() {
        let doc = decode_level("{\"a\": 1, \u{1} \"b\": 2}").unwrap();
        assert_eq!(doc["a"], 1);
        assert_eq!(doc["b"], 2);
    }

    #[test]
    fn control_character_inside_string_is_stripped_on_retry() {
        let doc = decode_level("{\"song\": \"Chi\u{1}ps\"}").unwrap();
        assert_eq!(doc["song"], "Chips");
    }

    #[test]
    fn structural_error_in_printable_text_is_terminal() {
        let err = decode_level(r#"{"a": }"#).unwrap_err();
        match err {
            DecodeError::Parse { line, snippet, .. } => {
                assert_eq!(line, 1);
                assert!(snippet.contains('}'));
            }
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn structural_error_survives_sanitize_retry() {
        // Contains a control character *and* a structural error; the one
        // retry runs, still fails, and the failure is terminal.
        let err = decode_level("{\"a\": \u{1} }").unwrap_err();
        assert!(matches!(err, DecodeError::Parse { .. }));
    }

    #[test]
    fn non_object_document_is_rejected() {
        assert!(matches!(
            decode_level("[1, 2, 3]").unwrap_err(),
            DecodeError::NotAnObject
        ));
    }

    #[test]
    fn decode_is_idempotent_on_its_output() {
        let doc = decode_level(r#"{"difficulty": 5 "tags": "abc", "rows": [0, 1],}"#).unwrap();
        let canonical = serde_json::to_string(&Value::Object(doc.clone())).unwrap();
        let again = decode_level(&canonical).unwrap();
        assert_eq!(doc, again);
    }

    #[test]
    fn key_order_is_preserved() {
        let doc = decode_level(r#"{"zebra": 1, "apple": 2, "mango": 3}"#).unwrap();
        let keys: Vec<&String> = doc.keys().collect();
        assert_eq!(keys, ["zebra", "apple", "mango"]);
    }

    #[test]
    fn strip_trailing_commas_ignores_strings() {
        assert_eq!(
            strip_trailing_commas(r#"{"a": ",}", "b": [1,]}"#),
            r#"{"a": ",}", "b": [1]}"#
        );
    }
}
