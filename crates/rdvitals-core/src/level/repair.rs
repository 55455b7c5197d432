//! Missing-separator repair.
//!
//! Some editor versions drop the comma between a key-value pair and the
//! next key when the value is short, producing fragments like
//! `"x": 5 "y": 3`. The repair inserts the comma, but only when the value
//! matches one of three exact shapes seen in real levels:
//!
//! - an integer 0..=100 with no leading zeros,
//! - a bracketed list of integers 0..=3 separated by exactly `", "`,
//! - a double-quoted ASCII-alphanumeric string.
//!
//! The grammar is deliberately this narrow. Anything broader starts
//! rewriting legitimate string contents that merely look like two
//! adjacent pairs, which corrupts valid levels. This is a raw text
//! transform with no understanding of string context; that limitation is
//! inherited from the format's own tooling.

/// Rewrites every `": V "` occurrence (V in the restricted grammar above)
/// to `": V, "`. All other text is copied through untouched.
pub fn insert_missing_separators(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut i = 0;

    while i < text.len() {
        if text[i..].starts_with("\": ") {
            let value_start = i + 3;
            if let Some(len) = match_value(&text[value_start..]) {
                let value_end = value_start + len;
                if text[value_end..].starts_with(" \"") {
                    out.push_str("\": ");
                    out.push_str(&text[value_start..value_end]);
                    out.push_str(", \"");
                    // Resume after the next key's opening quote, like a
                    // left-to-right non-overlapping substitution.
                    i = value_end + 2;
                    continue;
                }
            }
        }
        match text[i..].chars().next() {
            Some(ch) => {
                out.push(ch);
                i += ch.len_utf8();
            }
            None => break,
        }
    }

    out
}

/// Matches one value of the restricted grammar at the start of `rest`,
/// returning its byte length.
fn match_value(rest: &str) -> Option<usize> {
    match rest.as_bytes().first()? {
        b'0'..=b'9' => match_small_int(rest),
        b'[' => match_small_array(rest),
        b'"' => match_alnum_string(rest),
        _ => None,
    }
}

/// Integer in 0..=100: one digit, two digits without a leading zero, or
/// exactly `100`. A longer digit run is not a match.
fn match_small_int(rest: &str) -> Option<usize> {
    let digits = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    let run = &rest[..digits];
    match digits {
        1 => Some(1),
        2 if !run.starts_with('0') => Some(2),
        3 if run == "100" => Some(3),
        _ => None,
    }
}

/// `[d, d, ...]` with each d in 0..=3 and the separator exactly `", "`.
fn match_small_array(rest: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    let mut i = 1; // past '['
    loop {
        if !matches!(bytes.get(i), Some(b'0'..=b'3')) {
            return None;
        }
        i += 1;
        match bytes.get(i) {
            Some(b']') => return Some(i + 1),
            Some(b',') if bytes.get(i + 1) == Some(&b' ') => i += 2,
            _ => return None,
        }
    }
}

/// `"..."` where the contents are ASCII alphanumerics (possibly empty).
fn match_alnum_string(rest: &str) -> Option<usize> {
    let inner = rest[1..].bytes().take_while(|b| b.is_ascii_alphanumeric()).count();
    if rest.as_bytes().get(1 + inner) == Some(&b'"') {
        Some(inner + 2)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_int_before_string_key() {
        assert_eq!(
            insert_missing_separators(r#"{"difficulty": 5 "tags": "abc"}"#),
            r#"{"difficulty": 5, "tags": "abc"}"#
        );
    }

    #[test]
    fn two_digit_and_hundred() {
        assert_eq!(
            insert_missing_separators(r#""a": 42 "b": 100 "c": 0"#),
            r#""a": 42, "b": 100, "c": 0"#
        );
    }

    #[test]
    fn out_of_range_ints_are_left_alone() {
        assert_eq!(
            insert_missing_separators(r#""a": 101 "b": 1"#),
            r#""a": 101 "b": 1"#
        );
        assert_eq!(
            insert_missing_separators(r#""a": 05 "b": 1"#),
            r#""a": 05 "b": 1"#
        );
        assert_eq!(
            insert_missing_separators(r#""a": 1000 "b": 1"#),
            r#""a": 1000 "b": 1"#
        );
    }

    #[test]
    fn bounded_array() {
        assert_eq!(
            insert_missing_separators(r#""rowPos": [0, 1, 3] "x": 2"#),
            r#""rowPos": [0, 1, 3], "x": 2"#
        );
        assert_eq!(
            insert_missing_separators(r#""rowPos": [2] "x": 2"#),
            r#""rowPos": [2], "x": 2"#
        );
    }

    #[test]
    fn array_shape_must_match_exactly() {
        // element out of range
        assert_eq!(
            insert_missing_separators(r#""a": [0, 4] "b": 1"#),
            r#""a": [0, 4] "b": 1"#
        );
        // missing space after comma
        assert_eq!(
            insert_missing_separators(r#""a": [0,1] "b": 1"#),
            r#""a": [0,1] "b": 1"#
        );
        // multi-digit element
        assert_eq!(
            insert_missing_separators(r#""a": [10] "b": 1"#),
            r#""a": [10] "b": 1"#
        );
        // empty array
        assert_eq!(
            insert_missing_separators(r#""a": [] "b": 1"#),
            r#""a": [] "b": 1"#
        );
    }

    #[test]
    fn quoted_alphanumeric_string() {
        assert_eq!(
            insert_missing_separators(r#""tags": "abc123" "x": 1"#),
            r#""tags": "abc123", "x": 1"#
        );
        assert_eq!(
            insert_missing_separators(r#""tags": "" "x": 1"#),
            r#""tags": "", "x": 1"#
        );
    }

    #[test]
    fn non_alphanumeric_string_is_left_alone() {
        assert_eq!(
            insert_missing_separators(r#""tags": "a-c" "x": 1"#),
            r#""tags": "a-c" "x": 1"#
        );
    }

    #[test]
    fn chained_missing_separators() {
        assert_eq!(
            insert_missing_separators(r#""a": 1 "b": 2 "c": 3"#),
            r#""a": 1, "b": 2, "c": 3"#
        );
    }

    #[test]
    fn already_valid_text_is_unchanged() {
        let text = r#"{"a": 1, "b": [0, 2], "c": "xy"}"#;
        assert_eq!(insert_missing_separators(text), text);
    }

    #[test]
    fn multibyte_text_is_copied_through() {
        assert_eq!(
            insert_missing_separators(r#""曲名": 5 "タグ": "abc""#),
            r#""曲名": 5, "タグ": "abc""#
        );
    }

    #[test]
    fn float_values_are_not_touched() {
        assert_eq!(
            insert_missing_separators(r#""bpm": 99.5 "x": 1"#),
            r#""bpm": 99.5 "x": 1"#
        );
    }
}
