//! Permissive Content-Disposition filename extraction.
//!
//! Hosts serving level packages emit wildly inconsistent headers, so this
//! accepts any `filename...=` parameter: the value may be single-quoted,
//! double-quoted, or a bare token running to the next `;` or end of line.

/// Extracts the filename value from a raw Content-Disposition header.
///
/// Scans for `filename`, skips any parameter-name suffix (so `filename*=`
/// is accepted too), and takes the value after `=`. Surrounding quotes of
/// either kind are stripped. Returns `None` when no `filename...=`
/// parameter exists; an empty value yields `Some("")` and is rejected
/// later by sanitization.
pub fn extract_filename(header: &str) -> Option<String> {
    let bytes = header.as_bytes();
    let mut search_from = 0;

    while let Some(rel) = header[search_from..].find("filename") {
        let start = search_from + rel;
        let mut i = start + "filename".len();

        // Skip the rest of the parameter name (e.g. `*` in `filename*`).
        while i < bytes.len() && !matches!(bytes[i], b';' | b'=' | b'\n') {
            i += 1;
        }

        if i < bytes.len() && bytes[i] == b'=' {
            return Some(value_after_equals(&header[i + 1..]));
        }

        // No '=' for this occurrence; keep looking.
        search_from = start + "filename".len();
    }

    None
}

/// Takes the parameter value: quoted (minimal, up to the matching quote)
/// or unquoted (up to `;` or newline or end).
fn value_after_equals(rest: &str) -> String {
    let mut chars = rest.char_indices();
    if let Some((_, quote @ ('"' | '\''))) = chars.clone().next() {
        chars.next();
        for (idx, c) in chars {
            if c == quote {
                return rest[1..idx].to_string();
            }
        }
        // Unterminated quote: fall through and treat as a bare token.
    }

    let end = rest
        .find(|c| c == ';' || c == '\n')
        .unwrap_or(rest.len());
    rest[..end].to_string()
}
