//! Filename sanitization.

/// Characters Windows rejects in filenames. Levels get shared between
/// platforms, so names are kept portable regardless of the local OS.
const ILLEGAL: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Removes every illegal character from `name`.
///
/// Characters are dropped, not replaced, matching how the game community's
/// tooling names files; the result can be shorter than the input and may
/// be empty (the caller treats empty as an error).
pub fn sanitize_filename(name: &str) -> String {
    name.chars().filter(|c| !ILLEGAL.contains(c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_illegal_characters() {
        assert_eq!(sanitize_filename("a<b>c:d\"e/f\\g|h?i*j.rdzip"), "abcdefghij.rdzip");
    }

    #[test]
    fn leaves_legal_names_alone() {
        assert_eq!(
            sanitize_filename("Bill_Wurtz_-_Chips (2).rdzip"),
            "Bill_Wurtz_-_Chips (2).rdzip"
        );
    }

    #[test]
    fn no_substitution_characters_introduced() {
        assert_eq!(sanitize_filename("???"), "");
    }
}
