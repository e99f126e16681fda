//! SQL utility functions

/// Escape SQL LIKE metacharacters (%, _, \) in user input
///
/// Pair the resulting pattern with `ESCAPE '\'` in the query.
///
/// # Example
///
/// ```
/// use campus_insider_server::utils::sql::escape_like_pattern;
///
/// let pattern = format!("%{}%", escape_like_pattern("Room_1 (50%)"));
/// assert_eq!(pattern, "%Room\\_1 (50\\%)%");
/// ```
pub fn escape_like_pattern(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Substring pattern for `LIKE ? ESCAPE '\'`
pub fn contains_pattern(s: &str) -> String {
    format!("%{}%", escape_like_pattern(s.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_names_unchanged() {
        assert_eq!(escape_like_pattern("Bailey Hall"), "Bailey Hall");
    }

    #[test]
    fn test_metacharacters_escaped() {
        assert_eq!(escape_like_pattern("lab_2"), "lab\\_2");
        assert_eq!(escape_like_pattern("100%"), "100\\%");
        assert_eq!(escape_like_pattern("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_contains_pattern_trims() {
        assert_eq!(contains_pattern("  maine "), "%maine%");
        assert_eq!(contains_pattern(""), "%%");
    }
}
