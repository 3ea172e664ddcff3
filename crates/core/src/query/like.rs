//! SQL `LIKE` matching, as SQLite evaluates it by default.
//!
//! `%` matches any sequence of characters (including none), `_` matches
//! exactly one character, and ASCII letters compare case-insensitively.

/// Checks whether `text` matches a `LIKE` pattern.
///
/// # Examples
///
/// ```
/// use keystone_core::query::like_matches;
///
/// assert!(like_matches("ada%", "Ada Lovelace"));
/// assert!(like_matches("%love%", "Ada Lovelace"));
/// assert!(like_matches("a_a", "ADA"));
/// assert!(!like_matches("ada", "adam"));
/// ```
pub fn like_matches(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut p, mut t) = (0, 0);
    // Position of the last '%' seen and the text index it was tried against.
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && pattern[p] == '%' {
            backtrack = Some((p, t));
            p += 1;
        } else if p < pattern.len()
            && (pattern[p] == '_' || pattern[p].eq_ignore_ascii_case(&text[t]))
        {
            p += 1;
            t += 1;
        } else if let Some((star, matched)) = backtrack {
            p = star + 1;
            t = matched + 1;
            backtrack = Some((star, matched + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|c| *c == '%')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_is_case_insensitive() {
        assert!(like_matches("hello", "HeLLo"));
        assert!(!like_matches("hello", "hell"));
    }

    #[test]
    fn test_percent_wildcards() {
        assert!(like_matches("%", ""));
        assert!(like_matches("%", "anything"));
        assert!(like_matches("a%", "abc"));
        assert!(like_matches("%c", "abc"));
        assert!(like_matches("a%c", "abbbc"));
        assert!(like_matches("a%%c", "ac"));
        assert!(!like_matches("a%c", "abcd"));
    }

    #[test]
    fn test_underscore_matches_one_character() {
        assert!(like_matches("_b_", "abc"));
        assert!(!like_matches("_b_", "bc"));
        assert!(!like_matches("_", ""));
    }

    #[test]
    fn test_backtracking() {
        assert!(like_matches("%ab%ab", "xxabyyabab"));
        assert!(!like_matches("%ab%ab", "xxabyyaba"));
    }

    #[test]
    fn test_empty_pattern() {
        assert!(like_matches("", ""));
        assert!(!like_matches("", "a"));
    }

    #[test]
    fn test_non_ascii_compares_exactly() {
        assert!(like_matches("é%", "étude"));
        assert!(!like_matches("É%", "étude"));
    }
}
