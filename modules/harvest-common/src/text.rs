/// Hard character cut. Returns the (possibly shortened) text and whether it was cut.
/// Counts chars, not bytes, so multi-byte text is never split mid-codepoint.
pub fn truncate(text: &str, limit: usize) -> (String, bool) {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => (text[..byte_idx].to_string(), true),
        None => (text.to_string(), false),
    }
}

/// Collapse every whitespace run into a single space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_unchanged() {
        assert_eq!(truncate("hello", 5), ("hello".to_string(), false));
        assert_eq!(truncate("", 0), (String::new(), false));
    }

    #[test]
    fn long_text_is_cut_to_exact_limit() {
        let (text, cut) = truncate("hello world", 5);
        assert_eq!(text, "hello");
        assert!(cut);
    }

    #[test]
    fn cut_ignores_word_boundaries() {
        let (text, cut) = truncate("abcdef ghij", 8);
        assert_eq!(text, "abcdef g");
        assert!(cut);
    }

    #[test]
    fn limit_counts_characters_not_bytes() {
        let (text, cut) = truncate("привет мир", 6);
        assert_eq!(text, "привет");
        assert_eq!(text.chars().count(), 6);
        assert!(cut);
    }

    #[test]
    fn zero_limit_empties_non_empty_text() {
        assert_eq!(truncate("x", 0), (String::new(), true));
    }

    #[test]
    fn whitespace_runs_collapse() {
        assert_eq!(collapse_whitespace("  Buy\n\t now   please "), "Buy now please");
        assert_eq!(collapse_whitespace(" \n "), "");
    }
}
