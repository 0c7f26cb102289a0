// src/enrich/text.rs

/// Scraped lyrics carry line breaks as the two characters `\` `n`.
pub const ESCAPED_NEWLINE: &str = "\\n";

/// Replace literal `\n` sequences with spaces.
pub fn unescape_newlines(text: &str) -> String {
    text.replace(ESCAPED_NEWLINE, " ")
}

/// Map every ASCII punctuation character to a space.
pub fn strip_punctuation(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii_punctuation() { ' ' } else { c })
        .collect()
}

/// Lowercase, unescape newlines, blank out punctuation.
pub fn normalize_for_matching(text: &str) -> String {
    strip_punctuation(&unescape_newlines(&text.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes() {
        assert_eq!(
            normalize_for_matching("Hell yeah,\\nHELL-no!"),
            "hell yeah  hell no "
        );
        assert_eq!(
            normalize_for_matching("Hell yeah, hell no, heaven,")
                .split_whitespace()
                .count(),
            5
        );
    }
}
