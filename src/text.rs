//! Text normalization and casing predicates shared by the structure passes.

use unicode_normalization::UnicodeNormalization;

/// Normalize extracted text: NFKC (folds ligatures such as `ﬁ`), collapse
/// runs of whitespace to a single space, trim.
pub fn normalize_text(text: &str) -> String {
    let folded: String = text.nfkc().collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Comparison key: normalized and lowercased.
pub fn normalize_key(text: &str) -> String {
    normalize_text(text).to_lowercase()
}

/// Whitespace-separated words.
pub fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
}

/// Number of whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    words(text).count()
}

fn is_cased(c: char) -> bool {
    c.is_lowercase() || c.is_uppercase()
}

/// True when the text has at least one cased character and none of them are
/// uppercase.
pub fn is_all_lower(text: &str) -> bool {
    text.chars().any(is_cased) && !text.chars().any(char::is_uppercase)
}

/// True when the text has at least one cased character and none of them are
/// lowercase.
pub fn is_all_upper(text: &str) -> bool {
    text.chars().any(is_cased) && !text.chars().any(char::is_lowercase)
}

/// Title case: every run of cased characters starts with an uppercase letter
/// followed only by lowercase ones. `"Annual Report 2024"` qualifies,
/// `"Annual report"` and `"ANNUAL Report"` do not.
pub fn is_title_case(text: &str) -> bool {
    let mut seen_cased = false;
    let mut previous_cased = false;

    for c in text.chars() {
        if c.is_uppercase() {
            if previous_cased {
                return false;
            }
            previous_cased = true;
            seen_cased = true;
        } else if c.is_lowercase() {
            if !previous_cased {
                return false;
            }
            previous_cased = true;
            seen_cased = true;
        } else {
            previous_cased = false;
        }
    }

    seen_cased
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Pro\u{FB01}le   setup \n"), "Profile setup");
        assert_eq!(normalize_key("Hello  WORLD"), "hello world");
    }

    #[test]
    fn test_case_predicates() {
        assert!(is_all_lower("just some words 12"));
        assert!(!is_all_lower("1234"));
        assert!(!is_all_lower("Mixed case"));

        assert!(is_all_upper("TABLE OF CONTENTS"));
        assert!(!is_all_upper("Table"));
        assert!(!is_all_upper("2024"));
    }

    #[test]
    fn test_title_case() {
        assert!(is_title_case("Annual Report 2024"));
        assert!(is_title_case("Getting-Started Guide"));
        assert!(!is_title_case("Annual report"));
        assert!(!is_title_case("ANNUAL Report"));
        assert!(!is_title_case("42"));
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("  one two\tthree "), 3);
        assert_eq!(word_count(""), 0);
    }
}
