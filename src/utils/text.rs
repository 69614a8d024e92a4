/// Removes every whitespace character, so "COEN 12" and "COEN12" compare equal.
pub fn compact_code(code: &str) -> String {
    code.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Course codes match exactly or after whitespace removal.
pub fn codes_match(a: &str, b: &str) -> bool {
    a == b || compact_code(a) == compact_code(b)
}

/// Splits "Ada King Lovelace" into ("Ada", "King Lovelace").
pub fn split_display_name(display_name: &str) -> (Option<String>, String) {
    let mut words = display_name.split_whitespace();
    let first = words.next().map(String::from);
    let rest = words.collect::<Vec<_>>().join(" ");
    (first, rest)
}

pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Case-insensitive substring match.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_match_ignores_whitespace() {
        assert!(codes_match("COEN 12", "COEN 12"));
        assert!(codes_match("COEN 12", "COEN12"));
        assert!(codes_match(" COEN\t12 ", "COEN12"));
        assert!(!codes_match("COEN 12", "COEN 120"));
    }

    #[test]
    fn test_split_display_name() {
        assert_eq!(
            split_display_name("Ada King Lovelace"),
            (Some("Ada".to_string()), "King Lovelace".to_string())
        );
        assert_eq!(split_display_name("Ada"), (Some("Ada".to_string()), String::new()));
        assert_eq!(split_display_name("   "), (None, String::new()));
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Abstract Data Types", "data"));
        assert!(!contains_ignore_case("Embedded Systems", "data"));
    }
}
