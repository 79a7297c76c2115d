//! Shared patterns and normalization for credit matching.
//! Used by the segmenter, the parenthetical resolver and the filename scanner.
//!
//! CRITICAL: candidate tokens and directory terms must go through the same
//! `normalize_token`, otherwise exact matches silently turn into misses.

use once_cell::sync::Lazy;
use regex::Regex;

// ============================================================================
// REGEX PATTERNS
// ============================================================================

/// Artist credit delimiters: `,` `&` `;` and whitespace-bounded featuring words.
/// "Kanye West feat. Jay-Z & Rihanna" → ["Kanye West", "Jay-Z", "Rihanna"]
pub static ARTIST_DELIMITER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[,&;]|\s+(?:feat\.?|ft\.?|featuring)\s+").unwrap()
});

/// Trailing extension: last dot and everything after it, as long as that
/// tail holds no further dot or path separator.
pub static FILE_EXTENSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.[^/.]+$").unwrap());

/// Non-nested parenthetical group; capture 1 is the content.
pub static PARENTHETICAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(([^)]+)\)").unwrap());

/// Collaboration separators inside a parenthetical:
/// "brandon x outtatown & acahi" → ["brandon", "outtatown", "acahi"]
pub static CREDIT_SEPARATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\s+x\s+|\s*&\s*|\s*,\s*|\s*;\s*|\s+and\s+|\s+feat\.?\s+|\s+ft\.?\s+|\s+with\s+",
    )
    .unwrap()
});

/// Anything that is not a letter, a digit or whitespace
pub static NON_ALPHANUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\p{L}\p{N}\s]").unwrap());

/// Any whitespace run, collapsed to one space
pub static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

// ============================================================================
// NORMALIZATION FUNCTIONS
// ============================================================================

/// Remove the trailing extension: "song (a x b).mp3" → "song (a x b)".
pub fn strip_extension(filename: &str) -> &str {
    match FILE_EXTENSION.find(filename) {
        Some(m) => &filename[..m.start()],
        None => filename,
    }
}

/// Contents of every `(...)` group, in order of appearance.
pub fn parenthetical_groups(name: &str) -> impl Iterator<Item = &str> {
    PARENTHETICAL
        .captures_iter(name)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
}

/// Normalize a credit token for comparison.
/// Strips punctuation, collapses whitespace and lowercases:
/// "  Brandon-Beatz!! " → "brandonbeatz", "Outta   Town" → "outta town"
pub fn normalize_token(token: &str) -> String {
    let stripped = NON_ALPHANUMERIC.replace_all(token.trim(), "");
    let collapsed = WHITESPACE_RUN.replace_all(&stripped, " ");
    collapsed.trim().to_lowercase()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_extension() {
        assert_eq!(strip_extension("song (brandon).mp3"), "song (brandon)");
        assert_eq!(strip_extension("archive.tar.gz"), "archive.tar");
        assert_eq!(strip_extension("no extension"), "no extension");
        // A trailing dot has nothing after it to strip
        assert_eq!(strip_extension("ends with dot."), "ends with dot.");
        // Dots inside a directory component are not an extension
        assert_eq!(strip_extension("v1.2/track"), "v1.2/track");
    }

    #[test]
    fn test_parenthetical_groups() {
        let groups: Vec<&str> = parenthetical_groups("a (one) b (two x three) c").collect();
        assert_eq!(groups, vec!["one", "two x three"]);
        // Empty groups are skipped, nesting is not understood
        let groups: Vec<&str> = parenthetical_groups("() (outer (inner) tail)").collect();
        assert_eq!(groups, vec!["outer (inner"]);
    }

    #[test]
    fn test_normalize_token() {
        assert_eq!(normalize_token("  Brandon-Beatz!! "), "brandonbeatz");
        assert_eq!(normalize_token("Outta \t  Town"), "outta town");
        assert_eq!(normalize_token("Métro Boomin"), "métro boomin");
        assert_eq!(normalize_token("prod_by"), "prodby");
        assert_eq!(normalize_token("?!."), "");
    }

    #[test]
    fn test_credit_separator_is_word_aware() {
        let parts: Vec<&str> = CREDIT_SEPARATOR.split("Xander X Maxx and Andy").collect();
        assert_eq!(parts, vec!["Xander", "Maxx", "Andy"]);
        let parts: Vec<&str> = CREDIT_SEPARATOR.split("a feat. b ft c with d").collect();
        assert_eq!(parts, vec!["a", "b", "c", "d"]);
    }
}
