//! Artist credit segmentation.

use log::debug;
use rustc_hash::FxHashSet;

use crate::normalize::ARTIST_DELIMITER;

/// Split a raw artist credit into individual names.
///
/// Names are trimmed, empties dropped, and exact duplicates removed keeping
/// the first occurrence. Differently-cased spellings are both kept; equality
/// against the artist table is the lookup's job.
///
/// ```
/// use credit_resolver::segment_artists;
///
/// assert_eq!(
///     segment_artists(Some("Kanye West feat. Jay-Z & Rihanna")),
///     vec!["Kanye West", "Jay-Z", "Rihanna"]
/// );
/// assert!(segment_artists(None).is_empty());
/// ```
pub fn segment_artists(raw: Option<&str>) -> Vec<String> {
    let raw = match raw {
        Some(s) if !s.trim().is_empty() => s,
        _ => return Vec::new(),
    };

    let mut seen: FxHashSet<&str> = FxHashSet::default();
    let names: Vec<String> = ARTIST_DELIMITER
        .split(raw)
        .map(str::trim)
        .filter(|name| !name.is_empty() && seen.insert(*name))
        .map(str::to_string)
        .collect();

    debug!("Segmented artist credit {:?} into {:?}", raw, names);
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_inputs() {
        assert!(segment_artists(None).is_empty());
        assert!(segment_artists(Some("")).is_empty());
        assert!(segment_artists(Some("   ")).is_empty());
    }

    #[test]
    fn test_featuring_and_ampersand() {
        assert_eq!(
            segment_artists(Some("Kanye West feat. Jay-Z & Rihanna")),
            vec!["Kanye West", "Jay-Z", "Rihanna"]
        );
        assert_eq!(
            segment_artists(Some("Drake FT. Future featuring Young Thug")),
            vec!["Drake", "Future", "Young Thug"]
        );
        assert_eq!(segment_artists(Some("Gucci Mane ft Lil Baby")), vec!["Gucci Mane", "Lil Baby"]);
    }

    #[test]
    fn test_dedupe_preserves_order() {
        assert_eq!(
            segment_artists(Some("The Beatles, John Lennon, The Beatles")),
            vec!["The Beatles", "John Lennon"]
        );
        // Case-sensitive: both spellings survive
        assert_eq!(segment_artists(Some("SZA; sza")), vec!["SZA", "sza"]);
    }

    #[test]
    fn test_featuring_words_need_whitespace() {
        // "ft" inside a word is not a delimiter
        assert_eq!(segment_artists(Some("Daft Punk")), vec!["Daft Punk"]);
        assert_eq!(segment_artists(Some("Featurette")), vec!["Featurette"]);
    }

    #[test]
    fn test_only_delimiters() {
        assert!(segment_artists(Some(", & ;")).is_empty());
        assert!(segment_artists(Some(",,,")).is_empty());
    }

    #[test]
    fn test_single_name_is_trimmed() {
        assert_eq!(segment_artists(Some("  Rosalía  ")), vec!["Rosalía"]);
    }

    #[test]
    fn test_segments_are_trimmed_and_non_empty() {
        let inputs = [
            " a ,b&  c ;; d feat. e ",
            "&&x ft. ft. y",
            "one featuring  two , , three",
            "\tleading tab & trailing\n",
        ];
        for input in inputs {
            for name in segment_artists(Some(input)) {
                assert!(!name.is_empty());
                assert_eq!(name, name.trim());
            }
        }
    }
}
