//! Whole-filename producer scan.
//!
//! Unlike the parenthetical resolver this looks at the entire extension-less
//! filename. Terms are tried longest first and every hit claims its byte
//! range, so "metro boomin" wins over a separate producer called "metro".
//! Word-bounded hits are collected before plain substring hits.

use log::debug;
use regex::Regex;
use rustc_hash::FxHashSet;
use std::ops::Range;

use crate::models::{ArtistId, ProducerDirectoryEntry, ProducerId};
use crate::normalize::strip_extension;

struct ScanTerm {
    text: String,
    producer_id: ProducerId,
}

/// Lowercased names and admitted aliases, longest first.
fn scan_terms(directory: &[ProducerDirectoryEntry], song_artist_ids: &[ArtistId]) -> Vec<ScanTerm> {
    let mut terms: Vec<ScanTerm> = Vec::new();
    for entry in directory {
        terms.push(ScanTerm {
            text: entry.name.to_lowercase(),
            producer_id: entry.id,
        });
        for alias in &entry.aliases {
            if alias.admits(song_artist_ids) {
                terms.push(ScanTerm {
                    text: alias.alias_text.to_lowercase(),
                    producer_id: entry.id,
                });
            }
        }
    }
    terms.retain(|term| !term.text.trim().is_empty());
    // Stable: equal lengths keep directory order
    terms.sort_by(|a, b| b.text.len().cmp(&a.text.len()));
    terms
}

/// Tracks which byte ranges of the filename have been claimed.
#[derive(Default)]
struct Claims {
    ranges: Vec<Range<usize>>,
}

impl Claims {
    fn overlaps(&self, range: &Range<usize>) -> bool {
        self.ranges
            .iter()
            .any(|r| range.start < r.end && r.start < range.end)
    }

    /// Claim `range` unless part of it is already taken.
    fn claim(&mut self, range: Range<usize>) -> bool {
        if self.overlaps(&range) {
            return false;
        }
        self.ranges.push(range);
        true
    }
}

/// Scan a filename for producer names and aliases.
pub fn scan_producers(
    filename: &str,
    directory: &[ProducerDirectoryEntry],
    song_artist_ids: &[ArtistId],
) -> FxHashSet<ProducerId> {
    let lowered = filename.to_lowercase();
    let name = strip_extension(&lowered);
    let terms = scan_terms(directory, song_artist_ids);

    let mut matched = FxHashSet::default();
    let mut claims = Claims::default();

    // Pass 1: word-bounded occurrences
    for term in &terms {
        let Ok(pattern) = Regex::new(&format!(r"\b{}\b", regex::escape(&term.text))) else {
            continue;
        };
        for m in pattern.find_iter(name) {
            if claims.claim(m.range()) {
                matched.insert(term.producer_id);
            }
        }
    }

    // Pass 2: first plain substring occurrence
    for term in &terms {
        if let Some(start) = name.find(term.text.as_str()) {
            if claims.claim(start..start + term.text.len()) {
                matched.insert(term.producer_id);
            }
        }
    }

    debug!("Filename scan of {:?} matched producers {:?}", filename, matched);
    matched
}
