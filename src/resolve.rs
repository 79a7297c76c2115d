//! Producer resolution from filename parentheticals.
//!
//! Candidates come from every `(...)` group of the extension-less filename and
//! are matched against the directory in two passes per producer:
//! - exact: candidate equals the normalized producer name or an alias
//! - partial: containment in either direction, only if the exact pass failed
//!
//! Producer names always count as global. Aliases go through
//! [`ProducerAlias::admits`] with the song's artist ids.

use anyhow::Result;
use log::debug;
use rustc_hash::FxHashSet;

use crate::config::{MatchMode, ResolveOptions};
use crate::library::AliasLookup;
use crate::models::{ArtistId, MatchKind, ProducerAlias, ProducerDirectoryEntry, ProducerId};
use crate::normalize::{normalize_token, parenthetical_groups, strip_extension, CREDIT_SEPARATOR};
use crate::scan::scan_producers;

// ============================================================================
// Candidate Extraction
// ============================================================================

/// Candidate producer tokens from a filename.
/// "song name (brandon x outtatown x acahi) ruff.mp3" → {"brandon", "outtatown", "acahi"}
pub fn extract_candidates(filename: &str) -> FxHashSet<String> {
    let name = strip_extension(filename);

    let mut candidates = FxHashSet::default();
    for group in parenthetical_groups(name) {
        for token in CREDIT_SEPARATOR.split(group) {
            let normalized = normalize_token(token);
            if !normalized.is_empty() {
                candidates.insert(normalized);
            }
        }
    }
    candidates
}

// ============================================================================
// Matching
// ============================================================================

/// A producer name or alias prepared for comparison against candidates.
struct Term<'a> {
    text: String,
    alias: Option<&'a ProducerAlias>,
}

impl Term<'_> {
    fn admits(&self, song_artist_ids: &[ArtistId]) -> bool {
        self.alias.map_or(true, |alias| alias.admits(song_artist_ids))
    }
}

/// Normalized producer name followed by its aliases; blank terms dropped.
fn terms(entry: &ProducerDirectoryEntry) -> Vec<Term<'_>> {
    let name = Term {
        text: normalize_token(&entry.name),
        alias: None,
    };
    let aliases = entry.aliases.iter().map(|alias| Term {
        text: normalize_token(&alias.alias_text),
        alias: Some(alias),
    });
    std::iter::once(name)
        .chain(aliases)
        .filter(|term| !term.text.is_empty())
        .collect()
}

fn is_partial(candidate: &str, term: &str) -> bool {
    term.contains(candidate) || candidate.contains(term)
}

/// Decide whether one producer qualifies for any of the candidates.
///
/// A candidate that equals a scoped-out alias never reaches the producer's
/// own name through containment: "acahi" scoped to another artist must not
/// come back in via "acahi beats". It can still be contained in another
/// alias the song's artists admit.
fn match_entry(
    entry: &ProducerDirectoryEntry,
    candidates: &FxHashSet<String>,
    song_artist_ids: &[ArtistId],
    options: &ResolveOptions,
) -> Option<MatchKind> {
    let terms = terms(entry);

    // (candidate, may match the producer name)
    let mut unmatched: Vec<(&str, bool)> = Vec::new();
    for candidate in candidates {
        let mut equal = terms.iter().filter(|term| term.text == *candidate).peekable();
        if equal.peek().is_none() {
            unmatched.push((candidate.as_str(), true));
        } else if equal.any(|term| term.admits(song_artist_ids)) {
            return Some(MatchKind::Exact);
        } else {
            unmatched.push((candidate.as_str(), false));
        }
    }

    let partial = unmatched
        .into_iter()
        .filter(|(candidate, _)| options.allows_partial(candidate))
        .any(|(candidate, name_allowed)| {
            terms.iter().any(|term| {
                (name_allowed || term.alias.is_some())
                    && is_partial(candidate, &term.text)
                    && term.admits(song_artist_ids)
            })
        });
    partial.then_some(MatchKind::Partial)
}

/// Resolve producer ids for a filename with default options.
///
/// An empty directory or a filename without parentheticals resolves to the
/// empty set.
pub fn resolve_producers(
    filename: &str,
    directory: &[ProducerDirectoryEntry],
    song_artist_ids: &[ArtistId],
) -> FxHashSet<ProducerId> {
    resolve_producers_with(filename, directory, song_artist_ids, &ResolveOptions::default())
}

pub fn resolve_producers_with(
    filename: &str,
    directory: &[ProducerDirectoryEntry],
    song_artist_ids: &[ArtistId],
    options: &ResolveOptions,
) -> FxHashSet<ProducerId> {
    if options.mode == MatchMode::Scan {
        return scan_producers(filename, directory, song_artist_ids);
    }

    let candidates = extract_candidates(filename);
    debug!("Potential producers extracted from {:?}: {:?}", filename, candidates);

    let mut matched = FxHashSet::default();
    if candidates.is_empty() {
        return matched;
    }

    for entry in directory {
        if matched.contains(&entry.id) {
            continue;
        }
        if let Some(kind) = match_entry(entry, &candidates, song_artist_ids, options) {
            debug!("{:?} match for producer {} ({})", kind, entry.id, entry.name);
            matched.insert(entry.id);
        }
    }
    matched
}

// ============================================================================
// Single Alias Lookup
// ============================================================================

/// Producer behind the first alias whose text equals `alias_name`
/// case-insensitively, if its scope admits the song's artists.
pub fn resolve_single_alias_producer(
    alias_name: &str,
    directory: &[ProducerDirectoryEntry],
    song_artist_ids: &[ArtistId],
) -> Option<ProducerId> {
    let wanted = alias_name.to_lowercase();
    directory
        .iter()
        .flat_map(|entry| entry.aliases.iter())
        .find(|alias| alias.alias_text.to_lowercase() == wanted)
        .filter(|alias| alias.admits(song_artist_ids))
        .map(|alias| alias.producer_id)
}

/// Same scoping check as [`resolve_single_alias_producer`], backed by an
/// external single-row alias lookup instead of a full directory snapshot.
pub fn find_producer_by_alias_name<L: AliasLookup + ?Sized>(
    alias_name: &str,
    song_artist_ids: &[ArtistId],
    lookup: &L,
) -> Result<Option<ProducerId>> {
    let found = lookup.find_alias(alias_name)?;
    Ok(found
        .filter(|alias| alias.admits(song_artist_ids))
        .map(|alias| alias.producer_id))
}

// ============================================================================
// TESTS
// ============================================================================
