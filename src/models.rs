//! Core data models for credit resolution.
//!
//! The producer directory is a plain value tree (producer → aliases →
//! restricted artist ids) so matching never touches the store that produced it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ============================================================================
// Type Aliases
// ============================================================================

/// SQLite rowid of an `artists` row
pub type ArtistId = i64;

/// SQLite rowid of a `producers` row
pub type ProducerId = i64;

/// SQLite rowid of a `producer_aliases` row
pub type AliasId = i64;

// ============================================================================
// Producer Directory
// ============================================================================

/// Alternate credit for a producer, optionally limited to certain artists' songs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProducerAlias {
    pub id: AliasId,
    pub producer_id: ProducerId,
    pub alias_text: String,
    /// Empty means global. A missing list in a snapshot also means global.
    #[serde(default)]
    pub restricted_artist_ids: BTreeSet<ArtistId>,
}

impl ProducerAlias {
    pub fn is_global(&self) -> bool {
        self.restricted_artist_ids.is_empty()
    }

    /// Whether this alias may resolve to its producer for a song credited to
    /// `song_artist_ids`.
    pub fn admits(&self, song_artist_ids: &[ArtistId]) -> bool {
        self.is_global()
            || song_artist_ids
                .iter()
                .any(|id| self.restricted_artist_ids.contains(id))
    }
}

/// One producer with all of its aliases, as supplied by the directory provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProducerDirectoryEntry {
    pub id: ProducerId,
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<ProducerAlias>,
}

// ============================================================================
// Artists
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: ArtistId,
    pub name: String,
}

// ============================================================================
// Match Diagnostics
// ============================================================================

/// How a producer qualified during resolution. Only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    Partial,
}
