//! Library lookups consumed by the resolver and the import planner.
//!
//! Two sources implement every lookup:
//! - `SqliteLibrary`: the library database (`artists`, `producers`,
//!   `producer_aliases`, `producer_alias_artists`), opened read-only
//! - `StaticLibrary`: an in-memory snapshot, usually loaded from JSON

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use crate::models::{AliasId, Artist, ArtistId, ProducerAlias, ProducerDirectoryEntry, ProducerId};

// ============================================================================
// Lookup Traits
// ============================================================================

/// Supplies every producer with its aliases and alias restrictions.
pub trait ProducerDirectoryProvider {
    fn producer_directory(&self) -> Result<Vec<ProducerDirectoryEntry>>;
}

/// Case-insensitive exact artist name → id.
pub trait ArtistLookup {
    fn find_artist_id(&self, name: &str) -> Result<Option<ArtistId>>;
}

/// Case-insensitive exact alias text → the first matching alias.
pub trait AliasLookup {
    fn find_alias(&self, alias: &str) -> Result<Option<ProducerAlias>>;
}

/// Everything the binary needs from one source.
pub trait Library: ProducerDirectoryProvider + ArtistLookup + AliasLookup {}

impl<T: ProducerDirectoryProvider + ArtistLookup + AliasLookup> Library for T {}

// ============================================================================
// SQLite
// ============================================================================

pub struct SqliteLibrary {
    conn: Connection,
}

impl SqliteLibrary {
    /// Open an existing library database without write access.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .with_context(|| format!("Failed to open library database {}", path.display()))?;
        Ok(Self { conn })
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    fn restrictions_for(&self, alias_id: AliasId) -> Result<BTreeSet<ArtistId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT artist_id FROM producer_alias_artists WHERE alias_id = ?1")?;
        let ids = stmt
            .query_map(params![alias_id], |row| row.get(0))?
            .collect::<rusqlite::Result<BTreeSet<ArtistId>>>()?;
        Ok(ids)
    }
}

impl ProducerDirectoryProvider for SqliteLibrary {
    fn producer_directory(&self) -> Result<Vec<ProducerDirectoryEntry>> {
        // Three flat reads, joined in memory
        let mut restrictions: FxHashMap<AliasId, BTreeSet<ArtistId>> = FxHashMap::default();
        let mut stmt = self
            .conn
            .prepare("SELECT alias_id, artist_id FROM producer_alias_artists")
            .context("Failed to read alias restrictions")?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let alias_id: AliasId = row.get(0)?;
            let artist_id: ArtistId = row.get(1)?;
            restrictions.entry(alias_id).or_default().insert(artist_id);
        }

        let mut aliases: FxHashMap<ProducerId, Vec<ProducerAlias>> = FxHashMap::default();
        let mut stmt = self
            .conn
            .prepare("SELECT id, producer_id, alias FROM producer_aliases ORDER BY id")
            .context("Failed to read producer aliases")?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let id: AliasId = row.get(0)?;
            let producer_id: ProducerId = row.get(1)?;
            aliases.entry(producer_id).or_default().push(ProducerAlias {
                id,
                producer_id,
                alias_text: row.get(2)?,
                restricted_artist_ids: restrictions.remove(&id).unwrap_or_default(),
            });
        }

        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM producers ORDER BY id")
            .context("Failed to read producers")?;
        let producers = stmt
            .query_map([], |row| Ok((row.get::<_, ProducerId>(0)?, row.get::<_, String>(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(producers
            .into_iter()
            .map(|(id, name)| ProducerDirectoryEntry {
                id,
                name,
                aliases: aliases.remove(&id).unwrap_or_default(),
            })
            .collect())
    }
}

impl ArtistLookup for SqliteLibrary {
    fn find_artist_id(&self, name: &str) -> Result<Option<ArtistId>> {
        self.conn
            .query_row(
                "SELECT id FROM artists WHERE LOWER(name) = LOWER(?1) LIMIT 1",
                params![name],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("Failed to look up artist {:?}", name))
    }
}

impl AliasLookup for SqliteLibrary {
    fn find_alias(&self, alias: &str) -> Result<Option<ProducerAlias>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, producer_id, alias FROM producer_aliases
                 WHERE LOWER(alias) = LOWER(?1) ORDER BY id LIMIT 1",
                params![alias],
                |row| Ok((row.get::<_, AliasId>(0)?, row.get::<_, ProducerId>(1)?, row.get::<_, String>(2)?)),
            )
            .optional()
            .with_context(|| format!("Failed to look up alias {:?}", alias))?;

        let Some((id, producer_id, alias_text)) = row else {
            return Ok(None);
        };
        Ok(Some(ProducerAlias {
            id,
            producer_id,
            alias_text,
            restricted_artist_ids: self.restrictions_for(id)?,
        }))
    }
}

// ============================================================================
// In-memory Snapshot
// ============================================================================

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StaticLibrary {
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub producers: Vec<ProducerDirectoryEntry>,
}

impl StaticLibrary {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read library snapshot {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Invalid library snapshot {}", path.display()))
    }
}

impl ProducerDirectoryProvider for StaticLibrary {
    fn producer_directory(&self) -> Result<Vec<ProducerDirectoryEntry>> {
        Ok(self.producers.clone())
    }
}

impl ArtistLookup for StaticLibrary {
    fn find_artist_id(&self, name: &str) -> Result<Option<ArtistId>> {
        let wanted = name.to_lowercase();
        Ok(self
            .artists
            .iter()
            .find(|artist| artist.name.to_lowercase() == wanted)
            .map(|artist| artist.id))
    }
}

impl AliasLookup for StaticLibrary {
    fn find_alias(&self, alias: &str) -> Result<Option<ProducerAlias>> {
        let wanted = alias.to_lowercase();
        Ok(self
            .producers
            .iter()
            .flat_map(|entry| entry.aliases.iter())
            .find(|candidate| candidate.alias_text.to_lowercase() == wanted)
            .cloned())
    }
}

// ============================================================================
// TESTS
// ============================================================================
