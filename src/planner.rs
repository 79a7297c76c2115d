//! Import planning: turn uploaded tracks into artist and producer credits.
//!
//! For a batch of (filename, artist tag) submissions:
//! 1. segment every artist tag
//! 2. look each distinct name up once, case-insensitively
//! 3. fall back to the caller's artist ids (usually the album's) when a track
//!    maps none of its names
//! 4. fetch one producer directory snapshot and resolve producers per track
//!
//! Nothing is written; the plan is what the upload workflow would persist.

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use log::{info, warn};
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::{NoticeConfig, ResolveOptions};
use crate::library::{ArtistLookup, ProducerDirectoryProvider};
use crate::models::{ArtistId, ProducerId};
use crate::notice::{format_notice, Clock, NoticeDeduper, SystemClock};
use crate::progress::log_progress;
use crate::resolve::resolve_producers_with;
use crate::segment::segment_artists;

/// Tracks between progress lines in log-only mode
const PROGRESS_LOG_INTERVAL: u64 = 500;

// ============================================================================
// Plan Models
// ============================================================================

/// One uploaded file as seen by the planner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackSubmission {
    pub filename: String,
    /// Raw artist tag from the metadata extractor
    #[serde(default)]
    pub artist: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedTrack {
    pub filename: String,
    pub parsed_artists: Vec<String>,
    pub artist_ids: Vec<ArtistId>,
    /// Artist ids came from the fallback list, not the tag
    pub inherited_artists: bool,
    pub has_unmapped_artists: bool,
    /// Sorted ascending
    pub producer_ids: Vec<ProducerId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportPlan {
    pub tracks: Vec<PlannedTrack>,
    /// Parsed names with no artist row, in first-seen order
    pub unmapped_artists: Vec<String>,
}

impl ImportPlan {
    pub fn tracks_without_producers(&self) -> usize {
        self.tracks.iter().filter(|t| t.producer_ids.is_empty()).count()
    }
}

// ============================================================================
// Planner
// ============================================================================

pub struct ImportPlanner<C: Clock = SystemClock> {
    options: ResolveOptions,
    notices: NoticeDeduper<C>,
}

impl ImportPlanner<SystemClock> {
    pub fn new(options: ResolveOptions, notice_config: &NoticeConfig) -> Self {
        Self::with_notices(options, NoticeDeduper::new(notice_config))
    }
}

impl<C: Clock> ImportPlanner<C> {
    pub fn with_notices(options: ResolveOptions, notices: NoticeDeduper<C>) -> Self {
        Self { options, notices }
    }

    pub fn plan<A, P>(
        &self,
        submissions: &[TrackSubmission],
        artists: &A,
        producers: &P,
        fallback_artist_ids: &[ArtistId],
    ) -> Result<ImportPlan>
    where
        A: ArtistLookup + ?Sized,
        P: ProducerDirectoryProvider + ?Sized,
    {
        self.plan_with_progress(
            submissions,
            artists,
            producers,
            fallback_artist_ids,
            &ProgressBar::hidden(),
        )
    }

    /// Like [`plan`](Self::plan), ticking `progress` once per resolved track.
    pub fn plan_with_progress<A, P>(
        &self,
        submissions: &[TrackSubmission],
        artists: &A,
        producers: &P,
        fallback_artist_ids: &[ArtistId],
        progress: &ProgressBar,
    ) -> Result<ImportPlan>
    where
        A: ArtistLookup + ?Sized,
        P: ProducerDirectoryProvider + ?Sized,
    {
        let parsed: Vec<Vec<String>> = submissions
            .iter()
            .map(|s| segment_artists(s.artist.as_deref()))
            .collect();

        // Lowercased name -> id, one lookup per distinct spelling
        let mut known: FxHashMap<String, ArtistId> = FxHashMap::default();
        let mut looked_up: FxHashSet<&str> = FxHashSet::default();
        let mut unmapped: Vec<String> = Vec::new();
        for name in parsed.iter().flatten() {
            if !looked_up.insert(name.as_str()) {
                continue;
            }
            let key = name.to_lowercase();
            if known.contains_key(&key) {
                continue;
            }
            match artists.find_artist_id(name) {
                Ok(Some(id)) => {
                    known.insert(key, id);
                }
                Ok(None) => unmapped.push(name.clone()),
                Err(err) => {
                    let notice = format_notice(Some("Artist lookup"), &format!("{:#}", err));
                    if self.notices.should_emit(&notice) {
                        warn!("{}", notice);
                    }
                    unmapped.push(name.clone());
                }
            }
        }

        let mut tracks: Vec<PlannedTrack> = submissions
            .iter()
            .zip(parsed)
            .map(|(submission, parsed_artists)| {
                let mut artist_ids: Vec<ArtistId> = Vec::new();
                let mut has_unmapped_artists = false;
                for name in &parsed_artists {
                    match known.get(&name.to_lowercase()) {
                        Some(id) if !artist_ids.contains(id) => artist_ids.push(*id),
                        Some(_) => {}
                        None => has_unmapped_artists = true,
                    }
                }
                let inherited_artists = artist_ids.is_empty() && !fallback_artist_ids.is_empty();
                if inherited_artists {
                    artist_ids = fallback_artist_ids.to_vec();
                }
                PlannedTrack {
                    filename: submission.filename.clone(),
                    parsed_artists,
                    artist_ids,
                    inherited_artists,
                    has_unmapped_artists,
                    producer_ids: Vec::new(),
                }
            })
            .collect();

        let directory = producers
            .producer_directory()
            .context("Failed to load producer directory")?;

        let total = tracks.len() as u64;
        let done = AtomicU64::new(0);
        tracks.par_iter_mut().for_each(|track| {
            let mut ids: Vec<ProducerId> =
                resolve_producers_with(&track.filename, &directory, &track.artist_ids, &self.options)
                    .into_iter()
                    .collect();
            ids.sort_unstable();
            track.producer_ids = ids;
            progress.inc(1);
            let current = done.fetch_add(1, Ordering::Relaxed) + 1;
            log_progress("resolve", current, total, PROGRESS_LOG_INTERVAL);
        });

        let plan = ImportPlan {
            tracks,
            unmapped_artists: unmapped,
        };
        info!(
            "Planned {} tracks against {} producers: {} unmapped artists, {} tracks without producers",
            plan.tracks.len(),
            directory.len(),
            plan.unmapped_artists.len(),
            plan.tracks_without_producers()
        );
        Ok(plan)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::StaticLibrary;
    use crate::models::{Artist, ProducerAlias, ProducerDirectoryEntry};
    use anyhow::bail;
    use std::sync::atomic::AtomicUsize;

    fn library() -> StaticLibrary {
        StaticLibrary {
            artists: vec![
                Artist { id: 7, name: "Lil Tecca".to_string() },
                Artist { id: 8, name: "Ken Carson".to_string() },
            ],
            producers: vec![
                ProducerDirectoryEntry {
                    id: 1,
                    name: "OuttaTown".to_string(),
                    aliases: Vec::new(),
                },
                ProducerDirectoryEntry {
                    id: 2,
                    name: "Acahi Beats".to_string(),
                    aliases: vec![ProducerAlias {
                        id: 21,
                        producer_id: 2,
                        alias_text: "acahi".to_string(),
                        restricted_artist_ids: [7].into_iter().collect(),
                    }],
                },
            ],
        }
    }

    fn submission(filename: &str, artist: Option<&str>) -> TrackSubmission {
        TrackSubmission {
            filename: filename.to_string(),
            artist: artist.map(str::to_string),
        }
    }

    fn planner() -> ImportPlanner {
        ImportPlanner::new(ResolveOptions::default(), &NoticeConfig::default())
    }

    #[test]
    fn test_plan_maps_artists_and_producers() {
        let lib = library();
        let submissions = vec![
            submission("Ransom (outtatown x acahi).mp3", Some("Lil Tecca")),
            submission("Demo (acahi).mp3", Some("Unknown Guy & ken carson")),
            submission("Loose (outtatown).mp3", None),
        ];
        let plan = planner().plan(&submissions, &lib, &lib, &[8]).unwrap();

        assert_eq!(plan.unmapped_artists, vec!["Unknown Guy"]);

        let ransom = &plan.tracks[0];
        assert_eq!(ransom.artist_ids, vec![7]);
        assert!(!ransom.has_unmapped_artists);
        assert_eq!(ransom.producer_ids, vec![1, 2]);

        let demo = &plan.tracks[1];
        assert_eq!(demo.parsed_artists, vec!["Unknown Guy", "ken carson"]);
        assert_eq!(demo.artist_ids, vec![8]);
        assert!(demo.has_unmapped_artists);
        assert!(!demo.inherited_artists);
        assert!(demo.producer_ids.is_empty());

        let loose = &plan.tracks[2];
        assert_eq!(loose.artist_ids, vec![8]);
        assert!(loose.inherited_artists);
        assert_eq!(loose.producer_ids, vec![1]);

        assert_eq!(plan.tracks_without_producers(), 1);
    }

    #[test]
    fn test_each_spelling_looked_up_once() {
        struct Counting(AtomicUsize);
        impl ArtistLookup for Counting {
            fn find_artist_id(&self, _name: &str) -> Result<Option<ArtistId>> {
                self.0.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
        }

        let lookups = Counting(AtomicUsize::new(0));
        let submissions = vec![
            submission("a.mp3", Some("Nav, Nav")),
            submission("b.mp3", Some("Nav & Gunna")),
        ];
        let plan = planner().plan(&submissions, &lookups, &library(), &[]).unwrap();
        assert_eq!(lookups.0.load(Ordering::Relaxed), 2);
        assert_eq!(plan.unmapped_artists, vec!["Nav", "Gunna"]);
    }

    #[test]
    fn test_lookup_failure_degrades_to_unmapped() {
        struct Broken;
        impl ArtistLookup for Broken {
            fn find_artist_id(&self, _name: &str) -> Result<Option<ArtistId>> {
                bail!("database is locked")
            }
        }

        let submissions = vec![submission("x (outtatown).mp3", Some("Lil Tecca"))];
        let plan = planner().plan(&submissions, &Broken, &library(), &[]).unwrap();
        assert_eq!(plan.unmapped_artists, vec!["Lil Tecca"]);
        assert!(plan.tracks[0].has_unmapped_artists);
        assert!(plan.tracks[0].artist_ids.is_empty());
        assert_eq!(plan.tracks[0].producer_ids, vec![1]);
    }

    #[test]
    fn test_directory_failure_is_an_error() {
        struct NoDirectory;
        impl ProducerDirectoryProvider for NoDirectory {
            fn producer_directory(&self) -> Result<Vec<ProducerDirectoryEntry>> {
                bail!("no such table: producers")
            }
        }

        let submissions = vec![submission("x (outtatown).mp3", None)];
        let result = planner().plan(&submissions, &library(), &NoDirectory, &[]);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_batch() {
        let lib = library();
        let plan = planner().plan(&[], &lib, &lib, &[7]).unwrap();
        assert!(plan.tracks.is_empty());
        assert!(plan.unmapped_artists.is_empty());
    }
}
