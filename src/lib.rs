//! Credit resolution library - artist segmentation and producer matching
//! shared by the `credit-resolve` binary and the import workflow.

pub mod config;
pub mod library;
pub mod models;
pub mod normalize;
pub mod notice;
pub mod planner;
pub mod progress;
pub mod resolve;
pub mod safety;
pub mod scan;
pub mod segment;

pub use config::{MatchMode, NoticeConfig, ResolveOptions};
pub use models::{ArtistId, ProducerAlias, ProducerDirectoryEntry, ProducerId};
pub use resolve::{
    extract_candidates, find_producer_by_alias_name, resolve_producers, resolve_producers_with,
    resolve_single_alias_producer,
};
pub use scan::scan_producers;
pub use segment::segment_artists;
