use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use credit_resolver::config::{MatchMode, NoticeConfig, ResolveOptions};
use credit_resolver::library::{Library, SqliteLibrary, StaticLibrary};
use credit_resolver::models::ArtistId;
use credit_resolver::planner::{ImportPlanner, TrackSubmission};
use credit_resolver::progress::{create_progress_bar, format_duration, set_log_only};
use credit_resolver::safety::validate_output_path;
use credit_resolver::{extract_candidates, find_producer_by_alias_name, resolve_producers_with, segment_artists};

#[derive(Parser)]
#[command(name = "credit-resolve")]
#[command(about = "Resolve artist and producer credits from tags and filenames")]
struct Cli {
    /// Hide progress bars and log progress lines instead
    #[arg(long, global = true)]
    log_only: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Split artist credits into individual names
    Segment {
        #[arg(required = true)]
        artists: Vec<String>,
    },

    /// Show candidate producer tokens extracted from filenames
    Candidates {
        #[arg(required = true)]
        filenames: Vec<String>,
    },

    /// Resolve producer ids for filenames
    Resolve {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        matching: MatchArgs,

        /// Artist ids credited on the song (repeatable)
        #[arg(long = "artist-id")]
        artist_ids: Vec<ArtistId>,

        #[arg(required = true)]
        filenames: Vec<String>,
    },

    /// Resolve a single alias to its producer
    Alias {
        #[command(flatten)]
        source: SourceArgs,

        #[arg(long = "artist-id")]
        artist_ids: Vec<ArtistId>,

        alias: String,
    },

    /// Plan artist and producer credits for a batch of uploads
    Plan {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        matching: MatchArgs,

        /// JSON array of {"filename", "artist"} submissions
        #[arg(long)]
        manifest: PathBuf,

        /// Artist ids used for tracks whose tags map no artist (repeatable)
        #[arg(long = "fallback-artist-id")]
        fallback_artist_ids: Vec<ArtistId>,

        /// Write the plan here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        #[arg(long, default_value = "0")]
        workers: usize,

        /// Suppress repeated identical warnings within this many milliseconds
        #[arg(long, default_value = "1500")]
        notice_window_ms: u64,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct SourceArgs {
    /// Library SQLite database (opened read-only)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Library JSON snapshot
    #[arg(long)]
    library: Option<PathBuf>,
}

#[derive(Args)]
struct MatchArgs {
    #[arg(long, value_enum, default_value = "parenthetical")]
    mode: Mode,

    /// Only accept exact name/alias matches
    #[arg(long)]
    no_partial: bool,

    /// Minimum candidate length for partial matching (0 = no minimum)
    #[arg(long, default_value = "0")]
    min_partial_len: usize,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Parenthetical,
    Scan,
}

impl MatchArgs {
    fn options(&self) -> ResolveOptions {
        ResolveOptions {
            mode: match self.mode {
                Mode::Parenthetical => MatchMode::Parenthetical,
                Mode::Scan => MatchMode::Scan,
            },
            partial_matching: !self.no_partial,
            min_partial_len: self.min_partial_len,
        }
    }
}

fn open_library(source: &SourceArgs) -> Result<Box<dyn Library>> {
    let library: Box<dyn Library> = match (&source.db, &source.library) {
        (Some(db), _) => Box::new(SqliteLibrary::open(db)?),
        (None, Some(snapshot)) => Box::new(StaticLibrary::from_json_file(snapshot)?),
        (None, None) => anyhow::bail!("Either --db or --library is required"),
    };
    Ok(library)
}

fn source_path(source: &SourceArgs) -> Option<&Path> {
    source.db.as_deref().or(source.library.as_deref())
}

fn read_manifest(path: &Path) -> Result<Vec<TrackSubmission>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid manifest {}", path.display()))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

fn run_resolve(
    source: &SourceArgs,
    matching: &MatchArgs,
    artist_ids: &[ArtistId],
    filenames: &[String],
) -> Result<()> {
    let library = open_library(source)?;
    let directory = library.producer_directory()?;
    info!("Loaded {} producers", directory.len());

    let options = matching.options();
    for filename in filenames {
        let mut ids: Vec<_> = resolve_producers_with(filename, &directory, artist_ids, &options)
            .into_iter()
            .collect();
        ids.sort_unstable();
        print_json(&serde_json::json!({ "filename": filename, "producerIds": ids }))?;
    }
    Ok(())
}

fn run_plan(
    source: &SourceArgs,
    matching: &MatchArgs,
    manifest: &Path,
    fallback_artist_ids: &[ArtistId],
    output: Option<&Path>,
    workers: usize,
    notice_window_ms: u64,
) -> Result<()> {
    if let Some(output) = output {
        let mut sources = vec![manifest];
        sources.extend(source_path(source));
        validate_output_path(output, &sources)?;
    }

    if workers > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build_global()
            .context("Failed to set thread pool size")?;
    }

    let start = Instant::now();
    let submissions = read_manifest(manifest)?;
    info!("Read {} submissions from {}", submissions.len(), manifest.display());

    let library = open_library(source)?;
    let notice_config = NoticeConfig {
        window: Duration::from_millis(notice_window_ms),
    };
    let planner = ImportPlanner::new(matching.options(), &notice_config);

    let total = submissions.len() as u64;
    let pb = create_progress_bar(total, "Resolving producers");
    let plan = planner.plan_with_progress(
        &submissions,
        library.as_ref(),
        library.as_ref(),
        fallback_artist_ids,
        &pb,
    )?;
    pb.finish_and_clear();

    let rendered = serde_json::to_string_pretty(&plan)?;
    match output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write plan {}", path.display()))?;
            info!("Wrote plan to {}", path.display());
        }
        None => println!("{}", rendered),
    }

    info!(
        "Planning complete: {} tracks, {} unmapped artists, {} without producers in {}",
        plan.tracks.len(),
        plan.unmapped_artists.len(),
        plan.tracks_without_producers(),
        format_duration(start.elapsed())
    );
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    set_log_only(cli.log_only);

    match cli.command {
        Command::Segment { artists } => {
            for raw in &artists {
                print_json(&segment_artists(Some(raw.as_str())))?;
            }
        }
        Command::Candidates { filenames } => {
            for filename in &filenames {
                let mut candidates: Vec<String> = extract_candidates(filename).into_iter().collect();
                candidates.sort();
                print_json(&serde_json::json!({ "filename": filename, "candidates": candidates }))?;
            }
        }
        Command::Resolve {
            source,
            matching,
            artist_ids,
            filenames,
        } => run_resolve(&source, &matching, &artist_ids, &filenames)?,
        Command::Alias {
            source,
            artist_ids,
            alias,
        } => {
            let library = open_library(&source)?;
            let producer_id = find_producer_by_alias_name(&alias, &artist_ids, library.as_ref())?;
            print_json(&serde_json::json!({ "alias": alias, "producerId": producer_id }))?;
        }
        Command::Plan {
            source,
            matching,
            manifest,
            fallback_artist_ids,
            output,
            workers,
            notice_window_ms,
        } => run_plan(
            &source,
            &matching,
            &manifest,
            &fallback_artist_ids,
            output.as_deref(),
            workers,
            notice_window_ms,
        )?,
    }

    Ok(())
}
