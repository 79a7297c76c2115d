//! Safety check for report output paths.
//!
//! The binary only reads the library database. These checks keep a mistyped
//! `--output` from clobbering the database or the manifest it was fed.

use anyhow::{bail, Result};
use std::path::Path;

/// Validates that a report path is safe to overwrite.
///
/// Checks:
/// - Output must have a `.json` extension
/// - Output cannot be any of the provided source paths
/// - Output cannot look like a SQLite database
pub fn validate_output_path(output: &Path, source_paths: &[&Path]) -> Result<()> {
    let is_json = output
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if !is_json {
        bail!(
            "Safety check failed: report '{}' must have a .json extension",
            output.display()
        );
    }

    for source in source_paths {
        if output == *source {
            bail!(
                "Safety check failed: report '{}' cannot be the same as source '{}'",
                output.display(),
                source.display()
            );
        }
    }

    let output_name = output.file_name().and_then(|n| n.to_str()).unwrap_or("");
    for pattern in [".sqlite", ".sqlite3", ".db"] {
        if output_name.contains(pattern) {
            bail!(
                "Safety check failed: report '{}' looks like a database ('{}')",
                output.display(),
                pattern
            );
        }
    }

    Ok(())
}
