//! Input discovery: turn command-line patterns into a list of source files.

use crate::error::{Error, Result};
use crate::parser::is_supported;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Expand files, directories and glob patterns into real file paths.
///
/// Files are taken as given, directories are walked recursively for C#
/// sources, anything else is treated as a glob. The result is sorted and
/// free of duplicates.
pub fn expand(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_file() {
            files.push(path.to_path_buf());
            continue;
        }
        if path.is_dir() {
            let before = files.len();
            files.extend(walk(path));
            debug!("{}: {} source files", path.display(), files.len() - before);
            continue;
        }
        let matches: Vec<PathBuf> = glob::glob(pattern)
            .map_err(|source| Error::Glob {
                pattern: pattern.clone(),
                source,
            })?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .collect();
        if matches.is_empty() {
            warn!("no files matched: {}", pattern);
        }
        files.extend(matches);
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn walk(dir: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                warn!("skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|e| e.file_type().is_file() && is_supported(e.path()))
        .map(|e| e.into_path())
}
