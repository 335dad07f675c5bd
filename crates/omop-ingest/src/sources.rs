use std::path::{Path, PathBuf};

use tracing::warn;

/// Expand a `;`-separated source-location list into existing file paths.
///
/// Run configurations list one or more export files per pipeline; entries
/// that do not exist on disk are warned about and dropped rather than
/// failing the run, since site exports arrive on independent schedules.
pub fn resolve_source_paths(locations: &str) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for entry in locations.split(';') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let path = Path::new(entry);
        if path.is_file() {
            paths.push(path.to_path_buf());
        } else {
            warn!(path = %path.display(), "source file not found, skipping");
        }
    }
    paths
}
