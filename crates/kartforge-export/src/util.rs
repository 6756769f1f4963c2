//! Small shared helpers for the export targets.

use std::path::{Path, PathBuf};

/// Sibling path with a suffix appended to the full file name
/// (`track.kgl` -> `track.kgl.txt`), keeping the binary's own extension.
pub fn companion_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}
