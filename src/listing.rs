use std::fs::Metadata;
use std::path::Path;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use tracing::warn;

/// One row of a directory listing.
///
/// Entries are immutable once built; the list is rebuilt on every request so
/// it always reflects the current filesystem state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirEntry {
    /// Request-relative URL of the entry, rooted under the mount prefix
    pub display_url: String,
    pub name: String,
    /// Size in bytes; never populated for directories
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Last modification time as epoch seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<u64>,
    pub is_file: bool,
    pub is_dir: bool,
}

/// Aggregates over a listing, for template-mode rendering.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ListingSummary {
    pub num_files: usize,
    /// Real subdirectories only; the synthetic parent entry is not counted
    pub num_dirs: usize,
    /// Total size of the listed files
    pub disk_usage: u64,
}

/// Enumerate the immediate children of `dir`, sorted case-insensitively by
/// name. When `dir` is not the served root, a synthetic ".." entry pointing
/// at the parent directory is placed at index 0.
///
/// An unreadable directory yields an empty listing: a degraded page beats an
/// aborted response. Children whose metadata cannot be read are skipped.
pub fn list_entries(dir: &Path, root: &Path, dir_url: &str) -> Vec<DirEntry> {
    let base = dir_url.trim_end_matches('/');

    let read = match std::fs::read_dir(dir) {
        Ok(read) => read,
        Err(err) => {
            warn!(dir = %dir.display(), %err, "failed to enumerate directory, serving empty listing");
            return Vec::new();
        }
    };

    let mut entries = Vec::new();
    for entry in read {
        let entry = match entry {
            Ok(entry) => entry,
            Err(_) => continue,
        };
        let name = entry.file_name().to_string_lossy().to_string();
        let metadata = match std::fs::metadata(entry.path()) {
            Ok(metadata) => metadata,
            Err(_) => continue,
        };

        entries.push(DirEntry {
            display_url: format!("{base}/{name}"),
            name,
            size: metadata.is_file().then(|| metadata.len()),
            modified: epoch_secs(&metadata),
            is_file: metadata.is_file(),
            is_dir: metadata.is_dir(),
        });
    }

    entries.sort_by_cached_key(|entry| entry.name.to_lowercase());

    if dir != root {
        entries.insert(0, parent_entry(base));
    }

    entries
}

/// The synthetic "up one directory" row. Never sorted; always index 0.
/// Carries neither size nor timestamp.
fn parent_entry(base: &str) -> DirEntry {
    DirEntry {
        display_url: format!("{base}/.."),
        name: "..".to_string(),
        size: None,
        modified: None,
        is_file: false,
        is_dir: true,
    }
}

pub fn summarize(entries: &[DirEntry]) -> ListingSummary {
    let mut summary = ListingSummary::default();
    for entry in entries {
        if entry.is_file {
            summary.num_files += 1;
            summary.disk_usage += entry.size.unwrap_or(0);
        } else if entry.is_dir && !entry.name.contains("..") {
            summary.num_dirs += 1;
        }
    }
    summary
}

fn epoch_secs(metadata: &Metadata) -> Option<u64> {
    metadata
        .modified()
        .ok()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map(|duration| duration.as_secs())
}
