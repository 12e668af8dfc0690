//! Upload planning: resolve files and directory trees into a flat,
//! key-unique list of transfers.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use super::error::SyncError;
use super::key::{join_key, normalize_prefix};

/// One local file scheduled for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePlan {
    /// Local path on disk.
    pub source: String,
    /// Fully resolved remote object key, unique across the plan set.
    pub key: String,
    /// Byte length at plan time.
    pub size: u64,
}

/// Resolve source paths into upload plans under the desired prefix.
///
/// A regular file maps to `prefix/<base name>`; a directory is walked
/// depth-first in a deterministic order and every file inside maps to
/// `prefix/<path relative to that directory>`. Two entries resolving to the
/// same key abort the whole call with [`SyncError::DuplicateKey`] — silent
/// last-write-wins would hide a destination collision until after the
/// upload already happened. No partial plan is ever returned.
pub fn build_plans(paths: &[String], prefix: &str) -> Result<Vec<FilePlan>, SyncError> {
    if paths.is_empty() {
        return Err(SyncError::InvalidInput(
            "at least one source path must be specified".to_string(),
        ));
    }

    let base_prefix = normalize_prefix(prefix);
    let mut plans = Vec::new();
    let mut seen = HashSet::new();

    for candidate in paths {
        let path = candidate.trim();
        if path.is_empty() {
            return Err(SyncError::InvalidInput(
                "encountered empty source path entry".to_string(),
            ));
        }

        let meta = fs::metadata(path).map_err(|source| SyncError::Io {
            context: format!("failed to stat {path}"),
            source,
        })?;

        if meta.is_dir() {
            plan_directory(Path::new(path), &base_prefix, &mut plans, &mut seen)?;
            continue;
        }

        let base_name = Path::new(path)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let key = join_key(&base_prefix, &base_name);
        if !seen.insert(key.clone()) {
            return Err(SyncError::DuplicateKey { key });
        }

        plans.push(FilePlan {
            source: path.to_string(),
            key,
            size: meta.len(),
        });
    }

    Ok(plans)
}

fn plan_directory(
    root: &Path,
    base_prefix: &str,
    plans: &mut Vec<FilePlan>,
    seen: &mut HashSet<String>,
) -> Result<(), SyncError> {
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|err| SyncError::Io {
            context: format!("failed to traverse {}", root.display()),
            source: err.into(),
        })?;
        if entry.file_type().is_dir() {
            continue;
        }

        let meta = entry.metadata().map_err(|err| SyncError::Io {
            context: format!("failed to inspect {}", entry.path().display()),
            source: err.into(),
        })?;

        let rel = entry.path().strip_prefix(root).map_err(|err| SyncError::Io {
            context: format!("failed to determine relative path for {}", entry.path().display()),
            source: std::io::Error::other(err),
        })?;

        let key = join_key(base_prefix, &slash_path(rel));
        if !seen.insert(key.clone()) {
            return Err(SyncError::DuplicateKey { key });
        }

        plans.push(FilePlan {
            source: entry.path().to_string_lossy().into_owned(),
            key,
            size: meta.len(),
        });
    }

    Ok(())
}

/// Join path components with forward slashes, the storage key convention.
fn slash_path(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
