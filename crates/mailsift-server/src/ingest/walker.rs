//! Batch walker
//!
//! Enumerates a staged input tree with the strict two-level layout
//! `owner/folder/file`, yielding one parse task per file. Owners, folders
//! and files are visited in lexicographic order, so repeated runs over an
//! unchanged tree enumerate identically. Entries that do not fit the layout
//! are skipped silently.

use std::path::{Component, Path};
use walkdir::WalkDir;

use super::types::{ParseTask, SourceLocation};
use crate::error::IngestError;

/// Lazily enumerate `(file, {owner, folder, filename})` tuples under `root`.
///
/// An unreadable or missing root is an up-front error; unreadable entries
/// below it are skipped like any other non-conforming entry.
pub fn walk_tree(root: &Path) -> Result<impl Iterator<Item = ParseTask>, IngestError> {
    std::fs::read_dir(root).map_err(|e| {
        IngestError::StagingFailure(format!("input root {} unreadable: {}", root.display(), e))
    })?;

    let base = root.to_path_buf();
    let iter = WalkDir::new(root)
        .min_depth(3)
        .max_depth(3)
        .sort_by_file_name()
        .into_iter()
        .filter_map(move |entry| {
            let entry = entry.ok()?;
            if !entry.file_type().is_file() {
                return None;
            }
            let location = source_location(&base, entry.path())?;
            Some(ParseTask {
                path: entry.into_path(),
                location,
            })
        });

    Ok(iter)
}

/// Split `owner/folder/filename` out of a path exactly three components
/// below the root.
fn source_location(root: &Path, path: &Path) -> Option<SourceLocation> {
    let relative = path.strip_prefix(root).ok()?;
    let mut components = relative.components().filter_map(|c| match c {
        Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
        _ => None,
    });

    let owner = components.next()?;
    let folder = components.next()?;
    let filename = components.next()?;
    if components.next().is_some() {
        return None;
    }

    Some(SourceLocation {
        owner,
        folder,
        filename,
    })
}
