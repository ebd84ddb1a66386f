//! Recursive file resolution
//!
//! Manifest entries name recordings by basename only, so each target is found
//! by walking the whole search tree. Entries are visited in lexical order per
//! directory, which makes "first match" reproducible between runs.
//!
//! Unreadable directories are skipped silently; a partial walk is still a
//! useful result.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Find the first file under `root` whose basename equals `filename`
///
/// The comparison is exact and case-sensitive. Directories never match.
/// Returns `None` when the walk finishes without a match.
///
/// # Example
///
/// ```no_run
/// use mwf_deid::core::resolver::find;
/// use std::path::Path;
///
/// if let Some(path) = find(Path::new("/data/ecg"), "rec1.mwf") {
///     println!("found {}", path.display());
/// }
/// ```
pub fn find(root: &Path, filename: &str) -> Option<PathBuf> {
    matches(root, filename).next()
}

/// Every file under `root` whose basename equals `filename`, in walk order
///
/// The first element is the one [`find`] returns.
pub fn find_all(root: &Path, filename: &str) -> Vec<PathBuf> {
    matches(root, filename).collect()
}

fn matches<'a>(root: &Path, filename: &'a str) -> impl Iterator<Item = PathBuf> + 'a {
    let wanted = OsStr::new(filename);
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::trace!(error = %e, "Skipping unreadable entry");
                None
            }
        })
        .filter(move |entry| !entry.file_type().is_dir() && entry.file_name() == wanted)
        .map(walkdir::DirEntry::into_path)
}
