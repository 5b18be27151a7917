// src/watch/path_utils.rs

//! Path helpers for the watcher.

use std::path::Path;

/// `path` relative to `root` with forward slashes.
///
/// Falls back to comparing canonical forms when the plain prefix does not
/// match (symlinked temp dirs, `/private/var` on macOS). A removed file can
/// no longer be canonicalized, so only its parent is.
///
/// Returns `None` if `path` is not under `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(to_slash(rel));
    }

    let root_canon = root.canonicalize().ok()?;
    let path_canon = match path.canonicalize() {
        Ok(p) => p,
        Err(_) => {
            let parent = path.parent()?.canonicalize().ok()?;
            parent.join(path.file_name()?)
        }
    };
    path_canon.strip_prefix(&root_canon).ok().map(to_slash)
}

fn to_slash(rel: &Path) -> String {
    rel.to_string_lossy().replace('\\', "/")
}
