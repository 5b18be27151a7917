// src/exec/retention.rs

//! Retention of built binaries: keep only the newest by filename order.

use std::path::Path;

use tracing::debug;

use crate::fs::FileSystem;
use crate::output::OutputChannel;

/// Delete every file in `bin_dir` whose name starts with `prefix`, except the
/// lexicographically last one.
///
/// Relies on names that sort with recency (timestamps or increasing
/// suffixes). A missing directory is a no-op and a failed delete is logged
/// and skipped. Returns the names that were deleted.
pub fn cleanup_old_binaries(
    fs: &dyn FileSystem,
    bin_dir: &Path,
    prefix: &str,
    out: &OutputChannel,
) -> Vec<String> {
    if !fs.is_dir(bin_dir) {
        debug!(dir = %bin_dir.display(), "no binaries directory; skipping cleanup");
        return Vec::new();
    }

    let files = match fs.list_files(bin_dir) {
        Ok(files) => files,
        Err(e) => {
            out.log(format!("Failed to list {}: {e}", bin_dir.display()));
            return Vec::new();
        }
    };

    let mut names: Vec<String> = files
        .iter()
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(str::to_string))
        .filter(|n| n.starts_with(prefix))
        .collect();

    if names.len() <= 1 {
        return Vec::new();
    }

    names.sort();
    names.pop();

    let mut deleted = Vec::with_capacity(names.len());
    for name in names {
        match fs.remove_file(&bin_dir.join(&name)) {
            Ok(()) => {
                out.log(format!("Deleted old binary {name}"));
                deleted.push(name);
            }
            Err(e) => out.log(format!("Failed to delete {name}: {e}")),
        }
    }
    deleted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;
    use crate::output::MemorySink;
    use std::sync::Arc;

    fn out() -> (OutputChannel, MemorySink) {
        let sink = MemorySink::new();
        (OutputChannel::new(Arc::new(sink.clone())), sink)
    }

    #[test]
    fn keeps_only_the_last_by_name() {
        let fs = MockFileSystem::new();
        fs.add_file("/ws/bin/app-2", "b");
        fs.add_file("/ws/bin/app-1", "a");
        fs.add_file("/ws/bin/app-3", "c");
        fs.add_file("/ws/bin/other", "x");
        let (out, sink) = out();

        let deleted = cleanup_old_binaries(&fs, Path::new("/ws/bin"), "app-", &out);

        assert_eq!(deleted, vec!["app-1".to_string(), "app-2".to_string()]);
        assert!(fs.exists(Path::new("/ws/bin/app-3")));
        assert!(fs.exists(Path::new("/ws/bin/other")));
        assert!(!fs.exists(Path::new("/ws/bin/app-1")));
        assert!(sink.contains("Deleted old binary app-2"));
    }

    #[test]
    fn missing_directory_and_single_file_are_noops() {
        let fs = MockFileSystem::new();
        let (out, _) = out();
        assert!(cleanup_old_binaries(&fs, Path::new("/ws/bin"), "app-", &out).is_empty());

        fs.add_file("/ws/bin/app-1", "a");
        assert!(cleanup_old_binaries(&fs, Path::new("/ws/bin"), "app-", &out).is_empty());
        assert!(fs.exists(Path::new("/ws/bin/app-1")));
    }

    #[test]
    fn failed_delete_is_logged_and_skipped() {
        let fs = MockFileSystem::new();
        fs.add_file("/ws/bin/app-1", "a");
        fs.add_file("/ws/bin/app-2", "b");
        fs.add_file("/ws/bin/app-3", "c");
        fs.lock_file("/ws/bin/app-1");
        let (out, sink) = out();

        let deleted = cleanup_old_binaries(&fs, Path::new("/ws/bin"), "app-", &out);

        assert_eq!(deleted, vec!["app-2".to_string()]);
        assert!(sink.contains("Failed to delete app-1"));
        assert!(fs.exists(Path::new("/ws/bin/app-1")));
    }

    #[test]
    fn works_on_the_real_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["app-20240101", "app-20240102", "app-20240103"] {
            std::fs::write(dir.path().join(name), name).unwrap();
        }
        let (out, _) = out();

        let deleted = cleanup_old_binaries(&crate::fs::RealFileSystem, dir.path(), "app-", &out);

        assert_eq!(deleted.len(), 2);
        assert!(dir.path().join("app-20240103").exists());
    }
}
