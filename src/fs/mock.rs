// src/fs/mock.rs

use super::FileSystem;
use anyhow::{Result, anyhow};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
enum MockEntry {
    File(Vec<u8>),
    Dir,
}

/// In-memory filesystem. Parent directories are created implicitly.
///
/// Paths are used verbatim (no canonicalization), so tests should stick to
/// absolute paths.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    entries: Arc<Mutex<BTreeMap<PathBuf, MockEntry>>>,
    /// Paths whose removal fails, to exercise error handling.
    locked: Arc<Mutex<Vec<PathBuf>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, BTreeMap<PathBuf, MockEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref().to_path_buf();
        let mut entries = self.entries();
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            entries.entry(ancestor.to_path_buf()).or_insert(MockEntry::Dir);
        }
        entries.insert(path, MockEntry::File(content.into()));
    }

    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        self.entries().contains_key(path.as_ref())
    }

    /// Make `remove_file` fail for `path`, like a binary still held open.
    pub fn lock_file(&self, path: impl AsRef<Path>) {
        if let Ok(mut locked) = self.locked.lock() {
            locked.push(path.as_ref().to_path_buf());
        }
    }
}

impl FileSystem for MockFileSystem {
    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.entries().get(path), Some(MockEntry::Dir))
    }

    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let entries = self.entries();
        match entries.get(dir) {
            Some(MockEntry::Dir) => Ok(entries
                .iter()
                .filter(|(p, e)| p.parent() == Some(dir) && matches!(e, MockEntry::File(_)))
                .map(|(p, _)| p.clone())
                .collect()),
            _ => Err(anyhow!("no such directory: {}", dir.display())),
        }
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        let is_locked = self
            .locked
            .lock()
            .map(|l| l.iter().any(|p| p == path))
            .unwrap_or(false);
        if is_locked {
            return Err(anyhow!("file is in use: {}", path.display()));
        }

        let mut entries = self.entries();
        match entries.get(path) {
            Some(MockEntry::File(_)) => {
                entries.remove(path);
                Ok(())
            }
            Some(MockEntry::Dir) => Err(anyhow!("is a directory: {}", path.display())),
            None => Err(anyhow!("no such file: {}", path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_is_shallow_and_skips_directories() {
        let fs = MockFileSystem::new();
        fs.add_file("/ws/bin/app-1", "a");
        fs.add_file("/ws/bin/nested/app-2", "b");

        assert!(fs.is_dir(Path::new("/ws/bin/nested")));
        let listed = fs.list_files(Path::new("/ws/bin")).unwrap();
        assert_eq!(listed, vec![PathBuf::from("/ws/bin/app-1")]);
    }

    #[test]
    fn locked_files_cannot_be_removed() {
        let fs = MockFileSystem::new();
        fs.add_file("/ws/bin/app-1", "a");
        fs.lock_file("/ws/bin/app-1");

        assert!(fs.remove_file(Path::new("/ws/bin/app-1")).is_err());
        assert!(fs.exists(Path::new("/ws/bin/app-1")));
    }
}
