// src/fs/mod.rs

//! Filesystem access needed by binary retention, behind a trait so the
//! cleanup rules can be exercised against [`mock::MockFileSystem`].

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub mod mock;

pub trait FileSystem: Send + Sync + Debug {
    fn is_dir(&self, path: &Path) -> bool;

    /// Full paths of the regular files directly inside `dir`.
    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>>;

    fn remove_file(&self, path: &Path) -> Result<()>;
}

/// `std::fs` backed implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let listing = fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))?;
        let mut files = Vec::new();
        for entry in listing {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                files.push(entry.path());
            }
        }
        Ok(files)
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).with_context(|| format!("deleting {}", path.display()))
    }
}
