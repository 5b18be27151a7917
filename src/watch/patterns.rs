// src/watch/patterns.rs

use std::fmt;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

/// Compiled `ignore` globs.
///
/// Patterns are matched against paths relative to the workspace root, with
/// forward slashes (e.g. `"cmd/http/bin/app-1"`).
#[derive(Clone)]
pub struct IgnoreSet {
    patterns: Vec<String>,
    set: GlobSet,
}

impl fmt::Debug for IgnoreSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IgnoreSet")
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}

impl IgnoreSet {
    /// A `dir/**` pattern also ignores `dir` itself, so metadata events on
    /// the directory do not slip through.
    pub fn new(patterns: &[String]) -> Result<Self> {
        let mut expanded = patterns.to_vec();
        expanded.extend(
            patterns
                .iter()
                .filter_map(|p| p.strip_suffix("/**"))
                .filter(|p| !p.is_empty())
                .map(str::to_string),
        );
        Ok(Self {
            patterns: patterns.to_vec(),
            set: build_globset(&expanded)?,
        })
    }

    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
            set: GlobSet::empty(),
        }
    }

    pub fn is_ignored(&self, rel_path: &str) -> bool {
        self.set.is_match(rel_path)
    }
}

/// Build a GlobSet from simple string patterns.
pub fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}
