// src/watch/watcher.rs

use std::path::{Path, PathBuf};

use anyhow::Result;
use notify::{Config, Event, EventKind, PollWatcher, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::RunConfiguration;
use crate::watch::path_utils::relative_str;
use crate::watch::patterns::IgnoreSet;

/// Coarse kind of a filesystem change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Removed,
    Other,
}

impl From<&EventKind> for ChangeKind {
    fn from(kind: &EventKind) -> Self {
        match kind {
            EventKind::Create(_) => ChangeKind::Created,
            EventKind::Modify(_) => ChangeKind::Modified,
            EventKind::Remove(_) => ChangeKind::Removed,
            _ => ChangeKind::Other,
        }
    }
}

/// One change that should restart the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTrigger {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

/// Handle for the filesystem watcher.
///
/// Keeps the underlying `notify` watcher alive. Dropping it stops watching
/// and closes the trigger channel.
pub struct WatcherHandle {
    _inner: Box<dyn Watcher + Send>,
    roots: Vec<PathBuf>,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("roots", &self.roots)
            .finish_non_exhaustive()
    }
}

impl WatcherHandle {
    /// Directories actually being watched.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

/// Turn a raw notify event into a trigger, or `None` when it should not
/// cause a restart (access events, ignored paths).
pub fn classify_event(workspace: &Path, ignore: &IgnoreSet, event: &Event) -> Option<WatchTrigger> {
    if matches!(event.kind, EventKind::Access(_)) {
        return None;
    }

    event
        .paths
        .iter()
        .find(|path| match relative_str(workspace, path) {
            Some(rel) => !ignore.is_ignored(&rel),
            None => true,
        })
        .map(|path| WatchTrigger {
            path: path.clone(),
            kind: ChangeKind::from(&event.kind),
        })
}

/// Watch every configured directory under `workspace` recursively and send a
/// [`WatchTrigger`] for each relevant change.
///
/// Uses a `PollWatcher` at `config.poll_interval()` when `use_polling` is
/// set, the platform's native watcher otherwise. Missing directories are
/// skipped with a warning.
pub fn spawn_watcher(
    workspace: &Path,
    config: &RunConfiguration,
    trigger_tx: mpsc::Sender<WatchTrigger>,
) -> Result<WatcherHandle> {
    let ignore = IgnoreSet::new(&config.ignore)?;

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();
    let handler = move |res: notify::Result<Event>| match res {
        Ok(event) => {
            if event_tx.send(event).is_err() {
                debug!("watch event dropped; forwarder gone");
            }
        }
        Err(err) => warn!(error = %err, "file watch error"),
    };

    let mut watcher: Box<dyn Watcher + Send> = if config.use_polling {
        // Poll mtimes only have whole-second resolution; hash contents so an
        // edit within the same second as the previous scan is still seen.
        let cfg = Config::default()
            .with_poll_interval(config.poll_interval())
            .with_compare_contents(true);
        Box::new(PollWatcher::new(handler, cfg)?)
    } else {
        Box::new(RecommendedWatcher::new(handler, Config::default())?)
    };

    let mut roots = Vec::new();
    for dir in config.watch_paths(workspace) {
        if !dir.is_dir() {
            warn!(dir = %dir.display(), "watch directory does not exist; skipping");
            continue;
        }
        watcher.watch(&dir, RecursiveMode::Recursive)?;
        roots.push(dir);
    }

    info!(
        ?roots,
        polling = config.use_polling,
        poll_ms = config.poll_ms,
        "file watcher started"
    );

    let workspace = workspace.to_path_buf();
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            let Some(trigger) = classify_event(&workspace, &ignore, &event) else {
                continue;
            };
            debug!(?trigger, "forwarding change");
            if trigger_tx.send(trigger).await.is_err() {
                break;
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle {
        _inner: watcher,
        roots,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, DataChange, ModifyKind, RemoveKind};

    fn ignore() -> IgnoreSet {
        IgnoreSet::new(&["**/bin/**".to_string()]).unwrap()
    }

    #[test]
    fn source_change_becomes_trigger() {
        let event = Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content)))
            .add_path(PathBuf::from("/ws/cmd/http/main.go"));

        let trigger = classify_event(Path::new("/ws"), &ignore(), &event).unwrap();
        assert_eq!(trigger.path, PathBuf::from("/ws/cmd/http/main.go"));
        assert_eq!(trigger.kind, ChangeKind::Modified);
    }

    #[test]
    fn access_events_are_skipped() {
        let event = Event::new(EventKind::Access(AccessKind::Any))
            .add_path(PathBuf::from("/ws/cmd/http/main.go"));
        assert!(classify_event(Path::new("/ws"), &ignore(), &event).is_none());
    }

    #[test]
    fn ignored_paths_are_skipped() {
        let event = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/ws/cmd/bin/app-1"));
        assert!(classify_event(Path::new("/ws"), &ignore(), &event).is_none());
    }

    #[test]
    fn first_relevant_path_wins() {
        let event = Event::new(EventKind::Remove(RemoveKind::File))
            .add_path(PathBuf::from("/ws/bin/app-1"))
            .add_path(PathBuf::from("/ws/internal/db.go"));

        let trigger = classify_event(Path::new("/ws"), &ignore(), &event).unwrap();
        assert_eq!(trigger.path, PathBuf::from("/ws/internal/db.go"));
        assert_eq!(trigger.kind, ChangeKind::Removed);
    }
}
