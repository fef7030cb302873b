//! Hot reload: file-change signals for a document's source.
//!
//! A [`HotReload`] owns the receiving end of a single-consumer channel. The
//! `notify` watcher thread only posts [`ReloadEvent`]s into it; the thread
//! that owns the widget tree drains them with
//! [`Document::apply_reload`](crate::document::Document::apply_reload) and
//! performs the remount itself.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};

/// A watched file changed and should be re-read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadEvent {
    pub path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum ReloadError {
    #[error("file watcher failed: {0}")]
    Watch(#[from] notify::Error),
}

/// Posts reload signals from any thread.
#[derive(Debug, Clone)]
pub struct ReloadSender {
    sender: UnboundedSender<ReloadEvent>,
}

impl ReloadSender {
    /// Signal that `path` changed. Returns `false` once the receiver is gone.
    pub fn notify(&self, path: impl Into<PathBuf>) -> bool {
        self.sender
            .send(ReloadEvent { path: path.into() })
            .is_ok()
    }
}

/// Receiving end of the reload channel, optionally holding the watcher that
/// feeds it.
pub struct HotReload {
    watcher: Option<RecommendedWatcher>,
    receiver: UnboundedReceiver<ReloadEvent>,
}

impl std::fmt::Debug for HotReload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HotReload")
            .field("watching", &self.watcher.is_some())
            .finish()
    }
}

impl HotReload {
    /// Watch `path` and signal on every modification or creation of it.
    ///
    /// The containing directory is watched rather than the file, so editors
    /// that save by writing a temporary file and renaming it over `path` keep
    /// triggering reloads. Events for other files in the directory are
    /// ignored. The file itself must exist when watching starts.
    pub fn watch(path: impl AsRef<Path>) -> Result<Self, ReloadError> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(notify::Error::path_not_found().add_path(path).into());
        }
        let Some(file_name) = path.file_name().map(OsString::from) else {
            return Err(notify::Error::path_not_found().add_path(path).into());
        };
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let (sender, mut reload) = Self::channel();

        let watched = path.clone();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            match res {
                Ok(event) => {
                    if is_change(&event.kind) && touches(&event, &file_name) {
                        tracing::debug!(path = %watched.display(), kind = ?event.kind, "watched file changed");
                        sender.notify(watched.clone());
                    }
                }
                Err(err) => tracing::warn!(%err, "file watcher error"),
            }
        })?;
        watcher.watch(&directory, RecursiveMode::NonRecursive)?;
        tracing::debug!(path = %path.display(), directory = %directory.display(), "watching for changes");

        reload.watcher = Some(watcher);
        Ok(reload)
    }

    /// A watcher-less channel, for hosts that detect changes themselves.
    pub fn channel() -> (ReloadSender, HotReload) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            ReloadSender { sender },
            HotReload {
                watcher: None,
                receiver,
            },
        )
    }

    /// The next pending signal, without waiting.
    pub fn try_next(&mut self) -> Option<ReloadEvent> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Wait for the next signal. Resolves to `None` once every sender is gone.
    pub async fn next(&mut self) -> Option<ReloadEvent> {
        self.receiver.recv().await
    }

    /// Take every pending signal.
    pub fn drain(&mut self) -> Vec<ReloadEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.try_next() {
            events.push(event);
        }
        events
    }
}

fn is_change(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Modify(_) | EventKind::Create(_))
}

/// Whether `event` names a file called `file_name`. Rename events carry
/// both the old and the new path.
fn touches(event: &notify::Event, file_name: &OsStr) -> bool {
    event
        .paths
        .iter()
        .any(|changed| changed.file_name() == Some(file_name))
}

// ===========================================================================
// Tests
// ===========================================================================
