//! Hot folder watching.
//!
//! The notify callback runs on the notifier's own thread and only forwards
//! `FolderEvent`s over a channel; the handler consumes them one at a time.

mod events;
mod handler;

use std::path::{Path, PathBuf};

use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::Result;

pub use events::{EventTranslator, FolderEvent};
pub use handler::{EventOutcome, EventReport, HotFolderHandler};

/// Watches one directory, non-recursively, for created or moved-in entries.
pub struct FolderWatcher {
    _watcher: RecommendedWatcher,
    folder: PathBuf,
    events: mpsc::UnboundedReceiver<FolderEvent>,
}

impl FolderWatcher {
    pub fn new(folder: &Path) -> Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut translator = EventTranslator::new();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<notify::Event>| match res {
                Ok(event) => {
                    for folder_event in translator.translate(&event) {
                        // Receiver gone means we are shutting down.
                        let _ = tx.send(folder_event);
                    }
                }
                Err(e) => tracing::error!("Watch error: {}", e),
            },
            Config::default(),
        )?;

        watcher.watch(folder, RecursiveMode::NonRecursive)?;

        Ok(Self {
            _watcher: watcher,
            folder: folder.to_path_buf(),
            events: rx,
        })
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub async fn next_event(&mut self) -> Option<FolderEvent> {
        self.events.recv().await
    }

    /// Feed events to `handler` until `cancel` fires.
    ///
    /// Cancellation also abandons an event that is still being processed.
    pub async fn run(mut self, handler: HotFolderHandler, cancel: CancellationToken) {
        tracing::info!(folder = %self.folder().display(), "Monitoring hot folder");

        loop {
            let event = tokio::select! {
                _ = cancel.cancelled() => break,
                event = self.next_event() => match event {
                    Some(event) => event,
                    None => break,
                },
            };

            let path = event.path().to_path_buf();
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::warn!(path = %path.display(), "Shutdown while processing file");
                    break;
                }
                _ = handler.handle(event) => {}
            }
        }

        tracing::info!("Hot folder watcher stopped");
    }
}
