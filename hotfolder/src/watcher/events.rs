use std::collections::VecDeque;
use std::path::PathBuf;

use notify::event::{CreateKind, ModifyKind, RenameMode};
use notify::{Event, EventKind};

/// Rename cookies remembered while waiting for their `To` half.
const MAX_PENDING_RENAMES: usize = 256;

/// Message pushed from the filesystem notifier to the handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderEvent {
    Created { path: PathBuf, is_dir: bool },
}

impl FolderEvent {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        FolderEvent::Created {
            path: path.into(),
            is_dir: false,
        }
    }

    pub fn path(&self) -> &std::path::Path {
        match self {
            FolderEvent::Created { path, .. } => path,
        }
    }

    fn created(path: &std::path::Path, kind: Option<CreateKind>) -> Self {
        FolderEvent::Created {
            path: path.to_path_buf(),
            is_dir: kind == Some(CreateKind::Folder) || path.is_dir(),
        }
    }
}

/// Turns notify events into `FolderEvent`s.
///
/// Creations pass through. A file moved in from outside the folder shows up
/// as a lone `RenameMode::To` and counts as created; a rename inside the
/// folder has a `From` with the same tracker first and is dropped.
#[derive(Debug, Default)]
pub struct EventTranslator {
    pending_renames: VecDeque<usize>,
}

impl EventTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn translate(&mut self, event: &Event) -> Vec<FolderEvent> {
        match event.kind {
            EventKind::Create(kind) => event
                .paths
                .iter()
                .map(|path| FolderEvent::created(path, Some(kind)))
                .collect(),
            EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
                if let Some(tracker) = event.attrs.tracker() {
                    if self.pending_renames.len() == MAX_PENDING_RENAMES {
                        self.pending_renames.pop_front();
                    }
                    self.pending_renames.push_back(tracker);
                }
                Vec::new()
            }
            EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
                if self.take_pending(event.attrs.tracker()) {
                    return Vec::new();
                }
                event
                    .paths
                    .iter()
                    .map(|path| FolderEvent::created(path, None))
                    .collect()
            }
            _ => Vec::new(),
        }
    }

    fn take_pending(&mut self, tracker: Option<usize>) -> bool {
        let Some(tracker) = tracker else {
            return false;
        };
        match self.pending_renames.iter().position(|t| *t == tracker) {
            Some(index) => {
                self.pending_renames.remove(index);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::RemoveKind;

    fn notify_event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(path.into())
    }

    fn rename(mode: RenameMode, path: &str, tracker: usize) -> Event {
        notify_event(EventKind::Modify(ModifyKind::Name(mode)), path).set_tracker(tracker)
    }

    #[test]
    fn test_create_file_event() {
        let event = notify_event(EventKind::Create(CreateKind::File), "/hot/scan.png");

        assert_eq!(
            EventTranslator::new().translate(&event),
            vec![FolderEvent::file("/hot/scan.png")]
        );
    }

    #[test]
    fn test_create_folder_event_is_marked_as_directory() {
        let event = notify_event(EventKind::Create(CreateKind::Folder), "/hot/sub");

        assert_eq!(
            EventTranslator::new().translate(&event),
            vec![FolderEvent::Created {
                path: "/hot/sub".into(),
                is_dir: true
            }]
        );
    }

    #[test]
    fn test_other_kinds_are_dropped() {
        let mut translator = EventTranslator::new();
        let modify = notify_event(EventKind::Modify(ModifyKind::Any), "/hot/a.png");
        let remove = notify_event(EventKind::Remove(RemoveKind::File), "/hot/a.png");

        assert!(translator.translate(&modify).is_empty());
        assert!(translator.translate(&remove).is_empty());
    }

    #[test]
    fn test_move_in_from_outside_counts_as_created() {
        let mut translator = EventTranslator::new();

        let events = translator.translate(&rename(RenameMode::To, "/hot/scan.png", 7));

        assert_eq!(events, vec![FolderEvent::file("/hot/scan.png")]);
    }

    #[test]
    fn test_rename_inside_folder_is_dropped() {
        let mut translator = EventTranslator::new();

        let from = rename(RenameMode::From, "/hot/a.png", 11);
        let to = rename(RenameMode::To, "/hot/b.png", 11);
        assert!(translator.translate(&from).is_empty());
        assert!(translator.translate(&to).is_empty());

        // The cookie is used up; a later move-in with the same value still counts.
        let again = rename(RenameMode::To, "/hot/c.png", 11);
        assert_eq!(
            translator.translate(&again),
            vec![FolderEvent::file("/hot/c.png")]
        );
    }

    #[test]
    fn test_rename_both_event_is_dropped() {
        let kind = EventKind::Modify(ModifyKind::Name(RenameMode::Both));
        let event = notify_event(kind, "/hot/a.png").add_path("/hot/b.png".into());

        assert!(EventTranslator::new().translate(&event).is_empty());
    }

    #[test]
    fn test_pending_renames_are_bounded() {
        let mut translator = EventTranslator::new();
        for tracker in 0..MAX_PENDING_RENAMES + 10 {
            translator.translate(&rename(RenameMode::From, "/hot/x.png", tracker));
        }

        assert_eq!(translator.pending_renames.len(), MAX_PENDING_RENAMES);
        // The oldest cookies were forgotten.
        let late = rename(RenameMode::To, "/hot/y.png", 0);
        assert_eq!(
            translator.translate(&late),
            vec![FolderEvent::file("/hot/y.png")]
        );
    }
}
