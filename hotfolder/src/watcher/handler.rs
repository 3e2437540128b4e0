use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn, Instrument};

use super::events::FolderEvent;
use crate::config::Config;
use crate::note::Note;
use crate::ocr::OcrProvider;
use crate::output;

/// What happened to one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// A directory appeared; nothing to do.
    Ignored,
    Processed(EventReport),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventReport {
    pub path: PathBuf,
    /// OCR failed and the file was treated as having no text.
    pub ocr_failed: bool,
    /// Files written, note artifacts first.
    pub artifacts: Vec<PathBuf>,
    /// Output stages that failed, with the reason.
    pub failures: Vec<String>,
}

impl EventReport {
    pub fn is_clean(&self) -> bool {
        !self.ocr_failed && self.failures.is_empty()
    }
}

/// Runs the OCR-to-artifact pipeline for each created file.
///
/// Every event is isolated: failures are logged and recorded in the report,
/// never returned, so the watch loop keeps going.
#[derive(Clone)]
pub struct HotFolderHandler {
    ocr: OcrProvider,
    output_path: Option<PathBuf>,
    joplin_path: Option<PathBuf>,
}

impl HotFolderHandler {
    pub fn new(
        ocr: OcrProvider,
        output_path: Option<PathBuf>,
        joplin_path: Option<PathBuf>,
    ) -> Self {
        Self {
            ocr,
            output_path,
            joplin_path,
        }
    }

    pub fn from_config(config: &Config, ocr: OcrProvider) -> Self {
        Self::new(
            ocr,
            Some(config.output_path.clone()),
            config.joplin_path.clone(),
        )
    }

    pub async fn handle(&self, event: FolderEvent) -> EventOutcome {
        match event {
            FolderEvent::Created { is_dir: true, path } => {
                debug!(path = %path.display(), "Ignoring new directory");
                EventOutcome::Ignored
            }
            FolderEvent::Created { path, .. } => {
                let span = tracing::info_span!("event", path = %path.display());
                EventOutcome::Processed(self.process(&path).instrument(span).await)
            }
        }
    }

    /// Handle each of `files` as if it had just been dropped, in order.
    pub async fn process_files(&self, files: Vec<PathBuf>) -> Vec<EventOutcome> {
        let mut outcomes = Vec::with_capacity(files.len());
        for file in files {
            let event = FolderEvent::Created {
                is_dir: file.is_dir(),
                path: file,
            };
            let outcome = self.handle(event).await;
            if let EventOutcome::Processed(report) = &outcome {
                if !report.is_clean() {
                    warn!(path = %report.path.display(), "Processed with errors");
                }
            }
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Run OCR on `path` and write whichever artifacts are configured.
    pub async fn process(&self, path: &Path) -> EventReport {
        let mut report = EventReport {
            path: path.to_path_buf(),
            ..EventReport::default()
        };

        let extraction = self.ocr.extract_text(path).await;
        report.ocr_failed = extraction.is_failed();
        let extracted_text = extraction.into_text();

        if let Some(joplin_path) = &self.joplin_path {
            debug!("Creating Joplin note");
            let note = Note::new(path, &extracted_text);
            let markdown = note.render_today();
            match output::save_note(&note, &markdown, joplin_path).await {
                Ok(saved) => {
                    report.artifacts.push(saved.markdown_path);
                    report.artifacts.push(saved.image_path);
                }
                Err(e) => {
                    error!("Failed to save Joplin note: {}", e);
                    report.failures.push(format!("note: {e}"));
                }
            }
        }

        if let Some(output_path) = &self.output_path {
            match output::write_text(path, &extracted_text, output_path).await {
                Ok(text_path) => report.artifacts.push(text_path),
                Err(e) => {
                    error!("Failed to save extracted text: {}", e);
                    report.failures.push(format!("text: {e}"));
                }
            }
        }

        if report.is_clean() {
            info!(artifacts = report.artifacts.len(), "File processed");
        }
        report
    }
}
