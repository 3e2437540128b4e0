//! Persisting OCR results: plain text files and note/image pairs.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};

use crate::error::{HotFolderError, Result};
use crate::note::Note;

/// Files written for one note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedNote {
    pub markdown_path: PathBuf,
    pub image_path: PathBuf,
}

/// Write `text` to `{stem}.txt` in `output_dir`, replacing any existing file.
pub async fn write_text(source_path: &Path, text: &str, output_dir: &Path) -> Result<PathBuf> {
    let stem = source_path.file_stem().ok_or_else(|| {
        HotFolderError::Output(format!("{} has no file name", source_path.display()))
    })?;

    let mut filename = stem.to_os_string();
    filename.push(".txt");
    let output_path = output_dir.join(filename);

    fs::create_dir_all(output_dir).await?;
    fs::write(&output_path, text).await?;

    info!(path = %output_path.display(), "Extracted text saved");
    Ok(output_path)
}

/// Copy the note's image into `output_dir` and write the markdown next to it.
///
/// The image is copied first. If the markdown write then fails the copy is
/// left in place.
pub async fn save_note(note: &Note, markdown: &str, output_dir: &Path) -> Result<SavedNote> {
    fs::create_dir_all(output_dir).await?;

    let image_path = output_dir.join(&note.image_filename);
    debug!(
        from = %note.source_path.display(),
        to = %image_path.display(),
        "Copying image"
    );
    fs::copy(&note.source_path, &image_path).await?;

    let markdown_path = output_dir.join(note.markdown_filename());
    fs::write(&markdown_path, markdown.as_bytes()).await?;

    info!(path = %markdown_path.display(), "Joplin note created");
    Ok(SavedNote {
        markdown_path,
        image_path,
    })
}
