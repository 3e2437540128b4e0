//! Joplin-ready notes built from an image and its OCR text.

use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Characters Joplin's importer trips over in resource names.
const STRIPPED_CHARS: &[char] = &['(', ')', '[', ']', '{', '}'];

/// A note about one source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    /// Where the image was dropped.
    pub source_path: PathBuf,
    /// Sanitized file stem; also the note's file name without `.md`.
    pub title: String,
    /// Sanitized file name the image is copied to.
    pub image_filename: String,
    /// OCR text with runs of blank lines collapsed.
    pub body: String,
}

impl Note {
    pub fn new(image_path: &Path, extracted_text: &str) -> Self {
        let original_filename = image_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = image_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        let image_filename = sanitize_filename(&original_filename);
        let title = sanitize_filename(&stem);
        tracing::debug!(
            original = %original_filename,
            sanitized = %image_filename,
            "Sanitized filename"
        );

        Self {
            source_path: image_path.to_path_buf(),
            title,
            image_filename,
            body: clean_text(extracted_text),
        }
    }

    pub fn markdown_filename(&self) -> String {
        format!("{}.md", self.title)
    }

    /// Relative link to the copied image, which sits next to the note.
    pub fn image_link(&self) -> &str {
        &self.image_filename
    }

    /// Render the markdown dated `date`.
    pub fn render(&self, date: NaiveDate) -> String {
        format!(
            "# {} {}\n\n{}\n\n![{}]({})\n",
            date.format("%Y-%m-%d"),
            self.title,
            self.body,
            self.image_filename,
            self.image_link()
        )
    }

    /// Render the markdown dated today, local time.
    pub fn render_today(&self) -> String {
        self.render(chrono::Local::now().date_naive())
    }
}

/// Make a file name safe for Joplin import.
///
/// Spaces become underscores, brackets of every kind are dropped and runs of
/// underscores collapse to one.
pub fn sanitize_filename(filename: &str) -> String {
    let mut sanitized = String::with_capacity(filename.len());
    for c in filename.chars() {
        let c = if c == ' ' { '_' } else { c };
        if STRIPPED_CHARS.contains(&c) {
            continue;
        }
        if c == '_' && sanitized.ends_with('_') {
            continue;
        }
        sanitized.push(c);
    }
    sanitized
}

/// Keep at most one blank line between paragraphs.
///
/// A line counts as blank when it holds only whitespace. Other lines pass
/// through untouched and in order.
pub fn clean_text(text: &str) -> String {
    let mut cleaned: Vec<&str> = Vec::new();
    let mut prev_blank = false;

    for line in text.split('\n') {
        let is_blank = line.trim().is_empty();
        if !(is_blank && prev_blank) {
            cleaned.push(line);
        }
        prev_blank = is_blank;
    }

    cleaned.join("\n")
}
