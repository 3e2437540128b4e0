//! OCR (Optical Character Recognition) Module
//!
//! Turns a dropped image or PDF into text.
//!
//! # Architecture
//!
//! - `OcrEngine` trait recognises a single image
//! - `TesseractEngine` implements local OCR via leptess
//! - `OllamaEngine` asks a vision model served by Ollama
//! - `PageRenderer` rasterises PDF pages (`PdfiumRenderer` in production)
//! - `OcrProvider` dispatches on the file extension and composes the above
//!
//! # Usage
//!
//! ```rust,ignore
//! let ocr = OcrProvider::new(&config.ocr);
//! let text = ocr.extract_text(path).await.into_text();
//! ```

mod api;
mod engine;
mod pdf;
mod preprocessing;
mod provider;

use std::path::Path;

pub use api::OllamaEngine;
pub use engine::{OcrEngine, PageImage, TesseractEngine};
pub use pdf::{PageRenderer, PdfiumRenderer};
pub use preprocessing::prepare_for_recognition;
pub use provider::OcrProvider;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tif"];

/// What the file extension says about a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Pdf,
    Image,
    Unsupported,
}

impl SourceKind {
    /// Classify by extension, ignoring case.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match ext.as_deref() {
            Some("pdf") => SourceKind::Pdf,
            Some(ext) if IMAGE_EXTENSIONS.contains(&ext) => SourceKind::Image,
            _ => SourceKind::Unsupported,
        }
    }
}

/// Outcome of running OCR on one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Text(String),
    /// Neither an image nor a PDF.
    Unsupported,
    Failed {
        reason: String,
    },
}

impl Extraction {
    /// The extracted text; empty for unsupported files and failures.
    pub fn into_text(self) -> String {
        match self {
            Extraction::Text(text) => text,
            Extraction::Unsupported | Extraction::Failed { .. } => String::new(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Extraction::Failed { .. })
    }
}
