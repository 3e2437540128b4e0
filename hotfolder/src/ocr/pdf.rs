use std::path::{Path, PathBuf};

use image::DynamicImage;
use pdfium_render::prelude::*;

use crate::error::{HotFolderError, Result};

/// PDF user space units per inch.
const POINTS_PER_INCH: f32 = 72.0;

/// Rasterises PDF pages for OCR.
///
/// The outer result fails when the document cannot be opened at all; each
/// page carries its own result so one broken page does not hide the others.
pub trait PageRenderer: Send + Sync {
    fn render(&self, path: &Path, dpi: u32) -> Result<Vec<Result<DynamicImage>>>;
}

/// Renders pages with PDFium, bound dynamically at call time.
#[derive(Debug, Clone, Default)]
pub struct PdfiumRenderer {
    library_path: Option<PathBuf>,
}

impl PdfiumRenderer {
    pub fn new(library_path: Option<PathBuf>) -> Self {
        Self { library_path }
    }

    /// Searches for libpdfium in the configured directory, then the current
    /// directory, then the system library paths.
    fn bind(&self) -> Result<Pdfium> {
        let configured = self
            .library_path
            .as_ref()
            .map(|dir| Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir)));

        let bindings = match configured {
            Some(Ok(bindings)) => Ok(bindings),
            _ => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| Pdfium::bind_to_system_library()),
        }
        .map_err(|e| HotFolderError::Pdf(format!("Failed to load PDFium library: {e:?}")))?;

        Ok(Pdfium::new(bindings))
    }
}

impl PageRenderer for PdfiumRenderer {
    fn render(&self, path: &Path, dpi: u32) -> Result<Vec<Result<DynamicImage>>> {
        let pdfium = self.bind()?;
        let document = pdfium.load_pdf_from_file(path, None).map_err(|e| {
            HotFolderError::Pdf(format!("Failed to open {}: {e:?}", path.display()))
        })?;

        let render_config =
            PdfRenderConfig::new().scale_page_by_factor(dpi as f32 / POINTS_PER_INCH);

        let pages = document
            .pages()
            .iter()
            .enumerate()
            .map(|(index, page)| {
                page.render_with_config(&render_config)
                    .map(|bitmap| bitmap.as_image())
                    .map_err(|e| {
                        HotFolderError::Pdf(format!("Failed to render page {}: {e:?}", index + 1))
                    })
            })
            .collect();

        Ok(pages)
    }
}
