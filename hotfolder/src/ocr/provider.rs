use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::api::OllamaEngine;
use super::engine::{OcrEngine, PageImage, TesseractEngine};
use super::pdf::{PageRenderer, PdfiumRenderer};
use super::{Extraction, SourceKind};
use crate::config::{OcrBackendKind, OcrConfig};

#[derive(Clone)]
enum OcrBackend {
    Available { engine: Arc<dyn OcrEngine> },
    Unavailable { reason: String },
}

/// Turns a dropped file into text with whichever engine was configured.
#[derive(Clone)]
pub struct OcrProvider {
    backend: OcrBackend,
    renderer: Arc<dyn PageRenderer>,
    pdf_dpi: u32,
}

impl OcrProvider {
    /// Build the provider selected by `config.backend`.
    ///
    /// An engine that cannot start leaves the provider unavailable instead of
    /// failing; every extraction then reports the reason.
    pub fn new(config: &OcrConfig) -> Self {
        let engine: crate::error::Result<Arc<dyn OcrEngine>> = match config.backend {
            OcrBackendKind::Tesseract => {
                TesseractEngine::new(&config.languages, config.upscale_factor)
                    .map(|e| Arc::new(e) as Arc<dyn OcrEngine>)
            }
            OcrBackendKind::Ollama => {
                OllamaEngine::new(config).map(|e| Arc::new(e) as Arc<dyn OcrEngine>)
            }
        };

        let backend = match engine {
            Ok(engine) => {
                info!(
                    backend = %config.backend,
                    model = %config.model,
                    languages = %config.languages,
                    "OCR backend initialized"
                );
                OcrBackend::Available { engine }
            }
            Err(e) => {
                let reason = format!("{} backend unavailable: {e}", config.backend);
                warn!("{}", reason);
                OcrBackend::Unavailable { reason }
            }
        };

        Self {
            backend,
            renderer: Arc::new(PdfiumRenderer::new(config.pdfium_library_path.clone())),
            pdf_dpi: config.pdf_dpi,
        }
    }

    /// Build a provider around an existing engine and renderer.
    pub fn with_engine(
        engine: Arc<dyn OcrEngine>,
        renderer: Arc<dyn PageRenderer>,
        pdf_dpi: u32,
    ) -> Self {
        Self {
            backend: OcrBackend::Available { engine },
            renderer,
            pdf_dpi,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.backend, OcrBackend::Available { .. })
    }

    /// Extract the text of an image or PDF.
    ///
    /// Never fails outright: unsupported extensions come back as
    /// [`Extraction::Unsupported`] and any engine or I/O problem as
    /// [`Extraction::Failed`], both of which read as empty text.
    pub async fn extract_text(&self, path: &Path) -> Extraction {
        let kind = SourceKind::from_path(path);
        debug!(path = %path.display(), ?kind, "Processing file");

        if kind == SourceKind::Unsupported {
            return Extraction::Unsupported;
        }

        let engine = match &self.backend {
            OcrBackend::Available { engine } => Arc::clone(engine),
            OcrBackend::Unavailable { reason } => {
                error!(path = %path.display(), "Cannot OCR file: {}", reason);
                return Extraction::Failed {
                    reason: reason.clone(),
                };
            }
        };

        match kind {
            SourceKind::Pdf => self.extract_pdf(engine.as_ref(), path).await,
            SourceKind::Image => {
                info!(path = %path.display(), engine = engine.name(), "Detected new image");
                match engine.recognize(PageImage::File(path.to_path_buf())).await {
                    Ok(text) => Extraction::Text(text),
                    Err(e) => {
                        error!(path = %path.display(), "Error processing image: {}", e);
                        Extraction::Failed {
                            reason: e.to_string(),
                        }
                    }
                }
            }
            SourceKind::Unsupported => Extraction::Unsupported,
        }
    }

    async fn extract_pdf(&self, engine: &dyn OcrEngine, path: &Path) -> Extraction {
        let renderer = Arc::clone(&self.renderer);
        let owned_path = path.to_path_buf();
        let dpi = self.pdf_dpi;

        let rendered = tokio::task::spawn_blocking(move || renderer.render(&owned_path, dpi)).await;

        let pages = match rendered {
            Ok(Ok(pages)) => pages,
            Ok(Err(e)) => {
                error!(path = %path.display(), "Error rendering PDF: {}", e);
                return Extraction::Failed {
                    reason: e.to_string(),
                };
            }
            Err(e) => {
                error!(path = %path.display(), "PDF render task panicked: {}", e);
                return Extraction::Failed {
                    reason: e.to_string(),
                };
            }
        };

        let mut extracted = String::new();
        for (index, page) in pages.into_iter().enumerate() {
            let page_num = index + 1;
            info!(path = %path.display(), page = page_num, "Processing page");

            let image = match page {
                Ok(image) => image,
                Err(e) => {
                    error!(path = %path.display(), page = page_num, "Skipping page: {}", e);
                    continue;
                }
            };

            match engine.recognize(PageImage::Rendered(image)).await {
                Ok(text) => {
                    extracted.push_str(&text);
                    extracted.push('\n');
                }
                Err(e) => {
                    error!(path = %path.display(), page = page_num, "Skipping page: {}", e);
                }
            }
        }

        Extraction::Text(extracted)
    }
}
