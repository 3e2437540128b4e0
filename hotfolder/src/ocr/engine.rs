use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use image::DynamicImage;
use leptess::LepTess;
use tokio::sync::Mutex;

use super::preprocessing::{encode_png, prepare_for_recognition};
use crate::error::{HotFolderError, Result};

/// A single image handed to an OCR engine.
#[derive(Debug, Clone)]
pub enum PageImage {
    /// An image file dropped into the hot folder.
    File(PathBuf),
    /// A PDF page rasterised in memory.
    Rendered(DynamicImage),
}

/// Recognises the text on one image.
///
/// Implementations return errors freely; the provider decides what a failure
/// means for the file being processed.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    fn name(&self) -> &str;

    async fn recognize(&self, page: PageImage) -> Result<String>;
}

/// Local recognition through Tesseract.
#[derive(Clone)]
pub struct TesseractEngine {
    tesseract: Arc<Mutex<LepTess>>,
    upscale_factor: u32,
}

impl TesseractEngine {
    pub fn new(languages: &str, upscale_factor: u32) -> Result<Self> {
        let lt = LepTess::new(None, languages)
            .map_err(|e| HotFolderError::OcrUnavailable(format!("Tesseract not available: {e}")))?;

        Ok(Self {
            tesseract: Arc::new(Mutex::new(lt)),
            upscale_factor,
        })
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn recognize(&self, page: PageImage) -> Result<String> {
        let tesseract = Arc::clone(&self.tesseract);
        let upscale_factor = self.upscale_factor;

        tokio::task::spawn_blocking(move || {
            // Image files get the small-font treatment; rendered PDF pages are
            // already at print resolution.
            let bytes = match page {
                PageImage::File(path) => {
                    let img = image::open(&path).map_err(|e| {
                        HotFolderError::Image(format!("Failed to open {}: {e}", path.display()))
                    })?;
                    encode_png(&prepare_for_recognition(&img, upscale_factor))?
                }
                PageImage::Rendered(img) => encode_png(&img)?,
            };

            let mut lt = tesseract.blocking_lock();
            lt.set_image_from_mem(&bytes)
                .map_err(|e| HotFolderError::Ocr(format!("Failed to set image: {e}")))?;
            lt.get_utf8_text()
                .map_err(|e| HotFolderError::Ocr(format!("Failed to extract text: {e}")))
        })
        .await
        .map_err(|e| HotFolderError::Ocr(format!("OCR task panicked: {e}")))?
    }
}
