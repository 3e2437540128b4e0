#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use image::DynamicImage;

use hotfolder::error::{HotFolderError, Result};
use hotfolder::ocr::{OcrEngine, OcrProvider, PageImage, PageRenderer};

/// Returns the same text for every image and counts the calls.
pub struct FixedTextEngine {
    text: String,
    calls: AtomicUsize,
}

impl FixedTextEngine {
    pub fn new(text: &str) -> Arc<Self> {
        Arc::new(Self {
            text: text.to_string(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OcrEngine for FixedTextEngine {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn recognize(&self, _page: PageImage) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.clone())
    }
}

/// Fails every recognition.
pub struct BrokenEngine;

#[async_trait]
impl OcrEngine for BrokenEngine {
    fn name(&self) -> &str {
        "broken"
    }

    async fn recognize(&self, _page: PageImage) -> Result<String> {
        Err(HotFolderError::Ocr("engine crashed".to_string()))
    }
}

/// Pretends every PDF has `pages` blank pages.
pub struct BlankPdf {
    pub pages: usize,
}

impl PageRenderer for BlankPdf {
    fn render(&self, _path: &Path, _dpi: u32) -> Result<Vec<Result<DynamicImage>>> {
        Ok((0..self.pages)
            .map(|_| Ok(DynamicImage::new_rgb8(8, 8)))
            .collect())
    }
}

pub fn provider(engine: Arc<dyn OcrEngine>) -> OcrProvider {
    OcrProvider::with_engine(engine, Arc::new(BlankPdf { pages: 2 }), 300)
}

/// Drop a tiny PNG into `dir` under `name`.
pub fn drop_png(dir: &Path, name: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    DynamicImage::new_rgb8(16, 16)
        .save_with_format(&path, image::ImageFormat::Png)
        .expect("Failed to write test image");
    path
}

/// Sorted file names in `dir`.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("Failed to read directory")
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
