use thiserror::Error;

#[derive(Error, Debug)]
pub enum HotFolderError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(String),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("OCR error: {0}")]
    Ocr(String),

    #[error("OCR unavailable: {0}")]
    OcrUnavailable(String),

    #[error("Watcher error: {0}")]
    Watch(#[from] notify::Error),

    #[error("Output error: {0}")]
    Output(String),
}

impl From<config::ConfigError> for HotFolderError {
    fn from(err: config::ConfigError) -> Self {
        HotFolderError::Config(err.to_string())
    }
}

impl From<image::ImageError> for HotFolderError {
    fn from(err: image::ImageError) -> Self {
        HotFolderError::Image(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HotFolderError>;
