//! Hot folder OCR: watch a directory for scans, extract their text and
//! write plain text files and/or Joplin-ready markdown notes.

pub mod config;
pub mod error;
pub mod note;
pub mod ocr;
pub mod output;
pub mod watcher;

pub use config::Config;
pub use error::{HotFolderError, Result};
