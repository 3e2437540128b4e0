use config::builder::{ConfigBuilder, DefaultState};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::Result;

pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
pub const DEFAULT_WATCH_FOLDER: &str = "hot-folder";
pub const DEFAULT_OUTPUT_PATH: &str = "ocr-output";
pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "deepseek-ocr:latest";

const ENV_PREFIX: &str = "HOTFOLDER";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub watch_folder: PathBuf,
    pub output_path: PathBuf,
    /// Enables note mode when set.
    pub joplin_path: Option<PathBuf>,
    pub ocr: OcrConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrBackendKind {
    Tesseract,
    Ollama,
}

impl std::fmt::Display for OcrBackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OcrBackendKind::Tesseract => write!(f, "tesseract"),
            OcrBackendKind::Ollama => write!(f, "ollama"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    pub backend: OcrBackendKind,
    /// Vision model name, used by the ollama backend.
    pub model: String,
    /// Base URL of the ollama server.
    pub host: String,
    /// Tesseract language codes, e.g. "eng" or "eng+deu".
    pub languages: String,
    /// Upscale factor applied to images before local recognition.
    pub upscale_factor: u32,
    /// Resolution PDF pages are rasterised at.
    pub pdf_dpi: u32,
    /// Directory holding libpdfium; the system library path is tried after it.
    pub pdfium_library_path: Option<PathBuf>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            backend: OcrBackendKind::Tesseract,
            model: DEFAULT_OLLAMA_MODEL.to_string(),
            host: DEFAULT_OLLAMA_HOST.to_string(),
            languages: "eng".to_string(),
            upscale_factor: 3,
            pdf_dpi: 300,
            pdfium_library_path: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            watch_folder: PathBuf::from(DEFAULT_WATCH_FOLDER),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            joplin_path: None,
            ocr: OcrConfig::default(),
        }
    }
}

/// `deepseek_ocr:` section of older config files.
#[derive(Debug, Clone, Deserialize)]
struct LegacyDeepSeekSection {
    model: Option<String>,
    host: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LegacySections {
    #[serde(default)]
    deepseek_ocr: Option<LegacyDeepSeekSection>,
}

/// Shape of the merged file + environment sources.
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default = "default_watch_folder")]
    watch_folder: PathBuf,
    #[serde(default = "default_output_path")]
    output_path: PathBuf,
    #[serde(default)]
    joplin_path: Option<PathBuf>,
    #[serde(default)]
    ocr: OcrConfig,
}

fn default_watch_folder() -> PathBuf {
    PathBuf::from(DEFAULT_WATCH_FOLDER)
}

fn default_output_path() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_PATH)
}

impl From<RawConfig> for Config {
    fn from(raw: RawConfig) -> Self {
        Self {
            watch_folder: raw.watch_folder,
            output_path: raw.output_path,
            joplin_path: raw.joplin_path.filter(|p| !p.as_os_str().is_empty()),
            ocr: raw.ocr,
        }
    }
}

/// Values given on the command line. They win over the file and environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub watch_folder: Option<PathBuf>,
    pub output_path: Option<PathBuf>,
    pub joplin_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from `path` (YAML, optional) and `HOTFOLDER_*`
    /// environment variables, then apply command line overrides.
    ///
    /// Nested keys use a double underscore in the environment,
    /// e.g. `HOTFOLDER_OCR__BACKEND=ollama`.
    ///
    /// A legacy `deepseek_ocr:` section selects the ollama backend and
    /// provides defaults that any `ocr` value from either source overrides.
    pub fn load(path: &Path, overrides: &ConfigOverrides) -> Result<Self> {
        let legacy: LegacySections = with_sources(config::Config::builder(), path)
            .build()?
            .try_deserialize()?;

        let mut builder = config::Config::builder();
        if let Some(section) = legacy.deepseek_ocr {
            builder = builder.set_default("ocr.backend", "ollama")?;
            if let Some(model) = section.model {
                builder = builder.set_default("ocr.model", model)?;
            }
            if let Some(host) = section.host {
                builder = builder.set_default("ocr.host", host)?;
            }
        }

        let raw: RawConfig = with_sources(builder, path).build()?.try_deserialize()?;
        let mut config = Config::from(raw);
        config.apply_overrides(overrides);
        Ok(config)
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(watch_folder) = &overrides.watch_folder {
            self.watch_folder = watch_folder.clone();
        }
        if let Some(output_path) = &overrides.output_path {
            self.output_path = output_path.clone();
        }
        if let Some(joplin_path) = &overrides.joplin_path {
            self.joplin_path = Some(joplin_path.clone());
        }
    }

    /// Create the watch, output and note directories if they are missing.
    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.watch_folder)?;
        std::fs::create_dir_all(&self.output_path)?;
        if let Some(joplin_path) = &self.joplin_path {
            std::fs::create_dir_all(joplin_path)?;
        }
        Ok(())
    }
}

fn with_sources(builder: ConfigBuilder<DefaultState>, path: &Path) -> ConfigBuilder<DefaultState> {
    builder
        .add_source(
            config::File::from(path)
                .format(config::FileFormat::Yaml)
                .required(false),
        )
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
}
