//! Configuration for the extraction pipeline and web server.
//!
//! The OCR cleanup heuristics are deliberately configuration values rather
//! than constants buried in the extraction code, so they can be tuned without
//! touching the pipeline.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Default bind address for `textcount serve`.
pub const DEFAULT_BIND: &str = "127.0.0.1:3030";

fn default_max_upload_bytes() -> usize {
    100 * 1024 * 1024
}

fn default_binarize_threshold() -> u8 {
    128
}

fn default_min_word_len() -> usize {
    4
}

fn default_ocr_timeout_secs() -> u64 {
    120
}

/// Image preprocessing policy applied before OCR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreprocessPolicy {
    /// Grayscale, sharpen, then binarize at the luminance threshold.
    Binarize,
    /// Grayscale, 3x Lanczos upscale, contrast boost. Gentler on photos of
    /// documents, but not the default.
    Soft,
}

/// OCR and cleanup tuning.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// Luminance cutoff for binarization; pixels above become white.
    pub binarize_threshold: u8,
    /// Lines where every word is shorter than this are dropped as noise.
    pub min_word_len: usize,
    /// Bound on a single tesseract invocation. A hung OCR run must not block
    /// the request forever.
    pub timeout_secs: u64,
    /// Which preprocessing variant feeds the OCR engine.
    pub preprocess: PreprocessPolicy,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            binarize_threshold: default_binarize_threshold(),
            min_word_len: default_min_word_len(),
            timeout_secs: default_ocr_timeout_secs(),
            preprocess: PreprocessPolicy::Binarize,
        }
    }
}

/// Application settings, loadable from a TOML file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Maximum accepted upload size in bytes.
    pub max_upload_bytes: usize,
    pub ocr: OcrSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_upload_bytes: default_max_upload_bytes(),
            ocr: OcrSettings::default(),
        }
    }
}

/// Load settings from an explicit path, from `textcount.toml` in the working
/// directory if it exists, or fall back to defaults.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => {
            let candidate = PathBuf::from("textcount.toml");
            candidate.exists().then_some(candidate)
        }
    };

    match path {
        Some(p) => {
            let raw = fs::read_to_string(&p)?;
            let settings = toml::from_str(&raw)?;
            tracing::info!("Loaded settings from {}", p.display());
            Ok(settings)
        }
        None => Ok(Settings::default()),
    }
}
