//! Document text-extraction pipeline.
//!
//! The flow for a PDF upload:
//! 1. `validator` classifies the PDF: can the embedded text layer be trusted?
//! 2. Trusted PDFs go through `text_layer` (word-by-word extraction with
//!    orientation correction) plus `images` (OCR on each embedded raster
//!    image).
//! 3. Untrusted PDFs go through `raster` (every page rendered to an image and
//!    OCR'd).
//! 4. Both OCR paths bottom out in `ocr::ImageOcr`, which preprocesses the
//!    image, runs Tesseract, and strips noisy lines.
//!
//! Image uploads skip the PDF machinery and go straight to `ocr::ImageOcr`.

mod images;
mod ocr;
mod raster;
pub mod tools;
mod validator;

pub mod text_layer;

pub use ocr::ImageOcr;
pub use validator::validate_pdf;

use std::path::Path;

use thiserror::Error;

use crate::config::{OcrSettings, Settings};

/// File extensions recognized as plain images.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "tiff"];

/// OCR languages offered to the user. Codes are Tesseract traineddata names.
pub const LANGUAGES: &[Language] = &[
    Language { code: "deu", name: "German" },
    Language { code: "kor", name: "Korean" },
    Language { code: "spa", name: "Spanish" },
    Language { code: "fra", name: "French" },
    Language { code: "hin", name: "Hindi" },
    Language { code: "eng", name: "English" },
    Language { code: "ita", name: "Italian" },
    Language { code: "jpn", name: "Japanese" },
    Language { code: "por", name: "Portuguese" },
];

/// An OCR language from the fixed catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
}

/// Look up a catalog language by its Tesseract code.
pub fn language_by_code(code: &str) -> Option<&'static Language> {
    LANGUAGES.iter().find(|l| l.code == code)
}

/// Join selected language codes into Tesseract's multi-language directive.
/// Returns `None` for an empty selection (engine default language applies).
pub fn join_language_codes(codes: &[String]) -> Option<String> {
    if codes.is_empty() {
        None
    } else {
        Some(codes.join("+"))
    }
}

/// Errors that can occur during text extraction.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Required tool not installed: {0}")]
    ToolNotFound(String),

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("OCR timed out running {0}")]
    Timeout(String),

    #[error("No text could be extracted from the document")]
    NoTextExtracted,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractionError {
    /// Environment errors mean the host is misconfigured, not that the
    /// document is bad.
    pub fn is_environment(&self) -> bool {
        matches!(self, ExtractionError::ToolNotFound(_))
    }
}

/// Document kind inferred from the filename extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Image,
}

impl DocumentKind {
    /// Classify a file by extension (case-insensitive). Anything outside the
    /// recognized PDF/image sets fails before extraction is attempted.
    pub fn from_path(path: &Path) -> Result<Self, ExtractionError> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if ext == "pdf" {
            Ok(DocumentKind::Pdf)
        } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Ok(DocumentKind::Image)
        } else {
            Err(ExtractionError::UnsupportedFileType(ext))
        }
    }
}

/// Accumulated output of the pipeline.
#[derive(Debug, Clone, Default)]
pub struct ExtractionResult {
    /// Raw concatenated text from all pages and images.
    pub text_extracted: String,
    /// `text_extracted` with all whitespace characters removed.
    pub text_cleaned: String,
    pub qt_pages: u32,
    /// Images (or rasterized pages) that yielded text.
    pub qt_images: u32,
    pub qt_words: u64,
    pub qt_char_extracted: u64,
    pub qt_char_cleaned: u64,
    /// Rasterized pages whose OCR failed and was skipped.
    pub qt_page_errors: u32,
}

impl ExtractionResult {
    /// Compute the cleaned text variant and character counters. Fails when
    /// the whole pipeline produced nothing.
    fn finalize(mut self) -> Result<Self, ExtractionError> {
        if self.text_extracted.trim().is_empty() {
            return Err(ExtractionError::NoTextExtracted);
        }
        self.text_cleaned = clean_text(&self.text_extracted);
        self.qt_char_extracted = self.text_extracted.chars().count() as u64;
        self.qt_char_cleaned = self.text_cleaned.chars().count() as u64;
        Ok(self)
    }
}

/// Strip the whitespace character class in a single pass.
fn clean_text(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '\n' | '\r' | '\t' | ' '))
        .collect()
}

/// Text extractor tying the pipeline together for one request.
pub struct TextExtractor {
    ocr_settings: OcrSettings,
    languages: Vec<String>,
}

impl TextExtractor {
    /// Build an extractor for the given language selection. Unknown codes
    /// should have been filtered out by the caller.
    pub fn new(settings: &Settings, languages: Vec<String>) -> Self {
        Self {
            ocr_settings: settings.ocr.clone(),
            languages,
        }
    }

    /// Run the full pipeline on an uploaded file.
    pub fn extract(&self, path: &Path) -> Result<ExtractionResult, ExtractionError> {
        match DocumentKind::from_path(path)? {
            DocumentKind::Pdf => self.extract_pdf(path),
            DocumentKind::Image => self.extract_image(path),
        }
    }

    fn extract_pdf(&self, path: &Path) -> Result<ExtractionResult, ExtractionError> {
        let ocr = ImageOcr::new(&self.ocr_settings, &self.languages);
        let mut result = ExtractionResult::default();

        if validator::validate_pdf(path, self.ocr_settings.timeout_secs)? {
            tracing::info!("Text layer trusted, extracting embedded text");
            result.qt_pages = text_layer::page_count(path, self.ocr_settings.timeout_secs)?;

            let (text, words) = text_layer::extract_text_layer(path, self.ocr_settings.timeout_secs)?;
            result.text_extracted = text;
            result.qt_words = words;

            let embedded = images::ocr_embedded_images(path, &ocr)?;
            result.text_extracted.push_str(&embedded.text);
            result.qt_words += embedded.words;
            result.qt_images = embedded.images_with_text;
        } else {
            tracing::info!("Text layer not trusted, rasterizing pages for OCR");
            let rastered = raster::ocr_rasterized_pages(path, &ocr)?;
            result.text_extracted = rastered.text;
            result.qt_words = rastered.words;
            result.qt_pages = rastered.pages;
            result.qt_images = rastered.pages;
            result.qt_page_errors = rastered.page_errors;
        }

        result.finalize()
    }

    fn extract_image(&self, path: &Path) -> Result<ExtractionResult, ExtractionError> {
        let ocr = ImageOcr::new(&self.ocr_settings, &self.languages);
        let (text, words) = ocr.ocr_image(path)?;

        let result = ExtractionResult {
            text_extracted: text,
            qt_pages: 1,
            qt_images: 1,
            qt_words: words,
            ..Default::default()
        };
        result.finalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn kind_from_extension_is_case_insensitive() {
        assert_eq!(
            DocumentKind::from_path(&PathBuf::from("scan.PDF")).unwrap(),
            DocumentKind::Pdf
        );
        assert_eq!(
            DocumentKind::from_path(&PathBuf::from("photo.JPeG")).unwrap(),
            DocumentKind::Image
        );
        assert_eq!(
            DocumentKind::from_path(&PathBuf::from("page.tiff")).unwrap(),
            DocumentKind::Image
        );
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = DocumentKind::from_path(&PathBuf::from("report.docx")).unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedFileType(ref e) if e == "docx"));

        let err = DocumentKind::from_path(&PathBuf::from("no_extension")).unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedFileType(_)));
    }

    #[test]
    fn language_catalog_has_nine_entries() {
        assert_eq!(LANGUAGES.len(), 9);
        assert_eq!(language_by_code("por").unwrap().name, "Portuguese");
        assert!(language_by_code("xyz").is_none());
    }

    #[test]
    fn language_codes_join_with_plus() {
        let codes = vec!["deu".to_string(), "eng".to_string()];
        assert_eq!(join_language_codes(&codes).unwrap(), "deu+eng");
        assert_eq!(join_language_codes(&[]), None);
    }

    #[test]
    fn clean_text_strips_whitespace_class() {
        let cleaned = clean_text("a b\tc\nd\re");
        assert_eq!(cleaned, "abcde");
        assert!(!cleaned.contains(['\n', '\r', '\t', ' ']));
    }

    #[test]
    fn finalize_counts_characters() {
        let result = ExtractionResult {
            text_extracted: "Hello World Hello World ".to_string(),
            qt_pages: 2,
            qt_words: 4,
            ..Default::default()
        };
        let result = result.finalize().unwrap();
        assert_eq!(result.qt_char_extracted, 24);
        // Four spaces stripped
        assert_eq!(result.qt_char_cleaned, 20);
        assert!(result.qt_char_cleaned <= result.qt_char_extracted);
        assert_eq!(result.text_cleaned, "HelloWorldHelloWorld");
    }

    #[test]
    fn finalize_rejects_empty_output() {
        let empty = ExtractionResult::default();
        assert!(matches!(
            empty.finalize(),
            Err(ExtractionError::NoTextExtracted)
        ));

        let whitespace_only = ExtractionResult {
            text_extracted: "  \n\t ".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            whitespace_only.finalize(),
            Err(ExtractionError::NoTextExtracted)
        ));
    }

    #[test]
    fn environment_errors_are_distinguished() {
        assert!(ExtractionError::ToolNotFound("pdffonts".into()).is_environment());
        assert!(!ExtractionError::NoTextExtracted.is_environment());
    }
}
