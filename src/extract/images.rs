//! OCR of raster images embedded in PDF pages.
//!
//! `pdfimages` dumps every embedded raster object into a scoped temp
//! directory; each one is OCR'd individually. A single broken image must not
//! abort extraction of the rest of the document, so per-image failures are
//! logged and skipped.

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

use super::ocr::ImageOcr;
use super::tools::run_with_timeout;
use super::ExtractionError;

/// Aggregate of the embedded-image OCR pass.
#[derive(Debug, Default)]
pub struct EmbeddedImageText {
    /// Concatenated OCR text from images that yielded anything.
    pub text: String,
    pub words: u64,
    /// Count of images that produced non-empty text.
    pub images_with_text: u32,
}

/// Extract each embedded raster image to a temp file and OCR it.
pub fn ocr_embedded_images(
    pdf_path: &Path,
    ocr: &ImageOcr,
) -> Result<EmbeddedImageText, ExtractionError> {
    let temp_dir = TempDir::new()?;
    let prefix = temp_dir.path().join("img");

    let mut cmd = Command::new("pdfimages");
    cmd.arg("-png").arg(pdf_path).arg(&prefix);
    let output = run_with_timeout(cmd, "pdfimages (install poppler-utils)", ocr.timeout())?;
    if !output.status.success() {
        // Image table couldn't be read; the text layer already extracted, so
        // treat this like every image failing rather than aborting.
        tracing::warn!(
            "pdfimages failed, skipping embedded images: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
        return Ok(EmbeddedImageText::default());
    }

    let mut result = EmbeddedImageText::default();
    for image_path in sorted_images(temp_dir.path(), "png")? {
        match ocr.ocr_image(&image_path) {
            Ok((text, words)) if !text.trim().is_empty() => {
                result.text.push_str(&text);
                result.text.push('\n');
                result.words += words;
                result.images_with_text += 1;
            }
            Ok(_) => {}
            Err(e) if e.is_environment() => return Err(e),
            Err(e) => {
                tracing::warn!("OCR failed for embedded image {}: {}", image_path.display(), e);
            }
        }
    }

    Ok(result)
}

/// List extracted files with the given extension in deterministic order.
pub(crate) fn sorted_images(dir: &Path, ext: &str) -> Result<Vec<PathBuf>, ExtractionError> {
    let mut images: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .map(|e| e.eq_ignore_ascii_case(ext))
                .unwrap_or(false)
        })
        .collect();
    images.sort();
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorted_images_filters_and_orders() {
        let dir = TempDir::new().unwrap();
        for name in ["img-002.png", "img-000.png", "img-001.png", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }

        let images = sorted_images(dir.path(), "png").unwrap();
        let names: Vec<_> = images
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, ["img-000.png", "img-001.png", "img-002.png"]);
    }

    #[test]
    fn sorted_images_empty_dir() {
        let dir = TempDir::new().unwrap();
        assert!(sorted_images(dir.path(), "png").unwrap().is_empty());
    }
}
