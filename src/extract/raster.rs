//! Fallback extraction: rasterize every page and OCR the page images.
//!
//! Used when the validator refuses the embedded text layer. Each page that
//! fails OCR is skipped and counted instead of aborting the request, keeping
//! the failure policy symmetric with the embedded-image pass.

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

use super::images::sorted_images;
use super::ocr::ImageOcr;
use super::tools::run_tool_status;
use super::ExtractionError;

/// Aggregate of the rasterization fallback.
#[derive(Debug, Default)]
pub struct RasterizedText {
    /// Page texts joined with newlines, in page order.
    pub text: String,
    pub words: u64,
    /// Number of rendered pages. The fallback treats every page as an image
    /// with text by construction.
    pub pages: u32,
    /// Pages whose OCR failed and was skipped.
    pub page_errors: u32,
}

/// Render every page to a JPEG and OCR each one in order.
pub fn ocr_rasterized_pages(
    pdf_path: &Path,
    ocr: &ImageOcr,
) -> Result<RasterizedText, ExtractionError> {
    let temp_dir = TempDir::new()?;
    let prefix = temp_dir.path().join("page");

    let mut cmd = Command::new("pdftoppm");
    cmd.arg("-jpeg").arg(pdf_path).arg(&prefix);
    run_tool_status(
        cmd,
        "pdftoppm (install poppler-utils)",
        "pdftoppm failed to rasterize the PDF",
        ocr.timeout(),
    )?;

    let page_images = sorted_images(temp_dir.path(), "jpg")?;
    if page_images.is_empty() {
        return Err(ExtractionError::ExtractionFailed(
            "no page images were rendered from the PDF".into(),
        ));
    }

    ocr_pages(&page_images, |image_path| ocr.ocr_image(image_path))
}

/// OCR each rendered page in order. A page-level failure is skipped and
/// counted; environment errors abort since every remaining page would fail
/// the same way.
fn ocr_pages<F>(page_images: &[PathBuf], mut ocr_page: F) -> Result<RasterizedText, ExtractionError>
where
    F: FnMut(&Path) -> Result<(String, u64), ExtractionError>,
{
    let mut result = RasterizedText {
        pages: page_images.len() as u32,
        ..Default::default()
    };

    let mut page_texts = Vec::with_capacity(page_images.len());
    for (index, image_path) in page_images.iter().enumerate() {
        match ocr_page(image_path) {
            Ok((text, words)) => {
                page_texts.push(text);
                result.words += words;
            }
            Err(e) if e.is_environment() => return Err(e),
            Err(e) => {
                tracing::warn!("OCR failed for page {}: {}", index + 1, e);
                result.page_errors += 1;
            }
        }
    }

    result.text = page_texts.join("\n");
    Ok(result)
}
