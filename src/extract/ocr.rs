//! Shared OCR primitive: preprocess an image, run Tesseract, scrub the output.
//!
//! OCR misfires on non-text regions (stamps, signatures, rules) emit lines
//! that are mostly punctuation, and noise lines made of short garbage tokens.
//! Two line-level filters drop both classes before anything is counted.

use std::path::Path;
use std::process::Command;
use std::time::Duration;

use image::imageops::FilterType;
use image::GenericImageView;
use tempfile::NamedTempFile;

use super::{join_language_codes, tools, ExtractionError};
use crate::config::{OcrSettings, PreprocessPolicy};

/// Sharpening parameters for the binarizing preprocess variant.
const UNSHARPEN_SIGMA: f32 = 1.5;
const UNSHARPEN_THRESHOLD: i32 = 4;

/// Upscale factor and contrast boost for the soft preprocess variant.
const SOFT_UPSCALE: u32 = 3;
const SOFT_CONTRAST: f32 = 30.0;

/// OCR runner bound to one language selection and one settings snapshot.
pub struct ImageOcr {
    settings: OcrSettings,
    /// Tesseract multi-language directive, e.g. `deu+eng`. `None` lets the
    /// engine fall back to its default language.
    language: Option<String>,
}

impl ImageOcr {
    pub fn new(settings: &OcrSettings, language_codes: &[String]) -> Self {
        Self {
            settings: settings.clone(),
            language: join_language_codes(language_codes),
        }
    }

    /// Deadline applied to each external tool invocation.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.settings.timeout_secs)
    }

    /// OCR one image: preprocess, recognize, filter noise, count words.
    pub fn ocr_image(&self, path: &Path) -> Result<(String, u64), ExtractionError> {
        let preprocessed = self.preprocess(path)?;
        let raw = self.run_tesseract(preprocessed.path())?;

        let denoised = filter_noisy_lines(&raw);
        let cleaned = filter_short_word_lines(&denoised, self.settings.min_word_len);
        let words = cleaned.split_whitespace().count() as u64;

        Ok((cleaned, words))
    }

    /// Write the preprocessed variant to a uniquely named temp file; the file
    /// is removed when the returned handle drops.
    fn preprocess(&self, path: &Path) -> Result<NamedTempFile, ExtractionError> {
        let img = image::open(path).map_err(|e| {
            ExtractionError::ExtractionFailed(format!("could not decode image for OCR: {e}"))
        })?;

        let output = tempfile::Builder::new()
            .prefix("textcount-ocr-")
            .suffix(".png")
            .tempfile()?;

        match self.settings.preprocess {
            PreprocessPolicy::Binarize => {
                let sharpened = img.grayscale().unsharpen(UNSHARPEN_SIGMA, UNSHARPEN_THRESHOLD);
                let mut luma = sharpened.to_luma8();
                let threshold = self.settings.binarize_threshold;
                for pixel in luma.pixels_mut() {
                    pixel.0[0] = if pixel.0[0] > threshold { 255 } else { 0 };
                }
                luma.save(output.path())
            }
            PreprocessPolicy::Soft => {
                let gray = img.grayscale();
                let upscaled = gray.resize(
                    gray.width() * SOFT_UPSCALE,
                    gray.height() * SOFT_UPSCALE,
                    FilterType::Lanczos3,
                );
                upscaled.adjust_contrast(SOFT_CONTRAST).save(output.path())
            }
        }
        .map_err(|e| {
            ExtractionError::ExtractionFailed(format!("could not write preprocessed image: {e}"))
        })?;

        Ok(output)
    }

    /// Run Tesseract OCR on a preprocessed image.
    fn run_tesseract(&self, image_path: &Path) -> Result<String, ExtractionError> {
        let mut cmd = Command::new("tesseract");
        cmd.arg(image_path).arg("stdout");
        if let Some(lang) = &self.language {
            cmd.args(["-l", lang]);
        }

        tools::run_tool(
            cmd,
            "tesseract (install tesseract-ocr)",
            "tesseract failed",
            Duration::from_secs(self.settings.timeout_secs),
        )
    }
}

/// Drop lines where non-alphabetic characters strictly outnumber alphabetic
/// ones. Lines with alpha count >= non-alpha count survive.
pub fn filter_noisy_lines(text: &str) -> String {
    text.lines()
        .filter(|line| {
            let alpha = line.chars().filter(|c| c.is_alphabetic()).count();
            let non_alpha = line.chars().count() - alpha;
            non_alpha <= alpha
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Drop non-blank lines where every word is shorter than `min_word_len`.
/// Blank lines always pass.
pub fn filter_short_word_lines(text: &str, min_word_len: usize) -> String {
    text.lines()
        .filter(|line| {
            if line.trim().is_empty() {
                return true;
            }
            line.split_whitespace()
                .any(|word| word.chars().count() >= min_word_len)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noise_filter_drops_symbol_heavy_lines() {
        // 4 non-alpha vs 1 alpha: dropped
        assert_eq!(filter_noisy_lines("@@@@1"), "");
        // 2 alpha vs 2 non-alpha: kept (alpha >= non-alpha)
        assert_eq!(filter_noisy_lines("ab@1"), "ab@1");
    }

    #[test]
    fn noise_filter_keeps_blank_lines() {
        assert_eq!(filter_noisy_lines("good line\n\nmore text"), "good line\n\nmore text");
    }

    #[test]
    fn noise_filter_counts_spaces_as_non_alpha() {
        // 3 alpha, 5 non-alpha ("1 2 3" has digits and spaces)
        assert_eq!(filter_noisy_lines("a 1 b 2 c"), "");
    }

    #[test]
    fn short_word_filter_needs_one_long_word() {
        assert_eq!(filter_short_word_lines("ok no to", 4), "");
        assert_eq!(filter_short_word_lines("okay word", 4), "okay word");
        assert_eq!(filter_short_word_lines("a decent sentence", 4), "a decent sentence");
    }

    #[test]
    fn short_word_filter_passes_blank_lines() {
        assert_eq!(filter_short_word_lines("ok\n\nlonger line", 4), "\nlonger line");
    }

    #[test]
    fn filters_compose_in_pipeline_order() {
        let raw = "A real sentence here\n@@@@1\nok no to\n";
        let denoised = filter_noisy_lines(raw);
        let cleaned = filter_short_word_lines(&denoised, 4);
        assert_eq!(cleaned, "A real sentence here");
        assert_eq!(cleaned.split_whitespace().count(), 4);
    }
}
