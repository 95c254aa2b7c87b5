//! PDF text-layer trust classification.
//!
//! Two independent read-only checks decide whether a PDF's embedded text
//! layer can be trusted:
//!
//! - *Font validity*: `pdffonts` output must not list a font named `[none]`
//!   or with `Custom` encoding. Such fonts have missing glyph mappings and
//!   extract as garbage.
//! - *Provenance validity*: documents fingerprinted by a known-bad
//!   creator_tool/creator/author combination silently carry broken text
//!   layers and must be OCR'd instead.

use std::collections::HashMap;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

use super::tools::run_tool;
use super::ExtractionError;

/// `pdffonts` fixed-column offsets for the font name field.
const FONT_NAME_COLS: (usize, usize) = (0, 34);
/// `pdffonts` fixed-column offsets for the encoding field.
const FONT_ENCODING_COLS: (usize, usize) = (52, 66);

/// Known-bad provenance fingerprint: all three must match (case-insensitive)
/// for the document to be classified as untrustworthy.
const BAD_CREATOR_TOOL: &str = "pdf24 creator";
const BAD_CREATOR: &str = "inss";
const BAD_AUTHOR: &str = "inss";

/// One row of the PDF's font table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontInfo {
    pub name: String,
    pub encoding: String,
}

/// Classify a PDF: `true` means the embedded text layer can be trusted.
/// Tool failures propagate as environment/extraction errors, never as a
/// validity verdict.
pub fn validate_pdf(pdf_path: &Path, timeout_secs: u64) -> Result<bool, ExtractionError> {
    let timeout = Duration::from_secs(timeout_secs);

    let mut fonts_cmd = Command::new("pdffonts");
    fonts_cmd.arg(pdf_path);
    let fonts_output = run_tool(
        fonts_cmd,
        "pdffonts (install poppler-utils)",
        "pdffonts failed",
        timeout,
    )?;
    let fonts = parse_pdffonts_output(&fonts_output);

    let mut meta_cmd = Command::new("exiftool");
    meta_cmd.arg(pdf_path);
    let meta_output = run_tool(
        meta_cmd,
        "exiftool (install libimage-exiftool-perl)",
        "exiftool failed",
        timeout,
    )?;
    let metadata = parse_metadata_output(&meta_output);

    Ok(fonts_are_valid(&fonts) && provenance_is_valid(&metadata))
}

/// Parse `pdffonts` output. The first two lines are the header and the
/// separator rule; fields sit at fixed column offsets.
pub fn parse_pdffonts_output(output: &str) -> Vec<FontInfo> {
    output
        .lines()
        .skip(2)
        .filter(|line| !line.trim().is_empty())
        .map(|line| FontInfo {
            name: slice_columns(line, FONT_NAME_COLS),
            encoding: slice_columns(line, FONT_ENCODING_COLS),
        })
        .collect()
}

fn slice_columns(line: &str, (start, end): (usize, usize)) -> String {
    line.chars()
        .skip(start)
        .take(end.saturating_sub(start))
        .collect::<String>()
        .trim()
        .to_string()
}

/// False if any font entry is unnamed or carries a custom encoding.
pub fn fonts_are_valid(fonts: &[FontInfo]) -> bool {
    !fonts
        .iter()
        .any(|f| f.name == "[none]" || f.encoding == "Custom")
}

/// Parse `exiftool` output into a map with normalized keys: lowercased, with
/// spaces, slashes, and dashes mapped to underscores.
pub fn parse_metadata_output(output: &str) -> HashMap<String, String> {
    let mut metadata = HashMap::new();
    for line in output.lines() {
        if let Some((key, value)) = line.split_once(": ") {
            let key: String = key
                .trim()
                .to_lowercase()
                .chars()
                .map(|c| match c {
                    ' ' | '/' | '-' => '_',
                    other => other,
                })
                .collect();
            metadata.insert(key, value.trim().to_string());
        }
    }
    metadata
}

/// False only when the full known-bad fingerprint matches. A mismatch on any
/// of the three fields means the provenance is acceptable.
pub fn provenance_is_valid(metadata: &HashMap<String, String>) -> bool {
    let field_matches = |key: &str, expected: &str| {
        metadata
            .get(key)
            .map(|v| v.to_lowercase() == expected)
            .unwrap_or(false)
    };

    !(field_matches("creator_tool", BAD_CREATOR_TOOL)
        && field_matches("creator", BAD_CREATOR)
        && field_matches("author", BAD_AUTHOR))
}
