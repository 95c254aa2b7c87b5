//! Embedded text-layer extraction via `pdftotext -bbox`.
//!
//! The bbox output lists every word with its bounding box, per page. Words
//! whose box is taller than it is wide come from vertically-rotated text
//! runs; poppler emits their glyphs in reading order but rotated, so the
//! character sequence is reversed before concatenation.

use std::path::Path;
use std::process::Command;
use std::time::Duration;

use quick_xml::events::Event;
use quick_xml::Reader;

use super::tools::run_tool;
use super::ExtractionError;

/// A word from the PDF text layer with its orientation flag.
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub text: String,
    pub upright: bool,
}

/// Number of pages in the PDF, from `pdfinfo`.
pub fn page_count(pdf_path: &Path, timeout_secs: u64) -> Result<u32, ExtractionError> {
    let mut cmd = Command::new("pdfinfo");
    cmd.arg(pdf_path);
    let output = run_tool(
        cmd,
        "pdfinfo (install poppler-utils)",
        "pdfinfo failed",
        Duration::from_secs(timeout_secs),
    )?;

    for line in output.lines() {
        if let Some(rest) = line.strip_prefix("Pages:") {
            return rest.trim().parse().map_err(|_| {
                ExtractionError::ExtractionFailed("pdfinfo reported an unreadable page count".into())
            });
        }
    }
    Err(ExtractionError::ExtractionFailed(
        "pdfinfo output did not include a page count".into(),
    ))
}

/// Extract the embedded text layer word by word. Returns the concatenated
/// text (single-space separated, trailing separator per word) and the total
/// word count across all pages.
pub fn extract_text_layer(
    pdf_path: &Path,
    timeout_secs: u64,
) -> Result<(String, u64), ExtractionError> {
    let mut cmd = Command::new("pdftotext");
    cmd.arg("-bbox").arg(pdf_path).arg("-");
    let xml = run_tool(
        cmd,
        "pdftotext (install poppler-utils)",
        "pdftotext -bbox failed",
        Duration::from_secs(timeout_secs),
    )?;

    let pages = parse_bbox_words(&xml)?;
    Ok(pages_to_text(&pages))
}

/// Parse the XHTML emitted by `pdftotext -bbox` into per-page word lists.
pub fn parse_bbox_words(xml: &str) -> Result<Vec<Vec<Word>>, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut pages: Vec<Vec<Word>> = Vec::new();
    let mut current: Option<(f64, f64)> = None; // (width, height) of the open word box
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"page" => pages.push(Vec::new()),
                b"word" => {
                    let (mut x_min, mut y_min, mut x_max, mut y_max) = (0.0, 0.0, 0.0, 0.0);
                    for attr in e.attributes().flatten() {
                        let value: f64 = String::from_utf8_lossy(&attr.value)
                            .parse()
                            .unwrap_or(0.0);
                        match attr.key.as_ref() {
                            b"xMin" => x_min = value,
                            b"yMin" => y_min = value,
                            b"xMax" => x_max = value,
                            b"yMax" => y_max = value,
                            _ => {}
                        }
                    }
                    current = Some((x_max - x_min, y_max - y_min));
                    text.clear();
                }
                _ => {}
            },
            Ok(Event::Text(t)) => {
                if current.is_some() {
                    let fragment = t.unescape().map_err(|e| {
                        ExtractionError::ExtractionFailed(format!("bbox output parse: {e}"))
                    })?;
                    text.push_str(&fragment);
                }
            }
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"word" {
                    if let Some((width, height)) = current.take() {
                        let word = Word {
                            upright: is_upright(&text, width, height),
                            text: std::mem::take(&mut text),
                        };
                        match pages.last_mut() {
                            Some(page) => page.push(word),
                            None => {
                                return Err(ExtractionError::ExtractionFailed(
                                    "bbox output had a word outside any page".into(),
                                ))
                            }
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(ExtractionError::ExtractionFailed(format!(
                    "bbox output parse: {e}"
                )))
            }
        }
    }

    Ok(pages)
}

/// A multi-character word laid out taller than wide is a rotated vertical
/// run. Single characters are ambiguous and treated as upright.
fn is_upright(text: &str, width: f64, height: f64) -> bool {
    text.chars().count() <= 1 || width >= height
}

/// Concatenate pages into the running text buffer, reversing non-upright
/// words, with a single-space separator after every word.
pub fn pages_to_text(pages: &[Vec<Word>]) -> (String, u64) {
    let mut buffer = String::new();
    let mut words = 0u64;

    for page in pages {
        for word in page {
            if word.upright {
                buffer.push_str(&word.text);
            } else {
                buffer.extend(word.text.chars().rev());
            }
            buffer.push(' ');
            words += 1;
        }
    }

    (buffer, words)
}
