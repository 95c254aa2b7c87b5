//! textcount - extract and count text from uploaded PDFs and images.
//!
//! The pipeline decides whether a PDF's embedded text layer can be trusted
//! (font table and provenance metadata checks), reads the text layer when it
//! can, and falls back to rasterizing pages and running Tesseract OCR when it
//! cannot. Embedded raster images get OCR'd individually on the trusted path.
//! Results are aggregated into page/image/word/character counts.

pub mod cli;
pub mod config;
pub mod extract;
pub mod server;
pub mod utils;
