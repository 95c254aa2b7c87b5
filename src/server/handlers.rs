//! HTTP request handlers for the upload interface.

use std::path::Path;

use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::{Html, IntoResponse};

use super::templates::{self, ResultView};
use super::AppState;
use crate::extract::{language_by_code, ExtractionError, TextExtractor};
use crate::utils::truncate_name;

/// Display length limit for uploaded file names.
const MAX_NAME_CHARS: usize = 40;

/// Upload form.
pub async fn index() -> impl IntoResponse {
    render_page(&[], None)
}

/// Handle a document upload: buffer it to a uniquely named temp file, run
/// the extraction pipeline on the blocking pool, render the counts.
pub async fn upload(State(state): State<AppState>, mut multipart: Multipart) -> impl IntoResponse {
    let mut languages: Vec<String> = Vec::new();
    let mut uploaded: Option<(String, axum::body::Bytes)> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("Failed to read multipart field: {}", e);
                return render_error(&[], "upload", &format!("Could not read the upload: {e}"));
            }
        };

        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "languages" => {
                if let Ok(code) = field.text().await {
                    if language_by_code(&code).is_some() && !languages.contains(&code) {
                        languages.push(code);
                    }
                }
            }
            "uploaded_file" => {
                let file_name = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "upload".to_string());
                match field.bytes().await {
                    Ok(data) => uploaded = Some((file_name, data)),
                    Err(e) => {
                        tracing::warn!("Failed to read file data: {}", e);
                        return render_error(
                            &languages,
                            &file_name,
                            &format!("Could not read the file data: {e}"),
                        );
                    }
                }
            }
            _ => {}
        }
    }

    let Some((file_name, data)) = uploaded else {
        return render_error(&languages, "upload", "No file provided.");
    };

    // The temp file keeps the original extension: the pipeline classifies by
    // extension and tesseract sniffs formats from it too.
    let suffix = Path::new(&file_name)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default();
    let temp = match tempfile::Builder::new()
        .prefix("textcount-upload-")
        .suffix(&suffix)
        .tempfile()
    {
        Ok(temp) => temp,
        Err(e) => {
            tracing::error!("Could not create temp file for upload: {}", e);
            return render_error(&languages, &file_name, "Could not buffer the upload.");
        }
    };
    if let Err(e) = tokio::fs::write(temp.path(), &data).await {
        tracing::error!("Could not write upload to temp file: {}", e);
        return render_error(&languages, &file_name, "Could not buffer the upload.");
    }

    let settings = state.settings.clone();
    let selected = languages.clone();
    let document_path = temp.path().to_path_buf();
    let outcome = tokio::task::spawn_blocking(move || {
        TextExtractor::new(&settings, selected).extract(&document_path)
    })
    .await;

    match outcome {
        Ok(Ok(result)) => {
            let view = ResultView {
                file_name: truncate_name(&file_name, MAX_NAME_CHARS),
                languages: selected_names(&languages),
                error: false,
                message: String::new(),
                qt_pages: result.qt_pages,
                qt_images: result.qt_images,
                qt_words: result.qt_words,
                qt_char_extracted: result.qt_char_extracted,
                qt_char_cleaned: result.qt_char_cleaned,
                qt_page_errors: result.qt_page_errors,
                text: result.text_extracted.trim().to_string(),
            };
            render_page(&languages, Some(view))
        }
        Ok(Err(e)) => {
            if e.is_environment() {
                tracing::error!("Extraction environment error: {}", e);
            } else {
                tracing::info!("Extraction failed for {}: {}", file_name, e);
            }
            render_error(&languages, &file_name, &user_message(&e))
        }
        Err(e) => {
            tracing::error!("Extraction task panicked: {}", e);
            render_error(&languages, &file_name, "Extraction failed unexpectedly.")
        }
    }
}

/// Serve the stylesheet.
pub async fn serve_css() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css")], templates::STYLE_CSS)
}

fn selected_names(codes: &[String]) -> Vec<&'static str> {
    codes
        .iter()
        .filter_map(|code| language_by_code(code))
        .map(|language| language.name)
        .collect()
}

fn user_message(error: &ExtractionError) -> String {
    match error {
        ExtractionError::UnsupportedFileType(ext) if ext.is_empty() => {
            "Unsupported file type: the file has no extension. Upload a PDF or image.".to_string()
        }
        ExtractionError::UnsupportedFileType(ext) => {
            format!("Unsupported file type: .{ext}. Upload a PDF or image.")
        }
        other => other.to_string(),
    }
}

fn render_error(languages: &[String], file_name: &str, message: &str) -> Html<String> {
    let view = ResultView {
        file_name: truncate_name(file_name, MAX_NAME_CHARS),
        languages: selected_names(languages),
        error: true,
        message: message.to_string(),
        ..Default::default()
    };
    render_page(languages, Some(view))
}

fn render_page(languages: &[String], view: Option<ResultView>) -> Html<String> {
    let mut content = templates::upload_form(languages);
    if let Some(view) = &view {
        content.push_str(&templates::result_section(view));
    }
    Html(templates::base_template("Text Counter", &content))
}
