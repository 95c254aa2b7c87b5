//! Web server for the upload-and-count interface.
//!
//! One page: an upload form posting back to itself, rendering the extraction
//! result (or a descriptive error) below the form. Nothing is persisted; the
//! upload lives in a uniquely named temp file for the duration of the request.

mod handlers;
mod routes;
mod templates;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Settings;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Arc::new(settings),
        }
    }
}

/// Start the web server.
pub async fn serve(settings: Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings);
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_app() -> axum::Router {
        create_router(AppState::new(Settings::default()))
    }

    fn multipart_upload(file_name: &str, languages: &[&str], contents: &[u8]) -> Request<Body> {
        let boundary = "testboundary7431";
        let mut body = Vec::new();
        for code in languages {
            body.extend_from_slice(
                format!(
                    "--{boundary}\r\nContent-Disposition: form-data; name=\"languages\"\r\n\r\n{code}\r\n"
                )
                .as_bytes(),
            );
        }
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"uploaded_file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(contents);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn index_serves_the_upload_form() {
        let response = test_app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("uploaded_file"));
        assert!(html.contains("Portuguese"));
        assert!(html.contains("German"));
    }

    #[tokio::test]
    async fn stylesheet_is_served_as_css() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/static/style.css")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response
            .headers()
            .get("content-type")
            .map(|v| v.to_str().unwrap_or(""));
        assert!(content_type.unwrap_or("").contains("css"));
    }

    #[tokio::test]
    async fn unsupported_upload_renders_error_without_extraction() {
        let response = test_app()
            .oneshot(multipart_upload("report.docx", &["eng"], b"not a pdf"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains("Unsupported file type"));
        assert!(html.contains("report.docx"));
        // The form stays usable with the selection preserved
        assert!(html.contains(r#"value="eng" checked"#));
    }

    #[tokio::test]
    async fn upload_without_file_renders_error() {
        let boundary = "testboundary7431";
        let body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"languages\"\r\n\r\neng\r\n--{boundary}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains("No file provided"));
    }

    #[tokio::test]
    async fn long_file_names_are_truncated_in_the_response() {
        let long_name = format!("{}.docx", "x".repeat(60));
        let response = test_app()
            .oneshot(multipart_upload(&long_name, &[], b"irrelevant"))
            .await
            .unwrap();

        let html = body_string(response).await;
        assert!(html.contains(&format!("{}...", "x".repeat(40))));
        assert!(!html.contains(&long_name));
    }

    #[tokio::test]
    async fn unknown_language_codes_are_ignored() {
        let response = test_app()
            .oneshot(multipart_upload("report.docx", &["xxx", "eng"], b"data"))
            .await
            .unwrap();

        let html = body_string(response).await;
        assert!(html.contains(r#"value="eng" checked"#));
        assert!(!html.contains("xxx"));
    }
}
