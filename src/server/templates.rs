//! HTML templates for the web interface.

use crate::extract::LANGUAGES;
use crate::utils::html_escape;

/// Stylesheet served at /static/style.css.
pub const STYLE_CSS: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; background: #f5f5f2; color: #222; }
#main-header { background: #2b2b2b; padding: 0.6rem 1rem; }
#main-header .logo { color: #fff; font-weight: bold; text-decoration: none; }
main { max-width: 48rem; margin: 1.5rem auto; padding: 0 1rem; }
fieldset { border: 1px solid #ccc; margin-bottom: 1rem; }
.languages label { display: inline-block; margin-right: 0.8rem; }
button { padding: 0.4rem 1.2rem; }
.error { background: #fbe3e4; border: 1px solid #c0392b; padding: 0.6rem; margin: 1rem 0; }
table.counts { border-collapse: collapse; margin: 1rem 0; }
table.counts td, table.counts th { border: 1px solid #ccc; padding: 0.3rem 0.8rem; text-align: left; }
pre.extracted { background: #fff; border: 1px solid #ccc; padding: 0.8rem; white-space: pre-wrap; }
"#;

/// Data needed to render the result section.
#[derive(Debug, Clone, Default)]
pub struct ResultView {
    /// Display name, already truncated by the handler.
    pub file_name: String,
    /// Display names of the selected OCR languages.
    pub languages: Vec<&'static str>,
    pub error: bool,
    pub message: String,
    pub qt_pages: u32,
    pub qt_images: u32,
    pub qt_words: u64,
    pub qt_char_extracted: u64,
    pub qt_char_cleaned: u64,
    pub qt_page_errors: u32,
    /// Extracted text, trimmed of leading/trailing whitespace.
    pub text: String,
}

/// Base HTML template.
pub fn base_template(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - textcount</title>
    <link rel="stylesheet" href="/static/style.css">
</head>
<body>
    <header id="main-header">
        <nav>
            <a href="/" class="logo">textcount</a>
        </nav>
    </header>
    <main>
        <h1>{}</h1>
        {}
    </main>
</body>
</html>"#,
        html_escape(title),
        html_escape(title),
        content
    )
}

/// Render the upload form, preserving the previous language selection.
pub fn upload_form(selected: &[String]) -> String {
    let mut checkboxes = String::new();
    for language in LANGUAGES {
        let checked = if selected.iter().any(|c| c == language.code) {
            " checked"
        } else {
            ""
        };
        checkboxes.push_str(&format!(
            r#"<label><input type="checkbox" name="languages" value="{}"{}> {}</label>
"#,
            language.code, checked, language.name
        ));
    }

    format!(
        r#"
    <form method="post" action="/" enctype="multipart/form-data">
        <fieldset>
            <legend>Document</legend>
            <input type="file" name="uploaded_file" required>
        </fieldset>
        <fieldset class="languages">
            <legend>OCR languages</legend>
            {}
        </fieldset>
        <button type="submit">Extract text</button>
    </form>
    "#,
        checkboxes
    )
}

/// Render the extraction result (or error) below the form.
pub fn result_section(view: &ResultView) -> String {
    if view.error {
        return format!(
            r#"
    <div class="error">
        <strong>{}</strong>: {}
    </div>
    "#,
            html_escape(&view.file_name),
            html_escape(&view.message)
        );
    }

    let languages = if view.languages.is_empty() {
        "engine default".to_string()
    } else {
        view.languages.join(", ")
    };

    let page_errors_row = if view.qt_page_errors > 0 {
        format!(
            "<tr><th>Pages with extraction errors</th><td>{}</td></tr>",
            view.qt_page_errors
        )
    } else {
        String::new()
    };

    format!(
        r#"
    <h2>{}</h2>
    <p>Languages: {}</p>
    <table class="counts">
        <tr><th>Pages</th><td>{}</td></tr>
        <tr><th>Images with text</th><td>{}</td></tr>
        <tr><th>Words</th><td>{}</td></tr>
        <tr><th>Characters (extracted)</th><td>{}</td></tr>
        <tr><th>Characters (cleaned)</th><td>{}</td></tr>
        {}
    </table>
    <pre class="extracted">{}</pre>
    "#,
        html_escape(&view.file_name),
        html_escape(&languages),
        view.qt_pages,
        view.qt_images,
        view.qt_words,
        view.qt_char_extracted,
        view.qt_char_cleaned,
        page_errors_row,
        html_escape(&view.text)
    )
}
