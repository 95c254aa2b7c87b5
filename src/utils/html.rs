//! HTML escaping for rendered OCR output and file names.

/// Escape the HTML special characters in a single pass. Extracted text and
/// uploaded file names are attacker-controlled, so apostrophes are escaped
/// too (the result page interpolates into attribute positions).
pub fn html_escape(s: &str) -> String {
    s.chars().fold(String::with_capacity(s.len()), |mut out, c| {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_ocr_text_passes_through() {
        assert_eq!(html_escape("Hello World Hello World"), "Hello World Hello World");
        assert_eq!(html_escape("página 1 — conteúdo"), "página 1 — conteúdo");
    }

    #[test]
    fn markup_in_extracted_text_is_neutralized() {
        // OCR output from a scanned page can contain anything
        assert_eq!(
            html_escape("<script>alert(1)</script>"),
            "&lt;script&gt;alert(1)&lt;/script&gt;"
        );
        assert_eq!(html_escape("Q1 & Q2 totals"), "Q1 &amp; Q2 totals");
    }

    #[test]
    fn quotes_in_file_names_are_escaped() {
        assert_eq!(
            html_escape(r#"annual "report".pdf"#),
            "annual &quot;report&quot;.pdf"
        );
        assert_eq!(html_escape("client's scan.pdf"), "client&#39;s scan.pdf");
    }
}
