//! Display formatting helpers.

/// Truncate a file name for display, appending an ellipsis when shortened.
pub fn truncate_name(name: &str, max_chars: usize) -> String {
    if name.chars().count() <= max_chars {
        name.to_string()
    } else {
        let truncated: String = name.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_names_pass_through() {
        assert_eq!(truncate_name("report.pdf", 40), "report.pdf");
    }

    #[test]
    fn long_names_get_ellipsis() {
        let name = "a".repeat(50);
        let truncated = truncate_name(&name, 40);
        assert_eq!(truncated.chars().count(), 43);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn exact_length_is_not_truncated() {
        let name = "b".repeat(40);
        assert_eq!(truncate_name(&name, 40), name);
    }
}
