//! Documentation text normalization.

/// Collapse a raw comment into paragraphs.
///
/// Leading and trailing blank lines are dropped, consecutive lines are joined
/// with a space and each run of blank lines becomes one `\n` paragraph break.
/// Returns `None` when nothing but whitespace is left.
pub fn normalize(raw: &str) -> Option<String> {
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();

    for line in raw.lines().map(str::trim) {
        if line.is_empty() {
            if !current.is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
            continue;
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(line);
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }

    if paragraphs.is_empty() {
        None
    } else {
        Some(paragraphs.join("\n"))
    }
}

/// First paragraph of a normalized description.
pub fn first_line(text: Option<&str>) -> Option<String> {
    text.and_then(|t| t.lines().next()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_lines_and_keeps_paragraphs() {
        let raw = "\n  First line\n  continues here.\n\n\n  Second paragraph.\n\n";
        assert_eq!(
            normalize(raw).as_deref(),
            Some("First line continues here.\nSecond paragraph.")
        );
    }

    #[test]
    fn blank_is_none() {
        assert_eq!(normalize("  \n\t\n"), None);
        assert_eq!(normalize(""), None);
    }

    #[test]
    fn first_line_of_paragraphs() {
        assert_eq!(first_line(Some("a b\nc")).as_deref(), Some("a b"));
        assert_eq!(first_line(None), None);
    }
}
