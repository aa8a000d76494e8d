//! Splitting note bodies into JSON metadata and markdown

/// The two halves a note body can carry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct NoteContent {
    pub json: Option<String>,
    pub markdown: Option<String>,
}

/// Split a note body into a leading JSON object and trailing markdown.
///
/// A body that starts with `{` contributes its balanced-brace prefix as JSON
/// and the remainder as markdown. Braces inside JSON strings are ignored. If
/// the braces never balance the whole body is treated as markdown.
pub(crate) fn split_note_body(body: &str) -> NoteContent {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return NoteContent::default();
    }

    if trimmed.starts_with('{') {
        if let Some(end) = balanced_object_end(trimmed) {
            let (json, rest) = trimmed.split_at(end + 1);
            let rest = rest.trim();
            return NoteContent {
                json: Some(json.to_string()),
                markdown: (!rest.is_empty()).then(|| rest.to_string()),
            };
        }
    }

    NoteContent {
        json: None,
        markdown: Some(trimmed.to_string()),
    }
}

/// Byte index of the brace closing the object that opens at index 0
fn balanced_object_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (index, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_markdown() {
        let content = split_note_body("  **Welcome** aboard  ");
        assert_eq!(content.json, None);
        assert_eq!(content.markdown.as_deref(), Some("**Welcome** aboard"));
    }

    #[test]
    fn test_json_only() {
        let content = split_note_body(r#"{"action": "log", "params": {"message": "hi"}}"#);
        assert_eq!(
            content.json.as_deref(),
            Some(r#"{"action": "log", "params": {"message": "hi"}}"#)
        );
        assert_eq!(content.markdown, None);
    }

    #[test]
    fn test_json_then_markdown() {
        let content = split_note_body("{\"action\": \"log\"}\n\n# Heading\nSome text");
        assert_eq!(content.json.as_deref(), Some("{\"action\": \"log\"}"));
        assert_eq!(content.markdown.as_deref(), Some("# Heading\nSome text"));
    }

    #[test]
    fn test_braces_inside_strings() {
        let content = split_note_body(r#"{"message": "a } brace \" and {"} tail"#);
        assert_eq!(
            content.json.as_deref(),
            Some(r#"{"message": "a } brace \" and {"}"#)
        );
        assert_eq!(content.markdown.as_deref(), Some("tail"));
    }

    #[test]
    fn test_unbalanced_is_markdown() {
        let content = split_note_body("{ not closed");
        assert_eq!(content.json, None);
        assert_eq!(content.markdown.as_deref(), Some("{ not closed"));
    }

    #[test]
    fn test_empty_body() {
        assert_eq!(split_note_body("   "), NoteContent::default());
    }
}
