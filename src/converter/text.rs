use crate::config::EmptyOutputPolicy;
use crate::converter::{errors::ConvertError, pdf, strategy::RawDocument};

/// Trimmed lines of `text`, without blank or whitespace-only ones.
pub fn non_blank_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Non-blank text lines of the document, applying the empty-output policy.
pub fn document_lines(
    document: &RawDocument,
    policy: EmptyOutputPolicy,
) -> Result<Vec<String>, ConvertError> {
    let text = pdf::extract_text(&document.bytes)?;
    let lines = non_blank_lines(&text);
    if lines.is_empty() && policy == EmptyOutputPolicy::Reject {
        return Err(ConvertError::Empty);
    }
    Ok(lines)
}
