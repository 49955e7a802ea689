use thiserror::Error;

/// Characters of extracted text forwarded to the provider at most;
/// anything beyond is cut and marked.
pub const MAX_TEXT_CHARS: usize = 50_000;

const TRUNCATION_MARKER: &str = "\n\n[Text truncated due to length...]";

#[derive(Debug, Error)]
pub enum TextError {
    #[error("Could not extract text from file: {0}")]
    Extraction(String),

    #[error("Could not extract text from file. File may be empty or corrupted.")]
    Empty,
}

/// Upload types the service accepts, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Text,
}

impl DocumentKind {
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, extension) = filename.rsplit_once('.')?;
        match extension.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" => Some(Self::Text),
            _ => None,
        }
    }
}

/// Turn an uploaded document into provider-ready text: decode per kind,
/// reject empty results, truncate overlong ones with a marker.
pub fn extract_text(kind: DocumentKind, bytes: &[u8]) -> Result<String, TextError> {
    let text = match kind {
        DocumentKind::Pdf => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|err| TextError::Extraction(err.to_string()))?,
        DocumentKind::Text => String::from_utf8(bytes.to_vec())
            .map_err(|err| TextError::Extraction(err.to_string()))?,
    };

    if text.trim().is_empty() {
        return Err(TextError::Empty);
    }

    Ok(truncate(text))
}

fn truncate(text: String) -> String {
    match text.char_indices().nth(MAX_TEXT_CHARS) {
        Some((cut, _)) => {
            let mut truncated = text;
            truncated.truncate(cut);
            truncated.push_str(TRUNCATION_MARKER);
            truncated
        }
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_filenames_by_extension() {
        assert_eq!(
            DocumentKind::from_filename("syllabus.pdf"),
            Some(DocumentKind::Pdf)
        );
        assert_eq!(
            DocumentKind::from_filename("Syllabus.TXT"),
            Some(DocumentKind::Text)
        );
        assert_eq!(
            DocumentKind::from_filename("fall.2024.notes.txt"),
            Some(DocumentKind::Text)
        );
        assert_eq!(DocumentKind::from_filename("syllabus.docx"), None);
        assert_eq!(DocumentKind::from_filename("syllabus"), None);
    }

    #[test]
    fn plain_text_passes_through() {
        let text = extract_text(DocumentKind::Text, "CS 101 schedule".as_bytes()).unwrap();
        assert_eq!(text, "CS 101 schedule");
    }

    #[test]
    fn whitespace_only_text_is_rejected() {
        let err = extract_text(DocumentKind::Text, b"  \n\t ").unwrap_err();
        assert!(matches!(err, TextError::Empty));
    }

    #[test]
    fn invalid_utf8_is_an_extraction_error() {
        let err = extract_text(DocumentKind::Text, &[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, TextError::Extraction(_)));
    }

    #[test]
    fn overlong_text_is_cut_and_marked() {
        let long = "a".repeat(MAX_TEXT_CHARS + 100);
        let text = extract_text(DocumentKind::Text, long.as_bytes()).unwrap();

        assert!(text.ends_with(TRUNCATION_MARKER));
        assert_eq!(text.len(), MAX_TEXT_CHARS + TRUNCATION_MARKER.len());
    }

    #[test]
    fn text_at_the_limit_is_untouched() {
        let exact = "b".repeat(MAX_TEXT_CHARS);
        let text = extract_text(DocumentKind::Text, exact.as_bytes()).unwrap();
        assert_eq!(text, exact);
    }
}
