use super::docx::extract_docx_text;
use super::pdf::extract_pdf_text;
use super::pptx::extract_pptx_text;

/// Character cap for the raw text stored on a course.
pub const OUTLINE_MAX_CHARS: usize = 15_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Pptx,
    PlainText,
}

impl DocumentKind {
    /// Pick the extractor from the lower-cased file-name suffix.
    pub fn from_file_name(file_name: &str) -> Self {
        let lower = file_name.to_lowercase();
        if lower.ends_with(".pdf") {
            Self::Pdf
        } else if lower.ends_with(".docx") {
            Self::Docx
        } else if lower.ends_with(".pptx") {
            Self::Pptx
        } else {
            Self::PlainText
        }
    }

    /// Text stored in place of the content when extraction fails.
    pub fn failure_text(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF Parsing Failed",
            Self::Docx => "Docx Parsing Failed",
            Self::Pptx => "PPTX Parsing Failed",
            Self::PlainText => "",
        }
    }
}

/// Extract text from an uploaded file. Never fails: a broken document
/// yields its kind's failure marker, unknown formats are decoded as UTF-8
/// with invalid bytes dropped.
pub fn extract_upload_text(file_name: &str, bytes: &[u8]) -> String {
    let kind = DocumentKind::from_file_name(file_name);
    let result = match kind {
        DocumentKind::Pdf => extract_pdf_text(bytes),
        DocumentKind::Docx => extract_docx_text(bytes),
        DocumentKind::Pptx => extract_pptx_text(bytes),
        DocumentKind::PlainText => return decode_lossy(bytes),
    };

    match result {
        Ok(text) => {
            tracing::debug!(?kind, chars = text.chars().count(), "Extracted upload text");
            text
        }
        Err(e) => {
            tracing::warn!(?kind, error = %e, "Text extraction failed");
            kind.failure_text().to_string()
        }
    }
}

fn decode_lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .chars()
        .filter(|c| *c != char::REPLACEMENT_CHARACTER)
        .collect()
}

/// First `max_chars` characters of `text`, cut on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
