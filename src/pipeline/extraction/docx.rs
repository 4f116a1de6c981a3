use super::ooxml::{open_package, paragraphs, read_entry};
use super::ExtractionError;

const DOCUMENT_PART: &str = "word/document.xml";

/// Text of a Word document, one line per paragraph.
pub fn extract_docx_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut package = open_package(bytes)?;
    let xml = read_entry(&mut package, DOCUMENT_PART)?;

    let mut text = String::new();
    for paragraph in paragraphs(&xml)? {
        text.push_str(&paragraph);
        text.push('\n');
    }
    Ok(text)
}
