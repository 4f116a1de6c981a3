use super::ExtractionError;

/// Extract the text layer of a digital PDF.
///
/// `pdf-extract` can panic on malformed input; panics are caught and
/// reported as `PdfParsing`.
pub fn extract_pdf_text(pdf_bytes: &[u8]) -> Result<String, ExtractionError> {
    let result = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(pdf_bytes));
    match result {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(ExtractionError::PdfParsing(e.to_string())),
        Err(_) => Err(ExtractionError::PdfParsing("parser panicked".into())),
    }
}
