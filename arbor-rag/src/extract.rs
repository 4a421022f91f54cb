//! Text extraction from source documents.
//!
//! PDFs go through `pdf-extract`; everything else is read as UTF-8 text.

use std::path::Path;

use crate::error::{RagError, Result};

fn extraction_error(path: &Path, message: impl Into<String>) -> RagError {
    RagError::Extraction { path: path.display().to_string(), message: message.into() }
}

/// Extract the full text of a document.
///
/// # Errors
///
/// Returns [`RagError::Extraction`] when the file cannot be read or the PDF
/// cannot be parsed.
pub fn extract_text(path: &Path) -> Result<String> {
    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));

    if is_pdf {
        let bytes = std::fs::read(path).map_err(|e| extraction_error(path, e.to_string()))?;
        pdf_extract::extract_text_from_mem(&bytes)
            .map_err(|e| extraction_error(path, e.to_string()))
    } else {
        std::fs::read_to_string(path).map_err(|e| extraction_error(path, e.to_string()))
    }
}
